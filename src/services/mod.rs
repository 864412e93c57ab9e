//! Turn-processing services used by the chat session.
//!
//! ARCHITECTURE
//! ============
//! Leaf services (`transcript`, `extract`, `visualize`, `prompts`) are pure or
//! nearly pure; `turn` composes them into the per-turn pipeline and owns all
//! interaction with the LLM and the display sink.

pub mod extract;
pub mod prompts;
pub mod transcript;
pub mod turn;
pub mod visualize;
