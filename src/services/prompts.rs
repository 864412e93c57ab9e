//! Persona instructions and fixed prompt text.

use clap::ValueEnum;

/// Visualization guidance appended to every persona's instructions.
pub const PLOTTING_GUIDANCE: &str = "If the user asks to visualize, chart, graph, plot, or show a figure, produce Plotly-only Python code. \
Return the code wrapped in a single fenced block exactly like:\n\
```python\n\
# (imports if needed)\n\
# construct data from the retrieved context\n\
# create a Plotly figure assigned to the variable `fig`\n\
```\n\
Requirements:\n\
- Use Plotly only (no matplotlib).\n\
- Name the resulting figure variable `fig`.\n\
- Do NOT call fig.show().\n\
- You may include a brief natural-language explanation before the code block.";

pub const POET_INSTRUCTIONS: &str = "You are a second assistant. Read the provided assistant message and compose a haiku \
(three lines, 5-7-5 syllables) that captures its essence. \
Do NOT add new facts. Do NOT include code or citations. \
Output only the haiku (three lines).";

pub const POET_INPUT_PREFIX: &str = "This is the previous assistant message:\n\n";

const BOOK_INSTRUCTIONS: &str = "You are a careful, concise assistant providing individual information on Prof. Markus Reitzig's Book 'Get Better at Flatter'. \
Use ONLY the information retrieved from the file_search tool. \
If a retrieved chunk contains a page marker like '{:.page-1}', translate it into a citation in the following format:\n\n\
Reitzig, M. (2022). Get better at flatter. Springer International Publishing., p. <page number>\n\n\
Example: If the marker is '{:.page-3}', cite it as 'Reitzig, M. (2022). Get better at flatter. Springer International Publishing., p. 3'. \
If no page marker is present, omit the page reference. \
If the knowledge base does not contain the answer, reply with: \
\"I don't know based on the provided knowledge base.\" \
Do not rely on outside or general knowledge. Do not fabricate facts.";

const STRATEGY_INSTRUCTIONS: &str = "You are a careful, concise advisor helping leaders improve their organization's human-capital strategy. \
Ground every recommendation in the information retrieved from the file_search tool and name the source document when you rely on it. \
Ask one clarifying question when the user's situation is too vague to advise on. \
If the knowledge base does not contain the answer, reply with: \
\"I don't know based on the provided knowledge base.\" \
Do not rely on outside or general knowledge. Do not fabricate facts.";

/// One of the two configuration variants of the assistant. They share the
/// pipeline and differ only in instructions, default model, and banner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum Persona {
    /// Questions about the book "Get Better at Flatter".
    #[default]
    Book,
    /// General human-capital strategy advice.
    Strategy,
}

impl Persona {
    #[must_use]
    pub fn default_model(self) -> &'static str {
        match self {
            Self::Book => "gpt-4o-mini",
            Self::Strategy => "gpt-4o",
        }
    }

    #[must_use]
    pub fn title(self) -> &'static str {
        "SAMAritan Beta"
    }

    #[must_use]
    pub fn subtitle(self) -> &'static str {
        match self {
            Self::Book => "Ask about 'Get Better at Flatter' by Markus Reitzig",
            Self::Strategy => {
                "An AI agent that helps improve your human-capital strategy, designed by Phanish Puranam & Markus Reitzig"
            }
        }
    }

    /// Persona instructions followed by the plotting guidance.
    #[must_use]
    pub fn instructions(self) -> String {
        let base = match self {
            Self::Book => BOOK_INSTRUCTIONS,
            Self::Strategy => STRATEGY_INSTRUCTIONS,
        };
        format!("{base}\n\n{PLOTTING_GUIDANCE}")
    }
}

#[cfg(test)]
#[path = "prompts_test.rs"]
mod tests;
