//! Shared error classification.
//!
//! Every module error enum implements [`ErrorCode`] so failures can be logged
//! with a stable machine-readable code next to the human message.

pub trait ErrorCode: std::fmt::Display {
    fn error_code(&self) -> &'static str;

    fn retryable(&self) -> bool {
        false
    }
}
