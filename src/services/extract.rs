//! Response classifier: finds fenced ```` ```python ```` blocks in model output.

use std::sync::LazyLock;

use regex::Regex;
use tracing::warn;

static PYTHON_BLOCK: LazyLock<Result<Regex, regex::Error>> = LazyLock::new(|| Regex::new(r"(?s)```python\s(.*?)```"));

fn python_block() -> Option<&'static Regex> {
    match &*PYTHON_BLOCK {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, "extract: python block pattern failed to compile");
            None
        }
    }
}

/// Body of the first fenced python block, if any.
#[must_use]
pub fn extract_python_code(text: &str) -> Option<String> {
    let mut blocks = python_block()?.captures_iter(text);
    let first = blocks.next()?.get(1)?.as_str().to_string();
    let extra = blocks.count();
    if extra > 0 {
        warn!(extra_blocks = extra, "extract: multiple python blocks; using the first");
    }
    Some(first)
}

/// Text with every fenced python block removed, trimmed.
#[must_use]
pub fn remove_python_blocks(text: &str) -> String {
    match python_block() {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

#[cfg(test)]
#[path = "extract_test.rs"]
mod tests;
