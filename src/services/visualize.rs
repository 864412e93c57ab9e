//! Visualization executor: runs extracted chart code and records the result.
//!
//! DESIGN
//! ======
//! Code runs in the allowlisted chart interpreter with a fresh scope per call.
//! Whatever happens (figure, no figure, error), exactly one turn is appended
//! and the user sees exactly one display event. Nothing propagates to the
//! orchestrator.

use tracing::{info, warn};

use crate::chart::{ChartError, Figure, Scope, execute, parse};
use crate::conversation::{Conversation, Turn};
use crate::display::DisplaySink;
use crate::error::ErrorCode;

/// Variable the generated code must bind its figure to.
pub const FIGURE_VAR: &str = "fig";

pub const NO_FIGURE_INFO: &str = "I generated code but couldn't detect a Plotly figure named 'fig'.";
pub const NO_FIGURE_TURN: &str = "Chart generation attempted, but no figure was detected.";

/// What running a fragment produced.
#[derive(Debug, Clone, PartialEq)]
pub enum ChartOutcome {
    Rendered(Figure),
    NoFigure,
    Failed(ChartError),
}

/// Outcome without the payload, for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartStatus {
    Rendered,
    NoFigure,
    Failed,
}

/// Strip `fig.show()`, then parse and execute in a fresh scope.
#[must_use]
pub fn run_chart_code(code: &str) -> ChartOutcome {
    let cleaned = code.replace("fig.show()", "");
    let program = match parse(cleaned.trim()) {
        Ok(program) => program,
        Err(e) => return ChartOutcome::Failed(e),
    };
    let mut scope = Scope::new();
    if let Err(e) = execute(&program, &mut scope) {
        return ChartOutcome::Failed(e);
    }
    match scope.take_figure(FIGURE_VAR) {
        Some(figure) => ChartOutcome::Rendered(figure),
        None => ChartOutcome::NoFigure,
    }
}

/// Run `code`, show the result, and append exactly one turn.
pub fn visualize(code: &str, conversation: &mut Conversation, sink: &mut dyn DisplaySink) -> ChartStatus {
    match run_chart_code(code) {
        ChartOutcome::Rendered(figure) => {
            info!(traces = figure.data.len(), title = figure.title().unwrap_or(""), "visualize: chart rendered");
            sink.show_chart(&figure, None);
            conversation.push(Turn::chart(figure));
            ChartStatus::Rendered
        }
        ChartOutcome::NoFigure => {
            info!("visualize: no figure bound to fig");
            sink.show_info(NO_FIGURE_INFO);
            conversation.push(Turn::assistant(NO_FIGURE_TURN));
            ChartStatus::NoFigure
        }
        ChartOutcome::Failed(e) => {
            warn!(error_code = e.error_code(), error = %e, "visualize: execution failed");
            sink.show_error(&format!("Plot execution error:\n{e}"));
            conversation.push(Turn::assistant(format!("Plot execution error: {e}")));
            ChartStatus::Failed
        }
    }
}

#[cfg(test)]
#[path = "visualize_test.rs"]
mod tests;
