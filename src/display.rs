//! Display sink: where the pipeline sends everything the user should see.
//!
//! DESIGN
//! ======
//! The orchestrator never writes to the terminal directly. It talks to a
//! [`DisplaySink`], so the same pipeline drives the interactive terminal and
//! the recording sink used in tests. The terminal sink prints markdown as-is,
//! draws charts as text bars, and optionally saves each chart as a
//! standalone HTML page.

use std::io::Write;
use std::path::PathBuf;

use tracing::{info, warn};

use crate::chart::Figure;
use crate::chart::render::{render_html, render_text};
use crate::conversation::Role;

/// UI contract for one conversation.
pub trait DisplaySink {
    /// Markdown text attributed to `role`.
    fn show_text(&mut self, role: Role, text: &str);

    /// A rendered chart with an optional caption.
    fn show_chart(&mut self, figure: &Figure, caption: Option<&str>);

    /// A chart shown before, redrawn from history.
    fn replay_chart(&mut self, figure: &Figure, caption: Option<&str>) {
        self.show_chart(figure, caption);
    }

    /// Informational notice (not an error).
    fn show_info(&mut self, text: &str);

    fn show_error(&mut self, text: &str);

    /// Called before reading the next input line.
    fn prompt(&mut self) {}
}

/// Writes to any [`Write`] (stdout in the binary, a buffer in tests).
pub struct TerminalSink<W: Write> {
    out: W,
    chart_dir: Option<PathBuf>,
    charts_written: usize,
}

impl<W: Write> TerminalSink<W> {
    pub fn new(out: W, chart_dir: Option<PathBuf>) -> Self {
        Self { out, chart_dir, charts_written: 0 }
    }

    fn emit(&mut self, text: &str) {
        let result = self
            .out
            .write_all(text.as_bytes())
            .and_then(|()| self.out.flush());
        if let Err(e) = result {
            warn!(error = %e, "display: write failed");
        }
    }

    fn chart_block(figure: &Figure, caption: Option<&str>) -> String {
        let mut block = format!("\n{}", render_text(figure));
        if let Some(caption) = caption {
            block.push_str(&format!("_{caption}_\n"));
        }
        block
    }

    fn save_html(&mut self, figure: &Figure) -> Option<PathBuf> {
        let dir = self.chart_dir.as_ref()?;
        self.charts_written += 1;
        let path = dir.join(format!("chart-{:03}.html", self.charts_written));
        let written = std::fs::create_dir_all(dir).and_then(|()| std::fs::write(&path, render_html(figure)));
        match written {
            Ok(()) => {
                info!(path = %path.display(), traces = figure.data.len(), "display: chart saved");
                Some(path)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "display: chart save failed");
                None
            }
        }
    }
}

impl<W: Write> DisplaySink for TerminalSink<W> {
    fn show_text(&mut self, role: Role, text: &str) {
        let block = match role {
            Role::User => format!("\nyou> {text}\n"),
            Role::Assistant => format!("\n{text}\n"),
        };
        self.emit(&block);
    }

    fn show_chart(&mut self, figure: &Figure, caption: Option<&str>) {
        let mut block = Self::chart_block(figure, caption);
        if let Some(path) = self.save_html(figure) {
            block.push_str(&format!("(interactive chart: {})\n", path.display()));
        }
        self.emit(&block);
    }

    /// Already saved on first render; only the text form is redrawn.
    fn replay_chart(&mut self, figure: &Figure, caption: Option<&str>) {
        self.emit(&Self::chart_block(figure, caption));
    }

    fn show_info(&mut self, text: &str) {
        self.emit(&format!("\nℹ️  {text}\n"));
    }

    fn show_error(&mut self, text: &str) {
        self.emit(&format!("\n❌ {text}\n"));
    }

    fn prompt(&mut self) {
        self.emit("\nyou> ");
    }
}

#[cfg(test)]
#[path = "display_test.rs"]
mod tests;
