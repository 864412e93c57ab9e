//! Figure renderers: a terminal text summary and a standalone HTML page.

use serde_json::Value;

use super::figure::{Figure, Trace, TraceKind};

const BAR_WIDTH: f64 = 40.0;
const MAX_ROWS: usize = 25;
const PLOTLY_CDN: &str = "https://cdn.plot.ly/plotly-2.35.2.min.js";

/// Render a figure as plain text with horizontal bars for categorical data.
#[must_use]
pub fn render_text(figure: &Figure) -> String {
    let mut out = String::new();
    if let Some(title) = figure.title() {
        out.push_str(&format!("📊 {title}\n"));
    }
    let axes: Vec<String> = ["xaxis", "yaxis"]
        .iter()
        .filter_map(|axis| figure.axis_title(axis).map(|t| format!("{}: {t}", &axis[..1])))
        .collect();
    if !axes.is_empty() {
        out.push_str(&format!("   {}\n", axes.join(" | ")));
    }
    if figure.data.is_empty() {
        out.push_str("(empty figure)\n");
        return out;
    }
    for trace in &figure.data {
        render_trace(&mut out, trace);
    }
    out
}

fn render_trace(out: &mut String, trace: &Trace) {
    let header = match trace.name() {
        Some(name) => format!("[{}] {name}", trace.kind.as_str()),
        None => format!("[{}]", trace.kind.as_str()),
    };
    out.push_str(&format!("{header}\n"));

    let Some(rows) = categorical_rows(trace) else {
        let points = ["x", "y", "values", "z"]
            .iter()
            .filter_map(|key| trace.attrs.get(*key).and_then(Value::as_array).map(Vec::len))
            .max()
            .unwrap_or(0);
        out.push_str(&format!("  {points} points\n"));
        return;
    };
    if rows.is_empty() {
        out.push_str("  (no data)\n");
        return;
    }

    let label_width = rows.iter().map(|(l, _)| l.chars().count()).max().unwrap_or(0);
    let peak = rows.iter().map(|(_, v)| *v).fold(0.0_f64, f64::max);
    for (label, value) in rows.iter().take(MAX_ROWS) {
        let bar = "█".repeat(bar_len(*value, peak));
        out.push_str(&format!("  {label:<label_width$} {bar} {}\n", format_value(*value)));
    }
    if rows.len() > MAX_ROWS {
        out.push_str(&format!("  ... {} more\n", rows.len() - MAX_ROWS));
    }
}

/// `(label, value)` pairs for traces that read naturally as bars.
fn categorical_rows(trace: &Trace) -> Option<Vec<(String, f64)>> {
    let (label_key, value_key) = match trace.kind {
        TraceKind::Pie => ("labels", "values"),
        TraceKind::Bar | TraceKind::Funnel => {
            let horizontal = trace.attrs.get("orientation").and_then(Value::as_str) == Some("h");
            if horizontal { ("y", "x") } else { ("x", "y") }
        }
        _ => return None,
    };
    let values = trace.attrs.get(value_key)?.as_array()?;
    let labels = trace.attrs.get(label_key).and_then(Value::as_array);
    let rows = values
        .iter()
        .enumerate()
        .filter_map(|(i, v)| {
            let value = v.as_f64()?;
            let label = labels
                .and_then(|l| l.get(i))
                .map_or_else(|| i.to_string(), label_text);
            Some((label, value))
        })
        .collect();
    Some(rows)
}

fn label_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
fn bar_len(value: f64, peak: f64) -> usize {
    if peak <= 0.0 || value <= 0.0 {
        return 0;
    }
    ((value / peak) * BAR_WIDTH).round().max(1.0) as usize
}

fn format_value(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 { format!("{value:.0}") } else { format!("{value:.2}") }
}

/// A self-contained HTML page that draws the figure with plotly.js.
#[must_use]
pub fn render_html(figure: &Figure) -> String {
    // `</script>` inside a string literal would end the script element early.
    let figure_json = figure.to_json().to_string().replace("</", "<\\/");
    let title = html_escape(figure.title().unwrap_or("Chart"));
    format!(
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <script src=\"{PLOTLY_CDN}\"></script>\n</head>\n<body>\n<div id=\"chart\"></div>\n\
         <script>\nconst fig = {figure_json};\nPlotly.newPlot(\"chart\", fig.data, fig.layout, {{responsive: true}});\n</script>\n\
         </body>\n</html>\n"
    )
}

fn html_escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

#[cfg(test)]
#[path = "render_test.rs"]
mod tests;
