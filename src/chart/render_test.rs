use super::*;
use serde_json::json;

fn bar_figure(orientation: Option<&str>) -> Figure {
    let mut trace = Trace::new(TraceKind::Bar);
    if orientation == Some("h") {
        trace.set("orientation", json!("h"));
        trace.set("y", json!(["A", "B"]));
        trace.set("x", json!([10, 20]));
    } else {
        trace.set("x", json!(["A", "B"]));
        trace.set("y", json!([10, 20]));
    }
    let mut fig = Figure::new();
    fig.add_trace(trace);
    fig.update_layout("title_text", json!("Revenue"));
    fig
}

#[test]
fn text_bars_scale_to_peak() {
    let text = render_text(&bar_figure(None));
    assert!(text.contains("Revenue"));
    assert!(text.contains(&format!("B {} 20", "█".repeat(40))));
    assert!(text.contains(&format!("A {} 10", "█".repeat(20))));
}

#[test]
fn horizontal_bars_read_labels_from_y() {
    let text = render_text(&bar_figure(Some("h")));
    assert!(text.contains(&format!("B {} 20", "█".repeat(40))));
}

#[test]
fn empty_figure_text() {
    let text = render_text(&Figure::new());
    assert!(text.contains("(empty figure)"));
}

#[test]
fn scatter_summarized_as_point_count() {
    let mut trace = Trace::new(TraceKind::Scatter);
    trace.set("x", json!([1, 2, 3]));
    trace.set("y", json!([4, 5, 6]));
    trace.set("name", json!("trend"));
    let mut fig = Figure::new();
    fig.add_trace(trace);
    let text = render_text(&fig);
    assert!(text.contains("[scatter] trend"));
    assert!(text.contains("3 points"));
}

#[test]
fn axis_titles_listed() {
    let mut fig = bar_figure(None);
    fig.update_layout("xaxis_title", json!("Quarter"));
    fig.update_layout("yaxis_title_text", json!("USD"));
    let text = render_text(&fig);
    assert!(text.contains("x: Quarter | y: USD"));
}

#[test]
fn html_embeds_figure_json() {
    let html = render_html(&bar_figure(None));
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains(PLOTLY_CDN));
    assert!(html.contains("Plotly.newPlot"));
    assert!(html.contains("\"type\":\"bar\""));
    assert!(html.contains("<title>Revenue</title>"));
}

#[test]
fn html_escapes_script_terminators() {
    let mut fig = Figure::new();
    fig.update_layout("title", json!("a</script><b>"));
    let html = render_html(&fig);
    assert!(!html.contains("a</script>"));
    assert!(html.contains("a<\\/script>"));
    assert!(html.contains("<title>a&lt;/script&gt;&lt;b&gt;</title>"));
}
