use super::*;
use serde_json::json;

#[test]
fn magic_underscore_descends_compound_props() {
    let mut fig = Figure::new();
    fig.update_layout("xaxis_title_text", json!("Quarter"));
    assert_eq!(fig.layout["xaxis"]["title"]["text"], json!("Quarter"));
    assert_eq!(fig.axis_title("xaxis"), Some("Quarter"));
}

#[test]
fn plain_underscore_keys_stay_flat() {
    let mut fig = Figure::new();
    fig.update_layout("paper_bgcolor", json!("white"));
    fig.update_layout("plot_bgcolor", json!("#eee"));
    assert_eq!(fig.layout["paper_bgcolor"], json!("white"));
    assert_eq!(fig.layout["plot_bgcolor"], json!("#eee"));
}

#[test]
fn string_title_promoted_when_descended() {
    let mut fig = Figure::new();
    fig.update_layout("title", json!("Sales"));
    assert_eq!(fig.title(), Some("Sales"));
    fig.update_layout("title_font_size", json!(18));
    assert_eq!(fig.layout["title"], json!({"text": "Sales", "font": {"size": 18}}));
    assert_eq!(fig.title(), Some("Sales"));
}

#[test]
fn objects_deep_merge() {
    let mut fig = Figure::new();
    fig.update_layout("xaxis", json!({"title": {"text": "A"}}));
    fig.update_layout("xaxis", json!({"tickangle": 45, "title": {"standoff": 4}}));
    assert_eq!(fig.layout["xaxis"], json!({"title": {"text": "A", "standoff": 4}, "tickangle": 45}));
}

#[test]
fn scalar_overwrites() {
    let mut fig = Figure::new();
    fig.update_layout("height", json!(400));
    fig.update_layout("height", json!(600));
    assert_eq!(fig.layout["height"], json!(600));
}

#[test]
fn trace_type_attribute_ignored() {
    let mut trace = Trace::new(TraceKind::Bar);
    trace.set("type", json!("pie"));
    trace.set("marker_color", json!("red"));
    let value = trace.to_json();
    assert_eq!(value["type"], json!("bar"));
    assert_eq!(value["marker"]["color"], json!("red"));
}

#[test]
fn update_traces_applies_to_every_trace() {
    let mut fig = Figure::new();
    fig.add_trace(Trace::new(TraceKind::Bar));
    fig.add_trace(Trace::new(TraceKind::Scatter));
    fig.update_traces("opacity", &json!(0.5));
    assert!(fig.data.iter().all(|t| t.attrs["opacity"] == json!(0.5)));
}

#[test]
fn to_json_shape() {
    let mut fig = Figure::new();
    let mut trace = Trace::new(TraceKind::Pie);
    trace.set("labels", json!(["a", "b"]));
    trace.set("values", json!([1, 2]));
    trace.set("name", json!("Share"));
    fig.add_trace(trace);
    assert_eq!(fig.data[0].name(), Some("Share"));
    assert_eq!(
        fig.to_json(),
        json!({
            "data": [{"type": "pie", "labels": ["a", "b"], "values": [1, 2], "name": "Share"}],
            "layout": {}
        })
    );
}

#[test]
fn trace_kind_names() {
    assert_eq!(TraceKind::from_name("Bar"), Some(TraceKind::Bar));
    assert_eq!(TraceKind::from_name("histogram"), Some(TraceKind::Histogram));
    assert_eq!(TraceKind::from_name("violin"), None);
    assert_eq!(TraceKind::Funnel.as_str(), "funnel");
}

#[test]
fn magic_underscore_descent_is_bounded() {
    let key = format!("{}text", "title_".repeat(100));
    let mut fig = Figure::new();
    fig.update_layout(&key, json!(1));
    let mut node = &fig.layout["title"];
    for _ in 0..5 {
        node = &node["title"];
    }
    let rest = format!("{}text", "title_".repeat(94));
    assert_eq!(node[rest.as_str()], json!(1));
}
