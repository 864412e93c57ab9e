//! End-to-end tests for the chart interpreter.

use super::eval::Value;
use super::figure::TraceKind;
use super::{ChartError, Figure, Scope, execute, parse};
use crate::error::ErrorCode;
use serde_json::json;

fn run(code: &str) -> Result<Scope, ChartError> {
    let program = parse(code)?;
    let mut scope = Scope::new();
    execute(&program, &mut scope)?;
    Ok(scope)
}

fn run_fig(code: &str) -> Figure {
    run(code).unwrap().take_figure("fig").expect("fig should be bound to a figure")
}

// =============================================================================
// GRAPH OBJECTS
// =============================================================================

#[test]
fn go_bar_with_layout_updates() {
    let fig = run_fig(
        r#"
import plotly.graph_objects as go

fig = go.Figure(data=[go.Bar(x=["North", "South"], y=[3, 5], name="Sales")])
fig.update_layout(title="Quarterly", xaxis_title="Region")
"#,
    );
    assert_eq!(fig.data.len(), 1);
    assert_eq!(fig.data[0].kind, TraceKind::Bar);
    assert_eq!(fig.data[0].name(), Some("Sales"));
    assert_eq!(fig.title(), Some("Quarterly"));
    assert_eq!(fig.axis_title("xaxis"), Some("Region"));
    assert_eq!(fig.to_json()["data"][0]["y"], json!([3, 5]));
}

#[test]
fn empty_figure_is_still_a_figure() {
    let fig = run_fig("import plotly.graph_objects as go\nfig = go.Figure()");
    assert!(fig.data.is_empty());
}

#[test]
fn method_calls_write_back_to_the_variable() {
    let fig = run_fig(
        r"
import plotly.graph_objects as go
fig = go.Figure()
fig.add_trace(go.Bar(x=[1], y=[2]))
fig.update_traces(marker_color='red')
fig.update_xaxes(tickangle=45)
fig.show()
",
    );
    assert_eq!(fig.data.len(), 1);
    assert_eq!(fig.data[0].attrs["marker"]["color"], json!("red"));
    assert_eq!(fig.layout["xaxis"]["tickangle"], json!(45));
}

#[test]
fn chained_methods_return_the_figure() {
    let fig = run_fig(
        "import plotly.graph_objects as go\nfig = go.Figure().add_trace(go.Scatter(x=[1, 2], y=[2.5, 3])).update_layout(height=400)",
    );
    assert_eq!(fig.data[0].kind, TraceKind::Scatter);
    assert_eq!(fig.data[0].attrs["y"], json!([2.5, 3]));
    assert_eq!(fig.layout["height"], json!(400));
}

#[test]
fn dict_traces_and_layout_object() {
    let fig = run_fig(
        r#"
import plotly.graph_objects as go
fig = go.Figure(
    data=[{"type": "pie", "labels": ["a", "b"], "values": [1, 2]}],
    layout=go.Layout(title="Share"),
)
"#,
    );
    assert_eq!(fig.data[0].kind, TraceKind::Pie);
    assert_eq!(fig.title(), Some("Share"));
}

#[test]
fn from_import_binds_constructors() {
    let fig = run_fig("from plotly.graph_objects import Figure, Bar as B\nfig = Figure(data=B(x=['a'], y=[1]))");
    assert_eq!(fig.data.len(), 1);
    assert_eq!(fig.data[0].kind, TraceKind::Bar);
}

#[test]
fn variables_and_unpacking_feed_traces() {
    let fig = run_fig(
        r"
import plotly.graph_objects as go
labels, values = ['Books', 'Talks'], [12, 30]
total = sum(values)
fig = go.Figure(go.Pie(labels=labels, values=values))
fig.update_layout(title_text='Total ' + 'mix')
",
    );
    assert_eq!(fig.data[0].attrs["values"], json!([12, 30]));
    assert_eq!(fig.title(), Some("Total mix"));
}

// =============================================================================
// PLOTLY EXPRESS
// =============================================================================

#[test]
fn px_bar_sets_titles_and_labels() {
    let fig = run_fig(
        r#"
import plotly.express as px
fig = px.bar(x=["Q1", "Q2"], y=[10, 20], title="Revenue", labels={"x": "Quarter"})
"#,
    );
    assert_eq!(fig.data[0].kind, TraceKind::Bar);
    assert_eq!(fig.title(), Some("Revenue"));
    assert_eq!(fig.axis_title("xaxis"), Some("Quarter"));
    assert_eq!(fig.axis_title("yaxis"), Some("y"));
}

#[test]
fn px_line_and_scatter_modes() {
    let line = run_fig("import plotly.express as px\nfig = px.line(x=[1, 2], y=[3, 4])");
    assert_eq!(line.data[0].kind, TraceKind::Scatter);
    assert_eq!(line.data[0].attrs["mode"], json!("lines"));

    let scatter = run_fig("import plotly.express as px\nfig = px.scatter(x=[1, 2], y=[3, 4])");
    assert_eq!(scatter.data[0].attrs["mode"], json!("markers"));
}

#[test]
fn px_pie_maps_names_to_labels() {
    let fig = run_fig("import plotly.express as px\nfig = px.pie(names=['a', 'b'], values=[1, 3])");
    assert_eq!(fig.data[0].kind, TraceKind::Pie);
    assert_eq!(fig.data[0].attrs["labels"], json!(["a", "b"]));
    assert!(fig.layout.get("xaxis").is_none());
}

#[test]
fn px_rejects_data_frames() {
    let err = run("import plotly.express as px\nfig = px.bar({'a': [1]}, x='a')").unwrap_err();
    assert!(matches!(err, ChartError::NotAllowed { line: 2, .. }));
}

// =============================================================================
// SANDBOX
// =============================================================================

#[test]
fn foreign_imports_rejected() {
    let err = run("import os").unwrap_err();
    assert!(matches!(err, ChartError::NotAllowed { line: 1, .. }));
    assert_eq!(err.error_code(), "E_CHART_NOT_ALLOWED");
    assert!(err.to_string().contains("'os'"));

    assert!(matches!(run("from subprocess import run").unwrap_err(), ChartError::NotAllowed { .. }));
    assert!(matches!(run("import plotly.io as pio").unwrap_err(), ChartError::NotAllowed { .. }));
}

#[test]
fn dangerous_builtins_unavailable() {
    assert!(matches!(run("data = open('/etc/passwd')").unwrap_err(), ChartError::NotAllowed { .. }));
    assert!(matches!(run("eval('1')").unwrap_err(), ChartError::NotAllowed { .. }));
}

#[test]
fn file_output_methods_rejected() {
    let err = run("import plotly.graph_objects as go\nfig = go.Figure()\nfig.write_html('out.html')").unwrap_err();
    assert!(matches!(err, ChartError::NotAllowed { line: 3, .. }));
}

#[test]
fn module_attributes_outside_allowlist_rejected() {
    let err = run("import plotly.graph_objects as go\nfig = go.Sunburst()").unwrap_err();
    assert!(matches!(err, ChartError::NotAllowed { .. }));
}

#[test]
fn each_execution_has_a_fresh_scope() {
    assert!(run("x = 1").is_ok());
    let err = run("fig = x").unwrap_err();
    assert_eq!(err, ChartError::UndefinedName { line: 1, name: "x".into() });
}

// =============================================================================
// BUILTINS AND OPERATORS
// =============================================================================

#[test]
fn pure_builtins() {
    let scope = run(
        r"
vals = [1, 2, 3]
total = sum(vals)
n = len(vals)
half = round(2.5)
top = max(vals)
low = min(4, 9)
seq = list(range(3))
last = vals[-1]
opts = dict(a=1)
",
    )
    .unwrap();
    assert_eq!(scope.get("total"), Some(&Value::Number(6.0)));
    assert_eq!(scope.get("n"), Some(&Value::Number(3.0)));
    assert_eq!(scope.get("half"), Some(&Value::Number(2.0)));
    assert_eq!(scope.get("top"), Some(&Value::Number(3.0)));
    assert_eq!(scope.get("low"), Some(&Value::Number(4.0)));
    assert_eq!(
        scope.get("seq"),
        Some(&Value::List(vec![Value::Number(0.0), Value::Number(1.0), Value::Number(2.0)]))
    );
    assert_eq!(scope.get("last"), Some(&Value::Number(3.0)));
    assert_eq!(scope.get("opts"), Some(&Value::Dict(vec![("a".into(), Value::Number(1.0))])));
}

#[test]
fn division_by_zero_is_a_type_error() {
    assert!(matches!(run("x = 1 / 0").unwrap_err(), ChartError::Type { .. }));
}

#[test]
fn mismatched_operands_rejected() {
    assert!(matches!(run("x = 'a' + 1").unwrap_err(), ChartError::Type { .. }));
}

#[test]
fn oversized_collections_hit_the_limit() {
    assert!(matches!(run("x = [0] * 20000").unwrap_err(), ChartError::Limit(_)));
    assert!(matches!(run("x = range(50000)").unwrap_err(), ChartError::Limit(_)));
}

#[test]
fn list_repetition_copies_elements() {
    let scope = run("x = [1, 2] * 3\ny = 2 * ['a']").unwrap();
    let n = |v: f64| Value::Number(v);
    assert_eq!(scope.get("x"), Some(&Value::List(vec![n(1.0), n(2.0), n(1.0), n(2.0), n(1.0), n(2.0)])));
    assert_eq!(scope.get("y"), Some(&Value::List(vec![Value::Str("a".into()), Value::Str("a".into())])));
}

#[test]
fn string_concatenation_is_capped() {
    let mut code = String::from("s = 'x' * 10000\n");
    for _ in 0..10 {
        code.push_str("s = s + s\n");
    }
    assert!(matches!(run(&code).unwrap_err(), ChartError::Limit(_)));
    assert!(run("s = 'x' * 5000\ns = s + s").is_ok());
}

#[test]
fn nested_repetition_is_capped_by_deep_size() {
    let err = run("a = [1] * 10000\nb = [a] * 10000").unwrap_err();
    assert!(matches!(err, ChartError::Limit(_)));
    let err = run("a = [[]] * 10000\nb = [a] * 100").unwrap_err();
    assert!(matches!(err, ChartError::Limit(_)));
}

#[test]
fn nested_literals_are_capped_by_deep_size() {
    let code = format!("a = [1] * 10000\nb = [{}]", ["a"; 20].join(", "));
    assert!(matches!(run(&code).unwrap_err(), ChartError::Limit(_)));
}

#[test]
fn values_nesting_is_capped() {
    let code = "a = 1\n".to_string() + &"a = [a]\n".repeat(40);
    assert!(matches!(run(&code).unwrap_err(), ChartError::Limit(_)));
}

#[test]
fn repeated_copies_exhaust_the_execution_budget() {
    let code = "a = [1] * 10000\n".to_string() + &"b = [a, a, a, a, a]\n".repeat(60);
    let err = run(&code).unwrap_err();
    assert!(matches!(&err, ChartError::Limit(msg) if msg.contains("budget")), "{err}");
}

#[test]
fn statement_budget_enforced() {
    let code = "x = 1\n".repeat(501);
    assert!(matches!(run(&code).unwrap_err(), ChartError::Limit(_)));
}

#[test]
fn missing_fig_binding_yields_none() {
    let mut scope = run("import plotly.graph_objects as go\nchart = go.Figure()").unwrap();
    assert!(scope.take_figure("fig").is_none());
    assert!(scope.take_figure("chart").is_some());
}
