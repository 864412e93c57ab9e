//! Typed figure model mirroring Plotly's `{data, layout}` dictionary.

use serde_json::{Map, Value};

/// Compound Plotly properties that accept "magic underscore" paths, so
/// `xaxis_title_text` addresses `xaxis.title.text`.
const COMPOUND_PROPS: &[&str] = &[
    "title",
    "xaxis",
    "yaxis",
    "legend",
    "font",
    "marker",
    "line",
    "margin",
    "hoverlabel",
    "textfont",
    "uniformtext",
    "coloraxis",
    "colorbar",
];

/// Supported trace types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TraceKind {
    Bar,
    Scatter,
    Pie,
    Histogram,
    Box,
    Heatmap,
    Funnel,
}

impl TraceKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bar => "bar",
            Self::Scatter => "scatter",
            Self::Pie => "pie",
            Self::Histogram => "histogram",
            Self::Box => "box",
            Self::Heatmap => "heatmap",
            Self::Funnel => "funnel",
        }
    }

    /// Resolve a `graph_objects` constructor name (`"Bar"`) or a trace `type`
    /// string (`"bar"`).
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "bar" => Some(Self::Bar),
            "scatter" => Some(Self::Scatter),
            "pie" => Some(Self::Pie),
            "histogram" => Some(Self::Histogram),
            "box" => Some(Self::Box),
            "heatmap" => Some(Self::Heatmap),
            "funnel" => Some(Self::Funnel),
            _ => None,
        }
    }
}

/// One data series.
#[derive(Debug, Clone, PartialEq)]
pub struct Trace {
    pub kind: TraceKind,
    pub attrs: Map<String, Value>,
}

impl Trace {
    #[must_use]
    pub fn new(kind: TraceKind) -> Self {
        Self { kind, attrs: Map::new() }
    }

    /// Set an attribute, expanding magic-underscore paths.
    pub fn set(&mut self, key: &str, value: Value) {
        if key == "type" {
            return;
        }
        set_path(&mut self.attrs, key, value);
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.attrs.get("name").and_then(Value::as_str)
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut obj = self.attrs.clone();
        obj.insert("type".into(), Value::String(self.kind.as_str().into()));
        Value::Object(obj)
    }
}

/// A chart: traces plus layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Figure {
    pub data: Vec<Trace>,
    pub layout: Map<String, Value>,
}

impl Figure {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_trace(&mut self, trace: Trace) {
        self.data.push(trace);
    }

    /// Merge layout properties; nested objects merge, scalars overwrite.
    pub fn update_layout(&mut self, key: &str, value: Value) {
        set_path(&mut self.layout, key, value);
    }

    /// Apply the same property to every trace.
    pub fn update_traces(&mut self, key: &str, value: &Value) {
        for trace in &mut self.data {
            trace.set(key, value.clone());
        }
    }

    /// Layout title, whether given as a string or as `{text: ...}`.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        match self.layout.get("title")? {
            Value::String(s) => Some(s),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    /// Axis title for `"xaxis"` / `"yaxis"`.
    #[must_use]
    pub fn axis_title(&self, axis: &str) -> Option<&str> {
        match self.layout.get(axis)?.get("title")? {
            Value::String(s) => Some(s),
            Value::Object(obj) => obj.get("text").and_then(Value::as_str),
            _ => None,
        }
    }

    /// The Plotly figure dictionary: `{"data": [...], "layout": {...}}`.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let data = self.data.iter().map(Trace::to_json).collect();
        let mut root = Map::new();
        root.insert("data".into(), Value::Array(data));
        root.insert("layout".into(), Value::Object(self.layout.clone()));
        Value::Object(root)
    }
}

/// Compound prefixes followed in one key; the remainder is used verbatim.
const MAX_PATH_SEGMENTS: usize = 6;

/// Insert `value` at `key`, descending through compound-property prefixes
/// and deep-merging objects.
pub(crate) fn set_path(target: &mut Map<String, Value>, key: &str, value: Value) {
    set_path_within(target, key, value, MAX_PATH_SEGMENTS);
}

fn set_path_within(target: &mut Map<String, Value>, key: &str, value: Value, segments: usize) {
    if let Some((head, rest)) = key.split_once('_') {
        if segments > 0 && COMPOUND_PROPS.contains(&head) && !rest.is_empty() {
            let slot = target
                .entry(head.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
            if let Value::String(text) = &mut *slot {
                // `title="x"` is shorthand for `title.text`.
                let text = std::mem::take(text);
                let mut promoted = Map::new();
                promoted.insert("text".into(), Value::String(text));
                *slot = Value::Object(promoted);
            }
            if !slot.is_object() {
                *slot = Value::Object(Map::new());
            }
            if let Value::Object(inner) = slot {
                set_path_within(inner, rest, value, segments - 1);
            }
            return;
        }
    }
    merge_value(target, key, value);
}

fn merge_value(target: &mut Map<String, Value>, key: &str, value: Value) {
    if let Value::Object(incoming) = value {
        if let Some(Value::Object(existing)) = target.get_mut(key) {
            for (k, v) in incoming {
                merge_value(existing, &k, v);
            }
            return;
        }
        target.insert(key.to_string(), Value::Object(incoming));
        return;
    }
    target.insert(key.to_string(), value);
}

#[cfg(test)]
#[path = "figure_test.rs"]
mod tests;
