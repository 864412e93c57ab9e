//! Evaluator for parsed chart programs.
//!
//! The only reachable capabilities are the allowlisted Plotly constructors,
//! figure methods, and pure builtins below. Every program runs against its own
//! [`Scope`]; nothing survives between executions.

use std::collections::HashMap;

use serde_json::{Map, Number, Value as Json};

use super::ChartError;
use super::ast::{BinOp, Expr, Program, Stmt};
use super::figure::{Figure, Trace, TraceKind};

const MAX_STATEMENTS: usize = 500;
/// Items in one list, or bytes in one string.
const MAX_COLLECTION_LEN: usize = 10_000;
/// Deep size of one value: every nested item plus string bytes.
const MAX_VALUE_CELLS: usize = 100_000;
const MAX_VALUE_DEPTH: usize = 32;
/// Cells built or copied over a whole execution.
const MAX_ALLOCATED_CELLS: usize = 5_000_000;

/// Names that exist in Python but must never resolve here.
const FORBIDDEN_NAMES: &[&str] = &[
    "open", "exec", "eval", "compile", "__import__", "globals", "locals", "vars", "getattr", "setattr", "delattr",
    "input", "breakpoint", "exit", "quit", "__builtins__",
];

// =============================================================================
// VALUES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Module {
    Plotly,
    GraphObjects,
    Express,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Builtin {
    Dict,
    List,
    Range,
    Len,
    Sum,
    Min,
    Max,
    Round,
    Print,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PxChart {
    Bar,
    Line,
    Scatter,
    Pie,
    Histogram,
    Funnel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Function {
    Builtin(Builtin),
    GoFigure,
    GoLayout,
    GoTrace(TraceKind),
    Px(PxChart),
}

/// A runtime value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    None,
    Bool(bool),
    Number(f64),
    Str(String),
    List(Vec<Value>),
    Dict(Vec<(String, Value)>),
    Module(Module),
    Function(Function),
    Trace(Trace),
    Figure(Figure),
}

impl Value {
    #[must_use]
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::None => "NoneType",
            Self::Bool(_) => "bool",
            Self::Number(_) => "number",
            Self::Str(_) => "str",
            Self::List(_) => "list",
            Self::Dict(_) => "dict",
            Self::Module(_) => "module",
            Self::Function(_) => "function",
            Self::Trace(_) => "trace",
            Self::Figure(_) => "Figure",
        }
    }
}

// =============================================================================
// SCOPE
// =============================================================================

/// Variable bindings for one execution.
#[derive(Debug, Default)]
pub struct Scope {
    vars: HashMap<String, Value>,
}

impl Scope {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.vars.get(name)
    }

    /// Remove `name` and return it if it is bound to a figure.
    pub fn take_figure(&mut self, name: &str) -> Option<Figure> {
        match self.vars.remove(name)? {
            Value::Figure(figure) => Some(figure),
            _ => None,
        }
    }

    fn bind(&mut self, name: &str, value: Value) {
        self.vars.insert(name.to_string(), value);
    }
}

/// Run every statement of `program` against `scope`.
///
/// # Errors
///
/// Returns the first [`ChartError`] raised; bindings made before the failing
/// statement remain in `scope`.
pub fn execute(program: &Program, scope: &mut Scope) -> Result<(), ChartError> {
    if program.statements.len() > MAX_STATEMENTS {
        return Err(ChartError::Limit(format!(
            "{} statements exceeds the limit of {MAX_STATEMENTS}",
            program.statements.len()
        )));
    }
    let mut interp = Interpreter { scope, line: 0, allocated: 0 };
    for stmt in &program.statements {
        interp.line = stmt.line();
        interp.statement(stmt)?;
    }
    Ok(())
}

struct Interpreter<'a> {
    scope: &'a mut Scope,
    line: usize,
    allocated: usize,
}

impl Interpreter<'_> {
    // =========================================================================
    // STATEMENTS
    // =========================================================================

    fn statement(&mut self, stmt: &Stmt) -> Result<(), ChartError> {
        match stmt {
            Stmt::Import { module, alias, .. } => {
                let resolved = self.import_module(module)?;
                match alias {
                    Some(alias) => self.scope.bind(alias, Value::Module(resolved)),
                    None => self.scope.bind("plotly", Value::Module(Module::Plotly)),
                }
            }
            Stmt::FromImport { module, names, .. } => {
                let resolved = self.import_module(module)?;
                for name in names {
                    let value = self.module_attr(resolved, &name.name)?;
                    self.scope.bind(name.binding(), value);
                }
            }
            Stmt::Assign { targets, value, .. } => {
                let value = self.eval(value)?;
                if let [target] = targets.as_slice() {
                    self.scope.bind(target, value);
                } else {
                    let items = match value {
                        Value::List(items) => items,
                        other => {
                            return Err(self.type_error(format!("cannot unpack non-sequence {}", other.type_name())));
                        }
                    };
                    if items.len() != targets.len() {
                        return Err(self.type_error(format!(
                            "cannot unpack {} values into {} names",
                            items.len(),
                            targets.len()
                        )));
                    }
                    for (target, item) in targets.iter().zip(items) {
                        self.scope.bind(target, item);
                    }
                }
            }
            Stmt::Expr { expr, .. } => {
                self.eval(expr)?;
            }
        }
        Ok(())
    }

    fn import_module(&self, path: &str) -> Result<Module, ChartError> {
        match path {
            "plotly" => Ok(Module::Plotly),
            "plotly.graph_objects" | "plotly.graph_objs" => Ok(Module::GraphObjects),
            "plotly.express" => Ok(Module::Express),
            other => Err(self.not_allowed(format!(
                "import of module '{other}' is not allowed (only plotly.graph_objects and plotly.express)"
            ))),
        }
    }

    fn module_attr(&self, module: Module, attr: &str) -> Result<Value, ChartError> {
        let found = match module {
            Module::Plotly => match attr {
                "graph_objects" | "graph_objs" => Some(Value::Module(Module::GraphObjects)),
                "express" => Some(Value::Module(Module::Express)),
                _ => None,
            },
            Module::GraphObjects => match attr {
                "Figure" => Some(Value::Function(Function::GoFigure)),
                "Layout" => Some(Value::Function(Function::GoLayout)),
                "Bar" | "Scatter" | "Pie" | "Histogram" | "Box" | "Heatmap" | "Funnel" => {
                    TraceKind::from_name(attr).map(|kind| Value::Function(Function::GoTrace(kind)))
                }
                _ => None,
            },
            Module::Express => {
                let chart = match attr {
                    "bar" => Some(PxChart::Bar),
                    "line" => Some(PxChart::Line),
                    "scatter" => Some(PxChart::Scatter),
                    "pie" => Some(PxChart::Pie),
                    "histogram" => Some(PxChart::Histogram),
                    "funnel" => Some(PxChart::Funnel),
                    _ => None,
                };
                chart.map(|c| Value::Function(Function::Px(c)))
            }
        };
        found.ok_or_else(|| self.not_allowed(format!("'{}.{attr}' is not available", module_name(module))))
    }

    // =========================================================================
    // EXPRESSIONS
    // =========================================================================

    fn eval(&mut self, expr: &Expr) -> Result<Value, ChartError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Str(s) => Ok(Value::Str(s.clone())),
            Expr::Bool(b) => Ok(Value::Bool(*b)),
            Expr::None => Ok(Value::None),
            Expr::List(items) | Expr::Tuple(items) => {
                let values = items
                    .iter()
                    .map(|item| self.eval(item))
                    .collect::<Result<Vec<_>, _>>()?;
                self.admit(Value::List(values))
            }
            Expr::Dict(entries) => {
                let mut out: Vec<(String, Value)> = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = match self.eval(key)? {
                        Value::Str(s) => s,
                        Value::Number(n) => format_number(n),
                        other => return Err(self.type_error(format!("unsupported dict key type {}", other.type_name()))),
                    };
                    let value = self.eval(value)?;
                    dict_insert(&mut out, key, value);
                }
                self.admit(Value::Dict(out))
            }
            Expr::Name(name) => self.lookup(name),
            Expr::Attr { value, attr } => {
                let target = self.eval(value)?;
                self.attribute(target, attr)
            }
            Expr::Call { func, args, kwargs } => {
                let value = self.eval_call(func, args, kwargs)?;
                self.admit(value)
            }
            Expr::Index { value, index } => {
                let target = self.eval(value)?;
                let index = self.eval(index)?;
                self.index(target, &index)
            }
            Expr::Neg(inner) => match self.eval(inner)? {
                Value::Number(n) => Ok(Value::Number(-n)),
                other => Err(self.type_error(format!("bad operand type for unary -: {}", other.type_name()))),
            },
            Expr::Binary { op, left, right } => {
                let left = self.eval(left)?;
                let right = self.eval(right)?;
                let value = self.binary(*op, left, right)?;
                self.admit(value)
            }
        }
    }

    fn lookup(&mut self, name: &str) -> Result<Value, ChartError> {
        if let Some(value) = self.scope.get(name).cloned() {
            self.charge(footprint(&value).cells)?;
            return Ok(value);
        }
        if FORBIDDEN_NAMES.contains(&name) {
            return Err(self.not_allowed(format!("'{name}' is not available")));
        }
        let builtin = match name {
            "dict" => Builtin::Dict,
            "list" => Builtin::List,
            "range" => Builtin::Range,
            "len" => Builtin::Len,
            "sum" => Builtin::Sum,
            "min" => Builtin::Min,
            "max" => Builtin::Max,
            "round" => Builtin::Round,
            "print" => Builtin::Print,
            _ => return Err(ChartError::UndefinedName { line: self.line, name: name.to_string() }),
        };
        Ok(Value::Function(Function::Builtin(builtin)))
    }

    fn attribute(&self, target: Value, attr: &str) -> Result<Value, ChartError> {
        match target {
            Value::Module(module) => self.module_attr(module, attr),
            Value::Figure(_) => Err(self.not_allowed(format!(
                "Figure attribute '{attr}' is not available; use update_layout/update_traces"
            ))),
            other => Err(self.type_error(format!("'{}' object has no attribute '{attr}'", other.type_name()))),
        }
    }

    fn eval_call(&mut self, func: &Expr, args: &[Expr], kwargs: &[(String, Expr)]) -> Result<Value, ChartError> {
        let (arg_values, kwarg_values) = self.eval_arguments(args, kwargs)?;

        if let Expr::Attr { value: receiver, attr } = func {
            let target = self.eval(receiver)?;
            if let Value::Figure(mut figure) = target {
                self.figure_method(&mut figure, attr, arg_values, kwarg_values)?;
                if let Expr::Name(name) = receiver.as_ref() {
                    self.scope.bind(name, Value::Figure(figure.clone()));
                }
                return Ok(if attr == "show" { Value::None } else { Value::Figure(figure) });
            }
            let callee = self.attribute(target, attr)?;
            return self.call(callee, arg_values, kwarg_values);
        }

        let callee = self.eval(func)?;
        self.call(callee, arg_values, kwarg_values)
    }

    fn eval_arguments(
        &mut self,
        args: &[Expr],
        kwargs: &[(String, Expr)],
    ) -> Result<(Vec<Value>, Vec<(String, Value)>), ChartError> {
        let arg_values = args
            .iter()
            .map(|a| self.eval(a))
            .collect::<Result<Vec<_>, _>>()?;
        let mut kwarg_values = Vec::with_capacity(kwargs.len());
        for (name, expr) in kwargs {
            kwarg_values.push((name.clone(), self.eval(expr)?));
        }
        Ok((arg_values, kwarg_values))
    }

    fn call(&self, callee: Value, args: Vec<Value>, kwargs: Vec<(String, Value)>) -> Result<Value, ChartError> {
        match callee {
            Value::Function(Function::Builtin(builtin)) => self.builtin(builtin, args, kwargs),
            Value::Function(Function::GoFigure) => self.go_figure(args, kwargs),
            Value::Function(Function::GoLayout) => {
                let mut layout = match args.into_iter().next() {
                    None | Some(Value::None) => Vec::new(),
                    Some(Value::Dict(entries)) => entries,
                    Some(other) => return Err(self.type_error(format!("Layout() expects a dict, got {}", other.type_name()))),
                };
                for (key, value) in kwargs {
                    dict_insert(&mut layout, key, value);
                }
                Ok(Value::Dict(layout))
            }
            Value::Function(Function::GoTrace(kind)) => {
                if !args.is_empty() {
                    return Err(self.type_error(format!(
                        "{}() takes keyword arguments only",
                        capitalize(kind.as_str())
                    )));
                }
                let mut trace = Trace::new(kind);
                for (key, value) in kwargs {
                    trace.set(&key, self.to_json(&value)?);
                }
                Ok(Value::Trace(trace))
            }
            Value::Function(Function::Px(chart)) => self.px_chart(chart, args, kwargs),
            other => Err(self.type_error(format!("'{}' object is not callable", other.type_name()))),
        }
    }

    // =========================================================================
    // PLOTLY SURFACE
    // =========================================================================

    fn go_figure(&self, args: Vec<Value>, kwargs: Vec<(String, Value)>) -> Result<Value, ChartError> {
        let mut args = args.into_iter();
        let mut data = args.next().unwrap_or(Value::None);
        let mut layout = args.next().unwrap_or(Value::None);
        if args.next().is_some() {
            return Err(self.type_error("Figure() takes at most 2 positional arguments"));
        }

        let mut figure = Figure::new();
        let mut layout_overrides = Vec::new();
        for (key, value) in kwargs {
            match key.as_str() {
                "data" => data = value,
                "layout" => layout = value,
                _ => {
                    if let Some(rest) = key.strip_prefix("layout_") {
                        layout_overrides.push((rest.to_string(), value));
                    } else {
                        return Err(self.type_error(format!("Figure() got an unexpected keyword argument '{key}'")));
                    }
                }
            }
        }

        match data {
            Value::None => {}
            Value::List(items) => {
                for item in items {
                    figure.add_trace(self.to_trace(item)?);
                }
            }
            single => figure.add_trace(self.to_trace(single)?),
        }

        match layout {
            Value::None => {}
            Value::Dict(entries) => {
                for (key, value) in entries {
                    figure.update_layout(&key, self.to_json(&value)?);
                }
            }
            other => return Err(self.type_error(format!("layout must be a dict or go.Layout, got {}", other.type_name()))),
        }
        for (key, value) in layout_overrides {
            figure.update_layout(&key, self.to_json(&value)?);
        }

        Ok(Value::Figure(figure))
    }

    fn figure_method(
        &self,
        figure: &mut Figure,
        method: &str,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
    ) -> Result<(), ChartError> {
        match method {
            "add_trace" => {
                let trace = args
                    .into_iter()
                    .next()
                    .or_else(|| kwargs.iter().find(|(k, _)| k == "trace").map(|(_, v)| v.clone()))
                    .ok_or_else(|| self.type_error("add_trace() missing required argument 'trace'"))?;
                figure.add_trace(self.to_trace(trace)?);
            }
            "add_traces" => {
                let Some(Value::List(items)) = args.into_iter().next() else {
                    return Err(self.type_error("add_traces() expects a list of traces"));
                };
                for item in items {
                    figure.add_trace(self.to_trace(item)?);
                }
            }
            "update_layout" => {
                for (key, value) in self.merged_updates(args, kwargs, method)? {
                    figure.update_layout(&key, self.to_json(&value)?);
                }
            }
            "update_xaxes" | "update_yaxes" => {
                let axis = if method == "update_xaxes" { "xaxis" } else { "yaxis" };
                for (key, value) in self.merged_updates(args, kwargs, method)? {
                    figure.update_layout(&format!("{axis}_{key}"), self.to_json(&value)?);
                }
            }
            "update_traces" => {
                for (key, value) in self.merged_updates(args, kwargs, method)? {
                    figure.update_traces(&key, &self.to_json(&value)?);
                }
            }
            "show" => {}
            "write_html" | "write_image" | "write_json" | "to_html" | "to_image" => {
                return Err(self.not_allowed(format!("Figure.{method}() is not available")));
            }
            other => return Err(self.type_error(format!("'Figure' object has no method '{other}'"))),
        }
        Ok(())
    }

    /// `update_*` accepts an optional positional dict followed by keywords.
    fn merged_updates(
        &self,
        args: Vec<Value>,
        kwargs: Vec<(String, Value)>,
        method: &str,
    ) -> Result<Vec<(String, Value)>, ChartError> {
        let mut updates = match args.into_iter().next() {
            None | Some(Value::None) => Vec::new(),
            Some(Value::Dict(entries)) => entries,
            Some(other) => {
                return Err(self.type_error(format!("{method}() expects a dict, got {}", other.type_name())));
            }
        };
        updates.extend(kwargs);
        Ok(updates)
    }

    fn px_chart(&self, chart: PxChart, args: Vec<Value>, kwargs: Vec<(String, Value)>) -> Result<Value, ChartError> {
        let frame_given = args.first().is_some_and(|v| *v != Value::None)
            || kwargs.iter().any(|(k, v)| k == "data_frame" && *v != Value::None);
        if frame_given {
            return Err(self.not_allowed("data frames are not supported; pass x= and y= (or names=/values=) as lists"));
        }

        let (kind, mode) = match chart {
            PxChart::Bar => (TraceKind::Bar, None),
            PxChart::Line => (TraceKind::Scatter, Some("lines")),
            PxChart::Scatter => (TraceKind::Scatter, Some("markers")),
            PxChart::Pie => (TraceKind::Pie, None),
            PxChart::Histogram => (TraceKind::Histogram, None),
            PxChart::Funnel => (TraceKind::Funnel, None),
        };
        let mut trace = Trace::new(kind);
        if let Some(mode) = mode {
            trace.set("mode", Json::String(mode.into()));
        }

        let mut figure = Figure::new();
        let mut labels: Vec<(String, Value)> = Vec::new();
        let mut has_x = false;
        let mut has_y = false;
        for (key, value) in kwargs {
            match key.as_str() {
                "x" | "y" | "text" | "orientation" | "hole" | "opacity" => {
                    has_x |= key == "x";
                    has_y |= key == "y";
                    trace.set(&key, self.to_json(&value)?);
                }
                "names" => trace.set("labels", self.to_json(&value)?),
                "values" => trace.set("values", self.to_json(&value)?),
                "nbins" => trace.set("nbinsx", self.to_json(&value)?),
                "title" => figure.update_layout("title_text", self.to_json(&value)?),
                "height" | "width" | "template" => figure.update_layout(&key, self.to_json(&value)?),
                "color_discrete_sequence" => figure.update_layout("colorway", self.to_json(&value)?),
                "labels" => match value {
                    Value::Dict(entries) => labels = entries,
                    Value::None => {}
                    other => return Err(self.type_error(format!("labels must be a dict, got {}", other.type_name()))),
                },
                // Column-mapping arguments need a data frame; lists carry no column names.
                _ => {}
            }
        }

        if kind != TraceKind::Pie {
            if has_x {
                let label = label_for(&labels, "x");
                figure.update_layout("xaxis_title_text", Json::String(label));
            }
            if has_y {
                let label = label_for(&labels, "y");
                figure.update_layout("yaxis_title_text", Json::String(label));
            } else if kind == TraceKind::Histogram {
                figure.update_layout("yaxis_title_text", Json::String("count".into()));
            }
        }
        figure.add_trace(trace);
        Ok(Value::Figure(figure))
    }

    fn to_trace(&self, value: Value) -> Result<Trace, ChartError> {
        match value {
            Value::Trace(trace) => Ok(trace),
            Value::Dict(entries) => {
                let kind = match entries.iter().find(|(k, _)| k == "type") {
                    None => TraceKind::Scatter,
                    Some((_, Value::Str(name))) => TraceKind::from_name(name)
                        .ok_or_else(|| self.not_allowed(format!("trace type '{name}' is not supported")))?,
                    Some((_, other)) => {
                        return Err(self.type_error(format!("trace type must be a string, got {}", other.type_name())));
                    }
                };
                let mut trace = Trace::new(kind);
                for (key, value) in entries {
                    trace.set(&key, self.to_json(&value)?);
                }
                Ok(trace)
            }
            other => Err(self.type_error(format!("expected a trace, got {}", other.type_name()))),
        }
    }

    // =========================================================================
    // BUILTINS
    // =========================================================================

    fn builtin(&self, builtin: Builtin, args: Vec<Value>, kwargs: Vec<(String, Value)>) -> Result<Value, ChartError> {
        if builtin != Builtin::Dict && builtin != Builtin::Print && !kwargs.is_empty() {
            return Err(self.type_error(format!("{}() takes no keyword arguments", builtin_name(builtin))));
        }
        match builtin {
            Builtin::Dict => {
                let mut out = match args.into_iter().next() {
                    None => Vec::new(),
                    Some(Value::Dict(entries)) => entries,
                    Some(Value::List(pairs)) => {
                        let mut out = Vec::with_capacity(pairs.len());
                        for pair in pairs {
                            match pair {
                                Value::List(kv) if kv.len() == 2 => {
                                    let mut kv = kv.into_iter();
                                    let (Some(Value::Str(k)), Some(v)) = (kv.next(), kv.next()) else {
                                        return Err(self.type_error("dict() keys must be strings"));
                                    };
                                    dict_insert(&mut out, k, v);
                                }
                                _ => return Err(self.type_error("dict() expects (key, value) pairs")),
                            }
                        }
                        out
                    }
                    Some(other) => return Err(self.type_error(format!("dict() cannot convert {}", other.type_name()))),
                };
                for (key, value) in kwargs {
                    dict_insert(&mut out, key, value);
                }
                Ok(Value::Dict(out))
            }
            Builtin::List => match args.into_iter().next() {
                None => Ok(Value::List(Vec::new())),
                Some(Value::List(items)) => Ok(Value::List(items)),
                Some(Value::Dict(entries)) => Ok(Value::List(entries.into_iter().map(|(k, _)| Value::Str(k)).collect())),
                Some(other) => Err(self.type_error(format!("'{}' object is not iterable", other.type_name()))),
            },
            Builtin::Range => self.range(&args),
            Builtin::Len => match args.as_slice() {
                [Value::List(items)] => Ok(Value::Number(count_as_f64(items.len()))),
                [Value::Dict(entries)] => Ok(Value::Number(count_as_f64(entries.len()))),
                [Value::Str(s)] => Ok(Value::Number(count_as_f64(s.chars().count()))),
                _ => Err(self.type_error("len() expects one sized argument")),
            },
            Builtin::Sum => {
                let mut args = args.into_iter();
                let Some(Value::List(items)) = args.next() else {
                    return Err(self.type_error("sum() expects a list"));
                };
                let mut total = match args.next() {
                    None => 0.0,
                    Some(Value::Number(start)) => start,
                    Some(other) => return Err(self.type_error(format!("sum() start must be a number, got {}", other.type_name()))),
                };
                for item in items {
                    total += self.number(&item)?;
                }
                Ok(Value::Number(total))
            }
            Builtin::Min | Builtin::Max => {
                let items = match <[Value; 1]>::try_from(args) {
                    Ok([Value::List(items)]) => items,
                    Ok([single]) => vec![single],
                    Err(args) => args,
                };
                let mut best: Option<f64> = None;
                for item in &items {
                    let n = self.number(item)?;
                    best = Some(match best {
                        None => n,
                        Some(b) if builtin == Builtin::Min => b.min(n),
                        Some(b) => b.max(n),
                    });
                }
                best.map(Value::Number)
                    .ok_or_else(|| self.type_error(format!("{}() arg is an empty sequence", builtin_name(builtin))))
            }
            Builtin::Round => {
                let (value, digits) = match args.as_slice() {
                    [v] => (self.number(v)?, 0),
                    [v, Value::Number(d)] => (self.number(v)?, self.integer(*d)?),
                    _ => return Err(self.type_error("round() expects a number and optional digits")),
                };
                let digits = i32::try_from(digits).map_err(|_| self.type_error("round() digits out of range"))?;
                let scale = 10f64.powi(digits);
                Ok(Value::Number((value * scale).round_ties_even() / scale))
            }
            Builtin::Print => Ok(Value::None),
        }
    }

    fn range(&self, args: &[Value]) -> Result<Value, ChartError> {
        let nums = args
            .iter()
            .map(|a| self.number(a).and_then(|n| self.integer(n)))
            .collect::<Result<Vec<_>, _>>()?;
        let (start, stop, step) = match nums.as_slice() {
            [stop] => (0, *stop, 1),
            [start, stop] => (*start, *stop, 1),
            [start, stop, step] => (*start, *stop, *step),
            _ => return Err(self.type_error("range() expects 1 to 3 integer arguments")),
        };
        if step == 0 {
            return Err(self.type_error("range() arg 3 must not be zero"));
        }
        let mut out = Vec::new();
        let mut current = start;
        while (step > 0 && current < stop) || (step < 0 && current > stop) {
            if out.len() >= MAX_COLLECTION_LEN {
                return Err(collection_limit());
            }
            out.push(Value::Number(integer_as_f64(current)));
            current += step;
        }
        Ok(Value::List(out))
    }

    // =========================================================================
    // OPERATORS
    // =========================================================================

    fn binary(&self, op: BinOp, left: Value, right: Value) -> Result<Value, ChartError> {
        match (op, left, right) {
            (BinOp::Add, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a + b)),
            (BinOp::Sub, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a - b)),
            (BinOp::Mul, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a * b)),
            (BinOp::Div, Value::Number(_), Value::Number(b)) if b == 0.0 => {
                Err(self.type_error("ZeroDivisionError: division by zero"))
            }
            (BinOp::Div, Value::Number(a), Value::Number(b)) => Ok(Value::Number(a / b)),
            (BinOp::Add, Value::Str(a), Value::Str(b)) => {
                if a.len() + b.len() > MAX_COLLECTION_LEN {
                    return Err(collection_limit());
                }
                Ok(Value::Str(a + &b))
            }
            (BinOp::Add, Value::List(mut a), Value::List(b)) => {
                if a.len() + b.len() > MAX_COLLECTION_LEN {
                    return Err(collection_limit());
                }
                a.extend(b);
                Ok(Value::List(a))
            }
            (BinOp::Mul, Value::List(items), Value::Number(n)) | (BinOp::Mul, Value::Number(n), Value::List(items)) => {
                let times = usize::try_from(self.integer(n)?.max(0)).map_err(|_| collection_limit())?;
                let per_copy = items.iter().map(|item| footprint(item).cells).fold(0, usize::saturating_add);
                if items.len().saturating_mul(times) > MAX_COLLECTION_LEN || per_copy.saturating_mul(times) > MAX_VALUE_CELLS
                {
                    return Err(collection_limit());
                }
                Ok(Value::List(std::iter::repeat_n(items, times).flatten().collect()))
            }
            (BinOp::Mul, Value::Str(s), Value::Number(n)) | (BinOp::Mul, Value::Number(n), Value::Str(s)) => {
                let times = usize::try_from(self.integer(n)?.max(0)).map_err(|_| collection_limit())?;
                if s.len().saturating_mul(times) > MAX_COLLECTION_LEN {
                    return Err(collection_limit());
                }
                Ok(Value::Str(s.repeat(times)))
            }
            (op, left, right) => Err(self.type_error(format!(
                "unsupported operand types for {}: '{}' and '{}'",
                op_symbol(op),
                left.type_name(),
                right.type_name()
            ))),
        }
    }

    fn index(&self, target: Value, index: &Value) -> Result<Value, ChartError> {
        match (target, index) {
            (Value::List(items), Value::Number(n)) => {
                let i = self.integer(*n)?;
                let len = i64::try_from(items.len()).map_err(|_| collection_limit())?;
                let resolved = if i < 0 { i + len } else { i };
                usize::try_from(resolved)
                    .ok()
                    .and_then(|idx| items.into_iter().nth(idx))
                    .ok_or_else(|| self.type_error("IndexError: list index out of range"))
            }
            (Value::Dict(entries), Value::Str(key)) => entries
                .into_iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v)
                .ok_or_else(|| self.type_error(format!("KeyError: '{key}'"))),
            (target, index) => Err(self.type_error(format!(
                "'{}' object is not subscriptable with {}",
                target.type_name(),
                index.type_name()
            ))),
        }
    }

    // =========================================================================
    // CONVERSIONS
    // =========================================================================

    fn number(&self, value: &Value) -> Result<f64, ChartError> {
        match value {
            Value::Number(n) => Ok(*n),
            Value::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
            other => Err(self.type_error(format!("expected a number, got {}", other.type_name()))),
        }
    }

    #[allow(clippy::cast_possible_truncation)]
    fn integer(&self, n: f64) -> Result<i64, ChartError> {
        if n.fract() != 0.0 || !n.is_finite() || n.abs() > 9.0e15 {
            return Err(self.type_error(format!("expected an integer, got {n}")));
        }
        Ok(n as i64)
    }

    fn to_json(&self, value: &Value) -> Result<Json, ChartError> {
        match value {
            Value::None => Ok(Json::Null),
            Value::Bool(b) => Ok(Json::Bool(*b)),
            Value::Number(n) => Ok(number_to_json(*n)),
            Value::Str(s) => Ok(Json::String(s.clone())),
            Value::List(items) => items
                .iter()
                .map(|item| self.to_json(item))
                .collect::<Result<Vec<_>, _>>()
                .map(Json::Array),
            Value::Dict(entries) => {
                let mut obj = Map::new();
                for (key, value) in entries {
                    obj.insert(key.clone(), self.to_json(value)?);
                }
                Ok(Json::Object(obj))
            }
            Value::Trace(trace) => Ok(trace.to_json()),
            other => Err(self.type_error(format!("{} cannot be used as chart data", other.type_name()))),
        }
    }

    // =========================================================================
    // BUDGET
    // =========================================================================

    /// Check a freshly built value against the per-value caps and charge it
    /// to the execution budget.
    fn admit(&mut self, value: Value) -> Result<Value, ChartError> {
        let size = footprint(&value);
        if size.depth > MAX_VALUE_DEPTH {
            return Err(ChartError::Limit(format!("values may nest at most {MAX_VALUE_DEPTH} levels")));
        }
        if size.cells > MAX_VALUE_CELLS {
            return Err(ChartError::Limit(format!("a single value is limited to {MAX_VALUE_CELLS} cells")));
        }
        self.charge(size.cells)?;
        Ok(value)
    }

    fn charge(&mut self, cells: usize) -> Result<(), ChartError> {
        self.allocated = self.allocated.saturating_add(cells);
        if self.allocated > MAX_ALLOCATED_CELLS {
            return Err(ChartError::Limit(format!(
                "execution exceeded its budget of {MAX_ALLOCATED_CELLS} allocated cells"
            )));
        }
        Ok(())
    }

    fn type_error(&self, message: impl Into<String>) -> ChartError {
        ChartError::Type { line: self.line, message: message.into() }
    }

    fn not_allowed(&self, message: impl Into<String>) -> ChartError {
        ChartError::NotAllowed { line: self.line, message: message.into() }
    }
}

// =============================================================================
// HELPERS
// =============================================================================

fn dict_insert(entries: &mut Vec<(String, Value)>, key: String, value: Value) {
    if let Some(slot) = entries.iter_mut().find(|(k, _)| *k == key) {
        slot.1 = value;
    } else {
        entries.push((key, value));
    }
}

fn label_for(labels: &[(String, Value)], axis: &str) -> String {
    match labels.iter().find(|(k, _)| k == axis) {
        Some((_, Value::Str(label))) => label.clone(),
        _ => axis.to_string(),
    }
}

/// Integral values serialize as JSON integers so `[1, 2]` stays `[1, 2]`.
#[allow(clippy::cast_possible_truncation)]
fn number_to_json(n: f64) -> Json {
    if n.is_finite() && n.fract() == 0.0 && n.abs() < 9.0e15 {
        Json::from(n as i64)
    } else {
        Number::from_f64(n).map_or(Json::Null, Json::Number)
    }
}

#[allow(clippy::cast_possible_truncation)]
fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 9.0e15 { (n as i64).to_string() } else { n.to_string() }
}

#[allow(clippy::cast_precision_loss)]
fn count_as_f64(n: usize) -> f64 {
    n as f64
}

#[allow(clippy::cast_precision_loss)]
fn integer_as_f64(n: i64) -> f64 {
    n as f64
}

fn collection_limit() -> ChartError {
    ChartError::Limit(format!("collections and strings are limited to {MAX_COLLECTION_LEN} items"))
}

/// Deep size of a value and how deeply it nests.
#[derive(Debug, Clone, Copy)]
struct Footprint {
    cells: usize,
    depth: usize,
}

const LEAF: Footprint = Footprint { cells: 1, depth: 1 };

fn footprint(value: &Value) -> Footprint {
    match value {
        Value::Str(s) => Footprint { cells: 1 + s.len(), depth: 1 },
        Value::List(items) => enclosing(items.iter().map(footprint)),
        Value::Dict(entries) => enclosing(entries.iter().map(|(key, value)| keyed(key, footprint(value)))),
        Value::Trace(trace) => object_footprint(&trace.attrs),
        Value::Figure(figure) => enclosing(
            figure
                .data
                .iter()
                .map(|trace| object_footprint(&trace.attrs))
                .chain(std::iter::once(object_footprint(&figure.layout))),
        ),
        Value::None | Value::Bool(_) | Value::Number(_) | Value::Module(_) | Value::Function(_) => LEAF,
    }
}

fn json_footprint(value: &Json) -> Footprint {
    match value {
        Json::String(s) => Footprint { cells: 1 + s.len(), depth: 1 },
        Json::Array(items) => enclosing(items.iter().map(json_footprint)),
        Json::Object(map) => object_footprint(map),
        Json::Null | Json::Bool(_) | Json::Number(_) => LEAF,
    }
}

fn object_footprint(map: &Map<String, Json>) -> Footprint {
    enclosing(map.iter().map(|(key, value)| keyed(key, json_footprint(value))))
}

fn keyed(key: &str, value: Footprint) -> Footprint {
    Footprint { cells: value.cells.saturating_add(key.len()), depth: value.depth }
}

fn enclosing(children: impl Iterator<Item = Footprint>) -> Footprint {
    children.fold(LEAF, |acc, child| Footprint {
        cells: acc.cells.saturating_add(child.cells),
        depth: acc.depth.max(child.depth + 1),
    })
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars
        .next()
        .map(|first| first.to_ascii_uppercase().to_string() + chars.as_str())
        .unwrap_or_default()
}

fn module_name(module: Module) -> &'static str {
    match module {
        Module::Plotly => "plotly",
        Module::GraphObjects => "plotly.graph_objects",
        Module::Express => "plotly.express",
    }
}

fn builtin_name(builtin: Builtin) -> &'static str {
    match builtin {
        Builtin::Dict => "dict",
        Builtin::List => "list",
        Builtin::Range => "range",
        Builtin::Len => "len",
        Builtin::Sum => "sum",
        Builtin::Min => "min",
        Builtin::Max => "max",
        Builtin::Round => "round",
        Builtin::Print => "print",
    }
}

fn op_symbol(op: BinOp) -> &'static str {
    match op {
        BinOp::Add => "+",
        BinOp::Sub => "-",
        BinOp::Mul => "*",
        BinOp::Div => "/",
    }
}
