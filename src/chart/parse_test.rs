use super::*;
use crate::chart::ast::{BinOp, Expr, ImportName, Stmt};

fn parse_err(input: &str) -> ChartError {
    parse(input).unwrap_err()
}

// =============================================================================
// IMPORTS
// =============================================================================

#[test]
fn import_with_alias() {
    let program = parse("import plotly.graph_objects as go").unwrap();
    assert_eq!(
        program.statements,
        vec![Stmt::Import { module: "plotly.graph_objects".into(), alias: Some("go".into()), line: 1 }]
    );
}

#[test]
fn from_import_parenthesized_list() {
    let program = parse("from plotly.graph_objects import (\n    Figure,\n    Bar as B,\n)").unwrap();
    let Stmt::FromImport { module, names, .. } = &program.statements[0] else {
        panic!("expected FromImport");
    };
    assert_eq!(module, "plotly.graph_objects");
    assert_eq!(
        names,
        &vec![
            ImportName { name: "Figure".into(), alias: None },
            ImportName { name: "Bar".into(), alias: Some("B".into()) },
        ]
    );
    assert_eq!(names[1].binding(), "B");
}

#[test]
fn wildcard_import_rejected() {
    assert!(matches!(parse_err("from plotly.express import *"), ChartError::NotAllowed { .. }));
}

// =============================================================================
// STATEMENTS
// =============================================================================

#[test]
fn call_spanning_lines_is_one_statement() {
    let input = "fig = go.Figure(\n    data=[go.Bar(x=[1, 2], y=[3, 4])],\n)\nfig.show()";
    let program = parse(input).unwrap();
    assert_eq!(program.statements.len(), 2);
    assert!(matches!(&program.statements[0], Stmt::Assign { targets, .. } if targets == &vec!["fig".to_string()]));
    assert_eq!(program.statements[1].line(), 4);
}

#[test]
fn comments_and_blank_lines_skipped() {
    let program = parse("# header\n\nx = 1  # trailing\n\n").unwrap();
    assert_eq!(program.statements.len(), 1);
    assert_eq!(program.statements[0].line(), 3);
}

#[test]
fn tuple_unpacking_targets() {
    let program = parse("a, b = 1, 2").unwrap();
    let Stmt::Assign { targets, value, .. } = &program.statements[0] else {
        panic!("expected Assign");
    };
    assert_eq!(targets, &vec!["a".to_string(), "b".to_string()]);
    assert_eq!(value, &Expr::Tuple(vec![Expr::Number(1.0), Expr::Number(2.0)]));
}

#[test]
fn negative_literal_folds() {
    let program = parse("x = -3").unwrap();
    assert!(matches!(&program.statements[0], Stmt::Assign { value: Expr::Number(n), .. } if *n == -3.0));
}

#[test]
fn precedence_mul_before_add() {
    let program = parse("x = 1 + 2 * 3").unwrap();
    let Stmt::Assign { value: Expr::Binary { op, right, .. }, .. } = &program.statements[0] else {
        panic!("expected binary assignment");
    };
    assert_eq!(*op, BinOp::Add);
    assert!(matches!(right.as_ref(), Expr::Binary { op: BinOp::Mul, .. }));
}

#[test]
fn adjacent_strings_concatenate() {
    let program = parse("t = (\"Revenue \" 'by quarter')").unwrap();
    assert!(matches!(&program.statements[0], Stmt::Assign { value: Expr::Str(s), .. } if s == "Revenue by quarter"));
}

#[test]
fn keyword_and_positional_arguments() {
    let program = parse("f(1, 'a', color=\"red\")").unwrap();
    let Stmt::Expr { expr: Expr::Call { args, kwargs, .. }, .. } = &program.statements[0] else {
        panic!("expected call");
    };
    assert_eq!(args.len(), 2);
    assert_eq!(kwargs[0].0, "color");
}

// =============================================================================
// REJECTED CONSTRUCTS
// =============================================================================

#[test]
fn function_definitions_rejected() {
    assert!(matches!(parse_err("def f(): return 1"), ChartError::NotAllowed { line: 1, .. }));
}

#[test]
fn loops_rejected() {
    assert!(matches!(parse_err("for i in x: pass"), ChartError::NotAllowed { .. }));
}

#[test]
fn lambda_rejected() {
    assert!(matches!(parse_err("f = lambda: 1"), ChartError::NotAllowed { .. }));
}

#[test]
fn comprehension_rejected() {
    assert!(matches!(parse_err("xs = [i for i in range(3)]"), ChartError::NotAllowed { .. }));
}

#[test]
fn attribute_assignment_rejected() {
    assert!(matches!(parse_err("fig.layout.title = 'x'"), ChartError::NotAllowed { .. }));
}

#[test]
fn power_operator_rejected() {
    assert!(matches!(parse_err("x = 2 ** 8"), ChartError::NotAllowed { .. }));
}

#[test]
fn slices_rejected() {
    assert!(matches!(parse_err("y = xs[1:2]"), ChartError::NotAllowed { .. }));
}

#[test]
fn star_arguments_rejected() {
    assert!(matches!(parse_err("f(*args)"), ChartError::NotAllowed { .. }));
}

#[test]
fn f_strings_rejected() {
    assert!(matches!(parse_err("t = f\"{x}\""), ChartError::NotAllowed { .. }));
}

// =============================================================================
// SYNTAX ERRORS
// =============================================================================

#[test]
fn unexpected_indent() {
    assert!(matches!(parse_err("x = 1\n    y = 2"), ChartError::Syntax { line: 2, .. }));
}

#[test]
fn unterminated_string() {
    assert!(matches!(parse_err("t = 'oops"), ChartError::Syntax { .. }));
}

#[test]
fn unclosed_bracket() {
    assert!(matches!(parse_err("x = [1, 2"), ChartError::Syntax { .. }));
}

#[test]
fn positional_after_keyword() {
    assert!(matches!(parse_err("f(a=1, 2)"), ChartError::Syntax { .. }));
}

// =============================================================================
// LIMITS
// =============================================================================

fn is_limit(err: &ChartError) -> bool {
    matches!(err, ChartError::Limit(_))
}

#[test]
fn deep_bracket_nesting_rejected() {
    let code = format!("x = {}1{}", "[".repeat(200_000), "]".repeat(200_000));
    assert!(is_limit(&parse_err(&code)));
    let code = format!("x = {}1{}", "(".repeat(5_000), ")".repeat(5_000));
    assert!(is_limit(&parse_err(&code)));
}

#[test]
fn long_operator_and_postfix_chains_rejected() {
    assert!(is_limit(&parse_err(&format!("x = {}1", "1 + ".repeat(5_000)))));
    assert!(is_limit(&parse_err(&format!("x = {}y", "-".repeat(5_000)))));
    assert!(is_limit(&parse_err(&format!("x = a{}", ".b".repeat(5_000)))));
    assert!(is_limit(&parse_err(&format!("x = a{}", "[0]".repeat(5_000)))));
}

#[test]
fn moderate_nesting_accepted() {
    let code = format!("x = {}1{}", "[".repeat(30), "]".repeat(30));
    let program = parse(&code).unwrap();
    let Stmt::Assign { value, .. } = &program.statements[0] else {
        panic!("expected an assignment");
    };
    assert_eq!(value.depth(), 31);
    assert!(parse(&format!("x = {}1", "1 + ".repeat(40))).is_ok());
}
