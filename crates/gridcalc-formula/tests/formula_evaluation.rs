//! Tests for formula evaluation against a grid

use gridcalc_core::Grid;
use gridcalc_formula::{
    display_cell_value, evaluate_custom_expression, evaluate_formula, evaluate_formula_value,
    extract_cell_references, try_display_cell_value, EvaluationOptions, FormulaEngine,
    FormulaError, FormulaValue, JsonData, Resolution,
};
use pretty_assertions::assert_eq;
use proptest::prelude::*;

fn grid_with(cells: &[(&str, &str)]) -> Grid {
    let mut grid = Grid::new(20, 10);
    for (addr, text) in cells {
        grid.set_cell(addr, *text).unwrap();
    }
    grid
}

#[test]
fn test_extraction_order() {
    assert_eq!(extract_cell_references("=A1+B2*C3"), vec!["A1", "B2", "C3"]);
    assert_eq!(extract_cell_references("=A1+A1"), vec!["A1", "A1"]);
}

#[test]
fn test_substitution_ordering() {
    let grid = grid_with(&[("A1", "5"), ("A11", "7")]);
    let ctx = FormulaEngine::new(&grid)
        .create_evaluation_context("=A11+A1", &mut Resolution::new())
        .unwrap();
    assert_eq!(ctx.processed_formula(), "7+5");
    assert_eq!(evaluate_formula_value("=A11+A1", &grid), FormulaValue::Number(12.0));
}

#[test]
fn test_predicates() {
    let grid = grid_with(&[("A1", "10"), ("B1", "5")]);
    assert!(evaluate_formula("A1>B1", &grid));

    let grid = grid_with(&[("A1", "5"), ("B1", "5")]);
    assert!(evaluate_formula("A1=B1", &grid));
}

#[test]
fn test_text_cells_compare_as_strings() {
    let grid = grid_with(&[("A1", "apple"), ("B1", "banana")]);
    assert!(evaluate_formula("A1<B1", &grid));
    assert!(evaluate_formula("A1 = \"apple\"", &grid));
    assert_eq!(
        evaluate_formula_value("=A1 & \"-\" & B1", &grid),
        FormulaValue::String("apple-banana".into())
    );
}

#[test]
fn test_out_of_bounds_reads_empty() {
    let grid = grid_with(&[("A1", "3")]);
    assert_eq!(evaluate_formula_value("=A1+Z99", &grid), FormulaValue::Number(3.0));
    assert!(evaluate_formula("Z99 = \"\"", &grid));
}

#[test]
fn test_self_reference() {
    let grid = grid_with(&[("A1", "=A1")]);
    assert_eq!(display_cell_value(&grid, 0, 0), "Try Again!");
}

#[test]
fn test_indirect_cycle() {
    let grid = grid_with(&[("A1", "=B1+1"), ("B1", "=C1+1"), ("C1", "=A1+1"), ("D1", "=A1")]);
    assert_eq!(display_cell_value(&grid, 0, 0), "Try Again!");
    assert_eq!(display_cell_value(&grid, 0, 3), "Try Again!");
    assert_eq!(
        evaluate_formula_value("=B1", &grid),
        FormulaValue::String("#ERROR!".into())
    );
    assert!(!evaluate_formula("A1 > 0", &grid));
}

#[test]
fn test_diamond_is_not_a_cycle() {
    // D1 reaches A1 through both B1 and C1
    let grid = grid_with(&[("A1", "2"), ("B1", "=A1*3"), ("C1", "=A1+4"), ("D1", "=B1+C1")]);
    assert_eq!(display_cell_value(&grid, 0, 3), "12");
}

#[test]
fn test_deep_diamond_resolves_each_cell_once() {
    // A(k+1) and B(k+1) both read A(k) and B(k), thirty levels down
    let mut grid = Grid::new(32, 2);
    grid.set_cell_at(0, 0, "1").unwrap();
    grid.set_cell_at(0, 1, "1").unwrap();
    for row in 1..=30 {
        let formula = format!("=A{}+B{}", row, row);
        grid.set_cell_at(row, 0, formula.clone()).unwrap();
        grid.set_cell_at(row, 1, formula).unwrap();
    }

    assert_eq!(
        evaluate_formula_value("=A31", &grid),
        FormulaValue::Number(2f64.powi(30))
    );
    assert!(evaluate_formula("A31 = B31", &grid));
}

#[test]
fn test_glued_reference_is_not_circular() {
    // xA1 is an identifier, not a read of A1
    let grid = grid_with(&[("A1", "=xA1")]);
    assert!(matches!(
        try_display_cell_value(&grid, 0, 0),
        Err(FormulaError::Evaluation(_))
    ));
}

#[test]
fn test_depth_cap() {
    // A1 = A2 + 1, A2 = A3 + 1, ... ten levels deep
    let mut grid = Grid::new(12, 1);
    for row in 0..10 {
        grid.set_cell_at(row, 0, format!("=A{}+1", row + 2)).unwrap();
    }
    grid.set_cell_at(10, 0, "0").unwrap();

    assert_eq!(display_cell_value(&grid, 0, 0), "10");

    let shallow = FormulaEngine::new(&grid).with_options(EvaluationOptions::new().with_max_depth(4));
    assert_eq!(shallow.try_display_value(0, 0), Err(FormulaError::DepthExceeded(4)));
}

#[test]
fn test_malformed_formula_degrades() {
    let grid = grid_with(&[("A1", "=1 +* 2"), ("B1", "=\"unterminated")]);
    assert_eq!(display_cell_value(&grid, 0, 0), "Try Again!");
    assert!(matches!(
        try_display_cell_value(&grid, 0, 1),
        Err(FormulaError::Parse(_))
    ));
    assert!(!evaluate_formula("=)(", &grid));
}

#[test]
fn test_long_flat_formula_degrades() {
    let mut grid = Grid::new(2, 1);
    grid.set_cell_at(0, 0, format!("={}", vec!["1"; 20_000].join("+"))).unwrap();
    grid.set_cell_at(1, 0, format!("={}", vec!["1"; 200].join("+"))).unwrap();

    assert_eq!(display_cell_value(&grid, 0, 0), "Try Again!");
    assert!(matches!(
        try_display_cell_value(&grid, 0, 0),
        Err(FormulaError::Parse(_))
    ));
    assert_eq!(display_cell_value(&grid, 1, 0), "200");
    assert!(!evaluate_formula("A1 > 0", &grid));
}

#[test]
fn test_json_paths() {
    let grid = grid_with(&[("A1", "30")]);
    let json = JsonData::parse(r#"{"user": {"age": 36, "name": "Ada"}, "limits": [10, 40]}"#).unwrap();
    let engine = FormulaEngine::new(&grid).with_json(&json);

    assert!(engine.evaluate_predicate("data.user.age > A1"));
    assert!(engine.evaluate_predicate("A1 < data.limits.1"));
    assert_eq!(
        engine.evaluate_value("=\"Hi \" & data.user.name"),
        FormulaValue::String("Hi Ada".into())
    );
    assert_eq!(engine.evaluate_value("=data.user.missing"), FormulaValue::String(String::new()));
}

#[test]
fn test_custom_expressions() {
    assert!(evaluate_custom_expression("> 5 && < 10", "7"));
    assert!(!evaluate_custom_expression("> 5 && < 10", "12"));
    assert!(evaluate_custom_expression(r#"contains "foo""#, "foobar"));
}

proptest! {
    #[test]
    fn substitution_never_corrupts_longer_tokens(a in -1000i32..1000, b in -1000i32..1000) {
        let grid = grid_with(&[("A1", &a.to_string()), ("A11", &b.to_string())]);
        let expected = FormulaValue::Number(f64::from(b) - f64::from(a));
        prop_assert_eq!(evaluate_formula_value("=A11-A1", &grid), expected);
    }

    #[test]
    fn predicate_matches_numeric_comparison(a in -1e6f64..1e6, b in -1e6f64..1e6) {
        let grid = grid_with(&[("A1", &a.to_string()), ("B1", &b.to_string())]);
        prop_assert_eq!(evaluate_formula("A1>B1", &grid), a > b);
        prop_assert_eq!(evaluate_formula("A1<=B1", &grid), a <= b);
    }
}
