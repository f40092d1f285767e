//! Logical operators: truth tables, boolean coercion, eager versus
//! short-circuit evaluation.

use simexpr::{interp, FuncError, ParsedFunction};

fn logic(expr: &str, logical_numeric: bool) -> Result<f64, FuncError> {
    let mut f = ParsedFunction::new();
    f.set_logical_numeric_allowed(logical_numeric);
    f.set_expression(expr);
    f.parse()?;
    f.evaluate(&[])
}

#[test]
fn test_truth_tables() {
    assert_eq!(interp("1 AND 1").unwrap(), 1.0);
    assert_eq!(interp("1 AND 0").unwrap(), 0.0);
    assert_eq!(interp("0 AND 0").unwrap(), 0.0);
    assert_eq!(interp("1 OR 0").unwrap(), 1.0);
    assert_eq!(interp("0 OR 0").unwrap(), 0.0);
    assert_eq!(interp("0 OR 1").unwrap(), 1.0);
    assert_eq!(interp("NOT 0").unwrap(), 1.0);
    assert_eq!(interp("NOT 1").unwrap(), 0.0);
}

#[test]
fn test_and_binds_tighter_than_or() {
    // 1 OR (0 AND 0), not (1 OR 0) AND 0.
    assert_eq!(interp("1 OR 0 AND 0").unwrap(), 1.0);
}

#[test]
fn test_not_applies_to_comparisons() {
    assert_eq!(interp("NOT (1 > 2)").unwrap(), 1.0);
    // NOT binds below comparisons: NOT 1 > 2 is NOT(1 > 2).
    assert_eq!(interp("NOT 1 > 2").unwrap(), 1.0);
    assert_eq!(interp("NOT NOT 1").unwrap(), 1.0);
}

#[test]
fn test_logic_over_comparison_results() {
    assert_eq!(interp("1 < 2 AND 3 > 2").unwrap(), 1.0);
    assert_eq!(interp("1 > 2 OR 3 > 2").unwrap(), 1.0);
    assert_eq!(interp("1 > 2 OR 2 > 3").unwrap(), 0.0);
}

#[test]
fn test_non_boolean_operands_rejected() {
    for logical_numeric in [false, true] {
        let err = logic("0.5 AND 1", logical_numeric).unwrap_err();
        assert!(
            matches!(&err, FuncError::Domain { function, .. } if function == "AND"),
            "flag {}: got {:?}",
            logical_numeric,
            err
        );
        let err = logic("NOT 0.5", logical_numeric).unwrap_err();
        assert!(matches!(err, FuncError::Domain { ref function, .. } if function == "NOT"));
    }
}

#[test]
fn test_eager_evaluation_surfaces_right_side_domain_errors() {
    // By default both operands evaluate, so the division by zero surfaces
    // even though the left side already decides the result.
    let err = logic("0 AND 1/0", false).unwrap_err();
    assert!(matches!(err, FuncError::Domain { ref function, .. } if function == "/"));
    let err = logic("1 OR 1/0", false).unwrap_err();
    assert!(matches!(err, FuncError::Domain { ref function, .. } if function == "/"));
}

#[test]
fn test_short_circuit_with_logical_numeric_allowed() {
    assert_eq!(logic("0 AND 1/0", true).unwrap(), 0.0);
    assert_eq!(logic("1 OR 1/0", true).unwrap(), 1.0);
    // The deciding side still has to be boolean.
    assert!(logic("0.5 OR 1/0", true).is_err());
}

#[test]
fn test_boolean_coercion_widens_with_tolerance() {
    let mut f = ParsedFunction::new();
    f.set_variable_names(["x"]);
    f.set_logical_numeric_allowed(true);
    f.set_comparison_tolerance(0.1).unwrap();
    f.set_expression("x AND 1");
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[0.95]).unwrap(), 1.0);
    assert_eq!(f.evaluate(&[0.05]).unwrap(), 0.0);
    assert!(matches!(
        f.evaluate(&[0.5]).unwrap_err(),
        FuncError::Domain { .. }
    ));
}

#[test]
fn test_conditional_condition_must_be_boolean() {
    let err = interp("IF(0.5, 1, 2)").unwrap_err();
    assert!(matches!(err, FuncError::Domain { ref function, .. } if function == "IF"));
}

#[test]
fn test_conditional_short_circuits_untaken_branch() {
    // The untaken branch may contain a domain error without tripping.
    assert_eq!(interp("IF(1 = 1, 5, 1/0)").unwrap(), 5.0);
    assert_eq!(interp("IF(1 = 2, 1/0, 7)").unwrap(), 7.0);
}

#[test]
fn test_conditionals_nest() {
    let mut f = ParsedFunction::new();
    f.set_variable_names(["x"]);
    f.set_expression("IF(x < 0, 0 - 1, IF(x > 0, 1, 0))");
    f.parse().unwrap();
    assert_eq!(f.evaluate(&[-5.0]).unwrap(), -1.0);
    assert_eq!(f.evaluate(&[5.0]).unwrap(), 1.0);
    assert_eq!(f.evaluate(&[0.0]).unwrap(), 0.0);
}
