//! Recursive post-order evaluation of expression trees.
//!
//! Evaluation is pure: the same tree, argument vector, and parameter values
//! always produce the same result. Children are evaluated before their
//! parent and a child's domain error propagates without invoking the parent
//! entry. Only two forms deviate from strict post-order: `IF` never
//! evaluates the untaken branch, and logical `AND`/`OR` short-circuit when
//! [`EvalPolicy::logical_numeric_allowed`] is set (by default both sides are
//! evaluated eagerly so domain errors in either operand surface).

use crate::error::{FuncError, Result};
use crate::types::{ComparisonOp, ExprNode, LogicalOperator};
use crate::Real;

/// Evaluation-time policy derived from the parsed function's flags.
#[derive(Copy, Clone, Debug)]
pub struct EvalPolicy {
    /// Widens boolean coercion to the comparison tolerance and switches
    /// logical `AND`/`OR` to short-circuit evaluation.
    pub logical_numeric_allowed: bool,
    /// Tolerance used when coercing logical operands; comparisons carry
    /// their own snapshot on the node.
    pub comparison_tolerance: Real,
}

impl Default for EvalPolicy {
    fn default() -> Self {
        Self {
            logical_numeric_allowed: false,
            comparison_tolerance: 0.0,
        }
    }
}

impl EvalPolicy {
    fn boolean_tolerance(&self) -> Real {
        if self.logical_numeric_allowed {
            self.comparison_tolerance
        } else {
            0.0
        }
    }
}

/// Coerce an operand of a logical form to a boolean: within tolerance of 0
/// is false, within tolerance of 1 is true, anything else is a domain
/// error of the named form.
fn as_bool(value: Real, tolerance: Real, function: &str) -> Result<bool> {
    if (value).abs() <= tolerance {
        Ok(false)
    } else if (value - 1.0).abs() <= tolerance {
        Ok(true)
    } else {
        Err(FuncError::Domain {
            function: function.to_string(),
            args: vec![value],
        })
    }
}

fn compare(op: ComparisonOp, a: Real, b: Real, tolerance: Real) -> Real {
    let eq = (a - b).abs() <= tolerance;
    let result = match op {
        ComparisonOp::Eq => eq,
        ComparisonOp::Ne => !eq,
        ComparisonOp::Lt => a < b && !eq,
        ComparisonOp::Le => a < b || eq,
        ComparisonOp::Gt => a > b && !eq,
        ComparisonOp::Ge => a > b || eq,
    };
    if result {
        1.0
    } else {
        0.0
    }
}

/// Evaluate a tree against an argument vector and parameter values.
///
/// Index bounds are established at parse time; passing vectors shorter than
/// the name lists the tree was parsed against is a contract violation
/// checked by [`ParsedFunction`](crate::ParsedFunction) before this runs.
pub fn eval_node(
    node: &ExprNode,
    args: &[Real],
    params: &[Real],
    policy: &EvalPolicy,
) -> Result<Real> {
    match node {
        ExprNode::Constant(v) => Ok(*v),
        ExprNode::Variable(i) => {
            debug_assert!(*i < args.len(), "variable index bound at parse");
            Ok(args[*i])
        }
        ExprNode::Parameter(i) => {
            debug_assert!(*i < params.len(), "parameter index bound at parse");
            Ok(params[*i])
        }
        ExprNode::Unary { entry, operand } => {
            let a = eval_node(operand, args, params, policy)?;
            entry.eval(&[a])
        }
        ExprNode::Binary { entry, left, right } => {
            let a = eval_node(left, args, params, policy)?;
            let b = eval_node(right, args, params, policy)?;
            entry.eval(&[a, b])
        }
        ExprNode::Comparison {
            op,
            tolerance,
            left,
            right,
        } => {
            let a = eval_node(left, args, params, policy)?;
            let b = eval_node(right, args, params, policy)?;
            Ok(compare(*op, a, b, *tolerance))
        }
        ExprNode::Logical { op, left, right } => {
            let tolerance = policy.boolean_tolerance();
            let name = match op {
                LogicalOperator::And => "AND",
                LogicalOperator::Or => "OR",
            };
            let l = as_bool(eval_node(left, args, params, policy)?, tolerance, name)?;
            if policy.logical_numeric_allowed {
                match (op, l) {
                    (LogicalOperator::And, false) => return Ok(0.0),
                    (LogicalOperator::Or, true) => return Ok(1.0),
                    _ => {}
                }
            }
            let r = as_bool(eval_node(right, args, params, policy)?, tolerance, name)?;
            let value = match op {
                LogicalOperator::And => l && r,
                LogicalOperator::Or => l || r,
            };
            Ok(if value { 1.0 } else { 0.0 })
        }
        ExprNode::Not { operand } => {
            let v = eval_node(operand, args, params, policy)?;
            let b = as_bool(v, policy.boolean_tolerance(), "NOT")?;
            Ok(if b { 0.0 } else { 1.0 })
        }
        ExprNode::Conditional {
            condition,
            if_true,
            if_false,
        } => {
            let c = eval_node(condition, args, params, policy)?;
            let taken = as_bool(c, policy.boolean_tolerance(), "IF")?;
            if taken {
                eval_node(if_true, args, params, policy)
            } else {
                eval_node(if_false, args, params, policy)
            }
        }
    }
}
