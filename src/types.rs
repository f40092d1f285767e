//! The expression tree.
//!
//! A parsed formula is a tree of [`ExprNode`] values. Leaves are numeric
//! constants and positional references into the caller's variable and
//! parameter vectors; interior nodes apply catalogue entries, comparisons,
//! logical operators, or the three-way conditional. Each node exclusively
//! owns its children, so the tree is a plain arborescence with no sharing
//! and no back-references.
//!
//! Comparison nodes carry the tolerance that was configured when the
//! expression was parsed; equality and inequality treat two values within
//! that tolerance as equal.

use core::fmt;

use crate::eval::{eval_node, EvalPolicy};
use crate::functions::ElemFunction;
use crate::Real;

/// Kind of a logical connective node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LogicalOperator {
    And,
    Or,
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("AND"),
            LogicalOperator::Or => f.write_str("OR"),
        }
    }
}

/// Kind of a comparison node.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ComparisonOp {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
}

impl fmt::Display for ComparisonOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            ComparisonOp::Eq => "=",
            ComparisonOp::Ne => "<>",
            ComparisonOp::Lt => "<",
            ComparisonOp::Le => "<=",
            ComparisonOp::Gt => ">",
            ComparisonOp::Ge => ">=",
        };
        f.write_str(text)
    }
}

/// A node of the expression tree.
///
/// Catalogue references point into the process-wide immutable function
/// table, so cloning a tree copies nodes but shares entries.
#[derive(Clone, Debug, PartialEq)]
pub enum ExprNode {
    /// A literal numeric value.
    Constant(Real),

    /// Index into the argument vector supplied at evaluation time.
    Variable(usize),

    /// Index into the parameter-value vector held by the parsed function.
    Parameter(usize),

    /// A unary catalogue entry: named functions like `SIN`, plus the unary
    /// sign operators `UMINUS`/`UPLUS`.
    Unary {
        entry: &'static ElemFunction,
        operand: Box<ExprNode>,
    },

    /// A binary catalogue entry: `+ - * / ^ MIN MAX MOD`.
    Binary {
        entry: &'static ElemFunction,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },

    /// A comparison, yielding 0.0 or 1.0. `tolerance` is the comparison
    /// tolerance snapshotted at parse time.
    Comparison {
        op: ComparisonOp,
        tolerance: Real,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },

    /// Logical `AND`/`OR` over boolean operands.
    Logical {
        op: LogicalOperator,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },

    /// Logical negation.
    Not { operand: Box<ExprNode> },

    /// `IF(condition, if_true, if_false)`. Only the taken branch is
    /// evaluated.
    Conditional {
        condition: Box<ExprNode>,
        if_true: Box<ExprNode>,
        if_false: Box<ExprNode>,
    },
}

impl ExprNode {
    /// True iff the subtree references no evaluation-time variable, i.e. it
    /// depends only on literals and parameters.
    pub fn is_constant_over_variables(&self) -> bool {
        match self {
            ExprNode::Constant(_) | ExprNode::Parameter(_) => true,
            ExprNode::Variable(_) => false,
            ExprNode::Unary { operand, .. } | ExprNode::Not { operand } => {
                operand.is_constant_over_variables()
            }
            ExprNode::Binary { left, right, .. }
            | ExprNode::Comparison { left, right, .. }
            | ExprNode::Logical { left, right, .. } => {
                left.is_constant_over_variables() && right.is_constant_over_variables()
            }
            ExprNode::Conditional {
                condition,
                if_true,
                if_false,
            } => {
                condition.is_constant_over_variables()
                    && if_true.is_constant_over_variables()
                    && if_false.is_constant_over_variables()
            }
        }
    }

    fn children_all_constant(&self) -> bool {
        let is_const = |n: &ExprNode| matches!(n, ExprNode::Constant(_));
        match self {
            ExprNode::Constant(_) | ExprNode::Variable(_) | ExprNode::Parameter(_) => false,
            ExprNode::Unary { operand, .. } | ExprNode::Not { operand } => is_const(operand),
            ExprNode::Binary { left, right, .. }
            | ExprNode::Comparison { left, right, .. }
            | ExprNode::Logical { left, right, .. } => is_const(left) && is_const(right),
            ExprNode::Conditional {
                condition,
                if_true,
                if_false,
            } => is_const(condition) && is_const(if_true) && is_const(if_false),
        }
    }

    /// Constant folding: returns a new tree in which every subtree that
    /// depends only on literals and parameters is collapsed to a single
    /// `Constant`.
    ///
    /// `Parameter` leaves become constants holding the current parameter
    /// value, then any node whose children all folded to constants is
    /// evaluated. A subtree whose evaluation would raise a domain error is
    /// left unfolded; the error surfaces at evaluation time if the subtree
    /// is actually reached.
    pub fn folded(&self, params: &[Real], policy: &EvalPolicy) -> ExprNode {
        let node = match self {
            ExprNode::Constant(v) => return ExprNode::Constant(*v),
            ExprNode::Variable(i) => return ExprNode::Variable(*i),
            ExprNode::Parameter(i) => {
                debug_assert!(*i < params.len(), "parameter index bound at parse");
                return ExprNode::Constant(params[*i]);
            }
            ExprNode::Unary { entry, operand } => ExprNode::Unary {
                entry: *entry,
                operand: Box::new(operand.folded(params, policy)),
            },
            ExprNode::Binary { entry, left, right } => ExprNode::Binary {
                entry: *entry,
                left: Box::new(left.folded(params, policy)),
                right: Box::new(right.folded(params, policy)),
            },
            ExprNode::Comparison {
                op,
                tolerance,
                left,
                right,
            } => ExprNode::Comparison {
                op: *op,
                tolerance: *tolerance,
                left: Box::new(left.folded(params, policy)),
                right: Box::new(right.folded(params, policy)),
            },
            ExprNode::Logical { op, left, right } => ExprNode::Logical {
                op: *op,
                left: Box::new(left.folded(params, policy)),
                right: Box::new(right.folded(params, policy)),
            },
            ExprNode::Not { operand } => ExprNode::Not {
                operand: Box::new(operand.folded(params, policy)),
            },
            ExprNode::Conditional {
                condition,
                if_true,
                if_false,
            } => ExprNode::Conditional {
                condition: Box::new(condition.folded(params, policy)),
                if_true: Box::new(if_true.folded(params, policy)),
                if_false: Box::new(if_false.folded(params, policy)),
            },
        };

        if node.children_all_constant() {
            // No Parameter leaves remain below, so the value vectors are
            // never consulted here.
            match eval_node(&node, &[], &[], policy) {
                Ok(v) => return ExprNode::Constant(v),
                Err(err) => {
                    log::trace!("fold kept unfolded subtree: {}", err);
                }
            }
        }
        node
    }

    /// Diagnostic rendering with variable and parameter names resolved.
    /// Indices without a name (never produced by the parser) render as
    /// `v#i` / `p#i`.
    pub fn dump(&self, variables: &[String], parameters: &[String]) -> String {
        match self {
            ExprNode::Constant(v) => format!("{}", v),
            ExprNode::Variable(i) => variables
                .get(*i)
                .cloned()
                .unwrap_or_else(|| format!("v#{}", i)),
            ExprNode::Parameter(i) => parameters
                .get(*i)
                .cloned()
                .unwrap_or_else(|| format!("p#{}", i)),
            ExprNode::Unary { entry, operand } => match entry.name {
                "UMINUS" => format!("(-{})", operand.dump(variables, parameters)),
                "UPLUS" => format!("(+{})", operand.dump(variables, parameters)),
                name => format!("{}({})", name, operand.dump(variables, parameters)),
            },
            ExprNode::Binary { entry, left, right } => {
                if entry.name.chars().all(|c| c.is_ascii_uppercase()) {
                    format!(
                        "{}({}, {})",
                        entry.name,
                        left.dump(variables, parameters),
                        right.dump(variables, parameters)
                    )
                } else {
                    format!(
                        "({} {} {})",
                        left.dump(variables, parameters),
                        entry.name,
                        right.dump(variables, parameters)
                    )
                }
            }
            ExprNode::Comparison {
                op, left, right, ..
            } => format!(
                "({} {} {})",
                left.dump(variables, parameters),
                op,
                right.dump(variables, parameters)
            ),
            ExprNode::Logical { op, left, right } => format!(
                "({} {} {})",
                left.dump(variables, parameters),
                op,
                right.dump(variables, parameters)
            ),
            ExprNode::Not { operand } => {
                format!("(NOT {})", operand.dump(variables, parameters))
            }
            ExprNode::Conditional {
                condition,
                if_true,
                if_false,
            } => format!(
                "IF({}, {}, {})",
                condition.dump(variables, parameters),
                if_true.dump(variables, parameters),
                if_false.dump(variables, parameters)
            ),
        }
    }
}
