//! Error types for formula parsing and evaluation.
//!
//! Every failure the crate can produce is a variant of [`FuncError`]. Parse
//! errors carry 1-based character positions into the normalized expression
//! string so hosts can point at the offending spot; evaluation errors carry
//! the function name and the arguments that violated its domain.

use core::fmt;

use crate::Real;

/// Result type used throughout the crate.
pub type Result<T> = core::result::Result<T, FuncError>;

/// Error type for formula parsing and evaluation.
///
/// Parse-time variants (`Unbalanced`, `UnexpectedToken`, `EmptySubexpression`,
/// `UnknownIdentifier`, `UnknownFunction`, `Arity`, `RecursionLimit`) report a
/// position; evaluation-time variants (`Domain`) report the failing function
/// and its inputs. `ParameterMismatch` and `ContractViolation` signal caller
/// errors on the [`ParsedFunction`](crate::ParsedFunction) surface itself.
#[derive(Debug, Clone, PartialEq)]
pub enum FuncError {
    /// A parenthesis without a matching partner.
    Unbalanced {
        /// 1-based position in the normalized expression. A missing closing
        /// parenthesis is reported one past the end of the string.
        position: usize,
    },

    /// A character or token the grammar does not allow at this position.
    UnexpectedToken { position: usize, found: String },

    /// An empty (sub-)expression where an operand was required, e.g. `()`
    /// or a missing function argument in `MIN(1,)`.
    EmptySubexpression { position: usize },

    /// A name that is neither a variable, a parameter, nor a reserved
    /// constant.
    UnknownIdentifier { name: String, position: usize },

    /// A call-form name that is not in the function catalogue.
    UnknownFunction { name: String, position: usize },

    /// A function called with the wrong number of arguments.
    Arity {
        function: String,
        expected: usize,
        found: usize,
    },

    /// A math domain violation during evaluation, e.g. `SQRT(-1)` or
    /// division by zero. Carries the already-evaluated inputs.
    Domain { function: String, args: Vec<Real> },

    /// The parameter-value vector length differs from the parameter-name
    /// list length.
    ParameterMismatch { names: usize, values: usize },

    /// Misuse of the API: evaluating before a successful parse, passing the
    /// wrong number of arguments, duplicate or malformed names.
    ContractViolation(String),

    /// The expression nests deeper than the configured maximum.
    RecursionLimit { limit: usize },
}

impl FuncError {
    /// The 1-based position in the normalized expression, for parse errors.
    ///
    /// Host bindings marshal errors as `(code, message, position)` triples;
    /// evaluation-time and contract errors have no position and return
    /// `None`.
    pub fn position(&self) -> Option<usize> {
        match self {
            FuncError::Unbalanced { position }
            | FuncError::UnexpectedToken { position, .. }
            | FuncError::EmptySubexpression { position }
            | FuncError::UnknownIdentifier { position, .. }
            | FuncError::UnknownFunction { position, .. } => Some(*position),
            _ => None,
        }
    }
}

impl fmt::Display for FuncError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FuncError::Unbalanced { position } => {
                write!(f, "Unbalanced parenthesis at position {}", position)
            }
            FuncError::UnexpectedToken { position, found } => {
                write!(f, "Unexpected token '{}' at position {}", found, position)
            }
            FuncError::EmptySubexpression { position } => {
                write!(f, "Empty subexpression at position {}", position)
            }
            FuncError::UnknownIdentifier { name, position } => {
                write!(f, "Unknown identifier '{}' at position {}", name, position)
            }
            FuncError::UnknownFunction { name, position } => {
                write!(f, "Unknown function '{}' at position {}", name, position)
            }
            FuncError::Arity {
                function,
                expected,
                found,
            } => {
                write!(
                    f,
                    "Invalid call to '{}': expected {} arguments, found {}",
                    function, expected, found
                )
            }
            FuncError::Domain { function, args } => {
                write!(f, "Domain error in {}(", function)?;
                for (i, a) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", a)?;
                }
                write!(f, ")")
            }
            FuncError::ParameterMismatch { names, values } => {
                write!(
                    f,
                    "Parameter mismatch: {} parameter names but {} values",
                    names, values
                )
            }
            FuncError::ContractViolation(msg) => {
                write!(f, "Contract violation: {}", msg)
            }
            FuncError::RecursionLimit { limit } => {
                write!(f, "Expression exceeds maximum nesting depth of {}", limit)
            }
        }
    }
}

impl std::error::Error for FuncError {}
