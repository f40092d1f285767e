#![doc = r#"
# simexpr

A math formula parser and evaluator for simulation hosts.

## Overview

simexpr parses user-authored formulas (reaction rate laws, dosing
schedules, derived observables) into an expression tree once, then
evaluates that tree repeatedly against fresh variable values. Symbols come
in two kinds: **variables**, bound per evaluation through a positional
argument vector, and **parameters**, bound once and eligible for constant
folding, so a formula like `sqrt(a^2 + b^2)` over parameters collapses to a
single constant at parse time.

Key features:

- Recursive-descent parser over a fixed precedence ladder with
  right-associative exponentiation and word operators (`AND`, `OR`, `NOT`,
  `IF`, `MOD`, `MIN`, `MAX`)
- A fixed catalogue of elementary functions (trigonometric, hyperbolic,
  logarithmic, powers, rounding) with per-function domain checking
- Comparisons with a configurable numeric tolerance
- Conditional `IF(cond, then, else)` with short-circuit branch evaluation
- Constant folding of parameter-only subtrees, kept as a separate tree or
  folded in place
- Structured errors with 1-based positions for host bindings
- Case-sensitive or case-insensitive identifier matching

## Quick start

```rust
use simexpr::interp;

// Closed formulas evaluate in one call.
assert_eq!(interp("2 + 3 * 4").unwrap(), 14.0);
assert_eq!(interp("2^3^2").unwrap(), 512.0); // right-associative
assert_eq!(interp("MIN(3, 7) + MAX(1, 2)").unwrap(), 5.0);
```

## Variables and parameters

```rust
use simexpr::ParsedFunction;

let mut f = ParsedFunction::new();
f.set_variable_names(["x"]);
f.set_parameter_names(["k"]);
f.set_parameter_values(vec![2.0]);
f.set_expression("k * sin(x) + 1");
f.parse().unwrap();

let y = f.evaluate(&[0.0]).unwrap();
assert_eq!(y, 1.0);
```

## Conditionals and logic

```rust
use simexpr::ParsedFunction;

let mut f = ParsedFunction::new();
f.set_variable_names(["x"]);
f.set_expression("IF(x < 0, -x, x)");
f.parse().unwrap();
assert_eq!(f.evaluate(&[-3.0]).unwrap(), 3.0);
```

Logical operands must be boolean (0 or 1); comparisons produce exactly
those values. `AND`/`OR` evaluate both sides eagerly by default so domain
errors surface from either operand; enabling
[`ParsedFunction::set_logical_numeric_allowed`] switches them to
short-circuit evaluation and widens boolean coercion to the comparison
tolerance.

## Errors

```rust
use simexpr::{interp, FuncError};

match interp("sin(x") {
    Err(FuncError::Unbalanced { position }) => assert_eq!(position, 6),
    other => panic!("expected unbalanced parenthesis, got {:?}", other),
}

match interp("LN(-1)") {
    Err(FuncError::Domain { function, .. }) => assert_eq!(function, "LN"),
    other => panic!("expected domain error, got {:?}", other),
}
```

## Operator precedence

From lowest to highest binding:

| Precedence | Operators             | Associativity |
|------------|-----------------------|---------------|
| 1          | `OR`                  | Left          |
| 2          | `AND`                 | Left          |
| 3          | `NOT`                 | Right (unary) |
| 4          | `= <> < <= > >=`      | Left          |
| 5          | `+ -`                 | Left          |
| 6          | `* / MOD`             | Left          |
| 7          | unary `+ -`           | Right (unary) |
| 8          | `^`                   | Right         |

`-2^2` is `-(2^2) = -4`; `2^-1` is `0.5`; `2^3^2` is `2^(3^2) = 512`.

## Concurrency

A single [`ParsedFunction`] is not synchronized; use one instance per
thread. The function catalogue is immutable after initialization and safe
to share. There is no I/O and no blocking anywhere in the crate.
"#]

pub mod error;
pub mod eval;
pub mod functions;
mod normalizer;
pub mod parsed_function;
mod parser;
pub mod types;

pub use error::{FuncError, Result};
pub use eval::EvalPolicy;
pub use functions::{ElemFunction, FuncCategory};
pub use parsed_function::{interp, ParsedFunction, DEFAULT_MAX_RECURSION_DEPTH};
pub use types::{ComparisonOp, ExprNode, LogicalOperator};

/// Floating-point type used for all values in the crate.
pub type Real = f64;

pub mod constants {
    //! Reserved numeric constants and test precision.
    use super::Real;

    /// Value bound to the reserved name `PI`.
    pub const PI: Real = core::f64::consts::PI;
    /// Value bound to the reserved name `E`.
    pub const E: Real = core::f64::consts::E;
    /// Default epsilon for approximate comparisons in tests.
    pub const TEST_PRECISION: Real = 1e-10;
}

/// Utility macro to check that two floating point values are approximately
/// equal within an epsilon. NaN equals NaN and same-signed infinities are
/// equal for the purposes of this macro.
#[macro_export]
macro_rules! assert_approx_eq {
    ($left:expr, $right:expr $(,)?) => {
        $crate::assert_approx_eq!($left, $right, $crate::constants::TEST_PRECISION)
    };
    ($left:expr, $right:expr, $epsilon:expr $(,)?) => {{
        let left_val: $crate::Real = $left;
        let right_val: $crate::Real = $right;
        let eps: $crate::Real = $epsilon;

        if left_val.is_nan() && right_val.is_nan() {
            // NaN == NaN for our purposes
        } else if left_val.is_infinite()
            && right_val.is_infinite()
            && left_val.signum() == right_val.signum()
        {
            // Same-signed infinities are equal
        } else {
            assert!(
                (left_val - right_val).abs() < eps,
                "assertion failed: `(left ≈ right)` (left: `{}`, right: `{}`, epsilon: `{}`)",
                left_val,
                right_val,
                eps
            );
        }
    }};
}
