//! The elementary-function catalogue.
//!
//! A fixed, process-wide table of named numeric functions: trigonometric and
//! hyperbolic functions, logarithms, powers, rounding, and the arithmetic
//! operators themselves. Every entry is an [`ElemFunction`] record holding
//! the canonical (uppercase) name, the arity, a textual category, and the
//! evaluation function. Evaluation functions receive already-evaluated
//! operands and perform their own domain checks, failing with
//! [`FuncError::Domain`] for out-of-domain inputs such as `SQRT(-1)` or
//! division by zero.
//!
//! All numeric primitives come from the `libm` crate so results are
//! bit-consistent across platforms.
//!
//! The catalogue is immutable after initialization. Name lookup goes through
//! a hash map built once on first use; every identifier in an expression
//! triggers at least one lookup, so this must stay amortized O(1).

use core::fmt;
use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::error::{FuncError, Result};
use crate::Real;

/// Evaluation function of a catalogue entry. Receives exactly `arity`
/// operands.
pub type EvalFn = fn(&[Real]) -> Result<Real>;

/// Coarse classification of a catalogue entry, for diagnostics.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum FuncCategory {
    Trigonometric,
    Hyperbolic,
    Logarithmic,
    Power,
    Rounding,
    Arithmetic,
}

impl fmt::Display for FuncCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            FuncCategory::Trigonometric => "trigonometric",
            FuncCategory::Hyperbolic => "hyperbolic",
            FuncCategory::Logarithmic => "logarithmic",
            FuncCategory::Power => "power",
            FuncCategory::Rounding => "rounding",
            FuncCategory::Arithmetic => "arithmetic",
        };
        f.write_str(text)
    }
}

/// One entry of the elementary-function catalogue.
pub struct ElemFunction {
    /// Canonical name, uppercase for named functions (`SIN`), the operator
    /// symbol for arithmetic operators (`+`).
    pub name: &'static str,
    /// Number of operands the evaluation function expects.
    pub arity: usize,
    pub category: FuncCategory,
    eval: EvalFn,
}

impl ElemFunction {
    /// Apply the entry to already-evaluated operands.
    pub fn eval(&self, args: &[Real]) -> Result<Real> {
        debug_assert_eq!(args.len(), self.arity, "arity checked at parse");
        (self.eval)(args)
    }
}

impl fmt::Debug for ElemFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElemFunction")
            .field("name", &self.name)
            .field("arity", &self.arity)
            .field("category", &self.category)
            .finish()
    }
}

/// Names are unique within the catalogue, so they identify entries.
impl PartialEq for ElemFunction {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

fn domain(name: &str, args: &[Real]) -> FuncError {
    FuncError::Domain {
        function: name.to_string(),
        args: args.to_vec(),
    }
}

// Unary numeric functions.

fn sin(args: &[Real]) -> Result<Real> {
    Ok(libm::sin(args[0]))
}

fn cos(args: &[Real]) -> Result<Real> {
    Ok(libm::cos(args[0]))
}

fn tan(args: &[Real]) -> Result<Real> {
    Ok(libm::tan(args[0]))
}

fn asin(args: &[Real]) -> Result<Real> {
    if !(-1.0..=1.0).contains(&args[0]) {
        return Err(domain("ASIN", args));
    }
    Ok(libm::asin(args[0]))
}

fn acos(args: &[Real]) -> Result<Real> {
    if !(-1.0..=1.0).contains(&args[0]) {
        return Err(domain("ACOS", args));
    }
    Ok(libm::acos(args[0]))
}

fn atan(args: &[Real]) -> Result<Real> {
    Ok(libm::atan(args[0]))
}

fn sinh(args: &[Real]) -> Result<Real> {
    Ok(libm::sinh(args[0]))
}

fn cosh(args: &[Real]) -> Result<Real> {
    Ok(libm::cosh(args[0]))
}

fn tanh(args: &[Real]) -> Result<Real> {
    Ok(libm::tanh(args[0]))
}

fn exp(args: &[Real]) -> Result<Real> {
    Ok(libm::exp(args[0]))
}

fn ln(args: &[Real]) -> Result<Real> {
    if args[0] <= 0.0 {
        return Err(domain("LN", args));
    }
    Ok(libm::log(args[0]))
}

/// `LOG` is the natural logarithm, `LOG10` the base-10 variant.
fn log(args: &[Real]) -> Result<Real> {
    if args[0] <= 0.0 {
        return Err(domain("LOG", args));
    }
    Ok(libm::log(args[0]))
}

fn log10(args: &[Real]) -> Result<Real> {
    if args[0] <= 0.0 {
        return Err(domain("LOG10", args));
    }
    Ok(libm::log10(args[0]))
}

fn sqrt(args: &[Real]) -> Result<Real> {
    if args[0] < 0.0 {
        return Err(domain("SQRT", args));
    }
    Ok(libm::sqrt(args[0]))
}

fn abs(args: &[Real]) -> Result<Real> {
    Ok(libm::fabs(args[0]))
}

fn ceiling(args: &[Real]) -> Result<Real> {
    Ok(libm::ceil(args[0]))
}

fn floor(args: &[Real]) -> Result<Real> {
    Ok(libm::floor(args[0]))
}

/// Truncation toward zero.
fn int(args: &[Real]) -> Result<Real> {
    Ok(libm::trunc(args[0]))
}

fn neg(args: &[Real]) -> Result<Real> {
    Ok(-args[0])
}

fn pos(args: &[Real]) -> Result<Real> {
    Ok(args[0])
}

// Binary numeric functions and operators.

fn add(args: &[Real]) -> Result<Real> {
    Ok(args[0] + args[1])
}

fn sub(args: &[Real]) -> Result<Real> {
    Ok(args[0] - args[1])
}

fn mul(args: &[Real]) -> Result<Real> {
    Ok(args[0] * args[1])
}

fn div(args: &[Real]) -> Result<Real> {
    if args[1] == 0.0 {
        return Err(domain("/", args));
    }
    Ok(args[0] / args[1])
}

/// Exponentiation. `0^0 = 1`; `0^negative` and a negative base with a
/// non-integer exponent are domain errors so no NaN can escape.
fn pow(args: &[Real]) -> Result<Real> {
    let (a, b) = (args[0], args[1]);
    if a == 0.0 {
        if b == 0.0 {
            return Ok(1.0);
        }
        if b < 0.0 {
            return Err(domain("^", args));
        }
        return Ok(0.0);
    }
    if a < 0.0 && libm::trunc(b) != b {
        return Err(domain("^", args));
    }
    Ok(libm::pow(a, b))
}

fn min(args: &[Real]) -> Result<Real> {
    Ok(if args[0] < args[1] { args[0] } else { args[1] })
}

fn max(args: &[Real]) -> Result<Real> {
    Ok(if args[0] > args[1] { args[0] } else { args[1] })
}

fn modulo(args: &[Real]) -> Result<Real> {
    if args[1] == 0.0 {
        return Err(domain("MOD", args));
    }
    Ok(libm::fmod(args[0], args[1]))
}

macro_rules! entry {
    ($ident:ident, $name:literal, $arity:literal, $cat:ident, $eval:ident) => {
        pub(crate) static $ident: ElemFunction = ElemFunction {
            name: $name,
            arity: $arity,
            category: FuncCategory::$cat,
            eval: $eval,
        };
    };
}

entry!(SIN, "SIN", 1, Trigonometric, sin);
entry!(COS, "COS", 1, Trigonometric, cos);
entry!(TAN, "TAN", 1, Trigonometric, tan);
entry!(ASIN, "ASIN", 1, Trigonometric, asin);
entry!(ACOS, "ACOS", 1, Trigonometric, acos);
entry!(ATAN, "ATAN", 1, Trigonometric, atan);
entry!(SINH, "SINH", 1, Hyperbolic, sinh);
entry!(COSH, "COSH", 1, Hyperbolic, cosh);
entry!(TANH, "TANH", 1, Hyperbolic, tanh);
entry!(EXP, "EXP", 1, Logarithmic, exp);
entry!(LN, "LN", 1, Logarithmic, ln);
entry!(LOG, "LOG", 1, Logarithmic, log);
entry!(LOG10, "LOG10", 1, Logarithmic, log10);
entry!(SQRT, "SQRT", 1, Power, sqrt);
entry!(ABS, "ABS", 1, Arithmetic, abs);
entry!(CEILING, "CEILING", 1, Rounding, ceiling);
entry!(FLOOR, "FLOOR", 1, Rounding, floor);
entry!(INT, "INT", 1, Rounding, int);
entry!(UMINUS, "UMINUS", 1, Arithmetic, neg);
entry!(UPLUS, "UPLUS", 1, Arithmetic, pos);
entry!(ADD, "+", 2, Arithmetic, add);
entry!(SUB, "-", 2, Arithmetic, sub);
entry!(MUL, "*", 2, Arithmetic, mul);
entry!(DIV, "/", 2, Arithmetic, div);
entry!(POW, "^", 2, Power, pow);
entry!(MIN, "MIN", 2, Arithmetic, min);
entry!(MAX, "MAX", 2, Arithmetic, max);
entry!(MOD, "MOD", 2, Arithmetic, modulo);

static CATALOGUE: &[&ElemFunction] = &[
    &SIN, &COS, &TAN, &ASIN, &ACOS, &ATAN, &SINH, &COSH, &TANH, &EXP, &LN, &LOG, &LOG10, &SQRT,
    &ABS, &CEILING, &FLOOR, &INT, &UMINUS, &UPLUS, &ADD, &SUB, &MUL, &DIV, &POW, &MIN, &MAX, &MOD,
];

static BY_NAME: Lazy<HashMap<&'static str, &'static ElemFunction>> =
    Lazy::new(|| CATALOGUE.iter().map(|e| (e.name, *e)).collect());

/// Look up a catalogue entry by its canonical name.
///
/// Callers fold the name to uppercase first when case-insensitive matching
/// is wanted; the normalizer has already done so for expressions parsed with
/// `caseSensitive` off.
pub fn lookup(name: &str) -> Option<&'static ElemFunction> {
    BY_NAME.get(name).copied()
}

/// All catalogue entries, for documentation and diagnostics.
pub fn entries() -> &'static [&'static ElemFunction] {
    CATALOGUE
}
