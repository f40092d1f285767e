//! The splitting parser.
//!
//! Consumes the normalized expression string (see [`crate::normalizer`]) and
//! produces an [`ExprNode`] tree. The grammar is a fixed precedence ladder,
//! lowest binding first:
//!
//! 1. logical `OR`
//! 2. logical `AND`
//! 3. logical `NOT` (prefix, right-associative)
//! 4. comparisons `= <> < <= > >=`
//! 5. additive `+ -`
//! 6. multiplicative `* / MOD`
//! 7. unary `+ -`
//! 8. `^` (right-associative)
//! 9. primary: parenthesized expression, numeric literal, name, call form
//!
//! At each binary level the parser scans the current byte range at
//! parenthesis depth 0 and splits at operator occurrences: all of them for
//! the left-associative levels (folding left), the leftmost one for the
//! right-associative `^`. The parser never copies substrings; every
//! recursion works on `(lo, hi)` byte ranges into the normalized text,
//! which is pure ASCII by construction.
//!
//! Nesting depth is bounded during parse (ladder re-entries through
//! parentheses, call arguments, and the unary chains), so evaluation can
//! recurse freely afterwards.

use std::collections::HashMap;

use crate::error::{FuncError, Result};
use crate::functions::{self, ElemFunction};
use crate::normalizer::{
    AND_OP, GE_OP, IF_MARK, LE_OP, MAX_MARK, MIN_MARK, MOD_OP, NE_OP, NOT_OP, OR_OP,
};
use crate::types::{ComparisonOp, ExprNode, LogicalOperator};
use crate::{constants, Real};

/// Resolution of an identifier against the caller-supplied name lists.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(crate) enum Binding {
    Variable(usize),
    Parameter(usize),
}

/// Parse a normalized expression into a tree.
///
/// `bindings` maps case-folded names to variable/parameter indices;
/// `tolerance` is snapshotted into every comparison node.
pub(crate) fn parse_expression(
    text: &str,
    bindings: &HashMap<String, Binding>,
    tolerance: Real,
    max_depth: usize,
) -> Result<ExprNode> {
    let parser = Parser {
        text,
        bytes: text.as_bytes(),
        bindings,
        tolerance,
        max_depth,
    };
    parser.expr(0, text.len(), 0)
}

/// Human-readable form of a normalized byte, mapping surrogates back to
/// their source spelling for diagnostics.
fn token_text(b: u8) -> String {
    match b {
        AND_OP => "AND".to_string(),
        OR_OP => "OR".to_string(),
        NOT_OP => "NOT".to_string(),
        IF_MARK => "IF".to_string(),
        MOD_OP => "MOD".to_string(),
        MIN_MARK => "MIN".to_string(),
        MAX_MARK => "MAX".to_string(),
        LE_OP => "<=".to_string(),
        GE_OP => ">=".to_string(),
        NE_OP => "<>".to_string(),
        other => (other as char).to_string(),
    }
}

struct Parser<'a> {
    text: &'a str,
    bytes: &'a [u8],
    bindings: &'a HashMap<String, Binding>,
    tolerance: Real,
    max_depth: usize,
}

impl<'a> Parser<'a> {
    /// Ladder top. Re-entered for parenthesized groups and call arguments.
    fn expr(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.check_depth(depth)?;
        self.or_level(lo, hi, depth)
    }

    fn check_depth(&self, depth: usize) -> Result<()> {
        if depth > self.max_depth {
            return Err(FuncError::RecursionLimit {
                limit: self.max_depth,
            });
        }
        Ok(())
    }

    fn unexpected(&self, at: usize) -> FuncError {
        let found = if at < self.bytes.len() {
            token_text(self.bytes[at])
        } else {
            "end of expression".to_string()
        };
        FuncError::UnexpectedToken {
            position: at + 1,
            found,
        }
    }

    /// Depth-0 occurrences of `ops` in `lo..hi` that sit in a binary
    /// position, in left-to-right order.
    fn split_points(&self, lo: usize, hi: usize, ops: &[u8]) -> Vec<(usize, u8)> {
        let mut points = Vec::new();
        let mut depth = 0usize;
        for i in lo..hi {
            match self.bytes[i] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b if depth == 0 && ops.contains(&b) && self.is_binary_position(lo, i) => {
                    points.push((i, b));
                }
                _ => {}
            }
        }
        points
    }

    /// An operator byte is binary only when something evaluable precedes
    /// it; a sign after `(`, `,` or another operator is unary, and the sign
    /// inside a scientific literal (`2.5e-3`) is part of the number.
    fn is_binary_position(&self, lo: usize, i: usize) -> bool {
        if i == lo {
            return false;
        }
        let prev = self.bytes[i - 1];
        let operand_before =
            prev.is_ascii_alphanumeric() || prev == b'_' || prev == b'.' || prev == b')';
        if !operand_before {
            return false;
        }
        let b = self.bytes[i];
        if (b == b'+' || b == b'-') && self.is_exponent_sign(lo, i) {
            return false;
        }
        true
    }

    /// True when the sign at `i` belongs to the exponent of a numeric
    /// literal: preceded by `e`/`E` at the end of a digit run that starts a
    /// token (so `2e-5` is one literal while `xe-5` subtracts from `xe`).
    fn is_exponent_sign(&self, lo: usize, i: usize) -> bool {
        if i < lo + 2 {
            return false;
        }
        let e = self.bytes[i - 1];
        if e != b'e' && e != b'E' {
            return false;
        }
        let mut j = i - 2;
        let mut digits = 0usize;
        loop {
            let b = self.bytes[j];
            if b.is_ascii_digit() {
                digits += 1;
            } else if b != b'.' {
                break;
            }
            if j == lo {
                return digits > 0;
            }
            j -= 1;
        }
        digits > 0 && !(self.bytes[j].is_ascii_alphanumeric() || self.bytes[j] == b'_')
    }

    /// Shared shape of the left-associative binary levels: split at every
    /// depth-0 occurrence and fold left, or fall through to the next level.
    fn binary_level(
        &self,
        lo: usize,
        hi: usize,
        ops: &[u8],
        next: &dyn Fn(usize, usize) -> Result<ExprNode>,
        build: &dyn Fn(u8, ExprNode, ExprNode) -> ExprNode,
    ) -> Result<ExprNode> {
        let points = self.split_points(lo, hi, ops);
        if points.is_empty() {
            return next(lo, hi);
        }
        let mut acc = next(lo, points[0].0)?;
        for (k, (pos, op)) in points.iter().enumerate() {
            let end = points.get(k + 1).map(|p| p.0).unwrap_or(hi);
            let rhs = next(pos + 1, end)?;
            acc = build(*op, acc, rhs);
        }
        Ok(acc)
    }

    fn or_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.binary_level(
            lo,
            hi,
            &[OR_OP],
            &|l, h| self.and_level(l, h, depth),
            &|_, left, right| ExprNode::Logical {
                op: LogicalOperator::Or,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    fn and_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.binary_level(
            lo,
            hi,
            &[AND_OP],
            &|l, h| self.not_level(l, h, depth),
            &|_, left, right| ExprNode::Logical {
                op: LogicalOperator::And,
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    fn not_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.check_depth(depth)?;
        if lo < hi && self.bytes[lo] == NOT_OP {
            Ok(ExprNode::Not {
                operand: Box::new(self.not_level(lo + 1, hi, depth + 1)?),
            })
        } else {
            self.comparison_level(lo, hi, depth)
        }
    }

    fn comparison_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        let tolerance = self.tolerance;
        self.binary_level(
            lo,
            hi,
            &[b'=', NE_OP, b'<', LE_OP, b'>', GE_OP],
            &|l, h| self.additive_level(l, h, depth),
            &move |op, left, right| {
                let op = match op {
                    b'=' => ComparisonOp::Eq,
                    NE_OP => ComparisonOp::Ne,
                    b'<' => ComparisonOp::Lt,
                    LE_OP => ComparisonOp::Le,
                    b'>' => ComparisonOp::Gt,
                    _ => ComparisonOp::Ge,
                };
                ExprNode::Comparison {
                    op,
                    tolerance,
                    left: Box::new(left),
                    right: Box::new(right),
                }
            },
        )
    }

    fn additive_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.binary_level(
            lo,
            hi,
            &[b'+', b'-'],
            &|l, h| self.multiplicative_level(l, h, depth),
            &|op, left, right| ExprNode::Binary {
                entry: if op == b'+' {
                    &functions::ADD
                } else {
                    &functions::SUB
                },
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    fn multiplicative_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.binary_level(
            lo,
            hi,
            &[b'*', b'/', MOD_OP],
            &|l, h| self.unary_level(l, h, depth),
            &|op, left, right| ExprNode::Binary {
                entry: match op {
                    b'*' => &functions::MUL,
                    b'/' => &functions::DIV,
                    _ => &functions::MOD,
                },
                left: Box::new(left),
                right: Box::new(right),
            },
        )
    }

    fn unary_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.check_depth(depth)?;
        if lo < hi && (self.bytes[lo] == b'+' || self.bytes[lo] == b'-') {
            let entry = if self.bytes[lo] == b'-' {
                &functions::UMINUS
            } else {
                &functions::UPLUS
            };
            Ok(ExprNode::Unary {
                entry,
                operand: Box::new(self.unary_level(lo + 1, hi, depth + 1)?),
            })
        } else {
            self.power_level(lo, hi, depth)
        }
    }

    /// `^` is right-associative: split at the leftmost depth-0 occurrence;
    /// the exponent side re-enters the unary level so `2^-1` parses.
    fn power_level(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        self.check_depth(depth)?;
        let points = self.split_points(lo, hi, &[b'^']);
        match points.first() {
            None => self.primary(lo, hi, depth),
            Some((pos, _)) => Ok(ExprNode::Binary {
                entry: &functions::POW,
                left: Box::new(self.primary(lo, *pos, depth)?),
                right: Box::new(self.unary_level(pos + 1, hi, depth + 1)?),
            }),
        }
    }

    fn primary(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        if lo == hi {
            return Err(FuncError::EmptySubexpression { position: lo + 1 });
        }
        match self.bytes[lo] {
            b'(' => {
                let close = self.matching_paren(lo, hi)?;
                if close == hi - 1 {
                    // Outermost parentheses: strip and restart the ladder.
                    self.expr(lo + 1, hi - 1, depth + 1)
                } else {
                    Err(self.unexpected(close + 1))
                }
            }
            b'0'..=b'9' => self.literal(lo, hi),
            IF_MARK => self.conditional(lo, hi, depth),
            MIN_MARK => self.surrogate_call(&functions::MIN, lo, hi, depth),
            MAX_MARK => self.surrogate_call(&functions::MAX, lo, hi, depth),
            MOD_OP => self.surrogate_call(&functions::MOD, lo, hi, depth),
            b',' => Err(FuncError::EmptySubexpression { position: lo + 1 }),
            b if b.is_ascii_alphabetic() || b == b'_' => self.name_or_call(lo, hi, depth),
            _ => Err(self.unexpected(lo)),
        }
    }

    fn literal(&self, lo: usize, hi: usize) -> Result<ExprNode> {
        let mut i = lo;
        while i < hi && self.bytes[i].is_ascii_digit() {
            i += 1;
        }
        if i < hi && self.bytes[i] == b'.' {
            i += 1;
            let frac_start = i;
            while i < hi && self.bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == frac_start {
                return Err(self.unexpected(i));
            }
        }
        if i < hi && (self.bytes[i] == b'e' || self.bytes[i] == b'E') {
            i += 1;
            if i < hi && (self.bytes[i] == b'+' || self.bytes[i] == b'-') {
                i += 1;
            }
            let exp_start = i;
            while i < hi && self.bytes[i].is_ascii_digit() {
                i += 1;
            }
            if i == exp_start {
                return Err(self.unexpected(i));
            }
        }
        if i != hi {
            return Err(self.unexpected(i));
        }
        match self.text[lo..hi].parse::<Real>() {
            Ok(v) => Ok(ExprNode::Constant(v)),
            Err(_) => Err(self.unexpected(lo)),
        }
    }

    fn name_or_call(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        let mut j = lo;
        while j < hi && (self.bytes[j].is_ascii_alphanumeric() || self.bytes[j] == b'_') {
            j += 1;
        }
        let name = &self.text[lo..j];
        if j == hi {
            // Plain name: reserved constant, then variable, then parameter.
            return match name {
                "PI" => Ok(ExprNode::Constant(constants::PI)),
                "E" => Ok(ExprNode::Constant(constants::E)),
                _ => match self.bindings.get(name) {
                    Some(Binding::Variable(i)) => Ok(ExprNode::Variable(*i)),
                    Some(Binding::Parameter(i)) => Ok(ExprNode::Parameter(*i)),
                    None => Err(FuncError::UnknownIdentifier {
                        name: name.to_string(),
                        position: lo + 1,
                    }),
                },
            };
        }
        if self.bytes[j] != b'(' {
            return Err(self.unexpected(j));
        }
        let close = self.matching_paren(j, hi)?;
        if close != hi - 1 {
            return Err(self.unexpected(close + 1));
        }
        let entry = functions::lookup(name).ok_or_else(|| FuncError::UnknownFunction {
            name: name.to_string(),
            position: lo + 1,
        })?;
        self.call(entry, j + 1, hi - 1, depth)
    }

    /// Call form reached through a surrogate character (`MIN`, `MAX`, and
    /// `MOD` in its `MOD(a,b)` spelling).
    fn surrogate_call(
        &self,
        entry: &'static ElemFunction,
        lo: usize,
        hi: usize,
        depth: usize,
    ) -> Result<ExprNode> {
        if lo + 1 >= hi || self.bytes[lo + 1] != b'(' {
            return Err(self.unexpected(lo));
        }
        let close = self.matching_paren(lo + 1, hi)?;
        if close != hi - 1 {
            return Err(self.unexpected(close + 1));
        }
        self.call(entry, lo + 2, hi - 1, depth)
    }

    fn call(
        &self,
        entry: &'static ElemFunction,
        lo: usize,
        hi: usize,
        depth: usize,
    ) -> Result<ExprNode> {
        let ranges = self.argument_ranges(lo, hi)?;
        if ranges.len() != entry.arity {
            return Err(FuncError::Arity {
                function: entry.name.to_string(),
                expected: entry.arity,
                found: ranges.len(),
            });
        }
        let mut args = Vec::with_capacity(ranges.len());
        for (a, b) in ranges {
            args.push(self.expr(a, b, depth + 1)?);
        }
        let mut args = args.into_iter();
        match entry.arity {
            1 => Ok(ExprNode::Unary {
                entry,
                operand: Box::new(args.next().ok_or_else(|| {
                    FuncError::ContractViolation("argument vector drained".to_string())
                })?),
            }),
            _ => {
                let left = args.next();
                let right = args.next();
                match (left, right) {
                    (Some(left), Some(right)) => Ok(ExprNode::Binary {
                        entry,
                        left: Box::new(left),
                        right: Box::new(right),
                    }),
                    _ => Err(FuncError::ContractViolation(
                        "argument vector drained".to_string(),
                    )),
                }
            }
        }
    }

    fn conditional(&self, lo: usize, hi: usize, depth: usize) -> Result<ExprNode> {
        if lo + 1 >= hi || self.bytes[lo + 1] != b'(' {
            return Err(self.unexpected(lo));
        }
        let close = self.matching_paren(lo + 1, hi)?;
        if close != hi - 1 {
            return Err(self.unexpected(close + 1));
        }
        let ranges = self.argument_ranges(lo + 2, hi - 1)?;
        if ranges.len() != 3 {
            return Err(FuncError::Arity {
                function: "IF".to_string(),
                expected: 3,
                found: ranges.len(),
            });
        }
        let mut nodes = Vec::with_capacity(3);
        for (a, b) in ranges {
            nodes.push(self.expr(a, b, depth + 1)?);
        }
        let mut nodes = nodes.into_iter();
        match (nodes.next(), nodes.next(), nodes.next()) {
            (Some(condition), Some(if_true), Some(if_false)) => Ok(ExprNode::Conditional {
                condition: Box::new(condition),
                if_true: Box::new(if_true),
                if_false: Box::new(if_false),
            }),
            _ => Err(FuncError::ContractViolation(
                "argument vector drained".to_string(),
            )),
        }
    }

    /// Split a call's argument list (the range inside the parentheses) at
    /// depth-0 commas. An empty slot is an error; empty parentheses are an
    /// empty list.
    fn argument_ranges(&self, lo: usize, hi: usize) -> Result<Vec<(usize, usize)>> {
        if lo == hi {
            return Ok(Vec::new());
        }
        let mut ranges = Vec::new();
        let mut start = lo;
        let mut depth = 0usize;
        for i in lo..hi {
            match self.bytes[i] {
                b'(' => depth += 1,
                b')' => depth = depth.saturating_sub(1),
                b',' if depth == 0 => {
                    ranges.push((start, i));
                    start = i + 1;
                }
                _ => {}
            }
        }
        ranges.push((start, hi));
        for &(a, b) in &ranges {
            if a == b {
                return Err(FuncError::EmptySubexpression { position: a + 1 });
            }
        }
        Ok(ranges)
    }

    /// Index of the `)` matching the `(` at `open`, scanning within
    /// `open..hi`. The normalizer has validated global balance, so a miss
    /// can only come from a malformed range and is reported as unbalanced.
    fn matching_paren(&self, open: usize, hi: usize) -> Result<usize> {
        let mut depth = 0usize;
        for i in open..hi {
            match self.bytes[i] {
                b'(' => depth += 1,
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        return Ok(i);
                    }
                }
                _ => {}
            }
        }
        Err(FuncError::Unbalanced { position: open + 1 })
    }
}
