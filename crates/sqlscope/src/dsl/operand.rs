//! Operands: the leaves of a criterion.

use super::context::SelectContext;
use crate::meta::{Column, ColumnRef};
use crate::value::{Bound, SqlParam};
use std::marker::PhantomData;
use std::ops::Add;
use std::sync::Arc;

/// A criterion operand.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Column of a table in the current (or an enclosing) scope.
    Column(ColumnRef),
    /// Column resolved starting from the enclosing scope of a sub-query.
    Outer(ColumnRef),
    /// Bound value.
    Parameter(Bound),
    /// Scalar sub-query. It must select exactly one column.
    SubQuery(Arc<SelectContext>),
    /// LIKE pattern joined from fragments, each escaped according to its own option.
    Pattern(Vec<PatternPart>),
}

impl Operand {
    pub fn param<T: SqlParam>(value: T) -> Self {
        Operand::Parameter(Bound {
            value: value.into_value(),
            ty: T::SQL_TYPE,
        })
    }

    pub fn column<T>(column: &Column<T>) -> Self {
        Operand::Column(column.as_ref().clone())
    }

    pub fn is_parameter(&self) -> bool {
        matches!(self, Operand::Parameter(_))
    }

    pub fn sub_query(&self) -> Option<&Arc<SelectContext>> {
        match self {
            Operand::SubQuery(sub) => Some(sub),
            _ => None,
        }
    }
}

/// Anything that can stand where a value of type `T` is expected.
///
/// Returns `None` for an absent optional literal: the criterion it would have been part of
/// is skipped.
pub trait IntoOperand<T> {
    fn into_operand(self) -> Option<Operand>;
}

impl<T: SqlParam> IntoOperand<T> for T {
    fn into_operand(self) -> Option<Operand> {
        Some(Operand::param(self))
    }
}

impl<T: SqlParam> IntoOperand<T> for Option<T> {
    fn into_operand(self) -> Option<Operand> {
        self.map(Operand::param)
    }
}

impl<T> IntoOperand<T> for &Column<T> {
    fn into_operand(self) -> Option<Operand> {
        Some(Operand::column(self))
    }
}

impl<T> IntoOperand<T> for Outer<T> {
    fn into_operand(self) -> Option<Operand> {
        Some(Operand::Outer(self.column))
    }
}

impl IntoOperand<String> for &str {
    fn into_operand(self) -> Option<Operand> {
        Some(Operand::param(self.to_string()))
    }
}

impl IntoOperand<String> for Option<&str> {
    fn into_operand(self) -> Option<Operand> {
        self.map(|s| Operand::param(s.to_string()))
    }
}

/// Explicit reference to a column of an enclosing query, for correlated sub-queries that
/// reuse the same table reference inside.
#[derive(Debug)]
pub struct Outer<T> {
    column: ColumnRef,
    _marker: PhantomData<fn() -> T>,
}

/// Refer to `column` as seen from the enclosing query.
pub fn outer<T>(column: &Column<T>) -> Outer<T> {
    Outer {
        column: column.as_ref().clone(),
        _marker: PhantomData,
    }
}

/// How a LIKE literal is escaped and wrapped with wildcards at build time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LikeOption {
    /// Used as-is; `%` and `_` keep their wildcard meaning.
    #[default]
    None,
    /// Wildcards are escaped and match literally.
    Escape,
    /// Escaped, then `%` appended.
    Prefix,
    /// Escaped, then wrapped in `%`.
    Infix,
    /// Escaped, then `%` prepended.
    Suffix,
}

/// One fragment of a LIKE pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternPart {
    pub text: String,
    pub option: LikeOption,
}

/// A LIKE pattern literal with its escaping option.
///
/// Patterns concatenate with `+`, each fragment keeping its own option:
/// `escape("50%") + text("%")` matches values starting with a literal `50%`. An absent
/// fragment makes the whole pattern absent.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    pub(crate) parts: Option<Vec<PatternPart>>,
}

impl Add for Pattern {
    type Output = Pattern;

    fn add(self, rhs: Pattern) -> Pattern {
        let parts = match (self.parts, rhs.parts) {
            (Some(mut left), Some(right)) => {
                left.extend(right);
                Some(left)
            }
            _ => None,
        };
        Pattern { parts }
    }
}

/// Text usable as a LIKE literal. `None` skips the criterion.
pub trait PatternText {
    fn into_text(self) -> Option<String>;
}

impl PatternText for &str {
    fn into_text(self) -> Option<String> {
        Some(self.to_string())
    }
}

impl PatternText for String {
    fn into_text(self) -> Option<String> {
        Some(self)
    }
}

impl PatternText for &String {
    fn into_text(self) -> Option<String> {
        Some(self.clone())
    }
}

impl PatternText for Option<&str> {
    fn into_text(self) -> Option<String> {
        self.map(str::to_string)
    }
}

impl PatternText for Option<String> {
    fn into_text(self) -> Option<String> {
        self
    }
}

/// Right-hand side of `like` / `not_like`.
pub trait IntoPattern {
    fn into_pattern(self) -> Pattern;
}

impl IntoPattern for Pattern {
    fn into_pattern(self) -> Pattern {
        self
    }
}

impl<S: PatternText> IntoPattern for S {
    fn into_pattern(self) -> Pattern {
        pattern(self, LikeOption::None)
    }
}

fn pattern(text: impl PatternText, option: LikeOption) -> Pattern {
    Pattern {
        parts: text
            .into_text()
            .map(|text| vec![PatternPart { text, option }]),
    }
}

/// Pattern used verbatim.
pub fn text(s: impl PatternText) -> Pattern {
    pattern(s, LikeOption::None)
}

/// Pattern whose wildcards match literally.
pub fn escape(s: impl PatternText) -> Pattern {
    pattern(s, LikeOption::Escape)
}

/// Escaped pattern matching values that start with `s`.
pub fn as_prefix(s: impl PatternText) -> Pattern {
    pattern(s, LikeOption::Prefix)
}

/// Escaped pattern matching values that contain `s`.
pub fn as_infix(s: impl PatternText) -> Pattern {
    pattern(s, LikeOption::Infix)
}

/// Escaped pattern matching values that end with `s`.
pub fn as_suffix(s: impl PatternText) -> Pattern {
    pattern(s, LikeOption::Suffix)
}
