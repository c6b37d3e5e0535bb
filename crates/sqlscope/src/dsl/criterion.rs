use super::context::SelectContext;
use super::operand::{LikeOption, Operand};
use std::sync::Arc;

/// A pair of operands compared as a row value.
pub type OperandPair = (Operand, Operand);

/// A node of the filter tree.
///
/// Trees are built by [`FilterScope`](super::FilterScope) and never change afterwards.
/// Child order is significant: it fixes both the rendered SQL and the parameter order.
#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Eq(Operand, Operand),
    NotEq(Operand, Operand),
    Less(Operand, Operand),
    LessEq(Operand, Operand),
    Greater(Operand, Operand),
    GreaterEq(Operand, Operand),
    IsNull(Operand),
    IsNotNull(Operand),
    Like(Operand, Operand, LikeOption),
    NotLike(Operand, Operand, LikeOption),
    Between(Operand, (Operand, Operand)),
    NotBetween(Operand, (Operand, Operand)),
    InList(Operand, Vec<Operand>),
    NotInList(Operand, Vec<Operand>),
    InSubQuery(Operand, Arc<SelectContext>),
    NotInSubQuery(Operand, Arc<SelectContext>),
    InList2(OperandPair, Vec<OperandPair>),
    NotInList2(OperandPair, Vec<OperandPair>),
    InSubQuery2(OperandPair, Arc<SelectContext>),
    NotInSubQuery2(OperandPair, Arc<SelectContext>),
    Exists(Arc<SelectContext>),
    NotExists(Arc<SelectContext>),
    And(Vec<Criterion>),
    Or(Vec<Criterion>),
    Not(Vec<Criterion>),
}

impl Criterion {
    /// The sub-query this node embeds, if any.
    pub fn sub_query(&self) -> Option<&Arc<SelectContext>> {
        match self {
            Criterion::InSubQuery(_, q)
            | Criterion::NotInSubQuery(_, q)
            | Criterion::InSubQuery2(_, q)
            | Criterion::NotInSubQuery2(_, q)
            | Criterion::Exists(q)
            | Criterion::NotExists(q) => Some(q),
            _ => None,
        }
    }

    /// Children of a combinator node; empty for leaves.
    pub fn children(&self) -> &[Criterion] {
        match self {
            Criterion::And(c) | Criterion::Or(c) | Criterion::Not(c) => c,
            _ => &[],
        }
    }

    /// Every sub-query this node and its children embed at the current query level,
    /// operands included, in the order they appear in the SQL.
    pub fn sub_queries(&self) -> Vec<&Arc<SelectContext>> {
        let mut out = Vec::new();
        self.collect_sub_queries(&mut out);
        out
    }

    pub(crate) fn collect_sub_queries<'a>(&'a self, out: &mut Vec<&'a Arc<SelectContext>>) {
        fn operand<'a>(o: &'a Operand, out: &mut Vec<&'a Arc<SelectContext>>) {
            if let Some(sub) = o.sub_query() {
                out.push(sub);
            }
        }
        match self {
            Criterion::Eq(l, r)
            | Criterion::NotEq(l, r)
            | Criterion::Less(l, r)
            | Criterion::LessEq(l, r)
            | Criterion::Greater(l, r)
            | Criterion::GreaterEq(l, r)
            | Criterion::Like(l, r, _)
            | Criterion::NotLike(l, r, _) => {
                operand(l, out);
                operand(r, out);
            }
            Criterion::IsNull(o) | Criterion::IsNotNull(o) => operand(o, out),
            Criterion::Between(o, (start, end)) | Criterion::NotBetween(o, (start, end)) => {
                operand(o, out);
                operand(start, out);
                operand(end, out);
            }
            Criterion::InList(o, values) | Criterion::NotInList(o, values) => {
                operand(o, out);
                for value in values {
                    operand(value, out);
                }
            }
            Criterion::InSubQuery(o, sub) | Criterion::NotInSubQuery(o, sub) => {
                operand(o, out);
                out.push(sub);
            }
            Criterion::InList2((a, b), values) | Criterion::NotInList2((a, b), values) => {
                operand(a, out);
                operand(b, out);
                for (x, y) in values {
                    operand(x, out);
                    operand(y, out);
                }
            }
            Criterion::InSubQuery2((a, b), sub) | Criterion::NotInSubQuery2((a, b), sub) => {
                operand(a, out);
                operand(b, out);
                out.push(sub);
            }
            Criterion::Exists(sub) | Criterion::NotExists(sub) => out.push(sub),
            Criterion::And(children) | Criterion::Or(children) | Criterion::Not(children) => {
                for child in children {
                    child.collect_sub_queries(out);
                }
            }
        }
    }
}
