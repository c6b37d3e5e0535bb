//! Table alias assignment.
//!
//! Every query level (the statement itself and each nested sub-query) is a scope. Aliases
//! are assigned once, before any SQL is written, in declaration order: the scope's own
//! tables first (target, then joins), then nested sub-queries depth-first in the order
//! they appear in the SQL. A sub-query reached from two different scopes (a reusable
//! filter applied at two nesting levels) gets a scope under each. The first reference to
//! a table is aliased by the table's own name; later references to a name already taken
//! anywhere in the statement get `_1`, `_2`, ... suffixes. Two distinct table references therefore never share an alias, and building
//! the same context twice yields the same aliases.

use crate::dsl::SelectContext;
use crate::ident::{Ident, alias_stem};
use crate::meta::{Table, TableId};
use std::collections::{HashMap, HashSet};
use std::sync::Arc;

pub(crate) type ScopeId = usize;

#[derive(Debug)]
struct Scope {
    parent: Option<ScopeId>,
    aliases: Vec<(TableId, Ident)>,
}

#[derive(Debug)]
pub(crate) struct AliasTree {
    scopes: Vec<Scope>,
    sub_queries: HashMap<(ScopeId, *const SelectContext), ScopeId>,
}

impl AliasTree {
    pub const ROOT: ScopeId = 0;

    pub fn for_select(ctx: &SelectContext) -> Self {
        Self::build(ctx.tables(), ctx.sub_queries())
    }

    /// Root scope of a mutation: just the target plus the sub-queries it uses.
    pub fn for_target<'a>(
        target: &'a Table,
        sub_queries: impl IntoIterator<Item = &'a Arc<SelectContext>>,
    ) -> Self {
        Self::build(std::iter::once(target), sub_queries)
    }

    fn build<'a>(
        tables: impl Iterator<Item = &'a Table>,
        sub_queries: impl IntoIterator<Item = &'a Arc<SelectContext>>,
    ) -> Self {
        let mut tree = AliasTree {
            scopes: Vec::new(),
            sub_queries: HashMap::new(),
        };
        let mut used = HashSet::new();
        tree.add_scope(None, tables, sub_queries, &mut used);
        tree
    }

    fn add_scope<'a>(
        &mut self,
        parent: Option<ScopeId>,
        tables: impl Iterator<Item = &'a Table>,
        sub_queries: impl IntoIterator<Item = &'a Arc<SelectContext>>,
        used: &mut HashSet<String>,
    ) -> ScopeId {
        let id = self.scopes.len();
        let mut aliases: Vec<(TableId, Ident)> = Vec::new();
        for table in tables {
            if aliases.iter().any(|(t, _)| *t == table.id()) {
                continue;
            }
            aliases.push((table.id(), next_alias(table, used)));
        }
        self.scopes.push(Scope { parent, aliases });
        for sub in sub_queries {
            self.add_sub_query(id, sub, used);
        }
        id
    }

    fn add_sub_query(
        &mut self,
        parent: ScopeId,
        sub: &Arc<SelectContext>,
        used: &mut HashSet<String>,
    ) {
        let key = (parent, Arc::as_ptr(sub));
        if self.sub_queries.contains_key(&key) {
            return;
        }
        let id = self.add_scope(Some(parent), sub.tables(), sub.sub_queries(), used);
        self.sub_queries.insert(key, id);
    }

    /// Scope assigned to a sub-query nested directly in `parent`.
    pub fn scope_of(&self, parent: ScopeId, sub: &Arc<SelectContext>) -> Option<ScopeId> {
        self.sub_queries.get(&(parent, Arc::as_ptr(sub))).copied()
    }

    pub fn parent(&self, scope: ScopeId) -> Option<ScopeId> {
        self.scopes.get(scope).and_then(|s| s.parent)
    }

    /// Alias of a table introduced directly by `scope`.
    pub fn local(&self, scope: ScopeId, table: TableId) -> Option<&Ident> {
        self.scopes
            .get(scope)?
            .aliases
            .iter()
            .find(|(t, _)| *t == table)
            .map(|(_, alias)| alias)
    }

    /// Alias visible from `scope`: the scope itself, then its ancestors.
    pub fn resolve(&self, scope: ScopeId, table: TableId) -> Option<&Ident> {
        let mut current = Some(scope);
        while let Some(id) = current {
            if let Some(alias) = self.local(id, table) {
                return Some(alias);
            }
            current = self.parent(id);
        }
        None
    }
}

fn next_alias(table: &Table, used: &mut HashSet<String>) -> Ident {
    let name = table.def().name();
    let key = name.name().to_lowercase();
    if used.insert(key) {
        return name.clone();
    }
    let stem = alias_stem(name);
    let mut n = 1usize;
    loop {
        let candidate = format!("{stem}_{n}");
        if used.insert(candidate.clone()) {
            return Ident::Plain(candidate);
        }
        n += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dsl::{self, Criterion};
    use crate::meta::TableDef;
    use crate::value::SqlType;

    fn table(name: &str) -> Table {
        TableDef::builder(name)
            .id("id", SqlType::Int)
            .nullable("manager_id", SqlType::Int)
            .build()
            .unwrap()
    }

    #[test]
    fn first_reference_keeps_table_name() {
        let e = table("employee");
        let a = table("address");
        let query = dsl::from(&e).inner_join(&a, |_| {});
        let tree = AliasTree::for_select(query.context());
        assert_eq!(tree.local(AliasTree::ROOT, e.id()).map(Ident::name), Some("employee"));
        assert_eq!(tree.local(AliasTree::ROOT, a.id()).map(Ident::name), Some("address"));
    }

    #[test]
    fn self_join_gets_suffix() {
        let e = table("employee");
        let m = e.alias();
        let query = dsl::from(&e).left_join(&m, |_| {});
        let tree = AliasTree::for_select(query.context());
        assert_eq!(tree.local(AliasTree::ROOT, e.id()).map(Ident::name), Some("employee"));
        assert_eq!(tree.local(AliasTree::ROOT, m.id()).map(Ident::name), Some("employee_1"));
    }

    #[test]
    fn nested_scopes_are_injective_and_resolve_through_parents() {
        let e = table("employee");
        let inner = e.alias();
        let sub = Arc::new(dsl::from(&inner).context().clone());
        let mut ctx = dsl::from(&e).context().clone();
        ctx.filter.push(Criterion::Exists(Arc::clone(&sub)));
        ctx.filter.push(Criterion::NotExists(Arc::new(dsl::from(&e).context().clone())));

        let tree = AliasTree::for_select(&ctx);
        let first = tree.scope_of(AliasTree::ROOT, &sub).unwrap();
        assert_eq!(tree.local(first, inner.id()).map(Ident::name), Some("employee_1"));
        // outer table is visible from the sub-query
        assert_eq!(tree.resolve(first, e.id()).map(Ident::name), Some("employee"));
        assert_eq!(tree.parent(first), Some(AliasTree::ROOT));

        let ctx2 = AliasTree::for_select(&ctx);
        assert_eq!(
            ctx2.local(first, inner.id()).map(Ident::name),
            Some("employee_1")
        );
    }

    #[test]
    fn same_reference_in_sub_query_is_shadowed() {
        let e = table("employee");
        let sub = Arc::new(dsl::from(&e).context().clone());
        let mut ctx = dsl::from(&e).context().clone();
        ctx.filter.push(Criterion::Exists(Arc::clone(&sub)));

        let tree = AliasTree::for_select(&ctx);
        let scope = tree.scope_of(AliasTree::ROOT, &sub).unwrap();
        assert_eq!(tree.resolve(scope, e.id()).map(Ident::name), Some("employee_1"));
        assert_eq!(
            tree.resolve(tree.parent(scope).unwrap(), e.id()).map(Ident::name),
            Some("employee")
        );
    }

    #[test]
    fn shared_sub_query_gets_a_scope_per_parent() {
        let e = table("employee");
        let a = table("address");
        let shared = Arc::new(dsl::from(&a).context().clone());

        let inner = e.alias();
        let mut nested = dsl::from(&inner).context().clone();
        nested.filter.push(Criterion::Exists(Arc::clone(&shared)));
        let nested = Arc::new(nested);

        let mut ctx = dsl::from(&e).context().clone();
        ctx.filter.push(Criterion::Exists(Arc::clone(&shared)));
        ctx.filter.push(Criterion::Exists(Arc::clone(&nested)));
        // same level twice: one scope
        ctx.filter.push(Criterion::NotExists(Arc::clone(&shared)));

        let tree = AliasTree::for_select(&ctx);
        let top = tree.scope_of(AliasTree::ROOT, &shared).unwrap();
        let middle = tree.scope_of(AliasTree::ROOT, &nested).unwrap();
        let deep = tree.scope_of(middle, &shared).unwrap();
        assert_ne!(top, deep);
        assert_eq!(tree.parent(deep), Some(middle));
        assert_eq!(tree.local(top, a.id()).map(Ident::name), Some("address"));
        assert_eq!(tree.local(deep, a.id()).map(Ident::name), Some("address_1"));
        assert!(tree.scope_of(top, &shared).is_none());
    }

    #[test]
    fn unknown_table_does_not_resolve() {
        let e = table("employee");
        let other = table("other");
        let tree = AliasTree::for_select(dsl::from(&e).context());
        assert!(tree.resolve(AliasTree::ROOT, other.id()).is_none());
    }
}
