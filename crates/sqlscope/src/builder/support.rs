//! Rendering shared by every statement builder.

use super::alias::{AliasTree, ScopeId};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::dsl::{
    Aggregate, Criterion, JoinKind, LikeOption, NullsOrder, Operand, PatternPart, Projection,
    SelectContext, SelectItem, SortOrder,
};
use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use crate::meta::{ColumnRef, Table};
use crate::statement::{Statement, StatementBuffer};
use crate::value::{Bound, Value};
use std::sync::Arc;

pub(crate) struct BuilderSupport<'a> {
    pub dialect: &'a dyn Dialect,
    pub aliases: &'a AliasTree,
    pub options: &'a QueryOptions,
    pub buf: StatementBuffer,
}

impl<'a> BuilderSupport<'a> {
    pub fn new(dialect: &'a dyn Dialect, aliases: &'a AliasTree, options: &'a QueryOptions) -> Self {
        Self {
            dialect,
            aliases,
            options,
            buf: StatementBuffer::new(),
        }
    }

    pub fn finish(self) -> Statement {
        self.buf.finish(self.dialect)
    }

    pub fn append(&mut self, sql: &str) -> &mut Self {
        self.buf.append(sql);
        self
    }

    pub fn write_ident(&mut self, ident: &Ident) {
        let mut out = String::new();
        ident.write_sql(self.dialect, &mut out);
        self.buf.append(&out);
    }

    /// `schema.table`, without alias.
    pub fn write_table_name(&mut self, table: &Table) {
        if let Some(schema) = table.def().schema() {
            self.write_ident(schema);
            self.buf.append(".");
        }
        self.write_ident(table.def().name());
    }

    /// Table name followed by its alias when the alias differs from the name.
    pub fn write_table(&mut self, scope: ScopeId, table: &Table) -> SqlResult<()> {
        self.write_table_name(table);
        let alias = self
            .aliases
            .local(scope, table.id())
            .ok_or_else(|| unknown_table(table, "*"))?
            .clone();
        if &alias != table.def().name() {
            self.buf.append(" ");
            self.write_ident(&alias);
        }
        Ok(())
    }

    /// Unqualified column name, as required in insert lists and `set` targets.
    pub fn write_column_name(&mut self, column: &ColumnRef) {
        self.write_ident(column.name());
    }

    fn write_qualified(&mut self, scope: Option<ScopeId>, column: &ColumnRef) -> SqlResult<()> {
        let alias = scope
            .and_then(|s| self.aliases.resolve(s, column.table_id()))
            .ok_or_else(|| SqlError::UnknownTable {
                table: column.table_def().name().name().to_string(),
                column: column.name().name().to_string(),
            })?
            .clone();
        self.write_ident(&alias);
        self.buf.append(".");
        self.write_ident(column.name());
        Ok(())
    }

    pub fn write_column(&mut self, scope: ScopeId, column: &ColumnRef) -> SqlResult<()> {
        self.write_qualified(Some(scope), column)
    }

    pub fn write_operand(&mut self, scope: ScopeId, operand: &Operand) -> SqlResult<()> {
        match operand {
            Operand::Column(column) => self.write_qualified(Some(scope), column),
            Operand::Outer(column) => self.write_qualified(self.aliases.parent(scope), column),
            Operand::Parameter(bound) => {
                self.buf.bind(bound.clone());
                Ok(())
            }
            Operand::SubQuery(sub) => self.write_sub_query(scope, sub, 1),
            Operand::Pattern(parts) => {
                let pattern = self.pattern_text(parts, &self.escape_sequence());
                self.buf.bind(Bound::text(pattern));
                Ok(())
            }
        }
    }

    /// Criteria joined by ` and `.
    pub fn write_criteria(&mut self, scope: ScopeId, criteria: &[Criterion]) -> SqlResult<()> {
        for (i, criterion) in criteria.iter().enumerate() {
            if i > 0 {
                self.buf.append(" and ");
            }
            self.write_criterion(scope, criterion)?;
        }
        Ok(())
    }

    fn write_binary(
        &mut self,
        scope: ScopeId,
        left: &Operand,
        op: &str,
        right: &Operand,
    ) -> SqlResult<()> {
        self.write_operand(scope, left)?;
        self.buf.append(op);
        self.write_operand(scope, right)
    }

    fn write_criterion(&mut self, scope: ScopeId, criterion: &Criterion) -> SqlResult<()> {
        match criterion {
            Criterion::Eq(l, r) => self.write_binary(scope, l, " = ", r),
            Criterion::NotEq(l, r) => self.write_binary(scope, l, " <> ", r),
            Criterion::Less(l, r) => self.write_binary(scope, l, " < ", r),
            Criterion::LessEq(l, r) => self.write_binary(scope, l, " <= ", r),
            Criterion::Greater(l, r) => self.write_binary(scope, l, " > ", r),
            Criterion::GreaterEq(l, r) => self.write_binary(scope, l, " >= ", r),
            Criterion::IsNull(o) => {
                self.write_operand(scope, o)?;
                self.buf.append(" is null");
                Ok(())
            }
            Criterion::IsNotNull(o) => {
                self.write_operand(scope, o)?;
                self.buf.append(" is not null");
                Ok(())
            }
            Criterion::Like(l, r, option) => self.write_like(scope, l, " like ", r, *option),
            Criterion::NotLike(l, r, option) => {
                self.write_like(scope, l, " not like ", r, *option)
            }
            Criterion::Between(o, (start, end)) => {
                self.write_between(scope, o, " between ", start, end)
            }
            Criterion::NotBetween(o, (start, end)) => {
                self.write_between(scope, o, " not between ", start, end)
            }
            Criterion::InList(o, values) => self.write_in_list(scope, o, values, false),
            Criterion::NotInList(o, values) => self.write_in_list(scope, o, values, true),
            Criterion::InSubQuery(o, sub) => {
                self.write_operand(scope, o)?;
                self.buf.append(" in ");
                self.write_sub_query(scope, sub, 1)
            }
            Criterion::NotInSubQuery(o, sub) => {
                self.write_operand(scope, o)?;
                self.buf.append(" not in ");
                self.write_sub_query(scope, sub, 1)
            }
            Criterion::InList2(pair, values) => self.write_in_list2(scope, pair, values, false),
            Criterion::NotInList2(pair, values) => self.write_in_list2(scope, pair, values, true),
            Criterion::InSubQuery2(pair, sub) => {
                self.write_in_sub_query2(scope, pair, " in ", sub)
            }
            Criterion::NotInSubQuery2(pair, sub) => {
                self.write_in_sub_query2(scope, pair, " not in ", sub)
            }
            Criterion::Exists(sub) => {
                self.buf.append("exists ");
                self.write_sub_query(scope, sub, 0)
            }
            Criterion::NotExists(sub) => {
                self.buf.append("not exists ");
                self.write_sub_query(scope, sub, 0)
            }
            Criterion::And(children) => self.write_group(scope, children, " and ", "1 = 1"),
            Criterion::Or(children) => self.write_group(scope, children, " or ", "1 = 0"),
            Criterion::Not(children) => {
                if children.is_empty() {
                    self.buf.append("1 = 0");
                    return Ok(());
                }
                self.buf.append("not (");
                self.write_criteria(scope, children)?;
                self.buf.append(")");
                Ok(())
            }
        }
    }

    fn write_group(
        &mut self,
        scope: ScopeId,
        children: &[Criterion],
        separator: &str,
        empty: &str,
    ) -> SqlResult<()> {
        if children.is_empty() {
            self.buf.append(empty);
            return Ok(());
        }
        let parenthesize = children.len() > 1;
        if parenthesize {
            self.buf.append("(");
        }
        for (i, child) in children.iter().enumerate() {
            if i > 0 {
                self.buf.append(separator);
            }
            self.write_criterion(scope, child)?;
        }
        if parenthesize {
            self.buf.append(")");
        }
        Ok(())
    }

    fn escape_sequence(&self) -> String {
        self.options
            .escape_sequence
            .clone()
            .unwrap_or_else(|| self.dialect.escape_sequence().to_string())
    }

    fn write_like(
        &mut self,
        scope: ScopeId,
        left: &Operand,
        op: &str,
        right: &Operand,
        option: LikeOption,
    ) -> SqlResult<()> {
        self.write_operand(scope, left)?;
        self.buf.append(op);
        let single;
        let parts = match (option, right) {
            (_, Operand::Pattern(parts)) => parts.as_slice(),
            (LikeOption::None, _) => return self.write_operand(scope, right),
            (
                _,
                Operand::Parameter(Bound {
                    value: Value::Text(text),
                    ..
                }),
            ) => {
                single = [PatternPart {
                    text: text.clone(),
                    option,
                }];
                &single[..]
            }
            _ => return self.write_operand(scope, right),
        };
        let escape = self.escape_sequence();
        let pattern = self.pattern_text(parts, &escape);
        self.buf.bind(Bound::text(pattern));
        if !escape.is_empty() && parts.iter().any(|p| p.option != LikeOption::None) {
            self.buf.append(" escape ");
            self.buf.bind(Bound::text(escape));
        }
        Ok(())
    }

    /// Escape and wrap each fragment per its option, then join them.
    fn pattern_text(&self, parts: &[PatternPart], escape: &str) -> String {
        let mut out = String::new();
        for part in parts {
            if part.option == LikeOption::None {
                out.push_str(&part.text);
                continue;
            }
            let escaped = if escape.is_empty() {
                part.text.clone()
            } else {
                self.dialect.escape(&part.text, escape)
            };
            match part.option {
                LikeOption::Prefix => {
                    out.push_str(&escaped);
                    out.push('%');
                }
                LikeOption::Infix => {
                    out.push('%');
                    out.push_str(&escaped);
                    out.push('%');
                }
                LikeOption::Suffix => {
                    out.push('%');
                    out.push_str(&escaped);
                }
                LikeOption::Escape | LikeOption::None => out.push_str(&escaped),
            }
        }
        out
    }

    fn write_between(
        &mut self,
        scope: ScopeId,
        operand: &Operand,
        op: &str,
        start: &Operand,
        end: &Operand,
    ) -> SqlResult<()> {
        self.write_operand(scope, operand)?;
        self.buf.append(op);
        self.write_operand(scope, start)?;
        self.buf.append(" and ");
        self.write_operand(scope, end)
    }

    fn write_in_list(
        &mut self,
        scope: ScopeId,
        operand: &Operand,
        values: &[Operand],
        negated: bool,
    ) -> SqlResult<()> {
        if values.is_empty() {
            self.buf.append(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        self.write_operand(scope, operand)?;
        self.buf.append(if negated { " not in (" } else { " in (" });
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                self.buf.append(", ");
            }
            self.write_operand(scope, value)?;
        }
        self.buf.append(")");
        Ok(())
    }

    fn write_pair(&mut self, scope: ScopeId, pair: &(Operand, Operand)) -> SqlResult<()> {
        self.buf.append("(");
        self.write_operand(scope, &pair.0)?;
        self.buf.append(", ");
        self.write_operand(scope, &pair.1)?;
        self.buf.append(")");
        Ok(())
    }

    fn write_in_list2(
        &mut self,
        scope: ScopeId,
        pair: &(Operand, Operand),
        values: &[(Operand, Operand)],
        negated: bool,
    ) -> SqlResult<()> {
        if values.is_empty() {
            self.buf.append(if negated { "1 = 1" } else { "1 = 0" });
            return Ok(());
        }
        if self.dialect.supports_row_value_in_list() {
            self.write_pair(scope, pair)?;
            self.buf.append(if negated { " not in (" } else { " in (" });
            for (i, value) in values.iter().enumerate() {
                if i > 0 {
                    self.buf.append(", ");
                }
                self.write_pair(scope, value)?;
            }
            self.buf.append(")");
            return Ok(());
        }
        // Expanded form: ((a = ? and b = ?) or (a = ? and b = ?))
        if negated {
            self.buf.append("not ");
        }
        self.buf.append("(");
        for (i, (first, second)) in values.iter().enumerate() {
            if i > 0 {
                self.buf.append(" or ");
            }
            self.buf.append("(");
            self.write_binary(scope, &pair.0, " = ", first)?;
            self.buf.append(" and ");
            self.write_binary(scope, &pair.1, " = ", second)?;
            self.buf.append(")");
        }
        self.buf.append(")");
        Ok(())
    }

    fn write_in_sub_query2(
        &mut self,
        scope: ScopeId,
        pair: &(Operand, Operand),
        op: &str,
        sub: &Arc<SelectContext>,
    ) -> SqlResult<()> {
        if !self.dialect.supports_row_value_in_subquery() {
            return Err(SqlError::unsupported(
                self.dialect.name(),
                "row value compared with a sub-query",
            ));
        }
        self.write_pair(scope, pair)?;
        self.buf.append(op);
        self.write_sub_query(scope, sub, 2)
    }

    /// `(select ...)` rendered into this buffer, so its parameters stay in textual order.
    /// `width` is the required select-list width, or 0 for any.
    fn write_sub_query(
        &mut self,
        scope: ScopeId,
        sub: &Arc<SelectContext>,
        width: usize,
    ) -> SqlResult<()> {
        if width > 0 && sub.width() != width {
            return Err(SqlError::validation(format!(
                "sub-query must select {width} column(s), found {}",
                sub.width()
            )));
        }
        let child = self
            .aliases
            .scope_of(scope, sub)
            .ok_or_else(|| SqlError::validation("sub-query was not registered with the alias scope"))?;
        self.buf.append("(");
        self.write_select(child, sub)?;
        self.buf.append(")");
        Ok(())
    }

    fn write_select_item(&mut self, scope: ScopeId, item: &SelectItem) -> SqlResult<()> {
        match item {
            SelectItem::Column(column) => self.write_column(scope, column),
            SelectItem::Aggregate(aggregate) => {
                let (function, column) = match aggregate {
                    Aggregate::CountAll => {
                        self.buf.append("count(*)");
                        return Ok(());
                    }
                    Aggregate::Count(c) => ("count(", c),
                    Aggregate::Max(c) => ("max(", c),
                    Aggregate::Min(c) => ("min(", c),
                };
                self.buf.append(function);
                self.write_column(scope, column)?;
                self.buf.append(")");
                Ok(())
            }
            SelectItem::SubQuery(sub) => self.write_sub_query(scope, sub, 1),
        }
    }

    /// A complete select at `scope`.
    pub fn write_select(&mut self, scope: ScopeId, ctx: &SelectContext) -> SqlResult<()> {
        let mut seen = Vec::new();
        for table in ctx.tables() {
            if seen.contains(&table.id()) {
                return Err(SqlError::validation(format!(
                    "table reference `{}` appears twice in one query; use Table::alias()",
                    table.def().name().name()
                )));
            }
            seen.push(table.id());
        }

        self.buf.append("select ");
        if ctx.distinct {
            self.buf.append("distinct ");
        }
        match &ctx.projection {
            Projection::AllColumns => {
                for (i, column) in ctx.target.column_refs().iter().enumerate() {
                    if i > 0 {
                        self.buf.append(", ");
                    }
                    self.write_column(scope, column)?;
                }
            }
            Projection::Items(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        self.buf.append(", ");
                    }
                    self.write_select_item(scope, item)?;
                }
            }
        }

        self.buf.append(" from ");
        self.write_table(scope, &ctx.target)?;
        for join in &ctx.joins {
            self.buf.append(match join.kind {
                JoinKind::Inner => " inner join ",
                JoinKind::Left => " left outer join ",
            });
            self.write_table(scope, &join.table)?;
            self.buf.append(" on ");
            if join.on.is_empty() {
                self.buf.append("1 = 1");
            } else {
                self.write_criteria(scope, &join.on)?;
            }
        }

        if !ctx.filter.is_empty() {
            self.buf.append(" where ");
            self.write_criteria(scope, &ctx.filter)?;
        }

        if !ctx.order_by.is_empty() {
            self.buf.append(" order by ");
            for (i, item) in ctx.order_by.iter().enumerate() {
                if i > 0 {
                    self.buf.append(", ");
                }
                self.write_column(scope, &item.column)?;
                self.buf.append(match item.order {
                    SortOrder::Asc => " asc",
                    SortOrder::Desc => " desc",
                });
                if let Some(nulls) = item.nulls {
                    if !self.dialect.supports_nulls_ordering() {
                        return Err(SqlError::unsupported(self.dialect.name(), "nulls ordering"));
                    }
                    self.buf.append(match nulls {
                        NullsOrder::First => " nulls first",
                        NullsOrder::Last => " nulls last",
                    });
                }
            }
        }

        self.dialect.write_offset_limit(
            &mut self.buf,
            ctx.offset,
            ctx.limit,
            !ctx.order_by.is_empty(),
        );

        if let Some(lock) = &ctx.for_update {
            self.dialect.write_for_update(&mut self.buf, lock)?;
        }
        Ok(())
    }
}

fn unknown_table(table: &Table, column: &str) -> SqlError {
    SqlError::UnknownTable {
        table: table.def().name().name().to_string(),
        column: column.to_string(),
    }
}
