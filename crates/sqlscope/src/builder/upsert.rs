//! Upsert syntax families.
//!
//! Databases disagree on how "insert, or do something else if the row exists" is spelled.
//! Each [`Dialect`](crate::Dialect) hands out one [`ConflictSyntax`]:
//!
//! | syntax | dialects | shape |
//! |---|---|---|
//! | [`OnConflictSyntax`] | Postgres, SQLite | `insert ... on conflict (k) do update set c = excluded.c` |
//! | [`OnDuplicateKeySyntax`] | MySQL | `insert ... on duplicate key update c = values(c)` |
//! | [`MergeSyntax`] | H2, SQL Server | `merge into ... using (values ...) ... when matched ...` |
//! | [`NoConflictSyntax`] | none | rejected as unsupported |

use super::alias::AliasTree;
use super::insert::{write_column_list, write_insert_body, write_rows};
use super::support::BuilderSupport;
use crate::dialect::Dialect;
use crate::dsl::{ConflictPolicy, OnConflict, SetValue, UpdateSet};
use crate::error::{SqlError, SqlResult};
use crate::meta::{ColumnRef, Table};
use crate::statement::{AffectedCount, StatementBuffer, UpsertOutcome};
use crate::value::Bound;

/// How a `set` item refers to the value the conflicting insert row carried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExcludedStyle {
    /// `<qualifier>.c`
    Qualified(&'static str),
    /// `values(c)`
    ValuesFunction,
}

/// Writes one upsert statement through a [`ConflictSyntax`].
///
/// Rows carry one value per table column; the writer picks the values each clause needs.
pub struct UpsertWriter<'a> {
    support: BuilderSupport<'a>,
    table: &'a Table,
    conflict: &'a OnConflict,
    columns: &'a [ColumnRef],
    rows: &'a [Vec<Bound>],
}

impl<'a> UpsertWriter<'a> {
    pub(crate) fn new(
        support: BuilderSupport<'a>,
        table: &'a Table,
        conflict: &'a OnConflict,
        columns: &'a [ColumnRef],
        rows: &'a [Vec<Bound>],
    ) -> Self {
        Self {
            support,
            table,
            conflict,
            columns,
            rows,
        }
    }

    pub(crate) fn into_support(self) -> BuilderSupport<'a> {
        self.support
    }

    pub fn dialect(&self) -> &'a dyn Dialect {
        self.support.dialect
    }

    pub fn table(&self) -> &'a Table {
        self.table
    }

    pub fn buf(&mut self) -> &mut StatementBuffer {
        &mut self.support.buf
    }

    pub fn policy(&self) -> &'a ConflictPolicy {
        &self.conflict.policy
    }

    /// Columns present in the insert list (identity columns excluded).
    pub fn columns(&self) -> &'a [ColumnRef] {
        self.columns
    }

    /// Explicit conflict keys, or the primary key.
    pub fn conflict_keys(&self) -> SqlResult<Vec<ColumnRef>> {
        if !self.conflict.keys.is_empty() {
            for key in &self.conflict.keys {
                self.check_owned(key)?;
            }
            return Ok(self.conflict.keys.clone());
        }
        Ok(self
            .table
            .column_refs()
            .into_iter()
            .filter(|c| c.def().primary_key)
            .collect())
    }

    /// `set` items: explicit assignments, or every inserted non-key column taken from the
    /// incoming row. Empty for the ignore policy.
    pub fn update_items(&self) -> SqlResult<Vec<(ColumnRef, SetValue)>> {
        match &self.conflict.policy {
            ConflictPolicy::Ignore => Ok(Vec::new()),
            ConflictPolicy::Update(UpdateSet::AllColumns) => {
                let keys = self.conflict_keys()?;
                Ok(self
                    .columns
                    .iter()
                    .filter(|c| !keys.contains(*c))
                    .map(|c| (c.clone(), SetValue::Excluded(c.clone())))
                    .collect())
            }
            ConflictPolicy::Update(UpdateSet::Assignments(assignments)) => assignments
                .iter()
                .map(|a| {
                    self.check_owned(&a.column)?;
                    if let SetValue::Excluded(column) = &a.value {
                        self.check_owned(column)?;
                    }
                    Ok((a.column.clone(), a.value.clone()))
                })
                .collect(),
        }
    }

    fn check_owned(&self, column: &ColumnRef) -> SqlResult<()> {
        if column.table_id() != self.table.id() {
            return Err(SqlError::validation(format!(
                "upsert of `{}` cannot use `{}` of another table reference",
                self.table.def().name().name(),
                column.name().name()
            )));
        }
        Ok(())
    }

    pub fn append(&mut self, sql: &str) -> &mut Self {
        self.support.append(sql);
        self
    }

    pub fn write_table_name(&mut self) {
        self.support.write_table_name(self.table);
    }

    pub fn write_column_name(&mut self, column: &ColumnRef) {
        self.support.write_column_name(column);
    }

    /// `table.column`
    pub fn write_qualified_column(&mut self, column: &ColumnRef) -> SqlResult<()> {
        self.support.write_column(AliasTree::ROOT, column)
    }

    /// `(a, b)`
    pub fn write_column_list(&mut self, columns: &[ColumnRef]) {
        write_column_list(&mut self.support, columns);
    }

    /// `(?, ?), (?, ?)`: the incoming rows' values for `columns`.
    pub fn write_rows(&mut self, columns: &[ColumnRef]) -> SqlResult<()> {
        write_rows(&mut self.support, columns, self.rows)
    }

    /// `<verb>table (a, b) values (?, ?), ...` over the inserted columns.
    pub fn write_insert(&mut self, verb: &str) -> SqlResult<()> {
        self.support.append(verb);
        write_insert_body(&mut self.support, self.table, self.columns, self.rows)
    }

    pub fn write_excluded(&mut self, style: ExcludedStyle, column: &ColumnRef) {
        match style {
            ExcludedStyle::Qualified(qualifier) => {
                self.support.append(qualifier).append(".");
                self.support.write_column_name(column);
            }
            ExcludedStyle::ValuesFunction => {
                self.support.append("values(");
                self.support.write_column_name(column);
                self.support.append(")");
            }
        }
    }

    /// `c = <value>, ...` for the given items.
    pub fn write_update_set(
        &mut self,
        items: &[(ColumnRef, SetValue)],
        style: ExcludedStyle,
    ) -> SqlResult<()> {
        for (i, (column, value)) in items.iter().enumerate() {
            if i > 0 {
                self.support.append(", ");
            }
            self.support.write_column_name(column);
            self.support.append(" = ");
            match value {
                SetValue::Operand(operand) => {
                    self.support.write_operand(AliasTree::ROOT, operand)?
                }
                SetValue::Excluded(source) => self.write_excluded(style, source),
            }
        }
        Ok(())
    }
}

/// One upsert syntax family.
pub trait ConflictSyntax: Send + Sync {
    fn write_upsert(&self, writer: &mut UpsertWriter<'_>) -> SqlResult<()>;

    /// Interpret the affected count reported for one upserted row.
    fn classify(&self, count: AffectedCount, policy: &ConflictPolicy) -> UpsertOutcome {
        match (count, policy) {
            (AffectedCount::Unknown, _) => UpsertOutcome::Unknown,
            (AffectedCount::Rows(0), _) => UpsertOutcome::Unchanged,
            (AffectedCount::Rows(1), ConflictPolicy::Ignore) => UpsertOutcome::Inserted,
            (AffectedCount::Rows(_), _) => UpsertOutcome::InsertedOrUpdated,
        }
    }
}

fn missing_keys(table: &Table) -> SqlError {
    SqlError::validation(format!(
        "upsert of `{}` needs conflict keys or a primary key",
        table.def().name().name()
    ))
}

/// `on conflict (keys) do update set ... | do nothing`
#[derive(Debug, Default, Clone, Copy)]
pub struct OnConflictSyntax;

impl ConflictSyntax for OnConflictSyntax {
    fn write_upsert(&self, w: &mut UpsertWriter<'_>) -> SqlResult<()> {
        let keys = w.conflict_keys()?;
        let items = w.update_items()?;
        w.write_insert("insert into ")?;
        match w.policy() {
            ConflictPolicy::Ignore => {
                w.append(" on conflict");
                if !keys.is_empty() {
                    w.append(" ");
                    w.write_column_list(&keys);
                }
                w.append(" do nothing");
            }
            ConflictPolicy::Update(_) => {
                if keys.is_empty() {
                    return Err(missing_keys(w.table()));
                }
                w.append(" on conflict ");
                w.write_column_list(&keys);
                if items.is_empty() {
                    w.append(" do nothing");
                } else {
                    w.append(" do update set ");
                    w.write_update_set(&items, ExcludedStyle::Qualified("excluded"))?;
                }
            }
        }
        Ok(())
    }
}

/// `insert ignore` / `on duplicate key update`. Conflict keys are implied by the table's
/// unique indexes.
#[derive(Debug, Default, Clone, Copy)]
pub struct OnDuplicateKeySyntax;

impl ConflictSyntax for OnDuplicateKeySyntax {
    fn write_upsert(&self, w: &mut UpsertWriter<'_>) -> SqlResult<()> {
        let items = w.update_items()?;
        if items.is_empty() {
            return w.write_insert("insert ignore into ");
        }
        w.write_insert("insert into ")?;
        w.append(" on duplicate key update ");
        w.write_update_set(&items, ExcludedStyle::ValuesFunction)
    }

    // 1 = inserted, 2 = updated, 0 = existing row left as it was.
    fn classify(&self, count: AffectedCount, policy: &ConflictPolicy) -> UpsertOutcome {
        match (count, policy) {
            (AffectedCount::Unknown, _) => UpsertOutcome::Unknown,
            (AffectedCount::Rows(0), _) => UpsertOutcome::Unchanged,
            (AffectedCount::Rows(1), _) => UpsertOutcome::Inserted,
            (AffectedCount::Rows(2), ConflictPolicy::Update(_)) => UpsertOutcome::Updated,
            (AffectedCount::Rows(_), _) => UpsertOutcome::InsertedOrUpdated,
        }
    }
}

/// `merge into ... using (values ...) as excluded (...) on (...) when matched ... when not
/// matched ...`
///
/// The source row carries the inserted columns plus any identity key columns, so a row
/// whose identity value is null never matches and is inserted with a generated key.
#[derive(Debug, Default, Clone, Copy)]
pub struct MergeSyntax {
    /// Append `;` (SQL Server requires it after MERGE).
    pub terminated: bool,
}

impl ConflictSyntax for MergeSyntax {
    fn write_upsert(&self, w: &mut UpsertWriter<'_>) -> SqlResult<()> {
        let keys = w.conflict_keys()?;
        if keys.is_empty() {
            return Err(missing_keys(w.table()));
        }
        let items = w.update_items()?;
        let source: Vec<ColumnRef> = w
            .table()
            .column_refs()
            .into_iter()
            .filter(|c| w.columns().contains(c) || keys.contains(c))
            .collect();

        w.append("merge into ");
        w.write_table_name();
        w.append(" using (values ");
        w.write_rows(&source)?;
        w.append(") as excluded ");
        w.write_column_list(&source);
        w.append(" on (");
        for (i, key) in keys.iter().enumerate() {
            if i > 0 {
                w.append(" and ");
            }
            w.write_qualified_column(key)?;
            w.append(" = ");
            w.write_excluded(ExcludedStyle::Qualified("excluded"), key);
        }
        w.append(")");
        if !items.is_empty() {
            w.append(" when matched then update set ");
            w.write_update_set(&items, ExcludedStyle::Qualified("excluded"))?;
        }
        w.append(" when not matched then insert ");
        let columns = w.columns();
        w.write_column_list(columns);
        w.append(" values (");
        for (i, column) in columns.iter().enumerate() {
            if i > 0 {
                w.append(", ");
            }
            w.write_excluded(ExcludedStyle::Qualified("excluded"), column);
        }
        w.append(")");
        if self.terminated {
            w.append(";");
        }
        Ok(())
    }
}

/// For dialects without any upsert statement.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoConflictSyntax;

impl ConflictSyntax for NoConflictSyntax {
    fn write_upsert(&self, w: &mut UpsertWriter<'_>) -> SqlResult<()> {
        Err(SqlError::unsupported(w.dialect().name(), "upsert"))
    }
}
