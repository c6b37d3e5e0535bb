use super::alias::AliasTree;
use super::support::BuilderSupport;
use super::upsert::UpsertWriter;
use super::{built, options_or};
use crate::config::QueryOptions;
use crate::dialect::Dialect;
use crate::dsl::InsertContext;
use crate::error::{SqlError, SqlResult};
use crate::logging;
use crate::meta::{ColumnRef, Table};
use crate::statement::{BatchStatement, Statement};
use crate::value::{Bound, Value};

/// Builds `insert` statements, and upserts when the context carries a conflict clause.
///
/// Rows supply one value per table column. Identity columns are left out of the insert
/// list; their values are only read where an upsert needs them to find the existing row.
pub struct InsertStatementBuilder<'a> {
    dialect: &'a dyn Dialect,
    ctx: &'a InsertContext,
}

impl<'a> InsertStatementBuilder<'a> {
    pub fn new(dialect: &'a dyn Dialect, ctx: &'a InsertContext) -> Self {
        Self { dialect, ctx }
    }

    fn kind(&self) -> &'static str {
        if self.ctx.conflict.is_some() {
            "upsert"
        } else {
            "insert"
        }
    }

    /// One row.
    pub fn build_single(&self, row: &[Value], defaults: &QueryOptions) -> SqlResult<Statement> {
        let options = options_or(&self.ctx.options, defaults);
        let bound = vec![bind_row(&self.ctx.target, row)?];
        let statement = self.render(&bound, options)?;
        Ok(built(self.kind(), self.dialect, options, statement))
    }

    /// Several rows in one multi-row VALUES statement.
    ///
    /// No rows yields an empty statement, which executors skip.
    pub fn build_multiple(
        &self,
        rows: &[Vec<Value>],
        defaults: &QueryOptions,
    ) -> SqlResult<Statement> {
        let options = options_or(&self.ctx.options, defaults);
        if rows.is_empty() {
            return Ok(Statement::empty());
        }
        if rows.len() > 1 && !self.dialect.supports_multi_row_insert() {
            return Err(SqlError::unsupported(
                self.dialect.name(),
                "multi-row insert",
            ));
        }
        let bound = rows
            .iter()
            .map(|row| bind_row(&self.ctx.target, row))
            .collect::<SqlResult<Vec<_>>>()?;
        let statement = self.render(&bound, options)?;
        Ok(built(self.kind(), self.dialect, options, statement))
    }

    /// One single-row statement reused for every row.
    pub fn build_batch(
        &self,
        rows: &[Vec<Value>],
        defaults: &QueryOptions,
    ) -> SqlResult<BatchStatement> {
        let options = options_or(&self.ctx.options, defaults);
        let target = &self.ctx.target;
        if target.def().has_identity() && !self.dialect.supports_batch_generated_keys() {
            return Err(SqlError::unsupported(
                self.dialect.name(),
                format!(
                    "batch {} into `{}`: generated keys cannot be retrieved from a batch",
                    self.kind(),
                    target.def().name().name()
                ),
            ));
        }

        let mut sql = None;
        let mut params = Vec::with_capacity(rows.len());
        for row in rows {
            let statement = self.render(&[bind_row(target, row)?], options)?;
            if sql.is_none() {
                sql = Some(statement.sql().to_string());
            }
            params.push(statement.values().to_vec());
        }
        let sql = match sql {
            Some(sql) => sql,
            None => {
                let template = vec![Value::Null; target.def().columns().len()];
                self.render(&[bind_row(target, &template)?], options)?
                    .sql()
                    .to_string()
            }
        };

        logging::log_built(
            if self.ctx.conflict.is_some() {
                "batch_upsert"
            } else {
                "batch_insert"
            },
            self.dialect.name(),
            &sql,
            params.len(),
            options.max_sql_length,
        );
        Ok(BatchStatement::new(sql, params, options.batch_size))
    }

    fn render(&self, rows: &[Vec<Bound>], options: &QueryOptions) -> SqlResult<Statement> {
        let target = &self.ctx.target;
        let columns = insert_columns(target);
        if columns.is_empty() {
            return Err(SqlError::validation(format!(
                "table `{}` has no insertable columns",
                target.def().name().name()
            )));
        }
        let aliases = AliasTree::for_target(target, self.ctx.sub_queries());
        let mut support = BuilderSupport::new(self.dialect, &aliases, options);

        match &self.ctx.conflict {
            None => {
                support.append("insert into ");
                write_insert_body(&mut support, target, &columns, rows)?;
            }
            Some(conflict) => {
                let mut writer = UpsertWriter::new(support, target, conflict, &columns, rows);
                self.dialect.conflict_syntax().write_upsert(&mut writer)?;
                support = writer.into_support();
            }
        }

        if self.ctx.returning {
            if !self.dialect.supports_returning() {
                return Err(SqlError::unsupported(self.dialect.name(), "returning"));
            }
            support.append(" returning ");
            for (i, column) in generated_columns(target).iter().enumerate() {
                if i > 0 {
                    support.append(", ");
                }
                support.write_column_name(column);
            }
        }
        Ok(support.finish())
    }
}

/// Columns written by an insert: every column except identity ones.
pub(crate) fn insert_columns(table: &Table) -> Vec<ColumnRef> {
    table
        .column_refs()
        .into_iter()
        .filter(|c| !c.def().is_identity())
        .collect()
}

/// Identity columns, or the primary key when there are none.
fn generated_columns(table: &Table) -> Vec<ColumnRef> {
    let identity: Vec<_> = table
        .column_refs()
        .into_iter()
        .filter(|c| c.def().is_identity())
        .collect();
    if !identity.is_empty() {
        return identity;
    }
    table
        .column_refs()
        .into_iter()
        .filter(|c| c.def().primary_key)
        .collect()
}

/// `table (a, b) values (?, ?), (?, ?)`
pub(crate) fn write_insert_body(
    support: &mut BuilderSupport<'_>,
    table: &Table,
    columns: &[ColumnRef],
    rows: &[Vec<Bound>],
) -> SqlResult<()> {
    support.write_table_name(table);
    support.append(" ");
    write_column_list(support, columns);
    support.append(" values ");
    write_rows(support, columns, rows)
}

pub(crate) fn write_column_list(support: &mut BuilderSupport<'_>, columns: &[ColumnRef]) {
    support.append("(");
    for (i, column) in columns.iter().enumerate() {
        if i > 0 {
            support.append(", ");
        }
        support.write_column_name(column);
    }
    support.append(")");
}

/// `(?, ?), (?, ?)`: the values of `columns` taken from each full table row.
pub(crate) fn write_rows(
    support: &mut BuilderSupport<'_>,
    columns: &[ColumnRef],
    rows: &[Vec<Bound>],
) -> SqlResult<()> {
    for (i, row) in rows.iter().enumerate() {
        if i > 0 {
            support.append(", ");
        }
        support.append("(");
        for (j, column) in columns.iter().enumerate() {
            if j > 0 {
                support.append(", ");
            }
            let value = row.get(column.index()).ok_or_else(|| {
                SqlError::validation(format!(
                    "row has no value for column `{}`",
                    column.name().name()
                ))
            })?;
            support.buf.bind(value.clone());
        }
        support.append(")");
    }
    Ok(())
}

/// Check a row against the table and tag every value with its column type.
fn bind_row(table: &Table, row: &[Value]) -> SqlResult<Vec<Bound>> {
    let columns = table.def().columns();
    if row.len() != columns.len() {
        return Err(SqlError::validation(format!(
            "row for `{}` has {} values, expected {}",
            table.def().name().name(),
            row.len(),
            columns.len()
        )));
    }
    let mut bound = Vec::with_capacity(row.len());
    for (column, value) in columns.iter().zip(row) {
        if let Some(ty) = value.sql_type() {
            if ty != column.ty {
                return Err(SqlError::validation(format!(
                    "value for `{}.{}` is {:?}, expected {:?}",
                    table.def().name().name(),
                    column.name.name(),
                    ty,
                    column.ty
                )));
            }
        }
        bound.push(Bound {
            value: value.clone(),
            ty: column.ty,
        });
    }
    Ok(bound)
}
