//! Table metamodel.
//!
//! This is the interface consumed from the entity-mapping layer: table and column names,
//! semantic types, and how key values are assigned. A [`Table`] is a *reference* to a
//! [`TableDef`]; two references to the same definition (see [`Table::alias`]) are distinct
//! tables as far as alias assignment is concerned, which is what makes self-joins work.

use crate::error::{SqlError, SqlResult};
use crate::ident::Ident;
use crate::value::{SqlParam, SqlType, Value};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_TABLE_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique identity of a table reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableId(u64);

impl TableId {
    fn next() -> Self {
        TableId(NEXT_TABLE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// How a column value is assigned on insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Generation {
    /// Supplied by the caller.
    #[default]
    None,
    /// Assigned by the database (auto-increment / identity). Never written by insert or upsert.
    Identity,
}

/// A column definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDef {
    pub name: Ident,
    pub ty: SqlType,
    pub nullable: bool,
    pub primary_key: bool,
    pub generation: Generation,
}

impl ColumnDef {
    pub fn new(name: Ident, ty: SqlType) -> Self {
        Self {
            name,
            ty,
            nullable: false,
            primary_key: false,
            generation: Generation::None,
        }
    }

    /// Whether the database assigns this column's value on insert.
    pub fn is_identity(&self) -> bool {
        self.generation == Generation::Identity
    }
}

/// A table definition: name, optional schema, and ordered columns.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDef {
    name: Ident,
    schema: Option<Ident>,
    columns: Vec<ColumnDef>,
}

impl TableDef {
    /// Start building a table definition.
    pub fn builder(name: &str) -> TableDefBuilder {
        TableDefBuilder::new(name)
    }

    pub fn name(&self) -> &Ident {
        &self.name
    }

    pub fn schema(&self) -> Option<&Ident> {
        self.schema.as_ref()
    }

    pub fn columns(&self) -> &[ColumnDef] {
        &self.columns
    }

    fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name.name() == name)
    }

    /// Whether any column is database-assigned.
    pub fn has_identity(&self) -> bool {
        self.columns.iter().any(ColumnDef::is_identity)
    }
}

/// Builder for [`TableDef`].
///
/// Invalid names are recorded and reported by [`TableDefBuilder::build`].
#[derive(Debug)]
pub struct TableDefBuilder {
    name: String,
    schema: Option<String>,
    columns: Vec<ColumnDef>,
    build_error: Option<SqlError>,
}

impl TableDefBuilder {
    fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            schema: None,
            columns: Vec::new(),
            build_error: None,
        }
    }

    /// Set the schema the table lives in.
    pub fn schema(mut self, schema: &str) -> Self {
        self.schema = Some(schema.to_string());
        self
    }

    fn push(mut self, name: &str, ty: SqlType, f: impl FnOnce(&mut ColumnDef)) -> Self {
        match Ident::parse(name) {
            Ok(ident) => {
                let mut def = ColumnDef::new(ident, ty);
                f(&mut def);
                self.columns.push(def);
            }
            Err(e) => {
                self.build_error.get_or_insert(e);
            }
        }
        self
    }

    /// Add a regular, non-null column.
    pub fn column(self, name: &str, ty: SqlType) -> Self {
        self.push(name, ty, |_| {})
    }

    /// Add a nullable column.
    pub fn nullable(self, name: &str, ty: SqlType) -> Self {
        self.push(name, ty, |c| c.nullable = true)
    }

    /// Add a caller-assigned primary key column.
    pub fn id(self, name: &str, ty: SqlType) -> Self {
        self.push(name, ty, |c| c.primary_key = true)
    }

    /// Add a database-assigned (identity) primary key column.
    pub fn identity(self, name: &str, ty: SqlType) -> Self {
        self.push(name, ty, |c| {
            c.primary_key = true;
            c.generation = Generation::Identity;
        })
    }

    /// Add a fully specified column.
    pub fn column_def(mut self, def: ColumnDef) -> Self {
        self.columns.push(def);
        self
    }

    /// Finish the definition and create the first reference to it.
    pub fn build(self) -> SqlResult<Table> {
        if let Some(e) = self.build_error {
            return Err(e);
        }
        let name = Ident::parse(&self.name)?;
        let schema = self.schema.as_deref().map(Ident::parse).transpose()?;
        if self.columns.is_empty() {
            return Err(SqlError::validation(format!(
                "table `{}` has no columns",
                name.name()
            )));
        }
        for (i, col) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == col.name) {
                return Err(SqlError::validation(format!(
                    "duplicate column `{}` in table `{}`",
                    col.name.name(),
                    name.name()
                )));
            }
        }
        Ok(Table::new(TableDef {
            name,
            schema,
            columns: self.columns,
        }))
    }
}

/// A reference to a table within statements.
#[derive(Clone)]
pub struct Table {
    id: TableId,
    def: Arc<TableDef>,
}

impl Table {
    pub fn new(def: TableDef) -> Self {
        Self {
            id: TableId::next(),
            def: Arc::new(def),
        }
    }

    /// Another, distinct reference to the same table (for self-joins and correlated sub-queries).
    pub fn alias(&self) -> Table {
        Self {
            id: TableId::next(),
            def: Arc::clone(&self.def),
        }
    }

    pub fn id(&self) -> TableId {
        self.id
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    /// Typed handle to a column of this table reference.
    ///
    /// Fails if the column does not exist or `T` does not match the declared type.
    pub fn column<T: SqlParam>(&self, name: &str) -> SqlResult<Column<T>> {
        let inner = self.column_ref(name)?;
        if inner.ty() != T::SQL_TYPE {
            return Err(SqlError::validation(format!(
                "column `{}.{}` is {:?}, not {:?}",
                self.def.name.name(),
                name,
                inner.ty(),
                T::SQL_TYPE
            )));
        }
        Ok(Column {
            inner,
            _marker: PhantomData,
        })
    }

    /// Untyped handle to a column of this table reference.
    pub fn column_ref(&self, name: &str) -> SqlResult<ColumnRef> {
        let index = self.def.position(name).ok_or_else(|| {
            SqlError::validation(format!(
                "table `{}` has no column `{}`",
                self.def.name.name(),
                name
            ))
        })?;
        Ok(self.column_at(index))
    }

    pub(crate) fn column_at(&self, index: usize) -> ColumnRef {
        ColumnRef {
            table: self.id,
            def: Arc::clone(&self.def),
            index,
        }
    }

    /// All columns, in declaration order.
    pub fn column_refs(&self) -> Vec<ColumnRef> {
        (0..self.def.columns.len()).map(|i| self.column_at(i)).collect()
    }
}

impl PartialEq for Table {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl fmt::Debug for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Table")
            .field("id", &self.id)
            .field("name", &self.def.name.name())
            .finish()
    }
}

/// Untyped column handle bound to a table reference.
#[derive(Clone)]
pub struct ColumnRef {
    table: TableId,
    def: Arc<TableDef>,
    index: usize,
}

impl ColumnRef {
    pub fn table_id(&self) -> TableId {
        self.table
    }

    pub fn table_def(&self) -> &TableDef {
        &self.def
    }

    pub fn def(&self) -> &ColumnDef {
        &self.def.columns[self.index]
    }

    pub fn name(&self) -> &Ident {
        &self.def().name
    }

    pub fn ty(&self) -> SqlType {
        self.def().ty
    }

    /// Position of the column in its table's declaration order.
    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl PartialEq for ColumnRef {
    fn eq(&self, other: &Self) -> bool {
        self.table == other.table && self.index == other.index
    }
}

impl fmt::Debug for ColumnRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ColumnRef({}#{:?}.{})",
            self.def.name.name(),
            self.table,
            self.name().name()
        )
    }
}

/// Typed column handle. `T` is the Rust type of values compared against or stored in it.
pub struct Column<T> {
    inner: ColumnRef,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Column<T> {
    pub fn as_ref(&self) -> &ColumnRef {
        &self.inner
    }
}

impl<T> Clone for Column<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Column<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.inner.fmt(f)
    }
}

/// A row to be written: one value per table column, in declaration order.
///
/// Implemented by the entity-mapping layer; `Vec<Value>` works out of the box.
pub trait Entity {
    fn values(&self) -> Vec<Value>;
}

impl Entity for Vec<Value> {
    fn values(&self) -> Vec<Value> {
        self.clone()
    }
}

impl<E: Entity + ?Sized> Entity for &E {
    fn values(&self) -> Vec<Value> {
        (**self).values()
    }
}
