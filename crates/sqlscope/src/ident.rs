//! SQL identifiers for tables and columns.
//!
//! An [`Ident`] is either plain (validated against `[A-Za-z_][A-Za-z0-9_$]*` and emitted as-is)
//! or quoted (any characters except NUL, emitted through the dialect's quoting rules). Names
//! that collide with reserved words should be declared quoted.
//!
//! # Example
//! ```ignore
//! use sqlscope::Ident;
//!
//! let plain = Ident::parse("employee")?;
//! let quoted = Ident::quoted("Order")?;
//! # Ok::<(), sqlscope::SqlError>(())
//! ```

use crate::dialect::Dialect;
use crate::error::{SqlError, SqlResult};

/// A single SQL identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Ident {
    /// Plain identifier: must match `[A-Za-z_][A-Za-z0-9_$]*`.
    Plain(String),
    /// Quoted identifier: allows any characters except NUL.
    Quoted(String),
}

impl Ident {
    /// Parse a plain identifier, or a `"quoted"` one when wrapped in double quotes.
    pub fn parse(s: &str) -> SqlResult<Self> {
        if let Some(inner) = s.strip_prefix('"').and_then(|rest| rest.strip_suffix('"')) {
            return Self::quoted(&inner.replace("\"\"", "\""));
        }
        if s.is_empty() {
            return Err(SqlError::validation("Identifier cannot be empty"));
        }

        let mut chars = s.chars();
        if let Some(first) = chars.next() {
            if !(first == '_' || first.is_ascii_alphabetic()) {
                return Err(SqlError::validation(format!(
                    "Invalid identifier start character: '{first}'"
                )));
            }
        }
        if let Some(bad) = chars.find(|c| !(*c == '_' || *c == '$' || c.is_ascii_alphanumeric())) {
            return Err(SqlError::validation(format!(
                "Invalid character in identifier: '{bad}'"
            )));
        }
        Ok(Ident::Plain(s.to_string()))
    }

    /// Create a quoted identifier.
    pub fn quoted(name: &str) -> SqlResult<Self> {
        if name.is_empty() {
            return Err(SqlError::validation("Empty quoted identifier"));
        }
        if name.contains('\0') {
            return Err(SqlError::validation(
                "Identifier cannot contain NUL character",
            ));
        }
        Ok(Ident::Quoted(name.to_string()))
    }

    /// The unquoted name.
    pub fn name(&self) -> &str {
        match self {
            Ident::Plain(s) | Ident::Quoted(s) => s,
        }
    }

    /// Render through the dialect's quoting rules.
    pub fn write_sql(&self, dialect: &dyn Dialect, out: &mut String) {
        match self {
            Ident::Plain(s) => out.push_str(s),
            Ident::Quoted(s) => out.push_str(&dialect.quote_identifier(s)),
        }
    }

    /// Render as a standalone string.
    pub fn to_sql(&self, dialect: &dyn Dialect) -> String {
        let mut out = String::with_capacity(self.name().len() + 2);
        self.write_sql(dialect, &mut out);
        out
    }
}

/// Derive a plain alias stem from an identifier: non-alphanumerics become `_`.
pub(crate) fn alias_stem(ident: &Ident) -> String {
    let mut stem: String = ident
        .name()
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c.to_ascii_lowercase() } else { '_' })
        .collect();
    if !stem.starts_with(|c: char| c == '_' || c.is_ascii_alphabetic()) {
        stem.insert_str(0, "t_");
    }
    stem
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialect::{MySqlDialect, PostgresDialect, SqlServerDialect};

    #[test]
    fn ident_plain() {
        let ident = Ident::parse("employee").unwrap();
        assert_eq!(ident.to_sql(&PostgresDialect), "employee");
    }

    #[test]
    fn ident_quoted_per_dialect() {
        let ident = Ident::parse(r#""Order""#).unwrap();
        assert_eq!(ident.to_sql(&PostgresDialect), r#""Order""#);
        assert_eq!(ident.to_sql(&MySqlDialect), "`Order`");
        assert_eq!(ident.to_sql(&SqlServerDialect), "[Order]");
    }

    #[test]
    fn ident_quoted_escape() {
        let ident = Ident::quoted(r#"has"quote"#).unwrap();
        assert_eq!(ident.to_sql(&PostgresDialect), r#""has""quote""#);
    }

    #[test]
    fn ident_rejects_bad_input() {
        assert!(Ident::parse("").is_err());
        assert!(Ident::parse("1table").is_err());
        assert!(Ident::parse("my table").is_err());
        assert!(Ident::quoted("a\0b").is_err());
    }

    #[test]
    fn alias_stem_sanitizes() {
        assert_eq!(alias_stem(&Ident::quoted("Order Line").unwrap()), "order_line");
        assert_eq!(alias_stem(&Ident::quoted("2024").unwrap()), "t_2024");
    }
}
