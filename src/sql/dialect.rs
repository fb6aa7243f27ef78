//! Target SQL engines and their per-dialect options.

use serde::{Deserialize, Serialize};
use std::fmt;

/// SQL dialect variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Dialect {
    #[default]
    #[serde(rename = "MySQL")]
    MySQL,
    #[serde(rename = "PostgreSQL")]
    PostgreSQL,
    #[serde(rename = "Oracle")]
    Oracle,
    #[serde(rename = "SQL Server")]
    SqlServer,
    #[serde(rename = "SQLite")]
    SQLite,
}

impl Dialect {
    pub const ALL: [Dialect; 5] = [
        Self::MySQL,
        Self::PostgreSQL,
        Self::Oracle,
        Self::SqlServer,
        Self::SQLite,
    ];

    /// Parse dialect from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().replace([' ', '_', '-'], "").as_str() {
            "mysql" | "mariadb" => Some(Self::MySQL),
            "postgres" | "postgresql" | "pg" => Some(Self::PostgreSQL),
            "oracle" => Some(Self::Oracle),
            "sqlserver" | "mssql" | "tsql" => Some(Self::SqlServer),
            "sqlite" | "sqlite3" => Some(Self::SQLite),
            _ => None,
        }
    }

    /// Display name used in generated header comments.
    pub fn name(&self) -> &'static str {
        match self {
            Self::MySQL => "MySQL",
            Self::PostgreSQL => "PostgreSQL",
            Self::Oracle => "Oracle",
            Self::SqlServer => "SQL Server",
            Self::SQLite => "SQLite",
        }
    }

    /// Default identifier quoting for this dialect.
    pub fn default_quote_style(&self) -> QuoteStyle {
        match self {
            Self::MySQL => QuoteStyle::Backtick,
            Self::PostgreSQL | Self::Oracle | Self::SQLite => QuoteStyle::Double,
            Self::SqlServer => QuoteStyle::Brackets,
        }
    }

    /// Oracle and SQL Server name their PRIMARY KEY / UNIQUE / CHECK
    /// constraints; the others inline them.
    pub fn names_table_constraints(&self) -> bool {
        matches!(self, Self::Oracle | Self::SqlServer)
    }

    pub fn supports_on_update(&self) -> bool {
        !matches!(self, Self::Oracle | Self::SQLite)
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Identifier quote override.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuoteStyle {
    Single,
    Double,
    Backtick,
    Brackets,
    None,
}

impl QuoteStyle {
    /// Opening and closing quote characters, `None` for unquoted.
    pub fn delimiters(&self) -> Option<(char, char)> {
        match self {
            Self::Single => Some(('\'', '\'')),
            Self::Double => Some(('"', '"')),
            Self::Backtick => Some(('`', '`')),
            Self::Brackets => Some(('[', ']')),
            Self::None => None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DialectOptions {
    pub version: Option<String>,
    /// MySQL only.
    pub charset: Option<String>,
    /// MySQL only.
    pub collation: Option<String>,
    pub schema: Option<String>,
    pub identifier_quotes: Option<QuoteStyle>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_aliases() {
        assert_eq!(Dialect::from_str("postgres"), Some(Dialect::PostgreSQL));
        assert_eq!(Dialect::from_str("SQL Server"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::from_str("mssql"), Some(Dialect::SqlServer));
        assert_eq!(Dialect::from_str("SQLite"), Some(Dialect::SQLite));
        assert_eq!(Dialect::from_str("db2"), None);
    }

    #[test]
    fn test_serde_uses_display_names() {
        let json = serde_json::to_string(&Dialect::SqlServer).unwrap();
        assert_eq!(json, "\"SQL Server\"");
        let parsed: Dialect = serde_json::from_str("\"PostgreSQL\"").unwrap();
        assert_eq!(parsed, Dialect::PostgreSQL);
    }

    #[test]
    fn test_on_update_support() {
        assert!(Dialect::MySQL.supports_on_update());
        assert!(Dialect::SqlServer.supports_on_update());
        assert!(!Dialect::Oracle.supports_on_update());
        assert!(!Dialect::SQLite.supports_on_update());
    }

    #[test]
    fn test_options_deserialize_camel_case() {
        let opts: DialectOptions =
            serde_json::from_str(r#"{"charset": "utf8mb4", "identifierQuotes": "none"}"#).unwrap();
        assert_eq!(opts.charset.as_deref(), Some("utf8mb4"));
        assert_eq!(opts.identifier_quotes, Some(QuoteStyle::None));
    }
}
