//! Identifier quoting.

use super::{Dialect, DialectOptions};

/// Wrap `name` in the dialect's quote characters.
///
/// An explicit `identifier_quotes` override wins over the dialect default.
/// Names that already carry the quotes are returned as-is.
pub fn quote_identifier(name: &str, dialect: Dialect, options: Option<&DialectOptions>) -> String {
    let style = options
        .and_then(|o| o.identifier_quotes)
        .unwrap_or_else(|| dialect.default_quote_style());

    let Some((open, close)) = style.delimiters() else {
        return name.to_string();
    };

    if name.len() >= 2 && name.starts_with(open) && name.ends_with(close) {
        return name.to_string();
    }

    format!("{open}{name}{close}")
}

/// Table name, prefixed with the configured schema when `with_schema` is set.
pub fn qualified_name(
    table: &str,
    dialect: Dialect,
    options: Option<&DialectOptions>,
    with_schema: bool,
) -> String {
    let quoted = quote_identifier(table, dialect, options);
    match options.and_then(|o| o.schema.as_deref()) {
        Some(schema) if with_schema && !schema.is_empty() => {
            format!("{}.{}", quote_identifier(schema, dialect, options), quoted)
        }
        _ => quoted,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::QuoteStyle;

    #[test]
    fn test_default_quotes() {
        assert_eq!(quote_identifier("users", Dialect::MySQL, None), "`users`");
        assert_eq!(quote_identifier("users", Dialect::PostgreSQL, None), "\"users\"");
        assert_eq!(quote_identifier("users", Dialect::Oracle, None), "\"users\"");
        assert_eq!(quote_identifier("users", Dialect::SQLite, None), "\"users\"");
        assert_eq!(quote_identifier("users", Dialect::SqlServer, None), "[users]");
    }

    #[test]
    fn test_no_double_wrapping() {
        assert_eq!(quote_identifier("[users]", Dialect::SqlServer, None), "[users]");
        assert_eq!(quote_identifier("`users`", Dialect::MySQL, None), "`users`");
        assert_eq!(quote_identifier("\"users\"", Dialect::PostgreSQL, None), "\"users\"");
    }

    #[test]
    fn test_override() {
        let none = DialectOptions {
            identifier_quotes: Some(QuoteStyle::None),
            ..Default::default()
        };
        assert_eq!(quote_identifier("users", Dialect::MySQL, Some(&none)), "users");

        let brackets = DialectOptions {
            identifier_quotes: Some(QuoteStyle::Brackets),
            ..Default::default()
        };
        assert_eq!(quote_identifier("users", Dialect::PostgreSQL, Some(&brackets)), "[users]");
    }

    #[test]
    fn test_qualified_name() {
        let opts = DialectOptions {
            schema: Some("app".to_string()),
            ..Default::default()
        };
        assert_eq!(
            qualified_name("users", Dialect::PostgreSQL, Some(&opts), true),
            "\"app\".\"users\""
        );
        assert_eq!(
            qualified_name("users", Dialect::PostgreSQL, Some(&opts), false),
            "\"users\""
        );
        assert_eq!(qualified_name("users", Dialect::PostgreSQL, None, true), "\"users\"");
    }
}
