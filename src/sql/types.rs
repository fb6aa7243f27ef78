//! Abstract column type to dialect type mapping.

use super::Dialect;
use crate::model::{DataType, TypeOptions};

const DEFAULT_VARCHAR_LENGTH: u32 = 255;
const DEFAULT_CHAR_LENGTH: u32 = 1;
const DEFAULT_PRECISION: u32 = 10;
const DEFAULT_SCALE: u32 = 2;

/// Map an abstract column type to the dialect's native SQL type.
pub fn map_type(data_type: DataType, options: Option<&TypeOptions>, dialect: Dialect) -> String {
    let opts = options.copied().unwrap_or_default();
    let length = |default: u32| opts.length.unwrap_or(default);
    let (precision, scale) = match opts.precision {
        Some(p) => (p, opts.scale.unwrap_or(0)),
        None => (DEFAULT_PRECISION, DEFAULT_SCALE),
    };

    match dialect {
        Dialect::MySQL => match data_type {
            DataType::Int => "INT".to_string(),
            DataType::Float => "FLOAT".to_string(),
            DataType::Decimal => format!("DECIMAL({precision},{scale})"),
            DataType::Varchar => format!("VARCHAR({})", length(DEFAULT_VARCHAR_LENGTH)),
            DataType::Char => format!("CHAR({})", length(DEFAULT_CHAR_LENGTH)),
            DataType::Text => "TEXT".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Datetime => "DATETIME".to_string(),
            DataType::Boolean => "TINYINT(1)".to_string(),
        },
        Dialect::PostgreSQL => match data_type {
            DataType::Int => "INTEGER".to_string(),
            DataType::Float => "REAL".to_string(),
            DataType::Decimal => format!("NUMERIC({precision},{scale})"),
            DataType::Varchar => format!("VARCHAR({})", length(DEFAULT_VARCHAR_LENGTH)),
            DataType::Char => format!("CHAR({})", length(DEFAULT_CHAR_LENGTH)),
            DataType::Text => "TEXT".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Datetime => "TIMESTAMP".to_string(),
            DataType::Boolean => "BOOLEAN".to_string(),
        },
        Dialect::Oracle => match data_type {
            DataType::Int => "NUMBER(10)".to_string(),
            DataType::Float => "FLOAT".to_string(),
            DataType::Decimal => format!("NUMBER({precision},{scale})"),
            DataType::Varchar => format!("VARCHAR2({})", length(DEFAULT_VARCHAR_LENGTH)),
            DataType::Char => format!("CHAR({})", length(DEFAULT_CHAR_LENGTH)),
            DataType::Text => "CLOB".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Datetime => "TIMESTAMP".to_string(),
            DataType::Boolean => "NUMBER(1)".to_string(),
        },
        Dialect::SqlServer => match data_type {
            DataType::Int => "INT".to_string(),
            DataType::Float => "FLOAT".to_string(),
            DataType::Decimal => format!("DECIMAL({precision},{scale})"),
            DataType::Varchar => format!("VARCHAR({})", length(DEFAULT_VARCHAR_LENGTH)),
            DataType::Char => format!("CHAR({})", length(DEFAULT_CHAR_LENGTH)),
            DataType::Text => "TEXT".to_string(),
            DataType::Date => "DATE".to_string(),
            DataType::Datetime => "DATETIME".to_string(),
            DataType::Boolean => "BIT".to_string(),
        },
        // SQLite has type affinities only; lengths and precisions are dropped.
        Dialect::SQLite => match data_type {
            DataType::Int | DataType::Boolean => "INTEGER".to_string(),
            DataType::Float | DataType::Decimal => "REAL".to_string(),
            DataType::Varchar
            | DataType::Char
            | DataType::Text
            | DataType::Date
            | DataType::Datetime => "TEXT".to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn varchar(n: u32) -> TypeOptions {
        TypeOptions {
            length: Some(n),
            ..Default::default()
        }
    }

    fn decimal(p: u32, s: u32) -> TypeOptions {
        TypeOptions {
            precision: Some(p),
            scale: Some(s),
            ..Default::default()
        }
    }

    #[test]
    fn test_sqlite_uses_storage_classes() {
        for data_type in DataType::ALL {
            let sql = map_type(data_type, None, Dialect::SQLite);
            assert!(["INTEGER", "REAL", "TEXT", "NUMERIC"].contains(&sql.as_str()), "{data_type}: {sql}");
        }
    }

    #[test]
    fn test_int_per_dialect() {
        assert_eq!(map_type(DataType::Int, None, Dialect::MySQL), "INT");
        assert_eq!(map_type(DataType::Int, None, Dialect::PostgreSQL), "INTEGER");
        assert_eq!(map_type(DataType::Int, None, Dialect::Oracle), "NUMBER(10)");
        assert_eq!(map_type(DataType::Int, None, Dialect::SqlServer), "INT");
        assert_eq!(map_type(DataType::Int, None, Dialect::SQLite), "INTEGER");
    }

    #[test]
    fn test_boolean_per_dialect() {
        assert_eq!(map_type(DataType::Boolean, None, Dialect::MySQL), "TINYINT(1)");
        assert_eq!(map_type(DataType::Boolean, None, Dialect::PostgreSQL), "BOOLEAN");
        assert_eq!(map_type(DataType::Boolean, None, Dialect::Oracle), "NUMBER(1)");
        assert_eq!(map_type(DataType::Boolean, None, Dialect::SqlServer), "BIT");
        assert_eq!(map_type(DataType::Boolean, None, Dialect::SQLite), "INTEGER");
    }

    #[test]
    fn test_varchar_length() {
        assert_eq!(map_type(DataType::Varchar, Some(&varchar(100)), Dialect::MySQL), "VARCHAR(100)");
        assert_eq!(map_type(DataType::Varchar, Some(&varchar(100)), Dialect::Oracle), "VARCHAR2(100)");
        assert_eq!(map_type(DataType::Varchar, Some(&varchar(100)), Dialect::SQLite), "TEXT");
        assert_eq!(map_type(DataType::Varchar, None, Dialect::PostgreSQL), "VARCHAR(255)");
    }

    #[test]
    fn test_decimal_precision() {
        assert_eq!(map_type(DataType::Decimal, Some(&decimal(12, 4)), Dialect::MySQL), "DECIMAL(12,4)");
        assert_eq!(map_type(DataType::Decimal, Some(&decimal(12, 4)), Dialect::PostgreSQL), "NUMERIC(12,4)");
        assert_eq!(map_type(DataType::Decimal, Some(&decimal(12, 4)), Dialect::Oracle), "NUMBER(12,4)");
        assert_eq!(map_type(DataType::Decimal, Some(&decimal(12, 4)), Dialect::SQLite), "REAL");
        assert_eq!(map_type(DataType::Decimal, None, Dialect::SqlServer), "DECIMAL(10,2)");
    }

    #[test]
    fn test_decimal_precision_without_scale() {
        let opts = TypeOptions {
            precision: Some(8),
            ..Default::default()
        };
        assert_eq!(map_type(DataType::Decimal, Some(&opts), Dialect::MySQL), "DECIMAL(8,0)");
    }

    #[test]
    fn test_temporal_and_text() {
        assert_eq!(map_type(DataType::Datetime, None, Dialect::PostgreSQL), "TIMESTAMP");
        assert_eq!(map_type(DataType::Datetime, None, Dialect::SqlServer), "DATETIME");
        assert_eq!(map_type(DataType::Date, None, Dialect::SQLite), "TEXT");
        assert_eq!(map_type(DataType::Text, None, Dialect::Oracle), "CLOB");
        assert_eq!(map_type(DataType::Float, None, Dialect::PostgreSQL), "REAL");
    }

    #[test]
    fn test_char() {
        assert_eq!(map_type(DataType::Char, None, Dialect::MySQL), "CHAR(1)");
        assert_eq!(map_type(DataType::Char, Some(&varchar(2)), Dialect::Oracle), "CHAR(2)");
        assert_eq!(map_type(DataType::Char, Some(&varchar(2)), Dialect::SQLite), "TEXT");
    }
}
