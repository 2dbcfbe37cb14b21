use crate::schema::meta::{EnumType, PropertyMeta, TemporalType, ValueType};

use std::fmt;

/// SQL type of a column, with its standard (JDBC) type code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SqlType {
    Bit,
    Boolean,
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Float,
    Double,
    Numeric,
    Decimal,
    Char,
    VarChar,
    Date,
    Time,
    Timestamp,
    VarBinary,
    Clob,
    Blob,
    Other,
}

impl SqlType {
    const ALL: [SqlType; 20] = [
        SqlType::Bit,
        SqlType::Boolean,
        SqlType::TinyInt,
        SqlType::SmallInt,
        SqlType::Integer,
        SqlType::BigInt,
        SqlType::Real,
        SqlType::Float,
        SqlType::Double,
        SqlType::Numeric,
        SqlType::Decimal,
        SqlType::Char,
        SqlType::VarChar,
        SqlType::Date,
        SqlType::Time,
        SqlType::Timestamp,
        SqlType::VarBinary,
        SqlType::Clob,
        SqlType::Blob,
        SqlType::Other,
    ];

    pub const fn code(self) -> i32 {
        match self {
            SqlType::Bit => -7,
            SqlType::Boolean => 16,
            SqlType::TinyInt => -6,
            SqlType::SmallInt => 5,
            SqlType::Integer => 4,
            SqlType::BigInt => -5,
            SqlType::Real => 7,
            SqlType::Float => 6,
            SqlType::Double => 8,
            SqlType::Numeric => 2,
            SqlType::Decimal => 3,
            SqlType::Char => 1,
            SqlType::VarChar => 12,
            SqlType::Date => 91,
            SqlType::Time => 92,
            SqlType::Timestamp => 93,
            SqlType::VarBinary => -3,
            SqlType::Clob => 2005,
            SqlType::Blob => 2004,
            SqlType::Other => 1111,
        }
    }

    pub fn from_code(code: i32) -> Option<SqlType> {
        SqlType::ALL.into_iter().find(|ty| ty.code() == code)
    }

    pub const fn name(self) -> &'static str {
        match self {
            SqlType::Bit => "BIT",
            SqlType::Boolean => "BOOLEAN",
            SqlType::TinyInt => "TINYINT",
            SqlType::SmallInt => "SMALLINT",
            SqlType::Integer => "INTEGER",
            SqlType::BigInt => "BIGINT",
            SqlType::Real => "REAL",
            SqlType::Float => "FLOAT",
            SqlType::Double => "DOUBLE",
            SqlType::Numeric => "NUMERIC",
            SqlType::Decimal => "DECIMAL",
            SqlType::Char => "CHAR",
            SqlType::VarChar => "VARCHAR",
            SqlType::Date => "DATE",
            SqlType::Time => "TIME",
            SqlType::Timestamp => "TIMESTAMP",
            SqlType::VarBinary => "VARBINARY",
            SqlType::Clob => "CLOB",
            SqlType::Blob => "BLOB",
            SqlType::Other => "OTHER",
        }
    }

    /// Character types, the ones case-insensitive matching applies to.
    pub const fn is_textual(self) -> bool {
        matches!(self, SqlType::Char | SqlType::VarChar | SqlType::Clob)
    }

    /// Fixed lookup from a property's declared type and markers.
    ///
    /// An explicit [`Marker::SqlType`](crate::schema::meta::Marker::SqlType)
    /// always wins; `Lob`, `Temporal` and `Enumerated` refine the lookup.
    pub fn for_property(property: &PropertyMeta) -> SqlType {
        if let Some(explicit) = property.sql_type_marker() {
            return explicit;
        }

        if let Some(temporal) = property.temporal() {
            return match temporal {
                TemporalType::Date => SqlType::Date,
                TemporalType::Time => SqlType::Time,
                TemporalType::Timestamp => SqlType::Timestamp,
            };
        }

        match (&property.ty, property.is_lob()) {
            (ValueType::String | ValueType::Char, true) => SqlType::Clob,
            (ValueType::Bytes, true) => SqlType::Blob,
            (ValueType::Enum, _) => match property.enum_type() {
                Some(EnumType::Ordinal) => SqlType::Integer,
                Some(EnumType::String) | None => SqlType::VarChar,
            },
            (ty, _) => SqlType::for_value(ty),
        }
    }

    pub fn for_value(ty: &ValueType) -> SqlType {
        match ty {
            ValueType::Bool => SqlType::Bit,
            ValueType::I8 => SqlType::TinyInt,
            ValueType::I16 => SqlType::SmallInt,
            ValueType::I32 => SqlType::Integer,
            ValueType::I64 => SqlType::BigInt,
            ValueType::F32 => SqlType::Real,
            ValueType::F64 => SqlType::Double,
            ValueType::Decimal => SqlType::Decimal,
            ValueType::String => SqlType::VarChar,
            ValueType::Char => SqlType::Char,
            ValueType::Bytes => SqlType::VarBinary,
            ValueType::Date => SqlType::Date,
            ValueType::Time => SqlType::Time,
            ValueType::Timestamp => SqlType::Timestamp,
            ValueType::Enum => SqlType::VarChar,
            ValueType::Uuid | ValueType::Class(_) | ValueType::List(_) => SqlType::Other,
        }
    }
}

impl fmt::Display for SqlType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_round_trip() {
        for ty in SqlType::ALL {
            assert_eq!(SqlType::from_code(ty.code()), Some(ty));
        }
        assert_eq!(SqlType::from_code(42), None);
    }

    #[test]
    fn fixed_lookup() {
        let cases = [
            (ValueType::String, SqlType::VarChar, 12),
            (ValueType::Bool, SqlType::Bit, -7),
            (ValueType::I32, SqlType::Integer, 4),
            (ValueType::I64, SqlType::BigInt, -5),
            (ValueType::F32, SqlType::Real, 7),
            (ValueType::F64, SqlType::Double, 8),
            (ValueType::Date, SqlType::Date, 91),
            (ValueType::Time, SqlType::Time, 92),
            (ValueType::Timestamp, SqlType::Timestamp, 93),
            (ValueType::Bytes, SqlType::VarBinary, -3),
        ];

        for (ty, expect, code) in cases {
            let property = PropertyMeta::new("p", ty);
            assert_eq!(SqlType::for_property(&property), expect);
            assert_eq!(expect.code(), code);
        }
    }

    #[test]
    fn markers_refine_lookup() {
        let text = PropertyMeta::new("body", ValueType::String).lob();
        assert_eq!(SqlType::for_property(&text), SqlType::Clob);

        let bytes = PropertyMeta::new("image", ValueType::Bytes).lob();
        assert_eq!(SqlType::for_property(&bytes), SqlType::Blob);

        let status = PropertyMeta::new("status", ValueType::Enum).enumerated(EnumType::Ordinal);
        assert_eq!(SqlType::for_property(&status), SqlType::Integer);

        let explicit = PropertyMeta::new("flag", ValueType::Bool).sql_type(SqlType::Boolean);
        assert_eq!(SqlType::for_property(&explicit), SqlType::Boolean);
    }
}
