//! PostgreSQL native type vocabulary
//!
//! Descriptors arrive as `format_type()` output with precision and array
//! suffixes already removed, lowercased.

use crate::resolve::{NativeType, Precision, TypeContext};

pub(crate) fn lookup(dt: &str, _: Precision, ctx: &TypeContext<'_>) -> Option<NativeType> {
    let ty = match dt {
        "boolean" | "bool" => NativeType::plain("bool", "false").wrapped("pgtype::Bool"),

        "character varying" | "varchar" => {
            NativeType::plain("String", "String::new()").wrapped("pgtype::Varchar")
        }
        "character" | "char" | "bpchar" | "text" | "money" | "name" | "citext" => {
            NativeType::plain("String", "String::new()").wrapped("pgtype::Text")
        }
        "inet" | "cidr" => NativeType::plain("String", "String::new()")
            .internal("std::net::IpAddr", "std::net::IpAddr::from([0, 0, 0, 0])")
            .wrapped("pgtype::Inet"),

        "smallint" | "int2" => NativeType::plain("i16", "0").wrapped("pgtype::Int2"),
        "integer" | "int" | "int4" => {
            NativeType::plain(ctx.int32_type, "0").wrapped("pgtype::Int4")
        }
        "bigint" | "int8" => NativeType::plain("i64", "0").wrapped("pgtype::Int8"),
        "smallserial" => NativeType::plain("u16", "0")
            .internal("i16", "0")
            .wrapped("pgtype::Int2"),
        "serial" => NativeType::plain(ctx.uint32_type, "0").wrapped("pgtype::Int4"),
        "bigserial" => NativeType::plain("u64", "0")
            .internal("i64", "0")
            .wrapped("pgtype::Int8"),

        "real" | "float4" => NativeType::plain("f32", "0.0").wrapped("pgtype::Float4"),
        "double precision" | "float8" => {
            NativeType::plain("f64", "0.0").wrapped("pgtype::Float8")
        }
        "numeric" | "decimal" => NativeType::plain("f64", "0.0").wrapped("pgtype::Numeric"),

        "bytea" => NativeType::plain("Vec<u8>", "Vec::new()").wrapped("pgtype::Bytea"),
        "bit varying" | "varbit" | "\"any\"" => {
            NativeType::plain("Vec<u8>", "Vec::new()").wrapped("pgtype::Varbit")
        }
        "bit" => NativeType::plain("u8", "0").wrapped("pgtype::Bit"),
        "\"char\"" => NativeType::plain("u8", "0")
            .internal("i8", "0")
            .wrapped("pgtype::QChar"),

        "date" => NativeType::plain("chrono::NaiveDate", "chrono::NaiveDate::default()")
            .wrapped("pgtype::Date"),
        "timestamp without time zone" | "timestamp" => NativeType::plain(
            "chrono::NaiveDateTime",
            "chrono::NaiveDateTime::default()",
        )
        .wrapped("pgtype::Timestamp"),
        "timestamp with time zone" | "timestamptz" => NativeType::plain(
            "chrono::DateTime<chrono::Utc>",
            "chrono::DateTime::<chrono::Utc>::default()",
        )
        .wrapped("pgtype::Timestamptz"),
        // both variants share one wire representation: microseconds since midnight
        "time with time zone" | "time without time zone" | "time" | "timetz" => {
            NativeType::plain("chrono::NaiveTime", "chrono::NaiveTime::default()")
                .internal("i64", "0")
                .wrapped("pgtype::Time")
        }
        "interval" => NativeType::plain("std::time::Duration", "std::time::Duration::ZERO")
            .wrapped("pgtype::Interval"),

        "uuid" => NativeType::plain("uuid::Uuid", "uuid::Uuid::nil()")
            .internal("[u8; 16]", "[0u8; 16]")
            .wrapped("pgtype::UUID"),
        "json" => NativeType::plain("serde_json::Value", "serde_json::Value::Null")
            .wrapped("pgtype::JSON"),
        "jsonb" => NativeType::plain("serde_json::Value", "serde_json::Value::Null")
            .wrapped("pgtype::JSONB"),
        "hstore" => NativeType::plain(
            "std::collections::HashMap<String, Option<String>>",
            "std::collections::HashMap::new()",
        )
        .wrapped("pgtype::Hstore"),

        _ => return None,
    };
    Some(ty)
}
