//! Conversion of MySQL result cells into JSON.
//!
//! Procedures return rows whose shape is only known at runtime, so each cell
//! is decoded by inspecting the wire type the server reports for it.

use std::str::FromStr;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use diesel::{
    deserialize::{self, FromSql},
    mysql::{Mysql, MysqlType, MysqlValue},
    sql_types::{
        BigInt, Date, Datetime, Double, Float, Integer, SmallInt, Time,
        Timestamp, TinyInt, Unsigned,
    },
};
use diesel_dynamic_schema::dynamic_value::{Any, DynamicRow, NamedField};
use rust_decimal::{Decimal, prelude::ToPrimitive};
use serde_json::{Map, Number, Value};

#[derive(Debug, Clone, PartialEq)]
pub struct Cell(pub Value);

impl FromSql<Any, Mysql> for Cell {
    fn from_sql(value: MysqlValue<'_>) -> deserialize::Result<Self> {
        let json = match value.value_type() {
            MysqlType::Tiny => {
                Value::from(<i8 as FromSql<TinyInt, Mysql>>::from_sql(value)?)
            }
            MysqlType::UnsignedTiny => Value::from(
                <u8 as FromSql<Unsigned<TinyInt>, Mysql>>::from_sql(value)?,
            ),
            MysqlType::Short => Value::from(
                <i16 as FromSql<SmallInt, Mysql>>::from_sql(value)?,
            ),
            MysqlType::UnsignedShort => Value::from(
                <u16 as FromSql<Unsigned<SmallInt>, Mysql>>::from_sql(value)?,
            ),
            MysqlType::Long => {
                Value::from(<i32 as FromSql<Integer, Mysql>>::from_sql(value)?)
            }
            MysqlType::UnsignedLong => Value::from(
                <u32 as FromSql<Unsigned<Integer>, Mysql>>::from_sql(value)?,
            ),
            MysqlType::LongLong => {
                Value::from(<i64 as FromSql<BigInt, Mysql>>::from_sql(value)?)
            }
            MysqlType::UnsignedLongLong => Value::from(
                <u64 as FromSql<Unsigned<BigInt>, Mysql>>::from_sql(value)?,
            ),
            MysqlType::Float => float_value(f64::from(
                <f32 as FromSql<Float, Mysql>>::from_sql(value)?,
            )),
            MysqlType::Double => {
                float_value(<f64 as FromSql<Double, Mysql>>::from_sql(value)?)
            }
            MysqlType::Numeric => {
                decimal_value(&String::from_utf8_lossy(value.as_bytes()))
            }
            MysqlType::Date => Value::String(
                <NaiveDate as FromSql<Date, Mysql>>::from_sql(value)?
                    .to_string(),
            ),
            MysqlType::Time => Value::String(
                <NaiveTime as FromSql<Time, Mysql>>::from_sql(value)?
                    .to_string(),
            ),
            MysqlType::DateTime => datetime_value(
                <NaiveDateTime as FromSql<Datetime, Mysql>>::from_sql(value)?,
            ),
            MysqlType::Timestamp => datetime_value(
                <NaiveDateTime as FromSql<Timestamp, Mysql>>::from_sql(value)?,
            ),
            _ => text_value(&String::from_utf8_lossy(value.as_bytes())),
        };

        Ok(Cell(json))
    }

    fn from_nullable_sql(
        value: Option<MysqlValue<'_>>,
    ) -> deserialize::Result<Self> {
        match value {
            Some(value) => Self::from_sql(value),
            None => Ok(Cell(Value::Null)),
        }
    }
}

pub fn row_to_object(row: DynamicRow<NamedField<Cell>>) -> Value {
    Value::Object(
        row.into_iter()
            .map(|field| (field.name, field.value.0))
            .collect::<Map<String, Value>>(),
    )
}

/// Text cells that hold a JSON object or array are embedded as structured
/// JSON. Everything else stays a plain string.
pub fn text_value(text: &str) -> Value {
    let trimmed = text.trim_start();
    if trimmed.starts_with('{') || trimmed.starts_with('[') {
        if let Ok(value) = serde_json::from_str::<Value>(text) {
            return value;
        }
    }
    Value::String(text.to_string())
}

pub fn decimal_value(text: &str) -> Value {
    let Ok(decimal) = Decimal::from_str(text.trim()) else {
        return Value::String(text.to_string());
    };

    if decimal.fract().is_zero() {
        if let Some(n) = decimal.to_i64() {
            return Value::from(n);
        }
    }

    decimal
        .to_f64()
        .and_then(Number::from_f64)
        .map(Value::Number)
        .unwrap_or_else(|| Value::String(text.to_string()))
}

fn float_value(f: f64) -> Value {
    Number::from_f64(f).map(Value::Number).unwrap_or(Value::Null)
}

pub(crate) fn datetime_value(dt: NaiveDateTime) -> Value {
    Value::String(dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
}
