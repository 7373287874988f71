use bytes::BytesMut;
use postgres_types::{FromSql, IsNull, ToSql, Type, to_sql_checked};
use rust_decimal::Decimal;
use std::error::Error;
use tabula_core::{AsValue, Value};
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Carries a [`Value`] through the `tokio-postgres` codecs.
#[derive(Debug)]
pub(crate) struct ValueHolder(pub(crate) Value);

impl From<Value> for ValueHolder {
    fn from(value: Value) -> Self {
        ValueHolder(value)
    }
}

impl<'a> FromSql<'a> for ValueHolder {
    fn from_sql(ty: &Type, raw: &'a [u8]) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Self::from_sql_nullable(ty, Some(raw))
    }
    fn from_sql_null(ty: &Type) -> Result<Self, Box<dyn Error + Sync + Send>> {
        Self::from_sql_nullable(ty, None)
    }
    fn from_sql_nullable(
        ty: &Type,
        raw: Option<&'a [u8]>,
    ) -> Result<Self, Box<dyn Error + Sync + Send>> {
        macro_rules! to_value {
            ($ty_var:ident, $raw:ident, $($($ty:path)|+ => ($value:path, $source:ty),)+) => {
                match *$ty_var {
                    $($($ty)|+ => $value(match $raw {
                        Some($raw) => Some(<$source>::from_sql($ty_var, $raw)?.into()),
                        None => None,
                    }),)+
                    _ => {
                        if $raw.is_some() {
                            return Err(tabula_core::Error::msg(format!(
                                "Cannot decode sql type: `{}`",
                                $ty_var
                            ))
                            .into());
                        }
                        Value::Null
                    }
                }
            };
        }
        let value = to_value!(ty, raw,
            Type::BOOL => (Value::Boolean, bool),
            Type::INT2 => (Value::Int16, i16),
            Type::INT4 => (Value::Int32, i32),
            Type::INT8 => (Value::Int64, i64),
            Type::OID => (Value::Int64, u32),
            Type::FLOAT4 => (Value::Float32, f32),
            Type::FLOAT8 => (Value::Float64, f64),
            Type::NUMERIC => (Value::Decimal, Decimal),
            Type::VARCHAR | Type::TEXT | Type::NAME | Type::BPCHAR | Type::UNKNOWN => (Value::Varchar, String),
            Type::BYTEA => (Value::Blob, Vec<u8>),
            Type::DATE => (Value::Date, Date),
            Type::TIME => (Value::Time, Time),
            Type::TIMESTAMP => (Value::Timestamp, PrimitiveDateTime),
            Type::TIMESTAMPTZ => (Value::TimestampWithTimezone, OffsetDateTime),
            Type::UUID => (Value::Uuid, Uuid),
        );
        Ok(value.into())
    }

    fn accepts(_ty: &Type) -> bool {
        true
    }
}

impl ToSql for ValueHolder {
    /// Parameters are converted to the type the server inferred for them, so an
    /// `i64` field binds to an `INTEGER` column as long as the value fits.
    fn to_sql(&self, ty: &Type, out: &mut BytesMut) -> Result<IsNull, Box<dyn Error + Sync + Send>>
    where
        Self: Sized,
    {
        macro_rules! convert {
            ($source:ty) => {
                Option::<$source>::try_from_value(self.0.clone())?.to_sql(ty, out)
            };
        }
        match *ty {
            Type::BOOL => convert!(bool),
            Type::INT2 => convert!(i16),
            Type::INT4 => convert!(i32),
            Type::INT8 => convert!(i64),
            Type::OID => Option::<i64>::try_from_value(self.0.clone())?
                .map(u32::try_from)
                .transpose()?
                .to_sql(ty, out),
            Type::FLOAT4 => convert!(f32),
            Type::FLOAT8 => convert!(f64),
            Type::NUMERIC => convert!(Decimal),
            Type::VARCHAR | Type::TEXT | Type::NAME | Type::BPCHAR => convert!(String),
            Type::BYTEA => convert!(Vec<u8>),
            Type::DATE => convert!(Date),
            Type::TIME => convert!(Time),
            Type::TIMESTAMP => convert!(PrimitiveDateTime),
            Type::TIMESTAMPTZ => convert!(OffsetDateTime),
            Type::UUID => convert!(Uuid),
            _ => match &self.0 {
                Value::Null => None::<String>.to_sql(ty, out),
                Value::Boolean(v) => v.to_sql(ty, out),
                Value::Int16(v) => v.to_sql(ty, out),
                Value::Int32(v) => v.to_sql(ty, out),
                Value::Int64(v) => v.to_sql(ty, out),
                Value::Float32(v) => v.to_sql(ty, out),
                Value::Float64(v) => v.to_sql(ty, out),
                Value::Decimal(v) => v.to_sql(ty, out),
                Value::Varchar(v) => v.to_sql(ty, out),
                Value::Blob(v) => v.as_deref().to_sql(ty, out),
                Value::Date(v) => v.to_sql(ty, out),
                Value::Time(v) => v.to_sql(ty, out),
                Value::Timestamp(v) => v.to_sql(ty, out),
                Value::TimestampWithTimezone(v) => v.to_sql(ty, out),
                Value::Uuid(v) => v.to_sql(ty, out),
            },
        }
    }

    fn accepts(_ty: &Type) -> bool
    where
        Self: Sized,
    {
        true
    }

    to_sql_checked!();
}
