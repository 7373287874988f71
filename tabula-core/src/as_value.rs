use crate::{Error, Result, Value};
use rust_decimal::{
    Decimal,
    prelude::{FromPrimitive, ToPrimitive},
};
use std::any;
use time::{Date, OffsetDateTime, PrimitiveDateTime, Time};
use uuid::Uuid;

/// Conversion between native Rust field types and the dynamically typed
/// [`Value`] that carries statement parameters and result row cells.
///
/// Mapped records read their fields through `as_value` when building
/// statements and write them back through `try_from_value` when a row is bound.
///
/// # Conversion contract
/// - `try_from_value` accepts the canonical variant for the type and may accept
///   other variants when the conversion is lossless (e.g. `Int32` into `i64`).
/// - Narrowing conversions are range checked, the error names both the value
///   and the target type.
/// - A NULL only converts into `Option<T>`.
///
/// # Examples
/// ```rust
/// use tabula_core::{AsValue, Value};
/// let v = 42i32.as_value();
/// assert_eq!(v, Value::Int32(Some(42)));
/// let n: i64 = AsValue::try_from_value(v).unwrap();
/// assert_eq!(n, 42);
/// ```
pub trait AsValue {
    /// Typed NULL for this type.
    fn as_empty_value() -> Value;
    /// Wrap the native value.
    fn as_value(self) -> Value;
    /// Convert a dynamic value back into the native type.
    fn try_from_value(value: Value) -> Result<Self>
    where
        Self: Sized;
}

impl<T: AsValue> From<T> for Value {
    fn from(value: T) -> Self {
        value.as_value()
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Varchar(Some(value.into()))
    }
}

fn conversion_error<T>(value: &Value) -> Error {
    Error::msg(format!(
        "Cannot convert {value:?} to {}",
        any::type_name::<T>()
    ))
}

fn out_of_range<T>(value: impl std::fmt::Display, source: &str) -> Error {
    Error::msg(format!(
        "Value {value}: {source} is out of range for {}",
        any::type_name::<T>()
    ))
}

macro_rules! impl_as_value {
    ($source:ty, $destination:path $(, $pat_rest:pat => $expr_rest:expr)* $(,)?) => {
        impl AsValue for $source {
            fn as_empty_value() -> Value {
                $destination(None)
            }
            fn as_value(self) -> Value {
                $destination(Some(self.into()))
            }
            fn try_from_value(value: Value) -> Result<Self> {
                match value {
                    $destination(Some(v)) => Ok(v.into()),
                    $($pat_rest => $expr_rest,)*
                    _ => Err(conversion_error::<Self>(&value)),
                }
            }
        }
    };
}

impl_as_value!(
    bool,
    Value::Boolean,
    Value::Int16(Some(v)) => Ok(v != 0),
    Value::Int32(Some(v)) => Ok(v != 0),
    Value::Int64(Some(v)) => Ok(v != 0),
);
impl_as_value!(
    i16,
    Value::Int16,
    Value::Int32(Some(v)) => i16::try_from(v).map_err(|_| out_of_range::<i16>(v, "i32")),
    Value::Int64(Some(v)) => i16::try_from(v).map_err(|_| out_of_range::<i16>(v, "i64")),
);
impl_as_value!(
    i32,
    Value::Int32,
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int64(Some(v)) => i32::try_from(v).map_err(|_| out_of_range::<i32>(v, "i64")),
    Value::Decimal(Some(v)) => {
        if !v.is_integer() {
            return Err(Error::msg(format!("Value {v}: Decimal is not an integer")));
        }
        v.to_i32().ok_or_else(|| out_of_range::<i32>(v, "Decimal"))
    },
);
impl_as_value!(
    i64,
    Value::Int64,
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => {
        if !v.is_integer() {
            return Err(Error::msg(format!("Value {v}: Decimal is not an integer")));
        }
        v.to_i64().ok_or_else(|| out_of_range::<i64>(v, "Decimal"))
    },
);
impl_as_value!(
    f32,
    Value::Float32,
    Value::Int16(Some(v)) => Ok(v as _),
);
impl_as_value!(
    f64,
    Value::Float64,
    Value::Float32(Some(v)) => Ok(v as _),
    Value::Int16(Some(v)) => Ok(v as _),
    Value::Int32(Some(v)) => Ok(v as _),
    Value::Decimal(Some(v)) => v.to_f64().ok_or_else(|| out_of_range::<f64>(v, "Decimal")),
);
impl_as_value!(
    Decimal,
    Value::Decimal,
    Value::Int16(Some(v)) => Ok(v.into()),
    Value::Int32(Some(v)) => Ok(v.into()),
    Value::Int64(Some(v)) => Ok(v.into()),
    Value::Float64(Some(v)) => Decimal::from_f64(v).ok_or_else(|| out_of_range::<Decimal>(v, "f64")),
);
impl_as_value!(String, Value::Varchar);
impl_as_value!(Vec<u8>, Value::Blob);
impl_as_value!(Date, Value::Date);
impl_as_value!(Time, Value::Time);
impl_as_value!(PrimitiveDateTime, Value::Timestamp);
impl_as_value!(
    OffsetDateTime,
    Value::TimestampWithTimezone,
    Value::Timestamp(Some(v)) => Ok(v.assume_utc()),
);
impl_as_value!(Uuid, Value::Uuid);

impl<T: AsValue> AsValue for Option<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        match self {
            Some(v) => v.as_value(),
            None => T::as_empty_value(),
        }
    }
    fn try_from_value(value: Value) -> Result<Self> {
        if value.is_null() {
            return Ok(None);
        }
        T::try_from_value(value).map(Some)
    }
}

impl<T: AsValue> AsValue for Box<T> {
    fn as_empty_value() -> Value {
        T::as_empty_value()
    }
    fn as_value(self) -> Value {
        (*self).as_value()
    }
    fn try_from_value(value: Value) -> Result<Self> {
        T::try_from_value(value).map(Box::new)
    }
}
