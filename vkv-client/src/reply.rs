//! # Reply Normalization
//!
//! Purpose: Turn raw replies into the façade's return types.
//!
//! A nil reply means the key or field is absent and becomes the zero value
//! of the requested type. Anything else is decoded strictly; a reply that
//! does not fit the type is an error, never a silent default.

use redis::{FromRedisValue, Value};

use crate::error::OperationResult;

/// Decodes `value`, mapping a nil reply to `T::default()`.
pub(crate) fn or_zero<T>(value: Value) -> OperationResult<T>
where
    T: FromRedisValue + Default,
{
    if let Value::Nil = value {
        tracing::trace!("nil reply normalized to zero value");
        return Ok(T::default());
    }
    Ok(redis::from_redis_value(&value)?)
}

/// Discards a write acknowledgement.
pub(crate) fn ignore(_value: Value) -> OperationResult<()> {
    Ok(())
}
