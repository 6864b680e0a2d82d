use std::ops::{Deref, DerefMut};

use deadpool_redis::redis::{
    ErrorKind, FromRedisValue, RedisError, RedisResult, RedisWrite,
    ToRedisArgs, Value,
};
use serde::{Deserialize, Serialize, de::DeserializeOwned};

/// JSON wrapper carrying a value into and out of the cache as a single
/// serialized blob.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Json<T>(pub T);

impl<T> Json<T> {
    pub fn new(value: T) -> Self { Self(value) }

    pub fn inner(self) -> T { self.0 }

    pub fn as_inner(&self) -> &T { &self.0 }
}

impl<T> Deref for Json<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target { &self.0 }
}

impl<T> DerefMut for Json<T> {
    fn deref_mut(&mut self) -> &mut Self::Target { &mut self.0 }
}

impl<T> From<T> for Json<T> {
    fn from(value: T) -> Self { Json(value) }
}

impl<T> ToRedisArgs for Json<T>
where
    T: Serialize,
{
    fn write_redis_args<W>(&self, out: &mut W)
    where
        W: ?Sized + RedisWrite,
    {
        match serde_json::to_vec(&self.0) {
            Ok(bytes) => out.write_arg(&bytes),
            Err(_) => out.write_arg(b""),
        }
    }
}

impl<T> FromRedisValue for Json<T>
where
    T: DeserializeOwned,
{
    fn from_redis_value(v: &Value) -> RedisResult<Self> {
        match v {
            Value::BulkString(data) => {
                serde_json::from_slice(data).map(Json).map_err(|e| {
                    RedisError::from((
                        ErrorKind::TypeError,
                        "JSON deserialization failed",
                        e.to_string(),
                    ))
                })
            }
            Value::Nil => {
                Err(RedisError::from((
                    ErrorKind::TypeError,
                    "Cannot convert nil to JSON value",
                )))
            }
            _ => {
                Err(RedisError::from((
                    ErrorKind::TypeError,
                    "Expected bulk string for JSON",
                )))
            }
        }
    }
}
