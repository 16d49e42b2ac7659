use crate::{Error, Result};
use bytes::Bytes;
use serde::Serialize;
use std::fmt;
use tokio::io::{AsyncRead, AsyncReadExt};

type Encoder = Box<dyn FnOnce() -> serde_json::Result<Vec<u8>> + Send>;

/// Request payload, resolved to bytes only when the request executes.
///
/// Bytes and text pass through unchanged, a reader is drained to the end and
/// a structured value is serialized to JSON.
pub struct Body(Kind);

enum Kind {
    Bytes(Bytes),
    Text(String),
    Reader(Box<dyn AsyncRead + Send + Unpin>),
    Json(Encoder),
}

impl Body {
    /// Serialize `value` to JSON at execution time.
    pub fn json<T>(value: T) -> Self
    where
        T: Serialize + Send + 'static,
    {
        Body(Kind::Json(Box::new(move || serde_json::to_vec(&value))))
    }

    /// Drain `reader` fully at execution time.
    pub fn reader<R>(reader: R) -> Self
    where
        R: AsyncRead + Send + Unpin + 'static,
    {
        Body(Kind::Reader(Box::new(reader)))
    }

    pub(crate) async fn into_bytes(self) -> Result<Bytes> {
        match self.0 {
            Kind::Bytes(b) => Ok(b),
            Kind::Text(s) => Ok(Bytes::from(s)),
            Kind::Reader(mut r) => {
                let mut buf = Vec::new();
                r.read_to_end(&mut buf).await.map_err(Error::BodyRead)?;
                Ok(Bytes::from(buf))
            }
            Kind::Json(encode) => encode().map(Bytes::from).map_err(Error::BodyEncoding),
        }
    }
}

impl fmt::Debug for Body {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Kind::Bytes(b) => f.debug_tuple("Bytes").field(&b.len()).finish(),
            Kind::Text(s) => f.debug_tuple("Text").field(&s.len()).finish(),
            Kind::Reader(_) => f.write_str("Reader"),
            Kind::Json(_) => f.write_str("Json"),
        }
    }
}

impl From<Bytes> for Body {
    fn from(b: Bytes) -> Self {
        Body(Kind::Bytes(b))
    }
}

impl From<Vec<u8>> for Body {
    fn from(v: Vec<u8>) -> Self {
        Body(Kind::Bytes(Bytes::from(v)))
    }
}

impl From<&'static [u8]> for Body {
    fn from(b: &'static [u8]) -> Self {
        Body(Kind::Bytes(Bytes::from_static(b)))
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body(Kind::Text(s))
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body(Kind::Text(s.to_string()))
    }
}
