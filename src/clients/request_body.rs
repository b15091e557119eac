//! Request body normalization.
//!
//! A body can be supplied as raw bytes, UTF-8 text, or any
//! [`serde::Serialize`] value. Each form is encoded to bytes before sending,
//! and text and JSON bodies carry a default `Content-Type`.

use serde::Serialize;

use crate::clients::errors::BodyEncodingError;

/// Content type for HTTP request bodies.
///
/// Specifies the format of the request body and the value used for the
/// default `Content-Type` header.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DataType {
    /// JSON content type (`application/json`).
    Json,
    /// Plain text content type (`text/plain`).
    Text,
}

impl DataType {
    /// Returns the MIME type string for this data type.
    #[must_use]
    pub const fn as_content_type(&self) -> &'static str {
        match self {
            Self::Json => "application/json",
            Self::Text => "text/plain",
        }
    }
}

/// A request body before encoding.
///
/// # Example
///
/// ```rust
/// use bms_core::clients::{DataType, RequestBody};
/// use serde_json::json;
///
/// let body = RequestBody::json(&json!({"k": 1})).unwrap();
/// assert_eq!(body.data_type(), Some(DataType::Json));
/// assert_eq!(body.encode().unwrap(), br#"{"k":1}"#.to_vec());
/// ```
#[derive(Clone, Debug, PartialEq)]
pub enum RequestBody {
    /// Raw bytes, sent verbatim.
    Bytes(Vec<u8>),
    /// UTF-8 text.
    Text(String),
    /// A structured JSON value.
    Json(serde_json::Value),
}

impl RequestBody {
    /// Builds a JSON body from any serializable value.
    ///
    /// # Errors
    ///
    /// Returns [`BodyEncodingError::Json`] if `value` has no JSON
    /// representation (for example, a map with non-string keys or a
    /// `Serialize` impl that reports an error).
    pub fn json<T: Serialize + ?Sized>(value: &T) -> Result<Self, BodyEncodingError> {
        Ok(Self::Json(serde_json::to_value(value)?))
    }

    /// Returns the data type whose content type should be applied by
    /// default, or `None` for raw bytes.
    #[must_use]
    pub const fn data_type(&self) -> Option<DataType> {
        match self {
            Self::Bytes(_) => None,
            Self::Text(_) => Some(DataType::Text),
            Self::Json(_) => Some(DataType::Json),
        }
    }

    /// Returns the default `Content-Type` for this body, if any.
    #[must_use]
    pub fn default_content_type(&self) -> Option<&'static str> {
        self.data_type().map(|data_type| data_type.as_content_type())
    }

    /// Encodes the body to bytes.
    ///
    /// # Errors
    ///
    /// Returns [`BodyEncodingError`] if the body cannot be encoded.
    pub fn encode(self) -> Result<Vec<u8>, BodyEncodingError> {
        match self {
            Self::Bytes(bytes) => Ok(bytes),
            Self::Text(text) => Ok(text.into_bytes()),
            Self::Json(value) => Ok(serde_json::to_vec(&value)?),
        }
    }
}

impl From<Vec<u8>> for RequestBody {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl From<&[u8]> for RequestBody {
    fn from(bytes: &[u8]) -> Self {
        Self::Bytes(bytes.to_vec())
    }
}

impl From<String> for RequestBody {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<&str> for RequestBody {
    fn from(text: &str) -> Self {
        Self::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RequestBody {
    fn from(value: serde_json::Value) -> Self {
        Self::Json(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::ser::Error as _;
    use serde::Serializer;
    use serde_json::json;
    use std::collections::HashMap;

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("cyclic reference"))
        }
    }

    #[test]
    fn test_data_type_content_type() {
        assert_eq!(DataType::Json.as_content_type(), "application/json");
        assert_eq!(DataType::Text.as_content_type(), "text/plain");
    }

    #[test]
    fn test_default_content_types() {
        assert_eq!(RequestBody::from("a").default_content_type(), Some("text/plain"));
        assert_eq!(
            RequestBody::from(json!([1, 2])).default_content_type(),
            Some("application/json")
        );
        assert_eq!(RequestBody::from(vec![0u8]).default_content_type(), None);
    }

    #[test]
    fn test_text_encodes_as_utf8() {
        let bytes = RequestBody::from("héllo").encode().unwrap();
        assert_eq!(bytes, "héllo".as_bytes());
    }

    #[test]
    fn test_bytes_are_verbatim() {
        let bytes = RequestBody::from(vec![0x00, 0xff, 0x10]).encode().unwrap();
        assert_eq!(bytes, vec![0x00, 0xff, 0x10]);
    }

    #[test]
    fn test_json_from_serializable_struct() {
        #[derive(Serialize)]
        struct Greeting {
            message: &'static str,
            count: u32,
        }

        let body = RequestBody::json(&Greeting {
            message: "hi",
            count: 2,
        })
        .unwrap();
        let decoded: serde_json::Value = serde_json::from_slice(&body.encode().unwrap()).unwrap();
        assert_eq!(decoded, json!({"message": "hi", "count": 2}));
    }

    #[test]
    fn test_json_fails_for_unserializable_value() {
        let result = RequestBody::json(&Unserializable);
        assert!(matches!(result, Err(BodyEncodingError::Json(_))));
    }

    #[test]
    fn test_json_fails_for_non_string_map_keys() {
        let mut map = HashMap::new();
        map.insert((1, 2), "value");
        assert!(RequestBody::json(&map).is_err());
    }
}
