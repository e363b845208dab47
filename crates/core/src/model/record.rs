use std::collections::BTreeMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Deserializer, Serialize};

/// Metadata line written once per captured request.
///
/// Fields are declared in lexicographic order: the serialized key order is
/// part of the on-disk format shared with other writers.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct LogRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<serde_json::Value>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub is_body_base64: bool,
    #[serde(default)]
    pub method: String,
    #[serde(default)]
    pub request_number: u64,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub time: String,
    #[serde(default)]
    pub url: String,
}

impl LogRecord {
    /// Body bytes as captured, undoing base64 when the record says so.
    /// `None` when the body was not embedded or cannot be decoded.
    pub fn decoded_body(&self) -> Option<Vec<u8>> {
        let text = self.body.as_ref()?.as_str()?;
        if self.is_body_base64 {
            STANDARD.decode(text).ok()
        } else {
            Some(text.as_bytes().to_vec())
        }
    }
}

/// Text form of a request body: standard padded base64, or the bytes read
/// as UTF-8 with invalid sequences replaced.
pub fn encode_body(body: &[u8], as_base64: bool) -> String {
    if as_base64 {
        STANDARD.encode(body)
    } else {
        String::from_utf8_lossy(body).into_owned()
    }
}

/// Canonical MIME form of a header name (`content-type` -> `Content-Type`).
/// Names containing non-token bytes are returned unchanged.
pub fn canonical_header_key(name: &str) -> String {
    if name.is_empty() || !name.bytes().all(is_token_byte) {
        return name.to_string();
    }
    let mut upper = true;
    name.chars()
        .map(|c| {
            let out = if upper {
                c.to_ascii_uppercase()
            } else {
                c.to_ascii_lowercase()
            };
            upper = c == '-';
            out
        })
        .collect()
}

fn is_token_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b)
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
