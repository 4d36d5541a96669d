//! Form payload encoding for the remote API.

use std::fmt::{Debug, Formatter};

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use crate::models::request::{RequestFields, RequestKind};

/// Bytes left unescaped: ASCII alphanumerics and the RFC 3986 unreserved marks.
const FORM_VALUE: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Percent-encode a single key or value.
#[must_use]
pub fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, FORM_VALUE).to_string()
}

/// Decode the value of field `name` out of an encoded payload.
///
/// Returns the first occurrence; invalid UTF-8 sequences are replaced.
#[must_use]
pub fn payload_field(payload: &str, name: &str) -> Option<String> {
    payload
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(key, _)| percent_decode_str(key).decode_utf8_lossy() == name)
        .map(|(_, value)| percent_decode_str(value).decode_utf8_lossy().into_owned())
}

/// Builds the `action=...&apikey=...&field=value...` request body.
#[derive(Clone)]
pub struct RequestBuilder {
    api_key: String,
}

impl RequestBuilder {
    /// Create a builder that stamps every payload with `api_key`.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
        }
    }

    /// Encode a request body. Fields keep their declaration order.
    #[must_use]
    pub fn build(&self, kind: RequestKind, fields: &RequestFields) -> String {
        let mut payload = format!(
            "action={}&apikey={}",
            encode_component(kind.action()),
            encode_component(&self.api_key)
        );
        for (name, value) in fields.iter() {
            payload.push('&');
            payload.push_str(&encode_component(name));
            payload.push('=');
            payload.push_str(&encode_component(value));
        }
        payload
    }
}

impl Debug for RequestBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestBuilder")
            .field("api_key", &"<redacted>")
            .finish()
    }
}
