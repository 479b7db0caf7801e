use super::TransportError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Response View
///
/// A fully-read HTTP response. It lives for one tick: the response port gets
/// its JSON form, the body port gets the raw body, extraction reads the body,
/// and then it is dropped.
///
/// On the wire the body is base64 text so that binary payloads survive JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseView {
    /// Numeric status code.
    pub status: u16,
    /// Status code and canonical reason, e.g. `200 OK`.
    pub status_line: String,
    /// Response headers; repeated headers keep every value in arrival order.
    #[serde(rename = "header")]
    pub headers: BTreeMap<String, Vec<String>>,
    /// Raw body bytes.
    #[serde(with = "base64_body")]
    pub body: Vec<u8>,
}

impl ResponseView {
    /// Reads status, headers and the complete body of `response`.
    pub async fn read(response: reqwest::Response) -> Result<Self, TransportError> {
        let status = response.status();
        let status_line = match status.canonical_reason() {
            Some(reason) => format!("{} {}", status.as_u16(), reason),
            None => status.as_u16().to_string(),
        };

        let mut headers: BTreeMap<String, Vec<String>> = BTreeMap::new();
        for (name, value) in response.headers() {
            headers
                .entry(name.as_str().to_string())
                .or_default()
                .push(String::from_utf8_lossy(value.as_bytes()).into_owned());
        }

        let body = response.bytes().await?.to_vec();

        Ok(Self {
            status: status.as_u16(),
            status_line,
            headers,
            body,
        })
    }

    /// JSON packet written to the response port.
    pub fn to_packet(&self) -> Result<Vec<u8>, TransportError> {
        Ok(serde_json::to_vec(self)?)
    }
}

mod base64_body {
    use base64::{engine::general_purpose, Engine as _};
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(body: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&general_purpose::STANDARD.encode(body))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let text = String::deserialize(deserializer)?;
        general_purpose::STANDARD.decode(text).map_err(de::Error::custom)
    }
}
