use super::null_as_default;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// # Request Descriptor
///
/// Describes the HTTP request a polling component issues on every tick. Arrives
/// as a JSON packet on the request port and is never modified afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    /// Absolute URL of the polled endpoint.
    #[serde(default, deserialize_with = "null_as_default")]
    pub url: String,
    /// HTTP method. Empty means `GET`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub method: String,
    /// Value of the outgoing `Content-Type` header. Also selects the body
    /// format used for extraction.
    #[serde(rename = "content-type", default, deserialize_with = "null_as_default")]
    pub content_type: String,
    /// Extra headers; every value listed for a name is sent.
    #[serde(default, deserialize_with = "null_as_default")]
    pub headers: BTreeMap<String, Vec<String>>,
}

impl RequestDescriptor {
    /// Whether the response body can be parsed as JSON for extraction.
    pub fn is_json(&self) -> bool {
        self.content_type.ends_with("json")
    }

    /// The method to send, defaulting to `GET`.
    pub fn effective_method(&self) -> &str {
        if self.method.is_empty() {
            "GET"
        } else {
            &self.method
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_wire_names() {
        let raw = r#"{
            "url": "https://example.com/api",
            "method": "POST",
            "content-type": "application/json",
            "headers": { "X-Token": ["abc", "def"] }
        }"#;
        let request: RequestDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(request.url, "https://example.com/api");
        assert_eq!(request.effective_method(), "POST");
        assert!(request.is_json());
        assert_eq!(request.headers["X-Token"], vec!["abc", "def"]);
    }

    #[test]
    fn missing_fields_default() {
        let request: RequestDescriptor = serde_json::from_str(r#"{"url": "http://x"}"#).unwrap();
        assert_eq!(request.effective_method(), "GET");
        assert!(request.headers.is_empty());
        assert!(!request.is_json());
    }

    #[test]
    fn null_fields_read_as_empty() {
        let raw = r#"{"url": "http://x", "method": null, "content-type": null, "headers": null}"#;
        let request: RequestDescriptor = serde_json::from_str(raw).unwrap();
        assert_eq!(request.effective_method(), "GET");
        assert!(request.content_type.is_empty());
        assert!(request.headers.is_empty());

        let request: RequestDescriptor = serde_json::from_str(r#"{"url": null}"#).unwrap();
        assert!(request.url.is_empty());
    }

    #[test]
    fn json_detection_uses_suffix() {
        let mut request = RequestDescriptor::default();
        for (content_type, expected) in [
            ("application/json", true),
            ("application/vnd.api+json", true),
            ("text/plain", false),
            ("application/json; charset=utf-8", false),
        ] {
            request.content_type = content_type.to_string();
            assert_eq!(request.is_json(), expected, "{content_type}");
        }
    }
}
