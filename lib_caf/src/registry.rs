//! # Component Registry Entries
//!
//! Every component can print a self-description (`--json`) that flow editors
//! use to list its ports. The entry is plain data serialized with `serde_json`.

use serde::Serialize;

/// Describes one input or output port of a component.
#[derive(Debug, Clone, Serialize)]
pub struct PortDoc {
    /// Port name as used on the command line (`int`, `req`, ...).
    pub name: String,
    /// Packet payload type carried by the port.
    #[serde(rename = "type")]
    pub packet_type: String,
    /// Free-form description.
    pub description: String,
    /// Whether the component refuses to start without this port.
    pub required: bool,
}

impl PortDoc {
    fn new(name: &str, packet_type: &str, description: &str, required: bool) -> Self {
        Self {
            name: name.to_string(),
            packet_type: packet_type.to_string(),
            description: description.to_string(),
            required,
        }
    }
}

/// A component's registry entry.
#[derive(Debug, Clone, Serialize)]
pub struct ComponentDoc {
    /// What the component does.
    pub description: String,
    /// Input ports.
    pub inports: Vec<PortDoc>,
    /// Output ports.
    pub outports: Vec<PortDoc>,
}

impl ComponentDoc {
    /// Pretty JSON rendering used by `--json`.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

/// Registry entry of the `http_property` component.
pub fn http_property_entry() -> ComponentDoc {
    ComponentDoc {
        description: "Periodically polls an HTTP endpoint and extracts a typed property from the response using a template".to_string(),
        inports: vec![
            PortDoc::new("int", "duration", "Polling interval, e.g. 10s or 500ms", true),
            PortDoc::new("req", "json", "HTTP request descriptor (url, method, content-type, headers)", true),
            PortDoc::new("tmpl", "json", "Property template (id, name, group, type, template)", true),
        ],
        outports: vec![
            PortDoc::new("prop", "json", "Extracted property envelope", false),
            PortDoc::new("resp", "json", "HTTP response (status, header, body)", false),
            PortDoc::new("body", "bytes", "Raw HTTP response body", false),
            PortDoc::new("err", "string", "Transport and conversion error messages", false),
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_property_entry_lists_all_ports() {
        let doc = http_property_entry();
        let json: serde_json::Value = serde_json::from_str(&doc.to_json().unwrap()).unwrap();

        let inports: Vec<_> = json["inports"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        let outports: Vec<_> = json["outports"].as_array().unwrap().iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(inports, ["int", "req", "tmpl"]);
        assert_eq!(outports, ["prop", "resp", "body", "err"]);
        assert!(json["inports"].as_array().unwrap().iter().all(|p| p["required"] == true));
        assert_eq!(json["outports"][0]["type"], "json");
    }
}
