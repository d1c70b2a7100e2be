//! Request and response shapes at the retrieval boundary.

use serde::{Deserialize, Serialize};

/// Request for one node's log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsRequest {
    /// `self` or `host:port` of the node.
    pub ipport: String,
    /// Category name; missing means `debug`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl LogsRequest {
    /// Creates a request for a node's default log.
    #[must_use]
    pub fn new(ipport: impl Into<String>) -> Self {
        Self {
            ipport: ipport.into(),
            name: None,
        }
    }

    /// Sets the category name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

/// A node's log content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogsResponse {
    /// The node as the caller addressed it.
    pub ipport: String,
    /// The category that was read, after defaulting.
    pub name: String,
    /// Log content, or an explanatory message for unsupported streams.
    pub log: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_name_is_optional() {
        let request: LogsRequest =
            serde_json::from_str(r#"{"ipport":"self"}"#).expect("deserialize");
        assert_eq!(request, LogsRequest::new("self"));

        let json = serde_json::to_value(LogsRequest::new("self")).expect("serialize");
        assert!(json.get("name").is_none());
    }

    #[test]
    fn request_with_name() {
        let request: LogsRequest =
            serde_json::from_str(r#"{"ipport":"10.0.0.2:54321","name":"stderr"}"#)
                .expect("deserialize");
        assert_eq!(request, LogsRequest::new("10.0.0.2:54321").with_name("stderr"));
    }
}
