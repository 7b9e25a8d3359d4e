//! Captured HTTP traffic: a request recovered from a cURL command and the
//! response the reviewer pasted alongside it.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// HTTP methods tracked by the entity catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Patch,
    Delete,
    Head,
    Options,
}

impl HttpMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Patch => "PATCH",
            Self::Delete => "DELETE",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl std::fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HttpMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "PATCH" => Ok(Self::Patch),
            "DELETE" => Ok(Self::Delete),
            "HEAD" => Ok(Self::Head),
            "OPTIONS" => Ok(Self::Options),
            other => Err(format!("unsupported HTTP method: {other}")),
        }
    }
}

/// Request descriptor recovered from a single-line cURL command.
///
/// The method is kept as free text because `-X` accepts any token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedRequest {
    pub url: String,
    pub method: String,
    pub headers: BTreeMap<String, String>,
    pub body: Option<String>,
}

/// Response paired with a parsed request for field analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CapturedResponse {
    pub status: u16,
    #[serde(default)]
    pub status_text: String,
    #[serde(default)]
    pub headers: BTreeMap<String, String>,
    #[serde(default)]
    pub body: String,
}

impl CapturedResponse {
    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_round_trips_through_serde() {
        let json = serde_json::to_string(&HttpMethod::Delete).unwrap();
        assert_eq!(json, "\"DELETE\"");
        let method: HttpMethod = serde_json::from_str("\"PATCH\"").unwrap();
        assert_eq!(method, HttpMethod::Patch);
    }

    #[test]
    fn method_from_str_is_case_insensitive() {
        assert_eq!("post".parse::<HttpMethod>().unwrap(), HttpMethod::Post);
        assert!("BREW".parse::<HttpMethod>().is_err());
    }

    #[test]
    fn response_header_lookup_ignores_case() {
        let mut headers = BTreeMap::new();
        headers.insert("Set-Cookie".to_string(), "a=1".to_string());
        let response = CapturedResponse {
            status: 200,
            status_text: "OK".to_string(),
            headers,
            body: String::new(),
        };
        assert_eq!(response.header("set-cookie"), Some("a=1"));
        assert_eq!(response.header("content-type"), None);
    }

    #[test]
    fn response_defaults_optional_fields() {
        let response: CapturedResponse = serde_json::from_str(r#"{"status":204}"#).unwrap();
        assert_eq!(response.status, 204);
        assert!(response.headers.is_empty());
        assert!(response.body.is_empty());
    }
}
