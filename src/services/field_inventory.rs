//! Field inventory generation: enumerate every header, query parameter,
//! cookie and JSON body path of a request/response pair as annotatable
//! field records.
//!
//! Parse failures never propagate. A malformed URL yields no query fields
//! and a non-JSON body collapses into a single `body` placeholder record.

use std::collections::{BTreeMap, HashSet};

use axum_extra::extract::cookie::Cookie;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::models::field::{FieldCategory, FieldInventory, FieldRecord, FieldSource};
use crate::models::traffic::{CapturedResponse, ParsedRequest};
use crate::services::classification::Classifier;

/// Cookie names reported in placeholder mode whenever `Set-Cookie` is present.
pub const PLACEHOLDER_COOKIES: [&str; 3] = ["session_id", "csrf_token", "user_preferences"];

/// Path used for a body that is not a JSON object.
pub const BODY_PLACEHOLDER: &str = "body";

/// How response cookie fields are derived from `Set-Cookie`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieMode {
    /// Three fixed cookie names, regardless of the header contents.
    #[default]
    Placeholder,
    /// One record per cookie actually named in the header.
    Parsed,
}

impl std::str::FromStr for CookieMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "placeholder" => Ok(Self::Placeholder),
            "parsed" => Ok(Self::Parsed),
            other => Err(format!("unknown cookie mode: {other}")),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct InventoryOptions {
    pub cookie_mode: CookieMode,
}

/// Build the six-bucket field inventory for a request/response pair.
pub fn build_inventory(
    request: &ParsedRequest,
    response: &CapturedResponse,
    options: &InventoryOptions,
    classifier: &dyn Classifier,
) -> FieldInventory {
    let request_body = body_fields(request.body.as_deref(), FieldSource::Request);
    let response_body = body_fields(Some(&response.body), FieldSource::Response);

    FieldInventory {
        request_headers: classify(
            header_fields(&request.headers, FieldSource::Request),
            false,
            classifier,
        ),
        request_query: classify(query_fields(&request.url), false, classifier),
        request_body: classify(request_body.records, request_body.from_object, classifier),
        response_headers: classify(
            header_fields(&response.headers, FieldSource::Response),
            false,
            classifier,
        ),
        response_cookies: classify(
            cookie_fields(response, options.cookie_mode),
            false,
            classifier,
        ),
        response_body: classify(response_body.records, response_body.from_object, classifier),
    }
}

fn classify(
    mut records: Vec<FieldRecord>,
    from_json_object: bool,
    classifier: &dyn Classifier,
) -> Vec<FieldRecord> {
    for record in &mut records {
        record.tags = classifier.classify(record, from_json_object);
    }
    records
}

/// Collects records for one partition, keeping the first record per path.
struct Partition {
    source: FieldSource,
    category: FieldCategory,
    seen: HashSet<String>,
    records: Vec<FieldRecord>,
}

impl Partition {
    fn new(source: FieldSource, category: FieldCategory) -> Self {
        Self {
            source,
            category,
            seen: HashSet::new(),
            records: Vec::new(),
        }
    }

    fn push(&mut self, path: &str, value: impl Into<String>) {
        if !self.seen.insert(path.to_string()) {
            tracing::debug!(
                field_path = path,
                source = self.source.as_str(),
                category = self.category.as_str(),
                "Dropping duplicate field path"
            );
            return;
        }
        self.records
            .push(FieldRecord::new(path, self.source, self.category, value));
    }

    fn into_records(self) -> Vec<FieldRecord> {
        self.records
    }
}

pub fn header_fields(headers: &BTreeMap<String, String>, source: FieldSource) -> Vec<FieldRecord> {
    let mut partition = Partition::new(source, FieldCategory::Header);
    for (name, value) in headers {
        partition.push(name, value.as_str());
    }
    partition.into_records()
}

/// Enumerate query parameters of `url`; a URL that fails to parse has none.
pub fn query_fields(raw_url: &str) -> Vec<FieldRecord> {
    let parsed = match url::Url::parse(raw_url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(url = raw_url, error = %e, "Skipping query extraction for unparseable URL");
            return Vec::new();
        }
    };

    let mut partition = Partition::new(FieldSource::Request, FieldCategory::Query);
    for (key, value) in parsed.query_pairs() {
        partition.push(&key, value.into_owned());
    }
    partition.into_records()
}

struct BodyFields {
    records: Vec<FieldRecord>,
    from_object: bool,
}

/// Walk a JSON object body, emitting one record per key path at every depth.
pub fn body_fields_for(body: Option<&str>, source: FieldSource) -> Vec<FieldRecord> {
    body_fields(body, source).records
}

fn body_fields(body: Option<&str>, source: FieldSource) -> BodyFields {
    let mut partition = Partition::new(source, FieldCategory::Body);

    let Some(raw) = body.filter(|b| !b.trim().is_empty()) else {
        return BodyFields {
            records: Vec::new(),
            from_object: false,
        };
    };

    match serde_json::from_str::<Value>(raw) {
        Ok(Value::Object(map)) => {
            walk_object(&map, None, &mut partition);
            BodyFields {
                records: partition.into_records(),
                from_object: true,
            }
        }
        Ok(_) => {
            partition.push(BODY_PLACEHOLDER, raw);
            BodyFields {
                records: partition.into_records(),
                from_object: false,
            }
        }
        Err(e) => {
            tracing::debug!(source = source.as_str(), error = %e, "Body is not JSON, using placeholder field");
            partition.push(BODY_PLACEHOLDER, raw);
            BodyFields {
                records: partition.into_records(),
                from_object: false,
            }
        }
    }
}

fn walk_object(map: &Map<String, Value>, prefix: Option<&str>, partition: &mut Partition) {
    for (key, value) in map {
        let path = match prefix {
            Some(prefix) => format!("{prefix}.{key}"),
            None => key.clone(),
        };
        partition.push(&path, render_value(value));
        // Arrays are reported as a single field and not descended into.
        if let Value::Object(child) = value {
            walk_object(child, Some(&path), partition);
        }
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Cookie records for a response; none unless `Set-Cookie` is present.
pub fn cookie_fields(response: &CapturedResponse, mode: CookieMode) -> Vec<FieldRecord> {
    let Some(header) = response.header("set-cookie") else {
        return Vec::new();
    };

    let mut partition = Partition::new(FieldSource::Response, FieldCategory::Cookie);
    match mode {
        CookieMode::Placeholder => {
            for name in PLACEHOLDER_COOKIES {
                partition.push(name, header);
            }
        }
        CookieMode::Parsed => {
            for raw in split_set_cookie(header) {
                match Cookie::parse(raw.as_str()) {
                    Ok(cookie) => partition.push(cookie.name(), cookie.value()),
                    Err(e) => {
                        tracing::debug!(error = %e, "Skipping unparseable Set-Cookie entry");
                    }
                }
            }
        }
    }
    partition.into_records()
}

/// Split a folded `Set-Cookie` value into individual cookie strings.
///
/// Entries are separated by newlines or by commas that precede a new
/// `name=value` pair; commas inside `Expires` dates stay attached.
fn split_set_cookie(header: &str) -> Vec<String> {
    let mut cookies: Vec<String> = Vec::new();
    for line in header.lines() {
        for piece in line.split(',') {
            let starts_cookie = piece
                .split(';')
                .next()
                .and_then(|pair| pair.split_once('='))
                .is_some_and(|(name, _)| {
                    let name = name.trim();
                    !name.is_empty() && !name.contains(char::is_whitespace)
                });

            match cookies.last_mut() {
                Some(last) if !starts_cookie => {
                    last.push(',');
                    last.push_str(piece);
                }
                _ => cookies.push(piece.trim().to_string()),
            }
        }
    }
    cookies.retain(|c| !c.is_empty());
    cookies
}
