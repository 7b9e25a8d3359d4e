//! Single-line cURL command interpreter.
//!
//! Recognizes the short flags `-X`, `-H` and `-d` and the first non-empty
//! positional token as the URL. Long-form flags, escaped quotes and `\`
//! continuations are not interpreted; they produce no match rather than an
//! error. Long flags that take a value still consume it.

use std::collections::BTreeMap;
use std::sync::LazyLock;

use regex::Regex;

use crate::models::traffic::ParsedRequest;

/// Reasons a pasted command could not be interpreted.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CurlParseError {
    #[error("input must start with 'curl'")]
    NotCurl,

    #[error("no URL found after 'curl'")]
    MissingUrl,
}

static CURL_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^curl(\s|$)").expect("valid curl prefix regex"));

/// Single-quoted, double-quoted, or bare whitespace-delimited token.
static TOKEN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"'([^']*)'|"([^"]*)"|(\S+)"#).expect("valid token regex")
});

/// Short flags whose next token is their argument.
const VALUE_FLAGS: &[&str] = &["-X", "-H", "-d", "-u", "-A", "-b", "-e", "-o"];

/// Long flags whose next token is their argument. Their values are skipped.
const LONG_VALUE_FLAGS: &[&str] = &[
    "--request",
    "--header",
    "--data",
    "--data-raw",
    "--data-binary",
    "--data-ascii",
    "--data-urlencode",
    "--json",
    "--form",
    "--user",
    "--user-agent",
    "--cookie",
    "--cookie-jar",
    "--referer",
    "--output",
    "--url",
    "--proxy",
    "--cert",
    "--key",
    "--cacert",
    "--max-time",
    "--connect-timeout",
    "--retry",
    "--resolve",
];

/// Parse a cURL command into a request descriptor.
pub fn parse_curl(input: &str) -> Result<ParsedRequest, CurlParseError> {
    let trimmed = input.trim();
    if !CURL_PREFIX.is_match(trimmed) {
        return Err(CurlParseError::NotCurl);
    }

    let tokens = tokenize(&trimmed["curl".len()..]);

    let mut url: Option<String> = None;
    let mut method: Option<String> = None;
    let mut headers = BTreeMap::new();
    let mut body: Option<String> = None;

    let mut iter = tokens.into_iter();
    while let Some(token) = iter.next() {
        if token.quoted || !token.text.starts_with('-') {
            if url.is_none() && !token.text.is_empty() {
                url = Some(token.text);
            }
            continue;
        }

        let flag = token.text.as_str();
        if LONG_VALUE_FLAGS.contains(&flag) {
            iter.next();
            continue;
        }
        if !VALUE_FLAGS.contains(&flag) {
            continue;
        }
        let Some(value) = iter.next() else {
            break;
        };

        match flag {
            "-X" => {
                if method.is_none() {
                    method = Some(value.text.to_uppercase());
                }
            }
            "-H" => {
                if let Some((key, val)) = split_header(&value.text) {
                    headers.insert(key, val);
                }
            }
            "-d" => {
                if body.is_none() {
                    body = Some(value.text);
                }
            }
            _ => {}
        }
    }

    let url = url.ok_or(CurlParseError::MissingUrl)?;

    Ok(ParsedRequest {
        url,
        method: method.unwrap_or_else(|| "GET".to_string()),
        headers,
        body,
    })
}

struct Token {
    text: String,
    quoted: bool,
}

fn tokenize(input: &str) -> Vec<Token> {
    TOKEN
        .captures_iter(input)
        .filter_map(|cap| {
            if let Some(m) = cap.get(1).or_else(|| cap.get(2)) {
                Some(Token {
                    text: m.as_str().to_string(),
                    quoted: true,
                })
            } else {
                cap.get(3).map(|m| Token {
                    text: m.as_str().to_string(),
                    quoted: false,
                })
            }
        })
        .collect()
}

/// Split `Key: Value` on the first colon, trimming both halves.
fn split_header(raw: &str) -> Option<(String, String)> {
    let (key, value) = raw.split_once(':')?;
    let key = key.trim();
    if key.is_empty() {
        return None;
    }
    Some((key.to_string(), value.trim().to_string()))
}
