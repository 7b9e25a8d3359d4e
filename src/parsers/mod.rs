//! Parsers for captured traffic pasted by reviewers.
//!
//! Only single-line cURL commands are recognized today; each parser yields a
//! normalized `ParsedRequest` that the field inventory generator consumes.

pub mod curl;

pub use curl::{parse_curl, CurlParseError};
