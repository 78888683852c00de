//! Instance path parsing.
//!
//! Proxied paths have the shape `/instance/<id>[/<rest>]`. The identifier is
//! one non-empty segment; everything after it is forwarded upstream.
//! The segment is matched raw and decoded before lookup, so `web%2D1` names
//! the workload `web-1`.

use percent_encoding::percent_decode_str;
use std::borrow::Cow;

use crate::resolve::ResolveError;

pub const INSTANCE_PREFIX: &str = "/instance/";

/// Return the identifier segment of an instance path.
pub fn extract_identifier(path: &str) -> Result<&str, ResolveError> {
    let identifier = path
        .strip_prefix(INSTANCE_PREFIX)
        .and_then(|rest| rest.split('/').next())
        .unwrap_or_default();

    if identifier.is_empty() {
        return Err(ResolveError::InvalidPathFormat(path.to_string()));
    }
    Ok(identifier)
}

/// Percent-decode an identifier segment. Non-UTF-8 escapes are rejected.
pub fn decode_identifier<'a>(segment: &'a str, path: &str) -> Result<Cow<'a, str>, ResolveError> {
    percent_decode_str(segment)
        .decode_utf8()
        .map_err(|_| ResolveError::InvalidPathFormat(path.to_string()))
}

/// Remove `/instance/<identifier>` from `path`; an empty remainder becomes `/`.
pub fn strip_instance_prefix<'a>(path: &'a str, identifier: &str) -> &'a str {
    let rest = path
        .strip_prefix(INSTANCE_PREFIX)
        .and_then(|rest| rest.strip_prefix(identifier))
        .unwrap_or(path);

    if rest.is_empty() {
        "/"
    } else {
        rest
    }
}
