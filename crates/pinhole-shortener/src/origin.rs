//! Assembly of an origin URL from the parts a client submits.
//!
//! No validation happens here: empty or odd components are kept and only
//! escaped, so the resulting string matches what earlier producers of the
//! record set wrote for the same input.

use serde::{Deserialize, Serialize};
use std::fmt::Write as _;

/// The `{scheme, domain, path}` triple a client submits to be shortened.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginParts {
    #[serde(default)]
    pub scheme: String,
    #[serde(default)]
    pub domain: String,
    #[serde(default)]
    pub path: String,
}

impl OriginParts {
    pub fn new(
        scheme: impl Into<String>,
        domain: impl Into<String>,
        path: impl Into<String>,
    ) -> Self {
        Self {
            scheme: scheme.into(),
            domain: domain.into(),
            path: path.into(),
        }
    }

    /// Serializes the parts as `scheme://domain/path`.
    ///
    /// * `scheme:` is written only for a non-empty scheme.
    /// * `//` precedes the host when there is a scheme or host, and a host or
    ///   path to follow it.
    /// * a `/` is inserted between a host and a path not starting with one.
    /// * the path is percent-escaped except for unreserved characters and
    ///   `$&+,/:;=@`; the host keeps sub-delimiters, `:`, `[`, `]`, `<`,
    ///   `>` and `"`.
    pub fn to_origin(&self) -> String {
        let mut out = String::new();

        if !self.scheme.is_empty() {
            out.push_str(&self.scheme);
            out.push(':');
        }

        if !self.scheme.is_empty() || !self.domain.is_empty() {
            if !self.domain.is_empty() || !self.path.is_empty() {
                out.push_str("//");
            }
            escape_into(&mut out, &self.domain, is_host_safe);
        }

        let path = escape_path(&self.path);
        if !path.is_empty() && !path.starts_with('/') && !self.domain.is_empty() {
            out.push('/');
        }
        if out.is_empty() {
            // A colon in the first segment would read as a scheme.
            let first_segment = path.split('/').next().unwrap_or_default();
            if first_segment.contains(':') {
                out.push_str("./");
            }
        }
        out.push_str(&path);

        out
    }
}

fn escape_path(path: &str) -> String {
    if path == "*" {
        return path.to_owned();
    }
    let mut out = String::with_capacity(path.len());
    escape_into(&mut out, path, is_path_safe);
    out
}

fn escape_into(out: &mut String, input: &str, is_safe: fn(u8) -> bool) {
    for byte in input.bytes() {
        if is_safe(byte) {
            out.push(byte as char);
        } else {
            // Writing to a String cannot fail.
            let _ = write!(out, "%{byte:02X}");
        }
    }
}

fn is_unreserved(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || matches!(byte, b'-' | b'_' | b'.' | b'~')
}

fn is_path_safe(byte: u8) -> bool {
    is_unreserved(byte)
        || matches!(
            byte,
            b'$' | b'&' | b'+' | b',' | b'/' | b':' | b';' | b'=' | b'@'
        )
}

fn is_host_safe(byte: u8) -> bool {
    is_unreserved(byte)
        || matches!(
            byte,
            b'!' | b'$'
                | b'&'
                | b'\''
                | b'('
                | b')'
                | b'*'
                | b'+'
                | b','
                | b';'
                | b'='
                | b':'
                | b'['
                | b']'
                | b'<'
                | b'>'
                | b'"'
        )
}
