//! Encoding of a [`RecordSet`] to and from the bytes of its blob.
//!
//! The blob holds a compact JSON array of `{origin, shorten, createTime}`
//! objects. Encoding applies HTML-safe escaping of `<`, `>`, `&`, U+2028 and
//! U+2029 so the output is byte-identical to record sets already in use by
//! other writers of this format.

use crate::error::CodecError;
use crate::record::{MappingRecord, RecordSet};
use serde::Serialize;
use serde_json::ser::Formatter;
use std::io;

/// Decodes the content of a record set blob.
///
/// Empty content and the JSON literal `null` decode to an empty set, since
/// the blob may have been created before any mapping was written.
pub fn decode(bytes: &[u8]) -> Result<RecordSet, CodecError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(RecordSet::new());
    }

    let records: Option<Vec<MappingRecord>> =
        serde_json::from_slice(bytes).map_err(|e| CodecError::Malformed(e.to_string()))?;

    Ok(records.map(RecordSet::from).unwrap_or_default())
}

/// Encodes the full record set, preserving record order.
pub fn encode(records: &RecordSet) -> Result<Vec<u8>, CodecError> {
    // ~96 bytes per record is typical for short origins.
    let mut out = Vec::with_capacity(records.len().saturating_mul(96).max(2));
    let mut serializer = serde_json::Serializer::with_formatter(&mut out, HtmlSafeFormatter);
    records
        .serialize(&mut serializer)
        .map_err(|e| CodecError::Serialize(e.to_string()))?;
    Ok(out)
}

/// Compact JSON formatter that additionally escapes HTML-significant
/// characters and the JavaScript line terminators.
#[derive(Debug, Clone, Copy, Default)]
struct HtmlSafeFormatter;

impl Formatter for HtmlSafeFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (index, ch) in fragment.char_indices() {
            let escaped = match ch {
                '<' => "\\u003c",
                '>' => "\\u003e",
                '&' => "\\u0026",
                '\u{2028}' => "\\u2028",
                '\u{2029}' => "\\u2029",
                _ => continue,
            };
            writer.write_all(fragment[start..index].as_bytes())?;
            writer.write_all(escaped.as_bytes())?;
            start = index + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shortcode::ShortCode;
    use jiff::Timestamp;

    fn record(origin: &str, code: &str, seconds: i64) -> MappingRecord {
        MappingRecord::with_created_at(
            origin,
            ShortCode::new_unchecked(code),
            Timestamp::from_second(seconds).unwrap(),
        )
    }

    #[test]
    fn empty_content_decodes_to_empty_set() {
        assert!(decode(b"").unwrap().is_empty());
        assert!(decode(b"  \n").unwrap().is_empty());
        assert!(decode(b"null").unwrap().is_empty());
        assert!(decode(b"[]").unwrap().is_empty());
    }

    #[test]
    fn malformed_content_is_rejected() {
        assert!(matches!(decode(b"{"), Err(CodecError::Malformed(_))));
        assert!(matches!(decode(b"{\"origin\":\"x\"}"), Err(CodecError::Malformed(_))));
        assert!(matches!(
            decode(br#"[{"origin":"https://a","createTime":"1"}]"#),
            Err(CodecError::Malformed(_))
        ));
        // One bad record fails the whole set rather than being zero-filled.
        assert!(matches!(
            decode(br#"[{"origin":"https://a","shorten":"abc","createTime":"1"},{"origin":"https://b","shorten":"def","createTime":"soon"}]"#),
            Err(CodecError::Malformed(_))
        ));
    }

    #[test]
    fn decodes_existing_blob() {
        let blob = br#"[{"origin":"https://liyou-chen.site/%23skills","shorten":"abcd","createTime":"1686023936"}]"#;
        let set = decode(blob).unwrap();

        assert_eq!(set.len(), 1);
        let rec = set.iter().next().unwrap();
        assert_eq!(rec.origin, "https://liyou-chen.site/%23skills");
        assert_eq!(rec.code.as_str(), "abcd");
        assert_eq!(rec.created_at.as_second(), 1_686_023_936);
    }

    #[test]
    fn encode_is_compact_and_ordered() {
        let set: RecordSet = vec![
            record("https://example.com/a", "abc123", 1_686_023_936),
            record("https://example.com/b", "def456", 1_686_023_999),
        ]
        .into();

        let bytes = encode(&set).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            concat!(
                r#"[{"origin":"https://example.com/a","shorten":"abc123","createTime":"1686023936"},"#,
                r#"{"origin":"https://example.com/b","shorten":"def456","createTime":"1686023999"}]"#,
            )
        );
    }

    #[test]
    fn encode_escapes_html_characters() {
        let set: RecordSet = vec![record("https://a.b/?x=1&y=<2>\u{2028}", "abc123", 7)].into();

        let bytes = encode(&set).unwrap();
        assert_eq!(
            std::str::from_utf8(&bytes).unwrap(),
            r#"[{"origin":"https://a.b/?x=1\u0026y=\u003c2\u003e\u2028","shorten":"abc123","createTime":"7"}]"#
        );
    }

    #[test]
    fn round_trip_preserves_records() {
        let set: RecordSet = vec![
            record("https://example.com/a", "abc123", 0),
            record("", "", 1),
            record("https://ex\"ample.com/<script>&\u{2029}", "zzzzzz", 1_999_999_999),
            record("https://example.com/a", "dup000", 42),
        ]
        .into();

        assert_eq!(decode(&encode(&set).unwrap()).unwrap(), set);
    }

    #[test]
    fn empty_set_encodes_to_empty_array() {
        assert_eq!(encode(&RecordSet::new()).unwrap(), b"[]");
    }
}
