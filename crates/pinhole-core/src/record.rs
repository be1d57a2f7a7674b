use crate::shortcode::ShortCode;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

/// A persisted association between an origin URL and its short code.
///
/// Field names on the wire are `origin`, `shorten` and `createTime`, the
/// latter a decimal string of Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MappingRecord {
    /// The absolute URL the code redirects to.
    pub origin: String,
    /// The short code assigned to `origin`.
    #[serde(rename = "shorten")]
    pub code: ShortCode,
    /// When the mapping was created, at whole-second precision.
    #[serde(rename = "createTime", with = "unix_seconds")]
    pub created_at: Timestamp,
}

impl MappingRecord {
    /// Creates a record stamped with the current time.
    pub fn new(origin: impl Into<String>, code: ShortCode) -> Self {
        Self::with_created_at(origin, code, Timestamp::now())
    }

    /// Creates a record with an explicit creation time.
    ///
    /// Sub-second precision is dropped since the stored format only keeps
    /// seconds.
    pub fn with_created_at(origin: impl Into<String>, code: ShortCode, created_at: Timestamp) -> Self {
        let created_at = Timestamp::from_second(created_at.as_second()).unwrap_or(created_at);
        Self {
            origin: origin.into(),
            code,
            created_at,
        }
    }
}

/// The complete, ordered collection of mappings stored in one blob.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordSet {
    records: Vec<MappingRecord>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MappingRecord> {
        self.records.iter()
    }

    /// Appends a record at the end of the set.
    pub fn push(&mut self, record: MappingRecord) {
        self.records.push(record);
    }

    /// Returns the first record whose origin equals `origin`.
    pub fn find_by_origin(&self, origin: &str) -> Option<&MappingRecord> {
        self.records.iter().find(|record| record.origin == origin)
    }

    /// Returns the first record whose code equals `code`.
    pub fn find_by_code(&self, code: &ShortCode) -> Option<&MappingRecord> {
        self.records.iter().find(|record| &record.code == code)
    }

    pub fn contains_code(&self, code: &ShortCode) -> bool {
        self.find_by_code(code).is_some()
    }
}

impl From<Vec<MappingRecord>> for RecordSet {
    fn from(records: Vec<MappingRecord>) -> Self {
        Self { records }
    }
}

impl FromIterator<MappingRecord> for RecordSet {
    fn from_iter<I: IntoIterator<Item = MappingRecord>>(iter: I) -> Self {
        Self {
            records: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a MappingRecord;
    type IntoIter = std::slice::Iter<'a, MappingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

impl IntoIterator for RecordSet {
    type Item = MappingRecord;
    type IntoIter = std::vec::IntoIter<MappingRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.into_iter()
    }
}

mod unix_seconds {
    use jiff::Timestamp;
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};
    use std::borrow::Cow;

    pub fn serialize<S>(timestamp: &Timestamp, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(&timestamp.as_second())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Timestamp, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Cow::<'de, str>::deserialize(deserializer)?;
        let seconds: i64 = raw
            .parse()
            .map_err(|e| D::Error::custom(format!("invalid createTime '{raw}': {e}")))?;
        Timestamp::from_second(seconds)
            .map_err(|e| D::Error::custom(format!("createTime out of range '{raw}': {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(origin: &str, code: &str) -> MappingRecord {
        MappingRecord::with_created_at(
            origin,
            ShortCode::new_unchecked(code),
            Timestamp::from_second(1_686_023_936).unwrap(),
        )
    }

    #[test]
    fn created_at_is_truncated_to_seconds() {
        let precise = Timestamp::from_nanosecond(1_686_023_936_123_456_789).unwrap();
        let rec = MappingRecord::with_created_at("https://a.b", ShortCode::new_unchecked("x"), precise);
        assert_eq!(rec.created_at, Timestamp::from_second(1_686_023_936).unwrap());
    }

    #[test]
    fn find_returns_first_match() {
        let set: RecordSet = vec![
            record("https://example.com/a", "first1"),
            record("https://example.com/a", "second"),
            record("https://example.com/b", "third3"),
        ]
        .into();

        assert_eq!(
            set.find_by_origin("https://example.com/a").unwrap().code.as_str(),
            "first1"
        );
        assert_eq!(
            set.find_by_code(&ShortCode::new_unchecked("third3")).unwrap().origin,
            "https://example.com/b"
        );
        assert!(set.find_by_origin("https://example.com/c").is_none());
        assert!(!set.contains_code(&ShortCode::new_unchecked("nope00")));
    }

    #[test]
    fn push_keeps_insertion_order() {
        let mut set = RecordSet::new();
        set.push(record("https://one", "aaaaaa"));
        set.push(record("https://two", "bbbbbb"));

        let origins: Vec<_> = set.iter().map(|r| r.origin.as_str()).collect();
        assert_eq!(origins, ["https://one", "https://two"]);
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn record_uses_wire_field_names() {
        let json = serde_json::to_value(record("https://example.com/a", "abc123")).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "origin": "https://example.com/a",
                "shorten": "abc123",
                "createTime": "1686023936",
            })
        );
    }

    #[test]
    fn non_numeric_create_time_is_rejected() {
        let err = serde_json::from_str::<MappingRecord>(
            r#"{"origin":"https://a","shorten":"abc","createTime":"yesterday"}"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("invalid createTime"));
    }
}
