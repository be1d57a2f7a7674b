use pinhole_core::ShortCode;
use serde::{Deserialize, Serialize};

/// Body of every `/shorten` response.
///
/// `isSuccess` is the string `"true"` or `"false"`, not a JSON boolean.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub is_success: String,
    pub shorten_str: String,
    pub message: String,
}

impl ShortenResponse {
    pub fn success(code: &ShortCode) -> Self {
        Self {
            is_success: true.to_string(),
            shorten_str: code.to_string(),
            message: String::new(),
        }
    }

    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            is_success: false.to_string(),
            shorten_str: String::new(),
            message: message.into(),
        }
    }
}
