use crate::error::{AppError, Result};
use crate::model::ShortenResponse;
use crate::state::AppState;
use axum::body::Bytes;
use axum::extract::State;
use axum::Json;
use pinhole_shortener::OriginParts;
use serde_json::Deserializer;

pub async fn shorten_handler(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ShortenResponse>> {
    let parts = decode_parts(&body)?;
    let code = state.shortener().shorten(&parts).await?;
    Ok(Json(ShortenResponse::success(&code)))
}

/// Decodes the first JSON value of the body. Anything after it is ignored
/// and `null` stands for all-empty parts.
fn decode_parts(body: &[u8]) -> Result<OriginParts> {
    Deserializer::from_slice(body)
        .into_iter::<Option<OriginParts>>()
        .next()
        .and_then(|value| value.ok())
        .map(Option::unwrap_or_default)
        .ok_or(AppError::InvalidBody)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_full_body() {
        let parts = decode_parts(br##"{"scheme":"https","domain":"liyou-chen.site","path":"#skills"}"##).unwrap();
        assert_eq!(parts, OriginParts::new("https", "liyou-chen.site", "#skills"));
    }

    #[test]
    fn trailing_data_and_unknown_fields_are_ignored() {
        let parts = decode_parts(br#"{"domain":"a.b","extra":1} {"domain":"c.d"}"#).unwrap();
        assert_eq!(parts, OriginParts::new("", "a.b", ""));

        let parts = decode_parts(br#"{"domain":"a.b"} garbage"#).unwrap();
        assert_eq!(parts.domain, "a.b");
    }

    #[test]
    fn null_is_empty_parts() {
        assert_eq!(decode_parts(b"null").unwrap(), OriginParts::default());
    }

    #[test]
    fn rejects_undecodable_bodies() {
        let bodies: [&[u8]; 6] = [b"", b"   ", b"{", b"[1,2]", br#"{"scheme":1}"#, b"hello"];
        for body in bodies {
            assert!(matches!(decode_parts(body), Err(AppError::InvalidBody)), "{body:?}");
        }
    }
}
