//! crates/wordflow_core/src/codec.rs
//!
//! Storage encoding for the token stream and page boundaries. Both are kept
//! as JSON arrays in text columns; the decoders only ever see what the
//! encoders produced, so a decode failure indicates corrupted storage.

use crate::extract::PageBoundary;

#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("Failed to encode {what}: {source}")]
    Encode {
        what: &'static str,
        source: serde_json::Error,
    },
    #[error("Stored {what} is corrupt: {source}")]
    Corrupt {
        what: &'static str,
        source: serde_json::Error,
    },
}

pub fn encode_tokens(tokens: &[String]) -> Result<String, CodecError> {
    serde_json::to_string(tokens).map_err(|source| CodecError::Encode { what: "tokens", source })
}

/// Decodes a stored token stream. Empty input is an empty stream.
pub fn decode_tokens(text: &str) -> Result<Vec<String>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text).map_err(|source| CodecError::Corrupt { what: "tokens", source })
}

pub fn encode_boundaries(boundaries: &[PageBoundary]) -> Result<String, CodecError> {
    serde_json::to_string(boundaries)
        .map_err(|source| CodecError::Encode { what: "page boundaries", source })
}

/// Decodes stored page boundaries. Empty input is an empty list.
pub fn decode_boundaries(text: &str) -> Result<Vec<PageBoundary>, CodecError> {
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }
    serde_json::from_str(text)
        .map_err(|source| CodecError::Corrupt { what: "page boundaries", source })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokens_survive_storage() {
        let tokens: Vec<String> = [
            "plain",
            "\"quoted\"",
            "back\\slash",
            "中",
            "ハ",
            "tab\there",
            "emoji🙂",
            "[bracket],",
            "null",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();

        let encoded = encode_tokens(&tokens).unwrap();
        assert_eq!(decode_tokens(&encoded).unwrap(), tokens);
    }

    #[test]
    fn boundaries_survive_storage() {
        let boundaries = vec![
            PageBoundary { page: 1, start: 0, end: 9, count: 10 },
            PageBoundary { page: 2, start: 10, end: 10, count: 0 },
            PageBoundary { page: 3, start: 10, end: 14, count: 5 },
        ];
        let encoded = encode_boundaries(&boundaries).unwrap();
        assert_eq!(decode_boundaries(&encoded).unwrap(), boundaries);
    }

    #[test]
    fn empty_input_decodes_to_nothing() {
        assert!(decode_tokens("").unwrap().is_empty());
        assert!(decode_tokens("   ").unwrap().is_empty());
        assert!(decode_boundaries("").unwrap().is_empty());
        assert!(decode_tokens(&encode_tokens(&[]).unwrap()).unwrap().is_empty());
    }

    #[test]
    fn stored_format_is_a_json_array() {
        let encoded = encode_tokens(&["a".to_string(), "b".to_string()]).unwrap();
        assert_eq!(encoded, r#"["a","b"]"#);

        let encoded = encode_boundaries(&[PageBoundary { page: 1, start: 0, end: 1, count: 2 }]).unwrap();
        assert_eq!(encoded, r#"[{"page":1,"start":0,"end":1,"count":2}]"#);
    }

    #[test]
    fn corrupt_storage_is_reported() {
        assert!(matches!(decode_tokens("[\"unterminated"), Err(CodecError::Corrupt { .. })));
        assert!(matches!(decode_boundaries("{\"page\":1}"), Err(CodecError::Corrupt { .. })));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn any_token_stream_survives_storage(tokens in proptest::collection::vec(any::<String>(), 0..32)) {
                let encoded = encode_tokens(&tokens).unwrap();
                prop_assert_eq!(decode_tokens(&encoded).unwrap(), tokens);
            }
        }
    }
}
