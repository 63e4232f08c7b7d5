//! URL-safe encoding of export documents for share links.

use crate::board::BoardStore;
use crate::codec::ImportOutcome;
use crate::drawing::DrawingPort;
use crate::model::ExportDocument;
use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use serde_json::Value;
use thiserror::Error;

/// Share parameter decoding errors.
#[derive(Debug, Error)]
pub enum ShareError {
    #[error("Share parameter is not valid base64: {0}")]
    Base64(#[from] base64::DecodeError),
    #[error("Share parameter is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
    #[error("Share parameter is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Encode a document as unpadded base64url of its compact JSON.
pub fn encode_state_to_param(document: &ExportDocument) -> Result<String, ShareError> {
    let json = serde_json::to_string(document)?;
    Ok(URL_SAFE_NO_PAD.encode(json.as_bytes()))
}

/// Decode a share parameter back into untrusted JSON.
///
/// Padding and the standard `+/` alphabet are tolerated.
pub fn decode_state_from_param(param: &str) -> Result<Value, ShareError> {
    let normalized: String = param
        .trim()
        .trim_end_matches('=')
        .chars()
        .map(|c| match c {
            '+' => '-',
            '/' => '_',
            other => other,
        })
        .collect();
    let bytes = URL_SAFE_NO_PAD.decode(normalized.as_bytes())?;
    let json = String::from_utf8(bytes)?;
    Ok(serde_json::from_str(&json)?)
}

impl<D: DrawingPort> BoardStore<D> {
    /// Import the session carried by a share parameter.
    pub fn import_from_param(&mut self, param: &str) -> ImportOutcome {
        match decode_state_from_param(param) {
            Ok(raw) => self.import_all(&raw),
            Err(e) => {
                log::warn!("Share parameter rejected: {}", e);
                ImportOutcome {
                    ok: false,
                    message: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{DrawLine, DrawText, PlayerPatch};

    #[test]
    fn test_param_is_url_safe() {
        let mut board = BoardStore::default();
        board
            .drawing_mut()
            .add_text(DrawText::new(0.0, 0.0, "ゾーン ~~~ ??? >>>"));
        let param = encode_state_to_param(&board.export_all()).unwrap();

        assert!(!param.is_empty());
        assert!(
            param
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        );
    }

    #[test]
    fn test_import_from_param() {
        let mut source = BoardStore::default();
        source.update_player("B-FP2", PlayerPatch::position(3.5, -1.25));
        source
            .drawing_mut()
            .add_line(DrawLine::new(vec![1.0, 1.0, 2.0, 2.0], "#22c55e", 3.0));
        let param = encode_state_to_param(&source.export_all()).unwrap();

        let mut target = BoardStore::default();
        assert!(target.import_from_param(&param).ok);
        assert_eq!(target.players(), source.players());
        assert_eq!(target.drawing().lines(), source.drawing().lines());
    }

    #[test]
    fn test_decode_tolerates_padding_and_standard_alphabet() {
        use base64::engine::general_purpose::STANDARD;

        let json = r#"{"k":"??>>"}"#;
        let padded = STANDARD.encode(json);
        assert!(padded.contains('/') || padded.contains('+') || padded.ends_with('='));

        let value = decode_state_from_param(&padded).unwrap();
        assert_eq!(value["k"], "??>>");
    }

    #[test]
    fn test_decode_errors() {
        assert!(matches!(
            decode_state_from_param("***"),
            Err(ShareError::Base64(_))
        ));
        let not_json = URL_SAFE_NO_PAD.encode("plain words");
        assert!(matches!(
            decode_state_from_param(&not_json),
            Err(ShareError::Json(_))
        ));

        let mut board = BoardStore::default();
        assert!(!board.import_from_param("***").ok);
    }
}
