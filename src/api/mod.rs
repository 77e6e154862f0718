pub mod handlers;
pub mod routes;

use serde::Serialize;

use crate::error::AppError;

/// Query parameters accepted by the speech endpoint.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct SpeechQuery {
    pub text: Option<String>,
    pub voice_id: Option<String>,
}

impl SpeechQuery {
    /// Repeated parameters keep their first value; unknown ones are ignored.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (String, String)>) -> Self {
        let mut query = Self::default();
        for (name, value) in pairs {
            let slot = match name.as_str() {
                "text" => &mut query.text,
                "voiceId" => &mut query.voice_id,
                _ => continue,
            };
            slot.get_or_insert(value);
        }
        query
    }
}

/// A request that passed validation and may be sent to the generator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpeechRequest {
    pub text: String,
    pub voice_id: String,
}

impl SpeechRequest {
    pub fn new(text: Option<String>, voice_id: impl Into<String>) -> Result<Self, AppError> {
        match text {
            Some(text) if !text.is_empty() => Ok(Self {
                text,
                voice_id: voice_id.into(),
            }),
            _ => Err(AppError::MissingText),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn test_query_keeps_first_value() {
        let query = SpeechQuery::from_pairs(pairs(&[
            ("text", "a"),
            ("voiceId", "alloy"),
            ("text", "b"),
            ("voiceId", "echo"),
        ]));
        assert_eq!(query.text.as_deref(), Some("a"));
        assert_eq!(query.voice_id.as_deref(), Some("alloy"));
    }

    #[test]
    fn test_query_ignores_unknown_and_keeps_empty() {
        let query = SpeechQuery::from_pairs(pairs(&[("voice", "x"), ("text", ""), ("text", "b")]));
        assert_eq!(query.text.as_deref(), Some(""));
        assert!(query.voice_id.is_none());
    }

    #[test]
    fn test_request_requires_text() {
        assert!(matches!(
            SpeechRequest::new(None, "v"),
            Err(AppError::MissingText)
        ));
        assert!(matches!(
            SpeechRequest::new(Some(String::new()), "v"),
            Err(AppError::MissingText)
        ));
    }

    #[test]
    fn test_whitespace_text_is_kept_verbatim() {
        let request = SpeechRequest::new(Some(" ".into()), "v").unwrap();
        assert_eq!(request.text, " ");
        assert_eq!(request.voice_id, "v");
    }
}
