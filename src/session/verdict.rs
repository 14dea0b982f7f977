// Copyright 2026 the notedrill authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use serde::Deserialize;
use serde_json::Value;

use crate::error::Error;
use crate::error::Fallible;
use crate::types::rating::Rating;

/// A decoded tutor turn: the message shown to the learner, and the
/// terminal rating once the tutor has assessed the answer.
#[derive(Clone, PartialEq, Debug, Deserialize)]
pub struct Verdict {
    pub message: String,
    pub rating: Option<Rating>,
}

/// The output-shape constraint sent to the completion service.
pub fn schema() -> Value {
    serde_json::json!({
        "type": "object",
        "properties": {
            "message": {
                "type": "string",
                "description": "The tutor's reply to the student.",
            },
            "rating": {
                "anyOf": [
                    { "type": "string", "enum": ["again", "hard", "good", "easy"] },
                    { "type": "null" },
                ],
                "description": "The final rating, or null while the question is still open.",
            },
        },
        "required": ["message", "rating"],
        "additionalProperties": false,
    })
}

/// Decode a completion reply into a verdict.
///
/// The reply should be the JSON object itself, but models that ignore the
/// shape constraint tend to wrap it in prose or a code fence, so scan for
/// an embedded object before giving up. Anything else is a malformed
/// reply; unvalidated field access is never attempted.
pub fn decode(raw: &str) -> Fallible<Verdict> {
    let trimmed = raw.trim();
    if let Ok(verdict) = serde_json::from_str::<Verdict>(trimmed) {
        return Ok(verdict);
    }
    if let Some(embedded) = embedded_object(trimmed) {
        if let Ok(verdict) = serde_json::from_str::<Verdict>(embedded) {
            return Ok(verdict);
        }
    }
    Err(Error::MalformedOutput {
        raw: raw.to_string(),
    })
}

/// The outermost brace-delimited substring, if any.
fn embedded_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    if end <= start {
        return None;
    }
    Some(&text[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_plain() {
        let verdict = decode(r#"{"message": "What is a ring?", "rating": null}"#).unwrap();
        assert_eq!(verdict.message, "What is a ring?");
        assert_eq!(verdict.rating, None);
    }

    #[test]
    fn test_decode_terminal() {
        let verdict = decode(r#"{"message": "Close enough.", "rating": "hard"}"#).unwrap();
        assert_eq!(verdict.rating, Some(Rating::Hard));
    }

    #[test]
    fn test_decode_missing_rating_key() {
        // An absent key reads as null rather than malformed.
        let verdict = decode(r#"{"message": "Still thinking?"}"#).unwrap();
        assert_eq!(verdict.rating, None);
    }

    #[test]
    fn test_decode_fenced() {
        let raw = "Here you go:\n```json\n{\"message\": \"Good answer.\", \"rating\": \"good\"}\n```";
        let verdict = decode(raw).unwrap();
        assert_eq!(verdict.message, "Good answer.");
        assert_eq!(verdict.rating, Some(Rating::Good));
    }

    #[test]
    fn test_decode_missing_message() {
        let result = decode(r#"{"rating": "good"}"#);
        match result {
            Err(Error::MalformedOutput { raw }) => assert!(raw.contains("good")),
            _ => panic!("Expected MalformedOutput"),
        }
    }

    #[test]
    fn test_decode_unknown_rating_token() {
        let result = decode(r#"{"message": "hm", "rating": "great"}"#);
        assert!(matches!(result, Err(Error::MalformedOutput { .. })));
    }

    #[test]
    fn test_decode_free_text() {
        let result = decode("I think you did well!");
        match result {
            Err(Error::MalformedOutput { raw }) => {
                assert_eq!(raw, "I think you did well!");
            }
            _ => panic!("Expected MalformedOutput"),
        }
    }

    #[test]
    fn test_decode_wrong_shape() {
        assert!(matches!(
            decode(r#"["message", "rating"]"#),
            Err(Error::MalformedOutput { .. })
        ));
        assert!(matches!(
            decode(r#"{"message": 42, "rating": null}"#),
            Err(Error::MalformedOutput { .. })
        ));
    }
}
