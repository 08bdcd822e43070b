//! Inbound request bodies, one per endpoint kind.
//!
//! Deserialization rejects shape errors (a scalar where a sequence is
//! expected, an unknown action); the derived [`Validate`] rules reject
//! missing or blank content. Both surface as `400` before the upstream is
//! contacted.

use std::borrow::Cow;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use crate::prompts;
use crate::types::gemini::{Content, Part, Role};

fn invalid(code: &'static str, message: impl Into<Cow<'static, str>>) -> ValidationError {
    let mut err = ValidationError::new(code);
    err.message = Some(message.into());
    err
}

fn not_blank(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(invalid("blank", "must not be blank"));
    }
    Ok(())
}

fn base64_payload(value: &str) -> Result<(), ValidationError> {
    not_blank(value)?;
    STANDARD
        .decode(value)
        .map(drop)
        .map_err(|_| invalid("base64", "must be base64 encoded"))
}

fn mime_type(value: &str) -> Result<(), ValidationError> {
    match value.trim().split_once('/') {
        Some((kind, sub)) if !kind.is_empty() && !sub.is_empty() => Ok(()),
        _ => Err(invalid("mime_type", "must look like type/subtype")),
    }
}

fn alternating_history(history: &[TurnRecord]) -> Result<(), ValidationError> {
    if history.is_empty() {
        return Err(invalid("empty_history", "chat history is required"));
    }
    for (idx, turn) in history.iter().enumerate() {
        if turn.parts.iter().all(|p| p.text.trim().is_empty()) {
            return Err(invalid("empty_turn", format!("turn {idx} has no text")));
        }
        if idx > 0 && history[idx - 1].role == turn.role {
            return Err(invalid(
                "role_order",
                format!("roles must alternate (turn {idx})"),
            ));
        }
    }
    match history.last().map(|t| t.role) {
        Some(Role::User) => Ok(()),
        _ => Err(invalid("last_turn", "must end with a user turn")),
    }
}

/// `{ prompt }` used by the idea, recipe, generate and presentation routes.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PromptEnvelope {
    #[serde(default)]
    #[validate(required(message = "missing required field"), custom(function = "not_blank"))]
    pub prompt: Option<String>,
}

impl PromptEnvelope {
    pub fn into_contents(self) -> Vec<Content> {
        vec![Content::user_text(self.prompt.unwrap_or_default())]
    }
}

/// A turn as the browser sends it: only text parts are accepted.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TurnRecord {
    pub role: Role,
    pub parts: Vec<TextPart>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct TextPart {
    pub text: String,
}

/// `{ history }` for the chat route.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct ChatEnvelope {
    #[serde(default)]
    #[validate(
        required(message = "chat history is required"),
        custom(function = "alternating_history")
    )]
    pub history: Option<Vec<TurnRecord>>,
}

impl ChatEnvelope {
    pub fn into_contents(self) -> Vec<Content> {
        self.history
            .unwrap_or_default()
            .into_iter()
            .map(|turn| Content {
                role: Some(turn.role),
                parts: turn.parts.into_iter().map(|p| Part::text(p.text)).collect(),
            })
            .collect()
    }
}

/// `{ prompt, fileData, mimeType }` for image and document analysis.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DocumentEnvelope {
    #[serde(default)]
    #[validate(required(message = "missing required field"), custom(function = "not_blank"))]
    pub prompt: Option<String>,
    #[serde(default)]
    #[validate(
        required(message = "missing required field"),
        custom(function = "base64_payload")
    )]
    pub file_data: Option<String>,
    #[serde(default)]
    #[validate(required(message = "missing required field"), custom(function = "self::mime_type"))]
    pub mime_type: Option<String>,
}

impl DocumentEnvelope {
    /// Text precedes the attachment inside a single user turn.
    pub fn into_contents(self) -> Vec<Content> {
        vec![Content::user(vec![
            Part::text(self.prompt.unwrap_or_default()),
            Part::inline(
                self.mime_type.unwrap_or_default(),
                self.file_data.unwrap_or_default(),
            ),
        ])]
    }
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RefineAction {
    Professional,
    Simplify,
    Grammar,
}

#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
pub enum Language {
    #[serde(alias = "english", alias = "en")]
    English,
    #[serde(alias = "sinhala", alias = "si")]
    Sinhala,
    #[serde(alias = "tamil", alias = "ta")]
    Tamil,
}

impl Language {
    pub fn name(&self) -> &'static str {
        match self {
            Language::English => "English",
            Language::Sinhala => "Sinhala",
            Language::Tamil => "Tamil",
        }
    }
}

/// `{ text, action, language? }` for the writing assistant.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RefineEnvelope {
    #[serde(default)]
    #[validate(required(message = "missing required field"), custom(function = "not_blank"))]
    pub text: Option<String>,
    #[serde(default)]
    #[validate(required(message = "missing required field"))]
    pub action: Option<RefineAction>,
    #[serde(default)]
    pub language: Option<Language>,
}

impl RefineEnvelope {
    pub fn into_contents(self) -> Vec<Content> {
        let text = self.text.unwrap_or_default();
        let prompt = match self.action {
            Some(action) => prompts::refine(action, self.language, &text),
            None => text,
        };
        vec![Content::user_text(prompt)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn parse<T: for<'de> Deserialize<'de>>(v: serde_json::Value) -> T {
        serde_json::from_value(v).unwrap()
    }

    fn chat(history: serde_json::Value) -> ChatEnvelope {
        parse(json!({ "history": history }))
    }

    #[test]
    fn blank_prompt_is_missing() {
        let env: PromptEnvelope = parse(json!({ "prompt": "   " }));
        let errors = env.validate().unwrap_err();
        assert_eq!(errors.field_errors()["prompt"][0].code, "blank");

        let env: PromptEnvelope = parse(json!({}));
        let errors = env.validate().unwrap_err();
        assert_eq!(errors.field_errors()["prompt"][0].code, "required");
    }

    #[test]
    fn scalar_history_fails_to_deserialize() {
        let res = serde_json::from_value::<ChatEnvelope>(json!({ "history": "hello" }));
        assert!(res.is_err());
    }

    #[test]
    fn history_must_alternate_and_end_on_user() {
        let ok = chat(json!([
            { "role": "user", "parts": [{ "text": "hi" }] },
            { "role": "model", "parts": [{ "text": "hello!" }] },
            { "role": "user", "parts": [{ "text": "what tools exist?" }] }
        ]));
        assert!(ok.validate().is_ok());

        let doubled = chat(json!([
            { "role": "user", "parts": [{ "text": "hi" }] },
            { "role": "user", "parts": [{ "text": "again" }] }
        ]));
        assert!(doubled.validate().is_err());

        let ends_on_model = chat(json!([
            { "role": "user", "parts": [{ "text": "hi" }] },
            { "role": "model", "parts": [{ "text": "hello!" }] }
        ]));
        assert!(ends_on_model.validate().is_err());

        assert!(chat(json!([])).validate().is_err());
    }

    #[test]
    fn chat_contents_keep_order_and_roles() {
        let contents = chat(json!([
            { "role": "user", "parts": [{ "text": "a" }] },
            { "role": "model", "parts": [{ "text": "b" }] },
            { "role": "user", "parts": [{ "text": "c" }, { "text": "d" }] }
        ]))
        .into_contents();

        assert_eq!(contents.len(), 3);
        assert_eq!(contents[1].role, Some(Role::Model));
        assert_eq!(contents[2].parts, vec![Part::text("c"), Part::text("d")]);
    }

    #[test]
    fn document_requires_base64_payload() {
        let bad: DocumentEnvelope = parse(json!({
            "prompt": "read this",
            "fileData": "not base64!!",
            "mimeType": "image/png"
        }));
        assert!(bad.validate().is_err());

        let missing_mime: DocumentEnvelope = parse(json!({
            "prompt": "read this",
            "fileData": "aGVsbG8="
        }));
        assert!(missing_mime.validate().is_err());

        let good: DocumentEnvelope = parse(json!({
            "prompt": "read this",
            "fileData": "aGVsbG8=",
            "mimeType": "application/pdf"
        }));
        assert!(good.validate().is_ok());

        let contents = good.into_contents();
        assert_eq!(contents.len(), 1);
        assert_eq!(contents[0].parts[0], Part::text("read this"));
        assert_eq!(contents[0].parts[1], Part::inline("application/pdf", "aGVsbG8="));
    }

    #[test]
    fn refine_rejects_unknown_action_and_accepts_language_aliases() {
        assert!(
            serde_json::from_value::<RefineEnvelope>(json!({ "text": "x", "action": "shout" }))
                .is_err()
        );

        let env: RefineEnvelope =
            parse(json!({ "text": "x", "action": "grammar", "language": "si" }));
        assert_eq!(env.language, Some(Language::Sinhala));
        assert!(env.validate().is_ok());

        let no_action: RefineEnvelope = parse(json!({ "text": "x" }));
        assert!(no_action.validate().is_err());
    }
}
