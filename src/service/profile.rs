//! Per-endpoint configuration records.
//!
//! Every route is the same relay with different prompt shaping and reply
//! rendering; the differences live here instead of in the handlers.

use crate::prompts;
use crate::types::gemini::{
    Content, GenerateContentRequest, GenerationConfig, GoogleSearch, SafetySetting,
    SafetyThreshold, ThinkingConfig, Tool,
};

/// How the model is told which language to answer in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguagePolicy {
    /// No instruction; the prompt decides.
    Unspecified,
    /// Mirror the language of the most recent user turn.
    MatchLastUserTurn,
}

impl LanguagePolicy {
    fn instruction(&self) -> Option<&'static str> {
        match self {
            LanguagePolicy::Unspecified => None,
            LanguagePolicy::MatchLastUserTurn => Some(
                "Always respond in the same language as the user's last message \
                 (English, Sinhala or Tamil).",
            ),
        }
    }
}

/// Which JSON field carries the answer back to the browser.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseShape {
    /// `{ text }`, optionally trimmed.
    Text { trim: bool },
    /// `{ markdownContent }`, rendered by the front end.
    Markdown,
    /// `{ htmlContent }`, rendered here from Markdown.
    Html,
    /// The upstream JSON body, untouched.
    Raw,
}

#[derive(Debug, Clone, Copy)]
pub struct HandlerProfile {
    pub name: &'static str,
    pub persona_text: Option<&'static str>,
    pub language_policy: LanguagePolicy,
    pub safety_threshold: Option<SafetyThreshold>,
    pub output_token_limit: Option<u32>,
    /// `Some(0)` turns thinking off so a tight output limit holds the answer.
    pub thinking_budget: Option<u32>,
    pub grounded_search: bool,
    /// Use the configured retry policy instead of a single attempt.
    pub retry: bool,
    pub shape: ResponseShape,
    pub blocked_message: &'static str,
}

const DEFAULT_BLOCKED: &str =
    "Your request was blocked for safety reasons. Please modify your input.";

impl HandlerProfile {
    const fn prompt_only(name: &'static str, shape: ResponseShape) -> Self {
        Self {
            name,
            persona_text: None,
            language_policy: LanguagePolicy::Unspecified,
            safety_threshold: None,
            output_token_limit: None,
            thinking_budget: None,
            grounded_search: false,
            retry: false,
            shape,
            blocked_message: DEFAULT_BLOCKED,
        }
    }

    /// Persona and language policy combined, sent with every request.
    pub fn system_instruction(&self) -> Option<Content> {
        let parts: Vec<&str> = self
            .persona_text
            .map(str::trim_end)
            .into_iter()
            .chain(self.language_policy.instruction())
            .collect();
        (!parts.is_empty()).then(|| Content::system(parts.join("\n\n")))
    }

    fn generation_config(&self) -> Option<GenerationConfig> {
        if self.output_token_limit.is_none() && self.thinking_budget.is_none() {
            return None;
        }
        Some(GenerationConfig {
            max_output_tokens: self.output_token_limit,
            thinking_config: self
                .thinking_budget
                .map(|thinking_budget| ThinkingConfig { thinking_budget }),
        })
    }

    pub fn build_request(&self, contents: Vec<Content>) -> GenerateContentRequest {
        GenerateContentRequest {
            contents,
            system_instruction: self.system_instruction(),
            safety_settings: self
                .safety_threshold
                .map(SafetySetting::uniform)
                .unwrap_or_default(),
            generation_config: self.generation_config(),
            tools: if self.grounded_search {
                vec![Tool {
                    google_search: GoogleSearch::default(),
                }]
            } else {
                Vec::new()
            },
        }
    }
}

pub const CHAT: HandlerProfile = HandlerProfile {
    persona_text: Some(prompts::CHAT_PERSONA),
    language_policy: LanguagePolicy::MatchLastUserTurn,
    safety_threshold: Some(SafetyThreshold::BlockOnlyHigh),
    output_token_limit: Some(1000),
    thinking_budget: Some(0),
    retry: true,
    blocked_message: "I'm sorry, I can't answer that due to safety guidelines. \
                      Could you ask about one of the tools?",
    ..HandlerProfile::prompt_only("chat", ResponseShape::Text { trim: false })
};

pub const IDEAS: HandlerProfile =
    HandlerProfile::prompt_only("generate-ideas", ResponseShape::Text { trim: false });

pub const RECIPE: HandlerProfile =
    HandlerProfile::prompt_only("generate-recipe", ResponseShape::Markdown);

pub const DOCUMENT: HandlerProfile = HandlerProfile {
    safety_threshold: Some(SafetyThreshold::BlockNone),
    output_token_limit: Some(8192),
    ..HandlerProfile::prompt_only("image-to-text", ResponseShape::Text { trim: true })
};

pub const REFINE: HandlerProfile =
    HandlerProfile::prompt_only("refine-text", ResponseShape::Text { trim: false });

pub const NEWS: HandlerProfile = HandlerProfile {
    grounded_search: true,
    ..HandlerProfile::prompt_only("fetch-news", ResponseShape::Html)
};

pub const GENERATE: HandlerProfile = HandlerProfile {
    safety_threshold: Some(SafetyThreshold::BlockNone),
    ..HandlerProfile::prompt_only("generate", ResponseShape::Raw)
};

pub const PRESENTATION: HandlerProfile =
    HandlerProfile::prompt_only("create-presentation", ResponseShape::Raw);

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn chat_request_carries_persona_safety_and_limit() {
        let req = CHAT.build_request(vec![Content::user_text("hello")]);
        let v = serde_json::to_value(&req).unwrap();

        let instruction = v["systemInstruction"]["parts"][0]["text"].as_str().unwrap();
        assert!(instruction.starts_with("You are the Studio Assistant"));
        assert!(instruction.ends_with("(English, Sinhala or Tamil)."));
        assert!(v["systemInstruction"].get("role").is_none());
        assert_eq!(v["safetySettings"].as_array().unwrap().len(), 4);
        assert_eq!(v["safetySettings"][0]["threshold"], "BLOCK_ONLY_HIGH");
        assert_eq!(
            v["generationConfig"],
            json!({ "maxOutputTokens": 1000, "thinkingConfig": { "thinkingBudget": 0 } })
        );
        assert!(v.get("tools").is_none());
    }

    #[test]
    fn prompt_only_profiles_send_bare_contents() {
        let req = IDEAS.build_request(vec![Content::user_text("ideas please")]);
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "contents": [{ "role": "user", "parts": [{ "text": "ideas please" }] }] })
        );
    }

    #[test]
    fn document_limit_leaves_thinking_to_the_model() {
        let v = serde_json::to_value(DOCUMENT.build_request(vec![])).unwrap();
        assert_eq!(v["generationConfig"], json!({ "maxOutputTokens": 8192 }));
    }

    #[test]
    fn news_enables_search_grounding() {
        let v = serde_json::to_value(NEWS.build_request(vec![])).unwrap();
        assert_eq!(v["tools"], json!([{ "googleSearch": {} }]));
    }

    #[test]
    fn only_chat_retries() {
        assert!(CHAT.retry);
        for p in [IDEAS, RECIPE, DOCUMENT, REFINE, NEWS, GENERATE, PRESENTATION] {
            assert!(!p.retry, "{} should not retry", p.name);
        }
    }
}
