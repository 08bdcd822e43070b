use pulldown_cmark::{Options, Parser, html};
use serde::Serialize;

use crate::service::extract::Extraction;
use crate::service::profile::{HandlerProfile, ResponseShape};

#[derive(Debug, Serialize, PartialEq)]
pub enum ReplyBody {
    #[serde(rename = "text")]
    Text(String),
    #[serde(rename = "markdownContent")]
    Markdown(String),
    #[serde(rename = "htmlContent")]
    Html(String),
}

/// Success body returned to the browser.
#[derive(Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Reply {
    #[serde(flatten)]
    pub body: ReplyBody,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub blocked: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub block_reason: Option<String>,
}

pub fn markdown_to_html(markdown: &str) -> String {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    let parser = Parser::new_ext(markdown, options);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

fn shape_body(shape: ResponseShape, text: String) -> ReplyBody {
    match shape {
        ResponseShape::Text { trim: true } => ReplyBody::Text(text.trim().to_string()),
        ResponseShape::Text { trim: false } | ResponseShape::Raw => ReplyBody::Text(text),
        ResponseShape::Markdown => ReplyBody::Markdown(text),
        ResponseShape::Html => ReplyBody::Html(markdown_to_html(&text)),
    }
}

/// Map an extraction onto the profile's reply field.
///
/// A safety block keeps the same field, filled with the profile's
/// caller-safe message and flagged with `blocked`.
pub fn render(profile: &HandlerProfile, extraction: Extraction) -> Reply {
    match extraction {
        Extraction::Answer(text) => Reply {
            body: shape_body(profile.shape, text),
            blocked: false,
            block_reason: None,
        },
        Extraction::Blocked { reason } => Reply {
            body: shape_body(profile.shape, profile.blocked_message.to_string()),
            blocked: true,
            block_reason: Some(reason),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::service::profile::{CHAT, DOCUMENT, NEWS, RECIPE};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn text_shape_keeps_answer_byte_identical() {
        let reply = render(&CHAT, Extraction::Answer(" spaced \n".to_string()));
        assert_eq!(serde_json::to_value(reply).unwrap(), json!({ "text": " spaced \n" }));
    }

    #[test]
    fn document_shape_trims() {
        let reply = render(&DOCUMENT, Extraction::Answer("\n extracted \n".to_string()));
        assert_eq!(reply.body, ReplyBody::Text("extracted".to_string()));
    }

    #[test]
    fn recipe_returns_markdown_untouched() {
        let reply = render(&RECIPE, Extraction::Answer("## Soup".to_string()));
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({ "markdownContent": "## Soup" })
        );
    }

    #[test]
    fn news_renders_markdown_to_html() {
        let reply = render(&NEWS, Extraction::Answer("### Title\n\nBody".to_string()));
        assert_eq!(
            reply.body,
            ReplyBody::Html("<h3>Title</h3>\n<p>Body</p>\n".to_string())
        );
    }

    #[test]
    fn blocked_reply_is_flagged() {
        let reply = render(&CHAT, Extraction::Blocked { reason: "SAFETY".to_string() });
        assert_eq!(
            serde_json::to_value(reply).unwrap(),
            json!({
                "text": CHAT.blocked_message,
                "blocked": true,
                "blockReason": "SAFETY"
            })
        );
    }
}
