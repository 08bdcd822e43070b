use tracing::{error, warn};

use crate::error::RelayError;
use crate::types::gemini::{Content, GenerateContentResponse};

/// Result of inspecting a well-formed upstream response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    Answer(String),
    Blocked { reason: String },
}

/// Take the first candidate's first text part.
///
/// An explicit block reason (prompt feedback, or a safety-class finish
/// reason on an empty candidate) is an expected outcome; anything else
/// without text is an upstream fault.
pub fn extract(response: &GenerateContentResponse) -> Result<Extraction, RelayError> {
    let first = response.candidates.first();

    if let Some(text) = first
        .and_then(|c| c.content.as_ref())
        .and_then(Content::first_text)
        .filter(|t| !t.is_empty())
    {
        return Ok(Extraction::Answer(text.to_string()));
    }

    if let Some(reason) = response
        .prompt_feedback
        .as_ref()
        .and_then(|f| f.block_reason.clone())
    {
        warn!(block_reason = %reason, "prompt blocked by upstream safety filters");
        return Ok(Extraction::Blocked { reason });
    }

    if let Some(reason) = first
        .and_then(|c| c.finish_reason.as_ref())
        .filter(|r| r.is_safety_block())
    {
        warn!(finish_reason = reason.as_str(), "candidate withheld by upstream safety filters");
        return Ok(Extraction::Blocked {
            reason: reason.as_str().to_string(),
        });
    }

    error!(
        candidates = response.candidates.len(),
        finish_reason = ?first.and_then(|c| c.finish_reason.as_ref()),
        "upstream returned no usable text"
    );
    Err(RelayError::EmptyResponse)
}
