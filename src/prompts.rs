use crate::types::envelope::{Language, RefineAction};

pub const CHAT_PERSONA: &str = include_str!("../data/prompts/chat_persona.txt");
pub const NEWS_DIGEST: &str = include_str!("../data/prompts/news_digest.txt");
pub const REFINE_PROFESSIONAL: &str = include_str!("../data/prompts/refine_professional.txt");
pub const REFINE_SIMPLIFY: &str = include_str!("../data/prompts/refine_simplify.txt");
pub const REFINE_GRAMMAR: &str = include_str!("../data/prompts/refine_grammar.txt");

/// Replace `{{key}}` placeholders in a template string.
pub fn render(template: &str, vars: &[(&str, &str)]) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        result = result.replace(&format!("{{{{{}}}}}", key), value);
    }
    result
}

/// Build the writing-assistant prompt server-side.
pub fn refine(action: RefineAction, language: Option<Language>, text: &str) -> String {
    let template = match action {
        RefineAction::Professional => REFINE_PROFESSIONAL,
        RefineAction::Simplify => REFINE_SIMPLIFY,
        RefineAction::Grammar => REFINE_GRAMMAR,
    };
    let language = match language {
        Some(lang) => format!("The output language must be {}.", lang.name()),
        None => "Answer in the same language as the text.".to_string(),
    };
    // language goes first so placeholders inside user text stay literal
    render(template, &[("language", language.as_str()), ("text", text)])
        .trim_end()
        .to_string()
}
