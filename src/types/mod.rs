pub mod envelope;
pub mod gemini;
