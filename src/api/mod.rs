pub mod gemini_api;
