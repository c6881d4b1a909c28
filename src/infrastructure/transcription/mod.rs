mod gemini_engine;

pub use gemini_engine::{GeminiEngineConfig, GeminiTranscriptionEngine};
