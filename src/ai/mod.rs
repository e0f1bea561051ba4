//! All AI/LLM functionality

pub mod client;
pub mod summarizer;

// Re-export main types for convenience
pub use client::{LlmClient, estimate_tokens};
pub use summarizer::{OpenAiSummarizer, Summarizer};
