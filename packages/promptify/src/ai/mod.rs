//! Prompt client implementations.
//!
//! This module provides the reference Gemini implementation of the
//! `PromptClient` trait. Front ends can use it directly or bring their own.

mod gemini;

pub use gemini::{GeminiPromptClient, PROMPT_TEMPLATE};
