//! Google Gemini backend client.
//!
//! The shipped implementation of the [`LlmClient`](crate::LlmClient)
//! boundary, talking to the Gemini `generateContent` API with function
//! declarations built from the tool registry.

mod api;
mod client;
mod config;

pub use client::GeminiClient;
pub use config::GeminiConfig;
