//! Adapters backed by the Generative Language API.

pub mod api;
mod client;

pub use client::GeminiClient;
