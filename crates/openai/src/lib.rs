//! OpenAI REST client for image generation, image editing and chat
//! classification.
//!
//! [`client::GenerationClient`] is the seam the pipeline depends on;
//! [`api::OpenAIApi`] is the production implementation over [`reqwest`].

pub mod api;
pub mod client;
pub mod payloads;
