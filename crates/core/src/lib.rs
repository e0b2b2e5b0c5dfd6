//! Pure domain layer for the sprite generation client.
//!
//! Styles, actions, request categories, prompt construction, reference
//! tokens, and the image/result types shared by the HTTP client and the
//! pipeline. Nothing in this crate performs network I/O.

pub mod actions;
pub mod api_key;
pub mod category;
pub mod error;
pub mod generation;
pub mod image_data;
pub mod model;
pub mod prompt;
pub mod reference;
pub mod styles;
