//! Category → handler dispatch for classified chat messages.

use std::collections::HashMap;

use futures::future::BoxFuture;
use serde::Serialize;
use spritegen_core::actions::find_action;
use spritegen_core::category::Category;
use spritegen_core::styles::STYLES;

use crate::studio::{SpriteStudio, StudioResult};

/// Future returned by a [`Handler`]: the reply text on success.
pub type HandlerFuture<'a> = BoxFuture<'a, StudioResult<String>>;

/// A message handler. Receives the category it was registered under so one
/// function can serve several categories.
pub type Handler = for<'a> fn(&'a SpriteStudio, Category, &'a str) -> HandlerFuture<'a>;

/// Outcome of routing one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReply {
    pub category: Category,
    pub succeeded: bool,
    pub message: String,
}

/// Lookup table with one entry per [`Category`].
#[derive(Clone)]
pub struct MessageRouter {
    handlers: HashMap<Category, Handler>,
}

impl Default for MessageRouter {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageRouter {
    /// The default table: `character` generates styles, every action category
    /// animates, `unknown` replies with help.
    pub fn new() -> Self {
        let handlers = Category::ALL
            .iter()
            .map(|&category| {
                let handler: Handler = match category {
                    Category::Character => handle_character as Handler,
                    Category::Unknown => handle_unknown,
                    _ => handle_action,
                };
                (category, handler)
            })
            .collect();
        Self { handlers }
    }

    /// Replace the handler for one category.
    pub fn with_handler(mut self, category: Category, handler: Handler) -> Self {
        self.handlers.insert(category, handler);
        self
    }

    /// The handler for `category`; the `unknown` handler if none is
    /// registered.
    pub fn handler_for(&self, category: Category) -> Handler {
        self.handlers
            .get(&category)
            .or_else(|| self.handlers.get(&Category::Unknown))
            .copied()
            .unwrap_or(handle_unknown as Handler)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    pub fn contains(&self, category: Category) -> bool {
        self.handlers.contains_key(&category)
    }
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

fn handle_character<'a>(
    studio: &'a SpriteStudio,
    _category: Category,
    message: &'a str,
) -> HandlerFuture<'a> {
    Box::pin(generate_character(studio, message))
}

fn handle_action<'a>(
    studio: &'a SpriteStudio,
    category: Category,
    _message: &'a str,
) -> HandlerFuture<'a> {
    Box::pin(animate_action(studio, category))
}

fn handle_unknown<'a>(
    _studio: &'a SpriteStudio,
    _category: Category,
    _message: &'a str,
) -> HandlerFuture<'a> {
    Box::pin(help_reply())
}

async fn help_reply() -> StudioResult<String> {
    Ok(help_text())
}

async fn generate_character(studio: &SpriteStudio, message: &str) -> StudioResult<String> {
    let batch = studio.generate_styles(message).await?;
    let failed: Vec<&str> = batch
        .results
        .iter()
        .filter(|r| !r.is_success())
        .map(|r| r.style_id())
        .collect();

    let mut reply = format!(
        "Generated {} of {} styles for your character.",
        batch.succeeded(),
        batch.results.len()
    );
    if !failed.is_empty() {
        reply.push_str(&format!(" Failed: {}.", failed.join(", ")));
    }
    Ok(reply)
}

async fn animate_action(studio: &SpriteStudio, category: Category) -> StudioResult<String> {
    let Some(action_id) = category.action_id() else {
        return Ok(help_text());
    };
    let display_name = find_action(action_id).map_or(action_id, |a| a.display_name);

    let sequence = studio.animate(action_id, None).await?;
    let generated = sequence.frames.len();
    let style_id = sequence
        .frames
        .first()
        .map(|f| f.style_id.as_str())
        .unwrap_or("the selected");

    Ok(match &sequence.failure {
        None => format!("Generated {generated} {display_name} frames in {style_id} style."),
        Some((frame_index, error)) => format!(
            "Generated {generated} {display_name} frames before frame {} failed: {error}",
            u64::from(*frame_index) + 1
        ),
    })
}

fn help_text() -> String {
    let styles: Vec<&str> = STYLES.iter().map(|s| s.display_name).collect();
    let actions: Vec<&str> = Category::ALL
        .iter()
        .filter_map(|c| c.action_id())
        .filter_map(find_action)
        .map(|a| a.display_name)
        .collect();
    format!(
        "Describe a character to generate it in {} styles ({}). \
         Then ask for an animation: {}.",
        styles.len(),
        styles.join(", "),
        actions.join(", ")
    )
}
