//! Process-wide application state.
//!
//! Created once from configuration and mutated only by the caller after a
//! generation call has returned. Core components never write to it.

use std::collections::BTreeMap;

use serde::Serialize;
use spritegen_core::error::CoreError;
use spritegen_core::generation::{FrameResult, FrameSequence, GenerationResult, StyleBatch};
use spritegen_core::image_data::ReferenceImage;
use spritegen_core::model::ImageModel;
use spritegen_core::reference::ReferenceToken;

use crate::config::SpriteConfig;

#[derive(Debug, Clone, Default)]
pub struct ApplicationState {
    dalle_api_key: String,
    gpt_image_api_key: String,
    /// Key entered by the user; overrides the per-model keys when set.
    api_key: String,
    selected_model: ImageModel,
    uploaded_image: Option<ReferenceImage>,
    chosen_style: Option<String>,
    character_description: Option<String>,
    generated_styles: Vec<GenerationResult>,
    current_reference_token: Option<ReferenceToken>,
    /// Ordered frames per action id; indices are contiguous from 0.
    generated_frames: BTreeMap<String, Vec<FrameResult>>,
}

impl ApplicationState {
    pub fn from_config(config: &SpriteConfig) -> Self {
        if !config.has_all_keys() {
            tracing::warn!(
                has_dalle_key = !config.dalle_api_key.trim().is_empty(),
                has_gpt_image_key = !config.gpt_image_api_key.trim().is_empty(),
                "Missing API keys in environment configuration",
            );
        }
        Self {
            dalle_api_key: config.dalle_api_key.trim().to_string(),
            gpt_image_api_key: config.gpt_image_api_key.trim().to_string(),
            selected_model: config.image_model,
            ..Self::default()
        }
    }

    // -- Keys and model --

    /// The key to send with the next request: the user-entered key if any,
    /// else the key configured for the selected model family.
    pub fn active_api_key(&self) -> &str {
        if !self.api_key.is_empty() {
            return &self.api_key;
        }
        match self.selected_model {
            ImageModel::DallE3 => &self.dalle_api_key,
            ImageModel::GptImage1 => &self.gpt_image_api_key,
        }
    }

    pub fn set_api_key(&mut self, key: &str) {
        self.api_key = key.trim().to_string();
    }

    pub fn selected_model(&self) -> ImageModel {
        self.selected_model
    }

    pub fn select_model(&mut self, model: ImageModel) {
        self.selected_model = model;
    }

    // -- Reference image and style choice --

    pub fn uploaded_image(&self) -> Option<&ReferenceImage> {
        self.uploaded_image.as_ref()
    }

    pub fn set_uploaded_image(&mut self, image: Option<ReferenceImage>) {
        self.uploaded_image = image;
    }

    pub fn chosen_style(&self) -> Option<&str> {
        self.chosen_style.as_deref()
    }

    /// Choose one of the successfully generated styles.
    pub fn choose_style(&mut self, style_id: &str) -> Result<(), CoreError> {
        let exists = self
            .generated_styles
            .iter()
            .any(|r| r.is_success() && r.style_id() == style_id);
        if !exists {
            return Err(CoreError::NotFound {
                entity: "GeneratedStyle",
                id: style_id.to_string(),
            });
        }
        self.chosen_style = Some(style_id.to_string());
        Ok(())
    }

    pub fn reset_style_choice(&mut self) {
        self.chosen_style = None;
    }

    /// The chosen style, else the first style that generated successfully.
    pub fn effective_style(&self) -> Option<&str> {
        self.chosen_style().or_else(|| {
            self.generated_styles
                .iter()
                .find(|r| r.is_success())
                .map(GenerationResult::style_id)
        })
    }

    // -- Style batches --

    pub fn generated_styles(&self) -> &[GenerationResult] {
        &self.generated_styles
    }

    pub fn current_reference_token(&self) -> Option<&ReferenceToken> {
        self.current_reference_token.as_ref()
    }

    pub fn character_description(&self) -> Option<&str> {
        self.character_description.as_deref()
    }

    /// Replace the style results with a fresh batch.
    ///
    /// A new batch is a new character: the style choice and every frame of
    /// the previous session are discarded.
    pub fn record_style_batch(&mut self, batch: StyleBatch, character_description: &str) {
        self.current_reference_token = Some(batch.reference_token);
        self.generated_styles = batch.results;
        self.character_description = Some(character_description.to_string());
        self.chosen_style = None;
        self.generated_frames.clear();
    }

    // -- Frames --

    pub fn frames(&self, action_id: &str) -> &[FrameResult] {
        self.generated_frames
            .get(action_id)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Check that `frame_index` may be recorded for `action_id`.
    pub fn validate_frame_index(&self, action_id: &str, frame_index: u32) -> Result<(), CoreError> {
        let len = self.frames(action_id).len();
        if frame_index as usize > len {
            return Err(CoreError::Validation(format!(
                "Frame {frame_index} of '{action_id}' cannot be recorded before frame {len}"
            )));
        }
        Ok(())
    }

    /// Record one frame.
    ///
    /// Recording frame `k` keeps frames `0..k` and drops every later frame,
    /// since those continued from the frame being replaced.
    pub fn record_frame(&mut self, frame: FrameResult) -> Result<(), CoreError> {
        self.validate_frame_index(&frame.action_id, frame.frame_index)?;
        let frames = self
            .generated_frames
            .entry(frame.action_id.clone())
            .or_default();
        frames.truncate(frame.frame_index as usize);
        frames.push(frame);
        Ok(())
    }

    /// Record every frame of a sequence. The whole sequence is validated
    /// before anything is written.
    pub fn record_sequence(&mut self, sequence: &FrameSequence) -> Result<(), CoreError> {
        let Some(first) = sequence.frames.first() else {
            return Ok(());
        };
        for (offset, frame) in sequence.frames.iter().enumerate() {
            if frame.frame_index != first.frame_index + offset as u32 {
                return Err(CoreError::Validation(format!(
                    "Sequence frames must be contiguous (found frame {} at position {offset})",
                    frame.frame_index
                )));
            }
        }
        self.validate_frame_index(&first.action_id, first.frame_index)?;
        for frame in &sequence.frames {
            self.record_frame(frame.clone())?;
        }
        Ok(())
    }

    /// Serializable view for the UI (no key material, no image bytes).
    pub fn summary(&self) -> StateSummary {
        StateSummary {
            selected_model: self.selected_model,
            has_api_key: !self.active_api_key().is_empty(),
            has_uploaded_image: self.uploaded_image.is_some(),
            chosen_style: self.chosen_style.clone(),
            reference_token: self.current_reference_token.clone(),
            generated_styles: self.generated_styles.len(),
            frame_counts: self
                .generated_frames
                .iter()
                .map(|(action, frames)| (action.clone(), frames.len()))
                .collect(),
        }
    }
}

/// Lightweight state snapshot for status displays.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateSummary {
    pub selected_model: ImageModel,
    pub has_api_key: bool,
    pub has_uploaded_image: bool,
    pub chosen_style: Option<String>,
    pub reference_token: Option<ReferenceToken>,
    pub generated_styles: usize,
    pub frame_counts: BTreeMap<String, usize>,
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use spritegen_core::image_data::DataUrl;

    use super::*;

    fn frame(action: &str, index: u32) -> FrameResult {
        FrameResult {
            style_id: "anime".into(),
            action_id: action.into(),
            frame_index: index,
            image_data_url: DataUrl::from_png_base64("AA=="),
        }
    }

    fn batch() -> StyleBatch {
        StyleBatch {
            reference_token: ReferenceToken::from_string("CHAR_a"),
            results: vec![
                GenerationResult::Failure {
                    style_id: "pixel-art".into(),
                    error_message: "boom".into(),
                },
                GenerationResult::Success {
                    style_id: "anime".into(),
                    image_data_url: DataUrl::from_png_base64("AA=="),
                },
            ],
        }
    }

    // -- Keys --

    #[test]
    fn model_key_used_until_user_key_is_set() {
        let config = SpriteConfig {
            dalle_api_key: "sk-dalle".into(),
            gpt_image_api_key: "sk-gpt".into(),
            ..SpriteConfig::default()
        };
        let mut state = ApplicationState::from_config(&config);
        assert_eq!(state.active_api_key(), "sk-gpt");

        state.select_model(ImageModel::DallE3);
        assert_eq!(state.active_api_key(), "sk-dalle");

        state.set_api_key("  sk-user ");
        assert_eq!(state.active_api_key(), "sk-user");
    }

    // -- Styles --

    #[test]
    fn choose_style_requires_successful_style() {
        let mut state = ApplicationState::default();
        state.record_style_batch(batch(), "a knight");

        assert_matches!(state.choose_style("pixel-art"), Err(CoreError::NotFound { .. }));
        state.choose_style("anime").unwrap();
        assert_eq!(state.chosen_style(), Some("anime"));
    }

    #[test]
    fn effective_style_falls_back_to_first_success() {
        let mut state = ApplicationState::default();
        assert!(state.effective_style().is_none());
        state.record_style_batch(batch(), "a knight");
        assert_eq!(state.effective_style(), Some("anime"));
    }

    #[test]
    fn new_batch_resets_session() {
        let mut state = ApplicationState::default();
        state.record_style_batch(batch(), "a knight");
        state.choose_style("anime").unwrap();
        state.record_frame(frame("walk", 0)).unwrap();

        state.record_style_batch(batch(), "a wizard");

        assert!(state.chosen_style().is_none());
        assert!(state.frames("walk").is_empty());
        assert_eq!(state.character_description(), Some("a wizard"));
    }

    // -- Frames --

    #[test]
    fn frames_append_contiguously() {
        let mut state = ApplicationState::default();
        state.record_frame(frame("walk", 0)).unwrap();
        state.record_frame(frame("walk", 1)).unwrap();
        assert_eq!(state.frames("walk").len(), 2);
    }

    #[test]
    fn frame_gap_is_rejected() {
        let mut state = ApplicationState::default();
        assert_matches!(state.record_frame(frame("walk", 2)), Err(CoreError::Validation(_)));
        assert!(state.frames("walk").is_empty());
    }

    #[test]
    fn rerecording_a_frame_drops_later_frames() {
        let mut state = ApplicationState::default();
        for i in 0..4 {
            state.record_frame(frame("jump", i)).unwrap();
        }
        state.record_frame(frame("jump", 1)).unwrap();
        assert_eq!(state.frames("jump").len(), 2);
    }

    #[test]
    fn sequence_with_gap_writes_nothing() {
        let mut state = ApplicationState::default();
        let sequence = FrameSequence {
            reference_token: ReferenceToken::from_string("CHAR_a"),
            frames: vec![frame("hurt", 0), frame("hurt", 2)],
            failure: None,
        };
        assert!(state.record_sequence(&sequence).is_err());
        assert!(state.frames("hurt").is_empty());
    }

    #[test]
    fn summary_hides_keys() {
        let mut state = ApplicationState::default();
        state.set_api_key("sk-secret");
        state.record_frame(frame("idle", 0)).unwrap();
        let summary = state.summary();
        assert!(summary.has_api_key);
        assert_eq!(summary.frame_counts.get("idle"), Some(&1));
        let json = serde_json::to_string(&summary).unwrap();
        assert!(!json.contains("sk-secret"));
    }
}
