//! crates/wordflow_core/src/progress.rs
//!
//! Pure rules for saving reading progress: parameter clamping, partial
//! updates and the "words read" delta fed into the daily activity log.

use chrono::Utc;
use serde::Deserialize;
use uuid::Uuid;

use crate::domain::ReadingProgress;

/// Bounds and defaults for the reader's playback parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReaderSettings {
    pub wpm_min: i32,
    pub wpm_max: i32,
    pub wpm_default: i32,
    pub font_size_min: i32,
    pub font_size_max: i32,
    pub font_size_default: i32,
}

impl Default for ReaderSettings {
    fn default() -> Self {
        Self {
            wpm_min: 60,
            wpm_max: 600,
            wpm_default: 200,
            font_size_min: 12,
            font_size_max: 144,
            font_size_default: 48,
        }
    }
}

/// A reader setting whose default lies outside its own bounds.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("words per minute must satisfy {min} <= {default} <= {max}")]
    WordsPerMinute { min: i32, default: i32, max: i32 },
    #[error("font size must satisfy {min} <= {default} <= {max}")]
    FontSize { min: i32, default: i32, max: i32 },
}

impl ReaderSettings {
    /// Checks that each default lies inside its range.
    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.wpm_min..=self.wpm_max).contains(&self.wpm_default) {
            return Err(SettingsError::WordsPerMinute {
                min: self.wpm_min,
                default: self.wpm_default,
                max: self.wpm_max,
            });
        }
        if !(self.font_size_min..=self.font_size_max).contains(&self.font_size_default) {
            return Err(SettingsError::FontSize {
                min: self.font_size_min,
                default: self.font_size_default,
                max: self.font_size_max,
            });
        }
        Ok(())
    }

    /// The record created the first time a user opens a document.
    pub fn default_progress(&self, user_id: Uuid, document_id: Uuid) -> ReadingProgress {
        ReadingProgress {
            user_id,
            document_id,
            last_word_index: 0,
            words_per_minute: self.wpm_default,
            font_size: self.font_size_default,
            updated_at: Utc::now(),
        }
    }
}

/// A client-submitted progress save. Every field is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ProgressUpdate {
    pub last_word_index: Option<i64>,
    #[serde(alias = "wpm")]
    pub words_per_minute: Option<i64>,
    pub font_size: Option<i64>,
}

/// The outcome of applying a `ProgressUpdate`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProgressChange {
    pub progress: ReadingProgress,
    /// Forward movement to add to today's activity.
    pub words_delta: usize,
}

/// Clamps a words-per-minute value into `[min, max]`.
pub fn clamp_wpm(value: i64, min: i32, max: i32) -> i32 {
    clamp_i32(value, min, max)
}

/// Words read between two positions. Moving backwards reads nothing.
pub fn compute_words_delta(previous_index: usize, new_index: usize) -> usize {
    new_index.saturating_sub(previous_index)
}

/// Applies `update` to `current`. Only supplied fields change.
pub fn apply_update(
    current: &ReadingProgress,
    update: &ProgressUpdate,
    settings: &ReaderSettings,
    word_count: usize,
) -> ProgressChange {
    let mut progress = current.clone();

    if let Some(index) = update.last_word_index {
        progress.last_word_index = clamp_index(index, word_count);
    }
    if let Some(wpm) = update.words_per_minute {
        progress.words_per_minute = clamp_wpm(wpm, settings.wpm_min, settings.wpm_max);
    }
    if let Some(size) = update.font_size {
        progress.font_size = clamp_i32(size, settings.font_size_min, settings.font_size_max);
    }
    progress.updated_at = Utc::now();

    let words_delta = compute_words_delta(current.last_word_index, progress.last_word_index);
    ProgressChange { progress, words_delta }
}

fn clamp_index(index: i64, word_count: usize) -> usize {
    usize::try_from(index.max(0)).map_or(word_count, |i| i.min(word_count))
}

fn clamp_i32(value: i64, min: i32, max: i32) -> i32 {
    // The result lies in [min, max], both of which are i32.
    value.clamp(i64::from(min), i64::from(max)) as i32
}
