use crate::commit;
use crate::debounce::Debounced;
use crate::input::FieldInput;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use textura_common::FieldValue;

/// Per-field quiet periods, in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebounceConfig {
    pub text_ms: u64,
    pub font_family_ms: u64,
    pub font_size_ms: u64,
    pub font_weight_ms: u64,
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            text_ms: 20,
            font_family_ms: 600,
            font_size_ms: 60,
            font_weight_ms: 120,
        }
    }
}

type TextCommitter = fn(String) -> Option<FieldValue>;

/// Routes raw field input through one debouncer per debounced field.
///
/// Color and marquee input bypass debouncing and are committed by `handle`
/// directly.
pub struct InputCoordinator {
    text: Debounced<String, TextCommitter>,
    font_family: Debounced<String, TextCommitter>,
    font_size: Debounced<String, TextCommitter>,
    font_weight: Debounced<String, TextCommitter>,
}

impl InputCoordinator {
    pub fn new(config: &DebounceConfig) -> Self {
        Self {
            text: Debounced::wrap(
                commit::commit_text as TextCommitter,
                Duration::from_millis(config.text_ms),
            ),
            font_family: Debounced::wrap(
                commit::commit_font_family as TextCommitter,
                Duration::from_millis(config.font_family_ms),
            ),
            font_size: Debounced::wrap(
                commit::commit_font_size_text as TextCommitter,
                Duration::from_millis(config.font_size_ms),
            ),
            font_weight: Debounced::wrap(
                commit::commit_font_weight_text as TextCommitter,
                Duration::from_millis(config.font_weight_ms),
            ),
        }
    }

    /// Accept one raw input at time `now`.
    ///
    /// Returns the committed value for immediate fields; debounced fields are
    /// scheduled and return `None`.
    pub fn handle(&mut self, now: Duration, input: FieldInput) -> Option<FieldValue> {
        match input {
            FieldInput::Text(v) => self.text.call(now, v),
            FieldInput::FontFamily(v) => self.font_family.call(now, v),
            FieldInput::FontSize(v) => self.font_size.call(now, v),
            FieldInput::FontWeight(v) => self.font_weight.call(now, v),
            FieldInput::Color(v) => return commit::commit_color(&v),
            FieldInput::TextureMarquee(v) => return Some(FieldValue::TextureMarquee(v)),
        }
        None
    }

    /// Earliest pending commit deadline.
    pub fn next_deadline(&self) -> Option<Duration> {
        self.debouncers().filter_map(|d| d.deadline()).min()
    }

    /// Commit every input whose quiet period has elapsed by `now`, earliest
    /// deadline first.
    pub fn fire_due(&mut self, now: Duration) -> Vec<FieldValue> {
        let mut due: Vec<(Duration, usize)> = self
            .debouncers()
            .enumerate()
            .filter_map(|(i, d)| d.deadline().filter(|at| *at <= now).map(|at| (at, i)))
            .collect();
        due.sort();

        let mut committed = Vec::with_capacity(due.len());
        for (_, i) in due {
            let debouncer = match i {
                0 => &mut self.text,
                1 => &mut self.font_family,
                2 => &mut self.font_size,
                _ => &mut self.font_weight,
            };
            if let Some(value) = debouncer.poll(now).flatten() {
                committed.push(value);
            }
        }
        committed
    }

    /// Number of inputs waiting for their quiet period.
    pub fn pending(&self) -> usize {
        self.debouncers().filter(|d| d.is_pending()).count()
    }

    /// Drop every pending commit. Returns how many were dropped.
    pub fn teardown(&mut self) -> usize {
        let dropped = [
            self.text.cancel(),
            self.font_family.cancel(),
            self.font_size.cancel(),
            self.font_weight.cancel(),
        ]
        .into_iter()
        .filter(|c| *c)
        .count();
        if dropped > 0 {
            tracing::debug!(dropped, "dropped pending input commits");
        }
        dropped
    }

    fn debouncers(&self) -> impl Iterator<Item = &Debounced<String, TextCommitter>> {
        [&self.text, &self.font_family, &self.font_size, &self.font_weight].into_iter()
    }
}
