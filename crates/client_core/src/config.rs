use std::{fs, io, path::Path, str::FromStr};

use anyhow::{ensure, Context};
use serde::Deserialize;

pub const DEFAULT_SETTINGS_FILE: &str = "consult.toml";

/// One day; longer hint delays are treated as configuration mistakes.
const MAX_HINT_DELAY_MS: u64 = 24 * 60 * 60 * 1000;

/// Gesture and timing constants for the interaction engine.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct InteractionSettings {
    pub drag_activation_px: f32,
    pub max_swipe_offset: f32,
    pub reply_commit_offset: f32,
    pub saved_hint_idle_ms: u64,
    pub saved_hint_visible_ms: u64,
    pub settle_time_constant_ms: f32,
    pub chip_row_time_constant_ms: f32,
}

impl Default for InteractionSettings {
    fn default() -> Self {
        Self {
            drag_activation_px: 5.0,
            max_swipe_offset: 130.0,
            reply_commit_offset: 80.0,
            saved_hint_idle_ms: 500,
            saved_hint_visible_ms: 900,
            settle_time_constant_ms: 60.0,
            chip_row_time_constant_ms: 45.0,
        }
    }
}

impl InteractionSettings {
    /// Rejects values the gesture and timer code cannot work with.
    pub fn validate(&self) -> anyhow::Result<()> {
        for (name, value) in [
            ("drag_activation_px", self.drag_activation_px),
            ("max_swipe_offset", self.max_swipe_offset),
            ("reply_commit_offset", self.reply_commit_offset),
            ("settle_time_constant_ms", self.settle_time_constant_ms),
            ("chip_row_time_constant_ms", self.chip_row_time_constant_ms),
        ] {
            ensure!(
                value.is_finite() && value >= 0.0,
                "{name} must be a finite non-negative number, got {value}"
            );
        }
        ensure!(
            self.drag_activation_px < self.max_swipe_offset,
            "drag_activation_px ({}) must be below max_swipe_offset ({})",
            self.drag_activation_px,
            self.max_swipe_offset
        );
        ensure!(
            self.reply_commit_offset <= self.max_swipe_offset,
            "reply_commit_offset ({}) must not exceed max_swipe_offset ({})",
            self.reply_commit_offset,
            self.max_swipe_offset
        );
        ensure!(
            self.saved_hint_idle_ms <= MAX_HINT_DELAY_MS
                && self.saved_hint_visible_ms <= MAX_HINT_DELAY_MS,
            "saved hint delays must not exceed {MAX_HINT_DELAY_MS} ms"
        );
        Ok(())
    }
}

/// Loads settings from `path` (or `consult.toml` in the working directory when
/// absent), then applies `APP__*` environment overrides and validates the result.
///
/// A missing default file is not an error; a missing explicit file is.
pub fn load_settings(path: Option<&Path>) -> anyhow::Result<InteractionSettings> {
    let (path, required) = match path {
        Some(path) => (path, true),
        None => (Path::new(DEFAULT_SETTINGS_FILE), false),
    };

    let mut settings = match fs::read_to_string(path) {
        Ok(raw) => parse_settings(&raw)
            .with_context(|| format!("invalid settings file '{}'", path.display()))?,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !required => {
            InteractionSettings::default()
        }
        Err(err) => {
            return Err(err)
                .with_context(|| format!("failed to read settings file '{}'", path.display()))
        }
    };

    apply_env_overrides(&mut settings, |key| std::env::var(key).ok());
    settings
        .validate()
        .context("invalid interaction settings after environment overrides")?;
    Ok(settings)
}

pub fn parse_settings(raw: &str) -> anyhow::Result<InteractionSettings> {
    let settings: InteractionSettings = toml::from_str(raw)?;
    settings.validate()?;
    Ok(settings)
}

/// Unparsable values are ignored and the previous value kept.
pub fn apply_env_overrides(
    settings: &mut InteractionSettings,
    lookup: impl Fn(&str) -> Option<String>,
) {
    override_from(&lookup, "APP__DRAG_ACTIVATION_PX", &mut settings.drag_activation_px);
    override_from(&lookup, "APP__MAX_SWIPE_OFFSET", &mut settings.max_swipe_offset);
    override_from(&lookup, "APP__REPLY_COMMIT_OFFSET", &mut settings.reply_commit_offset);
    override_from(&lookup, "APP__SAVED_HINT_IDLE_MS", &mut settings.saved_hint_idle_ms);
    override_from(
        &lookup,
        "APP__SAVED_HINT_VISIBLE_MS",
        &mut settings.saved_hint_visible_ms,
    );
    override_from(
        &lookup,
        "APP__SETTLE_TIME_CONSTANT_MS",
        &mut settings.settle_time_constant_ms,
    );
    override_from(
        &lookup,
        "APP__CHIP_ROW_TIME_CONSTANT_MS",
        &mut settings.chip_row_time_constant_ms,
    );
}

fn override_from<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, slot: &mut T) {
    if let Some(parsed) = lookup(key).and_then(|raw| raw.trim().parse::<T>().ok()) {
        *slot = parsed;
    }
}

#[cfg(test)]
#[path = "tests/config_tests.rs"]
mod tests;
