use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::timer::PhaseDurations;

pub const DEFAULT_FOCUS_MINUTES: u64 = 25;
pub const DEFAULT_SHORT_BREAK_MINUTES: u64 = 5;
pub const DEFAULT_LONG_BREAK_MINUTES: u64 = 15;

/// The saved settings: phase lengths in whole minutes and the mute
/// flag for the phase-end alert.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub focus_minutes: u64,
    pub short_break_minutes: u64,
    pub long_break_minutes: u64,
    pub mute: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            focus_minutes: DEFAULT_FOCUS_MINUTES,
            short_break_minutes: DEFAULT_SHORT_BREAK_MINUTES,
            long_break_minutes: DEFAULT_LONG_BREAK_MINUTES,
            mute: false,
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let settings = toml::from_str(
            &fs::read_to_string(path)
                .with_context(|| format!("Failed to read settings from {}.", path.display()))?,
        )
        .with_context(|| format!("Failed to parse settings from {}.", path.display()))?;
        Ok(settings)
    }

    /// Load the settings, falling back to the defaults when the file
    /// is unreadable or malformed. Never fatal.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(settings) => settings,
            Err(err) => {
                warn!("Using default settings: {:#}", err);
                Self::default()
            }
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}.", parent.display()))?;
        }
        fs::write(path, toml::to_string_pretty(self)?)
            .with_context(|| format!("Failed to write settings to {}.", path.display()))?;
        Ok(())
    }

    pub fn durations(&self) -> PhaseDurations {
        PhaseDurations {
            focus: self.focus_minutes * 60,
            short_break: self.short_break_minutes * 60,
            long_break: self.long_break_minutes * 60,
        }
    }
}

/// Pending edits to the settings. Edits are staged as the raw text the
/// user typed and only diffed against the saved settings at commit
/// time; fields left at None keep their saved value.
#[derive(Debug, Default)]
pub struct SettingsDraft {
    pub focus: Option<String>,
    pub short_break: Option<String>,
    pub long_break: Option<String>,
    pub mute: Option<bool>,
}

impl SettingsDraft {
    pub fn is_empty(&self) -> bool {
        self.focus.is_none()
            && self.short_break.is_none()
            && self.long_break.is_none()
            && self.mute.is_none()
    }

    /// Fold the staged edits into the settings. Minute fields that do
    /// not parse as a non-negative integer revert to that phase's
    /// default instead of failing the save.
    pub fn commit(self, settings: &mut Settings) {
        if let Some(raw) = self.focus {
            settings.focus_minutes = parse_minutes(&raw, DEFAULT_FOCUS_MINUTES);
        }
        if let Some(raw) = self.short_break {
            settings.short_break_minutes = parse_minutes(&raw, DEFAULT_SHORT_BREAK_MINUTES);
        }
        if let Some(raw) = self.long_break {
            settings.long_break_minutes = parse_minutes(&raw, DEFAULT_LONG_BREAK_MINUTES);
        }
        if let Some(mute) = self.mute {
            settings.mute = mute;
        }
    }
}

fn parse_minutes(raw: &str, default: u64) -> u64 {
    match raw.trim().parse::<u64>() {
        Ok(minutes) => minutes,
        Err(_) => default,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_the_classic_pomodoro_lengths() {
        let settings = Settings::default();
        assert_eq!(settings.focus_minutes, 25);
        assert_eq!(settings.short_break_minutes, 5);
        assert_eq!(settings.long_break_minutes, 15);
        assert!(!settings.mute);
        assert_eq!(settings.durations().focus, 1500);
        assert_eq!(settings.durations().short_break, 300);
        assert_eq!(settings.durations().long_break, 900);
    }

    #[test]
    fn settings_survive_a_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");

        let mut settings = Settings::default();
        settings.focus_minutes = 50;
        settings.mute = true;
        settings.save(&path).unwrap();

        assert_eq!(Settings::load(&path).unwrap(), settings);
    }

    #[test]
    fn a_missing_file_loads_as_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        assert_eq!(Settings::load(&path).unwrap(), Settings::default());
    }

    #[test]
    fn a_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("settings.toml");
        fs::write(&path, "focus_minutes = \"not toml numbers\"").unwrap();

        assert!(Settings::load(&path).is_err());
        assert_eq!(Settings::load_or_default(&path), Settings::default());
    }

    #[test]
    fn valid_minute_edits_are_committed() {
        let mut settings = Settings::default();
        SettingsDraft {
            focus: Some("50".into()),
            short_break: Some(" 10 ".into()),
            long_break: None,
            mute: Some(true),
        }
        .commit(&mut settings);

        assert_eq!(settings.focus_minutes, 50);
        assert_eq!(settings.short_break_minutes, 10);
        assert_eq!(settings.long_break_minutes, 15);
        assert!(settings.mute);
    }

    #[test]
    fn garbage_and_negative_edits_revert_to_the_default() {
        let mut settings = Settings::default();
        settings.focus_minutes = 50;
        settings.short_break_minutes = 10;

        SettingsDraft {
            focus: Some("abc".into()),
            short_break: Some("-5".into()),
            long_break: None,
            mute: None,
        }
        .commit(&mut settings);

        assert_eq!(settings.focus_minutes, DEFAULT_FOCUS_MINUTES);
        assert_eq!(settings.short_break_minutes, DEFAULT_SHORT_BREAK_MINUTES);
    }

    #[test]
    fn an_empty_draft_changes_nothing() {
        let draft = SettingsDraft::default();
        assert!(draft.is_empty());

        let mut settings = Settings::default();
        settings.long_break_minutes = 20;
        let before = settings.clone();
        draft.commit(&mut settings);
        assert_eq!(settings, before);
    }
}
