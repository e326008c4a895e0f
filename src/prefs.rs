//! User preference flags.
//!
//! The handful of flags the app persists between sessions, stored as one JSON
//! document in the host's key-value store. The core only consults `muted`;
//! the rest ride along so the host reads and writes preferences in one place.

use crate::providers::KeyValueStore;
use log::warn;
use serde::{Deserialize, Serialize};

const PREFS_KEY: &str = "guidance.prefs";

/// Persisted user preferences.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserPrefs {
    /// Suppress voice announcements.
    #[serde(default)]
    pub muted: bool,
    /// Identifier of the selected speech voice.
    #[serde(default)]
    pub voice: Option<String>,
    /// UI color scheme name.
    #[serde(default)]
    pub color_scheme: Option<String>,
    /// The remove-ads purchase has been made.
    #[serde(default)]
    pub ads_removed: bool,
}

impl Default for UserPrefs {
    fn default() -> Self {
        Self {
            muted: false,
            voice: None,
            color_scheme: None,
            ads_removed: false,
        }
    }
}

impl UserPrefs {
    /// Load preferences from the store, falling back to defaults when the
    /// key is missing or the stored document doesn't parse.
    pub fn load(store: &dyn KeyValueStore) -> Self {
        match store.get(PREFS_KEY) {
            Some(json) => serde_json::from_str(&json).unwrap_or_else(|err| {
                warn!("stored preferences unreadable, using defaults: {err}");
                Self::default()
            }),
            None => Self::default(),
        }
    }

    /// Persist preferences to the store.
    pub fn save(&self, store: &mut dyn KeyValueStore) {
        match serde_json::to_string(self) {
            Ok(json) => store.set(PREFS_KEY, json),
            Err(err) => warn!("failed to serialize preferences: {err}"),
        }
    }
}
