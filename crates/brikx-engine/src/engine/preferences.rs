use std::{collections::HashMap, fmt};

use log::warn;

use crate::PreferenceError;

/// Maximum length of a sanitized player name, in characters.
pub const MAX_PLAYER_NAME_LEN: usize = 15;

/// Values of this many bytes or more are never written to a store.
pub const MAX_STORED_VALUE_LEN: usize = 1000;

pub const DEFAULT_PLAYER_NAME: &str = "Player";

/// Keys of the persisted scalar preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PreferenceKey {
    HighScore,
    PlayerName,
    SoundEnabled,
}

impl PreferenceKey {
    pub const ALL: [Self; 3] = [Self::HighScore, Self::PlayerName, Self::SoundEnabled];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighScore => "high_score",
            Self::PlayerName => "player_name",
            Self::SoundEnabled => "sound_enabled",
        }
    }
}

/// Read/write access to persisted preference strings.
///
/// Implementations decide where values live (memory, a file, ...). The engine
/// only ever stores the three [`PreferenceKey`] scalars.
pub trait PreferenceStore: fmt::Debug {
    /// Returns the stored value, or `None` if the key was never written.
    fn load(&self, key: PreferenceKey) -> Result<Option<String>, PreferenceError>;

    fn save(&mut self, key: PreferenceKey, value: &str) -> Result<(), PreferenceError>;
}

/// Store that keeps values in memory for the lifetime of the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<PreferenceKey, String>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn load(&self, key: PreferenceKey) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(&key).cloned())
    }

    fn save(&mut self, key: PreferenceKey, value: &str) -> Result<(), PreferenceError> {
        self.values.insert(key, value.to_owned());
        Ok(())
    }
}

/// Preference values loaded from a [`PreferenceStore`], plus the store itself.
///
/// Loading never fails: unavailable or malformed values fall back to their
/// defaults. Updates are written through to the store; write failures are
/// logged and otherwise ignored.
#[derive(Debug)]
pub struct Preferences {
    store: Box<dyn PreferenceStore>,
    high_score: u64,
    player_name: String,
    sound_enabled: bool,
}

impl Default for Preferences {
    fn default() -> Self {
        Self::in_memory()
    }
}

impl Preferences {
    /// Loads every preference from `store`.
    #[must_use]
    pub fn load(store: Box<dyn PreferenceStore>) -> Self {
        let high_score = load_value(&*store, PreferenceKey::HighScore)
            .and_then(|value| match value.trim().parse() {
                Ok(score) => Some(score),
                Err(e) => {
                    warn!("ignoring malformed high score {value:?}: {e}");
                    None
                }
            })
            .unwrap_or(0);
        let player_name = sanitize_player_name(
            load_value(&*store, PreferenceKey::PlayerName)
                .as_deref()
                .unwrap_or_default(),
        );
        let sound_enabled =
            load_value(&*store, PreferenceKey::SoundEnabled).is_none_or(|value| value != "false");
        Self {
            store,
            high_score,
            player_name,
            sound_enabled,
        }
    }

    /// Default preferences backed by a [`MemoryStore`].
    #[must_use]
    pub fn in_memory() -> Self {
        Self::load(Box::new(MemoryStore::new()))
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.high_score
    }

    #[must_use]
    pub fn player_name(&self) -> &str {
        &self.player_name
    }

    #[must_use]
    pub fn sound_enabled(&self) -> bool {
        self.sound_enabled
    }

    /// Raises the high score to `score` if it is higher, and persists it.
    ///
    /// Returns `true` if the high score changed.
    pub fn record_high_score(&mut self, score: u64) -> bool {
        if score <= self.high_score {
            return false;
        }
        self.high_score = score;
        self.persist(PreferenceKey::HighScore, &score.to_string());
        true
    }

    pub fn reset_high_score(&mut self) {
        self.high_score = 0;
        self.persist(PreferenceKey::HighScore, "0");
    }

    /// Sanitizes and stores a new player name, returning the stored value.
    pub fn set_player_name(&mut self, name: &str) -> &str {
        self.player_name = sanitize_player_name(name);
        let name = self.player_name.clone();
        self.persist(PreferenceKey::PlayerName, &name);
        &self.player_name
    }

    pub fn set_sound_enabled(&mut self, enabled: bool) {
        self.sound_enabled = enabled;
        self.persist(PreferenceKey::SoundEnabled, &enabled.to_string());
    }

    fn persist(&mut self, key: PreferenceKey, value: &str) {
        let result = if value.len() >= MAX_STORED_VALUE_LEN {
            Err(PreferenceError::ValueTooLong { len: value.len() })
        } else {
            self.store.save(key, value)
        };
        if let Err(e) = result {
            warn!("failed to save preference {}: {e}", key.as_str());
        }
    }
}

fn load_value(store: &dyn PreferenceStore, key: PreferenceKey) -> Option<String> {
    store.load(key).unwrap_or_else(|e| {
        warn!("failed to load preference {}: {e}", key.as_str());
        None
    })
}

/// Cleans up a user-supplied display name.
///
/// Keeps the first [`MAX_PLAYER_NAME_LEN`] characters, drops everything but
/// ASCII letters, digits and spaces, and trims. An empty result becomes
/// [`DEFAULT_PLAYER_NAME`].
///
/// ```
/// use brikx_engine::sanitize_player_name;
///
/// assert_eq!(sanitize_player_name("  Ada <3  "), "Ada 3");
/// assert_eq!(sanitize_player_name("!!!"), "Player");
/// ```
#[must_use]
pub fn sanitize_player_name(name: &str) -> String {
    let name: String = name
        .chars()
        .take(MAX_PLAYER_NAME_LEN)
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .collect();
    match name.trim() {
        "" => DEFAULT_PLAYER_NAME.to_owned(),
        trimmed => trimmed.to_owned(),
    }
}
