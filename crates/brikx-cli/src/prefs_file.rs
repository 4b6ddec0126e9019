use std::{
    collections::BTreeMap,
    fs, io,
    path::{Path, PathBuf},
};

use brikx_engine::{PreferenceError, PreferenceKey, PreferenceStore};
use log::warn;

const PATH_ENV: &str = "BRIKX_PREFERENCES_PATH";

/// Preference store backed by a JSON object of strings on disk.
///
/// The file is read once when opened and rewritten on every save.
#[derive(Debug, Clone)]
pub struct FileStore {
    path: PathBuf,
    values: BTreeMap<String, String>,
}

impl FileStore {
    /// Default location: `$BRIKX_PREFERENCES_PATH`, or
    /// `$XDG_CONFIG_HOME/brikx/preferences.json` (falling back to
    /// `~/.config`).
    pub fn default_path() -> PathBuf {
        if let Some(explicit) = std::env::var_os(PATH_ENV) {
            return PathBuf::from(explicit);
        }

        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME").map(|home| {
                    let mut p = PathBuf::from(home);
                    p.push(".config");
                    p
                })
            })
            .unwrap_or_else(|| PathBuf::from("."));

        let mut path = base;
        path.push("brikx");
        path.push("preferences.json");
        path
    }

    /// Opens the store at `path`.
    ///
    /// A missing file is an empty store. An unreadable or malformed file is
    /// logged and treated as empty; it is overwritten on the next save.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match read_values(&path) {
            Ok(values) => values,
            Err(e) => {
                warn!("ignoring preferences file {}: {e}", path.display());
                BTreeMap::new()
            }
        };
        Self { path, values }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self) -> io::Result<()> {
        if let Some(parent) = self.path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }
        let text = serde_json::to_string_pretty(&self.values)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(&self.path, text)
    }
}

fn read_values(path: &Path) -> io::Result<BTreeMap<String, String>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(e) => return Err(e),
    };
    serde_json::from_slice(&bytes).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

impl PreferenceStore for FileStore {
    fn load(&self, key: PreferenceKey) -> Result<Option<String>, PreferenceError> {
        Ok(self.values.get(key.as_str()).cloned())
    }

    fn save(&mut self, key: PreferenceKey, value: &str) -> Result<(), PreferenceError> {
        let previous = self.values.insert(key.as_str().to_owned(), value.to_owned());
        if previous.as_deref() == Some(value) {
            return Ok(());
        }
        self.write().map_err(|e| PreferenceError::Unavailable {
            reason: format!("{}: {e}", self.path.display()),
        })
    }
}

#[cfg(test)]
mod tests {
    use brikx_engine::Preferences;

    use super::*;

    #[test]
    fn test_missing_file_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::open(dir.path().join("missing.json"));
        assert_eq!(store.load(PreferenceKey::HighScore).unwrap(), None);
    }

    #[test]
    fn test_save_creates_parent_dirs_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/brikx/preferences.json");

        let mut store = FileStore::open(&path);
        store.save(PreferenceKey::PlayerName, "Ada").unwrap();
        store.save(PreferenceKey::HighScore, "1200").unwrap();

        let reopened = FileStore::open(&path);
        assert_eq!(
            reopened.load(PreferenceKey::PlayerName).unwrap().as_deref(),
            Some("Ada")
        );
        assert_eq!(
            reopened.load(PreferenceKey::HighScore).unwrap().as_deref(),
            Some("1200")
        );
        let json: serde_json::Value =
            serde_json::from_str(&fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["player_name"], "Ada");
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");
        fs::write(&path, "not json").unwrap();

        let prefs = Preferences::load(Box::new(FileStore::open(&path)));
        assert_eq!(prefs.high_score(), 0);
        assert_eq!(prefs.player_name(), "Player");
        assert!(prefs.sound_enabled());
    }

    #[test]
    fn test_preferences_round_trip_through_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preferences.json");

        let mut prefs = Preferences::load(Box::new(FileStore::open(&path)));
        prefs.record_high_score(4200);
        prefs.set_player_name("  Grace! ");
        prefs.set_sound_enabled(false);

        let prefs = Preferences::load(Box::new(FileStore::open(&path)));
        assert_eq!(prefs.high_score(), 4200);
        assert_eq!(prefs.player_name(), "Grace");
        assert!(!prefs.sound_enabled());
    }

    #[test]
    fn test_unwritable_path_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "").unwrap();

        let mut store = FileStore::open(blocker.join("preferences.json"));
        let err = store.save(PreferenceKey::SoundEnabled, "false").unwrap_err();
        assert!(matches!(err, PreferenceError::Unavailable { .. }));
    }
}
