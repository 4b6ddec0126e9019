use brikx_engine::Preferences;
use log::info;
use serde::Serialize;

use crate::{command::PrefsPathArg, util::Output};

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PrefsArg {
    #[clap(flatten)]
    path: PrefsPathArg,
    /// Set the player name (letters, digits and spaces; at most 15 characters)
    #[clap(long)]
    name: Option<String>,
    /// Turn sound on or off
    #[clap(long)]
    sound: Option<bool>,
    /// Reset the high score to zero
    #[clap(long)]
    reset_high_score: bool,
}

#[derive(Debug, Serialize)]
struct PrefsView<'a> {
    path: String,
    player_name: &'a str,
    high_score: u64,
    sound_enabled: bool,
}

pub(crate) fn run(arg: &PrefsArg) -> anyhow::Result<()> {
    env_logger::init();

    let store = arg.path.open_store();
    let path = store.path().display().to_string();
    let mut prefs = Preferences::load(Box::new(store));
    apply(arg, &mut prefs);

    let view = PrefsView {
        path,
        player_name: prefs.player_name(),
        high_score: prefs.high_score(),
        sound_enabled: prefs.sound_enabled(),
    };
    Output::stdout().write_json(&view)
}

fn apply(arg: &PrefsArg, prefs: &mut Preferences) {
    if let Some(name) = &arg.name {
        let stored = prefs.set_player_name(name);
        if stored != name.as_str() {
            info!("player name {name:?} stored as {stored:?}");
        }
    }
    if let Some(sound) = arg.sound {
        prefs.set_sound_enabled(sound);
    }
    if arg.reset_high_score {
        prefs.reset_high_score();
        info!("high score reset");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_updates_preferences() {
        let mut prefs = Preferences::in_memory();
        prefs.record_high_score(900);
        let arg = PrefsArg {
            name: Some("  Lin<> ".to_owned()),
            sound: Some(false),
            reset_high_score: true,
            ..PrefsArg::default()
        };

        apply(&arg, &mut prefs);

        assert_eq!(prefs.player_name(), "Lin");
        assert!(!prefs.sound_enabled());
        assert_eq!(prefs.high_score(), 0);
    }

    #[test]
    fn test_apply_without_changes_keeps_values() {
        let mut prefs = Preferences::in_memory();
        prefs.record_high_score(50);
        apply(&PrefsArg::default(), &mut prefs);
        assert_eq!(prefs.high_score(), 50);
        assert_eq!(prefs.player_name(), "Player");
    }
}
