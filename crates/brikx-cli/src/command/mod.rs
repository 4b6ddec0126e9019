use std::path::PathBuf;

use brikx_engine::{Preferences, SessionConfig};
use clap::{Parser, Subcommand};

use crate::{prefs_file::FileStore, util};

use self::{play::PlayArg, prefs::PrefsArg, simulate::SimulateArg};

mod play;
mod prefs;
mod simulate;

#[derive(Debug, Clone, Parser)]
#[command(author, version, about, long_about = None)]
pub struct CommandArgs {
    /// What mode to run the program in
    #[command(subcommand)]
    mode: Option<Mode>,
}

#[derive(Debug, Clone, Subcommand)]
enum Mode {
    /// Play in the terminal (default)
    Play(#[clap(flatten)] PlayArg),
    /// Run a headless game with random input and print a JSON summary
    Simulate(#[clap(flatten)] SimulateArg),
    /// Show or change stored preferences
    Prefs(#[clap(flatten)] PrefsArg),
}

/// Options shared by the commands that run a session.
#[derive(Default, Debug, Clone, clap::Args)]
struct SessionArg {
    /// Session config file (JSON); missing fields use their defaults
    #[clap(long)]
    config: Option<PathBuf>,
    #[clap(flatten)]
    prefs: PrefsPathArg,
}

impl SessionArg {
    fn load_config(&self) -> anyhow::Result<SessionConfig> {
        util::read_config_file(self.config.as_deref())
    }
}

#[derive(Default, Debug, Clone, clap::Args)]
struct PrefsPathArg {
    /// Preferences file [default: $BRIKX_PREFERENCES_PATH or
    /// $XDG_CONFIG_HOME/brikx/preferences.json]
    #[clap(long = "prefs")]
    path: Option<PathBuf>,
}

impl PrefsPathArg {
    fn open_store(&self) -> FileStore {
        FileStore::open(self.path.clone().unwrap_or_else(FileStore::default_path))
    }

    fn load(&self) -> Preferences {
        Preferences::load(Box::new(self.open_store()))
    }
}

pub fn run() -> anyhow::Result<()> {
    let args = CommandArgs::parse();
    match args.mode.unwrap_or(Mode::Play(PlayArg::default())) {
        Mode::Play(arg) => play::run(&arg)?,
        Mode::Simulate(arg) => simulate::run(&arg)?,
        Mode::Prefs(arg) => prefs::run(&arg)?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory as _;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        CommandArgs::command().debug_assert();
    }

    #[test]
    fn test_no_subcommand_defaults_to_play() {
        let args = CommandArgs::try_parse_from(["brikx"]).unwrap();
        assert!(args.mode.is_none());
    }

    #[test]
    fn test_simulate_args() {
        let args = CommandArgs::try_parse_from([
            "brikx",
            "simulate",
            "--pieces",
            "50",
            "--seed",
            "000102030405060708090a0b0c0d0e0f",
        ])
        .unwrap();
        assert!(matches!(args.mode, Some(Mode::Simulate(_))));
    }
}
