use brikx_engine::{GameSession, PieceSeed};

use crate::{command::SessionArg, tui::Tui};

use self::app::PlayApp;

mod app;

#[derive(Default, Debug, Clone, clap::Args)]
pub(crate) struct PlayArg {
    #[clap(flatten)]
    session: SessionArg,
    /// Fixed piece seed (32 hex digits); every game replays the same sequence
    #[clap(long)]
    seed: Option<PieceSeed>,
    /// Start with the ghost piece hidden (toggle with G)
    #[clap(long)]
    no_ghost: bool,
}

pub(crate) fn run(arg: &PlayArg) -> anyhow::Result<()> {
    let PlayArg {
        session,
        seed,
        no_ghost,
    } = arg;

    let config = session.load_config()?;
    let preferences = session.prefs.load();
    let session = match seed {
        Some(seed) => GameSession::with_seed(config, preferences, *seed),
        None => GameSession::new(config, preferences),
    };

    let mut app = PlayApp::new(session, !no_ghost);
    Tui::new().run(&mut app)
}
