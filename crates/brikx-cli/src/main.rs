mod command;
mod prefs_file;
mod tui;
mod util;
mod view;

fn main() -> anyhow::Result<()> {
    command::run()
}
