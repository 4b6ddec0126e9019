use std::{mem, time::Duration};

use brikx_engine::{Command, GameSession, SessionState};
use crossterm::event::{Event, KeyCode, KeyEventKind};
use ratatui::{
    Frame,
    layout::{Constraint, Layout},
};

use crate::{
    tui::{App, RenderMode, Tui},
    view::widgets::{Banner, KeyBinding, KeyBindingDisplay, SessionDisplay},
};

const FPS: f64 = 60.0;

/// How long a bonus banner stays on screen.
const BONUS_DURATION: Duration = Duration::from_millis(1500);
const LEVEL_UP_DURATION: Duration = Duration::from_secs(2);

const IDLE_KEYS: &[KeyBinding] = &[
    KeyBinding::new(&["Enter", "Space"], "Start"),
    KeyBinding::new(&["Q"], "Quit"),
];
const COUNTDOWN_KEYS: &[KeyBinding] = &[
    KeyBinding::new(&["M"], "Menu"),
    KeyBinding::new(&["Q"], "Quit"),
];
const PLAYING_KEYS: &[KeyBinding] = &[
    KeyBinding::new(&["←", "→"], "Move"),
    KeyBinding::new(&["↓"], "Soft Drop"),
    KeyBinding::new(&["↑", "X"], "Rotate"),
    KeyBinding::new(&["Space"], "Hard Drop"),
    KeyBinding::new(&["C"], "Hold"),
    KeyBinding::new(&["P", "Esc"], "Pause"),
    KeyBinding::new(&["G"], "Ghost"),
    KeyBinding::new(&["Q"], "Quit"),
];
const PAUSED_KEYS: &[KeyBinding] = &[
    KeyBinding::new(&["P", "Esc"], "Resume"),
    KeyBinding::new(&["M"], "Menu"),
    KeyBinding::new(&["Q"], "Quit"),
];
const GAME_OVER_KEYS: &[KeyBinding] = &[
    KeyBinding::new(&["Enter", "Space"], "Retry"),
    KeyBinding::new(&["M"], "Menu"),
    KeyBinding::new(&["Q"], "Quit"),
];

#[derive(Debug)]
struct ShownBanner {
    banner: Banner,
    remaining: Duration,
}

/// Terminal front end for one [`GameSession`].
#[derive(Debug)]
pub struct PlayApp {
    session: GameSession,
    show_ghost: bool,
    banners: Vec<ShownBanner>,
    seen_lines: u64,
    is_exiting: bool,
}

impl PlayApp {
    pub fn new(session: GameSession, show_ghost: bool) -> Self {
        Self {
            session,
            show_ghost,
            banners: Vec::new(),
            seen_lines: 0,
            is_exiting: false,
        }
    }

    fn command_for_key(&self, code: KeyCode) -> Option<Command> {
        let state = self.session.state();
        let command = match code {
            KeyCode::Left => Command::MoveLeft,
            KeyCode::Right => Command::MoveRight,
            KeyCode::Down => Command::SoftDrop,
            KeyCode::Up | KeyCode::Char('x' | 'X') => Command::Rotate,
            KeyCode::Char(' ') if state.is_playing() => Command::HardDrop,
            KeyCode::Char(' ') | KeyCode::Enter => Command::StartGame,
            KeyCode::Char('c' | 'C') => Command::Hold,
            KeyCode::Char('p' | 'P') | KeyCode::Esc => Command::TogglePause,
            KeyCode::Char('m' | 'M') => Command::MainMenu,
            _ => return None,
        };
        Some(command)
    }

    /// Raises the banners earned by a line clear since the last call.
    ///
    /// The line count only moves on a clearing settle, so a settle that
    /// clears nothing raises nothing.
    fn refresh_banners(&mut self) {
        let lines = self.session.lines();
        if lines == self.seen_lines {
            return;
        }
        self.seen_lines = lines;
        let Some(clear) = self.session.last_clear().copied() else {
            return;
        };
        if let Some(notification) = clear.notification {
            self.show(Banner::Bonus(notification), BONUS_DURATION);
        }
        if let Some(level) = clear.level_up {
            self.show(Banner::LevelUp(level), LEVEL_UP_DURATION);
        }
    }

    /// Shows `banner`, replacing a shown banner of the same kind.
    fn show(&mut self, banner: Banner, duration: Duration) {
        self.banners
            .retain(|shown| mem::discriminant(&shown.banner) != mem::discriminant(&banner));
        self.banners.push(ShownBanner {
            banner,
            remaining: duration,
        });
    }

    fn key_bindings(&self) -> &'static [KeyBinding] {
        match self.session.state() {
            SessionState::Idle => IDLE_KEYS,
            SessionState::Countdown => COUNTDOWN_KEYS,
            SessionState::Playing => PLAYING_KEYS,
            SessionState::Paused => PAUSED_KEYS,
            SessionState::GameOver => GAME_OVER_KEYS,
        }
    }
}

impl App for PlayApp {
    fn init(&mut self, tui: &mut Tui) {
        tui.set_tick_rate(FPS);
        tui.set_render_mode(RenderMode::Interval(Duration::from_secs_f64(1.0 / FPS)));
    }

    fn should_exit(&self) -> bool {
        self.is_exiting
    }

    fn handle_event(&mut self, _tui: &mut Tui, event: &Event) {
        let Some(event) = event.as_key_event() else {
            return;
        };
        if event.kind == KeyEventKind::Release {
            return;
        }
        match event.code {
            KeyCode::Char('q' | 'Q') => self.is_exiting = true,
            KeyCode::Char('g' | 'G') => self.show_ghost = !self.show_ghost,
            code => {
                if let Some(command) = self.command_for_key(code) {
                    self.session.apply_command(command);
                    self.refresh_banners();
                }
            }
        }
    }

    fn draw(&self, frame: &mut Frame) {
        let banners = self
            .banners
            .iter()
            .map(|shown| shown.banner)
            .collect::<Vec<_>>();
        let session_display = SessionDisplay::new(&self.session)
            .show_ghost(self.show_ghost)
            .banners(&banners);
        let help = KeyBindingDisplay::new(self.key_bindings());

        let [main_area, help_area] =
            Layout::vertical([Constraint::Length(25), Constraint::Length(2)])
                .areas::<2>(frame.area());
        frame.render_widget(session_display, main_area);
        frame.render_widget(help, help_area);
    }

    fn update(&mut self, _tui: &mut Tui, elapsed: Duration) {
        self.session.tick(elapsed);
        self.refresh_banners();

        if !self.session.state().is_playing() {
            self.banners.clear();
            return;
        }
        for shown in &mut self.banners {
            shown.remaining = shown.remaining.saturating_sub(elapsed);
        }
        self.banners.retain(|shown| !shown.remaining.is_zero());
    }
}

#[cfg(test)]
mod tests {
    use brikx_engine::{
        COLS, ClearNotification, Piece, PieceKind, PieceSeed, Preferences, ROWS, SessionConfig,
    };
    use crossterm::event::{KeyEvent, KeyModifiers};

    use super::*;

    fn app() -> PlayApp {
        let session = GameSession::with_seed(
            SessionConfig::default(),
            Preferences::in_memory(),
            PieceSeed::from_bytes([9; 16]),
        );
        PlayApp::new(session, true)
    }

    fn press(app: &mut PlayApp, code: KeyCode) {
        let event = Event::Key(KeyEvent::new(code, KeyModifiers::NONE));
        app.handle_event(&mut Tui::new(), &event);
    }

    fn start(app: &mut PlayApp) {
        press(app, KeyCode::Enter);
        app.update(&mut Tui::new(), Duration::from_secs(4));
        assert!(app.session.state().is_playing());
    }

    #[test]
    fn test_space_starts_then_hard_drops() {
        let mut app = app();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.state(), SessionState::Countdown);

        app.update(&mut Tui::new(), Duration::from_secs(4));
        press(&mut app, KeyCode::Char(' '));
        assert!(app.session.score() > 0);
        assert_eq!(app.session.scoreboard().settled_pieces(), 1);
    }

    #[test]
    fn test_pause_and_quit_keys() {
        let mut app = app();
        start(&mut app);

        press(&mut app, KeyCode::Esc);
        assert_eq!(app.session.state(), SessionState::Paused);
        press(&mut app, KeyCode::Char('p'));
        assert!(app.session.state().is_playing());

        assert!(!app.should_exit());
        press(&mut app, KeyCode::Char('q'));
        assert!(app.should_exit());
    }

    fn shown(app: &PlayApp) -> Vec<Banner> {
        app.banners.iter().map(|shown| shown.banner).collect()
    }

    /// Clears the bottom row with a color-match bonus, leaving one block
    /// behind.
    fn clear_color_row(app: &mut PlayApp) {
        for x in 4..COLS {
            app.session
                .board_mut()
                .set_cell(x, ROWS - 1, Some(PieceKind::Z.color()));
        }
        // Keeps the clear from emptying the board.
        app.session
            .board_mut()
            .set_cell(COLS - 1, ROWS - 2, Some(PieceKind::Z.color()));
        app.session
            .set_active_piece(Piece::new(PieceKind::I).with_position(0, 0))
            .unwrap();
        press(app, KeyCode::Char(' '));
    }

    #[test]
    fn test_line_clear_shows_and_expires_banner() {
        let mut app = app();
        start(&mut app);
        clear_color_row(&mut app);
        assert!(matches!(
            shown(&app)[..],
            [Banner::Bonus(ClearNotification::ColorMatch { .. })]
        ));

        app.update(&mut Tui::new(), BONUS_DURATION);
        assert!(app.banners.is_empty());
    }

    #[test]
    fn test_non_clearing_settle_raises_no_banner() {
        let mut app = app();
        start(&mut app);
        clear_color_row(&mut app);
        app.update(&mut Tui::new(), BONUS_DURATION);
        assert!(app.banners.is_empty());

        app.session
            .set_active_piece(Piece::new(PieceKind::O).with_position(0, 0))
            .unwrap();
        press(&mut app, KeyCode::Char(' '));
        assert_eq!(app.session.scoreboard().settled_pieces(), 2);
        assert!(app.banners.is_empty());
    }

    #[test]
    fn test_level_up_banner_outlasts_bonus() {
        let mut app = app();
        start(&mut app);
        let vertical_i = Piece::new(PieceKind::I).rotated().with_position(0, 0);
        for _ in 0..3 {
            for y in ROWS - 4..ROWS {
                for x in 1..COLS {
                    app.session
                        .board_mut()
                        .set_cell(x, y, Some(PieceKind::ALL[x % 4].color()));
                }
            }
            app.session.set_active_piece(vertical_i.clone()).unwrap();
            press(&mut app, KeyCode::Char(' '));
            if app.session.lines() < 12 {
                app.update(&mut Tui::new(), Duration::from_millis(200));
            }
        }
        assert_eq!(app.session.level(), 2);
        assert!(shown(&app).contains(&Banner::LevelUp(2)));

        app.update(&mut Tui::new(), BONUS_DURATION);
        assert_eq!(shown(&app), [Banner::LevelUp(2)]);
        app.update(&mut Tui::new(), LEVEL_UP_DURATION - BONUS_DURATION);
        assert!(app.banners.is_empty());
    }

    #[test]
    fn test_ghost_toggle() {
        let mut app = app();
        press(&mut app, KeyCode::Char('g'));
        assert!(!app.show_ghost);
    }
}
