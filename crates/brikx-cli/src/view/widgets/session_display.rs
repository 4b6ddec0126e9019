use brikx_engine::{ClearNotification, GameSession, SessionState};
use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};

use crate::view::widgets::{
    BoardDisplay, PieceDisplay, PieceStackDisplay, SessionStatsDisplay, color, style,
};

/// A transient message shown over the board while playing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Banner {
    Bonus(ClearNotification),
    LevelUp(u32),
}

impl Banner {
    pub fn text(&self) -> String {
        match *self {
            Banner::Bonus(ClearNotification::PerfectClear { points }) => {
                format!("PERFECT CLEAR! +{points}")
            }
            Banner::Bonus(ClearNotification::Combo { streak, points }) => {
                format!("COMBO x{streak}! +{points}")
            }
            Banner::Bonus(ClearNotification::ColorMatch { points }) => {
                format!("COLOR MATCH! +{points}")
            }
            Banner::LevelUp(level) => format!("LEVEL {level}!"),
        }
    }
}

/// Full game screen: hold and stats on the left, the board in the middle and
/// the next queue on the right, with a popup for non-playing states.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    session: &'a GameSession,
    banners: &'a [Banner],
    show_ghost: bool,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(session: &'a GameSession) -> Self {
        Self {
            session,
            banners: &[],
            show_ghost: true,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    /// Banners shown over the board while playing, one per line.
    pub fn banners(self, banners: &'a [Banner]) -> Self {
        Self { banners, ..self }
    }

    pub fn show_ghost(self, show_ghost: bool) -> Self {
        Self { show_ghost, ..self }
    }

    fn popup(&self) -> Option<(Text<'static>, Style)> {
        let session = self.session;
        match session.state() {
            SessionState::Idle => {
                let text = Text::from(vec![
                    Line::from("BRIKX"),
                    Line::from(""),
                    Line::from(format!("Player: {}", session.preferences().player_name())),
                    Line::from(format!("High score: {}", session.high_score())),
                    Line::from(""),
                    Line::from("Press Enter to start"),
                ]);
                Some((text, Style::new().fg(color::BLACK).bg(color::CYAN)))
            }
            SessionState::Countdown => {
                let step = session.countdown()?;
                Some((
                    Text::from(step.to_string()),
                    Style::new().fg(color::BLACK).bg(color::WHITE),
                ))
            }
            SessionState::Playing => {
                if self.banners.is_empty() {
                    return None;
                }
                let lines = self.banners.iter().map(|banner| Line::from(banner.text()));
                Some((
                    Text::from_iter(lines),
                    Style::new().fg(color::BLACK).bg(color::MAGENTA),
                ))
            }
            SessionState::Paused => Some((
                Text::from("PAUSED"),
                Style::new().fg(color::BLACK).bg(color::YELLOW),
            )),
            SessionState::GameOver => {
                let mut lines = vec![
                    Line::from("GAME OVER!!"),
                    Line::from(format!("Score: {}", session.score())),
                ];
                if session.score() > 0 && session.score() >= session.high_score() {
                    lines.push(Line::from("New high score!"));
                }
                lines.push(Line::from(""));
                lines.push(Line::from("Enter: retry  M: menu"));
                Some((
                    Text::from(lines),
                    Style::new().fg(color::WHITE).bg(color::RED),
                ))
            }
        }
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let session = self.session;
        let block_padding = Padding::symmetric(self.horizontal_padding, self.vertical_padding);
        let border_style = match session.state() {
            SessionState::Idle | SessionState::Countdown => color::CYAN,
            SessionState::Playing => color::WHITE,
            SessionState::Paused => color::YELLOW,
            SessionState::GameOver => color::RED,
        };
        let panel = |title: &'static str| {
            Block::bordered()
                .title(Line::from(title).centered())
                .padding(block_padding)
                .border_style(border_style)
                .style(style::DEFAULT)
        };

        let game_board = BoardDisplay::new(session.board())
            .active_piece(session.active_piece())
            .ghost(session.ghost_piece().filter(|_| self.show_ghost))
            .clearing_rows(session.clearing_rows())
            .block(
                Block::bordered()
                    .border_style(border_style)
                    .style(style::DEFAULT),
            );
        let hold_panel = PieceDisplay::new()
            .piece(session.held_piece())
            .dimmed(!session.can_hold())
            .block(panel("HOLD"));
        let piece_stack = PieceStackDisplay::new(session.next_pieces()).block(panel("NEXT"));
        let session_stats = SessionStatsDisplay::new(session).block(panel("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), session_stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(piece_stack.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(session_stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(session_stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);

        let [piece_stack_area] =
            Layout::vertical([Constraint::Length(piece_stack.height())]).areas(right_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        session_stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        piece_stack.render(piece_stack_area, buf);

        if let Some((text, style)) = self.popup() {
            let height = u16::try_from(text.lines.len()).unwrap_or(1) + 2;
            let block = Block::new().style(style);
            let text = text.style(style).centered();
            let area = board_area.centered(
                Constraint::Length(game_board_width),
                Constraint::Length(height),
            );
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(
                inner.centered_vertically(Constraint::Length(height - 2)),
                buf,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use brikx_engine::{Command, PieceSeed, Preferences, SessionConfig};

    use super::*;

    fn session() -> GameSession {
        GameSession::with_seed(
            SessionConfig::default(),
            Preferences::in_memory(),
            PieceSeed::from_bytes([3; 16]),
        )
    }

    fn rendered(display: &SessionDisplay) -> String {
        let area = Rect::new(0, 0, 80, 25);
        let mut buf = Buffer::empty(area);
        display.render(area, &mut buf);
        buf.content().iter().map(|cell| cell.symbol()).collect()
    }

    #[test]
    fn test_idle_shows_start_prompt() {
        let session = session();
        let screen = rendered(&SessionDisplay::new(&session));
        assert!(screen.contains("Press Enter to start"));
        assert!(screen.contains("Player"));
    }

    #[test]
    fn test_countdown_and_pause_popups() {
        let mut session = session();
        session.apply_command(Command::StartGame);
        assert!(rendered(&SessionDisplay::new(&session)).contains('3'));

        session.tick(Duration::from_secs(4));
        session.apply_command(Command::TogglePause);
        assert!(rendered(&SessionDisplay::new(&session)).contains("PAUSED"));
    }

    #[test]
    fn test_banners_stack_while_playing() {
        let mut session = session();
        session.apply_command(Command::StartGame);
        session.tick(Duration::from_secs(4));
        let banners = [
            Banner::Bonus(ClearNotification::Combo {
                streak: 2,
                points: 100,
            }),
            Banner::LevelUp(3),
        ];
        let screen = rendered(&SessionDisplay::new(&session).banners(&banners));
        assert!(screen.contains("COMBO x2! +100"));
        assert!(screen.contains("LEVEL 3!"));

        session.apply_command(Command::TogglePause);
        let screen = rendered(&SessionDisplay::new(&session).banners(&banners));
        assert!(!screen.contains("LEVEL 3!"));
    }
}
