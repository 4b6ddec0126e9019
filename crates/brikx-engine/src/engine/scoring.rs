use std::{collections::HashMap, time::Duration};

use log::info;
use serde::Serialize;

use crate::core::{Board, COLS, Row};

use super::{config::SessionConfig, preferences::Preferences};

/// Base points for line clears, indexed by lines cleared at once.
///
/// Multiplied by the level at the time of the clear.
const SCORE_TABLE: [u64; 5] = [0, 100, 300, 500, 800];

/// Points per row a piece falls during a hard drop.
pub const HARD_DROP_POINTS_PER_ROW: u64 = 2;

/// Smallest same-color group in a cleared row that earns a bonus.
pub const COLOR_MATCH_MIN_CELLS: usize = 3;
pub const COLOR_MATCH_POINTS_PER_CELL: u64 = 50;
/// Extra bonus when a whole cleared row is one color.
pub const FULL_ROW_COLOR_BONUS: u64 = 500;

/// Per streak step, multiplied by the level.
pub const COMBO_POINTS: u64 = 50;

pub const PERFECT_CLEAR_BONUS: u64 = 3000;

pub const LINES_PER_LEVEL: u64 = 10;

/// Color-match bonus for one cleared row.
///
/// Cells are grouped by color. Every group of at least
/// [`COLOR_MATCH_MIN_CELLS`] cells earns [`COLOR_MATCH_POINTS_PER_CELL`] per
/// cell, and a group covering the whole row earns [`FULL_ROW_COLOR_BONUS`] on
/// top.
#[must_use]
pub fn color_match_bonus(row: &Row) -> u64 {
    let mut groups = HashMap::new();
    for color in row.iter().flatten() {
        *groups.entry(color).or_insert(0_usize) += 1;
    }
    groups
        .into_values()
        .map(|count| {
            let mut points = 0;
            if count >= COLOR_MATCH_MIN_CELLS {
                points += count as u64 * COLOR_MATCH_POINTS_PER_CELL;
            }
            if count == COLS {
                points += FULL_ROW_COLOR_BONUS;
            }
            points
        })
        .sum()
}

/// Level reached after clearing `lines` lines in total.
#[must_use]
pub fn level_for_lines(lines: u64) -> u32 {
    u32::try_from(lines / LINES_PER_LEVEL)
        .unwrap_or(u32::MAX - 1)
        .saturating_add(1)
}

/// Bonus message for a line clear, for display by the front end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClearNotification {
    /// The clear left the board empty. Takes precedence over the others.
    PerfectClear { points: u64 },
    /// The clear continued a streak of `streak` clearing settles.
    Combo { streak: u32, points: u64 },
    /// Same-color groups in the cleared rows earned a bonus.
    ColorMatch { points: u64 },
}

/// Breakdown of the points awarded for one settle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct LineClearScore {
    pub lines: usize,
    pub base_points: u64,
    pub color_bonus: u64,
    pub combo_bonus: u64,
    pub perfect_clear_bonus: u64,
    /// Streak after this settle.
    pub combo: u32,
    pub notification: Option<ClearNotification>,
    /// New level, if this clear changed it.
    pub level_up: Option<u32>,
}

impl LineClearScore {
    #[must_use]
    pub fn total(&self) -> u64 {
        self.base_points + self.color_bonus + self.combo_bonus + self.perfect_clear_bonus
    }

    #[must_use]
    pub fn is_perfect_clear(&self) -> bool {
        self.perfect_clear_bonus > 0
    }
}

/// Score, level, lines and combo of one game, with the rules that update them.
///
/// # Scoring
///
/// For a settle clearing `n` rows at level `L` with a streak of `c` before it:
///
/// - Base: `[0, 100, 300, 500, 800][n] × L`
/// - Color match: see [`color_match_bonus`], summed over cleared rows
/// - Combo: `c × 50 × L`
/// - Perfect clear: 3000 if the board is empty once the rows are removed
///
/// Hard drops add 2 points per row dropped. The high score in
/// [`Preferences`] is raised as soon as the score passes it.
///
/// # Example
///
/// ```
/// use brikx_engine::{Board, Preferences, Scoreboard, SessionConfig};
///
/// let mut scoreboard = Scoreboard::new(SessionConfig::default());
/// let mut prefs = Preferences::in_memory();
///
/// scoreboard.award_hard_drop(18, &mut prefs);
/// assert_eq!(scoreboard.score(), 36);
/// assert_eq!(prefs.high_score(), 36);
///
/// let result = scoreboard.score_settle(&Board::new(), &[], &mut prefs);
/// assert_eq!(result.total(), 0);
/// assert_eq!(scoreboard.combo(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct Scoreboard {
    config: SessionConfig,
    score: u64,
    level: u32,
    lines: u64,
    combo: u32,
    settled_pieces: u64,
    line_clear_counter: [u64; 5],
    drop_interval: Duration,
}

impl Scoreboard {
    #[must_use]
    pub fn new(config: SessionConfig) -> Self {
        Self {
            config,
            score: 0,
            level: 1,
            lines: 0,
            combo: 0,
            settled_pieces: 0,
            line_clear_counter: [0; 5],
            drop_interval: config.drop_interval(1),
        }
    }

    #[must_use]
    pub const fn score(&self) -> u64 {
        self.score
    }

    #[must_use]
    pub const fn level(&self) -> u32 {
        self.level
    }

    #[must_use]
    pub const fn lines(&self) -> u64 {
        self.lines
    }

    #[must_use]
    pub const fn combo(&self) -> u32 {
        self.combo
    }

    #[must_use]
    pub const fn settled_pieces(&self) -> u64 {
        self.settled_pieces
    }

    /// Histogram of settles by lines cleared (`[0]` counts non-clearing
    /// settles, `[4]` counts four-line clears).
    #[must_use]
    pub const fn line_clear_counter(&self) -> &[u64; 5] {
        &self.line_clear_counter
    }

    /// Current gravity interval.
    #[must_use]
    pub const fn drop_interval(&self) -> Duration {
        self.drop_interval
    }

    fn add_points(&mut self, points: u64, prefs: &mut Preferences) {
        self.score = self.score.saturating_add(points);
        prefs.record_high_score(self.score);
    }

    /// Awards hard-drop points for a piece that fell `rows` rows.
    pub fn award_hard_drop(&mut self, rows: u32, prefs: &mut Preferences) -> u64 {
        let points = u64::from(rows) * HARD_DROP_POINTS_PER_ROW;
        self.add_points(points, prefs);
        points
    }

    /// Scores a settle.
    ///
    /// `board` is the board with the settled piece merged in and `rows` the
    /// completed rows, not yet removed. An empty `rows` ends the combo streak.
    pub fn score_settle(
        &mut self,
        board: &Board,
        rows: &[usize],
        prefs: &mut Preferences,
    ) -> LineClearScore {
        self.settled_pieces += 1;
        let lines = rows.len().min(SCORE_TABLE.len() - 1);
        self.line_clear_counter[lines] += 1;

        if rows.is_empty() {
            self.combo = 0;
            return LineClearScore::default();
        }

        let level = u64::from(self.level);
        let streak = self.combo;
        let base_points = SCORE_TABLE[lines] * level;
        let color_bonus: u64 = rows
            .iter()
            .map(|&y| color_match_bonus(board.row(y)))
            .sum();
        let combo_bonus = u64::from(streak) * COMBO_POINTS * level;
        let perfect_clear_bonus = if board.is_empty_after_clearing(rows) {
            PERFECT_CLEAR_BONUS
        } else {
            0
        };

        let notification = if perfect_clear_bonus > 0 {
            Some(ClearNotification::PerfectClear {
                points: perfect_clear_bonus,
            })
        } else if streak > 0 {
            Some(ClearNotification::Combo {
                streak,
                points: combo_bonus + color_bonus,
            })
        } else if color_bonus > 0 {
            Some(ClearNotification::ColorMatch {
                points: color_bonus,
            })
        } else {
            None
        };

        self.combo = streak.saturating_add(1);
        self.lines += rows.len() as u64;
        let new_level = level_for_lines(self.lines);
        let level_up = (new_level != self.level).then(|| {
            self.level = new_level;
            self.drop_interval = self.config.drop_interval(new_level);
            info!(
                "level up: {new_level} (drop interval {:?})",
                self.drop_interval
            );
            new_level
        });

        let result = LineClearScore {
            lines: rows.len(),
            base_points,
            color_bonus,
            combo_bonus,
            perfect_clear_bonus,
            combo: self.combo,
            notification,
            level_up,
        };
        self.add_points(result.total(), prefs);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{PieceColor, PieceKind};

    fn color(kind: PieceKind) -> Option<PieceColor> {
        Some(kind.color())
    }

    /// Row cycling through every kind's color, so no group reaches 3 cells.
    fn mixed_row() -> Row {
        std::array::from_fn(|x| color(PieceKind::ALL[x % 2 + (x / 2) % 3 * 2]))
    }

    fn fill_row(board: &mut Board, y: usize, row: Row) {
        for (x, cell) in row.into_iter().enumerate() {
            board.set_cell(x, y, cell);
        }
    }

    #[test]
    fn test_color_match_bonus() {
        assert_eq!(color_match_bonus(&[None; COLS]), 0);
        assert_eq!(color_match_bonus(&[color(PieceKind::T); COLS]), 10 * 50 + 500);

        let mut row = [color(PieceKind::I); COLS];
        row[..4].fill(color(PieceKind::O));
        row[4..6].fill(color(PieceKind::S));
        // I: 4 cells, O: 4 cells, S: 2 cells
        assert_eq!(color_match_bonus(&row), 4 * 50 + 4 * 50);
    }

    #[test]
    fn test_mixed_row_has_no_color_bonus() {
        let row = mixed_row();
        assert!(row.iter().all(Option::is_some));
        assert_eq!(color_match_bonus(&row), 0);
    }

    #[test]
    fn test_level_for_lines() {
        assert_eq!(level_for_lines(0), 1);
        assert_eq!(level_for_lines(9), 1);
        assert_eq!(level_for_lines(10), 2);
        assert_eq!(level_for_lines(95), 10);
        assert_eq!(level_for_lines(u64::MAX), u32::MAX);
    }

    #[test]
    fn test_single_clear_without_bonuses() {
        let mut board = Board::new();
        fill_row(&mut board, 19, mixed_row());
        board.set_cell(0, 18, color(PieceKind::L));
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();

        let result = scoreboard.score_settle(&board, &[19], &mut prefs);

        assert_eq!(result.base_points, 100);
        assert_eq!(result.total(), 100);
        assert_eq!(result.notification, None);
        assert_eq!(scoreboard.score(), 100);
        assert_eq!(scoreboard.combo(), 1);
        assert_eq!(scoreboard.lines(), 1);
        assert_eq!(prefs.high_score(), 100);
    }

    #[test]
    fn test_perfect_clear_bonus() {
        let mut board = Board::new();
        fill_row(&mut board, 19, mixed_row());
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();

        let result = scoreboard.score_settle(&board, &[19], &mut prefs);

        assert_eq!(result.perfect_clear_bonus, 3000);
        assert_eq!(result.total(), 100 + 3000);
        assert_eq!(
            result.notification,
            Some(ClearNotification::PerfectClear { points: 3000 })
        );
    }

    #[test]
    fn test_combo_streak_and_reset() {
        let mut board = Board::new();
        fill_row(&mut board, 19, mixed_row());
        board.set_cell(0, 18, color(PieceKind::L));
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();

        let first = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(first.combo_bonus, 0);
        assert_eq!(scoreboard.combo(), 1);

        let second = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(second.combo_bonus, 50);
        assert_eq!(
            second.notification,
            Some(ClearNotification::Combo {
                streak: 1,
                points: 50
            })
        );
        assert_eq!(scoreboard.combo(), 2);

        let third = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(third.combo_bonus, 100);
        assert_eq!(scoreboard.combo(), 3);

        scoreboard.score_settle(&board, &[], &mut prefs);
        assert_eq!(scoreboard.combo(), 0);

        let restarted = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(restarted.combo_bonus, 0);
        assert_eq!(scoreboard.combo(), 1);
    }

    #[test]
    fn test_color_match_notification() {
        let mut board = Board::new();
        fill_row(&mut board, 19, [color(PieceKind::Z); COLS]);
        board.set_cell(0, 18, color(PieceKind::L));
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();

        let result = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(result.color_bonus, 1000);
        assert_eq!(result.total(), 1100);
        assert_eq!(
            result.notification,
            Some(ClearNotification::ColorMatch { points: 1000 })
        );
    }

    #[test]
    fn test_level_up_uses_previous_level_for_points() {
        let mut board = Board::new();
        for y in 16..20 {
            fill_row(&mut board, y, mixed_row());
        }
        board.set_cell(0, 15, color(PieceKind::L));
        let rows = [16, 17, 18, 19];
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();

        scoreboard.score_settle(&board, &rows, &mut prefs);
        scoreboard.score_settle(&board, &[], &mut prefs);
        scoreboard.score_settle(&board, &rows, &mut prefs);
        scoreboard.score_settle(&board, &[], &mut prefs);
        assert_eq!(scoreboard.lines(), 8);
        assert_eq!(scoreboard.level(), 1);

        let result = scoreboard.score_settle(&board, &rows, &mut prefs);
        assert_eq!(result.base_points, 800);
        assert_eq!(result.level_up, Some(2));
        assert_eq!(scoreboard.level(), 2);
        assert_eq!(scoreboard.drop_interval(), Duration::from_millis(900));
        assert_eq!(scoreboard.line_clear_counter(), &[2, 0, 0, 0, 3]);
        assert_eq!(scoreboard.settled_pieces(), 5);

        let next = scoreboard.score_settle(&board, &[19], &mut prefs);
        assert_eq!(next.base_points, 200);
        assert_eq!(next.combo_bonus, 50 * 2);
        assert_eq!(next.level_up, None);
    }

    #[test]
    fn test_high_score_tracks_score_immediately() {
        let mut scoreboard = Scoreboard::new(SessionConfig::default());
        let mut prefs = Preferences::in_memory();
        prefs.record_high_score(50);

        scoreboard.award_hard_drop(10, &mut prefs);
        assert_eq!(scoreboard.score(), 20);
        assert_eq!(prefs.high_score(), 50);

        scoreboard.award_hard_drop(20, &mut prefs);
        assert_eq!(scoreboard.score(), 60);
        assert_eq!(prefs.high_score(), 60);
    }
}
