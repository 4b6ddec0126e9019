use std::time::Duration;

use arrayvec::ArrayVec;
use log::{debug, info};
use serde::Serialize;

use crate::{
    HoldError, MoveError, PieceCollisionError,
    core::{Board, Piece, ROWS},
};

use super::{
    config::SessionConfig,
    piece_buffer::{PieceBuffer, PieceSeed},
    piece_queue::PieceQueue,
    preferences::Preferences,
    scoring::{LineClearScore, Scoreboard},
    snapshot::SessionSnapshot,
};

/// Top-level state of a [`GameSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Main menu. Nothing moves until the game is started.
    Idle,
    /// 3, 2, 1, GO before the board comes alive. Input is ignored.
    Countdown,
    Playing,
    Paused,
    GameOver,
}

/// Current step of the pre-game countdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::Display)]
#[serde(rename_all = "snake_case")]
pub enum CountdownStep {
    #[display("3")]
    Three,
    #[display("2")]
    Two,
    #[display("1")]
    One,
    #[display("GO!")]
    Go,
}

impl CountdownStep {
    fn next(self) -> Option<Self> {
        match self {
            Self::Three => Some(Self::Two),
            Self::Two => Some(Self::One),
            Self::One => Some(Self::Go),
            Self::Go => None,
        }
    }
}

/// A player intent, applied between ticks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    MoveLeft,
    MoveRight,
    SoftDrop,
    Rotate,
    HardDrop,
    Hold,
    TogglePause,
    StartGame,
    MainMenu,
}

#[derive(Debug, Clone, Copy)]
struct Countdown {
    step: CountdownStep,
    remaining: Duration,
}

/// Completed rows waiting to be removed from the board.
///
/// The rows have already been scored. They stay on the board, flagged, until
/// the clear delay has elapsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineClear {
    rows: ArrayVec<usize, ROWS>,
    remaining: Duration,
}

impl LineClear {
    /// Flagged rows, top to bottom.
    #[must_use]
    pub fn rows(&self) -> &[usize] {
        &self.rows
    }

    /// Playing time left before the rows are removed.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.remaining
    }
}

/// One game of Brikx, from the main menu to game over and back.
///
/// The session owns every piece of game state: board, queue, active piece,
/// scoreboard and preferences. It is advanced by [`Self::tick`] and driven by
/// [`Self::apply_command`]; both take `&mut self`, so a front end only has to
/// call them in turn and render the result.
///
/// # Lifecycle
///
/// ```text
/// Idle --StartGame--> Countdown --(3, 2, 1, GO)--> Playing <--TogglePause--> Paused
///   ^                                                 |
///   |                                            spawn collides
///   +----------------MainMenu---------------------  GameOver --StartGame--> Countdown
/// ```
///
/// # Settling
///
/// A piece settles when gravity or a soft drop cannot move it down, or on a
/// hard drop. It is merged into the board and the settle is scored. Without
/// completed rows the next piece spawns right away. Otherwise the rows stay
/// flagged for the clear delay, with no active piece, then are removed and
/// the next piece spawns.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use brikx_engine::{Command, GameSession, Preferences, SessionConfig, SessionState};
///
/// let mut session = GameSession::new(SessionConfig::default(), Preferences::in_memory());
/// session.apply_command(Command::StartGame);
/// assert!(session.state().is_countdown());
///
/// for _ in 0..4 {
///     session.tick(Duration::from_secs(1));
/// }
/// assert_eq!(session.state(), SessionState::Playing);
/// assert!(session.active_piece().is_some());
///
/// session.apply_command(Command::HardDrop);
/// assert!(session.score() > 0);
/// ```
#[derive(Debug)]
pub struct GameSession {
    config: SessionConfig,
    fixed_seed: Option<PieceSeed>,
    seed: PieceSeed,
    board: Board,
    queue: PieceQueue,
    active: Option<Piece>,
    scoreboard: Scoreboard,
    preferences: Preferences,
    state: SessionState,
    countdown: Option<Countdown>,
    line_clear: Option<LineClear>,
    last_clear: Option<LineClearScore>,
    drop_counter: Duration,
    play_time: Duration,
}

impl GameSession {
    /// Creates an idle session. Every game draws a fresh random seed.
    #[must_use]
    pub fn new(config: SessionConfig, preferences: Preferences) -> Self {
        Self::build(config, preferences, None)
    }

    /// Creates an idle session whose games all use `seed`.
    #[must_use]
    pub fn with_seed(config: SessionConfig, preferences: Preferences, seed: PieceSeed) -> Self {
        Self::build(config, preferences, Some(seed))
    }

    fn build(config: SessionConfig, preferences: Preferences, fixed_seed: Option<PieceSeed>) -> Self {
        let config = config.sanitized();
        let seed = fixed_seed.unwrap_or_else(rand::random);
        Self {
            config,
            fixed_seed,
            seed,
            board: Board::new(),
            queue: PieceQueue::new(PieceBuffer::with_seed(seed), config.lookahead),
            active: None,
            scoreboard: Scoreboard::new(config),
            preferences,
            state: SessionState::Idle,
            countdown: None,
            line_clear: None,
            last_clear: None,
            drop_counter: Duration::ZERO,
            play_time: Duration::ZERO,
        }
    }

    /// Puts every piece of game state back to its creation-time value.
    ///
    /// The session state itself is left to the caller.
    fn reset(&mut self) {
        self.seed = self.fixed_seed.unwrap_or_else(rand::random);
        self.board = Board::new();
        self.queue = PieceQueue::new(PieceBuffer::with_seed(self.seed), self.config.lookahead);
        self.active = None;
        self.scoreboard = Scoreboard::new(self.config);
        self.countdown = None;
        self.line_clear = None;
        self.last_clear = None;
        self.drop_counter = Duration::ZERO;
        self.play_time = Duration::ZERO;
    }

    fn set_state(&mut self, state: SessionState) {
        if self.state != state {
            info!("session state: {:?} -> {state:?}", self.state);
            self.state = state;
        }
    }

    #[must_use]
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Seed of the current game's piece sequence.
    #[must_use]
    pub fn seed(&self) -> PieceSeed {
        self.seed
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Current countdown step, while counting down.
    #[must_use]
    pub fn countdown(&self) -> Option<CountdownStep> {
        self.countdown.map(|countdown| countdown.step)
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Mutable board access, for setting up positions.
    ///
    /// Changes are not validated against the active piece.
    pub fn board_mut(&mut self) -> &mut Board {
        &mut self.board
    }

    /// The falling piece. `None` outside a game and while rows are clearing.
    #[must_use]
    pub fn active_piece(&self) -> Option<&Piece> {
        self.active.as_ref()
    }

    /// Replaces the active piece, for setting up positions.
    ///
    /// Only allowed while a piece is falling.
    pub fn set_active_piece(&mut self, piece: Piece) -> Result<(), MoveError> {
        self.check_active()?;
        if self.board.is_colliding(&piece) {
            return Err(MoveError::PieceCollision(PieceCollisionError));
        }
        self.active = Some(piece);
        Ok(())
    }

    /// Where the active piece would land on a hard drop.
    #[must_use]
    pub fn ghost_piece(&self) -> Option<Piece> {
        let piece = self.active.as_ref()?;
        let distance = self.board.drop_distance(piece);
        Some(piece.clone().with_position(piece.x(), piece.y() + distance))
    }

    #[must_use]
    pub fn held_piece(&self) -> Option<&Piece> {
        self.queue.held_piece()
    }

    pub fn next_pieces(&self) -> impl Iterator<Item = &Piece> {
        self.queue.next_pieces()
    }

    #[must_use]
    pub fn can_hold(&self) -> bool {
        self.queue.can_hold()
    }

    #[must_use]
    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    #[must_use]
    pub fn score(&self) -> u64 {
        self.scoreboard.score()
    }

    #[must_use]
    pub fn high_score(&self) -> u64 {
        self.preferences.high_score()
    }

    #[must_use]
    pub fn level(&self) -> u32 {
        self.scoreboard.level()
    }

    #[must_use]
    pub fn lines(&self) -> u64 {
        self.scoreboard.lines()
    }

    #[must_use]
    pub fn combo(&self) -> u32 {
        self.scoreboard.combo()
    }

    /// Rows flagged for removal, if a line clear is in progress.
    #[must_use]
    pub fn line_clear(&self) -> Option<&LineClear> {
        self.line_clear.as_ref()
    }

    /// Flagged rows, or an empty slice.
    #[must_use]
    pub fn clearing_rows(&self) -> &[usize] {
        self.line_clear
            .as_ref()
            .map(LineClear::rows)
            .unwrap_or_default()
    }

    /// Score breakdown of the most recent line clear in this game.
    #[must_use]
    pub fn last_clear(&self) -> Option<&LineClearScore> {
        self.last_clear.as_ref()
    }

    #[must_use]
    pub fn preferences(&self) -> &Preferences {
        &self.preferences
    }

    pub fn preferences_mut(&mut self) -> &mut Preferences {
        &mut self.preferences
    }

    /// Time spent in the playing state during the current game.
    #[must_use]
    pub fn play_time(&self) -> Duration {
        self.play_time
    }

    /// Time accumulated towards the next gravity step.
    #[must_use]
    pub fn drop_counter(&self) -> Duration {
        self.drop_counter
    }

    #[must_use]
    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot::capture(self)
    }

    /// Advances the session by `elapsed` wall-clock time.
    ///
    /// - `Countdown`: steps through 3, 2, 1, GO, then starts a fresh game
    /// - `Playing`: runs the pending line clear, or gravity
    /// - Other states: nothing happens
    pub fn tick(&mut self, elapsed: Duration) {
        match self.state {
            SessionState::Countdown => self.tick_countdown(elapsed),
            SessionState::Playing => self.tick_playing(elapsed),
            SessionState::Idle | SessionState::Paused | SessionState::GameOver => {}
        }
    }

    fn tick_countdown(&mut self, mut elapsed: Duration) {
        let step_duration = self.config.countdown_step();
        while let Some(countdown) = &mut self.countdown {
            if elapsed < countdown.remaining {
                countdown.remaining -= elapsed;
                return;
            }
            elapsed -= countdown.remaining;
            match countdown.step.next() {
                Some(step) => {
                    debug!("countdown: {step}");
                    *countdown = Countdown {
                        step,
                        remaining: step_duration,
                    };
                }
                None => {
                    self.begin_game();
                    return;
                }
            }
        }
    }

    fn begin_game(&mut self) {
        self.reset();
        self.set_state(SessionState::Playing);
        info!("new game (seed {})", self.seed);
        self.spawn_next();
    }

    fn tick_playing(&mut self, elapsed: Duration) {
        self.play_time += elapsed;

        if let Some(line_clear) = &mut self.line_clear {
            line_clear.remaining = line_clear.remaining.saturating_sub(elapsed);
            if line_clear.remaining.is_zero() {
                self.finish_line_clear();
            }
            return;
        }

        self.drop_counter += elapsed;
        if self.drop_counter > self.scoreboard.drop_interval() {
            self.drop_counter = Duration::ZERO;
            if let Err(e) = self.move_down() {
                debug!("gravity step skipped: {e}");
            }
        }
    }

    /// Applies a player command.
    ///
    /// Returns whether the command had any effect. Commands that do not apply
    /// in the current state, and moves into a colliding position, are no-ops.
    pub fn apply_command(&mut self, command: Command) -> bool {
        match command {
            Command::MoveLeft => self.try_move_left().is_ok(),
            Command::MoveRight => self.try_move_right().is_ok(),
            Command::SoftDrop => self.soft_drop().is_ok(),
            Command::Rotate => self.try_rotate().is_ok(),
            Command::HardDrop => self.hard_drop().is_ok(),
            Command::Hold => self.try_hold().is_ok(),
            Command::TogglePause => self.toggle_pause(),
            Command::StartGame => self.start(),
            Command::MainMenu => self.return_to_menu(),
        }
    }

    fn check_active(&self) -> Result<(), MoveError> {
        if !self.state.is_playing() {
            return Err(MoveError::NotPlaying);
        }
        if self.active.is_none() {
            return Err(MoveError::NoActivePiece);
        }
        Ok(())
    }

    fn try_shift(&mut self, dx: i32, dy: i32) -> Result<(), MoveError> {
        self.check_active()?;
        let piece = self.active.as_mut().ok_or(MoveError::NoActivePiece)?;
        let (x, y) = (piece.x() + dx, piece.y() + dy);
        if self.board.collides(piece, x, y) {
            return Err(MoveError::PieceCollision(PieceCollisionError));
        }
        piece.set_position(x, y);
        Ok(())
    }

    pub fn try_move_left(&mut self) -> Result<(), MoveError> {
        self.try_shift(-1, 0)
    }

    pub fn try_move_right(&mut self) -> Result<(), MoveError> {
        self.try_shift(1, 0)
    }

    /// Rotates the active piece clockwise in place. There are no wall kicks.
    pub fn try_rotate(&mut self) -> Result<(), MoveError> {
        self.check_active()?;
        let piece = self.active.as_mut().ok_or(MoveError::NoActivePiece)?;
        let rotated = piece.rotated();
        if self.board.is_colliding(&rotated) {
            return Err(MoveError::PieceCollision(PieceCollisionError));
        }
        *piece = rotated;
        Ok(())
    }

    /// Moves the active piece down one row, settling it if it cannot move.
    pub fn soft_drop(&mut self) -> Result<(), MoveError> {
        self.move_down()
    }

    fn move_down(&mut self) -> Result<(), MoveError> {
        match self.try_shift(0, 1) {
            Err(MoveError::PieceCollision(_)) => {
                self.settle();
                Ok(())
            }
            result => result,
        }
    }

    /// Drops the active piece as far as it goes and settles it.
    ///
    /// Awards two points per row dropped and returns the number of rows.
    pub fn hard_drop(&mut self) -> Result<u32, MoveError> {
        self.check_active()?;
        let piece = self.active.as_mut().ok_or(MoveError::NoActivePiece)?;
        let distance = self.board.drop_distance(piece);
        piece.set_position(piece.x(), piece.y() + distance);
        let rows = u32::try_from(distance).unwrap_or(0);
        self.scoreboard.award_hard_drop(rows, &mut self.preferences);
        self.settle();
        Ok(rows)
    }

    /// Swaps the active piece with the hold slot.
    ///
    /// Ends the game if the incoming piece collides at its spawn position.
    pub fn try_hold(&mut self) -> Result<(), HoldError> {
        if !self.state.is_playing() {
            return Err(HoldError::NotPlaying);
        }
        let active = self.active.as_mut().ok_or(HoldError::NoActivePiece)?;
        self.queue.hold(active)?;
        debug!("hold: {:?} now active", active.kind());
        if self.board.is_colliding(active) {
            self.game_over();
        }
        Ok(())
    }

    /// Switches between playing and paused. Returns whether the state changed.
    pub fn toggle_pause(&mut self) -> bool {
        match self.state {
            SessionState::Playing => self.set_state(SessionState::Paused),
            SessionState::Paused => self.set_state(SessionState::Playing),
            SessionState::Idle | SessionState::Countdown | SessionState::GameOver => {
                return false;
            }
        }
        true
    }

    /// Starts the countdown from the main menu or after a game over.
    pub fn start(&mut self) -> bool {
        if !matches!(self.state, SessionState::Idle | SessionState::GameOver) {
            return false;
        }
        self.countdown = Some(Countdown {
            step: CountdownStep::Three,
            remaining: self.config.countdown_step(),
        });
        self.set_state(SessionState::Countdown);
        true
    }

    /// Abandons the current game and returns to the main menu.
    pub fn return_to_menu(&mut self) -> bool {
        if self.state.is_idle() {
            return false;
        }
        self.reset();
        self.set_state(SessionState::Idle);
        true
    }

    fn settle(&mut self) {
        let Some(piece) = self.active.take() else {
            return;
        };
        self.board.merge(&piece);
        let rows = self.board.completed_rows();
        let result = self
            .scoreboard
            .score_settle(&self.board, &rows, &mut self.preferences);
        debug!(
            "settled {:?} at ({}, {}), {} line(s)",
            piece.kind(),
            piece.x(),
            piece.y(),
            rows.len()
        );

        if rows.is_empty() {
            self.spawn_next();
            return;
        }

        if result.is_perfect_clear() {
            info!("perfect clear");
        }
        debug!("clearing rows {rows:?} for {} points", result.total());
        self.last_clear = Some(result);
        self.line_clear = Some(LineClear {
            rows,
            remaining: self.config.clear_delay(),
        });
        if self.config.clear_delay().is_zero() {
            self.finish_line_clear();
        }
    }

    fn finish_line_clear(&mut self) {
        if let Some(line_clear) = self.line_clear.take() {
            self.board.clear_rows(&line_clear.rows);
        }
        self.spawn_next();
    }

    fn spawn_next(&mut self) {
        let piece = self.queue.spawn_next();
        debug!("spawn {:?} at ({}, {})", piece.kind(), piece.x(), piece.y());
        let collides = self.board.is_colliding(&piece);
        self.active = Some(piece);
        if collides {
            self.game_over();
        }
    }

    fn game_over(&mut self) {
        info!(
            "game over: score {}, lines {}, level {}",
            self.score(),
            self.lines(),
            self.level()
        );
        self.set_state(SessionState::GameOver);
    }
}
