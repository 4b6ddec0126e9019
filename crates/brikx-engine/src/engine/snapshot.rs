use serde::Serialize;

use crate::core::{Cell, Piece, PieceColor, PieceKind};

use super::{
    scoring::LineClearScore,
    session::{CountdownStep, GameSession, SessionState},
};

/// A piece as seen by a renderer: kind, color and absolute cell positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PieceSnapshot {
    pub kind: PieceKind,
    pub color: PieceColor,
    pub x: i32,
    pub y: i32,
    /// Board coordinates of the occupied cells.
    pub cells: Vec<(i32, i32)>,
}

impl From<&Piece> for PieceSnapshot {
    fn from(piece: &Piece) -> Self {
        Self {
            kind: piece.kind(),
            color: piece.color(),
            x: piece.x(),
            y: piece.y(),
            cells: piece.occupied_positions().collect(),
        }
    }
}

/// Read-only copy of everything a front end needs to draw a session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub countdown: Option<CountdownStep>,
    /// Board cells, top row first.
    pub board: Vec<Vec<Cell>>,
    pub active: Option<PieceSnapshot>,
    pub ghost: Option<PieceSnapshot>,
    pub held: Option<PieceSnapshot>,
    pub next: Vec<PieceSnapshot>,
    pub can_hold: bool,
    pub clearing_rows: Vec<usize>,
    pub score: u64,
    pub high_score: u64,
    pub level: u32,
    pub lines: u64,
    pub combo: u32,
    pub last_clear: Option<LineClearScore>,
    pub player_name: String,
}

impl SessionSnapshot {
    #[must_use]
    pub fn capture(session: &GameSession) -> Self {
        Self {
            state: session.state(),
            countdown: session.countdown(),
            board: session.board().rows().map(|row| row.to_vec()).collect(),
            active: session.active_piece().map(PieceSnapshot::from),
            ghost: session.ghost_piece().as_ref().map(PieceSnapshot::from),
            held: session.held_piece().map(PieceSnapshot::from),
            next: session.next_pieces().map(PieceSnapshot::from).collect(),
            can_hold: session.can_hold(),
            clearing_rows: session.clearing_rows().to_vec(),
            score: session.score(),
            high_score: session.high_score(),
            level: session.level(),
            lines: session.lines(),
            combo: session.combo(),
            last_clear: session.last_clear().copied(),
            player_name: session.preferences().player_name().to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::{
        core::{COLS, ROWS},
        engine::{Command, PieceSeed, Preferences, SessionConfig},
    };

    fn playing() -> GameSession {
        let mut session = GameSession::with_seed(
            SessionConfig::default(),
            Preferences::in_memory(),
            PieceSeed::from_bytes([11; 16]),
        );
        session.apply_command(Command::StartGame);
        session.tick(Duration::from_secs(4));
        session
    }

    #[test]
    fn test_idle_snapshot() {
        let session = GameSession::new(SessionConfig::default(), Preferences::in_memory());
        let snapshot = session.snapshot();

        assert_eq!(snapshot.state, SessionState::Idle);
        assert_eq!(snapshot.board.len(), ROWS);
        assert!(snapshot.board.iter().all(|row| row.len() == COLS));
        assert!(snapshot.active.is_none());
        assert!(snapshot.ghost.is_none());
        assert_eq!(snapshot.player_name, "Player");
    }

    #[test]
    fn test_playing_snapshot_has_active_and_ghost() {
        let session = playing();
        let snapshot = session.snapshot();

        let active = snapshot.active.unwrap();
        let ghost = snapshot.ghost.unwrap();
        assert_eq!(active.kind, ghost.kind);
        assert_eq!(active.x, ghost.x);
        assert!(ghost.y > active.y);
        assert_eq!(active.cells.len(), 4);
        assert_eq!(snapshot.next.len(), 5);
        assert!(snapshot.can_hold);
    }

    #[test]
    fn test_snapshot_serializes_to_json() {
        let session = playing();
        let value = serde_json::to_value(session.snapshot()).unwrap();

        assert_eq!(value["state"], "playing");
        assert_eq!(value["score"], 0);
        assert_eq!(value["board"][0][0], serde_json::Value::Null);
        let color = value["active"]["color"].as_str().unwrap();
        assert!(color.starts_with('#') && color.len() == 7);
    }
}
