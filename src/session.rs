//! Turn orchestration: the per-game session state machine and the explicit
//! two-phase remote-move flow.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::ai::{MoveProvider, MoveRequest, MoveResponse};
use crate::error::{AiError, GameError};
use crate::game::{Board, Player, WinLine, INAROW};

/// Who controls Player 2.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameMode {
    HumanVsHuman,
    HumanVsRemote,
}

impl GameMode {
    pub fn name(self) -> &'static str {
        match self {
            GameMode::HumanVsHuman => "Human vs Human",
            GameMode::HumanVsRemote => "Human vs AI",
        }
    }
}

/// The remote service always plays as Player 2; Player 1 is always local.
pub const REMOTE_PLAYER: Player = Player::Two;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionStatus {
    InProgress,
    Won(WinLine),
    Drawn,
}

/// One complete game: board, turn order, mode, and outcome. Sessions are
/// plain values owned by their caller; every operation reports its result
/// instead of touching shared state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GameSession {
    board: Board,
    current_player: Player,
    mode: GameMode,
    status: SessionStatus,
    awaiting_remote: bool,
}

impl GameSession {
    /// Fresh session: empty board, Player 1 to move.
    pub fn new(mode: GameMode) -> Self {
        debug!(mode = mode.name(), "starting session");
        GameSession {
            board: Board::new(),
            current_player: Player::One,
            mode,
            status: SessionStatus::InProgress,
            awaiting_remote: false,
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn current_player(&self) -> Player {
        self.current_player
    }

    pub fn mode(&self) -> GameMode {
        self.mode
    }

    pub fn status(&self) -> &SessionStatus {
        &self.status
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self.status, SessionStatus::InProgress)
    }

    /// True while a remote move request is outstanding. Front ends must not
    /// accept input while this is set; the session enforces it regardless.
    pub fn awaiting_remote(&self) -> bool {
        self.awaiting_remote
    }

    /// True iff the game is in progress and the remote side is to move.
    pub fn is_remote_turn(&self) -> bool {
        !self.is_terminal()
            && self.mode == GameMode::HumanVsRemote
            && self.current_player == REMOTE_PLAYER
    }

    /// The winning four, once the session is won.
    pub fn winning_cells(&self) -> Option<&[(usize, usize); INAROW]> {
        match &self.status {
            SessionStatus::Won(win) => Some(&win.cells),
            _ => None,
        }
    }

    /// Reset to an empty board, keeping the mode.
    pub fn start_new_game(&mut self) {
        info!(mode = self.mode.name(), "new game");
        self.board = Board::new();
        self.current_player = Player::One;
        self.status = SessionStatus::InProgress;
        self.awaiting_remote = false;
    }

    /// Switch modes. Only permitted before the first move or after the game
    /// ends; on success the session restarts in the new mode.
    pub fn set_mode(&mut self, mode: GameMode) -> Result<(), GameError> {
        if !self.is_terminal() && !self.board.is_empty() {
            return Err(GameError::ModeLocked);
        }
        self.mode = mode;
        self.start_new_game();
        Ok(())
    }

    /// A local move for the current player. Drops the piece, then runs the
    /// win check, the draw check, and the turn flip.
    pub fn submit_move(&mut self, column: usize) -> Result<&SessionStatus, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.awaiting_remote {
            return Err(GameError::MovePending);
        }
        if self.is_remote_turn() {
            return Err(GameError::RemoteTurn);
        }
        self.apply_drop(column)?;
        Ok(&self.status)
    }

    fn apply_drop(&mut self, column: usize) -> Result<(), GameError> {
        let player = self.current_player;
        let row = self.board.drop_piece(column, player)?;
        debug!(column, row, player = player.name(), "piece dropped");

        if let Some(win) = self.board.check_win() {
            info!(winner = win.player.name(), "game won");
            self.status = SessionStatus::Won(win);
        } else if self.board.is_full() {
            info!("game drawn");
            self.status = SessionStatus::Drawn;
        } else {
            self.current_player = player.other();
        }
        Ok(())
    }

    /// First half of a remote turn: mark the session as awaiting and return
    /// a board snapshot for the provider. While awaiting, every other
    /// mutation of the session is rejected.
    pub fn begin_remote_move(&mut self, depth: u32) -> Result<MoveRequest, GameError> {
        if self.is_terminal() {
            return Err(GameError::GameOver);
        }
        if self.awaiting_remote {
            return Err(GameError::MovePending);
        }
        if !self.is_remote_turn() {
            return Err(GameError::NotRemoteTurn);
        }
        self.awaiting_remote = true;
        debug!(depth, "remote move requested");
        Ok(MoveRequest::new(&self.board, self.current_player, depth))
    }

    /// Second half of a remote turn: validate the provider's answer and
    /// apply it like a local move. Any violation (non-success status,
    /// missing or unplayable column) applies nothing and leaves the turn
    /// with the remote player.
    pub fn resolve_remote_move(&mut self, response: &MoveResponse) -> Result<(), AiError> {
        if !self.awaiting_remote {
            return Err(GameError::NoPendingMove.into());
        }
        self.awaiting_remote = false;

        let column = response.success_column()?;
        if !self.board.is_valid_move(column) {
            warn!(column, "move service chose an unplayable column");
            return Err(AiError::IllegalColumn { column });
        }
        self.apply_drop(column)?;
        info!(column, "remote move applied");
        Ok(())
    }

    /// Clear the awaiting flag after a transport failure. The turn stays
    /// with the remote player.
    pub fn abort_remote_move(&mut self) {
        if self.awaiting_remote {
            debug!("remote move aborted");
        }
        self.awaiting_remote = false;
    }
}

/// Drive one full remote turn: snapshot the board, call the provider, apply
/// the answer. This is the only suspension point in the system; the
/// session's awaiting flag blocks reentry while the request is in flight.
/// On any failure no move is applied and the turn stays with the remote
/// player, so the caller can retry or surface the error.
pub async fn play_remote_turn(
    session: &mut GameSession,
    provider: &dyn MoveProvider,
    depth: u32,
) -> Result<(), AiError> {
    let request = session.begin_remote_move(depth)?;
    match provider.request_move(&request).await {
        Ok(response) => session.resolve_remote_move(&response),
        Err(err) => {
            session.abort_remote_move();
            Err(err)
        }
    }
}

#[cfg(test)]
impl GameSession {
    /// Test-only: a session over a prepared board position.
    pub(crate) fn with_board(board: Board, current_player: Player, mode: GameMode) -> Self {
        GameSession {
            board,
            current_player,
            mode,
            status: SessionStatus::InProgress,
            awaiting_remote: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{COLUMNS, ROWS};

    #[test]
    fn test_initial_session() {
        let session = GameSession::new(GameMode::HumanVsHuman);
        assert_eq!(session.current_player(), Player::One);
        assert_eq!(*session.status(), SessionStatus::InProgress);
        assert!(!session.is_terminal());
        assert!(!session.awaiting_remote());
        assert!(session.board().is_empty());
    }

    #[test]
    fn test_turns_alternate() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);

        session.submit_move(3).unwrap();
        assert_eq!(session.board().get(5, 3), Some(Player::One));
        assert_eq!(session.current_player(), Player::Two);

        // The same column again now acts for Player 2, never Player 1 twice.
        session.submit_move(3).unwrap();
        assert_eq!(session.board().get(4, 3), Some(Player::Two));
        assert_eq!(session.current_player(), Player::One);
    }

    #[test]
    fn test_piece_count_matches_accepted_moves() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        for col in [0, 1, 2, 0, 1, 2, 4, 5] {
            session.submit_move(col).unwrap();
        }
        assert_eq!(session.board().piece_count(), 8);
    }

    #[test]
    fn test_horizontal_win_ends_session() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        // P1: 0,1,2,3 on the bottom row; P2 stacks on top.
        for col in [0, 0, 1, 1, 2, 2] {
            session.submit_move(col).unwrap();
        }
        session.submit_move(3).unwrap();

        match session.status() {
            SessionStatus::Won(win) => {
                assert_eq!(win.player, Player::One);
                assert_eq!(win.cells, [(5, 0), (5, 1), (5, 2), (5, 3)]);
            }
            other => panic!("expected a win, got {other:?}"),
        }
        assert!(session.is_terminal());
        assert_eq!(session.submit_move(4), Err(GameError::GameOver));
    }

    #[test]
    fn test_vertical_win_reports_cells() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        // P2 stacks column 0 while P1 scatters.
        for col in [1, 0, 2, 0, 1, 0, 4] {
            session.submit_move(col).unwrap();
        }
        session.submit_move(0).unwrap();

        match session.status() {
            SessionStatus::Won(win) => {
                assert_eq!(win.player, Player::Two);
                assert_eq!(win.cells, [(2, 0), (3, 0), (4, 0), (5, 0)]);
            }
            other => panic!("expected a win, got {other:?}"),
        }
    }

    #[test]
    fn test_rejected_moves_leave_state_unchanged() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        for _ in 0..ROWS {
            session.submit_move(0).unwrap();
        }
        let before = session.clone();

        assert_eq!(
            session.submit_move(0),
            Err(GameError::ColumnFull { column: 0 })
        );
        assert_eq!(
            session.submit_move(COLUMNS),
            Err(GameError::InvalidColumn { column: COLUMNS })
        );
        assert_eq!(session, before);
    }

    #[test]
    fn test_set_mode_guard() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        // Allowed before the first move.
        session.set_mode(GameMode::HumanVsRemote).unwrap();
        assert_eq!(session.mode(), GameMode::HumanVsRemote);

        session.submit_move(3).unwrap();
        assert_eq!(
            session.set_mode(GameMode::HumanVsHuman),
            Err(GameError::ModeLocked)
        );
        assert_eq!(session.mode(), GameMode::HumanVsRemote);
    }

    #[test]
    fn test_set_mode_after_terminal_restarts() {
        let mut session = GameSession::new(GameMode::HumanVsHuman);
        for col in [0, 0, 1, 1, 2, 2, 3] {
            session.submit_move(col).unwrap();
        }
        assert!(session.is_terminal());

        session.set_mode(GameMode::HumanVsRemote).unwrap();
        assert_eq!(session.mode(), GameMode::HumanVsRemote);
        assert!(session.board().is_empty());
        assert_eq!(session.current_player(), Player::One);
        assert_eq!(*session.status(), SessionStatus::InProgress);
    }

    #[test]
    fn test_submit_rejected_on_remote_turn() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        session.submit_move(3).unwrap();

        assert!(session.is_remote_turn());
        assert_eq!(session.submit_move(4), Err(GameError::RemoteTurn));
    }

    #[test]
    fn test_begin_remote_move_snapshots_board() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        session.submit_move(3).unwrap();

        let request = session.begin_remote_move(3).unwrap();
        assert!(session.awaiting_remote());
        assert_eq!(request.mark, REMOTE_PLAYER.mark());
        assert_eq!(request.board.len(), ROWS * COLUMNS);
        assert_eq!(request.board[5 * COLUMNS + 3], 1);

        // While awaiting, everything else is locked out.
        assert_eq!(session.begin_remote_move(3), Err(GameError::MovePending));
        assert_eq!(session.submit_move(4), Err(GameError::MovePending));
    }

    #[test]
    fn test_begin_remote_move_requires_remote_turn() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        assert_eq!(session.begin_remote_move(3), Err(GameError::NotRemoteTurn));

        let mut human = GameSession::new(GameMode::HumanVsHuman);
        human.submit_move(3).unwrap();
        assert_eq!(human.begin_remote_move(3), Err(GameError::NotRemoteTurn));
    }

    #[test]
    fn test_resolve_remote_move_applies_drop_and_flips() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        session.submit_move(3).unwrap();
        session.begin_remote_move(3).unwrap();

        session
            .resolve_remote_move(&MoveResponse::success(3))
            .unwrap();

        assert!(!session.awaiting_remote());
        assert_eq!(session.board().get(4, 3), Some(Player::Two));
        assert_eq!(session.current_player(), Player::One);
    }

    #[test]
    fn test_remote_full_column_rejected_without_state_change() {
        // Fill column 0 without a win: 1,2,1,2,1,2 bottom-up.
        let mut marks = [0u8; ROWS * COLUMNS];
        for row in 0..ROWS {
            marks[row * COLUMNS] = if (ROWS - row) % 2 == 1 { 1 } else { 2 };
        }
        let board = Board::from_marks(marks);
        let mut session = GameSession::with_board(board, REMOTE_PLAYER, GameMode::HumanVsRemote);

        session.begin_remote_move(3).unwrap();
        let err = session
            .resolve_remote_move(&MoveResponse::success(0))
            .unwrap_err();

        assert!(matches!(err, AiError::IllegalColumn { column: 0 }));
        assert_eq!(*session.status(), SessionStatus::InProgress);
        assert_eq!(session.board().piece_count(), ROWS);
        assert_eq!(session.current_player(), REMOTE_PLAYER);
        assert!(!session.awaiting_remote());
        // The remote turn can be retried.
        session.begin_remote_move(3).unwrap();
    }

    #[test]
    fn test_resolve_error_status_is_protocol_violation() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        session.submit_move(3).unwrap();
        session.begin_remote_move(3).unwrap();
        let before_count = session.board().piece_count();

        let response = MoveResponse {
            status: "error".to_string(),
            column: None,
            error: Some("boom".to_string()),
        };
        let err = session.resolve_remote_move(&response).unwrap_err();

        assert!(matches!(err, AiError::Protocol { .. }));
        assert_eq!(session.board().piece_count(), before_count);
        assert_eq!(session.current_player(), REMOTE_PLAYER);
    }

    #[test]
    fn test_resolve_without_begin_is_rejected() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        let err = session
            .resolve_remote_move(&MoveResponse::success(0))
            .unwrap_err();
        assert!(matches!(err, AiError::Game(GameError::NoPendingMove)));
    }

    #[test]
    fn test_abort_clears_awaiting() {
        let mut session = GameSession::new(GameMode::HumanVsRemote);
        session.submit_move(3).unwrap();
        session.begin_remote_move(3).unwrap();

        session.abort_remote_move();
        assert!(!session.awaiting_remote());
        assert_eq!(session.current_player(), REMOTE_PLAYER);
        session.begin_remote_move(3).unwrap();
    }

    #[test]
    fn test_full_top_row_without_run_is_a_draw() {
        // The no-run alternating pattern with the top of column 6 left open;
        // Player 2's final drop fills it without making four.
        let mut marks = [0u8; ROWS * COLUMNS];
        for row in 0..ROWS {
            for col in 0..COLUMNS {
                let bottom_half = row >= 3;
                let one = (col % 2 == 0) == bottom_half;
                marks[row * COLUMNS + col] = if one { 1 } else { 2 };
            }
        }
        marks[6] = 0;
        let board = Board::from_marks(marks);
        let mut session = GameSession::with_board(board, Player::Two, GameMode::HumanVsHuman);

        session.submit_move(6).unwrap();
        assert_eq!(*session.status(), SessionStatus::Drawn);
        assert!(session.is_terminal());
        assert_eq!(session.submit_move(0), Err(GameError::GameOver));
    }
}
