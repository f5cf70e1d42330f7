use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;
use crate::game::{Board, Player, COLUMNS, INAROW, ROWS};

/// Search depth sent to the service when none is configured.
pub const DEFAULT_DEPTH: u32 = 3;

/// A move request: a snapshot of the board at decision time plus the rule
/// parameters the service needs. The board is copied, never shared, so an
/// in-flight request cannot observe local mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveRequest {
    /// Flat row-major cells: 0 = empty, 1 = Player 1, 2 = Player 2.
    pub board: Vec<u8>,
    /// The acting player's mark (1 or 2).
    pub mark: u8,
    pub rows: usize,
    pub columns: usize,
    pub inarow: usize,
    pub depth: u32,
}

impl MoveRequest {
    pub fn new(board: &Board, player: Player, depth: u32) -> Self {
        MoveRequest {
            board: board.marks(),
            mark: player.mark(),
            rows: ROWS,
            columns: COLUMNS,
            inarow: INAROW,
            depth,
        }
    }
}

/// The service's answer. `column` is present on success; `error` carries the
/// service's message otherwise.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveResponse {
    pub status: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl MoveResponse {
    /// A successful response naming `column`.
    pub fn success(column: usize) -> Self {
        MoveResponse {
            status: "success".to_string(),
            column: Some(column as i64),
            error: None,
        }
    }

    /// Extract the chosen column from a well-formed success response.
    pub(crate) fn success_column(&self) -> Result<usize, AiError> {
        if self.status != "success" {
            let reason = match &self.error {
                Some(message) => format!("status {:?}: {message}", self.status),
                None => format!("status {:?}", self.status),
            };
            return Err(AiError::Protocol { reason });
        }
        match self.column {
            Some(column) if column >= 0 => Ok(column as usize),
            Some(column) => Err(AiError::Protocol {
                reason: format!("negative column {column}"),
            }),
            None => Err(AiError::Protocol {
                reason: "success response without a column".to_string(),
            }),
        }
    }
}

/// An external agent that selects a column for a given board.
#[async_trait]
pub trait MoveProvider: Send + Sync {
    /// Ask the provider for a move. Implementations map every transport and
    /// protocol failure into [`AiError`]; they never apply moves themselves.
    async fn request_move(&self, request: &MoveRequest) -> Result<MoveResponse, AiError>;

    /// Availability probe. Side channel for surrounding tooling, not part of
    /// the game logic.
    async fn is_available(&self) -> bool {
        true
    }
}
