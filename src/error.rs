use crate::types::{Player, Position};

/// Errors raised by the game model when a caller breaks a rule.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum GameError {
    #[error("invalid placement for {player:?} at {position:?}: {reason}")]
    InvalidPlacement {
        player: Player,
        position: Position,
        reason: &'static str,
    },
    #[error("invalid move for {player:?} to {position:?}: {reason}")]
    InvalidMove {
        player: Player,
        position: Position,
        reason: &'static str,
    },
    #[error("position {0:?} is outside the board")]
    OutOfBounds(Position),
    #[error("{0}")]
    Session(&'static str),
}
