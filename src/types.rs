use serde::{Deserialize, Serialize};

use crate::board::BOARD_SIZE;

/// One of the two sides. `Player2` is the maximizing side of the search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Player {
    Player1,
    Player2,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Self::Player1 => Self::Player2,
            Self::Player2 => Self::Player1,
        }
    }

    /// Wire value used by front-ends: 1 or 2.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Player1 => 1,
            Self::Player2 => 2,
        }
    }
}

/// Content of a single board cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Cell {
    Empty,
    Owned(Player),
    BlackedOut,
}

impl Cell {
    /// Converts to the front-end encoding: 0=empty, 1/2=pawn, 3=blacked out.
    pub fn as_u8(self) -> u8 {
        match self {
            Self::Empty => 0,
            Self::Owned(player) => player.as_u8(),
            Self::BlackedOut => 3,
        }
    }
}

/// Which of the opponent's cells may be blacked out after a move.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TargetingMode {
    /// Empty cells at distance 1 from the opponent's pawn.
    #[default]
    Adjacent,
    /// Empty cells at distance 1 or 2 from the opponent's pawn.
    Extended,
}

/// A board coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: u8,
    pub col: u8,
}

impl Position {
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    pub fn in_bounds(self) -> bool {
        (self.row as usize) < BOARD_SIZE && (self.col as usize) < BOARD_SIZE
    }
}

/// A full turn: where the pawn goes and which cells get blacked out afterwards.
///
/// `blackouts` holds two cells unless the opponent had fewer than two
/// candidates, in which case it holds all of them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    pub destination: Position,
    pub blackouts: Vec<Position>,
}

/// How a finished game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Winner(Player),
    Draw,
}

/// Public game state returned from WASM APIs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    /// Row-major cells in the `Cell::as_u8` encoding.
    pub board: Vec<u8>,
    pub current_player: u8,
    pub targeting: TargetingMode,
    /// Contract:
    /// - `"move"` while the current player still has to move the pawn.
    /// - `"blackout"` after the move, while blackout cells are being picked.
    pub phase: &'static str,
    pub legal_moves: Vec<Position>,
    pub selected_blackouts: Vec<Position>,
    pub is_game_over: bool,
    /// 0 while the game runs, otherwise the winning player.
    pub winner: u8,
}
