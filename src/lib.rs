use wasm_bindgen::prelude::*;

pub mod ai;
pub mod arena;
pub mod board;
pub mod error;
pub mod game;
pub mod state;
pub mod tournament;
pub mod types;
pub mod wasm;

pub use ai::{SearchResult, Searcher, best_action};
pub use error::GameError;
pub use state::{GameSetup, GameState};
pub use types::{Action, Cell, Player, Position, TargetingMode};

#[wasm_bindgen]
pub fn wasm_ready() -> bool {
    true
}
