use wasm_bindgen::prelude::*;

use crate::error::GameError;
use crate::game::{DEFAULT_DEPTH, GameInstance, MinimaxSelector};
use crate::state::GameSetup;
use crate::types::{Player, TargetingMode};

/// Browser handle over a `GameInstance`: a human plays Player1, the search
/// plays Player2 unless `vs_ai` is false.
#[wasm_bindgen]
pub struct WasmGame {
    inner: GameInstance,
}

#[wasm_bindgen]
impl WasmGame {
    #[wasm_bindgen(constructor)]
    pub fn new(extended: bool, vs_ai: bool, depth: Option<u8>) -> Result<WasmGame, JsValue> {
        let setup = GameSetup {
            targeting: if extended {
                TargetingMode::Extended
            } else {
                TargetingMode::Adjacent
            },
            ..GameSetup::default()
        };
        let depth = depth.unwrap_or(DEFAULT_DEPTH);
        let inner = if vs_ai {
            GameInstance::new_vs_ai(&setup, depth)
        } else {
            GameInstance::new(
                &setup,
                None,
                [depth, depth],
                Box::new(MinimaxSelector),
            )
        }
        .map_err(to_js)?;
        Ok(Self { inner })
    }

    pub fn state(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.inner.to_game_state()).map_err(JsValue::from)
    }

    pub fn is_ai_turn(&self) -> bool {
        self.inner.is_ai_turn()
    }

    pub fn select_move(&mut self, row: u8, col: u8) -> Result<(), JsValue> {
        self.inner.select_move(row, col).map_err(to_js)
    }

    pub fn toggle_blackout(&mut self, row: u8, col: u8) -> Result<bool, JsValue> {
        self.inner.toggle_blackout(row, col).map_err(to_js)
    }

    pub fn finish_turn(&mut self) -> Result<(), JsValue> {
        self.inner.finish_turn().map_err(to_js)
    }

    /// Plays the AI turn and returns the action taken, or `null`.
    pub fn ai_move(&mut self) -> Result<JsValue, JsValue> {
        let action = self.inner.do_ai_move().map_err(to_js)?;
        serde_wasm_bindgen::to_value(&action).map_err(JsValue::from)
    }

    /// 0 while the game runs, otherwise the winner (1 or 2).
    pub fn winner(&self) -> u8 {
        self.inner.winner().map_or(0, Player::as_u8)
    }
}

fn to_js(err: GameError) -> JsValue {
    JsValue::from_str(&err.to_string())
}
