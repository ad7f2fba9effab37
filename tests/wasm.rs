#![cfg(target_arch = "wasm32")]

use isolation_blackout::wasm::WasmGame;
use wasm_bindgen_test::*;

#[wasm_bindgen_test]
fn rejected_move_reports_the_game_error() {
    let mut game = WasmGame::new(false, true, Some(1)).unwrap();

    let err = game.select_move(7, 7).unwrap_err();

    let message = err.as_string().unwrap();
    assert!(message.contains("not an adjacent empty cell"), "{message}");
}

#[wasm_bindgen_test]
fn ai_move_outside_its_turn_is_an_error() {
    let mut game = WasmGame::new(false, true, Some(1)).unwrap();

    let err = game.ai_move().unwrap_err();

    assert_eq!(err.as_string().as_deref(), Some("it is not AI's turn"));
}

#[wasm_bindgen_test]
fn ai_replies_after_the_human_turn() {
    let mut game = WasmGame::new(false, true, Some(1)).unwrap();
    game.select_move(3, 1).unwrap();
    game.toggle_blackout(4, 6).unwrap();
    assert!(game.toggle_blackout(5, 6).unwrap());

    let action = game.ai_move().unwrap();

    assert!(action.is_object());
    assert!(!game.is_ai_turn());
    assert!(game.state().unwrap().is_object());
}
