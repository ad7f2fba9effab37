use isolation_blackout::arena::{EngineConfig, MatchConfig, play_game};
use isolation_blackout::game::MinimaxSelector;
use isolation_blackout::types::Outcome;
use isolation_blackout::{
    Cell, GameSetup, GameState, Player, Position, Searcher, TargetingMode, best_action,
};

fn setup(p1: (u8, u8), p2: (u8, u8), targeting: TargetingMode) -> GameSetup {
    GameSetup {
        player1_start: Position::new(p1.0, p1.1),
        player2_start: Position::new(p2.0, p2.1),
        first_player: Player::Player1,
        targeting,
    }
}

#[test]
fn opponent_already_stuck_is_terminal_with_correct_sign() {
    let mut state =
        GameState::from_setup(&setup((0, 0), (4, 4), TargetingMode::Adjacent)).unwrap();
    state.apply_blackouts(&[
        Position::new(0, 1),
        Position::new(1, 0),
        Position::new(1, 1),
    ]);

    state.current_player = Player::Player1;
    assert!(state.is_terminal());
    assert_eq!(state.evaluate(), f32::INFINITY);
    assert_eq!(best_action(&state, Player::Player1, 2), None);

    state.current_player = Player::Player2;
    assert!(!state.is_terminal());
    assert_eq!(state.evaluate(), 8.0);
}

#[test]
fn extended_targeting_blacks_out_cells_two_squares_away() {
    // Player1 hemmed into a corner pocket reachable only at distance two.
    let mut state =
        GameState::from_setup(&setup((0, 0), (7, 7), TargetingMode::Extended)).unwrap();
    state.apply_blackouts(&[Position::new(0, 1), Position::new(1, 0)]);

    let action = best_action(&state, Player::Player2, 1).unwrap();

    let mut after = state;
    after.apply_move(Player::Player2, action.destination).unwrap();
    let pool = after.extended_reach(Player::Player1);
    assert_eq!(action.blackouts.len(), 2);
    assert!(action.blackouts.iter().all(|c| pool.contains(c)));
}

#[test]
fn deep_search_on_open_board_converges_to_a_win() {
    // Player1 is boxed in at the edge with two exits; depth 3 sees the trap.
    let mut state =
        GameState::from_setup(&setup((0, 3), (3, 3), TargetingMode::Adjacent)).unwrap();
    state.apply_blackouts(&[
        Position::new(0, 2),
        Position::new(0, 4),
        Position::new(1, 2),
    ]);

    let result = Searcher::new().search(&state, Player::Player2, 3);

    assert_eq!(result.score, f32::INFINITY);
    let action = result.action.unwrap();
    let mut after = state;
    after.apply_move(Player::Player2, action.destination).unwrap();
    after.apply_blackouts(&action.blackouts);
    after.current_player = Player::Player1;
    assert!(after.is_terminal());
    assert_eq!(after.winner(), Some(Player::Player2));
}

#[test]
fn committing_actions_keeps_pawns_off_blacked_cells() {
    let mut state = GameState::new(Player::Player1, TargetingMode::Adjacent);

    for _ in 0..10 {
        if state.is_terminal() {
            break;
        }
        let player = state.current_player;
        let action = best_action(&state, player, 1).unwrap();
        state.apply_move(player, action.destination).unwrap();
        state.apply_blackouts(&action.blackouts);

        for p in [Player::Player1, Player::Player2] {
            let pawn = state.pawn_position(p).unwrap();
            assert_eq!(state.cell(pawn).unwrap(), Cell::Owned(p));
        }
        state.current_player = player.opponent();
    }
}

#[test]
fn full_game_between_searchers_produces_a_result() {
    let p1 = EngineConfig {
        name: "shallow".to_string(),
        depth: 1,
        start: Some(Position::new(2, 2)),
    };
    let p2 = EngineConfig {
        name: "deeper".to_string(),
        depth: 2,
        start: Some(Position::new(5, 5)),
    };

    let record = play_game(&p1, &p2, &MatchConfig::default(), &MinimaxSelector).unwrap();

    assert!(matches!(record.outcome, Outcome::Winner(_)));
    assert_eq!(record.move_count as usize, record.turns.len());
    let json = serde_json::to_string(&record).unwrap();
    assert!(json.contains("\"outcome\""));
}
