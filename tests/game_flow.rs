//! End-to-end game scenarios through the public API.

use tabula::engine::{Color, DrawReason, Game, GameSnapshot, GameStatus, Move, Piece, PieceType, Square};
use tabula::{MoveProvider, SearchEngine, SearchLimits, SearchProvider};

fn mv(s: &str) -> Move {
    Move::from_coords(s).unwrap()
}

fn play(game: &mut Game, moves: &[&str]) {
    for m in moves {
        game.apply_move(mv(m))
            .unwrap_or_else(|e| panic!("move {m} rejected: {e}"));
    }
}

#[test]
fn fools_mate_ends_the_game() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4"]);
    assert_eq!(game.apply_move(mv("d8h4")).unwrap(), GameStatus::Checkmate);
    assert!(game.status().is_game_over());
    assert_eq!(game.move_log(), "f2f3 e7e5 g2g4 Qd8h4 ");
}

#[test]
fn en_passant_must_be_taken_immediately() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "a7a6", "e4e5", "d7d5"]);

    // The capture is available right now...
    let mut fork = Game::from_snapshot(game.snapshot()).unwrap();
    assert!(fork.apply_move(mv("e5d6")).is_ok());

    // ...but one pair of quiet moves later the window has closed.
    play(&mut game, &["b1c3", "b8c6"]);
    assert!(game.apply_move(mv("e5d6")).is_err());
}

#[test]
fn kingside_castling_sequence() {
    let mut game = Game::new();
    play(
        &mut game,
        &["g1f3", "g8f6", "e2e3", "e7e6", "f1e2", "f8e7", "e1g1", "e8g8"],
    );
    let g1 = Square::from_algebraic("g1").unwrap();
    let f8 = Square::from_algebraic("f8").unwrap();
    assert_eq!(
        game.position().piece_at(g1),
        Some(Piece::new(Color::White, PieceType::King))
    );
    assert_eq!(
        game.position().piece_at(f8),
        Some(Piece::new(Color::Black, PieceType::Rook))
    );
    assert!(!game.position().castling().can_castle_kingside(Color::White));
    assert!(!game.position().castling().can_castle_queenside(Color::Black));
}

#[test]
fn castling_rights_do_not_come_back() {
    let mut game = Game::new();
    // Move the king out and back; the right is gone for good.
    play(
        &mut game,
        &["e2e3", "e7e6", "e1e2", "e8e7", "e2e1", "e7e8", "g1f3", "g8f6", "f1e2", "f8e7"],
    );
    assert!(game.apply_move(mv("e1g1")).is_err());
}

#[test]
fn threefold_repetition_is_detected() {
    let mut game = Game::new();
    play(
        &mut game,
        &[
            "b1c3", "b8c6", "c3b1", "c6b8", //
            "b1c3", "b8c6", "c3b1",
        ],
    );
    assert_eq!(
        game.apply_move(mv("c6b8")).unwrap(),
        GameStatus::Draw(DrawReason::ThreefoldRepetition)
    );
}

#[test]
fn fifty_move_rule_draw() {
    let mut game = Game::new();
    // 25 no-progress knight cycles reach 100 plies on the clock. The
    // repetition draw fires first, but the clock query stays exact.
    for _ in 0..25 {
        play(&mut game, &["g1f3", "g8f6", "f3g1", "f6g8"]);
    }
    assert!(game.is_fifty_move_draw());
    assert!(game.status().is_game_over());
}

#[test]
fn snapshot_survives_json_round_trip() {
    let mut game = Game::new();
    play(&mut game, &["e2e4", "c7c5", "g1f3", "d7d6", "e1e2"]);

    let json = serde_json::to_string(&game.snapshot()).unwrap();
    let snapshot: GameSnapshot = serde_json::from_str(&json).unwrap();
    let restored = Game::from_snapshot(snapshot).unwrap();

    assert_eq!(restored.id(), game.id());
    assert_eq!(restored.position().to_fen(), game.position().to_fen());
    assert_eq!(restored.move_log(), game.move_log());
    assert_eq!(*restored.status(), *game.status());
    // The restored game keeps playing.
    let mut restored = restored;
    assert!(restored.apply_move(mv("c5c4")).is_ok());
}

#[test]
fn search_self_play_stays_legal() {
    let mut game = Game::new();
    let provider = SearchProvider::new(SearchLimits::depth(2));

    for _ in 0..10 {
        if game.status().is_game_over() {
            break;
        }
        let Some(choice) = provider.choose_move(&game) else {
            break;
        };
        game.apply_move(choice)
            .unwrap_or_else(|e| panic!("provider suggested an illegal move: {e}"));
    }
    // Ten plies of depth-2 self-play never crash and always leave a
    // coherent status behind.
    assert!(!game.move_log().is_empty());
}

#[test]
fn both_kings_survive_every_move() {
    let mut game = Game::new();
    for m in ["e2e4", "e7e5", "d1h5", "b8c6", "h5e5", "c6e5", "g1f3", "e5f3", "g2f3"] {
        game.apply_move(mv(m)).unwrap();
        let mut kings = [0, 0];
        for row in game.board_array() {
            for cell in row.into_iter().flatten() {
                if cell.kind == PieceType::King {
                    kings[cell.color.index()] += 1;
                }
            }
        }
        assert_eq!(kings, [1, 1], "king count broken after {m}");
    }
}

#[test]
fn status_queries_are_idempotent() {
    let mut game = Game::new();
    play(&mut game, &["f2f3", "e7e5", "g2g4", "d8h4"]);
    assert_eq!(*game.status(), GameStatus::Checkmate);
    assert_eq!(*game.status(), GameStatus::Checkmate);
    assert_eq!(game.is_in_check(Color::White), game.is_in_check(Color::White));
    assert_eq!(game.repetition_count(), game.repetition_count());
}

#[test]
fn search_respects_the_board_not_the_log() {
    // The engine works from any mid-game position, not just fresh games.
    let pos = tabula::engine::Position::from_fen(
        "r1bqkbnr/pppp1ppp/2n5/4p3/4P3/5N2/PPPP1PPP/RNBQKB1R w KQkq - 2 3",
    )
    .unwrap();
    let result = SearchEngine::new(SearchLimits::depth(3))
        .choose_move(&pos)
        .unwrap();
    assert!(tabula::engine::rules::is_legal(&pos, result.best_move));
    assert_eq!(result.stats.depth_reached, 3);
}
