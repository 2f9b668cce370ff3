mod common;

use common::{board_file, stored_harness};
use parkchase::board::{Direction, Piece, Position};
use parkchase::engine::Outcome;
use parkchase::errors::{DataAction, DataCause, GameError};

const PARK: &str = "7 3\nY 0 0\nP 0 2\nT 1 1\nR 3 5 d\nP 4 0\nP 6 6\n";

#[tokio::test]
async fn save_then_load_carries_remaining_goal() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "park.txt", PARK);
    let h = stored_harness();
    h.engine.load(&start).await.unwrap();
    h.engine.step(Direction::Right).unwrap();
    h.engine.step(Direction::Right).unwrap();
    assert_eq!(h.engine.collected_baskets(), 1);

    let slot = tmp.path().join("saves").join("slot1.txt");
    h.engine.save(&slot).await.unwrap();
    let before = h.engine.board_snapshot().unwrap();

    let resumed = stored_harness();
    resumed.engine.load(&slot).await.unwrap();
    assert_eq!(resumed.engine.basket_goal(), 2);
    assert_eq!(resumed.engine.collected_baskets(), 0);
    let after = resumed.engine.board_snapshot().unwrap();
    assert_eq!(after.render(), before.render());
    assert_eq!(after.cells(), before.cells());
    assert_eq!(resumed.engine.player_position(), Some(Position::new(0, 2)));
}

#[tokio::test]
async fn saved_file_is_row_major_text() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "park.txt", PARK);
    let h = stored_harness();
    h.engine.load(&start).await.unwrap();
    let out = tmp.path().join("out.txt");
    h.engine.save(&out).await.unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text, PARK);
}

#[tokio::test]
async fn malformed_file_keeps_previous_board() {
    let tmp = tempfile::tempdir().unwrap();
    let good = board_file(tmp.path(), "good.txt", PARK);
    let h = stored_harness();
    h.engine.load(&good).await.unwrap();
    h.engine.step(Direction::Right).unwrap();
    h.engine.step(Direction::Right).unwrap();
    let snapshot = h.engine.board_snapshot().unwrap();

    let cases = [
        ("empty.txt", ""),
        ("short_header.txt", "7\nY 0 0\n"),
        ("bad_coord.txt", "7 3\nY 0 zero\n"),
        ("bad_tag.txt", "7 3\nY 0 0\nQ 1 1\n"),
        ("bad_axis.txt", "7 3\nY 0 0\nR 2 2 x\n"),
        ("zero_size.txt", "0 3\n"),
        ("outside.txt", "7 3\nY 0 0\nT 7 7\n"),
    ];
    for (name, content) in cases {
        let path = board_file(tmp.path(), name, content);
        let err = h.engine.load(&path).await.unwrap_err();
        match err {
            GameError::BoardData(e) => {
                assert_eq!(e.action, DataAction::Load, "{name}");
                assert_eq!(e.path.as_deref(), Some(path.as_path()), "{name}");
            }
            other => panic!("{name}: expected board data error, got {other:?}"),
        }
        let current = h.engine.board_snapshot().unwrap();
        assert_eq!(current.render(), snapshot.render(), "{name}");
        assert_eq!(h.engine.collected_baskets(), 1, "{name}");
    }
}

#[tokio::test]
async fn missing_file_is_board_data_error() {
    let tmp = tempfile::tempdir().unwrap();
    let h = stored_harness();
    let err = h.engine.load(tmp.path().join("nope.txt")).await.unwrap_err();
    assert!(matches!(
        err,
        GameError::BoardData(ref e) if matches!(e.cause, DataCause::Io(_))
    ));
    assert!(h.engine.board_snapshot().is_none());
}

#[tokio::test]
async fn covered_basket_is_not_written() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "cover.txt", "5 1\nY 0 0\nP 3 2\nR 4 2 u\n");
    let h = stored_harness();
    h.engine.new_game(&start).await.unwrap();
    assert!(h.guards.fire());
    assert!(matches!(h.engine.piece_at(3, 2), Some(Piece::Guard(_))));
    h.engine.stop_timers();

    let out = tmp.path().join("covered.txt");
    h.engine.save(&out).await.unwrap();
    let text = std::fs::read_to_string(&out).unwrap();
    assert_eq!(text, "5 1\nY 0 0\nR 3 2 u\n");
}

#[tokio::test]
async fn new_game_resets_session_and_starts_timers() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "quick.txt", "4 1\nY 0 0\nP 0 1\n");
    let h = stored_harness();
    h.engine.new_game(&start).await.unwrap();
    assert!(h.engine.is_running());
    h.clock.fire();
    h.engine.step(Direction::Right).unwrap();
    assert_eq!(h.engine.outcome(), Some(Outcome::Won));
    assert!(!h.engine.is_running());

    h.engine.new_game(&start).await.unwrap();
    assert!(!h.engine.is_game_over());
    assert!(h.engine.is_running());
    assert_eq!(h.engine.elapsed_seconds(), 0);
    assert_eq!(h.engine.collected_baskets(), 0);
    assert_eq!(h.engine.player_position(), Some(Position::new(0, 0)));
}

#[tokio::test]
async fn failed_new_game_keeps_current_game_running() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "quick.txt", "4 1\nY 0 0\nP 0 1\n");
    let h = stored_harness();
    h.engine.new_game(&start).await.unwrap();
    h.clock.fire();
    tokio_test::assert_err!(h.engine.new_game(tmp.path().join("missing.txt")).await);
    assert!(h.engine.is_running());
    assert_eq!(h.engine.board_size(), 4);
    assert_eq!(h.engine.elapsed_seconds(), 1);

    h.clock.fire();
    assert_eq!(h.engine.elapsed_seconds(), 2);
}

#[tokio::test]
async fn failed_new_game_while_paused_stays_paused() {
    let tmp = tempfile::tempdir().unwrap();
    let start = board_file(tmp.path(), "quick.txt", "4 1\nY 0 0\nP 0 1\n");
    let h = stored_harness();
    h.engine.new_game(&start).await.unwrap();
    h.engine.pause();
    tokio_test::assert_err!(h.engine.new_game(tmp.path().join("missing.txt")).await);
    assert!(!h.engine.is_running());
    assert_eq!(h.engine.board_size(), 4);
}
