use chrono::{Duration, Utc};
use group_games_bot::database::{connection::DatabaseManager, models::GameSession};
use group_games_bot::games::{BingoPhase, BingoState, GameState, GameType, QuizState};
use std::collections::BTreeMap;
use tempfile::TempDir;

async fn create_test_db() -> (DatabaseManager, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    (db, temp_dir)
}

fn quiz_state(question_id: u32) -> GameState {
    GameState::Quiz(QuizState {
        question_id,
        question: format!("Question {question_id}?"),
        options: vec!["a".into(), "b".into(), "c".into(), "d".into()],
        correct_index: 1,
        category: "Test".into(),
        started_at: Utc::now(),
        started_by: Some(1),
    })
}

#[tokio::test]
async fn test_start_and_get_active_round_trips_state() {
    let (db, _tmp) = create_test_db().await;

    let token = GameSession::start(&db.pool, -100, &quiz_state(3), Duration::seconds(30))
        .await
        .expect("start");

    let game = GameSession::get_active(&db.pool, -100, GameType::Quiz)
        .await
        .expect("get_active")
        .expect("session missing");
    assert_eq!(game.token, token);
    match game.state {
        GameState::Quiz(state) => {
            assert_eq!(state.question_id, 3);
            assert_eq!(state.correct_index, 1);
        }
        other => panic!("unexpected state: {other:?}"),
    }
    assert!(game.deadline > game.started_at);
}

#[tokio::test]
async fn test_one_session_per_chat_and_game_type() {
    let (db, _tmp) = create_test_db().await;

    let first = GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("first start");
    let second = GameSession::start(&db.pool, -100, &quiz_state(2), Duration::seconds(30))
        .await
        .expect("second start");

    // Last write wins: one row, carrying the second round
    assert_ne!(first, second);
    let game = GameSession::get_active(&db.pool, -100, GameType::Quiz)
        .await
        .expect("get_active")
        .expect("session missing");
    assert_eq!(game.token, second);
    match game.state {
        GameState::Quiz(state) => assert_eq!(state.question_id, 2),
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_sessions_are_isolated_per_chat() {
    let (db, _tmp) = create_test_db().await;

    GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("start chat A");

    assert!(GameSession::get_active(&db.pool, -200, GameType::Quiz)
        .await
        .expect("get_active")
        .is_none());
}

#[tokio::test]
async fn test_end_is_idempotent() {
    let (db, _tmp) = create_test_db().await;

    GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("start");

    GameSession::end(&db.pool, -100, GameType::Quiz).await.expect("first end");
    GameSession::end(&db.pool, -100, GameType::Quiz).await.expect("second end");

    assert!(GameSession::get_active(&db.pool, -100, GameType::Quiz)
        .await
        .expect("get_active")
        .is_none());
}

#[tokio::test]
async fn test_stale_token_detection_after_rapid_restart() {
    let (db, _tmp) = create_test_db().await;

    // A timer holding the first token must see it no longer matches
    let first = GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("first start");
    let _second = GameSession::start(&db.pool, -100, &quiz_state(2), Duration::seconds(30))
        .await
        .expect("second start");

    let game = GameSession::get_active(&db.pool, -100, GameType::Quiz)
        .await
        .expect("get_active")
        .expect("session missing");
    assert_ne!(game.token, first);
}

#[tokio::test]
async fn test_used_questions_survive_session_turnover() {
    let (db, _tmp) = create_test_db().await;

    GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("start");
    GameSession::mark_question_used(&db.pool, -100, GameType::Quiz, "1")
        .await
        .expect("mark 1");
    GameSession::end(&db.pool, -100, GameType::Quiz).await.expect("end");

    // New round in the same chat: the exclusion list persists
    GameSession::start(&db.pool, -100, &quiz_state(2), Duration::seconds(30))
        .await
        .expect("restart");
    GameSession::mark_question_used(&db.pool, -100, GameType::Quiz, "2")
        .await
        .expect("mark 2");
    // Duplicates are ignored
    GameSession::mark_question_used(&db.pool, -100, GameType::Quiz, "2")
        .await
        .expect("mark 2 again");

    let used = GameSession::get_used_questions(&db.pool, -100, GameType::Quiz)
        .await
        .expect("used");
    assert_eq!(used, vec!["1".to_string(), "2".to_string()]);
}

#[tokio::test]
async fn test_bingo_state_with_participants_round_trips() {
    let (db, _tmp) = create_test_db().await;

    // Integer-keyed participant maps stressed the serializer in the
    // past; a populated map must decode back on the very next load.
    let mut participants = BTreeMap::new();
    participants.insert(11_i64, [[1u8; 5]; 5]);
    participants.insert(22_i64, [[2u8; 5]; 5]);
    let state = GameState::Bingo(BingoState {
        phase: BingoPhase::Playing,
        registration_deadline: Utc::now(),
        participants,
        drawn_numbers: vec![1, 2, 3],
        current_number: Some(3),
        winners: vec![11],
        started_at: Utc::now(),
        started_by: 11,
    });

    GameSession::start(&db.pool, -100, &state, Duration::seconds(60))
        .await
        .expect("start");

    let game = GameSession::get_active(&db.pool, -100, GameType::Bingo)
        .await
        .expect("get_active")
        .expect("session missing");
    match game.state {
        GameState::Bingo(loaded) => {
            assert_eq!(loaded.participants.len(), 2);
            assert_eq!(loaded.participants[&11], [[1u8; 5]; 5]);
            assert_eq!(loaded.participants[&22], [[2u8; 5]; 5]);
            assert_eq!(loaded.winners, vec![11]);
            assert_eq!(loaded.drawn_numbers, vec![1, 2, 3]);
        }
        other => panic!("unexpected state: {other:?}"),
    }
}

#[tokio::test]
async fn test_active_in_chat_lists_all_running_games() {
    let (db, _tmp) = create_test_db().await;

    GameSession::start(&db.pool, -100, &quiz_state(1), Duration::seconds(30))
        .await
        .expect("start quiz");

    let active = GameSession::active_in_chat(&db.pool, -100).await.expect("active");
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].state.game_type(), GameType::Quiz);

    GameSession::end(&db.pool, -100, GameType::Quiz).await.expect("end");
    let active = GameSession::active_in_chat(&db.pool, -100).await.expect("active");
    assert!(active.is_empty());
}
