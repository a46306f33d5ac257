use chrono::{Duration, Utc};
use group_games_bot::database::{connection::DatabaseManager, models::GameSession};
use group_games_bot::games::bingo::{
    self, ClaimOutcome, DrawOutcome, RegistrationOutcome,
};
use group_games_bot::games::{BingoPhase, BingoState, GameState, GameType};
use group_games_bot::database::models::{SessionToken, User};
use std::collections::BTreeMap;
use tempfile::TempDir;

const CHAT: i64 = -1001234;

async fn create_test_db() -> (DatabaseManager, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    (db, temp_dir)
}

fn registration_state(participants: BTreeMap<i64, group_games_bot::games::BingoCard>) -> GameState {
    let now = Utc::now();
    GameState::Bingo(BingoState {
        phase: BingoPhase::Registration,
        registration_deadline: now + Duration::minutes(5),
        participants,
        drawn_numbers: Vec::new(),
        current_number: None,
        winners: Vec::new(),
        started_at: now,
        started_by: 1,
    })
}

async fn start_registration(db: &DatabaseManager, state: &GameState) -> SessionToken {
    GameSession::start(&db.pool, CHAT, state, Duration::hours(1))
        .await
        .expect("start session")
}

#[tokio::test]
async fn test_join_during_registration_hands_out_unique_cards() {
    let (db, _tmp) = create_test_db().await;
    start_registration(&db, &registration_state(BTreeMap::new())).await;

    let first = bingo::add_participant(&db.pool, CHAT, 10).await.expect("join 10");
    let second = bingo::add_participant(&db.pool, CHAT, 11).await.expect("join 11");

    let (card_a, card_b) = match (first, second) {
        (
            bingo::JoinOutcome::Joined { card: a, participants: 1 },
            bingo::JoinOutcome::Joined { card: b, participants: 2 },
        ) => (a, b),
        other => panic!("unexpected outcomes: {other:?}"),
    };
    assert_ne!(card_a, card_b);

    // Double-join is refused
    assert!(matches!(
        bingo::add_participant(&db.pool, CHAT, 10).await.expect("rejoin"),
        bingo::JoinOutcome::AlreadyJoined
    ));
}

#[tokio::test]
async fn test_zero_participants_at_deadline_cancels_without_draws() {
    let (db, _tmp) = create_test_db().await;
    let token = start_registration(&db, &registration_state(BTreeMap::new())).await;

    let outcome = bingo::close_registration(&db.pool, CHAT, &token)
        .await
        .expect("close");
    assert_eq!(outcome, RegistrationOutcome::Cancelled);

    // Game over: no active session, and the draw loop would bail out
    assert!(GameSession::get_active(&db.pool, CHAT, GameType::Bingo)
        .await
        .expect("get_active")
        .is_none());
    assert_eq!(
        bingo::draw_next(&db.pool, CHAT, &token).await.expect("draw"),
        DrawOutcome::Stale
    );
}

#[tokio::test]
async fn test_close_registration_with_stale_token_is_noop() {
    let (db, _tmp) = create_test_db().await;
    start_registration(&db, &registration_state(BTreeMap::new())).await;
    let stale = SessionToken::new();

    let outcome = bingo::close_registration(&db.pool, CHAT, &stale)
        .await
        .expect("close");
    assert_eq!(outcome, RegistrationOutcome::Stale);

    // The real round is untouched
    assert!(GameSession::get_active(&db.pool, CHAT, GameType::Bingo)
        .await
        .expect("get_active")
        .is_some());
}

#[tokio::test]
async fn test_draws_produce_unique_numbers_in_range() {
    let (db, _tmp) = create_test_db().await;
    let mut participants = BTreeMap::new();
    participants.insert(10, bingo::generate_card(&[]));
    let token = start_registration(&db, &registration_state(participants)).await;

    assert!(matches!(
        bingo::close_registration(&db.pool, CHAT, &token).await.expect("close"),
        RegistrationOutcome::Started { participants: 1 }
    ));

    let mut seen = Vec::new();
    for _ in 0..20 {
        match bingo::draw_next(&db.pool, CHAT, &token).await.expect("draw") {
            DrawOutcome::Drawn { number, drawn_count } => {
                assert!((1..=75).contains(&number));
                assert!(!seen.contains(&number), "number {number} drawn twice");
                seen.push(number);
                assert_eq!(drawn_count, seen.len());
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
    }
}

#[tokio::test]
async fn test_claim_lifecycle_with_ranked_awards() {
    let (db, _tmp) = create_test_db().await;
    for id in [10, 11] {
        User::register(&db.pool, id, None, Some(format!("p{id}")), None, None)
            .await
            .expect("register");
    }

    let card_a = bingo::generate_card(&[]);
    // Card B must not win from card A's column-0 numbers
    let card_b = loop {
        let candidate = bingo::generate_card(&[card_a]);
        if candidate[0].iter().any(|n| !card_a[0].contains(n)) {
            break candidate;
        }
    };
    let mut participants = BTreeMap::new();
    participants.insert(10, card_a);
    participants.insert(11, card_b);

    let now = Utc::now();
    GameSession::start(
        &db.pool,
        CHAT,
        &GameState::Bingo(BingoState {
            phase: BingoPhase::Playing,
            registration_deadline: now,
            participants,
            // First column of card A is complete; card B shares no
            // column-0 numbers, so only A can claim
            drawn_numbers: card_a[0].to_vec(),
            current_number: card_a[0].last().copied(),
            winners: Vec::new(),
            started_at: now,
            started_by: 1,
        }),
        Duration::hours(1),
    )
    .await
    .expect("start playing session");

    // Outsiders cannot claim
    assert_eq!(
        bingo::process_claim(&db.pool, CHAT, 99).await.expect("claim 99"),
        ClaimOutcome::NotParticipant
    );

    // Player B has no line yet
    assert_eq!(
        bingo::process_claim(&db.pool, CHAT, 11).await.expect("claim 11"),
        ClaimOutcome::NoBingo
    );

    // Player A wins with the completed column and takes the full base
    match bingo::process_claim(&db.pool, CHAT, 10).await.expect("claim 10") {
        ClaimOutcome::Winner { rank: 1, points: 10, game_over: false } => {
            assert_eq!(User::points(&db.pool, 10).await.expect("points"), 10);
        }
        other => panic!("expected a first-rank win, got {other:?}"),
    }

    // Claiming twice is refused
    assert_eq!(
        bingo::process_claim(&db.pool, CHAT, 10).await.expect("reclaim"),
        ClaimOutcome::AlreadyWon
    );
}

#[tokio::test]
async fn test_claim_during_registration_is_refused() {
    let (db, _tmp) = create_test_db().await;
    let mut participants = BTreeMap::new();
    participants.insert(10, bingo::generate_card(&[]));
    start_registration(&db, &registration_state(participants)).await;

    assert_eq!(
        bingo::process_claim(&db.pool, CHAT, 10).await.expect("claim"),
        ClaimOutcome::StillRegistering
    );
}

#[tokio::test]
async fn test_game_ends_when_every_participant_has_won() {
    let (db, _tmp) = create_test_db().await;
    User::register(&db.pool, 10, None, Some("solo".into()), None, None)
        .await
        .expect("register");

    let card = bingo::generate_card(&[]);
    let mut participants = BTreeMap::new();
    participants.insert(10, card);

    let now = Utc::now();
    GameSession::start(
        &db.pool,
        CHAT,
        &GameState::Bingo(BingoState {
            phase: BingoPhase::Playing,
            registration_deadline: now,
            participants,
            drawn_numbers: (1..=75).collect(),
            current_number: Some(75),
            winners: Vec::new(),
            started_at: now,
            started_by: 1,
        }),
        Duration::hours(1),
    )
    .await
    .expect("start playing session");

    match bingo::process_claim(&db.pool, CHAT, 10).await.expect("claim") {
        ClaimOutcome::Winner { rank: 1, game_over: true, .. } => {}
        other => panic!("expected final win, got {other:?}"),
    }
    assert!(GameSession::get_active(&db.pool, CHAT, GameType::Bingo)
        .await
        .expect("get_active")
        .is_none());
}
