use group_games_bot::database::{
    connection::DatabaseManager,
    models::{User, UserActivity},
};
use tempfile::TempDir;

const CHAT_A: i64 = -100111;
const CHAT_B: i64 = -100222;

async fn create_test_db() -> (DatabaseManager, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp directory");
    let db_url = format!("sqlite://{}", temp_dir.path().join("test.db").display());

    let db = DatabaseManager::new(&db_url)
        .await
        .expect("Failed to create test database");
    db.run_migrations().await.expect("Failed to run migrations");

    (db, temp_dir)
}

#[tokio::test]
async fn test_record_counts_per_chat() {
    let (db, _tmp) = create_test_db().await;

    for _ in 0..3 {
        UserActivity::record(&db.pool, 1, CHAT_A).await.expect("record A");
    }
    UserActivity::record(&db.pool, 1, CHAT_B).await.expect("record B");

    assert_eq!(UserActivity::count(&db.pool, 1, CHAT_A).await.expect("count A"), 3);
    assert_eq!(UserActivity::count(&db.pool, 1, CHAT_B).await.expect("count B"), 1);
    assert_eq!(UserActivity::count(&db.pool, 2, CHAT_A).await.expect("unknown"), 0);
}

#[tokio::test]
async fn test_top_ranks_busiest_members_first() {
    let (db, _tmp) = create_test_db().await;

    User::register(&db.pool, 1, Some("alice".into()), Some("Alice".into()), None, None)
        .await
        .expect("register alice");

    for _ in 0..5 {
        UserActivity::record(&db.pool, 2, CHAT_A).await.expect("record 2");
    }
    for _ in 0..2 {
        UserActivity::record(&db.pool, 1, CHAT_A).await.expect("record 1");
    }
    UserActivity::record(&db.pool, 3, CHAT_B).await.expect("record other chat");

    let top = UserActivity::top(&db.pool, CHAT_A, 10).await.expect("top");
    assert_eq!(top.len(), 2);
    // User 2 never registered but still leads; user 1 carries a name.
    assert_eq!(top[0].user_id, 2);
    assert_eq!(top[0].message_count, 5);
    assert_eq!(top[0].username, None);
    assert_eq!(top[1].user_id, 1);
    assert_eq!(top[1].username.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_top_respects_limit() {
    let (db, _tmp) = create_test_db().await;

    for user_id in 1..=5 {
        UserActivity::record(&db.pool, user_id, CHAT_A).await.expect("record");
    }

    let top = UserActivity::top(&db.pool, CHAT_A, 3).await.expect("top");
    assert_eq!(top.len(), 3);
}
