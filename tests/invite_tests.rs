use group_games_bot::database::{
    connection::DatabaseManager,
    models::{Invite, Setting, User},
};
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

async fn register(db: &DatabaseManager, user_id: i64, name: &str) {
    User::register(&db.pool, user_id, Some(name.into()), None, None, None)
        .await
        .expect("Failed to register user");
}

#[tokio::test]
async fn test_create_generates_wellformed_code() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "inviter").await;

    let invite = Invite::create(&db.pool, 1).await.expect("create");
    assert_eq!(invite.invite_code.len(), 8);
    assert!(invite
        .invite_code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    assert!(!invite.used);
}

#[tokio::test]
async fn test_redeem_credits_inviter_once() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "inviter").await;
    register(&db, 2, "friend").await;
    register(&db, 3, "third").await;

    let invite = Invite::create(&db.pool, 1).await.expect("create");

    let inviter = Invite::redeem(&db.pool, &invite.invite_code, 2)
        .await
        .expect("redeem");
    assert_eq!(inviter, Some(1));
    assert_eq!(User::points(&db.pool, 1).await.expect("points"), 5);

    // The code is burned: a second redemption must not double-credit
    let again = Invite::redeem(&db.pool, &invite.invite_code, 3)
        .await
        .expect("second redeem");
    assert_eq!(again, None);
    assert_eq!(User::points(&db.pool, 1).await.expect("points"), 5);

    let history = User::history(&db.pool, 1).await.expect("history");
    assert_eq!(history.len(), 1);
    assert_eq!(history[0].game_type, "invite");
}

#[tokio::test]
async fn test_redeem_unknown_code_fails() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 2, "friend").await;

    let result = Invite::redeem(&db.pool, "NOPE1234", 2).await.expect("redeem");
    assert_eq!(result, None);
}

#[tokio::test]
async fn test_self_redemption_rejected() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "inviter").await;

    let invite = Invite::create(&db.pool, 1).await.expect("create");
    let result = Invite::redeem(&db.pool, &invite.invite_code, 1)
        .await
        .expect("redeem");
    assert_eq!(result, None);
    assert_eq!(User::points(&db.pool, 1).await.expect("points"), 0);

    // The failed attempt must not burn the code
    let invite = Invite::find_by_code(&db.pool, &invite.invite_code)
        .await
        .expect("find")
        .expect("invite missing");
    assert!(!invite.used);
}

#[tokio::test]
async fn test_disabled_invitations_redeem_without_points() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "inviter").await;
    register(&db, 2, "friend").await;

    Setting::set(&db.pool, "invitation_enabled", "false")
        .await
        .expect("disable invites");

    let invite = Invite::create(&db.pool, 1).await.expect("create");
    let inviter = Invite::redeem(&db.pool, &invite.invite_code, 2)
        .await
        .expect("redeem");

    // The code is still burned, just without the bonus
    assert_eq!(inviter, Some(1));
    assert_eq!(User::points(&db.pool, 1).await.expect("points"), 0);
}

#[tokio::test]
async fn test_invite_leaderboard_counts_used_invites() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "busy").await;
    register(&db, 2, "quiet").await;
    for new_user in 10..13 {
        register(&db, new_user, &format!("new{new_user}")).await;
        let invite = Invite::create(&db.pool, 1).await.expect("create");
        Invite::redeem(&db.pool, &invite.invite_code, new_user)
            .await
            .expect("redeem");
    }
    // An unused invite must not count
    Invite::create(&db.pool, 2).await.expect("create unused");

    let standings = Invite::leaderboard(&db.pool, 10).await.expect("leaderboard");
    assert_eq!(standings.len(), 1);
    assert_eq!(standings[0].user_id, 1);
    assert_eq!(standings[0].invite_count, 3);
}

#[tokio::test]
async fn test_find_by_user_lists_own_invites() {
    let (db, _tmp) = create_test_db().await;
    register(&db, 1, "inviter").await;

    Invite::create(&db.pool, 1).await.expect("create 1");
    Invite::create(&db.pool, 1).await.expect("create 2");

    let invites = Invite::find_by_user(&db.pool, 1).await.expect("find_by_user");
    assert_eq!(invites.len(), 2);
    assert!(invites.iter().all(|i| !i.used));
}
