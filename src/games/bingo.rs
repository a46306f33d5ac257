//! Bingo: registration window, DM'd cards, timed number draws, ranked
//! claim awards. The draw loop is a spawned timer chain that reloads the
//! session and checks its token before every draw, so a force-ended or
//! replaced game stops the chain on its next tick.

use anyhow::Result;
use chrono::{DateTime, Duration, Utc};
use rand::seq::SliceRandom;
use std::collections::BTreeMap;
use teloxide::prelude::*;
use tracing::warn;

use crate::database::connection::DatabaseManager;
use crate::database::models::{GameSession, Setting, SessionToken, User};
use crate::games::quiz::register_player;
use crate::games::scoring::ranked_points;
use crate::games::{BingoCard, BingoPhase, BingoState, GameContext, GamePlayer, GameState, GameType};

pub const DEFAULT_REGISTRATION_MINUTES: i64 = 5;
pub const MAX_REGISTRATION_MINUTES: i64 = 30;
const CARD_SIZE: usize = 5;
const COLUMN_BAND: u8 = 15;
const MAX_NUMBER: u8 = 75;
const DRAW_INTERVAL_SECS: u64 = 5;
const FIRST_DRAW_DELAY_SECS: u64 = 10;
/// Generous ceiling on the playing phase; draws exhaust 75 numbers long
/// before this.
const PLAY_TTL_SECS: i64 = 3600;
const RANK_STEP: i64 = 2;
const RANK_FLOOR: i64 = 2;

const LETTERS: [char; 5] = ['B', 'I', 'N', 'G', 'O'];

#[derive(Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// The session is gone or belongs to a different round.
    Stale,
    /// Nobody joined; the game ended without a single draw.
    Cancelled,
    Started {
        participants: usize,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum DrawOutcome {
    Stale,
    /// All 75 numbers drawn; the game is over.
    Exhausted {
        winners: Vec<i64>,
    },
    Drawn {
        number: u8,
        drawn_count: usize,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum ClaimOutcome {
    NoGame,
    StillRegistering,
    NotParticipant,
    AlreadyWon,
    NoBingo,
    Winner {
        rank: usize,
        points: i64,
        /// True when every participant has now won and the game ended.
        game_over: bool,
    },
}

#[derive(Debug)]
pub enum JoinOutcome {
    NoGame,
    RegistrationClosed,
    AlreadyJoined,
    Joined {
        card: BingoCard,
        participants: usize,
    },
}

pub async fn start_registration(
    bot: &Bot,
    db: &DatabaseManager,
    ctx: &GameContext,
    minutes: i64,
) -> Result<()> {
    let chat_id = ctx.chat_id;
    let Some(starter) = &ctx.user else {
        return Ok(());
    };
    register_player(db, starter).await?;

    if GameSession::get_active(&db.pool, chat_id.0, GameType::Bingo)
        .await?
        .is_some()
    {
        bot.send_message(chat_id, "⚠️ There is already a bingo game in this chat!")
            .await?;
        return Ok(());
    }

    let minutes = minutes.clamp(1, MAX_REGISTRATION_MINUTES);
    let now = Utc::now();
    let deadline = now + Duration::minutes(minutes);
    let state = BingoState {
        phase: BingoPhase::Registration,
        registration_deadline: deadline,
        participants: BTreeMap::new(),
        drawn_numbers: Vec::new(),
        current_number: None,
        winners: Vec::new(),
        started_at: now,
        started_by: starter.id,
    };

    let token = GameSession::start(
        &db.pool,
        chat_id.0,
        &GameState::Bingo(state),
        Duration::minutes(minutes) + Duration::seconds(PLAY_TTL_SECS),
    )
    .await?;

    let text = format!(
        "🎱 BINGO 🎱\n\n{} opened a bingo game!\nRegistration is open for {minutes} minute(s) — type /join to get your card.\n\nFirst number drops shortly after registration closes. Shout /claim when your card lines up!",
        starter.first_name,
    );
    bot.send_message(chat_id, text).await?;

    spawn_registration_timer(bot.clone(), db.clone(), chat_id, token, deadline);
    Ok(())
}

/// Add a user during the registration window. The caller DMs the card;
/// a failed DM means the user was never added (the card here is only
/// returned, not persisted until `Joined`).
pub async fn add_participant(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
) -> Result<JoinOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Bingo).await? else {
        return Ok(JoinOutcome::NoGame);
    };
    let GameState::Bingo(mut state) = game.state else {
        return Ok(JoinOutcome::NoGame);
    };
    if state.phase != BingoPhase::Registration || Utc::now() >= state.registration_deadline {
        return Ok(JoinOutcome::RegistrationClosed);
    }
    if state.participants.contains_key(&user_id) {
        return Ok(JoinOutcome::AlreadyJoined);
    }

    let existing: Vec<BingoCard> = state.participants.values().copied().collect();
    let card = generate_card(&existing);
    state.participants.insert(user_id, card);
    let participants = state.participants.len();

    let ttl = state.registration_deadline - Utc::now() + Duration::seconds(PLAY_TTL_SECS);
    GameSession::update(pool, chat_id, &GameState::Bingo(state), ttl, &game.token).await?;

    Ok(JoinOutcome::Joined { card, participants })
}

pub async fn join(bot: &Bot, db: &DatabaseManager, msg: &Message) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let player = GamePlayer::from(user);
    register_player(db, &player).await?;

    match add_participant(&db.pool, msg.chat.id.0, player.id).await? {
        JoinOutcome::NoGame => {
            bot.send_message(
                msg.chat.id,
                "There is no bingo game here right now. Start one with /bingo!",
            )
            .await?;
        }
        JoinOutcome::RegistrationClosed => {
            bot.send_message(
                msg.chat.id,
                "⏰ Registration is already closed for this bingo game.",
            )
            .await?;
        }
        JoinOutcome::AlreadyJoined => {
            bot.send_message(
                msg.chat.id,
                format!("{} — you're already in! Check your DMs for your card.", player.first_name),
            )
            .await?;
        }
        JoinOutcome::Joined { card, participants } => {
            let dm = format!(
                "🎱 Your bingo card:\n\n{}\n\nNumbers are drawn in the group. /claim there when a row, column or diagonal is complete!",
                format_card(&card, &[]),
            );
            if bot.send_message(ChatId(player.id), dm).await.is_err() {
                remove_participant(&db.pool, msg.chat.id.0, player.id).await?;
                bot.send_message(
                    msg.chat.id,
                    format!(
                        "😕 {}, I couldn't send you a card. Open a private chat with me first, then /join again.",
                        player.first_name
                    ),
                )
                .await?;
                return Ok(());
            }
            bot.send_message(
                msg.chat.id,
                format!(
                    "✅ {} joined the bingo! ({participants} player(s) so far)",
                    player.first_name
                ),
            )
            .await?;
        }
    }

    Ok(())
}

async fn remove_participant(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
) -> Result<(), sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Bingo).await? else {
        return Ok(());
    };
    let GameState::Bingo(mut state) = game.state else {
        return Ok(());
    };
    if state.participants.remove(&user_id).is_some() {
        let ttl = state.registration_deadline - Utc::now() + Duration::seconds(PLAY_TTL_SECS);
        GameSession::update(pool, chat_id, &GameState::Bingo(state), ttl, &game.token).await?;
    }
    Ok(())
}

/// Close the registration window for the round identified by `token`.
/// With no participants the game ends on the spot, before any draw.
pub async fn close_registration(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    token: &SessionToken,
) -> Result<RegistrationOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Bingo).await? else {
        return Ok(RegistrationOutcome::Stale);
    };
    if game.token != *token {
        return Ok(RegistrationOutcome::Stale);
    }
    let GameState::Bingo(mut state) = game.state else {
        return Ok(RegistrationOutcome::Stale);
    };
    if state.phase != BingoPhase::Registration {
        return Ok(RegistrationOutcome::Stale);
    }

    if state.participants.is_empty() {
        state.phase = BingoPhase::Ended;
        GameSession::update(
            pool,
            chat_id,
            &GameState::Bingo(state),
            Duration::zero(),
            &game.token,
        )
        .await?;
        GameSession::end(pool, chat_id, GameType::Bingo).await?;
        return Ok(RegistrationOutcome::Cancelled);
    }

    state.phase = BingoPhase::Playing;
    let participants = state.participants.len();
    GameSession::update(
        pool,
        chat_id,
        &GameState::Bingo(state),
        Duration::seconds(PLAY_TTL_SECS),
        &game.token,
    )
    .await?;
    Ok(RegistrationOutcome::Started { participants })
}

/// Draw one number for the round identified by `token`.
pub async fn draw_next(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    token: &SessionToken,
) -> Result<DrawOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Bingo).await? else {
        return Ok(DrawOutcome::Stale);
    };
    if game.token != *token {
        return Ok(DrawOutcome::Stale);
    }
    let GameState::Bingo(mut state) = game.state else {
        return Ok(DrawOutcome::Stale);
    };
    if state.phase != BingoPhase::Playing {
        return Ok(DrawOutcome::Stale);
    }

    let remaining: Vec<u8> = (1..=MAX_NUMBER)
        .filter(|n| !state.drawn_numbers.contains(n))
        .collect();
    let Some(number) = remaining.choose(&mut rand::thread_rng()).copied() else {
        state.phase = BingoPhase::Ended;
        let winners = state.winners.clone();
        GameSession::update(
            pool,
            chat_id,
            &GameState::Bingo(state),
            Duration::zero(),
            &game.token,
        )
        .await?;
        GameSession::end(pool, chat_id, GameType::Bingo).await?;
        return Ok(DrawOutcome::Exhausted { winners });
    };

    state.drawn_numbers.push(number);
    state.current_number = Some(number);
    let drawn_count = state.drawn_numbers.len();
    GameSession::update(
        pool,
        chat_id,
        &GameState::Bingo(state),
        Duration::seconds(PLAY_TTL_SECS),
        &game.token,
    )
    .await?;

    Ok(DrawOutcome::Drawn { number, drawn_count })
}

/// Validate a /claim against the drawn numbers and award ranked points.
pub async fn process_claim(
    pool: &sqlx::SqlitePool,
    chat_id: i64,
    user_id: i64,
) -> Result<ClaimOutcome, sqlx::Error> {
    let Some(game) = GameSession::get_active(pool, chat_id, GameType::Bingo).await? else {
        return Ok(ClaimOutcome::NoGame);
    };
    let GameState::Bingo(mut state) = game.state else {
        return Ok(ClaimOutcome::NoGame);
    };
    match state.phase {
        BingoPhase::Registration => return Ok(ClaimOutcome::StillRegistering),
        BingoPhase::Ended => return Ok(ClaimOutcome::NoGame),
        BingoPhase::Playing => {}
    }
    let Some(card) = state.participants.get(&user_id).copied() else {
        return Ok(ClaimOutcome::NotParticipant);
    };
    if state.winners.contains(&user_id) {
        return Ok(ClaimOutcome::AlreadyWon);
    }
    if check_win(&card, &state.drawn_numbers).is_none() {
        return Ok(ClaimOutcome::NoBingo);
    }

    state.winners.push(user_id);
    let rank = state.winners.len();
    let game_over = state.winners.len() == state.participants.len();
    if game_over {
        state.phase = BingoPhase::Ended;
    }
    GameSession::update(
        pool,
        chat_id,
        &GameState::Bingo(state),
        Duration::seconds(PLAY_TTL_SECS),
        &game.token,
    )
    .await?;
    if game_over {
        GameSession::end(pool, chat_id, GameType::Bingo).await?;
    }

    let base = Setting::get_i64(pool, "points_per_correct_answer", 10).await?;
    let points = ranked_points(base, rank, RANK_STEP, RANK_FLOOR);
    User::add_points(pool, user_id, points, GameType::Bingo.as_str(), None).await?;

    Ok(ClaimOutcome::Winner {
        rank,
        points,
        game_over,
    })
}

pub async fn claim(bot: &Bot, db: &DatabaseManager, msg: &Message) -> Result<()> {
    let Some(user) = msg.from() else {
        return Ok(());
    };
    let player = GamePlayer::from(user);
    register_player(db, &player).await?;

    match process_claim(&db.pool, msg.chat.id.0, player.id).await? {
        ClaimOutcome::NoGame => {
            bot.send_message(msg.chat.id, "There is no bingo game running here.")
                .await?;
        }
        ClaimOutcome::StillRegistering => {
            bot.send_message(
                msg.chat.id,
                "Hold on — no numbers have been drawn yet! Registration is still open.",
            )
            .await?;
        }
        ClaimOutcome::NotParticipant => {
            bot.send_message(
                msg.chat.id,
                format!("{} — you're not in this game. /join next time!", player.first_name),
            )
            .await?;
        }
        ClaimOutcome::AlreadyWon => {
            bot.send_message(
                msg.chat.id,
                format!("{} — you already claimed your bingo! 🏆", player.first_name),
            )
            .await?;
        }
        ClaimOutcome::NoBingo => {
            bot.send_message(
                msg.chat.id,
                format!(
                    "❌ Not a bingo yet, {}. Check your card against the drawn numbers!",
                    player.first_name
                ),
            )
            .await?;
        }
        ClaimOutcome::Winner {
            rank,
            points,
            game_over,
        } => {
            let place = match rank {
                1 => "🥇 first".to_string(),
                2 => "🥈 second".to_string(),
                3 => "🥉 third".to_string(),
                n => format!("{n}th"),
            };
            let mut text = format!(
                "🎉 BINGO! {} takes {place} place and earns {points} points!",
                player.first_name,
            );
            if game_over {
                text.push_str("\n\nEveryone has a bingo — the game is over. Thanks for playing! 🎱");
            }
            bot.send_message(msg.chat.id, text).await?;
        }
    }

    Ok(())
}

/// A fresh card: each column samples five distinct numbers from its
/// 15-number band, center square free. Retries until it differs from
/// every card already handed out.
pub fn generate_card(existing: &[BingoCard]) -> BingoCard {
    let mut rng = rand::thread_rng();
    loop {
        let mut card: BingoCard = [[0; CARD_SIZE]; CARD_SIZE];
        for (col, column) in card.iter_mut().enumerate() {
            let low = col as u8 * COLUMN_BAND + 1;
            let mut band: Vec<u8> = (low..low + COLUMN_BAND).collect();
            band.shuffle(&mut rng);
            for (row, cell) in column.iter_mut().enumerate() {
                *cell = band[row];
            }
        }
        card[2][2] = 0;
        if !existing.contains(&card) {
            return card;
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WinLine {
    Row(usize),
    Column(usize),
    Diagonal,
}

/// Whether the drawn numbers complete any row, column or diagonal.
/// The free center (0) always counts as marked.
pub fn check_win(card: &BingoCard, drawn: &[u8]) -> Option<WinLine> {
    let marked = |n: u8| n == 0 || drawn.contains(&n);

    for (col, column) in card.iter().enumerate() {
        if column.iter().all(|n| marked(*n)) {
            return Some(WinLine::Column(col));
        }
    }
    for row in 0..CARD_SIZE {
        if card.iter().all(|column| marked(column[row])) {
            return Some(WinLine::Row(row));
        }
    }
    if (0..CARD_SIZE).all(|i| marked(card[i][i]))
        || (0..CARD_SIZE).all(|i| marked(card[i][CARD_SIZE - 1 - i]))
    {
        return Some(WinLine::Diagonal);
    }
    None
}

/// "B7", "N34" style announcement label.
pub fn number_label(number: u8) -> String {
    let letter = LETTERS[((number - 1) / COLUMN_BAND) as usize];
    format!("{letter}{number}")
}

/// Render a card for the DM, marking drawn numbers.
pub fn format_card(card: &BingoCard, drawn: &[u8]) -> String {
    let mut out = String::from(" B    I    N    G    O\n");
    for row in 0..CARD_SIZE {
        let cells: Vec<String> = card
            .iter()
            .map(|column| {
                let n = column[row];
                if n == 0 {
                    "⭐".to_string()
                } else if drawn.contains(&n) {
                    format!("[{n:2}]")
                } else {
                    format!(" {n:2} ")
                }
            })
            .collect();
        out.push_str(&cells.join(" "));
        out.push('\n');
    }
    out
}

fn spawn_registration_timer(
    bot: Bot,
    db: DatabaseManager,
    chat_id: ChatId,
    token: SessionToken,
    deadline: DateTime<Utc>,
) {
    tokio::spawn(async move {
        let wait = (deadline - Utc::now()).num_seconds().max(0) as u64;
        tokio::time::sleep(std::time::Duration::from_secs(wait)).await;

        let result = async {
            match close_registration(&db.pool, chat_id.0, &token).await? {
                RegistrationOutcome::Stale => {}
                RegistrationOutcome::Cancelled => {
                    bot.send_message(
                        chat_id,
                        "😕 Nobody joined the bingo. Game cancelled — try again later!",
                    )
                    .await?;
                }
                RegistrationOutcome::Started { participants } => {
                    bot.send_message(
                        chat_id,
                        format!(
                            "🎱 Registration closed with {participants} player(s)!\nFirst number in {FIRST_DRAW_DELAY_SECS} seconds — keep your cards handy."
                        ),
                    )
                    .await?;
                    spawn_draw_loop(bot.clone(), db.clone(), chat_id, token);
                }
            }
            Ok::<_, anyhow::Error>(())
        }
        .await;

        if let Err(e) = result {
            warn!(
                "Bingo registration close failed for chat {}: {}",
                chat_id, e
            );
        }
    });
}

fn spawn_draw_loop(bot: Bot, db: DatabaseManager, chat_id: ChatId, token: SessionToken) {
    tokio::spawn(async move {
        tokio::time::sleep(std::time::Duration::from_secs(FIRST_DRAW_DELAY_SECS)).await;

        loop {
            match draw_next(&db.pool, chat_id.0, &token).await {
                Ok(DrawOutcome::Stale) => break,
                Ok(DrawOutcome::Exhausted { winners }) => {
                    let summary = if winners.is_empty() {
                        "All 75 numbers are out and nobody claimed a bingo. Tough crowd! 🎱"
                            .to_string()
                    } else {
                        format!(
                            "All 75 numbers are out — that's the game! {} player(s) claimed a bingo. 🎉",
                            winners.len()
                        )
                    };
                    if let Err(e) = bot.send_message(chat_id, summary).await {
                        warn!("Bingo summary failed for chat {}: {}", chat_id, e);
                    }
                    break;
                }
                Ok(DrawOutcome::Drawn { number, drawn_count }) => {
                    let text = format!(
                        "🎱 {}  ({drawn_count}/{MAX_NUMBER} drawn)",
                        number_label(number)
                    );
                    if let Err(e) = bot.send_message(chat_id, text).await {
                        warn!("Bingo draw announce failed for chat {}: {}", chat_id, e);
                    }
                }
                Err(e) => {
                    warn!("Bingo draw failed for chat {}: {}", chat_id, e);
                    break;
                }
            }
            tokio::time::sleep(std::time::Duration::from_secs(DRAW_INTERVAL_SECS)).await;
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_card_respects_column_bands() {
        let card = generate_card(&[]);
        for (col, column) in card.iter().enumerate() {
            for (row, n) in column.iter().enumerate() {
                if col == 2 && row == 2 {
                    assert_eq!(*n, 0, "center square must be free");
                    continue;
                }
                let low = col as u8 * 15 + 1;
                assert!(
                    (low..low + 15).contains(n),
                    "column {col} got {n}, expected {low}..{}",
                    low + 15
                );
            }
        }
    }

    #[test]
    fn generated_card_has_no_duplicate_numbers() {
        let card = generate_card(&[]);
        let mut seen = std::collections::HashSet::new();
        for column in &card {
            for n in column {
                if *n != 0 {
                    assert!(seen.insert(*n), "duplicate number {n}");
                }
            }
        }
    }

    #[test]
    fn generated_cards_are_unique() {
        let first = generate_card(&[]);
        let second = generate_card(&[first]);
        assert_ne!(first, second);
    }

    #[test]
    fn empty_draw_is_no_win() {
        let card = generate_card(&[]);
        assert_eq!(check_win(&card, &[]), None);
    }

    #[test]
    fn complete_column_wins() {
        let card = generate_card(&[]);
        let drawn: Vec<u8> = card[0].to_vec();
        assert_eq!(check_win(&card, &drawn), Some(WinLine::Column(0)));
    }

    #[test]
    fn complete_row_wins() {
        let card = generate_card(&[]);
        let drawn: Vec<u8> = card.iter().map(|column| column[0]).collect();
        assert!(matches!(
            check_win(&card, &drawn),
            Some(WinLine::Row(0) | WinLine::Column(_))
        ));
    }

    #[test]
    fn diagonal_uses_free_center() {
        let card = generate_card(&[]);
        // Main diagonal minus the free center: four real numbers suffice.
        let drawn: Vec<u8> = (0..5).map(|i| card[i][i]).filter(|n| *n != 0).collect();
        assert_eq!(drawn.len(), 4);
        assert!(check_win(&card, &drawn).is_some());
    }

    #[test]
    fn all_numbers_mark_everything() {
        let card = generate_card(&[]);
        let drawn: Vec<u8> = (1..=75).collect();
        assert!(check_win(&card, &drawn).is_some());
    }

    #[test]
    fn number_labels_follow_column_bands() {
        assert_eq!(number_label(1), "B1");
        assert_eq!(number_label(15), "B15");
        assert_eq!(number_label(16), "I16");
        assert_eq!(number_label(34), "N34");
        assert_eq!(number_label(75), "O75");
    }

    #[test]
    fn formatted_card_marks_drawn_numbers() {
        let card = generate_card(&[]);
        let drawn = vec![card[0][0]];
        let rendered = format_card(&card, &drawn);
        assert!(rendered.contains(&format!("[{:2}]", card[0][0])));
        assert!(rendered.contains('⭐'));
    }
}
