pub mod bingo;
pub mod charades;
pub mod data;
pub mod emoji_pattern;
pub mod movie;
pub mod quiz;
pub mod scoring;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use teloxide::types::ChatId;

/// Tag identifying the kind of game a session row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameType {
    Quiz,
    Movie,
    EmojiPattern,
    Bingo,
    Charades,
}

impl GameType {
    pub const ALL: [GameType; 5] = [
        GameType::Quiz,
        GameType::Movie,
        GameType::EmojiPattern,
        GameType::Bingo,
        GameType::Charades,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Quiz => "quiz",
            GameType::Movie => "movie",
            GameType::EmojiPattern => "emoji_pattern",
            GameType::Bingo => "bingo",
            GameType::Charades => "charades",
        }
    }

    /// Human-readable name used in chat messages.
    pub fn display_name(&self) -> &'static str {
        match self {
            GameType::Quiz => "Quiz",
            GameType::Movie => "Guess the Movie",
            GameType::EmojiPattern => "Emoji Pattern",
            GameType::Bingo => "Bingo",
            GameType::Charades => "Charades",
        }
    }
}

impl fmt::Display for GameType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for GameType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "quiz" => Ok(GameType::Quiz),
            "movie" => Ok(GameType::Movie),
            "emoji" | "emoji_pattern" => Ok(GameType::EmojiPattern),
            "bingo" => Ok(GameType::Bingo),
            "charades" => Ok(GameType::Charades),
            other => Err(format!("unknown game type: {other}")),
        }
    }
}

/// Typed session payload. One variant per game, serialized into the
/// session row by the session manager; callers never touch raw JSON.
/// Externally tagged on purpose: internal tagging buffers the payload
/// through serde's content machinery, which cannot restore the integer
/// map keys in [`BingoState::participants`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameState {
    Quiz(QuizState),
    Movie(MovieState),
    EmojiPattern(EmojiPatternState),
    Bingo(BingoState),
    Charades(CharadesState),
}

impl GameState {
    pub fn game_type(&self) -> GameType {
        match self {
            GameState::Quiz(_) => GameType::Quiz,
            GameState::Movie(_) => GameType::Movie,
            GameState::EmojiPattern(_) => GameType::EmojiPattern,
            GameState::Bingo(_) => GameType::Bingo,
            GameState::Charades(_) => GameType::Charades,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizState {
    pub question_id: u32,
    pub question: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub category: String,
    pub started_at: DateTime<Utc>,
    pub started_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MovieState {
    pub movie_id: u32,
    pub title: String,
    pub emoji: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub started_at: DateTime<Utc>,
    pub started_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmojiPatternState {
    pub pattern_id: u32,
    pub pattern: String,
    pub next: String,
    pub explanation: String,
    pub difficulty: u8,
    pub solved: bool,
    pub started_at: DateTime<Utc>,
    pub started_by: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharadesState {
    pub theme: String,
    pub category: String,
    pub options: Vec<String>,
    pub correct_index: usize,
    pub guessed: bool,
    pub started_at: DateTime<Utc>,
    pub started_by: i64,
}

/// Bingo lifecycle: registration window, then number draws, then done.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BingoPhase {
    Registration,
    Playing,
    Ended,
}

/// A 5x5 bingo card stored column-major; 0 marks the free center square.
pub type BingoCard = [[u8; 5]; 5];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BingoState {
    pub phase: BingoPhase,
    pub registration_deadline: DateTime<Utc>,
    /// user_id -> card. BTreeMap keeps serialization stable.
    pub participants: BTreeMap<i64, BingoCard>,
    pub drawn_numbers: Vec<u8>,
    pub current_number: Option<u8>,
    /// In claim order; position determines the award.
    pub winners: Vec<i64>,
    pub started_at: DateTime<Utc>,
    pub started_by: i64,
}

/// Who and where a game start came from. Scheduler-triggered rounds
/// carry no user; command-triggered rounds carry the sender.
#[derive(Debug, Clone)]
pub struct GameContext {
    pub chat_id: ChatId,
    pub user: Option<GamePlayer>,
}

#[derive(Debug, Clone)]
pub struct GamePlayer {
    pub id: i64,
    pub username: Option<String>,
    pub first_name: String,
    pub last_name: Option<String>,
}

impl From<&teloxide::types::User> for GamePlayer {
    fn from(user: &teloxide::types::User) -> Self {
        Self {
            id: user.id.0 as i64,
            username: user.username.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
        }
    }
}

impl GameContext {
    pub fn from_message(msg: &teloxide::types::Message) -> Self {
        Self {
            chat_id: msg.chat.id,
            user: msg.from().map(GamePlayer::from),
        }
    }

    pub fn scheduled(chat_id: ChatId) -> Self {
        Self { chat_id, user: None }
    }
}
