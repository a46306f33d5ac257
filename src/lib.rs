//! # Group Games Bot
//!
//! A Telegram bot that runs group games (quiz, movie guessing, emoji
//! patterns, bingo, charades) backed by a points ledger and leaderboard.
//!
//! ## Features
//! - At most one active game per chat and game type, with timed expiry
//! - Speed-weighted scoring with a per-game point floor
//! - One-time invite codes that credit the inviter
//! - Scheduled game rounds in configured chats
//! - Persistent storage with SQLite

/// Bot command handlers and message processing
pub mod bot;
/// Configuration management and environment variables
pub mod config;
/// Database models, connections, and migrations
pub mod database;
/// Game rules, state types, and scoring
pub mod games;
/// Background services: scheduled games and health checks
pub mod services;
/// Utility functions for validation, formatting, and authorization
pub mod utils;
