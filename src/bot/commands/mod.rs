pub mod active;
pub mod config;
pub mod end;
pub mod invite;
pub mod leaderboard;
pub mod start;
pub mod status;

use teloxide::utils::command::BotCommands;

#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "Group Games Bot commands:")]
pub enum Command {
    #[command(description = "Display this help message")]
    Help,
    #[command(description = "Start the bot, optionally with an invite code")]
    Start { payload: String },
    #[command(description = "Start a quiz round")]
    Quiz,
    #[command(description = "Start a guess-the-movie round")]
    Movie,
    #[command(description = "Start an emoji pattern round")]
    Emoji,
    #[command(description = "Start a charades round")]
    Charades,
    #[command(description = "Open bingo registration (admins), e.g. /bingo 5")]
    Bingo { minutes: String },
    #[command(description = "Join the open bingo registration")]
    Join,
    #[command(description = "Claim a bingo win")]
    Claim,
    #[command(description = "Show the points leaderboard")]
    Leaderboard,
    #[command(description = "Show the top inviters")]
    Inviters,
    #[command(description = "Get your personal invite link")]
    Invite,
    #[command(description = "Show active games in this chat")]
    Status,
    #[command(description = "Show the most active members in this chat")]
    Active,
    #[command(description = "Show or change a bot setting (admins), e.g. /config invitation_points 5")]
    Config { args: String },
    #[command(description = "Force-end a game (admins), e.g. /end quiz")]
    End { game: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_bare_commands() {
        assert_eq!(Command::parse("/quiz", "gamesbot").ok(), Some(Command::Quiz));
        assert_eq!(Command::parse("/join", "gamesbot").ok(), Some(Command::Join));
        assert_eq!(
            Command::parse("/claim@gamesbot", "gamesbot").ok(),
            Some(Command::Claim)
        );
    }

    #[test]
    fn parses_start_payload() {
        assert_eq!(
            Command::parse("/start AB12CD34", "gamesbot").ok(),
            Some(Command::Start {
                payload: "AB12CD34".to_string()
            })
        );
        assert_eq!(
            Command::parse("/start", "gamesbot").ok(),
            Some(Command::Start {
                payload: String::new()
            })
        );
    }

    #[test]
    fn parses_bingo_minutes_argument() {
        assert_eq!(
            Command::parse("/bingo 10", "gamesbot").ok(),
            Some(Command::Bingo {
                minutes: "10".to_string()
            })
        );
        assert_eq!(
            Command::parse("/bingo", "gamesbot").ok(),
            Some(Command::Bingo {
                minutes: String::new()
            })
        );
    }

    #[test]
    fn parses_end_with_game_name() {
        assert_eq!(
            Command::parse("/end quiz", "gamesbot").ok(),
            Some(Command::End {
                game: "quiz".to_string()
            })
        );
    }

    #[test]
    fn parses_config_key_value_pair() {
        assert_eq!(
            Command::parse("/config invitation_points 5", "gamesbot").ok(),
            Some(Command::Config {
                args: "invitation_points 5".to_string()
            })
        );
        assert_eq!(
            Command::parse("/config", "gamesbot").ok(),
            Some(Command::Config {
                args: String::new()
            })
        );
    }
}
