use anyhow::{anyhow, Result};

use crate::games::bingo::{DEFAULT_REGISTRATION_MINUTES, MAX_REGISTRATION_MINUTES};

/// Parse the optional `/bingo <minutes>` argument. An empty argument
/// means the default window.
pub fn validate_bingo_minutes(input: &str) -> Result<i64> {
    let input = input.trim();
    if input.is_empty() {
        return Ok(DEFAULT_REGISTRATION_MINUTES);
    }

    let minutes: i64 = input
        .parse()
        .map_err(|_| anyhow!("Registration time must be a whole number of minutes"))?;

    if minutes < 1 {
        return Err(anyhow!("Registration time must be at least 1 minute"));
    }
    if minutes > MAX_REGISTRATION_MINUTES {
        return Err(anyhow!(
            "Registration time cannot be longer than {MAX_REGISTRATION_MINUTES} minutes"
        ));
    }

    Ok(minutes)
}

/// Invite codes are 8 alphanumerics, stored uppercase. Hand-typed
/// lowercase input is accepted; the normalized code is returned.
pub fn validate_invite_code(code: &str) -> Result<String> {
    let code = code.trim().to_ascii_uppercase();

    if code.len() != 8 {
        return Err(anyhow!("Invite codes are exactly 8 characters long"));
    }
    if !code
        .chars()
        .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    {
        return Err(anyhow!("Invite codes contain only letters and digits"));
    }

    Ok(code)
}

/// Validate a `/config <key> <value>` pair against the known settings.
/// Returns the normalized value to store.
pub fn validate_setting(key: &str, value: &str) -> Result<String> {
    let value = value.trim();
    match key {
        "points_per_correct_answer" | "invitation_points" => {
            let n: i64 = value
                .parse()
                .map_err(|_| anyhow!("{key} takes a whole number"))?;
            if n < 0 {
                return Err(anyhow!("{key} cannot be negative"));
            }
            Ok(n.to_string())
        }
        "game_frequency_minutes" | "retry_timeout_seconds" | "max_game_duration_seconds" => {
            let n: i64 = value
                .parse()
                .map_err(|_| anyhow!("{key} takes a whole number"))?;
            if n < 1 {
                return Err(anyhow!("{key} must be at least 1"));
            }
            Ok(n.to_string())
        }
        "invitation_enabled" => {
            if value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false") {
                Ok(value.to_ascii_lowercase())
            } else {
                Err(anyhow!("{key} takes true or false"))
            }
        }
        "admin_ids" | "game_chat_ids" => {
            let ids: Vec<i64> = serde_json::from_str(value)
                .map_err(|_| anyhow!("{key} takes a JSON id list such as [123,-456]"))?;
            Ok(serde_json::to_string(&ids)?)
        }
        other => Err(anyhow!("Unknown setting: {other}")),
    }
}
