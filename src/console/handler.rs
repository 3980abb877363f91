// Console handler - translates core moderation results into console output.

use super::commands::{Command, HELP_TEXT};
use crate::core::moderation::{BanStore, ModerationError, ModerationGate, PostStore};
use serde::Serialize;
use serde_json::json;

/// Run one command and render the outcome as a single block of text.
///
/// Domain refusals are rendered for the operator; storage failures are
/// logged and reported generically.
pub async fn execute<B: BanStore, P: PostStore>(
    gate: &ModerationGate<B, P>,
    command: Command,
) -> String {
    match run(gate, command).await {
        Ok(output) => output,
        Err(err) => render_error(&err),
    }
}

async fn run<B: BanStore, P: PostStore>(
    gate: &ModerationGate<B, P>,
    command: Command,
) -> Result<String, ModerationError> {
    let ledger = gate.ledger();

    let output = match command {
        Command::Post { user_id, content } => {
            let post = gate.submit_post(user_id, &content).await?;
            format!("accepted: {}", to_json(&post))
        }
        Command::Feed { limit } => {
            let posts = gate.feed(limit).await?;
            if posts.is_empty() {
                "feed is empty".to_string()
            } else {
                posts.iter().map(to_json).collect::<Vec<_>>().join("\n")
            }
        }
        Command::Show { post_id } => match gate.get_post(post_id).await? {
            Some(post) => to_json(&post),
            None => format!("no post with id {}", post_id),
        },
        Command::Status { user_id } => {
            let banned = ledger.is_banned(user_id).await?;
            let ban = if banned {
                ledger.get_active_ban(user_id).await?
            } else {
                None
            };
            to_json(&json!({
                "user_id": user_id,
                "banned": banned,
                "ban": ban,
            }))
        }
        Command::Login { user_id } => {
            ledger.check_login(user_id).await?;
            format!("login allowed for user {}", user_id)
        }
        Command::Ban {
            user_id,
            ban_type,
            reason,
        } => {
            let ban = ledger.record_ban(user_id, &reason, ban_type).await?;
            format!("banned: {}", to_json(&ban))
        }
        Command::Unban { ban_id } => {
            if ledger.lift_ban(ban_id).await? {
                format!("ban {} lifted", ban_id)
            } else {
                format!("no ban with id {}", ban_id)
            }
        }
        Command::History { user_id } => {
            let bans = ledger.ban_history(user_id).await?;
            if bans.is_empty() {
                format!("no bans for user {}", user_id)
            } else {
                bans.iter().map(to_json).collect::<Vec<_>>().join("\n")
            }
        }
        Command::Moderate { post_id, status } => {
            if gate.set_post_status(post_id, status).await? {
                format!("post {} is now {}", post_id, status.as_str())
            } else {
                format!("no post with id {}", post_id)
            }
        }
        Command::Help => HELP_TEXT.to_string(),
        Command::Quit => "bye".to_string(),
    };

    Ok(output)
}

fn render_error(err: &ModerationError) -> String {
    match err {
        ModerationError::PolicyViolation { .. } => format!("rejected: {}", err),
        ModerationError::AccountBanned { .. } => format!("refused: {}", err),
        ModerationError::InvalidInput(message) => format!("invalid: {}", message),
        ModerationError::StorageError(message) => {
            tracing::error!("Storage failure: {}", message);
            "error: storage unavailable, nothing was changed".to_string()
        }
    }
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|e| format!("<unserializable: {}>", e))
}
