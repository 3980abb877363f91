// Operator console commands - one command per input line.

use crate::core::moderation::{BanType, PostStatus};
use thiserror::Error;

pub const HELP_TEXT: &str = "\
commands:
  post <user_id> <content...>                      submit a post through the guardian
  feed [limit]                                     list active posts, newest first
  show <post_id>                                   show one post in any status
  status <user_id>                                 show the ban in effect, if any
  login <user_id>                                  check whether a session may be issued
  ban <user_id> <temporary|permanent> <reason...>  record a manual ban
  unban <ban_id>                                   lift a ban
  history <user_id>                                list every ban for a user
  moderate <post_id> <active|flagged|deleted>      change a post's status
  help                                             show this text
  quit                                             exit";

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Post {
        user_id: u64,
        content: String,
    },
    Feed {
        limit: Option<usize>,
    },
    Show {
        post_id: u64,
    },
    Status {
        user_id: u64,
    },
    Login {
        user_id: u64,
    },
    Ban {
        user_id: u64,
        ban_type: BanType,
        reason: String,
    },
    Unban {
        ban_id: u64,
    },
    History {
        user_id: u64,
    },
    Moderate {
        post_id: u64,
        status: PostStatus,
    },
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq)]
pub enum ParseError {
    #[error("unknown command: {0} (try `help`)")]
    UnknownCommand(String),

    #[error("missing argument: {0}")]
    MissingArgument(&'static str),

    #[error("invalid {name}: {value}")]
    InvalidArgument { name: &'static str, value: String },
}

/// Split off the first whitespace-delimited token. The remainder keeps its
/// inner spacing so post content survives intact.
fn next_token(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    if input.is_empty() {
        return None;
    }
    match input.find(char::is_whitespace) {
        Some(idx) => Some((&input[..idx], input[idx..].trim_start())),
        None => Some((input, "")),
    }
}

fn parse_id<'a>(rest: &'a str, name: &'static str) -> Result<(u64, &'a str), ParseError> {
    let (token, rest) = next_token(rest).ok_or(ParseError::MissingArgument(name))?;
    let id = token.parse().map_err(|_| ParseError::InvalidArgument {
        name,
        value: token.to_string(),
    })?;
    Ok((id, rest))
}

fn required_text(rest: &str, name: &'static str) -> Result<String, ParseError> {
    let text = rest.trim();
    if text.is_empty() {
        return Err(ParseError::MissingArgument(name));
    }
    Ok(text.to_string())
}

/// Parse one input line. Blank lines yield `None`.
pub fn parse_command(line: &str) -> Result<Option<Command>, ParseError> {
    let Some((name, rest)) = next_token(line) else {
        return Ok(None);
    };

    let command = match name.to_ascii_lowercase().as_str() {
        "post" => {
            let (user_id, rest) = parse_id(rest, "user_id")?;
            // Content is passed through untouched, validation is the gate's job
            Command::Post {
                user_id,
                content: rest.to_string(),
            }
        }
        "feed" => {
            let limit = match next_token(rest) {
                Some((token, _)) => Some(token.parse().map_err(|_| {
                    ParseError::InvalidArgument {
                        name: "limit",
                        value: token.to_string(),
                    }
                })?),
                None => None,
            };
            Command::Feed { limit }
        }
        "show" => Command::Show {
            post_id: parse_id(rest, "post_id")?.0,
        },
        "status" => Command::Status {
            user_id: parse_id(rest, "user_id")?.0,
        },
        "login" => Command::Login {
            user_id: parse_id(rest, "user_id")?.0,
        },
        "ban" => {
            let (user_id, rest) = parse_id(rest, "user_id")?;
            let (kind, rest) = next_token(rest).ok_or(ParseError::MissingArgument("ban_type"))?;
            let ban_type = kind.parse().map_err(|_| ParseError::InvalidArgument {
                name: "ban_type",
                value: kind.to_string(),
            })?;
            Command::Ban {
                user_id,
                ban_type,
                reason: required_text(rest, "reason")?,
            }
        }
        "unban" => Command::Unban {
            ban_id: parse_id(rest, "ban_id")?.0,
        },
        "history" => Command::History {
            user_id: parse_id(rest, "user_id")?.0,
        },
        "moderate" => {
            let (post_id, rest) = parse_id(rest, "post_id")?;
            let (status, _) = next_token(rest).ok_or(ParseError::MissingArgument("status"))?;
            Command::Moderate {
                post_id,
                status: status.parse().map_err(|_| ParseError::InvalidArgument {
                    name: "status",
                    value: status.to_string(),
                })?,
            }
        }
        "help" | "?" => Command::Help,
        "quit" | "exit" => Command::Quit,
        other => return Err(ParseError::UnknownCommand(other.to_string())),
    };

    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_line() {
        assert_eq!(parse_command("   ").unwrap(), None);
    }

    #[test]
    fn test_post_keeps_content_spacing() {
        let cmd = parse_command("post 42 hello   there  world").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Post {
                user_id: 42,
                content: "hello   there  world".to_string()
            })
        );
    }

    #[test]
    fn test_post_without_content_still_parses() {
        // The gate rejects it with a proper error
        let cmd = parse_command("post 42").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Post {
                user_id: 42,
                content: String::new()
            })
        );
    }

    #[test]
    fn test_ban() {
        let cmd = parse_command("ban 7 permanent repeated phishing").unwrap();
        assert_eq!(
            cmd,
            Some(Command::Ban {
                user_id: 7,
                ban_type: BanType::Permanent,
                reason: "repeated phishing".to_string()
            })
        );
    }

    #[test]
    fn test_ban_requires_reason() {
        assert_eq!(
            parse_command("ban 7 temporary").unwrap_err(),
            ParseError::MissingArgument("reason")
        );
    }

    #[test]
    fn test_feed_limit() {
        assert_eq!(
            parse_command("feed").unwrap(),
            Some(Command::Feed { limit: None })
        );
        assert_eq!(
            parse_command("FEED 3").unwrap(),
            Some(Command::Feed { limit: Some(3) })
        );
        assert!(parse_command("feed lots").is_err());
    }

    #[test]
    fn test_moderate() {
        assert_eq!(
            parse_command("moderate 9 flagged").unwrap(),
            Some(Command::Moderate {
                post_id: 9,
                status: PostStatus::Flagged
            })
        );
        assert!(parse_command("moderate 9 vanished").is_err());
    }

    #[test]
    fn test_parse_id_returns_remainder() {
        let (id, rest) = parse_id("  12   temporary spam wave", "user_id").unwrap();
        assert_eq!(id, 12);
        assert_eq!(rest, "temporary spam wave");
        assert_eq!(
            parse_id("", "user_id").unwrap_err(),
            ParseError::MissingArgument("user_id")
        );
    }

    #[test]
    fn test_bad_id() {
        assert_eq!(
            parse_command("status bob").unwrap_err(),
            ParseError::InvalidArgument {
                name: "user_id",
                value: "bob".to_string()
            }
        );
    }

    #[test]
    fn test_unknown_command() {
        assert!(matches!(
            parse_command("dance 1").unwrap_err(),
            ParseError::UnknownCommand(_)
        ));
    }
}
