// Console layer - operator commands read line by line.
//
// This is the only outward surface of the binary. It parses commands and
// hands them to the core; no moderation logic lives here.

pub mod commands;
pub mod handler;

use crate::core::moderation::{BanStore, ModerationGate, PostStore};
use commands::{parse_command, Command};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

/// Read commands from `input` until EOF or `quit`, writing replies to `output`.
pub async fn run<B, P, R, W>(
    gate: &ModerationGate<B, P>,
    input: R,
    mut output: W,
) -> anyhow::Result<()>
where
    B: BanStore,
    P: PostStore,
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();

    while let Some(line) = lines.next_line().await? {
        let reply = match parse_command(&line) {
            Ok(None) => continue,
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => handler::execute(gate, command).await,
            Err(err) => err.to_string(),
        };

        output.write_all(reply.as_bytes()).await?;
        output.write_all(b"\n").await?;
        output.flush().await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::moderation::{GuardianConfig, SystemClock};
    use crate::infra::moderation::{InMemoryBanStore, InMemoryPostStore};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_session() {
        let gate = ModerationGate::new(
            GuardianConfig::default(),
            InMemoryBanStore::new(),
            InMemoryPostStore::new(),
            Arc::new(SystemClock),
        );

        let script = "\
post 5 this is a totally normal post about programming

post 6 antimalware tips
login 6
bogus
quit
login 5
";
        let mut out = Vec::new();
        run(&gate, script.as_bytes(), &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].starts_with("accepted: "));
        assert_eq!(
            lines[1],
            "rejected: violates policy: malware. account temp-banned for 24h."
        );
        assert_eq!(lines[2], "refused: account is banned: violates policy: malware");
        assert!(lines[3].starts_with("unknown command"));
    }
}
