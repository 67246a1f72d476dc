//! Interactive report session.
//!
//! Reads one player id per line, fetches that player's history, aggregates
//! it and writes the report. The loop ends on EOF or a quit command; a failed
//! request is reported and the prompt comes back.

use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{info, warn};

use crate::calculate::{StatsAggregator, StatsError};
use crate::fetch::{FetchError, MatchHistoryProvider};
use crate::models::{Category, PlayerId};
use crate::report::Reporter;

pub const PROMPT: &str = "User ID? ";

/// Errors for a single report request.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Could not fetch match history: {0}")]
    Fetch(#[from] FetchError),

    #[error("Could not compute statistics: {0}")]
    Stats(#[from] StatsError),

    #[error("Could not render report: {0}")]
    Render(#[from] serde_json::Error),
}

/// One line of user input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Report(PlayerId),
    Quit,
    Blank,
    Invalid(String),
}

impl Command {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return Command::Blank;
        }
        if matches!(line.to_ascii_lowercase().as_str(), "q" | "quit" | "exit") {
            return Command::Quit;
        }
        match line.parse() {
            Ok(player_id) => Command::Report(player_id),
            Err(_) => Command::Invalid(line.to_string()),
        }
    }
}

/// Counts of what a session did before it ended.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SessionSummary {
    pub reports: u32,
    pub failures: u32,
}

/// Fetch, aggregate and report loop around one history provider.
pub struct Session<P> {
    provider: P,
    reporter: Reporter,
}

impl<P: MatchHistoryProvider> Session<P> {
    pub fn new(provider: P, reporter: Reporter) -> Self {
        Self { provider, reporter }
    }

    /// Produce the rendered report for one player.
    pub async fn report_player(&self, player_id: PlayerId) -> Result<String, SessionError> {
        let records = self.provider.fetch_matches(player_id).await?;
        let report = StatsAggregator::new(player_id).aggregate(&records)?;

        info!(
            player_id = %player_id,
            provider = self.provider.name(),
            fetched = records.len(),
            counted = report.games_count(Category::Total),
            "Report ready for {}",
            report.username
        );

        Ok(self.reporter.render(&report)?)
    }

    /// Prompt for player ids until EOF or a quit command.
    ///
    /// Request failures are written to `output` and the loop continues; only
    /// IO errors on the streams themselves end it early.
    pub async fn run<R, W>(&self, mut input: R, output: &mut W) -> std::io::Result<SessionSummary>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut summary = SessionSummary::default();

        loop {
            output.write_all(PROMPT.as_bytes()).await?;
            output.flush().await?;

            buf.clear();
            if input.read_until(b'\n', &mut buf).await? == 0 {
                output.write_all(b"\n").await?;
                break;
            }
            // Undecodable bytes become U+FFFD, so such lines parse as invalid ids.
            let line = String::from_utf8_lossy(&buf);

            match Command::parse(&line) {
                Command::Quit => break,
                Command::Blank => continue,
                Command::Invalid(text) => {
                    let message = format!("Not a user id: {:?}\n\n", text);
                    output.write_all(message.as_bytes()).await?;
                }
                Command::Report(player_id) => match self.report_player(player_id).await {
                    Ok(rendered) => {
                        output.write_all(rendered.as_bytes()).await?;
                        summary.reports += 1;
                    }
                    Err(e) => {
                        warn!(player_id = %player_id, "Report failed: {}", e);
                        let message = format!("Error: {}\n\n", e);
                        output.write_all(message.as_bytes()).await?;
                        summary.failures += 1;
                    }
                },
            }
        }

        output.flush().await?;
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{MatchRecord, PlayerResult};
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct StaticHistory {
        games: HashMap<PlayerId, Vec<MatchRecord>>,
    }

    #[async_trait]
    impl MatchHistoryProvider for StaticHistory {
        fn name(&self) -> &'static str {
            "static"
        }

        async fn fetch_matches(
            &self,
            player_id: PlayerId,
        ) -> Result<Vec<MatchRecord>, FetchError> {
            self.games
                .get(&player_id)
                .cloned()
                .ok_or(FetchError::HttpStatus {
                    status: 404,
                    message: "Not Found".to_string(),
                })
        }
    }

    fn session() -> Session<StaticHistory> {
        let duel_win = MatchRecord::new(
            40,
            [
                (PlayerId::new(7), PlayerResult::new(1).with_username("seven")),
                (PlayerId::new(8), PlayerResult::new(2).with_username("eight")),
            ],
        );
        let no_history = Vec::new();

        let games = HashMap::from([
            (PlayerId::new(7), vec![duel_win]),
            (PlayerId::new(9), no_history),
        ]);
        Session::new(StaticHistory { games }, Reporter::default())
    }

    async fn run(input: &str) -> (SessionSummary, String) {
        let mut output = Vec::new();
        let summary = session().run(input.as_bytes(), &mut output).await.unwrap();
        (summary, String::from_utf8(output).unwrap())
    }

    #[test]
    fn test_parse_command() {
        assert_eq!(Command::parse("2807\n"), Command::Report(PlayerId::new(2807)));
        assert_eq!(Command::parse("  "), Command::Blank);
        assert_eq!(Command::parse("quit"), Command::Quit);
        assert_eq!(Command::parse("Q"), Command::Quit);
        assert_eq!(Command::parse("exit"), Command::Quit);
        assert_eq!(
            Command::parse("lunariz"),
            Command::Invalid("lunariz".to_string())
        );
    }

    #[tokio::test]
    async fn test_report_player() {
        let rendered = session().report_player(PlayerId::new(7)).await.unwrap();

        assert!(rendered.starts_with("seven\n"));
        assert!(rendered.contains("Out of 1 small duel games, your average score is 100.00"));
    }

    #[tokio::test]
    async fn test_report_player_fetch_failure() {
        let err = session()
            .report_player(PlayerId::new(404))
            .await
            .unwrap_err();
        assert!(matches!(err, SessionError::Fetch(_)));
    }

    #[tokio::test]
    async fn test_report_player_empty_history() {
        let err = session().report_player(PlayerId::new(9)).await.unwrap_err();
        assert!(matches!(
            err,
            SessionError::Stats(StatsError::EmptyHistory(_))
        ));
    }

    #[tokio::test]
    async fn test_run_until_eof() {
        let (summary, output) = run("7\n").await;

        assert_eq!(summary, SessionSummary { reports: 1, failures: 0 });
        assert!(output.starts_with(PROMPT));
        assert!(output.contains("seven\n"));
        assert!(output.ends_with(&format!("{}\n", PROMPT)));
    }

    #[tokio::test]
    async fn test_run_stops_at_quit() {
        let (summary, output) = run("quit\n7\n").await;

        assert_eq!(summary, SessionSummary::default());
        assert_eq!(output, PROMPT);
    }

    #[tokio::test]
    async fn test_run_recovers_from_non_utf8_line() {
        let mut output = Vec::new();
        let input: &[u8] = b"\xff\xfe\n7\n";
        let summary = session().run(input, &mut output).await.unwrap();
        let output = String::from_utf8(output).unwrap();

        assert_eq!(summary, SessionSummary { reports: 1, failures: 0 });
        assert!(output.contains("Not a user id:"));
        assert!(output.contains("seven\n"));
    }

    #[tokio::test]
    async fn test_run_recovers_from_bad_input() {
        let (summary, output) = run("abc\n\n404\n7\nq\n").await;

        assert_eq!(summary, SessionSummary { reports: 1, failures: 1 });
        assert!(output.contains("Not a user id: \"abc\""));
        assert!(output.contains("Error: Could not fetch match history: HTTP 404: Not Found"));
        assert!(output.contains("seven\n"));
        assert_eq!(output.matches(PROMPT).count(), 5);
    }
}
