//! Statistics calculation engine.
//!
//! Turns a player's match history into per-category scores:
//! - Challenge games are skipped
//! - Each remaining game is scored from the player's final rank
//! - Scores are accumulated into the total, mode, map size and mode×size buckets

use thiserror::Error;
use tracing::debug;

use crate::models::{
    Category, GameId, GameMode, MapSize, MatchRecord, PlayerId, PlayerResult, StatsReport,
};

/// Score for winning a game; last place in a duel or 4-player game scores 0.
pub const MAX_SCORE: f64 = 100.0;

/// Score lost per place in a free-for-all. Fixed for every FFA size, so only
/// 4-player games span exactly 0..=100.
pub const FFA_RANK_PENALTY: f64 = MAX_SCORE / 3.0;

/// Errors that can occur while aggregating statistics.
#[derive(Debug, Error, PartialEq)]
pub enum StatsError {
    #[error("Player {player_id} is missing from game {}", game_label(.game_id))]
    MissingPlayerData {
        player_id: PlayerId,
        game_id: Option<GameId>,
    },

    #[error("No games played in category {0}")]
    EmptyCategory(Category),

    #[error("No match history for player {0}")]
    EmptyHistory(PlayerId),
}

fn game_label(game_id: &Option<GameId>) -> String {
    game_id.map_or_else(|| "<unknown>".to_string(), |id| id.to_string())
}

/// Score a single game from the player's 1-indexed rank.
pub fn score_game(mode: GameMode, rank: u32) -> f64 {
    let rank0 = rank as f64 - 1.0;
    match mode {
        GameMode::Duel => MAX_SCORE - MAX_SCORE * rank0,
        GameMode::Ffa => MAX_SCORE - FFA_RANK_PENALTY * rank0,
    }
}

/// Aggregates one player's match history into a [`StatsReport`].
#[derive(Debug, Clone, Copy)]
pub struct StatsAggregator {
    player_id: PlayerId,
}

impl StatsAggregator {
    pub fn new(player_id: PlayerId) -> Self {
        Self { player_id }
    }

    pub fn player_id(&self) -> PlayerId {
        self.player_id
    }

    /// Score and bucket every non-challenge game in `records`.
    ///
    /// The player must appear in the newest record, which supplies the
    /// display name, and in every counted game; a single missing entry fails
    /// the whole pass. Challenge games are never inspected beyond that.
    pub fn aggregate(&self, records: &[MatchRecord]) -> Result<StatsReport, StatsError> {
        let first = records
            .first()
            .ok_or(StatsError::EmptyHistory(self.player_id))?;

        let username = self
            .lookup_rank_entry(first)?
            .username
            .clone()
            .unwrap_or_else(|| self.player_id.to_string());

        let mut report = StatsReport::new(self.player_id, username);

        for record in records {
            if record.is_challenge() {
                debug!(game_id = ?record.game_id, "Skipping challenge game");
                continue;
            }

            let rank = self.lookup_rank_entry(record)?.rank;

            let mode = GameMode::from_participant_count(record.participant_count());
            let size = MapSize::from_width(record.map_width);
            let score = score_game(mode, rank);

            for category in Category::for_game(mode, size) {
                report.bucket_mut(category).record(score);
            }
        }

        debug!(
            player_id = %self.player_id,
            games = report.games_count(Category::Total),
            skipped = records.len() - report.games_count(Category::Total) as usize,
            "Aggregated match history"
        );

        Ok(report)
    }

    fn lookup_rank_entry<'a>(
        &self,
        record: &'a MatchRecord,
    ) -> Result<&'a PlayerResult, StatsError> {
        record
            .player(self.player_id)
            .ok_or(StatsError::MissingPlayerData {
                player_id: self.player_id,
                game_id: record.game_id,
            })
    }
}

impl StatsReport {
    /// Average for `category`, failing when the category has no games.
    pub fn try_average(&self, category: Category) -> Result<f64, StatsError> {
        self.average(category)
            .ok_or(StatsError::EmptyCategory(category))
    }
}
