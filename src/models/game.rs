//! Match history records as returned by the match API.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{GameId, PlayerId};

/// One participant's outcome in a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerResult {
    /// Final placement (1 = winner)
    pub rank: u32,

    /// Display name, if the API included one
    #[serde(default)]
    pub username: Option<String>,
}

impl PlayerResult {
    pub fn new(rank: u32) -> Self {
        Self {
            rank,
            username: None,
        }
    }

    /// Builder method to set the display name.
    pub fn with_username(mut self, username: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self
    }
}

/// A completed game involving the player whose history was requested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchRecord {
    #[serde(default)]
    pub game_id: Option<GameId>,

    /// Set for challenge games, which are left out of every statistic.
    #[serde(default)]
    pub challenge_id: Option<serde_json::Value>,

    /// Every participant, keyed by player id
    pub players: BTreeMap<PlayerId, PlayerResult>,

    /// Side length of the square map
    pub map_width: u32,

    #[serde(default)]
    pub map_height: Option<u32>,
}

impl MatchRecord {
    /// Create a non-challenge record on a square map.
    pub fn new(
        map_width: u32,
        players: impl IntoIterator<Item = (PlayerId, PlayerResult)>,
    ) -> Self {
        Self {
            game_id: None,
            challenge_id: None,
            players: players.into_iter().collect(),
            map_width,
            map_height: Some(map_width),
        }
    }

    pub fn with_game_id(mut self, game_id: GameId) -> Self {
        self.game_id = Some(game_id);
        self
    }

    pub fn with_challenge_id(mut self, challenge_id: impl Into<serde_json::Value>) -> Self {
        self.challenge_id = Some(challenge_id.into());
        self
    }

    /// Whether this game was played as part of a challenge.
    ///
    /// An explicit JSON `null` counts as "no challenge".
    pub fn is_challenge(&self) -> bool {
        self.challenge_id.as_ref().is_some_and(|id| !id.is_null())
    }

    pub fn participant_count(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, player_id: PlayerId) -> Option<&PlayerResult> {
        self.players.get(&player_id)
    }
}
