//! Per-category score statistics.

use serde::{Deserialize, Serialize};

use super::PlayerId;

/// Maps at or below this width count as small.
pub const SMALL_MAP_MAX_WIDTH: u32 = 40;

/// Game mode, decided by how many players took part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GameMode {
    Duel,
    Ffa,
}

impl GameMode {
    pub fn from_participant_count(count: usize) -> Self {
        if count == 2 {
            GameMode::Duel
        } else {
            GameMode::Ffa
        }
    }
}

/// Map size class, decided by map width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapSize {
    Small,
    Large,
}

impl MapSize {
    pub fn from_width(width: u32) -> Self {
        if width <= SMALL_MAP_MAX_WIDTH {
            MapSize::Small
        } else {
            MapSize::Large
        }
    }
}

/// Reporting category. Variants are listed in report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Total,
    Duel,
    #[serde(rename = "ffa")]
    Ffa,
    Small,
    Large,
    SmallDuel,
    LargeDuel,
    #[serde(rename = "smallFFA")]
    SmallFfa,
    #[serde(rename = "largeFFA")]
    LargeFfa,
}

impl Category {
    pub const COUNT: usize = 9;

    pub const ALL: [Category; Category::COUNT] = [
        Category::Total,
        Category::Duel,
        Category::Ffa,
        Category::Small,
        Category::Large,
        Category::SmallDuel,
        Category::LargeDuel,
        Category::SmallFfa,
        Category::LargeFfa,
    ];

    /// The four categories a counted game contributes to.
    pub fn for_game(mode: GameMode, size: MapSize) -> [Category; 4] {
        let mode_category = match mode {
            GameMode::Duel => Category::Duel,
            GameMode::Ffa => Category::Ffa,
        };
        let size_category = match size {
            MapSize::Small => Category::Small,
            MapSize::Large => Category::Large,
        };
        let combined = match (size, mode) {
            (MapSize::Small, GameMode::Duel) => Category::SmallDuel,
            (MapSize::Large, GameMode::Duel) => Category::LargeDuel,
            (MapSize::Small, GameMode::Ffa) => Category::SmallFfa,
            (MapSize::Large, GameMode::Ffa) => Category::LargeFfa,
        };

        [Category::Total, mode_category, size_category, combined]
    }

    /// Position of this category in [`Category::ALL`].
    pub fn index(self) -> usize {
        self as usize
    }

    /// Human-readable label used in text reports.
    pub fn label(self) -> &'static str {
        match self {
            Category::Total => "total",
            Category::Duel => "duel",
            Category::Ffa => "FFA",
            Category::Small => "small",
            Category::Large => "large",
            Category::SmallDuel => "small duel",
            Category::LargeDuel => "large duel",
            Category::SmallFfa => "small FFA",
            Category::LargeFfa => "large FFA",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let tag = match self {
            Category::Total => "total",
            Category::Duel => "duel",
            Category::Ffa => "ffa",
            Category::Small => "small",
            Category::Large => "large",
            Category::SmallDuel => "smallDuel",
            Category::LargeDuel => "largeDuel",
            Category::SmallFfa => "smallFFA",
            Category::LargeFfa => "largeFFA",
        };
        write!(f, "{}", tag)
    }
}

/// Running game count and score sum for one category.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryBucket {
    pub games_count: u32,
    pub score_sum: f64,
}

impl CategoryBucket {
    pub fn record(&mut self, score: f64) {
        self.games_count += 1;
        self.score_sum += score;
    }

    /// Average score, or `None` when no games were counted.
    pub fn average(&self) -> Option<f64> {
        if self.games_count == 0 {
            None
        } else {
            Some(self.score_sum / self.games_count as f64)
        }
    }
}

/// Count and average for one category, as handed to a reporter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CategoryResult {
    pub category: Category,
    pub games_count: u32,
    pub average: Option<f64>,
}

/// Aggregated statistics for one player.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatsReport {
    pub player_id: PlayerId,

    /// Display name, passed through from the match data unchanged
    pub username: String,

    buckets: [CategoryBucket; Category::COUNT],
}

impl StatsReport {
    /// Create an empty report.
    pub fn new(player_id: PlayerId, username: String) -> Self {
        Self {
            player_id,
            username,
            buckets: [CategoryBucket::default(); Category::COUNT],
        }
    }

    pub fn bucket(&self, category: Category) -> &CategoryBucket {
        &self.buckets[category.index()]
    }

    pub fn bucket_mut(&mut self, category: Category) -> &mut CategoryBucket {
        &mut self.buckets[category.index()]
    }

    pub fn games_count(&self, category: Category) -> u32 {
        self.bucket(category).games_count
    }

    pub fn average(&self, category: Category) -> Option<f64> {
        self.bucket(category).average()
    }

    /// All nine categories in report order.
    pub fn results(&self) -> Vec<CategoryResult> {
        Category::ALL
            .iter()
            .map(|&category| {
                let bucket = self.bucket(category);
                CategoryResult {
                    category,
                    games_count: bucket.games_count,
                    average: bucket.average(),
                }
            })
            .collect()
    }
}
