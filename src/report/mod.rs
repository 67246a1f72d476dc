//! Report rendering.
//!
//! Text output groups categories the way players read them: overall, by
//! mode, by map size, then by both.

use std::fmt::Write;

use serde::Serialize;

use crate::models::{Category, CategoryResult, PlayerId, StatsReport};

const EXPECTATION_NOTE: &str =
    "For a well-rounded bot, a score of 50 in all types of games is expected.";

/// Category groups, separated by a blank line in text output.
const TEXT_SECTIONS: [&[Category]; 4] = [
    &[Category::Total],
    &[Category::Duel, Category::Ffa],
    &[Category::Small, Category::Large],
    &[
        Category::SmallDuel,
        Category::LargeDuel,
        Category::SmallFfa,
        Category::LargeFfa,
    ],
];

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Serialize)]
struct JsonReport<'a> {
    player_id: PlayerId,
    username: &'a str,
    categories: Vec<CategoryResult>,
}

/// Formats aggregated statistics for display.
#[derive(Debug, Clone, Copy, Default)]
pub struct Reporter {
    format: OutputFormat,
}

impl Reporter {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    pub fn format(&self) -> OutputFormat {
        self.format
    }

    /// Render a report, ending with a newline.
    pub fn render(&self, report: &StatsReport) -> Result<String, serde_json::Error> {
        match self.format {
            OutputFormat::Text => Ok(render_text(report)),
            OutputFormat::Json => {
                let mut json = render_json(report)?;
                json.push('\n');
                Ok(json)
            }
        }
    }
}

/// One report line for a category.
///
/// Empty categories say so instead of printing an average.
pub fn format_category_line(
    category: Category,
    games_count: u32,
    average: Option<f64>,
) -> String {
    match average {
        Some(average) if games_count > 0 => format!(
            "Out of {} {} games, your average score is {:.2}",
            games_count,
            category.label(),
            average
        ),
        _ => format!(
            "Out of {} {} games, there is no data",
            games_count,
            category.label()
        ),
    }
}

pub fn render_text(report: &StatsReport) -> String {
    let mut out = String::new();

    // Writing to a String cannot fail.
    let _ = writeln!(out, "{}", report.username);
    let _ = writeln!(out);
    let _ = writeln!(out, "{}", EXPECTATION_NOTE);
    let _ = writeln!(out);

    for section in TEXT_SECTIONS {
        for &category in section {
            let line = format_category_line(
                category,
                report.games_count(category),
                report.average(category),
            );
            let _ = writeln!(out, "{}", line);
        }
        let _ = writeln!(out);
    }

    out
}

pub fn render_json(report: &StatsReport) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonReport {
        player_id: report.player_id,
        username: &report.username,
        categories: report.results(),
    })
}
