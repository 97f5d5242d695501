use anyhow::{Context, Result};
use serde::Deserialize;

use crate::api::{ApiSource, hero_rank_path};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankEntry {
    pub rank: usize,
    pub hero_name: String,
    pub head_url: String,
    /// Percentage with one decimal, e.g. `"51.2"`.
    pub win_rate: String,
    pub pick_rate: Option<String>,
    pub ban_rate: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RankResponse {
    #[serde(default)]
    data: Option<RankData>,
}

#[derive(Debug, Deserialize)]
struct RankData {
    #[serde(default)]
    records: Option<Vec<RankRecord>>,
}

#[derive(Debug, Deserialize)]
struct RankRecord {
    #[serde(default)]
    data: Option<RankRecordData>,
}

#[derive(Debug, Deserialize)]
struct RankRecordData {
    #[serde(default)]
    main_hero: Option<RankHero>,
    #[serde(default)]
    main_hero_win_rate: Option<f64>,
    #[serde(default)]
    main_hero_appearance_rate: Option<f64>,
    #[serde(default)]
    main_hero_ban_rate: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct RankHero {
    #[serde(default)]
    data: Option<RankHeroData>,
}

#[derive(Debug, Deserialize)]
struct RankHeroData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    head: Option<String>,
}

pub fn fetch_rank_board(api: &dyn ApiSource, days: u32) -> Result<Vec<RankEntry>> {
    let body = api
        .get(&hero_rank_path(days))
        .with_context(|| format!("rank board request failed ({days}d)"))?;
    parse_rank_board_json(&body)
}

pub fn parse_rank_board_json(raw: &str) -> Result<Vec<RankEntry>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    let resp: RankResponse = serde_json::from_str(trimmed).context("invalid hero rank json")?;
    let records = resp.data.and_then(|d| d.records).unwrap_or_default();

    // Records without a named hero don't consume a rank position.
    let mut entries = Vec::with_capacity(records.len());
    for record in records {
        let Some(data) = record.data else {
            continue;
        };
        let Some(hero) = data.main_hero.and_then(|h| h.data) else {
            continue;
        };
        let Some(hero_name) = hero.name.filter(|name| !name.trim().is_empty()) else {
            continue;
        };
        entries.push(RankEntry {
            rank: entries.len() + 1,
            hero_name,
            head_url: hero.head.unwrap_or_default(),
            win_rate: data
                .main_hero_win_rate
                .map(format_percent)
                .unwrap_or_else(|| "-".to_string()),
            pick_rate: data.main_hero_appearance_rate.map(format_percent),
            ban_rate: data.main_hero_ban_rate.map(format_percent),
        });
    }
    Ok(entries)
}

/// Fraction to percentage with one decimal place, rounded once.
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}", fraction * 100.0)
}
