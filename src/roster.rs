use anyhow::{Context, Result};
use rayon::prelude::*;
use serde::Deserialize;

use crate::api::{ApiSource, ROSTER_PAGE_SIZE, hero_position_path};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Tank,
    Fighter,
    Assassin,
    Mage,
    Marksman,
    Support,
}

impl Role {
    pub fn api_key(self) -> &'static str {
        match self {
            Role::Tank => "tank",
            Role::Fighter => "fighter",
            Role::Assassin => "ass",
            Role::Mage => "mage",
            Role::Marksman => "mm",
            Role::Support => "supp",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Role::Tank => "Tank",
            Role::Fighter => "Fighter",
            Role::Assassin => "Assassin",
            Role::Mage => "Mage",
            Role::Marksman => "Marksman",
            Role::Support => "Support",
        }
    }
}

pub const ALL_LANES: &str = "all";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleFilter {
    pub role: Role,
    pub lane: &'static str,
}

impl RoleFilter {
    pub const fn new(role: Role, lane: &'static str) -> Self {
        Self { role, lane }
    }

    pub fn title(&self) -> String {
        if self.lane == ALL_LANES {
            self.role.label().to_string()
        } else {
            format!("{} / {}", self.role.label(), self.lane)
        }
    }
}

pub const ROLE_FILTERS: [RoleFilter; 6] = [
    RoleFilter::new(Role::Tank, ALL_LANES),
    RoleFilter::new(Role::Fighter, ALL_LANES),
    RoleFilter::new(Role::Assassin, ALL_LANES),
    RoleFilter::new(Role::Mage, ALL_LANES),
    RoleFilter::new(Role::Marksman, ALL_LANES),
    RoleFilter::new(Role::Support, ALL_LANES),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterHero {
    pub name: String,
    pub image_url: String,
}

#[derive(Debug, Clone)]
pub struct RoleRoster {
    pub filter: RoleFilter,
    pub heroes: Vec<RosterHero>,
}

pub struct RosterFetch {
    pub rosters: Vec<RoleRoster>,
    pub errors: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PositionPage {
    /// Raw record count, including records without a usable hero.
    pub records: usize,
    pub heroes: Vec<RosterHero>,
}

#[derive(Debug, Deserialize)]
struct PositionResponse {
    #[serde(default)]
    data: Option<PositionData>,
}

#[derive(Debug, Deserialize)]
struct PositionData {
    #[serde(default)]
    records: Option<Vec<PositionRecord>>,
}

#[derive(Debug, Deserialize)]
struct PositionRecord {
    #[serde(default)]
    data: Option<PositionRecordData>,
}

#[derive(Debug, Deserialize)]
struct PositionRecordData {
    #[serde(default)]
    hero: Option<PositionHero>,
}

#[derive(Debug, Deserialize)]
struct PositionHero {
    #[serde(default)]
    data: Option<PositionHeroData>,
}

#[derive(Debug, Deserialize)]
struct PositionHeroData {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    smallmap: Option<String>,
}

pub fn parse_position_page_json(raw: &str) -> Result<PositionPage> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(PositionPage {
            records: 0,
            heroes: Vec::new(),
        });
    }
    let resp: PositionResponse =
        serde_json::from_str(trimmed).context("invalid hero position json")?;
    let records = resp.data.and_then(|d| d.records).unwrap_or_default();

    let count = records.len();
    let heroes = records
        .into_iter()
        .filter_map(|r| r.data?.hero?.data)
        .filter_map(|hero| {
            Some(RosterHero {
                name: hero.name?,
                image_url: hero.smallmap.unwrap_or_default(),
            })
        })
        .collect();

    Ok(PositionPage {
        records: count,
        heroes,
    })
}

/// Page-by-page walk over one role filter. Ends after an empty page, a short
/// page, or the first error.
pub struct RosterPages<'a> {
    api: &'a dyn ApiSource,
    filter: RoleFilter,
    page_size: usize,
    next_page: usize,
    done: bool,
}

impl<'a> RosterPages<'a> {
    pub fn new(api: &'a dyn ApiSource, filter: RoleFilter) -> Self {
        Self::with_page_size(api, filter, ROSTER_PAGE_SIZE)
    }

    pub fn with_page_size(api: &'a dyn ApiSource, filter: RoleFilter, page_size: usize) -> Self {
        Self {
            api,
            filter,
            page_size: page_size.max(1),
            next_page: 1,
            done: false,
        }
    }

    fn fetch_page(&self) -> Result<PositionPage> {
        let path = hero_position_path(
            self.filter.role.api_key(),
            self.filter.lane,
            self.page_size,
            self.next_page,
        );
        let body = self.api.get(&path).with_context(|| {
            format!(
                "{} page {} request failed",
                self.filter.title(),
                self.next_page
            )
        })?;
        parse_position_page_json(&body)
    }
}

impl Iterator for RosterPages<'_> {
    type Item = Result<Vec<RosterHero>>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        let page = match self.fetch_page() {
            Ok(page) => page,
            Err(err) => {
                self.done = true;
                return Some(Err(err));
            }
        };
        if page.records == 0 {
            self.done = true;
            return None;
        }
        if page.records < self.page_size {
            self.done = true;
        } else {
            self.next_page += 1;
        }
        Some(Ok(page.heroes))
    }
}

pub fn aggregate_role(api: &dyn ApiSource, filter: RoleFilter) -> Result<Vec<RosterHero>> {
    let mut heroes = Vec::new();
    for page in RosterPages::new(api, filter) {
        heroes.extend(page?);
    }
    Ok(heroes)
}

/// Runs every role filter. Rosters come back in `ROLE_FILTERS` order; a
/// failed role is reported in `errors` and left out.
pub fn aggregate_all(api: &dyn ApiSource, parallelism: usize) -> RosterFetch {
    let results: Vec<(RoleFilter, Result<Vec<RosterHero>>)> = with_fetch_pool(parallelism, || {
        ROLE_FILTERS
            .par_iter()
            .map(|filter| (*filter, aggregate_role(api, *filter)))
            .collect()
    });

    let mut rosters = Vec::with_capacity(results.len());
    let mut errors = Vec::new();
    for (filter, result) in results {
        match result {
            Ok(heroes) => rosters.push(RoleRoster { filter, heroes }),
            Err(err) => errors.push(format!("{} roster fetch failed: {err:#}", filter.title())),
        }
    }
    RosterFetch { rosters, errors }
}

fn with_fetch_pool<T>(threads: usize, action: impl FnOnce() -> T + Send) -> T
where
    T: Send,
{
    match rayon::ThreadPoolBuilder::new()
        .num_threads(threads.max(1))
        .build()
    {
        Ok(pool) => pool.install(action),
        Err(_) => action(),
    }
}
