use std::time::Duration;

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use reqwest::blocking::Client;
use reqwest::header::{ACCEPT, USER_AGENT};

pub const RANK_BOARD_SIZE: usize = 10;
pub const ROSTER_PAGE_SIZE: usize = 50;

/// Read-only access to the stats host. `path` is everything after the base,
/// query string included.
pub trait ApiSource: Send + Sync {
    fn get(&self, path: &str) -> Result<String>;
}

static CLIENT: OnceCell<Client> = OnceCell::new();

// First caller's timeout sticks for the process.
fn shared_client(timeout: Option<Duration>) -> Result<&'static Client> {
    CLIENT.get_or_try_init(|| {
        Client::builder()
            .timeout(timeout)
            .build()
            .context("failed to build http client")
    })
}

pub struct HttpSource {
    base: String,
    client: &'static Client,
}

impl HttpSource {
    pub fn new(base: &str, timeout: Option<Duration>) -> Result<Self> {
        Ok(Self {
            base: base.trim_end_matches('/').to_string(),
            client: shared_client(timeout)?,
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }
}

impl ApiSource for HttpSource {
    fn get(&self, path: &str) -> Result<String> {
        let url = format!("{}{path}", self.base);
        let resp = self
            .client
            .get(&url)
            .header(USER_AGENT, "Mozilla/5.0")
            .header(ACCEPT, "application/json")
            .send()
            .with_context(|| format!("request failed: {url}"))?;
        let status = resp.status();
        let body = resp.text().context("failed reading body")?;
        if !status.is_success() {
            return Err(anyhow::anyhow!("http {}: {}", status, body));
        }
        Ok(body)
    }
}

pub fn hero_rank_path(days: u32) -> String {
    format!(
        "/api/hero-rank/?days={days}&index=2&rank=mythic&size={RANK_BOARD_SIZE}&sort_field=pick_rate&sort_order=asc&format=json"
    )
}

pub fn hero_position_path(role: &str, lane: &str, size: usize, page: usize) -> String {
    format!("/api/hero-position/?role={role}&lane={lane}&size={size}&index={page}")
}

pub fn hero_list_path() -> &'static str {
    "/api/hero-list/?format=json"
}

pub fn hero_detail_path(id: &str) -> String {
    format!("/api/hero-detail/{id}/?format=json")
}
