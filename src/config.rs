use std::env;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://mlbb-stats.ridwaanhall.com";
pub const DAY_WINDOWS: [u32; 5] = [1, 3, 7, 15, 30];
pub const DEFAULT_DAY_WINDOW: u32 = 1;
const DEFAULT_ROSTER_PARALLELISM: usize = 6;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub api_base: String,
    pub default_days: u32,
    pub http_timeout: Option<Duration>,
    pub roster_parallelism: usize,
    pub log_file: Option<PathBuf>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_base: DEFAULT_API_BASE.to_string(),
            default_days: DEFAULT_DAY_WINDOW,
            http_timeout: None,
            roster_parallelism: DEFAULT_ROSTER_PARALLELISM,
            log_file: None,
        }
    }
}

impl AppConfig {
    /// Reads `.env.local`, `.env` and the process environment.
    pub fn from_env() -> Self {
        let _ = dotenvy::from_filename(".env.local");
        let _ = dotenvy::from_filename(".env");
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_base = lookup("MLBB_API_BASE")
            .map(|val| val.trim().trim_end_matches('/').to_string())
            .filter(|val| !val.is_empty())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let default_days = lookup("MLBB_DEFAULT_DAYS")
            .and_then(|val| val.trim().parse::<u32>().ok())
            .filter(|days| DAY_WINDOWS.contains(days))
            .unwrap_or(DEFAULT_DAY_WINDOW);
        let http_timeout = lookup("HTTP_TIMEOUT_SECS")
            .and_then(|val| val.trim().parse::<u64>().ok())
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs);
        let roster_parallelism = lookup("ROSTER_PARALLELISM")
            .and_then(|val| val.trim().parse::<usize>().ok())
            .unwrap_or(DEFAULT_ROSTER_PARALLELISM)
            .clamp(1, DEFAULT_ROSTER_PARALLELISM);
        let log_file = lookup("MLBB_LOG_FILE")
            .filter(|val| !val.trim().is_empty())
            .map(PathBuf::from);

        Self {
            api_base,
            default_days,
            http_timeout,
            roster_parallelism,
            log_file,
        }
    }
}

/// Window after `current` in the selector, wrapping around.
pub fn next_day_window(current: u32) -> u32 {
    let idx = DAY_WINDOWS.iter().position(|d| *d == current).unwrap_or(0);
    DAY_WINDOWS[(idx + 1) % DAY_WINDOWS.len()]
}

pub fn prev_day_window(current: u32) -> u32 {
    let idx = DAY_WINDOWS.iter().position(|d| *d == current).unwrap_or(0);
    DAY_WINDOWS[(idx + DAY_WINDOWS.len() - 1) % DAY_WINDOWS.len()]
}
