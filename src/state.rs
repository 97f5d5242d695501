use std::collections::VecDeque;

use crate::config::{next_day_window, prev_day_window};
use crate::directory::DirectoryStatus;
use crate::hero_detail::HeroDetailView;
use crate::rank_board::RankEntry;
use crate::roster::RoleRoster;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Focus {
    RankBoard,
    Rosters,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ModalState {
    Closed,
    Resolving { name: String },
    NotFound { name: String },
    Detail(Box<HeroDetailView>),
}

#[derive(Debug, Clone)]
pub enum Delta {
    DirectoryStatus {
        status: DirectoryStatus,
        heroes: usize,
    },
    SetRosters(Vec<RoleRoster>),
    SetRankBoard {
        token: u64,
        days: u32,
        entries: Vec<RankEntry>,
    },
    RankBoardFailed {
        token: u64,
    },
    SetHeroDetail {
        token: u64,
        detail: Box<HeroDetailView>,
    },
    HeroNotFound {
        token: u64,
        name: String,
    },
    Log(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderCommand {
    LoadDirectory,
    FetchRosters,
    FetchRankBoard { days: u32, token: u64 },
    ResolveHero { name: String, token: u64 },
}

#[derive(Debug, Clone)]
pub struct AppState {
    pub days: u32,
    pub focus: Focus,
    pub directory_status: DirectoryStatus,
    pub directory_size: usize,
    pub rank_board: Vec<RankEntry>,
    pub rank_board_days: Option<u32>,
    pub rank_loading: bool,
    pub rank_updated: Option<String>,
    pub rank_selected: usize,
    pub rosters: Vec<RoleRoster>,
    pub rosters_loading: bool,
    pub roster_section: usize,
    pub roster_hero: usize,
    pub modal: ModalState,
    pub modal_scroll: u16,
    pub logs: VecDeque<String>,
    pub help_overlay: bool,
    rank_token: u64,
    hero_token: u64,
}

impl AppState {
    pub fn new(days: u32) -> Self {
        Self {
            days,
            focus: Focus::Rosters,
            directory_status: DirectoryStatus::Uninitialized,
            directory_size: 0,
            rank_board: Vec::new(),
            rank_board_days: None,
            rank_loading: false,
            rank_updated: None,
            rank_selected: 0,
            rosters: Vec::new(),
            rosters_loading: false,
            roster_section: 0,
            roster_hero: 0,
            modal: ModalState::Closed,
            modal_scroll: 0,
            logs: VecDeque::with_capacity(200),
            help_overlay: false,
            rank_token: 0,
            hero_token: 0,
        }
    }

    /// Starts a board fetch for `days`. Responses to earlier board requests
    /// are discarded from here on.
    pub fn request_rank_board(&mut self, days: u32) -> ProviderCommand {
        self.rank_token += 1;
        self.days = days;
        self.rank_loading = true;
        ProviderCommand::FetchRankBoard {
            days,
            token: self.rank_token,
        }
    }

    pub fn next_day_window(&mut self) -> ProviderCommand {
        self.request_rank_board(next_day_window(self.days))
    }

    pub fn prev_day_window(&mut self) -> ProviderCommand {
        self.request_rank_board(prev_day_window(self.days))
    }

    pub fn request_rosters(&mut self) -> ProviderCommand {
        self.rosters_loading = true;
        ProviderCommand::FetchRosters
    }

    /// Opens the modal on its loading placeholder and supersedes any
    /// resolution still in flight.
    pub fn request_hero(&mut self, name: &str) -> ProviderCommand {
        self.hero_token += 1;
        self.modal = ModalState::Resolving {
            name: name.to_string(),
        };
        self.modal_scroll = 0;
        ProviderCommand::ResolveHero {
            name: name.to_string(),
            token: self.hero_token,
        }
    }

    pub fn close_modal(&mut self) {
        self.hero_token += 1;
        self.modal = ModalState::Closed;
        self.modal_scroll = 0;
    }

    pub fn modal_open(&self) -> bool {
        self.modal != ModalState::Closed
    }

    pub fn toggle_focus(&mut self) {
        self.focus = match self.focus {
            Focus::RankBoard => Focus::Rosters,
            Focus::Rosters => Focus::RankBoard,
        };
    }

    /// Rosters that have at least one hero, in role order.
    pub fn visible_rosters(&self) -> Vec<&RoleRoster> {
        self.rosters.iter().filter(|r| !r.heroes.is_empty()).collect()
    }

    pub fn selected_hero_name(&self) -> Option<String> {
        match self.focus {
            Focus::RankBoard => self
                .rank_board
                .get(self.rank_selected)
                .map(|e| e.hero_name.clone()),
            Focus::Rosters => self
                .visible_rosters()
                .get(self.roster_section)
                .and_then(|r| r.heroes.get(self.roster_hero))
                .map(|h| h.name.clone()),
        }
    }

    /// Up/down: rank rows on the board, role sections in the rosters.
    pub fn select_next(&mut self) {
        match self.focus {
            Focus::RankBoard => {
                if self.rank_selected + 1 < self.rank_board.len() {
                    self.rank_selected += 1;
                }
            }
            Focus::Rosters => {
                if self.roster_section + 1 < self.visible_rosters().len() {
                    self.roster_section += 1;
                    self.clamp_roster_hero();
                }
            }
        }
    }

    pub fn select_prev(&mut self) {
        match self.focus {
            Focus::RankBoard => self.rank_selected = self.rank_selected.saturating_sub(1),
            Focus::Rosters => {
                if self.roster_section > 0 {
                    self.roster_section -= 1;
                    self.clamp_roster_hero();
                }
            }
        }
    }

    /// Left/right inside the selected role section.
    pub fn select_right(&mut self) {
        if self.focus != Focus::Rosters {
            return;
        }
        let len = self
            .visible_rosters()
            .get(self.roster_section)
            .map(|r| r.heroes.len())
            .unwrap_or(0);
        if self.roster_hero + 1 < len {
            self.roster_hero += 1;
        }
    }

    pub fn select_left(&mut self) {
        if self.focus == Focus::Rosters {
            self.roster_hero = self.roster_hero.saturating_sub(1);
        }
    }

    pub fn scroll_modal_down(&mut self) {
        self.modal_scroll = self.modal_scroll.saturating_add(1);
    }

    pub fn scroll_modal_up(&mut self) {
        self.modal_scroll = self.modal_scroll.saturating_sub(1);
    }

    fn clamp_roster_hero(&mut self) {
        let len = self
            .visible_rosters()
            .get(self.roster_section)
            .map(|r| r.heroes.len())
            .unwrap_or(0);
        self.roster_hero = self.roster_hero.min(len.saturating_sub(1));
    }

    fn clamp_selection(&mut self) {
        self.rank_selected = self
            .rank_selected
            .min(self.rank_board.len().saturating_sub(1));
        let sections = self.visible_rosters().len();
        self.roster_section = self.roster_section.min(sections.saturating_sub(1));
        self.clamp_roster_hero();
    }

    pub fn push_log(&mut self, msg: impl Into<String>) {
        const MAX_LOGS: usize = 200;
        self.logs.push_back(msg.into());
        while self.logs.len() > MAX_LOGS {
            self.logs.pop_front();
        }
    }
}

pub fn apply_delta(state: &mut AppState, delta: Delta) {
    match delta {
        Delta::DirectoryStatus { status, heroes } => {
            state.directory_status = status;
            state.directory_size = heroes;
        }
        Delta::SetRosters(rosters) => {
            state.rosters = rosters;
            state.rosters_loading = false;
            state.clamp_selection();
        }
        Delta::SetRankBoard {
            token,
            days,
            entries,
        } => {
            if token != state.rank_token {
                return;
            }
            state.rank_board = entries;
            state.rank_board_days = Some(days);
            state.rank_loading = false;
            state.rank_updated = Some(chrono::Local::now().format("%H:%M:%S").to_string());
            state.clamp_selection();
        }
        Delta::RankBoardFailed { token } => {
            if token != state.rank_token {
                return;
            }
            state.rank_board.clear();
            state.rank_board_days = None;
            state.rank_loading = false;
            state.clamp_selection();
        }
        Delta::SetHeroDetail { token, detail } => {
            if token != state.hero_token {
                return;
            }
            state.modal = ModalState::Detail(detail);
        }
        Delta::HeroNotFound { token, name } => {
            if token != state.hero_token {
                return;
            }
            state.modal = ModalState::NotFound { name };
        }
        Delta::Log(msg) => state.push_log(msg),
    }
}
