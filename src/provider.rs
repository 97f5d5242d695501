use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use crate::api::ApiSource;
use crate::directory::{DirectoryStatus, HeroDirectory};
use crate::hero_detail::{DetailOutcome, resolve_hero_detail};
use crate::rank_board::fetch_rank_board;
use crate::roster::aggregate_all;
use crate::state::{Delta, ProviderCommand};

enum Work {
    Command(ProviderCommand),
    DirectoryLoaded {
        generation: u64,
        directory: HeroDirectory,
    },
    Shutdown,
}

/// Worker that owns the hero directory and turns commands into deltas.
///
/// Every request runs on its own thread, the directory load included, so a
/// stalled request never holds up the others. Hero lookups that arrive while
/// the directory is loading are held back and run once the newest load lands.
pub fn spawn_provider(
    api: Arc<dyn ApiSource>,
    roster_parallelism: usize,
    tx: Sender<Delta>,
    cmd_rx: Receiver<ProviderCommand>,
) -> JoinHandle<()> {
    let (work_tx, work_rx) = mpsc::channel();
    let forward = work_tx.clone();
    thread::spawn(move || {
        for cmd in cmd_rx {
            if forward.send(Work::Command(cmd)).is_err() {
                return;
            }
        }
        let _ = forward.send(Work::Shutdown);
    });

    thread::spawn(move || {
        let mut directory = Arc::new(HeroDirectory::new());
        let mut generation = 0u64;
        let mut loading = false;
        let mut pending: Vec<(String, u64)> = Vec::new();

        for work in work_rx {
            match work {
                Work::Command(ProviderCommand::LoadDirectory) => {
                    generation += 1;
                    loading = true;
                    let _ = tx.send(Delta::DirectoryStatus {
                        status: DirectoryStatus::Loading,
                        heroes: 0,
                    });
                    let api = Arc::clone(&api);
                    let work_tx = work_tx.clone();
                    let started = generation;
                    thread::spawn(move || {
                        let mut fresh = HeroDirectory::new();
                        fresh.reload(api.as_ref());
                        let _ = work_tx.send(Work::DirectoryLoaded {
                            generation: started,
                            directory: fresh,
                        });
                    });
                }
                Work::DirectoryLoaded {
                    generation: loaded,
                    directory: fresh,
                } => {
                    // A newer reload supersedes this one.
                    if loaded != generation {
                        continue;
                    }
                    loading = false;
                    let status = fresh.status();
                    let heroes = fresh.len();
                    directory = Arc::new(fresh);
                    let _ = tx.send(Delta::DirectoryStatus { status, heroes });
                    if status == DirectoryStatus::Ready {
                        info(&tx, format!("Hero list loaded ({heroes} heroes)"));
                    } else {
                        warn(&tx, "Hero list unavailable; lookups will miss".to_string());
                    }
                    for (name, token) in pending.drain(..) {
                        spawn_resolve(&api, &directory, &tx, name, token);
                    }
                }
                Work::Command(ProviderCommand::FetchRosters) => {
                    let api = Arc::clone(&api);
                    let tx = tx.clone();
                    thread::spawn(move || {
                        let fetch = aggregate_all(api.as_ref(), roster_parallelism);
                        for err in fetch.errors {
                            warn(&tx, err);
                        }
                        let heroes: usize = fetch.rosters.iter().map(|r| r.heroes.len()).sum();
                        log::info!(
                            "rosters aggregated: {} roles, {heroes} heroes",
                            fetch.rosters.len()
                        );
                        let _ = tx.send(Delta::SetRosters(fetch.rosters));
                    });
                }
                Work::Command(ProviderCommand::FetchRankBoard { days, token }) => {
                    let api = Arc::clone(&api);
                    let tx = tx.clone();
                    thread::spawn(move || match fetch_rank_board(api.as_ref(), days) {
                        Ok(entries) => {
                            log::info!("rank board {days}d: {} entries", entries.len());
                            let _ = tx.send(Delta::SetRankBoard {
                                token,
                                days,
                                entries,
                            });
                        }
                        Err(err) => {
                            warn(&tx, format!("Rank board fetch error: {err:#}"));
                            let _ = tx.send(Delta::RankBoardFailed { token });
                        }
                    });
                }
                Work::Command(ProviderCommand::ResolveHero { name, token }) => {
                    if loading {
                        pending.push((name, token));
                    } else {
                        spawn_resolve(&api, &directory, &tx, name, token);
                    }
                }
                Work::Shutdown => return,
            }
        }
    })
}

fn spawn_resolve(
    api: &Arc<dyn ApiSource>,
    directory: &Arc<HeroDirectory>,
    tx: &Sender<Delta>,
    name: String,
    token: u64,
) {
    let api = Arc::clone(api);
    let directory = Arc::clone(directory);
    let tx = tx.clone();
    thread::spawn(
        move || match resolve_hero_detail(api.as_ref(), &directory, &name) {
            Ok(DetailOutcome::Detail(detail)) => {
                let _ = tx.send(Delta::SetHeroDetail { token, detail });
            }
            Ok(DetailOutcome::NotFound(name)) => {
                let _ = tx.send(Delta::HeroNotFound { token, name });
            }
            Ok(DetailOutcome::Malformed) => {
                let _ = tx.send(Delta::Log(format!(
                    "[WARN] Incomplete hero data for {name}"
                )));
            }
            Err(err) => {
                warn(&tx, format!("Hero detail fetch error: {err:#}"));
            }
        },
    );
}

fn info(tx: &Sender<Delta>, msg: String) {
    log::info!("{msg}");
    let _ = tx.send(Delta::Log(format!("[INFO] {msg}")));
}

fn warn(tx: &Sender<Delta>, msg: String) {
    log::warn!("{msg}");
    let _ = tx.send(Delta::Log(format!("[WARN] {msg}")));
}
