use anyhow::{Context, Result};

use mlbb_terminal::api::HttpSource;
use mlbb_terminal::config::{AppConfig, DAY_WINDOWS};
use mlbb_terminal::directory::HeroDirectory;
use mlbb_terminal::hero_detail::{DetailOutcome, plain_text, resolve_hero_detail};
use mlbb_terminal::rank_board::fetch_rank_board;
use mlbb_terminal::roster::aggregate_all;

enum Mode {
    Board { days: u32 },
    Rosters,
    Heroes,
    Hero { name: String },
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let config = AppConfig::from_env();
    let mode = parse_mode_args(config.default_days)?;
    let api = HttpSource::new(&config.api_base, config.http_timeout)?;

    match mode {
        Mode::Board { days } => {
            let entries = fetch_rank_board(&api, days)?;
            println!("Top picks, last {days} day(s), mythic");
            for entry in entries {
                println!(
                    "#{:<3} {:<20} WR {:>5}%",
                    entry.rank, entry.hero_name, entry.win_rate
                );
            }
        }
        Mode::Rosters => {
            let fetch = aggregate_all(&api, config.roster_parallelism);
            for roster in fetch.rosters.iter().filter(|r| !r.heroes.is_empty()) {
                println!("{} ({})", roster.filter.title(), roster.heroes.len());
                for hero in &roster.heroes {
                    println!("  {:<20} {}", hero.name, hero.image_url);
                }
            }
            if !fetch.errors.is_empty() {
                println!("Errors: {}", fetch.errors.len());
                for err in fetch.errors.iter().take(8) {
                    println!(" - {err}");
                }
            }
        }
        Mode::Heroes => {
            let directory = load_directory(&api)?;
            for (id, name) in directory.iter() {
                println!("{id:>4}  {name}");
            }
        }
        Mode::Hero { name } => {
            let directory = load_directory(&api)?;
            match resolve_hero_detail(&api, &directory, &name)? {
                DetailOutcome::Detail(hero) => {
                    println!("{} (id {})", hero.name, hero.id);
                    println!("Roles: {}", hero.roles.join(", "));
                    println!("Lanes: {}", hero.lanes.join(", "));
                    println!("Difficulty: {}", hero.difficulty);
                    println!("Specialty: {}", hero.specialities.join(", "));
                    println!();
                    for skill in &hero.skills {
                        let tags = skill
                            .tags
                            .iter()
                            .map(|t| format!("[{}]", t.label))
                            .collect::<Vec<_>>()
                            .join(" ");
                        println!("{} {tags}", skill.name);
                        println!("  {}", plain_text(&skill.description));
                    }
                    for group in &hero.relations {
                        println!();
                        println!("{}: {}", group.kind.title(), plain_text(&group.description));
                        for head in &group.hero_heads {
                            println!("  {head}");
                        }
                    }
                    if let Some(url) = hero.lore_url.as_ref() {
                        println!();
                        println!("Lore: {url}");
                    }
                }
                DetailOutcome::NotFound(name) => {
                    println!("Hero \"{name}\" not found in database.");
                }
                DetailOutcome::Malformed => {
                    println!("Incomplete hero data for \"{name}\".");
                }
            }
        }
    }

    Ok(())
}

fn load_directory(api: &HttpSource) -> Result<HeroDirectory> {
    let mut directory = HeroDirectory::new();
    directory.reload(api);
    if !directory.is_ready() {
        return Err(anyhow::anyhow!("hero list unavailable"));
    }
    Ok(directory)
}

fn parse_mode_args(default_days: u32) -> Result<Mode> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();
    let mut mode = Mode::Board { days: default_days };
    for (idx, arg) in args.iter().enumerate() {
        let value = |prefix: &str| -> Option<String> {
            if let Some(v) = arg.strip_prefix(prefix).and_then(|v| v.strip_prefix('=')) {
                return Some(v.trim().to_string());
            }
            if arg == prefix {
                return args.get(idx + 1).map(|v| v.trim().to_string());
            }
            None
        };

        if let Some(days) = value("--days") {
            let days = days
                .parse::<u32>()
                .ok()
                .filter(|d| DAY_WINDOWS.contains(d))
                .with_context(|| format!("--days must be one of {DAY_WINDOWS:?}"))?;
            mode = Mode::Board { days };
        } else if let Some(name) = value("--hero") {
            if name.is_empty() {
                return Err(anyhow::anyhow!("--hero needs a name"));
            }
            mode = Mode::Hero { name };
        } else if arg == "--rosters" {
            mode = Mode::Rosters;
        } else if arg == "--heroes" {
            mode = Mode::Heroes;
        }
    }
    Ok(mode)
}
