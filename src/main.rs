use std::fs::OpenOptions;
use std::io;
use std::sync::Arc;
use std::sync::mpsc;
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::prelude::*;
use ratatui::style::{Color, Modifier, Style};
use ratatui::widgets::{Block, Borders, Clear, Paragraph, Wrap};

use mlbb_terminal::api::HttpSource;
use mlbb_terminal::config::{AppConfig, DAY_WINDOWS};
use mlbb_terminal::directory::DirectoryStatus;
use mlbb_terminal::hero_detail::{HeroDetailView, RelationKind, plain_text};
use mlbb_terminal::provider::spawn_provider;
use mlbb_terminal::state::{AppState, Delta, Focus, ModalState, ProviderCommand, apply_delta};

const ROSTER_CELL_WIDTH: u16 = 18;

struct App {
    state: AppState,
    should_quit: bool,
    cmd_tx: Option<mpsc::Sender<ProviderCommand>>,
}

impl App {
    fn new(cmd_tx: Option<mpsc::Sender<ProviderCommand>>, days: u32) -> Self {
        Self {
            state: AppState::new(days),
            should_quit: false,
            cmd_tx,
        }
    }

    fn start(&mut self) {
        self.send(ProviderCommand::LoadDirectory, "Hero list");
        let cmd = self.state.request_rosters();
        self.send(cmd, "Roster");
        let cmd = self.state.request_rank_board(self.state.days);
        self.send(cmd, "Rank board");
    }

    fn on_key(&mut self, key: KeyEvent) {
        if self.state.help_overlay {
            if matches!(key.code, KeyCode::Esc | KeyCode::Char('?')) {
                self.state.help_overlay = false;
            } else if key.code == KeyCode::Char('q') {
                self.should_quit = true;
            }
            return;
        }

        if self.state.modal_open() {
            match key.code {
                KeyCode::Esc | KeyCode::Char('b') => self.state.close_modal(),
                KeyCode::Char('j') | KeyCode::Down => self.state.scroll_modal_down(),
                KeyCode::Char('k') | KeyCode::Up => self.state.scroll_modal_up(),
                KeyCode::Char('q') => self.should_quit = true,
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.should_quit = true,
            KeyCode::Char('d') => {
                let cmd = self.state.next_day_window();
                self.send(cmd, "Rank board");
            }
            KeyCode::Char('D') => {
                let cmd = self.state.prev_day_window();
                self.send(cmd, "Rank board");
            }
            KeyCode::Tab => self.state.toggle_focus(),
            KeyCode::Char('j') | KeyCode::Down => self.state.select_next(),
            KeyCode::Char('k') | KeyCode::Up => self.state.select_prev(),
            KeyCode::Char('l') | KeyCode::Right => self.state.select_right(),
            KeyCode::Char('h') | KeyCode::Left => self.state.select_left(),
            KeyCode::Enter => self.open_selected_hero(),
            KeyCode::Char('r') | KeyCode::Char('R') => {
                self.send(ProviderCommand::LoadDirectory, "Hero list");
                let cmd = self.state.request_rosters();
                self.send(cmd, "Roster");
            }
            KeyCode::Char('?') => self.state.help_overlay = true,
            _ => {}
        }
    }

    fn open_selected_hero(&mut self) {
        let Some(name) = self.state.selected_hero_name() else {
            self.state.push_log("[INFO] No hero selected");
            return;
        };
        let cmd = self.state.request_hero(&name);
        self.send(cmd, "Hero detail");
    }

    fn send(&mut self, cmd: ProviderCommand, what: &str) {
        let Some(tx) = &self.cmd_tx else {
            self.state.push_log(format!("[INFO] {what} fetch unavailable"));
            return;
        };
        if tx.send(cmd).is_err() {
            self.state.push_log(format!("[WARN] {what} request failed"));
        }
    }
}

fn init_logging(config: &AppConfig) {
    let Some(path) = config.log_file.as_ref() else {
        return;
    };
    let file = match OpenOptions::new().create(true).append(true).open(path) {
        Ok(file) => file,
        Err(err) => {
            eprintln!("warning: cannot open log file {}: {err}", path.display());
            return;
        }
    };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn main() -> io::Result<()> {
    let config = AppConfig::from_env();
    init_logging(&config);

    let api = HttpSource::new(&config.api_base, config.http_timeout)
        .map_err(|err| io::Error::other(format!("{err:#}")))?;
    log::info!("using api base {}", api.base());

    let (tx, rx) = mpsc::channel();
    let (cmd_tx, cmd_rx) = mpsc::channel();
    spawn_provider(Arc::new(api), config.roster_parallelism, tx, cmd_rx);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = ratatui::backend::CrosstermBackend::new(stdout);
    let mut terminal = ratatui::Terminal::new(backend)?;

    let mut app = App::new(Some(cmd_tx), config.default_days);
    app.start();
    let res = run_app(&mut terminal, &mut app, rx);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        eprintln!("error: {err}");
    }
    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    rx: mpsc::Receiver<Delta>,
) -> io::Result<()> {
    let tick_rate = Duration::from_millis(250);
    let mut last_tick = Instant::now();

    loop {
        while let Ok(delta) = rx.try_recv() {
            apply_delta(&mut app.state, delta);
        }

        terminal.draw(|f| ui(f, app))?;

        let timeout = tick_rate
            .checked_sub(last_tick.elapsed())
            .unwrap_or(Duration::ZERO);
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    app.on_key(key);
                }
            }
        }

        if last_tick.elapsed() >= tick_rate {
            last_tick = Instant::now();
        }

        if app.should_quit {
            return Ok(());
        }
    }
}

fn ui(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(14),
            Constraint::Min(4),
            Constraint::Length(4),
            Constraint::Length(1),
        ])
        .split(frame.size());

    let header = Paragraph::new(header_text(&app.state))
        .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, chunks[0]);

    render_rank_board(frame, chunks[1], &app.state);
    render_rosters(frame, chunks[2], &app.state);

    let console = Paragraph::new(console_text(&app.state))
        .style(Style::default().fg(Color::Gray))
        .block(Block::default().title("Console").borders(Borders::TOP));
    frame.render_widget(console, chunks[3]);

    let footer =
        Paragraph::new(footer_text(&app.state)).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(footer, chunks[4]);

    if app.state.modal_open() {
        render_hero_modal(frame, frame.size(), &app.state);
    }
    if app.state.help_overlay {
        render_help_overlay(frame, frame.size());
    }
}

fn header_text(state: &AppState) -> Line<'static> {
    let mut spans = vec![Span::styled(
        " MLBB STATS ",
        Style::default().fg(Color::Black).bg(Color::Red).add_modifier(Modifier::BOLD),
    )];
    spans.push(Span::raw("  Days: "));
    for days in DAY_WINDOWS {
        let label = format!(" {days} ");
        if days == state.days {
            spans.push(Span::styled(
                label,
                Style::default().fg(Color::White).bg(Color::DarkGray),
            ));
        } else {
            spans.push(Span::raw(label));
        }
    }
    spans.push(Span::raw(format!("  | {}", directory_label(state))));
    Line::from(spans)
}

fn directory_label(state: &AppState) -> String {
    match state.directory_status {
        DirectoryStatus::Uninitialized => "Heroes: -".to_string(),
        DirectoryStatus::Loading => "Heroes: loading".to_string(),
        DirectoryStatus::Ready => format!("Heroes: {}", state.directory_size),
        DirectoryStatus::Failed => "Heroes: unavailable".to_string(),
    }
}

fn footer_text(state: &AppState) -> String {
    if state.modal_open() {
        return "j/k Scroll | b/Esc Close | q Quit".to_string();
    }
    "d/D Days | Tab Focus | h/j/k/l Move | Enter Hero | r Reload | ? Help | q Quit".to_string()
}

fn focus_block(title: String, focused: bool) -> Block<'static> {
    let style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    Block::default()
        .title(title)
        .borders(Borders::ALL)
        .border_style(style)
}

fn render_rank_board(frame: &mut Frame, area: Rect, state: &AppState) {
    let mut title = format!("Top picks ({}d, mythic)", state.days);
    if state.rank_loading {
        title.push_str(" loading...");
    } else if let Some(updated) = state.rank_updated.as_ref() {
        title.push_str(&format!(" updated {updated}"));
    }
    let block = focus_block(title, state.focus == Focus::RankBoard);

    if state.rank_board.is_empty() {
        let text = if state.rank_loading {
            "Loading rank board..."
        } else {
            "No ranked heroes"
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let lines: Vec<Line> = state
        .rank_board
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let selected = state.focus == Focus::RankBoard && idx == state.rank_selected;
            let row_style = if selected {
                Style::default().fg(Color::White).bg(Color::DarkGray)
            } else {
                Style::default()
            };
            let mut spans = vec![
                Span::styled(format!("#{:<3}", entry.rank), Style::default().fg(Color::Red)),
                Span::styled(format!("{:<18}", entry.hero_name), row_style),
                Span::styled(
                    format!("WR {:>5}%", entry.win_rate),
                    Style::default().fg(Color::Green),
                ),
            ];
            if let Some(pick) = entry.pick_rate.as_ref() {
                spans.push(Span::raw(format!("  PR {pick:>5}%")));
            }
            if let Some(ban) = entry.ban_rate.as_ref() {
                spans.push(Span::raw(format!("  BR {ban:>5}%")));
            }
            Line::from(spans)
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_rosters(frame: &mut Frame, area: Rect, state: &AppState) {
    let title = if state.rosters_loading {
        "Heroes by role loading...".to_string()
    } else {
        "Heroes by role".to_string()
    };
    let block = focus_block(title, state.focus == Focus::Rosters);
    let inner = block.inner(area);

    let rosters = state.visible_rosters();
    if rosters.is_empty() {
        let text = if state.rosters_loading {
            "Loading rosters..."
        } else {
            "No heroes"
        };
        let empty = Paragraph::new(text)
            .style(Style::default().fg(Color::DarkGray))
            .block(block);
        frame.render_widget(empty, area);
        return;
    }

    let columns = (inner.width / ROSTER_CELL_WIDTH).max(1) as usize;
    let mut lines: Vec<Line> = Vec::new();
    let mut selected_line = 0usize;
    for (section_idx, roster) in rosters.iter().enumerate() {
        lines.push(Line::from(Span::styled(
            format!("{} ({})", roster.filter.title(), roster.heroes.len()),
            Style::default().add_modifier(Modifier::BOLD),
        )));
        for (row_idx, row) in roster.heroes.chunks(columns).enumerate() {
            let spans: Vec<Span> = row
                .iter()
                .enumerate()
                .map(|(col, hero)| {
                    let hero_idx = row_idx * columns + col;
                    let selected = state.focus == Focus::Rosters
                        && section_idx == state.roster_section
                        && hero_idx == state.roster_hero;
                    if selected {
                        selected_line = lines.len();
                    }
                    let style = if selected {
                        Style::default().fg(Color::White).bg(Color::DarkGray)
                    } else {
                        Style::default()
                    };
                    let width = ROSTER_CELL_WIDTH as usize;
                    let name = truncate(&hero.name, width - 1);
                    Span::styled(format!("{name:<width$}"), style)
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
    }

    let visible = inner.height as usize;
    let scroll = selected_line.saturating_sub(visible.saturating_sub(2));
    let para = Paragraph::new(lines)
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(para, area);
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max.saturating_sub(1)).collect();
    out.push('~');
    out
}

fn render_hero_modal(frame: &mut Frame, area: Rect, state: &AppState) {
    let popup_area = centered_rect(80, 80, area);
    frame.render_widget(Clear, popup_area);

    let (title, lines) = match &state.modal {
        ModalState::Closed => return,
        ModalState::Resolving { name } => (
            name.clone(),
            vec![Line::styled("Loading hero data...", Style::default().fg(Color::Gray))],
        ),
        ModalState::NotFound { name } => (
            name.clone(),
            vec![Line::styled(
                format!("Hero \"{name}\" not found in database."),
                Style::default().fg(Color::LightRed),
            )],
        ),
        ModalState::Detail(detail) => (detail.name.clone(), hero_detail_lines(detail)),
    };

    let para = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .scroll((state.modal_scroll, 0))
        .block(Block::default().title(title).borders(Borders::ALL));
    frame.render_widget(para, popup_area);
}

fn hero_detail_lines(hero: &HeroDetailView) -> Vec<Line<'static>> {
    let bold = Style::default().add_modifier(Modifier::BOLD);
    let dim = Style::default().fg(Color::DarkGray);
    let mut lines = vec![
        Line::styled(hero.name.clone(), bold.fg(Color::Yellow)),
        Line::raw(format!(
            "{} | {}",
            hero.roles.join(", "),
            hero.lanes.join(", ")
        )),
        Line::raw(format!("Difficulty: {}", hero.difficulty)),
        Line::raw(format!("Specialty: {}", hero.specialities.join(", "))),
        Line::styled(hero.head_url.clone(), dim),
        Line::raw(""),
        Line::styled("Story", bold),
        Line::raw(
            hero.story
                .clone()
                .unwrap_or_else(|| "No story provided.".to_string()),
        ),
        Line::raw(""),
        Line::styled("Skills", bold),
    ];

    for skill in &hero.skills {
        lines.push(Line::styled(skill.name.clone(), bold.fg(Color::Cyan)));
        lines.push(Line::raw(plain_text(&skill.description)));
        if !skill.tags.is_empty() {
            let spans: Vec<Span> = skill
                .tags
                .iter()
                .flat_map(|tag| {
                    let bg = tag
                        .rgb_components()
                        .map(|(r, g, b)| Color::Rgb(r, g, b))
                        .unwrap_or(Color::DarkGray);
                    [
                        Span::styled(
                            format!(" {} ", tag.label),
                            Style::default().fg(Color::White).bg(bg),
                        ),
                        Span::raw(" "),
                    ]
                })
                .collect();
            lines.push(Line::from(spans));
        }
        lines.push(Line::raw(""));
    }

    for kind in RelationKind::ALL {
        let Some(group) = hero.relation(kind) else {
            continue;
        };
        lines.push(Line::styled(kind.title(), bold));
        if !group.description.is_empty() {
            lines.push(Line::raw(plain_text(&group.description)));
        }
        for head in &group.hero_heads {
            lines.push(Line::styled(format!("  {head}"), dim));
        }
        lines.push(Line::raw(""));
    }

    if let Some(url) = hero.lore_url.as_ref() {
        lines.push(Line::styled(
            format!("Official Lore Page: {url}"),
            Style::default().fg(Color::Blue),
        ));
    }
    lines
}

fn console_text(state: &AppState) -> String {
    if state.logs.is_empty() {
        return "No alerts yet".to_string();
    }
    state
        .logs
        .iter()
        .rev()
        .take(3)
        .cloned()
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_help_overlay(frame: &mut Frame, area: Rect) {
    let popup_area = centered_rect(60, 60, area);
    frame.render_widget(Clear, popup_area);

    let text = [
        "MLBB Stats - Help",
        "",
        "Board:",
        "  d / D        Next / previous day window",
        "  Tab          Switch between rank board and rosters",
        "  j/k or ↑/↓   Move rows / role sections",
        "  h/l or ←/→   Move inside a role section",
        "  Enter        Open hero detail",
        "  r            Reload hero list and rosters",
        "",
        "Hero detail:",
        "  j/k          Scroll",
        "  b / Esc      Close",
        "",
        "  ?            Toggle help",
        "  q            Quit",
    ]
    .join("\n");

    let help = Paragraph::new(text)
        .block(Block::default().title("Help").borders(Borders::ALL))
        .style(Style::default());
    frame.render_widget(help, popup_area);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);

    let horizontal = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1]);

    horizontal[1]
}
