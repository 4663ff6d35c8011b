use std::io::{self, Write};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::event::{self, Event, KeyCode, KeyEventKind};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Alignment, Constraint, Direction, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Gauge, List, ListItem, Paragraph};
use ratatui::{Frame, Terminal};
use rusqlite::Connection;
use tracing::error;

use crate::config::Settings;
use crate::model::{self, Task};
use crate::timer::{format_clock, Phase, PhaseEnd, Timer};

const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// What the screen is currently capturing keys for.
#[derive(Debug, PartialEq, Eq)]
enum InputMode {
    Normal,
    /// Typing the name of a new task into the footer line.
    AddingTask { name: String },
}

/// The whole screen state: the timer, the task list view, and the
/// footer input line. Key handling lives here so it can be exercised
/// without a terminal.
pub struct App {
    timer: Timer,
    tasks: Vec<Task>,
    mute: bool,
    mode: InputMode,
    status: Option<String>,
}

impl App {
    pub fn new(timer: Timer, tasks: Vec<Task>, mute: bool) -> Self {
        App {
            timer,
            tasks,
            mute,
            mode: InputMode::Normal,
            status: None,
        }
    }

    /// Handle one key press. Returns true when the user asked to quit.
    fn handle_key(&mut self, db: &Connection, code: KeyCode) -> bool {
        if let InputMode::AddingTask { ref mut name } = self.mode {
            match code {
                KeyCode::Char(c) => name.push(c),
                KeyCode::Backspace => {
                    name.pop();
                }
                KeyCode::Esc => self.mode = InputMode::Normal,
                KeyCode::Enter => {
                    let name = std::mem::take(name);
                    self.mode = InputMode::Normal;
                    self.submit_task(db, name);
                }
                _ => {}
            }
            return false;
        }

        match code {
            KeyCode::Char('q') => return true,
            KeyCode::Char(' ') => {
                if self.timer.is_running() {
                    self.timer.pause();
                } else {
                    self.timer.start();
                }
            }
            KeyCode::Char('r') => self.timer.reset(),
            KeyCode::Char('f') => self.timer.switch_phase(Phase::Focus),
            KeyCode::Char('b') => self.timer.switch_phase(Phase::ShortBreak),
            KeyCode::Char('l') => self.timer.switch_phase(Phase::LongBreak),
            KeyCode::Char('a') => {
                self.status = None;
                self.mode = InputMode::AddingTask {
                    name: String::new(),
                };
            }
            _ => {}
        }
        false
    }

    /// Save a task typed into the footer. A failed write leaves the
    /// list exactly as it was; the new row is only appended once the
    /// store reports it back.
    fn submit_task(&mut self, db: &Connection, name: String) {
        match model::add_task(db, &name, 1) {
            Ok(Some(task)) => {
                self.status = Some(format!("Added '{}'.", task.name));
                self.tasks.push(task);
            }
            Ok(None) => {
                self.status = Some("Nothing added: the task name is empty.".to_string());
            }
            Err(err) => {
                error!("Failed to save task: {:#}", err);
                self.status = Some("Could not save the task, see pomo.log.".to_string());
            }
        }
    }

    /// Advance the timer by one second and raise the attention pulse
    /// on a phase boundary, unless muted.
    fn on_tick(&mut self) -> Option<PhaseEnd> {
        let end = self.timer.tick()?;
        if !self.mute {
            attention_pulse();
        }
        self.status = Some(format!(
            "{} finished. Press space to start the {}.",
            end.finished.label(),
            end.next.label().to_lowercase()
        ));
        Some(end)
    }
}

/// Fire-and-forget terminal bell.
fn attention_pulse() {
    let mut stdout = io::stdout();
    let _ = stdout.write_all(b"\x07");
    let _ = stdout.flush();
}

pub fn run(db: Connection, settings: &Settings) -> Result<()> {
    // a failed read is logged and the screen starts from an empty list
    let tasks = match model::list_tasks(&db) {
        Ok(tasks) => tasks,
        Err(err) => {
            error!("Failed to load tasks: {:#}", err);
            Vec::new()
        }
    };
    let mut app = App::new(Timer::new(settings.durations()), tasks, settings.mute);

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &db);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn run_app<B: Backend>(terminal: &mut Terminal<B>, app: &mut App, db: &Connection) -> Result<()> {
    let mut last_tick = Instant::now();
    loop {
        terminal.draw(|frame| draw(frame, app))?;

        // wake up for a key or for the next whole second, whichever
        // comes first
        let timeout = TICK_INTERVAL.saturating_sub(last_tick.elapsed());
        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press && app.handle_key(db, key.code) {
                    return Ok(());
                }
            }
        }
        if last_tick.elapsed() >= TICK_INTERVAL {
            app.on_tick();
            last_tick = Instant::now();
        }
    }
}

fn draw(frame: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(vec![
            Constraint::Length(5),
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(2),
        ])
        .split(frame.area());

    let state = if app.timer.is_running() {
        Span::styled("running", Style::default().fg(Color::Green))
    } else {
        Span::styled("paused", Style::default().fg(Color::DarkGray))
    };
    let timer_lines = vec![
        Line::from(vec![
            Span::styled(
                app.timer.phase().label(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            state,
        ]),
        Line::from(Span::styled(
            format_clock(app.timer.remaining_seconds()),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::raw(format!(
            "{} focus sessions completed",
            app.timer.completed_focus_count()
        ))),
    ];
    let timer_pane = Paragraph::new(timer_lines)
        .alignment(Alignment::Center)
        .block(Block::default().title("pomo").borders(Borders::ALL));
    frame.render_widget(timer_pane, chunks[0]);

    let gauge = Gauge::default()
        .block(Block::default().borders(Borders::ALL))
        .gauge_style(Style::default().fg(Color::Yellow))
        .ratio(app.timer.progress());
    frame.render_widget(gauge, chunks[1]);

    let items: Vec<ListItem> = app
        .tasks
        .iter()
        .map(|task| {
            let marker = if task.completed { "[x]" } else { "[ ]" };
            let style = if task.completed {
                Style::default()
                    .fg(Color::DarkGray)
                    .add_modifier(Modifier::CROSSED_OUT)
            } else {
                Style::default()
            };
            ListItem::new(Line::from(vec![
                Span::raw(format!("{} ", marker)),
                Span::styled(task.name.clone(), style),
                Span::styled(
                    format!("  (priority {})", task.priority),
                    Style::default().fg(Color::DarkGray),
                ),
            ]))
        })
        .collect();
    let list = List::new(items).block(Block::default().title("tasks").borders(Borders::ALL));
    frame.render_widget(list, chunks[2]);

    let footer_lines = match &app.mode {
        InputMode::AddingTask { name } => vec![
            Line::from(vec![
                Span::raw("New task: "),
                Span::styled(name.clone(), Style::default().fg(Color::Cyan)),
                Span::styled("_", Style::default().add_modifier(Modifier::SLOW_BLINK)),
            ]),
            Line::from(Span::styled(
                "enter save   esc cancel",
                Style::default().fg(Color::DarkGray),
            )),
        ],
        InputMode::Normal => vec![
            Line::from(Span::raw(app.status.clone().unwrap_or_default())),
            Line::from(Span::styled(
                "space start/pause   r reset   f/b/l phase   a add task   q quit",
                Style::default().fg(Color::DarkGray),
            )),
        ],
    };
    let footer = Paragraph::new(footer_lines);
    frame.render_widget(footer, chunks[3]);
}
