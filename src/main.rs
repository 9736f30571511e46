pub mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use puls::{
    app_dirs::AppDirs,
    audio::{AudioOutput, SilentOutput, TerminalBell},
    config::{Config, ConfigStore, FileConfigStore},
    engine::SessionEngine,
    error::PlanError,
    history::{History, HistoryRecord},
    logging::init_logging,
    runtime::{
        AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, SessionDriver, Ticker,
    },
    workout::{WorkoutConfig, WorkoutGenerator},
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::{
        mpsc::{RecvTimeoutError, Sender},
        Arc,
    },
    time::{Duration, Instant},
};
use tracing::{info, warn};

/// How long the UI waits for input before redrawing anyway
const REDRAW_MS: u64 = 250;

/// interval training in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "Guided interval training: warmup exercises, timed work/rest rounds and a cooldown, with countdown beeps, pause, skip and stop."
)]
pub struct Cli {
    /// total warmup length in seconds (10-300)
    #[clap(long, value_parser = clap::value_parser!(u32).range(10..=300))]
    warmup: Option<u32>,

    /// total cooldown length in seconds (10-300)
    #[clap(long, value_parser = clap::value_parser!(u32).range(10..=300))]
    cooldown: Option<u32>,

    /// seconds of work per round
    #[clap(short = 'w', long, value_parser = clap::value_parser!(u32).range(1..=3600))]
    work: Option<u32>,

    /// seconds of rest after each round
    #[clap(short = 'r', long, value_parser = clap::value_parser!(u32).range(1..=3600))]
    rest: Option<u32>,

    /// number of work/rest rounds
    #[clap(short = 'n', long, value_parser = clap::value_parser!(u32).range(1..=99))]
    rounds: Option<u32>,

    /// number of warmup exercises sharing the warmup time
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=10))]
    warmup_exercises: Option<u32>,

    /// number of cooldown exercises sharing the cooldown time
    #[clap(long, value_parser = clap::value_parser!(u32).range(0..=10))]
    cooldown_exercises: Option<u32>,

    /// skip the warmup block
    #[clap(long)]
    no_warmup: bool,

    /// skip the cooldown block
    #[clap(long)]
    no_cooldown: bool,

    /// disable the terminal bell
    #[clap(long)]
    silent: bool,

    /// remember these settings for future sessions
    #[clap(long)]
    save: bool,

    /// increase log verbosity (-v info, -vv debug, -vvv trace)
    #[clap(short = 'v', long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Cli {
    /// Overlay command line flags on the stored preferences
    fn apply(&self, mut cfg: Config) -> Config {
        if let Some(v) = self.warmup {
            cfg.warmup_duration = v;
        }
        if let Some(v) = self.cooldown {
            cfg.cooldown_duration = v;
        }
        if let Some(v) = self.work {
            cfg.work_seconds = v;
        }
        if let Some(v) = self.rest {
            cfg.rest_seconds = v;
        }
        if let Some(v) = self.rounds {
            cfg.rounds = v;
        }
        if let Some(v) = self.warmup_exercises {
            cfg.warmup_exercises = v;
        }
        if let Some(v) = self.cooldown_exercises {
            cfg.cooldown_exercises = v;
        }
        if self.no_warmup {
            cfg.warmup_exercises = 0;
        }
        if self.no_cooldown {
            cfg.cooldown_exercises = 0;
        }
        if self.silent {
            cfg.sound = false;
        }
        cfg
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AppState {
    Session,
    Summary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Flow {
    Continue,
    Quit,
}

pub struct App {
    pub config: Config,
    pub driver: SessionDriver<FixedTicker>,
    pub state: AppState,
    pub started_at: Option<Instant>,
    ticker: FixedTicker,
    tx: Sender<AppEvent>,
    history: Option<History>,
    recorded: bool,
}

impl App {
    pub fn new(
        config: Config,
        ticker: FixedTicker,
        tx: Sender<AppEvent>,
        history: Option<History>,
    ) -> Result<Self, PlanError> {
        let driver = Self::build_driver(&config, ticker, tx.clone())?;
        Ok(Self {
            config,
            driver,
            state: AppState::Session,
            started_at: None,
            ticker,
            tx,
            history,
            recorded: false,
        })
    }

    fn build_driver(
        config: &Config,
        ticker: FixedTicker,
        tx: Sender<AppEvent>,
    ) -> Result<SessionDriver<FixedTicker>, PlanError> {
        let plan = WorkoutGenerator::new(WorkoutConfig::from(config)).generate()?;
        let audio: Arc<dyn AudioOutput> = if config.sound {
            Arc::new(TerminalBell::stdout())
        } else {
            Arc::new(SilentOutput)
        };
        Ok(SessionDriver::new(SessionEngine::new(plan), ticker, tx, audio))
    }

    /// Fresh workout with the same settings
    pub fn reset(&mut self) -> Result<(), PlanError> {
        self.record_history();
        self.driver = Self::build_driver(&self.config, self.ticker, self.tx.clone())?;
        self.state = AppState::Session;
        self.started_at = None;
        self.recorded = false;
        Ok(())
    }

    pub fn elapsed_seconds(&self) -> u64 {
        self.started_at.map_or(0, |t| t.elapsed().as_secs())
    }

    /// Append this workout to the history log, at most once
    pub fn record_history(&mut self) {
        if self.recorded || self.started_at.is_none() {
            return;
        }
        self.recorded = true;

        let Some(history) = &self.history else {
            return;
        };
        let plan = self.driver.engine().plan();
        let record = HistoryRecord {
            date: chrono::Local::now(),
            rounds: plan.main_steps().len(),
            warmup_steps: plan.warmup().len(),
            cooldown_steps: plan.cooldown().len(),
            elapsed_seconds: self.elapsed_seconds(),
            completed: self.driver.engine().is_complete(),
        };
        if let Err(err) = history.append(&record) {
            warn!(error = %err, "failed to record workout history");
        }
    }

    fn on_event(&mut self, event: &AppEvent) {
        if self.driver.handle(event) && self.driver.is_finished() {
            self.record_history();
            self.state = AppState::Summary;
        }
    }

    fn on_key(&mut self, key: KeyEvent) -> Flow {
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return Flow::Quit;
        }

        match (self.state, key.code) {
            (_, KeyCode::Esc | KeyCode::Char('q')) => return Flow::Quit,
            (AppState::Session, KeyCode::Enter) => {
                if self.started_at.is_none() {
                    self.started_at = Some(Instant::now());
                }
                self.driver.start();
            }
            (AppState::Session, KeyCode::Char(' ')) => self.driver.toggle_pause(),
            (AppState::Session, KeyCode::Char('n') | KeyCode::Right) => self.driver.skip(),
            (AppState::Session, KeyCode::Char('x')) => self.driver.stop(),
            (AppState::Summary, KeyCode::Char('r')) => {
                if let Err(err) = self.reset() {
                    warn!(error = %err, "could not build a new workout");
                    return Flow::Quit;
                }
            }
            _ => {}
        }
        Flow::Continue
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Some(log_path) = AppDirs::log_path() {
        init_logging(cli.verbose, &log_path)?;
    }

    let store = FileConfigStore::new();
    let config = cli.apply(store.load());
    if cli.save {
        store.save(&config)?;
        info!(path = %store.path().display(), "saved preferences");
    }

    let events = CrosstermEventSource::new();
    let ticker = FixedTicker::seconds();
    info!(interval = ?ticker.interval(), "starting puls");
    let mut app = App::new(config, ticker, events.sender(), Some(History::new()))?;

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &events);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen,)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend, E: AppEventSource>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    events: &E,
) -> Result<(), Box<dyn Error>> {
    loop {
        terminal.draw(|f| ui(app, f))?;

        match events.recv_timeout(Duration::from_millis(REDRAW_MS)) {
            Ok(AppEvent::Key(key)) => {
                if app.on_key(key) == Flow::Quit {
                    break;
                }
            }
            Ok(event) => app.on_event(&event),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    app.record_history();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}
