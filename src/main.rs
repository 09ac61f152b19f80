pub mod config;
pub mod metrics;
pub mod runtime;
pub mod session;
pub mod ui;
pub mod wordlist;

use crate::{
    config::{Config, ConfigStore, FileConfigStore},
    runtime::{AppEvent, FetchGeneration, WordsLoaded, TICK_INTERVAL},
    session::{Session, SessionConfig},
    wordlist::SupportedLanguage,
};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    sync::mpsc::{self, Sender},
};

/// terminal typing speed test with per-word feedback
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing speed test: a sampled word sequence, a fixed countdown, and live per-word correctness, accuracy, and words-per-minute. English and French word lists built in."
)]
pub struct Cli {
    /// language to pull words from
    #[clap(short = 'l', long, value_enum)]
    language: Option<SupportedLanguage>,

    /// number of seconds to run the test
    #[clap(short = 's', long)]
    seconds: Option<u64>,

    /// number of words to sample for the test
    #[clap(short = 'w', long)]
    words: Option<usize>,

    /// number of words shown per line
    #[clap(long)]
    words_per_line: Option<usize>,
}

/// Effective settings for this run: CLI flags win, then the config file,
/// then built-in defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    pub language: SupportedLanguage,
    pub duration_secs: u64,
    pub sample_size: usize,
    pub words_per_line: usize,
}

impl Settings {
    pub fn merge(cli: &Cli, stored: &Config) -> Self {
        let language = cli
            .language
            .or_else(|| SupportedLanguage::from_config_name(&stored.language))
            .unwrap_or(SupportedLanguage::English);

        Self {
            language,
            duration_secs: cli.seconds.unwrap_or(stored.duration_secs).max(1),
            sample_size: cli.words.unwrap_or(stored.sample_size).max(1),
            words_per_line: cli.words_per_line.unwrap_or(stored.words_per_line).max(1),
        }
    }

    fn session_config(&self) -> SessionConfig {
        SessionConfig {
            sample_size: self.sample_size,
            duration_secs: self.duration_secs,
            words_per_line: self.words_per_line,
            language: self.language.config_name(),
        }
    }

    fn to_config(&self) -> Config {
        Config {
            language: self.language.config_name(),
            duration_secs: self.duration_secs,
            sample_size: self.sample_size,
            words_per_line: self.words_per_line,
        }
    }
}

#[derive(Debug)]
pub struct App {
    pub settings: Settings,
    pub session: Option<Session>,
    pool: Vec<String>,
    generation: FetchGeneration,
    config_store: FileConfigStore,
}

impl App {
    pub fn new(settings: Settings, config_store: FileConfigStore) -> Self {
        Self {
            settings,
            session: None,
            pool: vec![],
            generation: FetchGeneration::default(),
            config_store,
        }
    }

    /// Kick off a load for the current language, invalidating in-flight ones.
    pub fn request_words(&mut self, tx: &Sender<AppEvent>) {
        let generation = self.generation.bump();
        runtime::spawn_word_list_fetch(tx.clone(), generation, self.settings.language);
    }

    /// A load arrived. Stale generations are dropped outright; an empty list
    /// (load failure) clears the session so the loading screen stays up.
    pub fn handle_words(&mut self, loaded: WordsLoaded) {
        if !self.generation.is_current(loaded.generation)
            || loaded.language != self.settings.language
        {
            return;
        }
        if loaded.words.is_empty() {
            self.pool.clear();
            self.session = None;
            return;
        }
        self.pool = loaded.words;
        self.restart();
    }

    /// Fresh session over the loaded pool: new sample, zeroed counters and
    /// cursor, full countdown.
    pub fn restart(&mut self) {
        if self.pool.is_empty() {
            return;
        }
        self.session = Some(Session::new(
            self.pool.clone(),
            self.settings.session_config(),
        ));
    }

    pub fn toggle_language(&mut self, tx: &Sender<AppEvent>) {
        self.settings.language = self.settings.language.toggled();
        let _ = self.config_store.save(&self.settings.to_config());
        self.request_words(tx);
    }

    pub fn on_tick(&mut self) {
        if let Some(session) = &mut self.session {
            session.on_tick();
        }
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let config_store = FileConfigStore::new();
    let settings = Settings::merge(&cli, &config_store.load());
    let mut app = App::new(settings, config_store);

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<(), Box<dyn Error>> {
    let (tx, rx) = mpsc::channel();
    runtime::spawn_ticker(tx.clone(), TICK_INTERVAL);
    runtime::spawn_input_reader(tx.clone());
    app.request_words(&tx);

    terminal.draw(|f| ui(app, f))?;

    loop {
        match rx.recv()? {
            AppEvent::Tick => {
                app.on_tick();
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Resize => {
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Words(loaded) => {
                app.handle_words(loaded);
                terminal.draw(|f| ui(app, f))?;
            }
            AppEvent::Key(key) => {
                if !handle_key(app, key, &tx) {
                    break;
                }
                terminal.draw(|f| ui(app, f))?;
            }
        }
    }

    Ok(())
}

/// Returns false when the app should exit.
fn handle_key(app: &mut App, key: KeyEvent, tx: &Sender<AppEvent>) -> bool {
    match key.code {
        KeyCode::Esc => return false,
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return false,
        KeyCode::Left => app.restart(),
        KeyCode::Right => app.toggle_language(tx),
        KeyCode::Backspace => {
            if let Some(session) = &mut app.session {
                session.backspace();
            }
        }
        KeyCode::Char(c) => {
            let finished = app.session.as_ref().map_or(false, |s| s.has_finished());
            if finished {
                match c {
                    'r' => app.restart(),
                    'l' => app.toggle_language(tx),
                    _ => {}
                }
            } else if let Some(session) = &mut app.session {
                session.write(c);
            }
        }
        _ => {}
    }
    true
}

fn ui(app: &mut App, f: &mut Frame) {
    f.render_widget(&*app, f.area());
}
