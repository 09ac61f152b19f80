use std::sync::mpsc::Sender;
use std::thread;
use std::time::Duration;

use crossterm::event::{self, Event as CtEvent, KeyEvent};

use crate::wordlist::{SupportedLanguage, WordList};

/// Countdown cadence: the session's timer is whole seconds.
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Unified event type consumed by the app loop
#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize,
    Tick,
    Words(WordsLoaded),
}

/// Result of one word-list load, tagged with the generation current when the
/// load was requested. Failure arrives as an empty list.
#[derive(Clone, Debug)]
pub struct WordsLoaded {
    pub generation: u64,
    pub language: SupportedLanguage,
    pub words: Vec<String>,
}

/// Counter identifying the most recent word-list request. A loader captures
/// the value at spawn time; arrivals with any other value are stale and must
/// be dropped, so a slow load can never clobber a newer session's list.
#[derive(Debug, Default)]
pub struct FetchGeneration(u64);

impl FetchGeneration {
    pub fn current(&self) -> u64 {
        self.0
    }

    /// Invalidate all in-flight loads and return the new generation.
    pub fn bump(&mut self) -> u64 {
        self.0 += 1;
        self.0
    }

    pub fn is_current(&self, generation: u64) -> bool {
        self.0 == generation
    }
}

/// Ticker thread: one Tick per interval for the life of the channel.
pub fn spawn_ticker(tx: Sender<AppEvent>, interval: Duration) {
    thread::spawn(move || loop {
        if tx.send(AppEvent::Tick).is_err() {
            break;
        }
        thread::sleep(interval);
    });
}

/// Keyboard/resize reader thread over crossterm's blocking `read`.
pub fn spawn_input_reader(tx: Sender<AppEvent>) {
    thread::spawn(move || loop {
        match event::read() {
            Ok(CtEvent::Key(key)) => {
                if tx.send(AppEvent::Key(key)).is_err() {
                    break;
                }
            }
            Ok(CtEvent::Resize(_, _)) => {
                if tx.send(AppEvent::Resize).is_err() {
                    break;
                }
            }
            Ok(_) => {}
            Err(_) => break,
        }
    });
}

/// Fire-and-forget word-list load. On failure the error is logged and an
/// empty list is delivered; the receiver decides what to render.
pub fn spawn_word_list_fetch(tx: Sender<AppEvent>, generation: u64, language: SupportedLanguage) {
    thread::spawn(move || {
        let words = match WordList::load(language) {
            Ok(list) => list.words,
            Err(err) => {
                eprintln!("error loading {language} word list: {err}");
                vec![]
            }
        };
        let _ = tx.send(AppEvent::Words(WordsLoaded {
            generation,
            language,
            words,
        }));
    });
}
