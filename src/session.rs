use crate::metrics;
use crate::wordlist::{normalize, sample_words};
use chrono::prelude::*;
use directories::ProjectDirs;
use std::fs::OpenOptions;
use std::io::{self, Write};

pub const DEFAULT_DURATION_SECS: u64 = 60;
pub const DEFAULT_SAMPLE_SIZE: usize = 200;
pub const DEFAULT_WORDS_PER_LINE: usize = 16;

/// Classification of one sampled word. Correct/Incorrect are final once set.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WordState {
    Upcoming,
    Current,
    Correct,
    Incorrect,
}

/// Lifecycle of a test run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Active,
    Finished,
}

#[derive(Debug, Clone)]
pub struct SessionConfig {
    pub sample_size: usize,
    pub duration_secs: u64,
    pub words_per_line: usize,
    pub language: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            duration_secs: DEFAULT_DURATION_SECS,
            words_per_line: DEFAULT_WORDS_PER_LINE,
            language: "english".to_string(),
        }
    }
}

/// One test run being displayed to the user. Mutated by keystroke and tick
/// events only; replaced wholesale on restart or language switch.
#[derive(Debug)]
pub struct Session {
    pub config: SessionConfig,
    pool: Vec<String>,
    pub words: Vec<String>,
    pub word_states: Vec<WordState>,
    pub cursor: usize,
    pub input_buffer: String,
    pub phase: Phase,
    pub time_remaining: u64,
    pub typed_count: usize,
    pub mistake_count: usize,
    pub wpm_coords: Vec<(f64, f64)>,
    pub std_dev: f64,
}

impl Session {
    /// Sample a fresh word sequence from `pool` and start idle.
    pub fn new(pool: Vec<String>, config: SessionConfig) -> Self {
        let words = sample_words(&pool, config.sample_size);
        Self::build(pool, words, config)
    }

    /// Use `words` verbatim, in order. The pool for exhaustion resampling is
    /// the same sequence.
    pub fn from_words(words: Vec<String>, config: SessionConfig) -> Self {
        Self::build(words.clone(), words, config)
    }

    fn build(pool: Vec<String>, words: Vec<String>, config: SessionConfig) -> Self {
        let mut word_states = vec![WordState::Upcoming; words.len()];
        if let Some(first) = word_states.first_mut() {
            *first = WordState::Current;
        }

        Self {
            time_remaining: config.duration_secs,
            config,
            pool,
            words,
            word_states,
            cursor: 0,
            input_buffer: String::new(),
            phase: Phase::Idle,
            typed_count: 0,
            mistake_count: 0,
            wpm_coords: vec![],
            std_dev: 0.0,
        }
    }

    /// Feed one typed character. A space commits the buffered token; anything
    /// else extends the buffer and, on the first non-whitespace character,
    /// starts the countdown. Ignored once finished.
    pub fn write(&mut self, c: char) {
        if self.phase == Phase::Finished || self.words.is_empty() {
            return;
        }

        if c.is_whitespace() {
            if normalize(&self.input_buffer).is_empty() {
                // A lone space neither starts the clock nor commits
                self.input_buffer.clear();
            } else {
                self.commit_word();
            }
            return;
        }

        if self.phase == Phase::Idle {
            self.phase = Phase::Active;
        }
        self.input_buffer.push(c);
    }

    pub fn backspace(&mut self) {
        if self.phase != Phase::Finished {
            self.input_buffer.pop();
        }
    }

    /// Finalize the buffered token against the word at the cursor.
    pub fn commit_word(&mut self) {
        let token = normalize(&self.input_buffer);
        self.input_buffer.clear();
        if token.is_empty() || self.cursor >= self.words.len() {
            return;
        }

        if token == self.words[self.cursor] {
            self.typed_count += 1;
            self.word_states[self.cursor] = WordState::Correct;
        } else {
            self.mistake_count += 1;
            self.word_states[self.cursor] = WordState::Incorrect;
        }

        let elapsed = self
            .config
            .duration_secs
            .saturating_sub(self.time_remaining)
            .max(1);
        self.wpm_coords.push((
            elapsed as f64,
            metrics::words_per_minute(self.typed_count, elapsed),
        ));

        self.cursor += 1;
        if self.cursor == self.words.len() {
            self.extend_words();
        }
        if let Some(state) = self.word_states.get_mut(self.cursor) {
            *state = WordState::Current;
        }
    }

    /// The sample ran out with time on the clock: draw a fresh batch from the
    /// retained pool and append it.
    fn extend_words(&mut self) {
        let batch = sample_words(&self.pool, self.config.sample_size);
        self.word_states
            .extend(std::iter::repeat(WordState::Upcoming).take(batch.len()));
        self.words.extend(batch);
    }

    /// One second elapsed. Meaningful only while active.
    pub fn on_tick(&mut self) {
        if self.phase != Phase::Active {
            return;
        }
        self.time_remaining = self.time_remaining.saturating_sub(1);
        if self.time_remaining == 0 {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::Finished;
        let rates: Vec<f64> = self.wpm_coords.iter().map(|(_, wpm)| *wpm).collect();
        self.std_dev = metrics::std_dev(&rates).unwrap_or(0.0);
        let _ = self.save_results();
    }

    pub fn has_started(&self) -> bool {
        self.phase != Phase::Idle
    }

    pub fn has_finished(&self) -> bool {
        self.phase == Phase::Finished
    }

    pub fn accuracy(&self) -> f64 {
        metrics::accuracy(self.typed_count, self.mistake_count)
    }

    /// Speed projected over the configured duration, the figure shown on the
    /// results panel.
    pub fn wpm(&self) -> f64 {
        metrics::words_per_minute(self.typed_count, self.config.duration_secs).round()
    }

    /// Zero-based index of the line holding the cursor.
    pub fn current_line(&self) -> usize {
        self.cursor / self.config.words_per_line
    }

    /// Word-index bounds `[start, end)` of the line holding the cursor.
    pub fn line_bounds(&self) -> (usize, usize) {
        let start = self.current_line() * self.config.words_per_line;
        let end = (start + self.config.words_per_line).min(self.words.len());
        (start, end)
    }

    pub fn save_results(&self) -> io::Result<()> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "frappe") {
            let config_dir = proj_dirs.config_dir();
            let log_path = config_dir.join("log.csv");

            std::fs::create_dir_all(config_dir)?;

            let needs_header = !log_path.exists();

            let mut log_file = OpenOptions::new()
                .append(true)
                .create(true)
                .open(log_path)?;

            if needs_header {
                writeln!(
                    log_file,
                    "date,language,duration_secs,typed,mistakes,accuracy,wpm"
                )?;
            }

            writeln!(
                log_file,
                "{},{},{},{},{},{:.2},{}",
                Local::now().format("%c"),
                self.config.language,
                self.config.duration_secs,
                self.typed_count,
                self.mistake_count,
                self.accuracy(),
                self.wpm(),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn words(list: &[&str]) -> Vec<String> {
        list.iter().map(|w| w.to_string()).collect()
    }

    fn short_session(list: &[&str]) -> Session {
        Session::from_words(words(list), SessionConfig::default())
    }

    fn type_word(session: &mut Session, word: &str) {
        for c in word.chars() {
            session.write(c);
        }
        session.write(' ');
    }

    fn assert_state_invariant(session: &Session) {
        assert_eq!(session.words.len(), session.word_states.len());
        for (i, state) in session.word_states.iter().enumerate() {
            match i.cmp(&session.cursor) {
                std::cmp::Ordering::Less => assert!(
                    matches!(state, WordState::Correct | WordState::Incorrect),
                    "word {i} before cursor is {state:?}"
                ),
                std::cmp::Ordering::Equal => {
                    assert_eq!(*state, WordState::Current, "word at cursor is {state:?}")
                }
                std::cmp::Ordering::Greater => {
                    assert_eq!(*state, WordState::Upcoming, "word {i} after cursor is {state:?}")
                }
            }
        }
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = short_session(&["chat", "chien", "oiseau"]);

        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.cursor, 0);
        assert_eq!(session.typed_count, 0);
        assert_eq!(session.mistake_count, 0);
        assert_eq!(session.time_remaining, DEFAULT_DURATION_SECS);
        assert!(session.input_buffer.is_empty());
        assert_state_invariant(&session);
    }

    #[test]
    fn test_sampled_session_matches_sample_size() {
        let pool: Vec<String> = (0..500).map(|i| format!("w{i}")).collect();
        let session = Session::new(pool, SessionConfig::default());

        assert_eq!(session.words.len(), DEFAULT_SAMPLE_SIZE);
        assert_state_invariant(&session);
    }

    #[test]
    fn test_first_keystroke_starts_countdown() {
        let mut session = short_session(&["chat"]);

        assert!(!session.has_started());
        session.write('c');
        assert_eq!(session.phase, Phase::Active);
    }

    #[test]
    fn test_space_on_empty_buffer_is_a_no_op() {
        let mut session = short_session(&["chat"]);

        session.write(' ');

        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.cursor, 0);
        assert_eq!(session.mistake_count, 0);
    }

    #[test]
    fn test_commit_correct_word() {
        let mut session = short_session(&["chat", "chien", "oiseau"]);

        type_word(&mut session, "chat");

        assert_eq!(session.typed_count, 1);
        assert_eq!(session.mistake_count, 0);
        assert_eq!(session.cursor, 1);
        assert_eq!(session.word_states[0], WordState::Correct);
        assert!(session.input_buffer.is_empty());
        assert_state_invariant(&session);
    }

    #[test]
    fn test_commit_incorrect_word() {
        let mut session = short_session(&["chat", "chien"]);

        type_word(&mut session, "xxx");

        assert_eq!(session.typed_count, 0);
        assert_eq!(session.mistake_count, 1);
        assert_eq!(session.word_states[0], WordState::Incorrect);
        assert_state_invariant(&session);
    }

    #[test]
    fn test_two_correct_commits_in_sequence() {
        let mut session = short_session(&["chat", "chien", "oiseau"]);

        type_word(&mut session, "chat");
        type_word(&mut session, "chien");

        assert_eq!(session.typed_count, 2);
        assert_eq!(session.mistake_count, 0);
        assert_eq!(session.cursor, 2);
        assert_eq!(session.accuracy(), 100.0);
    }

    #[test]
    fn test_commit_is_accent_and_case_insensitive() {
        let mut session = short_session(&["ete", "deja"]);

        type_word(&mut session, "Été");
        type_word(&mut session, "déjà");

        assert_eq!(session.typed_count, 2);
        assert_eq!(session.mistake_count, 0);
    }

    #[test]
    fn test_classification_is_final() {
        let mut session = short_session(&["chat", "chien", "oiseau"]);

        type_word(&mut session, "xxx");
        type_word(&mut session, "chien");

        assert_eq!(session.word_states[0], WordState::Incorrect);
        assert_eq!(session.word_states[1], WordState::Correct);
        assert_state_invariant(&session);
    }

    #[test]
    fn test_backspace_edits_buffer() {
        let mut session = short_session(&["chat"]);

        session.write('c');
        session.write('h');
        session.write('x');
        session.backspace();
        session.write('a');
        session.write('t');
        session.write(' ');

        assert_eq!(session.typed_count, 1);
        assert_eq!(session.mistake_count, 0);
    }

    #[test]
    fn test_backspace_on_empty_buffer() {
        let mut session = short_session(&["chat"]);

        session.backspace();
        assert!(session.input_buffer.is_empty());
        assert_eq!(session.phase, Phase::Idle);
    }

    #[test]
    fn test_tick_decrements_only_while_active() {
        let mut session = short_session(&["chat"]);

        session.on_tick();
        assert_eq!(session.time_remaining, DEFAULT_DURATION_SECS);

        session.write('c');
        session.on_tick();
        assert_eq!(session.time_remaining, DEFAULT_DURATION_SECS - 1);
    }

    #[test]
    fn test_countdown_reaches_zero_and_finishes() {
        let config = SessionConfig {
            duration_secs: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::from_words(words(&["chat", "chien"]), config);

        session.write('c');
        for _ in 0..3 {
            session.on_tick();
        }

        assert_eq!(session.time_remaining, 0);
        assert_eq!(session.phase, Phase::Finished);

        // Further ticks and input are inert
        session.on_tick();
        assert_eq!(session.time_remaining, 0);
        session.write('h');
        session.write(' ');
        assert_eq!(session.cursor, 0);
        assert_eq!(session.mistake_count, 0);
    }

    #[test]
    fn test_timer_never_goes_below_zero() {
        let config = SessionConfig {
            duration_secs: 1,
            ..SessionConfig::default()
        };
        let mut session = Session::from_words(words(&["chat"]), config);

        session.write('c');
        for _ in 0..5 {
            session.on_tick();
        }
        assert_eq!(session.time_remaining, 0);
    }

    #[test]
    fn test_accuracy_derivation() {
        let mut session = short_session(&["chat", "chien", "oiseau", "pomme"]);

        assert_eq!(session.accuracy(), 100.0);

        type_word(&mut session, "chat");
        type_word(&mut session, "xxx");
        type_word(&mut session, "oiseau");

        let expected = 2.0 / 3.0 * 100.0;
        assert!((session.accuracy() - expected).abs() < 1e-9);
    }

    #[test]
    fn test_wpm_projection() {
        let config = SessionConfig {
            duration_secs: 60,
            ..SessionConfig::default()
        };
        let mut session = Session::from_words(
            (0..50).map(|i| format!("w{i}")).collect::<Vec<_>>(),
            config,
        );

        for i in 0..30 {
            type_word(&mut session, &format!("w{i}"));
        }

        // 30 correct words over a 60s window projects to 30 wpm
        assert_eq!(session.wpm(), 30.0);
    }

    #[test]
    fn test_exhaustion_appends_fresh_batch() {
        let config = SessionConfig {
            sample_size: 3,
            ..SessionConfig::default()
        };
        let mut session = Session::from_words(words(&["chat", "chien", "oiseau"]), config);

        type_word(&mut session, "chat");
        type_word(&mut session, "chien");
        type_word(&mut session, "oiseau");

        assert_eq!(session.typed_count, 3);
        assert_eq!(session.words.len(), 6);
        assert_eq!(session.cursor, 3);
        assert_eq!(session.phase, Phase::Active);
        assert_state_invariant(&session);
    }

    #[test]
    fn test_invariant_holds_across_a_long_run() {
        let pool: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
        let config = SessionConfig {
            sample_size: 10,
            ..SessionConfig::default()
        };
        let mut session = Session::new(pool, config);

        for i in 0..25 {
            let expected = session.words[session.cursor].clone();
            if i % 3 == 0 {
                type_word(&mut session, "zzz");
            } else {
                type_word(&mut session, &expected);
            }
            assert_state_invariant(&session);
        }
        assert_eq!(session.typed_count + session.mistake_count, 25);
    }

    #[test]
    fn test_line_bounds_advance_with_cursor() {
        let list: Vec<String> = (0..40).map(|i| format!("w{i}")).collect();
        let mut session = Session::from_words(list, SessionConfig::default());

        assert_eq!(session.current_line(), 0);
        assert_eq!(session.line_bounds(), (0, 16));

        for i in 0..16 {
            type_word(&mut session, &format!("w{i}"));
        }

        assert_eq!(session.current_line(), 1);
        assert_eq!(session.line_bounds(), (16, 32));
    }

    #[test]
    fn test_wpm_coords_recorded_per_commit() {
        let mut session = short_session(&["chat", "chien", "oiseau"]);

        type_word(&mut session, "chat");
        session.on_tick();
        type_word(&mut session, "chien");

        assert_eq!(session.wpm_coords.len(), 2);
        let (t0, _) = session.wpm_coords[0];
        let (t1, _) = session.wpm_coords[1];
        assert!(t0 <= t1);
    }

    #[test]
    fn test_restart_is_a_fresh_session() {
        let pool: Vec<String> = (0..50).map(|i| format!("w{i}")).collect();
        let mut session = Session::new(pool.clone(), SessionConfig::default());

        let first = session.words[session.cursor].clone();
        type_word(&mut session, &first);
        session.on_tick();

        // Restart replaces the session wholesale
        session = Session::new(pool, SessionConfig::default());

        assert_eq!(session.cursor, 0);
        assert_eq!(session.typed_count, 0);
        assert_eq!(session.mistake_count, 0);
        assert_eq!(session.time_remaining, DEFAULT_DURATION_SECS);
        assert_eq!(session.phase, Phase::Idle);
        assert!(session.input_buffer.is_empty());
        assert_state_invariant(&session);
    }

    #[test]
    fn test_write_on_empty_word_list_is_inert() {
        let mut session = Session::from_words(vec![], SessionConfig::default());

        session.write('a');
        session.write(' ');

        assert_eq!(session.phase, Phase::Idle);
        assert_eq!(session.cursor, 0);
    }
}
