use clap::ValueEnum;
use include_dir::{include_dir, Dir};
use rand::seq::SliceRandom;
use std::error::Error;
use unicode_normalization::UnicodeNormalization;

static WORDS_DIR: Dir = include_dir!("src/words");

/// Languages with an embedded word list
#[derive(Debug, Copy, Clone, PartialEq, Eq, ValueEnum, strum_macros::Display)]
pub enum SupportedLanguage {
    English,
    French,
}

impl SupportedLanguage {
    fn file_name(&self) -> &'static str {
        match self {
            SupportedLanguage::English => "english.txt",
            SupportedLanguage::French => "french.txt",
        }
    }

    /// The other language, for the runtime toggle
    pub fn toggled(&self) -> Self {
        match self {
            SupportedLanguage::English => SupportedLanguage::French,
            SupportedLanguage::French => SupportedLanguage::English,
        }
    }

    /// Lowercase name used in the config file and the results log
    pub fn config_name(&self) -> String {
        self.to_string().to_lowercase()
    }

    pub fn from_config_name(name: &str) -> Option<Self> {
        match name {
            "english" => Some(SupportedLanguage::English),
            "french" => Some(SupportedLanguage::French),
            _ => None,
        }
    }
}

/// The full normalized word list for one language
#[derive(Debug, Clone)]
pub struct WordList {
    pub name: String,
    pub words: Vec<String>,
}

impl WordList {
    pub fn load(language: SupportedLanguage) -> Result<Self, Box<dyn Error>> {
        let file = WORDS_DIR
            .get_file(language.file_name())
            .ok_or_else(|| format!("word list {} not found", language.file_name()))?;

        let text = file
            .contents_utf8()
            .ok_or_else(|| format!("word list {} is not valid utf-8", language.file_name()))?;

        let words = parse_word_file(text);
        if words.is_empty() {
            return Err(format!("word list {} is empty", language.file_name()).into());
        }

        Ok(Self {
            name: language.config_name(),
            words,
        })
    }
}

/// Newline-delimited file to normalized words, blank lines dropped
pub fn parse_word_file(text: &str) -> Vec<String> {
    text.lines()
        .map(normalize)
        .filter(|w| !w.is_empty())
        .collect()
}

/// Trim, lowercase, canonical decomposition, combining marks removed.
/// Applied to both word-list entries and committed tokens, so comparison
/// is case- and accent-insensitive.
pub fn normalize(raw: &str) -> String {
    raw.trim()
        .to_lowercase()
        .nfd()
        .filter(|c| !unicode_normalization::char::is_combining_mark(*c))
        .collect()
}

/// Draw `count` words from `pool` without replacement within the draw.
/// A pool smaller than `count` yields the whole pool in random order.
pub fn sample_words(pool: &[String], count: usize) -> Vec<String> {
    let mut rng = rand::thread_rng();
    pool.choose_multiple(&mut rng, count).cloned().collect()
}
