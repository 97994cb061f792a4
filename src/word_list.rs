//! The list of candidate words. Words are normalised to upper case, deduplicated and sorted, so a
//! `WordId` is stable for a given input and equal ids mean equal words.

use std::fmt;
use std::fmt::{Debug, Formatter};
use std::fs;
use std::path::Path;

use smallvec::SmallVec;

use crate::errors::ParseError;
use crate::{WordId, MAX_SLOT_LENGTH};

/// A word that can be chosen for a slot. Characters are stored alongside the string so that the
/// letter at a crossing can be read in constant time.
#[derive(Clone, PartialEq, Eq)]
pub struct Word {
    pub string: String,
    pub chars: SmallVec<[char; MAX_SLOT_LENGTH]>,
}

impl Word {
    pub fn new(string: &str) -> Word {
        Word {
            string: string.to_string(),
            chars: string.chars().collect(),
        }
    }

    /// Length in characters, which is what slot lengths are measured in.
    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    /// The letter at the given index, or `None` past the end of the word.
    pub fn letter_at(&self, idx: usize) -> Option<char> {
        self.chars.get(idx).copied()
    }
}

impl Debug for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.string)
    }
}

impl fmt::Display for Word {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.string)
    }
}

#[derive(Debug, Clone, Default)]
pub struct WordList {
    words: Vec<Word>,
}

impl WordList {
    /// Build a word list from any collection of strings. Each entry is trimmed and upper-cased;
    /// blank entries are dropped and duplicates collapsed.
    pub fn from_words<I, S>(words: I) -> WordList
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut strings: Vec<String> = words.into_iter()
            .map(|word| word.as_ref().trim().to_uppercase())
            .filter(|word| !word.is_empty())
            .collect();

        strings.sort();
        strings.dedup();

        WordList {
            words: strings.iter().map(|string| Word::new(string)).collect(),
        }
    }

    /// Parse a word list with one word per line.
    pub fn parse_from_str(contents: &str) -> WordList {
        WordList::from_words(contents.lines())
    }

    /// Read and parse a word list file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<WordList, ParseError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        Ok(WordList::parse_from_str(&contents))
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn get(&self, word_id: WordId) -> &Word {
        &self.words[word_id]
    }

    pub fn iter(&self) -> impl Iterator<Item = &Word> {
        self.words.iter()
    }

    /// Look up the id of a word, after the same normalisation applied on load.
    pub fn find(&self, word: &str) -> Option<WordId> {
        let word = word.trim().to_uppercase();
        self.words.binary_search_by(|candidate| candidate.string.cmp(&word)).ok()
    }
}
