//! Gazetteer lexicons: load category wordlists, match them over tokens.
//!
//! A gazetteer directory holds one `*.txt` file per category; the file stem
//! is the label and every non-empty line is a known phrase. Matching is
//! token-aligned: a phrase only counts when it lines up with whole tokens,
//! and every window of the token sequence that equals a loaded phrase
//! yields a candidate [`Span`]. Candidates overlap freely; resolving the
//! conflicts is the caller's job (see `linnet-spans`).
//!
//! Files can be memory-mapped or read into owned buffers at runtime via
//! [`LoadMode`].
//!
//! ```no_run
//! use linnet_gazetteer::{Gazetteer, LoadMode};
//!
//! # fn main() -> anyhow::Result<()> {
//! let gaz = Gazetteer::load_with_mode("res/ner", LoadMode::Mmap)?;
//! let tokens: Vec<String> = "Atlantic City of Georgia"
//!     .split_whitespace()
//!     .map(str::to_string)
//!     .collect();
//! for span in gaz.find_spans(&tokens) {
//!     println!("{span}: {:?}", span.labels);
//! }
//! # Ok(()) }
//! ```

use std::collections::{BTreeSet, HashMap};
use std::fs::{self, File};
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use linnet_types::Span;
use memmap2::Mmap;
use tracing::{info, warn};

/// Strategy for reading gazetteer files.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum LoadMode {
    /// Memory-map each file (fast, zero-copy while parsing).
    Mmap,
    /// Read each file into an owned buffer (portable fallback).
    Owned,
}

enum Buffer {
    Mmap(Mmap),
    Owned(Vec<u8>),
}

impl Buffer {
    fn as_slice(&self) -> &[u8] {
        match self {
            Buffer::Mmap(m) => m.as_ref(),
            Buffer::Owned(v) => v.as_slice(),
        }
    }
}

/// A phrase table mapping space-joined token sequences to label sets.
#[derive(Debug, Clone, Default)]
pub struct Gazetteer {
    phrases: HashMap<String, BTreeSet<String>>,
    max_phrase_tokens: usize,
}

impl Gazetteer {
    /// Load every `*.txt` file under `dir` with owned buffers.
    pub fn load(dir: impl AsRef<Path>) -> Result<Self> {
        Self::load_with_mode(dir, LoadMode::Owned)
    }

    /// Load every `*.txt` file under `dir`; the file stem becomes the label.
    ///
    /// A phrase listed in several files carries the union of their labels.
    /// Lines are trimmed and internal whitespace is collapsed so the stored
    /// key matches the space-joined form used during matching.
    pub fn load_with_mode(dir: impl AsRef<Path>, mode: LoadMode) -> Result<Self> {
        let dir = dir.as_ref();
        let mut paths: Vec<PathBuf> = fs::read_dir(dir)
            .with_context(|| format!("read gazetteer dir {}", dir.display()))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.extension().is_some_and(|ext| ext == "txt"))
            .collect();
        paths.sort();

        let mut phrases: HashMap<String, BTreeSet<String>> = HashMap::new();
        let mut max_phrase_tokens = 0usize;
        let mut files = 0usize;
        for path in &paths {
            let Some(label) = path.file_stem().and_then(|stem| stem.to_str()) else {
                warn!("skipping gazetteer file with non-utf8 name: {}", path.display());
                continue;
            };
            let buffer = load_file(path, mode)?;
            let text = std::str::from_utf8(buffer.as_slice())
                .with_context(|| format!("{} is not valid utf-8", path.display()))?;
            for line in text.lines() {
                let words: Vec<&str> = line.split_whitespace().collect();
                if words.is_empty() {
                    continue;
                }
                max_phrase_tokens = max_phrase_tokens.max(words.len());
                phrases
                    .entry(words.join(" "))
                    .or_default()
                    .insert(label.to_string());
            }
            files += 1;
        }

        info!("loaded {} phrases from {files} gazetteer files", phrases.len());
        Ok(Self {
            phrases,
            max_phrase_tokens,
        })
    }

    /// Number of distinct phrases loaded.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Length in tokens of the longest loaded phrase.
    pub fn max_phrase_tokens(&self) -> usize {
        self.max_phrase_tokens
    }

    /// Labels attached to an exact phrase, if it is in the table.
    pub fn lookup(&self, phrase: &str) -> Option<&BTreeSet<String>> {
        self.phrases.get(phrase)
    }

    /// All candidate spans over `tokens`, overlaps included.
    ///
    /// Every window `tokens[i..i+k]` whose space-joined form is a loaded
    /// phrase produces one span, with window width bounded by the longest
    /// phrase in the table.
    pub fn find_spans(&self, tokens: &[String]) -> Vec<Span> {
        let mut spans = Vec::new();
        for start in 0..tokens.len() {
            let widest = self.max_phrase_tokens.min(tokens.len() - start);
            let mut key = String::new();
            for width in 1..=widest {
                if width > 1 {
                    key.push(' ');
                }
                key.push_str(&tokens[start + width - 1]);
                if let Some(labels) = self.phrases.get(&key) {
                    spans.push(Span {
                        text: key.clone(),
                        start,
                        end: start + width,
                        labels: labels.clone(),
                    });
                }
            }
        }
        spans
    }
}

fn load_file(path: &Path, mode: LoadMode) -> Result<Buffer> {
    match mode {
        LoadMode::Mmap => {
            let file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            unsafe { Mmap::map(&file) }
                .map(Buffer::Mmap)
                .with_context(|| format!("mmap {}", path.display()))
        }
        LoadMode::Owned => {
            let mut file = File::open(path).with_context(|| format!("open {}", path.display()))?;
            let mut buf = Vec::new();
            file.read_to_end(&mut buf)
                .with_context(|| format!("read {}", path.display()))?;
            Ok(Buffer::Owned(buf))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn make_gazetteer(files: &[(&str, &str)], mode: LoadMode) -> (TempDir, Gazetteer) {
        let dir = TempDir::new().expect("temp dir");
        for (name, body) in files {
            let mut file = File::create(dir.path().join(name)).unwrap();
            write!(file, "{body}").unwrap();
        }
        let gaz = Gazetteer::load_with_mode(dir.path(), mode).expect("load gazetteer");
        (dir, gaz)
    }

    fn toks(text: &str) -> Vec<String> {
        text.split_whitespace().map(str::to_string).collect()
    }

    #[test]
    fn labels_come_from_file_stems() {
        let (_dir, gaz) = make_gazetteer(
            &[
                ("us_city.txt", "Atlantic City\nAtlanta\n"),
                ("us_state.txt", "Georgia\n"),
                ("country.txt", "Georgia\n"),
            ],
            LoadMode::Owned,
        );
        assert_eq!(gaz.len(), 3);
        assert_eq!(gaz.max_phrase_tokens(), 2);
        let labels = gaz.lookup("Georgia").unwrap();
        assert!(labels.contains("us_state") && labels.contains("country"));
    }

    #[test]
    fn mmap_and_owned_agree() {
        let files = [("us_city.txt", "Atlantic City\n"), ("us_state.txt", "Georgia\n")];
        let (_d1, owned) = make_gazetteer(&files, LoadMode::Owned);
        let (_d2, mapped) = make_gazetteer(&files, LoadMode::Mmap);
        let tokens = toks("Atlantic City of Georgia");
        assert_eq!(owned.find_spans(&tokens), mapped.find_spans(&tokens));
    }

    #[test]
    fn finds_token_aligned_matches_including_overlaps() {
        let (_dir, gaz) = make_gazetteer(
            &[
                ("us_city.txt", "Atlantic City\nCity of Georgia\n"),
                ("us_state.txt", "Georgia\n"),
            ],
            LoadMode::Owned,
        );
        let spans = gaz.find_spans(&toks("Atlantic City of Georgia"));
        let ranges: Vec<(usize, usize)> = spans.iter().map(|s| (s.start, s.end)).collect();
        assert!(ranges.contains(&(0, 2))); // Atlantic City
        assert!(ranges.contains(&(1, 4))); // City of Georgia
        assert!(ranges.contains(&(3, 4))); // Georgia
    }

    #[test]
    fn does_not_match_inside_tokens() {
        let (_dir, gaz) = make_gazetteer(&[("us_state.txt", "Georgia\n")], LoadMode::Owned);
        assert!(gaz.find_spans(&toks("Georgian wine")).is_empty());
    }

    #[test]
    fn blank_lines_and_padding_are_ignored() {
        let (_dir, gaz) = make_gazetteer(
            &[("country.txt", "\n  Georgia  \n\nSouth   Africa\n")],
            LoadMode::Owned,
        );
        assert_eq!(gaz.len(), 2);
        assert!(gaz.lookup("South Africa").is_some());
    }
}
