//! Part-of-speech tagging from hand-crafted context dictionaries.
//!
//! No learned parameters beyond counting: the model is a set of context
//! dictionaries (current word, previous/next word, previous tag, and their
//! pairings) mapping each feature to tag probabilities, combined by a
//! weighted vote during greedy left-to-right decoding. [`ContextModel::train`]
//! grid-searches the interpolation weights against a development set.
//!
//! ```rust
//! use linnet_pos::ContextModel;
//!
//! let data = vec![vec![
//!     ("the".to_string(), "DT".to_string()),
//!     ("dog".to_string(), "NN".to_string()),
//! ]];
//! let model = ContextModel::build(&data);
//! let tokens = vec!["the".to_string(), "dog".to_string()];
//! let tags = model.predict(&tokens);
//! assert_eq!(tags[0].0, "DT");
//! assert_eq!(tags[1].0, "NN");
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::hash::Hash;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use tracing::{debug, info};

/// Sentinel standing in for tokens and tags beyond the sentence edge.
pub const BOUNDARY: &str = "<#>";
/// Tag emitted when no dictionary knows anything about a token.
pub const FALLBACK_TAG: &str = "XX";

/// One sentence as `(word, pos)` pairs.
pub type TaggedSentence = Vec<(String, String)>;

type Counts<K> = HashMap<K, HashMap<String, usize>>;
type ProbTable<K> = HashMap<K, Vec<(String, f64)>>;

/// Interpolation weights for the context dictionaries.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Weights {
    pub word: f64,
    pub word_prev_pos: f64,
    pub prev_word: f64,
    pub next_word: f64,
    pub prev_word_word: f64,
    pub word_next_word: f64,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            word: 1.0,
            word_prev_pos: 1.0,
            prev_word: 1.0,
            next_word: 1.0,
            prev_word_word: 1.0,
            word_next_word: 1.0,
        }
    }
}

/// Context-dictionary tagger.
pub struct ContextModel {
    word: ProbTable<String>,
    word_prev_pos: ProbTable<(String, String)>,
    prev_word: ProbTable<String>,
    next_word: ProbTable<String>,
    prev_word_word: ProbTable<(String, String)>,
    word_next_word: ProbTable<(String, String)>,
    pub weights: Weights,
}

impl ContextModel {
    /// Count every context feature in the training data and convert the
    /// counts to per-feature tag probabilities. Weights stay at their
    /// defaults; see [`ContextModel::train`] for tuning them.
    pub fn build(data: &[TaggedSentence]) -> Self {
        let mut word: Counts<String> = HashMap::new();
        let mut word_prev_pos: Counts<(String, String)> = HashMap::new();
        let mut prev_word: Counts<String> = HashMap::new();
        let mut next_word: Counts<String> = HashMap::new();
        let mut prev_word_word: Counts<(String, String)> = HashMap::new();
        let mut word_next_word: Counts<(String, String)> = HashMap::new();

        for sentence in data {
            for (i, (curr, pos)) in sentence.iter().enumerate() {
                let prev_pos = if i > 0 { sentence[i - 1].1.as_str() } else { BOUNDARY };
                let prev = if i > 0 { sentence[i - 1].0.as_str() } else { BOUNDARY };
                let next = sentence
                    .get(i + 1)
                    .map(|(w, _)| w.as_str())
                    .unwrap_or(BOUNDARY);

                bump(&mut word, curr.clone(), pos);
                bump(&mut word_prev_pos, (curr.clone(), prev_pos.to_string()), pos);
                bump(&mut prev_word, prev.to_string(), pos);
                bump(&mut next_word, next.to_string(), pos);
                bump(&mut prev_word_word, (prev.to_string(), curr.clone()), pos);
                bump(&mut word_next_word, (curr.clone(), next.to_string()), pos);
            }
        }

        Self {
            word: to_probs(word),
            word_prev_pos: to_probs(word_prev_pos),
            prev_word: to_probs(prev_word),
            next_word: to_probs(next_word),
            prev_word_word: to_probs(prev_word_word),
            word_next_word: to_probs(word_next_word),
            weights: Weights::default(),
        }
    }

    /// Build from `trn` and grid-search every interpolation weight over
    /// {0.1, 0.5, 1.0}, keeping the combination with the best accuracy on
    /// `dev`.
    pub fn train(trn: &[TaggedSentence], dev: &[TaggedSentence]) -> Self {
        const GRID: [f64; 3] = [0.1, 0.5, 1.0];

        let mut model = Self::build(trn);
        let mut best_acc = -1.0f64;
        let mut best = model.weights;
        for &word in &GRID {
            for &word_prev_pos in &GRID {
                for &prev_word in &GRID {
                    for &next_word in &GRID {
                        for &prev_word_word in &GRID {
                            for &word_next_word in &GRID {
                                model.weights = Weights {
                                    word,
                                    word_prev_pos,
                                    prev_word,
                                    next_word,
                                    prev_word_word,
                                    word_next_word,
                                };
                                let acc = model.evaluate(dev);
                                debug!("dev accuracy {acc:5.2}% with {:?}", model.weights);
                                if acc > best_acc {
                                    best_acc = acc;
                                    best = model.weights;
                                }
                            }
                        }
                    }
                }
            }
        }
        model.weights = best;
        info!("grid search settled on {best:?} at {best_acc:.2}% dev accuracy");
        model
    }

    /// Greedy left-to-right decoding: each token takes the tag with the
    /// highest weighted vote across the dictionaries, and that decision
    /// feeds the previous-tag feature of the next token. Unknown contexts
    /// fall back to [`FALLBACK_TAG`] with score 0.
    pub fn predict(&self, tokens: &[String]) -> Vec<(String, f64)> {
        let weights = self.weights;
        let mut output: Vec<(String, f64)> = Vec::with_capacity(tokens.len());
        for i in 0..tokens.len() {
            let curr = tokens[i].as_str();
            let prev_pos = if i > 0 { output[i - 1].0.clone() } else { BOUNDARY.to_string() };
            let prev = if i > 0 { tokens[i - 1].as_str() } else { BOUNDARY };
            let next = tokens.get(i + 1).map(String::as_str).unwrap_or(BOUNDARY);

            let mut scores: HashMap<String, f64> = HashMap::new();
            vote(&mut scores, self.word.get(curr), weights.word);
            vote(
                &mut scores,
                self.word_prev_pos.get(&(curr.to_string(), prev_pos)),
                weights.word_prev_pos,
            );
            vote(&mut scores, self.prev_word.get(prev), weights.prev_word);
            vote(&mut scores, self.next_word.get(next), weights.next_word);
            vote(
                &mut scores,
                self.prev_word_word.get(&(prev.to_string(), curr.to_string())),
                weights.prev_word_word,
            );
            vote(
                &mut scores,
                self.word_next_word.get(&(curr.to_string(), next.to_string())),
                weights.word_next_word,
            );

            let best = scores
                .into_iter()
                .max_by(|(t1, s1), (t2, s2)| {
                    s1.partial_cmp(s2)
                        .unwrap_or(std::cmp::Ordering::Equal)
                        .then_with(|| t2.cmp(t1))
                })
                .unwrap_or_else(|| (FALLBACK_TAG.to_string(), 0.0));
            output.push(best);
        }
        output
    }

    /// Token accuracy of the model on gold-tagged data, as a percentage.
    pub fn evaluate(&self, data: &[TaggedSentence]) -> f64 {
        let mut total = 0usize;
        let mut correct = 0usize;
        for sentence in data {
            let tokens: Vec<String> = sentence.iter().map(|(w, _)| w.clone()).collect();
            let pred = self.predict(&tokens);
            total += sentence.len();
            correct += sentence
                .iter()
                .zip(&pred)
                .filter(|((_, gold), (tag, _))| gold == tag)
                .count();
        }
        if total == 0 {
            0.0
        } else {
            100.0 * correct as f64 / total as f64
        }
    }
}

/// Read blank-line-separated sentences of `word<TAB>pos` rows.
pub fn read_tsv(path: impl AsRef<Path>) -> Result<Vec<TaggedSentence>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open pos data {}", path.display()))?;
    let mut sentences = Vec::new();
    let mut sentence: TaggedSentence = Vec::new();
    for (lineno, line) in BufReader::new(file).lines().enumerate() {
        let line =
            line.with_context(|| format!("read line {} in {}", lineno + 1, path.display()))?;
        let mut fields = line.split_whitespace();
        match (fields.next(), fields.next()) {
            (Some(word), Some(pos)) => sentence.push((word.to_string(), pos.to_string())),
            _ => {
                if !sentence.is_empty() {
                    sentences.push(std::mem::take(&mut sentence));
                }
            }
        }
    }
    if !sentence.is_empty() {
        sentences.push(sentence);
    }
    Ok(sentences)
}

fn bump<K: Eq + Hash>(counts: &mut Counts<K>, key: K, pos: &str) {
    *counts
        .entry(key)
        .or_default()
        .entry(pos.to_string())
        .or_insert(0) += 1;
}

/// Turn raw counts into tag lists with probabilities in descending order.
fn to_probs<K: Eq + Hash>(counts: Counts<K>) -> ProbTable<K> {
    counts
        .into_iter()
        .map(|(feature, counter)| {
            let total: usize = counter.values().sum();
            let mut probs: Vec<(String, f64)> = counter
                .into_iter()
                .map(|(pos, count)| (pos, count as f64 / total as f64))
                .collect();
            probs.sort_by(|(t1, p1), (t2, p2)| {
                p2.partial_cmp(p1)
                    .unwrap_or(std::cmp::Ordering::Equal)
                    .then_with(|| t1.cmp(t2))
            });
            (feature, probs)
        })
        .collect()
}

fn vote(scores: &mut HashMap<String, f64>, probs: Option<&Vec<(String, f64)>>, weight: f64) {
    let Some(probs) = probs else { return };
    for (pos, prob) in probs {
        *scores.entry(pos.clone()).or_insert(0.0) += prob * weight;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn sent(pairs: &[(&str, &str)]) -> TaggedSentence {
        pairs
            .iter()
            .map(|(w, p)| (w.to_string(), p.to_string()))
            .collect()
    }

    fn training_data() -> Vec<TaggedSentence> {
        vec![
            sent(&[("the", "DT"), ("dog", "NN"), ("barks", "VBZ")]),
            sent(&[("the", "DT"), ("cat", "NN"), ("sleeps", "VBZ")]),
            sent(&[("a", "DT"), ("dog", "NN"), ("sleeps", "VBZ")]),
        ]
    }

    #[test]
    fn tags_seen_sentences_correctly() {
        let model = ContextModel::build(&training_data());
        let tokens: Vec<String> = ["the", "dog", "barks"].map(str::to_string).into();
        let pred = model.predict(&tokens);
        let tags: Vec<&str> = pred.iter().map(|(t, _)| t.as_str()).collect();
        assert_eq!(tags, ["DT", "NN", "VBZ"]);
        assert!(pred.iter().all(|(_, score)| *score > 0.0));
    }

    #[test]
    fn unknown_token_with_no_context_falls_back() {
        let model = ContextModel::build(&[]);
        let tokens = vec!["mystery".to_string()];
        assert_eq!(model.predict(&tokens), vec![(FALLBACK_TAG.to_string(), 0.0)]);
    }

    #[test]
    fn evaluate_scores_perfect_recall_on_training_data() {
        let model = ContextModel::build(&training_data());
        let acc = model.evaluate(&training_data());
        assert!((acc - 100.0).abs() < f64::EPSILON, "accuracy was {acc}");
    }

    #[test]
    fn train_keeps_a_weight_combination_from_the_grid() {
        let data = training_data();
        let model = ContextModel::train(&data, &data);
        let weights = [
            model.weights.word,
            model.weights.word_prev_pos,
            model.weights.prev_word,
            model.weights.next_word,
            model.weights.prev_word_word,
            model.weights.word_next_word,
        ];
        assert!(weights.iter().all(|w| [0.1, 0.5, 1.0].contains(w)));
        assert!(model.evaluate(&data) > 99.0);
    }

    #[test]
    fn reads_blank_line_separated_tsv() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "the\tDT\ndog\tNN\n\na\tDT\ncat\tNN\n").unwrap();
        let data = read_tsv(file.path()).unwrap();
        assert_eq!(data.len(), 2);
        assert_eq!(data[0][1], ("dog".to_string(), "NN".to_string()));
        assert_eq!(data[1][0], ("a".to_string(), "DT".to_string()));
    }
}
