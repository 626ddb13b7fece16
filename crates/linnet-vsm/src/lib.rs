//! Vector-space document models.
//!
//! Documents are bags of tokens; [`vectorize`] turns a corpus into sparse
//! term vectors under a chosen [`Weighting`] scheme and [`cosine`] compares
//! them. [`similar_documents`] pairs every document of one corpus with its
//! nearest neighbor in another, which is enough to line up two editions of
//! the same fable collection.
//!
//! ```rust
//! use linnet_vsm::{Document, Weighting, cosine, vectorize};
//!
//! let docs = vec![
//!     Document::new("ant", ["the", "ant", "and", "the", "dove"]),
//!     Document::new("fox", ["the", "fox", "and", "the", "crow"]),
//! ];
//! let vectors = vectorize(&docs, Weighting::TfIdf);
//! let sim = cosine(&vectors["ant"], &vectors["fox"]);
//! assert!(sim < 1.0);
//! ```

use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// A titled bag of tokens.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Document {
    pub title: String,
    pub tokens: Vec<String>,
}

impl Document {
    pub fn new<T, I, S>(title: T, tokens: I) -> Self
    where
        T: Into<String>,
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            title: title.into(),
            tokens: tokens.into_iter().map(Into::into).collect(),
        }
    }
}

/// Sparse term vector keyed by term.
pub type TermVector = HashMap<String, f64>;

/// Term-weighting schemes for [`vectorize`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Weighting {
    /// Raw term counts.
    RawTf,
    /// `alpha + (1 - alpha) * tf / max_tf`, dampening document length.
    NormalizedTf { alpha: f64 },
    /// `1 + ln(tf)`.
    LogTf,
    /// `tf * ln(D / df)`.
    TfIdf,
}

/// Load a JSON corpus: an array of `{ "title": ..., "tokens": [...] }`.
pub fn load_corpus(path: impl AsRef<Path>) -> Result<Vec<Document>> {
    let path = path.as_ref();
    let file = File::open(path).with_context(|| format!("open corpus {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .with_context(|| format!("parse corpus {}", path.display()))
}

/// Per-document raw term counts, keyed by document title.
pub fn term_frequencies(docs: &[Document]) -> HashMap<String, TermVector> {
    let mut out = HashMap::with_capacity(docs.len());
    for doc in docs {
        let counts: &mut TermVector = out.entry(doc.title.clone()).or_default();
        for token in &doc.tokens {
            *counts.entry(token.clone()).or_insert(0.0) += 1.0;
        }
    }
    out
}

/// Number of documents each term appears in.
pub fn document_frequencies(docs: &[Document]) -> HashMap<String, usize> {
    let mut out = HashMap::new();
    for doc in docs {
        let mut seen: Vec<&str> = doc.tokens.iter().map(String::as_str).collect();
        seen.sort_unstable();
        seen.dedup();
        for term in seen {
            *out.entry(term.to_string()).or_insert(0) += 1;
        }
    }
    out
}

/// Build one sparse vector per document under the given weighting scheme.
pub fn vectorize(docs: &[Document], weighting: Weighting) -> HashMap<String, TermVector> {
    let tfs = term_frequencies(docs);
    match weighting {
        Weighting::RawTf => tfs,
        Weighting::NormalizedTf { alpha } => tfs
            .into_iter()
            .map(|(title, counts)| {
                let max_tf = counts.values().fold(0.0f64, |m, &v| m.max(v));
                let scaled = counts
                    .into_iter()
                    .map(|(term, tf)| (term, alpha + (1.0 - alpha) * tf / max_tf))
                    .collect();
                (title, scaled)
            })
            .collect(),
        Weighting::LogTf => tfs
            .into_iter()
            .map(|(title, counts)| {
                let scaled = counts
                    .into_iter()
                    .map(|(term, tf)| (term, 1.0 + tf.ln()))
                    .collect();
                (title, scaled)
            })
            .collect(),
        Weighting::TfIdf => {
            let dfs = document_frequencies(docs);
            let doc_count = tfs.len() as f64;
            tfs.into_iter()
                .map(|(title, counts)| {
                    let scaled = counts
                        .into_iter()
                        .map(|(term, tf)| {
                            let df = dfs.get(&term).copied().unwrap_or(1) as f64;
                            let idf = (doc_count / df).ln();
                            (term, tf * idf)
                        })
                        .collect();
                    (title, scaled)
                })
                .collect()
        }
    }
}

/// Cosine similarity of two sparse vectors; 0.0 when either has zero norm.
pub fn cosine(x: &TermVector, y: &TermVector) -> f64 {
    let dot: f64 = x
        .iter()
        .map(|(term, x_score)| x_score * y.get(term).copied().unwrap_or(0.0))
        .sum();
    let x_norm = x.values().map(|v| v * v).sum::<f64>().sqrt();
    let y_norm = y.values().map(|v| v * v).sum::<f64>().sqrt();
    if x_norm == 0.0 || y_norm == 0.0 {
        return 0.0;
    }
    dot / (x_norm * y_norm)
}

/// Title of the corpus document most similar to `query`.
///
/// Ties break toward the lexicographically smallest title so repeated runs
/// over hash maps stay deterministic.
pub fn most_similar<'a>(
    corpus: &'a HashMap<String, TermVector>,
    query: &TermVector,
) -> Option<(&'a str, f64)> {
    corpus
        .iter()
        .map(|(title, vector)| (title.as_str(), cosine(vector, query)))
        .max_by(|(t1, s1), (t2, s2)| {
            s1.partial_cmp(s2)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| t2.cmp(t1))
        })
}

/// Pair every document in `queries` with its nearest neighbor in `corpus`.
pub fn similar_documents(
    queries: &HashMap<String, TermVector>,
    corpus: &HashMap<String, TermVector>,
) -> HashMap<String, String> {
    queries
        .iter()
        .filter_map(|(title, vector)| {
            most_similar(corpus, vector).map(|(best, _)| (title.clone(), best.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn corpus() -> Vec<Document> {
        vec![
            Document::new("ant_dove", ["the", "ant", "and", "the", "dove", "dove"]),
            Document::new("fox_crow", ["the", "fox", "and", "the", "crow"]),
            Document::new("fox_goat", ["the", "fox", "and", "the", "goat"]),
        ]
    }

    #[test]
    fn term_frequencies_count_tokens() {
        let tfs = term_frequencies(&corpus());
        assert_eq!(tfs["ant_dove"]["the"], 2.0);
        assert_eq!(tfs["ant_dove"]["dove"], 2.0);
        assert_eq!(tfs["fox_crow"]["crow"], 1.0);
    }

    #[test]
    fn document_frequencies_count_documents_once() {
        let dfs = document_frequencies(&corpus());
        assert_eq!(dfs["the"], 3);
        assert_eq!(dfs["fox"], 2);
        assert_eq!(dfs["dove"], 1);
    }

    #[test]
    fn tfidf_zeroes_ubiquitous_terms() {
        let vectors = vectorize(&corpus(), Weighting::TfIdf);
        assert_eq!(vectors["ant_dove"]["the"], 0.0);
        assert!(vectors["ant_dove"]["dove"] > 0.0);
    }

    #[test]
    fn normalized_tf_bounds_scores() {
        let vectors = vectorize(&corpus(), Weighting::NormalizedTf { alpha: 0.2 });
        for vector in vectors.values() {
            for score in vector.values() {
                assert!((0.2..=1.0).contains(score));
            }
        }
        assert_eq!(vectors["ant_dove"]["the"], 1.0);
    }

    #[test]
    fn cosine_is_one_for_identical_and_zero_for_disjoint() {
        let x = TermVector::from([("fox".to_string(), 1.0), ("crow".to_string(), 2.0)]);
        let y = TermVector::from([("goat".to_string(), 3.0)]);
        assert!((cosine(&x, &x) - 1.0).abs() < 1e-12);
        assert_eq!(cosine(&x, &y), 0.0);
        assert_eq!(cosine(&x, &TermVector::new()), 0.0);
    }

    #[test]
    fn similar_documents_pairs_nearest_neighbors() {
        let originals = vectorize(&corpus(), Weighting::TfIdf);
        let retold = vectorize(
            &[Document::new(
                "fox_crow_alt",
                ["a", "fox", "flattered", "the", "crow"],
            )],
            Weighting::RawTf,
        );
        let pairs = similar_documents(&retold, &originals);
        assert_eq!(pairs["fox_crow_alt"], "fox_crow");
    }

    #[test]
    fn loads_json_corpora() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"title": "ant", "tokens": ["the", "ant"]}}]"#
        )
        .unwrap();
        let docs = load_corpus(file.path()).unwrap();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].title, "ant");
        assert_eq!(docs[0].tokens, ["the", "ant"]);
    }
}
