//! Text utilities: a punctuation-aware tokenizer and an English
//! number-word normalizer.
//!
//! [`tokenize`] splits on whitespace and then recursively peels hyphens and
//! surrounding punctuation, so `"Thirty-Three???"` becomes
//! `["\"", "Thirty", "-", "Three", "?", "?", "?"]`.
//!
//! [`normalize`] rewrites cardinal number words in running text to digits
//! using a [`NumberLexicon`], a constructed read-only lookup table rather
//! than ambient global state:
//!
//! ```rust
//! use linnet_text::{NumberLexicon, normalize};
//!
//! let lex = NumberLexicon::default();
//! assert_eq!(
//!     normalize("A year has three hundred sixty-five days", &lex),
//!     "A year has 365 days"
//! );
//! ```

pub mod number;
pub mod tokenize;

pub use number::{NumberLexicon, normalize};
pub use tokenize::tokenize;
