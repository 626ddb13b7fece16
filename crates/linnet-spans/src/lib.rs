//! Span overlap resolution and BILOU tag encoding.
//!
//! Gazetteer matching over a token sequence produces candidate spans that
//! freely overlap: a long place name contains a shorter one, adjacent
//! matches chain across shared tokens, and the same range may be reported
//! once per category. [`resolve`] reduces such a candidate set to a
//! pairwise-non-overlapping subset that maximizes the total number of
//! covered tokens, and [`encode_bilou`] projects the survivors onto
//! per-token `B-`/`I-`/`L-`/`U-`/`O` tags.
//!
//! ```rust
//! use linnet_spans::{encode_bilou, resolve};
//! use linnet_types::Span;
//!
//! let candidates = vec![
//!     Span::new("Atlantic City", 0, 2, ["us_city"]),
//!     Span::new("City", 1, 2, ["us_city"]),
//!     Span::new("Georgia", 3, 4, ["us_state"]),
//! ];
//! let entities = resolve(candidates, 4).unwrap();
//! assert_eq!(entities.len(), 2);
//! let tags = encode_bilou(4, &entities).unwrap();
//! assert_eq!(tags[0].to_string(), "B-us_city");
//! assert_eq!(tags[3].to_string(), "U-us_state");
//! ```

pub mod bilou;
pub mod resolve;

pub use bilou::{EncodeError, encode_bilou};
pub use resolve::{ResolveError, resolve};
