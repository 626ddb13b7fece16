use linnet_types::{BilouTag, Span};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum EncodeError {
    #[error("span [{start}, {end}) is out of range for {token_len} tokens")]
    OutOfRange {
        start: usize,
        end: usize,
        token_len: usize,
    },
    #[error("span [{start}, {end}) has no label")]
    Unlabeled { start: usize, end: usize },
    #[error("span [{start}, {end}) collides with an already tagged token {index}")]
    Conflict {
        start: usize,
        end: usize,
        index: usize,
    },
}

/// Project a non-overlapping span set onto per-token BILOU tags.
///
/// Single-token spans become `U-`, longer spans `B-` / `I-`* / `L-`, and
/// uncovered tokens stay `O`. The caller is expected to have run the spans
/// through [`crate::resolve`] first; a span that would overwrite an already
/// tagged token is reported as [`EncodeError::Conflict`] instead of being
/// arbitrated here. Multi-label spans are tagged with their
/// [`Span::primary_label`].
pub fn encode_bilou(token_len: usize, entities: &[Span]) -> Result<Vec<BilouTag>, EncodeError> {
    let mut tags = vec![BilouTag::Outside; token_len];
    for span in entities {
        if span.start >= span.end || span.end > token_len {
            return Err(EncodeError::OutOfRange {
                start: span.start,
                end: span.end,
                token_len,
            });
        }
        let label = span.primary_label().ok_or(EncodeError::Unlabeled {
            start: span.start,
            end: span.end,
        })?;
        if let Some(index) = (span.start..span.end).find(|&i| !tags[i].is_outside()) {
            return Err(EncodeError::Conflict {
                start: span.start,
                end: span.end,
                index,
            });
        }
        if span.len() == 1 {
            tags[span.start] = BilouTag::Unit(label.to_string());
        } else {
            tags[span.start] = BilouTag::Begin(label.to_string());
            for slot in &mut tags[span.start + 1..span.end - 1] {
                *slot = BilouTag::Inside(label.to_string());
            }
            tags[span.end - 1] = BilouTag::Last(label.to_string());
        }
    }
    Ok(tags)
}
