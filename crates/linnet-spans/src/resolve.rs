use std::collections::HashMap;
use std::collections::hash_map::Entry;

use linnet_types::Span;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("invalid span [{start}, {end}) over {token_len} tokens")]
    InvalidSpan {
        start: usize,
        end: usize,
        token_len: usize,
    },
}

/// Reduce a candidate span set to a non-overlapping subset of maximum
/// total covered length.
///
/// Candidates need not be sorted. Spans with identical ranges are merged
/// into one span carrying the union of their labels (first-seen text wins).
/// The remaining spans are partitioned into maximal transitively-connected
/// conflict clusters; spans that overlap nothing pass through unchanged,
/// and each cluster is resolved by weighted interval scheduling. The result
/// is sorted by `(start, end)` and every returned range appears in the
/// input.
///
/// Any span with `start >= end` or `end > token_len` fails the whole call
/// before partial output is produced. An empty input is fine and yields an
/// empty result.
pub fn resolve(spans: Vec<Span>, token_len: usize) -> Result<Vec<Span>, ResolveError> {
    for span in &spans {
        if span.start >= span.end || span.end > token_len {
            return Err(ResolveError::InvalidSpan {
                start: span.start,
                end: span.end,
                token_len,
            });
        }
    }
    if spans.is_empty() {
        return Ok(Vec::new());
    }

    let mut merged = merge_duplicate_ranges(spans);
    merged.sort_by_key(|s| (s.start, s.end));

    let mut resolved = Vec::with_capacity(merged.len());
    for cluster in clusters(merged) {
        if cluster.len() == 1 {
            resolved.extend(cluster);
        } else {
            resolved.extend(select_max_coverage(cluster));
        }
    }
    resolved.sort_by_key(|s| (s.start, s.end));
    Ok(resolved)
}

/// Union the label sets of spans covering the same `[start, end)` range.
fn merge_duplicate_ranges(spans: Vec<Span>) -> Vec<Span> {
    let mut out: Vec<Span> = Vec::with_capacity(spans.len());
    let mut by_range: HashMap<(usize, usize), usize> = HashMap::new();
    for span in spans {
        match by_range.entry((span.start, span.end)) {
            Entry::Occupied(slot) => {
                out[*slot.get()].labels.extend(span.labels);
            }
            Entry::Vacant(slot) => {
                slot.insert(out.len());
                out.push(span);
            }
        }
    }
    out
}

/// Sweep sorted spans into maximal runs connected by transitive overlap.
///
/// A span joins the current run when it starts before the furthest end seen
/// so far, so A-B-C chains where A and C never touch still land in one
/// cluster.
fn clusters(sorted: Vec<Span>) -> Vec<Vec<Span>> {
    let mut out: Vec<Vec<Span>> = Vec::new();
    let mut current: Vec<Span> = Vec::new();
    let mut reach = 0usize;
    for span in sorted {
        if current.is_empty() || span.start < reach {
            reach = reach.max(span.end);
        } else {
            out.push(std::mem::take(&mut current));
            reach = span.end;
        }
        current.push(span);
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Maximum-total-length non-overlapping subset of one conflict cluster.
///
/// Standard weighted interval scheduling: sort by end, binary-search the
/// latest compatible predecessor, take-or-skip dynamic program. On a tie
/// the later-ending span is skipped, so equal-total alternatives resolve to
/// the one with fewer, earlier-starting spans.
fn select_max_coverage(mut cluster: Vec<Span>) -> Vec<Span> {
    cluster.sort_by_key(|s| (s.end, s.start));
    let n = cluster.len();
    let ends: Vec<usize> = cluster.iter().map(|s| s.end).collect();

    // best[i] = max covered length over the first i spans.
    let mut best = vec![0usize; n + 1];
    let mut take = vec![false; n];
    for i in 0..n {
        let pred = ends[..i].partition_point(|&e| e <= cluster[i].start);
        let with = best[pred] + cluster[i].len();
        if with > best[i] {
            best[i + 1] = with;
            take[i] = true;
        } else {
            best[i + 1] = best[i];
        }
    }

    let mut selected = vec![false; n];
    let mut i = n;
    while i > 0 {
        if take[i - 1] {
            selected[i - 1] = true;
            i = ends[..i - 1].partition_point(|&e| e <= cluster[i - 1].start);
        } else {
            i -= 1;
        }
    }

    cluster
        .into_iter()
        .zip(selected)
        .filter_map(|(span, keep)| keep.then_some(span))
        .collect()
}
