/// Punctuation peeled from the front of a whitespace chunk.
const LEADING: [&str; 3] = ["\"", "?", "!"];
/// Suffixes peeled from the back, longest-match first for `n't`.
const TRAILING: [&str; 6] = ["n't", ".", ",", "\"", "?", "!"];
/// Titles whose trailing period stays attached (`Mr.`, `Ms.`).
const ABBREVIATIONS: [&str; 2] = ["Mr", "Ms"];

/// Split text into an ordered, zero-indexed token sequence.
///
/// Whitespace chunks are split further: hyphens become their own tokens and
/// leading/trailing punctuation is peeled off recursively. Surface case is
/// preserved.
pub fn tokenize(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for chunk in text.split_whitespace() {
        split_chunk(chunk, &mut tokens);
    }
    tokens
}

fn split_chunk(chunk: &str, out: &mut Vec<String>) {
    if chunk.is_empty() {
        return;
    }

    if let Some(idx) = chunk.find('-') {
        split_chunk(&chunk[..idx], out);
        out.push("-".to_string());
        split_chunk(&chunk[idx + 1..], out);
        return;
    }

    if let Some(prefix) = LEADING.iter().find(|p| chunk.starts_with(**p)) {
        out.push((*prefix).to_string());
        split_chunk(&chunk[prefix.len()..], out);
        return;
    }

    if let Some(suffix) = TRAILING.iter().find(|s| chunk.ends_with(**s)) {
        let head = &chunk[..chunk.len() - suffix.len()];
        if !(*suffix == "." && ABBREVIATIONS.contains(&head)) {
            split_chunk(head, out);
            out.push((*suffix).to_string());
            return;
        }
    }

    out.push(chunk.to_string());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(text: &str) -> Vec<String> {
        tokenize(text)
    }

    #[test]
    fn splits_on_whitespace() {
        assert_eq!(toks("I met twelve people"), ["I", "met", "twelve", "people"]);
    }

    #[test]
    fn hyphens_become_tokens() {
        assert_eq!(toks("sixty-five"), ["sixty", "-", "five"]);
        assert_eq!(
            toks("Thirty-Three-Thousand"),
            ["Thirty", "-", "Three", "-", "Thousand"]
        );
    }

    #[test]
    fn peels_trailing_punctuation() {
        assert_eq!(toks("cars, dogs."), ["cars", ",", "dogs", "."]);
        assert_eq!(toks("don't"), ["do", "n't"]);
    }

    #[test]
    fn peels_leading_and_stacked_punctuation() {
        assert_eq!(
            toks("\"one???\""),
            ["\"", "one", "?", "?", "?", "\""]
        );
    }

    #[test]
    fn keeps_title_abbreviations_intact() {
        assert_eq!(toks("Mr. Wayne"), ["Mr.", "Wayne"]);
        assert_eq!(toks("Ms. Kim arrived."), ["Ms.", "Kim", "arrived", "."]);
    }

    #[test]
    fn empty_text_yields_no_tokens() {
        assert!(toks("   ").is_empty());
    }
}
