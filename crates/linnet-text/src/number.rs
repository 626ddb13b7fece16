use crate::tokenize::tokenize;

/// Read-only lookup tables for English number words.
///
/// Built once and passed to [`normalize`]; the default tables cover
/// cardinals up to the trillions plus the ordinal words used to detect
/// fraction phrases that must be left alone.
#[derive(Debug, Clone)]
pub struct NumberLexicon {
    digits: Vec<&'static str>,
    tens: Vec<&'static str>,
    scales: Vec<&'static str>,
    ordinals: Vec<&'static str>,
}

impl Default for NumberLexicon {
    fn default() -> Self {
        Self {
            digits: vec![
                "zero", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine",
                "ten", "eleven", "twelve", "thirteen", "fourteen", "fifteen", "sixteen",
                "seventeen", "eighteen", "nineteen",
            ],
            tens: vec![
                "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
            ],
            scales: vec!["thousand", "million", "billion", "trillion"],
            ordinals: vec![
                "half", "halves", "first", "second", "third", "fourth", "fifth", "sixth",
                "seventh", "eighth", "ninth", "tenth", "eleventh", "twelfth", "thirteenth",
                "fourteenth", "fifteenth", "sixteenth", "seventeenth", "eighteenth",
                "nineteenth", "twentieth", "thirtieth", "fortieth", "fiftieth", "sixtieth",
                "seventieth", "eightieth", "ninetieth", "hundredth", "thousandth", "millionth",
                "billionth", "trillionth",
            ],
        }
    }
}

impl NumberLexicon {
    /// Value of a digit word 0..=19, if `word` is one.
    fn digit(&self, word: &str) -> Option<u64> {
        self.digits.iter().position(|d| *d == word).map(|i| i as u64)
    }

    /// Value of a tens word (`twenty` = 20, ..., `ninety` = 90).
    fn ten(&self, word: &str) -> Option<u64> {
        self.tens
            .iter()
            .position(|t| *t == word)
            .map(|i| (i as u64 + 2) * 10)
    }

    /// Multiplier of a power-of-a-thousand scale word.
    fn scale(&self, word: &str) -> Option<u64> {
        self.scales
            .iter()
            .position(|s| *s == word)
            .map(|i| 1000u64.pow(i as u32 + 1))
    }

    fn is_hundred(&self, word: &str) -> bool {
        word == "hundred"
    }

    pub fn is_ordinal(&self, word: &str) -> bool {
        self.ordinals.contains(&word)
    }

    /// Whether `word` (already lowercased) takes part in a cardinal number.
    pub fn is_number_word(&self, word: &str) -> bool {
        self.digit(word).is_some()
            || self.ten(word).is_some()
            || self.scale(word).is_some()
            || self.is_hundred(word)
    }

    /// Whether `word` only multiplies a preceding value.
    fn is_multiplier(&self, word: &str) -> bool {
        self.scale(word).is_some() || self.is_hundred(word)
    }

    /// Convert a run of lowercased number words to its integer value.
    ///
    /// Tens followed by a digit fuse (`sixty five` = 65); `hundred` and the
    /// scale words multiply the most recent group, or start one when they
    /// appear first (`hundred million` = 100_000_000). Unknown words are
    /// skipped so an absorbed article contributes nothing. Returns `None`
    /// when stacked scale words push the value past `u64::MAX`.
    pub fn words_to_number(&self, words: &[String]) -> Option<u64> {
        let mut groups: Vec<u64> = Vec::new();
        let mut i = 0;
        while i < words.len() {
            let word = words[i].as_str();
            if let Some(tens) = self.ten(word) {
                if let Some(digit) = words.get(i + 1).and_then(|w| self.digit(w)) {
                    groups.push(tens + digit);
                    i += 2;
                    continue;
                }
                groups.push(tens);
            } else if let Some(digit) = self.digit(word) {
                groups.push(digit);
            } else if let Some(scale) = self.scale(word) {
                match groups.last_mut() {
                    Some(last) => *last = last.checked_mul(scale)?,
                    None => groups.push(scale),
                }
            } else if self.is_hundred(word) {
                match groups.last_mut() {
                    Some(last) => *last = last.checked_mul(100)?,
                    None => groups.push(100),
                }
            }
            i += 1;
        }
        groups.iter().try_fold(0u64, |sum, &g| sum.checked_add(g))
    }
}

/// A maximal run of number tokens, kept in surface form for replacement.
struct NumberRun {
    tokens: Vec<String>,
    article: Option<String>,
}

/// Rewrite cardinal number words in `text` to digits.
///
/// Runs that contain ordinals (`third`, `halves`, ...) or the decimal
/// joiner `point` describe fractions or decimals and are left untouched.
/// An article directly before a run of pure multiplier words is absorbed,
/// so `a hundred-million dollars` becomes `100000000 dollars`.
pub fn normalize(text: &str, lexicon: &NumberLexicon) -> String {
    let tokens = tokenize(text);
    let mut runs: Vec<NumberRun> = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let lower = tokens[i].to_lowercase();
        if !lexicon.is_number_word(&lower) && !lexicon.is_ordinal(&lower) {
            i += 1;
            continue;
        }
        let mut j = i + 1;
        while j < tokens.len() {
            let next = tokens[j].to_lowercase();
            if tokens[j] == "-"
                || next == "point"
                || lexicon.is_number_word(&next)
                || lexicon.is_ordinal(&next)
            {
                j += 1;
            } else {
                break;
            }
        }
        let article = (i > 0 && tokens[i - 1].eq_ignore_ascii_case("a"))
            .then(|| tokens[i - 1].clone());
        runs.push(NumberRun {
            tokens: tokens[i..j].to_vec(),
            article,
        });
        i = j;
    }

    let mut out = text.to_string();
    for run in runs {
        let lowered: Vec<String> = run
            .tokens
            .iter()
            .filter(|t| *t != "-")
            .map(|t| t.to_lowercase())
            .collect();
        if lowered
            .iter()
            .any(|w| w == "point" || lexicon.is_ordinal(w))
        {
            continue;
        }

        let Some(value) = lexicon.words_to_number(&lowered) else {
            continue;
        };
        let mut surface = rejoin_hyphens(&run.tokens);

        // "a million", "a Hundred-Million": the article joins the phrase
        // only when every word of the run is a multiplier.
        if let Some(article) = run.article
            && lowered.iter().all(|w| lexicon.is_multiplier(w))
        {
            surface.insert(0, article);
        }

        let phrase = surface.join(" ");
        out = replace_whole_phrase(&out, &phrase, &value.to_string());
    }
    out
}

/// Substitute every occurrence of `phrase` that stands on word
/// boundaries, so rewriting `two` leaves `network` alone.
fn replace_whole_phrase(text: &str, phrase: &str, value: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(pos) = rest.find(phrase) {
        let after = &rest[pos + phrase.len()..];
        let bounded = rest[..pos]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
            && after.chars().next().is_none_or(|c| !c.is_alphanumeric());
        out.push_str(&rest[..pos]);
        out.push_str(if bounded { value } else { phrase });
        rest = after;
    }
    out.push_str(rest);
    out
}

/// Rebuild hyphenated surface forms from a tokenized run:
/// `[Thirty, -, Three]` becomes `[Thirty-Three]`.
fn rejoin_hyphens(run: &[String]) -> Vec<String> {
    let mut parts: Vec<String> = Vec::new();
    let mut iter = run.iter();
    while let Some(token) = iter.next() {
        if token == "-"
            && let (Some(prev), Some(next)) = (parts.last_mut(), iter.next())
        {
            prev.push('-');
            prev.push_str(next);
            continue;
        }
        parts.push(token.clone());
    }
    parts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn norm(text: &str) -> String {
        normalize(text, &NumberLexicon::default())
    }

    #[test]
    fn converts_simple_cardinals() {
        assert_eq!(norm("I met twelve people"), "I met 12 people");
        assert_eq!(
            norm("I have one brother and two sisters"),
            "I have 1 brother and 2 sisters"
        );
    }

    #[test]
    fn converts_hundreds_with_hyphenated_tens() {
        assert_eq!(
            norm("A year has three hundred sixty-five days"),
            "A year has 365 days"
        );
    }

    #[test]
    fn absorbs_article_before_scale_words() {
        assert_eq!(norm("I made a million dollars"), "I made 1000000 dollars");
        assert_eq!(
            norm("There is a two story building costing a Hundred-Million dollars"),
            "There is a 2 story building costing 100000000 dollars"
        );
    }

    #[test]
    fn handles_hyphen_chains_and_punctuation() {
        assert_eq!(
            norm("Professor Zureick-Brown has \"Thirty-Three-Thousand twenty one???!!!\" cars"),
            "Professor Zureick-Brown has \"33021???!!!\" cars"
        );
    }

    #[test]
    fn leaves_fractions_alone() {
        assert_eq!(
            norm("Andy has two third apples and one million five hundred sixty four halves bananas"),
            "Andy has two third apples and one million five hundred sixty four halves bananas"
        );
        assert_eq!(
            norm("I am the first one to get a six two hundred twenty-fourth battery"),
            "I am the first one to get a six two hundred twenty-fourth battery"
        );
    }

    #[test]
    fn leaves_decimals_alone() {
        assert_eq!(
            norm("Ondy wins thirty-four point six five percents"),
            "Ondy wins thirty-four point six five percents"
        );
    }

    #[test]
    fn words_to_number_groups_and_scales() {
        let lex = NumberLexicon::default();
        let words = |s: &str| -> Vec<String> { s.split(' ').map(str::to_string).collect() };
        assert_eq!(lex.words_to_number(&words("sixty five")), Some(65));
        assert_eq!(lex.words_to_number(&words("three hundred sixty five")), Some(365));
        assert_eq!(
            lex.words_to_number(&words("thirty three thousand twenty one")),
            Some(33021)
        );
        assert_eq!(lex.words_to_number(&words("hundred million")), Some(100_000_000));
        assert_eq!(lex.words_to_number(&words("twenty")), Some(20));
    }

    #[test]
    fn overflowing_scale_runs_are_left_alone() {
        let lex = NumberLexicon::default();
        let words: Vec<String> = ["trillion"; 3].map(str::to_string).into();
        assert_eq!(lex.words_to_number(&words), None);
        assert_eq!(
            norm("I owe a trillion trillion trillion dollars"),
            "I owe a trillion trillion trillion dollars"
        );
    }

    #[test]
    fn replaces_only_whole_words() {
        assert_eq!(
            norm("The network has two nodes"),
            "The network has 2 nodes"
        );
    }
}
