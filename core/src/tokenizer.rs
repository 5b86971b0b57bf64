use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;

lazy_static! {
    static ref RE: Regex = Regex::new(r"\b[a-zA-Z]+\b").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "the","a","an","and","or","but","in","on","at","to","for","of","with","by","from",
            "is","are","was","were","be","been","being",
            "have","has","had","do","does","did",
            "will","would","could","should","may","might","can",
            "this","that","these","those","it","its",
            "as","if","then","than","so","such",
        ];
        words.iter().copied().collect()
    };
}

/// Shortest run kept as a term.
pub const MIN_TERM_LEN: usize = 2;

pub fn is_stopword(token: &str) -> bool { STOPWORDS.contains(token) }

/// Tokenize text into lowercase ASCII-letter terms, dropping stop words and single letters.
///
/// The returned vector keeps text order; a term's index in it is the position recorded in postings.
pub fn tokenize(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    RE.find_iter(&lowered)
        .map(|m| m.as_str())
        .filter(|token| token.len() >= MIN_TERM_LEN && !is_stopword(token))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn basic_tokenize() {
        let t = tokenize("The Quick-Brown Fox jumps!");
        assert_eq!(t, vec!["quick", "brown", "fox", "jumps"]);
    }

    #[test]
    fn single_letters_are_dropped() {
        assert_eq!(tokenize("C is x y great"), vec!["great"]);
    }
}
