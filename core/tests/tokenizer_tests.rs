use search_core::tokenizer::tokenize;

#[test]
fn it_folds_case_and_strips_punctuation() {
    let words = tokenize("The Quick-Brown Fox jumps!");
    assert_eq!(words, vec!["quick", "brown", "fox", "jumps"]);
}

#[test]
fn it_filters_stopwords() {
    let words = tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
    assert!(words.contains(&"lazy".to_string()));
}

#[test]
fn all_stopwords_yield_nothing() {
    assert!(tokenize("the and of is was it this that").is_empty());
    assert!(tokenize("").is_empty());
    assert!(tokenize("42 + 17 = 59 !!").is_empty());
}

#[test]
fn it_is_deterministic() {
    let text = "Modern C++ includes smart pointers, lambda expressions, and move semantics.";
    assert_eq!(tokenize(text), tokenize(text));
}
