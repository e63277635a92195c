use sitesearch_core::tokenizer::{Stemming, Tokenizer, TokenizerConfig};

fn english() -> Tokenizer {
    Tokenizer::new(TokenizerConfig { stemming: Stemming::Enabled, ..Default::default() })
}

#[test]
fn it_normalizes_and_stems() {
    let words = english().tokenize("Running Runners RUN! The ｃａｆé menu.");
    // Stemming to "run" should appear
    assert!(words.contains(&"run".to_string()));
    // NFKC folds the fullwidth letters
    assert!(words.iter().any(|w| w.starts_with("caf")));
}

#[test]
fn it_filters_stopwords() {
    let words = english().tokenize("The quick brown fox and the lazy dog");
    assert!(!words.contains(&"the".to_string()));
    assert!(!words.contains(&"and".to_string()));
}

#[test]
fn it_keeps_stopwords_when_asked() {
    let t = Tokenizer::new(TokenizerConfig { remove_stopwords: false, ..Default::default() });
    assert_eq!(t.tokenize("the end"), vec!["the", "end"]);
}

#[test]
fn it_segments_japanese_sentences() {
    let words = Tokenizer::default().tokenize("静的サイトジェネレーターで全文検索を実装する方法");
    assert_eq!(words, vec!["静的", "サイトジェネレーター", "全文", "検索", "実装", "方法"]);
}

#[test]
fn it_handles_mixed_scripts() {
    let words = Tokenizer::default().tokenize("Rust製の検索エンジンv2");
    assert_eq!(words, vec!["rust", "製", "検索", "エンジン", "v2"]);
}

#[test]
fn it_is_deterministic() {
    let t = Tokenizer::default();
    let text = "コピーボタンをクリックするとテキストがクリップボードにコピーされます。Copy to clipboard!";
    assert_eq!(t.tokenize(text), t.tokenize(text));
}
