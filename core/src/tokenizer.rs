use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use unicode_normalization::UnicodeNormalization;

use crate::segmenter::{is_japanese, Segmenter, PARTICLES};

lazy_static! {
    static ref RE: Regex = Regex::new(r"(?u)[\p{L}\p{N}][\p{L}\p{N}_']*").expect("valid regex");
    static ref STOPWORDS: HashSet<&'static str> = {
        let words: &[&str] = &[
            "a","about","above","after","again","against","all","am","an","and","any","are","aren't","as","at",
            "be","because","been","before","being","below","between","both","but","by",
            "can","can't","cannot","could","couldn't",
            "did","didn't","do","does","doesn't","doing","don't","down","during",
            "each","few","for","from","further",
            "had","hadn't","has","hasn't","have","haven't","having","he","he'd","he'll","he's","her","here","here's","hers","herself","him","himself","his","how","how's",
            "i","i'd","i'll","i'm","i've","if","in","into","is","isn't","it","it's","its","itself",
            "let's","me","more","most","mustn't","my","myself",
            "no","nor","not","of","off","on","once","only","or","other","ought","our","ours","ourselves","out","over","own",
            "same","she","she'd","she'll","she's","should","shouldn't","so","some","such",
            "than","that","that's","the","their","theirs","them","themselves","then","there","there's","these","they","they'd","they'll","they're","they've","this","those","through","to","too",
            "under","until","up","very",
            "was","wasn't","we","we'd","we'll","we're","we've","were","weren't","what","what's","when","when's","where","where's","which","while","who","who's","whom","why","why's","with","won't","would","wouldn't",
            "you","you'd","you'll","you're","you've","your","yours","yourself","yourselves"
        ];
        words.iter().chain(PARTICLES.iter()).copied().collect()
    };
}

/// Whether English stemming applies to Latin-script tokens.
///
/// `Auto` is decided once per build from the corpus (see [`Stemming::resolve`])
/// and the decision is stored in the index, so queries never see `Auto`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Stemming {
    #[default]
    Auto,
    Enabled,
    Disabled,
}

impl Stemming {
    /// Stemming is a pure precision loss for text without spaces between
    /// words, so it is turned off when at least half of the corpus letters
    /// are Japanese.
    pub fn resolve<'a, I>(self, texts: I) -> Stemming
    where
        I: IntoIterator<Item = &'a str>,
    {
        if self != Stemming::Auto {
            return self;
        }
        let (mut japanese, mut total) = (0usize, 0usize);
        for text in texts {
            for c in text.chars().filter(|c| c.is_alphabetic()) {
                total += 1;
                if is_japanese(c) {
                    japanese += 1;
                }
            }
        }
        if total == 0 || japanese * 2 >= total {
            Stemming::Disabled
        } else {
            Stemming::Enabled
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TokenizerConfig {
    pub stemming: Stemming,
    pub remove_stopwords: bool,
    /// Extra words the segmenter should keep whole, e.g. product names.
    pub user_dictionary: Vec<String>,
}

impl Default for TokenizerConfig {
    fn default() -> Self {
        Self { stemming: Stemming::Auto, remove_stopwords: true, user_dictionary: Vec::new() }
    }
}

/// Turns text into search tokens.
///
/// Build one per index build or search session and share it; both sides of
/// the pipeline must use the same configuration or matches silently fail.
pub struct Tokenizer {
    config: TokenizerConfig,
    stemmer: Option<Stemmer>,
    segmenter: Segmenter,
}

impl fmt::Debug for Tokenizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Tokenizer").field("config", &self.config).finish()
    }
}

impl Default for Tokenizer {
    fn default() -> Self {
        Self::new(TokenizerConfig::default())
    }
}

impl Tokenizer {
    /// An unresolved `Stemming::Auto` tokenizes without stemming.
    pub fn new(config: TokenizerConfig) -> Self {
        let stemmer = match config.stemming {
            Stemming::Enabled => Some(Stemmer::create(Algorithm::English)),
            Stemming::Auto | Stemming::Disabled => None,
        };
        let segmenter = Segmenter::new(config.user_dictionary.iter().map(|w| normalize(w)));
        Self { config, stemmer, segmenter }
    }

    pub fn config(&self) -> &TokenizerConfig {
        &self.config
    }

    /// Tokenize text with NFKC normalization, lowercasing, Japanese
    /// segmentation, stopword removal and (optionally) stemming.
    pub fn tokenize<'a>(&self, text: impl Into<Option<&'a str>>) -> Vec<String> {
        let Some(text) = text.into() else { return Vec::new() };
        self.words(text).into_iter().map(|w| self.stem(w)).collect()
    }

    /// Like [`tokenize`](Self::tokenize), but pairs every token with the
    /// word it was stemmed from: `(surface, token)`.
    pub fn analyze(&self, text: &str) -> Vec<(String, String)> {
        self.words(text)
            .into_iter()
            .map(|w| {
                let token = self.stem(w.clone());
                (w, token)
            })
            .collect()
    }

    /// Forms worth highlighting for `text`: the words as written (after
    /// normalization) and, when stemming is on, their stems.
    pub fn highlight_terms(&self, text: &str) -> Vec<String> {
        let mut terms = Vec::new();
        for word in self.words(text) {
            let stem = self.stem(word.clone());
            if stem != word && !stem.is_empty() {
                terms.push(stem);
            }
            terms.push(word);
        }
        terms
    }

    fn words(&self, text: &str) -> Vec<String> {
        let normalized = normalize(text);
        let mut words = Vec::new();
        for mat in RE.find_iter(&normalized) {
            self.segmenter.segment(mat.as_str(), &mut words);
        }
        if self.config.remove_stopwords {
            words.retain(|w| !STOPWORDS.contains(w.as_str()));
        }
        words
    }

    fn stem(&self, word: String) -> String {
        match &self.stemmer {
            Some(stemmer) if !word.chars().any(is_japanese) => stemmer.stem(&word).into_owned(),
            _ => word,
        }
    }
}

/// NFKC then lowercase; applied to every text before segmentation.
pub fn normalize(text: &str) -> String {
    text.nfkc().collect::<String>().to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stemming() -> Tokenizer {
        Tokenizer::new(TokenizerConfig { stemming: Stemming::Enabled, ..Default::default() })
    }

    #[test]
    fn basic_tokenize() {
        let t = stemming().tokenize("Running, runner's run!");
        assert!(t.iter().any(|w| w == "run"));
    }

    #[test]
    fn absent_text_is_empty() {
        assert!(Tokenizer::default().tokenize(None::<&str>).is_empty());
        assert!(Tokenizer::default().tokenize("").is_empty());
    }

    #[test]
    fn japanese_is_never_stemmed() {
        let t = stemming().tokenize("全文検索について");
        assert_eq!(t, vec!["全文", "検索"]);
    }

    #[test]
    fn fullwidth_and_halfwidth_fold_together() {
        let t = Tokenizer::default();
        assert_eq!(t.tokenize("ＲＵＳＴ"), vec!["rust"]);
        assert_eq!(t.tokenize("ｶﾀｶﾅ"), vec!["カタカナ"]);
    }

    #[test]
    fn auto_resolves_against_corpus() {
        assert_eq!(Stemming::Auto.resolve(["静的サイトの検索機能"]), Stemming::Disabled);
        assert_eq!(Stemming::Auto.resolve(["Getting started guide"]), Stemming::Enabled);
        assert_eq!(Stemming::Auto.resolve(Vec::<&str>::new()), Stemming::Disabled);
        assert_eq!(Stemming::Disabled.resolve(["english words"]), Stemming::Disabled);
    }

    #[test]
    fn highlight_terms_keep_surface_and_stem() {
        let terms = stemming().highlight_terms("Installation");
        assert!(terms.contains(&"installation".to_string()));
        assert_eq!(terms.len(), 2);
    }

    #[test]
    fn analyze_pairs_surface_with_stem() {
        let pairs = stemming().analyze("Installation notes");
        assert_eq!(pairs[0].0, "installation");
        assert_eq!(pairs[0].1, stemming().tokenize("installation")[0]);
        assert_eq!(pairs.len(), 2);
        let plain = Tokenizer::default().analyze("Installation");
        assert_eq!(plain, vec![("installation".to_string(), "installation".to_string())]);
    }

    #[test]
    fn user_dictionary_is_normalized() {
        let t = Tokenizer::new(TokenizerConfig {
            user_dictionary: vec!["全文検索".into()],
            ..Default::default()
        });
        assert_eq!(t.tokenize("全文検索エンジン"), vec!["全文検索", "エンジン"]);
    }
}
