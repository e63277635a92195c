//! Word segmentation for Japanese text.
//!
//! Japanese has no spaces between words, so a run such as `全文検索について`
//! has to be broken up heuristically. The segmenter combines a longest-match
//! dictionary pass with script-class boundaries:
//!
//! - dictionary entries (built-in particles and auxiliaries plus any user
//!   words) are emitted whole, longest first;
//! - between dictionary hits the text is split where the script changes
//!   (kanji / hiragana / katakana / everything else);
//! - kanji runs longer than two characters are cut into two-character
//!   compounds, which is how most kanji words are formed;
//! - katakana and hiragana runs stay whole.
//!
//! Built-in particles only match right after a non-hiragana character or
//! another dictionary hit, so a hiragana word like `はじめに` is not torn
//! apart at its first `は`.

use std::collections::HashSet;

/// Particles, auxiliaries and other function words.
pub const PARTICLES: &[&str] = &[
    "は", "が", "を", "に", "で", "と", "の", "も", "へ", "や", "か", "な", "ね", "よ",
    "から", "まで", "より", "など", "について", "として", "による", "によって", "において",
    "における", "ため", "こと", "もの", "です", "でした", "ます", "ました", "ません", "します",
    "しました", "する", "して", "した", "され", "される", "ない", "なく", "ある", "いる", "あり",
    "この", "その", "あの", "どの", "これ", "それ", "あれ", "ので", "のに", "けど", "けれど",
    "だけ", "しか", "ばかり", "くらい", "ぐらい", "という", "といった", "でも", "では", "には",
    "とは", "への", "での", "との", "からの", "までの",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Script {
    Han,
    Hiragana,
    Katakana,
    Other,
}

pub fn script_of(c: char) -> Script {
    match c {
        '々' | '〆' | 'ヶ' => Script::Han,
        '\u{3041}'..='\u{309f}' => Script::Hiragana,
        '\u{30a0}'..='\u{30ff}' | '\u{31f0}'..='\u{31ff}' => Script::Katakana,
        '\u{4e00}'..='\u{9fff}' | '\u{3400}'..='\u{4dbf}' | '\u{f900}'..='\u{faff}' => Script::Han,
        _ => Script::Other,
    }
}

pub fn is_japanese(c: char) -> bool {
    script_of(c) != Script::Other
}

#[derive(Debug, Clone)]
pub struct Segmenter {
    particles: HashSet<String>,
    user_words: HashSet<String>,
    max_chars: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(std::iter::empty::<String>())
    }
}

impl Segmenter {
    /// `user_words` must already be normalized the same way the text is.
    pub fn new<I, S>(user_words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let particles: HashSet<String> = PARTICLES.iter().map(|p| p.to_string()).collect();
        let user_words: HashSet<String> = user_words
            .into_iter()
            .map(Into::into)
            .filter(|w: &String| !w.is_empty())
            .collect();
        let max_chars = particles
            .iter()
            .chain(user_words.iter())
            .map(|w| w.chars().count())
            .max()
            .unwrap_or(1);
        Self { particles, user_words, max_chars }
    }

    /// Split one run of letters/digits into words, appending them to `out`.
    pub fn segment(&self, run: &str, out: &mut Vec<String>) {
        if !run.chars().any(is_japanese) {
            out.push(run.to_string());
            return;
        }

        let chars: Vec<char> = run.chars().collect();
        let mut pending = 0;
        let mut after_hit = false;
        let mut i = 0;
        while i < chars.len() {
            let particle_ok = after_hit || (i > 0 && script_of(chars[i - 1]) != Script::Hiragana);
            if is_japanese(chars[i]) {
                if let Some(len) = self.longest_match(&chars[i..], particle_ok) {
                    split_by_script(&chars[pending..i], out);
                    out.push(chars[i..i + len].iter().collect());
                    i += len;
                    pending = i;
                    after_hit = true;
                    continue;
                }
            }
            after_hit = false;
            i += 1;
        }
        split_by_script(&chars[pending..], out);
    }

    fn longest_match(&self, rest: &[char], particle_ok: bool) -> Option<usize> {
        let upper = self.max_chars.min(rest.len());
        let mut candidate = String::new();
        let mut best = None;
        for (len, c) in rest[..upper].iter().enumerate() {
            candidate.push(*c);
            if self.user_words.contains(&candidate)
                || (particle_ok && self.particles.contains(&candidate))
            {
                best = Some(len + 1);
            }
        }
        best
    }
}

fn split_by_script(chars: &[char], out: &mut Vec<String>) {
    let mut start = 0;
    for i in 1..=chars.len() {
        if i == chars.len() || script_of(chars[i]) != script_of(chars[start]) {
            let piece = &chars[start..i];
            if script_of(chars[start]) == Script::Han && piece.len() > 2 {
                for chunk in piece.chunks(2) {
                    out.push(chunk.iter().collect());
                }
            } else {
                out.push(piece.iter().collect());
            }
            start = i;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seg(text: &str) -> Vec<String> {
        let mut out = Vec::new();
        Segmenter::default().segment(text, &mut out);
        out
    }

    #[test]
    fn latin_run_is_untouched() {
        assert_eq!(seg("installation"), vec!["installation"]);
    }

    #[test]
    fn splits_particles_after_content_words() {
        assert_eq!(seg("インストールについて"), vec!["インストール", "について"]);
        assert_eq!(seg("東京から大阪まで"), vec!["東京", "から", "大阪", "まで"]);
    }

    #[test]
    fn long_kanji_runs_become_compounds() {
        assert_eq!(seg("全文検索"), vec!["全文", "検索"]);
        assert_eq!(seg("東京都"), vec!["東京", "都"]);
    }

    #[test]
    fn iteration_and_counter_marks_are_kanji() {
        for c in ['々', '〆', 'ヶ'] {
            assert_eq!(script_of(c), Script::Han);
        }
        assert_eq!(seg("霞ヶ関"), vec!["霞ヶ", "関"]);
        assert_eq!(seg("時々"), vec!["時々"]);
    }

    #[test]
    fn leading_hiragana_word_stays_whole() {
        assert_eq!(seg("はじめに"), vec!["はじめに"]);
    }

    #[test]
    fn mixed_scripts_split_at_boundaries() {
        assert_eq!(seg("rust製のツール"), vec!["rust", "製", "の", "ツール"]);
    }

    #[test]
    fn user_words_win_longest_match() {
        let s = Segmenter::new(vec!["全文検索".to_string()]);
        let mut out = Vec::new();
        s.segment("全文検索エンジン", &mut out);
        assert_eq!(out, vec!["全文検索", "エンジン"]);
    }
}
