//! Title cleanup applied before extraction by the looser profiles
//!
//! Listing titles carry gift markers, bundling symbols and bracketed asides that
//! never appear in catalog titles. `clean` strips them so the extractor only
//! sees text that can plausibly match.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::trace;

/// Promotional markers, longest forms first so "(사은품)" goes before "사은품"
static NOISE_PHRASES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\(사은품\)|\(선물\)|\+사은품|\+선물|사은품\+|선물\+|사은품|선물|증정")
        .expect("noise phrase pattern is valid")
});

static PARENTHESIZED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\([^)]*\)").expect("parenthesis pattern is valid"));

static BRACKETED: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[[^\]]*\]").expect("bracket pattern is valid"));

static CONNECTIVES: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s*[+&]\s*|세트").expect("connective pattern is valid"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Strip noise phrases, bracketed spans and bundle connectives from a title.
///
/// Passes repeat until the text stops changing, so removing one span can never
/// expose a new removable token in the output: `clean(clean(x)) == clean(x)`.
pub fn clean(title: &str) -> String {
    let mut current = single_pass(title);
    loop {
        let next = single_pass(&current);
        if next == current {
            break;
        }
        current = next;
    }

    trace!("Cleaned title: '{}' → '{}'", title, current);
    current
}

fn single_pass(text: &str) -> String {
    let text = NOISE_PHRASES.replace_all(text, "");
    let text = PARENTHESIZED.replace_all(&text, "");
    let text = BRACKETED.replace_all(&text, "");
    let text = CONNECTIVES.replace_all(&text, " ");
    let text = WHITESPACE.replace_all(&text, " ");
    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_gift_marker_removed() {
        assert_eq!(clean("쎈 (사은품)"), "쎈");
        assert_eq!(clean("오투 중등 과학 2-1+사은품"), "오투 중등 과학 2-1");
        assert_eq!(clean("사은품+마더텅 수학"), "마더텅 수학");
        assert_eq!(clean("완자 물리 증정"), "완자 물리");
    }

    #[test]
    fn test_brackets_removed() {
        assert_eq!(clean("[오투] 중등 과학 (2025년용)"), "중등 과학");
        assert_eq!(clean("한끝 [개정판] 국어"), "한끝 국어");
    }

    #[test]
    fn test_connectives_collapsed() {
        assert_eq!(clean("쎈 수학+라이트쎈 수학"), "쎈 수학 라이트쎈 수학");
        assert_eq!(clean("개념 & 유형"), "개념 유형");
        assert_eq!(clean("자이스토리 세트"), "자이스토리");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(clean("  마더텅\t\t고등   국어  "), "마더텅 고등 국어");
    }

    #[test]
    fn test_clean_title_unchanged() {
        assert_eq!(clean("오투 중등 과학 2-1"), "오투 중등 과학 2-1");
        assert_eq!(clean(""), "");
    }

    #[test]
    fn test_idempotent() {
        let samples = [
            "쎈 (사은품)",
            "사은(x)품 오투",
            "((중첩)) 괄호",
            "(a(b)c) 풍산자",
            "선물선물 + & 세트세트",
            "[쎈] [[이중]] 수학 +",
            "Free GIFT 증정",
            "   ",
        ];
        for sample in samples {
            let once = clean(sample);
            assert_eq!(clean(&once), once, "not idempotent for {:?}", sample);
        }
    }

    #[test]
    fn test_removal_exposing_new_noise() {
        // Dropping the parenthesized span joins "사은" and "품"
        assert_eq!(clean("사은(x)품 오투"), "오투");
    }
}
