use once_cell::sync::Lazy;
use regex::Regex;

use crate::constants::HYPE_MARKER;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").unwrap());

// Address that itself contains "demo" ("demo@…", "demosubmission@…").
static DEMO_ADDRESS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\b([a-zA-Z0-9._%+-]*demo[s]?[a-zA-Z0-9._%+-]*@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,})\b")
        .unwrap()
});

// Any address appearing after the word "demo" ("send demos to info@…").
static ADDRESS_AFTER_DEMO: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\bdemo.*?([a-zA-Z0-9_.+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z0-9.-]+)").unwrap()
});

/// Anything with a name we can fuzzy-match against.
pub trait MatchCandidate {
    fn match_name(&self) -> &str;
}

impl MatchCandidate for String {
    fn match_name(&self) -> &str {
        self
    }
}

/// Token-order-independent similarity on a 0-100 scale.
///
/// Both names are lowercased, split on whitespace, sorted and rejoined
/// before comparing, so "Records Drumcode" and "Drumcode Records" score 100.
pub fn token_sort_ratio(a: &str, b: &str) -> u8 {
    let norm = |s: &str| {
        let mut tokens: Vec<String> = s
            .to_lowercase()
            .split_whitespace()
            .map(str::to_string)
            .collect();
        tokens.sort();
        tokens.join(" ")
    };
    let left = norm(a);
    let right = norm(b);
    if left.is_empty() || right.is_empty() {
        return 0;
    }
    (strsim::normalized_levenshtein(&left, &right) * 100.0).round() as u8
}

/// Best-scoring candidate at or above `threshold`.
///
/// Strict improvement is required to displace the current best, so the
/// first candidate wins ties.
pub fn find_best_match<'a, T: MatchCandidate>(
    target: &str,
    candidates: &'a [T],
    threshold: u8,
) -> Option<&'a T> {
    let mut best: Option<&T> = None;
    let mut best_score = 0u8;
    for candidate in candidates {
        let score = token_sort_ratio(target, candidate.match_name());
        if score > best_score && score >= threshold {
            best_score = score;
            best = Some(candidate);
        }
    }
    best
}

/// First run of digits in `text`, or `None` when there is none.
pub fn extract_rank(text: &str) -> Option<u32> {
    DIGIT_RUN
        .find(text)
        .and_then(|m| m.as_str().parse::<u32>().ok())
}

/// First run of digits in `text`, or 0 when there is none.
pub fn extract_number(text: &str) -> u32 {
    extract_rank(text).unwrap_or(0)
}

/// Position string written to the sheet; hype-list entries carry a marker
/// so their ranks are not confused with the all-time lists.
pub fn format_position(position: &str, is_hype: bool) -> String {
    if is_hype {
        format!("{position} {HYPE_MARKER}")
    } else {
        position.to_string()
    }
}

/// Demo-submission address from a free-text profile description.
///
/// Prefers an address that itself contains "demo"; falls back to the first
/// address following the word "demo" in the text.
pub fn find_demo_email(description: &str) -> Option<String> {
    let flattened = description
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(caps) = DEMO_ADDRESS.captures(&flattened) {
        return Some(caps[1].to_string());
    }
    ADDRESS_AFTER_DEMO
        .captures(&flattened)
        .map(|caps| caps[1].to_string())
}

/// Capitalize each whitespace-separated word, lowercasing the rest so
/// all-caps scraped names come out title-cased too.
pub fn format_title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => {
                    first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase()
                }
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_order_does_not_affect_score() {
        assert_eq!(token_sort_ratio("Drumcode Records", "Records Drumcode"), 100);
    }

    #[test]
    fn empty_names_never_match() {
        assert_eq!(token_sort_ratio("", ""), 0);
        assert_eq!(token_sort_ratio("Drumcode", ""), 0);
        assert!(find_best_match("Drumcode", &[String::new()], 70).is_none());
    }

    #[test]
    fn first_seen_candidate_wins_ties() {
        let candidates = vec!["Drumcode".to_string(), "drumcode".to_string()];
        let best = find_best_match("Drumcode", &candidates, 70).unwrap();
        assert_eq!(best, &candidates[0]);
    }

    #[test]
    fn below_threshold_yields_none() {
        let candidates = vec!["Anjunadeep".to_string()];
        assert!(find_best_match("Drumcode", &candidates, 70).is_none());
    }

    #[test]
    fn extract_number_reads_first_digit_run() {
        assert_eq!(extract_number("12 HYPE"), 12);
        assert_eq!(extract_number("position 7 of 100"), 7);
        assert_eq!(extract_number(""), 0);
        assert_eq!(extract_number("HYPE"), 0);
    }

    #[test]
    fn extract_rank_distinguishes_absent_from_zero() {
        assert_eq!(extract_rank("HYPE"), None);
        assert_eq!(extract_rank("0"), Some(0));
    }

    #[test]
    fn format_position_appends_hype_marker() {
        assert_eq!(format_position("7", true), "7 HYPE");
        assert_eq!(format_position("7", false), "7");
    }

    #[test]
    fn finds_demo_prefixed_address() {
        let text = "Send your tracks to demos@drumcode.se and follow us";
        assert_eq!(
            find_demo_email(text),
            Some("demos@drumcode.se".to_string())
        );
    }

    #[test]
    fn finds_address_after_demo_keyword() {
        let text = "Demo submissions: contact info@label.com for details";
        assert_eq!(find_demo_email(text), Some("info@label.com".to_string()));
    }

    #[test]
    fn no_email_in_plain_description() {
        assert_eq!(find_demo_email("Techno label from Berlin"), None);
    }

    #[test]
    fn title_case_capitalizes_each_word() {
        assert_eq!(format_title_case("drumcode records"), "Drumcode Records");
    }

    #[test]
    fn title_case_tames_all_caps_names() {
        assert_eq!(format_title_case("DRUMCODE"), "Drumcode");
        assert_eq!(format_title_case("AFTERLIFE RECORDS"), "Afterlife Records");
    }
}
