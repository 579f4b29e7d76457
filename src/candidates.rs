// src/candidates.rs
//! Candidate-query extraction from free-form profile summaries.
//!
//! The upstream summary is unstructured language-model output with no
//! enforced schema, so this is a failure-tolerant linear scan rather
//! than a strict parser: every branch degrades instead of erroring,
//! and a fallback guarantees at least one candidate.

use std::collections::HashSet;

const DELIMITERS: [char; 4] = [',', '|', ';', '/'];
const MIN_CANDIDATE_CHARS: usize = 2;
const MAX_CANDIDATE_CHARS: usize = 80;
const MAX_CANDIDATES: usize = 12;

const TITLE_SECTION_CAP: usize = 10;
const TITLE_CONTINUATION_TOKENS: usize = 8;
const SKILLS_INITIAL_CAP: usize = 6;
const SKILLS_SECTION_CAP: usize = 12;
const SKILLS_CONTINUATION_TOKENS: usize = 10;
const FALLBACK_TOKENS: usize = 6;

/// Derive an ordered, deduplicated list of short search queries (job
/// titles and skills) from an unstructured profile summary.
///
/// Never returns an empty list for non-blank input: when neither a
/// job-title heading nor a skills heading is found, the first few
/// tokens of the whole text stand in as a single query.
pub fn extract_candidates(summary: &str) -> Vec<String> {
    let lines: Vec<&str> = summary
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let mut collected = scan_section(
        &lines,
        is_title_heading,
        usize::MAX,
        TITLE_SECTION_CAP,
        |line| token_count(line) <= TITLE_CONTINUATION_TOKENS,
    );

    collected.extend(scan_section(
        &lines,
        is_skills_heading,
        SKILLS_INITIAL_CAP,
        SKILLS_SECTION_CAP,
        |line| line.contains(',') || token_count(line) <= SKILLS_CONTINUATION_TOKENS,
    ));

    if collected.is_empty() {
        let head: Vec<&str> = summary.split_whitespace().take(FALLBACK_TOKENS).collect();
        if !head.is_empty() {
            collected.push(head.join(" "));
        }
    }

    dedupe_and_bound(collected)
}

fn is_title_heading(line: &str) -> bool {
    line.to_lowercase().contains("suggested job titles")
}

fn is_skills_heading(line: &str) -> bool {
    let lower = line.to_lowercase();
    lower.contains("list of technical skills")
        || lower.starts_with("skills:")
        || lower.contains("technical skills")
}

/// Scan for the first line matching `is_heading` and pull delimited
/// fragments from it and from qualifying follow-on lines. Only the
/// first matching heading is consumed; a second occurrence is ignored.
fn scan_section(
    lines: &[&str],
    is_heading: fn(&str) -> bool,
    initial_cap: usize,
    section_cap: usize,
    continues: impl Fn(&str) -> bool,
) -> Vec<String> {
    for (idx, line) in lines.iter().enumerate() {
        if !is_heading(line) {
            continue;
        }

        let mut found: Vec<String> = Vec::new();

        if let Some((_, rest)) = line.split_once(':') {
            found.extend(split_fragments(rest).take(initial_cap));
        }

        // The cap bounds how far the scan reads, not what an already
        // consumed line contributed; an over-full heading line keeps
        // all of its fragments.
        for next in &lines[idx + 1..] {
            if found.len() >= section_cap || !continues(next) {
                break;
            }
            found.extend(split_fragments(next));
        }

        return found;
    }

    Vec::new()
}

fn split_fragments(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(DELIMITERS)
        .map(str::trim)
        .filter(|fragment| !fragment.is_empty())
        .map(str::to_string)
}

fn token_count(line: &str) -> usize {
    line.split_whitespace().count()
}

/// Case-insensitive first-seen dedupe, then drop fragments outside
/// the accepted length range and cap the result count.
fn dedupe_and_bound(candidates: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for candidate in candidates {
        let candidate = candidate.trim().to_string();
        let chars = candidate.chars().count();
        if !(MIN_CANDIDATE_CHARS..=MAX_CANDIDATE_CHARS).contains(&chars) {
            continue;
        }
        if seen.insert(candidate.to_lowercase()) {
            out.push(candidate);
            if out.len() == MAX_CANDIDATES {
                break;
            }
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_heading_inline_candidates() {
        let summary = "Here is my review.\nSuggested job titles: Backend Developer, Data Engineer\nThanks.";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates[0], "Backend Developer");
        assert_eq!(candidates[1], "Data Engineer");
    }

    #[test]
    fn test_title_heading_consumes_short_following_lines() {
        let summary = "Suggested job titles:\nBackend Developer\nData Engineer | Platform Engineer\nThis next line is definitely far too long to count as another suggestion entry here.";
        let candidates = extract_candidates(summary);
        assert_eq!(
            candidates,
            vec!["Backend Developer", "Data Engineer", "Platform Engineer"]
        );
    }

    #[test]
    fn test_title_scan_stops_at_ten_candidates() {
        let mut summary = String::from("Suggested job titles:\n");
        for i in 0..20 {
            summary.push_str(&format!("Role Number {}\n", i));
        }
        let candidates = extract_candidates(&summary);
        assert_eq!(candidates.len(), 10);
        assert_eq!(candidates[0], "Role Number 0");
    }

    #[test]
    fn test_inline_title_list_keeps_all_heading_fragments() {
        // Twelve titles on the heading line itself: the per-section
        // scan cap does not trim them, only the overall cap applies.
        let summary = "Suggested job titles: R01, R02, R03, R04, R05, R06, R07, R08, R09, R10, R11, R12";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates.len(), 12);
        assert_eq!(candidates[11], "R12");
    }

    #[test]
    fn test_final_continuation_line_fragments_survive_scan_cap() {
        let mut summary = String::from("Suggested job titles:\n");
        for i in 0..9 {
            summary.push_str(&format!("Role {}\n", i));
        }
        summary.push_str("Extra One, Extra Two, Extra Three\n");
        let candidates = extract_candidates(&summary);
        // Nine plus the last consumed line's three fragments.
        assert_eq!(candidates.len(), 12);
        assert!(candidates.contains(&"Extra Three".to_string()));
    }

    #[test]
    fn test_only_first_title_heading_used() {
        let summary = "Suggested job titles: Backend Developer\nSome separating paragraph with a good number of words inside of it right here\nSuggested job titles: Frontend Developer";
        let candidates = extract_candidates(summary);
        assert!(candidates.contains(&"Backend Developer".to_string()));
        assert!(!candidates.contains(&"Frontend Developer".to_string()));
    }

    #[test]
    fn test_skills_heading_variants() {
        for heading in [
            "List of technical skills: Rust, Python",
            "skills: Rust, Python",
            "Key technical skills: Rust, Python",
        ] {
            let candidates = extract_candidates(heading);
            assert_eq!(candidates, vec!["Rust", "Python"], "heading: {}", heading);
        }
    }

    #[test]
    fn test_skills_initial_take_capped_at_six() {
        let summary = "Skills: a1, b2, c3, d4, e5, f6, g7, h8";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates, vec!["a1", "b2", "c3", "d4", "e5", "f6"]);
    }

    #[test]
    fn test_skills_continuation_requires_comma_or_short_line() {
        let summary = "Technical skills:\nRust, Tokio, Serde\none two three four five six seven eight nine ten eleven\nPostgres";
        let candidates = extract_candidates(summary);
        // The eleven-token line has no comma, so scanning stops there.
        assert_eq!(candidates, vec!["Rust", "Tokio", "Serde"]);
    }

    #[test]
    fn test_titles_and_skills_combined_in_order() {
        let summary = "Suggested job titles: Backend Developer\nThe profile shows strong delivery experience across several production systems and teams\nSkills: Rust, Python";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates, vec!["Backend Developer", "Rust", "Python"]);
    }

    #[test]
    fn test_fallback_first_six_tokens() {
        let summary = "A seasoned engineer who enjoys building reliable distributed systems in Rust";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates, vec!["A seasoned engineer who enjoys building"]);
    }

    #[test]
    fn test_empty_input_yields_nothing() {
        assert!(extract_candidates("").is_empty());
        assert!(extract_candidates("   \n\t\n").is_empty());
    }

    #[test]
    fn test_case_insensitive_dedupe_keeps_first() {
        let summary = "Suggested job titles: Python, Backend Developer\nOverall this is a well rounded profile with clear strengths in backend delivery work\nSkills: python, Rust";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates, vec!["Python", "Backend Developer", "Rust"]);
    }

    #[test]
    fn test_length_bounds_enforced() {
        let long = "x".repeat(81);
        let summary = format!("Suggested job titles: a, ok, {}", long);
        let candidates = extract_candidates(&summary);
        assert_eq!(candidates, vec!["ok"]);
    }

    #[test]
    fn test_result_capped_at_twelve() {
        let mut summary = String::from("Suggested job titles:\n");
        for i in 0..10 {
            summary.push_str(&format!("Title {}\n", i));
        }
        summary.push_str("Skills: s1, s2, s3, s4, s5, s6\n");
        let candidates = extract_candidates(&summary);
        assert!(candidates.len() <= 12);
    }

    #[test]
    fn test_heading_without_colon_still_scans_following_lines() {
        let summary = "Some suggested job titles for you\nBackend Developer\nData Engineer";
        let candidates = extract_candidates(summary);
        assert_eq!(candidates, vec!["Backend Developer", "Data Engineer"]);
    }
}
