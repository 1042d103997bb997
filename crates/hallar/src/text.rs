//! Text normalization and matching.
//!
//! Every textual comparison in the engine goes through one place: the
//! candidate string is whitespace-normalized, then compared against a
//! [`TextPattern`] under either substring (default) or exact semantics.

use std::fmt;

use regex::Regex;

/// Collapse every run of whitespace to a single space and trim the ends.
///
/// Idempotent: applying it twice yields the same string.
#[must_use]
pub fn normalize(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// What a candidate string is matched against.
///
/// The three shapes a caller can hand in: one literal, several alternatives
/// (an OR, not an AND), or a compiled regular expression.
#[derive(Clone)]
pub enum TextPattern {
    /// A single literal string.
    Literal(String),
    /// Any one of several literals may match.
    AnyOf(Vec<String>),
    /// A regular expression, tested against the normalized candidate.
    /// Exact/substring mode does not apply.
    Regex(Regex),
}

impl fmt::Debug for TextPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(s) => f.debug_tuple("Literal").field(s).finish(),
            Self::AnyOf(list) => f.debug_tuple("AnyOf").field(list).finish(),
            Self::Regex(re) => f.debug_tuple("Regex").field(&re.as_str()).finish(),
        }
    }
}

impl TextPattern {
    /// Match a candidate against this pattern.
    ///
    /// The candidate is normalized first; an absent candidate never matches.
    /// `exact` selects strict equality over substring containment and is
    /// ignored for regex patterns. An empty literal under substring mode
    /// matches everything — plain substring semantics, deliberately not
    /// special-cased away.
    #[must_use]
    pub fn matches(&self, candidate: Option<&str>, exact: bool) -> bool {
        let Some(candidate) = candidate else {
            return false;
        };
        let normalized = normalize(candidate);
        match self {
            Self::Literal(target) => Self::compare(&normalized, target, exact),
            Self::AnyOf(targets) => targets
                .iter()
                .any(|target| Self::compare(&normalized, target, exact)),
            Self::Regex(re) => re.is_match(&normalized),
        }
    }

    fn compare(normalized: &str, target: &str, exact: bool) -> bool {
        if exact {
            normalized == target
        } else {
            normalized.contains(target)
        }
    }
}

impl From<&str> for TextPattern {
    fn from(value: &str) -> Self {
        Self::Literal(value.to_string())
    }
}

impl From<String> for TextPattern {
    fn from(value: String) -> Self {
        Self::Literal(value)
    }
}

impl From<Vec<String>> for TextPattern {
    fn from(value: Vec<String>) -> Self {
        Self::AnyOf(value)
    }
}

impl From<Vec<&str>> for TextPattern {
    fn from(value: Vec<&str>) -> Self {
        Self::AnyOf(value.into_iter().map(str::to_string).collect())
    }
}

impl From<Regex> for TextPattern {
    fn from(value: Regex) -> Self {
        Self::Regex(value)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    mod normalize_tests {
        use super::*;

        #[test]
        fn test_collapses_runs_and_trims() {
            assert_eq!(normalize(" Submit  now "), "Submit now");
            assert_eq!(normalize("a\t\n b"), "a b");
            assert_eq!(normalize(""), "");
            assert_eq!(normalize("   "), "");
        }

        proptest! {
            #[test]
            fn prop_normalize_idempotent(s in "\\PC{0,64}") {
                let once = normalize(&s);
                prop_assert_eq!(normalize(&once), once);
            }

            #[test]
            fn prop_normalized_has_no_double_spaces(s in "\\PC{0,64}") {
                let out = normalize(&s);
                prop_assert!(!out.contains("  "));
                prop_assert_eq!(out.trim(), &out);
            }
        }
    }

    mod literal_tests {
        use super::*;

        #[test]
        fn test_exact_requires_strict_equality() {
            let pattern = TextPattern::from("Submit now");
            assert!(pattern.matches(Some(" Submit  now "), true));
            assert!(!pattern.matches(Some("Submit nowhere"), true));
        }

        #[test]
        fn test_substring_containment() {
            let pattern = TextPattern::from("mit");
            assert!(pattern.matches(Some("Submit"), false));
            assert!(!pattern.matches(Some("Submit"), true));
        }

        #[test]
        fn test_absent_candidate_never_matches() {
            let pattern = TextPattern::from("");
            assert!(!pattern.matches(None, false));
            assert!(!pattern.matches(None, true));
        }

        #[test]
        fn test_empty_target_substring_matches_everything() {
            let pattern = TextPattern::from("");
            assert!(pattern.matches(Some("anything"), false));
            assert!(pattern.matches(Some(""), false));
            // Under exact mode only the empty candidate matches.
            assert!(!pattern.matches(Some("anything"), true));
            assert!(pattern.matches(Some("  "), true));
        }
    }

    mod any_of_tests {
        use super::*;

        #[test]
        fn test_any_element_suffices() {
            let pattern = TextPattern::from(vec!["Save", "Submit"]);
            assert!(pattern.matches(Some("Submit"), true));
            assert!(pattern.matches(Some("Save"), true));
            assert!(!pattern.matches(Some("Cancel"), true));
        }

        #[test]
        fn test_or_not_and_under_substring() {
            let pattern = TextPattern::from(vec!["foo", "bar"]);
            assert!(pattern.matches(Some("only bar here"), false));
        }
    }

    mod regex_tests {
        use super::*;

        #[test]
        fn test_regex_tests_normalized_candidate() {
            let pattern = TextPattern::from(Regex::new(r"^Submit now$").unwrap());
            assert!(pattern.matches(Some(" Submit  now "), false));
        }

        #[test]
        fn test_regex_ignores_exact_flag() {
            let pattern = TextPattern::from(Regex::new("mit").unwrap());
            assert!(pattern.matches(Some("Submit"), true));
            assert!(pattern.matches(Some("Submit"), false));
        }
    }
}
