//! Term matching for searchable nodes.
//!
//! A node matches when every query term appears among the tokens of its
//! title, or every term appears among the tokens of its synopsis.

/// Lowercased alphanumeric tokens of `text`.
pub fn tokenize(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
        .collect()
}

fn contains_all(field: Option<&str>, terms: &[String]) -> bool {
    match field {
        Some(text) => {
            let tokens = tokenize(text);
            terms.iter().all(|term| tokens.contains(term))
        }
        None => false,
    }
}

/// Returns `true` if every term in `terms` appears in `title`, or every term
/// appears in `synopsis`. `terms` must already be tokenized.
pub fn matches_all_terms(title: Option<&str>, synopsis: Option<&str>, terms: &[String]) -> bool {
    if terms.is_empty() {
        return false;
    }
    contains_all(title, terms) || contains_all(synopsis, terms)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tokenize_lowercases_and_splits() {
        assert_eq!(tokenize("Hello, World! rust-lang"), vec!["hello", "world", "rust", "lang"]);
        assert!(tokenize("  ,, ").is_empty());
    }

    #[test]
    fn all_terms_in_title() {
        let title = Some("Graph Theory Basics");
        assert!(matches_all_terms(title, None, &tokenize("graph basics")));
        assert!(!matches_all_terms(title, None, &tokenize("graph algebra")));
    }

    #[test]
    fn terms_must_match_within_one_field() {
        assert!(!matches_all_terms(Some("graph"), Some("theory"), &tokenize("graph theory")));
        assert!(matches_all_terms(Some("graph"), Some("theory"), &tokenize("theory")));
    }

    #[test]
    fn partial_words_do_not_match() {
        assert!(!matches_all_terms(Some("graphs"), None, &tokenize("graph")));
    }

    #[test]
    fn empty_terms_match_nothing() {
        assert!(!matches_all_terms(Some("graph"), None, &[]));
    }
}
