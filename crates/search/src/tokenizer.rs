//! Lexical tokenizer shared by indexing and querying.
//!
//! Lowercases and splits on non-alphanumeric boundaries. No stemming and no
//! stop word removal: short identifiers such as `16`, `b` or `itc` must reach
//! the index unmodified.

#[must_use]
pub fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn keeps_short_tokens_and_stop_words() {
        assert_eq!(
            tokenize("What is Section 16(2)(b) of the Act?"),
            vec!["what", "is", "section", "16", "2", "b", "of", "the", "act"]
        );
    }

    #[test]
    fn splits_hyphenated_identifiers() {
        assert_eq!(tokenize("GSTR-3B filing"), vec!["gstr", "3b", "filing"]);
    }

    #[test]
    fn empty_and_punctuation_only() {
        assert!(tokenize("").is_empty());
        assert!(tokenize(" -- ?! ").is_empty());
    }
}
