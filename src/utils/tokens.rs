//! Token estimation

/// Rough token count used for context budgets: Unicode scalar count / 4.
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

#[cfg(test)]
mod tests {
    use super::estimate_tokens;

    #[test]
    fn counts_characters_not_bytes() {
        assert_eq!(estimate_tokens("abcdefgh"), 2);
        assert_eq!(estimate_tokens("ééééééééé"), 2);
        assert_eq!(estimate_tokens(""), 0);
    }
}
