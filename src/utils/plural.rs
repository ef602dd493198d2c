//! Counted nouns for log lines.

/// `3 stylesheets`, `1 stylesheet`. Regular plurals only.
pub fn plural_count(count: usize, noun: &str) -> String {
    let suffix = if count == 1 { "" } else { "s" };
    format!("{count} {noun}{suffix}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plural_count() {
        assert_eq!(plural_count(0, "file"), "0 files");
        assert_eq!(plural_count(1, "stylesheet"), "1 stylesheet");
    }
}
