/// Shortens long page titles for canvas labels. Truncation is by character,
/// not byte, so multi-byte titles stay valid.
pub fn truncate_label(title: &str, max_chars: usize) -> String {
    if title.chars().count() <= max_chars {
        return title.to_owned();
    }

    let kept = title
        .chars()
        .take(max_chars.saturating_sub(1))
        .collect::<String>();
    format!("{kept}…")
}

pub fn format_score(score: f64) -> String {
    if score == 0.0 {
        "0".to_owned()
    } else if score >= 0.01 {
        format!("{score:.3}")
    } else {
        format!("{score:.5}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_titles_pass_through() {
        assert_eq!(truncate_label("Python", 24), "Python");
    }

    #[test]
    fn long_titles_are_truncated_with_ellipsis() {
        let label = truncate_label("History of computer science in Brazil", 12);
        assert_eq!(label.chars().count(), 12);
        assert!(label.ends_with('…'));
    }

    #[test]
    fn truncation_counts_characters_not_bytes() {
        let label = truncate_label("éééééééééé", 5);
        assert_eq!(label.chars().count(), 5);
    }
}
