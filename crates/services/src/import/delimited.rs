use vocab_core::normalize::RawEntry;

/// One record per line as `word<d>phonetic<d>meaning`. Trailing fields are
/// joined back into the meaning; lines with fewer than three fields are skipped.
#[must_use]
pub fn parse_delimited(text: &str, delimiter: char) -> Vec<RawEntry> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| {
            let mut parts = line.splitn(3, delimiter);
            let word = parts.next()?;
            let phonetic = parts.next()?;
            let meaning = parts.next()?;
            Some(RawEntry::new(word.trim(), phonetic.trim(), meaning.trim()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn meaning_keeps_embedded_delimiters() {
        let raw = parse_delimited("journalist,/ˈdʒɜːr.nə.lɪst/,writer, reporter\r\n", ',');
        assert_eq!(raw.len(), 1);
        assert_eq!(raw[0].meaning, "writer, reporter");
    }

    #[test]
    fn short_and_blank_lines_are_dropped() {
        let raw = parse_delimited("a,b\n\n   \nc\td\te\n", ',');
        assert!(raw.is_empty());

        let raw = parse_delimited("c\td\te\n", '\t');
        assert_eq!(raw[0].word, "c");
        assert_eq!(raw[0].phonetic, "d");
    }
}
