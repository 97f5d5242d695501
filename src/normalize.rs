/// Canonical lookup key for a hero display name.
///
/// Lower-cases the input and keeps only `[a-z0-9]`, so whitespace, punctuation
/// and non-ASCII letters never take part in matching. Index keys and clicked
/// names must both go through this function.
pub fn normalize(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::normalize;

    #[test]
    fn case_whitespace_and_punctuation_collapse() {
        assert_eq!(normalize("Miya "), "miya");
        assert_eq!(normalize("miya"), "miya");
        assert_eq!(normalize("MIYA!"), "miya");
    }

    #[test]
    fn inner_spaces_and_symbols_are_dropped() {
        assert_eq!(normalize("Yi Sun-shin"), "yisunshin");
        assert_eq!(normalize("X.Borg"), "xborg");
        assert_eq!(normalize("Chang'e"), "change");
        assert_eq!(normalize("\tPopol and\nKupa "), "popolandkupa");
    }

    #[test]
    fn digits_survive_and_non_ascii_is_dropped() {
        assert_eq!(normalize("Hero 2"), "hero2");
        assert_eq!(normalize("Lúnox"), "lnox");
        assert_eq!(normalize("   "), "");
    }
}
