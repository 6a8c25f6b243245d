// String helpers for the rendered table: HTML escaping and label collation.

use std::cmp::Ordering;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Label ordering in the manner of a root-locale collator.
///
/// Levels, most significant first: base letters ignoring case and accents,
/// then accents, then case with lowercase first, then ordinal order.
/// Digits compare character by character, so `"10" < "9"`.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    base_letters(a)
        .cmp(base_letters(b))
        .then_with(|| accented(a).cmp(accented(b)))
        .then_with(|| case_marks(a).cmp(case_marks(b)))
        .then_with(|| a.cmp(b))
}

fn base_letters(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).flat_map(char::to_lowercase)
}

fn accented(s: &str) -> impl Iterator<Item = char> + '_ {
    s.nfd().flat_map(char::to_lowercase)
}

fn case_marks(s: &str) -> impl Iterator<Item = bool> + '_ {
    s.nfd().filter(|c| !is_combining_mark(*c)).map(char::is_uppercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("Rybka & Co"), "Rybka &amp; Co");
        assert_eq!(
            escape_html("<script>\"x\"</script>"),
            "&lt;script&gt;&quot;x&quot;&lt;/script&gt;"
        );
        assert_eq!(escape_html("Ethereal's"), "Ethereal&#39;s");
        assert_eq!(escape_html("Komodo Dragon"), "Komodo Dragon");
    }

    #[test]
    fn test_case_insensitive_order() {
        let mut names = vec!["zeta", "Alpha", "beta", "Gamma"];
        names.sort_by(|a, b| locale_compare(a, b));
        assert_eq!(names, vec!["Alpha", "beta", "Gamma", "zeta"]);
    }

    #[test]
    fn test_digits_compare_as_text() {
        assert_eq!(locale_compare("10", "9"), Ordering::Less);
        assert_eq!(locale_compare("build 10", "build 9"), Ordering::Less);
        assert_eq!(locale_compare("0.30", "0.9"), Ordering::Less);
        assert_eq!(locale_compare("16", "16.1"), Ordering::Less);
    }

    #[test]
    fn test_accents_sort_with_base_letter() {
        assert_eq!(locale_compare("Émile", "Zeta"), Ordering::Less);
        assert_eq!(locale_compare("Émile", "Ernst"), Ordering::Less);
        assert_eq!(locale_compare("emile", "Émile"), Ordering::Less);
        assert_eq!(locale_compare("Ezra", "Élan"), Ordering::Greater);
    }

    #[test]
    fn test_lowercase_first_on_case_ties() {
        assert_eq!(locale_compare("alpha", "Alpha"), Ordering::Less);
        assert_eq!(locale_compare("Alpha", "alpha"), Ordering::Greater);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
    }
}
