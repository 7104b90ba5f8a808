/// Converts a title to a URL-safe slug.
///
/// Lowercases, maps every non-alphanumeric run to a single hyphen and
/// trims leading/trailing hyphens.
pub fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|ch| match ch {
            'a'..='z' | '0'..='9' => ch,
            _ => '-',
        })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Hello World"), "hello-world");
        assert_eq!(slugify("Talk A"), "talk-a");
    }

    #[test]
    fn test_slugify_collapses_separators() {
        assert_eq!(slugify("Hello  World"), "hello-world");
        assert_eq!(slugify("Hello--World"), "hello-world");
    }

    #[test]
    fn test_slugify_strips_punctuation() {
        assert_eq!(slugify("Special!@#Characters"), "special-characters");
        assert_eq!(slugify("  Leading and trailing  "), "leading-and-trailing");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("!!!"), "");
    }
}
