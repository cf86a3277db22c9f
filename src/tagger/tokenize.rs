//! Word tokenization shared by both taggers.

use once_cell::sync::Lazy;
use regex::Regex;

/// Dotted acronyms (`U.S.`), initials (`A.`), words with inner hyphens or
/// apostrophes, or a single punctuation character.
static TOKEN_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:[A-Z]\.){2,}|[A-Z]\.|\w+(?:[-']\w+)*|[^\w\s]").unwrap()
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `Stanford`, `Co-Chair`
    Title,
    /// `IEEE`
    Upper,
    /// `A.`
    Initial,
    Lower,
    Digit,
    Punct,
    /// `iPhone`, `2nd`
    Mixed,
}

impl Shape {
    fn of(text: &str) -> Self {
        let mut chars = text.chars();
        let first = match chars.next() {
            Some(c) => c,
            None => return Shape::Punct,
        };
        if text.len() == 2 && first.is_ascii_uppercase() && text.ends_with('.') {
            return Shape::Initial;
        }
        if !first.is_alphanumeric() && first != '_' {
            return Shape::Punct;
        }

        let letters: Vec<char> = text.chars().filter(|c| c.is_alphabetic()).collect();
        if letters.is_empty() {
            return if text.chars().any(|c| c.is_ascii_digit()) {
                Shape::Digit
            } else {
                Shape::Mixed
            };
        }
        if letters.iter().all(|c| c.is_lowercase()) && first.is_alphabetic() {
            return Shape::Lower;
        }
        if first.is_uppercase() {
            if letters.len() > 1 && letters.iter().all(|c| c.is_uppercase()) {
                return Shape::Upper;
            }
            // Inner capitals only right after a hyphen.
            let mut prev = first;
            let title = chars.all(|c| {
                let ok = !c.is_uppercase() || prev == '-';
                prev = c;
                ok
            });
            if title {
                return Shape::Title;
            }
        }
        Shape::Mixed
    }

    /// Starts with a capital: candidate for a proper name.
    pub fn is_capitalized(self) -> bool {
        matches!(self, Shape::Title | Shape::Upper | Shape::Initial)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token<'a> {
    pub text: &'a str,
    /// Byte offsets into the source text.
    pub start: usize,
    pub end: usize,
    pub shape: Shape,
}

impl Token<'_> {
    /// `.`, `!` and `?` close a sentence.
    pub fn ends_sentence(&self) -> bool {
        matches!(self.text, "." | "!" | "?")
    }
}

pub fn tokenize(text: &str) -> Vec<Token<'_>> {
    TOKEN_RE
        .find_iter(text)
        .map(|m| Token {
            text: m.as_str(),
            start: m.start(),
            end: m.end(),
            shape: Shape::of(m.as_str()),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts<'a>(tokens: &[Token<'a>]) -> Vec<&'a str> {
        tokens.iter().map(|t| t.text).collect()
    }

    #[test]
    fn splits_words_and_punctuation() {
        let tokens = tokenize("John Smith, Stanford University, will present.");
        assert_eq!(
            texts(&tokens),
            vec!["John", "Smith", ",", "Stanford", "University", ",", "will", "present", "."]
        );
        assert_eq!(tokens[3].start, 12);
        assert_eq!(tokens[3].end, 20);
    }

    #[test]
    fn keeps_initials_and_hyphenated_words() {
        let tokens = tokenize("Program Co-Chair: John A. Smith (MIT)");
        assert_eq!(
            texts(&tokens),
            vec!["Program", "Co-Chair", ":", "John", "A.", "Smith", "(", "MIT", ")"]
        );
        assert_eq!(tokens[4].shape, Shape::Initial);
    }

    #[test]
    fn dotted_acronym_is_one_upper_token() {
        let tokens = tokenize("U.S. Army Research Laboratory");
        assert_eq!(texts(&tokens), vec!["U.S.", "Army", "Research", "Laboratory"]);
        assert_eq!(tokens[0].shape, Shape::Upper);
        assert!(!tokens[0].ends_sentence());
    }

    #[test]
    fn honorific_period_is_its_own_token() {
        let tokens = tokenize("Dr. Jane Doe");
        assert_eq!(texts(&tokens), vec!["Dr", ".", "Jane", "Doe"]);
    }

    #[test]
    fn classifies_shapes() {
        assert_eq!(Shape::of("Stanford"), Shape::Title);
        assert_eq!(Shape::of("Co-Chair"), Shape::Title);
        assert_eq!(Shape::of("IEEE"), Shape::Upper);
        assert_eq!(Shape::of("will"), Shape::Lower);
        assert_eq!(Shape::of("2026"), Shape::Digit);
        assert_eq!(Shape::of(","), Shape::Punct);
        assert_eq!(Shape::of("iPhone"), Shape::Mixed);
        assert_eq!(Shape::of("McDonald"), Shape::Mixed);
        assert!(Shape::of("A.").is_capitalized());
    }
}
