use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

fn email_regex() -> &'static Regex {
    static EMAIL_REGEX: LazyLock<Regex> = LazyLock::new(|| {
        #[allow(clippy::unwrap_used)]
        Regex::new(r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{1,}\b").unwrap()
    });
    &EMAIL_REGEX
}

/// Masks email addresses in a string: the first character of the local part
/// is kept, the rest is replaced with ***, the domain stays intact.
pub fn redact(input: &str) -> String {
    email_regex()
        .replace_all(input, |caps: &regex::Captures| {
            let full_match = &caps[0];
            match full_match.find('@') {
                Some(at_pos) if at_pos > 0 => {
                    let first_char = &full_match[..1];
                    let domain = &full_match[at_pos..];
                    format!("{first_char}***{domain}")
                }
                _ => full_match.to_string(),
            }
        })
        .to_string()
}

/// Wrapper that applies [`redact`] whenever the value is formatted, so log
/// statements can carry user identifiers without leaking them.
pub struct Redacted<'a>(pub &'a str);

impl fmt::Display for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

impl fmt::Debug for Redacted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", redact(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_email_redaction() {
        assert_eq!(redact("user@example.com"), "u***@example.com");
        assert_eq!(redact("a@test.org"), "a***@test.org");
        assert_eq!(redact("test@sub.example.com"), "t***@sub.example.com");
    }

    #[test]
    fn test_non_email_text_is_untouched() {
        assert_eq!(redact("login failed for alice"), "login failed for alice");
    }

    #[test]
    fn test_redacted_display() {
        let wrapped = Redacted("bob@example.com");
        assert_eq!(format!("{wrapped}"), "b***@example.com");
    }
}
