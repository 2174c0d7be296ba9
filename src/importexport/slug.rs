//! The filename slug used by the export archive: `<uuid>-<order>-<slug>.<ext>`
//! (see the spec's External Interfaces section for the exact rule set).

const MAX_LEN: usize = 40;

/// Lowercase ASCII slug: letters, digits, `-`, `_` retained; spaces become
/// `-`; everything else is dropped; runs of `-` collapse to one; leading
/// and trailing `-` are trimmed; truncated to 40 characters; `untitled` if
/// that leaves nothing.
pub fn slugify(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut last_was_dash = false;

    for ch in input.chars() {
        let mapped = if ch.is_ascii_alphanumeric() {
            Some(ch.to_ascii_lowercase())
        } else if ch == '-' || ch == '_' {
            Some(ch)
        } else if ch.is_whitespace() {
            Some('-')
        } else {
            None
        };

        match mapped {
            Some('-') => {
                if !last_was_dash {
                    out.push('-');
                }
                last_was_dash = true;
            }
            Some(c) => {
                out.push(c);
                last_was_dash = false;
            }
            None => {}
        }
    }

    let trimmed = out.trim_matches('-');
    let truncated: String = trimmed.chars().take(MAX_LEN).collect();
    let truncated = truncated.trim_matches('-');

    if truncated.is_empty() {
        "untitled".to_string()
    } else {
        truncated.to_string()
    }
}

/// The slug source for an object filename: the title if non-empty,
/// otherwise the first 40 characters of the body, otherwise `untitled`.
pub fn slug_for(title: &str, body: &str) -> String {
    if !title.trim().is_empty() {
        slugify(title)
    } else if !body.trim().is_empty() {
        let prefix: String = body.chars().take(MAX_LEN).collect();
        slugify(&prefix)
    } else {
        "untitled".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn collapses_spaces_and_lowercases() {
        assert_eq!(slugify("Buy   Milk!!"), "buy-milk");
    }

    #[test]
    fn trims_leading_and_trailing_dashes() {
        assert_eq!(slugify("  -- hello -- "), "hello");
    }

    #[test]
    fn truncates_to_forty_chars() {
        let long = "a".repeat(100);
        assert_eq!(slugify(&long).len(), 40);
    }

    #[test]
    fn empty_input_is_untitled() {
        assert_eq!(slugify(""), "untitled");
        assert_eq!(slugify("!!!"), "untitled");
    }

    #[test]
    fn falls_back_to_body_when_title_empty() {
        assert_eq!(slug_for("", "hello world"), "hello-world");
        assert_eq!(slug_for("", ""), "untitled");
    }
}
