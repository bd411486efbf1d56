//! Trigger-marker detection and per-type mode flags.

/// A doc-comment line must start with this token (after trimming) for its
/// type to be generation-eligible.
pub const COMMENT_MARKER: &str = "//genconstructor";

const POINTER_OPT: &str = "-p";
const SUPER_OPT: &str = "-s";
const EXTENDS_OPT: &str = "-e";

/// How a marked type's constructor returns its value.
///
/// Only one option is honored per type: the first recognized token on the
/// marker line wins and scanning stops, so the modes are mutually exclusive
/// by construction (`//genconstructor -s -e` is `Super`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Return the record by value.
    #[default]
    Plain,
    /// `-p`: return a pointer to the record.
    Pointer,
    /// `-s`: return a capability interface named after the type itself.
    Super,
    /// `-e`: return a capability interface inferred from the designated-base
    /// field's name.
    Extends,
}

impl Mode {
    /// `-p`, `-s`, and `-e` all take the literal's address in the body.
    pub fn returns_reference(self) -> bool {
        !matches!(self, Mode::Plain)
    }

    pub fn wants_interface(self) -> bool {
        matches!(self, Mode::Super | Mode::Extends)
    }
}

/// Scan the union of doc lines attached to a type declaration (and to its
/// enclosing declaration group). Returns `None` unless some line, trimmed,
/// starts with the trigger marker. Pure extraction; no side effects.
pub fn parse_doc_lines<'a, I>(lines: I) -> Option<Mode>
where
    I: IntoIterator<Item = &'a str>,
{
    for line in lines {
        if !line.trim_start().starts_with(COMMENT_MARKER) {
            continue;
        }
        for tok in line.split_whitespace() {
            match tok {
                POINTER_OPT => return Some(Mode::Pointer),
                SUPER_OPT => return Some(Mode::Super),
                EXTENDS_OPT => return Some(Mode::Extends),
                _ => {}
            }
        }
        return Some(Mode::Plain);
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_marker_means_not_applicable() {
        assert_eq!(parse_doc_lines(["// just a comment"]), None);
        assert_eq!(parse_doc_lines([]), None);
    }

    #[test]
    fn bare_marker_is_plain() {
        assert_eq!(parse_doc_lines(["//genconstructor"]), Some(Mode::Plain));
    }

    #[test]
    fn leading_whitespace_is_trimmed() {
        assert_eq!(parse_doc_lines(["   //genconstructor -p"]), Some(Mode::Pointer));
    }

    #[test]
    fn options_map_to_modes() {
        assert_eq!(parse_doc_lines(["//genconstructor -p"]), Some(Mode::Pointer));
        assert_eq!(parse_doc_lines(["//genconstructor -s"]), Some(Mode::Super));
        assert_eq!(parse_doc_lines(["//genconstructor -e"]), Some(Mode::Extends));
    }

    #[test]
    fn first_recognized_option_wins() {
        assert_eq!(parse_doc_lines(["//genconstructor -s -e"]), Some(Mode::Super));
        assert_eq!(parse_doc_lines(["//genconstructor -e -p"]), Some(Mode::Extends));
    }

    #[test]
    fn unknown_tokens_are_ignored() {
        assert_eq!(parse_doc_lines(["//genconstructor -x -p"]), Some(Mode::Pointer));
    }

    #[test]
    fn marker_found_on_later_line() {
        let docs = ["// AdminUser is an administrator.", "//genconstructor -e"];
        assert_eq!(parse_doc_lines(docs), Some(Mode::Extends));
    }

    #[test]
    fn only_first_marker_line_counts() {
        let docs = ["//genconstructor", "//genconstructor -p"];
        assert_eq!(parse_doc_lines(docs), Some(Mode::Plain));
    }
}
