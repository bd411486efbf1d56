//! Camel-case word toolkit.
//!
//! Constructor names, parameter names, and inferred interface names all come
//! from here. Word splitting follows the usual camel-case boundary rules:
//! a lower→upper transition starts a new word, and an upper-case run ends one
//! word before its last letter when a lower-case letter follows (`HTTPServer`
//! → `HTTP`, `Server`). `_`, `-`, and spaces are treated as separators so
//! snake-cased input normalizes too.

/// Split an identifier into its constituent words.
pub fn split_words(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut words = Vec::new();
    let mut cur = String::new();

    for (i, &c) in chars.iter().enumerate() {
        if matches!(c, '_' | '-' | ' ') {
            if !cur.is_empty() {
                words.push(std::mem::take(&mut cur));
            }
            continue;
        }
        if c.is_uppercase() && !cur.is_empty() {
            let after_lower = chars[i - 1].is_lowercase() || chars[i - 1].is_ascii_digit();
            // end of an upper-case run: `HTTPServer` splits before the `S`
            let run_ends = chars[i - 1].is_uppercase()
                && chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if after_lower || run_ends {
                words.push(std::mem::take(&mut cur));
            }
        }
        cur.push(c);
    }
    if !cur.is_empty() {
        words.push(cur);
    }
    words
}

/// `user_base` / `userBase` / `UserBase` → `UserBase`.
pub fn to_upper_camel(s: &str) -> String {
    split_words(s).iter().map(|w| title_word(w)).collect()
}

/// `UserBase` → `userBase`; a leading acronym lowers entirely (`HTTPServer`
/// → `httpServer`).
pub fn to_lower_camel(s: &str) -> String {
    let words = split_words(s);
    let mut out = String::new();
    for (i, w) in words.iter().enumerate() {
        if i == 0 {
            // lower the whole leading word, not just its first letter
            let boundary = w
                .char_indices()
                .take_while(|(_, c)| c.is_uppercase())
                .last()
                .map_or(0, |(i, c)| i + c.len_utf8());
            out.push_str(&w[..boundary].to_lowercase());
            out.push_str(&w[boundary..]);
        } else {
            out.push_str(&title_word(w));
        }
    }
    out
}

fn title_word(w: &str) -> String {
    let mut chars = w.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().chain(chars).collect(),
    }
}

/// Interface name for the `super` mode: the type's own name defines the
/// shared capability surface.
pub fn super_interface(type_name: &str) -> String {
    to_upper_camel(type_name)
}

/// Interface name for the `extends` mode: the words of the base field's name
/// that also occur in the type's name, kept in the base field's word order.
/// `UserBase` against `AdminUser` yields `User`. No overlap yields an empty
/// name; that degenerate output is the author's problem, not ours.
pub fn extends_interface(base_field_name: &str, type_name: &str) -> String {
    let base = split_words(&to_upper_camel(base_field_name));
    let ty = split_words(&to_upper_camel(type_name));
    matched_words(&base, &ty).join("")
}

/// Ordered intersection: words of `a`, in order, that appear anywhere in `b`.
/// Duplicates in `a` are each kept.
fn matched_words(a: &[String], b: &[String]) -> Vec<String> {
    let set: std::collections::HashSet<&str> = b.iter().map(String::as_str).collect();
    a.iter()
        .filter(|w| set.contains(w.as_str()))
        .cloned()
        .collect()
}
