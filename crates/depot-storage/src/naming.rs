//! File name sanitization.
//!
//! Turns an arbitrary, untrusted file name into a name that is safe to embed in a
//! storage key and a URL path segment: no path separators, no characters that are
//! illegal in file names, a camel-cased base and the original extension.
//!
//! `sanitize` is total and idempotent: `sanitize(sanitize(x)) == sanitize(x)`.

use std::sync::LazyLock;

use depot_core::constants::{FALLBACK_BASE_NAME, MAX_FILE_NAME_BYTES};
use regex::Regex;

static WINDOWS_RESERVED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(con|prn|aux|nul|com[0-9]|lpt[0-9])(\..*)?$")
        .expect("Windows reserved name pattern is valid")
});

/// Sanitize a user-supplied file name.
///
/// ```
/// use depot_storage::naming::sanitize;
///
/// assert_eq!(sanitize("My Report.PDF"), "myReport.PDF");
/// assert_eq!(sanitize("../../etc/passwd"), "etcpasswd");
/// assert_eq!(sanitize(""), "file");
/// ```
pub fn sanitize(filename: &str) -> String {
    let cleaned = strip_unsafe(filename);
    let (base, extension) = split_extension(&cleaned);

    let mut name = camel_case(base);
    name.push_str(extension);
    if name.len() == extension.len() || is_reserved_name(&name) {
        name = format!("{}{}", FALLBACK_BASE_NAME, extension);
    }

    truncate_to_bytes(&mut name, MAX_FILE_NAME_BYTES);
    let trimmed = name.trim_end_matches(['.', ' ']).len();
    name.truncate(trimmed);
    name
}

/// Split into `(base, extension)`; the extension keeps its leading dot.
///
/// A leading dot does not start an extension (`.env` is all base).
pub fn split_extension(name: &str) -> (&str, &str) {
    match name.rfind('.') {
        Some(idx) if idx > 0 => name.split_at(idx),
        _ => (name, ""),
    }
}

/// Drop traversal segments, path separators and characters illegal in file names.
fn strip_unsafe(filename: &str) -> String {
    let joined: String = filename
        .split(['/', '\\'])
        .filter(|segment| !matches!(*segment, "" | "." | ".."))
        .collect();

    let mut cleaned: String = joined.chars().filter(|c| !is_illegal(*c)).collect();

    if cleaned.chars().all(|c| c == '.') || is_reserved_name(&cleaned) {
        cleaned.clear();
    }

    let trimmed = cleaned.trim_end_matches(['.', ' ']).len();
    cleaned.truncate(trimmed);
    truncate_to_bytes(&mut cleaned, MAX_FILE_NAME_BYTES);
    cleaned
}

fn is_illegal(c: char) -> bool {
    matches!(c, '?' | '<' | '>' | ':' | '*' | '|' | '"') || c.is_control()
}

fn is_reserved_name(name: &str) -> bool {
    WINDOWS_RESERVED.is_match(name)
}

fn truncate_to_bytes(s: &mut String, max: usize) {
    if s.len() <= max {
        return;
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    s.truncate(end);
}

/// Camel-case a base name: `"My Report"` becomes `"myReport"`.
///
/// Words are alphanumeric runs, split again before a capital letter that follows a
/// non-capital one. A word following one that rendered with an uppercase last
/// letter is lowercased whole, so single-letter words cannot merge into what would
/// read as an acronym on a second pass.
pub fn camel_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut prev_ends_upper = false;

    for (index, word) in split_words(input).into_iter().enumerate() {
        let mut chars = word.chars();
        let Some(first) = chars.next() else {
            continue;
        };

        if index > 0 && !prev_ends_upper {
            out.push(to_upper(first));
        } else {
            out.push(to_lower(first));
        }
        for c in chars {
            out.push(to_lower(c));
        }

        prev_ends_upper = out.chars().next_back().is_some_and(is_upper);
    }

    out
}

fn split_words(input: &str) -> Vec<&str> {
    let mut words = Vec::new();
    let mut start: Option<usize> = None;
    let mut prev_upper = false;

    for (idx, c) in input.char_indices() {
        if !c.is_alphanumeric() {
            if let Some(s) = start.take() {
                words.push(&input[s..idx]);
            }
            continue;
        }

        let upper = is_upper(c);
        match start {
            None => start = Some(idx),
            Some(s) if upper && !prev_upper => {
                words.push(&input[s..idx]);
                start = Some(idx);
            }
            Some(_) => {}
        }
        prev_upper = upper;
    }

    if let Some(s) = start {
        words.push(&input[s..]);
    }
    words
}

// Letters whose case mapping expands to several chars (ß, İ) are left as they are.

/// A capital is any char that lowercasing changes, which includes titlecase letters
/// such as `ᾈ`. Everything `to_lower` returns is therefore not a capital.
fn is_upper(c: char) -> bool {
    single(c.to_lowercase()).is_some_and(|lower| lower != c)
}

fn to_upper(c: char) -> char {
    single(c.to_uppercase()).unwrap_or(c)
}

fn to_lower(c: char) -> char {
    single(c.to_lowercase()).unwrap_or(c)
}

fn single(mut mapped: impl Iterator<Item = char>) -> Option<char> {
    match (mapped.next(), mapped.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}
