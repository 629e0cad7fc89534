//! Title derivation and slugification.
//!
//! Both functions are pure: the same input always yields the same output,
//! and applying `derive_title` to its own output is a no-op. Only
//! recognized content extensions are stripped, so dots that belong to the
//! name survive every pass.

/// Content extension [`derive_title`] strips.
pub const DEFAULT_EXTENSION: &str = "html";

/// Derives a display title from a file or directory name, stripping the
/// default `.html` extension.
///
/// See [`derive_title_with`] for the rules.
#[must_use]
pub fn derive_title(name: &str) -> String {
    derive_title_with(name, &[DEFAULT_EXTENSION])
}

/// Derives a display title, stripping any of `extensions`.
///
/// # Rules
/// 1. Strip trailing `.ext` suffixes while `ext` matches one of
///    `extensions` (ASCII case-insensitive) and a non-empty stem remains
/// 2. Replace `-` and `_` with spaces
/// 3. Upper-case the first ASCII letter of every word
///
/// A word starts at any ASCII alphanumeric character not preceded by
/// another word character, so `"01-algorithms-with-numbers.html"` becomes
/// `"01 Algorithms With Numbers"`. Other dots are kept:
/// `"section-1.2.html"` becomes `"Section 1.2"`.
#[must_use]
pub fn derive_title_with<S: AsRef<str>>(name: &str, extensions: &[S]) -> String {
    let stem = strip_extensions(name, extensions);

    let mut title = String::with_capacity(stem.len());
    let mut prev_is_word = false;

    for c in stem.chars() {
        let c = if c == '-' || c == '_' { ' ' } else { c };
        let is_word = c.is_ascii_alphanumeric();
        if is_word && !prev_is_word {
            title.push(c.to_ascii_uppercase());
        } else {
            title.push(c);
        }
        prev_is_word = is_word;
    }

    title
}

/// Converts heading text or a path into a URL fragment identifier.
///
/// # Rules
/// 1. Lowercase the entire string
/// 2. Replace every run of characters outside `[a-z0-9]` with `-`
/// 3. Trim leading/trailing `-`
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    let mut pending_dash = false;

    for c in text.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c);
        } else {
            pending_dash = true;
        }
    }

    slug
}

fn strip_extensions<'a, S: AsRef<str>>(name: &'a str, extensions: &[S]) -> &'a str {
    let mut stem = name;
    while let Some((rest, ext)) = stem.rsplit_once('.') {
        let recognized = extensions
            .iter()
            .any(|allowed| allowed.as_ref().eq_ignore_ascii_case(ext));
        if rest.is_empty() || !recognized {
            break;
        }
        stem = rest;
    }
    stem
}
