//! Small helpers: identity generation and name mangling.

use rand::Rng;

const NAME_ALPHABET: &[u8] = b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789_";

/// `ceil(log10(n))`, never less than 1. `0` counts as `1`.
pub fn log10_ceil(n: usize) -> usize {
    let mut digits = 0;
    let mut bound = 1usize;
    while bound < n.max(1) {
        bound = bound.saturating_mul(10);
        digits += 1;
    }
    digits.max(1)
}

/// Random identifier of `length` characters from `[A-Za-z0-9_]`.
pub fn random_name(length: usize) -> String {
    let mut rng = rand::rng();
    (0..length)
        .map(|_| NAME_ALPHABET[rng.random_range(0..NAME_ALPHABET.len())] as char)
        .collect()
}

/// Convert a class or field name into a host-compatible name.
///
/// `myTagName` → `my-tag-name`, `font_size` → `font-size`, `_class` → `class`.
pub fn to_kebab_case(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 4);
    for ch in name.chars() {
        if ch == '_' || ch == ' ' {
            out.push('-');
        } else if ch.is_ascii_uppercase() {
            out.push('-');
            out.push(ch.to_ascii_lowercase());
        } else {
            out.push(ch);
        }
    }
    out.trim_matches('-').to_string()
}
