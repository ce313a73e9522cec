//! Placeholder patterns for generated doctor IDs.
//!
//! Supported placeholders:
//! - `{number}`: 4-digit number in 1000..=9999
//! - `{random}`: 4 characters from `A-Z0-9`
//! - `{letter}`: one uppercase letter
//!
//! Every occurrence is drawn independently. Anything else, including unknown
//! `{...}` tokens, is copied through literally.

use rand::Rng;

/// Pattern used when the operator does not pass one.
pub const DEFAULT_PATTERN: &str = "DOC{number}";

const UPPERCASE: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const ALPHANUMERIC: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// A recognised placeholder token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Placeholder {
    Number,
    Random,
    Letter,
}

impl Placeholder {
    const TOKENS: [(&'static str, Placeholder); 3] = [
        ("{number}", Placeholder::Number),
        ("{random}", Placeholder::Random),
        ("{letter}", Placeholder::Letter),
    ];

    /// Match a placeholder at the start of `s`, returning it and its length.
    fn match_prefix(s: &str) -> Option<(Placeholder, usize)> {
        Self::TOKENS
            .iter()
            .find(|(token, _)| s.starts_with(*token))
            .map(|(token, placeholder)| (*placeholder, token.len()))
    }

    fn render<R: Rng>(&self, rng: &mut R, out: &mut String) {
        match self {
            Placeholder::Number => out.push_str(&rng.gen_range(1000..=9999u32).to_string()),
            Placeholder::Random => {
                for _ in 0..4 {
                    out.push(pick(rng, ALPHANUMERIC));
                }
            }
            Placeholder::Letter => out.push(pick(rng, UPPERCASE)),
        }
    }
}

fn pick<R: Rng>(rng: &mut R, alphabet: &[u8]) -> char {
    alphabet[rng.gen_range(0..alphabet.len())] as char
}

/// Expand every placeholder in `pattern` with fresh random values.
pub fn expand_pattern<R: Rng>(pattern: &str, rng: &mut R) -> String {
    let mut out = String::with_capacity(pattern.len() + 8);
    let mut rest = pattern;

    while let Some(brace) = rest.find('{') {
        out.push_str(&rest[..brace]);
        rest = &rest[brace..];

        match Placeholder::match_prefix(rest) {
            Some((placeholder, len)) => {
                placeholder.render(rng, &mut out);
                rest = &rest[len..];
            }
            None => {
                out.push('{');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Whether the pattern can produce more than one distinct ID.
pub fn has_placeholders(pattern: &str) -> bool {
    pattern
        .match_indices('{')
        .any(|(i, _)| Placeholder::match_prefix(&pattern[i..]).is_some())
}
