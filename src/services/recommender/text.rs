use lazy_static::lazy_static;
use regex::Regex;
use rust_stemmers::{Algorithm, Stemmer};

/// Upper bound on re-stemming a token until it stops changing
const MAX_STEM_PASSES: usize = 4;

lazy_static! {
    static ref NON_ALNUM: Regex = Regex::new(r"[^a-z0-9 ]").expect("valid regex");
    static ref STEMMER: Stemmer = Stemmer::create(Algorithm::English);
}

/// Canonicalizes free text into the token stream the vectorizer was fitted on.
///
/// Lower-cases, replaces anything outside `[a-z0-9 ]` with a space, collapses whitespace
/// and stems every token with the Snowball English stemmer. Dataset tags and synthesized
/// tags both go through here, so the two paths land in the same token space. The stems
/// differ from classic Porter (`fairly` → `fair`, not `fairli`), so the vectorizer and
/// document matrix must be built from this function's output.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let cleaned = NON_ALNUM.replace_all(&lowered, " ");

    cleaned
        .split_whitespace()
        .map(stem)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Stems a single token to a fixed point so that `normalize` is idempotent.
fn stem(token: &str) -> String {
    let mut current = token.to_string();
    for _ in 0..MAX_STEM_PASSES {
        let next = STEMMER.stem(&current).into_owned();
        if next == current {
            break;
        }
        current = next;
    }
    current
}
