// SPDX-License-Identifier: GPL-3.0-or-later

//! Free-text canonicalization for track and artist strings.
//!
//! The baseline removes feat./featuring/with clauses only. Version tags like
//! "(Remastered 2009)" are intentionally kept; stripping them is an explicit
//! opt-in mode because the two behaviors disagree on which catalog entries
//! should compare equal.

use lazy_static::lazy_static;
use regex::Regex;
use std::collections::HashSet;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    /// "(feat. X)" / "[featuring X]" / "(with X)" anywhere in the string.
    static ref FEAT_BRACKETED: Regex =
        Regex::new(r"(?i)[(\[](?:feat\.?|featuring|with)\s+[^)\]]*[)\]]").expect("valid regex");
    /// Trailing "feat. X" / "featuring X" / "with X" without brackets.
    static ref FEAT_TRAILING: Regex =
        Regex::new(r"(?i)\s+(?:feat\.?|featuring|with)\s+.*$").expect("valid regex");
    /// Version/remaster tags, stripped only in the opt-in mode.
    static ref VERSION_TAG: Regex = Regex::new(
        r"(?i)\s*[(\[][^)\]]*(?:remaster(?:ed)?|deluxe|mono|stereo|version|edit|mix|live)[^)\]]*[)\]]"
    )
    .expect("valid regex");
    static ref WHITESPACE: Regex = Regex::new(r"\s+").expect("valid regex");
}

/// Canonicalize `text` for comparison: NFC fold, lowercase, drop feat./with
/// clauses, collapse whitespace. Deterministic and total; identical inputs
/// always produce identical outputs.
pub fn normalize(text: &str) -> String {
    normalize_with(text, false)
}

/// Like [`normalize`], optionally also stripping version tags.
pub fn normalize_with(text: &str, strip_version_tags: bool) -> String {
    let folded: String = text.nfc().collect::<String>().to_lowercase();
    let stripped = FEAT_BRACKETED.replace_all(&folded, " ");
    let stripped = FEAT_TRAILING.replace(&stripped, "");
    let stripped = if strip_version_tags {
        VERSION_TAG.replace_all(&stripped, " ")
    } else {
        stripped
    };
    WHITESPACE
        .replace_all(stripped.trim(), " ")
        .into_owned()
}

/// Whitespace token set of the normalized text, for overlap scoring.
pub fn token_set(text: &str) -> HashSet<String> {
    normalize(text)
        .split_whitespace()
        .map(str::to_string)
        .collect()
}
