//! Cache tag derivation.
//!
//! Downstream caches partition entries by the `Cache-Tag` header. The tag is a
//! short, stable fingerprint of the site identifier: a 32-bit string hash
//! rendered in base 61, truncated to [`CACHE_TAG_LEN`] characters.

use crate::config::{CACHE_TAG_LEN, CACHE_TAG_MAX_LEN};
use crate::error::AppError;

const ALPHABET: &[u8; 62] = b"0123456789abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Digits available to the encoding. `Z` is left out so it can mark negative hashes.
const BASE: u64 = 61;

/// Prefix used in place of a minus sign
const NEGATIVE_MARKER: char = 'Z';

/// 31-multiplier string hash over UTF-16 code units, wrapping at 32 bits.
pub fn string_hash(input: &str) -> i32 {
    input
        .encode_utf16()
        .fold(0i32, |hash, unit| {
            hash.wrapping_shl(5)
                .wrapping_sub(hash)
                .wrapping_add(i32::from(unit))
        })
}

/// Full-length short hash of `input`. A zero hash renders as an empty string.
pub fn short_hash(input: &str) -> String {
    let hash = string_hash(input);
    let mut magnitude = u64::from(hash.unsigned_abs());

    let mut digits = Vec::new();
    while magnitude > 0 {
        digits.push(ALPHABET[(magnitude % BASE) as usize] as char);
        magnitude /= BASE;
    }

    let mut out = String::with_capacity(digits.len() + 1);
    if hash < 0 {
        out.push(NEGATIVE_MARKER);
    }
    out.extend(digits.iter().rev());
    out
}

/// Tag for a site identifier: the first [`CACHE_TAG_LEN`] characters of its
/// short hash, left-padded with `0` when the hash is shorter.
pub fn cache_tag(site_id: &str) -> Result<String, AppError> {
    let hash = short_hash(site_id);
    let truncated: String = hash.chars().take(CACHE_TAG_LEN).collect();
    let tag = format!("{:0>width$}", truncated, width = CACHE_TAG_LEN);

    if tag.len() > CACHE_TAG_MAX_LEN {
        return Err(AppError::CacheTagTooLong(tag.len()));
    }

    Ok(tag)
}
