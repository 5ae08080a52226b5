//! Request signing.
//!
//! CPBM authenticates each request with an HMAC-SHA1 signature over a
//! canonical form of the query parameters:
//!
//! ```text
//! signingInput = path + lowercase(sorted(key=encoded_value, ...).join("&"))
//! signature    = percent_encode(Base64(HMAC-SHA1(secretKey, signingInput)))
//! ```
//!
//! Two parameters are always part of the signed set: `_` (the current Unix
//! time in milliseconds) and `apiKey`. The transmitted query string keeps the
//! caller's insertion order and original case; only the signing input is
//! sorted and lower-cased, which lets the server verify case-insensitively
//! while the request carries the values as given.
//!
//! Everything here is pure: no I/O, no shared state. [`sign_at`] takes the
//! timestamp explicitly so signatures are reproducible in tests; [`sign`]
//! stamps the current time.

use std::borrow::Cow;
use std::time::{SystemTime, UNIX_EPOCH};

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha1::Sha1;
use tracing::debug;

type HmacSha1 = Hmac<Sha1>;

/// Characters percent-encoded in query values and in the signature.
///
/// Strict RFC 3986: everything except unreserved characters
/// (`A-Z a-z 0-9 - _ . ~`) is encoded. Space becomes `%20`, `/` becomes
/// `%2F`, `+` becomes `%2B`. The base64 signature runs through the same set
/// since it contains `+`, `/` and `=`.
const QUERY_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// A signed query, ready to be appended to the request URL.
///
/// Built fresh for every call. The signature embeds a millisecond timestamp,
/// so a `SignedQuery` is single-use and must never be cached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedQuery {
    /// Percent-encoded `key=value` pairs joined with `&`, in insertion order.
    pub query_string: String,
    /// Percent-encoded base64 HMAC-SHA1 signature.
    pub signature: String,
}

impl SignedQuery {
    /// The full query suffix: `<query_string>&signature=<signature>`.
    pub fn to_query_suffix(&self) -> String {
        format!("{}&signature={}", self.query_string, self.signature)
    }
}

/// Percent-encode a query value with the canonical encode set.
pub fn percent_encode(value: &str) -> Cow<'_, str> {
    utf8_percent_encode(value, QUERY_ENCODE_SET).into()
}

/// Sign a request with the current Unix time in milliseconds.
///
/// `params` is the caller's query parameters in the order they should be
/// transmitted; keys are expected to be unique.
pub fn sign(path: &str, params: &[(&str, &str)], api_key: &str, secret_key: &str) -> SignedQuery {
    let now_ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or(0);
    sign_at(path, params, api_key, secret_key, now_ms as u64)
}

/// Sign a request at an explicit timestamp.
///
/// The timestamp and the API key are appended to the signed set, so the
/// signing input is never computed over an empty parameter list. The same
/// encoded pairs feed both the transmitted query string and the signing
/// input, which keeps "what was signed" byte-for-byte consistent with "what
/// is sent".
pub fn sign_at(
    path: &str,
    params: &[(&str, &str)],
    api_key: &str,
    secret_key: &str,
    timestamp_ms: u64,
) -> SignedQuery {
    let timestamp = timestamp_ms.to_string();

    let mut encoded: Vec<String> = params
        .iter()
        .map(|(k, v)| format!("{}={}", k, percent_encode(v)))
        .collect();
    encoded.push(format!("_={}", timestamp));
    encoded.push(format!("apiKey={}", percent_encode(api_key)));

    // Transmission order is insertion order; signing order is sorted.
    let query_string = encoded.join("&");

    let input = signing_input(path, &encoded);
    debug!(signing_input = %input, "built signing input");

    let mut mac =
        HmacSha1::new_from_slice(secret_key.as_bytes()).expect("HMAC accepts any key length");
    mac.update(input.as_bytes());
    let digest = mac.finalize().into_bytes();

    let signature = percent_encode(&BASE64.encode(digest)).into_owned();

    SignedQuery {
        query_string,
        signature,
    }
}

/// Build the exact byte sequence that gets hashed: the path, then the
/// encoded pairs sorted lexicographically and joined with `&`, the whole
/// string lower-cased.
fn signing_input(path: &str, encoded_pairs: &[String]) -> String {
    let mut sorted: Vec<&String> = encoded_pairs.iter().collect();
    sorted.sort();
    let joined = sorted
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join("&");
    format!("{}{}", path, joined).to_lowercase()
}
