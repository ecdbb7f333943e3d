//! Query-string request signing.
//!
//! # Algorithm
//! 1. Merge the fixed parameters (service, version, access key, associate
//!    tag, operation, timestamp) over the operation's own parameters.
//! 2. Percent-encode keys and values; only `A-Z a-z 0-9 - _ . ~` stay literal.
//! 3. Sort by encoded key, byte-wise, and join as `k=v` with `&`.
//! 4. Sign `GET\n{host}\n{path}\n{query}` with HMAC-SHA256 and base64 the
//!    digest.
//! 5. Append the encoded signature as the final `Signature` parameter.
//!
//! Everything here is a pure function of its inputs; the caller supplies the
//! timestamp.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use chrono::{DateTime, SecondsFormat, Utc};
use hmac::{Hmac, Mac};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use sha2::Sha256;
use tracing::debug;

use crate::http::HttpMethod;
use crate::operation::Operation;
use crate::types::{Credential, Endpoint};

type HmacSha256 = Hmac<Sha256>;

pub const SERVICE: &str = "AWSECommerceService";
pub const API_VERSION: &str = "2013-08-01";

/// Everything except the unreserved characters of RFC 3986.
const SIGNING_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.').remove(b'~');

/// Percent-encodes a key or value the way the signature expects.
pub fn encode(value: &str) -> String {
    utf8_percent_encode(value, SIGNING_ENCODE_SET).to_string()
}

/// Wire format of the `Timestamp` parameter.
pub fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Joins parameters into the canonical query string: encoded, sorted by
/// encoded key, `&`-separated.
pub fn canonical_query<'a, I>(params: I) -> String
where
    I: IntoIterator<Item = (&'a str, &'a str)>,
{
    let mut pairs: Vec<(String, String)> = params.into_iter().map(|(k, v)| (encode(k), encode(v))).collect();
    pairs.sort();
    pairs
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join("&")
}

pub fn string_to_sign(method: HttpMethod, host: &str, path: &str, canonical_query: &str) -> String {
    format!("{}\n{host}\n{path}\n{canonical_query}", method.as_str())
}

/// Base64 HMAC-SHA256 of `message` keyed by `secret`.
pub fn compute_signature(secret: &str, message: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(_) => unreachable!("HMAC-SHA256 accepts keys of any length"),
    };
    mac.update(message.as_bytes());
    STANDARD.encode(mac.finalize().into_bytes())
}

/// Produces the fully qualified, signed request URI for `operation`.
pub fn sign(
    operation: &Operation,
    credential: &Credential,
    endpoint: &Endpoint,
    timestamp: &DateTime<Utc>,
) -> String {
    let timestamp = format_timestamp(timestamp);

    let mut params = operation.params().clone();
    params.insert("Service".to_string(), SERVICE.to_string());
    params.insert("Version".to_string(), API_VERSION.to_string());
    params.insert("AWSAccessKeyId".to_string(), credential.access_key().to_string());
    if let Some(tag) = credential.associate_tag() {
        params.insert("AssociateTag".to_string(), tag.to_string());
    }
    params.insert("Operation".to_string(), operation.name().as_str().to_string());
    params.insert("Timestamp".to_string(), timestamp);

    let query = canonical_query(params.iter().map(|(k, v)| (k.as_str(), v.as_str())));
    let message = string_to_sign(HttpMethod::Get, endpoint.host(), endpoint.path(), &query);
    let signature = compute_signature(credential.secret_key(), &message);

    debug!(
        operation = %operation.name(),
        host = endpoint.host(),
        query_len = query.len(),
        "signed request"
    );

    format!(
        "{}://{}{}?{query}&Signature={}",
        endpoint.scheme(),
        endpoint.host(),
        endpoint.path(),
        encode(&signature)
    )
}
