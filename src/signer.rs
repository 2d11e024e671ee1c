use hmac::{Hmac, Mac as _};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use sha1::Sha1;

use crate::Result;
use crate::error::Error;
use crate::params::Params;

type HmacSha1 = Hmac<Sha1>;

/// Everything but `A-Z a-z 0-9 - _ . ~` is escaped in query names and values.
const QUERY_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Bytes covered by the signature: the decoded path, then `?query` when the
/// query is non-empty.
pub(crate) fn string_to_sign(path: &str, query: Option<&str>) -> Vec<u8> {
    let path = if path.is_empty() { "/" } else { path };
    let mut message: Vec<u8> = percent_decode_str(path).collect();

    if let Some(query) = query.filter(|q| !q.is_empty()) {
        message.push(b'?');
        message.extend_from_slice(query.as_bytes());
    }

    message
}

fn mac(secret: &[u8], message: &[u8]) -> Result<HmacSha1> {
    let mut mac = HmacSha1::new_from_slice(secret)
        .map_err(|e| Error::validation(format!("invalid signing key: {e}")))?;
    mac.update(message);
    Ok(mac)
}

/// Lowercase hex HMAC-SHA1 of `message` keyed by `secret`.
pub(crate) fn digest(secret: &[u8], message: &[u8]) -> Result<String> {
    Ok(hex::encode(mac(secret, message)?.finalize().into_bytes()))
}

/// Constant-time check of a hex signature against `message`.
pub(crate) fn verify_digest(secret: &[u8], message: &[u8], signature: &str) -> Result<bool> {
    let Ok(expected) = hex::decode(signature) else {
        return Ok(false);
    };

    Ok(mac(secret, message)?.verify_slice(&expected).is_ok())
}

/// Escapes a query name or value; spaces become `+`.
fn query_escape(component: &str) -> String {
    utf8_percent_encode(component, QUERY_COMPONENT)
        .map(|chunk| if chunk == "%20" { "+" } else { chunk })
        .collect()
}

/// Canonical query string: names sorted, pairs escaped and joined with `&`.
pub(crate) fn canonical_query(params: &Params) -> Result<String> {
    let mut pairs = Vec::with_capacity(params.len());

    for (key, value) in params {
        let value = value.to_param_string(key)?;
        pairs.push(format!("{}={}", query_escape(key), query_escape(&value)));
    }

    Ok(pairs.join("&"))
}

/// Splits the last `name=` pair out of a raw query string.
///
/// Returns the remaining query and the raw value of the removed pair.
pub(crate) fn split_param<'query>(
    query: &'query str,
    name: &str,
) -> (String, Option<&'query str>) {
    let pairs: Vec<&str> = query.split('&').collect();
    let position = pairs.iter().rposition(|pair| {
        pair.split_once('=')
            .map_or(*pair == name, |(key, _)| key == name)
    });

    match position {
        Some(index) => {
            let value = pairs[index].split_once('=').map_or("", |(_, v)| v);
            let rest = pairs
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != index)
                .map(|(_, pair)| *pair)
                .collect::<Vec<_>>()
                .join("&");
            (rest, Some(value))
        }
        None => (pairs.join("&"), None),
    }
}
