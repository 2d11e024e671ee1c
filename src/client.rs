use secrecy::{ExposeSecret, SecretString};
use url::{Position, Url};

use crate::config::{ClientConfig, Scheme};
use crate::error::Error;
use crate::params::Params;
use crate::signer::{canonical_query, digest, split_param, string_to_sign, verify_digest};
use crate::{Result, SIGNATURE_PARAM};

/// Base used to resolve references that carry no scheme. Only the parts the
/// caller supplied ever reach the output.
const RELATIVE_BASE: &str = "http://relative.invalid/";

/// Client to sign and/or generate libpixel URLs.
///
/// Cheap to clone and safe to share between threads: every operation is a
/// pure function of its inputs and the configuration.
#[derive(Clone, Debug)]
pub struct Client {
    host: String,
    scheme: Scheme,
    secret: Option<SecretString>,
}

impl Client {
    /// Creates a client, applying the configured [`SecretPolicy`](crate::SecretPolicy).
    pub fn new(config: ClientConfig) -> Result<Self> {
        config
            .secret_policy
            .ensure_allowed(config.secret.as_ref().map(ExposeSecret::expose_secret))?;

        Ok(Self {
            scheme: config.scheme(),
            host: config.host,
            secret: config.secret,
        })
    }

    #[must_use]
    pub fn host(&self) -> &str {
        &self.host
    }

    #[must_use]
    pub fn scheme(&self) -> Scheme {
        self.scheme
    }

    /// Whether [`Client::url`] signs the URLs it generates.
    ///
    /// An empty secret counts as no secret.
    #[must_use]
    pub fn is_signing(&self) -> bool {
        self.secret().is_some()
    }

    /// Adds a signature to an existing URL and returns the signed URL.
    ///
    /// The signature covers the path and query string only. A fragment is kept
    /// and moved after the new `signature` parameter. References without a
    /// scheme keep their shape: `//cdn.example.com/1.jpg` keeps its host,
    /// `/images/1.jpg` and `images/1.jpg` stay relative.
    ///
    /// A secret should be configured; without one the URL is signed with an
    /// empty key.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), err))]
    pub fn sign(&self, url: &str) -> Result<String> {
        if self.secret().is_none() {
            #[cfg(feature = "tracing")]
            tracing::warn!("no secret configured, signing with an empty key");
        }

        self.sign_target(Target::parse(url)?)
    }

    /// Generates a URL for `path` and `params`, signed if a non-empty secret
    /// is configured.
    ///
    /// Parameters are sorted by name, so the same map always produces the same
    /// URL. An empty `path` becomes `/`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, params), err)
    )]
    pub fn url(&self, path: &str, params: Option<&Params>) -> Result<String> {
        let mut url = self.base_url()?;
        url.set_path(if path.is_empty() { "/" } else { path });

        let query = params
            .map(canonical_query)
            .transpose()?
            .filter(|q| !q.is_empty());
        url.set_query(query.as_deref());

        if !self.is_signing() {
            return Ok(url.into());
        }

        self.sign_target(Target::Absolute(url))
    }

    /// Checks the `signature` parameter of a URL produced by [`Client::sign`]
    /// or [`Client::url`].
    ///
    /// Returns `Ok(false)` when the signature is missing, malformed or does not
    /// match. Comparison runs in constant time.
    #[cfg_attr(feature = "tracing", tracing::instrument(level = "debug", skip(self), err))]
    pub fn verify(&self, url: &str) -> Result<bool> {
        let target = Target::parse(url)?;

        let Some(query) = target.url().query() else {
            return Ok(false);
        };
        let (rest, Some(signature)) = split_param(query, SIGNATURE_PARAM) else {
            return Ok(false);
        };

        let message = string_to_sign(target.signed_path(), Some(&rest));
        let valid = verify_digest(self.key(), &message, signature)?;

        #[cfg(feature = "tracing")]
        tracing::debug!(valid, "verified signature");

        Ok(valid)
    }

    /// Signature for an already canonical `path[?query]` string, used as is.
    pub fn signature(&self, path_and_query: &str) -> Result<String> {
        digest(self.key(), path_and_query.as_bytes())
    }

    fn secret(&self) -> Option<&str> {
        self.secret
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|secret| !secret.is_empty())
    }

    fn key(&self) -> &[u8] {
        self.secret().map_or(&[][..], str::as_bytes)
    }

    fn base_url(&self) -> Result<Url> {
        if self.host.is_empty() {
            return Err(Error::validation("host is required to build URLs"));
        }

        let url = Url::parse(&format!("{}://{}", self.scheme, self.host))?;
        if url.path() != "/" || url.query().is_some() || url.fragment().is_some() {
            return Err(Error::validation(format!(
                "host `{}` must not contain a path, query or fragment",
                self.host
            )));
        }

        Ok(url)
    }

    fn sign_target(&self, mut target: Target) -> Result<String> {
        let url = target.url_mut();
        if url.path().is_empty() {
            url.set_path("/");
        }

        // A bare `?` counts as no query string.
        let query = target
            .url()
            .query()
            .filter(|q| !q.is_empty())
            .map(str::to_owned);
        let message = string_to_sign(target.signed_path(), query.as_deref());
        let signature = digest(self.key(), &message)?;

        #[cfg(feature = "tracing")]
        tracing::trace!(
            path = target.signed_path(),
            query = query.as_deref(),
            "signing url"
        );

        let query = match query {
            Some(query) => format!("{query}&{SIGNATURE_PARAM}={signature}"),
            None => format!("{SIGNATURE_PARAM}={signature}"),
        };
        target.url_mut().set_query(Some(&query));

        Ok(target.into_string())
    }
}

/// A URL handed to [`Client::sign`] or [`Client::verify`], classified by
/// how much of it the caller wrote.
///
/// Everything but `Absolute` is resolved against [`RELATIVE_BASE`] so the
/// `url` crate can normalise it, and rendered back without the parts the
/// base filled in.
#[derive(Debug)]
enum Target {
    /// `http://host/path?query`
    Absolute(Url),
    /// `//host/path?query`
    NetworkPath(Url),
    /// `/path?query`, `?query` or empty
    AbsolutePath(Url),
    /// `path?query`
    RelativePath(Url),
}

impl Target {
    fn parse(input: &str) -> Result<Self> {
        match Url::parse(input) {
            Ok(url) => Ok(Target::Absolute(url)),
            Err(url::ParseError::RelativeUrlWithoutBase) => {
                let url = Url::parse(RELATIVE_BASE)?.join(input)?;

                Ok(if input.starts_with("//") {
                    Target::NetworkPath(url)
                } else if input.is_empty() || input.starts_with(['/', '?', '#']) {
                    Target::AbsolutePath(url)
                } else {
                    Target::RelativePath(url)
                })
            }
            Err(e) => Err(e.into()),
        }
    }

    fn url(&self) -> &Url {
        match self {
            Target::Absolute(url)
            | Target::NetworkPath(url)
            | Target::AbsolutePath(url)
            | Target::RelativePath(url) => url,
        }
    }

    fn url_mut(&mut self) -> &mut Url {
        match self {
            Target::Absolute(url)
            | Target::NetworkPath(url)
            | Target::AbsolutePath(url)
            | Target::RelativePath(url) => url,
        }
    }

    /// The path as the caller wrote it, before decoding.
    fn signed_path(&self) -> &str {
        match self {
            Target::RelativePath(url) => strip_root(url.path()),
            other => other.url().path(),
        }
    }

    fn into_string(self) -> String {
        match self {
            Target::Absolute(url) => url.into(),
            Target::NetworkPath(url) => format!("//{}", &url[Position::BeforeUsername..]),
            Target::AbsolutePath(url) => url[Position::BeforePath..].to_owned(),
            Target::RelativePath(url) => {
                format!("{}{}", strip_root(url.path()), &url[Position::AfterPath..])
            }
        }
    }
}

/// Drops the `/` the base put in front of a relative path, unless nothing
/// would be left.
fn strip_root(path: &str) -> &str {
    match path.strip_prefix('/') {
        Some(rest) if !rest.is_empty() => rest,
        _ => path,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SecretPolicy;
    use crate::error::Kind;

    fn client(secret: Option<&str>) -> Client {
        Client::new(
            ClientConfig::builder()
                .host("test.libpx.com")
                .maybe_secret(secret)
                .build(),
        )
        .expect("valid config")
    }

    fn sign(client: &Client, url: &str) -> String {
        client.sign(url).expect("url should sign")
    }

    fn hex_digest(secret: &[u8], message: &[u8]) -> String {
        digest(secret, message).expect("HMAC accepts any key size")
    }

    #[test]
    fn client_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Client>();
    }

    #[test]
    fn new_applies_secret_policy() {
        let config = ClientConfig::builder()
            .secret("")
            .secret_policy(SecretPolicy::RejectEmpty)
            .build();

        let err = Client::new(config).expect_err("empty secret must be rejected");
        assert_eq!(err.kind(), Kind::Validation, "kind");

        let config = ClientConfig::builder().secret("").build();
        let client = Client::new(config).expect("empty secret is allowed by default");
        assert!(!client.is_signing(), "empty secret does not sign");
    }

    #[test]
    fn empty_secret_builds_unsigned_urls() {
        let client = client(Some(""));

        assert!(!client.is_signing(), "empty secret counts as no secret");
        assert_eq!(
            client
                .url("/images/5.jpg", None)
                .expect("url should build"),
            "http://test.libpx.com/images/5.jpg",
            "no signature parameter"
        );
        assert_eq!(
            sign(&client, "/images/5.jpg"),
            format!(
                "/images/5.jpg?signature={}",
                hex_digest(b"", b"/images/5.jpg")
            ),
            "sign still uses the empty key"
        );
    }

    #[test]
    fn sign_with_empty_path_uses_root() {
        let client = client(Some("LibPixel"));

        let with_slash = sign(&client, "http://test.libpx.com/");
        let without_slash = sign(&client, "http://test.libpx.com");

        assert_eq!(with_slash, without_slash, "empty path signs as `/`");
        assert!(
            with_slash.starts_with("http://test.libpx.com/?signature="),
            "{with_slash}"
        );
    }

    #[test]
    fn sign_without_secret_uses_empty_key() {
        let client = client(None);
        let expected = hex_digest(b"", b"/images/1.jpg");

        assert_eq!(
            sign(&client, "http://test.libpx.com/images/1.jpg"),
            format!("http://test.libpx.com/images/1.jpg?signature={expected}"),
            "empty key"
        );
    }

    #[test]
    fn sign_absolute_path_stays_relative() {
        let client = client(Some("LibPixel"));

        assert_eq!(
            sign(&client, "/images/2.jpg?width=400"),
            "/images/2.jpg?width=400&signature=baa12c05ed279dbc623ffc8b74b183f6044e5998",
            "no scheme or host is added"
        );
    }

    #[test]
    fn sign_network_path_keeps_host() {
        let client = client(Some("LibPixel"));

        assert_eq!(
            sign(&client, "//cdn.example.com/images/1.jpg"),
            "//cdn.example.com/images/1.jpg?signature=bd5634c055d707c1638eff93eb88ff31277958f0",
            "authority is kept, no scheme is added"
        );
        assert_eq!(
            sign(&client, "//cdn.example.com:8080/images/1.jpg#top"),
            "//cdn.example.com:8080/images/1.jpg?signature=bd5634c055d707c1638eff93eb88ff31277958f0#top",
            "port and fragment are kept"
        );
    }

    #[test]
    fn sign_relative_path_gets_no_leading_slash() {
        let client = client(Some("LibPixel"));
        let expected = hex_digest(b"LibPixel", b"images/1.jpg?width=400");

        assert_eq!(
            sign(&client, "images/1.jpg?width=400"),
            format!("images/1.jpg?width=400&signature={expected}"),
            "path is signed and returned as written"
        );
    }

    #[test]
    fn verify_accepts_references_without_scheme() {
        let client = client(Some("LibPixel"));

        for input in [
            "//cdn.example.com/images/1.jpg",
            "/images/1.jpg?width=400",
            "images/1.jpg",
        ] {
            let signed = sign(&client, input);
            assert!(
                client.verify(&signed).expect("signed url should parse"),
                "{signed}"
            );
        }
    }

    #[test]
    fn sign_rejects_malformed_urls() {
        let client = client(Some("LibPixel"));

        for input in ["http://exa mple.com/1.jpg", "http://[::1/1.jpg", "http://"] {
            let err = client.sign(input).expect_err("malformed url must fail");
            assert_eq!(err.kind(), Kind::Parse, "{input}");
        }
    }

    #[test]
    fn url_requires_host() {
        let client = Client::new(ClientConfig::builder().secret("LibPixel").build())
            .expect("valid config");

        let err = client
            .url("/images/1.jpg", None)
            .expect_err("host is required");
        assert_eq!(err.kind(), Kind::Validation, "kind");
    }

    #[test]
    fn url_rejects_host_with_path() {
        let client = Client::new(ClientConfig::builder().host("test.libpx.com/x").build())
            .expect("valid config");

        let err = client
            .url("/images/1.jpg", None)
            .expect_err("host with a path is rejected");
        assert_eq!(err.kind(), Kind::Validation, "kind");
    }

    #[test]
    fn url_rejects_non_finite_params() {
        let client = client(None);
        let params = Params::new().with("dpr", f64::NAN);

        let err = client
            .url("/images/1.jpg", Some(&params))
            .expect_err("NaN has no string form");
        assert_eq!(err.kind(), Kind::Stringification, "kind");
    }

    #[test]
    fn url_encodes_path_and_signs_decoded_path() {
        let client = client(Some("LibPixel"));
        let expected = hex_digest(b"LibPixel", b"/my image.jpg");

        assert_eq!(
            client.url("/my image.jpg", None).expect("url should build"),
            format!("http://test.libpx.com/my%20image.jpg?signature={expected}"),
            "path is encoded in the URL, decoded in the signature"
        );
    }

    #[test]
    fn signature_matches_sign() {
        let client = client(Some("LibPixel"));

        assert_eq!(
            client
                .signature("/images/1.jpg")
                .expect("signature should compute"),
            "bd5634c055d707c1638eff93eb88ff31277958f0",
            "same digest as sign"
        );
    }

    #[test]
    fn strip_root_keeps_lone_slash() {
        assert_eq!(strip_root("/images/1.jpg"), "images/1.jpg", "leading slash");
        assert_eq!(strip_root("/"), "/", "root stays");
    }
}
