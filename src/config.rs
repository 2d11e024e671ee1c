use std::fmt;
use std::str::FromStr;

use bon::Builder;
use secrecy::SecretString;
use serde::Deserialize;

use crate::Result;
use crate::error::Error;
use crate::policy::SecretPolicy;

/// URL scheme used for generated URLs.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub enum Scheme {
    #[default]
    Http,
    Https,
}

impl Scheme {
    #[must_use]
    pub const fn from_https(https: bool) -> Self {
        if https { Scheme::Https } else { Scheme::Http }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Scheme::Http => "http",
            Scheme::Https => "https",
        }
    }

    /// Parses config-style input: a scheme name or a boolean "use https" flag.
    pub fn parse(value: &str) -> Result<Scheme> {
        match value.trim().to_ascii_lowercase().as_str() {
            "http" | "false" | "0" | "no" => Ok(Scheme::Http),
            "https" | "true" | "1" | "yes" => Ok(Scheme::Https),
            other => Err(Error::validation(format!(
                "invalid scheme `{other}`; expected one of: http|https"
            ))),
        }
    }
}

impl FromStr for Scheme {
    type Err = Error;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Scheme::parse(s)
    }
}

impl fmt::Display for Scheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Raw client values typically passed from app-level config.
#[non_exhaustive]
#[derive(Clone, Debug)]
pub struct RawClientConfig {
    pub host: String,
    pub scheme: String,
    pub secret: Option<SecretString>,
}

impl RawClientConfig {
    #[must_use]
    pub fn new<H, S>(host: H, scheme: S, secret: Option<SecretString>) -> Self
    where
        H: Into<String>,
        S: Into<String>,
    {
        Self {
            host: host.into(),
            scheme: scheme.into(),
            secret,
        }
    }
}

/// Client configuration.
///
/// `host` is only needed by [`Client::url`](crate::Client::url); a client that
/// only signs complete URLs can leave it empty. Without a `secret`, generated
/// URLs are not signed.
#[non_exhaustive]
#[derive(Builder, Clone, Debug, Default, Deserialize)]
pub struct ClientConfig {
    #[builder(into, default)]
    #[serde(default)]
    pub host: String,
    #[builder(default)]
    #[serde(default)]
    pub https: bool,
    #[builder(into)]
    #[serde(default)]
    pub secret: Option<SecretString>,
    #[builder(default)]
    #[serde(default)]
    pub secret_policy: SecretPolicy,
}

impl ClientConfig {
    pub fn from_raw(raw: RawClientConfig, secret_policy: SecretPolicy) -> Result<Self> {
        let scheme = Scheme::from_str(&raw.scheme)?;

        Ok(Self {
            host: raw.host.trim().to_owned(),
            https: scheme == Scheme::Https,
            secret: raw.secret,
            secret_policy,
        })
    }

    #[must_use]
    pub const fn scheme(&self) -> Scheme {
        Scheme::from_https(self.https)
    }
}

#[cfg(test)]
mod tests {
    use secrecy::ExposeSecret;

    use super::*;
    use crate::error::Kind;

    fn parse(value: &str) -> Scheme {
        Scheme::parse(value).expect("scheme should parse")
    }

    #[test]
    fn scheme_parse_accepts_names_and_flags() {
        assert_eq!(parse("http"), Scheme::Http, "plain name");
        assert_eq!(parse(" HTTPS "), Scheme::Https, "trimmed, case-insensitive");
        assert_eq!(parse("true"), Scheme::Https, "boolean flag");
        assert_eq!(parse("0"), Scheme::Http, "numeric flag");
        assert_eq!(
            "yes".parse::<Scheme>().expect("scheme should parse"),
            Scheme::Https,
            "FromStr delegates to parse"
        );
    }

    #[test]
    fn scheme_parse_rejects_unknown() {
        let err = Scheme::parse("ftp").expect_err("ftp is not supported");

        assert_eq!(err.kind(), Kind::Validation, "kind");
        assert!(err.to_string().contains("ftp"), "message names the input");
    }

    #[test]
    fn builder_defaults_to_plain_http_without_secret() {
        let config = ClientConfig::builder().host("test.libpx.com").build();

        assert_eq!(config.host, "test.libpx.com", "host");
        assert_eq!(config.scheme(), Scheme::Http, "scheme");
        assert!(config.secret.is_none(), "no secret by default");
        assert_eq!(config.secret_policy, SecretPolicy::AllowEmpty, "policy");
    }

    #[test]
    fn from_raw_trims_host_and_parses_scheme() {
        let raw = RawClientConfig::new(
            " test.libpx.com ",
            "https",
            Some(SecretString::from("LibPixel")),
        );

        let config = ClientConfig::from_raw(raw, SecretPolicy::RejectEmpty)
            .expect("raw config should convert");

        assert_eq!(config.host, "test.libpx.com", "host is trimmed");
        assert!(config.https, "https scheme");
        assert_eq!(
            config.secret.as_ref().map(ExposeSecret::expose_secret),
            Some("LibPixel"),
            "secret is kept"
        );
        assert_eq!(config.secret_policy, SecretPolicy::RejectEmpty, "policy");
    }

    #[test]
    fn deserialize_from_json() {
        let config: ClientConfig = serde_json::from_str(
            r#"{"host":"test.libpx.com","https":true,"secret":"LibPixel","secret_policy":"reject_empty"}"#,
        )
        .expect("config should deserialize");

        assert_eq!(config.scheme(), Scheme::Https, "scheme");
        assert_eq!(
            config.secret.as_ref().map(ExposeSecret::expose_secret),
            Some("LibPixel"),
            "secret"
        );
        assert_eq!(config.secret_policy, SecretPolicy::RejectEmpty, "policy");
    }

    #[test]
    fn debug_output_hides_secret() {
        let config = ClientConfig::builder().secret("TOP-SECRET").build();

        assert!(
            !format!("{config:?}").contains("TOP-SECRET"),
            "secret must not leak into Debug output"
        );
    }
}
