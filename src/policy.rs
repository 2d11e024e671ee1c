use serde::Deserialize;

use crate::Result;
use crate::error::Error;

/// What to do when a client is configured with an empty secret.
///
/// An empty secret still keys the HMAC, so the URLs verify, but anyone can
/// forge them. `AllowEmpty` keeps that behaviour for compatibility.
#[non_exhaustive]
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum SecretPolicy {
    #[default]
    AllowEmpty,
    RejectEmpty,
}

impl SecretPolicy {
    pub(crate) fn ensure_allowed(self, secret: Option<&str>) -> Result<()> {
        match (self, secret) {
            (SecretPolicy::RejectEmpty, Some("")) => Err(Error::validation(
                "secret policy RejectEmpty forbids an empty secret",
            )),
            (SecretPolicy::AllowEmpty, Some("")) => {
                #[cfg(feature = "tracing")]
                tracing::warn!("empty secret configured, built URLs will not be signed");
                Ok(())
            }
            _ => Ok(()),
        }
    }
}
