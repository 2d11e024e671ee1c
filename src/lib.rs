//! Client to generate and sign [libpixel](https://libpixel.com) image API URLs.
//!
//! A [`Client`] turns a path plus [`Params`] into a canonical URL and, when a
//! secret is configured, appends an HMAC-SHA1 `signature` query parameter over
//! the path and query string. Already formed URLs can be signed directly with
//! [`Client::sign`], and services receiving signed URLs can check them with
//! [`Client::verify`].
//!
//! ```
//! use libpixel::{Client, ClientConfig, Params};
//!
//! let client = Client::new(
//!     ClientConfig::builder()
//!         .host("test.libpx.com")
//!         .secret("TOP-SECRET")
//!         .build(),
//! )?;
//!
//! let params = Params::new().with("width", 600).with("blur", 20);
//! let url = client.url("/images/1.jpg", Some(&params))?;
//! assert_eq!(
//!     url,
//!     "http://test.libpx.com/images/1.jpg?blur=20&width=600&signature=199cb62b964d9ddef84eaf3a7df30d41fa398b74",
//!     "params are sorted, then signed"
//! );
//! # Ok::<(), libpixel::error::Error>(())
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod params;
pub mod policy;
mod signer;

pub use client::Client;
pub use config::{ClientConfig, RawClientConfig, Scheme};
pub use params::{ParamValue, Params};
pub use policy::SecretPolicy;

pub type Result<T> = std::result::Result<T, error::Error>;

/// Name of the query parameter carrying the signature.
pub const SIGNATURE_PARAM: &str = "signature";
