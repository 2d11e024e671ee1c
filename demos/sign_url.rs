//! Signs a URL and generates another one from parameters.
//!
//! ```sh
//! RUST_LOG=libpixel=trace cargo run --example sign_url --features tracing
//! ```

use libpixel::{Client, ClientConfig, Params};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let client = Client::new(
        ClientConfig::builder()
            .host("test.libpx.com")
            .secret("TOP-SECRET")
            .build(),
    )?;

    let signed = client.sign("http://test.libpx.com/images/1.jpg")?;
    tracing::info!(%signed, "signed existing url");

    let params = Params::new().with("width", 600).with("blur", 20);
    let generated = client.url("/images/1.jpg", Some(&params))?;
    tracing::info!(%generated, valid = client.verify(&generated)?, "generated url");

    Ok(())
}
