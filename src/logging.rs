//! tracing setup. `RUST_LOG` filters (default `info`), `CBDC_PROXY_LOG_JSON=1`
//! switches to JSON lines. Output goes to stderr so CLI JSON stays clean.

use tracing_subscriber::{fmt, EnvFilter};

pub const LOG_JSON_ENV: &str = "CBDC_PROXY_LOG_JSON";

pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let use_json = std::env::var(LOG_JSON_ENV).map(|value| value == "1").unwrap_or(false);

    let builder = fmt::Subscriber::builder().with_env_filter(env_filter).with_writer(std::io::stderr);
    let _ = if use_json { builder.json().try_init() } else { builder.pretty().try_init() };
}
