use log::debug;

// Public Exports
pub use log;
pub use reqwest;
pub use serde;
pub use serde_json;
pub use tokio;

pub mod conversion;
pub mod macros;
pub mod progress;
pub mod remote_file;

/// User-agent sent with every remote API call.
///
/// It will always follow the version declared inside ```Cargo.toml```
#[inline]
pub fn user_agent() -> String {
    let ua = format!("Drive HEIC Converter/{}", env!("CARGO_PKG_VERSION"));
    debug!("Using user-agent: {}", ua);
    ua
}
