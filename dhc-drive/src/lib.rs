//! Remote side of the Drive HEIC converter.
//!
//! Everything that talks to the Drive API lives here: the service-account
//! [credential provider](crate::auth), the [`DriveApi`](crate::api::DriveApi)
//! capability trait with its HTTP implementation, the
//! [folder lister](crate::lister) and the [chunked downloader](crate::downloader).
//!
//! The lister and downloader only ever see `Arc<dyn DriveApi>`, so tests can
//! run the whole remote pipeline against scripted doubles.
pub mod api;
pub mod auth;
pub mod downloader;
pub mod error;
pub mod lister;

pub use error::DriveError;
