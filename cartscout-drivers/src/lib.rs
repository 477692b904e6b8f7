//! Page acquisition for cartscout.
//!
//! This crate turns a search URL into a fully rendered markup snapshot. The
//! pipeline only sees the [`acquirer::PageAcquirer`] trait; implementations
//! are explicitly constructed values whose lifetime the caller controls.
//!
//! - [`acquirer::WebDriverAcquirer`]: live browser via a WebDriver endpoint
//! - [`snapshot::SnapshotAcquirer`]: replays saved HTML (offline runs, tests)
//! - [`browser::driver::ScoutDriver`]: `fantoccini` client wrapper
//! - [`browser::capabilities`]: OS/browser detection and session capabilities
pub mod acquirer;
pub mod browser;
pub mod snapshot;

pub use acquirer::{PageAcquirer, WebDriverAcquirer};
pub use snapshot::SnapshotAcquirer;
