//! Common types and utilities shared across cartscout crates.
//!
//! This crate defines the product record model, the capped extraction batch,
//! the error taxonomy and observability helpers used throughout the
//! workspace. It stays dependency-light so every crate can depend on it.
//!
//! # Overview
//!
//! - [`ProductRecord`]: one extracted listing, sentinel-filled where unresolved
//! - [`ExtractionBatch`]: immutable, capped sequence of records for one search
//! - [`error`]: [`AcquisitionError`], [`ExtractionError`], [`StoreError`] and
//!   the umbrella [`CartscoutError`]
//! - [`BrowserKind`]: which WebDriver-backed browser drives acquisition
//! - [`observability`]: centralised tracing/logging initialisation
//!
//! # Examples
//!
//! ```rust
//! use cartscout_common::{ExtractionBatch, ProductRecord, MAX_BATCH};
//!
//! let records = (0..25)
//!     .map(|i| ProductRecord::new(format!("N{i}"), "499", "No Link", "No Image"))
//!     .collect::<Vec<_>>();
//! let batch = ExtractionBatch::new(records);
//! assert_eq!(batch.len(), MAX_BATCH);
//! assert_eq!(batch.records()[0].name, "N0");
//! ```
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod error;
pub mod observability;

pub use error::{AcquisitionError, CartscoutError, ExtractionError, Result, StoreError};

/// Maximum number of products taken from one search-result page.
pub const MAX_BATCH: usize = 18;

/// Fallback values substituted when an attribute cannot be resolved.
pub mod sentinel {
    pub const NAME: &str = "No Name";
    pub const PRICE: &str = "N/A";
    pub const LINK: &str = "No Link";
    pub const IMAGE: &str = "No Image";
    pub const BRAND: &str = "No Brand Name";
}

/// One product listing as extracted from a results page.
///
/// Every required field holds either a real value or the exact sentinel for
/// that field; `brand` is only present for sites that expose it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub name: String,
    pub price: String,
    pub link: String,
    pub image: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub brand: Option<String>,
}

impl ProductRecord {
    pub fn new(
        name: impl Into<String>,
        price: impl Into<String>,
        link: impl Into<String>,
        image: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            price: price.into(),
            link: link.into(),
            image: image.into(),
            brand: None,
        }
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    /// True when every present field is its sentinel, i.e. nothing resolved.
    pub fn is_unresolved(&self) -> bool {
        self.name == sentinel::NAME
            && self.price == sentinel::PRICE
            && self.link == sentinel::LINK
            && self.image == sentinel::IMAGE
            && self.brand.as_deref().map_or(true, |b| b == sentinel::BRAND)
    }
}

/// Ordered, capped sequence of records produced by one search.
///
/// Construction truncates to [`MAX_BATCH`]; the batch exposes no mutation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractionBatch {
    records: Vec<ProductRecord>,
}

impl ExtractionBatch {
    pub fn new(mut records: Vec<ProductRecord>) -> Self {
        records.truncate(MAX_BATCH);
        Self { records }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn records(&self) -> &[ProductRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ProductRecord> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a ExtractionBatch {
    type Item = &'a ProductRecord;
    type IntoIter = std::slice::Iter<'a, ProductRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Browser driven through WebDriver during acquisition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BrowserKind {
    Chrome,
    Firefox,
    Edge,
    Safari,
}

impl fmt::Display for BrowserKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BrowserKind::Chrome => "chrome",
            BrowserKind::Firefox => "firefox",
            BrowserKind::Edge => "edge",
            BrowserKind::Safari => "safari",
        };
        f.write_str(name)
    }
}
