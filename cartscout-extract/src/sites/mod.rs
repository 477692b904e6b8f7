//! Rule sets for the supported marketplaces.
//!
//! Update a site's module when its markup changes and bump its `VERSION`.
pub mod amazon;
pub mod myntra;

/// Both supported storefronts price in Indian rupees.
pub const RUPEE: &str = "₹";
