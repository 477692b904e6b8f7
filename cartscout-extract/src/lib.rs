//! Product extraction from rendered marketplace search pages.
//!
//! Each marketplace is a [`SiteAdapter`] carrying a versioned [`RuleSet`]:
//! which selector proves results rendered, how one product is enclosed, and
//! how each attribute is located and read. Alignment of independently
//! gathered candidates into per-product records lives in [`align`]:
//!
//! - container-scoped: every attribute of a product is read from inside that
//!   product's own container node, so cross-product mix-ups cannot happen;
//! - positional: name candidates form the spine, prices are re-anchored
//!   through their enclosing section, links and images are paired by index.
//!
//! ```rust
//! use cartscout_extract::{ParsedTree, Site, SiteAdapter};
//!
//! let html = r#"<ul>
//!   <li class="product-base">
//!     <a data-refreshpage="true" href="shirts/roadster/1/buy">
//!       <img class="img-responsive" src="https://img.test/1.jpg">
//!       <h3 class="product-brand">Roadster</h3>
//!       <h4 class="product-product">Checked Shirt</h4>
//!       <div class="product-price"><span>Rs. 599</span></div>
//!     </a>
//!   </li>
//! </ul>"#;
//!
//! let adapter = SiteAdapter::for_site(Site::Myntra).unwrap();
//! let batch = adapter.extract(&ParsedTree::parse(html)).unwrap();
//! assert_eq!(batch.len(), 1);
//! assert_eq!(batch.records()[0].name, "Checked Shirt");
//! assert_eq!(batch.records()[0].link, "https://www.myntra.com/shirts/roadster/1/buy");
//! ```
pub mod adapter;
pub mod align;
pub mod rules;
pub mod sites;
pub mod tree;

pub use adapter::{Site, SiteAdapter};
pub use rules::{Attribute, Locator, RuleSet, Strategy};
pub use tree::ParsedTree;
