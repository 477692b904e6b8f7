//! amazon.in search results.
//!
//! Result tiles do not share one reliable container, so products are aligned
//! positionally with the title links as the spine and prices re-anchored
//! through their enclosing `div.a-section`.
use crate::rules::{Attribute, Locator, RuleSet, Strategy};
use cartscout_common::ExtractionError;
use url::Url;

pub const VERSION: &str = "2025.02";
pub const BASE_URL: &str = "https://www.amazon.in";
pub const PRESENCE: &str = "a.a-link-normal.s-line-clamp-2.s-link-style.a-text-normal";

pub fn rules() -> Result<RuleSet, ExtractionError> {
    Ok(RuleSet::new(
        "amazon",
        VERSION,
        BASE_URL,
        PRESENCE,
        Strategy::positional("div.a-section")?,
    )?
    .rule(Attribute::Name, Locator::text(PRESENCE)?.within("span")?)
    .rule(Attribute::Price, Locator::text("span.a-price-whole")?)
    .rule(
        Attribute::Link,
        Locator::attr("a.a-link-normal.s-no-outline", "href")?.against_base(),
    )
    .rule(
        Attribute::Image,
        Locator::attr("div.a-section.aok-relative.s-image-tall-aspect", "src")?
            .within("img.s-image")?,
    )
    .require(Attribute::Name)
    .require(Attribute::Price))
}

/// `https://www.amazon.in/s?k=<query>`
pub fn search_url(base: &Url, query: &str) -> Url {
    let mut url = base.clone();
    url.set_path("/s");
    url.query_pairs_mut().clear().append_pair("k", query.trim());
    url
}
