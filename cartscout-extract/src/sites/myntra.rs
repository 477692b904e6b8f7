//! myntra.com search results: one `li.product-base` per product.
use crate::rules::{Attribute, Locator, RuleSet, Strategy};
use cartscout_common::ExtractionError;
use url::Url;

pub const VERSION: &str = "2025.02";
pub const BASE_URL: &str = "https://www.myntra.com";
pub const PRESENCE: &str = "li.product-base";

pub fn rules() -> Result<RuleSet, ExtractionError> {
    Ok(RuleSet::new(
        "myntra",
        VERSION,
        BASE_URL,
        PRESENCE,
        Strategy::container(PRESENCE)?,
    )?
    .rule(Attribute::Name, Locator::text("h4.product-product")?)
    .rule(Attribute::Brand, Locator::text("h3.product-brand")?)
    .rule(
        Attribute::Price,
        Locator::text("div.product-price")?.within("span")?,
    )
    .rule(
        Attribute::Link,
        Locator::attr(r#"a[data-refreshpage="true"]"#, "href")?.against_base(),
    )
    .rule(
        Attribute::Image,
        Locator::attr("img.img-responsive", "src")?,
    ))
}

/// `https://www.myntra.com/<slug>?rawQuery=<query>`
///
/// The slug keeps letters, digits and hyphens; any other run of characters
/// becomes a single hyphen.
pub fn search_url(base: &Url, query: &str) -> Url {
    let query = query.trim();
    let lowered = query.to_lowercase();
    let slug = lowered
        .split(|c: char| !(c.is_alphanumeric() || c == '-'))
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");
    let mut url = base.clone();
    url.set_path(&slug);
    url.query_pairs_mut().clear().append_pair("rawQuery", query);
    url
}
