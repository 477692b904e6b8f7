//! Grouping independently located candidates into per-product records.
use crate::rules::{Attribute, Locator, RuleSet};
use crate::tree::ParsedTree;
use cartscout_common::{ExtractionError, ProductRecord};
use scraper::{ElementRef, Selector};
use tracing::debug;
use url::Url;

/// Build one record, substituting sentinels for anything `value` cannot read.
fn assemble(
    rules: &RuleSet,
    mut value: impl FnMut(Attribute, &Locator) -> Option<String>,
) -> ProductRecord {
    let mut field = |attribute: Attribute| {
        rules
            .locator(attribute)
            .and_then(|locator| value(attribute, locator))
            .unwrap_or_else(|| attribute.sentinel().to_string())
    };
    let record = ProductRecord::new(
        field(Attribute::Name),
        field(Attribute::Price),
        field(Attribute::Link),
        field(Attribute::Image),
    );
    if rules.has_brand() {
        record.with_brand(field(Attribute::Brand))
    } else {
        record
    }
}

fn no_results(rules: &RuleSet, css: &str) -> ExtractionError {
    ExtractionError::NoResults {
        site: rules.site().to_string(),
        selector: css.to_string(),
    }
}

fn keep_resolved(rules: &RuleSet, records: Vec<ProductRecord>) -> Vec<ProductRecord> {
    let before = records.len();
    let kept: Vec<_> = records.into_iter().filter(|r| !r.is_unresolved()).collect();
    if kept.len() < before {
        debug!(
            target: "extract.align",
            site = rules.site(),
            dropped = before - kept.len(),
            "dropped products with no resolvable attribute"
        );
    }
    kept
}

/// Resolve every attribute from inside each product's own container.
///
/// Containers are taken in page order, at most `limit` of them.
pub fn align_by_container(
    tree: &ParsedTree,
    rules: &RuleSet,
    container_css: &str,
    container: &Selector,
    limit: usize,
) -> Result<Vec<ProductRecord>, ExtractionError> {
    let mut containers = tree.find_all(container);
    if containers.is_empty() {
        return Err(no_results(rules, container_css));
    }
    containers.truncate(limit);

    let base = rules.base_url();
    let records = containers
        .into_iter()
        .map(|node| assemble(rules, |_, locator| locator.resolve_in(node, base)))
        .collect();

    let records = keep_resolved(rules, records);
    if records.is_empty() {
        return Err(no_results(rules, container_css));
    }
    Ok(records)
}

/// Pair candidates that were gathered page-wide.
///
/// The name candidates, capped at `limit`, decide how many products exist.
/// A name's price is looked up through its enclosing `anchor` sections,
/// innermost first, stopping at the first section that also holds another
/// name: that section spans more than one product. A name with no enclosing
/// section at all takes the price at its own index. Links, images and brands
/// are only paired by index, so an extra candidate that has no matching name
/// (a sponsored tile, say) shifts every later product's link or image by one.
pub fn align_by_position(
    tree: &ParsedTree,
    rules: &RuleSet,
    anchor: &Selector,
    limit: usize,
) -> Result<Vec<ProductRecord>, ExtractionError> {
    let name = rules
        .locator(Attribute::Name)
        .ok_or_else(|| ExtractionError::Fault {
            site: rules.site().to_string(),
            reason: "positional alignment needs a name rule".into(),
        })?;

    let mut spine = tree.find_all(name.selector());
    if spine.is_empty() {
        return Err(no_results(rules, name.css()));
    }
    spine.truncate(limit);

    for &attribute in rules.required() {
        if let Some(locator) = rules.locator(attribute) {
            if !tree.contains(locator.selector()) {
                return Err(no_results(rules, locator.css()));
            }
        }
    }

    let base = rules.base_url();
    let prices = rules
        .locator(Attribute::Price)
        .map(|locator| PriceIndex::build(tree, locator, base))
        .unwrap_or_default();

    let by_index = |attribute: Attribute| -> Vec<Option<String>> {
        rules
            .locator(attribute)
            .map(|locator| {
                tree.find_all(locator.selector())
                    .into_iter()
                    .take(limit)
                    .map(|node| locator.read(node, base))
                    .collect()
            })
            .unwrap_or_default()
    };
    let links = by_index(Attribute::Link);
    let images = by_index(Attribute::Image);
    let brands = by_index(Attribute::Brand);

    let mut reanchored = 0usize;
    let records = spine
        .iter()
        .enumerate()
        .map(|(i, &node)| {
            assemble(rules, |attribute, locator| match attribute {
                Attribute::Name => locator.read(node, base),
                Attribute::Price => match prices.lookup(node, anchor, &spine) {
                    Anchored::Found(price) => {
                        reanchored += 1;
                        Some(price)
                    }
                    Anchored::Missing => None,
                    Anchored::Unsectioned => prices.by_position(i),
                },
                Attribute::Link => links.get(i).cloned().flatten(),
                Attribute::Image => images.get(i).cloned().flatten(),
                Attribute::Brand => brands.get(i).cloned().flatten(),
            })
        })
        .collect::<Vec<_>>();

    debug!(
        target: "extract.align",
        site = rules.site(),
        products = records.len(),
        prices_reanchored = reanchored,
        link_candidates = links.len(),
        image_candidates = images.len(),
        "positional alignment complete"
    );

    let records = keep_resolved(rules, records);
    if records.is_empty() {
        return Err(no_results(rules, name.css()));
    }
    Ok(records)
}

enum Anchored {
    Found(String),
    /// The name sits in a section, but no price shares it.
    Missing,
    /// The name has no enclosing section to anchor through.
    Unsectioned,
}

/// Page-wide price candidates in document order.
#[derive(Default)]
struct PriceIndex<'a> {
    candidates: Vec<(ElementRef<'a>, Option<String>)>,
}

fn is_within(node: ElementRef<'_>, section: ElementRef<'_>) -> bool {
    node.ancestors().any(|ancestor| ancestor.id() == section.id())
}

impl<'a> PriceIndex<'a> {
    fn build(tree: &'a ParsedTree, locator: &Locator, base: &Url) -> Self {
        let candidates = tree
            .find_all(locator.selector())
            .into_iter()
            .map(|node| (node, locator.read(node, base)))
            .collect();
        Self { candidates }
    }

    fn lookup(&self, name: ElementRef<'_>, anchor: &Selector, spine: &[ElementRef<'_>]) -> Anchored {
        let mut sectioned = false;
        for section in ParsedTree::enclosing(name, anchor) {
            sectioned = true;
            let shared = spine
                .iter()
                .any(|other| other.id() != name.id() && is_within(*other, section));
            if shared {
                break;
            }
            let price = self
                .candidates
                .iter()
                .find(|(node, _)| is_within(*node, section))
                .and_then(|(_, value)| value.clone());
            if let Some(price) = price {
                return Anchored::Found(price);
            }
        }
        if sectioned {
            Anchored::Missing
        } else {
            Anchored::Unsectioned
        }
    }

    fn by_position(&self, i: usize) -> Option<String> {
        self.candidates.get(i).and_then(|(_, value)| value.clone())
    }
}
