use cartscout_common::{sentinel, ExtractionError, MAX_BATCH};
use cartscout_extract::{ParsedTree, Site, SiteAdapter};

fn myntra() -> SiteAdapter {
    SiteAdapter::for_site(Site::Myntra).unwrap()
}

fn amazon() -> SiteAdapter {
    SiteAdapter::for_site(Site::Amazon).unwrap()
}

fn myntra_tile(n: usize) -> String {
    format!(
        r#"<li class="product-base" id="p{n}">
  <a data-refreshpage="true" href="tops/brand{n}/{n}/buy" target="_blank">
    <div class="product-imageSliderContainer"><img class="img-responsive" src="https://assets.myntassets.com/{n}.jpg"></div>
    <div class="product-productMetaInfo">
      <h3 class="product-brand">Brand{n}</h3>
      <h4 class="product-product">N{n}</h4>
      <div class="product-price"><span>Rs. P{n}</span><span class="product-discountedPrice"></span></div>
    </div>
  </a>
</li>"#
    )
}

fn myntra_page(body: &str) -> ParsedTree {
    ParsedTree::parse(&format!(
        r#"<html><body><div class="search-searchProductsContainer"><ul class="results-base">{body}</ul></div></body></html>"#
    ))
}

fn amazon_tile(asin: &str, name: &str, price: Option<&str>) -> String {
    let price = price
        .map(|p| {
            format!(
                r#"<div class="a-row"><a class="a-link-normal" href="/dp/{asin}"><span class="a-price"><span class="a-price-whole">{p}</span></span></a></div>"#
            )
        })
        .unwrap_or_default();
    format!(
        r#"<div class="s-result-item" data-asin="{asin}">
  <div class="a-section a-spacing-base">
    <span class="rush-component"><a class="a-link-normal s-no-outline" href="/dp/{asin}">
      <div class="a-section aok-relative s-image-tall-aspect"><img class="s-image" src="https://m.media-amazon.com/images/{asin}.jpg"></div>
    </a></span>
    <div class="a-section a-spacing-none">
      <h2><a class="a-link-normal s-line-clamp-2 s-link-style a-text-normal" href="/dp/{asin}"><span>{name}</span></a></h2>
    </div>
    {price}
  </div>
</div>"#
    )
}

fn amazon_page(body: &str) -> ParsedTree {
    ParsedTree::parse(&format!(
        r#"<html><body><div class="s-main-slot s-result-list">{body}</div></body></html>"#
    ))
}

#[test]
fn container_alignment_pairs_within_each_product() {
    let body = [
        myntra_tile(3),
        r#"<li class="banner"><h4 class="product-product">Sponsored</h4><span>Rs. 1</span></li>"#.to_string(),
        myntra_tile(1),
        r#"<div class="product-price"><span>Rs. 9999</span></div>"#.to_string(),
        myntra_tile(2),
    ]
    .concat();
    let batch = myntra().extract(&myntra_page(&body)).unwrap();

    let pairs: Vec<_> = batch
        .iter()
        .map(|r| (r.name.as_str(), r.price.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![("N3", "Rs. P3"), ("N1", "Rs. P1"), ("N2", "Rs. P2")]
    );

    let first = &batch.records()[0];
    assert_eq!(first.brand.as_deref(), Some("Brand3"));
    assert_eq!(first.link, "https://www.myntra.com/tops/brand3/3/buy");
    assert_eq!(first.image, "https://assets.myntassets.com/3.jpg");
}

#[test]
fn batches_are_capped() {
    let body: String = (1..=25).map(myntra_tile).collect();
    let batch = myntra().extract(&myntra_page(&body)).unwrap();
    assert_eq!(batch.len(), MAX_BATCH);
    assert_eq!(batch.records()[0].name, "N1");
    assert_eq!(batch.records()[MAX_BATCH - 1].name, "N18");
}

#[test]
fn unresolved_attributes_become_sentinels() {
    let body = r#"<li class="product-base"><h4 class="product-product">Plain Tee</h4></li>"#;
    let batch = myntra().extract(&myntra_page(body)).unwrap();
    let record = &batch.records()[0];
    assert_eq!(record.name, "Plain Tee");
    assert_eq!(record.price, sentinel::PRICE);
    assert_eq!(record.link, sentinel::LINK);
    assert_eq!(record.image, sentinel::IMAGE);
    assert_eq!(record.brand.as_deref(), Some(sentinel::BRAND));
    for record in &batch {
        assert!(!record.name.is_empty());
        assert!(!record.price.is_empty());
        assert!(!record.link.is_empty());
        assert!(!record.image.is_empty());
    }
}

#[test]
fn empty_containers_are_dropped() {
    let body = [
        myntra_tile(1),
        r#"<li class="product-base"><div class="skeleton"></div></li>"#.to_string(),
        myntra_tile(2),
    ]
    .concat();
    let batch = myntra().extract(&myntra_page(&body)).unwrap();
    let names: Vec<_> = batch.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["N1", "N2"]);
}

#[test]
fn only_empty_containers_is_no_results() {
    let body = r#"<li class="product-base"></li><li class="product-base"> </li>"#;
    let err = myntra().extract(&myntra_page(body)).unwrap_err();
    assert!(matches!(err, ExtractionError::NoResults { .. }));
}

#[test]
fn missing_presence_marker_is_no_results() {
    let page = amazon_page(r#"<div class="s-no-results">No results for "zzz".</div>"#);
    let err = amazon().extract(&page).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::NoResults { ref site, .. } if site == "amazon"
    ));
}

#[test]
fn positional_alignment_reanchors_prices_across_a_gap() {
    let body = [
        amazon_tile("A1", "Kettle One", Some("1,099")),
        amazon_tile("A2", "Kettle Two", None),
        amazon_tile("A3", "Kettle Three", Some("2,450")),
    ]
    .concat();
    let batch = amazon().extract(&amazon_page(&body)).unwrap();

    let pairs: Vec<_> = batch
        .iter()
        .map(|r| (r.name.as_str(), r.price.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("Kettle One", "1,099"),
            ("Kettle Two", sentinel::PRICE),
            ("Kettle Three", "2,450"),
        ]
    );
    assert!(batch.iter().all(|r| r.brand.is_none()));
    assert_eq!(batch.records()[2].link, "https://www.amazon.in/dp/A3");
    assert_eq!(
        batch.records()[2].image,
        "https://m.media-amazon.com/images/A3.jpg"
    );
}

#[test]
fn positional_links_drift_past_an_interleaved_sponsored_link() {
    let sponsored = r#"<div class="s-widget"><a class="a-link-normal s-no-outline" href="/sspa/click?ad=1">Sponsored</a></div>"#;
    let body = [
        amazon_tile("A1", "Lamp One", Some("499")),
        sponsored.to_string(),
        amazon_tile("A2", "Lamp Two", Some("599")),
        amazon_tile("A3", "Lamp Three", Some("699")),
    ]
    .concat();
    let batch = amazon().extract(&amazon_page(&body)).unwrap();
    let records = batch.records();

    // Prices stay with their products.
    assert_eq!(records[1].price, "599");
    assert_eq!(records[2].price, "699");

    // Links are paired by index, so everything after the ad shifts by one.
    assert_eq!(records[0].link, "https://www.amazon.in/dp/A1");
    assert_eq!(records[1].link, "https://www.amazon.in/sspa/click?ad=1");
    assert_eq!(records[2].link, "https://www.amazon.in/dp/A2");
}

#[test]
fn unsectioned_names_pair_prices_by_index() {
    let body = r#"
        <a class="a-link-normal s-line-clamp-2 s-link-style a-text-normal" href="/dp/X"><span>First</span></a>
        <a class="a-link-normal s-line-clamp-2 s-link-style a-text-normal" href="/dp/Y"><span>Second</span></a>
        <span class="a-price-whole">10</span>
        <span class="a-price-whole">20</span>"#;
    let batch = amazon().extract(&amazon_page(body)).unwrap();
    let prices: Vec<_> = batch.iter().map(|r| r.price.as_str()).collect();
    assert_eq!(prices, vec!["10", "20"]);
    assert_eq!(batch.records()[0].link, sentinel::LINK);
}

#[test]
fn amazon_page_without_any_price_is_no_results() {
    let body = [
        amazon_tile("A1", "Unpriced One", None),
        amazon_tile("A2", "Unpriced Two", None),
    ]
    .concat();
    let err = amazon().extract(&amazon_page(&body)).unwrap_err();
    assert!(matches!(
        err,
        ExtractionError::NoResults { ref selector, .. } if selector == "span.a-price-whole"
    ));
}

#[test]
fn positional_batches_are_capped() {
    let body: String = (1..=30)
        .map(|i| amazon_tile(&format!("B{i}"), &format!("Item {i}"), Some("100")))
        .collect();
    let batch = amazon().extract(&amazon_page(&body)).unwrap();
    assert_eq!(batch.len(), MAX_BATCH);
}
