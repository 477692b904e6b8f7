//! Declarative, versioned extraction rules.
//!
//! A rule set is pure data: changing a site's markup knowledge means editing
//! its rule set, never the alignment code.
use crate::tree::ParsedTree;
use cartscout_common::{sentinel, ExtractionError};
use scraper::{ElementRef, Selector};
use std::collections::BTreeMap;
use std::fmt;
use url::Url;

/// Product attribute a locator resolves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Attribute {
    Name,
    Price,
    Link,
    Image,
    Brand,
}

impl Attribute {
    /// Placeholder used when the attribute cannot be resolved.
    pub fn sentinel(self) -> &'static str {
        match self {
            Attribute::Name => sentinel::NAME,
            Attribute::Price => sentinel::PRICE,
            Attribute::Link => sentinel::LINK,
            Attribute::Image => sentinel::IMAGE,
            Attribute::Brand => sentinel::BRAND,
        }
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Attribute::Name => "name",
            Attribute::Price => "price",
            Attribute::Link => "link",
            Attribute::Image => "image",
            Attribute::Brand => "brand",
        };
        f.write_str(name)
    }
}

/// Where a located node's value comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    Text,
    Attribute(String),
}

/// How a raw value becomes the stored one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolve {
    Verbatim,
    /// Join relative URLs onto the site's base URL.
    AgainstBase,
}

pub(crate) fn compile(css: &str) -> Result<Selector, ExtractionError> {
    Selector::parse(css).map_err(|e| ExtractionError::InvalidSelector {
        selector: css.to_string(),
        reason: e.to_string(),
    })
}

/// Selector plus the rule for reading a value out of what it matches.
#[derive(Debug, Clone)]
pub struct Locator {
    css: String,
    selector: Selector,
    inner: Option<Selector>,
    source: ValueSource,
    resolve: Resolve,
}

impl Locator {
    /// Read the matched node's text.
    pub fn text(css: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            css: css.to_string(),
            selector: compile(css)?,
            inner: None,
            source: ValueSource::Text,
            resolve: Resolve::Verbatim,
        })
    }

    /// Read an attribute of the matched node.
    pub fn attr(css: &str, name: &str) -> Result<Self, ExtractionError> {
        Ok(Self {
            source: ValueSource::Attribute(name.to_string()),
            ..Self::text(css)?
        })
    }

    /// Read from the first `inner_css` match below the located node instead.
    pub fn within(mut self, inner_css: &str) -> Result<Self, ExtractionError> {
        self.inner = Some(compile(inner_css)?);
        Ok(self)
    }

    pub fn against_base(mut self) -> Self {
        self.resolve = Resolve::AgainstBase;
        self
    }

    pub fn css(&self) -> &str {
        &self.css
    }

    pub fn selector(&self) -> &Selector {
        &self.selector
    }

    /// Value of an already-located node, or `None` if anything is missing.
    pub fn read(&self, node: ElementRef<'_>, base: &Url) -> Option<String> {
        let target = match &self.inner {
            Some(inner) => node.select(inner).next()?,
            None => node,
        };
        let raw = match &self.source {
            ValueSource::Text => Some(ParsedTree::text(target)).filter(|t| !t.is_empty()),
            ValueSource::Attribute(name) => ParsedTree::attribute(target, name).map(str::to_string),
        }?;
        match self.resolve {
            Resolve::Verbatim => Some(raw),
            Resolve::AgainstBase => base.join(&raw).ok().map(String::from),
        }
    }

    /// Locate inside `scope` and read.
    pub fn resolve_in(&self, scope: ElementRef<'_>, base: &Url) -> Option<String> {
        let node = scope.select(&self.selector).next()?;
        self.read(node, base)
    }
}

/// How independently gathered candidates are grouped into products.
#[derive(Debug, Clone)]
pub enum Strategy {
    /// Every attribute is read inside one product container.
    ContainerScoped { css: String, container: Selector },
    /// Name candidates form the spine; prices re-anchor through `anchor`
    /// sections, links and images pair by index.
    Positional { css: String, anchor: Selector },
}

impl Strategy {
    pub fn container(css: &str) -> Result<Self, ExtractionError> {
        Ok(Strategy::ContainerScoped {
            css: css.to_string(),
            container: compile(css)?,
        })
    }

    pub fn positional(anchor_css: &str) -> Result<Self, ExtractionError> {
        Ok(Strategy::Positional {
            css: anchor_css.to_string(),
            anchor: compile(anchor_css)?,
        })
    }
}

/// Versioned per-site extraction rules.
#[derive(Debug, Clone)]
pub struct RuleSet {
    site: &'static str,
    version: &'static str,
    base_url: Url,
    presence_css: String,
    presence: Selector,
    strategy: Strategy,
    locators: BTreeMap<Attribute, Locator>,
    required: Vec<Attribute>,
}

impl RuleSet {
    pub fn new(
        site: &'static str,
        version: &'static str,
        base_url: &str,
        presence_css: &str,
        strategy: Strategy,
    ) -> Result<Self, ExtractionError> {
        let base_url = Url::parse(base_url).map_err(|e| ExtractionError::InvalidBaseUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            site,
            version,
            base_url,
            presence_css: presence_css.to_string(),
            presence: compile(presence_css)?,
            strategy,
            locators: BTreeMap::new(),
            required: Vec::new(),
        })
    }

    pub fn rule(mut self, attribute: Attribute, locator: Locator) -> Self {
        self.locators.insert(attribute, locator);
        self
    }

    /// Treat a page with zero candidates for `attribute` as "no results".
    pub fn require(mut self, attribute: Attribute) -> Self {
        if !self.required.contains(&attribute) {
            self.required.push(attribute);
        }
        self
    }

    pub fn site(&self) -> &'static str {
        self.site
    }

    pub fn version(&self) -> &'static str {
        self.version
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn presence_css(&self) -> &str {
        &self.presence_css
    }

    pub fn presence(&self) -> &Selector {
        &self.presence
    }

    pub fn strategy(&self) -> &Strategy {
        &self.strategy
    }

    pub fn locator(&self, attribute: Attribute) -> Option<&Locator> {
        self.locators.get(&attribute)
    }

    pub fn required(&self) -> &[Attribute] {
        &self.required
    }

    pub fn has_brand(&self) -> bool {
        self.locators.contains_key(&Attribute::Brand)
    }
}
