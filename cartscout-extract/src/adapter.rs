use crate::align::{align_by_container, align_by_position};
use crate::rules::{RuleSet, Strategy};
use crate::sites::{self, amazon, myntra};
use crate::tree::ParsedTree;
use cartscout_common::{ExtractionBatch, ExtractionError, MAX_BATCH};
use std::fmt;
use std::str::FromStr;
use tracing::info;
use url::Url;

/// Supported marketplaces.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Site {
    Amazon,
    Myntra,
}

impl Site {
    pub const ALL: [Site; 2] = [Site::Amazon, Site::Myntra];

    /// Lowercase name, also the stem of the site's store document.
    pub fn name(self) -> &'static str {
        match self {
            Site::Amazon => "amazon",
            Site::Myntra => "myntra",
        }
    }
}

impl fmt::Display for Site {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Site {
    type Err = ExtractionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Site::ALL
            .into_iter()
            .find(|site| site.name().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| ExtractionError::UnknownSite(wanted.to_string()))
    }
}

/// A marketplace together with its compiled rules.
#[derive(Debug, Clone)]
pub enum SiteAdapter {
    Amazon(RuleSet),
    Myntra(RuleSet),
}

impl SiteAdapter {
    /// Compile the site's rule set.
    pub fn for_site(site: Site) -> Result<Self, ExtractionError> {
        Ok(match site {
            Site::Amazon => SiteAdapter::Amazon(amazon::rules()?),
            Site::Myntra => SiteAdapter::Myntra(myntra::rules()?),
        })
    }

    pub fn site(&self) -> Site {
        match self {
            SiteAdapter::Amazon(_) => Site::Amazon,
            SiteAdapter::Myntra(_) => Site::Myntra,
        }
    }

    pub fn rules(&self) -> &RuleSet {
        match self {
            SiteAdapter::Amazon(rules) | SiteAdapter::Myntra(rules) => rules,
        }
    }

    /// Selector whose appearance means results have rendered.
    pub fn presence_selector(&self) -> &str {
        self.rules().presence_css()
    }

    pub fn currency(&self) -> &'static str {
        sites::RUPEE
    }

    pub fn search_url(&self, query: &str) -> Url {
        match self {
            SiteAdapter::Amazon(rules) => amazon::search_url(rules.base_url(), query),
            SiteAdapter::Myntra(rules) => myntra::search_url(rules.base_url(), query),
        }
    }

    /// Build at most [`MAX_BATCH`] records from a rendered results page.
    ///
    /// Fails closed: any problem yields an error, never a partial batch.
    pub fn extract(&self, tree: &ParsedTree) -> Result<ExtractionBatch, ExtractionError> {
        let rules = self.rules();
        if !tree.contains(rules.presence()) {
            return Err(ExtractionError::NoResults {
                site: rules.site().to_string(),
                selector: rules.presence_css().to_string(),
            });
        }

        let records = match rules.strategy() {
            Strategy::ContainerScoped { css, container } => {
                align_by_container(tree, rules, css, container, MAX_BATCH)?
            }
            Strategy::Positional { anchor, .. } => {
                align_by_position(tree, rules, anchor, MAX_BATCH)?
            }
        };
        let batch = ExtractionBatch::new(records);

        info!(
            target: "extract",
            site = rules.site(),
            rules_version = rules.version(),
            products = batch.len(),
            "extracted batch"
        );
        Ok(batch)
    }
}
