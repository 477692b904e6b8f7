use scraper::{ElementRef, Html, Selector};

/// Parsed page markup with the small query surface extraction needs.
pub struct ParsedTree {
    html: Html,
}

impl ParsedTree {
    pub fn parse(markup: &str) -> Self {
        Self {
            html: Html::parse_document(markup),
        }
    }

    /// All matches in document order.
    pub fn find_all<'a>(&'a self, selector: &Selector) -> Vec<ElementRef<'a>> {
        self.html.select(selector).collect()
    }

    /// First match inside `scope` (descendants only), or in the whole page.
    pub fn find<'a>(
        &'a self,
        selector: &Selector,
        scope: Option<ElementRef<'a>>,
    ) -> Option<ElementRef<'a>> {
        match scope {
            Some(node) => node.select(selector).next(),
            None => self.html.select(selector).next(),
        }
    }

    pub fn contains(&self, selector: &Selector) -> bool {
        self.html.select(selector).next().is_some()
    }

    /// Attribute value, trimmed; empty values count as absent.
    pub fn attribute<'a>(node: ElementRef<'a>, name: &str) -> Option<&'a str> {
        node.value()
            .attr(name)
            .map(str::trim)
            .filter(|v| !v.is_empty())
    }

    /// Descendant text with whitespace runs collapsed to single spaces.
    pub fn text(node: ElementRef<'_>) -> String {
        node.text()
            .flat_map(str::split_whitespace)
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Ancestors of `node` matching `selector`, innermost first.
    pub fn enclosing<'a, 's>(
        node: ElementRef<'a>,
        selector: &'s Selector,
    ) -> impl Iterator<Item = ElementRef<'a>> + 's
    where
        'a: 's,
    {
        node.ancestors()
            .filter_map(ElementRef::wrap)
            .filter(move |ancestor| selector.matches(ancestor))
    }
}
