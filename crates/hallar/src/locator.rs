//! Lazy, composable element locators.
//!
//! A [`Locator`] describes a future query — nothing touches the document
//! until a resolving call (`all`, `first`, an action) runs. Every chaining or
//! indexing operation builds a new locator; existing ones are never mutated.
//! Resolution walks the parent chain from the root: each level's matches
//! become the scopes the next level queries within, with the polling wait
//! applied per scope.

use std::sync::Arc;

use tracing::debug;

use crate::dom::Element;
use crate::page::Page;
use crate::result::HallarResult;
use crate::selector::{CssSelector, Selector};
use crate::text::TextPattern;
use crate::wait::{poll_until_found, WaitOptions};

/// Matching options carried by a locator.
///
/// Which fields apply depends on the factory that built the locator; `exact`
/// only changes comparison semantics, never which candidates are enumerated.
#[derive(Debug, Clone, Default)]
pub struct MatchOptions {
    /// Requested accessibility role (role queries).
    pub role: Option<String>,
    /// Accessible-name filter (role queries).
    pub name: Option<TextPattern>,
    /// Text pattern (text, label, placeholder, alt and title queries).
    pub text: Option<TextPattern>,
    /// Test-id pattern (test-id queries).
    pub test_id: Option<TextPattern>,
    /// Exact comparison instead of substring containment.
    pub exact: bool,
}

impl MatchOptions {
    /// Create empty options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Filter role matches by accessible name.
    #[must_use]
    pub fn with_name(mut self, name: impl Into<TextPattern>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Require exact comparison instead of substring containment.
    #[must_use]
    pub fn with_exact(mut self, exact: bool) -> Self {
        self.exact = exact;
        self
    }

    pub(crate) fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub(crate) fn with_text(mut self, text: impl Into<TextPattern>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub(crate) fn with_test_id(mut self, test_id: impl Into<TextPattern>) -> Self {
        self.test_id = Some(test_id.into());
        self
    }
}

/// A lazy query descriptor over a page's document.
///
/// Cheap to build and clone; holds no resources and needs no teardown.
#[derive(Debug, Clone)]
pub struct Locator {
    page: Page,
    selector: Option<Selector>,
    options: MatchOptions,
    parent: Option<Arc<Locator>>,
    scope: Option<Element>,
    resolved: Option<Element>,
}

impl Locator {
    pub(crate) fn from_selector(
        page: Page,
        selector: Selector,
        options: MatchOptions,
        scope: Option<Element>,
    ) -> Self {
        Self {
            page,
            selector: Some(selector),
            options,
            parent: None,
            scope,
            resolved: None,
        }
    }

    pub(crate) fn from_resolved(page: Page, element: Element) -> Self {
        Self {
            page,
            selector: None,
            options: MatchOptions::default(),
            parent: None,
            scope: None,
            resolved: Some(element),
        }
    }

    /// The page this locator queries.
    #[must_use]
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Build a child locator whose query runs within each element this
    /// locator resolves to — never against the whole document.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HallarError::InvalidSelector`] for malformed input.
    pub fn locator(&self, selector: &str) -> HallarResult<Locator> {
        let css = CssSelector::parse(selector)?;
        Ok(Self {
            page: self.page.clone(),
            selector: Some(Selector::Css(css)),
            options: MatchOptions::default(),
            parent: Some(Arc::new(self.clone())),
            scope: None,
            resolved: None,
        })
    }

    /// Resolve to all matching elements using the page's wait options.
    pub async fn all(&self) -> Vec<Element> {
        self.resolve_with(&self.page.wait_options()).await
    }

    /// Resolve with explicit wait options for this call only.
    pub async fn all_with(&self, wait: &WaitOptions) -> Vec<Element> {
        self.resolve_with(wait).await
    }

    /// Number of matching elements (waits like [`Locator::all`]).
    pub async fn count(&self) -> usize {
        self.all().await.len()
    }

    /// Locator pinned to the first match, or `None` when nothing matched
    /// within the timeout.
    pub async fn first(&self) -> Option<Locator> {
        let elements = self.all().await;
        elements
            .into_iter()
            .next()
            .map(|el| Self::from_resolved(self.page.clone(), el))
    }

    /// Locator pinned to the last match, or `None` when nothing matched.
    pub async fn last(&self) -> Option<Locator> {
        let elements = self.all().await;
        elements
            .into_iter()
            .last()
            .map(|el| Self::from_resolved(self.page.clone(), el))
    }

    /// Locator pinned to the zero-indexed `index`-th match. Out-of-range
    /// indices yield `None`, never an error.
    pub async fn nth(&self, index: usize) -> Option<Locator> {
        let mut elements = self.all().await;
        if index >= elements.len() {
            return None;
        }
        let el = elements.swap_remove(index);
        Some(Self::from_resolved(self.page.clone(), el))
    }

    /// First matching element, used by the action layer. A pinned locator
    /// returns its element without touching the document again.
    pub(crate) async fn resolve_first(&self) -> Option<Element> {
        if let Some(el) = &self.resolved {
            return Some(el.clone());
        }
        self.all().await.into_iter().next()
    }

    async fn resolve_with(&self, wait: &WaitOptions) -> Vec<Element> {
        // Parent chain, root first.
        let mut chain: Vec<&Locator> = Vec::new();
        let mut current = Some(self);
        while let Some(node) = current {
            chain.push(node);
            current = node.parent.as_deref();
        }
        chain.reverse();

        let mut scopes: Option<Vec<Element>> = None;
        for node in chain {
            if let Some(resolved) = &node.resolved {
                // A pinned node never re-queries.
                scopes = Some(vec![resolved.clone()]);
                continue;
            }
            let Some(selector) = &node.selector else {
                debug!("locator node without selector or pinned element");
                return Vec::new();
            };
            let bases = match scopes.take() {
                Some(bases) => bases,
                None => {
                    let root = node
                        .scope
                        .clone()
                        .unwrap_or_else(|| self.page.document().root());
                    vec![root]
                }
            };
            // Scope results are concatenated in scope order, duplicates and
            // all; each scope gets its own polling wait.
            let mut next = Vec::new();
            for base in &bases {
                let found =
                    poll_until_found(|| async move { node.query_scope(selector, base) }, wait)
                        .await;
                next.extend(found);
            }
            scopes = Some(next);
        }
        scopes.unwrap_or_default()
    }

    fn query_scope(&self, selector: &Selector, scope: &Element) -> Vec<Element> {
        match selector {
            Selector::Css(css) => css.query(scope),
            Selector::Resolver(resolve) => resolve(&self.options, scope),
        }
    }
}
