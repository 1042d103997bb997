//! Page surface: locator factories and script injection.
//!
//! A [`Page`] pairs a shared [`Document`] with the wait options every
//! resolution inherits. The factory methods each bind one matching rule into
//! a resolver function and wrap it in a [`Locator`]; nothing runs until the
//! locator is resolved. Each factory also has an `_in` form taking an
//! explicit scope element in place of the whole document.

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::accessibility::{accessible_name, role_of};
use crate::dom::{Document, Element};
use crate::locator::{Locator, MatchOptions};
use crate::result::{HallarError, HallarResult};
use crate::selector::{CssSelector, ResolverFn, Selector};
use crate::text::TextPattern;
use crate::wait::WaitOptions;

/// Test-id attributes recognized by [`Page::get_by_test_id`], in lookup
/// order. The first attribute present on an element decides.
pub const TEST_ID_ATTRIBUTES: &[&str] = &["data-testid", "data-test-id"];

/// Entry point for building locators against a document.
#[derive(Debug, Clone)]
pub struct Page {
    document: Document,
    wait: WaitOptions,
}

impl Page {
    /// Create a page over a document with default wait options.
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self {
            document,
            wait: WaitOptions::default(),
        }
    }

    /// Replace the wait options used by this page's locators.
    #[must_use]
    pub fn with_wait_options(mut self, wait: WaitOptions) -> Self {
        self.wait = wait;
        self
    }

    /// The underlying document.
    #[must_use]
    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Wait options locators resolve with by default.
    #[must_use]
    pub const fn wait_options(&self) -> WaitOptions {
        self.wait
    }

    /// Locator for a literal CSS-subset selector, scoped to the document.
    ///
    /// # Errors
    ///
    /// Returns [`HallarError::InvalidSelector`] for malformed input.
    pub fn locator(&self, selector: &str) -> HallarResult<Locator> {
        let css = CssSelector::parse(selector)?;
        Ok(Locator::from_selector(
            self.clone(),
            Selector::Css(css),
            MatchOptions::default(),
            None,
        ))
    }

    fn resolver_locator(
        &self,
        resolver: ResolverFn,
        options: MatchOptions,
        scope: Option<&Element>,
    ) -> Locator {
        Locator::from_selector(
            self.clone(),
            Selector::Resolver(resolver),
            options,
            scope.cloned(),
        )
    }

    /// Locator for elements with the given accessibility role, optionally
    /// filtered by accessible name via `options`.
    #[must_use]
    pub fn get_by_role(&self, role: impl Into<String>, options: MatchOptions) -> Locator {
        self.get_by_role_scoped(role, options, None)
    }

    /// [`Page::get_by_role`] scoped to the given element.
    #[must_use]
    pub fn get_by_role_in(
        &self,
        role: impl Into<String>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.get_by_role_scoped(role, options, Some(scope))
    }

    fn get_by_role_scoped(
        &self,
        role: impl Into<String>,
        options: MatchOptions,
        scope: Option<&Element>,
    ) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_role), options.with_role(role), scope)
    }

    /// Locator for elements owning a text run that matches `text`.
    #[must_use]
    pub fn get_by_text(&self, text: impl Into<TextPattern>, options: MatchOptions) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_text), options.with_text(text), None)
    }

    /// [`Page::get_by_text`] scoped to the given element.
    #[must_use]
    pub fn get_by_text_in(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_text), options.with_text(text), Some(scope))
    }

    /// Locator for form controls associated with a matching `<label>` —
    /// through its `for` attribute or by wrapping the control.
    #[must_use]
    pub fn get_by_label(&self, text: impl Into<TextPattern>, options: MatchOptions) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_label), options.with_text(text), None)
    }

    /// [`Page::get_by_label`] scoped to the given element.
    #[must_use]
    pub fn get_by_label_in(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_label), options.with_text(text), Some(scope))
    }

    /// Locator for `<input>`/`<textarea>` elements by placeholder text.
    #[must_use]
    pub fn get_by_placeholder(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
    ) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_placeholder), options.with_text(text), None)
    }

    /// [`Page::get_by_placeholder`] scoped to the given element.
    #[must_use]
    pub fn get_by_placeholder_in(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(
            Arc::new(resolve_by_placeholder),
            options.with_text(text),
            Some(scope),
        )
    }

    /// Locator for `<img>`/`<area>` elements by alternative text.
    #[must_use]
    pub fn get_by_alt_text(&self, text: impl Into<TextPattern>, options: MatchOptions) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_alt_text), options.with_text(text), None)
    }

    /// [`Page::get_by_alt_text`] scoped to the given element.
    #[must_use]
    pub fn get_by_alt_text_in(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(
            Arc::new(resolve_by_alt_text),
            options.with_text(text),
            Some(scope),
        )
    }

    /// Locator for elements by their `title` attribute.
    #[must_use]
    pub fn get_by_title(&self, text: impl Into<TextPattern>, options: MatchOptions) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_title), options.with_text(text), None)
    }

    /// [`Page::get_by_title`] scoped to the given element.
    #[must_use]
    pub fn get_by_title_in(
        &self,
        text: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(Arc::new(resolve_by_title), options.with_text(text), Some(scope))
    }

    /// Locator for elements by test id (see [`TEST_ID_ATTRIBUTES`]).
    #[must_use]
    pub fn get_by_test_id(&self, test_id: impl Into<TextPattern>, options: MatchOptions) -> Locator {
        self.resolver_locator(
            Arc::new(resolve_by_test_id),
            options.with_test_id(test_id),
            None,
        )
    }

    /// [`Page::get_by_test_id`] scoped to the given element.
    #[must_use]
    pub fn get_by_test_id_in(
        &self,
        test_id: impl Into<TextPattern>,
        options: MatchOptions,
        scope: &Element,
    ) -> Locator {
        self.resolver_locator(
            Arc::new(resolve_by_test_id),
            options.with_test_id(test_id),
            Some(scope),
        )
    }

    /// Run or inject an initialization script.
    ///
    /// # Errors
    ///
    /// [`HallarError::InvalidScript`] for an empty path,
    /// [`HallarError::ScriptLoad`] when the document has no `<head>` to
    /// attach the script element to.
    pub fn add_init_script(&self, script: InitScript) -> HallarResult<()> {
        match script {
            InitScript::Callback(callback) => {
                callback(&self.document);
                Ok(())
            }
            InitScript::Path(path) => {
                if path.trim().is_empty() {
                    return Err(HallarError::InvalidScript {
                        message: "script path is empty".to_string(),
                    });
                }
                let Some(head) = self.document.head() else {
                    return Err(HallarError::ScriptLoad {
                        path,
                        message: "document has no <head>".to_string(),
                    });
                };
                debug!(path = %path, "injecting script element");
                let script_el = self.document.create_element("script");
                script_el.set_attribute("src", &path);
                script_el.set_attribute("async", "");
                head.append_child(&script_el);
                Ok(())
            }
        }
    }
}

/// An initialization script: an inline callback run against the document, or
/// an external script injected by path.
#[derive(Clone)]
pub enum InitScript {
    /// Callback invoked immediately with the document.
    Callback(Arc<dyn Fn(&Document) + Send + Sync>),
    /// Path injected as a `<script src=…>` element in `<head>`.
    Path(String),
}

impl fmt::Debug for InitScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Callback(_) => f.write_str("Callback(..)"),
            Self::Path(path) => f.debug_tuple("Path").field(path).finish(),
        }
    }
}

fn resolve_by_role(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(wanted) = options.role.as_deref() else {
        return Vec::new();
    };
    let mut matched: Vec<Element> = scope
        .descendants()
        .into_iter()
        .filter(|el| role_of(el).as_deref() == Some(wanted))
        .collect();
    if let Some(name) = &options.name {
        matched.retain(|el| name.matches(Some(&accessible_name(el)), options.exact));
    }
    matched
}

fn resolve_by_text(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.text else {
        return Vec::new();
    };
    let mut matched = Vec::new();
    for (owner, content) in scope.document().text_runs_under(scope) {
        if pattern.matches(Some(&content), options.exact) && !matched.contains(&owner) {
            matched.push(owner);
        }
    }
    matched
}

fn resolve_by_label(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.text else {
        return Vec::new();
    };
    let document = scope.document().clone();
    scope
        .descendants()
        .into_iter()
        .filter(|el| el.tag() == "label")
        .filter(|label| pattern.matches(Some(&label.text_content()), options.exact))
        .filter_map(|label| match label.attr("for") {
            Some(target) => document.get_element_by_id(&target),
            None => label
                .descendants()
                .into_iter()
                .find(|el| matches!(el.tag().as_str(), "input" | "select" | "textarea" | "button")),
        })
        .collect()
}

fn resolve_by_placeholder(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.text else {
        return Vec::new();
    };
    scope
        .descendants()
        .into_iter()
        .filter(|el| matches!(el.tag().as_str(), "input" | "textarea"))
        .filter(|el| pattern.matches(el.attr("placeholder").as_deref(), options.exact))
        .collect()
}

fn resolve_by_alt_text(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.text else {
        return Vec::new();
    };
    scope
        .descendants()
        .into_iter()
        .filter(|el| matches!(el.tag().as_str(), "img" | "area"))
        .filter(|el| pattern.matches(el.attr("alt").as_deref(), options.exact))
        .collect()
}

fn resolve_by_title(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.text else {
        return Vec::new();
    };
    scope
        .descendants()
        .into_iter()
        .filter(|el| pattern.matches(el.attr("title").as_deref(), options.exact))
        .collect()
}

fn resolve_by_test_id(options: &MatchOptions, scope: &Element) -> Vec<Element> {
    let Some(pattern) = &options.test_id else {
        return Vec::new();
    };
    scope
        .descendants()
        .into_iter()
        .filter(|el| {
            // The first recognized attribute present decides, even when both
            // are set.
            TEST_ID_ATTRIBUTES
                .iter()
                .find(|attr| el.has_attr(attr))
                .is_some_and(|attr| pattern.matches(el.attr(attr).as_deref(), options.exact))
        })
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
mod tests {
    use super::*;
    use regex::Regex;

    fn quick_page() -> (Document, Page) {
        let doc = Document::new();
        let page = Page::new(doc.clone())
            .with_wait_options(WaitOptions::new().with_timeout(200).with_poll_interval(10));
        (doc, page)
    }

    mod role_factory_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_role_with_aria_label_name() {
            let (doc, page) = quick_page();
            let button = doc.create_element("button");
            button.set_attribute("aria-label", "Submit");
            button.set_text("Go");
            doc.body().unwrap().append_child(&button);

            let found = page
                .get_by_role("button", MatchOptions::new().with_name("Submit"))
                .all()
                .await;
            assert_eq!(found, vec![button]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_role_name_exact_and_substring() {
            let (doc, page) = quick_page();
            let button = doc.create_element("button");
            button.set_text("Submit order");
            doc.body().unwrap().append_child(&button);

            let substring = page
                .get_by_role("button", MatchOptions::new().with_name("Submit"))
                .all()
                .await;
            assert_eq!(substring.len(), 1);
            let exact = page
                .get_by_role(
                    "button",
                    MatchOptions::new().with_name("Submit").with_exact(true),
                )
                .all()
                .await;
            assert!(exact.is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_role_name_array_is_or() {
            let (doc, page) = quick_page();
            for label in ["Save", "Cancel"] {
                let button = doc.create_element("button");
                button.set_text(label);
                doc.body().unwrap().append_child(&button);
            }
            let found = page
                .get_by_role(
                    "button",
                    MatchOptions::new()
                        .with_name(vec!["Save", "Submit"])
                        .with_exact(true),
                )
                .all()
                .await;
            assert_eq!(found.len(), 1);
            assert_eq!(found[0].text_content(), "Save");
        }

        #[tokio::test(start_paused = true)]
        async fn test_role_skips_aria_disabled() {
            let (doc, page) = quick_page();
            let live = doc.create_element("button");
            live.set_text("Go");
            let disabled = doc.create_element("button");
            disabled.set_text("Go");
            disabled.set_attribute("aria-disabled", "true");
            doc.body().unwrap().append_child(&live);
            doc.body().unwrap().append_child(&disabled);

            let found = page.get_by_role("button", MatchOptions::new()).all().await;
            assert_eq!(found, vec![live]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_role_explicit_attribute_wins() {
            let (doc, page) = quick_page();
            let div = doc.create_element("div");
            div.set_attribute("role", "button");
            doc.body().unwrap().append_child(&div);

            let found = page.get_by_role("button", MatchOptions::new()).all().await;
            assert_eq!(found, vec![div]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_role_scoped_variant() {
            let (doc, page) = quick_page();
            let inside = doc.create_element("section");
            let button = doc.create_element("button");
            inside.append_child(&button);
            let outside = doc.create_element("button");
            doc.body().unwrap().append_child(&inside);
            doc.body().unwrap().append_child(&outside);

            let found = page
                .get_by_role_in("button", MatchOptions::new(), &inside)
                .all()
                .await;
            assert_eq!(found, vec![button]);
        }
    }

    mod text_factory_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_text_finds_owning_element() {
            let (doc, page) = quick_page();
            let p = doc.create_element("p");
            p.set_text("Welcome back");
            doc.body().unwrap().append_child(&p);

            let found = page.get_by_text("Welcome", MatchOptions::new()).all().await;
            assert_eq!(found, vec![p]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_text_matches_per_run_not_concatenation() {
            let (doc, page) = quick_page();
            let p = doc.create_element("p");
            p.append_text("Hello ");
            let b = doc.create_element("b");
            b.set_text("world");
            p.append_child(&b);
            doc.body().unwrap().append_child(&p);

            // "Hello world" spans two runs; neither run contains it whole.
            let across = page
                .get_by_text("Hello world", MatchOptions::new())
                .all()
                .await;
            assert!(across.is_empty());
            let single = page.get_by_text("world", MatchOptions::new()).all().await;
            assert_eq!(single, vec![b]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_text_regex() {
            let (doc, page) = quick_page();
            let span = doc.create_element("span");
            span.set_text("Order #4321 confirmed");
            doc.body().unwrap().append_child(&span);

            let found = page
                .get_by_text(Regex::new(r"#\d+").unwrap(), MatchOptions::new())
                .all()
                .await;
            assert_eq!(found, vec![span]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_text_ignores_script_content() {
            let (doc, page) = quick_page();
            let script = doc.create_element("script");
            script.set_text("var greeting = 'Welcome';");
            doc.body().unwrap().append_child(&script);

            let found = page.get_by_text("Welcome", MatchOptions::new()).all().await;
            assert!(found.is_empty());
        }
    }

    mod label_factory_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_label_for_attribute() {
            let (doc, page) = quick_page();
            let label = doc.create_element("label");
            label.set_text("Password");
            label.set_attribute("for", "pw");
            let input = doc.create_element("input");
            input.set_attribute("id", "pw");
            doc.body().unwrap().append_child(&label);
            doc.body().unwrap().append_child(&input);

            let found = page.get_by_label("Password", MatchOptions::new()).all().await;
            assert_eq!(found, vec![input]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_label_wrapping_control() {
            let (doc, page) = quick_page();
            let label = doc.create_element("label");
            label.append_text("Email");
            let input = doc.create_element("input");
            label.append_child(&input);
            doc.body().unwrap().append_child(&label);

            let found = page.get_by_label("Email", MatchOptions::new()).all().await;
            assert_eq!(found, vec![input]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_label_without_control_is_dropped() {
            let (doc, page) = quick_page();
            let label = doc.create_element("label");
            label.set_text("Orphan");
            doc.body().unwrap().append_child(&label);

            let found = page.get_by_label("Orphan", MatchOptions::new()).all().await;
            assert!(found.is_empty());
        }
    }

    mod attribute_factory_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_placeholder() {
            let (doc, page) = quick_page();
            let input = doc.create_element("input");
            input.set_attribute("placeholder", "Search products");
            let div = doc.create_element("div");
            div.set_attribute("placeholder", "not a control");
            doc.body().unwrap().append_child(&input);
            doc.body().unwrap().append_child(&div);

            let found = page
                .get_by_placeholder("Search", MatchOptions::new())
                .all()
                .await;
            assert_eq!(found, vec![input]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_alt_text() {
            let (doc, page) = quick_page();
            let img = doc.create_element("img");
            img.set_attribute("alt", "Company logo");
            doc.body().unwrap().append_child(&img);

            let found = page.get_by_alt_text("logo", MatchOptions::new()).all().await;
            assert_eq!(found, vec![img]);
            let exact = page
                .get_by_alt_text("logo", MatchOptions::new().with_exact(true))
                .all()
                .await;
            assert!(exact.is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn test_title() {
            let (doc, page) = quick_page();
            let abbr = doc.create_element("abbr");
            abbr.set_attribute("title", "World Health Organization");
            doc.body().unwrap().append_child(&abbr);

            let found = page.get_by_title("Health", MatchOptions::new()).all().await;
            assert_eq!(found, vec![abbr]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_test_id_both_attributes() {
            let (doc, page) = quick_page();
            let modern = doc.create_element("div");
            modern.set_attribute("data-testid", "cart");
            let legacy = doc.create_element("div");
            legacy.set_attribute("data-test-id", "cart");
            doc.body().unwrap().append_child(&modern);
            doc.body().unwrap().append_child(&legacy);

            let found = page
                .get_by_test_id("cart", MatchOptions::new().with_exact(true))
                .all()
                .await;
            assert_eq!(found, vec![modern, legacy]);
        }

        #[tokio::test(start_paused = true)]
        async fn test_first_test_id_attribute_decides() {
            let (doc, page) = quick_page();
            let el = doc.create_element("div");
            el.set_attribute("data-testid", "alpha");
            el.set_attribute("data-test-id", "beta");
            doc.body().unwrap().append_child(&el);

            let by_modern = page
                .get_by_test_id("alpha", MatchOptions::new().with_exact(true))
                .all()
                .await;
            assert_eq!(by_modern.len(), 1);
            let by_legacy = page
                .get_by_test_id("beta", MatchOptions::new().with_exact(true))
                .all()
                .await;
            assert!(by_legacy.is_empty());
        }
    }

    mod init_script_tests {
        use super::*;

        #[test]
        fn test_callback_runs_immediately() {
            let (doc, page) = quick_page();
            page.add_init_script(InitScript::Callback(Arc::new(|document| {
                let marker = document.create_element("meta");
                marker.set_attribute("name", "injected");
                if let Some(head) = document.head() {
                    head.append_child(&marker);
                }
            })))
            .unwrap();
            let head = doc.head().unwrap();
            assert_eq!(head.children().len(), 1);
        }

        #[test]
        fn test_path_appends_script_element() {
            let (doc, page) = quick_page();
            page.add_init_script(InitScript::Path("/js/app.js".to_string()))
                .unwrap();
            let script = doc.head().unwrap().children()[0].clone();
            assert_eq!(script.tag(), "script");
            assert_eq!(script.attr("src").as_deref(), Some("/js/app.js"));
        }

        #[test]
        fn test_empty_path_is_invalid() {
            let (_, page) = quick_page();
            let err = page
                .add_init_script(InitScript::Path("  ".to_string()))
                .unwrap_err();
            assert!(matches!(err, HallarError::InvalidScript { .. }));
        }

        #[test]
        fn test_missing_head_is_load_failure() {
            let (doc, page) = quick_page();
            doc.head().unwrap().remove();
            let err = page
                .add_init_script(InitScript::Path("/js/app.js".to_string()))
                .unwrap_err();
            assert!(matches!(err, HallarError::ScriptLoad { .. }));
        }
    }

    mod end_to_end_tests {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn test_label_pair_resolution() {
            let (doc, page) = quick_page();
            let body = doc.body().unwrap();
            // <label>Email<input></label>
            let email_label = doc.create_element("label");
            email_label.append_text("Email");
            let email_input = doc.create_element("input");
            email_label.append_child(&email_input);
            body.append_child(&email_label);
            // <label for="pw">Password</label><input id="pw">
            let pw_label = doc.create_element("label");
            pw_label.set_text("Password");
            pw_label.set_attribute("for", "pw");
            let pw_input = doc.create_element("input");
            pw_input.set_attribute("id", "pw");
            body.append_child(&pw_label);
            body.append_child(&pw_input);

            let found = page.get_by_label("Password", MatchOptions::new()).all().await;
            assert_eq!(found, vec![pw_input]);
            let found = page.get_by_label("Email", MatchOptions::new()).all().await;
            assert_eq!(found, vec![email_input]);
        }
    }
}
