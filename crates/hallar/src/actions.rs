//! Actions on located elements.
//!
//! Each action resolves the locator's first element and dispatches the
//! corresponding synthetic event(s) into the document event log. Acting on a
//! locator that resolved to nothing is a no-op — absence is an expected
//! outcome, not an error.

use std::time::Duration;

use tracing::debug;

use crate::dom::{DomEvent, Element, Modifier, MouseButton};
use crate::locator::Locator;

/// Delay between keystrokes simulated by [`Locator::press_sequentially`].
const KEYSTROKE_DELAY_MS: u64 = 33;

/// Options for [`Locator::click_with`].
#[derive(Debug, Clone)]
pub struct ClickOptions {
    /// Button to click with.
    pub button: MouseButton,
    /// Modifier keys held during the click.
    pub modifiers: Vec<Modifier>,
}

impl Default for ClickOptions {
    fn default() -> Self {
        Self {
            button: MouseButton::Left,
            modifiers: Vec::new(),
        }
    }
}

impl ClickOptions {
    /// Create default options (left button, no modifiers).
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Click with the given button.
    #[must_use]
    pub fn with_button(mut self, button: MouseButton) -> Self {
        self.button = button;
        self
    }

    /// Hold a modifier during the click.
    #[must_use]
    pub fn with_modifier(mut self, modifier: Modifier) -> Self {
        self.modifiers.push(modifier);
        self
    }
}

fn is_checkbox(element: &Element) -> bool {
    element.tag() == "input"
        && element
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
}

/// Dispatch a click and apply native activation behavior (checkbox toggle).
fn synthetic_click(element: &Element, button: MouseButton, modifiers: Vec<Modifier>) {
    element
        .document()
        .dispatch(element, DomEvent::Click { button, modifiers });
    if is_checkbox(element) {
        if element.has_attr("checked") {
            element.remove_attribute("checked");
        } else {
            element.set_attribute("checked", "");
        }
    }
}

impl Locator {
    /// Click the first matching element with the left button.
    pub async fn click(&self) {
        self.click_with(ClickOptions::default()).await;
    }

    /// Click with an explicit button and modifiers.
    pub async fn click_with(&self, options: ClickOptions) {
        if let Some(el) = self.resolve_first().await {
            synthetic_click(&el, options.button, options.modifiers);
        } else {
            debug!("click: nothing matched, no-op");
        }
    }

    /// Double-click the first matching element.
    pub async fn dblclick(&self) {
        if let Some(el) = self.resolve_first().await {
            el.document().dispatch(&el, DomEvent::DblClick);
        }
    }

    /// Hover the first matching element.
    pub async fn hover(&self) {
        if let Some(el) = self.resolve_first().await {
            el.document().dispatch(&el, DomEvent::MouseOver);
        }
    }

    /// Focus the first matching element.
    pub async fn focus(&self) {
        if let Some(el) = self.resolve_first().await {
            el.document().set_focus(&el);
        }
    }

    /// Press and release a key on the first matching element.
    pub async fn press(&self, key: &str) {
        if let Some(el) = self.resolve_first().await {
            let doc = el.document().clone();
            doc.set_focus(&el);
            doc.dispatch(&el, DomEvent::KeyDown { key: key.to_string() });
            doc.dispatch(&el, DomEvent::KeyUp { key: key.to_string() });
        }
    }

    /// Set the element's value in one step, firing `input` then `change`.
    pub async fn fill(&self, value: &str) {
        if let Some(el) = self.resolve_first().await {
            let doc = el.document().clone();
            doc.set_focus(&el);
            el.set_attribute("value", value);
            doc.dispatch(&el, DomEvent::Input);
            doc.dispatch(&el, DomEvent::Change);
        }
    }

    /// Type the value one keystroke at a time, with a small delay between
    /// keys, firing the full keydown/keypress/input/keyup sequence per
    /// character and a final `change`.
    pub async fn press_sequentially(&self, value: &str) {
        let Some(el) = self.resolve_first().await else {
            return;
        };
        let doc = el.document().clone();
        doc.set_focus(&el);
        el.set_attribute("value", "");
        doc.dispatch(&el, DomEvent::Input);
        let mut typed = String::new();
        for c in value.chars() {
            let key = c.to_string();
            doc.dispatch(&el, DomEvent::KeyDown { key: key.clone() });
            doc.dispatch(&el, DomEvent::KeyPress { key: key.clone() });
            typed.push(c);
            el.set_attribute("value", &typed);
            doc.dispatch(&el, DomEvent::Input);
            doc.dispatch(&el, DomEvent::KeyUp { key });
            tokio::time::sleep(Duration::from_millis(KEYSTROKE_DELAY_MS)).await;
        }
        doc.dispatch(&el, DomEvent::Change);
    }

    /// Check a checkbox; a no-op when already checked or not a checkbox.
    pub async fn check(&self) {
        if let Some(el) = self.resolve_first().await {
            if is_checkbox(&el) && !el.has_attr("checked") {
                synthetic_click(&el, MouseButton::Left, Vec::new());
            }
        }
    }

    /// Uncheck a checkbox; a no-op when already unchecked or not a checkbox.
    pub async fn uncheck(&self) {
        if let Some(el) = self.resolve_first().await {
            if is_checkbox(&el) && el.has_attr("checked") {
                synthetic_click(&el, MouseButton::Left, Vec::new());
            }
        }
    }

    /// Select the `<option>` whose value attribute or text equals `value`,
    /// then fire `change`. A no-op on non-`<select>` elements or when no
    /// option matches.
    pub async fn select_option(&self, value: &str) {
        let Some(el) = self.resolve_first().await else {
            return;
        };
        if el.tag() != "select" {
            return;
        }
        let option = el.descendants().into_iter().find(|opt| {
            opt.tag() == "option"
                && (opt.attr("value").as_deref() == Some(value) || opt.text_content() == value)
        });
        if let Some(option) = option {
            let selected = option
                .attr("value")
                .unwrap_or_else(|| option.text_content());
            el.set_attribute("value", &selected);
            el.document().dispatch(&el, DomEvent::Change);
        }
    }

    /// Scroll the first matching element into view.
    pub async fn scroll_into_view_if_needed(&self) {
        if let Some(el) = self.resolve_first().await {
            el.document().dispatch(&el, DomEvent::ScrollIntoView);
        }
    }

    /// Whether the first matching element is visible.
    ///
    /// Approximation of the offset-parent check: the element must be
    /// attached, not carry the `hidden` attribute, and not be styled
    /// `display: none`.
    pub async fn is_visible(&self) -> bool {
        let Some(el) = self.resolve_first().await else {
            return false;
        };
        if !el.is_attached() || el.has_attr("hidden") {
            return false;
        }
        !el.attr("style")
            .unwrap_or_default()
            .replace(' ', "")
            .contains("display:none")
    }

    /// Apply `f` to the first matching element, or `None` when nothing
    /// matched.
    pub async fn evaluate<R>(&self, f: impl FnOnce(&Element) -> R) -> Option<R> {
        self.resolve_first().await.map(|el| f(&el))
    }
}
