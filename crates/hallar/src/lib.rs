//! Hallar: declarative, retry-tolerant element location
//!
//! Hallar (Spanish: "to find") resolves Playwright-style locator
//! descriptors — by role, text, label, placeholder, alt text, title or test
//! id — against a live, concurrently-mutated document, with an auto-waiting
//! poll that tolerates elements appearing late.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     HALLAR Architecture                      │
//! ├──────────────────────────────────────────────────────────────┤
//! │  ┌──────────┐   ┌────────────┐   ┌──────────┐   ┌─────────┐  │
//! │  │ Factory  │   │  Locator   │   │ Polling  │   │  Live    │ │
//! │  │ (byRole, │──►│  (lazy     │──►│ wait     │──►│ document │ │
//! │  │  byText) │   │   chain)   │   │ (tokio)  │   │ (shared) │ │
//! │  └──────────┘   └────────────┘   └──────────┘   └─────────┘  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```
//! use hallar::{Document, MatchOptions, Page};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let doc = Document::new();
//! let button = doc.create_element("button");
//! button.set_attribute("aria-label", "Submit");
//! button.set_text("Go");
//! doc.body().unwrap().append_child(&button);
//!
//! let page = Page::new(doc.clone());
//! let found = page
//!     .get_by_role("button", MatchOptions::new().with_name("Submit"))
//!     .all()
//!     .await;
//! assert_eq!(found.len(), 1);
//! # }
//! ```
//!
//! Resolution never raises for "not found": a locator that matches nothing
//! waits out its timeout and yields an empty sequence (or `None` for single
//! elements); actions on it are no-ops. Only programmer-error inputs — a
//! malformed selector, a bad init-script — surface as [`HallarError`].

#![warn(missing_docs)]
// Lints are configured in workspace Cargo.toml [workspace.lints.clippy]

mod accessibility;
mod actions;
mod dom;
mod locator;
mod page;
mod result;
mod selector;
mod text;
mod wait;

pub use accessibility::{accessible_name, role_of};
pub use actions::ClickOptions;
pub use dom::{Document, DomEvent, Element, EventRecord, Modifier, MouseButton};
pub use locator::{Locator, MatchOptions};
pub use page::{InitScript, Page, TEST_ID_ATTRIBUTES};
pub use result::{HallarError, HallarResult};
pub use selector::{CssSelector, ResolverFn, Selector};
pub use text::{normalize, TextPattern};
pub use wait::{
    poll_until_found, WaitOptions, DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_TIMEOUT_MS,
};
