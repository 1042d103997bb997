//! Locator Demo - Playwright-style Element Location
//!
//! Demonstrates the Hallar locator API: factories, chaining, auto-waiting
//! and the action layer, against an in-memory live document.
//!
//! # Running
//!
//! ```bash
//! cargo run --example locator_demo -p hallar
//! ```

#![allow(clippy::unwrap_used)]

use std::time::Duration;

use hallar::{Document, Element, MatchOptions, Page, WaitOptions};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    println!("=== Hallar Locator Demo ===\n");

    let doc = build_login_page();
    let page = Page::new(doc.clone());

    demo_factories(&page).await;
    demo_chaining(&page).await;
    demo_actions(&doc, &page).await;
    demo_auto_waiting(&doc).await;

    println!("\n=== Locator Demo Complete ===");
}

fn build_login_page() -> Document {
    let doc = Document::new();
    let body = doc.body().unwrap();

    let form = doc.create_element("form");
    form.set_attribute("data-testid", "login-form");

    let email_label = doc.create_element("label");
    email_label.append_text("Email");
    let email = doc.create_element("input");
    email.set_attribute("type", "email");
    email.set_attribute("placeholder", "you@example.com");
    email_label.append_child(&email);
    form.append_child(&email_label);

    let pw_label = doc.create_element("label");
    pw_label.set_text("Password");
    pw_label.set_attribute("for", "pw");
    let pw = doc.create_element("input");
    pw.set_attribute("type", "text");
    pw.set_attribute("id", "pw");
    form.append_child(&pw_label);
    form.append_child(&pw);

    let submit = doc.create_element("button");
    submit.set_attribute("aria-label", "Submit");
    submit.set_text("Go");
    form.append_child(&submit);

    body.append_child(&form);
    doc
}

async fn demo_factories(page: &Page) {
    println!("--- Demo 1: Factories ---\n");

    let submit = page
        .get_by_role("button", MatchOptions::new().with_name("Submit"))
        .all()
        .await;
    println!("by role button[name=Submit]: {} match(es)", submit.len());

    let pw = page.get_by_label("Password", MatchOptions::new()).all().await;
    println!("by label Password: {:?}", pw.first().map(Element::tag));

    let email = page
        .get_by_placeholder("you@", MatchOptions::new())
        .all()
        .await;
    println!("by placeholder you@: {} match(es)", email.len());

    let form = page.get_by_test_id("login-form", MatchOptions::new()).all().await;
    println!("by test id login-form: {} match(es)\n", form.len());
}

async fn demo_chaining(page: &Page) {
    println!("--- Demo 2: Chaining and indexing ---\n");

    let form = page.get_by_test_id("login-form", MatchOptions::new());
    let inputs = form.locator("input").unwrap();
    println!("inputs inside the form: {}", inputs.count().await);

    let first = inputs.first().await;
    println!("first input exists: {}", first.is_some());
    let tenth = inputs.nth(9).await;
    println!("tenth input exists: {}\n", tenth.is_some());
}

async fn demo_actions(doc: &Document, page: &Page) {
    println!("--- Demo 3: Actions and the event log ---\n");

    page.get_by_label("Password", MatchOptions::new())
        .fill("hunter2")
        .await;
    page.get_by_role("button", MatchOptions::new().with_name("Submit"))
        .click()
        .await;

    for record in doc.events() {
        println!("  {} on <{}>", record.event.name(), record.target.tag());
    }
    doc.clear_events();
    println!();
}

async fn demo_auto_waiting(doc: &Document) {
    println!("--- Demo 4: Auto-waiting ---\n");

    let page = Page::new(doc.clone())
        .with_wait_options(WaitOptions::new().with_timeout(2_000).with_poll_interval(50));

    let writer = doc.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(300)).await;
        let toast = writer.create_element("div");
        toast.set_attribute("data-testid", "toast");
        toast.set_text("Saved!");
        if let Some(body) = writer.body() {
            body.append_child(&toast);
        }
    });

    let toast = page.get_by_test_id("toast", MatchOptions::new()).all().await;
    println!("toast appeared late: {} match(es)", toast.len());

    let missing = page.get_by_test_id("never", MatchOptions::new()).all().await;
    println!("never-appearing element: {} match(es) after timeout", missing.len());
}
