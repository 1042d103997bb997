//! Role Inference Demo
//!
//! Shows how Hallar computes effective accessibility roles: explicit `role`
//! attributes, the ordered implicit table, context-dependent table cells and
//! the accessible-name fallback.
//!
//! # Running
//!
//! ```bash
//! cargo run --example role_demo -p hallar
//! ```

#![allow(clippy::unwrap_used)]

use hallar::{accessible_name, role_of, Document, Element};

fn main() {
    println!("=== Hallar Role Demo ===\n");

    let doc = Document::new();
    let body = doc.body().unwrap();

    println!("--- Implicit roles ---\n");
    for tag in ["button", "nav", "ul", "h2", "textarea"] {
        let el = doc.create_element(tag);
        body.append_child(&el);
        report(&el);
    }

    let link = doc.create_element("a");
    link.set_attribute("href", "/docs");
    body.append_child(&link);
    report(&link);

    let checkbox = doc.create_element("input");
    checkbox.set_attribute("type", "checkbox");
    body.append_child(&checkbox);
    report(&checkbox);

    println!("\n--- Explicit role wins ---\n");
    let div = doc.create_element("div");
    div.set_attribute("role", "tab");
    body.append_child(&div);
    report(&div);

    println!("\n--- Table cells depend on the table ---\n");
    for table_role in [None, Some("grid"), Some("presentation")] {
        let table = doc.create_element("table");
        if let Some(role) = table_role {
            table.set_attribute("role", role);
        }
        let tr = doc.create_element("tr");
        let td = doc.create_element("td");
        table.append_child(&tr);
        tr.append_child(&td);
        body.append_child(&table);
        println!(
            "td in table[role={:?}] -> {:?}",
            table_role,
            role_of(&td)
        );
    }

    println!("\n--- Accessible names ---\n");
    let labeled = doc.create_element("button");
    labeled.set_attribute("aria-label", "Close dialog");
    labeled.set_text("X");
    body.append_child(&labeled);
    println!("aria-label wins: {:?}", accessible_name(&labeled));

    let plain = doc.create_element("button");
    plain.set_text("  Save   draft ");
    body.append_child(&plain);
    println!("text fallback (trimmed): {:?}", accessible_name(&plain));

    println!("\n=== Role Demo Complete ===");
}

fn report(el: &Element) {
    println!("<{}> -> {:?}", el.tag(), role_of(el));
}
