//! Accessibility role inference.
//!
//! Approximates the ARIA role computation for the subset of HTML the locator
//! engine cares about. An explicit `role` attribute always wins; otherwise an
//! ordered rule table supplies the implicit role. Rule order is part of the
//! contract — more specific rules sit above the generic fallbacks for the
//! same tag and the first match wins.

use crate::dom::Element;

/// Implicit role produced by a matching rule.
enum RoleValue {
    /// Fixed role string.
    Static(&'static str),
    /// Ancestry-dependent role, re-evaluated against the element.
    Contextual(fn(&Element) -> Option<&'static str>),
}

/// One row of the implicit-role table.
struct RoleRule {
    /// Human-readable selector the rule corresponds to, for diagnostics.
    selector: &'static str,
    matches: fn(&Element) -> bool,
    role: RoleValue,
}

fn attr_eq(element: &Element, name: &str, value: &str) -> bool {
    element.attr(name).as_deref() == Some(value)
}

fn input_with_type(element: &Element, wanted: &str) -> bool {
    element.tag() == "input"
        && element
            .attr("type")
            .is_some_and(|t| t.eq_ignore_ascii_case(wanted))
}

fn textual_input(element: &Element, wanted: &str) -> bool {
    input_with_type(element, wanted) && !element.has_attr("list")
}

/// `footer`/`header` elements only map to their landmark role outside of
/// sectioning content and landmark-role ancestors.
fn outside_landmark_content(element: &Element) -> bool {
    !element.ancestors().iter().any(|ancestor| {
        matches!(
            ancestor.tag().as_str(),
            "article" | "aside" | "main" | "nav" | "section"
        ) || matches!(
            ancestor.attr("role").as_deref(),
            Some("article" | "complementary" | "main" | "navigation" | "region")
        )
    })
}

fn list_item_parent(element: &Element) -> bool {
    element
        .parent()
        .is_some_and(|p| matches!(p.tag().as_str(), "ul" | "ol" | "menu"))
}

/// Cell roles depend on the nearest ancestor table's own `role` attribute.
/// A `presentation`/`none` table (or no table at all) yields no role, which
/// excludes the cell from role-based matching.
fn td_role(element: &Element) -> Option<&'static str> {
    let table = element.closest("table")?;
    match table.attr("role").as_deref() {
        Some("grid" | "treegrid") => Some("gridcell"),
        Some("presentation" | "none") => None,
        _ => Some("cell"),
    }
}

fn th_role(element: &Element) -> Option<&'static str> {
    let table = element.closest("table")?;
    match table.attr("role").as_deref() {
        Some("grid" | "treegrid") => Some("gridcell"),
        Some("presentation" | "none") => None,
        _ => Some("columnheader"),
    }
}

macro_rules! tag_rule {
    ($tag:literal => $role:literal) => {
        RoleRule {
            selector: $tag,
            matches: |el| el.tag() == $tag,
            role: RoleValue::Static($role),
        }
    };
}

/// The implicit-role table, first match wins. Declared order is load-bearing:
/// attribute-qualified rules precede the bare-tag fallbacks for the same tag.
static IMPLICIT_ROLE_RULES: &[RoleRule] = &[
    RoleRule {
        selector: "a[href]",
        matches: |el| el.tag() == "a" && el.has_attr("href"),
        role: RoleValue::Static("link"),
    },
    RoleRule {
        selector: "a:not([href])",
        matches: |el| el.tag() == "a",
        role: RoleValue::Static("generic"),
    },
    tag_rule!("address" => "group"),
    RoleRule {
        selector: "area[href]",
        matches: |el| el.tag() == "area" && el.has_attr("href"),
        role: RoleValue::Static("link"),
    },
    RoleRule {
        selector: "area:not([href])",
        matches: |el| el.tag() == "area",
        role: RoleValue::Static("generic"),
    },
    tag_rule!("article" => "article"),
    tag_rule!("aside" => "complementary"),
    tag_rule!("button" => "button"),
    tag_rule!("caption" => "caption"),
    tag_rule!("code" => "code"),
    tag_rule!("data" => "generic"),
    tag_rule!("datalist" => "listbox"),
    tag_rule!("del" => "deletion"),
    tag_rule!("details" => "group"),
    tag_rule!("dfn" => "term"),
    tag_rule!("dialog" => "dialog"),
    tag_rule!("div" => "generic"),
    tag_rule!("em" => "emphasis"),
    tag_rule!("fieldset" => "group"),
    tag_rule!("figure" => "figure"),
    RoleRule {
        selector: "footer (outside sectioning content)",
        matches: |el| el.tag() == "footer" && outside_landmark_content(el),
        role: RoleValue::Static("contentinfo"),
    },
    tag_rule!("footer" => "generic"),
    tag_rule!("form" => "form"),
    tag_rule!("h1" => "heading"),
    tag_rule!("h2" => "heading"),
    tag_rule!("h3" => "heading"),
    tag_rule!("h4" => "heading"),
    tag_rule!("h5" => "heading"),
    tag_rule!("h6" => "heading"),
    RoleRule {
        selector: "header (outside sectioning content)",
        matches: |el| el.tag() == "header" && outside_landmark_content(el),
        role: RoleValue::Static("banner"),
    },
    tag_rule!("header" => "generic"),
    tag_rule!("hgroup" => "group"),
    tag_rule!("hr" => "separator"),
    tag_rule!("html" => "document"),
    tag_rule!("i" => "generic"),
    tag_rule!("img" => "img"),
    RoleRule {
        selector: "input[type=button]",
        matches: |el| input_with_type(el, "button"),
        role: RoleValue::Static("button"),
    },
    RoleRule {
        selector: "input[type=checkbox]",
        matches: |el| input_with_type(el, "checkbox"),
        role: RoleValue::Static("checkbox"),
    },
    RoleRule {
        selector: "input[type=email]:not([list])",
        matches: |el| textual_input(el, "email"),
        role: RoleValue::Static("textbox"),
    },
    RoleRule {
        selector: "input[type=image]",
        matches: |el| input_with_type(el, "image"),
        role: RoleValue::Static("button"),
    },
    RoleRule {
        selector: "input[type=number]",
        matches: |el| input_with_type(el, "number"),
        role: RoleValue::Static("spinbutton"),
    },
    RoleRule {
        selector: "input[type=radio]",
        matches: |el| input_with_type(el, "radio"),
        role: RoleValue::Static("radio"),
    },
    RoleRule {
        selector: "input[type=range]",
        matches: |el| input_with_type(el, "range"),
        role: RoleValue::Static("slider"),
    },
    RoleRule {
        selector: "input[type=reset]",
        matches: |el| input_with_type(el, "reset"),
        role: RoleValue::Static("button"),
    },
    RoleRule {
        selector: "input[type=search]:not([list])",
        matches: |el| textual_input(el, "search"),
        role: RoleValue::Static("searchbox"),
    },
    RoleRule {
        selector: "input[type=submit]",
        matches: |el| input_with_type(el, "submit"),
        role: RoleValue::Static("button"),
    },
    RoleRule {
        selector: "input[type=tel]:not([list])",
        matches: |el| textual_input(el, "tel"),
        role: RoleValue::Static("textbox"),
    },
    RoleRule {
        selector: "input[type=text]:not([list])",
        matches: |el| textual_input(el, "text"),
        role: RoleValue::Static("textbox"),
    },
    RoleRule {
        selector: "input[list]",
        matches: |el| el.tag() == "input" && el.has_attr("list"),
        role: RoleValue::Static("combobox"),
    },
    tag_rule!("ins" => "insertion"),
    RoleRule {
        selector: "li (direct child of ul/ol/menu)",
        matches: |el| el.tag() == "li" && list_item_parent(el),
        role: RoleValue::Static("listitem"),
    },
    tag_rule!("li" => "generic"),
    tag_rule!("main" => "main"),
    tag_rule!("math" => "math"),
    tag_rule!("menu" => "list"),
    tag_rule!("meter" => "meter"),
    tag_rule!("nav" => "navigation"),
    tag_rule!("ol" => "list"),
    tag_rule!("optgroup" => "group"),
    tag_rule!("option" => "option"),
    tag_rule!("output" => "status"),
    tag_rule!("p" => "paragraph"),
    tag_rule!("pre" => "generic"),
    tag_rule!("progress" => "progressbar"),
    tag_rule!("q" => "generic"),
    tag_rule!("s" => "deletion"),
    tag_rule!("samp" => "generic"),
    tag_rule!("search" => "search"),
    RoleRule {
        selector: "section[aria-label]",
        matches: |el| el.tag() == "section" && el.has_attr("aria-label"),
        role: RoleValue::Static("region"),
    },
    RoleRule {
        selector: "section[aria-labelledby]",
        matches: |el| el.tag() == "section" && el.has_attr("aria-labelledby"),
        role: RoleValue::Static("region"),
    },
    tag_rule!("section" => "generic"),
    RoleRule {
        selector: "select:not([multiple]):not([size])",
        matches: |el| el.tag() == "select" && !el.has_attr("multiple") && !el.has_attr("size"),
        role: RoleValue::Static("combobox"),
    },
    RoleRule {
        selector: "select[multiple], select[size != 1]",
        matches: |el| {
            el.tag() == "select"
                && (el.has_attr("multiple")
                    || (el.has_attr("size") && !attr_eq(el, "size", "1")))
        },
        role: RoleValue::Static("listbox"),
    },
    tag_rule!("small" => "generic"),
    tag_rule!("span" => "generic"),
    tag_rule!("strong" => "strong"),
    tag_rule!("sub" => "subscript"),
    tag_rule!("summary" => "button"),
    tag_rule!("sup" => "superscript"),
    tag_rule!("svg" => "graphics-document"),
    tag_rule!("table" => "table"),
    tag_rule!("tbody" => "rowgroup"),
    RoleRule {
        selector: "td",
        matches: |el| el.tag() == "td",
        role: RoleValue::Contextual(td_role),
    },
    tag_rule!("textarea" => "textbox"),
    tag_rule!("tfoot" => "rowgroup"),
    RoleRule {
        selector: "th",
        matches: |el| el.tag() == "th",
        role: RoleValue::Contextual(th_role),
    },
    tag_rule!("thead" => "rowgroup"),
    tag_rule!("time" => "time"),
    tag_rule!("tr" => "row"),
    tag_rule!("ul" => "list"),
];

/// Effective accessibility role of an element.
///
/// Elements with `aria-disabled="true"` have no role at all for matching
/// purposes; the check precedes both explicit and implicit lookup. A
/// non-empty explicit `role` attribute is returned verbatim without
/// consulting the implicit table. Otherwise the first matching table rule
/// decides; `None` means the element is invisible to role queries.
#[must_use]
pub fn role_of(element: &Element) -> Option<String> {
    if attr_eq(element, "aria-disabled", "true") {
        return None;
    }
    if let Some(explicit) = element.attr("role") {
        // An empty role attribute does not count as explicit.
        if !explicit.is_empty() {
            return Some(explicit);
        }
    }
    for rule in IMPLICIT_ROLE_RULES {
        if (rule.matches)(element) {
            tracing::trace!(selector = rule.selector, "implicit role rule matched");
            return match &rule.role {
                RoleValue::Static(role) => Some((*role).to_string()),
                RoleValue::Contextual(resolve) => resolve(element).map(str::to_string),
            };
        }
    }
    None
}

/// Accessible name used by role-query `name` filters.
///
/// This is a deliberate simplification of the full accessible-name
/// computation: the `aria-label` attribute when present and non-empty,
/// otherwise the element's trimmed text content. `aria-labelledby`,
/// associated `<label>` elements and host-language naming rules are not
/// consulted.
#[must_use]
pub fn accessible_name(element: &Element) -> String {
    match element.attr("aria-label") {
        Some(label) if !label.is_empty() => label,
        _ => element.text_content().trim().to_string(),
    }
}
