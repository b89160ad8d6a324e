//! The element context service: a read-only, per-element
//! projection over a `DocumentModel` that analyzer passes query instead of
//! re-deriving CSS attribution, focusability, or handler presence
//! themselves. Nothing here is cached across calls — `DocumentModel` already
//! did the expensive work (CSS selector matching, handler-target
//! resolution); this is just a convenience view over it.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::document::{DocumentModel, ElementRef};
use crate::dom::ElementData;

/// Matches the legacy `clip: rect(...)` visually-hidden pattern in both its
/// comma- and space-separated forms, with or without a `px` suffix on each
/// of the four zero offsets.
fn zero_clip_rect() -> &'static Regex {
    static RE: Lazy<Regex> = Lazy::new(|| {
        Regex::new(r"^rect\(\s*0(?:px)?[\s,]+0(?:px)?[\s,]+0(?:px)?[\s,]+0(?:px)?\s*\)$").unwrap()
    });
    &RE
}

/// Tags with a natively interactive, focusable role in the absence of any
/// `tabindex` or `role` override.
const NATURALLY_FOCUSABLE_TAGS: &[&str] = &["a", "button", "input", "select", "textarea", "iframe"];

/// `role` values the analyzer treats as interactive widgets for the purposes
/// of expecting keyboard operability.
const INTERACTIVE_ROLES: &[&str] = &[
    "button", "link", "checkbox", "menuitem", "tab", "switch", "slider", "textbox", "combobox",
    "listbox", "option", "radio", "treeitem", "menuitemcheckbox", "menuitemradio",
];

pub struct ElementContext<'a> {
    document: &'a DocumentModel,
    element: ElementRef,
}

impl<'a> ElementContext<'a> {
    pub fn new(document: &'a DocumentModel, element: ElementRef) -> Self {
        ElementContext { document, element }
    }

    pub fn element_ref(&self) -> ElementRef {
        self.element
    }

    fn data(&self) -> &'a ElementData {
        self.document
            .fragment(self.element.fragment)
            .element(self.element.node)
            .expect("ElementContext always wraps an element node")
    }

    pub fn tag(&self) -> &'a str {
        &self.data().tag
    }

    pub fn attr(&self, name: &str) -> Option<&'a str> {
        self.data().attr_str(name)
    }

    /// Every statically-known attribute on this element, for the
    /// serializable `element-context` summary attached to issues. Skips
    /// `dynamic` JSX attributes — there is no string value to report.
    pub fn attributes_owned(&self) -> std::collections::BTreeMap<String, String> {
        self.data()
            .attributes
            .iter()
            .filter_map(|(name, value)| value.as_static().map(|v| (name.clone(), v.to_string())))
            .collect()
    }

    /// Declarations from every CSS rule matching this element, later rules
    /// overriding earlier ones by property name. There is no cascade
    /// (specificity, `!important`, origin) behind this merge —
    /// so it is a best-effort view, not an authoritative computed style.
    pub fn css_declarations(&self) -> HashMap<String, String> {
        let mut merged = HashMap::new();
        for rule in self.document.css_rules_for(self.element) {
            for (property, value) in &rule.declarations {
                merged.insert(property.clone(), value.clone());
            }
        }
        merged
    }

    pub fn tabindex(&self) -> Option<i32> {
        self.attr("tabindex").and_then(|v| v.trim().parse().ok())
    }

    /// True for elements that are focusable by default, independent of
    /// `tabindex` (native interactive controls).
    pub fn natural_focusable(&self) -> bool {
        let data = self.data();
        if !NATURALLY_FOCUSABLE_TAGS.contains(&data.tag.as_str()) {
            return false;
        }
        match data.tag.as_str() {
            "a" => data.attr("href").is_some(),
            "input" => data.attr_str("type") != Some("hidden"),
            _ => true,
        }
    }

    /// True when the element is reachable by Tab, whether natively or via an
    /// explicit non-negative `tabindex`.
    pub fn is_focusable(&self) -> bool {
        match self.tabindex() {
            Some(t) => t >= 0,
            None => self.natural_focusable(),
        }
    }

    /// True when an explicit `tabindex="-1"` removes this element from the
    /// normal tab sequence even though it would otherwise be focusable
    /// (a focus-order conflict).
    pub fn is_removed_from_tab_order(&self) -> bool {
        self.tabindex() == Some(-1)
    }

    pub fn role(&self) -> Option<&'a str> {
        self.attr("role")
    }

    /// True when the element carries (natively, or via `role`) a widget role
    /// a user would expect to operate with a keyboard as well as a mouse.
    /// A `role` attribute overrides nothing here — it only ever adds to
    /// native focusability, so `<button role="tooltip">` still counts.
    pub fn interactive_role(&self) -> bool {
        self.natural_focusable() || self.role().map_or(false, |r| INTERACTIVE_ROLES.contains(&r))
    }

    pub fn has_handler(&self, event_type: &str) -> bool {
        self.document
            .handlers_for(self.element)
            .iter()
            .any(|h| h.event_type.eq_ignore_ascii_case(event_type))
    }

    pub fn has_click_handler(&self) -> bool {
        self.has_handler("click")
    }

    /// True iff the element has any attached handler, an interactive ARIA
    /// role, or is naturally focusable.
    pub fn is_interactive(&self) -> bool {
        !self.document.handlers_for(self.element).is_empty() || self.interactive_role()
    }

    /// True for any keyboard-operable interaction (key events, or a generic
    /// `keydown`/`keyup`/`keypress` handler) — the mouse-only-click rule
    /// treats any of these as sufficient keyboard parity.
    pub fn has_keyboard_handler(&self) -> bool {
        ["keydown", "keyup", "keypress"]
            .iter()
            .any(|event| self.has_handler(event))
    }

    /// `aria-hidden="true"` on this element specifically — the HTML
    /// `hidden` attribute is treated the same way since it removes the
    /// element from the accessibility tree just as surely.
    pub fn aria_hides(&self) -> bool {
        self.attr("aria-hidden") == Some("true") || self.attr("hidden").is_some()
    }

    /// The first CSS rule, among those matching this element or any
    /// ancestor, whose declarations hide content from sight while leaving it
    /// keyboard-focusable (`display: none`,
    /// `visibility: hidden`, `opacity: 0`, a zero clip rect, `clip-path:
    /// inset(50%)`, or an absolutely/fixed-positioned element pushed off
    /// screen). `None` means no such rule was found.
    pub fn hiding_css_rule(&self) -> Option<&'a crate::css::CssRule> {
        if let Some(rule) = self
            .document
            .css_rules_for(self.element)
            .into_iter()
            .find(|rule| rule_hides_content(&rule.declarations))
        {
            return Some(rule);
        }

        let fragment = self.document.fragment(self.element.fragment);
        let mut current = fragment.parent(self.element.node);
        while let Some(ancestor) = current {
            let ancestor_ref = ElementRef {
                fragment: self.element.fragment,
                node: ancestor,
            };
            if fragment.element(ancestor).is_some() {
                if let Some(rule) = self
                    .document
                    .css_rules_for(ancestor_ref)
                    .into_iter()
                    .find(|rule| rule_hides_content(&rule.declarations))
                {
                    return Some(rule);
                }
            }
            current = fragment.parent(ancestor);
        }
        None
    }
}

/// The "hiding rule" predicate, evaluated against one CSS rule's
/// own flat declaration map (the analyzer has no cascade to merge several
/// rules' declarations into one, so a rule must hide content on its own).
fn rule_hides_content(declarations: &HashMap<String, String>) -> bool {
    let get = |prop: &str| declarations.get(prop).map(|v| v.trim().to_ascii_lowercase());

    if get("display").as_deref() == Some("none") {
        return true;
    }
    if get("visibility").as_deref() == Some("hidden") {
        return true;
    }
    if get("opacity").as_deref() == Some("0") {
        return true;
    }
    if let Some(clip) = get("clip") {
        if zero_clip_rect().is_match(&clip) {
            return true;
        }
    }
    if let Some(clip_path) = get("clip-path") {
        if clip_path.contains("inset(50%)") {
            return true;
        }
    }
    if matches!(get("position").as_deref(), Some("absolute") | Some("fixed")) {
        let offscreen = |prop: &str| {
            get(prop)
                .and_then(|v| v.trim_end_matches("px").parse::<f64>().ok())
                .map(|v| v <= -9999.0)
                .unwrap_or(false)
        };
        if offscreen("left") || offscreen("top") {
            return true;
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{self, AnalysisScope, SourceKind};

    #[test]
    fn native_button_is_focusable_without_tabindex() {
        let scope = AnalysisScope::new().add(
            "index.html",
            SourceKind::Html,
            "<!DOCTYPE html><html><body><button>Go</button></body></html>",
        );
        let doc = document::build(&scope);
        let element = doc.elements().find(|e| {
            doc.fragment(e.fragment).element(e.node).unwrap().tag == "button"
        }).unwrap();
        let ctx = ElementContext::new(&doc, element);
        assert!(ctx.natural_focusable());
        assert!(ctx.is_focusable());
    }

    #[test]
    fn negative_tabindex_removes_from_tab_order() {
        let scope = AnalysisScope::new().add(
            "index.html",
            SourceKind::Html,
            r#"<!DOCTYPE html><html><body><button tabindex="-1">Go</button></body></html>"#,
        );
        let doc = document::build(&scope);
        let element = doc.elements().next().unwrap();
        let ctx = ElementContext::new(&doc, element);
        assert!(ctx.is_removed_from_tab_order());
        assert!(!ctx.is_focusable());
    }

    #[test]
    fn css_display_none_is_detected_as_hidden() {
        let scope = AnalysisScope::new()
            .add(
                "index.html",
                SourceKind::Html,
                r#"<!DOCTYPE html><html><body><div class="menu">x</div></body></html>"#,
            )
            .add("style.css", SourceKind::Css, ".menu { display: none; }");
        let doc = document::build(&scope);
        let element = doc.elements().next().unwrap();
        let ctx = ElementContext::new(&doc, element);
        assert!(ctx.hiding_css_rule().is_some());
    }
}
