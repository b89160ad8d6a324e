//! The selector grammar the analyzer actually supports: `#id`,
//! `.class`, a bare tag name, `[attr]` / `[attr="value"]`, and compounds of
//! those joined by descendant combinators. Anything outside that grammar
//! (combinators other than whitespace, pseudo-classes, attribute operators
//! other than exact-equals) is recognized as unsupported and parsed into
//! `ParsedSelector::Raw`, which matches nothing — the teacher's full
//! `selectors` crate integration targets a cascade this analyzer never
//! computes, so the matcher here is hand-rolled directly against the arena
//! DOM instead of implementing `selectors::Element`.

use crate::dom::{DomFragment, ElementData, NodeId};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    Id(String),
    Class(String),
    Tag(String),
    AttrPresent(String),
    AttrEquals(String, String),
}

#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct Compound(pub Vec<SimpleSelector>);

/// One selector out of a comma-separated list. `Supported` holds the
/// compounds from outermost ancestor to the target element, in that order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ParsedSelector {
    Supported(Vec<Compound>),
    Raw(String),
}

/// Splits `text` on top-level commas (commas inside `[...]` are not
/// separators) and parses each piece.
pub fn parse_selector_list(text: &str) -> Vec<ParsedSelector> {
    let mut parts = Vec::new();
    let mut depth = 0i32;
    let mut start = 0usize;
    for (i, c) in text.char_indices() {
        match c {
            '[' => depth += 1,
            ']' => depth -= 1,
            ',' if depth == 0 => {
                parts.push(&text[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    parts.push(&text[start..]);

    parts
        .into_iter()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(parse_single_selector)
        .collect()
}

fn parse_single_selector(text: &str) -> ParsedSelector {
    if text.contains('>') || text.contains('+') || text.contains('~') || text.contains(':') {
        return ParsedSelector::Raw(text.to_string());
    }

    let mut compounds = Vec::new();
    for part in text.split_ascii_whitespace() {
        match parse_compound(part) {
            Some(c) => compounds.push(c),
            None => return ParsedSelector::Raw(text.to_string()),
        }
    }

    if compounds.is_empty() {
        ParsedSelector::Raw(text.to_string())
    } else {
        ParsedSelector::Supported(compounds)
    }
}

/// Parses one whitespace-delimited compound (e.g. `div.card#main[role]`).
/// Returns `None` on any byte sequence the supported grammar doesn't cover.
fn parse_compound(part: &str) -> Option<Compound> {
    let bytes = part.as_bytes();
    let mut i = 0usize;
    let mut simples = Vec::new();

    if i < bytes.len() && (bytes[i].is_ascii_alphabetic() || bytes[i] == b'*') {
        let start = i;
        while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
            i += 1;
        }
        let tag = &part[start..i];
        if tag != "*" {
            simples.push(SimpleSelector::Tag(tag.to_ascii_lowercase()));
        }
    }

    while i < bytes.len() {
        match bytes[i] {
            b'#' => {
                let (name, next) = take_ident(part, i + 1)?;
                simples.push(SimpleSelector::Id(name));
                i = next;
            }
            b'.' => {
                let (name, next) = take_ident(part, i + 1)?;
                simples.push(SimpleSelector::Class(name));
                i = next;
            }
            b'[' => {
                let end = part[i..].find(']').map(|p| i + p)?;
                let inner = &part[i + 1..end];
                simples.push(parse_attr_selector(inner)?);
                i = end + 1;
            }
            _ => return None,
        }
    }

    if simples.is_empty() {
        None
    } else {
        Some(Compound(simples))
    }
}

fn take_ident(s: &str, start: usize) -> Option<(String, usize)> {
    let bytes = s.as_bytes();
    let mut i = start;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-' || bytes[i] == b'_') {
        i += 1;
    }
    if i == start {
        None
    } else {
        Some((s[start..i].to_string(), i))
    }
}

fn parse_attr_selector(inner: &str) -> Option<SimpleSelector> {
    match inner.split_once('=') {
        None => {
            let name = inner.trim();
            if name.is_empty() {
                None
            } else {
                Some(SimpleSelector::AttrPresent(name.to_ascii_lowercase()))
            }
        }
        Some((name, value)) => {
            let name = name.trim();
            let value = value.trim().trim_matches(|c| c == '"' || c == '\'');
            if name.is_empty() {
                None
            } else {
                Some(SimpleSelector::AttrEquals(
                    name.to_ascii_lowercase(),
                    value.to_string(),
                ))
            }
        }
    }
}

fn simple_matches(simple: &SimpleSelector, el: &ElementData) -> bool {
    match simple {
        SimpleSelector::Id(id) => el.id() == Some(id.as_str()),
        SimpleSelector::Class(class) => el.classes().contains(&class.as_str()),
        SimpleSelector::Tag(tag) => el.tag == *tag,
        SimpleSelector::AttrPresent(name) => el.attr(name).is_some(),
        SimpleSelector::AttrEquals(name, value) => el.attr_str(name) == Some(value.as_str()),
    }
}

fn compound_matches(compound: &Compound, el: &ElementData) -> bool {
    compound.0.iter().all(|s| simple_matches(s, el))
}

/// True if `node` (the rightmost compound's target) matches `selector`,
/// walking ancestors in `fragment` to satisfy any earlier compounds as a
/// descendant chain.
pub fn matches(selector: &ParsedSelector, fragment: &DomFragment, node: NodeId) -> bool {
    match selector {
        ParsedSelector::Raw(_) => false,
        ParsedSelector::Supported(compounds) => {
            match compounds.split_last() {
                None => false,
                Some((last, ancestors)) => {
                    let Some(el) = fragment.element(node) else {
                        return false;
                    };
                    if !compound_matches(last, el) {
                        return false;
                    }
                    matches_ancestor_chain(ancestors, fragment, node)
                }
            }
        }
    }
}

fn matches_ancestor_chain(remaining: &[Compound], fragment: &DomFragment, node: NodeId) -> bool {
    let Some((last, rest)) = remaining.split_last() else {
        return true;
    };
    let mut current = fragment.parent(node);
    while let Some(ancestor) = current {
        if let Some(el) = fragment.element(ancestor) {
            if compound_matches(last, el) && matches_ancestor_chain(rest, fragment, ancestor) {
                return true;
            }
        }
        current = fragment.parent(ancestor);
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::builder::DomFragmentBuilder;
    use crate::location::SourceLocation;
    use std::sync::Arc;

    fn loc() -> SourceLocation {
        SourceLocation::new(Arc::from("x.css"), 1, 0)
    }

    #[test]
    fn parses_compound_id_and_class() {
        let selectors = parse_selector_list("div.card#main");
        assert_eq!(
            selectors,
            vec![ParsedSelector::Supported(vec![Compound(vec![
                SimpleSelector::Tag("div".to_string()),
                SimpleSelector::Class("card".to_string()),
                SimpleSelector::Id("main".to_string()),
            ])])]
        );
    }

    #[test]
    fn combinators_fall_back_to_raw() {
        let selectors = parse_selector_list("div > span");
        assert_eq!(selectors, vec![ParsedSelector::Raw("div > span".to_string())]);
    }

    #[test]
    fn splits_comma_separated_list_respecting_brackets() {
        let selectors = parse_selector_list("[data-a=\"x,y\"], .b");
        assert_eq!(selectors.len(), 2);
    }

    #[test]
    fn descendant_chain_matches_ancestor() {
        let mut b = DomFragmentBuilder::new(Arc::from("x.html"));
        let root = b.root();
        let nav = b.push_element(root, "nav", loc());
        b.set_attr(nav, "class", "menu".into());
        let link = b.push_element(nav, "a", loc());
        let frag = b.finish();

        let selector = &parse_selector_list(".menu a")[0];
        assert!(matches(selector, &frag, link));
    }

    #[test]
    fn descendant_chain_rejects_non_ancestor() {
        let mut b = DomFragmentBuilder::new(Arc::from("x.html"));
        let root = b.root();
        let div = b.push_element(root, "div", loc());
        let link = b.push_element(root, "a", loc());
        let _ = div;
        let frag = b.finish();

        let selector = &parse_selector_list(".menu a")[0];
        assert!(!matches(selector, &frag, link));
    }

    #[test]
    fn raw_selector_never_matches() {
        let mut b = DomFragmentBuilder::new(Arc::from("x.html"));
        let root = b.root();
        let link = b.push_element(root, "a", loc());
        let frag = b.finish();

        let selector = &parse_selector_list("a:hover")[0];
        assert!(!matches(selector, &frag, link));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// The selector parser is total over the closed grammar — any input
    /// built only from characters the grammar recognizes (identifiers, `#`,
    /// `.`, `[`, `]`, `=`, `"`, whitespace, commas) parses into a non-empty
    /// list of selectors without panicking, and every piece is either
    /// `Supported` or `Raw`, never a parse failure the caller has to handle.
    proptest! {
        #[test]
        fn parsing_never_panics_and_is_never_empty_for_nonblank_input(
            text in "[a-zA-Z0-9#.\\[\\]=\" ,_-]{1,64}"
        ) {
            let trimmed = text.trim();
            prop_assume!(!trimmed.is_empty());
            // A comma-separated piece that is itself blank (e.g. ",,") is
            // dropped entirely, so only assert totality when at least one
            // piece carries real content.
            prop_assume!(trimmed.split(',').any(|piece| !piece.trim().is_empty()));
            let selectors = parse_selector_list(trimmed);
            prop_assert!(!selectors.is_empty());
        }

        #[test]
        fn comma_splitting_respects_bracket_depth(
            before in "[a-zA-Z0-9_-]{0,8}",
            value in "[a-zA-Z0-9_,-]{0,8}",
            after in "[a-zA-Z0-9_-]{0,8}",
        ) {
            let text = format!("{before}[data-x=\"{value}\"] {after}");
            // A comma inside the bracketed value must never be treated as a
            // top-level list separator, so this always parses as one piece.
            let selectors = parse_selector_list(&text);
            prop_assert_eq!(selectors.len(), 1);
        }
    }
}
