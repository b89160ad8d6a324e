//! CSS source parsing: turns one stylesheet (a
//! standalone `.css` file or a `<style>` block diverted out of an HTML
//! document) into a `CssModel` — an ordered list of `CssRule`s, each
//! a selector plus its flat property/value declarations.
//!
//! Only the tokenizer half of `cssparser` is used here (`ParserInput`,
//! `Parser`, `Token`, `parse_nested_block`) to find rule boundaries; the
//! declarations inside a rule body are flat strings (the analyzer never
//! needs typed CSS values), and selectors are handed to `css::selector`
//! rather than `selectors::Parser`. At-rules (`@media`, `@import`, ...) are
//! skipped entirely — the analyzer has no cascade or media-context model, so
//! a rule nested inside one would be misleading to attribute unconditionally.

pub mod selector;

use std::collections::HashMap;
use std::sync::Arc;

use cssparser::{Parser, ParserInput, Token};

use self::selector::{parse_selector_list, ParsedSelector};
use crate::error::{ModelDiagnostic, ModelDiagnosticKind, ParseDiagnostic, SourceKind};
use crate::location::SourceLocation;

#[derive(Clone, Debug)]
pub struct CssRule {
    pub selectors: Vec<ParsedSelector>,
    pub declarations: HashMap<String, String>,
    pub location: SourceLocation,
}

/// One stylesheet's worth of rules, in source order (earlier rules are
/// weaker than later ones at equal specificity — but since the analyzer
/// doesn't compute specificity or the cascade at all, it attributes
/// every matching rule to an element rather than picking a winner).
#[derive(Clone, Debug, Default)]
pub struct CssModel {
    pub rules: Vec<CssRule>,
}

impl CssModel {
    pub fn rules_matching<'a>(
        &'a self,
        fragment: &'a crate::dom::DomFragment,
        node: crate::dom::NodeId,
    ) -> impl Iterator<Item = &'a CssRule> + 'a {
        self.rules
            .iter()
            .filter(move |rule| rule.selectors.iter().any(|s| selector::matches(s, fragment, node)))
    }
}

/// Parses one stylesheet's text into a `CssModel`. `line_offset` shifts
/// reported line numbers for `<style>` blocks diverted out of an HTML
/// document, so locations stay anchored to the original file. Every
/// selector that falls outside the supported grammar (and so parses into
/// `ParsedSelector::Raw`) gets a `ModelDiagnostic::UnsupportedSelector`
/// alongside the parse-level diagnostics.
pub fn parse_css(
    file: &str,
    content: &str,
    line_offset: u32,
) -> (CssModel, Vec<ParseDiagnostic>, Vec<ModelDiagnostic>) {
    let file_arc: Arc<str> = Arc::from(file);
    let mut rules = Vec::new();
    let diagnostics = Vec::new();
    let mut model_diagnostics = Vec::new();

    let mut input = ParserInput::new(content);
    let mut parser = Parser::new(&mut input);
    let mut cursor = parser.position();
    let mut line = line_offset;

    loop {
        parser.skip_whitespace();
        let prelude_start = parser.position();
        line += count_newlines(parser.slice(cursor..prelude_start));
        cursor = prelude_start;
        let prelude_line = line;

        let first = match parser.next() {
            Ok(t) => t.clone(),
            Err(_) => break,
        };

        if let Token::AtKeyword(_) = first {
            skip_at_rule(&mut parser);
            continue;
        }

        // Scan forward to the rule's opening brace, recording the byte just
        // before it so the selector slice excludes the brace itself.
        let mut body_start;
        let mut found_block = false;
        loop {
            body_start = parser.position();
            match parser.next() {
                Ok(&Token::CurlyBracketBlock) => {
                    found_block = true;
                    break;
                }
                Ok(&Token::Semicolon) | Err(_) => break,
                Ok(_) => continue,
            }
        }
        if !found_block {
            continue;
        }

        let selector_text = parser.slice(prelude_start..body_start).trim().to_string();
        let declarations_text: Result<String, cssparser::ParseError<'_, ()>> =
            parser.parse_nested_block(|inner| {
                let start = inner.position();
                while inner.next().is_ok() {}
                let end = inner.position();
                Ok(inner.slice(start..end).to_string())
            });

        let body = match declarations_text {
            Ok(text) => text,
            Err(_) => continue,
        };

        if selector_text.is_empty() {
            continue;
        }

        let selectors = parse_selector_list(&selector_text);
        let rule_location = SourceLocation::new(file_arc.clone(), prelude_line, 0);
        for selector in &selectors {
            if let ParsedSelector::Raw(raw) = selector {
                model_diagnostics.push(ModelDiagnostic {
                    kind: ModelDiagnosticKind::UnsupportedSelector { raw: raw.clone() },
                    location: rule_location.clone(),
                });
            }
        }
        let declarations = parse_declarations(&body);
        rules.push(CssRule {
            selectors,
            declarations,
            location: rule_location,
        });
    }

    (CssModel { rules }, diagnostics, model_diagnostics)
}

/// Consumes an at-rule's prelude and, if present, its block — without
/// producing a `CssRule`. `parser.next()` auto-skips the contents of any
/// block token it returns without being entered via `parse_nested_block`.
fn skip_at_rule(parser: &mut Parser) {
    loop {
        match parser.next() {
            Ok(&Token::Semicolon) => break,
            Ok(&Token::CurlyBracketBlock) => break,
            Ok(_) => continue,
            Err(_) => break,
        }
    }
}

fn parse_declarations(body: &str) -> HashMap<String, String> {
    let mut declarations = HashMap::new();
    for decl in body.split(';') {
        if let Some((prop, value)) = decl.split_once(':') {
            let prop = prop.trim().to_ascii_lowercase();
            let value = value.trim().to_string();
            if !prop.is_empty() && !value.is_empty() {
                declarations.insert(prop, value);
            }
        }
    }
    declarations
}

fn count_newlines(slice: &str) -> u32 {
    slice.bytes().filter(|&b| b == b'\n').count() as u32
}

/// Parses `content` reporting a `ParseDiagnostic` on the rare case the
/// tokenizer itself cannot make progress at all (used by callers that want
/// the uniform `(model, diagnostics)` shape even though `parse_css` above
/// already recovers from malformed rules by skipping them).
pub fn parse_css_source(file: &str, content: &str) -> (CssModel, Vec<ParseDiagnostic>) {
    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        parse_css(file, content, 1)
    }));
    match result {
        Ok((model, diagnostics, _model_diagnostics)) => (model, diagnostics),
        Err(_) => (
            CssModel::default(),
            vec![ParseDiagnostic {
                source_kind: SourceKind::Css,
                file: file.to_string(),
                message: "internal tokenizer error".to_string(),
            }],
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_single_rule_with_declarations() {
        let (model, diagnostics) = parse_css_source("x.css", ".menu { display: none; color: red; }");
        assert!(diagnostics.is_empty());
        assert_eq!(model.rules.len(), 1);
        let rule = &model.rules[0];
        assert_eq!(rule.declarations.get("display"), Some(&"none".to_string()));
        assert_eq!(rule.declarations.get("color"), Some(&"red".to_string()));
    }

    #[test]
    fn skips_at_rules_entirely() {
        let (model, _) = parse_css_source(
            "x.css",
            "@media (max-width: 600px) { .menu { display: none; } } .ok { color: blue; }",
        );
        assert_eq!(model.rules.len(), 1);
        assert_eq!(
            model.rules[0].declarations.get("color"),
            Some(&"blue".to_string())
        );
    }

    #[test]
    fn skips_bare_at_rule_statement() {
        let (model, _) = parse_css_source("x.css", "@import url(foo.css); .a { color: green; }");
        assert_eq!(model.rules.len(), 1);
    }

    #[test]
    fn comma_separated_selector_list_is_preserved_on_one_rule() {
        let (model, _) = parse_css_source("x.css", ".a, .b { color: red; }");
        assert_eq!(model.rules.len(), 1);
        assert_eq!(model.rules[0].selectors.len(), 2);
    }

    #[test]
    fn malformed_rule_without_closing_brace_is_skipped_not_fatal() {
        let (model, diagnostics) = parse_css_source("x.css", ".a { color: red;");
        assert!(model.rules.is_empty());
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn pseudo_class_selector_is_raw_and_reported_as_unsupported() {
        let (model, _, model_diagnostics) = parse_css("x.css", "a:hover { color: red; }", 1);
        assert_eq!(model.rules.len(), 1);
        assert!(matches!(model.rules[0].selectors[0], ParsedSelector::Raw(_)));
        assert_eq!(model_diagnostics.len(), 1);
        assert!(matches!(
            model_diagnostics[0].kind,
            ModelDiagnosticKind::UnsupportedSelector { .. }
        ));
    }
}
