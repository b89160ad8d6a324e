//! The JS/TS action-node extractor (4.1.2): builds an oxc AST, walks it,
//! and emits one `ActionNode` per recognized construct. The recognizer list
//! below is closed per the design-note resolution of the corresponding open
//! question in the crate root docs — everything else produces no node at
//! all, except receiver-resolution failure on an otherwise-recognized call
//! shape, which produces a node with `TargetDescriptor::Unknown` and a
//! `ModelDiagnostic::UnresolvedBinding`.

use std::collections::HashMap;
use std::sync::Arc;

use oxc_allocator::Allocator;
use oxc_ast::ast::{
    Argument, ArrowFunctionExpression, AssignmentExpression, AssignmentTarget, CallExpression,
    Class, Expression, Function, JSXElementName, MemberExpression, Program, PropertyKey,
    Statement,
};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};

use super::{
    ActionLanguageModel, ActionNode, DomOperation, FocusMethod, FrameworkTag, JsxElementRef,
    NavigationMechanism, TargetDescriptor, Timing, TimedApi,
};
use crate::dom::jsx;
use crate::dom::DomFragment;
use crate::error::{ModelDiagnostic, ModelDiagnosticKind, ParseDiagnostic, SourceKind};
use crate::location::SourceLocation;

pub struct JsAnalysisOutput {
    pub model: ActionLanguageModel,
    pub jsx_fragments: Vec<DomFragment>,
    pub diagnostics: Vec<ParseDiagnostic>,
    pub model_diagnostics: Vec<ModelDiagnostic>,
}

/// Parses and extracts `ActionNode`s (and any JSX fragments it encounters)
/// from one JS/TS/JSX source string.
pub fn analyze_source(file: &str, source: &str) -> JsAnalysisOutput {
    let allocator = Allocator::default();
    let source_type = source_type_for(file);

    let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        Parser::new(&allocator, source, source_type).parse()
    }));

    let mut model = ActionLanguageModel::new(file.to_string());
    let mut jsx_fragments = Vec::new();
    let mut diagnostics = Vec::new();
    let mut model_diagnostics = Vec::new();

    match result {
        Ok(parser_return) => {
            for error in &parser_return.errors {
                diagnostics.push(ParseDiagnostic {
                    source_kind: SourceKind::JsTs,
                    file: file.to_string(),
                    message: error.to_string(),
                });
            }
            let mut ctx = ExtractContext {
                file: Arc::from(file),
                source,
                model: &mut model,
                jsx_fragments: &mut jsx_fragments,
                model_diagnostics: &mut model_diagnostics,
            };
            ctx.visit_statements(&parser_return.program.body, &Scope::default(), false);
        }
        Err(_) => diagnostics.push(ParseDiagnostic {
            source_kind: SourceKind::JsTs,
            file: file.to_string(),
            message: "unrecoverable parse error".to_string(),
        }),
    }

    JsAnalysisOutput {
        model,
        jsx_fragments,
        diagnostics,
        model_diagnostics,
    }
}

fn source_type_for(file: &str) -> SourceType {
    if file.ends_with(".tsx") {
        SourceType::default().with_typescript(true).with_jsx(true)
    } else if file.ends_with(".ts") {
        SourceType::default().with_typescript(true)
    } else if file.ends_with(".jsx") {
        SourceType::default().with_jsx(true)
    } else {
        SourceType::default().with_jsx(true)
    }
}

/// Intraprocedural, last-write-wins variable bindings to a DOM-resolving
/// call, scoped to one function body (cloned on entry to a nested function
/// so inner rebinding does not leak to the caller's scope).
#[derive(Clone, Default)]
struct Scope {
    bindings: HashMap<String, TargetDescriptor>,
}

impl Scope {
    fn lookup(&self, name: &str) -> TargetDescriptor {
        self.bindings
            .get(name)
            .cloned()
            .unwrap_or(TargetDescriptor::Unknown)
    }
}

struct ExtractContext<'a> {
    file: Arc<str>,
    source: &'a str,
    model: &'a mut ActionLanguageModel,
    jsx_fragments: &'a mut Vec<DomFragment>,
    model_diagnostics: &'a mut Vec<ModelDiagnostic>,
}

impl<'a> ExtractContext<'a> {
    fn loc(&self, span: Span) -> SourceLocation {
        // Reconstructing line/column from a byte offset is done once per
        // file via a small scan; acceptable since sources here are
        // analysis-unit-sized, not whole repositories.
        let mut line = 1u32;
        let mut col = 0u32;
        for (i, b) in self.source.bytes().enumerate() {
            if i as u32 == span.start {
                break;
            }
            if b == b'\n' {
                line += 1;
                col = 0;
            } else {
                col += 1;
            }
        }
        SourceLocation::new(self.file.clone(), line, col)
            .with_length(span.end.saturating_sub(span.start))
    }

    fn visit_statements(&mut self, stmts: &[Statement], scope: &Scope, at_fn_top_level: bool) {
        let mut scope = scope.clone();
        for stmt in stmts {
            self.visit_statement(stmt, &mut scope, at_fn_top_level);
        }
    }

    fn visit_statement(&mut self, stmt: &Statement, scope: &mut Scope, at_fn_top_level: bool) {
        match stmt {
            Statement::ExpressionStatement(expr_stmt) => {
                self.visit_expression(&expr_stmt.expression, scope);
            }
            Statement::VariableDeclaration(decl) => {
                for d in &decl.declarations {
                    if let Some(init) = &d.init {
                        self.visit_expression(init, scope);
                        if let Some(name) = d.id.get_identifier() {
                            let target = self.resolve_dom_call(init, scope);
                            if !matches!(target, TargetDescriptor::Unknown) {
                                scope.bindings.insert(name.to_string(), target);
                            }
                        }
                    }
                }
            }
            Statement::ReturnStatement(ret) => {
                if let Some(arg) = &ret.argument {
                    if at_fn_top_level {
                        if let Some(fragment) = self.try_extract_jsx_return(arg, scope) {
                            self.jsx_fragments.push(fragment);
                        } else {
                            self.visit_expression(arg, scope);
                        }
                    } else {
                        self.visit_expression(arg, scope);
                    }
                }
            }
            Statement::BlockStatement(block) => {
                self.visit_statements(&block.body, scope, false);
            }
            Statement::IfStatement(if_stmt) => {
                self.visit_expression(&if_stmt.test, scope);
                self.visit_statement(&if_stmt.consequent, scope, at_fn_top_level);
                if let Some(alt) = &if_stmt.alternate {
                    self.visit_statement(alt, scope, at_fn_top_level);
                }
            }
            Statement::FunctionDeclaration(func) => self.visit_function(func, scope),
            Statement::ClassDeclaration(class) => self.visit_class(class, scope),
            _ => {}
        }
    }

    /// Attempts to treat `expr` as a top-level returned JSX tree. Only a
    /// bare `<Element>...</Element>` expression counts; conditional or
    /// logical wrappers around JSX are not unwrapped — the recognizer list
    /// is closed, and guessing through control flow here would be exactly
    /// the kind of deep flow analysis this extractor deliberately avoids.
    fn try_extract_jsx_return(
        &mut self,
        expr: &Expression,
        scope: &Scope,
    ) -> Option<DomFragment> {
        let _ = scope;
        if let Expression::JSXElement(el) = expr {
            let fragment_index_in_file = self.jsx_fragments.len();
            let output = jsx::build_fragment(&self.file, self.source, el);
            for handler in output.inline_handlers {
                let handler_ref = self.model.intern_handler_body(handler.body_text);
                self.model.push(ActionNode::EventHandlerRegistration {
                    target: TargetDescriptor::JsxInline(JsxElementRef {
                        fragment_index_in_file,
                        node: handler.element,
                    }),
                    event_type: handler.event_type,
                    handler: handler_ref,
                    framework_tag: Some(FrameworkTag::React),
                    location: handler.location,
                });
            }
            Some(output.fragment)
        } else {
            None
        }
    }

    fn visit_function(&mut self, func: &Function, scope: &Scope) {
        if let Some(body) = &func.body {
            self.visit_statements(&body.statements, scope, true);
        }
    }

    fn visit_arrow(&mut self, func: &ArrowFunctionExpression, scope: &Scope) {
        self.visit_statements(&func.body.statements, scope, true);
    }

    fn visit_class(&mut self, class: &Class, scope: &Scope) {
        for member in &class.body.body {
            if let Some(func) = member.as_method_function() {
                self.visit_function(func, scope);
            }
        }
    }

    fn visit_expression(&mut self, expr: &Expression, scope: &mut Scope) {
        match expr {
            Expression::CallExpression(call) => self.visit_call(call, scope),
            Expression::AssignmentExpression(assign) => self.visit_assignment(assign, scope),
            Expression::ArrowFunctionExpression(arrow) => self.visit_arrow(arrow, scope),
            Expression::FunctionExpression(func) => self.visit_function(func, scope),
            Expression::JSXElement(el) => {
                // A JSX tree reached outside a bare top-level `return` is
                // still parsed for its inline handlers (so a `const jsx =
                // <button onClick={...}/>` assigned and returned indirectly
                // is not silently dropped), but is not registered as its
                // own `DomFragment` root — only returned trees are.
                let fragment_index_in_file = self.jsx_fragments.len();
                let output = jsx::build_fragment(&self.file, self.source, el);
                for handler in output.inline_handlers {
                    let handler_ref = self.model.intern_handler_body(handler.body_text);
                    self.model.push(ActionNode::EventHandlerRegistration {
                        target: TargetDescriptor::JsxInline(JsxElementRef {
                            fragment_index_in_file,
                            node: handler.element,
                        }),
                        event_type: handler.event_type,
                        handler: handler_ref,
                        framework_tag: Some(FrameworkTag::React),
                        location: handler.location,
                    });
                }
            }
            _ => {}
        }
    }

    fn visit_call(&mut self, call: &CallExpression, scope: &mut Scope) {
        for arg in &call.arguments {
            if let Argument::Expression(e) = arg {
                self.visit_expression(e, scope);
            }
        }

        let Some((receiver, method)) = split_member_call(&call.callee) else {
            self.visit_global_call(call);
            return;
        };

        match method.as_str() {
            "addEventListener" => {
                let event_type = call.arguments.first().and_then(string_arg);
                let handler_span = call.arguments.get(1).map(|a| a.span());
                if let Some(event_type) = event_type {
                    let location = self.loc(call.span());
                    let target = self.resolve_target_recorded(receiver, scope, location.clone());
                    let handler_text = handler_span
                        .map(|s| self.slice(s))
                        .unwrap_or_default();
                    let handler_ref = self.model.intern_handler_body(handler_text);
                    self.model.push(ActionNode::EventHandlerRegistration {
                        target,
                        event_type,
                        handler: handler_ref,
                        framework_tag: None,
                        location,
                    });
                }
            }
            "setAttribute" => {
                let attr_name = call.arguments.first().and_then(string_arg);
                if let Some(attr_name) = attr_name {
                    if attr_name.starts_with("aria-") {
                        let location = self.loc(call.span());
                        let target = self.resolve_target_recorded(receiver, scope, location.clone());
                        let new_value = call.arguments.get(1).and_then(string_arg);
                        self.model.push(ActionNode::AriaMutation {
                            target,
                            attribute: attr_name,
                            new_value,
                            location,
                        });
                    }
                }
            }
            "focus" | "blur" => {
                let location = self.loc(call.span());
                let target = self.resolve_target_recorded(receiver, scope, location.clone());
                let method = if method == "focus" {
                    FocusMethod::Focus
                } else {
                    FocusMethod::Blur
                };
                self.model.push(ActionNode::FocusChange {
                    target,
                    method,
                    timing: Timing::Immediate,
                    location,
                });
            }
            "remove" => {
                let location = self.loc(call.span());
                let target = self.resolve_target_recorded(receiver, scope, location.clone());
                self.model.push(ActionNode::DomMutation {
                    target,
                    operation: DomOperation::Remove,
                    location,
                });
            }
            "assign" if is_location_receiver(receiver) => {
                let location = self.loc(call.span());
                self.model.push(ActionNode::Navigation {
                    mechanism: NavigationMechanism::LocationAssign,
                    location,
                });
            }
            "replace" if is_location_receiver(receiver) => {
                let location = self.loc(call.span());
                self.model.push(ActionNode::Navigation {
                    mechanism: NavigationMechanism::LocationReplace,
                    location,
                });
            }
            "pushState" if is_history_receiver(receiver) => {
                let location = self.loc(call.span());
                self.model.push(ActionNode::Navigation {
                    mechanism: NavigationMechanism::HistoryPushState,
                    location,
                });
            }
            "replaceState" if is_history_receiver(receiver) => {
                let location = self.loc(call.span());
                self.model.push(ActionNode::Navigation {
                    mechanism: NavigationMechanism::HistoryReplaceState,
                    location,
                });
            }
            "add" | "remove" | "toggle" if is_class_list_receiver(receiver) => {
                let location = self.loc(call.span());
                let target = self.resolve_target_recorded(class_list_owner(receiver), scope, location.clone());
                let class_name = call.arguments.first().and_then(string_arg).unwrap_or_default();
                let operation = match method.as_str() {
                    "add" => DomOperation::ClassListAdd(class_name),
                    "remove" => DomOperation::ClassListRemove(class_name),
                    _ => DomOperation::ClassListToggle(class_name),
                };
                self.model.push(ActionNode::DomMutation {
                    target,
                    operation,
                    location,
                });
            }
            _ => {}
        }
    }

    fn visit_global_call(&mut self, call: &CallExpression) {
        let Expression::Identifier(ident) = &call.callee else {
            return;
        };
        let api = match ident.name.as_str() {
            "setTimeout" => TimedApi::SetTimeout,
            "setInterval" => TimedApi::SetInterval,
            _ => return,
        };
        let duration_ms = call.arguments.get(1).and_then(numeric_arg);
        let handler_text = call
            .arguments
            .first()
            .map(|a| self.slice(a.span()))
            .unwrap_or_default();
        let handler_ref = self.model.intern_handler_body(handler_text);
        let location = self.loc(call.span());
        self.model.push(ActionNode::TimedCall {
            api,
            duration_ms,
            handler: handler_ref,
            location,
        });
    }

    fn visit_assignment(&mut self, assign: &AssignmentExpression, scope: &mut Scope) {
        self.visit_expression(&assign.right, scope);

        if is_location_href_target(&assign.target) {
            let location = self.loc(assign.span());
            self.model.push(ActionNode::Navigation {
                mechanism: NavigationMechanism::LocationAssign,
                location,
            });
            return;
        }

        if let Some((receiver, "display")) = style_property_target(&assign.target) {
            let value = string_literal(&assign.right).unwrap_or_default();
            let location = self.loc(assign.span());
            let target = self.resolve_target_recorded(receiver, scope, location.clone());
            self.model.push(ActionNode::DomMutation {
                target,
                operation: DomOperation::StyleProperty("display".to_string(), value),
                location,
            });
            return;
        }

        if let Some((receiver, attr)) = aria_bracket_target(&assign.target) {
            let location = self.loc(assign.span());
            let target = self.resolve_target_recorded(receiver, scope, location.clone());
            let new_value = string_literal(&assign.right);
            self.model.push(ActionNode::AriaMutation {
                target,
                attribute: attr,
                new_value,
                location,
            });
        }
    }

    fn resolve_target(&self, expr: &Expression, scope: &Scope) -> TargetDescriptor {
        let resolved = self.resolve_dom_call(expr, scope);
        if !matches!(resolved, TargetDescriptor::Unknown) {
            return resolved;
        }
        if let Expression::Identifier(ident) = expr {
            return scope.lookup(&ident.name);
        }
        TargetDescriptor::Unknown
    }

    /// `resolve_target`, but for call sites that already know they matched a
    /// recognized construct (`addEventListener`, `focus`, `setAttribute`,
    /// ...) — so a fallthrough to `Unknown` here means the receiver itself
    /// could not be tied to an element, not that the construct wasn't
    /// recognized. Records a `ModelDiagnostic::UnresolvedBinding` for that.
    fn resolve_target_recorded(
        &mut self,
        expr: &Expression,
        scope: &Scope,
        location: SourceLocation,
    ) -> TargetDescriptor {
        let target = self.resolve_target(expr, scope);
        if matches!(target, TargetDescriptor::Unknown) {
            self.model_diagnostics.push(ModelDiagnostic {
                kind: ModelDiagnosticKind::UnresolvedBinding {
                    identifier: self.slice(expr.span()),
                },
                location,
            });
        }
        target
    }

    /// Recognizes `document.getElementById('x')` / `document.querySelector('.x')`
    /// directly on `expr`, without consulting the binding table.
    fn resolve_dom_call(&self, expr: &Expression, _scope: &Scope) -> TargetDescriptor {
        let Expression::CallExpression(call) = expr else {
            return TargetDescriptor::Unknown;
        };
        let Some((receiver, method)) = split_member_call(&call.callee) else {
            return TargetDescriptor::Unknown;
        };
        if !is_document_receiver(receiver) {
            return TargetDescriptor::Unknown;
        }
        match method.as_str() {
            "getElementById" => call
                .arguments
                .first()
                .and_then(string_arg)
                .map(TargetDescriptor::ById)
                .unwrap_or(TargetDescriptor::Unknown),
            "querySelector" => call
                .arguments
                .first()
                .and_then(string_arg)
                .map(|sel| parse_simple_selector(&sel))
                .unwrap_or(TargetDescriptor::Unknown),
            _ => TargetDescriptor::Unknown,
        }
    }

    fn slice(&self, span: Span) -> String {
        self.source
            .get(span.start as usize..span.end as usize)
            .unwrap_or_default()
            .to_string()
    }
}

fn parse_simple_selector(sel: &str) -> TargetDescriptor {
    let sel = sel.trim();
    if let Some(id) = sel.strip_prefix('#') {
        TargetDescriptor::ById(id.to_string())
    } else if let Some(class) = sel.strip_prefix('.') {
        TargetDescriptor::ByClass(class.to_string())
    } else if !sel.is_empty()
        && sel
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
    {
        TargetDescriptor::ByTag(sel.to_ascii_lowercase())
    } else {
        TargetDescriptor::Unknown
    }
}

fn split_member_call(callee: &Expression) -> Option<(&Expression, String)> {
    match callee {
        Expression::StaticMemberExpression(member) => {
            Some((&member.object, member.property.name.to_string()))
        }
        _ => None,
    }
}

fn is_document_receiver(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(ident) if ident.name == "document")
}

fn is_location_receiver(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(ident) if ident.name == "location")
}

fn is_history_receiver(expr: &Expression) -> bool {
    matches!(expr, Expression::Identifier(ident) if ident.name == "history")
}

fn is_class_list_receiver(expr: &Expression) -> bool {
    matches!(
        expr,
        Expression::StaticMemberExpression(m) if m.property.name == "classList"
    )
}

fn class_list_owner(expr: &Expression) -> &Expression {
    match expr {
        Expression::StaticMemberExpression(m) if m.property.name == "classList" => &m.object,
        _ => expr,
    }
}

fn is_location_href_target(target: &AssignmentTarget) -> bool {
    matches!(
        target,
        AssignmentTarget::StaticMemberExpression(m)
            if m.property.name == "href" && is_location_receiver(&m.object)
    )
}

fn style_property_target<'a>(target: &'a AssignmentTarget) -> Option<(&'a Expression, &'static str)> {
    if let AssignmentTarget::StaticMemberExpression(m) = target {
        if m.property.name == "display" {
            if let Expression::StaticMemberExpression(style) = &*m.object {
                if style.property.name == "style" {
                    return Some((&style.object, "display"));
                }
            }
        }
    }
    None
}

fn aria_bracket_target<'a>(
    target: &'a AssignmentTarget,
) -> Option<(&'a Expression, String)> {
    if let AssignmentTarget::ComputedMemberExpression(m) = target {
        if let Expression::StringLiteral(lit) = &m.expression {
            if lit.value.starts_with("aria-") {
                return Some((&m.object, lit.value.to_string()));
            }
        }
    }
    None
}

fn string_arg(arg: &Argument) -> Option<String> {
    match arg {
        Argument::Expression(e) => string_literal(e),
        _ => None,
    }
}

fn string_literal(expr: &Expression) -> Option<String> {
    match expr {
        Expression::StringLiteral(lit) => Some(lit.value.to_string()),
        _ => None,
    }
}

fn numeric_arg(arg: &Argument) -> Option<f64> {
    match arg {
        Argument::Expression(Expression::NumericLiteral(n)) => Some(n.value),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn getelementbyid_target_resolves_without_diagnostic() {
        let output = analyze_source(
            "a.js",
            "document.getElementById('go').addEventListener('click', function() {});",
        );
        assert!(output.model_diagnostics.is_empty());
        assert_eq!(output.model.actions().count(), 1);
    }

    #[test]
    fn unresolvable_receiver_on_recognized_call_is_recorded() {
        let output = analyze_source(
            "a.js",
            "function run(el) { someHelper().addEventListener('click', function() {}); }",
        );
        assert_eq!(output.model_diagnostics.len(), 1);
        assert!(matches!(
            output.model_diagnostics[0].kind,
            ModelDiagnosticKind::UnresolvedBinding { .. }
        ));
    }

    #[test]
    fn bound_identifier_target_resolves_without_diagnostic() {
        let output = analyze_source(
            "a.js",
            "function run() { var el = document.getElementById('go'); el.focus(); }",
        );
        assert!(output.model_diagnostics.is_empty());
    }
}
