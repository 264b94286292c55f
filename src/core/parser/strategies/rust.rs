use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use crate::core::call_resolver::{record_call, CallMap};
use crate::core::errors::ParseError;
use crate::core::parser::language::Language;
use crate::core::types::{FunctionDef, FunctionKind, ValueType, VariableDef, VariableKind};

use super::{utils, Extraction, LanguageStrategy};

pub struct RustStrategy;

impl RustStrategy {
    pub fn new() -> Self {
        Self
    }

    fn parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_rust::language())
            .map_err(|_| ParseError::GrammarUnavailable {
                language: Language::Rust.to_string(),
            })?;
        Ok(parser)
    }
}

impl Default for RustStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageStrategy for RustStrategy {
    fn language(&self) -> Language {
        Language::Rust
    }

    fn try_structured(&self, source: &str, path: &str) -> Result<Extraction, ParseError> {
        let mut parser = self.parser()?;
        let tree = utils::parse_strict(&mut parser, source, path)?;

        let mut extraction = Extraction::default();
        walk(tree.root_node(), source, path, 0, &mut extraction);
        Ok(extraction)
    }

    fn try_structured_calls(
        &self,
        source: &str,
        path: &str,
        known: &HashSet<String>,
    ) -> Result<CallMap, ParseError> {
        let mut parser = self.parser()?;
        let tree = utils::parse_strict(&mut parser, source, path)?;

        let mut calls = CallMap::new();
        walk_calls(tree.root_node(), source, None, known, &mut calls);
        Ok(calls)
    }
}

fn walk(node: Node, source: &str, path: &str, depth: u32, out: &mut Extraction) {
    match node.kind() {
        "function_item" => {
            if let Some(name) = node.child_by_field_name("name") {
                let in_impl = inside_impl(&node);
                let line = utils::start_line(&node);
                out.functions.push(FunctionDef {
                    name: utils::node_text(&name, source).to_string(),
                    file: path.to_string(),
                    line,
                    code: utils::snippet(source, line, utils::end_line(&node)),
                    kind: if in_impl {
                        FunctionKind::Method
                    } else {
                        FunctionKind::Function
                    },
                    is_top_level: depth == 0,
                    is_class_method: in_impl,
                    params: params_of(&node, source),
                    returns_value: node
                        .child_by_field_name("return_type")
                        .map_or(false, |t| t.kind() != "unit_type"),
                    call_sites: Vec::new(),
                    total_calls: 0,
                    is_dead: false,
                });
            }
        }
        "let_declaration" => visit_let(&node, source, path, depth, out),
        "const_item" | "static_item" => {
            if let Some(name) = node.child_by_field_name("name") {
                out.variables.push(VariableDef {
                    name: utils::node_text(&name, source).to_string(),
                    file: path.to_string(),
                    line: utils::start_line(&node),
                    kind: if node.kind() == "const_item" {
                        VariableKind::Const
                    } else {
                        VariableKind::Unknown
                    },
                    value_type: node
                        .child_by_field_name("value")
                        .and_then(|v| infer_value_type(&v, source)),
                    is_top_level: depth == 0,
                    usage_lines: Vec::new(),
                    total_usages: 0,
                });
            }
        }
        _ => {}
    }

    let child_depth = match node.kind() {
        "function_item" | "closure_expression" | "impl_item" | "trait_item" => depth + 1,
        _ => depth,
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, path, child_depth, out);
    }
}

fn visit_let(node: &Node, source: &str, path: &str, depth: u32, out: &mut Extraction) {
    let Some(pattern) = node.child_by_field_name("pattern") else {
        return;
    };
    let name_node = match pattern.kind() {
        "identifier" => pattern,
        // `let mut x`
        "mut_pattern" => match pattern.named_child(0) {
            Some(inner) if inner.kind() == "identifier" => inner,
            _ => return,
        },
        _ => return,
    };

    let name = utils::node_text(&name_node, source).to_string();
    let value = node.child_by_field_name("value");
    let line = utils::start_line(node);

    out.variables.push(VariableDef {
        name: name.clone(),
        file: path.to_string(),
        line,
        kind: VariableKind::Let,
        value_type: value.and_then(|v| infer_value_type(&v, source)),
        is_top_level: depth == 0,
        usage_lines: Vec::new(),
        total_usages: 0,
    });

    if let Some(closure) = value.filter(|v| v.kind() == "closure_expression") {
        let params = closure
            .child_by_field_name("parameters")
            .map(|p| {
                let mut cursor = p.walk();
                p.named_children(&mut cursor)
                    .map(|param| pattern_name(&param, source))
                    .collect()
            })
            .unwrap_or_default();
        let returns_value = closure
            .child_by_field_name("body")
            .map_or(false, |body| body.kind() != "block" || block_has_tail(&body));
        out.functions.push(FunctionDef {
            name,
            file: path.to_string(),
            line,
            code: utils::snippet(source, line, utils::end_line(node)),
            kind: FunctionKind::Arrow,
            is_top_level: depth == 0,
            is_class_method: false,
            params,
            returns_value,
            call_sites: Vec::new(),
            total_calls: 0,
            is_dead: false,
        });
    }
}

/// A block whose last named child is an expression rather than a statement.
fn block_has_tail(block: &Node) -> bool {
    let count = block.named_child_count();
    if count == 0 {
        return false;
    }
    block
        .named_child(count - 1)
        .map_or(false, |last| {
            !last.kind().ends_with("_statement") && last.kind() != "let_declaration"
        })
}

fn inside_impl(node: &Node) -> bool {
    node.parent()
        .filter(|p| p.kind() == "declaration_list")
        .and_then(|list| list.parent())
        .map_or(false, |owner| matches!(owner.kind(), "impl_item" | "trait_item"))
}

fn params_of(func: &Node, source: &str) -> Vec<String> {
    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "self_parameter" => Some("self".to_string()),
            "parameter" => p
                .child_by_field_name("pattern")
                .map(|pat| pattern_name(&pat, source)),
            "variadic_parameter" => Some("...param".to_string()),
            "attribute_item" | "line_comment" | "block_comment" => None,
            _ => Some("param".to_string()),
        })
        .collect()
}

fn pattern_name(pattern: &Node, source: &str) -> String {
    match pattern.kind() {
        "identifier" | "self" => utils::node_text(pattern, source).to_string(),
        "mut_pattern" | "reference_pattern" => match pattern.named_child(0) {
            Some(inner) => pattern_name(&inner, source),
            None => "param".to_string(),
        },
        // Typed closure parameters wrap the pattern.
        "parameter" => pattern
            .child_by_field_name("pattern")
            .map(|p| pattern_name(&p, source))
            .unwrap_or_else(|| "param".to_string()),
        "tuple_pattern" | "slice_pattern" => "[...]".to_string(),
        "struct_pattern" | "tuple_struct_pattern" => "{...}".to_string(),
        _ => "param".to_string(),
    }
}

fn infer_value_type(node: &Node, source: &str) -> Option<ValueType> {
    match node.kind() {
        "string_literal" | "raw_string_literal" | "char_literal" => Some(ValueType::String),
        "integer_literal" | "float_literal" => Some(ValueType::Number),
        "boolean_literal" => Some(ValueType::Boolean),
        "array_expression" => Some(ValueType::Array),
        "tuple_expression" => Some(ValueType::Array),
        "struct_expression" => Some(ValueType::Instance),
        "closure_expression" => Some(ValueType::Function),
        "call_expression" => {
            let callee = node.child_by_field_name("function")?;
            // `Vec::new()`, `Foo::default()` build instances.
            if callee.kind() == "scoped_identifier" {
                Some(ValueType::Instance)
            } else {
                Some(ValueType::Call)
            }
        }
        "macro_invocation" => {
            let name = node.child_by_field_name("macro")?;
            match utils::node_text(&name, source) {
                "vec" => Some(ValueType::Array),
                "format" => Some(ValueType::String),
                _ => Some(ValueType::Call),
            }
        }
        _ => None,
    }
}

fn callee_name<'s>(callee: &Node, source: &'s str) -> Option<&'s str> {
    match callee.kind() {
        "identifier" => Some(utils::node_text(callee, source)),
        "field_expression" => callee
            .child_by_field_name("field")
            .map(|f| utils::node_text(&f, source)),
        "scoped_identifier" => callee
            .child_by_field_name("name")
            .map(|n| utils::node_text(&n, source)),
        "generic_function" => callee
            .child_by_field_name("function")
            .and_then(|f| callee_name(&f, source)),
        _ => None,
    }
}

fn walk_calls(
    node: Node,
    source: &str,
    context: Option<&str>,
    known: &HashSet<String>,
    calls: &mut CallMap,
) {
    let mut current = context;

    match node.kind() {
        "function_item" => {
            if let Some(name) = node.child_by_field_name("name") {
                current = Some(utils::node_text(&name, source));
            }
        }
        "let_declaration" => {
            let is_closure = node
                .child_by_field_name("value")
                .map_or(false, |v| v.kind() == "closure_expression");
            if let Some(pattern) = node.child_by_field_name("pattern") {
                if is_closure && pattern.kind() == "identifier" {
                    current = Some(utils::node_text(&pattern, source));
                }
            }
        }
        "call_expression" => {
            if let Some(callee) = node
                .child_by_field_name("function")
                .and_then(|f| callee_name(&f, source))
            {
                if known.contains(callee) {
                    record_call(calls, callee, utils::start_line(&node), current);
                }
            }
        }
        _ => {}
    }

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk_calls(child, source, current, known, calls);
    }
}
