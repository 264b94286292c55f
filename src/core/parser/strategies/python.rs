use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use crate::core::call_resolver::{record_call, CallMap};
use crate::core::errors::ParseError;
use crate::core::parser::language::Language;
use crate::core::types::{FunctionDef, FunctionKind, ValueType, VariableDef, VariableKind};

use super::{utils, Extraction, LanguageStrategy};

const FUNCTION_SCOPES: &[&str] = &["function_definition", "lambda"];

pub struct PythonStrategy;

impl PythonStrategy {
    pub fn new() -> Self {
        Self
    }

    fn parser(&self) -> Result<Parser, ParseError> {
        let mut parser = Parser::new();
        parser
            .set_language(tree_sitter_python::language())
            .map_err(|_| ParseError::GrammarUnavailable {
                language: Language::Python.to_string(),
            })?;
        Ok(parser)
    }
}

impl Default for PythonStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl LanguageStrategy for PythonStrategy {
    fn language(&self) -> Language {
        Language::Python
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

/// `depth` counts enclosing functions and classes.
fn walk(node: Node, source: &str, path: &str, depth: u32, out: &mut Extraction) {
    match node.kind() {
        "function_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                let in_class = enclosing_class_body(&node);
                let line = utils::start_line(&node);
                out.functions.push(FunctionDef {
                    name: utils::node_text(&name, source).to_string(),
                    file: path.to_string(),
                    line,
                    code: utils::snippet(source, line, utils::end_line(&node)),
                    kind: if in_class {
                        FunctionKind::Method
                    } else {
                        FunctionKind::Function
                    },
                    is_top_level: depth == 0,
                    is_class_method: in_class,
                    params: params_of(&node, source),
                    returns_value: node.child_by_field_name("body").map_or(false, |body| {
                        utils::returns_value(&body, "return_statement", FUNCTION_SCOPES)
                    }),
                    call_sites: Vec::new(),
                    total_calls: 0,
                    is_dead: false,
                });
            }
        }
        "assignment" => visit_assignment(&node, source, path, depth, out),
        _ => {}
    }

    let child_depth = match node.kind() {
        "function_definition" | "class_definition" | "lambda" => depth + 1,
        _ => depth,
    };

    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        walk(child, source, path, child_depth, out);
    }
}

fn visit_assignment(node: &Node, source: &str, path: &str, depth: u32, out: &mut Extraction) {
    let Some(left) = node.child_by_field_name("left") else {
        return;
    };
    if left.kind() != "identifier" {
        return;
    }

    let name = utils::node_text(&left, source).to_string();
    let right = node.child_by_field_name("right");
    let line = utils::start_line(node);

    out.variables.push(VariableDef {
        name: name.clone(),
        file: path.to_string(),
        line,
        kind: VariableKind::Unknown,
        value_type: right.and_then(|r| infer_value_type(&r, source)),
        is_top_level: depth == 0,
        usage_lines: Vec::new(),
        total_usages: 0,
    });

    // `name = lambda ...` is the closest Python gets to an arrow function.
    if let Some(lambda) = right.filter(|r| r.kind() == "lambda") {
        let params = lambda
            .child_by_field_name("parameters")
            .map(|p| param_list(&p, source))
            .unwrap_or_default();
        out.functions.push(FunctionDef {
            name,
            file: path.to_string(),
            line,
            code: utils::snippet(source, line, utils::end_line(node)),
            kind: FunctionKind::Arrow,
            is_top_level: depth == 0,
            is_class_method: false,
            params,
            returns_value: true,
            call_sites: Vec::new(),
            total_calls: 0,
            is_dead: false,
        });
    }
}

/// Is this definition directly inside a class body (decorators allowed)?
fn enclosing_class_body(node: &Node) -> bool {
    let mut parent = node.parent();
    if parent.map_or(false, |p| p.kind() == "decorated_definition") {
        parent = parent.and_then(|p| p.parent());
    }
    parent
        .filter(|p| p.kind() == "block")
        .and_then(|block| block.parent())
        .map_or(false, |owner| owner.kind() == "class_definition")
}

fn params_of(func: &Node, source: &str) -> Vec<String> {
    func.child_by_field_name("parameters")
        .map(|p| param_list(&p, source))
        .unwrap_or_default()
}

fn param_list(params: &Node, source: &str) -> Vec<String> {
    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter_map(|p| match p.kind() {
            "identifier" => Some(utils::node_text(&p, source).to_string()),
            "typed_parameter" => p
                .named_child(0)
                .map(|inner| param_name(&inner, source)),
            "default_parameter" | "typed_default_parameter" => p
                .child_by_field_name("name")
                .map(|n| format!("{}=?", utils::node_text(&n, source))),
            "list_splat_pattern" | "dictionary_splat_pattern" => Some(param_name(&p, source)),
            "comment" | "keyword_separator" | "positional_separator" => None,
            _ => Some("param".to_string()),
        })
        .collect()
}

fn param_name(node: &Node, source: &str) -> String {
    match node.kind() {
        "identifier" => utils::node_text(node, source).to_string(),
        "list_splat_pattern" | "dictionary_splat_pattern" => match node.named_child(0) {
            Some(inner) => format!("...{}", utils::node_text(&inner, source)),
            None => "...param".to_string(),
        },
        _ => "param".to_string(),
    }
}

fn infer_value_type(node: &Node, source: &str) -> Option<ValueType> {
    match node.kind() {
        "string" | "concatenated_string" => Some(ValueType::String),
        "integer" | "float" => Some(ValueType::Number),
        "true" | "false" => Some(ValueType::Boolean),
        "none" => Some(ValueType::Null),
        "list" | "tuple" | "list_comprehension" => Some(ValueType::Array),
        "dictionary" | "set" | "dictionary_comprehension" => Some(ValueType::Object),
        "lambda" => Some(ValueType::Function),
        "call" => {
            // Capitalised callees are constructors by convention.
            let callee = node.child_by_field_name("function")?;
            let name = callee_name(&callee, source)?;
            if name.starts_with(|c: char| c.is_ascii_uppercase()) {
                Some(ValueType::Instance)
            } else {
                Some(ValueType::Call)
            }
        }
        _ => None,
    }
}

fn callee_name<'s>(callee: &Node, source: &'s str) -> Option<&'s str> {
    match callee.kind() {
        "identifier" => Some(utils::node_text(callee, source)),
        "attribute" => callee
            .child_by_field_name("attribute")
            .map(|a| utils::node_text(&a, source)),
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
        "function_definition" => {
            if let Some(name) = node.child_by_field_name("name") {
                current = Some(utils::node_text(&name, source));
            }
        }
        "call" => {
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
