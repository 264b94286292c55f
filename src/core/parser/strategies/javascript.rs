use std::collections::HashSet;

use tree_sitter::{Node, Parser};

use crate::core::call_resolver::{record_call, CallMap};
use crate::core::errors::ParseError;
use crate::core::parser::language::Language;
use crate::core::types::{FunctionDef, FunctionKind, ValueType, VariableDef, VariableKind};

use super::{utils, Extraction, LanguageStrategy};

/// Node kinds that open a new function scope.
const FUNCTION_SCOPES: &[&str] = &[
    "function_declaration",
    "generator_function_declaration",
    "function",
    "function_expression",
    "generator_function",
    "arrow_function",
    "method_definition",
];

/// Function-valued initializers that turn a variable into a function definition.
const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
];

/// JavaScript and TypeScript through the tree-sitter TypeScript grammars.
///
/// The grammars accept type annotations, casts, generics and interface/type
/// declarations directly, so no type-stripping pass runs before the walk.
pub struct ScriptStrategy {
    language: Language,
}

impl ScriptStrategy {
    pub fn new(language: Language) -> Self {
        Self { language }
    }

    fn parser(&self) -> Result<Parser, ParseError> {
        let grammar = match self.language {
            Language::TypeScript => tree_sitter_typescript::language_typescript(),
            _ => tree_sitter_typescript::language_tsx(),
        };

        let mut parser = Parser::new();
        parser
            .set_language(grammar)
            .map_err(|_| ParseError::GrammarUnavailable {
                language: self.language.to_string(),
            })?;
        Ok(parser)
    }
}

impl LanguageStrategy for ScriptStrategy {
    fn language(&self) -> Language {
        self.language
    }

    fn try_structured(&self, source: &str, path: &str) -> Result<Extraction, ParseError> {
        let mut parser = self.parser()?;
        let tree = utils::parse_strict(&mut parser, source, path)?;

        let mut walker = DefinitionWalker {
            source,
            path,
            extraction: Extraction::default(),
        };
        walker.walk(tree.root_node(), 0);
        Ok(walker.extraction)
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

struct DefinitionWalker<'s> {
    source: &'s str,
    path: &'s str,
    extraction: Extraction,
}

impl<'s> DefinitionWalker<'s> {
    fn walk(&mut self, node: Node, scope: u32) {
        match node.kind() {
            "function_declaration" | "generator_function_declaration" => {
                if let Some(name) = node.child_by_field_name("name") {
                    let name = utils::node_text(&name, self.source).to_string();
                    self.push_function(
                        name,
                        &node,
                        &node,
                        FunctionKind::Function,
                        scope == 0,
                        false,
                    );
                }
            }
            "lexical_declaration" | "variable_declaration" => {
                self.visit_declaration(&node, scope);
            }
            "method_definition" => {
                if let Some(name) = method_name(&node, self.source) {
                    let is_class_method = node
                        .parent()
                        .map_or(false, |p| p.kind() == "class_body");
                    self.push_function(
                        name.to_string(),
                        &node,
                        &node,
                        FunctionKind::Method,
                        false,
                        is_class_method,
                    );
                }
            }
            _ => {}
        }

        let child_scope = if FUNCTION_SCOPES.contains(&node.kind()) {
            scope + 1
        } else {
            scope
        };

        let mut cursor = node.walk();
        for child in node.children(&mut cursor) {
            self.walk(child, child_scope);
        }
    }

    fn visit_declaration(&mut self, node: &Node, scope: u32) {
        let kind = node
            .child(0)
            .map(|keyword| VariableKind::from_keyword(keyword.kind()))
            .unwrap_or(VariableKind::Unknown);

        let mut cursor = node.walk();
        for declarator in node.named_children(&mut cursor) {
            if declarator.kind() != "variable_declarator" {
                continue;
            }
            let Some(name_node) = declarator.child_by_field_name("name") else {
                continue;
            };
            // Destructuring declarations carry no single name.
            if name_node.kind() != "identifier" {
                continue;
            }
            let name = utils::node_text(&name_node, self.source).to_string();
            let value = declarator.child_by_field_name("value").map(unwrap_expression);

            self.extraction.variables.push(VariableDef {
                name: name.clone(),
                file: self.path.to_string(),
                line: utils::start_line(&declarator),
                kind,
                value_type: value.and_then(|v| infer_value_type(&v)),
                is_top_level: scope == 0,
                usage_lines: Vec::new(),
                total_usages: 0,
            });

            if let Some(value) = value {
                if FUNCTION_VALUES.contains(&value.kind()) {
                    let fn_kind = if value.kind() == "arrow_function" {
                        FunctionKind::Arrow
                    } else {
                        FunctionKind::Function
                    };
                    self.push_function(name, &declarator, &value, fn_kind, scope == 0, false);
                }
            }
        }
    }

    /// `span` bounds the snippet and line, `func` carries params and body.
    fn push_function(
        &mut self,
        name: String,
        span: &Node,
        func: &Node,
        kind: FunctionKind,
        is_top_level: bool,
        is_class_method: bool,
    ) {
        let line = utils::start_line(span);
        self.extraction.functions.push(FunctionDef {
            name,
            file: self.path.to_string(),
            line,
            code: utils::snippet(self.source, line, utils::end_line(span)),
            kind,
            is_top_level,
            is_class_method,
            params: params_of(func, self.source),
            returns_value: function_returns_value(func),
            call_sites: Vec::new(),
            total_calls: 0,
            is_dead: false,
        });
    }
}

fn method_name<'s>(node: &Node, source: &'s str) -> Option<&'s str> {
    let name = node.child_by_field_name("name")?;
    match name.kind() {
        "property_identifier" | "private_property_identifier" | "identifier" => {
            Some(utils::node_text(&name, source))
        }
        _ => None,
    }
}

/// Look through casts and parentheses to the expression that shapes the value.
fn unwrap_expression(node: Node) -> Node {
    match node.kind() {
        "as_expression" | "satisfies_expression" | "non_null_expression"
        | "parenthesized_expression" => match node.named_child(0) {
            Some(inner) => unwrap_expression(inner),
            None => node,
        },
        _ => node,
    }
}

fn infer_value_type(node: &Node) -> Option<ValueType> {
    match node.kind() {
        "string" | "template_string" => Some(ValueType::String),
        "number" => Some(ValueType::Number),
        "true" | "false" => Some(ValueType::Boolean),
        "null" => Some(ValueType::Null),
        "regex" => Some(ValueType::Object),
        "array" => Some(ValueType::Array),
        "object" => Some(ValueType::Object),
        "arrow_function" | "function" | "function_expression" | "generator_function" => {
            Some(ValueType::Function)
        }
        "call_expression" => Some(ValueType::Call),
        "new_expression" => Some(ValueType::Instance),
        _ => None,
    }
}

fn params_of(func: &Node, source: &str) -> Vec<String> {
    if let Some(single) = func.child_by_field_name("parameter") {
        return vec![pattern_to_string(&single, source)];
    }

    let Some(params) = func.child_by_field_name("parameters") else {
        return Vec::new();
    };

    let mut cursor = params.walk();
    params
        .named_children(&mut cursor)
        .filter(|p| p.kind() != "comment")
        .map(|p| param_to_string(&p, source))
        .collect()
}

fn param_to_string(param: &Node, source: &str) -> String {
    match param.kind() {
        "required_parameter" | "optional_parameter" => {
            let base = param
                .child_by_field_name("pattern")
                .map(|p| pattern_to_string(&p, source))
                .unwrap_or_else(|| "param".to_string());
            if param.child_by_field_name("value").is_some() {
                format!("{base}=?")
            } else {
                base
            }
        }
        _ => pattern_to_string(param, source),
    }
}

fn pattern_to_string(pattern: &Node, source: &str) -> String {
    match pattern.kind() {
        "identifier" | "this" => utils::node_text(pattern, source).to_string(),
        "rest_pattern" => match pattern.named_child(0) {
            Some(inner) => format!("...{}", pattern_to_string(&inner, source)),
            None => "...param".to_string(),
        },
        "assignment_pattern" => match pattern.child_by_field_name("left") {
            Some(left) => format!("{}=?", pattern_to_string(&left, source)),
            None => "param".to_string(),
        },
        "object_pattern" => "{...}".to_string(),
        "array_pattern" => "[...]".to_string(),
        _ => "param".to_string(),
    }
}

fn function_returns_value(func: &Node) -> bool {
    let Some(body) = func.child_by_field_name("body") else {
        return false;
    };
    // Expression-bodied arrows always yield their expression.
    if func.kind() == "arrow_function" && body.kind() != "statement_block" {
        return true;
    }
    utils::returns_value(&body, "return_statement", FUNCTION_SCOPES)
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
        "function_declaration" | "generator_function_declaration" => {
            if let Some(name) = node.child_by_field_name("name") {
                current = Some(utils::node_text(&name, source));
            }
        }
        "method_definition" => {
            if let Some(name) = method_name(&node, source) {
                current = Some(name);
            }
        }
        "variable_declarator" => {
            let name = node.child_by_field_name("name");
            let value = node.child_by_field_name("value").map(unwrap_expression);
            if let (Some(name), Some(value)) = (name, value) {
                if name.kind() == "identifier" && FUNCTION_VALUES.contains(&value.kind()) {
                    current = Some(utils::node_text(&name, source));
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

/// `foo()` resolves to `foo`, `obj.method()` and `obj["method"]()` to `method`.
fn callee_name<'s>(callee: &Node, source: &'s str) -> Option<&'s str> {
    match callee.kind() {
        "identifier" => Some(utils::node_text(callee, source)),
        "member_expression" => callee
            .child_by_field_name("property")
            .map(|p| utils::node_text(&p, source)),
        "subscript_expression" => {
            let index = callee.child_by_field_name("index")?;
            if index.kind() == "string" {
                Some(utils::node_text(&index, source).trim_matches(|c| c == '"' || c == '\''))
            } else {
                None
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn extract(source: &str, path: &str) -> Extraction {
        ScriptStrategy::new(Language::from_path(path))
            .try_structured(source, path)
            .expect("source should parse")
    }

    #[test]
    fn test_extracts_declarations_arrows_and_methods() {
        let source = r#"
export function load(url, { retries }, ...rest) {
  return fetch(url);
}

const double = (x) => x * 2;

class Store {
  save(item = null) {
    this.items.push(item);
  }
}
"#;
        let extraction = extract(source, "src/store.js");
        let names: Vec<_> = extraction.functions.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["load", "double", "save"]);

        let load = &extraction.functions[0];
        assert_eq!(load.line, 2);
        assert_eq!(load.kind, FunctionKind::Function);
        assert!(load.is_top_level);
        assert!(load.returns_value);
        assert_eq!(load.params, vec!["url", "{...}", "...rest"]);

        let double = &extraction.functions[1];
        assert_eq!(double.kind, FunctionKind::Arrow);
        assert!(double.returns_value);

        let save = &extraction.functions[2];
        assert_eq!(save.kind, FunctionKind::Method);
        assert!(save.is_class_method);
        assert!(!save.is_top_level);
        assert!(!save.returns_value);
        assert_eq!(save.params, vec!["item=?"]);
    }

    #[test]
    fn test_nested_functions_are_not_top_level() {
        let source = "function outer() {\n  function inner() { return 1; }\n  return inner;\n}\n";
        let extraction = extract(source, "a.js");
        let inner = extraction
            .functions
            .iter()
            .find(|f| f.name == "inner")
            .unwrap();
        assert!(!inner.is_top_level);
        assert!(extraction.functions.iter().find(|f| f.name == "outer").unwrap().is_top_level);
    }

    #[test]
    fn test_typescript_annotations_parse_without_stripping() {
        let source = r#"
interface Options { verbose: boolean }
type Id = string;

export const format = (value: unknown, opts?: Options): string => String(value) as string;

export async function fetchUser(id: Id): Promise<void> {
  await api.get<User>(id);
}
"#;
        let extraction = extract(source, "src/format.ts");
        let format = extraction.functions.iter().find(|f| f.name == "format").unwrap();
        assert_eq!(format.params, vec!["value", "opts"]);
        assert!(format.returns_value);

        let fetch_user = extraction.functions.iter().find(|f| f.name == "fetchUser").unwrap();
        assert!(!fetch_user.returns_value);
    }

    #[test]
    fn test_variable_kinds_and_value_types() {
        let source = "const a = 'x';\nlet b = [1];\nvar c = new Map();\nconst d = build();\nconst { e } = obj;\n";
        let extraction = extract(source, "vars.js");
        let summary: Vec<_> = extraction
            .variables
            .iter()
            .map(|v| (v.name.as_str(), v.kind, v.value_type))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("a", VariableKind::Const, Some(ValueType::String)),
                ("b", VariableKind::Let, Some(ValueType::Array)),
                ("c", VariableKind::Var, Some(ValueType::Instance)),
                ("d", VariableKind::Const, Some(ValueType::Call)),
            ]
        );
    }

    #[test]
    fn test_syntax_error_is_reported() {
        let result =
            ScriptStrategy::new(Language::JavaScript).try_structured("function (", "bad.js");
        assert!(matches!(result, Err(ParseError::Syntax { .. })));
    }

    #[test]
    fn test_calls_attribute_enclosing_function() {
        let source = "import { helper } from './a';\nhelper();\nfunction run() {\n  util.helper();\n  other();\n}\n";
        let known: HashSet<String> = ["helper".to_string()].into_iter().collect();
        let calls = ScriptStrategy::new(Language::JavaScript)
            .try_structured_calls(source, "b.js", &known)
            .unwrap();

        let info = &calls["helper"];
        assert_eq!(info.total_calls, 2);
        assert_eq!(info.call_sites[0].line, 2);
        assert_eq!(info.call_sites[0].caller, None);
        assert_eq!(info.call_sites[1].line, 4);
        assert_eq!(info.call_sites[1].caller.as_deref(), Some("run"));
        assert!(!calls.contains_key("other"));
    }
}
