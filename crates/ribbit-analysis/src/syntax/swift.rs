//! Swift front end: tree-sitter-swift CST lowered into a [`DeclTree`].

use std::cell::RefCell;
use std::path::Path;

use ribbit_core::errors::ParseError;
use tree_sitter::{Node, Parser};

use super::error_tolerant::count_errors;
use super::traits::SyntaxTreeProvider;
use super::tree::{
    Binding, CallSite, DeclKeyword, DeclTree, MemberKind, NodeId, NodeKind, ProtocolDecl,
    ProtocolMember, TypeDecl,
};
use super::type_ref::{canonical, split_top_level, TypeRef};

thread_local! {
    /// One parser per worker thread; `Parser` is not `Sync`.
    static PARSER: RefCell<Option<Parser>> = const { RefCell::new(None) };
}

/// Lowers Swift sources with tree-sitter-swift.
pub struct SwiftTreeProvider;

impl Default for SwiftTreeProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SwiftTreeProvider {
    pub fn new() -> Self {
        Self
    }

    fn ts_language() -> tree_sitter::Language {
        tree_sitter_swift::LANGUAGE.into()
    }

    fn parse_tree(source: &[u8], path: &Path) -> Result<tree_sitter::Tree, ParseError> {
        PARSER.with(|cell| {
            let mut slot = cell.borrow_mut();
            if slot.is_none() {
                let mut parser = Parser::new();
                parser
                    .set_language(&Self::ts_language())
                    .map_err(|e| ParseError::Grammar {
                        message: e.to_string(),
                    })?;
                *slot = Some(parser);
            }
            let parser = slot.as_mut().ok_or_else(|| ParseError::Grammar {
                message: "parser not initialised".to_string(),
            })?;
            parser
                .parse(source, None)
                .ok_or_else(|| ParseError::TreeSitter {
                    path: path.to_path_buf(),
                    message: "parser produced no tree".to_string(),
                })
        })
    }
}

impl SyntaxTreeProvider for SwiftTreeProvider {
    fn extensions(&self) -> &[&str] {
        &["swift"]
    }

    fn parse_source(&self, source: &[u8], path: &Path) -> Result<DeclTree, ParseError> {
        let ts_tree = Self::parse_tree(source, path)?;
        let root = ts_tree.root_node();

        let mut tree = DeclTree::new(path);
        tree.error_count = count_errors(root);
        lower(root, source, &mut tree);
        Ok(tree)
    }
}

/// Pre-order walk with an explicit stack; node ids come out in document order.
fn lower(root: Node, source: &[u8], tree: &mut DeclTree) {
    let mut stack: Vec<(Node, NodeId)> = vec![(root, tree.root())];

    while let Some((node, parent)) = stack.pop() {
        let line = node.start_position().row as u32 + 1;
        let next_parent = match node.kind() {
            "class_declaration" => {
                let decl = lower_type_decl(node, source);
                tree.push(parent, NodeKind::TypeDecl(decl), line)
            }
            "protocol_declaration" => {
                let proto = lower_protocol(node, source);
                let id = tree.push(parent, NodeKind::Protocol(proto), line);
                lower_protocol_members(node, source, tree, id);
                continue;
            }
            "property_declaration" => match lower_binding(node, source) {
                Some(binding) => tree.push(parent, NodeKind::Binding(binding), line),
                None => parent,
            },
            "function_declaration" | "init_declaration" | "deinit_declaration" => {
                let name = node
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string())
                    .unwrap_or_else(|| node.kind().trim_end_matches("_declaration").to_string());
                tree.push(parent, NodeKind::Function { name }, line)
            }
            "lambda_literal" => tree.push(parent, NodeKind::Closure, line),
            "call_expression" => match callee_text(node, source) {
                Some(callee) => tree.push(parent, NodeKind::Call(CallSite { callee }), line),
                None => parent,
            },
            _ => parent,
        };

        let mut cursor = node.walk();
        let children: Vec<Node> = node.named_children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            stack.push((child, next_parent));
        }
    }
}

fn text<'s>(node: Node, source: &'s [u8]) -> &'s str {
    node.utf8_text(source).unwrap_or("")
}

fn body_of(node: Node) -> Option<Node> {
    if let Some(body) = node.child_by_field_name("body") {
        return Some(body);
    }
    let mut cursor = node.walk();
    let found = node
        .named_children(&mut cursor)
        .find(|c| c.kind().ends_with("_body"));
    found
}

/// Declaration text before its body.
fn header_text(node: Node, source: &[u8]) -> String {
    let end = body_of(node)
        .map(|b| b.start_byte())
        .unwrap_or_else(|| node.end_byte());
    let bytes = source.get(node.start_byte()..end).unwrap_or_default();
    String::from_utf8_lossy(bytes).trim().to_string()
}

fn decl_keyword(node: Node, source: &[u8]) -> DeclKeyword {
    let from_field = node
        .child_by_field_name("declaration_kind")
        .map(|n| text(n, source));
    let mut cursor = node.walk();
    let keyword = from_field.or_else(|| {
        node.children(&mut cursor)
            .map(|c| c.kind())
            .find(|k| matches!(*k, "class" | "struct" | "enum" | "actor" | "extension"))
    });
    match keyword {
        Some("struct") => DeclKeyword::Struct,
        Some("enum") => DeclKeyword::Enum,
        Some("actor") => DeclKeyword::Actor,
        Some("extension") => DeclKeyword::Extension,
        _ => DeclKeyword::Class,
    }
}

fn lower_type_decl(node: Node, source: &[u8]) -> TypeDecl {
    let keyword = decl_keyword(node, source);
    let header = header_text(node, source);
    let keyword_text = match keyword {
        DeclKeyword::Class => "class",
        DeclKeyword::Struct => "struct",
        DeclKeyword::Enum => "enum",
        DeclKeyword::Actor => "actor",
        DeclKeyword::Extension => "extension",
    };
    let name = node
        .child_by_field_name("name")
        .map(|n| canonical(text(n, source)))
        .filter(|n| !n.is_empty())
        .or_else(|| name_after_keyword(&header, keyword_text))
        .unwrap_or_default();
    let inheritance = inheritance_from_header(&header, keyword_text);
    TypeDecl {
        keyword,
        name,
        inheritance,
        header,
    }
}

fn lower_protocol(node: Node, source: &[u8]) -> ProtocolDecl {
    let header = header_text(node, source);
    let name = node
        .child_by_field_name("name")
        .map(|n| canonical(text(n, source)))
        .filter(|n| !n.is_empty())
        .or_else(|| name_after_keyword(&header, "protocol"))
        .unwrap_or_default();
    ProtocolDecl {
        name,
        inheritance: inheritance_from_header(&header, "protocol"),
    }
}

fn lower_protocol_members(node: Node, source: &[u8], tree: &mut DeclTree, parent: NodeId) {
    let Some(body) = body_of(node) else {
        return;
    };
    let mut cursor = body.walk();
    for member in body.named_children(&mut cursor) {
        let line = member.start_position().row as u32 + 1;
        let lowered = match member.kind() {
            "protocol_property_declaration" | "property_declaration" => {
                property_member(text(member, source))
            }
            "protocol_function_declaration" | "function_declaration" => {
                function_member(text(member, source))
            }
            _ => None,
        };
        if let Some(m) = lowered {
            tree.push(parent, NodeKind::ProtocolMember(m), line);
        }
    }
}

fn callee_text(node: Node, source: &[u8]) -> Option<String> {
    let callee = node
        .child_by_field_name("function")
        .or_else(|| node.named_child(0))?;
    let t = text(callee, source).trim();
    (!t.is_empty()).then(|| t.to_string())
}

fn lower_binding(node: Node, source: &[u8]) -> Option<Binding> {
    let full = text(node, source);
    let head = cut_at_top_level(full, &['=', '{']);
    let (pos, is_constant) = find_binding_keyword(head)?;
    let rest = head[pos + 3..].trim();
    let (name, declared_type) = split_name_and_type(rest);
    Some(Binding {
        is_constant,
        name,
        declared_type,
    })
}

fn property_member(full: &str) -> Option<ProtocolMember> {
    let head = cut_at_top_level(full, &['{']).trim();
    let (pos, _) = find_binding_keyword(head)?;
    let (name, declared_type) = split_name_and_type(head[pos + 3..].trim());
    Some(ProtocolMember {
        kind: MemberKind::Property,
        name,
        declared_type,
        canonical_text: canonical(head),
    })
}

fn function_member(full: &str) -> Option<ProtocolMember> {
    let head = cut_at_top_level(full, &['{']).trim();
    let pos = find_word(head, "func")?;
    let after = head[pos + 4..].trim_start();
    let name_end = after
        .find(|c: char| c == '(' || c == '<' || c.is_whitespace())
        .unwrap_or(after.len());
    let declared_type = head
        .rfind("->")
        .map(|arrow| canonical(&head[arrow + 2..]))
        .filter(|t| !t.is_empty());
    Some(ProtocolMember {
        kind: MemberKind::Function,
        name: after[..name_end].to_string(),
        declared_type,
        canonical_text: canonical(head),
    })
}

/// `name: Type` or `name`.
fn split_name_and_type(rest: &str) -> (String, Option<String>) {
    let parts = split_top_level(rest, ':');
    let name = parts.first().map(|n| canonical(n)).unwrap_or_default();
    let declared_type = parts
        .get(1..)
        .filter(|tail| !tail.is_empty())
        .map(|tail| canonical(&tail.join(":")))
        .filter(|t| !t.is_empty());
    (name, declared_type)
}

/// Earliest standalone `let` / `var`; `true` for `let`.
fn find_binding_keyword(head: &str) -> Option<(usize, bool)> {
    match (find_word(head, "let"), find_word(head, "var")) {
        (Some(l), Some(v)) if l < v => Some((l, true)),
        (_, Some(v)) => Some((v, false)),
        (Some(l), None) => Some((l, true)),
        (None, None) => None,
    }
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Byte offset of `word` as a whole word.
fn find_word(haystack: &str, word: &str) -> Option<usize> {
    let mut from = 0;
    while let Some(rel) = haystack[from..].find(word) {
        let start = from + rel;
        let end = start + word.len();
        let before_ok = haystack[..start]
            .chars()
            .next_back()
            .map_or(true, |c| !is_ident_char(c) && c != '.' && c != '@');
        let after_ok = haystack[end..].chars().next().map_or(true, |c| !is_ident_char(c));
        if before_ok && after_ok {
            return Some(start);
        }
        from = end;
    }
    None
}

/// Prefix of `text` before the first of `stops` outside brackets.
fn cut_at_top_level<'a>(text: &'a str, stops: &[char]) -> &'a str {
    let mut depth = 0i32;
    let mut prev = ' ';
    for (i, c) in text.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' if prev == '-' => {}
            '>' | ')' | ']' => depth -= 1,
            _ if depth == 0 && stops.contains(&c) => return &text[..i],
            _ => {}
        }
        prev = c;
    }
    text
}

fn name_after_keyword(header: &str, keyword: &str) -> Option<String> {
    let pos = find_word(header, keyword)?;
    let after = header[pos + keyword.len()..].trim_start();
    let end = after
        .find(|c: char| !(is_ident_char(c) || c == '.'))
        .unwrap_or(after.len());
    let name = &after[..end];
    (!name.is_empty()).then(|| name.to_string())
}

/// Parse `: A, B<C>` after the declared name, stopping at `where`.
fn inheritance_from_header(header: &str, keyword: &str) -> Vec<TypeRef> {
    let start = find_word(header, keyword).map_or(0, |p| p + keyword.len());
    let after_keyword = &header[start..];

    let mut depth = 0i32;
    let mut colon = None;
    for (i, c) in after_keyword.char_indices() {
        match c {
            '<' | '(' | '[' => depth += 1,
            '>' | ')' | ']' => depth -= 1,
            ':' if depth == 0 => {
                colon = Some(i);
                break;
            }
            _ => {}
        }
    }
    let Some(colon) = colon else {
        return Vec::new();
    };

    let clause = &after_keyword[colon + 1..];
    let clause = match find_word(clause, "where") {
        Some(w) => &clause[..w],
        None => clause,
    };
    split_top_level(clause, ',')
        .into_iter()
        .filter_map(TypeRef::parse)
        .collect()
}
