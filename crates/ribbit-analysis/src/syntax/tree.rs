//! Arena-backed declaration tree with lexical parent links.

use std::path::{Path, PathBuf};

use serde::Serialize;

use super::type_ref::TypeRef;

/// Index of a node inside its [`DeclTree`].
///
/// Ids are assigned in document order, so comparing two ids of the same tree
/// compares their source positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

/// Swift keyword that introduced a type declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeclKeyword {
    Class,
    Struct,
    Enum,
    Actor,
    Extension,
}

/// A `class` / `struct` / `enum` / `actor` / `extension` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDecl {
    pub keyword: DeclKeyword,
    /// Declared name, or the extended type's name for extensions.
    pub name: String,
    /// Inheritance clause in source order.
    pub inheritance: Vec<TypeRef>,
    /// Source text from the start of the declaration up to its body.
    pub header: String,
}

impl TypeDecl {
    /// The first listed base type, if any.
    pub fn primary_base(&self) -> Option<&TypeRef> {
        self.inheritance.first()
    }

    pub fn is_extension(&self) -> bool {
        self.keyword == DeclKeyword::Extension
    }
}

/// A `protocol` declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolDecl {
    pub name: String,
    pub inheritance: Vec<TypeRef>,
}

impl ProtocolDecl {
    /// True when any inherited type mentions `marker`.
    pub fn inherits_containing(&self, marker: &str) -> bool {
        self.inheritance
            .iter()
            .any(|t| t.path_text().contains(marker))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MemberKind {
    Property,
    Function,
}

/// A requirement listed in a protocol body.
#[derive(Debug, Clone, PartialEq)]
pub struct ProtocolMember {
    pub kind: MemberKind,
    pub name: String,
    /// Canonical declared type of a property, or the return type of a function.
    pub declared_type: Option<String>,
    /// Whitespace-free member text without accessor blocks.
    pub canonical_text: String,
}

/// A `let` / `var` binding, stored or computed.
#[derive(Debug, Clone, PartialEq)]
pub struct Binding {
    pub is_constant: bool,
    pub name: String,
    /// Canonical type annotation, when the binding has one.
    pub declared_type: Option<String>,
}

/// A call expression. Swift initializers are calls too.
#[derive(Debug, Clone, PartialEq)]
pub struct CallSite {
    /// Text of the called expression, e.g. `FooBuilder` or `super.init`.
    pub callee: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    SourceFile,
    TypeDecl(TypeDecl),
    Protocol(ProtocolDecl),
    ProtocolMember(ProtocolMember),
    Binding(Binding),
    Function { name: String },
    Closure,
    Call(CallSite),
}

#[derive(Debug, Clone)]
pub struct Node {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// 1-based source line.
    pub line: u32,
}

/// The declarations of one source file.
///
/// Only nodes the extractor reasons about are kept; everything in between
/// (statements, bodies, expressions other than calls) is folded away, so a
/// parent link is always one semantic step.
#[derive(Debug, Clone)]
pub struct DeclTree {
    path: PathBuf,
    nodes: Vec<Node>,
    /// ERROR / MISSING nodes reported by the parser.
    pub error_count: u32,
}

impl DeclTree {
    /// Create a tree holding only its `SourceFile` root.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            nodes: vec![Node {
                kind: NodeKind::SourceFile,
                parent: None,
                children: Vec::new(),
                line: 1,
            }],
            error_count: 0,
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append a node under `parent`. Returns the new id.
    pub fn push(&mut self, parent: NodeId, kind: NodeKind, line: u32) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent: Some(parent),
            children: Vec::new(),
            line,
        });
        self.nodes[parent.index()].children.push(id);
        id
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }

    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.index()]
    }

    pub fn kind(&self, id: NodeId) -> &NodeKind {
        &self.nodes[id.index()].kind
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes[id.index()].parent
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.nodes[id.index()].children
    }

    /// All node ids in document order.
    pub fn ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Nearest ancestor of `id` matching `predicate`, looking at most `limit`
    /// parent links up. Running out of hops is "not found".
    pub fn enclosing<F>(&self, id: NodeId, limit: usize, predicate: F) -> Option<NodeId>
    where
        F: Fn(&NodeKind) -> bool,
    {
        let mut current = self.parent(id);
        let mut hops = 0;
        while let Some(node) = current {
            if hops == limit {
                return None;
            }
            if predicate(self.kind(node)) {
                return Some(node);
            }
            current = self.parent(node);
            hops += 1;
        }
        None
    }

    /// Nearest enclosing type declaration within `limit` hops.
    pub fn enclosing_type_decl(&self, id: NodeId, limit: usize) -> Option<(NodeId, &TypeDecl)> {
        let found = self.enclosing(id, limit, |k| matches!(k, NodeKind::TypeDecl(_)))?;
        match self.kind(found) {
            NodeKind::TypeDecl(decl) => Some((found, decl)),
            _ => None,
        }
    }

    /// Nearest binding above `id`, stopping at the first type declaration.
    pub fn enclosing_binding(&self, id: NodeId, limit: usize) -> Option<&Binding> {
        let found = self.enclosing(id, limit, |k| {
            matches!(k, NodeKind::Binding(_) | NodeKind::TypeDecl(_))
        })?;
        match self.kind(found) {
            NodeKind::Binding(binding) => Some(binding),
            _ => None,
        }
    }

    /// Direct children of `id` that are bindings.
    pub fn member_bindings(&self, id: NodeId) -> impl Iterator<Item = &Binding> + '_ {
        self.children(id).iter().filter_map(|c| match self.kind(*c) {
            NodeKind::Binding(b) => Some(b),
            _ => None,
        })
    }
}
