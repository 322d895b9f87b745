//! Declaration trees: an arena of the declarations the extractor cares
//! about, with lexical parent links, plus the providers that build them.

pub mod error_tolerant;
pub mod swift;
pub mod traits;
pub mod tree;
pub mod type_ref;

pub use swift::SwiftTreeProvider;
pub use traits::SyntaxTreeProvider;
pub use tree::{
    Binding, CallSite, DeclKeyword, DeclTree, MemberKind, NodeId, NodeKind, ProtocolDecl,
    ProtocolMember, TypeDecl,
};
pub use type_ref::{canonical, TypeRef};
