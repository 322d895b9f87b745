//! SyntaxTreeProvider trait: the contract every source-language front end implements.

use std::path::Path;

use ribbit_core::errors::ParseError;

use super::tree::DeclTree;

/// Turns a source file into a [`DeclTree`].
pub trait SyntaxTreeProvider: Send + Sync {
    /// File extensions this provider handles, without the leading dot.
    fn extensions(&self) -> &[&str];

    /// Lower in-memory source. `path` is only recorded for diagnostics.
    fn parse_source(&self, source: &[u8], path: &Path) -> Result<DeclTree, ParseError>;

    /// Read and lower a file.
    fn parse_file(&self, path: &Path) -> Result<DeclTree, ParseError> {
        let source = std::fs::read(path).map_err(|source| ParseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        self.parse_source(&source, path)
    }
}
