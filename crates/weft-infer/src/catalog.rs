//! Part catalog: reusable pin declarations for stamping out nodes.
//!
//! The catalog is a plain value passed to whoever builds boards. There is
//! no process-wide registry; two catalogs never observe each other.

use std::fmt;

use rustc_hash::FxHashMap;

use crate::board::{Board, BoardError, PinDir};

/// One pin declaration on a part.
#[derive(Debug, Clone)]
pub struct PinDecl {
    pub name: String,
    pub dir: PinDir,
    pub spec: String,
}

impl PinDecl {
    pub fn new(name: impl Into<String>, dir: PinDir, spec: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            dir,
            spec: spec.into(),
        }
    }

    /// An input pin with the given type spec.
    pub fn input(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, PinDir::In, spec)
    }

    /// An output pin with the given type spec.
    pub fn output(name: impl Into<String>, spec: impl Into<String>) -> Self {
        Self::new(name, PinDir::Out, spec)
    }
}

/// Why a catalog operation failed.
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogError {
    DuplicatePart(String),
    UnknownPart(String),
    Board(BoardError),
}

impl fmt::Display for CatalogError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicatePart(kind) => write!(f, "part `{kind}` is already registered"),
            Self::UnknownPart(kind) => write!(f, "unknown part `{kind}`"),
            Self::Board(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Board(err) => Some(err),
            _ => None,
        }
    }
}

impl From<BoardError> for CatalogError {
    fn from(err: BoardError) -> Self {
        Self::Board(err)
    }
}

/// A registry of part kinds and their pin declarations.
#[derive(Debug, Clone, Default)]
pub struct PartCatalog {
    parts: FxHashMap<String, Vec<PinDecl>>,
}

impl PartCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a part kind. Kinds are registered once.
    pub fn register(&mut self, kind: &str, pins: Vec<PinDecl>) -> Result<(), CatalogError> {
        if self.parts.contains_key(kind) {
            return Err(CatalogError::DuplicatePart(kind.to_string()));
        }
        self.parts.insert(kind.to_string(), pins);
        Ok(())
    }

    /// The pin declarations for a kind.
    pub fn pins(&self, kind: &str) -> Option<&[PinDecl]> {
        self.parts.get(kind).map(Vec::as_slice)
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.parts.keys().cloned().collect();
        kinds.sort();
        kinds
    }

    /// Stamp a node of the given kind onto a board.
    pub fn instantiate(
        &self,
        board: &mut Board,
        kind: &str,
        node_name: &str,
    ) -> Result<(), CatalogError> {
        let pins = self
            .pins(kind)
            .ok_or_else(|| CatalogError::UnknownPart(kind.to_string()))?;
        board.add_node(node_name, pins.to_vec())?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> PartCatalog {
        let mut catalog = PartCatalog::new();
        catalog
            .register(
                "double",
                vec![PinDecl::input("in", "$T"), PinDecl::output("out", "[]$T")],
            )
            .unwrap();
        catalog
    }

    #[test]
    fn instantiate_stamps_the_declared_pins() {
        let catalog = catalog();
        let mut board = Board::new();
        catalog.instantiate(&mut board, "double", "d1").unwrap();
        catalog.instantiate(&mut board, "double", "d2").unwrap();

        let node = board.node("d1").unwrap();
        assert_eq!(node.pin("in").unwrap().spec, "$T");
        assert_eq!(node.pin("out").unwrap().spec, "[]$T");
        assert!(board.node("d2").is_some());
    }

    #[test]
    fn unknown_and_duplicate_kinds_are_rejected() {
        let mut catalog = catalog();
        let mut board = Board::new();
        assert_eq!(
            catalog.instantiate(&mut board, "missing", "m").unwrap_err(),
            CatalogError::UnknownPart("missing".to_string())
        );
        assert_eq!(
            catalog.register("double", vec![]).unwrap_err(),
            CatalogError::DuplicatePart("double".to_string())
        );
    }

    #[test]
    fn board_rejections_surface_through_the_catalog() {
        let catalog = catalog();
        let mut board = Board::new();
        catalog.instantiate(&mut board, "double", "d").unwrap();
        assert_eq!(
            catalog.instantiate(&mut board, "double", "d").unwrap_err(),
            CatalogError::Board(BoardError::DuplicateNode("d".to_string()))
        );
    }

    #[test]
    fn kinds_are_sorted() {
        let mut catalog = catalog();
        catalog.register("adder", vec![]).unwrap();
        assert_eq!(catalog.kinds(), vec!["adder", "double"]);
    }
}
