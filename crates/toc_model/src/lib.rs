//! TOC Model - Virtual bookmark tree structure and queries
//!
//! This crate provides the combined table-of-contents tree that merges the
//! outlines of several opened documents into one navigation forest. Items
//! live in an arena keyed by stable node IDs; parent, first-child and
//! next-sibling relations are stored as ID fields.

mod node_id;
mod node;
mod fragment;
mod tree;
mod error;
mod clone;
mod scope;
mod label;
mod pagination;
pub mod engine;
pub mod export;

pub use node_id::*;
pub use node::*;
pub use fragment::*;
pub use tree::*;
pub use error::*;
pub use scope::*;
pub use label::*;
pub use engine::{DocumentEngine, DocumentOpener, EngineError, StaticDocument, wrap_document};
