//! Core data structures for scry.
//!
//! Leaf value objects shared by grammar analysis and parse execution:
//! - tokens, token-type identities, and the token-type registry
//! - 6-field source spans with monotonic growth
//! - concrete syntax tree nodes with insertion-ordered children
//! - parser configuration
//!
//! This crate knows nothing about grammars or parsing; it only defines
//! the data the rest of the workspace exchanges.

mod config;
mod cst;
mod span;
mod token;

pub use config::ParserConfig;
pub use cst::{CstChild, CstNode};
pub use span::Span;
pub use token::{Token, TokenTypeId, TokenTypeRegistry};
