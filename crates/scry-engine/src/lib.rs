//! Parse execution for scry.
//!
//! Builds on the grammar analysis crate: compiles lookahead predicates
//! per decision point ([`lookahead`]), caches them ([`cache`]), and walks
//! rule bodies against a token stream ([`engine`] via the [`Parser`]
//! facade), building a CST as it goes.

mod builder;
mod engine;

pub mod cache;
pub mod errors;
pub mod lookahead;
pub mod parser;
pub mod stream;


pub use cache::{CacheKey, LookaheadCache};
pub use errors::{EngineError, ParseError, Result};
pub use lookahead::{AltPredicate, CompiledLookahead, EnterPredicate};
pub use parser::{ParseResult, Parser};
pub use stream::TokenStream;
