//! Token embedding.
//!
//! Embedded tokens are never parsed by the codec itself. They are captured
//! verbatim as [`SecurityTokenElement`]s and handed to pluggable
//! [`SecurityTokenHandler`]s on demand.

mod element;
mod handler;

pub use element::SecurityTokenElement;
pub use handler::{
    HandlerCollectionManager, SecurityToken, SecurityTokenHandler, TokenHandlerCollection,
    TokenHandlerUsage,
};
