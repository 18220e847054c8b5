//! Key material: identifier clauses, the resolver seam and protected keys.

mod clause;
mod protected_key;
mod resolver;

pub use clause::{
    decode, encode, is_standard_clause, read_standard_clause, write_standard_clause,
    EncryptedKeyClause, KeyIdentifierClause,
};
pub use protected_key::{
    read_protected_key, write_protected_key, Entropy, ProtectedKey, WrappingCredentials,
};
pub use resolver::{EmptyTokenResolver, SecurityKey, StaticTokenResolver, TokenResolver};
