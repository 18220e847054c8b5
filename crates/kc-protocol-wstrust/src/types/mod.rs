//! WS-Trust message model and value objects.
//!
//! Everything here is version-neutral: the same structs are read from and
//! written to every protocol version. Wire spellings are resolved by
//! [`crate::version::TrustAdapter`].

mod binary_exchange;
mod claims;
pub mod constants;
mod context;
mod endpoint;
mod extension;
mod lifetime;
mod request;
mod response;
mod status;
mod use_key;

pub use binary_exchange::BinaryExchange;
pub use claims::{RequestClaim, RequestClaimCollection};
pub use constants::{BinaryEncoding, ComputedKeyAlgorithm, KeyType, RequestType};
pub use context::{AdditionalContext, ContextItem};
pub use endpoint::{EndpointReference, Participants};
pub use extension::ExtensionProperties;
pub use lifetime::{format_instant, parse_instant, Lifetime};
pub use request::{RequestSecurityToken, Renewing, MAX_SECONDARY_PARAMETERS_DEPTH};
pub use response::{
    RequestSecurityTokenResponse, RequestSecurityTokenResponseCollection, RequestedProofToken,
};
pub use status::Status;
pub use use_key::UseKey;
