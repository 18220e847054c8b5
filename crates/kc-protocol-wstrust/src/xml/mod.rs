//! XML plumbing: a forward-only cursor for reading, an emitter for writing,
//! and verbatim fragments for content this crate passes through untouched.

mod fragment;
mod reader;
mod writer;

pub use fragment::{QualifiedName, XmlFragment};
pub use reader::{parse_bool, StartElement, XmlAttribute, XmlCursor};
pub use writer::XmlEmitter;

use crate::error::{WsTrustError, WsTrustResult};

/// Checks that `value` is an absolute URI.
///
/// `what` names the element or attribute for the error message.
///
/// # Errors
///
/// Returns [`WsTrustError::MalformedWireFormat`] for relative or unparsable
/// references.
pub fn require_absolute_uri(what: &str, value: &str) -> WsTrustResult<()> {
    match url::Url::parse(value) {
        Ok(_) => Ok(()),
        Err(_) => Err(WsTrustError::malformed(
            format!("absolute URI in {what}"),
            value,
        )),
    }
}
