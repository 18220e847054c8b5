//! Key identifier clauses.
//!
//! A clause is a structured reference to a key: by name, by token reference,
//! by identifier value, or by carrying the key itself encrypted. The shapes
//! defined by XML-DSig, WS-Security and XML-Enc are understood here; anything
//! else is produced by a token handler and kept verbatim.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::error::{WsTrustError, WsTrustResult};
use crate::types::constants::{
    prefixes, value_types, BinaryEncoding, WSSE_NS, XMLDSIG_NS, XMLENC_NS,
};
use crate::xml::{QualifiedName, XmlCursor, XmlEmitter, XmlFragment};

const KEY_NAME: &str = "KeyName";
const KEY_INFO: &str = "KeyInfo";
const SECURITY_TOKEN_REFERENCE: &str = "SecurityTokenReference";
const REFERENCE: &str = "Reference";
const KEY_IDENTIFIER: &str = "KeyIdentifier";
const ENCRYPTED_KEY: &str = "EncryptedKey";
const ENCRYPTION_METHOD: &str = "EncryptionMethod";
const CIPHER_DATA: &str = "CipherData";
const CIPHER_VALUE: &str = "CipherValue";
const ALGORITHM: &str = "Algorithm";

/// A reference to a cryptographic key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyIdentifierClause {
    /// `ds:KeyName`.
    KeyName(String),

    /// `wsse:SecurityTokenReference/wsse:Reference`.
    Reference {
        /// Token URI, usually a `#id` fragment.
        uri: String,
        /// Optional token value type.
        value_type: Option<String>,
    },

    /// `wsse:SecurityTokenReference/wsse:KeyIdentifier`.
    KeyIdentifier {
        /// Value type URI, such as a thumbprint.
        value_type: String,
        /// Decoded identifier bytes.
        value: Vec<u8>,
    },

    /// `xenc:EncryptedKey`, a key carried encrypted for another key.
    EncryptedKey(EncryptedKeyClause),

    /// A handler-specific clause kept verbatim.
    Custom(XmlFragment),
}

impl KeyIdentifierClause {
    /// Creates an X.509 SHA-1 thumbprint identifier.
    #[must_use]
    pub fn thumbprint(thumbprint: Vec<u8>) -> Self {
        Self::KeyIdentifier {
            value_type: value_types::THUMBPRINT_SHA1.to_string(),
            value: thumbprint,
        }
    }

    /// Creates a local reference to a token by id.
    #[must_use]
    pub fn local_reference(id: &str) -> Self {
        Self::Reference {
            uri: format!("#{id}"),
            value_type: None,
        }
    }

    /// Returns true if the clause carries an encrypted key.
    #[must_use]
    pub const fn is_encrypted_key(&self) -> bool {
        matches!(self, Self::EncryptedKey(_))
    }
}

/// An encrypted key and the keys that can unwrap it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncryptedKeyClause {
    /// Key wrap algorithm URI.
    pub encryption_method: String,

    /// Wrapped key bytes.
    pub cipher_value: Vec<u8>,

    /// Candidate identifiers of the wrapping key, in document order.
    pub encrypting_key_identifier: Vec<KeyIdentifierClause>,
}

/// Returns true if `name` is a clause shape understood without a handler.
#[must_use]
pub fn is_standard_clause(name: &QualifiedName) -> bool {
    name.is(KEY_NAME, XMLDSIG_NS)
        || name.is(SECURITY_TOKEN_REFERENCE, WSSE_NS)
        || name.is(ENCRYPTED_KEY, XMLENC_NS)
}

/// Reads a standard clause shape.
///
/// `nested` reads the identifiers inside an encrypted key's `ds:KeyInfo`.
/// Returns `None` if the fragment is not a standard shape.
///
/// # Errors
///
/// Returns an error if a standard shape is malformed.
pub fn read_standard_clause(
    fragment: &XmlFragment,
    nested: &dyn Fn(&XmlFragment) -> WsTrustResult<KeyIdentifierClause>,
) -> WsTrustResult<Option<KeyIdentifierClause>> {
    let root = fragment.root();
    let mut cursor = fragment.cursor();
    if root.is(KEY_NAME, XMLDSIG_NS) {
        let name = cursor.read_element_text(KEY_NAME, XMLDSIG_NS)?;
        return Ok(Some(KeyIdentifierClause::KeyName(name.trim().to_string())));
    }
    if root.is(SECURITY_TOKEN_REFERENCE, WSSE_NS) {
        return read_security_token_reference(fragment, &mut cursor).map(Some);
    }
    if root.is(ENCRYPTED_KEY, XMLENC_NS) {
        return read_encrypted_key(&mut cursor, nested).map(Some);
    }
    Ok(None)
}

fn read_security_token_reference(
    fragment: &XmlFragment,
    cursor: &mut XmlCursor<'_>,
) -> WsTrustResult<KeyIdentifierClause> {
    cursor.read_start_element(SECURITY_TOKEN_REFERENCE, WSSE_NS)?;
    let clause = if cursor.is_start_element_named(REFERENCE, WSSE_NS)? {
        let start = cursor.read_start()?;
        let uri = start
            .attribute("URI")
            .ok_or_else(|| WsTrustError::malformed("URI attribute on wsse:Reference", "none"))?
            .to_string();
        let value_type = start.attribute("ValueType").map(str::to_string);
        cursor.read_text()?;
        cursor.read_end_element()?;
        KeyIdentifierClause::Reference { uri, value_type }
    } else if cursor.is_start_element_named(KEY_IDENTIFIER, WSSE_NS)? {
        let start = cursor.read_start()?;
        let value_type = start
            .attribute("ValueType")
            .ok_or_else(|| {
                WsTrustError::malformed("ValueType attribute on wsse:KeyIdentifier", "none")
            })?
            .to_string();
        let encoding = match start.attribute("EncodingType") {
            None => BinaryEncoding::Base64,
            Some(uri) => BinaryEncoding::from_uri(uri).ok_or_else(|| {
                WsTrustError::unsupported(format!("key identifier encoding {uri}"))
            })?,
        };
        let text = cursor.read_text()?;
        cursor.read_end_element()?;
        let value = decode(encoding, &text)?;
        KeyIdentifierClause::KeyIdentifier { value_type, value }
    } else {
        return Ok(KeyIdentifierClause::Custom(fragment.clone()));
    };

    if cursor.is_start_element()? {
        return Ok(KeyIdentifierClause::Custom(fragment.clone()));
    }
    cursor.read_end_element()?;
    Ok(clause)
}

fn read_encrypted_key(
    cursor: &mut XmlCursor<'_>,
    nested: &dyn Fn(&XmlFragment) -> WsTrustResult<KeyIdentifierClause>,
) -> WsTrustResult<KeyIdentifierClause> {
    cursor.read_start_element(ENCRYPTED_KEY, XMLENC_NS)?;

    let mut encryption_method = None;
    let mut identifiers = Vec::new();
    let mut cipher_value = None;

    while let Some(start) = cursor.peek_start()? {
        let name = start.name.clone();
        if name.is(ENCRYPTION_METHOD, XMLENC_NS) {
            let algorithm = start
                .attribute(ALGORITHM)
                .ok_or_else(|| {
                    WsTrustError::malformed("Algorithm on xenc:EncryptionMethod", "none")
                })?
                .to_string();
            cursor.skip_element()?;
            encryption_method = Some(algorithm);
        } else if name.is(KEY_INFO, XMLDSIG_NS) {
            cursor.read_start()?;
            while cursor.is_start_element()? {
                let clause = cursor.capture_element()?;
                identifiers.push(nested(&clause)?);
            }
            cursor.read_end_element()?;
        } else if name.is(CIPHER_DATA, XMLENC_NS) {
            cursor.read_start()?;
            let text = cursor.read_element_text(CIPHER_VALUE, XMLENC_NS)?;
            cursor.read_end_element()?;
            cipher_value = Some(decode(BinaryEncoding::Base64, &text)?);
        } else {
            cursor.skip_element()?;
        }
    }
    cursor.read_end_element()?;

    Ok(KeyIdentifierClause::EncryptedKey(EncryptedKeyClause {
        encryption_method: encryption_method
            .ok_or_else(|| WsTrustError::malformed("xenc:EncryptionMethod", "none"))?,
        cipher_value: cipher_value
            .ok_or_else(|| WsTrustError::malformed("xenc:CipherData", "none"))?,
        encrypting_key_identifier: identifiers,
    }))
}

/// Writes a clause using the standard shapes.
///
/// `nested` writes the identifiers inside an encrypted key's `ds:KeyInfo`.
///
/// # Errors
///
/// Returns an error if the emitter fails or a nested clause cannot be written.
pub fn write_standard_clause(
    emitter: &mut XmlEmitter,
    clause: &KeyIdentifierClause,
    nested: &dyn Fn(&mut XmlEmitter, &KeyIdentifierClause) -> WsTrustResult<()>,
) -> WsTrustResult<()> {
    match clause {
        KeyIdentifierClause::KeyName(name) => {
            emitter.element_string(prefixes::DS, KEY_NAME, XMLDSIG_NS, name)
        }
        KeyIdentifierClause::Reference { uri, value_type } => {
            emitter.start_element(prefixes::WSSE, SECURITY_TOKEN_REFERENCE, WSSE_NS)?;
            let mut attributes = vec![("URI", uri.as_str())];
            if let Some(value_type) = value_type {
                attributes.push(("ValueType", value_type.as_str()));
            }
            emitter.empty_element(prefixes::WSSE, REFERENCE, WSSE_NS, &attributes)?;
            emitter.end_element()
        }
        KeyIdentifierClause::KeyIdentifier { value_type, value } => {
            emitter.start_element(prefixes::WSSE, SECURITY_TOKEN_REFERENCE, WSSE_NS)?;
            emitter.start_element_with(
                prefixes::WSSE,
                KEY_IDENTIFIER,
                WSSE_NS,
                &[
                    ("ValueType", value_type.as_str()),
                    ("EncodingType", BinaryEncoding::Base64.uri()),
                ],
            )?;
            emitter.text(&STANDARD.encode(value))?;
            emitter.end_element()?;
            emitter.end_element()
        }
        KeyIdentifierClause::EncryptedKey(encrypted) => {
            emitter.start_element(prefixes::XENC, ENCRYPTED_KEY, XMLENC_NS)?;
            emitter.empty_element(
                prefixes::XENC,
                ENCRYPTION_METHOD,
                XMLENC_NS,
                &[(ALGORITHM, encrypted.encryption_method.as_str())],
            )?;
            if !encrypted.encrypting_key_identifier.is_empty() {
                emitter.start_element(prefixes::DS, KEY_INFO, XMLDSIG_NS)?;
                for identifier in &encrypted.encrypting_key_identifier {
                    nested(emitter, identifier)?;
                }
                emitter.end_element()?;
            }
            emitter.start_element(prefixes::XENC, CIPHER_DATA, XMLENC_NS)?;
            emitter.element_string(
                prefixes::XENC,
                CIPHER_VALUE,
                XMLENC_NS,
                &STANDARD.encode(&encrypted.cipher_value),
            )?;
            emitter.end_element()?;
            emitter.end_element()
        }
        KeyIdentifierClause::Custom(fragment) => {
            emitter.raw(fragment);
            Ok(())
        }
    }
}

/// Decodes binary element content.
///
/// # Errors
///
/// Returns an error if the text is not valid in the given encoding.
pub fn decode(encoding: BinaryEncoding, text: &str) -> WsTrustResult<Vec<u8>> {
    let compact: String = text.split_whitespace().collect();
    match encoding {
        BinaryEncoding::Base64 => Ok(STANDARD.decode(compact)?),
        BinaryEncoding::HexBinary => Ok(hex::decode(compact)?),
    }
}

/// Encodes binary element content.
#[must_use]
pub fn encode(encoding: BinaryEncoding, data: &[u8]) -> String {
    match encoding {
        BinaryEncoding::Base64 => STANDARD.encode(data),
        BinaryEncoding::HexBinary => hex::encode_upper(data),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn read(xml: &str) -> KeyIdentifierClause {
        fn nested(fragment: &XmlFragment) -> WsTrustResult<KeyIdentifierClause> {
            Ok(read_standard_clause(fragment, &nested)?
                .unwrap_or_else(|| KeyIdentifierClause::Custom(fragment.clone())))
        }
        let fragment = XmlFragment::parse(xml).unwrap();
        read_standard_clause(&fragment, &nested).unwrap().unwrap()
    }

    fn write(clause: &KeyIdentifierClause) -> String {
        fn nested(emitter: &mut XmlEmitter, clause: &KeyIdentifierClause) -> WsTrustResult<()> {
            write_standard_clause(emitter, clause, &nested)
        }
        let mut emitter = XmlEmitter::new();
        write_standard_clause(&mut emitter, clause, &nested).unwrap();
        emitter.into_string().unwrap()
    }

    #[test]
    fn key_name() {
        let clause = read(r#"<ds:KeyName xmlns:ds="http://www.w3.org/2000/09/xmldsig#"> signing-key </ds:KeyName>"#);
        assert_eq!(clause, KeyIdentifierClause::KeyName("signing-key".to_string()));
    }

    #[test]
    fn thumbprint_identifier_survives_rewrite() {
        let clause = KeyIdentifierClause::thumbprint(vec![0xde, 0xad, 0xbe, 0xef]);
        let xml = write(&clause);
        assert!(xml.contains("wsse:KeyIdentifier"));
        assert_eq!(read(&xml), clause);
    }

    #[test]
    fn hex_encoded_identifier() {
        let xml = format!(
            r#"<wsse:SecurityTokenReference xmlns:wsse="{WSSE_NS}"><wsse:KeyIdentifier ValueType="urn:vt" EncodingType="{}">0A0B</wsse:KeyIdentifier></wsse:SecurityTokenReference>"#,
            BinaryEncoding::HexBinary.uri()
        );
        assert_eq!(
            read(&xml),
            KeyIdentifierClause::KeyIdentifier {
                value_type: "urn:vt".to_string(),
                value: vec![0x0a, 0x0b],
            }
        );
    }

    #[test]
    fn unknown_reference_content_is_kept_verbatim() {
        let xml = format!(
            r#"<wsse:SecurityTokenReference xmlns:wsse="{WSSE_NS}"><x:Custom xmlns:x="urn:x"/></wsse:SecurityTokenReference>"#
        );
        assert!(matches!(read(&xml), KeyIdentifierClause::Custom(_)));
    }

    #[test]
    fn encrypted_key_with_nested_identifiers() {
        let clause = KeyIdentifierClause::EncryptedKey(EncryptedKeyClause {
            encryption_method: "http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p".to_string(),
            cipher_value: vec![1, 2, 3, 4],
            encrypting_key_identifier: vec![
                KeyIdentifierClause::KeyName("first".to_string()),
                KeyIdentifierClause::local_reference("cert-1"),
            ],
        });
        let xml = write(&clause);
        assert!(xml.starts_with("<xenc:EncryptedKey"));
        assert_eq!(read(&xml), clause);
    }

    #[test]
    fn encrypted_key_without_cipher_data_is_malformed() {
        fn nested(fragment: &XmlFragment) -> WsTrustResult<KeyIdentifierClause> {
            Ok(KeyIdentifierClause::Custom(fragment.clone()))
        }
        let xml = format!(
            r#"<xenc:EncryptedKey xmlns:xenc="{XMLENC_NS}"><xenc:EncryptionMethod Algorithm="urn:alg"/></xenc:EncryptedKey>"#
        );
        let fragment = XmlFragment::parse(&xml).unwrap();
        assert!(matches!(
            read_standard_clause(&fragment, &nested),
            Err(WsTrustError::MalformedWireFormat { .. })
        ));
    }

    #[test]
    fn non_standard_shape_is_not_claimed() {
        fn nested(fragment: &XmlFragment) -> WsTrustResult<KeyIdentifierClause> {
            Ok(KeyIdentifierClause::Custom(fragment.clone()))
        }
        let fragment = XmlFragment::parse(r#"<x:Other xmlns:x="urn:x"/>"#).unwrap();
        assert!(read_standard_clause(&fragment, &nested).unwrap().is_none());
        assert!(!is_standard_clause(fragment.root()));
    }
}
