//! RequestSecurityTokenResponse reading and writing.

use super::elements::{
    peek_name, read_endpoint_wrapper, reject, write_endpoint_wrapper, write_extensions, Codec,
};
use crate::error::WsTrustResult;
use crate::token::TokenHandlerUsage;
use crate::types::constants::{attributes, elements, prefixes, WSP_NS};
use crate::types::RequestSecurityTokenResponse;
use crate::xml::{QualifiedName, XmlCursor, XmlEmitter};

/// Reads a whole `RequestSecurityTokenResponse` element.
pub(crate) fn read_response(
    cursor: &mut XmlCursor<'_>,
    codec: &Codec<'_>,
) -> WsTrustResult<RequestSecurityTokenResponse> {
    let start = cursor
        .read_start_element(elements::REQUEST_SECURITY_TOKEN_RESPONSE, codec.ns())
        .map_err(reject)?;
    let mut rstr = RequestSecurityTokenResponse {
        context: start.attribute(attributes::CONTEXT).map(str::to_string),
        ..RequestSecurityTokenResponse::default()
    };
    while let Some(name) = peek_name(cursor)? {
        tracing::trace!(element = %name, version = %codec.version(), "reading response element");
        read_response_element(cursor, &name, &mut rstr, codec)?;
    }
    cursor.read_end_element()?;
    Ok(rstr)
}

fn read_response_element(
    cursor: &mut XmlCursor<'_>,
    name: &QualifiedName,
    rstr: &mut RequestSecurityTokenResponse,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    if name.is(elements::APPLIES_TO, WSP_NS) {
        rstr.applies_to = Some(read_endpoint_wrapper(cursor, elements::APPLIES_TO, WSP_NS)?);
        return Ok(());
    }
    if name.namespace != codec.ns() {
        return codec.read_unknown(cursor, &mut rstr.extensions);
    }

    match name.local.as_str() {
        elements::ENTROPY => rstr.entropy = Some(codec.read_entropy(cursor)?),
        elements::KEY_SIZE => rstr.key_size_in_bits = Some(codec.read_key_size(cursor)?),
        elements::LIFETIME => rstr.lifetime = Some(codec.read_lifetime(cursor)?),
        elements::REQUESTED_SECURITY_TOKEN => {
            rstr.requested_security_token = Some(codec.read_token_element(
                cursor,
                elements::REQUESTED_SECURITY_TOKEN,
                codec.ns(),
                TokenHandlerUsage::Default,
            )?);
        }
        elements::REQUESTED_PROOF_TOKEN => {
            rstr.requested_proof_token = Some(codec.read_proof_token(cursor)?)
        }
        elements::REQUESTED_ATTACHED_REFERENCE => {
            rstr.requested_attached_reference =
                Some(codec.read_clause_element(cursor, elements::REQUESTED_ATTACHED_REFERENCE)?);
        }
        elements::REQUESTED_UNATTACHED_REFERENCE => {
            rstr.requested_unattached_reference =
                Some(codec.read_clause_element(cursor, elements::REQUESTED_UNATTACHED_REFERENCE)?);
        }
        elements::SIGN_WITH => rstr.sign_with = Some(codec.read_uri(cursor, elements::SIGN_WITH)?),
        elements::ENCRYPT_WITH => {
            rstr.encrypt_with = Some(codec.read_uri(cursor, elements::ENCRYPT_WITH)?)
        }
        elements::TOKEN_TYPE => {
            rstr.token_type = Some(codec.read_uri(cursor, elements::TOKEN_TYPE)?)
        }
        elements::REQUEST_TYPE => rstr.request_type = Some(codec.read_request_type(cursor)?),
        elements::KEY_TYPE => rstr.key_type = Some(codec.read_key_type(cursor)?),
        elements::AUTHENTICATION_TYPE => {
            rstr.authentication_type = Some(codec.read_uri(cursor, elements::AUTHENTICATION_TYPE)?);
        }
        elements::ENCRYPTION_ALGORITHM => {
            rstr.encryption_algorithm =
                Some(codec.read_uri(cursor, elements::ENCRYPTION_ALGORITHM)?);
        }
        elements::CANONICALIZATION_ALGORITHM => {
            rstr.canonicalization_algorithm =
                Some(codec.read_uri(cursor, elements::CANONICALIZATION_ALGORITHM)?);
        }
        elements::SIGNATURE_ALGORITHM => {
            rstr.signature_algorithm = Some(codec.read_uri(cursor, elements::SIGNATURE_ALGORITHM)?);
        }
        elements::BINARY_EXCHANGE => {
            rstr.binary_exchange = Some(codec.read_binary_exchange(cursor)?)
        }
        elements::STATUS => rstr.status = Some(codec.read_status(cursor)?),
        elements::REQUESTED_TOKEN_CANCELLED => {
            cursor.skip_element()?;
            rstr.requested_token_cancelled = true;
        }
        _ => codec.read_unknown(cursor, &mut rstr.extensions)?,
    }
    Ok(())
}

/// Writes a whole `RequestSecurityTokenResponse` element.
pub(crate) fn write_response(
    emitter: &mut XmlEmitter,
    rstr: &RequestSecurityTokenResponse,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    let root_attributes: Vec<(&str, &str)> = rstr
        .context
        .iter()
        .map(|context| (attributes::CONTEXT, context.as_str()))
        .collect();
    emitter.start_element_with(
        codec.prefix(),
        elements::REQUEST_SECURITY_TOKEN_RESPONSE,
        codec.ns(),
        &root_attributes,
    )?;

    if let Some(entropy) = &rstr.entropy {
        codec.write_entropy(emitter, entropy)?;
    }
    if let Some(bits) = rstr.key_size_in_bits {
        codec.write_key_size(emitter, bits)?;
    }
    if let Some(lifetime) = &rstr.lifetime {
        codec.write_lifetime(emitter, lifetime)?;
    }
    if let Some(applies_to) = &rstr.applies_to {
        write_endpoint_wrapper(emitter, (prefixes::WSP, elements::APPLIES_TO, WSP_NS), applies_to)?;
    }
    if let Some(token) = &rstr.requested_security_token {
        codec.write_token_element(
            emitter,
            (codec.prefix(), elements::REQUESTED_SECURITY_TOKEN, codec.ns()),
            token,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(proof) = &rstr.requested_proof_token {
        codec.write_proof_token(emitter, proof)?;
    }
    if let Some(clause) = &rstr.requested_attached_reference {
        codec.write_clause_element(emitter, elements::REQUESTED_ATTACHED_REFERENCE, clause)?;
    }
    if let Some(clause) = &rstr.requested_unattached_reference {
        codec.write_clause_element(emitter, elements::REQUESTED_UNATTACHED_REFERENCE, clause)?;
    }
    if let Some(sign_with) = &rstr.sign_with {
        codec.write_uri(emitter, elements::SIGN_WITH, sign_with)?;
    }
    if let Some(encrypt_with) = &rstr.encrypt_with {
        codec.write_uri(emitter, elements::ENCRYPT_WITH, encrypt_with)?;
    }
    if let Some(token_type) = &rstr.token_type {
        codec.write_uri(emitter, elements::TOKEN_TYPE, token_type)?;
    }
    if let Some(request_type) = rstr.request_type {
        codec.write_request_type(emitter, request_type)?;
    }
    if let Some(key_type) = rstr.key_type {
        codec.write_key_type(emitter, key_type)?;
    }
    if let Some(value) = &rstr.authentication_type {
        codec.write_uri(emitter, elements::AUTHENTICATION_TYPE, value)?;
    }
    if let Some(value) = &rstr.encryption_algorithm {
        codec.write_uri(emitter, elements::ENCRYPTION_ALGORITHM, value)?;
    }
    if let Some(value) = &rstr.canonicalization_algorithm {
        codec.write_uri(emitter, elements::CANONICALIZATION_ALGORITHM, value)?;
    }
    if let Some(value) = &rstr.signature_algorithm {
        codec.write_uri(emitter, elements::SIGNATURE_ALGORITHM, value)?;
    }
    if let Some(exchange) = &rstr.binary_exchange {
        codec.write_binary_exchange(emitter, exchange)?;
    }
    if let Some(status) = &rstr.status {
        codec.write_status(emitter, status)?;
    }
    if rstr.requested_token_cancelled {
        codec.write_flag(emitter, elements::REQUESTED_TOKEN_CANCELLED)?;
    }

    write_extensions(emitter, &rstr.extensions);
    emitter.end_element()
}
