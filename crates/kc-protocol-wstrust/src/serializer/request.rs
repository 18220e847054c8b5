//! RequestSecurityToken reading and writing.

use super::elements::{
    peek_name, read_additional_context, read_endpoint_wrapper, reject, write_additional_context,
    write_endpoint_wrapper, write_extensions, Codec,
};
use super::trust13;
use crate::error::WsTrustResult;
use crate::token::TokenHandlerUsage;
use crate::types::constants::{attributes, elements, prefixes, AUTH_NS, TRUST_14_NS, WSP_NS};
use crate::types::RequestSecurityToken;
use crate::version::ProtocolVersion;
use crate::xml::{QualifiedName, XmlCursor, XmlEmitter};

/// Reads a whole `RequestSecurityToken` element and validates it.
pub(crate) fn read_request(
    cursor: &mut XmlCursor<'_>,
    codec: &Codec<'_>,
) -> WsTrustResult<RequestSecurityToken> {
    let start = cursor
        .read_start_element(elements::REQUEST_SECURITY_TOKEN, codec.ns())
        .map_err(reject)?;
    let mut rst = RequestSecurityToken {
        context: start.attribute(attributes::CONTEXT).map(str::to_string),
        ..RequestSecurityToken::default()
    };
    read_request_body(cursor, &mut rst, codec, 0)?;
    cursor.read_end_element()?;

    rst.validate().map_err(reject)?;
    Ok(rst)
}

/// Reads child elements in any order until the parent's end element.
///
/// `depth` counts the enclosing `SecondaryParameters` elements.
pub(crate) fn read_request_body(
    cursor: &mut XmlCursor<'_>,
    rst: &mut RequestSecurityToken,
    codec: &Codec<'_>,
    depth: usize,
) -> WsTrustResult<()> {
    while let Some(name) = peek_name(cursor)? {
        tracing::trace!(element = %name, version = %codec.version(), "reading request element");
        read_request_element(cursor, &name, rst, codec, depth)?;
    }
    Ok(())
}

fn read_request_element(
    cursor: &mut XmlCursor<'_>,
    name: &QualifiedName,
    rst: &mut RequestSecurityToken,
    codec: &Codec<'_>,
    depth: usize,
) -> WsTrustResult<()> {
    if name.is(elements::APPLIES_TO, WSP_NS) {
        rst.applies_to = Some(read_endpoint_wrapper(cursor, elements::APPLIES_TO, WSP_NS)?);
        return Ok(());
    }
    if name.is(elements::ACT_AS, TRUST_14_NS) {
        rst.act_as = Some(codec.read_token_element(
            cursor,
            elements::ACT_AS,
            TRUST_14_NS,
            TokenHandlerUsage::ActAs,
        )?);
        return Ok(());
    }
    if name.is(elements::ADDITIONAL_CONTEXT, AUTH_NS) {
        rst.additional_context = Some(read_additional_context(cursor)?);
        return Ok(());
    }
    if name.namespace != codec.ns() {
        return codec.read_unknown(cursor, &mut rst.extensions);
    }

    let ns = codec.ns();
    match name.local.as_str() {
        elements::CLAIMS => rst.claims = codec.read_claims(cursor)?,
        elements::COMPUTED_KEY_ALGORITHM => {
            rst.computed_key_algorithm = Some(codec.read_computed_key_algorithm(cursor)?);
        }
        elements::SIGN_WITH => rst.sign_with = Some(codec.read_uri(cursor, elements::SIGN_WITH)?),
        elements::ENCRYPT_WITH => {
            rst.encrypt_with = Some(codec.read_uri(cursor, elements::ENCRYPT_WITH)?)
        }
        elements::ENTROPY => rst.entropy = Some(codec.read_entropy(cursor)?),
        elements::KEY_SIZE => rst.key_size_in_bits = Some(codec.read_key_size(cursor)?),
        elements::KEY_TYPE => rst.key_type = Some(codec.read_key_type(cursor)?),
        elements::LIFETIME => rst.lifetime = Some(codec.read_lifetime(cursor)?),
        elements::RENEW_TARGET => {
            rst.renew_target = Some(codec.read_token_element(
                cursor,
                elements::RENEW_TARGET,
                ns,
                TokenHandlerUsage::Default,
            )?);
        }
        elements::ON_BEHALF_OF => {
            rst.on_behalf_of = Some(codec.read_token_element(
                cursor,
                elements::ON_BEHALF_OF,
                ns,
                TokenHandlerUsage::OnBehalfOf,
            )?);
        }
        elements::REQUEST_TYPE => rst.request_type = Some(codec.read_request_type(cursor)?),
        elements::TOKEN_TYPE => {
            rst.token_type = Some(codec.read_uri(cursor, elements::TOKEN_TYPE)?)
        }
        elements::USE_KEY => rst.use_key = Some(codec.read_use_key(cursor)?),
        elements::AUTHENTICATION_TYPE => {
            rst.authentication_type = Some(codec.read_uri(cursor, elements::AUTHENTICATION_TYPE)?);
        }
        elements::ENCRYPTION_ALGORITHM => {
            rst.encryption_algorithm =
                Some(codec.read_uri(cursor, elements::ENCRYPTION_ALGORITHM)?);
        }
        elements::CANONICALIZATION_ALGORITHM => {
            rst.canonicalization_algorithm =
                Some(codec.read_uri(cursor, elements::CANONICALIZATION_ALGORITHM)?);
        }
        elements::SIGNATURE_ALGORITHM => {
            rst.signature_algorithm = Some(codec.read_uri(cursor, elements::SIGNATURE_ALGORITHM)?);
        }
        elements::BINARY_EXCHANGE => {
            rst.binary_exchange = Some(codec.read_binary_exchange(cursor)?)
        }
        elements::ISSUER => rst.issuer = Some(read_endpoint_wrapper(cursor, elements::ISSUER, ns)?),
        elements::PROOF_ENCRYPTION => {
            rst.proof_encryption = Some(codec.read_token_element(
                cursor,
                elements::PROOF_ENCRYPTION,
                ns,
                TokenHandlerUsage::Default,
            )?);
        }
        elements::ENCRYPTION => {
            rst.encryption = Some(codec.read_token_element(
                cursor,
                elements::ENCRYPTION,
                ns,
                TokenHandlerUsage::Default,
            )?);
        }
        elements::DELEGATE_TO => {
            rst.delegate_to = Some(codec.read_token_element(
                cursor,
                elements::DELEGATE_TO,
                ns,
                TokenHandlerUsage::Default,
            )?);
        }
        elements::FORWARDABLE => rst.forwardable = Some(cursor.read_element_content_as_bool()?),
        elements::DELEGATABLE => rst.delegatable = Some(cursor.read_element_content_as_bool()?),
        elements::ALLOW_POSTDATING => {
            cursor.skip_element()?;
            rst.allow_postdating = true;
        }
        elements::RENEWING => rst.renewing = Some(codec.read_renewing(cursor)?),
        elements::CANCEL_TARGET => {
            rst.cancel_target = Some(codec.read_token_element(
                cursor,
                elements::CANCEL_TARGET,
                ns,
                TokenHandlerUsage::Default,
            )?);
        }
        elements::PARTICIPANTS => rst.participants = Some(codec.read_participants(cursor)?),
        _ if codec.version() == ProtocolVersion::Trust13 => {
            trust13::read_request_element(cursor, name, rst, codec, depth)?;
        }
        _ => codec.read_unknown(cursor, &mut rst.extensions)?,
    }
    Ok(())
}

/// Validates and writes a whole `RequestSecurityToken` element.
pub(crate) fn write_request(
    emitter: &mut XmlEmitter,
    rst: &RequestSecurityToken,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    rst.validate().map_err(reject)?;

    let root_attributes: Vec<(&str, &str)> = rst
        .context
        .iter()
        .map(|context| (attributes::CONTEXT, context.as_str()))
        .collect();
    emitter.start_element_with(
        codec.prefix(),
        elements::REQUEST_SECURITY_TOKEN,
        codec.ns(),
        &root_attributes,
    )?;
    write_request_body(emitter, rst, codec)?;
    emitter.end_element()
}

/// Writes the populated fields in canonical order.
pub(crate) fn write_request_body(
    emitter: &mut XmlEmitter,
    rst: &RequestSecurityToken,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    let (prefix, ns) = (codec.prefix(), codec.ns());

    if let Some(applies_to) = &rst.applies_to {
        write_endpoint_wrapper(emitter, (prefixes::WSP, elements::APPLIES_TO, WSP_NS), applies_to)?;
    }
    if !rst.claims.is_default() {
        codec.write_claims(emitter, &rst.claims)?;
    }
    if let Some(algorithm) = rst.computed_key_algorithm {
        codec.write_computed_key_algorithm(emitter, elements::COMPUTED_KEY_ALGORITHM, algorithm)?;
    }
    if let Some(sign_with) = &rst.sign_with {
        codec.write_uri(emitter, elements::SIGN_WITH, sign_with)?;
    }
    if let Some(encrypt_with) = &rst.encrypt_with {
        codec.write_uri(emitter, elements::ENCRYPT_WITH, encrypt_with)?;
    }
    if let Some(entropy) = &rst.entropy {
        codec.write_entropy(emitter, entropy)?;
    }
    if let Some(bits) = rst.key_size_in_bits {
        codec.write_key_size(emitter, bits)?;
    }
    if let Some(key_type) = rst.key_type {
        codec.write_key_type(emitter, key_type)?;
    }
    if let Some(lifetime) = &rst.lifetime {
        codec.write_lifetime(emitter, lifetime)?;
    }
    if let Some(target) = &rst.renew_target {
        codec.write_token_element(
            emitter,
            (prefix, elements::RENEW_TARGET, ns),
            target,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(token) = &rst.on_behalf_of {
        codec.write_token_element(
            emitter,
            (prefix, elements::ON_BEHALF_OF, ns),
            token,
            TokenHandlerUsage::OnBehalfOf,
        )?;
    }
    if let Some(token) = &rst.act_as {
        codec.write_token_element(
            emitter,
            (prefixes::TRUST_14, elements::ACT_AS, TRUST_14_NS),
            token,
            TokenHandlerUsage::ActAs,
        )?;
    }
    if let Some(request_type) = rst.request_type {
        codec.write_request_type(emitter, request_type)?;
    }
    if let Some(token_type) = &rst.token_type {
        codec.write_uri(emitter, elements::TOKEN_TYPE, token_type)?;
    }
    if let Some(use_key) = &rst.use_key {
        codec.write_use_key(emitter, use_key)?;
    }
    if let Some(value) = &rst.authentication_type {
        codec.write_uri(emitter, elements::AUTHENTICATION_TYPE, value)?;
    }
    if let Some(value) = &rst.encryption_algorithm {
        codec.write_uri(emitter, elements::ENCRYPTION_ALGORITHM, value)?;
    }
    if let Some(value) = &rst.canonicalization_algorithm {
        codec.write_uri(emitter, elements::CANONICALIZATION_ALGORITHM, value)?;
    }
    if let Some(value) = &rst.signature_algorithm {
        codec.write_uri(emitter, elements::SIGNATURE_ALGORITHM, value)?;
    }
    if let Some(exchange) = &rst.binary_exchange {
        codec.write_binary_exchange(emitter, exchange)?;
    }
    if let Some(issuer) = &rst.issuer {
        write_endpoint_wrapper(emitter, (prefix, elements::ISSUER, ns), issuer)?;
    }
    if let Some(token) = &rst.proof_encryption {
        codec.write_token_element(
            emitter,
            (prefix, elements::PROOF_ENCRYPTION, ns),
            token,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(token) = &rst.encryption {
        codec.write_token_element(
            emitter,
            (prefix, elements::ENCRYPTION, ns),
            token,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(token) = &rst.delegate_to {
        codec.write_token_element(
            emitter,
            (prefix, elements::DELEGATE_TO, ns),
            token,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(forwardable) = rst.forwardable {
        codec.write_bool(emitter, elements::FORWARDABLE, forwardable)?;
    }
    if let Some(delegatable) = rst.delegatable {
        codec.write_bool(emitter, elements::DELEGATABLE, delegatable)?;
    }
    if rst.allow_postdating {
        codec.write_flag(emitter, elements::ALLOW_POSTDATING)?;
    }
    if let Some(renewing) = &rst.renewing {
        codec.write_renewing(emitter, renewing)?;
    }
    if let Some(target) = &rst.cancel_target {
        codec.write_token_element(
            emitter,
            (prefix, elements::CANCEL_TARGET, ns),
            target,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(participants) = rst.participants.as_ref().filter(|p| !p.is_empty()) {
        codec.write_participants(emitter, participants)?;
    }
    if let Some(context) = &rst.additional_context {
        write_additional_context(emitter, context)?;
    }

    trust13::write_request_extras(emitter, rst, codec)?;
    write_extensions(emitter, &rst.extensions);
    Ok(())
}
