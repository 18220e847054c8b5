//! Elements that only exist in WS-Trust 1.3.

use super::elements::{peek_name, reject, Codec};
use super::request::{read_request_body, write_request_body};
use super::response::{read_response, write_response};
use crate::error::{WsTrustError, WsTrustResult};
use crate::token::TokenHandlerUsage;
use crate::types::constants::elements;
use crate::types::{
    RequestSecurityToken, RequestSecurityTokenResponseCollection, MAX_SECONDARY_PARAMETERS_DEPTH,
};
use crate::version::{resolve_adapter, ProtocolVersion, TrustAdapter};
use crate::xml::{QualifiedName, XmlCursor, XmlEmitter, XmlFragment};

pub(crate) fn read_request_element(
    cursor: &mut XmlCursor<'_>,
    name: &QualifiedName,
    rst: &mut RequestSecurityToken,
    codec: &Codec<'_>,
    depth: usize,
) -> WsTrustResult<()> {
    match name.local.as_str() {
        elements::KEY_WRAP_ALGORITHM => {
            rst.key_wrap_algorithm = Some(codec.read_uri(cursor, elements::KEY_WRAP_ALGORITHM)?);
        }
        elements::VALIDATE_TARGET => {
            rst.validate_target = Some(codec.read_token_element(
                cursor,
                elements::VALIDATE_TARGET,
                codec.ns(),
                TokenHandlerUsage::Default,
            )?);
        }
        elements::SECONDARY_PARAMETERS => {
            let secondary = read_secondary_parameters(cursor, codec, depth)?;
            rst.secondary_parameters = Some(Box::new(secondary));
        }
        _ => codec.read_unknown(cursor, &mut rst.extensions)?,
    }
    Ok(())
}

fn read_secondary_parameters(
    cursor: &mut XmlCursor<'_>,
    codec: &Codec<'_>,
    depth: usize,
) -> WsTrustResult<RequestSecurityToken> {
    if depth + 1 > MAX_SECONDARY_PARAMETERS_DEPTH {
        return Err(reject(WsTrustError::invalid_request(format!(
            "SecondaryParameters nested deeper than {MAX_SECONDARY_PARAMETERS_DEPTH} levels"
        ))));
    }

    let fragment = cursor.capture_element()?;
    let adapter = secondary_parameters_adapter(&fragment)?;
    tracing::debug!(version = %adapter.version, "reading SecondaryParameters");

    let inner = codec.with_adapter(adapter);
    let mut secondary = RequestSecurityToken::default();
    let mut fragment_cursor = fragment.cursor();
    fragment_cursor.read_start()?;
    read_request_body(&mut fragment_cursor, &mut secondary, &inner, depth + 1)?;
    fragment_cursor.read_end_element()?;
    Ok(secondary)
}

/// Picks the version of the first child in a WS-Trust namespace. Children
/// carry no such hint when the element is empty or only holds foreign
/// content, in which case Feb2005 is assumed.
fn secondary_parameters_adapter(fragment: &XmlFragment) -> WsTrustResult<&'static TrustAdapter> {
    let mut cursor = fragment.cursor();
    cursor.read_start()?;
    while let Some(name) = peek_name(&mut cursor)? {
        if let Some(adapter) = resolve_adapter(&name.namespace) {
            return Ok(adapter);
        }
        cursor.skip_element()?;
    }
    Ok(ProtocolVersion::Feb2005.adapter())
}

/// Writes KeyWrapAlgorithm, ValidateTarget and SecondaryParameters, or
/// rejects them for versions without these elements.
pub(crate) fn write_request_extras(
    emitter: &mut XmlEmitter,
    rst: &RequestSecurityToken,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    if !codec.adapter.supports_secondary_parameters {
        let present = [
            (elements::KEY_WRAP_ALGORITHM, rst.key_wrap_algorithm.is_some()),
            (elements::VALIDATE_TARGET, rst.validate_target.is_some()),
            (elements::SECONDARY_PARAMETERS, rst.secondary_parameters.is_some()),
        ];
        if let Some((element, _)) = present.iter().find(|(_, set)| *set) {
            return Err(reject(WsTrustError::unsupported(format!(
                "{element} cannot be written as {}",
                codec.version()
            ))));
        }
        return Ok(());
    }

    if let Some(algorithm) = &rst.key_wrap_algorithm {
        codec.write_uri(emitter, elements::KEY_WRAP_ALGORITHM, algorithm)?;
    }
    if let Some(target) = &rst.validate_target {
        codec.write_token_element(
            emitter,
            (codec.prefix(), elements::VALIDATE_TARGET, codec.ns()),
            target,
            TokenHandlerUsage::Default,
        )?;
    }
    if let Some(secondary) = &rst.secondary_parameters {
        emitter.start_element(codec.prefix(), elements::SECONDARY_PARAMETERS, codec.ns())?;
        write_request_body(emitter, secondary, codec)?;
        emitter.end_element()?;
    }
    Ok(())
}

fn require_collection_support(codec: &Codec<'_>) -> WsTrustResult<()> {
    if codec.adapter.supports_response_collection {
        Ok(())
    } else {
        Err(reject(WsTrustError::unsupported(format!(
            "{} has no RequestSecurityTokenResponseCollection",
            codec.version()
        ))))
    }
}

/// Reads a response collection. Every response in it is final.
pub(crate) fn read_response_collection(
    cursor: &mut XmlCursor<'_>,
    codec: &Codec<'_>,
) -> WsTrustResult<RequestSecurityTokenResponseCollection> {
    require_collection_support(codec)?;
    cursor
        .read_start_element(elements::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION, codec.ns())
        .map_err(reject)?;

    let mut collection = RequestSecurityTokenResponseCollection::new();
    while cursor.is_start_element()? {
        let mut response = read_response(cursor, codec)?;
        response.is_final = true;
        collection.responses.push(response);
    }
    cursor.read_end_element()?;

    if collection.is_empty() {
        return Err(reject(WsTrustError::malformed(
            "RequestSecurityTokenResponse inside RequestSecurityTokenResponseCollection",
            "empty collection",
        )));
    }
    Ok(collection)
}

pub(crate) fn write_response_collection(
    emitter: &mut XmlEmitter,
    collection: &RequestSecurityTokenResponseCollection,
    codec: &Codec<'_>,
) -> WsTrustResult<()> {
    require_collection_support(codec)?;
    if collection.is_empty() {
        return Err(reject(WsTrustError::invalid_request(
            "a response collection needs at least one response",
        )));
    }
    if let Some(index) = collection.responses.iter().position(|response| !response.is_final) {
        return Err(reject(WsTrustError::invalid_request(format!(
            "response {index} is not final and cannot be part of a response collection"
        ))));
    }

    emitter.start_element(
        codec.prefix(),
        elements::REQUEST_SECURITY_TOKEN_RESPONSE_COLLECTION,
        codec.ns(),
    )?;
    for response in &collection.responses {
        write_response(emitter, response, codec)?;
    }
    emitter.end_element()
}
