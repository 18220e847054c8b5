//! Final responses and response collections.

use kc_protocol_wstrust::{
    ProtocolVersion, RequestSecurityTokenResponse, RequestSecurityTokenResponseCollection,
    WsTrustError,
};

use crate::common::{ticket_element, TestEnv};

fn issued(id: &str) -> RequestSecurityTokenResponse {
    RequestSecurityTokenResponse::new()
        .with_context("ctx-42")
        .with_token_type("urn:oasis:names:tc:SAML:2.0:assertion")
        .with_requested_security_token(ticket_element(id))
}

#[test]
fn test_final_response_is_wrapped() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let rstr = issued("final-1").finalized();

    let xml = serializer.write_final_response(&rstr)?;
    assert!(xml.starts_with("<trust:RequestSecurityTokenResponseCollection"), "{xml}");

    let collection = serializer.read_response_collection(&xml)?;
    assert_eq!(collection.responses.len(), 1);
    assert_eq!(collection.responses[0], rstr);
    assert!(collection.responses[0].is_final);

    assert_eq!(serializer.read_final_response(&xml)?, rstr);
    Ok(())
}

#[test]
fn test_non_final_response_is_never_wrapped() -> anyhow::Result<()> {
    let env = TestEnv::new();
    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        let rstr = issued("interim");

        let xml = serializer.write_final_response(&rstr)?;
        assert!(!xml.contains("RequestSecurityTokenResponseCollection"));

        let parsed = serializer.read_final_response(&xml)?;
        assert!(!parsed.is_final);
        assert_eq!(parsed, rstr);
    }
    Ok(())
}

#[test]
fn test_feb2005_final_response_stays_bare() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Feb2005);
    let xml = serializer.write_final_response(&issued("final-feb").finalized())?;
    assert!(xml.starts_with("<t:RequestSecurityTokenResponse "), "{xml}");

    let err = serializer
        .write_response_collection(
            &RequestSecurityTokenResponseCollection::new().with_response(issued("x")),
        )
        .unwrap_err();
    assert!(matches!(err, WsTrustError::UnsupportedContent(_)));
    Ok(())
}

#[test]
fn test_read_response_any_unwraps_collection() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let rstr = issued("any-1").finalized();
    let xml = env.serializer(ProtocolVersion::Trust13).write_final_response(&rstr)?;

    let (version, parsed) = env.serializer(ProtocolVersion::Feb2005).read_response_any(&xml)?;
    assert_eq!(version, ProtocolVersion::Trust13);
    assert_eq!(parsed, rstr);
    Ok(())
}

#[test]
fn test_multi_response_collection() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let collection = RequestSecurityTokenResponseCollection::new()
        .with_response(issued("a").finalized())
        .with_response(issued("b").finalized());

    let xml = serializer.write_response_collection(&collection)?;
    assert_eq!(serializer.read_response_collection(&xml)?, collection);

    let err = serializer.read_final_response(&xml).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
    Ok(())
}

#[test]
fn test_collection_rejects_non_final_members() {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let collection = RequestSecurityTokenResponseCollection::new()
        .with_response(issued("done").finalized())
        .with_response(issued("pending"));

    let err = serializer.write_response_collection(&collection).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
    assert_eq!(err.fault_code(), "BadRequest");
}
