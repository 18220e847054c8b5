//! Full request and response round trips through both protocol versions.

use chrono::{TimeZone, Utc};

use kc_protocol_wstrust::keys::{Entropy, KeyIdentifierClause, ProtectedKey};
use kc_protocol_wstrust::token::TokenHandlerUsage;
use kc_protocol_wstrust::types::constants::value_types;
use kc_protocol_wstrust::xml::XmlFragment;
use kc_protocol_wstrust::{
    AdditionalContext, BinaryEncoding, BinaryExchange, ComputedKeyAlgorithm, ContextItem,
    EndpointReference, KeyType, Lifetime, Participants, ProtocolVersion, Renewing, RequestClaim,
    RequestClaimCollection, RequestSecurityToken, RequestSecurityTokenResponse, RequestType,
    RequestedProofToken, SerializationContext, Status, WsTrustError, WsTrustSerializer,
};

use crate::common::{ticket_element, TestEnv};

fn lifetime() -> Lifetime {
    Lifetime::new(
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 12, 0, 0).unwrap()),
        Some(Utc.with_ymd_and_hms(2026, 3, 1, 13, 0, 0).unwrap()),
    )
}

fn extension(text: &str) -> XmlFragment {
    XmlFragment::parse(&format!(r#"<x:Hint xmlns:x="urn:example:ext">{text}</x:Hint>"#)).unwrap()
}

/// A request populating every field both versions can express.
fn full_request() -> RequestSecurityToken {
    let mut rst = RequestSecurityToken::issue()
        .with_context("uuid-6c4f-01")
        .with_applies_to("https://svc.example/")
        .with_claims(
            RequestClaimCollection::new()
                .with_claim(RequestClaim::required(
                    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn",
                ))
                .with_claim(RequestClaim::optional(
                    "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/name",
                )),
        )
        .with_key_type(KeyType::Symmetric)
        .with_key_size(256)
        .with_token_type("urn:oasis:names:tc:SAML:2.0:assertion")
        .with_lifetime(lifetime())
        .with_entropy(Entropy::from_secret(vec![0x11; 32]))
        .with_on_behalf_of(ticket_element("obo-1"))
        .with_act_as(ticket_element("actor-1"));

    rst.computed_key_algorithm = Some(ComputedKeyAlgorithm::Psha1);
    rst.sign_with = Some("http://www.w3.org/2000/09/xmldsig#hmac-sha1".to_string());
    rst.encrypt_with = Some("http://www.w3.org/2001/04/xmlenc#aes256-cbc".to_string());
    rst.authentication_type = Some("urn:oasis:names:tc:SAML:2.0:ac:classes:Password".to_string());
    rst.encryption_algorithm = Some("http://www.w3.org/2001/04/xmlenc#aes256-cbc".to_string());
    rst.canonicalization_algorithm = Some("http://www.w3.org/2001/10/xml-exc-c14n#".to_string());
    rst.signature_algorithm = Some("http://www.w3.org/2000/09/xmldsig#hmac-sha1".to_string());
    rst.binary_exchange = Some(
        BinaryExchange::new(
            vec![0xde, 0xad, 0xbe, 0xef],
            "http://schemas.xmlsoap.org/ws/2005/02/trust/spnego",
        )
            .with_encoding(BinaryEncoding::HexBinary),
    );
    rst.issuer = Some(EndpointReference::new("https://idp.example/sts"));
    rst.proof_encryption = Some(ticket_element("proof-enc"));
    rst.encryption = Some(ticket_element("enc"));
    rst.delegate_to = Some(ticket_element("delegate"));
    rst.forwardable = Some(true);
    rst.delegatable = Some(false);
    rst.allow_postdating = true;
    rst.renewing = Some(Renewing::new(true, true));
    rst.participants = Some(
        Participants::new()
            .with_primary(
                EndpointReference::new("https://primary.example/")
                    .with_detail(XmlFragment::parse(r#"<m:Tenant xmlns:m="urn:example:meta">acme</m:Tenant>"#).unwrap()),
            )
            .with_participant(EndpointReference::new("https://other.example/")),
    );
    rst.additional_context = Some(
        AdditionalContext::new()
            .with_item(ContextItem::new("urn:example:ctx:device", "laptop-7"))
            .with_item(
                ContextItem::new("urn:example:ctx:locale", "en-GB")
                    .with_scope("urn:example:scope"),
            ),
    );
    rst.extensions.insert(extension("first"));
    rst
}

#[test]
fn test_full_request_roundtrip_both_versions() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let rst = full_request();

    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        let xml = serializer.write_request(&rst)?;
        let parsed = serializer.read_request(&xml)?;
        assert_eq!(parsed, rst, "{version} round trip changed the request:\n{xml}");

        // writing the parsed message again is byte-for-byte stable
        assert_eq!(serializer.write_request(&parsed)?, xml);
    }
    Ok(())
}

#[test]
fn test_trust13_extras_roundtrip() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut rst = RequestSecurityToken::new(RequestType::Validate).with_secondary_parameters(
        RequestSecurityToken::default()
            .with_key_type(KeyType::Bearer)
            .with_token_type("urn:oasis:names:tc:SAML:2.0:assertion"),
    );
    rst.key_wrap_algorithm = Some("http://www.w3.org/2001/04/xmlenc#rsa-oaep-mgf1p".to_string());
    rst.validate_target = Some(ticket_element("to-validate"));

    let serializer = env.serializer(ProtocolVersion::Trust13);
    let xml = serializer.write_request(&rst)?;
    let key_wrap = xml.find("KeyWrapAlgorithm").unwrap();
    let validate_target = xml.find("ValidateTarget").unwrap();
    let secondary = xml.find("SecondaryParameters").unwrap();
    assert!(key_wrap < validate_target && validate_target < secondary);

    assert_eq!(serializer.read_request(&xml)?, rst);
    Ok(())
}

#[test]
fn test_cancel_and_renew_targets() -> anyhow::Result<()> {
    let env = TestEnv::new();
    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);

        let mut cancel = RequestSecurityToken::new(RequestType::Cancel);
        cancel.cancel_target = Some(ticket_element("old"));
        assert_eq!(serializer.read_request(&serializer.write_request(&cancel)?)?, cancel);

        let mut renew = RequestSecurityToken::new(RequestType::Renew).with_lifetime(lifetime());
        renew.renew_target = Some(ticket_element("old"));
        assert_eq!(serializer.read_request(&serializer.write_request(&renew)?)?, renew);
    }
    Ok(())
}

#[test]
fn test_full_response_roundtrip_both_versions() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut rstr = RequestSecurityTokenResponse::new()
        .with_context("uuid-6c4f-01")
        .with_token_type("urn:oasis:names:tc:SAML:2.0:assertion")
        .with_lifetime(lifetime())
        .with_requested_security_token(ticket_element("issued-1"))
        .with_proof_token(RequestedProofToken::ProtectedKey(ProtectedKey::PlaintextSecret(
            vec![0x42; 32],
        )));
    rstr.key_size_in_bits = Some(256);
    rstr.key_type = Some(KeyType::Symmetric);
    rstr.applies_to = Some(EndpointReference::new("https://svc.example/"));
    rstr.requested_attached_reference = Some(KeyIdentifierClause::local_reference("issued-1"));
    rstr.requested_unattached_reference = Some(KeyIdentifierClause::KeyIdentifier {
        value_type: value_types::THUMBPRINT_SHA1.to_string(),
        value: vec![9; 20],
    });
    rstr.extensions.insert(extension("response"));

    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        let mut expected = rstr.clone();
        expected.request_type = Some(RequestType::Issue);
        expected.status = Some(Status::valid(version));

        let xml = serializer.write_response(&expected)?;
        assert_eq!(serializer.read_response(&xml)?, expected, "{version}:\n{xml}");
    }
    Ok(())
}

#[test]
fn test_extension_order_is_preserved() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
        <b:Second xmlns:b="urn:example:b">2</b:Second>
        <t:RequestType>http://docs.oasis-open.org/ws-sx/ws-trust/200512/Issue</t:RequestType>
        <a:First xmlns:a="urn:example:a">1</a:First>
    </t:RequestSecurityToken>"#;

    let rst = serializer.read_request(xml)?;
    let names: Vec<String> = rst.extensions.iter().map(|(name, _)| name.local.clone()).collect();
    assert_eq!(names, ["Second", "First"]);

    let written = serializer.write_request(&rst)?;
    let request_type = written.find("RequestType").unwrap();
    let second = written.find("b:Second").unwrap();
    let first = written.find("a:First").unwrap();
    assert!(request_type < second && second < first);
    Ok(())
}

#[test]
fn test_act_as_uses_the_trust14_namespace_in_both_versions() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let rst = RequestSecurityToken::issue().with_act_as(ticket_element("actor"));
    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let xml = env.serializer(version).write_request(&rst)?;
        assert!(xml.contains(r#"<tr:ActAs xmlns:tr="http://docs.oasis-open.org/ws-sx/ws-trust/200802">"#));
    }
    Ok(())
}

#[test]
fn test_delegation_requires_registered_handlers() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let xml = env
        .serializer(ProtocolVersion::Trust13)
        .write_request(&RequestSecurityToken::issue().with_on_behalf_of(ticket_element("obo")))?;

    let bare =
        WsTrustSerializer::with_context(ProtocolVersion::Trust13, SerializationContext::new());
    let err = bare.read_request(&xml).unwrap_err();
    assert!(matches!(err, WsTrustError::UnsupportedContent(_)));
    assert!(err.to_string().contains(&TokenHandlerUsage::OnBehalfOf.to_string()));
    Ok(())
}

#[test]
fn test_foreign_elements_can_be_refused() -> anyhow::Result<()> {
    let mut env = TestEnv::new();
    let mut config = env.context.config().clone();
    config.capture_foreign_elements = false;
    env.context = env.context.clone().with_config(config);

    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
        <a:First xmlns:a="urn:example:a">1</a:First>
    </t:RequestSecurityToken>"#;
    let err = env.serializer(ProtocolVersion::Trust13).read_request(xml).unwrap_err();
    assert!(matches!(err, WsTrustError::UnsupportedContent(_)));
    Ok(())
}

#[test]
fn test_current_time_lifetime_roundtrips() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let rst = RequestSecurityToken::issue()
        .with_lifetime(Lifetime::starting_at(Utc::now(), chrono::Duration::minutes(30)));

    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        let xml = serializer.write_request(&rst)?;
        assert_eq!(serializer.read_request(&xml)?, rst);
    }
    Ok(())
}

#[test]
fn test_extension_with_redeclared_prefix_roundtrips() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512" xmlns:x="urn:outer">
        <x:Hint><x:Inner xmlns:x="urn:inner"/></x:Hint>
    </t:RequestSecurityToken>"#;

    let rst = serializer.read_request(xml)?;
    assert_eq!(rst.extensions.len(), 1);

    let rewritten = serializer.write_request(&rst)?;
    assert!(rewritten.contains(r#"<x:Hint xmlns:x="urn:outer">"#), "{rewritten}");
    assert_eq!(serializer.read_request(&rewritten)?, rst);
    Ok(())
}

#[test]
fn test_repeated_extension_elements_are_kept() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
        <x:Hint xmlns:x="urn:example:ext">first</x:Hint>
        <x:Hint xmlns:x="urn:example:ext">second</x:Hint>
    </t:RequestSecurityToken>"#;

    let rst = serializer.read_request(xml)?;
    assert_eq!(rst.extensions.len(), 2);

    let rewritten = serializer.write_request(&rst)?;
    let first = rewritten.find(">first<").unwrap_or(usize::MAX);
    let second = rewritten.find(">second<").unwrap_or(usize::MAX);
    assert!(first < second && second != usize::MAX, "{rewritten}");
    assert_eq!(serializer.read_request(&rewritten)?, rst);
    Ok(())
}
