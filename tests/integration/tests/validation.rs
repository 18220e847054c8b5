//! Cross-field invariants and UseKey proof of possession.

use std::sync::Arc;

use kc_protocol_wstrust::keys::StaticTokenResolver;
use kc_protocol_wstrust::token::SecurityTokenElement;
use kc_protocol_wstrust::{
    KeyType, ProtocolVersion, RequestSecurityToken, RequestType, UseKey, WsTrustError,
};

use crate::common::{ticket_element, TestEnv, Ticket};

fn asymmetric_issue() -> RequestSecurityToken {
    RequestSecurityToken::issue()
        .with_key_type(KeyType::Asymmetric)
        .with_applies_to("https://svc.example/")
}

/// An environment whose UseKey resolver knows ticket `id`.
fn env_knowing(id: &str) -> TestEnv {
    let resolver =
        StaticTokenResolver::new().with_token(Ticket::clause_for(id), Arc::new(Ticket::new(id)));
    TestEnv::new().with_use_key_resolver(Arc::new(resolver))
}

#[test]
fn test_asymmetric_issue_requires_use_key() -> anyhow::Result<()> {
    let env = env_knowing("holder");
    let serializer = env.serializer(ProtocolVersion::Trust13);

    let err = serializer.write_request(&asymmetric_issue()).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
    assert_eq!(err.fault_code(), "BadRequest");

    let with_key = asymmetric_issue().with_use_key(
        UseKey::from_token(ticket_element("holder"))
            .with_key_identifier(Ticket::clause_for("holder")),
    );
    let xml = serializer.write_request(&with_key)?;
    assert_eq!(serializer.read_request(&xml)?, with_key);
    Ok(())
}

#[test]
fn test_untyped_request_follows_issue_rule() {
    let mut rst = asymmetric_issue();
    rst.request_type = None;
    assert!(matches!(rst.validate(), Err(WsTrustError::InvalidRequestSemantics(_))));

    // the rule only constrains Issue
    rst.request_type = Some(RequestType::Renew);
    assert!(rst.validate().is_ok());
}

#[test]
fn test_read_rejects_asymmetric_issue_without_use_key() {
    let env = TestEnv::new();
    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let adapter = version.adapter();
        let xml = format!(
            r#"<t:RequestSecurityToken xmlns:t="{ns}"><t:RequestType>{issue}</t:RequestType><t:KeyType>{public}</t:KeyType></t:RequestSecurityToken>"#,
            ns = adapter.namespace,
            issue = adapter.request_type_uri(RequestType::Issue),
            public = adapter.key_type_uri(KeyType::Asymmetric),
        );
        let err = env.serializer(version).read_request(&xml).unwrap_err();
        assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)), "{version}: {err}");
    }
}

#[test]
fn test_use_key_must_be_held_by_the_requester() -> anyhow::Result<()> {
    let writer = env_knowing("holder").serializer(ProtocolVersion::Trust13);
    let stranger = asymmetric_issue().with_use_key(UseKey::from_token(ticket_element("stranger")));
    let xml = writer.write_request(&stranger)?;

    let err = writer.read_request(&xml).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
    Ok(())
}

#[test]
fn test_use_key_by_clause_alone() -> anyhow::Result<()> {
    let serializer = env_knowing("holder").serializer(ProtocolVersion::Feb2005);
    let rst = asymmetric_issue()
        .with_use_key(UseKey::default().with_key_identifier(Ticket::clause_for("holder")));

    let xml = serializer.write_request(&rst)?;
    assert!(xml.contains("<ds:KeyName"));

    let parsed = serializer.read_request(&xml)?;
    let use_key = parsed.use_key.expect("UseKey survives");
    assert_eq!(use_key.key_identifier, Some(Ticket::clause_for("holder")));
    let token = use_key
        .token
        .as_ref()
        .and_then(SecurityTokenElement::token)
        .expect("resolved token");
    assert_eq!(token.id(), "holder");
    Ok(())
}

#[test]
fn test_secondary_parameters_depth_is_enforced_on_write() {
    let env = TestEnv::new();
    let nested = RequestSecurityToken::issue().with_secondary_parameters(
        RequestSecurityToken::default().with_secondary_parameters(RequestSecurityToken::default()),
    );
    let err = env.serializer(ProtocolVersion::Trust13).write_request(&nested).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
}
