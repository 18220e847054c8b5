//! End-to-end issuance request as a relying party would send it.

use kc_protocol_wstrust::types::constants::TRUST_13_NS;
use kc_protocol_wstrust::{
    sniff_version, KeyType, ProtocolVersion, RequestSecurityToken, RequestType, WsTrustSerializer,
};

#[test]
fn test_trust13_symmetric_issue_request() -> anyhow::Result<()> {
    let rst = RequestSecurityToken::issue()
        .with_key_type(KeyType::Symmetric)
        .with_key_size(256)
        .with_applies_to("https://svc.example/");

    let serializer = WsTrustSerializer::new(ProtocolVersion::Trust13);
    let xml = serializer.write_request(&rst)?;

    assert!(xml.starts_with(&format!(
        r#"<trust:RequestSecurityToken xmlns:trust="{TRUST_13_NS}">"#
    )));
    let symmetric = ProtocolVersion::Trust13.adapter().key_type_uri(KeyType::Symmetric);
    assert_eq!(symmetric, format!("{TRUST_13_NS}/SymmetricKey"));
    assert!(xml.contains(&format!("<trust:KeyType>{symmetric}</trust:KeyType>")));
    assert!(xml.contains("<trust:KeySize>256</trust:KeySize>"));
    assert!(xml.contains("<wsa:Address>https://svc.example/</wsa:Address>"));

    assert_eq!(sniff_version(&xml)?, ProtocolVersion::Trust13);
    let parsed = serializer.read_request(&xml)?;
    assert_eq!(parsed.request_type, Some(RequestType::Issue));
    assert_eq!(parsed.key_size_in_bits, Some(256));
    assert_eq!(parsed.applies_to.map(|epr| epr.address).as_deref(), Some("https://svc.example/"));
    Ok(())
}

#[test]
fn test_issue_action_uris() {
    let trust13 = ProtocolVersion::Trust13.adapter();
    let issue = trust13.actions.for_request_type(RequestType::Issue);
    assert_eq!(issue.request, format!("{TRUST_13_NS}/RST/Issue"));
    assert_eq!(issue.response, format!("{TRUST_13_NS}/RSTR/Issue"));
    assert!(trust13.actions.issue_final.is_some());
    assert!(ProtocolVersion::Feb2005.adapter().actions.issue_final.is_none());
}
