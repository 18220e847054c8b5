//! Claims dialect rules.

use kc_protocol_wstrust::types::constants::claim_dialects;
use kc_protocol_wstrust::{
    ProtocolVersion, RequestClaim, RequestClaimCollection, RequestSecurityToken, WsTrustError,
};

use crate::common::TestEnv;

const UPN: &str = "http://schemas.xmlsoap.org/ws/2005/05/identity/claims/upn";
const ROLE: &str = "http://schemas.example.com/claims/role";

#[test]
fn test_missing_dialect_reads_as_identity() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let xml = format!(
        r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
             <t:Claims><i:ClaimType xmlns:i="http://schemas.xmlsoap.org/ws/2005/05/identity" Uri="{UPN}"/></t:Claims>
           </t:RequestSecurityToken>"#
    );
    let rst = env.serializer(ProtocolVersion::Trust13).read_request(&xml)?;
    assert_eq!(rst.claims.dialect, claim_dialects::IDENTITY);
    assert_eq!(rst.claims.claims, vec![RequestClaim::required(UPN)]);
    Ok(())
}

#[test]
fn test_default_dialect_roundtrips() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let rst = RequestSecurityToken::issue()
        .with_claims(RequestClaimCollection::new().with_claim(RequestClaim::optional(UPN)));

    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        let xml = serializer.write_request(&rst)?;
        assert!(xml.contains(&format!(r#"Dialect="{}""#, claim_dialects::IDENTITY)));
        assert!(xml.contains(r#"Optional="true""#));

        let parsed = serializer.read_request(&xml)?;
        assert_eq!(parsed.claims.dialect, claim_dialects::IDENTITY);
        assert_eq!(parsed, rst);
    }
    Ok(())
}

#[test]
fn test_authorization_dialect_keeps_values() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);
    let rst = RequestSecurityToken::issue().with_claims(
        RequestClaimCollection::with_dialect(claim_dialects::AUTHORIZATION)
            .with_claim(RequestClaim::required(ROLE).with_value("admin")),
    );

    let xml = serializer.write_request(&rst)?;
    assert!(xml.contains("<auth:Value>admin</auth:Value>"), "{xml}");
    assert_eq!(serializer.read_request(&xml)?, rst);
    Ok(())
}

#[test]
fn test_values_are_rejected_in_other_dialects() {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Trust13);

    let rst = RequestSecurityToken::issue()
        .with_claims(
            RequestClaimCollection::new()
                .with_claim(RequestClaim::required(UPN).with_value("alice")),
        );
    let err = serializer.write_request(&rst).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));

    let xml = format!(
        r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
             <t:Claims Dialect="urn:example:dialect">
               <i:ClaimType xmlns:i="http://schemas.xmlsoap.org/ws/2005/05/identity" Uri="{UPN}"><i:Value>alice</i:Value></i:ClaimType>
             </t:Claims>
           </t:RequestSecurityToken>"#
    );
    let err = serializer.read_request(&xml).unwrap_err();
    assert!(matches!(err, WsTrustError::InvalidRequestSemantics(_)));
}

#[test]
fn test_relative_dialect_is_malformed() {
    let env = TestEnv::new();
    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
        <t:Claims Dialect="relative/dialect"/>
    </t:RequestSecurityToken>"#;
    let err = env.serializer(ProtocolVersion::Trust13).read_request(xml).unwrap_err();
    assert!(err.is_wire_format_error());
}
