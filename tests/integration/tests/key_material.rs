//! Entropy and proof key material.

use std::sync::Arc;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use rand::Rng;

use kc_protocol_wstrust::keys::{
    Entropy, KeyIdentifierClause, ProtectedKey, SecurityKey, StaticTokenResolver,
    WrappingCredentials,
};
use kc_protocol_wstrust::{
    ProtocolVersion, RequestSecurityToken, RequestSecurityTokenResponse, RequestedProofToken,
    WsTrustError,
};

use crate::common::{TestEnv, XorKey, KW_AES256};

fn sts_key_name() -> KeyIdentifierClause {
    KeyIdentifierClause::KeyName("sts-wrapping-key".to_string())
}

fn wrapped_entropy(key: Arc<dyn SecurityKey>, secret: &[u8]) -> Entropy {
    Entropy::new(ProtectedKey::WrappedSecret {
        secret: secret.to_vec(),
        credentials: WrappingCredentials::new(key, sts_key_name(), KW_AES256),
    })
}

#[test]
fn test_random_binary_secret_roundtrips() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let mut rng = rand::rng();

    for version in [ProtocolVersion::Feb2005, ProtocolVersion::Trust13] {
        let serializer = env.serializer(version);
        for len in [1usize, 16, 32, 100] {
            let mut secret = vec![0u8; len];
            rng.fill(&mut secret[..]);
            let encoded = STANDARD.encode(&secret);

            let rst =
                RequestSecurityToken::issue().with_entropy(Entropy::from_secret(secret.clone()));
            let xml = serializer.write_request(&rst)?;
            assert!(xml.contains(&format!(">{encoded}</")), "{xml}");

            let parsed = serializer.read_request(&xml)?;
            let entropy = parsed.entropy.expect("entropy survives");
            assert_eq!(entropy.secret(), secret.as_slice());
            assert_eq!(STANDARD.encode(entropy.secret()), encoded);
        }
    }
    Ok(())
}

#[test]
fn test_wrapped_entropy_unwraps_with_resolver() -> anyhow::Result<()> {
    let key: Arc<dyn SecurityKey> = Arc::new(XorKey(0xa5));
    let resolver = StaticTokenResolver::new().with_key(sts_key_name(), Arc::clone(&key));
    let env = TestEnv::new().with_token_resolver(Arc::new(resolver));
    let serializer = env.serializer(ProtocolVersion::Trust13);

    let secret = b"requestor entropy material".to_vec();
    let rst =
        RequestSecurityToken::issue().with_entropy(wrapped_entropy(Arc::clone(&key), &secret));
    let xml = serializer.write_request(&rst)?;
    assert!(xml.contains("xenc:EncryptedKey"));
    assert!(!xml.contains(&STANDARD.encode(&secret)));

    let parsed = serializer.read_request(&xml)?;
    let entropy = parsed.entropy.as_ref().expect("entropy survives");
    assert_eq!(entropy.secret(), secret.as_slice());
    let credentials = entropy.protected_key().wrapping_credentials().expect("still wrapped");
    assert_eq!(credentials.key_identifier(), &sts_key_name());
    assert_eq!(credentials.algorithm(), KW_AES256);

    // the retained credentials re-wrap to the same document
    assert_eq!(serializer.write_request(&parsed)?, xml);
    Ok(())
}

#[test]
fn test_wrapped_entropy_without_resolver_fails() -> anyhow::Result<()> {
    let env = TestEnv::new();
    let serializer = env.serializer(ProtocolVersion::Feb2005);

    let entropy = wrapped_entropy(Arc::new(XorKey(7)), b"secret");
    let rst = RequestSecurityToken::issue().with_entropy(entropy);
    let xml = serializer.write_request(&rst)?;

    let err = serializer.read_request(&xml).unwrap_err();
    assert!(matches!(err, WsTrustError::UnresolvedKeyMaterial(_)));
    assert_eq!(err.fault_code(), "FailedAuthentication");
    Ok(())
}

#[test]
fn test_wrapped_proof_token() -> anyhow::Result<()> {
    let key: Arc<dyn SecurityKey> = Arc::new(XorKey(0x3c));
    let resolver = StaticTokenResolver::new().with_key(sts_key_name(), Arc::clone(&key));
    let env = TestEnv::new().with_token_resolver(Arc::new(resolver));
    let serializer = env.serializer(ProtocolVersion::Trust13);

    let proof = ProtectedKey::WrappedSecret {
        secret: vec![0x5f; 32],
        credentials: WrappingCredentials::new(key, sts_key_name(), KW_AES256),
    };
    let rstr = RequestSecurityTokenResponse::new()
        .with_proof_token(RequestedProofToken::ProtectedKey(proof));
    let xml = serializer.write_response(&rstr)?;
    assert_eq!(serializer.read_response(&xml)?, rstr);
    Ok(())
}

#[test]
fn test_unknown_entropy_content_is_unsupported() {
    let env = TestEnv::new();
    let xml = r#"<t:RequestSecurityToken xmlns:t="http://docs.oasis-open.org/ws-sx/ws-trust/200512">
        <t:Entropy><x:Nonce xmlns:x="urn:example:nonce">abc</x:Nonce></t:Entropy>
    </t:RequestSecurityToken>"#;
    let err = env.serializer(ProtocolVersion::Trust13).read_request(xml).unwrap_err();
    assert!(matches!(err, WsTrustError::UnsupportedContent(_)));
}
