//! Element routines shared by requests and responses.
//!
//! Each `read_*` routine expects the cursor on the element it reads and
//! consumes that element's whole subtree. Each `write_*` routine emits one
//! complete element.

use super::context::SerializationContext;
use crate::error::{WsTrustError, WsTrustResult};
use crate::keys::{
    decode, encode, read_protected_key, write_protected_key, Entropy, KeyIdentifierClause,
};
use crate::token::{SecurityTokenElement, TokenHandlerUsage};
use crate::types::constants::{
    attributes, claim_dialects, elements, is_trust_namespace, prefixes, BinaryEncoding,
    ComputedKeyAlgorithm, KeyType, RequestType, AUTH_NS, IDENTITY_NS, WSA_2004_NS, WSA_NS, WSU_NS,
};
use crate::types::{
    format_instant, parse_instant, AdditionalContext, BinaryExchange, ContextItem,
    EndpointReference, ExtensionProperties, Lifetime, Participants, Renewing, RequestClaim,
    RequestClaimCollection, RequestedProofToken, Status, UseKey,
};
use crate::version::{ProtocolVersion, TrustAdapter};
use crate::xml::{
    parse_bool, require_absolute_uri, QualifiedName, StartElement, XmlCursor, XmlEmitter,
};

/// Logs rejected input and hands the error back.
pub(crate) fn reject(error: WsTrustError) -> WsTrustError {
    tracing::warn!(error = %error, fault = error.fault_code(), "rejecting WS-Trust content");
    error
}

pub(crate) const fn xs_bool(value: bool) -> &'static str {
    if value {
        "true"
    } else {
        "false"
    }
}

/// The version table and collaborators for one read or write.
#[derive(Debug, Clone, Copy)]
pub(crate) struct Codec<'c> {
    pub(crate) adapter: &'static TrustAdapter,
    pub(crate) context: &'c SerializationContext,
}

impl<'c> Codec<'c> {
    pub(crate) const fn new(
        adapter: &'static TrustAdapter,
        context: &'c SerializationContext,
    ) -> Self {
        Self { adapter, context }
    }

    /// The same collaborators with another version table.
    pub(crate) const fn with_adapter(&self, adapter: &'static TrustAdapter) -> Self {
        Self {
            adapter,
            context: self.context,
        }
    }

    pub(crate) const fn ns(&self) -> &'static str {
        self.adapter.namespace
    }

    pub(crate) const fn prefix(&self) -> &'static str {
        self.adapter.prefix
    }

    pub(crate) const fn version(&self) -> ProtocolVersion {
        self.adapter.version
    }

    // ------------------------------------------------------------------
    // Simple values
    // ------------------------------------------------------------------

    pub(crate) fn read_uri(
        &self,
        cursor: &mut XmlCursor<'_>,
        local: &str,
    ) -> WsTrustResult<String> {
        let text = cursor.read_element_text(local, self.ns())?;
        let value = text.trim();
        require_absolute_uri(local, value).map_err(reject)?;
        Ok(value.to_string())
    }

    pub(crate) fn write_uri(
        &self,
        emitter: &mut XmlEmitter,
        local: &str,
        value: &str,
    ) -> WsTrustResult<()> {
        require_absolute_uri(local, value)?;
        emitter.element_string(self.prefix(), local, self.ns(), value)
    }

    pub(crate) fn read_request_type(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<RequestType> {
        let text = cursor.read_element_text(elements::REQUEST_TYPE, self.ns())?;
        let uri = text.trim();
        self.adapter.parse_request_type(uri).ok_or_else(|| {
            reject(WsTrustError::unsupported(format!(
                "RequestType {uri} is not defined by {}",
                self.version()
            )))
        })
    }

    pub(crate) fn write_request_type(
        &self,
        emitter: &mut XmlEmitter,
        request_type: RequestType,
    ) -> WsTrustResult<()> {
        emitter.element_string(
            self.prefix(),
            elements::REQUEST_TYPE,
            self.ns(),
            self.adapter.request_type_uri(request_type),
        )
    }

    pub(crate) fn read_key_type(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<KeyType> {
        let text = cursor.read_element_text(elements::KEY_TYPE, self.ns())?;
        let uri = text.trim();
        self.adapter.parse_key_type(uri).ok_or_else(|| {
            reject(WsTrustError::unsupported(format!(
                "KeyType {uri} is not defined by {}",
                self.version()
            )))
        })
    }

    pub(crate) fn write_key_type(
        &self,
        emitter: &mut XmlEmitter,
        key_type: KeyType,
    ) -> WsTrustResult<()> {
        emitter.element_string(
            self.prefix(),
            elements::KEY_TYPE,
            self.ns(),
            self.adapter.key_type_uri(key_type),
        )
    }

    fn parse_computed_key_algorithm(&self, uri: &str) -> WsTrustResult<ComputedKeyAlgorithm> {
        self.adapter.parse_computed_key_algorithm(uri).ok_or_else(|| {
            reject(WsTrustError::unsupported(format!(
                "computed key algorithm {uri} is not defined by {}",
                self.version()
            )))
        })
    }

    pub(crate) fn read_computed_key_algorithm(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<ComputedKeyAlgorithm> {
        let text = cursor.read_element_text(elements::COMPUTED_KEY_ALGORITHM, self.ns())?;
        self.parse_computed_key_algorithm(text.trim())
    }

    pub(crate) fn write_computed_key_algorithm(
        &self,
        emitter: &mut XmlEmitter,
        local: &str,
        algorithm: ComputedKeyAlgorithm,
    ) -> WsTrustResult<()> {
        emitter.element_string(
            self.prefix(),
            local,
            self.ns(),
            self.adapter.computed_key_algorithm_uri(algorithm),
        )
    }

    pub(crate) fn read_key_size(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<u32> {
        let bits = cursor.read_element_content_as_int()?;
        u32::try_from(bits).map_err(|_| {
            reject(WsTrustError::malformed("non-negative KeySize", bits.to_string()))
        })
    }

    pub(crate) fn write_key_size(&self, emitter: &mut XmlEmitter, bits: u32) -> WsTrustResult<()> {
        emitter.element_string(self.prefix(), elements::KEY_SIZE, self.ns(), &bits.to_string())
    }

    pub(crate) fn write_bool(
        &self,
        emitter: &mut XmlEmitter,
        local: &str,
        value: bool,
    ) -> WsTrustResult<()> {
        emitter.element_string(self.prefix(), local, self.ns(), xs_bool(value))
    }

    pub(crate) fn write_flag(&self, emitter: &mut XmlEmitter, local: &str) -> WsTrustResult<()> {
        emitter.empty_element(self.prefix(), local, self.ns(), &[])
    }

    // ------------------------------------------------------------------
    // Lifetime
    // ------------------------------------------------------------------

    pub(crate) fn read_lifetime(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<Lifetime> {
        cursor.read_start_element(elements::LIFETIME, self.ns())?;
        let created = if cursor.is_start_element_named(elements::CREATED, WSU_NS)? {
            Some(parse_instant(&cursor.read_element_text(elements::CREATED, WSU_NS)?)?)
        } else {
            None
        };
        let expires = if cursor.is_start_element_named(elements::EXPIRES, WSU_NS)? {
            Some(parse_instant(&cursor.read_element_text(elements::EXPIRES, WSU_NS)?)?)
        } else {
            None
        };
        if created.is_none() && expires.is_none() {
            let actual = cursor.describe_current()?;
            return Err(reject(WsTrustError::malformed("wsu:Created or wsu:Expires", actual)));
        }
        cursor.read_end_element()?;
        Ok(Lifetime::new(created, expires))
    }

    pub(crate) fn write_lifetime(
        &self,
        emitter: &mut XmlEmitter,
        lifetime: &Lifetime,
    ) -> WsTrustResult<()> {
        if lifetime.is_empty() {
            return Err(WsTrustError::invalid_request("Lifetime needs Created or Expires"));
        }
        emitter.start_element(self.prefix(), elements::LIFETIME, self.ns())?;
        if let Some(created) = &lifetime.created {
            let text = format_instant(created);
            emitter.element_string(prefixes::WSU, elements::CREATED, WSU_NS, &text)?;
        }
        if let Some(expires) = &lifetime.expires {
            let text = format_instant(expires);
            emitter.element_string(prefixes::WSU, elements::EXPIRES, WSU_NS, &text)?;
        }
        emitter.end_element()
    }

    // ------------------------------------------------------------------
    // Key material
    // ------------------------------------------------------------------

    pub(crate) fn read_entropy(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<Entropy> {
        cursor.read_start_element(elements::ENTROPY, self.ns())?;
        let handlers = self.context.default_handlers();
        let key = read_protected_key(cursor, self.adapter, &handlers, self.context.token_resolver())
            .map_err(reject)?;
        cursor.read_end_element()?;
        Ok(Entropy::new(key))
    }

    pub(crate) fn write_entropy(
        &self,
        emitter: &mut XmlEmitter,
        entropy: &Entropy,
    ) -> WsTrustResult<()> {
        emitter.start_element(self.prefix(), elements::ENTROPY, self.ns())?;
        let handlers = self.context.default_handlers();
        write_protected_key(emitter, entropy.protected_key(), self.adapter, &handlers)?;
        emitter.end_element()
    }

    pub(crate) fn read_proof_token(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<RequestedProofToken> {
        cursor.read_start_element(elements::REQUESTED_PROOF_TOKEN, self.ns())?;
        let proof = if cursor.is_start_element_named(elements::COMPUTED_KEY, self.ns())? {
            let text = cursor.read_element_text(elements::COMPUTED_KEY, self.ns())?;
            RequestedProofToken::ComputedKey(self.parse_computed_key_algorithm(text.trim())?)
        } else {
            let handlers = self.context.default_handlers();
            RequestedProofToken::ProtectedKey(
                read_protected_key(cursor, self.adapter, &handlers, self.context.token_resolver())
                    .map_err(reject)?,
            )
        };
        cursor.read_end_element()?;
        Ok(proof)
    }

    pub(crate) fn write_proof_token(
        &self,
        emitter: &mut XmlEmitter,
        proof: &RequestedProofToken,
    ) -> WsTrustResult<()> {
        emitter.start_element(self.prefix(), elements::REQUESTED_PROOF_TOKEN, self.ns())?;
        match proof {
            RequestedProofToken::ComputedKey(algorithm) => {
                self.write_computed_key_algorithm(emitter, elements::COMPUTED_KEY, *algorithm)?;
            }
            RequestedProofToken::ProtectedKey(key) => {
                let handlers = self.context.default_handlers();
                write_protected_key(emitter, key, self.adapter, &handlers)?;
            }
        }
        emitter.end_element()
    }

    pub(crate) fn read_clause_element(
        &self,
        cursor: &mut XmlCursor<'_>,
        local: &str,
    ) -> WsTrustResult<KeyIdentifierClause> {
        cursor.read_start_element(local, self.ns())?;
        let fragment = cursor.capture_element()?;
        cursor.read_end_element()?;
        self.context
            .default_handlers()
            .read_key_identifier_clause(&fragment)
            .map_err(reject)
    }

    pub(crate) fn write_clause_element(
        &self,
        emitter: &mut XmlEmitter,
        local: &str,
        clause: &KeyIdentifierClause,
    ) -> WsTrustResult<()> {
        emitter.start_element(self.prefix(), local, self.ns())?;
        self.context
            .default_handlers()
            .write_key_identifier_clause(emitter, clause)?;
        emitter.end_element()
    }

    // ------------------------------------------------------------------
    // Embedded tokens
    // ------------------------------------------------------------------

    /// Captures the single child of an opaque token element.
    pub(crate) fn read_token_element(
        &self,
        cursor: &mut XmlCursor<'_>,
        local: &str,
        namespace: &str,
        usage: TokenHandlerUsage,
    ) -> WsTrustResult<SecurityTokenElement> {
        if usage != TokenHandlerUsage::Default && !self.context.handlers().contains(usage) {
            return Err(reject(WsTrustError::unsupported(format!(
                "{local} requires {usage} token handlers"
            ))));
        }
        cursor.read_start_element(local, namespace)?;
        if !cursor.is_start_element()? {
            let actual = cursor.describe_current()?;
            return Err(reject(WsTrustError::malformed(format!("token inside {local}"), actual)));
        }
        let fragment = cursor.capture_element()?;
        tracing::debug!(element = local, token = %fragment.root(), "captured embedded token");
        cursor.read_end_element()?;
        Ok(SecurityTokenElement::from_xml(fragment))
    }

    pub(crate) fn write_token_element(
        &self,
        emitter: &mut XmlEmitter,
        (prefix, local, namespace): (&str, &str, &str),
        element: &SecurityTokenElement,
        usage: TokenHandlerUsage,
    ) -> WsTrustResult<()> {
        emitter.start_element(prefix, local, namespace)?;
        element.write(emitter, &self.context.handlers_for(usage))?;
        emitter.end_element()
    }

    pub(crate) fn read_use_key(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<UseKey> {
        cursor.read_start_element(elements::USE_KEY, self.ns())?;
        if !cursor.is_start_element()? {
            let actual = cursor.describe_current()?;
            return Err(reject(WsTrustError::malformed(
                "token or key identifier inside UseKey",
                actual,
            )));
        }
        let fragment = cursor.capture_element()?;
        cursor.read_end_element()?;

        let handlers = self.context.default_handlers();
        let (token, clause) = if handlers.can_read_token(&fragment) {
            let element = SecurityTokenElement::from_xml(fragment).into_resolved(&handlers)?;
            let clause = element
                .token()
                .and_then(|token| token.key_identifier_clause())
                .ok_or_else(|| {
                    reject(WsTrustError::unsupported("UseKey token has no key identifier"))
                })?;
            (Some(element), clause)
        } else if handlers.can_read_key_identifier_clause(&fragment) {
            (None, handlers.read_key_identifier_clause(&fragment)?)
        } else {
            return Err(reject(WsTrustError::unsupported(format!(
                "no handler can read UseKey content {}",
                fragment.root()
            ))));
        };

        let proven = self
            .context
            .use_key_resolver()
            .try_resolve_token(&clause)
            .ok_or_else(|| {
                reject(WsTrustError::invalid_request(
                    "UseKey does not identify a key the requester holds",
                ))
            })?;
        let token = token.unwrap_or_else(|| SecurityTokenElement::from_token(proven));
        Ok(UseKey {
            token: Some(token),
            key_identifier: Some(clause),
        })
    }

    pub(crate) fn write_use_key(
        &self,
        emitter: &mut XmlEmitter,
        use_key: &UseKey,
    ) -> WsTrustResult<()> {
        let handlers = self.context.default_handlers();
        emitter.start_element(self.prefix(), elements::USE_KEY, self.ns())?;
        match (&use_key.token, &use_key.key_identifier) {
            (Some(token), _) => token.write(emitter, &handlers)?,
            (None, Some(clause)) => handlers.write_key_identifier_clause(emitter, clause)?,
            (None, None) => {
                return Err(WsTrustError::invalid_request(
                    "UseKey needs a token or a key identifier",
                ))
            }
        }
        emitter.end_element()
    }

    // ------------------------------------------------------------------
    // Structured elements
    // ------------------------------------------------------------------

    pub(crate) fn read_claims(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<RequestClaimCollection> {
        let start = cursor.read_start_element(elements::CLAIMS, self.ns())?;
        let dialect = match start.attribute(attributes::DIALECT) {
            Some(dialect) => {
                require_absolute_uri("Claims Dialect", dialect).map_err(reject)?;
                dialect.to_string()
            }
            None => claim_dialects::IDENTITY.to_string(),
        };
        let authorization = dialect == claim_dialects::AUTHORIZATION;
        let claim_ns = claim_namespace(&dialect);

        let mut claims = RequestClaimCollection::with_dialect(dialect.clone());
        while cursor.is_start_element()? {
            let claim_start = cursor.read_start_element(elements::CLAIM_TYPE, claim_ns)?;
            let claim_type = claim_start
                .attribute(attributes::URI)
                .filter(|uri| !uri.is_empty())
                .ok_or_else(|| {
                    reject(WsTrustError::malformed("Uri attribute on ClaimType", "none"))
                })?
                .to_string();
            require_absolute_uri("ClaimType Uri", &claim_type).map_err(reject)?;
            let optional = claim_start
                .attribute(attributes::OPTIONAL)
                .map(parse_bool)
                .transpose()?
                .unwrap_or(false);

            let mut value = None;
            if cursor.is_start_element_named(elements::VALUE, claim_ns)? {
                if !authorization {
                    return Err(reject(WsTrustError::invalid_request(format!(
                        "claim values are not allowed in dialect {dialect}"
                    ))));
                }
                value = Some(cursor.read_element_text(elements::VALUE, claim_ns)?);
            }
            cursor.read_end_element()?;
            claims.claims.push(RequestClaim {
                claim_type,
                optional,
                value,
            });
        }
        cursor.read_end_element()?;
        Ok(claims)
    }

    pub(crate) fn write_claims(
        &self,
        emitter: &mut XmlEmitter,
        claims: &RequestClaimCollection,
    ) -> WsTrustResult<()> {
        require_absolute_uri("Claims Dialect", &claims.dialect)?;
        let authorization = claims.is_authorization_dialect();
        let claim_ns = claim_namespace(&claims.dialect);
        let claim_prefix = if authorization { prefixes::AUTH } else { prefixes::IDENTITY };

        emitter.start_element_with(
            self.prefix(),
            elements::CLAIMS,
            self.ns(),
            &[(attributes::DIALECT, claims.dialect.as_str())],
        )?;
        for claim in &claims.claims {
            require_absolute_uri("ClaimType Uri", &claim.claim_type)?;
            let claim_attributes = [
                (attributes::URI, claim.claim_type.as_str()),
                (attributes::OPTIONAL, xs_bool(claim.optional)),
            ];
            match &claim.value {
                None => emitter.empty_element(
                    claim_prefix,
                    elements::CLAIM_TYPE,
                    claim_ns,
                    &claim_attributes,
                )?,
                Some(_) if !authorization => {
                    return Err(WsTrustError::invalid_request(format!(
                        "claim values are not allowed in dialect {}",
                        claims.dialect
                    )));
                }
                Some(value) => {
                    emitter.start_element_with(
                        claim_prefix,
                        elements::CLAIM_TYPE,
                        claim_ns,
                        &claim_attributes,
                    )?;
                    emitter.element_string(claim_prefix, elements::VALUE, claim_ns, value)?;
                    emitter.end_element()?;
                }
            }
        }
        emitter.end_element()
    }

    pub(crate) fn read_renewing(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<Renewing> {
        let start = cursor.read_start_element(elements::RENEWING, self.ns())?;
        let renewing = Renewing::new(
            bool_attribute(&start, attributes::ALLOW)?.unwrap_or(true),
            bool_attribute(&start, attributes::OK)?.unwrap_or(false),
        );
        cursor.read_end_element()?;
        Ok(renewing)
    }

    pub(crate) fn write_renewing(
        &self,
        emitter: &mut XmlEmitter,
        renewing: &Renewing,
    ) -> WsTrustResult<()> {
        emitter.empty_element(
            self.prefix(),
            elements::RENEWING,
            self.ns(),
            &[
                (attributes::ALLOW, xs_bool(renewing.allow_renewal)),
                (attributes::OK, xs_bool(renewing.ok_for_renewal_after_expiration)),
            ],
        )
    }

    pub(crate) fn read_participants(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<Participants> {
        cursor.read_start_element(elements::PARTICIPANTS, self.ns())?;
        let mut participants = Participants::new();
        while let Some(name) = peek_name(cursor)? {
            if name.is(elements::PRIMARY, self.ns()) {
                let primary = read_endpoint_wrapper(cursor, elements::PRIMARY, self.ns())?;
                participants.primary = Some(primary);
            } else if name.is(elements::PARTICIPANT, self.ns()) {
                participants
                    .participants
                    .push(read_endpoint_wrapper(cursor, elements::PARTICIPANT, self.ns())?);
            } else {
                return Err(reject(WsTrustError::malformed(
                    "Primary or Participant",
                    name.to_string(),
                )));
            }
        }
        cursor.read_end_element()?;
        Ok(participants)
    }

    pub(crate) fn write_participants(
        &self,
        emitter: &mut XmlEmitter,
        participants: &Participants,
    ) -> WsTrustResult<()> {
        emitter.start_element(self.prefix(), elements::PARTICIPANTS, self.ns())?;
        if let Some(primary) = &participants.primary {
            let name = (self.prefix(), elements::PRIMARY, self.ns());
            write_endpoint_wrapper(emitter, name, primary)?;
        }
        for participant in &participants.participants {
            let name = (self.prefix(), elements::PARTICIPANT, self.ns());
            write_endpoint_wrapper(emitter, name, participant)?;
        }
        emitter.end_element()
    }

    pub(crate) fn read_binary_exchange(
        &self,
        cursor: &mut XmlCursor<'_>,
    ) -> WsTrustResult<BinaryExchange> {
        let start = cursor.read_start_element(elements::BINARY_EXCHANGE, self.ns())?;
        let value_type = uri_attribute(&start, attributes::VALUE_TYPE, elements::BINARY_EXCHANGE)?;
        let encoding_uri =
            uri_attribute(&start, attributes::ENCODING_TYPE, elements::BINARY_EXCHANGE)?;
        let encoding = BinaryEncoding::from_uri(&encoding_uri).ok_or_else(|| {
            reject(WsTrustError::unsupported(format!(
                "BinaryExchange encoding {encoding_uri}"
            )))
        })?;
        let text = cursor.read_text()?;
        cursor.read_end_element()?;
        Ok(BinaryExchange {
            binary_data: decode(encoding, &text)?,
            value_type,
            encoding,
        })
    }

    pub(crate) fn write_binary_exchange(
        &self,
        emitter: &mut XmlEmitter,
        exchange: &BinaryExchange,
    ) -> WsTrustResult<()> {
        require_absolute_uri("BinaryExchange ValueType", &exchange.value_type)?;
        emitter.start_element_with(
            self.prefix(),
            elements::BINARY_EXCHANGE,
            self.ns(),
            &[
                (attributes::VALUE_TYPE, exchange.value_type.as_str()),
                (attributes::ENCODING_TYPE, exchange.encoding.uri()),
            ],
        )?;
        emitter.text(&encode(exchange.encoding, &exchange.binary_data))?;
        emitter.end_element()
    }

    pub(crate) fn read_status(&self, cursor: &mut XmlCursor<'_>) -> WsTrustResult<Status> {
        cursor.read_start_element(elements::STATUS, self.ns())?;
        let code = cursor.read_element_text(elements::CODE, self.ns())?;
        let reason = if cursor.is_start_element_named(elements::REASON, self.ns())? {
            Some(cursor.read_element_text(elements::REASON, self.ns())?)
        } else {
            None
        };
        cursor.read_end_element()?;
        Ok(Status {
            code: code.trim().to_string(),
            reason,
        })
    }

    pub(crate) fn write_status(
        &self,
        emitter: &mut XmlEmitter,
        status: &Status,
    ) -> WsTrustResult<()> {
        emitter.start_element(self.prefix(), elements::STATUS, self.ns())?;
        emitter.element_string(self.prefix(), elements::CODE, self.ns(), &status.code)?;
        if let Some(reason) = &status.reason {
            emitter.element_string(self.prefix(), elements::REASON, self.ns(), reason)?;
        }
        emitter.end_element()
    }

    // ------------------------------------------------------------------
    // Everything else
    // ------------------------------------------------------------------

    /// Keeps a foreign element as an extension property, or rejects it.
    pub(crate) fn read_unknown(
        &self,
        cursor: &mut XmlCursor<'_>,
        extensions: &mut ExtensionProperties,
    ) -> WsTrustResult<()> {
        let fragment = cursor.capture_element()?;
        let name = fragment.root();
        if is_trust_namespace(&name.namespace) {
            return Err(reject(WsTrustError::unsupported(format!(
                "element {name} is not supported by {}",
                self.version()
            ))));
        }
        if !self.context.config().capture_foreign_elements {
            return Err(reject(WsTrustError::unsupported(format!("foreign element {name}"))));
        }
        tracing::debug!(element = %name, "kept extension element");
        extensions.append(fragment);
        Ok(())
    }
}

/// Name of the start element at the cursor, if any.
pub(crate) fn peek_name(cursor: &mut XmlCursor<'_>) -> WsTrustResult<Option<QualifiedName>> {
    Ok(cursor.peek_start()?.map(|start| start.name.clone()))
}

fn claim_namespace(dialect: &str) -> &'static str {
    if dialect == claim_dialects::AUTHORIZATION {
        AUTH_NS
    } else {
        IDENTITY_NS
    }
}

fn bool_attribute(start: &StartElement, name: &str) -> WsTrustResult<Option<bool>> {
    start.attribute(name).map(parse_bool).transpose()
}

fn uri_attribute(start: &StartElement, name: &str, element: &str) -> WsTrustResult<String> {
    let value = start
        .attribute(name)
        .ok_or_else(|| {
            reject(WsTrustError::malformed(format!("{name} attribute on {element}"), "none"))
        })?;
    require_absolute_uri(&format!("{element} {name}"), value).map_err(reject)?;
    Ok(value.to_string())
}

/// Reads `<wrapper><wsa:EndpointReference>...</wsa:EndpointReference></wrapper>`.
pub(crate) fn read_endpoint_wrapper(
    cursor: &mut XmlCursor<'_>,
    local: &str,
    namespace: &str,
) -> WsTrustResult<EndpointReference> {
    cursor.read_start_element(local, namespace)?;
    let wsa = match peek_name(cursor)? {
        Some(name) if is_endpoint_reference(&name) => name.namespace,
        _ => {
            let actual = cursor.describe_current()?;
            return Err(reject(WsTrustError::malformed(
                format!("wsa:EndpointReference inside {local}"),
                actual,
            )));
        }
    };

    cursor.read_start()?;
    let mut address = None;
    let mut details = Vec::new();
    while let Some(name) = peek_name(cursor)? {
        if name.is(elements::ADDRESS, &wsa) {
            let text = cursor.read_element_text(elements::ADDRESS, &wsa)?;
            address = Some(text.trim().to_string());
        } else {
            details.push(cursor.capture_element()?);
        }
    }
    cursor.read_end_element()?;
    cursor.read_end_element()?;

    let address = address.ok_or_else(|| reject(WsTrustError::malformed("wsa:Address", "none")))?;
    require_absolute_uri("EndpointReference Address", &address).map_err(reject)?;
    Ok(EndpointReference { address, details })
}

fn is_endpoint_reference(name: &QualifiedName) -> bool {
    name.local == elements::ENDPOINT_REFERENCE
        && (name.namespace == WSA_NS || name.namespace == WSA_2004_NS)
}

/// Writes an endpoint reference inside a wrapper, always as WS-Addressing 1.0.
pub(crate) fn write_endpoint_wrapper(
    emitter: &mut XmlEmitter,
    (prefix, local, namespace): (&str, &str, &str),
    reference: &EndpointReference,
) -> WsTrustResult<()> {
    require_absolute_uri("EndpointReference Address", &reference.address)?;
    emitter.start_element(prefix, local, namespace)?;
    emitter.start_element(prefixes::WSA, elements::ENDPOINT_REFERENCE, WSA_NS)?;
    emitter.element_string(prefixes::WSA, elements::ADDRESS, WSA_NS, &reference.address)?;
    for detail in &reference.details {
        emitter.raw(detail);
    }
    emitter.end_element()?;
    emitter.end_element()
}

pub(crate) fn read_additional_context(
    cursor: &mut XmlCursor<'_>,
) -> WsTrustResult<AdditionalContext> {
    cursor.read_start_element(elements::ADDITIONAL_CONTEXT, AUTH_NS)?;
    let mut context = AdditionalContext::new();
    while let Some(name) = peek_name(cursor)? {
        if !name.is(elements::CONTEXT_ITEM, AUTH_NS) {
            return Err(reject(WsTrustError::malformed("auth:ContextItem", name.to_string())));
        }
        let item_start = cursor.read_start()?;
        let name = uri_attribute(&item_start, attributes::NAME, elements::CONTEXT_ITEM)?;
        let scope = match item_start.attribute(attributes::SCOPE) {
            Some(scope) => {
                require_absolute_uri("ContextItem Scope", scope).map_err(reject)?;
                Some(scope.to_string())
            }
            None => None,
        };
        let value = if cursor.is_start_element_named(elements::VALUE, AUTH_NS)? {
            Some(cursor.read_element_text(elements::VALUE, AUTH_NS)?)
        } else {
            None
        };
        cursor.read_end_element()?;
        context.items.push(ContextItem { name, scope, value });
    }
    cursor.read_end_element()?;
    Ok(context)
}

pub(crate) fn write_additional_context(
    emitter: &mut XmlEmitter,
    context: &AdditionalContext,
) -> WsTrustResult<()> {
    emitter.start_element(prefixes::AUTH, elements::ADDITIONAL_CONTEXT, AUTH_NS)?;
    for item in &context.items {
        require_absolute_uri("ContextItem Name", &item.name)?;
        let mut item_attributes = vec![(attributes::NAME, item.name.as_str())];
        if let Some(scope) = &item.scope {
            require_absolute_uri("ContextItem Scope", scope)?;
            item_attributes.push((attributes::SCOPE, scope.as_str()));
        }
        match &item.value {
            Some(value) => {
                emitter.start_element_with(
                    prefixes::AUTH,
                    elements::CONTEXT_ITEM,
                    AUTH_NS,
                    &item_attributes,
                )?;
                emitter.element_string(prefixes::AUTH, elements::VALUE, AUTH_NS, value)?;
                emitter.end_element()?;
            }
            None => emitter.empty_element(
                prefixes::AUTH,
                elements::CONTEXT_ITEM,
                AUTH_NS,
                &item_attributes,
            )?,
        }
    }
    emitter.end_element()
}

pub(crate) fn write_extensions(emitter: &mut XmlEmitter, extensions: &ExtensionProperties) {
    for (_, fragment) in extensions.iter() {
        emitter.raw(fragment);
    }
}
