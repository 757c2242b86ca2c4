use jsonwebtoken::{Algorithm, DecodingKey, Validation, errors::ErrorKind};

use crate::services::auth::claims::{Claims, TokenError, peek_algorithm};

/// The only algorithm the identity provider signs with.
pub const EXPECTED_ALGORITHM: &str = "RS256";

/// Authoritative token check: signature, algorithm and registered claims.
///
/// This is the expensive path the validation cache exists to avoid; it is a
/// trait so the gate can be exercised with instrumented verifiers.
pub trait SignatureVerifier: Send + Sync {
    fn verify(&self, token: &str) -> Result<Claims, TokenError>;
}

/// RS256 access-token verifier backed by a PEM public key.
///
/// - Key material is intentionally not printable via Debug.
#[derive(Clone)]
pub struct RsaSignatureVerifier {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for RsaSignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Do not print key material
        f.debug_struct("RsaSignatureVerifier")
            .field("validation", &self.validation)
            .finish()
    }
}

impl RsaSignatureVerifier {
    pub fn new(
        public_key_pem: &[u8],
        issuer: Option<&str>,
        audience: Option<&str>,
    ) -> Result<Self, jsonwebtoken::errors::Error> {
        let decoding_key = DecodingKey::from_rsa_pem(public_key_pem)?;

        let mut validation = Validation::new(Algorithm::RS256);
        validation.leeway = 0;
        validation.validate_exp = true;
        validation.set_required_spec_claims(&["exp", "sub"]);

        if let Some(issuer) = issuer {
            validation.set_issuer(&[issuer]);
        }
        match audience {
            Some(audience) => validation.set_audience(&[audience]),
            // Without a configured audience any `aud` claim would be rejected.
            None => validation.validate_aud = false,
        }

        Ok(Self {
            decoding_key,
            validation,
        })
    }
}

impl SignatureVerifier for RsaSignatureVerifier {
    fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        // Check the declared algorithm ourselves first: `none` and HMAC variants
        // must never reach key selection.
        let alg = peek_algorithm(token)?;
        if alg != EXPECTED_ALGORITHM {
            return Err(TokenError::DisallowedAlgorithm(alg));
        }

        let data = jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)
            .map_err(map_jwt_error)?;

        Ok(data.claims)
    }
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> TokenError {
    match e.kind() {
        ErrorKind::InvalidSignature => TokenError::InvalidSignature,
        ErrorKind::InvalidAlgorithm => TokenError::DisallowedAlgorithm(EXPECTED_ALGORITHM.into()),
        ErrorKind::ExpiredSignature => TokenError::Expired,
        ErrorKind::ImmatureSignature => TokenError::Rejected("nbf"),
        ErrorKind::InvalidIssuer => TokenError::Rejected("iss"),
        ErrorKind::InvalidAudience => TokenError::Rejected("aud"),
        ErrorKind::MissingRequiredClaim(_) => TokenError::Rejected("missing required claim"),
        _ => TokenError::Malformed("token could not be decoded"),
    }
}
