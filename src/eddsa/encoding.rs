//! Key import/export: raw DER OctetString, PKCS#8, SPKI and JWK forms.
//!
//! RFC 8410 layout: the PKCS#8 `privateKey` octets hold a nested
//! OctetString around the raw seed, and the algorithm identifier carries
//! no parameters. Import tolerates an explicit NULL in their place but
//! nothing else.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use der::asn1::{AnyRef, BitStringRef, OctetStringRef};
use der::{Decode, Encode};
use pkcs8::PrivateKeyInfo;
use serde::{Deserialize, Serialize};
use spki::{AlgorithmIdentifierRef, ObjectIdentifier, SubjectPublicKeyInfoRef};

use super::{
    private_key_verify, public_key_create, public_key_verify, EddsaError, Result, SIZE,
};

/// RFC 8410 id-Ed25519.
const ED25519_OID: ObjectIdentifier = ObjectIdentifier::new_unwrap("1.3.101.112");

fn algorithm() -> AlgorithmIdentifierRef<'static> {
    AlgorithmIdentifierRef {
        oid: ED25519_OID,
        parameters: None,
    }
}

fn check_algorithm(alg: &AlgorithmIdentifierRef<'_>) -> Result<()> {
    if alg.oid != ED25519_OID {
        return Err(EddsaError::AlgorithmMismatch);
    }
    match alg.parameters {
        None => Ok(()),
        Some(params) if params == AnyRef::NULL => Ok(()),
        Some(_) => Err(EddsaError::AlgorithmMismatch),
    }
}

// --- raw ---

/// Seed wrapped in a DER OctetString.
pub fn private_key_export(secret: &[u8]) -> Result<Vec<u8>> {
    if !private_key_verify(secret) {
        return Err(EddsaError::InvalidSecret);
    }
    Ok(OctetStringRef::new(secret)?.to_der()?)
}

pub fn private_key_import(data: &[u8]) -> Result<[u8; SIZE]> {
    let octets = OctetStringRef::from_der(data)?;
    octets
        .as_bytes()
        .try_into()
        .map_err(|_| EddsaError::InvalidSecret)
}

/// Raw public key, validated.
pub fn public_key_export(key: &[u8]) -> Result<[u8; SIZE]> {
    public_key_import(key)
}

pub fn public_key_import(data: &[u8]) -> Result<[u8; SIZE]> {
    if !public_key_verify(data) {
        return Err(EddsaError::InvalidPoint);
    }
    data.try_into().map_err(|_| EddsaError::InvalidPoint)
}

// --- PKCS#8 / SPKI ---

pub fn private_key_export_pkcs8(secret: &[u8]) -> Result<Vec<u8>> {
    if !private_key_verify(secret) {
        return Err(EddsaError::InvalidSecret);
    }
    let inner = OctetStringRef::new(secret)?.to_der()?;
    Ok(PrivateKeyInfo::new(algorithm(), &inner).to_der()?)
}

pub fn private_key_import_pkcs8(data: &[u8]) -> Result<[u8; SIZE]> {
    let info = PrivateKeyInfo::from_der(data)?;
    check_algorithm(&info.algorithm)?;
    private_key_import(info.private_key)
}

pub fn public_key_export_spki(key: &[u8]) -> Result<Vec<u8>> {
    let key = public_key_import(key)?;
    let spki = SubjectPublicKeyInfoRef {
        algorithm: algorithm(),
        subject_public_key: BitStringRef::from_bytes(&key)?,
    };
    Ok(spki.to_der()?)
}

pub fn public_key_import_spki(data: &[u8]) -> Result<[u8; SIZE]> {
    let spki = SubjectPublicKeyInfoRef::from_der(data)?;
    check_algorithm(&spki.algorithm)?;
    public_key_import(spki.subject_public_key.raw_bytes())
}

// --- JWK (RFC 8037 "OKP") ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Jwk {
    pub kty: String,
    pub crv: String,
    pub x: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub d: Option<String>,
}

impl Jwk {
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|_| EddsaError::InvalidJwk)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|_| EddsaError::InvalidJwk)
    }
}

pub fn private_key_export_jwk(secret: &[u8]) -> Result<Jwk> {
    let key = public_key_create(secret)?;
    Ok(Jwk {
        kty: "OKP".into(),
        crv: "Ed25519".into(),
        x: URL_SAFE_NO_PAD.encode(key),
        d: Some(URL_SAFE_NO_PAD.encode(secret)),
    })
}

pub fn private_key_import_jwk(jwk: &Jwk) -> Result<[u8; SIZE]> {
    if jwk.kty != "OKP" || jwk.crv != "Ed25519" {
        return Err(EddsaError::InvalidJwk);
    }
    let d = jwk.d.as_ref().ok_or(EddsaError::InvalidJwk)?;
    let secret: [u8; SIZE] = URL_SAFE_NO_PAD
        .decode(d)
        .map_err(|_| EddsaError::InvalidJwk)?
        .try_into()
        .map_err(|_| EddsaError::InvalidJwk)?;
    // The embedded public half must agree with the seed.
    let x = URL_SAFE_NO_PAD
        .decode(&jwk.x)
        .map_err(|_| EddsaError::InvalidJwk)?;
    if x[..] != public_key_create(&secret)?[..] {
        return Err(EddsaError::InvalidJwk);
    }
    Ok(secret)
}

pub fn public_key_export_jwk(key: &[u8]) -> Result<Jwk> {
    let key = public_key_import(key)?;
    Ok(Jwk {
        kty: "OKP".into(),
        crv: "Ed25519".into(),
        x: URL_SAFE_NO_PAD.encode(key),
        d: None,
    })
}

pub fn public_key_import_jwk(jwk: &Jwk) -> Result<[u8; SIZE]> {
    if jwk.kty != "OKP" || jwk.crv != "Ed25519" {
        return Err(EddsaError::InvalidJwk);
    }
    let key = URL_SAFE_NO_PAD
        .decode(&jwk.x)
        .map_err(|_| EddsaError::InvalidJwk)?;
    public_key_import(&key)
}

#[cfg(test)]
mod tests {
    use super::super::private_key_generate;
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        let secret = private_key_generate();
        let der = private_key_export(&secret).unwrap();
        assert_eq!(private_key_import(&der).unwrap(), secret);
        // OctetString header is 2 bytes for a 32-byte payload.
        assert_eq!(der.len(), SIZE + 2);
    }

    #[test]
    fn test_pkcs8_roundtrip() {
        let secret = private_key_generate();
        let der = private_key_export_pkcs8(&secret).unwrap();
        assert_eq!(private_key_import_pkcs8(&der).unwrap(), secret);
    }

    #[test]
    fn test_spki_roundtrip() {
        let secret = private_key_generate();
        let key = public_key_create(&secret).unwrap();
        let der = public_key_export_spki(&key).unwrap();
        assert_eq!(public_key_import_spki(&der).unwrap(), key);
    }

    #[test]
    fn test_jwk_roundtrip() {
        let secret = private_key_generate();
        let jwk = private_key_export_jwk(&secret).unwrap();
        assert_eq!(private_key_import_jwk(&jwk).unwrap(), secret);

        let reparsed = Jwk::from_json(&jwk.to_json().unwrap()).unwrap();
        assert_eq!(reparsed, jwk);

        let key = public_key_create(&secret).unwrap();
        let pub_jwk = public_key_export_jwk(&key).unwrap();
        assert!(pub_jwk.d.is_none());
        assert_eq!(public_key_import_jwk(&pub_jwk).unwrap(), key);
    }

    #[test]
    fn test_jwk_rejects_wrong_curve() {
        let secret = private_key_generate();
        let mut jwk = private_key_export_jwk(&secret).unwrap();
        jwk.crv = "X25519".into();
        assert!(private_key_import_jwk(&jwk).is_err());
    }

    #[test]
    fn test_pkcs8_rejects_foreign_oid() {
        // An RSA PrivateKeyInfo header should not import.
        let secret = private_key_generate();
        let mut der = private_key_export_pkcs8(&secret).unwrap();
        // Clobber the OID arc (1.3.101.112 -> 1.3.101.110).
        let pos = der
            .windows(3)
            .position(|w| w == [0x2b, 0x65, 0x70])
            .unwrap();
        der[pos + 2] = 0x6e;
        assert!(private_key_import_pkcs8(&der).is_err());
    }
}
