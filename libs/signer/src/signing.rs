//! Signing Module: signer keys and trade authorizations
//!
//! A signer attests to a payload by signing
//! `keccak256("\x19Ethereum Signed Message:\n32" ‖ keccak256(bytes))`
//! with a secp256k1 key. The 65-byte result is `r ‖ s ‖ v` with `v` in
//! the 27/28 form wallets produce.

use libsecp256k1::{Message, PublicKey, SecretKey};
use serde::{Deserialize, Serialize};
use std::fmt;

use trade_types::digest::{keccak256, payload_digest};
use trade_types::ids::Address;
use trade_types::payload::{ClaimPayload, CreateTradePayload, PayloadError, SignedPayload};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Length of a recoverable signature: r (32) ‖ s (32) ‖ v (1).
pub const SIGNATURE_LEN: usize = 65;

/// Offset added to the raw recovery id to form `v`.
const RECOVERY_ID_OFFSET: u8 = 27;

// ---------------------------------------------------------------------------
// Signer key
// ---------------------------------------------------------------------------

/// A secp256k1 signing key.
///
/// `Debug` prints only the derived address; the secret never leaves the type.
#[derive(Clone)]
pub struct SignerKey {
    secret: SecretKey,
}

impl SignerKey {
    /// Load a key from its 32 raw bytes.
    pub fn from_bytes(bytes: &[u8; 32]) -> Result<Self, SigningError> {
        SecretKey::parse(bytes)
            .map(|secret| Self { secret })
            .map_err(|_| SigningError::InvalidSecretKey)
    }

    /// Load a key from hex (with or without `0x`).
    pub fn from_hex(text: &str) -> Result<Self, SigningError> {
        let digits = text.strip_prefix("0x").unwrap_or(text);
        let raw = hex::decode(digits).map_err(|_| SigningError::InvalidHex)?;
        SecretKey::parse_slice(&raw)
            .map(|secret| Self { secret })
            .map_err(|_| SigningError::InvalidSecretKey)
    }

    /// Deterministic key derived as `keccak256(seed)`. For fixtures and local setups.
    pub fn from_seed(seed: &str) -> Result<Self, SigningError> {
        Self::from_bytes(&keccak256(seed.as_bytes()))
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey::from_secret_key(&self.secret)
    }

    /// The identity a verifier recovers from this key's signatures.
    pub fn address(&self) -> Address {
        let serialized = self.public_key().serialize();
        let mut uncompressed = [0u8; 64];
        uncompressed.copy_from_slice(&serialized[1..65]);
        Address::from_public_key(&uncompressed)
    }

    /// Sign a prepared 32-byte digest. No prefixing happens here.
    pub fn sign_digest(&self, digest: &[u8; 32]) -> [u8; SIGNATURE_LEN] {
        let (signature, recovery_id) = libsecp256k1::sign(&Message::parse(digest), &self.secret);
        let mut out = [0u8; SIGNATURE_LEN];
        out[..64].copy_from_slice(&signature.serialize());
        out[64] = recovery_id.serialize() + RECOVERY_ID_OFFSET;
        out
    }

    /// Sign already-encoded payload bytes.
    pub fn sign_bytes(&self, data: Vec<u8>) -> SignedAuthorization {
        let signature = self.sign_digest(&payload_digest(&data)).to_vec();
        SignedAuthorization { data, signature }
    }

    /// Encode and sign the terms of a new trade.
    pub fn sign_create(
        &self,
        payload: &CreateTradePayload,
    ) -> Result<SignedAuthorization, SigningError> {
        Ok(self.sign_bytes(payload.encode()?))
    }

    /// Encode and sign a claim batch.
    pub fn sign_claim(&self, payload: &ClaimPayload) -> Result<SignedAuthorization, SigningError> {
        Ok(self.sign_bytes(payload.encode()?))
    }
}

impl fmt::Debug for SignerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignerKey")
            .field("address", &self.address())
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// Signed authorization
// ---------------------------------------------------------------------------

/// Encoded payload plus the signer's signature over it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignedAuthorization {
    pub data: Vec<u8>,
    pub signature: Vec<u8>,
}

impl SignedAuthorization {
    pub fn data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }

    pub fn signature_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.signature))
    }

    /// Rebuild from hex transport form (as produced by `data_hex`/`signature_hex`).
    pub fn from_hex(data: &str, signature: &str) -> Result<Self, SigningError> {
        let decode = |text: &str| {
            hex::decode(text.strip_prefix("0x").unwrap_or(text)).map_err(|_| SigningError::InvalidHex)
        };
        Ok(Self {
            data: decode(data)?,
            signature: decode(signature)?,
        })
    }
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Signing module errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SigningError {
    #[error("Invalid secret key")]
    InvalidSecretKey,

    #[error("Invalid hex encoding")]
    InvalidHex,

    #[error("Payload error: {0}")]
    Payload(#[from] PayloadError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use libsecp256k1::{RecoveryId, Signature};
    use trade_types::ids::TradeId;

    fn test_key() -> SignerKey {
        SignerKey::from_seed("Alice").unwrap()
    }

    fn sample_create() -> CreateTradePayload {
        CreateTradePayload {
            trade_id: TradeId::new(1),
            trader: Address::repeat_byte(0x01),
            start_time: 100,
            end_time: 200,
            settlement_asset: Address::repeat_byte(0x02),
            amount: 50,
            admin_fee: 1,
            reward: 90,
            expiry: 150,
        }
    }

    fn recover(digest: &[u8; 32], sig: &[u8]) -> Address {
        let signature = Signature::parse_standard_slice(&sig[..64]).unwrap();
        let recovery_id = RecoveryId::parse(sig[64] - RECOVERY_ID_OFFSET).unwrap();
        let public = libsecp256k1::recover(&Message::parse(digest), &signature, &recovery_id).unwrap();
        let mut uncompressed = [0u8; 64];
        uncompressed.copy_from_slice(&public.serialize()[1..65]);
        Address::from_public_key(&uncompressed)
    }

    #[test]
    fn test_secret_key_one_address() {
        let mut bytes = [0u8; 32];
        bytes[31] = 1;
        let key = SignerKey::from_bytes(&bytes).unwrap();
        assert_eq!(
            key.address().to_string(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf"
        );
    }

    #[test]
    fn test_zero_secret_rejected() {
        assert_eq!(
            SignerKey::from_bytes(&[0u8; 32]).unwrap_err(),
            SigningError::InvalidSecretKey
        );
    }

    #[test]
    fn test_from_hex() {
        let key = SignerKey::from_hex(
            "0x0000000000000000000000000000000000000000000000000000000000000001",
        )
        .unwrap();
        assert_eq!(
            key.address(),
            "0x7e5f4552091a69125d5dfcb7b8c2659029395bdf".parse::<Address>().unwrap()
        );
        assert_eq!(SignerKey::from_hex("0xnothex").unwrap_err(), SigningError::InvalidHex);
    }

    #[test]
    fn test_signature_shape() {
        let auth = test_key().sign_create(&sample_create()).unwrap();
        assert_eq!(auth.signature.len(), SIGNATURE_LEN);
        assert!(auth.signature[64] == 27 || auth.signature[64] == 28);
    }

    #[test]
    fn test_signing_deterministic() {
        let key = test_key();
        let a = key.sign_create(&sample_create()).unwrap();
        let b = key.sign_create(&sample_create()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_signature_recovers_signer() {
        let key = test_key();
        let auth = key.sign_create(&sample_create()).unwrap();
        let digest = payload_digest(&auth.data);
        assert_eq!(recover(&digest, &auth.signature), key.address());
    }

    #[test]
    fn test_signature_is_over_prefixed_digest() {
        let key = test_key();
        let auth = key.sign_create(&sample_create()).unwrap();
        // Recovering against the raw payload hash yields some other identity
        let raw = keccak256(&auth.data);
        assert_ne!(recover(&raw, &auth.signature), key.address());
    }

    #[test]
    fn test_hex_transport() {
        let auth = test_key()
            .sign_claim(&ClaimPayload {
                trade_ids: vec![TradeId::new(3)],
                expiry: 99,
            })
            .unwrap();
        let back = SignedAuthorization::from_hex(&auth.data_hex(), &auth.signature_hex()).unwrap();
        assert_eq!(back, auth);
        assert!(SignedAuthorization::from_hex("0xq", "0x").is_err());
    }

    #[test]
    fn test_json_transport() {
        let auth = test_key().sign_create(&sample_create()).unwrap();
        let json = serde_json::to_string(&auth).unwrap();
        let back: SignedAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(back, auth);
    }

    #[test]
    fn test_debug_hides_secret() {
        let rendered = format!("{:?}", test_key());
        assert!(rendered.contains("address"));
        assert!(!rendered.contains("secret"));
    }

    mod fuzz {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #![proptest_config(ProptestConfig::with_cases(64))]

            /// Invariant: signatures are low-s and recover to the signing key.
            #[test]
            fn fuzz_signature_canonical(seed in "[a-z]{1,16}", data in prop::collection::vec(any::<u8>(), 0..128)) {
                let key = SignerKey::from_seed(&seed).unwrap();
                let auth = key.sign_bytes(data);
                let signature = Signature::parse_standard_slice(&auth.signature[..64]).unwrap();
                prop_assert!(!signature.s.is_high());
                prop_assert_eq!(recover(&payload_digest(&auth.data), &auth.signature), key.address());
            }
        }
    }
}
