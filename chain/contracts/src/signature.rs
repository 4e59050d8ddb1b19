//! Signer recovery
//!
//! Recovers the identity that produced a 65-byte `r ‖ s ‖ v` signature.
//! Pure: no state, no side effects. Only canonical encodings are accepted:
//! `r`/`s` must lie below the curve order and `s` must be in the lower half,
//! so a valid signature has exactly one accepted byte form.

use libsecp256k1::{Message, PublicKey, RecoveryId, Signature};
use trade_types::digest::payload_digest;
use trade_types::ids::Address;

use crate::errors::SignatureError;

/// Length of a recoverable signature: r (32) ‖ s (32) ‖ v (1).
pub const SIGNATURE_LEN: usize = 65;

/// Low-form offset for the recovery byte (`v` is 27 or 28).
const RECOVERY_ID_OFFSET: u8 = 27;

/// Recover the signer of a prepared 32-byte digest.
///
/// The digest must already be the signed-message transform; use [`verify`]
/// when starting from payload bytes.
pub fn recover(digest: &[u8; 32], signature: &[u8]) -> Result<Address, SignatureError> {
    if signature.len() != SIGNATURE_LEN {
        return Err(SignatureError::InvalidSignatureLength {
            len: signature.len(),
        });
    }

    let raw_v = signature[64];
    let v = if raw_v < RECOVERY_ID_OFFSET {
        raw_v + RECOVERY_ID_OFFSET
    } else {
        raw_v
    };
    if v != RECOVERY_ID_OFFSET && v != RECOVERY_ID_OFFSET + 1 {
        return Err(SignatureError::InvalidRecoveryId { v: raw_v });
    }

    let parsed = Signature::parse_standard_slice(&signature[..64])
        .map_err(|_| SignatureError::MalformedSignature)?;
    if parsed.s.is_high() {
        return Err(SignatureError::MalleableSignature);
    }
    let recovery_id = RecoveryId::parse(v - RECOVERY_ID_OFFSET)
        .map_err(|_| SignatureError::InvalidRecoveryId { v: raw_v })?;

    let public = libsecp256k1::recover(&Message::parse(digest), &parsed, &recovery_id)
        .map_err(|_| SignatureError::RecoveryFailed)?;
    Ok(address_of(&public))
}

/// Recover the identity that authorized `payload`.
///
/// Hashes the payload, applies the signed-message transform, and recovers.
/// The payload is opaque here; decoding happens elsewhere.
pub fn verify(payload: &[u8], signature: &[u8]) -> Result<Address, SignatureError> {
    recover(&payload_digest(payload), signature)
}

fn address_of(public: &PublicKey) -> Address {
    let serialized = public.serialize();
    let mut uncompressed = [0u8; 64];
    uncompressed.copy_from_slice(&serialized[1..65]);
    Address::from_public_key(&uncompressed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use trade_signer::SignerKey;
    use trade_types::digest::keccak256;

    /// secp256k1 group order, big-endian
    const CURVE_ORDER: [u8; 32] = [
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff,
        0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xff, 0xfe,
        0xba, 0xae, 0xdc, 0xe6, 0xaf, 0x48, 0xa0, 0x3b,
        0xbf, 0xd2, 0x5e, 0x8c, 0xd0, 0x36, 0x41, 0x41,
    ];

    fn signer() -> SignerKey {
        SignerKey::from_seed("signer").unwrap()
    }

    fn signed(payload: &[u8]) -> Vec<u8> {
        signer().sign_bytes(payload.to_vec()).signature
    }

    /// n - s, big-endian
    fn negate_s(s: &[u8]) -> [u8; 32] {
        let mut out = [0u8; 32];
        let mut borrow = 0i16;
        for i in (0..32).rev() {
            let mut diff = CURVE_ORDER[i] as i16 - s[i] as i16 - borrow;
            borrow = 0;
            if diff < 0 {
                diff += 256;
                borrow = 1;
            }
            out[i] = diff as u8;
        }
        out
    }

    #[test]
    fn test_verify_recovers_signer() {
        let sig = signed(b"terms");
        assert_eq!(verify(b"terms", &sig).unwrap(), signer().address());
    }

    #[test]
    fn test_verify_other_payload_recovers_other_identity() {
        let sig = signed(b"terms");
        assert_ne!(verify(b"termz", &sig).unwrap(), signer().address());
    }

    #[test]
    fn test_raw_digest_does_not_match() {
        let sig = signed(b"terms");
        let raw = keccak256(b"terms");
        assert_ne!(recover(&raw, &sig).unwrap(), signer().address());
    }

    #[test]
    fn test_wrong_length_rejected() {
        let sig = signed(b"terms");
        assert_eq!(
            verify(b"terms", &sig[..64]),
            Err(SignatureError::InvalidSignatureLength { len: 64 })
        );
        let mut long = sig.clone();
        long.push(0);
        assert_eq!(
            verify(b"terms", &long),
            Err(SignatureError::InvalidSignatureLength { len: 66 })
        );
        assert_eq!(
            verify(b"terms", &[]),
            Err(SignatureError::InvalidSignatureLength { len: 0 })
        );
    }

    #[test]
    fn test_low_form_recovery_byte_normalized() {
        let mut sig = signed(b"terms");
        sig[64] -= RECOVERY_ID_OFFSET;
        assert!(sig[64] <= 1);
        assert_eq!(verify(b"terms", &sig).unwrap(), signer().address());
    }

    #[test]
    fn test_out_of_range_recovery_byte_rejected() {
        let mut sig = signed(b"terms");
        sig[64] = 29;
        assert_eq!(
            verify(b"terms", &sig),
            Err(SignatureError::InvalidRecoveryId { v: 29 })
        );
        sig[64] = 2;
        assert_eq!(
            verify(b"terms", &sig),
            Err(SignatureError::InvalidRecoveryId { v: 2 })
        );
    }

    #[test]
    fn test_overflowing_scalar_rejected() {
        let mut sig = signed(b"terms");
        sig[..32].copy_from_slice(&[0xff; 32]);
        assert_eq!(verify(b"terms", &sig), Err(SignatureError::MalformedSignature));
    }

    #[test]
    fn test_high_s_alternate_encoding_rejected() {
        let sig = signed(b"terms");
        let mut malleated = sig.clone();
        malleated[32..64].copy_from_slice(&negate_s(&sig[32..64]));
        malleated[64] = if sig[64] == 27 { 28 } else { 27 };
        assert_eq!(
            verify(b"terms", &malleated),
            Err(SignatureError::MalleableSignature)
        );
    }
}
