//! Message digests for signed payloads
//!
//! Wallets never sign a raw payload digest: `personal_sign`/`eth_sign` prepend
//! a fixed prefix and hash again. Both the signer and the verifier go through
//! [`payload_digest`] so they agree on the exact 32 bytes being signed.

use sha3::{Digest, Keccak256};

/// Prefix applied to a 32-byte digest before it is signed.
pub const SIGNED_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak-256 of arbitrary bytes.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// Wrap a 32-byte digest in the signed-message prefix and hash it.
pub fn signed_message_hash(digest: &[u8; 32]) -> [u8; 32] {
    let mut hasher = Keccak256::new();
    hasher.update(SIGNED_MESSAGE_PREFIX);
    hasher.update(digest);
    hasher.finalize().into()
}

/// The digest a signer signs for an encoded payload:
/// `signed_message_hash(keccak256(payload))`.
pub fn payload_digest(payload: &[u8]) -> [u8; 32] {
    signed_message_hash(&keccak256(payload))
}
