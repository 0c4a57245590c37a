//! Wallet address derivation.
//!
//! Pure, synchronous transformation of a raw private key into the EIP-55
//! checksummed address it controls. No I/O; validation failures are
//! surfaced directly to the caller and never retried.

use alloy_primitives::Address;
use k256::ecdsa::SigningKey;
use k256::elliptic_curve::sec1::ToEncodedPoint;
use thiserror::Error;

/// Errors from wallet address derivation.
#[derive(Debug, Error)]
pub enum AddressError {
    #[error("secret is not valid hex: {0}")]
    InvalidHex(#[from] hex::FromHexError),

    #[error("secret must be 32 bytes, got {0}")]
    InvalidLength(usize),

    #[error("secret is not a valid secp256k1 key: {0}")]
    InvalidKey(String),
}

/// Derive the checksummed address controlled by a raw private key.
///
/// Accepts an optional `0x` prefix on the secret.
pub fn derive_address(raw_secret: &str) -> Result<String, AddressError> {
    let trimmed = raw_secret.strip_prefix("0x").unwrap_or(raw_secret);
    let bytes = hex::decode(trimmed)?;
    if bytes.len() != 32 {
        return Err(AddressError::InvalidLength(bytes.len()));
    }
    let key =
        SigningKey::from_slice(&bytes).map_err(|e| AddressError::InvalidKey(e.to_string()))?;

    // Address = last 20 bytes of keccak256(uncompressed public key minus
    // the 0x04 tag byte).
    let point = key.verifying_key().to_encoded_point(false);
    let hash = alloy_primitives::keccak256(&point.as_bytes()[1..]);
    let address = Address::from_slice(&hash[12..]);

    Ok(address.to_checksum(None))
}
