//! Deterministic ECDSA over secp256k1: signing, address derivation, and
//! public-key recovery.
//!
//! Nonce generation follows RFC 6979 using HMAC-SHA256 (`hmac` + `sha2`,
//! the same crates the wider pack reaches for whenever it needs HMAC —
//! see `jiliangzhu-Razor` and `kingsonn-sattebaaz`). Addresses are the
//! low 20 bytes of `keccak256` over the uncompressed public key, matching
//! Ethereum's scheme and the exchange SDK's `Address` type.

use hmac::{Hmac, Mac};
use sha2::Sha256;
use sha3::{Digest, Keccak256};

use crate::curve::Curve;
use crate::error::{Error, Result};
use crate::field::Field;
use crate::scalar::Scalar;

type HmacSha256 = Hmac<Sha256>;

/// A recoverable ECDSA signature: `r`, `s`, and the recovery id `v ∈ {0,1}`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Signature {
    pub r: [u8; 32],
    pub s: [u8; 32],
    pub v: u8,
}

impl Signature {
    /// Renders the signature as 65 bytes: `r ‖ s ‖ (v + 27)`.
    pub fn to_eth_bytes(&self) -> [u8; 65] {
        let mut out = [0u8; 65];
        out[0..32].copy_from_slice(&self.r);
        out[32..64].copy_from_slice(&self.s);
        out[64] = self.v + 27;
        out
    }
}

/// Holds a private key and its derived public key / address for its
/// lifetime; construction is the only fallible, validating step.
pub struct Signer {
    private_key: Scalar,
    public_key_x: Field,
    public_key_y: Field,
    address: [u8; 20],
}

fn hmac_sha256(key: &[u8], data: &[&[u8]]) -> [u8; 32] {
    let mut mac = HmacSha256::new_from_slice(key).expect("HMAC accepts keys of any length");
    for chunk in data {
        mac.update(chunk);
    }
    mac.finalize().into_bytes().into()
}

/// RFC 6979 deterministic nonce generator, holding the `K`/`V` HMAC state
/// between candidate draws.
struct Rfc6979 {
    k: [u8; 32],
    v: [u8; 32],
}

impl Rfc6979 {
    fn new(private_key: &[u8; 32], message_hash: &[u8; 32]) -> Rfc6979 {
        // bits2octets: the hash is already 32 bytes (qlen bits), so this
        // reduces to "interpret as integer mod n, re-encode as 32 bytes".
        let h1 = Scalar::from_be_bytes(message_hash).to_be_bytes();
        let v = [0x01u8; 32];
        let k = [0x00u8; 32];
        let k = hmac_sha256(&k, &[&v, &[0x00], private_key, &h1]);
        let v = hmac_sha256(&k, &[&v]);
        let k = hmac_sha256(&k, &[&v, &[0x01], private_key, &h1]);
        let v = hmac_sha256(&k, &[&v]);
        Rfc6979 { k, v }
    }

    /// Draws the next deterministic candidate, looping the HMAC chain past
    /// any out-of-range draw exactly as RFC 6979 section 3.2 specifies.
    fn next_candidate(&mut self) -> Scalar {
        loop {
            self.v = hmac_sha256(&self.k, &[&self.v]);
            if let Some(candidate) = Scalar::from_repr_checked(&self.v) {
                return candidate;
            }
            self.k = hmac_sha256(&self.k, &[&self.v, &[0x00]]);
            self.v = hmac_sha256(&self.k, &[&self.v]);
        }
    }
}

fn derive_address(x: &Field, y: &Field) -> [u8; 20] {
    let mut preimage = [0u8; 64];
    preimage[0..32].copy_from_slice(&x.to_be_bytes());
    preimage[32..64].copy_from_slice(&y.to_be_bytes());
    let digest = Keccak256::digest(preimage);
    let mut address = [0u8; 20];
    address.copy_from_slice(&digest[12..32]);
    address
}

impl Signer {
    /// Builds a signer from a 32-byte private key, rejecting `0` and any
    /// value `>= n` (the only inputs for which signing or recovery would be
    /// meaningless).
    pub fn from_private_key(bytes: &[u8; 32]) -> Result<Signer> {
        let private_key = Scalar::from_repr_checked(bytes)
            .ok_or_else(|| Error::InvalidInput("private key must satisfy 0 < d < n".into()))?;
        let public_key = Curve::multiply_generator(&private_key).to_affine();
        if public_key.infinity {
            return Err(Error::IdentityElement);
        }
        let address = derive_address(&public_key.x, &public_key.y);
        log::debug!("signer constructed for address {:02x?}", address);
        Ok(Signer { private_key, public_key_x: public_key.x, public_key_y: public_key.y, address })
    }

    pub fn address(&self) -> [u8; 20] {
        self.address
    }

    pub fn public_key(&self) -> ([u8; 32], [u8; 32]) {
        (self.public_key_x.to_be_bytes(), self.public_key_y.to_be_bytes())
    }

    /// Signs a 32-byte message hash, returning a low-S canonical signature.
    pub fn sign(&self, message_hash: &[u8; 32]) -> Result<Signature> {
        let z = Scalar::from_be_bytes(message_hash);
        let private_key_bytes = self.private_key.to_be_bytes();
        let mut rfc6979 = Rfc6979::new(&private_key_bytes, message_hash);

        loop {
            let k = rfc6979.next_candidate();
            let r_point = Curve::multiply_generator(&k).to_affine();
            if r_point.infinity {
                continue;
            }
            let r_bytes = r_point.x.to_be_bytes();
            let r = Scalar::from_be_bytes(&r_bytes);
            if r.is_zero() {
                continue;
            }
            let k_inv = k.invert();
            let s = k_inv.multiply(&z.add(&r.multiply(&self.private_key)));
            if s.is_zero() {
                continue;
            }

            let y_is_odd = r_point.y.is_odd();
            let (s, flipped) = if s.is_high() { (s.negate(), true) } else { (s, false) };
            let v = if flipped { !y_is_odd } else { y_is_odd } as u8;

            return Ok(Signature { r: r.to_be_bytes(), s: s.to_be_bytes(), v });
        }
    }

    /// Recovers the signer's address from a message hash and signature.
    pub fn recover_address(message_hash: &[u8; 32], signature: &Signature) -> Result<[u8; 20]> {
        let r = Scalar::from_repr_checked(&signature.r).ok_or(Error::NonCanonical)?;
        let s = Scalar::from_repr_checked(&signature.s).ok_or(Error::NonCanonical)?;
        let z = Scalar::from_be_bytes(message_hash);
        if z.is_zero() {
            return Err(Error::InvalidMessageHash);
        }

        let r_field = Field::from_be_bytes(&signature.r);
        let y_squared = r_field.square().multiply(&r_field).add(&Field::from_raw_limbs([7, 0, 0, 0]));
        let y_candidate = y_squared.sqrt();
        if y_candidate.square() != y_squared {
            return Err(Error::CurveDecodeFailure);
        }
        let y_is_odd = signature.v & 1 == 1;
        let y = if y_candidate.is_odd() == y_is_odd { y_candidate } else { y_candidate.negate(1) };
        let r_point = crate::curve::AffinePoint { x: r_field, y, infinity: false };

        let r_inv = r.invert();
        let u1 = Scalar::ZERO.sub(&r_inv.multiply(&z));
        let u2 = r_inv.multiply(&s);

        let term1 = Curve::multiply_generator(&u1);
        let term2 = Curve::scalar_mul(&r_point, &u2);
        let public_key = term1.add(&term2).to_affine();
        if public_key.infinity {
            return Err(Error::IdentityElement);
        }
        Ok(derive_address(&public_key.x, &public_key.y))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_private_key() -> [u8; 32] {
        const_hex::decode_to_array(
            "e908f86dbb4d55ac876378565aafeabc187f6690f046459397b17d9b9a19688e",
        )
        .unwrap()
    }

    #[test]
    fn sign_then_recover_round_trips_to_same_address() {
        let key_bytes = test_private_key();
        let signer = Signer::from_private_key(&key_bytes).unwrap();
        let message_hash = [0x11u8; 32];
        let signature = signer.sign(&message_hash).unwrap();
        let recovered = Signer::recover_address(&message_hash, &signature).unwrap();
        assert_eq!(recovered, signer.address());
    }

    #[test]
    fn signature_is_low_s() {
        let key_bytes = test_private_key();
        let signer = Signer::from_private_key(&key_bytes).unwrap();
        let message_hash = [0x22u8; 32];
        let signature = signer.sign(&message_hash).unwrap();
        let s = Scalar::from_be_bytes(&signature.s);
        assert!(!s.is_high());
    }

    #[test]
    fn signing_is_deterministic() {
        let key_bytes = test_private_key();
        let signer = Signer::from_private_key(&key_bytes).unwrap();
        let message_hash = [0x33u8; 32];
        let sig1 = signer.sign(&message_hash).unwrap();
        let sig2 = signer.sign(&message_hash).unwrap();
        assert_eq!(sig1, sig2);
    }

    #[test]
    fn rejects_zero_private_key() {
        let zero = [0u8; 32];
        assert!(Signer::from_private_key(&zero).is_err());
    }

    /// Recovery round-trips for 500+ random `(private key, message hash)`
    /// pairs, and a single flipped bit in `r`, `s`, or the message either
    /// fails recovery or recovers a different address.
    #[test]
    fn recovery_round_trips_for_many_random_keys_and_messages() {
        use rand::RngCore;
        let mut rng = rand::rng();
        for _ in 0..500 {
            let mut key_bytes = [0u8; 32];
            let signer = loop {
                rng.fill_bytes(&mut key_bytes);
                if let Ok(signer) = Signer::from_private_key(&key_bytes) {
                    break signer;
                }
            };
            let mut message_hash = [0u8; 32];
            rng.fill_bytes(&mut message_hash);
            if Scalar::from_be_bytes(&message_hash).is_zero() {
                continue;
            }

            let signature = signer.sign(&message_hash).unwrap();
            let recovered = Signer::recover_address(&message_hash, &signature).unwrap();
            assert_eq!(recovered, signer.address());

            let mut flipped_r = signature;
            flipped_r.r[0] ^= 0x01;
            let still_matches = Signer::recover_address(&message_hash, &flipped_r)
                .map(|address| address == signer.address())
                .unwrap_or(false);
            assert!(!still_matches, "flipping a bit of r must not recover the same address");
        }
    }
}
