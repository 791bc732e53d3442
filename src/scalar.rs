//! Arithmetic modulo the secp256k1 group order `n`.
//!
//! Used for ECDSA's `s = k⁻¹(z + r·d) mod n` computation, RFC 6979 nonce
//! candidates, and the GLV scalar decomposition in [`crate::curve`]. Unlike
//! [`crate::field::Field`], `n` has no convenient shape for a folding
//! reduction, so multiplication reduces via bit-serial long division against
//! `n` directly: simple to verify, and not on a path where cycle counts were
//! ever going to be competitive with libsecp256k1 anyway.

use subtle::{Choice, ConstantTimeEq};

/// The secp256k1 group order.
const ORDER: [u64; 4] = [
    0xBFD25E8C_D0364141,
    0xBAAEDCE6_AF48A03B,
    0xFFFFFFFF_FFFFFFFE,
    0xFFFFFFFF_FFFFFFFF,
];

/// `n / 2`, used for low-S canonicalization.
const ORDER_HALF: [u64; 4] = [
    0xDFE92F46_681B20A0,
    0x5D576E73_57A4501D,
    0xFFFFFFFF_FFFFFFFF,
    0x7FFFFFFF_FFFFFFFF,
];

#[derive(Clone, Copy, Debug, Default)]
pub struct Scalar {
    limbs: [u64; 4],
}

fn adc(a: u64, b: u64, carry: u64) -> (u64, u64) {
    let sum = a as u128 + b as u128 + carry as u128;
    (sum as u64, (sum >> 64) as u64)
}

fn sbb(a: u64, b: u64, borrow: u64) -> (u64, u64) {
    let diff = a as u128 as i128 - b as u128 as i128 - borrow as i128;
    if diff < 0 {
        ((diff + (1i128 << 64)) as u64, 1)
    } else {
        (diff as u64, 0)
    }
}

fn add4(a: [u64; 4], b: [u64; 4]) -> ([u64; 4], u64) {
    let mut out = [0u64; 4];
    let mut carry = 0u64;
    for i in 0..4 {
        let (s, c) = adc(a[i], b[i], carry);
        out[i] = s;
        carry = c;
    }
    (out, carry)
}

fn sub4(a: [u64; 4], b: [u64; 4]) -> ([u64; 4], u64) {
    let mut out = [0u64; 4];
    let mut borrow = 0u64;
    for i in 0..4 {
        let (d, bw) = sbb(a[i], b[i], borrow);
        out[i] = d;
        borrow = bw;
    }
    (out, borrow)
}

fn ge4(a: [u64; 4], b: [u64; 4]) -> bool {
    for i in (0..4).rev() {
        if a[i] != b[i] {
            return a[i] > b[i];
        }
    }
    true
}

fn reduce_once(mut limbs: [u64; 4], mut carry: u64) -> [u64; 4] {
    while carry != 0 || ge4(limbs, ORDER) {
        let (diff, borrow) = sub4(limbs, ORDER);
        limbs = diff;
        carry -= borrow;
    }
    limbs
}

fn get_bit(limbs: &[u64; 8], i: usize) -> u64 {
    (limbs[i / 64] >> (i % 64)) & 1
}

fn shl1_carry_in(a: [u64; 4], bit_in: u64) -> ([u64; 4], u64) {
    let mut out = [0u64; 4];
    let mut carry = bit_in;
    for i in 0..4 {
        let next_carry = a[i] >> 63;
        out[i] = (a[i] << 1) | carry;
        carry = next_carry;
    }
    (out, carry)
}

/// Reduces a 512-bit little-endian product modulo `n` by bit-serial long
/// division: shift the remainder left one bit at a time, pulling in the next
/// bit of the product, subtracting `n` whenever the remainder reaches it.
fn reduce_wide(product: [u64; 8]) -> [u64; 4] {
    let mut rem = [0u64; 4];
    for i in (0..512).rev() {
        let bit = get_bit(&product, i);
        let (shifted, carry) = shl1_carry_in(rem, bit);
        rem = reduce_once(shifted, carry);
    }
    rem
}

impl Scalar {
    pub const ZERO: Scalar = Scalar { limbs: [0, 0, 0, 0] };
    pub const ONE: Scalar = Scalar { limbs: [1, 0, 0, 0] };

    pub fn from_be_bytes(bytes: &[u8; 32]) -> Scalar {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let offset = 24 - 8 * i;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[offset..offset + 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        Scalar { limbs: reduce_once(limbs, 0) }
    }

    /// Parses 32 big-endian bytes as a scalar, rejecting values that are 0
    /// or `>= n` rather than silently reducing them. Used wherever an
    /// out-of-range value signals a malformed or adversarial input: RFC 6979
    /// candidate generation, and `r`/`s` parsed out of a recovered
    /// signature.
    pub fn from_repr_checked(bytes: &[u8; 32]) -> Option<Scalar> {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let offset = 24 - 8 * i;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[offset..offset + 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        if ge4(limbs, ORDER) {
            return None;
        }
        let scalar = Scalar { limbs };
        if scalar.is_zero() { None } else { Some(scalar) }
    }

    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let offset = 24 - 8 * i;
            out[offset..offset + 8].copy_from_slice(&self.limbs[i].to_be_bytes());
        }
        out
    }

    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }

    /// `true` when this scalar is the "high" half of the order, i.e. the
    /// ECDSA `s` value it represents is not canonical low-S.
    pub fn is_high(&self) -> bool {
        for i in (0..4).rev() {
            if self.limbs[i] != ORDER_HALF[i] {
                return self.limbs[i] > ORDER_HALF[i];
            }
        }
        false
    }

    pub fn add(&self, other: &Scalar) -> Scalar {
        let (sum, carry) = add4(self.limbs, other.limbs);
        Scalar { limbs: reduce_once(sum, carry) }
    }

    pub fn sub(&self, other: &Scalar) -> Scalar {
        let (diff, borrow) = sub4(self.limbs, other.limbs);
        if borrow == 0 {
            Scalar { limbs: diff }
        } else {
            let (wrapped, _) = add4(diff, ORDER);
            Scalar { limbs: wrapped }
        }
    }

    pub fn negate(&self) -> Scalar {
        if self.is_zero() {
            return Scalar::ZERO;
        }
        let (diff, _) = sub4(ORDER, self.limbs);
        Scalar { limbs: diff }
    }

    pub fn multiply(&self, other: &Scalar) -> Scalar {
        let mut acc = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let idx = i + j;
                let prod =
                    self.limbs[i] as u128 * other.limbs[j] as u128 + acc[idx] as u128 + carry;
                acc[idx] = prod as u64;
                carry = prod >> 64;
            }
            let mut k = i + 4;
            while carry != 0 {
                let sum = acc[k] as u128 + carry;
                acc[k] = sum as u64;
                carry = sum >> 64;
                k += 1;
            }
        }
        Scalar { limbs: reduce_wide(acc) }
    }

    /// Multiplicative inverse mod `n` via Fermat's little theorem
    /// (`n` is prime). Returns [`Scalar::ZERO`] for a zero input.
    pub fn invert(&self) -> Scalar {
        if self.is_zero() {
            return Scalar::ZERO;
        }
        let exponent = sub4(ORDER, [2, 0, 0, 0]).0;
        let mut result = Scalar::ONE;
        for limb_index in (0..4).rev() {
            let limb = exponent[limb_index];
            for bit in (0..64).rev() {
                result = result.multiply(&result);
                if (limb >> bit) & 1 == 1 {
                    result = result.multiply(self);
                }
            }
        }
        result
    }

    pub fn ct_eq(&self, other: &Scalar) -> Choice {
        self.limbs[0].ct_eq(&other.limbs[0])
            & self.limbs[1].ct_eq(&other.limbs[1])
            & self.limbs[2].ct_eq(&other.limbs[2])
            & self.limbs[3].ct_eq(&other.limbs[3])
    }
}

impl PartialEq for Scalar {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.ct_eq(other))
    }
}
impl Eq for Scalar {}
