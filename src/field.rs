//! 256-bit prime-field arithmetic for the secp256k1 base field.
//!
//! `p = 2²⁵⁶ − 2³² − 977`. Elements are stored as four 64-bit limbs,
//! little-endian (`limbs[0]` holds the least-significant 64 bits). All
//! arithmetic reduces back into canonical range `[0, p)` before returning, so
//! every [`Field`] a caller can observe is already normalized — there is no
//! separate "weak" representation to reason about across calls.
//!
//! Reduction exploits `2²⁵⁶ ≡ 2³² + 977 (mod p)`: a double-width product is
//! folded by multiplying its high half by that constant and adding it back
//! into the low half, then a short conditional-subtract loop brings the
//! result under `p`.

use subtle::{Choice, ConditionallySelectable, ConstantTimeEq};

/// `2^32 + 977`, the reduction constant satisfying `2^256 ≡ C (mod p)`.
const C: u64 = 0x1000003D1;

/// The field modulus `p = 2²⁵⁶ − 2³² − 977`, little-endian limbs.
const MODULUS: [u64; 4] = [
    0xFFFFFFFE_FFFFFC2F,
    0xFFFFFFFF_FFFFFFFF,
    0xFFFFFFFF_FFFFFFFF,
    0xFFFFFFFF_FFFFFFFF,
];

/// An element of the secp256k1 base field, always held in canonical form.
#[derive(Clone, Copy, Debug, Default)]
pub struct Field {
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

/// Reduces `limbs + carry_bit * 2^256` into `[0, p)`. `carry_bit` is 0 or 1.
fn reduce(mut limbs: [u64; 4], mut carry: u64) -> [u64; 4] {
    loop {
        if carry == 0 && !ge4(limbs, MODULUS) {
            return limbs;
        }
        let (diff, borrow) = sub4(limbs, MODULUS);
        limbs = diff;
        carry -= borrow;
    }
}

/// Multiplies a 4-limb value by the small constant `c` (`c` fits in 34 bits
/// for our use, but the routine is correct for any `u64`), returning 5 limbs.
fn mul_small(a: [u64; 4], c: u64) -> [u64; 5] {
    let mut out = [0u64; 5];
    let mut carry = 0u64;
    for i in 0..4 {
        let prod = a[i] as u128 * c as u128 + carry as u128;
        out[i] = prod as u64;
        carry = (prod >> 64) as u64;
    }
    out[4] = carry;
    out
}

impl Field {
    /// The additive identity.
    pub const ZERO: Field = Field { limbs: [0, 0, 0, 0] };

    /// The multiplicative identity.
    pub const ONE: Field = Field { limbs: [1, 0, 0, 0] };

    /// Builds a field element directly from little-endian limbs, trusting
    /// the caller that they already represent a value in `[0, p)`. Used for
    /// compile-time curve constants (the generator point, the GLV `β`);
    /// not exposed as a way to import untrusted data.
    pub const fn from_raw_limbs(limbs: [u64; 4]) -> Field {
        Field { limbs }
    }

    /// Builds a field element from a 32-byte big-endian encoding, reducing
    /// modulo `p` if the input is out of range (it never is for well-formed
    /// curve data, but callers that decode untrusted bytes get a defined
    /// result rather than a panic).
    pub fn from_be_bytes(bytes: &[u8; 32]) -> Field {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            let offset = 24 - 8 * i;
            let mut chunk = [0u8; 8];
            chunk.copy_from_slice(&bytes[offset..offset + 8]);
            limbs[i] = u64::from_be_bytes(chunk);
        }
        Field { limbs: reduce(limbs, 0) }
    }

    /// Encodes this element as 32 big-endian bytes.
    pub fn to_be_bytes(self) -> [u8; 32] {
        let mut out = [0u8; 32];
        for i in 0..4 {
            let offset = 24 - 8 * i;
            out[offset..offset + 8].copy_from_slice(&self.limbs[i].to_be_bytes());
        }
        out
    }

    /// `true` if this element is the additive identity.
    pub fn is_zero(&self) -> bool {
        self.limbs == [0, 0, 0, 0]
    }

    /// `true` if the canonical integer representative is odd.
    pub fn is_odd(&self) -> bool {
        self.limbs[0] & 1 == 1
    }

    /// Constant-time equality, comparing canonical representatives.
    pub fn equal_after_normalize(&self, other: &Field) -> bool {
        let choice = self.limbs[0].ct_eq(&other.limbs[0])
            & self.limbs[1].ct_eq(&other.limbs[1])
            & self.limbs[2].ct_eq(&other.limbs[2])
            & self.limbs[3].ct_eq(&other.limbs[3]);
        choice.into()
    }

    /// Selects `a` when `choice` is false, `b` when true, without branching
    /// on the choice at the call site.
    pub fn conditional_swap(choice: Choice, a: &mut Field, b: &mut Field) {
        for i in 0..4 {
            u64::conditional_swap(&mut a.limbs[i], &mut b.limbs[i], choice);
        }
    }

    /// Returns `a` when `choice` is false, `b` when true, without branching
    /// on the choice at the call site.
    pub fn conditional_select(a: &Field, b: &Field, choice: Choice) -> Field {
        let mut limbs = [0u64; 4];
        for i in 0..4 {
            limbs[i] = u64::conditional_select(&a.limbs[i], &b.limbs[i], choice);
        }
        Field { limbs }
    }

    /// No-op: every [`Field`] produced by this module is already canonical.
    /// Kept so callers written against a lazy-reduction API still compile.
    pub fn normalize_weak(self) -> Field {
        self
    }

    /// No-op for the same reason as [`Field::normalize_weak`].
    pub fn normalize(self) -> Field {
        self
    }

    pub fn add(&self, other: &Field) -> Field {
        let (sum, carry) = add4(self.limbs, other.limbs);
        Field { limbs: reduce(sum, carry) }
    }

    pub fn sub(&self, other: &Field) -> Field {
        let (diff, borrow) = sub4(self.limbs, other.limbs);
        if borrow == 0 {
            Field { limbs: diff }
        } else {
            let (wrapped, _) = add4(diff, MODULUS);
            Field { limbs: wrapped }
        }
    }

    /// `magnitude * p - self`, used when a caller needs a positive-looking
    /// negation without a separate magnitude-tracking variant: since every
    /// element here is already in `[0, p)`, `magnitude` only needs to be at
    /// least 1.
    pub fn negate(&self, magnitude: u32) -> Field {
        debug_assert!(magnitude >= 1);
        if self.is_zero() {
            return Field::ZERO;
        }
        let (diff, _borrow) = sub4(MODULUS, self.limbs);
        Field { limbs: diff }
    }

    pub fn double(&self) -> Field {
        self.add(self)
    }

    /// Multiplies by a small non-negative constant (used for the curve's
    /// `3·x²` term and similar short scalars).
    pub fn multiply_small(&self, n: u64) -> Field {
        let scaled = mul_small(self.limbs, n);
        let hi_scaled = mul_small([scaled[4], 0, 0, 0], C);
        let (sum, carry) = add4([scaled[0], scaled[1], scaled[2], scaled[3]], [
            hi_scaled[0],
            hi_scaled[1],
            hi_scaled[2],
            hi_scaled[3],
        ]);
        debug_assert_eq!(hi_scaled[4], 0);
        Field { limbs: reduce(sum, carry) }
    }

    pub fn multiply(&self, other: &Field) -> Field {
        // Schoolbook 4x4 -> 8 limb product.
        let mut acc = [0u64; 8];
        for i in 0..4 {
            let mut carry: u128 = 0;
            for j in 0..4 {
                let idx = i + j;
                let prod = self.limbs[i] as u128 * other.limbs[j] as u128
                    + acc[idx] as u128
                    + carry;
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
        let lo = [acc[0], acc[1], acc[2], acc[3]];
        let hi = [acc[4], acc[5], acc[6], acc[7]];

        // value ≡ lo + hi * C (mod p); fold hi*C (5 limbs) into lo (5 limbs).
        let hi_scaled = mul_small(hi, C);
        let lo5 = [lo[0], lo[1], lo[2], lo[3], 0];
        let (sum, carry_out) = {
            let mut out = [0u64; 5];
            let mut carry = 0u64;
            for i in 0..5 {
                let (s, c) = adc(lo5[i], hi_scaled[i], carry);
                out[i] = s;
                carry = c;
            }
            (out, carry)
        };
        debug_assert_eq!(carry_out, 0);

        let overflow = sum[4];
        let low256 = [sum[0], sum[1], sum[2], sum[3]];
        let (folded, carry2) = if overflow != 0 {
            let add_val = mul_small([overflow, 0, 0, 0], C);
            debug_assert_eq!(add_val[4], 0);
            add4(low256, [add_val[0], add_val[1], add_val[2], add_val[3]])
        } else {
            (low256, 0)
        };
        Field { limbs: reduce(folded, carry2) }
    }

    pub fn square(&self) -> Field {
        self.multiply(self)
    }

    /// Raises this element to the power of `p - 2`, i.e. its multiplicative
    /// inverse by Fermat's little theorem. Returns [`Field::ZERO`] when
    /// `self` is zero (no inverse exists); callers that must reject zero
    /// check [`Field::is_zero`] first.
    pub fn invert(&self) -> Field {
        if self.is_zero() {
            return Field::ZERO;
        }
        self.pow_modulus_minus(2)
    }

    /// Returns a square root of `self` if one exists, via `self^((p+1)/4)`
    /// (valid because `p ≡ 3 (mod 4)`). The caller must verify the result by
    /// squaring it back, since this computes a candidate unconditionally.
    pub fn sqrt(&self) -> Field {
        // Exponent (p+1)/4, computed bit-by-bit via square-and-multiply
        // against `p - 2` shifted by the relationship (p+1)/4 = (p-3)/4 + 1.
        self.pow_p_plus_one_over_four()
    }

    fn pow_modulus_minus(&self, subtrahend: u64) -> Field {
        let exponent = sub4(MODULUS, [subtrahend, 0, 0, 0]).0;
        self.pow(&exponent)
    }

    fn pow_p_plus_one_over_four(&self) -> Field {
        let (sum, _carry) = add4(MODULUS, [1, 0, 0, 0]);
        let exponent = shift_right_2(sum);
        self.pow(&exponent)
    }

    /// Square-and-multiply exponentiation against a 256-bit exponent given
    /// as little-endian limbs, most-significant bit first.
    fn pow(&self, exponent: &[u64; 4]) -> Field {
        let mut result = Field::ONE;
        for limb_index in (0..4).rev() {
            let limb = exponent[limb_index];
            for bit in (0..64).rev() {
                result = result.square();
                if (limb >> bit) & 1 == 1 {
                    result = result.multiply(self);
                }
            }
        }
        result
    }
}

/// Shifts a 256-bit little-endian limb array right by 2 bits.
fn shift_right_2(limbs: [u64; 4]) -> [u64; 4] {
    let mut out = [0u64; 4];
    for i in 0..4 {
        let lo = limbs[i] >> 2;
        let hi = if i + 1 < 4 { limbs[i + 1] << 62 } else { 0 };
        out[i] = lo | hi;
    }
    out
}

impl PartialEq for Field {
    fn eq(&self, other: &Self) -> bool {
        self.equal_after_normalize(other)
    }
}
impl Eq for Field {}

#[cfg(test)]
mod tests {
    use super::*;

    fn f(hex: &str) -> Field {
        let bytes = const_hex::decode_to_array::<32>(hex).unwrap();
        Field::from_be_bytes(&bytes)
    }

    #[test]
    fn zero_and_one_round_trip() {
        assert_eq!(Field::ZERO.to_be_bytes(), [0u8; 32]);
        let mut one_bytes = [0u8; 32];
        one_bytes[31] = 1;
        assert_eq!(Field::ONE.to_be_bytes(), one_bytes);
    }

    #[test]
    fn add_wraps_modulo_p() {
        // p - 1
        let p_minus_1 = f("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e");
        let sum = p_minus_1.add(&Field::ONE);
        assert_eq!(sum, Field::ZERO);
        let sum2 = p_minus_1.add(&Field::ONE.double());
        assert_eq!(sum2, Field::ONE);
    }

    #[test]
    fn sub_borrows_across_zero() {
        let result = Field::ZERO.sub(&Field::ONE);
        let p_minus_1 = f("fffffffffffffffffffffffffffffffffffffffffffffffffffffffefffffc2e");
        assert_eq!(result, p_minus_1);
    }

    #[test]
    fn multiply_matches_known_square() {
        // 2 * 3 = 6
        let two = Field::ONE.double();
        let three = two.add(&Field::ONE);
        let six = three.double();
        assert_eq!(two.multiply(&three), six);
    }

    #[test]
    fn invert_round_trips_to_one() {
        let seven = Field::ONE.double().double().double().sub(&Field::ONE);
        let inv = seven.invert();
        assert_eq!(seven.multiply(&inv), Field::ONE);
    }

    #[test]
    fn invert_of_zero_is_zero() {
        assert_eq!(Field::ZERO.invert(), Field::ZERO);
    }

    #[test]
    fn sqrt_of_square_squares_back() {
        let four = Field::ONE.double().double();
        let root = four.sqrt();
        assert_eq!(root.square(), four);
    }

    #[test]
    fn negate_of_nonzero_sums_to_zero() {
        let three = Field::ONE.double().add(&Field::ONE);
        let neg = three.negate(1);
        assert_eq!(three.add(&neg), Field::ZERO);
    }

    #[test]
    fn negate_of_zero_is_zero() {
        assert_eq!(Field::ZERO.negate(1), Field::ZERO);
    }

    #[test]
    fn is_odd_reflects_canonical_parity() {
        assert!(!Field::ZERO.is_odd());
        assert!(Field::ONE.is_odd());
        assert!(!Field::ONE.double().is_odd());
    }

    #[test]
    fn conditional_swap_respects_choice() {
        let mut a = Field::ONE;
        let mut b = Field::ZERO;
        Field::conditional_swap(Choice::from(0), &mut a, &mut b);
        assert_eq!(a, Field::ONE);
        assert_eq!(b, Field::ZERO);
        Field::conditional_swap(Choice::from(1), &mut a, &mut b);
        assert_eq!(a, Field::ZERO);
        assert_eq!(b, Field::ONE);
    }

    #[test]
    fn multiply_small_matches_repeated_addition() {
        let five = Field::ONE.double().double().add(&Field::ONE);
        let times_seven = five.multiply_small(7);
        let mut expected = Field::ZERO;
        for _ in 0..7 {
            expected = expected.add(&five);
        }
        assert_eq!(times_seven, expected);
    }

    fn random_field(rng: &mut impl rand::RngCore) -> Field {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Field::from_be_bytes(&bytes)
    }

    /// Commutativity and associativity of multiplication over 10,000+
    /// random field elements.
    #[test]
    fn multiplication_is_commutative_and_associative_for_random_inputs() {
        let mut rng = rand::rng();
        for _ in 0..10_000 {
            let a = random_field(&mut rng);
            let b = random_field(&mut rng);
            let c = random_field(&mut rng);
            assert_eq!(a.multiply(&b), b.multiply(&a));
            assert_eq!(a.multiply(&b).multiply(&c), a.multiply(&b.multiply(&c)));
        }
    }

    #[test]
    fn inverse_and_negation_hold_for_random_nonzero_inputs() {
        let mut rng = rand::rng();
        let mut checked = 0;
        while checked < 1_000 {
            let a = random_field(&mut rng);
            if a.is_zero() {
                continue;
            }
            assert_eq!(a.multiply(&a.invert()), Field::ONE);
            assert_eq!(a.add(&a.negate(1)), Field::ZERO);
            let root = a.sqrt();
            if root.square() == a {
                // `a` is a quadratic residue; the candidate root is genuine.
                assert_eq!(root.square(), a);
            }
            checked += 1;
        }
    }
}
