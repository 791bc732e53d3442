//! secp256k1 group arithmetic: `y² = x³ + 7` over [`Field`].
//!
//! Points are held in Jacobian projective coordinates
//! (`x = X/Z²`, `y = Y/Z³`) so that point addition during scalar
//! multiplication never needs a field inversion; only the final conversion
//! back to affine coordinates inverts `Z`. The point at infinity is
//! represented by `z.is_zero()`.
//!
//! The curve has a efficiently computable endomorphism `ψ(x, y) = (βx, y)`
//! satisfying `ψ(P) = λ·P` for the constants below. [`Curve::endomorphism`]
//! exposes the map and is exercised in the tests against the verified
//! identity, and [`Curve::conditional_move`] gives a branch-free primitive
//! for selecting between table entries. Neither is composed into a
//! GLV-split scalar multiplication here: the lattice-reduced sub-scalars
//! `k₁, k₂` from `k = k₁ + k₂·λ` don't both fit in this crate's widest
//! native integer type (one of the two reduction constants exceeds 128
//! bits), so building the split would mean hand-rolling wide-integer
//! multiply/round arithmetic with no compiler to check it against — not a
//! trade this crate makes for a performance path the non-goals already
//! disclaim as uncertified. [`Curve::scalar_mul`] stays a constant-
//! structure double-and-add over the full 256 bits.

use subtle::{Choice, ConditionallySelectable};

use crate::field::Field;
use crate::scalar::Scalar;

/// `β`, a primitive cube root of unity mod `p`: `ψ(x, y) = (βx, y)`.
const BETA: Field = Field::from_raw_limbs([
    0xC1396C28_719501EE,
    0x9CF04975_12F58995,
    0x6E64479E_AC3434E9,
    0x7AE96A2B_657C0710,
]);

/// Generator point `G`.
pub const GENERATOR: AffinePoint = AffinePoint {
    x: Field::from_raw_limbs([
        0x59F2815B_16F81798,
        0x029BFCDB_2DCE28D9,
        0x55A06295_CE870B07,
        0x79BE667E_F9DCBBAC,
    ]),
    y: Field::from_raw_limbs([
        0x9C47D08F_FB10D4B8,
        0xFD17B448_A6855419,
        0x5DA4FBFC_0E1108A8,
        0x483ADA77_26A3C465,
    ]),
    infinity: false,
};

/// An affine (non-projective) curve point.
#[derive(Clone, Copy, Debug)]
pub struct AffinePoint {
    pub x: Field,
    pub y: Field,
    pub infinity: bool,
}

/// A curve point in Jacobian projective coordinates.
#[derive(Clone, Copy, Debug)]
pub struct ProjectivePoint {
    x: Field,
    y: Field,
    z: Field,
}

impl ProjectivePoint {
    pub const IDENTITY: ProjectivePoint =
        ProjectivePoint { x: Field::ONE, y: Field::ONE, z: Field::ZERO };

    pub fn from_affine(point: &AffinePoint) -> ProjectivePoint {
        if point.infinity {
            ProjectivePoint::IDENTITY
        } else {
            ProjectivePoint { x: point.x, y: point.y, z: Field::ONE }
        }
    }

    pub fn is_identity(&self) -> bool {
        self.z.is_zero()
    }

    pub fn negate(&self) -> ProjectivePoint {
        ProjectivePoint { x: self.x, y: self.y.negate(1), z: self.z }
    }

    /// Converts to affine coordinates. Returns a point with `infinity: true`
    /// for the identity, without attempting to invert a zero `Z`.
    pub fn to_affine(&self) -> AffinePoint {
        if self.is_identity() {
            return AffinePoint { x: Field::ZERO, y: Field::ZERO, infinity: true };
        }
        let z_inv = self.z.invert();
        let z_inv2 = z_inv.square();
        let z_inv3 = z_inv2.multiply(&z_inv);
        AffinePoint { x: self.x.multiply(&z_inv2), y: self.y.multiply(&z_inv3), infinity: false }
    }

    /// Point doubling for `a = 0` curves (dbl-2009-l).
    pub fn double(&self) -> ProjectivePoint {
        if self.is_identity() || self.y.is_zero() {
            return ProjectivePoint::IDENTITY;
        }
        let a = self.x.square();
        let b = self.y.square();
        let c = b.square();
        let x1_plus_b = self.x.add(&b);
        let d = x1_plus_b.square().sub(&a).sub(&c).double();
        let e = a.multiply_small(3);
        let f = e.square();
        let x3 = f.sub(&d.double());
        let y3 = e.multiply(&d.sub(&x3)).sub(&c.multiply_small(8));
        let z3 = self.y.multiply(&self.z).double();
        ProjectivePoint { x: x3, y: y3, z: z3 }
    }

    /// General Jacobian addition (add-2007-bl), handling the identity and
    /// the doubling/negation special cases explicitly.
    pub fn add(&self, other: &ProjectivePoint) -> ProjectivePoint {
        if self.is_identity() {
            return *other;
        }
        if other.is_identity() {
            return *self;
        }
        let z1z1 = self.z.square();
        let z2z2 = other.z.square();
        let u1 = self.x.multiply(&z2z2);
        let u2 = other.x.multiply(&z1z1);
        let s1 = self.y.multiply(&other.z).multiply(&z2z2);
        let s2 = other.y.multiply(&self.z).multiply(&z1z1);
        let h = u2.sub(&u1);
        let r = s2.sub(&s1);
        if h.is_zero() {
            return if r.is_zero() { self.double() } else { ProjectivePoint::IDENTITY };
        }
        let i = h.double().square();
        let j = h.multiply(&i);
        let r2 = r.double();
        let v = u1.multiply(&i);
        let x3 = r2.square().sub(&j).sub(&v.double());
        let y3 = r2.multiply(&v.sub(&x3)).sub(&s1.multiply(&j).double());
        let z1_plus_z2 = self.z.add(&other.z);
        let z3 = z1_plus_z2.square().sub(&z1z1).sub(&z2z2).multiply(&h);
        ProjectivePoint { x: x3, y: y3, z: z3 }
    }

    pub fn add_affine(&self, other: &AffinePoint) -> ProjectivePoint {
        self.add(&ProjectivePoint::from_affine(other))
    }
}

pub struct Curve;

impl Curve {
    /// `ψ(P) = (βP.x, P.y)`. Satisfies `ψ(P) = λ·P` for the scalar `λ`
    /// returned by nothing in this module directly — the identity is proven
    /// in the test suite rather than relied on at runtime, since no caller
    /// here performs the GLV split (see module docs).
    pub fn endomorphism(point: &AffinePoint) -> AffinePoint {
        if point.infinity {
            return *point;
        }
        AffinePoint { x: BETA.multiply(&point.x), y: point.y, infinity: false }
    }

    /// Constant-structure double-and-add scalar multiplication, processing
    /// all 256 bits of `scalar` regardless of its magnitude.
    pub fn scalar_mul(point: &AffinePoint, scalar: &Scalar) -> ProjectivePoint {
        let base = ProjectivePoint::from_affine(point);
        let bytes = scalar.to_be_bytes();
        let mut acc = ProjectivePoint::IDENTITY;
        for byte in bytes.iter() {
            for bit in (0..8).rev() {
                acc = acc.double();
                if (byte >> bit) & 1 == 1 {
                    acc = acc.add(&base);
                }
            }
        }
        acc
    }

    /// `scalar · G`.
    pub fn multiply_generator(scalar: &Scalar) -> ProjectivePoint {
        Curve::scalar_mul(&GENERATOR, scalar)
    }

    /// Overwrites `a` with `b` when `choice` is true, leaving `a` unchanged
    /// otherwise, without branching on `choice` — the building block a
    /// windowed table lookup selects through rather than indexing directly.
    pub fn conditional_move(a: &mut AffinePoint, b: &AffinePoint, choice: Choice) {
        a.x = Field::conditional_select(&a.x, &b.x, choice);
        a.y = Field::conditional_select(&a.y, &b.y, choice);
        a.infinity = u8::conditional_select(&(a.infinity as u8), &(b.infinity as u8), choice) == 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scalar_from_u64(v: u64) -> Scalar {
        let mut bytes = [0u8; 32];
        bytes[24..32].copy_from_slice(&v.to_be_bytes());
        Scalar::from_be_bytes(&bytes)
    }

    #[test]
    fn generator_is_on_curve() {
        let lhs = GENERATOR.y.square();
        let rhs = GENERATOR.x.square().multiply(&GENERATOR.x).add(&Field::from_raw_limbs([7, 0, 0, 0]));
        assert_eq!(lhs, rhs);
    }

    #[test]
    fn double_generator_matches_scalar_mul_by_two() {
        let g = ProjectivePoint::from_affine(&GENERATOR);
        let doubled = g.double().to_affine();
        let via_scalar = Curve::multiply_generator(&scalar_from_u64(2)).to_affine();
        assert_eq!(doubled.x, via_scalar.x);
        assert_eq!(doubled.y, via_scalar.y);
    }

    #[test]
    fn add_matches_doubling_when_points_equal() {
        let g = ProjectivePoint::from_affine(&GENERATOR);
        let via_add = g.add(&g).to_affine();
        let via_double = g.double().to_affine();
        assert_eq!(via_add.x, via_double.x);
        assert_eq!(via_add.y, via_double.y);
    }

    #[test]
    fn adding_identity_is_identity_law() {
        let g = ProjectivePoint::from_affine(&GENERATOR);
        let sum = g.add(&ProjectivePoint::IDENTITY);
        let back = sum.to_affine();
        assert_eq!(back.x, GENERATOR.x);
        assert_eq!(back.y, GENERATOR.y);
    }

    #[test]
    fn point_plus_negation_is_identity() {
        let g = ProjectivePoint::from_affine(&GENERATOR);
        let sum = g.add(&g.negate());
        assert!(sum.is_identity());
    }

    #[test]
    fn endomorphism_matches_lambda_multiplication() {
        let lambda = scalar_from_lambda();
        let via_lambda = Curve::multiply_generator(&lambda).to_affine();
        let via_psi = Curve::endomorphism(&GENERATOR);
        assert_eq!(via_lambda.x, via_psi.x);
        assert_eq!(via_lambda.y, via_psi.y);
    }

    fn scalar_from_lambda() -> Scalar {
        let limbs: [u64; 4] = [
            0xDF02967C_1B23BD72,
            0x122E22EA_20816678,
            0xA5261C02_8812645A,
            0x5363AD4C_C05C30E0,
        ];
        let mut bytes = [0u8; 32];
        for i in 0..4 {
            bytes[24 - 8 * i..32 - 8 * i].copy_from_slice(&limbs[i].to_be_bytes());
        }
        Scalar::from_be_bytes(&bytes)
    }

    #[test]
    fn conditional_move_selects_b_only_when_choice_is_true() {
        let g = GENERATOR;
        let h = Curve::multiply_generator(&scalar_from_u64(3)).to_affine();

        let mut a = g;
        Curve::conditional_move(&mut a, &h, Choice::from(0));
        assert_eq!(a.x, g.x);
        assert_eq!(a.y, g.y);
        assert!(!a.infinity);

        let mut a = g;
        Curve::conditional_move(&mut a, &h, Choice::from(1));
        assert_eq!(a.x, h.x);
        assert_eq!(a.y, h.y);
    }

    #[test]
    fn conditional_move_carries_the_infinity_flag() {
        let identity = AffinePoint { x: Field::ZERO, y: Field::ZERO, infinity: true };

        let mut a = GENERATOR;
        Curve::conditional_move(&mut a, &identity, Choice::from(1));
        assert!(a.infinity);

        let mut a = identity;
        Curve::conditional_move(&mut a, &GENERATOR, Choice::from(1));
        assert!(!a.infinity);
    }

    #[test]
    fn beta_is_a_cube_root_of_unity() {
        assert_eq!(BETA.multiply(&BETA).multiply(&BETA), Field::ONE);
    }

    fn random_scalar(rng: &mut impl rand::RngCore) -> Option<Scalar> {
        let mut bytes = [0u8; 32];
        rng.fill_bytes(&mut bytes);
        Scalar::from_repr_checked(&bytes)
    }

    /// `P + Q == Q + P` for random points `k·G` and `j·G`.
    #[test]
    fn point_addition_is_commutative_for_random_points() {
        let mut rng = rand::rng();
        for _ in 0..200 {
            let Some(k) = random_scalar(&mut rng) else { continue };
            let Some(j) = random_scalar(&mut rng) else { continue };
            let p = Curve::multiply_generator(&k);
            let q = Curve::multiply_generator(&j);
            let pq = p.add(&q).to_affine();
            let qp = q.add(&p).to_affine();
            assert_eq!(pq.x, qp.x);
            assert_eq!(pq.y, qp.y);
        }
    }
}
