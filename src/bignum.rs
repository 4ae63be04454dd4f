//! Limited-functionality bigint arithmetic tailored to the Dragon4 engine.
//!
//! Restricted to non-negative numbers with less than `32 * BI_MAX_PARTS`
//! bits, with the caller responsible for staying within that bound (the
//! conversion algorithm is statically bounded to roughly 1120 bits; see
//! `DESIGN.md`). Values are stored little-endian, least-significant limb
//! first, and are kept *normalized*: either zero limbs (value zero) or the
//! top limb non-zero.

use core::cmp::Ordering;

use crate::error::Error;

/// 35 limbs of 32 bits each gives ~1120 bits of headroom, which is enough
/// for every bigint this algorithm ever constructs (see `DESIGN.md`).
pub(crate) const BI_MAX_PARTS: usize = 35;

#[derive(Clone, Copy)]
pub(crate) struct Bigint {
    n: usize,
    v: [u32; BI_MAX_PARTS],
}

impl Bigint {
    pub(crate) const ZERO: Bigint = Bigint {
        n: 0,
        v: [0; BI_MAX_PARTS],
    };

    pub(crate) fn small(val: u32) -> Bigint {
        let mut x = Bigint::ZERO;
        x.set_small(val);
        x
    }

    /// `2^y`.
    pub(crate) fn pow2(y: u32) -> Bigint {
        let mut x = Bigint::ZERO;
        x.set_2exp(y);
        x
    }

    /// Builds a two-limb bigint directly from a low and high 32-bit word,
    /// as extracted from an IEEE-754 double's bit pattern.
    pub(crate) fn from_limbs(lo: u32, hi: u32) -> Bigint {
        let mut x = Bigint::ZERO;
        x.v[0] = lo;
        x.v[1] = hi;
        x.n = 2;
        x.normalize();
        x
    }

    pub(crate) fn set_small(&mut self, val: u32) {
        if val == 0 {
            self.n = 0;
        } else {
            self.n = 1;
            self.v[0] = val;
        }
        debug_assert!(self.is_normalized());
    }

    /// `self <- 2^y`.
    pub(crate) fn set_2exp(&mut self, y: u32) {
        let limb = (y / 32) as usize;
        let bit = y % 32;
        debug_assert!(limb < BI_MAX_PARTS);
        self.v = [0; BI_MAX_PARTS];
        self.n = limb + 1;
        self.v[limb] = 1u32 << bit;
        debug_assert!(self.is_normalized());
    }

    /// Sets bit `bit` (e.g. the IEEE-754 hidden bit), extending `n` if
    /// needed. Used only to set bit 52, the mantissa's hidden bit.
    pub(crate) fn set_bit(&mut self, bit: u32) {
        let limb = (bit / 32) as usize;
        let b = bit % 32;
        debug_assert!(limb < BI_MAX_PARTS);
        if limb + 1 > self.n {
            self.n = limb + 1;
        }
        self.v[limb] |= 1u32 << b;
    }

    fn normalize(&mut self) {
        let mut i = self.n;
        while i > 0 && self.v[i - 1] == 0 {
            i -= 1;
        }
        self.n = i;
    }

    pub(crate) fn is_normalized(&self) -> bool {
        self.n == 0 || self.v[self.n - 1] != 0
    }

    /// `self + other`.
    pub(crate) fn add(&self, other: &Bigint) -> Result<Bigint, Error> {
        debug_assert!(self.is_normalized());
        debug_assert!(other.is_normalized());

        // drive the loop with the longer operand
        let (x, y) = if other.n > self.n { (other, self) } else { (self, other) };

        let mut z = Bigint::ZERO;
        let mut carry: u64 = 0;
        let mut i = 0;
        while i < x.n {
            let mut tmp = carry + u64::from(x.v[i]);
            if i < y.n {
                tmp += u64::from(y.v[i]);
            }
            z.v[i] = tmp as u32;
            carry = tmp >> 32;
            i += 1;
        }
        if carry != 0 {
            if i >= BI_MAX_PARTS {
                return Err(Error::CapacityExceeded);
            }
            z.v[i] = carry as u32;
            i += 1;
        }
        z.n = i;

        debug_assert!(z.is_normalized());
        Ok(z)
    }

    /// `self - other`. Requires `self >= other`; the result is normalized
    /// (it may cancel all the way down to zero).
    pub(crate) fn sub(&self, other: &Bigint) -> Bigint {
        debug_assert!(self.is_normalized());
        debug_assert!(other.is_normalized());
        debug_assert!(self.compare(other) != Ordering::Less);

        let mut z = Bigint::ZERO;
        let mut borrow: i64 = 0;
        let n = self.n;
        for i in 0..n {
            let tx = i64::from(self.v[i]);
            let ty = if i < other.n { i64::from(other.v[i]) } else { 0 };
            let mut tmp = tx - ty + borrow;
            if tmp < 0 {
                tmp += 1i64 << 32;
                borrow = -1;
            } else {
                borrow = 0;
            }
            z.v[i] = tmp as u32;
        }
        z.n = n;
        z.normalize();
        z
    }

    /// `self * other`, schoolbook multiplication.
    pub(crate) fn mul(&self, other: &Bigint) -> Result<Bigint, Error> {
        debug_assert!(self.is_normalized());
        debug_assert!(other.is_normalized());

        let nz = self.n + other.n;
        if nz == 0 {
            return Ok(Bigint::ZERO);
        }
        if nz > BI_MAX_PARTS {
            return Err(Error::CapacityExceeded);
        }

        let mut z = Bigint::ZERO;
        z.n = nz;
        for i in 0..self.n {
            let mut carry: u64 = 0;
            for j in 0..other.n {
                let tmp = u64::from(self.v[i]) * u64::from(other.v[j])
                    + u64::from(z.v[i + j])
                    + carry;
                z.v[i + j] = tmp as u32;
                carry = tmp >> 32;
            }
            if carry > 0 {
                z.v[i + other.n] = z.v[i + other.n].wrapping_add(carry as u32);
            }
        }
        z.normalize();

        debug_assert!(z.is_normalized());
        Ok(z)
    }

    /// `self * y`, a specialization of [`Bigint::mul`] for a 32-bit scalar.
    pub(crate) fn mul_small(&self, y: u32) -> Result<Bigint, Error> {
        self.mul(&Bigint::small(y))
    }

    pub(crate) fn compare(&self, other: &Bigint) -> Ordering {
        match self.n.cmp(&other.n) {
            Ordering::Equal => {
                for i in (0..self.n).rev() {
                    match self.v[i].cmp(&other.v[i]) {
                        Ordering::Equal => continue,
                        ord => return ord,
                    }
                }
                Ordering::Equal
            }
            ord => ord,
        }
    }

    pub(crate) fn is_even(&self) -> bool {
        self.n == 0 || (self.v[0] & 0x1) == 0
    }

    /// True iff this bigint equals `2^52`, the smallest mantissa value for
    /// any given binary exponent (only the hidden bit set, fraction zero).
    pub(crate) fn is_2to52(&self) -> bool {
        self.n == 2 && self.v[0] == 0 && self.v[1] == (1u32 << (52 - 32))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small(v: u32) -> Bigint {
        Bigint::small(v)
    }

    #[test]
    fn normalization_after_ops() {
        let a = Bigint::pow2(64);
        let b = Bigint::pow2(64);
        let z = a.sub(&b);
        assert!(z.is_normalized());
        assert_eq!(z.compare(&Bigint::ZERO), Ordering::Equal);
    }

    #[test]
    fn add_sub_inverse() {
        let x = Bigint::pow2(900).add(&small(12345)).unwrap();
        let y = Bigint::pow2(37).add(&small(7)).unwrap();
        let sum = x.add(&y).unwrap();
        let back = sum.sub(&y);
        assert_eq!(back.compare(&x), Ordering::Equal);
    }

    #[test]
    fn mul_distributes_over_add() {
        let x = small(123456789);
        let y = Bigint::pow2(40).add(&small(17)).unwrap();
        let z = small(99991);
        let lhs = x.mul(&y.add(&z).unwrap()).unwrap();
        let rhs = x.mul(&y).unwrap().add(&x.mul(&z).unwrap()).unwrap();
        assert_eq!(lhs.compare(&rhs), Ordering::Equal);
    }

    #[test]
    fn compare_orders_by_length_then_limbs() {
        let a = Bigint::pow2(64);
        let b = Bigint::pow2(33);
        assert_eq!(a.compare(&b), Ordering::Greater);
        assert_eq!(b.compare(&a), Ordering::Less);
        assert_eq!(a.compare(&a), Ordering::Equal);
    }

    #[test]
    fn is_even_and_is_2to52() {
        assert!(Bigint::ZERO.is_even());
        assert!(small(4).is_even());
        assert!(!small(5).is_even());

        let mant = Bigint::pow2(52);
        assert!(mant.is_2to52());
        assert!(!small(5).is_2to52());
        assert!(!Bigint::pow2(51).is_2to52());
    }

    #[test]
    fn mul_small_matches_mul() {
        let x = Bigint::pow2(200).add(&small(3)).unwrap();
        let a = x.mul_small(7).unwrap();
        let b = x.mul(&small(7)).unwrap();
        assert_eq!(a.compare(&b), Ordering::Equal);
    }

    #[test]
    fn large_multiplication_stays_in_capacity() {
        // f at its largest (two limbs) times 2^(e+2) for the largest normal
        // exponent; this is the worst case `bi_mul` hits in `setup`.
        let f = Bigint::pow2(52).add(&small(1)).unwrap();
        let scale = Bigint::pow2(973);
        let r = f.mul(&scale).unwrap();
        assert!(r.is_normalized());
    }
}
