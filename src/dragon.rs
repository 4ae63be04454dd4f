//! Dragon4/Burger-Dybvig setup, scale, generate and output-placement.
//!
//! `b = 2` is assumed for the algebra below (matching how `f` and `e` were
//! decoded); the output radix `B` only enters through `radix`.

use core::cmp::Ordering;

use crate::bignum::Bigint;

const IEEE_DOUBLE_EXP_MIN_MINUS_52: i32 = -1022 - 52;

/// Everything Scale and Generate thread through: the remaining value
/// `r/s`, and the half-widths `mp/s`, `mm/s` to the next double above and
/// below the input.
pub(crate) struct DragonState {
    pub(crate) r: Bigint,
    pub(crate) s: Bigint,
    pub(crate) mp: Bigint,
    pub(crate) mm: Bigint,
    pub(crate) k: i32,
    pub(crate) low_ok: bool,
    pub(crate) high_ok: bool,
    pub(crate) radix: u32,
}

/// Initializes `r`, `s`, `m+`, `m-` and the round-to-even flags from the
/// decoded `(f, e)`, per the four setup cases.
pub(crate) fn setup(f: &Bigint, e: i32, radix: u32) -> DragonState {
    // Round-to-even tie handling is mandatory: disabling it (forcing both
    // flags false unconditionally) produces incorrect results for some
    // inputs, e.g. 1e23 at radix 10 would start with digit value 10 ('a').
    let even = f.is_even();
    let low_ok = even;
    let high_ok = even;

    let (r, s, mp, mm) = if e >= 0 {
        if f.is_2to52() {
            // unequal gaps: f is the smallest mantissa for this exponent
            let r = f.mul(&Bigint::pow2((e + 2) as u32)).expect(CAP_MSG);
            let s = Bigint::small(4);
            let mp = Bigint::pow2((e + 1) as u32);
            let mm = Bigint::pow2(e as u32);
            (r, s, mp, mm)
        } else {
            let r = f.mul(&Bigint::pow2((e + 1) as u32)).expect(CAP_MSG);
            let s = Bigint::small(2);
            let be = Bigint::pow2(e as u32);
            (r, s, be, be)
        }
    } else if e > IEEE_DOUBLE_EXP_MIN_MINUS_52 && f.is_2to52() {
        // unequal gaps, negative exponent
        let r = f.mul_small(4).expect(CAP_MSG);
        let s = Bigint::pow2((2 - e) as u32);
        (r, s, Bigint::small(2), Bigint::small(1))
    } else {
        // equal gaps: minimum exponent, or not the lowest mantissa
        let r = f.mul_small(2).expect(CAP_MSG);
        let s = Bigint::pow2((1 - e) as u32);
        (r, s, Bigint::small(1), Bigint::small(1))
    };

    DragonState {
        r,
        s,
        mp,
        mm,
        k: 0,
        low_ok,
        high_ok,
        radix,
    }
}

const CAP_MSG: &str = "bounded by the ~1120-bit capacity analysis for f64 conversion";

/// Finds the integer `k` such that `B^(k-1) <= value < B^k`, adjusted for
/// the round-to-even boundary flags. Exactly one of the two loops below
/// runs a nonzero number of iterations.
pub(crate) fn scale(state: &mut DragonState) {
    let mut k = 0i32;

    loop {
        let sum = state.r.add(&state.mp).expect(CAP_MSG);
        let too_low = match sum.compare(&state.s) {
            Ordering::Greater => true,
            Ordering::Equal => state.high_ok,
            Ordering::Less => false,
        };
        if !too_low {
            break;
        }
        state.s = state.s.mul_small(state.radix).expect(CAP_MSG);
        k += 1;
    }

    // k > 0 means k was too low and cannot be too high; only run the
    // decreasing loop when the increasing loop never fired.
    if k == 0 {
        loop {
            let sum = state.r.add(&state.mp).expect(CAP_MSG);
            let scaled = sum.mul_small(state.radix).expect(CAP_MSG);
            let too_high = match scaled.compare(&state.s) {
                Ordering::Less => true,
                Ordering::Equal => !state.high_ok,
                Ordering::Greater => false,
            };
            if !too_high {
                break;
            }
            state.r = state.r.mul_small(state.radix).expect(CAP_MSG);
            state.mp = state.mp.mul_small(state.radix).expect(CAP_MSG);
            state.mm = state.mm.mul_small(state.radix).expect(CAP_MSG);
            k -= 1;
        }
    }

    state.k = k;
}

/// Produces digit *values* (not yet mapped to characters) into `digits`,
/// stopping at the first position whose low/high boundary test uniquely
/// identifies the input double. Returns the number of digits written.
///
/// Every digit except possibly the very last is in `0..radix`; the last
/// one may come out equal to `radix` when the round-to-even tie or the
/// upper-boundary test rounds the final digit up. [`round_up`] resolves
/// that case by carrying into the preceding digits, rather than indexing
/// the symbol table out of bounds.
pub(crate) fn generate(state: &mut DragonState, digits: &mut [u8]) -> usize {
    let mut count = 0usize;

    loop {
        // (quotient, remainder) of (r * B) / s via repeated subtraction;
        // bounded by radix - 1 iterations.
        let mut t = state.r.mul_small(state.radix).expect(CAP_MSG);
        let mut d: u32 = 0;
        while t.compare(&state.s) != Ordering::Less {
            t = t.sub(&state.s);
            d += 1;
        }
        state.r = t;

        state.mp = state.mp.mul_small(state.radix).expect(CAP_MSG);
        state.mm = state.mm.mul_small(state.radix).expect(CAP_MSG);

        // "already within the lower half-interval"
        let tc1 = match state.r.compare(&state.mm) {
            Ordering::Less => true,
            Ordering::Equal => state.low_ok,
            Ordering::Greater => false,
        };
        // "within the upper half-interval"
        let sum = state.r.add(&state.mp).expect(CAP_MSG);
        let tc2 = match sum.compare(&state.s) {
            Ordering::Greater => true,
            Ordering::Equal => state.high_ok,
            Ordering::Less => false,
        };

        let emitted = match (tc1, tc2) {
            (false, false) => {
                digits[count] = d as u8;
                count += 1;
                continue;
            }
            (true, false) => d,
            (false, true) => d + 1,
            (true, true) => {
                // tie: break towards the even neighbor
                let doubled = state.r.mul_small(2).expect(CAP_MSG);
                if doubled.compare(&state.s) == Ordering::Less {
                    d
                } else {
                    d + 1
                }
            }
        };
        digits[count] = emitted as u8;
        count += 1;
        break;
    }

    count
}

/// Resolves a final digit value of exactly `radix` (the rounding-cascade
/// corner of the stopping rule) by carrying into the preceding digits,
/// growing the digit count by one only if the carry ripples past the
/// first digit (e.g. all-`(radix-1)` digits rounding up to a leading `1`
/// followed by zeros, as `999 -> 1000`).
///
/// `digits` must have room for `count + 1` entries. Returns the new digit
/// count and whether the caller must increment `k` by one.
pub(crate) fn round_up(digits: &mut [u8], count: usize, radix: u32) -> (usize, bool) {
    if count == 0 || (digits[count - 1] as u32) < radix {
        return (count, false);
    }

    let mut i = count - 1;
    digits[i] = 0;
    loop {
        if i == 0 {
            for j in (1..=count).rev() {
                digits[j] = digits[j - 1];
            }
            digits[0] = 1;
            return (count + 1, true);
        }
        i -= 1;
        digits[i] += 1;
        if (digits[i] as u32) < radix {
            return (count, false);
        }
        digits[i] = 0;
    }
}

/// Places the decimal point among the generated digits according to `k`,
/// pushing each output byte through `push`.
pub(crate) fn format_digits(
    digit_chars: &[u8; 36],
    digits: &[u8],
    count: usize,
    k: i32,
    mut push: impl FnMut(u8),
) {
    let mut first = true;
    for n in 0..count {
        let pos = k - n as i32;
        if pos <= 0 && first {
            push(b'0');
            push(b'.');
            let mut i = 0i32;
            while i > k {
                push(b'0');
                i -= 1;
            }
        } else if pos == 0 {
            push(b'.');
        }
        push(digit_chars[digits[n] as usize]);
        first = false;
    }

    if k >= 1 {
        let mut pos = k - count as i32;
        while pos > 0 {
            push(b'0');
            pos -= 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder;

    #[test]
    fn scale_converges_within_bounds() {
        let (f, e) = decoder::decode(0.1);
        let mut state = setup(&f, e, 10);
        scale(&mut state);

        let sum = state.r.add(&state.mp).unwrap();
        // B^(k-1) * s <= r + m+  <=  B^k * s  (flag-adjusted at the edges)
        let scaled_down = pow_radix_times(&state.s, 10, state.k - 1);
        let scaled_up = pow_radix_times(&state.s, 10, state.k);
        assert!(scaled_down.compare(&sum) != Ordering::Greater);
        assert!(sum.compare(&scaled_up) == Ordering::Less || sum.compare(&scaled_up) == Ordering::Equal);
    }

    fn pow_radix_times(s: &Bigint, radix: u32, exp: i32) -> Bigint {
        if exp >= 0 {
            let mut acc = *s;
            for _ in 0..exp {
                acc = acc.mul_small(radix).unwrap();
            }
            acc
        } else {
            *s
        }
    }

    #[test]
    fn round_up_propagates_through_a_nine() {
        let mut digits = [5u8, 9, 10]; // last digit rounded up to radix (10)
        let (count, carried) = round_up(&mut digits, 3, 10);
        assert_eq!(count, 3);
        assert!(!carried);
        assert_eq!(&digits[..3], &[6, 0, 0]);
    }

    #[test]
    fn round_up_cascades_through_nines() {
        let mut digits = [9u8, 9, 10, 0];
        let (count, carried) = round_up(&mut digits, 3, 10);
        assert_eq!(count, 4);
        assert!(carried);
        assert_eq!(&digits[..4], &[1, 0, 0, 0]);
    }

    #[test]
    fn round_up_noop_when_last_digit_in_range() {
        let mut digits = [1u8, 2, 3];
        let (count, carried) = round_up(&mut digits, 3, 10);
        assert_eq!(count, 3);
        assert!(!carried);
        assert_eq!(&digits[..3], &[1, 2, 3]);
    }

    #[test]
    fn round_up_handles_radix_36_last_digit_cascade() {
        // Open Question #2 (spec.md section 9): the rounding cascade can in
        // principle emit digit index B at the last position; for B = 36
        // that is one past the last symbol-table entry. digits[2] == 36
        // here stands in for that corner.
        let mut digits = [5u8, 35, 36];
        let (count, carried) = round_up(&mut digits, 3, 36);
        assert_eq!(count, 3);
        assert!(!carried);
        assert_eq!(&digits[..3], &[6, 0, 0]);
    }

    #[test]
    fn round_up_cascades_to_new_leading_digit_radix_36() {
        let mut digits = [35u8, 35, 36, 0];
        let (count, carried) = round_up(&mut digits, 3, 36);
        assert_eq!(count, 4);
        assert!(carried);
        assert_eq!(&digits[..4], &[1, 0, 0, 0]);
    }
}
