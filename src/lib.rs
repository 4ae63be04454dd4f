//! A Dragon4/Burger-Dybvig shortest-digit float-to-string engine.
//!
//! Converts an IEEE-754 double-precision value into its decimal (or
//! arbitrary-radix) textual representation, using exact rational
//! arithmetic over fixed-capacity arbitrary-precision integers to
//! guarantee round-trip correctness with the minimum number of digits.
//!
//! The crate has no opinion on where the resulting bytes go: callers
//! implement [`NumConvSink`] over whatever value stack, interned-string
//! table, or buffer their embedding needs. String-to-number parsing is
//! out of scope entirely -- this crate only goes one direction.
//!
//! # Example
//!
//! ```
//! use dragon4_stringify::{stringify, NumConvSink, ReservedWord};
//!
//! struct StringSink(std::string::String);
//!
//! impl NumConvSink for StringSink {
//!     fn push_reserved(&mut self, word: ReservedWord) {
//!         self.0.push_str(match word {
//!             ReservedWord::Nan => "NaN",
//!             ReservedWord::Infinity => "Infinity",
//!             ReservedWord::NegInfinity => "-Infinity",
//!             ReservedWord::Zero => "0",
//!         });
//!     }
//!     fn push_bytes(&mut self, bytes: &[u8]) {
//!         self.0.push_str(core::str::from_utf8(bytes).unwrap());
//!     }
//!     fn push_u32(&mut self, neg: bool, value: u32) {
//!         use std::fmt::Write as _;
//!         let _ = if neg {
//!             write!(self.0, "-{}", value)
//!         } else {
//!             write!(self.0, "{}", value)
//!         };
//!     }
//! }
//!
//! let mut sink = StringSink(std::string::String::new());
//! dragon4_stringify::stringify(&mut sink, 0.1, 10, 0);
//! assert_eq!(sink.0, "0.1");
//! ```
//!
//! # Minimum Rust version
//!
//! The minimum Rust version required by this crate is 1.43.

#![deny(
    rust_2018_idioms,
    trivial_numeric_casts,
    unreachable_pub,
    unused_must_use,
    unused_qualifications
)]
#![no_std]

#[cfg(test)]
extern crate std;

mod bignum;
mod decoder;
mod dragon;
mod error;
mod sink;


pub use sink::{NumConvSink, ReservedWord};

/// Symbol table for digit values `0..36`, shared by every conversion.
const DIGIT_CHARS: [u8; 36] = *b"0123456789abcdefghijklmnopqrstuvwxyz";

/// Upper bound on the number of significant digits Generate can produce
/// for any finite `f64` at any radix in `2..=36`. The true worst case is
/// radix 2 (~53 bits of mantissa precision plus one for the tie-break and
/// rounding cascade); this leaves generous headroom rather than computing
/// the tight bound per radix.
const MAX_DIGITS: usize = 64;

/// `MAX_DIGITS` plus one slot for [`dragon::round_up`]'s carry-out digit.
const DIGIT_BUF_LEN: usize = MAX_DIGITS + 1;

/// Upper bound on the number of output bytes `stringify` can produce.
///
/// Dominated by the leading-zero padding before the first significant
/// digit at very negative `k`: for radix 2 and the smallest denormal
/// (~5e-324), `k` can be as low as about -1073, each position needing one
/// '0' byte. 1100 bytes covers that with margin; the remaining slack
/// covers the sign, decimal point, and digit characters.
const OUT_BUF_LEN: usize = 1100 + DIGIT_BUF_LEN + 4;

#[cfg(all(feature = "trace", test))]
macro_rules! trace {
    ($($arg:tt)*) => {
        std::eprintln!($($arg)*)
    };
}

#[cfg(not(all(feature = "trace", test)))]
macro_rules! trace {
    ($($arg:tt)*) => {};
}

/// Converts `x` to a textual representation at the given `radix` and
/// pushes the result through `sink`.
///
/// `radix` must satisfy `2 <= radix <= 36`; behavior outside that range is
/// unspecified. `digits_hint` is accepted for API-shape parity with the
/// host's original call signature but is unused: this crate always
/// produces the shortest digit sequence that round-trips.
///
/// The sink receives exactly one push call sequence per invocation: either
/// a single [`ReservedWord`] (for NaN, infinity, or zero), a single
/// formatted unsigned integer (the radix-10 small-integer fast path), or a
/// single byte sequence containing an optional leading `-`, radix-`B`
/// digit characters, and at most one `.`.
pub fn stringify(sink: &mut impl NumConvSink, x: f64, radix: u32, _digits_hint: u32) {
    debug_assert!((2..=36).contains(&radix), "radix must be in 2..=36");

    if x.is_nan() {
        sink.push_reserved(ReservedWord::Nan);
        return;
    }
    if x.is_infinite() {
        sink.push_reserved(if x.is_sign_negative() {
            ReservedWord::NegInfinity
        } else {
            ReservedWord::Infinity
        });
        return;
    }
    if x == 0.0 {
        // sign of zero is deliberately dropped
        sink.push_reserved(ReservedWord::Zero);
        return;
    }

    let neg = x.is_sign_negative();
    let x = x.abs();

    // Fast path: radix-10 integers that fit exactly in a u32.
    if radix == 10 {
        let truncated = x as u32;
        if f64::from(truncated) == x {
            sink.push_u32(neg, truncated);
            return;
        }
    }

    let (f, e) = decoder::decode(x);
    let mut state = dragon::setup(&f, e, radix);
    dragon::scale(&mut state);

    trace!("after scale: k={}", state.k);

    let mut digit_buf = [0u8; DIGIT_BUF_LEN];
    let count = dragon::generate(&mut state, &mut digit_buf);
    let (count, carried) = dragon::round_up(&mut digit_buf, count, radix);
    let k = if carried { state.k + 1 } else { state.k };

    let mut out_buf = [0u8; OUT_BUF_LEN];
    let mut cursor = 0usize;
    if neg {
        out_buf[cursor] = b'-';
        cursor += 1;
    }
    dragon::format_digits(&DIGIT_CHARS, &digit_buf, count, k, |c| {
        out_buf[cursor] = c;
        cursor += 1;
    });

    sink.push_bytes(&out_buf[..cursor]);
}
