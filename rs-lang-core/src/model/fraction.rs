use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::FractionError;

/// An exact rational number, always reduced to lowest terms.
///
/// Used while training to compute conditional ngram probabilities without
/// rounding, so that ngrams sharing the exact same probability can be
/// grouped deterministically when a model is serialized.
///
/// # Invariants
/// - `denominator > 0`
/// - `gcd(|numerator|, denominator) == 1` (zero is stored as `0/1`)
///
/// Every arithmetic operation is checked: an intermediate product or sum
/// that does not fit into `i64` yields [`FractionError::Overflow`] instead
/// of a wrapped value.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[serde(try_from = "String", into = "String")]
pub struct ExactFraction {
	numerator: i64,
	denominator: i64,
}

impl ExactFraction {
	/// Creates a fraction reduced to lowest terms with a positive denominator.
	///
	/// # Errors
	/// - [`FractionError::ZeroDenominator`] if `denominator == 0`
	/// - [`FractionError::Overflow`] if the sign cannot be moved to the
	///   numerator (`i64::MIN` involved)
	pub fn new(numerator: i64, denominator: i64) -> Result<Self, FractionError> {
		if denominator == 0 {
			return Err(FractionError::ZeroDenominator { numerator });
		}

		let (mut num, mut den) = (numerator, denominator);
		if den < 0 {
			num = negate(num, numerator, denominator)?;
			den = negate(den, numerator, denominator)?;
		}

		// den > 0 here, so the gcd is at most den and fits into i64
		let gcd = greatest_common_divisor(num.unsigned_abs(), den as u64) as i64;
		if gcd > 1 {
			num /= gcd;
			den /= gcd;
		}

		Ok(Self { numerator: num, denominator: den })
	}

	pub fn numerator(&self) -> i64 {
		self.numerator
	}

	pub fn denominator(&self) -> i64 {
		self.denominator
	}

	pub fn to_f64(&self) -> f64 {
		self.numerator as f64 / self.denominator as f64
	}

	pub fn checked_neg(&self) -> Result<Self, FractionError> {
		let numerator = negate(self.numerator, self.numerator, self.denominator)?;
		Ok(Self { numerator, denominator: self.denominator })
	}

	/// Exact sum of two fractions.
	///
	/// Denominators are divided by their gcd before multiplying, which keeps
	/// intermediates as small as possible.
	pub fn checked_add(&self, other: &Self) -> Result<Self, FractionError> {
		let (a, b) = (self.numerator, self.denominator);
		let (c, d) = (other.numerator, other.denominator);

		let d1 = greatest_common_divisor(b as u64, d as u64) as i64;
		if d1 == 1 {
			let numerator = checked(a.checked_mul(d), "add")?
				.checked_add(checked(c.checked_mul(b), "add")?);
			let denominator = checked(b.checked_mul(d), "add")?;
			return Self::new(checked(numerator, "add")?, denominator);
		}

		let t = checked(
			checked(a.checked_mul(d / d1), "add")?.checked_add(checked(c.checked_mul(b / d1), "add")?),
			"add",
		)?;
		let d2 = greatest_common_divisor(t.unsigned_abs(), d1 as u64) as i64;
		let denominator = checked((b / d1).checked_mul(d / d2), "add")?;
		Self::new(t / d2, denominator)
	}

	/// Exact product of two fractions (cross-reduced before multiplying).
	pub fn checked_mul(&self, other: &Self) -> Result<Self, FractionError> {
		let g1 = greatest_common_divisor(self.numerator.unsigned_abs(), other.denominator as u64).max(1) as i64;
		let g2 = greatest_common_divisor(other.numerator.unsigned_abs(), self.denominator as u64).max(1) as i64;

		let numerator = checked((self.numerator / g1).checked_mul(other.numerator / g2), "multiply")?;
		let denominator = checked((self.denominator / g2).checked_mul(other.denominator / g1), "multiply")?;
		Self::new(numerator, denominator)
	}
}

fn negate(value: i64, numerator: i64, denominator: i64) -> Result<i64, FractionError> {
	value.checked_neg().ok_or_else(|| {
		FractionError::Overflow(format!("cannot negate in fraction {}/{}", numerator, denominator))
	})
}

fn checked(value: Option<i64>, operation: &str) -> Result<i64, FractionError> {
	value.ok_or_else(|| FractionError::Overflow(format!("i64 overflow while trying to {}", operation)))
}

/// Binary (Stein's) gcd on unsigned magnitudes; `gcd(0, x) == x`.
fn greatest_common_divisor(a: u64, b: u64) -> u64 {
	if a == 0 {
		return b;
	}
	if b == 0 {
		return a;
	}

	let shift = (a | b).trailing_zeros();
	let mut x = a >> a.trailing_zeros();
	let mut y = b >> b.trailing_zeros();

	while x != y {
		if x > y {
			std::mem::swap(&mut x, &mut y);
		}
		y -= x;
		y >>= y.trailing_zeros();
	}

	x << shift
}

impl Ord for ExactFraction {
	fn cmp(&self, other: &Self) -> Ordering {
		// both denominators are positive, so cross multiplication keeps the order
		let left = self.numerator as i128 * other.denominator as i128;
		let right = other.numerator as i128 * self.denominator as i128;
		left.cmp(&right)
	}
}

impl PartialOrd for ExactFraction {
	fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
		Some(self.cmp(other))
	}
}

impl fmt::Display for ExactFraction {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		write!(f, "{}/{}", self.numerator, self.denominator)
	}
}

impl FromStr for ExactFraction {
	type Err = FractionError;

	fn from_str(s: &str) -> Result<Self, FractionError> {
		let (numerator, denominator) = s
			.split_once('/')
			.ok_or_else(|| FractionError::Parse(s.to_owned()))?;
		let numerator = numerator
			.trim()
			.parse::<i64>()
			.map_err(|_| FractionError::Parse(s.to_owned()))?;
		let denominator = denominator
			.trim()
			.parse::<i64>()
			.map_err(|_| FractionError::Parse(s.to_owned()))?;
		Self::new(numerator, denominator)
	}
}

impl TryFrom<String> for ExactFraction {
	type Error = FractionError;

	fn try_from(value: String) -> Result<Self, FractionError> {
		value.parse()
	}
}

impl From<ExactFraction> for String {
	fn from(fraction: ExactFraction) -> Self {
		fraction.to_string()
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	fn fraction(numerator: i64, denominator: i64) -> ExactFraction {
		ExactFraction::new(numerator, denominator).unwrap()
	}

	#[test]
	fn test_reduction_to_lowest_terms() {
		let f = fraction(12, 144);
		assert_eq!((f.numerator(), f.denominator()), (1, 12));
		assert_eq!(f, fraction(1, 12));

		let f = fraction(3, -9);
		assert_eq!((f.numerator(), f.denominator()), (-1, 3));

		let f = fraction(0, -7);
		assert_eq!((f.numerator(), f.denominator()), (0, 1));
	}

	#[test]
	fn test_zero_denominator() {
		assert_eq!(
			ExactFraction::new(5, 0),
			Err(FractionError::ZeroDenominator { numerator: 5 })
		);
	}

	#[test]
	fn test_negation_overflow() {
		assert!(matches!(ExactFraction::new(i64::MIN, -1), Err(FractionError::Overflow(_))));
		assert!(matches!(fraction(i64::MIN, 1).checked_neg(), Err(FractionError::Overflow(_))));
		assert_eq!(fraction(2, 3).checked_neg().unwrap(), fraction(-2, 3));
	}

	#[test]
	fn test_string_round_trip() {
		let f: ExactFraction = "12/144".parse().unwrap();
		assert_eq!(f.to_string(), "1/12");
		for text in ["1/12", "-5/7", "0/1", "9223372036854775807/2"] {
			assert_eq!(text.parse::<ExactFraction>().unwrap().to_string(), text);
		}
		assert!(matches!("1:2".parse::<ExactFraction>(), Err(FractionError::Parse(_))));
		assert!(matches!("a/2".parse::<ExactFraction>(), Err(FractionError::Parse(_))));
	}

	#[test]
	fn test_ordering() {
		assert!(fraction(1, 3) < fraction(1, 2));
		assert!(fraction(-1, 2) < fraction(1, 1000));
		assert_eq!(fraction(2, 4).cmp(&fraction(1, 2)), Ordering::Equal);
		assert!(fraction(i64::MAX, 2) > fraction(i64::MAX - 1, 2));
	}

	#[test]
	fn test_addition() {
		assert_eq!(fraction(1, 6).checked_add(&fraction(1, 3)).unwrap(), fraction(1, 2));
		assert_eq!(fraction(1, 2).checked_add(&fraction(1, 3)).unwrap(), fraction(5, 6));
		assert_eq!(fraction(1, 2).checked_add(&fraction(-1, 2)).unwrap(), fraction(0, 1));
		assert!(matches!(
			fraction(i64::MAX, 1).checked_add(&fraction(1, 1)),
			Err(FractionError::Overflow(_))
		));
	}

	#[test]
	fn test_multiplication() {
		assert_eq!(fraction(2, 3).checked_mul(&fraction(3, 4)).unwrap(), fraction(1, 2));
		assert_eq!(fraction(0, 1).checked_mul(&fraction(3, 4)).unwrap(), fraction(0, 1));
		assert!(matches!(
			fraction(i64::MAX, 1).checked_mul(&fraction(2, 1)),
			Err(FractionError::Overflow(_))
		));
	}

	#[test]
	fn test_gcd() {
		assert_eq!(greatest_common_divisor(0, 9), 9);
		assert_eq!(greatest_common_divisor(48, 18), 6);
		assert_eq!(greatest_common_divisor(1 << 40, 1 << 20), 1 << 20);
		assert_eq!(greatest_common_divisor(17, 5), 1);
	}

	#[test]
	fn test_to_f64() {
		assert_eq!(fraction(1, 100).to_f64(), 0.01);
		assert_eq!(fraction(1, 4).to_f64(), 0.25);
	}

	#[test]
	fn test_serde_as_string() {
		let json = serde_json::to_string(&fraction(3, 9)).unwrap();
		assert_eq!(json, "\"1/3\"");
		let f: ExactFraction = serde_json::from_str("\"2/8\"").unwrap();
		assert_eq!(f, fraction(1, 4));
	}
}
