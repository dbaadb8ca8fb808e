//! BN254 scalar field element (Fr).
//!
//! Wraps `halo2curves::bn256::Fr` and adds the encodings the hash front-end
//! accepts: decimal strings, fixed-width hex words and big integers.

use crate::error::{ErrorCode, PoseidonResult};
use ff::{Field, PrimeField};
use halo2curves::bn256::Fr as Scalar;
use num_bigint::BigUint;
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Neg, Sub};
use std::str::FromStr;
use std::sync::OnceLock;

/// Maximum number of hex digits in a fixed-width word.
const HEX_WORD_DIGITS: usize = 64;

/// A BN254 scalar field element.
///
/// The wrapped value is always canonically reduced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fr(Scalar);

/// The field modulus p.
pub(crate) fn modulus() -> &'static BigUint {
    static MODULUS: OnceLock<BigUint> = OnceLock::new();
    MODULUS.get_or_init(|| {
        // p - 1 is the largest canonical value
        let max = -Scalar::ONE;
        BigUint::from_bytes_le(max.to_repr().as_ref()) + 1u32
    })
}

impl Fr {
    /// The additive identity (zero).
    pub const ZERO: Fr = Fr(Scalar::ZERO);

    /// The multiplicative identity (one).
    pub const ONE: Fr = Fr(Scalar::ONE);

    /// Create an Fr from a u64 value.
    pub fn from_u64(val: u64) -> Fr {
        Fr(Scalar::from(val))
    }

    /// Create an Fr from an arbitrary-precision integer, reducing modulo p.
    pub fn from_biguint(value: &BigUint) -> Fr {
        let reduced = value % modulus();
        let mut bytes = reduced.to_bytes_le();
        bytes.resize(32, 0);
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        // A reduced value always has a canonical encoding.
        Self::from_canonical_le(&arr).unwrap_or_default()
    }

    /// Create an Fr from big-endian bytes of any length, reducing modulo p.
    pub fn from_bytes_be_reduced(bytes: &[u8]) -> Fr {
        Self::from_biguint(&BigUint::from_bytes_be(bytes))
    }

    /// Create an Fr from canonical little-endian bytes.
    ///
    /// Returns `InvalidEncoding` if the value is >= the field modulus.
    pub fn from_bytes_le(bytes: &[u8; 32]) -> PoseidonResult<Fr> {
        Self::from_canonical_le(bytes).ok_or_else(|| {
            ErrorCode::InvalidEncoding(format!("non-canonical field bytes {}", hex::encode(bytes)))
        })
    }

    fn from_canonical_le(bytes: &[u8; 32]) -> Option<Fr> {
        let mut repr = <Scalar as PrimeField>::Repr::default();
        repr.as_mut().copy_from_slice(bytes);
        Option::from(Scalar::from_repr(repr)).map(Fr)
    }

    /// Create an Fr from a hex word.
    ///
    /// Accepts an optional `0x` prefix followed by 1 to 64 hex digits, read as a
    /// big-endian 256-bit word. Shorter words are left-padded with zeros and
    /// values at or above the modulus are reduced.
    pub fn from_hex(hex_str: &str) -> PoseidonResult<Fr> {
        let digits = hex_str
            .strip_prefix("0x")
            .or_else(|| hex_str.strip_prefix("0X"))
            .unwrap_or(hex_str);

        if digits.is_empty() || digits.len() > HEX_WORD_DIGITS {
            return Err(ErrorCode::InvalidEncoding(format!(
                "hex word must have 1 to {} digits, got {}",
                HEX_WORD_DIGITS,
                digits.len()
            )));
        }
        if !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ErrorCode::InvalidEncoding(format!(
                "invalid hex digits in {:?}",
                hex_str
            )));
        }

        let padded = format!("{:0>width$}", digits, width = HEX_WORD_DIGITS);
        let bytes = hex::decode(padded)
            .map_err(|e| ErrorCode::InvalidEncoding(format!("invalid hex: {}", e)))?;
        Ok(Self::from_bytes_be_reduced(&bytes))
    }

    /// Create an Fr from a decimal string of any magnitude, reducing modulo p.
    pub fn from_decimal(dec_str: &str) -> PoseidonResult<Fr> {
        if dec_str.is_empty() || !dec_str.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ErrorCode::InvalidEncoding(format!(
                "invalid decimal integer {:?}",
                dec_str
            )));
        }
        BigUint::parse_bytes(dec_str.as_bytes(), 10)
            .map(|v| Self::from_biguint(&v))
            .ok_or_else(|| ErrorCode::InvalidEncoding(format!("invalid decimal integer {:?}", dec_str)))
    }

    /// Convert to canonical 32-byte little-endian representation.
    pub fn to_bytes_le(&self) -> [u8; 32] {
        let mut out = [0u8; 32];
        out.copy_from_slice(self.0.to_repr().as_ref());
        out
    }

    /// Convert to 32-byte big-endian representation.
    pub fn to_bytes_be(&self) -> [u8; 32] {
        let mut out = self.to_bytes_le();
        out.reverse();
        out
    }

    /// Convert to a 0x-prefixed, 64-digit lowercase hex word (big-endian).
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.to_bytes_be()))
    }

    /// Convert to an arbitrary-precision integer.
    pub fn to_biguint(&self) -> BigUint {
        BigUint::from_bytes_le(&self.to_bytes_le())
    }

    /// Convert to decimal string representation.
    pub fn to_decimal(&self) -> String {
        self.to_biguint().to_str_radix(10)
    }

    /// Get the underlying scalar value.
    pub fn inner(&self) -> &Scalar {
        &self.0
    }

    /// Returns true for the additive identity.
    pub fn is_zero(&self) -> bool {
        bool::from(self.0.is_zero())
    }

    /// Compute x^5 (the Poseidon S-box).
    ///
    /// Always two squarings and one multiplication.
    pub fn pow5(&self) -> Fr {
        let x2 = self.0.square();
        let x4 = x2.square();
        Fr(x4 * self.0)
    }

    /// Square the field element.
    pub fn square(&self) -> Fr {
        Fr(self.0.square())
    }

    /// Raise to a u64 power. The operation sequence does not depend on the
    /// exponent bits.
    pub fn pow(&self, exp: u64) -> Fr {
        Fr(self.0.pow([exp]))
    }

    /// Multiplicative inverse, `None` for zero.
    pub fn inverse(&self) -> Option<Fr> {
        Option::from(self.0.invert()).map(Fr)
    }
}

impl Default for Fr {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<u64> for Fr {
    fn from(val: u64) -> Self {
        Fr::from_u64(val)
    }
}

impl From<&BigUint> for Fr {
    fn from(val: &BigUint) -> Self {
        Fr::from_biguint(val)
    }
}

impl FromStr for Fr {
    type Err = ErrorCode;

    /// `0x`-prefixed strings are hex words, everything else is decimal.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.starts_with("0x") || s.starts_with("0X") {
            Fr::from_hex(s)
        } else {
            Fr::from_decimal(s)
        }
    }
}

impl Add for Fr {
    type Output = Fr;
    fn add(self, rhs: Fr) -> Fr {
        Fr(self.0 + rhs.0)
    }
}

impl AddAssign for Fr {
    fn add_assign(&mut self, rhs: Fr) {
        self.0 += rhs.0;
    }
}

impl Sub for Fr {
    type Output = Fr;
    fn sub(self, rhs: Fr) -> Fr {
        Fr(self.0 - rhs.0)
    }
}

impl Mul for Fr {
    type Output = Fr;
    fn mul(self, rhs: Fr) -> Fr {
        Fr(self.0 * rhs.0)
    }
}

impl Neg for Fr {
    type Output = Fr;
    fn neg(self) -> Fr {
        Fr(-self.0)
    }
}

impl fmt::Display for Fr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}

impl Serialize for Fr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_decimal())
    }
}

impl<'de> Deserialize<'de> for Fr {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Fr::from_str(&s).map_err(de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{MODULUS_DECIMAL, MODULUS_HEX};

    #[test]
    fn test_zero_one() {
        assert_eq!(
            Fr::ZERO.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000000"
        );
        assert_eq!(
            Fr::ONE.to_hex(),
            "0x0000000000000000000000000000000000000000000000000000000000000001"
        );
    }

    #[test]
    fn test_modulus_constants_match_backend() {
        assert_eq!(modulus().to_str_radix(10), MODULUS_DECIMAL);
        let backend = <Scalar as PrimeField>::MODULUS.trim_start_matches("0x");
        assert_eq!(
            BigUint::parse_bytes(backend.as_bytes(), 16).as_ref(),
            Some(modulus())
        );
        assert_eq!(Fr::from_hex(MODULUS_HEX).map(|_| ()), Ok(()));
    }

    #[test]
    fn test_modulus_reduces_to_zero() {
        assert_eq!(Fr::from_decimal(MODULUS_DECIMAL).unwrap(), Fr::ZERO);
        assert_eq!(Fr::from_hex(MODULUS_HEX).unwrap(), Fr::ZERO);
    }

    #[test]
    fn test_roundtrip() {
        let original = Fr::from_u64(12345);
        let bytes = original.to_bytes_le();
        let recovered = Fr::from_bytes_le(&bytes).unwrap();
        assert_eq!(original, recovered);
    }

    #[test]
    fn test_arithmetic() {
        let a = Fr::from_u64(100);
        let b = Fr::from_u64(200);
        assert_eq!(a + b, Fr::from_u64(300));
        assert_eq!(b - a, Fr::from_u64(100));
        assert_eq!(Fr::from_u64(7) * Fr::from_u64(11), Fr::from_u64(77));
        assert_eq!(a - b + b, a);
    }

    #[test]
    fn test_pow5_matches_pow() {
        let x = Fr::from_u64(3);
        assert_eq!(x.pow5(), Fr::from_u64(243));
        assert_eq!(x.pow(5), x.pow5());
    }

    #[test]
    fn test_inverse() {
        let x = Fr::from_u64(42);
        assert_eq!(x * x.inverse().unwrap(), Fr::ONE);
        assert!(Fr::ZERO.inverse().is_none());
    }
}
