use std::{fmt, num::ParseIntError, str::FromStr};

use serde::{Deserialize, Serialize};

/// A 64-bit perceptual fingerprint. Bit 63 corresponds to the top-left cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct ImageHash {
    bits: u64,
}

impl ImageHash {
    pub fn new(bits: u64) -> Self {
        Self { bits }
    }

    /// Packs bits in reading order, first bit most significant.
    pub fn from_bits(bits: impl IntoIterator<Item = bool>) -> Self {
        let bits = bits
            .into_iter()
            .take(64)
            .fold(0u64, |acc, bit| (acc << 1) | u64::from(bit));
        Self { bits }
    }

    pub fn bits(&self) -> u64 {
        self.bits
    }

    /// Hamming distance.
    pub fn distance(&self, other: &Self) -> u32 {
        (self.bits ^ other.bits).count_ones()
    }

    pub fn to_hex(&self) -> String {
        format!("{:016x}", self.bits)
    }

    pub fn from_hex(hex: &str) -> Result<Self, ParseIntError> {
        u64::from_str_radix(hex.trim(), 16).map(Self::new)
    }
}

impl fmt::Display for ImageHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:016x}", self.bits)
    }
}

impl FromStr for ImageHash {
    type Err = ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_hex(s)
    }
}

impl From<ImageHash> for String {
    fn from(hash: ImageHash) -> Self {
        hash.to_hex()
    }
}

impl TryFrom<String> for ImageHash {
    type Error = ParseIntError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_hex(&value)
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_first_bit_is_most_significant() {
        let hash = ImageHash::from_bits(std::iter::once(true).chain(std::iter::repeat(false).take(63)));
        assert_eq!(hash.to_hex(), "8000000000000000");

        let hash = ImageHash::from_bits(std::iter::repeat(false).take(63).chain(std::iter::once(true)));
        assert_eq!(hash.to_hex(), "0000000000000001");
    }

    #[test]
    fn test_distance() {
        let a = ImageHash::new(0);
        let b = ImageHash::new(u64::MAX);
        assert_eq!(a.distance(&b), 64);
        assert_eq!(a.distance(&a), 0);
        assert_eq!(ImageHash::new(0b1011).distance(&ImageHash::new(0b0001)), 2);
    }

    #[test]
    fn test_hex_parse() {
        let hash: ImageHash = "00ff00ff00ff00ff".parse().unwrap();
        assert_eq!(hash.bits(), 0x00ff_00ff_00ff_00ff);
        assert_eq!(hash.to_string(), "00ff00ff00ff00ff");
        assert!(ImageHash::from_hex("not hex").is_err());
    }

    #[test]
    fn test_serde_as_hex_string() {
        let hash = ImageHash::new(0xdead_beef);
        let json = serde_json::to_string(&hash).unwrap();
        assert_eq!(json, "\"00000000deadbeef\"");
        assert_eq!(serde_json::from_str::<ImageHash>(&json).unwrap(), hash);
    }
}
