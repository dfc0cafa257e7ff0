//! Serde helpers for the chain node's JSON encoding.
//!
//! Integers travel as `0x`-prefixed hex quantities (`"0x1a"`) and byte strings as
//! `0x`-prefixed hex (`"0xdeadbeef"`). Use with `#[serde(with = "...")]`.

fn parse_quantity<E: serde::de::Error>(s: &str) -> Result<u64, E> {
    let digits = s
        .strip_prefix("0x")
        .ok_or_else(|| E::custom(format!("quantity '{}' is missing the 0x prefix", s)))?;
    if digits.is_empty() {
        return Err(E::custom("empty quantity"));
    }
    u64::from_str_radix(digits, 16).map_err(E::custom)
}

pub mod u64_hex {
    use super::parse_quantity;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        let s = String::deserialize(deserializer)?;
        parse_quantity(&s)
    }
}

pub mod u32_hex {
    use super::parse_quantity;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &u32, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format!("{:#x}", value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
        let s = String::deserialize(deserializer)?;
        let value = parse_quantity::<D::Error>(&s)?;
        u32::try_from(value).map_err(serde::de::Error::custom)
    }
}

pub mod bytes {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&crate::encoding::bytes_to_hex(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let s = String::deserialize(deserializer)?;
        crate::encoding::hex_to_bytes(&s).map_err(serde::de::Error::custom)
    }
}

pub mod bytes_vec {
    use serde::ser::SerializeSeq;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(items: &[Vec<u8>], serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(items.len()))?;
        for item in items {
            seq.serialize_element(&crate::encoding::bytes_to_hex(item))?;
        }
        seq.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Vec<Vec<u8>>, D::Error> {
        let items = Vec::<String>::deserialize(deserializer)?;
        items
            .iter()
            .map(|s| crate::encoding::hex_to_bytes(s).map_err(serde::de::Error::custom))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use serde::{Deserialize, Serialize};

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "super::u64_hex")]
        capacity: u64,
        #[serde(with = "super::u32_hex")]
        index: u32,
        #[serde(with = "super::bytes")]
        args: Vec<u8>,
    }

    #[test]
    fn test_quantities_and_bytes() {
        let json = r#"{"capacity":"0x2540be400","index":"0x1","args":"0x00ff"}"#;
        let sample: Sample = serde_json::from_str(json).unwrap();
        assert_eq!(sample.capacity, 10_000_000_000);
        assert_eq!(sample.index, 1);
        assert_eq!(sample.args, vec![0x00, 0xff]);
        assert_eq!(serde_json::to_string(&sample).unwrap(), json);
    }

    #[test]
    fn test_rejects_unprefixed_quantity() {
        let json = r#"{"capacity":"10","index":"0x1","args":"0x"}"#;
        assert!(serde_json::from_str::<Sample>(json).is_err());
    }

    #[test]
    fn test_rejects_u32_overflow() {
        let json = r#"{"capacity":"0x0","index":"0x100000000","args":"0x"}"#;
        assert!(serde_json::from_str::<Sample>(json).is_err());
    }
}
