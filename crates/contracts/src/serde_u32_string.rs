//! Seeds travel as strings so JavaScript clients never round them, but plain
//! numbers are accepted on input.

use serde::de::Error;
use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S>(value: &u32, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&value.to_string())
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum SeedInput {
        String(String),
        Number(u64),
    }

    match SeedInput::deserialize(deserializer)? {
        SeedInput::String(raw) => raw.trim().parse::<u32>().map_err(D::Error::custom),
        SeedInput::Number(value) => u32::try_from(value)
            .map_err(|_| D::Error::custom(format!("seed {value} does not fit in 32 bits"))),
    }
}
