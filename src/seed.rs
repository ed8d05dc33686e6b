//! Seed generation, normalization, and shareable-code encoding (spec.md §4.1,
//! §6, §8).

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;

use crate::error::DelveError;
use crate::streams::derive_stream_seeds;

/// A fully-derived, immutable seed record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DungeonSeed {
    pub primary: u32,
    pub layout: u32,
    pub rooms: u32,
    pub connections: u32,
    pub details: u32,
    pub version: String,
    pub timestamp: u64,
}

/// Options for `SeedManager::generate_seeds`.
#[derive(Clone, Debug, Default)]
pub struct SeedOptions {
    /// Caller-supplied monotonic timestamp. Deterministic by default; a
    /// caller wanting wall-clock entropy for observability supplies it here
    /// rather than the core sampling the clock itself (spec.md §4.1).
    pub timestamp: Option<u64>,
    pub version: Option<String>,
}

/// Either a numeric or string seed input, normalized by `normalize_seed`.
pub enum SeedInput {
    Number(i64),
    Text(String),
}

pub struct SeedManager;

impl SeedManager {
    /// `normalizeSeed("")` yields 0; a non-empty string yields a
    /// deterministic non-negative 32-bit djb2 hash; a non-negative integer
    /// passes through; a negative integer fails.
    pub fn normalize_seed(input: SeedInput) -> Result<u32, DelveError> {
        match input {
            SeedInput::Number(k) => {
                if k < 0 {
                    Err(DelveError::SeedInvalid { message: format!("negative seed: {k}") })
                } else {
                    Ok((k as u64 & 0xFFFF_FFFF) as u32)
                }
            }
            SeedInput::Text(s) => {
                if s.is_empty() {
                    return Ok(0);
                }
                Ok(djb2(&s))
            }
        }
    }

    /// Derive the full `DungeonSeed` record from a normalized primary seed.
    pub fn generate_seeds(primary: u32, options: SeedOptions) -> Result<DungeonSeed, DelveError> {
        let (layout, rooms, connections, details) = derive_stream_seeds(primary);
        let timestamp = options.timestamp.unwrap_or_else(|| deterministic_timestamp(primary));
        if timestamp == 0 {
            return Err(DelveError::SeedInvalid { message: "timestamp must be > 0".into() });
        }
        let version = options.version.unwrap_or_else(|| "1.0.0".to_string());
        let seed = DungeonSeed { primary, layout, rooms, connections, details, version, timestamp };
        validate_seed(&seed)?;
        Ok(seed)
    }

    /// base64url(no padding) of the pipe-joined decimal fields.
    pub fn encode_seed(seed: &DungeonSeed) -> Result<String, DelveError> {
        validate_seed(seed)?;
        let payload = format!(
            "{}|{}|{}|{}|{}|{}",
            seed.primary, seed.layout, seed.rooms, seed.connections, seed.details, seed.timestamp
        );
        Ok(URL_SAFE_NO_PAD.encode(payload.as_bytes()))
    }

    /// Rejects strings outside the base64url alphabet, strings that do not
    /// split into six decimal integer parts, and decoded records failing
    /// `DungeonSeed` invariants.
    pub fn decode_seed(code: &str) -> Result<DungeonSeed, DelveError> {
        if code.is_empty() || !code.bytes().all(is_base64url_byte) {
            return Err(DelveError::SeedDecodeFailed { message: "not valid base64url".into() });
        }
        let bytes = URL_SAFE_NO_PAD
            .decode(code)
            .map_err(|e| DelveError::SeedDecodeFailed { message: format!("base64 decode: {e}") })?;
        let payload = String::from_utf8(bytes)
            .map_err(|e| DelveError::SeedDecodeFailed { message: format!("utf8: {e}") })?;
        let parts: Vec<&str> = payload.split('|').collect();
        if parts.len() != 6 {
            return Err(DelveError::SeedDecodeFailed {
                message: format!("expected 6 parts, got {}", parts.len()),
            });
        }
        let parse_u32 = |s: &str| {
            s.parse::<u32>()
                .map_err(|e| DelveError::SeedDecodeFailed { message: format!("bad int {s:?}: {e}") })
        };
        let primary = parse_u32(parts[0])?;
        let layout = parse_u32(parts[1])?;
        let rooms = parse_u32(parts[2])?;
        let connections = parse_u32(parts[3])?;
        let details = parse_u32(parts[4])?;
        let timestamp: u64 = parts[5]
            .parse()
            .map_err(|e| DelveError::SeedDecodeFailed { message: format!("bad timestamp: {e}") })?;

        let seed = DungeonSeed {
            primary,
            layout,
            rooms,
            connections,
            details,
            version: "1.0.0".to_string(),
            timestamp,
        };
        validate_seed(&seed).map_err(|e| DelveError::SeedDecodeFailed { message: e.to_string() })?;
        Ok(seed)
    }
}

fn validate_seed(seed: &DungeonSeed) -> Result<(), DelveError> {
    if seed.rooms == 0 || seed.connections == 0 || seed.details == 0 {
        return Err(DelveError::SeedInvalid { message: "stream seeds must be > 0".into() });
    }
    if seed.timestamp == 0 {
        return Err(DelveError::SeedInvalid { message: "timestamp must be > 0".into() });
    }
    if !is_semver(&seed.version) {
        return Err(DelveError::SeedInvalid {
            message: format!("version {:?} does not match ^\\d+\\.\\d+\\.\\d+$", seed.version),
        });
    }
    Ok(())
}

fn is_semver(v: &str) -> bool {
    let parts: Vec<&str> = v.split('.').collect();
    parts.len() == 3 && parts.iter().all(|p| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit()))
}

fn is_base64url_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// djb2 string hash, folded into a non-negative 32-bit integer.
fn djb2(s: &str) -> u32 {
    let mut hash: u32 = 5381;
    for b in s.bytes() {
        hash = hash.wrapping_mul(33).wrapping_add(b as u32);
    }
    hash
}

/// Deterministic stand-in for a monotonic timestamp, derived from the
/// primary seed so it never depends on wall-clock entropy in the hot path
/// (spec.md §1 Non-goals).
fn deterministic_timestamp(primary: u32) -> u64 {
    (primary as u64).wrapping_mul(2_654_435_761).wrapping_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_empty_string_is_zero() {
        assert_eq!(SeedManager::normalize_seed(SeedInput::Text(String::new())).unwrap(), 0);
    }

    #[test]
    fn normalize_nonempty_string_is_deterministic() {
        let a = SeedManager::normalize_seed(SeedInput::Text("hello".into())).unwrap();
        let b = SeedManager::normalize_seed(SeedInput::Text("hello".into())).unwrap();
        assert_eq!(a, b);
        assert_ne!(a, 0);
    }

    #[test]
    fn normalize_nonnegative_passthrough() {
        assert_eq!(SeedManager::normalize_seed(SeedInput::Number(42)).unwrap(), 42);
    }

    #[test]
    fn normalize_negative_fails() {
        assert!(SeedManager::normalize_seed(SeedInput::Number(-1)).is_err());
    }

    #[test]
    fn generate_seeds_is_deterministic() {
        let opts = SeedOptions { timestamp: Some(1), version: None };
        let a = SeedManager::generate_seeds(12345, opts.clone()).unwrap();
        let b = SeedManager::generate_seeds(12345, opts).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn round_trip_encode_decode() {
        let seed = SeedManager::generate_seeds(12345, SeedOptions { timestamp: Some(1), version: None }).unwrap();
        let code = SeedManager::encode_seed(&seed).unwrap();
        assert!(!code.contains('+'));
        assert!(!code.contains('/'));
        assert!(!code.contains('='));
        let decoded = SeedManager::decode_seed(&code).unwrap();
        assert_eq!(decoded.primary, seed.primary);
        assert_eq!(decoded.layout, seed.layout);
        assert_eq!(decoded.rooms, seed.rooms);
        assert_eq!(decoded.connections, seed.connections);
        assert_eq!(decoded.details, seed.details);
        assert_eq!(decoded.timestamp, seed.timestamp);
    }

    #[test]
    fn truncated_code_fails_to_decode() {
        let seed = SeedManager::generate_seeds(1, SeedOptions { timestamp: Some(1), version: None }).unwrap();
        let code = SeedManager::encode_seed(&seed).unwrap();
        let truncated = &code[..code.len() - 1];
        assert!(SeedManager::decode_seed(truncated).is_err());
    }

    #[test]
    fn non_base64url_chars_rejected() {
        assert!(SeedManager::decode_seed("not valid!!").is_err());
    }

    #[test]
    fn wrong_part_count_rejected() {
        let bogus = URL_SAFE_NO_PAD.encode(b"1|2|3");
        assert!(SeedManager::decode_seed(&bogus).is_err());
    }

    #[test]
    fn scenario_4_encode_round_trip() {
        let seed = DungeonSeed {
            primary: 1,
            layout: 2_654_435_769u32 ^ 1,
            rooms: 1_234_567,
            connections: 2_345_678,
            details: 3_456_789,
            version: "1.0.0".to_string(),
            timestamp: 1,
        };
        let code = SeedManager::encode_seed(&seed).unwrap();
        let decoded = SeedManager::decode_seed(&code).unwrap();
        assert_eq!(decoded.primary, seed.primary);
        assert_eq!(decoded.layout, seed.layout);
        let truncated = &code[..code.len() - 1];
        assert!(SeedManager::decode_seed(truncated).is_err());
    }
}
