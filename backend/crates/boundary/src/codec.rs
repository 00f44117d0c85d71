//! Opaque Identifier Codec
//!
//! Internal database keys are sequential 64-bit integers. Exposing them
//! would leak row counts and make enumeration trivial, so the boundary
//! renders every identifier through a keyed, invertible permutation:
//!
//! 1. The key's 64 bits run through a 4-round Feistel network whose round
//!    function is HMAC-SHA256 keyed by the codec secret.
//! 2. The permuted value is rendered as 16 lowercase hex digits.
//!
//! The rendered width is constant regardless of the key's magnitude, and
//! `decode_id(encode_id(x)) == x` for every key. Decoding is *not* an
//! existence check: any 16 hex digits decode to *some* integer, so callers
//! must treat the result as untrusted until a repository lookup confirms
//! it. Wrong length or alphabet fails outright.

use kernel::id::Id;
use platform::crypto::hmac_sha256;
use thiserror::Error;

/// Rendered width of an opaque identifier, in hex digits
pub const OPAQUE_ID_LENGTH: usize = 16;

/// Feistel rounds applied to the 64-bit key
const FEISTEL_ROUNDS: u8 = 4;

/// Codec failure: the supplied string cannot be an opaque identifier
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Wrong rendered length
    #[error("opaque identifier must be {OPAQUE_ID_LENGTH} characters (got {0})")]
    InvalidLength(usize),

    /// Characters outside the lowercase hex alphabet
    #[error("opaque identifier contains characters outside the encoding alphabet")]
    InvalidAlphabet,
}

/// Keyed codec between internal keys and opaque identifier strings
///
/// Explicitly constructed with its secret; tests inject throwaway secrets
/// instead of touching process-wide state.
#[derive(Clone)]
pub struct OpaqueIdCodec {
    secret: [u8; 32],
}

impl OpaqueIdCodec {
    pub fn new(secret: [u8; 32]) -> Self {
        Self { secret }
    }

    /// Encode an internal key as an opaque identifier string
    pub fn encode_id(&self, id: i64) -> String {
        format!("{:016x}", self.permute(id as u64))
    }

    /// Decode an opaque identifier string back to an internal key
    ///
    /// The returned key is syntactically valid but unverified; the caller
    /// must confirm existence against the persistence layer.
    pub fn decode_id(&self, s: &str) -> Result<i64, CodecError> {
        if s.len() != OPAQUE_ID_LENGTH {
            return Err(CodecError::InvalidLength(s.len()));
        }
        if !s
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        {
            return Err(CodecError::InvalidAlphabet);
        }

        let permuted = u64::from_str_radix(s, 16).expect("validated hex");
        Ok(self.unpermute(permuted) as i64)
    }

    /// Typed convenience wrapper over [`encode_id`](Self::encode_id)
    pub fn encode<T>(&self, id: Id<T>) -> String {
        self.encode_id(id.into_inner())
    }

    /// Typed convenience wrapper over [`decode_id`](Self::decode_id)
    pub fn decode<T>(&self, s: &str) -> Result<Id<T>, CodecError> {
        self.decode_id(s).map(Id::from_raw)
    }

    // ========================================================================
    // Feistel permutation
    // ========================================================================

    fn permute(&self, value: u64) -> u64 {
        let mut left = (value >> 32) as u32;
        let mut right = value as u32;

        for round in 0..FEISTEL_ROUNDS {
            let next = left ^ self.round_fn(round, right);
            left = right;
            right = next;
        }

        ((left as u64) << 32) | right as u64
    }

    fn unpermute(&self, value: u64) -> u64 {
        let mut left = (value >> 32) as u32;
        let mut right = value as u32;

        for round in (0..FEISTEL_ROUNDS).rev() {
            let prev = right ^ self.round_fn(round, left);
            right = left;
            left = prev;
        }

        ((left as u64) << 32) | right as u64
    }

    /// Round function: first 4 bytes of HMAC-SHA256(secret, round || half)
    fn round_fn(&self, round: u8, half: u32) -> u32 {
        let mut data = [0u8; 5];
        data[0] = round;
        data[1..].copy_from_slice(&half.to_be_bytes());

        let mac = hmac_sha256(&self.secret, &data);
        u32::from_be_bytes([mac[0], mac[1], mac[2], mac[3]])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kernel::id::AccountId;

    fn codec() -> OpaqueIdCodec {
        OpaqueIdCodec::new([7u8; 32])
    }

    #[test]
    fn test_roundtrip_across_domain() {
        let codec = codec();
        for id in [0i64, 1, 42, 7, 1000, i64::MAX, i64::MIN, -1] {
            let encoded = codec.encode_id(id);
            assert_eq!(codec.decode_id(&encoded), Ok(id), "id {id}");
        }
    }

    #[test]
    fn test_fixed_width_hides_magnitude() {
        let codec = codec();
        assert_eq!(codec.encode_id(1).len(), OPAQUE_ID_LENGTH);
        assert_eq!(codec.encode_id(i64::MAX).len(), OPAQUE_ID_LENGTH);
    }

    #[test]
    fn test_alphabet_is_lowercase_hex() {
        let codec = codec();
        let encoded = codec.encode_id(123_456);
        assert!(
            encoded
                .bytes()
                .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
        );
    }

    #[test]
    fn test_sequential_ids_do_not_render_sequentially() {
        let codec = codec();
        let a = codec.encode_id(100);
        let b = codec.encode_id(101);
        assert_ne!(a, b);
        // Neighbouring keys should not share a long common prefix
        let common = a
            .bytes()
            .zip(b.bytes())
            .take_while(|(x, y)| x == y)
            .count();
        assert!(common < OPAQUE_ID_LENGTH / 2, "prefix of {common} shared");
    }

    #[test]
    fn test_distinct_secrets_produce_distinct_encodings() {
        let a = OpaqueIdCodec::new([1u8; 32]).encode_id(42);
        let b = OpaqueIdCodec::new([2u8; 32]).encode_id(42);
        assert_ne!(a, b);
    }

    #[test]
    fn test_decode_rejects_wrong_length() {
        let codec = codec();
        assert_eq!(codec.decode_id(""), Err(CodecError::InvalidLength(0)));
        assert_eq!(codec.decode_id("abc"), Err(CodecError::InvalidLength(3)));
        assert_eq!(
            codec.decode_id("0123456789abcdef0"),
            Err(CodecError::InvalidLength(17))
        );
    }

    #[test]
    fn test_decode_rejects_wrong_alphabet() {
        let codec = codec();
        assert_eq!(
            codec.decode_id("0123456789ABCDEF"),
            Err(CodecError::InvalidAlphabet)
        );
        assert_eq!(
            codec.decode_id("0123456789abcdeg"),
            Err(CodecError::InvalidAlphabet)
        );
    }

    #[test]
    fn test_forged_string_decodes_to_unverified_key() {
        // Well-formed but attacker-invented input decodes to *some* key;
        // only a repository lookup can reject it.
        let codec = codec();
        let decoded = codec.decode_id("00000000deadbeef");
        assert!(decoded.is_ok());
    }

    #[test]
    fn test_typed_wrappers() {
        let codec = codec();
        let id: AccountId = Id::from_raw(42);
        let encoded = codec.encode(id);
        let decoded: AccountId = codec.decode(&encoded).unwrap();
        assert_eq!(decoded, id);
    }
}
