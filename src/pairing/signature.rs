//! Pairing signature over the server challenge.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use hmac::{Hmac, Mac};
use sha1::Sha1;

type HmacSha1 = Hmac<Sha1>;

/// Shared secret baked into every official client. Authenticates "this is a
/// copy of the official app", not a per-user identity; treat it as a
/// protocol-compatibility token, not a trust boundary.
const SHARED_SECRET_B64: &str =
    "JCqdN5AcnAHgJYseUn7ER5k3qgtemfUvMRghQpTfTZq7Cvv8EPQPqfz6dDxPQPSu4gKFPWkJGw32zyASgJkHwCjU";

/// Sign a challenge message (server timestamp concatenated directly with the
/// PIN, no separator) with HMAC-SHA1 keyed by the decoded shared secret.
///
/// Pure function: same inputs always yield the same hex digest.
pub fn sign(message: &str) -> String {
    let key = BASE64
        .decode(SHARED_SECRET_B64)
        .expect("embedded secret is valid base64");
    let mut mac = HmacSha1::new_from_slice(&key).expect("HMAC key can be any length");
    mac.update(message.as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_known_answer() {
        // timestamp "123" ++ pin "1234"
        assert_eq!(
            sign("1231234"),
            "dcb7b68094cf291365cc8c5218601b244459b01b"
        );
    }

    #[test]
    fn test_sign_second_known_answer() {
        // timestamp "456" ++ pin "7890"
        assert_eq!(
            sign("4567890"),
            "c6039aaa82434d2d2039ea6072b37e0b8a339a89"
        );
    }

    #[test]
    fn test_sign_is_deterministic() {
        for _ in 0..10 {
            assert_eq!(sign("16912345670000"), sign("16912345670000"));
        }
    }

    #[test]
    fn test_sign_is_hex_sha1_sized() {
        let sig = sign("anything");
        assert_eq!(sig.len(), 40);
        assert!(sig.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn test_different_messages_differ() {
        assert_ne!(sign("1231234"), sign("1231235"));
    }
}
