//! Segment webhook signature verification.
//!
//! Segment signs the raw request body with HMAC using the shared secret and
//! sends the lowercase hex digest in the `x-signature` header.
//! Reference: https://segment.com/docs/connections/destinations/catalog/webhooks/#authentication
//!
//! The upstream signer uses HMAC-SHA1. SHA-256 is available for deployments
//! whose signer has been switched over; the two are not interchangeable.

use std::fmt;
use std::str::FromStr;

use hmac::{Hmac, Mac};
use sha1::Sha1;
use sha2::Sha256;

type HmacSha1 = Hmac<Sha1>;
type HmacSha256 = Hmac<Sha256>;

/// Hash primitive used for the body MAC.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SignatureAlgorithm {
    /// HMAC-SHA1, what Segment sends
    #[default]
    Sha1,
    /// HMAC-SHA256
    Sha256,
}

impl FromStr for SignatureAlgorithm {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "sha1" => Ok(SignatureAlgorithm::Sha1),
            "sha256" => Ok(SignatureAlgorithm::Sha256),
            other => Err(format!("unsupported signature algorithm '{}'", other)),
        }
    }
}

impl fmt::Display for SignatureAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SignatureAlgorithm::Sha1 => write!(f, "sha1"),
            SignatureAlgorithm::Sha256 => write!(f, "sha256"),
        }
    }
}

/// Verify a Segment webhook signature.
///
/// # Arguments
///
/// * `algorithm` - Hash primitive the signer uses
/// * `secret` - Shared secret configured on both sides
/// * `body` - The exact request body bytes, as received
/// * `signature_hex` - The `x-signature` header value
///
/// # Returns
///
/// `true` if the signature matches. Anything other than lowercase hex, a
/// wrong length or a mismatch returns `false`. The digest comparison is
/// constant-time. No side effects; callers decide what to log.
pub fn verify_signature(
    algorithm: SignatureAlgorithm,
    secret: &[u8],
    body: &[u8],
    signature_hex: &str,
) -> bool {
    // Segment sends lowercase hex only; uppercase would give every a-f digit a twin.
    if !signature_hex
        .bytes()
        .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
    {
        return false;
    }

    let signature = match hex::decode(signature_hex) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    // `verify_slice` compares in constant time and rejects length mismatches.
    match algorithm {
        SignatureAlgorithm::Sha1 => HmacSha1::new_from_slice(secret)
            .map(|mut mac| {
                mac.update(body);
                mac.verify_slice(&signature).is_ok()
            })
            .unwrap_or(false),
        SignatureAlgorithm::Sha256 => HmacSha256::new_from_slice(secret)
            .map(|mut mac| {
                mac.update(body);
                mac.verify_slice(&signature).is_ok()
            })
            .unwrap_or(false),
    }
}

/// Compute the lowercase hex signature for `body`, as the signer would.
#[cfg(test)]
pub(crate) fn sign(algorithm: SignatureAlgorithm, secret: &[u8], body: &[u8]) -> String {
    match algorithm {
        SignatureAlgorithm::Sha1 => {
            let mut mac = HmacSha1::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
        SignatureAlgorithm::Sha256 => {
            let mut mac = HmacSha256::new_from_slice(secret).expect("HMAC accepts any key length");
            mac.update(body);
            hex::encode(mac.finalize().into_bytes())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &[u8] = b"test-shared-secret";
    const BODY: &[u8] = br#"{"type":"track","event":"Viewed Dashboard"}"#;

    #[test]
    fn test_verify_signature_valid() {
        for algorithm in [SignatureAlgorithm::Sha1, SignatureAlgorithm::Sha256] {
            let signature = sign(algorithm, SECRET, BODY);
            assert!(verify_signature(algorithm, SECRET, BODY, &signature));
        }
    }

    #[test]
    fn test_verify_signature_known_vector() {
        // RFC 2202 test case 2.
        assert!(verify_signature(
            SignatureAlgorithm::Sha1,
            b"Jefe",
            b"what do ya want for nothing?",
            "effcdf6ae5eb2fa2d27416d5f184df9c259a7c79"
        ));
    }

    #[test]
    fn test_verify_signature_rejects_uppercase_hex() {
        let signature = sign(SignatureAlgorithm::Sha1, SECRET, BODY).to_uppercase();
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_hex_string_bit_flip() {
        for algorithm in [SignatureAlgorithm::Sha1, SignatureAlgorithm::Sha256] {
            let signature = sign(algorithm, SECRET, BODY);

            for i in 0..signature.len() {
                for bit in 0..8 {
                    let mut tampered = signature.clone().into_bytes();
                    tampered[i] ^= 1 << bit;
                    // Flips that leave ASCII cannot arrive as a header string.
                    let Ok(tampered) = String::from_utf8(tampered) else {
                        continue;
                    };
                    assert!(
                        !verify_signature(algorithm, SECRET, BODY, &tampered),
                        "flip of bit {bit} at {i} accepted"
                    );
                }
            }
        }
    }

    #[test]
    fn test_verify_signature_wrong_secret() {
        let signature = sign(SignatureAlgorithm::Sha1, b"other-secret", BODY);
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_algorithm_mismatch() {
        let signature = sign(SignatureAlgorithm::Sha256, SECRET, BODY);
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, &signature));
    }

    #[test]
    fn test_verify_signature_body_bit_flip() {
        let signature = sign(SignatureAlgorithm::Sha1, SECRET, BODY);

        for i in 0..BODY.len() {
            for bit in 0..8 {
                let mut tampered = BODY.to_vec();
                tampered[i] ^= 1 << bit;
                assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, &tampered, &signature));
            }
        }
    }

    #[test]
    fn test_verify_signature_signature_bit_flip() {
        let signature = sign(SignatureAlgorithm::Sha1, SECRET, BODY);
        let bytes = hex::decode(&signature).unwrap();

        for i in 0..bytes.len() {
            for bit in 0..8 {
                let mut tampered = bytes.clone();
                tampered[i] ^= 1 << bit;
                assert!(!verify_signature(
                    SignatureAlgorithm::Sha1,
                    SECRET,
                    BODY,
                    &hex::encode(tampered)
                ));
            }
        }
    }

    #[test]
    fn test_verify_signature_malformed_hex() {
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, "INVALIDSIGNATURE"));
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, "abc"));
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, ""));
    }

    #[test]
    fn test_verify_signature_truncated() {
        let signature = sign(SignatureAlgorithm::Sha1, SECRET, BODY);
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, &signature[..38]));

        let extended = format!("{}00", signature);
        assert!(!verify_signature(SignatureAlgorithm::Sha1, SECRET, BODY, &extended));
    }

    #[test]
    fn test_signature_algorithm_from_str() {
        assert_eq!("sha1".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha1));
        assert_eq!(" SHA256 ".parse::<SignatureAlgorithm>(), Ok(SignatureAlgorithm::Sha256));
        assert!("md5".parse::<SignatureAlgorithm>().is_err());
    }
}
