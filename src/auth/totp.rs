//! Time-based one-time passwords for the optional second login factor.
//!
//! HMAC-SHA256 truncated to 6 digits over a 30-second period, with a ±1
//! period verification window for clock drift. Secrets are stored hex-encoded
//! on the user row; a NULL secret means 2FA is disabled for that account.

use hmac::{Hmac, Mac};
use rand::Rng;
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const TOTP_DIGITS: u32 = 6;
const TOTP_PERIOD: u64 = 30;
const TOTP_SECRET_LENGTH: usize = 20;

/// Generate a fresh hex-encoded shared secret for enrollment.
pub fn generate_secret() -> String {
    let mut rng = rand::rng();
    let secret: Vec<u8> = (0..TOTP_SECRET_LENGTH).map(|_| rng.random()).collect();
    hex::encode(secret)
}

/// Compute the code for one counter value.
pub fn generate_code(secret: &str, counter: u64) -> Result<String, String> {
    let secret_bytes = hex::decode(secret).map_err(|e| format!("Invalid secret: {e}"))?;

    let mut mac =
        HmacSha256::new_from_slice(&secret_bytes).map_err(|e| format!("HMAC error: {e}"))?;
    mac.update(&counter.to_be_bytes());
    let result = mac.finalize().into_bytes();

    let offset = (result[result.len() - 1] & 0x0F) as usize;
    if offset + 4 > result.len() {
        return Err("Invalid HMAC result length".to_string());
    }
    let code = u32::from_be_bytes([
        result[offset] & 0x7F,
        result[offset + 1],
        result[offset + 2],
        result[offset + 3],
    ]);

    let otp = code % 10u32.pow(TOTP_DIGITS);
    Ok(format!("{:0width$}", otp, width = TOTP_DIGITS as usize))
}

/// Verify a submitted code against the current time, allowing one period of
/// drift in either direction.
pub fn verify(secret: &str, code: &str) -> bool {
    let now = std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs();
    verify_at(secret, code, now)
}

/// Verification against an explicit timestamp (testable without a clock).
pub fn verify_at(secret: &str, code: &str, unix_secs: u64) -> bool {
    let counter = unix_secs / TOTP_PERIOD;

    for offset in [-1i64, 0, 1] {
        let check_counter = (counter as i64 + offset) as u64;
        if let Ok(expected) = generate_code(secret, check_counter) {
            if constant_time_compare(&expected, code) {
                return true;
            }
        }
    }

    false
}

fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.bytes()
        .zip(b.bytes())
        .fold(0u8, |acc, (x, y)| acc | (x ^ y))
        == 0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_code_verifies_within_window() {
        let secret = generate_secret();
        let now = 1_756_000_000u64;
        let code = generate_code(&secret, now / TOTP_PERIOD).unwrap();
        assert!(verify_at(&secret, &code, now));
        // one period earlier or later still accepted
        assert!(verify_at(&secret, &code, now + TOTP_PERIOD));
        assert!(verify_at(&secret, &code, now - TOTP_PERIOD));
    }

    #[test]
    fn stale_code_rejected() {
        let secret = generate_secret();
        let now = 1_756_000_000u64;
        let code = generate_code(&secret, now / TOTP_PERIOD).unwrap();
        assert!(!verify_at(&secret, &code, now + 10 * TOTP_PERIOD));
    }

    #[test]
    fn wrong_code_rejected() {
        let secret = generate_secret();
        assert!(!verify_at(&secret, "000000", 1_756_000_000));
    }

    #[test]
    fn code_is_six_digits() {
        let secret = generate_secret();
        let code = generate_code(&secret, 12345).unwrap();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}
