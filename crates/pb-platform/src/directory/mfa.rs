//! TOTP secret generation
//!
//! Secrets are 160 random bits encoded as RFC 4648 base32 without padding,
//! the form authenticator apps accept in `otpauth://` URIs.

use data_encoding::BASE32_NOPAD;

/// Secret length in bytes (160 bits, the RFC 4226 recommendation)
pub const TOTP_SECRET_BYTES: usize = 20;

/// Generate a new base32 TOTP secret
pub fn generate_totp_secret() -> String {
    let bytes: [u8; TOTP_SECRET_BYTES] = rand::random();
    BASE32_NOPAD.encode(&bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_secret_shape() {
        let secret = generate_totp_secret();
        assert_eq!(secret.len(), 32);
        assert!(secret
            .chars()
            .all(|c| c.is_ascii_uppercase() || ('2'..='7').contains(&c)));
        assert_eq!(BASE32_NOPAD.decode(secret.as_bytes()).unwrap().len(), TOTP_SECRET_BYTES);
    }

    #[test]
    fn test_generated_secrets_differ() {
        assert_ne!(generate_totp_secret(), generate_totp_secret());
    }
}
