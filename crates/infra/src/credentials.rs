//! Credential generation
//!
//! User ids are 16-digit numeric strings whose first digit is never zero;
//! auth tokens are canonical v4 GUIDs. Both are generated once at first use,
//! persisted through the configuration store, and regenerable on demand.

use beacon_domain::constants::USER_ID_LENGTH;
use beacon_domain::Credentials;
use rand::Rng;
use uuid::Uuid;

/// Generate a fresh numeric user id.
pub fn generate_user_id() -> String {
    let mut rng = rand::thread_rng();
    let mut id = String::with_capacity(USER_ID_LENGTH);
    id.push(char::from(b'0' + rng.gen_range(1..=9)));
    for _ in 1..USER_ID_LENGTH {
        id.push(char::from(b'0' + rng.gen_range(0..=9)));
    }
    id
}

/// Generate a fresh auth token in canonical GUID form.
pub fn generate_auth_token() -> String {
    Uuid::new_v4().to_string()
}

/// Generate a full set of fresh credentials.
pub fn generate_credentials() -> Credentials {
    Credentials { user_id: generate_user_id(), auth_token: generate_auth_token() }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_ids_are_sixteen_nonzero_leading_digits() {
        for _ in 0..1000 {
            let id = generate_user_id();
            assert_eq!(id.len(), 16);
            assert!(id.chars().all(|c| c.is_ascii_digit()));
            assert_ne!(id.as_bytes()[0], b'0');
        }
    }

    #[test]
    fn auth_tokens_are_v4_guids() {
        for _ in 0..100 {
            let token = generate_auth_token();
            let bytes = token.as_bytes();
            assert_eq!(token.len(), 36);
            for (i, b) in bytes.iter().enumerate() {
                match i {
                    8 | 13 | 18 | 23 => assert_eq!(*b, b'-', "hyphen at {i} in {token}"),
                    _ => assert!(b.is_ascii_hexdigit(), "hex digit at {i} in {token}"),
                }
            }
            // Version nibble is literally 4; variant nibble is 8, 9, a, or b
            assert_eq!(bytes[14], b'4', "version nibble in {token}");
            assert!(matches!(bytes[19], b'8' | b'9' | b'a' | b'b'), "variant nibble in {token}");
        }
    }

    #[test]
    fn generated_credentials_differ() {
        let a = generate_credentials();
        let b = generate_credentials();
        assert_ne!(a, b);
    }
}
