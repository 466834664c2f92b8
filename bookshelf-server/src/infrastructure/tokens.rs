//! Opaque API token keys: 20 random bytes rendered as 40 lowercase hex chars.

use std::fmt::Write;

use argon2::password_hash::rand_core::{OsRng, RngCore};

pub(crate) const KEY_BYTES: usize = 20;
pub(crate) const KEY_LEN: usize = KEY_BYTES * 2;

pub(crate) fn generate_key() -> String {
    let mut bytes = [0u8; KEY_BYTES];
    OsRng.fill_bytes(&mut bytes);

    bytes.iter().fold(String::with_capacity(KEY_LEN), |mut key, byte| {
        let _ = write!(key, "{byte:02x}");
        key
    })
}

/// Cheap shape check before a store lookup.
pub(crate) fn is_well_formed(key: &str) -> bool {
    key.len() == KEY_LEN
        && key
            .bytes()
            .all(|b| b.is_ascii_digit() || (b'a'..=b'f').contains(&b))
}

#[cfg(test)]
mod tests {
    use super::{KEY_LEN, generate_key, is_well_formed};

    #[test]
    fn generated_keys_are_well_formed_and_distinct() {
        let first = generate_key();
        let second = generate_key();

        assert_eq!(first.len(), KEY_LEN);
        assert!(is_well_formed(&first));
        assert!(is_well_formed(&second));
        assert_ne!(first, second);
    }

    #[test]
    fn malformed_keys_are_rejected() {
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("abc"));
        assert!(!is_well_formed(&"G".repeat(KEY_LEN)));
        assert!(!is_well_formed(&"A".repeat(KEY_LEN)));
        assert!(is_well_formed(&"0a".repeat(KEY_LEN / 2)));
    }
}
