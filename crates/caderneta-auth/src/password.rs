use pbkdf2::pbkdf2_hmac;
use sha2::Sha256;

const ROUNDS: u32 = 10_000;
const KEY_LENGTH: usize = 32;

/// Hash a password with a fresh random salt. The stored form is
/// `hex(salt)$hex(key)`.
pub fn hash_password(password: &str) -> String {
    let salt = rand::random::<[u8; 16]>();
    let key = derive_key(password, &salt);
    format!("{}${}", hex::encode(salt), hex::encode(key))
}

/// Verify a password against a stored `salt$key` value. Malformed
/// stored values never verify.
pub fn verify_password(password: &str, stored: &str) -> bool {
    let Some((salt_hex, key_hex)) = stored.split_once('$') else {
        return false;
    };
    let Ok(salt) = hex::decode(salt_hex) else {
        return false;
    };
    let Ok(key) = hex::decode(key_hex) else {
        return false;
    };
    derive_key(password, &salt) == key
}

fn derive_key(password: &str, salt: &[u8]) -> Vec<u8> {
    let mut key = [0u8; KEY_LENGTH];
    pbkdf2_hmac::<Sha256>(password.as_bytes(), salt, ROUNDS, &mut key);
    key.to_vec()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("senha123");
        assert!(verify_password("senha123", &hash));
        assert!(!verify_password("senha321", &hash));
    }

    #[test]
    fn test_same_password_different_salts() {
        let h1 = hash_password("senha");
        let h2 = hash_password("senha");
        assert_ne!(h1, h2);
        assert!(verify_password("senha", &h1));
        assert!(verify_password("senha", &h2));
    }

    #[test]
    fn test_malformed_stored_hash() {
        assert!(!verify_password("senha", ""));
        assert!(!verify_password("senha", "no-separator"));
        assert!(!verify_password("senha", "zz$zz"));
    }
}
