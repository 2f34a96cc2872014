// Hashing utilities

use sha2::{Digest, Sha256};

/// Single SHA256 hash
pub fn sha256(data: &[u8]) -> [u8; 32] {
    let hash = Sha256::digest(data);
    let mut result = [0u8; 32];
    result.copy_from_slice(&hash);
    result
}

/// Last 20 bytes of SHA256(data) - used for address generation
pub fn hash160(data: &[u8]) -> [u8; 20] {
    let hash = sha256(data);
    let mut result = [0u8; 20];
    result.copy_from_slice(&hash[12..]);
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_known_value() {
        assert_eq!(
            hex::encode(sha256(b"")),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_hash160_is_sha256_suffix() {
        let data = b"test data";
        let hash = hash160(data);
        assert_eq!(hash.len(), 20);
        assert_eq!(&sha256(data)[12..], &hash[..]);
    }
}
