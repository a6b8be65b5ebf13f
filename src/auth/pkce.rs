use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use sha2::{Digest, Sha256};

const VERIFIER_LEN: usize = 64;
const ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789";

pub struct PkceChallenge {
    pub code_verifier: String,
    pub code_challenge: String,
}

/// Generate a fresh PKCE pair: a 64-character alphanumeric verifier and its
/// S256 challenge.
pub fn generate_pkce() -> PkceChallenge {
    let mut buf = [0u8; VERIFIER_LEN];
    rand::Rng::fill_bytes(&mut rand::rng(), &mut buf);
    let code_verifier: String = buf
        .iter()
        .map(|b| ALPHABET[*b as usize % ALPHABET.len()] as char)
        .collect();

    PkceChallenge {
        code_challenge: challenge_for(&code_verifier),
        code_verifier,
    }
}

/// URL-safe, padding-stripped base64 of the SHA-256 of the verifier.
pub fn challenge_for(verifier: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hasher.finalize())
}
