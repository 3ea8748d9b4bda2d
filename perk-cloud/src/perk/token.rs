//! Opaque token generation for redeem tokens and staff unlock tokens

use rand::Rng;
use rand::rngs::OsRng;

/// Crockford-style alphabet: no 0/O, 1/I, so a token read aloud or typed
/// from a screen survives. Also URL-safe as-is.
const ALPHABET: &[u8; 32] = b"23456789ABCDEFGHJKLMNPQRSTUVWXYZ";

/// 26 symbols x 5 bits = 130 bits of entropy
pub const TOKEN_LEN: usize = 26;

/// Generate a fresh token from the OS entropy source.
///
/// Panics if the OS RNG fails, which is unrecoverable.
pub fn generate_token() -> String {
    let mut rng = OsRng;
    (0..TOKEN_LEN)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn token_has_fixed_length_and_alphabet() {
        let token = generate_token();
        assert_eq!(token.len(), TOKEN_LEN);
        assert!(token.bytes().all(|b| ALPHABET.contains(&b)));
    }

    #[test]
    fn token_has_no_ambiguous_symbols() {
        for _ in 0..100 {
            let token = generate_token();
            assert!(!token.contains(['0', 'O', '1', 'I']));
        }
    }

    #[test]
    fn tokens_do_not_repeat() {
        let tokens: HashSet<String> = (0..1000).map(|_| generate_token()).collect();
        assert_eq!(tokens.len(), 1000);
    }
}
