//! Referral codes and invite tokens.
use rand::{Rng, distributions::Alphanumeric, rngs::OsRng};

pub const REFERRAL_CODE_LEN: usize = 6;
pub const INVITE_TOKEN_LEN: usize = 32;

const REFERRAL_CODE_CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Short human-shareable code. Collisions are possible; callers retry on a
/// uniqueness violation at insert time.
pub fn new_referral_code() -> String {
    let mut rng = rand::thread_rng();
    (0..REFERRAL_CODE_LEN)
        .map(|_| REFERRAL_CODE_CHARSET[rng.gen_range(0..REFERRAL_CODE_CHARSET.len())] as char)
        .collect()
}

/// Bearer credential embedded in invite links, drawn from the OS CSPRNG.
pub fn new_invite_token() -> String {
    OsRng
        .sample_iter(&Alphanumeric)
        .take(INVITE_TOKEN_LEN)
        .map(char::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn referral_codes_are_six_uppercase_alphanumerics() {
        for _ in 0..50 {
            let code = new_referral_code();
            assert_eq!(code.len(), REFERRAL_CODE_LEN);
            assert!(
                code.chars()
                    .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
            );
        }
    }

    #[test]
    fn referral_codes_rarely_repeat() {
        let codes: HashSet<String> = (0..100).map(|_| new_referral_code()).collect();
        assert!(codes.len() > 95);
    }

    #[test]
    fn invite_tokens_are_32_alphanumerics() {
        let token = new_invite_token();
        assert_eq!(token.len(), INVITE_TOKEN_LEN);
        assert!(token.chars().all(|c| c.is_ascii_alphanumeric()));
    }

    #[test]
    fn invite_tokens_are_unique() {
        let tokens: HashSet<String> = (0..100).map(|_| new_invite_token()).collect();
        assert_eq!(tokens.len(), 100);
    }
}
