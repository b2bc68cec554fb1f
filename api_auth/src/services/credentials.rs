use argon2::{
    Argon2,
    password_hash::{PasswordHasher, SaltString, rand_core::OsRng},
};
use common::error::{AppError, Res};

/// Hashes a raw password with Argon2 on the blocking pool.
pub async fn hash_password(password: String) -> Res<String> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))
    })
    .await
    .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

#[cfg(test)]
mod tests {
    use argon2::{PasswordHash, PasswordVerifier};

    use super::*;

    #[tokio::test]
    async fn produces_a_verifiable_salted_hash() {
        let first = hash_password("demo123".to_string()).await.unwrap();
        let second = hash_password("demo123".to_string()).await.unwrap();
        assert_ne!(first, second);

        let parsed = PasswordHash::new(&first).unwrap();
        assert!(Argon2::default().verify_password(b"demo123", &parsed).is_ok());
        assert!(Argon2::default().verify_password(b"wrong", &parsed).is_err());
    }
}
