use actix_web::{HttpMessage, HttpResponse, dev::ServiceRequest};
use jsonwebtoken::{DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{AppError, Res};

/// Identity carried by bearer tokens from the auth provider.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct JwtClaims {
    pub user_id: Uuid,
    pub email: String,
    pub exp: usize,
}

/// Extracts claims object from JWT token.
/// Requires JWT secret.
pub fn validate_jwt(token: &str, secret: &str) -> Res<JwtClaims> {
    let token_data = jsonwebtoken::decode::<JwtClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map_err(|e| AppError::Unauthorized(format!("Invalid token: {}", e)))?;
    Ok(token_data.claims)
}

pub fn get_jwt_claims_or_error(req: &ServiceRequest) -> Result<JwtClaims, HttpResponse> {
    if let Some(jwt_claims_res) = req.extensions().get::<Res<JwtClaims>>() {
        match jwt_claims_res {
            Ok(claims) => Ok(claims.clone()),
            Err(app_error) => Err(app_error.to_http_response()),
        }
    } else {
        Err(
            AppError::Unauthorized("No authorization token provided".to_string())
                .to_http_response(),
        )
    }
}

/// Signs claims the way the auth provider does. Only fixtures mint tokens.
#[cfg(any(test, feature = "test-support"))]
pub fn encode_claims(claims: &JwtClaims, secret: &str) -> Res<String> {
    jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        claims,
        &jsonwebtoken::EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(AppError::from)
}
