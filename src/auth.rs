use axum_extra::{
    headers::{authorization::Credentials, Authorization},
    typed_header::TypedHeaderRejection,
    TypedHeader,
};
use jsonwebtoken::{Algorithm, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::{
    db::{self, UserId},
    error::{AppError, AppResult},
};

/// Claims carried by tokens issued by the auth service.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub exp: i64,
    pub user_id: UserId,
}

pub type AuthHeader = Result<TypedHeader<Authorization<JWTToken>>, TypedHeaderRejection>;

#[derive(Debug)]
pub struct JWTToken(pub String);

impl Credentials for JWTToken {
    const SCHEME: &'static str = "Token";

    fn decode(value: &axum::http::HeaderValue) -> Option<Self> {
        let mut it = value.to_str().ok()?.split_whitespace();
        let scheme = it.next()?;
        let token = it.next()?;

        if !scheme.eq_ignore_ascii_case(Self::SCHEME) || it.next().is_some() {
            None?
        }

        Some(Self(token.to_string()))
    }

    fn encode(&self) -> axum::http::HeaderValue {
        unreachable!()
    }
}

/// Verification half of the token pair. Issuing tokens is the auth service's job.
#[derive(Clone)]
pub struct JwtKeys {
    decoding_key: DecodingKey,
    validation: Validation,
}

impl JwtKeys {
    pub fn new(decoding_key: DecodingKey, algorithm: Algorithm) -> Self {
        Self {
            decoding_key,
            validation: Validation::new(algorithm),
        }
    }

    pub fn from_config(key: &str, algorithm: Algorithm) -> AppResult<Self> {
        let decoding_key = match algorithm {
            Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => {
                DecodingKey::from_secret(key.as_bytes())
            }
            Algorithm::ES256 | Algorithm::ES384 => DecodingKey::from_ec_pem(key.as_bytes())?,
            Algorithm::EdDSA => DecodingKey::from_ed_pem(key.as_bytes())?,
            _ => DecodingKey::from_rsa_pem(key.as_bytes())?,
        };
        Ok(Self::new(decoding_key, algorithm))
    }

    pub fn verify_token(&self, token: &str) -> AppResult<UserId> {
        let claims =
            jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &self.validation)?.claims;
        Ok(claims.user_id)
    }
}

/// Caller for routes that need a logged-in user. The token must name an existing user.
pub async fn require_user(header: AuthHeader, keys: &JwtKeys, pool: &PgPool) -> AppResult<UserId> {
    let Some(user_id) = optional_user(header, keys)? else {
        return Err(AppError::Unauthorized);
    };

    if !db::user_exists(pool, user_id).await? {
        tracing::debug!(user_id, "token for unknown user");
        return Err(AppError::Unauthorized);
    }

    Ok(user_id)
}

/// Caller for routes that also serve anonymous users. Only an absent header is anonymous.
pub fn optional_user(header: AuthHeader, keys: &JwtKeys) -> AppResult<Option<UserId>> {
    match header {
        Ok(TypedHeader(Authorization(token))) => keys.verify_token(&token.0).map(Some),
        Err(rejection) if rejection.is_missing() => Ok(None),
        Err(rejection) => {
            tracing::debug!("bad authorization header: {rejection}");
            Err(AppError::Unauthorized)
        }
    }
}
