use crate::error::{AppError, AppResult};
use crate::models::Owner;
use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // developer email
    #[serde(default)]
    pub teams: Vec<String>,
    #[serde(default)]
    pub admin: bool,
    pub exp: i64,
    pub iat: i64,
    pub token_type: String, // "access"
}

/// The authenticated caller, stored in request extensions by the auth middleware.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthContext {
    pub developer: String,
    pub teams: Vec<String>,
    pub admin: bool,
}

impl AuthContext {
    pub fn can_access(&self, owner: &Owner) -> bool {
        if self.admin {
            return true;
        }
        match owner {
            Owner::Developer(email) => email.eq_ignore_ascii_case(&self.developer),
            Owner::Team(team) => self.teams.iter().any(|t| t == team),
        }
    }
}

impl From<Claims> for AuthContext {
    fn from(claims: Claims) -> Self {
        Self {
            developer: claims.sub,
            teams: claims.teams,
            admin: claims.admin,
        }
    }
}

#[derive(Clone)]
pub struct JwtService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    access_token_expires_in: i64,
}

impl JwtService {
    pub fn new(secret: &str, access_expires_in: i64) -> Self {
        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            access_token_expires_in: access_expires_in,
        }
    }

    pub fn generate_access_token(
        &self,
        developer: &str,
        teams: &[String],
        admin: bool,
    ) -> AppResult<String> {
        let now = Utc::now();
        let exp = now + Duration::seconds(self.access_token_expires_in);

        let claims = Claims {
            sub: developer.to_string(),
            teams: teams.to_vec(),
            admin,
            exp: exp.timestamp(),
            iat: now.timestamp(),
            token_type: "access".to_string(),
        };

        encode(&Header::default(), &claims, &self.encoding_key).map_err(AppError::JwtError)
    }

    pub fn verify_token(&self, token: &str) -> AppResult<Claims> {
        let validation = Validation::new(Algorithm::HS256);
        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(AppError::JwtError)
    }

    pub fn verify_access_token(&self, token: &str) -> AppResult<Claims> {
        let claims = self.verify_token(token)?;

        if claims.token_type != "access" {
            return Err(AppError::AuthError("Invalid access token type".to_string()));
        }

        Ok(claims)
    }
}
