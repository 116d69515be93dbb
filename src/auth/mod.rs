use std::env;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};

use crate::user;
use crate::user::model::User as UserModel;

pub mod middleware;

type Result<T> = std::result::Result<T, Error>;

#[derive(Clone)]
pub struct Config {
    secret: String,
}

impl Config {
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    pub fn env() -> Option<Self> {
        env::var("JWT_SECRET").ok().map(Self::new)
    }
}

#[derive(Serialize, Deserialize, Clone)]
pub(crate) struct TokenClaims {
    pub sub: String,
    pub exp: usize,
}

/// Checks bearer tokens issued for callers of the API.
#[derive(Clone)]
pub struct Verifier {
    decoding_key: Arc<DecodingKey>,
    jwt_validator: Arc<Validation>,
}

impl Verifier {
    pub fn new(config: &Config) -> Self {
        Self {
            decoding_key: Arc::new(DecodingKey::from_secret(config.secret.as_bytes())),
            jwt_validator: Arc::new(Validation::new(Algorithm::HS256)),
        }
    }

    pub fn verify(&self, token: &str) -> Result<user::Id> {
        let claims = decode::<TokenClaims>(token, &self.decoding_key, &self.jwt_validator)?.claims;

        user::Id::parse_str(&claims.sub).map_err(|_| Error::TokenMalformed)
    }
}

/// Identity of the caller, attached to each authorized request.
#[derive(Clone, Debug)]
pub struct User {
    id: user::Id,
    nickname: String,
}

impl User {
    pub fn id(&self) -> &user::Id {
        &self.id
    }

    pub fn nickname(&self) -> &str {
        &self.nickname
    }
}

impl From<UserModel> for User {
    fn from(user: UserModel) -> Self {
        Self {
            id: user.id,
            nickname: user.nickname,
        }
    }
}

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("unauthorized to access the resource")]
    Unauthorized,
    #[error("token is malformed")]
    TokenMalformed,

    #[error(transparent)]
    _JsonWebtoken(#[from] jsonwebtoken::errors::Error),

    #[error(transparent)]
    _User(#[from] user::Error),
}
