use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Claims {
    pub sub: i64,
    pub exp: i64,
}

pub struct JwtManager {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    ttl_secs: i64,
}

impl JwtManager {
    pub fn new(secret_key: &str, ttl_secs: i64) -> JwtManager {
        JwtManager {
            encoding_key: EncodingKey::from_secret(secret_key.as_ref()),
            decoding_key: DecodingKey::from_secret(secret_key.as_ref()),
            ttl_secs,
        }
    }

    pub fn gen_user_token(&self, user_id: i64) -> anyhow::Result<String> {
        self.gen_token(&Claims {
            sub: user_id,
            exp: chrono::Utc::now().timestamp() + self.ttl_secs,
        })
    }

    pub fn gen_token(&self, claims: &Claims) -> anyhow::Result<String> {
        let token = jsonwebtoken::encode(
            &Header::new(jsonwebtoken::Algorithm::HS256),
            claims,
            &self.encoding_key,
        )?;
        Ok(token)
    }

    pub fn decode(&self, token: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
        let validation = Validation::new(jsonwebtoken::Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding_key, &validation).map(|t| t.claims)
    }
}
