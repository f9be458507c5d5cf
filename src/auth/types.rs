use serde::{Deserialize, Serialize};

/// JWT claims: the subject is the username
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TokenClaims {
    pub sub: String,
    pub exp: usize, // Expiration timestamp (standard JWT claim)
    pub iat: usize, // Issued at timestamp (standard JWT claim)
}

/// Response structure for the token endpoint
#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer".to_string(),
        }
    }
}

/// Form-encoded credentials accepted by `POST /auth/token`
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_claims_serialization() {
        let claims = TokenClaims {
            sub: "maria".to_string(),
            exp: 1234567890,
            iat: 1234567800,
        };

        let json = serde_json::to_string(&claims).unwrap();
        assert!(json.contains(r#""sub":"maria""#));

        let deserialized: TokenClaims = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, claims);
    }

    #[test]
    fn test_token_response_is_bearer() {
        let response = TokenResponse::bearer("jwt-token-here".to_string());
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["access_token"], "jwt-token-here");
        assert_eq!(json["token_type"], "bearer");
    }
}
