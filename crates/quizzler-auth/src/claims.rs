use serde::{Deserialize, Serialize};

/// JWT claims for identity tokens.
///
/// `user_id` is the subject and the only required claim. `exp` is only present
/// when the issuing [`TokenService`](crate::TokenService) was configured with an
/// expiry. Tokens minted without `iat` still verify.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User ID (subject)
    pub user_id: i64,
    /// Token issued-at timestamp (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub iat: Option<usize>,
    /// Token expiration timestamp (Unix timestamp)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exp: Option<usize>,
}
