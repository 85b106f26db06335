use serde::{Deserialize, Serialize};

/// Response of `GET /nonce/{address}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NonceResponse {
    pub nonce: String,
}

/// Body of `POST /auth`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthRequest {
    pub address: String,
    pub signature: String,
    pub message: String,
}

/// Response of `POST /auth`; the token is absent when authentication was refused.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AuthResponse {
    #[serde(default)]
    pub access_token: Option<String>,
}

/// Response of `GET /version`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct VersionInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub build_timestamp: Option<String>,
}

/// Message the wallet signs to prove ownership of `address` for `nonce`.
pub fn login_message(nonce: &str) -> String {
    format!("Login nonce: {}", nonce)
}
