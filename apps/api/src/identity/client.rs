//! Identity provider client (Identity Toolkit REST API).
//!
//! Phone sign-in is two steps: `request_code` sends an SMS and returns an
//! opaque session, `confirm_code` exchanges session + code for an id token.
//! Every authenticated request is resolved with `lookup`.

use std::time::Duration;

use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::errors::AppError;
use crate::identity::Identity;

const IDENTITY_API_BASE: &str = "https://identitytoolkit.googleapis.com/v1";

#[derive(Debug, Error)]
pub enum IdentityError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The provider refused the request; carries its error code, e.g. `INVALID_CODE`.
    #[error("identity provider rejected the request: {0}")]
    Rejected(String),

    #[error("identity provider returned no account")]
    NoAccount,
}

impl From<IdentityError> for AppError {
    fn from(err: IdentityError) -> Self {
        match &err {
            IdentityError::Rejected(code) => {
                // Codes may carry a suffix: "TOO_MANY_ATTEMPTS_TRY_LATER : ..."
                let code = code.split_whitespace().next().unwrap_or_default();
                match code {
                    "INVALID_CODE" | "SESSION_EXPIRED" | "INVALID_PASSWORD" | "EMAIL_NOT_FOUND"
                    | "INVALID_LOGIN_CREDENTIALS" | "INVALID_ID_TOKEN" | "TOKEN_EXPIRED"
                    | "USER_NOT_FOUND" | "USER_DISABLED" => AppError::Unauthorized,
                    "INVALID_PHONE_NUMBER" | "MISSING_PHONE_NUMBER" | "INVALID_EMAIL"
                    | "MISSING_PASSWORD" | "MISSING_CODE" | "INVALID_SESSION_INFO"
                    | "CAPTCHA_CHECK_FAILED" | "MISSING_RECAPTCHA_TOKEN" => {
                        AppError::Validation(code.to_string())
                    }
                    _ => AppError::ExternalService(err.to_string()),
                }
            }
            IdentityError::NoAccount => AppError::Unauthorized,
            IdentityError::Http(_) => AppError::ExternalService(err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ProviderError {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeRequest<'a> {
    phone_number: &'a str,
    recaptcha_token: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SendVerificationCodeResponse {
    session_info: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithPhoneRequest<'a> {
    session_info: &'a str,
    code: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SignInWithPasswordRequest<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SignInResponse {
    id_token: String,
    refresh_token: String,
    expires_in: String,
    local_id: String,
    phone_number: Option<String>,
    email: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct LookupRequest<'a> {
    id_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct LookupResponse {
    #[serde(default)]
    users: Vec<ProviderAccount>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ProviderAccount {
    local_id: String,
    phone_number: Option<String>,
    email: Option<String>,
}

/// Tokens handed back to the client after a successful sign-in.
#[derive(Debug, Clone, Serialize)]
pub struct SignedIn {
    pub identity: Identity,
    pub id_token: String,
    pub refresh_token: String,
    /// Token lifetime in seconds, as reported by the provider.
    pub expires_in: String,
}

impl From<SignInResponse> for SignedIn {
    fn from(r: SignInResponse) -> Self {
        Self {
            identity: Identity {
                uid: r.local_id,
                phone: r.phone_number,
                email: r.email,
            },
            id_token: r.id_token,
            refresh_token: r.refresh_token,
            expires_in: r.expires_in,
        }
    }
}

#[derive(Clone)]
pub struct IdentityClient {
    client: Client,
    api_key: String,
}

impl IdentityClient {
    pub fn new(api_key: String) -> Result<Self, IdentityError> {
        Ok(Self {
            client: Client::builder().timeout(Duration::from_secs(15)).build()?,
            api_key,
        })
    }

    /// Sends a one-time code to `phone` (E.164). Returns the session to confirm.
    pub async fn request_code(
        &self,
        phone: &str,
        recaptcha_token: &str,
    ) -> Result<String, IdentityError> {
        let response: SendVerificationCodeResponse = self
            .post(
                "accounts:sendVerificationCode",
                &SendVerificationCodeRequest {
                    phone_number: phone,
                    recaptcha_token,
                },
            )
            .await?;
        Ok(response.session_info)
    }

    pub async fn confirm_code(
        &self,
        session_info: &str,
        code: &str,
    ) -> Result<SignedIn, IdentityError> {
        let response: SignInResponse = self
            .post(
                "accounts:signInWithPhoneNumber",
                &SignInWithPhoneRequest { session_info, code },
            )
            .await?;
        Ok(response.into())
    }

    pub async fn sign_in_with_password(
        &self,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, IdentityError> {
        let response: SignInResponse = self
            .post(
                "accounts:signInWithPassword",
                &SignInWithPasswordRequest {
                    email,
                    password,
                    return_secure_token: true,
                },
            )
            .await?;
        Ok(response.into())
    }

    /// Resolves an id token to the identity it was issued for.
    pub async fn lookup(&self, id_token: &str) -> Result<Identity, IdentityError> {
        let response: LookupResponse = self
            .post("accounts:lookup", &LookupRequest { id_token })
            .await?;
        let account = response
            .users
            .into_iter()
            .next()
            .ok_or(IdentityError::NoAccount)?;
        Ok(Identity {
            uid: account.local_id,
            phone: account.phone_number,
            email: account.email,
        })
    }

    async fn post<B: Serialize, T: DeserializeOwned>(
        &self,
        method: &str,
        body: &B,
    ) -> Result<T, IdentityError> {
        let response = self
            .client
            .post(format!("{IDENTITY_API_BASE}/{method}"))
            .query(&[("key", self.api_key.as_str())])
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let code = serde_json::from_str::<ProviderError>(&body)
                .map(|e| e.error.message)
                .unwrap_or_else(|_| format!("HTTP {status}"));
            warn!("Identity provider {method} returned {status}: {code}");
            return Err(IdentityError::Rejected(code));
        }

        Ok(response.json().await?)
    }
}
