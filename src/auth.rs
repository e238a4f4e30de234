//! Authentication
//!
//! Registration, login against `POST /auth/login`, and storage of the
//! resulting bearer token.

use thiserror::Error;

use crate::api::{ApiError, HttpClient, LoginResponse, RegisterRequest, RegisterResponse};
use crate::validation::{
    ValidationError, validate_email, validate_login_password, validate_name,
    validate_registration_password, validate_username,
};

mod token_store;

pub use token_store::{
    FileTokenStore, MemoryTokenStore, StaticTokenStore, StoredToken, TokenStore,
    credentials_path,
};

/// Login and registration failures, with the message shown to the user as `Display`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(#[from] ValidationError),

    #[error("Invalid username or password. Please try again.")]
    InvalidCredentials,

    #[error("Invalid login data. Please check your inputs.")]
    InvalidLoginData,

    #[error("Unable to connect to server. Please check your connection.")]
    Unreachable,

    /// Any other rejection; carries the backend message when it sent one
    #[error("{0}")]
    Rejected(String),

    #[error("Failed to store credentials: {0}")]
    Storage(String),
}

/// Map a transport error from the login call into a user-facing error
pub fn classify_login_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Api { code: 401, .. } => AuthError::InvalidCredentials,
        ApiError::Api { code: 400, .. } => AuthError::InvalidLoginData,
        ApiError::Api { message, .. } if !message.trim().is_empty() => {
            AuthError::Rejected(message.clone())
        }
        ApiError::Api { .. } => AuthError::Rejected("Login failed. Please try again.".to_string()),
        ApiError::Network(_) => AuthError::Unreachable,
        ApiError::Parse(_) => {
            AuthError::Rejected("Login failed. Please try again later.".to_string())
        }
    }
}

/// Map a transport error from the registration call into a user-facing error
pub fn classify_register_error(err: &ApiError) -> AuthError {
    match err {
        ApiError::Api { message, .. } if !message.trim().is_empty() => {
            AuthError::Rejected(message.clone())
        }
        ApiError::Api { .. } => {
            AuthError::Rejected("Registration failed. Please try again.".to_string())
        }
        ApiError::Network(_) => AuthError::Unreachable,
        ApiError::Parse(_) => {
            AuthError::Rejected("Registration failed. Please try again later.".to_string())
        }
    }
}

/// Check every registration field, reporting the first failure
pub fn validate_registration(form: &RegisterRequest) -> Result<(), ValidationError> {
    validate_username(&form.username)?;
    validate_registration_password(&form.password)?;
    validate_email(&form.email)?;
    validate_name(&form.first_name, "First name")?;
    validate_name(&form.last_name, "Last name")
}

/// Validate the form and create the account
///
/// Does not log in; the caller follows up with [`login`].
pub async fn register(
    client: &HttpClient,
    form: &RegisterRequest,
) -> Result<RegisterResponse, AuthError> {
    validate_registration(form)?;

    let response = client.register(form).await.map_err(|e| {
        log::debug!("Registration failed: {}", e);
        classify_register_error(&e)
    })?;

    log::info!("Registered {} as user {}", form.username, response.user_id);
    Ok(response)
}

/// Validate the form, log in, and persist the returned token
pub async fn login(
    client: &HttpClient,
    store: &FileTokenStore,
    username: &str,
    password: &str,
) -> Result<LoginResponse, AuthError> {
    validate_username(username)?;
    validate_login_password(password)?;

    let response = client.login(username, password).await.map_err(|e| {
        log::debug!("Login failed: {}", e);
        classify_login_error(&e)
    })?;

    store
        .set_token(response.access_token.clone(), response.expires_in)
        .map_err(|e| AuthError::Storage(e.to_string()))?;

    log::info!("Logged in as {}", response.username);
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(code: u16, message: &str) -> ApiError {
        ApiError::Api {
            code,
            message: message.to_string(),
        }
    }

    #[test]
    fn test_login_error_classification() {
        assert_eq!(
            classify_login_error(&api(401, "Bad credentials")),
            AuthError::InvalidCredentials
        );
        assert_eq!(
            classify_login_error(&api(400, "")),
            AuthError::InvalidLoginData
        );
        assert_eq!(
            classify_login_error(&ApiError::Network("refused".to_string())),
            AuthError::Unreachable
        );
    }

    #[test]
    fn test_login_error_uses_backend_message() {
        assert_eq!(
            classify_login_error(&api(403, "Account locked")).to_string(),
            "Account locked"
        );
        assert_eq!(
            classify_login_error(&api(500, "  ")).to_string(),
            "Login failed. Please try again."
        );
    }

    fn unreachable_client() -> HttpClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        HttpClient::new(
            &format!("http://{}", addr),
            std::time::Duration::from_secs(2),
            std::sync::Arc::new(MemoryTokenStore::new()),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_login_validates_before_sending() {
        let dir = tempfile::TempDir::new().unwrap();
        let store = FileTokenStore::open(dir.path().join("credentials.toml"));
        let client = unreachable_client();

        let err = login(&client, &store, "ab", "secret").await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::UsernameTooShort));

        let err = login(&client, &store, "alice", "").await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::PasswordRequired));
    }

    #[tokio::test]
    async fn test_login_unreachable_stores_nothing() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("credentials.toml");
        let store = FileTokenStore::open(&path);

        let err = login(&unreachable_client(), &store, "alice", "secret")
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unreachable);
        assert!(!path.exists());
        assert!(store.token().is_none());
    }

    #[test]
    fn test_register_error_classification() {
        assert_eq!(
            classify_register_error(&api(409, "Username already taken")).to_string(),
            "Username already taken"
        );
        assert_eq!(
            classify_register_error(&api(500, "")).to_string(),
            "Registration failed. Please try again."
        );
        assert_eq!(
            classify_register_error(&ApiError::Network("refused".to_string())),
            AuthError::Unreachable
        );
        assert_eq!(
            classify_register_error(&ApiError::Parse("empty".to_string())).to_string(),
            "Registration failed. Please try again later."
        );
    }

    fn registration() -> RegisterRequest {
        RegisterRequest {
            username: "alice".to_string(),
            password: "Secret1!".to_string(),
            email: "alice@example.com".to_string(),
            first_name: "Alice".to_string(),
            last_name: "Liddell".to_string(),
        }
    }

    #[test]
    fn test_registration_checks_fields_in_order() {
        assert_eq!(validate_registration(&registration()), Ok(()));

        let form = RegisterRequest {
            password: "weak".to_string(),
            email: "nope".to_string(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&form),
            Err(ValidationError::PasswordTooShort)
        );

        let form = RegisterRequest {
            last_name: String::new(),
            ..registration()
        };
        assert_eq!(
            validate_registration(&form).unwrap_err().to_string(),
            "Last name is required"
        );
    }

    #[tokio::test]
    async fn test_register_validates_before_sending() {
        let form = RegisterRequest {
            email: "alice@example".to_string(),
            ..registration()
        };
        let err = register(&unreachable_client(), &form).await.unwrap_err();
        assert_eq!(err, AuthError::Validation(ValidationError::EmailInvalid));
    }

    #[tokio::test]
    async fn test_register_unreachable() {
        let err = register(&unreachable_client(), &registration())
            .await
            .unwrap_err();
        assert_eq!(err, AuthError::Unreachable);
    }

    #[test]
    fn test_validation_message_passes_through() {
        let err: AuthError = ValidationError::UsernameTooShort.into();
        assert_eq!(err.to_string(), "Username must be at least 3 characters");
    }
}
