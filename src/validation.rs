//! Local validation gates
//!
//! Pure functions checked before any network call: the input text bound for
//! starting a generation, the per-field bound for edited flashcard content,
//! the approval preconditions, and the login and registration form fields.

use thiserror::Error;

/// Minimum input text length (characters, after trimming)
pub const INPUT_TEXT_MIN_CHARS: usize = 1000;

/// Maximum input text length (characters, after trimming)
pub const INPUT_TEXT_MAX_CHARS: usize = 10000;

/// Minimum length of a flashcard front or back
pub const CONTENT_MIN_CHARS: usize = 1;

/// Maximum length of a flashcard front or back
pub const CONTENT_MAX_CHARS: usize = 1000;

const USERNAME_MIN_CHARS: usize = 3;
const USERNAME_MAX_CHARS: usize = 50;
const PASSWORD_MIN_CHARS: usize = 8;
const PASSWORD_MAX_CHARS: usize = 100;
const EMAIL_MAX_CHARS: usize = 100;
const NAME_MAX_CHARS: usize = 50;

/// Characters that satisfy the registration special-character rule
const PASSWORD_SPECIAL_CHARS: &str = "!@#$%^&*()_+-=[]{};':\"\\|,.<>/?";

/// Local precondition failures
///
/// The `Display` text of each variant is the message shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Text is required")]
    InputTextRequired,

    #[error("Minimum 1000 characters required")]
    InputTextTooShort,

    #[error("Maximum 10000 characters allowed")]
    InputTextTooLong,

    #[error("{field} must be at least 1 character")]
    ContentTooShort { field: String },

    #[error("{field} must be at most 1000 characters")]
    ContentTooLong { field: String },

    #[error("Select at least one flashcard")]
    EmptySelection,

    #[error("Session not initialized")]
    SessionNotInitialized,

    #[error("All edited fields must be 1-1000 characters")]
    InvalidEditedContent,

    #[error("Generation is already in progress")]
    GenerationInProgress,

    #[error("Username is required")]
    UsernameRequired,

    #[error("Username must be at least 3 characters")]
    UsernameTooShort,

    #[error("Username must not exceed 50 characters")]
    UsernameTooLong,

    #[error("Username must contain only letters, numbers, and underscore")]
    UsernameInvalidCharacters,

    #[error("Password is required")]
    PasswordRequired,

    #[error("Password must be at least 8 characters")]
    PasswordTooShort,

    #[error("Password must not exceed 100 characters")]
    PasswordTooLong,

    #[error("Password must contain at least one uppercase letter")]
    PasswordMissingUppercase,

    #[error("Password must contain at least one lowercase letter")]
    PasswordMissingLowercase,

    #[error("Password must contain at least one number")]
    PasswordMissingNumber,

    #[error("Password must contain at least one special character")]
    PasswordMissingSpecial,

    #[error("Email is required")]
    EmailRequired,

    #[error("Email must not exceed 100 characters")]
    EmailTooLong,

    #[error("Please enter a valid email address")]
    EmailInvalid,

    #[error("{field} is required")]
    NameRequired { field: String },

    #[error("{field} must not exceed 50 characters")]
    NameTooLong { field: String },
}

/// Validate the text submitted for generation
///
/// Surrounding whitespace is trimmed before the length is measured.
pub fn validate_input_text(text: &str) -> Result<(), ValidationError> {
    let len = text.trim().chars().count();
    if len == 0 {
        Err(ValidationError::InputTextRequired)
    } else if len < INPUT_TEXT_MIN_CHARS {
        Err(ValidationError::InputTextTooShort)
    } else if len > INPUT_TEXT_MAX_CHARS {
        Err(ValidationError::InputTextTooLong)
    } else {
        Ok(())
    }
}

/// Validate one side of a flashcard
///
/// `field` names the side in the error message ("Question", "Answer", ...).
/// Content is measured as-is, without trimming.
pub fn validate_flashcard_content(content: &str, field: &str) -> Result<(), ValidationError> {
    let len = content.chars().count();
    if len < CONTENT_MIN_CHARS {
        Err(ValidationError::ContentTooShort {
            field: field.to_string(),
        })
    } else if len > CONTENT_MAX_CHARS {
        Err(ValidationError::ContentTooLong {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

/// Validate a login username: 3-50 characters of `[A-Za-z0-9_]`
pub fn validate_username(username: &str) -> Result<(), ValidationError> {
    if username.trim().is_empty() {
        return Err(ValidationError::UsernameRequired);
    }

    let len = username.chars().count();
    if len < USERNAME_MIN_CHARS {
        Err(ValidationError::UsernameTooShort)
    } else if len > USERNAME_MAX_CHARS {
        Err(ValidationError::UsernameTooLong)
    } else if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_')
    {
        Err(ValidationError::UsernameInvalidCharacters)
    } else {
        Ok(())
    }
}

/// Login only checks that a password was given; strength rules apply at registration
pub fn validate_login_password(password: &str) -> Result<(), ValidationError> {
    if password.is_empty() {
        Err(ValidationError::PasswordRequired)
    } else {
        Ok(())
    }
}

/// Registration password: 8-100 characters with an uppercase letter, a
/// lowercase letter, a digit and a special character
pub fn validate_registration_password(password: &str) -> Result<(), ValidationError> {
    let len = password.chars().count();
    if len == 0 {
        return Err(ValidationError::PasswordRequired);
    }
    if len < PASSWORD_MIN_CHARS {
        return Err(ValidationError::PasswordTooShort);
    }
    if len > PASSWORD_MAX_CHARS {
        return Err(ValidationError::PasswordTooLong);
    }

    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        Err(ValidationError::PasswordMissingUppercase)
    } else if !password.chars().any(|c| c.is_ascii_lowercase()) {
        Err(ValidationError::PasswordMissingLowercase)
    } else if !password.chars().any(|c| c.is_ascii_digit()) {
        Err(ValidationError::PasswordMissingNumber)
    } else if !password.chars().any(|c| PASSWORD_SPECIAL_CHARS.contains(c)) {
        Err(ValidationError::PasswordMissingSpecial)
    } else {
        Ok(())
    }
}

/// `local@domain.tld` shape, at most 100 characters
pub fn validate_email(email: &str) -> Result<(), ValidationError> {
    if email.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if email.chars().count() > EMAIL_MAX_CHARS {
        return Err(ValidationError::EmailTooLong);
    }

    let valid = match email.split_once('@') {
        Some((local, domain)) => {
            let no_space = !email.chars().any(char::is_whitespace);
            // A dot with something on both sides
            let dotted = domain
                .char_indices()
                .any(|(i, c)| c == '.' && i > 0 && i + 1 < domain.len());
            no_space && !local.is_empty() && !domain.contains('@') && dotted
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(ValidationError::EmailInvalid)
    }
}

/// First or last name; `field` names it in the error message
pub fn validate_name(name: &str, field: &str) -> Result<(), ValidationError> {
    if name.trim().is_empty() {
        Err(ValidationError::NameRequired {
            field: field.to_string(),
        })
    } else if name.chars().count() > NAME_MAX_CHARS {
        Err(ValidationError::NameTooLong {
            field: field.to_string(),
        })
    } else {
        Ok(())
    }
}

#[cfg(test)]
#[path = "validation_tests.rs"]
mod validation_tests;
