use thiserror::Error;

/// Business errors for auth workflows
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("{0}")]
    Validation(String),
    #[error("Email in use")]
    Conflict,
    #[error("Email or password is wrong")]
    InvalidCredentials,
    #[error("Email not verified")]
    NotVerified,
    #[error("Not authorized")]
    NotAuthorized,
    #[error("User not found")]
    NotFound,
    #[error("Verification has already been passed")]
    AlreadyVerified,
    #[error("hashing error: {0}")]
    HashError(String),
    #[error("token error: {0}")]
    TokenError(String),
    #[error("repository error: {0}")]
    Repository(String),
    #[error("mail delivery failed: {0}")]
    Mail(String),
}

impl From<models::errors::ModelError> for AuthError {
    fn from(e: models::errors::ModelError) -> Self {
        match e {
            models::errors::ModelError::Validation(msg) => AuthError::Validation(msg),
            models::errors::ModelError::NotFound(_) => AuthError::NotFound,
            models::errors::ModelError::Db(msg) => AuthError::Repository(msg),
        }
    }
}

impl From<crate::mail::MailError> for AuthError {
    fn from(e: crate::mail::MailError) -> Self {
        AuthError::Mail(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use models::errors::ModelError;

    #[test]
    fn missing_row_is_not_found() {
        assert!(matches!(AuthError::from(ModelError::NotFound("user".into())), AuthError::NotFound));
        assert!(matches!(AuthError::from(ModelError::Db("down".into())), AuthError::Repository(_)));
    }
}
