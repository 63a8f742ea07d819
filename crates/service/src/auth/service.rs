use std::sync::Arc;

use argon2::{password_hash::{PasswordHasher, PasswordVerifier, SaltString}, Argon2, PasswordHash};
use models::user::Subscription;
use rand::rngs::OsRng;
use tracing::{debug, info, instrument};
use uuid::Uuid;

use super::domain::{validate_credentials, validate_email, AuthSession, LoginInput, NewAccount, PublicUser, SignupInput, User};
use super::errors::AuthError;
use super::gravatar::gravatar_url;
use super::repository::UserRepository;
use super::token::TokenIssuer;
use crate::mail::{verification_email, Mailer};

/// Auth service configuration
#[derive(Clone)]
pub struct AuthConfig {
    /// Base URL used to build verification links, e.g. `https://api.example.com`.
    pub public_base_url: String,
}

/// Auth business service independent of web framework
pub struct AuthService<R: UserRepository + ?Sized = dyn UserRepository> {
    repo: Arc<R>,
    mailer: Arc<dyn Mailer>,
    tokens: TokenIssuer,
    cfg: AuthConfig,
}

impl<R: UserRepository + ?Sized> AuthService<R> {
    pub fn new(repo: Arc<R>, mailer: Arc<dyn Mailer>, tokens: TokenIssuer, cfg: AuthConfig) -> Self {
        Self { repo, mailer, tokens, cfg }
    }

    /// Register a new, unverified user and email them a verification link.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::mock::InMemoryUserRepository, token::TokenIssuer};
    /// use service::auth::domain::SignupInput;
    /// use service::mail::mock::RecordingMailer;
    /// use std::{sync::Arc, time::Duration};
    /// let repo = Arc::new(InMemoryUserRepository::default());
    /// let mailer = Arc::new(RecordingMailer::default());
    /// let svc = AuthService::new(repo, mailer.clone(), TokenIssuer::new("secret", Duration::from_secs(3600)), AuthConfig { public_base_url: "http://localhost:8080".into() });
    /// let input = SignupInput { email: "user@example.com".into(), password: "Secret123".into() };
    /// let user = tokio_test::block_on(svc.signup(input)).unwrap();
    /// assert_eq!(user.email, "user@example.com");
    /// assert_eq!(tokio_test::block_on(mailer.sent()).len(), 1);
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn signup(&self, input: SignupInput) -> Result<PublicUser, AuthError> {
        validate_credentials(&input.email, &input.password)?;
        if let Some(existing) = self.repo.find_by_email(&input.email).await? {
            debug!("user exists: {}", existing.email);
            return Err(AuthError::Conflict);
        }

        let password_hash = hash_password(input.password).await?;
        let verification_token = Uuid::new_v4().to_string();
        let user = self
            .repo
            .create(NewAccount {
                avatar_url: gravatar_url(&input.email),
                email: input.email,
                password_hash,
                verification_token,
            })
            .await?;
        info!(user_id = %user.id, "user_registered");

        self.send_verification(&user).await?;
        Ok(user.public())
    }

    /// Authenticate a verified user and issue a session token, replacing any previous one.
    ///
    /// # Examples
    /// ```
    /// use service::auth::{service::{AuthService, AuthConfig}, repository::{mock::InMemoryUserRepository, UserRepository}, token::TokenIssuer};
    /// use service::auth::domain::{SignupInput, LoginInput};
    /// use service::mail::mock::RecordingMailer;
    /// use std::{sync::Arc, time::Duration};
    /// let repo = Arc::new(InMemoryUserRepository::default());
    /// let svc = AuthService::new(repo.clone(), Arc::new(RecordingMailer::default()), TokenIssuer::new("secret", Duration::from_secs(3600)), AuthConfig { public_base_url: "http://localhost".into() });
    /// tokio_test::block_on(svc.signup(SignupInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// let user = tokio_test::block_on(repo.find_by_email("u@e.com")).unwrap().unwrap();
    /// tokio_test::block_on(svc.verify_email(&user.verification_token)).unwrap();
    /// let session = tokio_test::block_on(svc.login(LoginInput { email: "u@e.com".into(), password: "Passw0rd".into() })).unwrap();
    /// assert_eq!(session.user.email, "u@e.com");
    /// assert!(!session.token.is_empty());
    /// ```
    #[instrument(skip(self, input), fields(email = %input.email))]
    pub async fn login(&self, input: LoginInput) -> Result<AuthSession, AuthError> {
        validate_credentials(&input.email, &input.password)?;
        let user = self
            .repo
            .find_by_email(&input.email)
            .await?
            .ok_or(AuthError::InvalidCredentials)?;
        if !user.verify {
            return Err(AuthError::NotVerified);
        }
        if !verify_password(input.password, user.password_hash.clone()).await? {
            return Err(AuthError::InvalidCredentials);
        }

        let token = self.tokens.issue(user.id)?;
        self.repo.set_token(user.id, Some(token.clone())).await?;
        info!(user_id = %user.id, "user_logged_in");
        Ok(AuthSession { token, user: user.public() })
    }

    /// Resolve a bearer token to its user. The token must still be the one stored on the user.
    pub async fn authenticate(&self, token: &str) -> Result<User, AuthError> {
        let user_id = self.tokens.verify(token)?;
        let user = self.repo.find_by_id(user_id).await?.ok_or(AuthError::NotAuthorized)?;
        if user.token.as_deref() != Some(token) {
            debug!(user_id = %user.id, "token superseded or revoked");
            return Err(AuthError::NotAuthorized);
        }
        Ok(user)
    }

    #[instrument(skip(self))]
    pub async fn logout(&self, user_id: Uuid) -> Result<(), AuthError> {
        self.repo.set_token(user_id, None).await?;
        info!(%user_id, "user_logged_out");
        Ok(())
    }

    /// Flip the verified flag for the owner of `verification_token`.
    #[instrument(skip_all)]
    pub async fn verify_email(&self, verification_token: &str) -> Result<(), AuthError> {
        let user = self
            .repo
            .find_by_verification_token(verification_token)
            .await?
            .ok_or(AuthError::NotFound)?;
        if user.verify {
            return Err(AuthError::AlreadyVerified);
        }
        self.repo.mark_verified(user.id).await?;
        info!(user_id = %user.id, "email_verified");
        Ok(())
    }

    /// Send the verification link again to a not-yet-verified user.
    #[instrument(skip_all)]
    pub async fn resend_verification(&self, email: Option<&str>) -> Result<(), AuthError> {
        let email = email
            .filter(|e| validate_email(e).is_ok())
            .ok_or_else(|| AuthError::Validation("missing required field email".into()))?;
        let user = self.repo.find_by_email(email).await?.ok_or(AuthError::NotFound)?;
        if user.verify {
            return Err(AuthError::AlreadyVerified);
        }
        self.send_verification(&user).await
    }

    pub async fn update_subscription(&self, user_id: Uuid, subscription: &str) -> Result<PublicUser, AuthError> {
        let tier = subscription.parse::<Subscription>()?;
        let user = self.repo.set_subscription(user_id, tier).await?;
        info!(%user_id, subscription = %tier, "subscription_updated");
        Ok(user.public())
    }

    pub async fn update_avatar(&self, user_id: Uuid, avatar_url: String) -> Result<String, AuthError> {
        let user = self.repo.set_avatar_url(user_id, avatar_url).await?;
        Ok(user.avatar_url)
    }

    async fn send_verification(&self, user: &User) -> Result<(), AuthError> {
        let message = verification_email(&user.email, &self.cfg.public_base_url, &user.verification_token);
        self.mailer.send(&message).await?;
        Ok(())
    }
}

async fn hash_password(password: String) -> Result<String, AuthError> {
    tokio::task::spawn_blocking(move || {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|h| h.to_string())
            .map_err(|e| AuthError::HashError(e.to_string()))
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}

async fn verify_password(password: String, hash: String) -> Result<bool, AuthError> {
    tokio::task::spawn_blocking(move || {
        let parsed = PasswordHash::new(&hash).map_err(|e| AuthError::HashError(e.to_string()))?;
        Ok(Argon2::default().verify_password(password.as_bytes(), &parsed).is_ok())
    })
    .await
    .map_err(|e| AuthError::HashError(e.to_string()))?
}
