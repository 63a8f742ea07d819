use serde::Serialize;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi, ToSchema};

#[derive(ToSchema)]
pub struct HealthResponse { pub status: String }

#[derive(ToSchema)]
pub struct MessageDoc { pub message: String }

#[derive(ToSchema)]
pub struct CredentialsDoc { pub email: String, pub password: String }

/// One of `starter`, `pro`, `business`.
#[derive(ToSchema)]
pub struct SubscriptionDoc { pub subscription: String }

#[derive(ToSchema)]
pub struct PublicUserDoc { pub email: String, pub subscription: String }

#[derive(ToSchema)]
pub struct SignupResponseDoc { pub user: PublicUserDoc }

#[derive(ToSchema)]
pub struct LoginResponseDoc { pub token: String, pub user: PublicUserDoc }

#[derive(Serialize, ToSchema)]
pub struct CurrentResponseDoc {
    pub email: String,
    pub subscription: String,
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(Serialize, ToSchema)]
pub struct AvatarResponseDoc {
    #[serde(rename = "avatarURL")]
    pub avatar_url: String,
}

#[derive(ToSchema)]
pub struct AvatarUploadDoc {
    #[schema(value_type = String, format = Binary)]
    pub avatar: Vec<u8>,
}

#[derive(ToSchema)]
pub struct ResendVerificationDoc { pub email: String }

/// Free-form contact; every field other than `id` is client-defined.
#[derive(ToSchema)]
pub struct ContactDoc {
    pub id: String,
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(ToSchema)]
pub struct ContactInputDoc {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Registers the `bearer` scheme referenced by the session-protected paths.
struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).bearer_format("JWT").build()),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    modifiers(&BearerAuth),
    paths(
        crate::routes::health,
        crate::routes::users::signup,
        crate::routes::users::login,
        crate::routes::users::logout,
        crate::routes::users::current,
        crate::routes::users::update_subscription,
        crate::routes::users::update_avatar,
        crate::routes::users::verify,
        crate::routes::users::resend_verification,
        crate::routes::contacts::list,
        crate::routes::contacts::get,
        crate::routes::contacts::create,
        crate::routes::contacts::delete,
        crate::routes::contacts::update,
    ),
    components(
        schemas(
            HealthResponse,
            MessageDoc,
            CredentialsDoc,
            SubscriptionDoc,
            PublicUserDoc,
            SignupResponseDoc,
            LoginResponseDoc,
            CurrentResponseDoc,
            AvatarResponseDoc,
            AvatarUploadDoc,
            ResendVerificationDoc,
            ContactDoc,
            ContactInputDoc,
        )
    ),
    tags(
        (name = "health"),
        (name = "users"),
        (name = "contacts")
    )
)]
pub struct ApiDoc;
