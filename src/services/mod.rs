pub mod auth_service;
pub mod auth_service_impl;
pub use auth_service::{
    AccountChanges, AccountProfile, AuthError, AuthService, LoginOutcome, NewAccount,
};
pub use auth_service_impl::SeaOrmAuthService;

pub mod tokens;
pub use tokens::{AccessClaims, TokenAuthority, TokenRejection};

pub mod asset_service;
pub mod asset_service_impl;
pub use asset_service::{AssetError, AssetKind, AssetService, PresignedUrl};
pub use asset_service_impl::S3AssetService;
