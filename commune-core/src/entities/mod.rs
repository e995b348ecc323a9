pub mod campaign;
pub mod contact;
pub mod donation;
pub mod notification;
pub mod security;
pub mod user;

/// Role of a platform account.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, sqlx::Type, serde::Serialize, serde::Deserialize,
)]
#[sqlx(rename_all = "lowercase", type_name = "user_role")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    User,
    Staff,
    Admin,
}
