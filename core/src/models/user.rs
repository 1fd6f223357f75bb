// core/src/models/user.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(type_name = "user_role_enum", rename_all = "snake_case"))]
pub enum UserRole {
  Customer,
  /// Staff member of a single shop.
  Logist,
  Admin,
  Superadmin,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
  pub id: Uuid,
  pub email: String,
  pub first_name: Option<String>,
  pub last_name: Option<String>,
  pub role: UserRole,
  /// Set for logists; the shop they work for.
  pub shop_id: Option<Uuid>,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl User {
  pub fn new(email: impl Into<String>, role: UserRole) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      email: email.into(),
      first_name: None,
      last_name: None,
      role,
      shop_id: None,
      is_active: true,
      created_at: now,
      updated_at: now,
    }
  }

  pub fn with_shop(mut self, shop_id: Uuid) -> Self {
    self.shop_id = Some(shop_id);
    self
  }

  pub fn is_superuser(&self) -> bool {
    matches!(self.role, UserRole::Admin | UserRole::Superadmin)
  }
}
