// core/src/models/shop.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct Shop {
  pub id: Uuid,
  pub name: String,
  pub slug: String,
  pub is_active: bool,
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
}

impl Shop {
  pub fn new(name: impl Into<String>, slug: impl Into<String>) -> Self {
    let now = Utc::now();
    Self {
      id: Uuid::new_v4(),
      name: name.into(),
      slug: slug.into(),
      is_active: true,
      created_at: now,
      updated_at: now,
    }
  }
}
