// core/src/checkout/grouping.rs

use crate::models::CartLine;
use serde::Serialize;
use std::collections::HashMap;
use uuid::Uuid;

/// Cart lines owned by one shop; becomes one order.
#[derive(Debug, Clone, Serialize)]
pub struct ShopGroup {
  pub shop_id: Uuid,
  pub shop_name: String,
  pub lines: Vec<CartLine>,
  pub total_amount_cents: i64,
  pub order_number: Option<String>,
}

/// Partitions cart lines by owning shop. Groups appear in the order their
/// shop is first seen; lines keep cart order within a group.
pub fn group_by_shop(lines: &[CartLine]) -> Vec<ShopGroup> {
  let mut index: HashMap<Uuid, usize> = HashMap::new();
  let mut groups: Vec<ShopGroup> = Vec::new();

  for line in lines {
    let slot = *index.entry(line.shop_id).or_insert_with(|| {
      groups.push(ShopGroup {
        shop_id: line.shop_id,
        shop_name: line.shop_name.clone(),
        lines: Vec::new(),
        total_amount_cents: 0,
        order_number: None,
      });
      groups.len() - 1
    });
    let group = &mut groups[slot];
    group.total_amount_cents += line.line_total_cents();
    group.lines.push(line.clone());
  }

  groups
}
