// server/src/web/handlers/mod.rs

pub mod cart_handlers;
pub mod order_handlers;
pub mod shop_order_handlers;
pub mod shop_product_handlers;
