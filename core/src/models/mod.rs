// core/src/models/mod.rs

pub mod cart;
pub mod listing;
pub mod order;
pub mod shop;
pub mod status;
pub mod user;

pub use cart::{CartItem, CartLine};
pub use listing::ShopListing;
pub use order::{Order, OrderDetail, OrderFilter, OrderItem, OrderStatusUpdate};
pub use shop::Shop;
pub use status::{OrderStatus, PaymentMethod, PaymentStatus};
pub use user::{User, UserRole};
