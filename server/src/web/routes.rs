// server/src/web/routes.rs

use actix_web::web;

use crate::errors::AppError;
use crate::web::handlers::{cart_handlers, order_handlers, shop_order_handlers, shop_product_handlers};

async fn health_check_handler() -> actix_web::HttpResponse {
  actix_web::HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

pub fn configure_app_routes(cfg: &mut web::ServiceConfig) {
  // Malformed bodies, queries and path segments answer with the same JSON error body as everything else.
  cfg
    .app_data(web::JsonConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::QueryConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()))
    .app_data(web::PathConfig::default().error_handler(|err, _req| AppError::Validation(err.to_string()).into()));

  cfg.service(
    web::scope("/api/v1")
      .route("/health", web::get().to(health_check_handler))
      .service(
        web::scope("/orders")
          .route("", web::post().to(order_handlers::create_orders_handler))
          .route("", web::get().to(order_handlers::list_orders_handler))
          .route("/{order_id}/cancel", web::put().to(order_handlers::cancel_order_handler))
          .route("/{order_ref}", web::get().to(order_handlers::get_order_handler))
          .route("/{order_id}", web::put().to(order_handlers::update_order_handler)),
      )
      .service(
        web::scope("/cart")
          .route("", web::get().to(cart_handlers::get_cart_handler))
          .route("", web::post().to(cart_handlers::add_to_cart_handler))
          .route("", web::delete().to(cart_handlers::clear_cart_handler))
          .route("/{item_id}", web::put().to(cart_handlers::update_cart_item_handler))
          .route("/{item_id}", web::delete().to(cart_handlers::remove_cart_item_handler)),
      )
      .service(
        // `summary` is registered ahead of `{order_id}`.
        web::scope("/shops/{shop_id}/orders")
          .route("", web::get().to(shop_order_handlers::list_shop_orders_handler))
          .route("/summary", web::get().to(shop_order_handlers::shop_order_summary_handler))
          .route("/{order_id}", web::get().to(shop_order_handlers::get_shop_order_handler))
          .route(
            "/{order_id}/status",
            web::put().to(shop_order_handlers::update_shop_order_status_handler),
          )
          .route(
            "/{order_id}/payment",
            web::put().to(shop_order_handlers::update_shop_order_payment_handler),
          )
          .route(
            "/{order_id}/shipping",
            web::put().to(shop_order_handlers::update_shop_order_shipping_handler),
          ),
      )
      .service(
        web::scope("/shop-products")
          .route("/{listing_id}", web::get().to(shop_product_handlers::get_shop_product_handler))
          .route("/{listing_id}/stock", web::put().to(shop_product_handlers::update_stock_handler)),
      ),
  );
}
