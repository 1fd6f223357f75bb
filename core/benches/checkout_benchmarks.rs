use autoparts_core::checkout::{group_by_shop, place_orders, CheckoutRequest, StockPolicy};
use autoparts_core::models::{CartLine, PaymentMethod, Shop, ShopListing, User, UserRole};
use autoparts_core::store::{CommerceStore, InMemoryStore};
use chrono::Utc;
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use std::sync::Arc;
use tokio::runtime::Runtime;
use uuid::Uuid;

fn cart_lines(num_lines: usize, num_shops: usize) -> Vec<CartLine> {
  let shops: Vec<Uuid> = (0..num_shops).map(|_| Uuid::new_v4()).collect();
  (0..num_lines)
    .map(|i| CartLine {
      cart_item_id: Uuid::new_v4(),
      listing_id: Uuid::new_v4(),
      shop_id: shops[i % num_shops],
      shop_name: format!("shop-{}", i % num_shops),
      product_name: format!("part-{}", i),
      unit_price_cents: 1_000 + i as i64,
      quantity: 2,
      stock_quantity: 100,
      created_at: Utc::now(),
    })
    .collect()
}

fn bench_group_by_shop(c: &mut Criterion) {
  let mut group = c.benchmark_group("GroupByShop");
  for (num_lines, num_shops) in [(10, 2), (100, 10), (1_000, 50)] {
    let lines = cart_lines(num_lines, num_shops);
    group.throughput(Throughput::Elements(num_lines as u64));
    group.bench_with_input(
      BenchmarkId::from_parameter(format!("{}lines_{}shops", num_lines, num_shops)),
      &lines,
      |b, lines| b.iter(|| group_by_shop(lines)),
    );
  }
  group.finish();
}

async fn seeded_store(num_shops: usize, lines_per_shop: usize) -> (InMemoryStore, User) {
  let memory = InMemoryStore::new();
  let customer = memory.add_user(User::new("bench@example.com", UserRole::Customer)).await;
  for s in 0..num_shops {
    let shop = memory.add_shop(Shop::new(format!("Shop {}", s), format!("shop-{}", s))).await;
    for l in 0..lines_per_shop {
      let listing = memory
        .add_listing(ShopListing::new(shop.id, format!("Part {}-{}", s, l), 2_500, 1_000_000))
        .await;
      memory.add_cart_item(customer.id, listing.id, 1).await;
    }
  }
  (memory, customer)
}

fn bench_place_orders(c: &mut Criterion) {
  let mut group = c.benchmark_group("PlaceOrders");
  let rt = Runtime::new().unwrap();

  for (num_shops, lines_per_shop) in [(1, 1), (3, 5), (10, 10)] {
    group.bench_function(
      BenchmarkId::from_parameter(format!("{}shops_{}lines", num_shops, lines_per_shop)),
      |b| {
        // Seeding runs inside the measured future; the in-memory store is async only.
        b.to_async(&rt).iter(|| async move {
          let (memory, customer) = seeded_store(num_shops, lines_per_shop).await;
          let store: Arc<dyn CommerceStore> = Arc::new(memory);
          let request = CheckoutRequest {
            user_id: customer.id,
            shipping_address: "Avenida 4 de Fevereiro, Luanda".to_string(),
            billing_address: "Avenida 4 de Fevereiro, Luanda".to_string(),
            payment_method: PaymentMethod::Reference,
            notes: None,
          };
          place_orders(store, request, StockPolicy::Clamp).await.unwrap()
        })
      },
    );
  }
  group.finish();
}

criterion_group!(benches, bench_group_by_shop, bench_place_orders);
criterion_main!(benches);
