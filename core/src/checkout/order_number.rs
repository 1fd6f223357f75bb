// core/src/checkout/order_number.rs

use chrono::{DateTime, Utc};
use rand::Rng;

const SUFFIX_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const SUFFIX_LEN: usize = 5;

/// `ORD-<YYYYMMDDHHMMSS>-<5 uppercase alphanumerics>`.
pub fn generate_order_number<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> String {
  let suffix: String = (0..SUFFIX_LEN)
    .map(|_| SUFFIX_ALPHABET[rng.gen_range(0..SUFFIX_ALPHABET.len())] as char)
    .collect();
  format!("ORD-{}-{}", now.format("%Y%m%d%H%M%S"), suffix)
}

pub fn new_order_number() -> String {
  generate_order_number(Utc::now(), &mut rand::thread_rng())
}
