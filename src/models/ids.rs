//! Type aliases for entity IDs. Product ids are opaque strings (generated as UUIDs, but any
//! string a client sends to `deleteProduct` is a valid lookup key); everything else is typed.

use uuid::Uuid;

pub type ProductId = String;
pub type MessageId = i64;
pub type UserId = Uuid;
pub type ConnectionId = Uuid;

pub fn new_product_id() -> ProductId {
    Uuid::new_v4().to_string()
}
