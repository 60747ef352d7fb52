//! Domain records: catalog products, chat messages, users, and their id aliases.

pub mod chat;
pub mod ids;
pub mod product;
pub mod user;

pub use chat::{ChatMessage, NewChatMessage};
pub use ids::{ConnectionId, MessageId, ProductId, UserId};
pub use product::{NewProduct, Product, ProductDraft, ProductPatch};
pub use user::{User, UserProfile};
