pub mod auth;
pub mod messages;
pub mod products;

pub use auth::{current_session, login, logout, signup, AuthResponse, LoginRequest, SignupRequest};
pub use messages::list_messages;
pub use products::{create_product, delete_product, get_product, list_products, update_product};
