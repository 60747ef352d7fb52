//! Wire format of the realtime channel. Every frame is a JSON text message shaped
//! `{"event": "<name>", "data": <payload>}`.

use serde::{Deserialize, Serialize};

use crate::models::{ChatMessage, NewChatMessage, NewProduct, Product, ProductId};

/// Commands a client may send.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ClientCommand {
    AddProduct(NewProduct),
    DeleteProduct(ProductId),
    ChatMessage(NewChatMessage),
}

impl ClientCommand {
    pub fn name(&self) -> &'static str {
        match self {
            Self::AddProduct(_) => "addProduct",
            Self::DeleteProduct(_) => "deleteProduct",
            Self::ChatMessage(_) => "chatMessage",
        }
    }
}

/// Events the server pushes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ServerEvent {
    /// Full catalog snapshot; replaces the client's product view.
    UpdateProducts(Vec<Product>),
    /// One newly appended message.
    ChatMessage(ChatMessage),
    /// Whole transcript, sent once to a freshly connected client.
    ChatMessages(Vec<ChatMessage>),
}

impl ServerEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::UpdateProducts(_) => "updateProducts",
            Self::ChatMessage(_) => "chatMessage",
            Self::ChatMessages(_) => "chatMessages",
        }
    }
}
