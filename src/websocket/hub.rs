//! Broadcast hub: owns the live connection set and runs the realtime command handlers.
//!
//! Product commands follow mutate-then-full-refresh: after a successful mutation the whole catalog
//! is re-read and pushed to every live connection. Chat follows append-then-broadcast: only the new
//! message is pushed. Newly connected clients get the full transcript once.

use dashmap::DashMap;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{mpsc, Mutex};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use super::protocol::{ClientCommand, ServerEvent};
use crate::config::ChatIdentity;
use crate::error::StoreError;
use crate::models::{ConnectionId, NewChatMessage};
use crate::storage::{CatalogStore, ChatLogStore};

/// Per-connection outbound queue. Unbounded: the hub applies no backpressure.
pub type EventSender = mpsc::UnboundedSender<ServerEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<ServerEvent>;

#[derive(Debug, Error)]
pub enum HubError {
    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("connection {0} has no signed-in session; chat requires one")]
    AnonymousChat(ConnectionId),
}

/// What a successfully handled command led to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommandOutcome {
    /// An event went out to this many connections.
    Broadcast { recipients: usize },
    /// Nothing changed, nothing was sent.
    Unchanged,
}

struct ConnectionHandle {
    tx: EventSender,
    session_user: Option<String>,
}

/// A registered connection: its id plus the queue the socket writer drains.
pub struct Connection {
    pub id: ConnectionId,
    pub events: EventReceiver,
}

pub struct Hub {
    connections: DashMap<ConnectionId, ConnectionHandle>,
    catalog: Arc<dyn CatalogStore>,
    chat: Arc<dyn ChatLogStore>,
    /// Held from append through broadcast so chat goes out in append order.
    chat_order: Mutex<()>,
    chat_identity: ChatIdentity,
}

impl Hub {
    pub fn new(
        catalog: Arc<dyn CatalogStore>,
        chat: Arc<dyn ChatLogStore>,
        chat_identity: ChatIdentity,
    ) -> Self {
        Self {
            connections: DashMap::new(),
            catalog,
            chat,
            chat_order: Mutex::new(()),
            chat_identity,
        }
    }

    /// Registers a connection and replays the chat transcript to it alone.
    ///
    /// The connection joins the live set before the transcript is read, so a message appended in
    /// between shows up in the replay, the live broadcast, or both; it is never missed.
    pub async fn connect(&self, session_user: Option<String>) -> Connection {
        let id = Uuid::new_v4();
        let (tx, events) = mpsc::unbounded_channel();
        self.connections.insert(id, ConnectionHandle { tx, session_user });
        info!(
            "Realtime client {} connected ({} live)",
            id,
            self.connections.len()
        );

        match self.chat.list_all().await {
            Ok(history) => {
                debug!("Replaying {} chat messages to {}", history.len(), id);
                self.send_to(id, ServerEvent::ChatMessages(history));
            }
            Err(e) => warn!("Chat replay for {} failed: {}", id, e),
        }

        Connection { id, events }
    }

    /// Removes a connection. Returns whether it was still registered.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.connections.remove(&id).is_some();
        if removed {
            info!(
                "Realtime client {} disconnected ({} live)",
                id,
                self.connections.len()
            );
        }
        removed
    }

    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }

    pub fn is_connected(&self, id: ConnectionId) -> bool {
        self.connections.contains_key(&id)
    }

    /// Sends `event` to every live connection and returns how many accepted it. Connections whose
    /// receiver is gone are dropped from the live set.
    pub fn broadcast(&self, event: ServerEvent) -> usize {
        let mut delivered = 0;
        let mut closed = Vec::new();
        for entry in self.connections.iter() {
            if entry.tx.send(event.clone()).is_ok() {
                delivered += 1;
            } else {
                closed.push(*entry.key());
            }
        }
        // Removal must happen after iteration; DashMap shards stay locked while iterating.
        for id in closed {
            self.connections.remove(&id);
            debug!("Dropped closed realtime client {}", id);
        }
        debug!("Broadcast {} to {} clients", event.name(), delivered);
        delivered
    }

    fn send_to(&self, id: ConnectionId, event: ServerEvent) -> bool {
        let sent = match self.connections.get(&id) {
            Some(handle) => handle.tx.send(event).is_ok(),
            None => return false,
        };
        if !sent {
            self.connections.remove(&id);
        }
        sent
    }

    /// Re-reads the whole catalog and pushes it as `updateProducts` to everyone.
    pub async fn refresh_products(&self) -> Result<CommandOutcome, HubError> {
        let products = self.catalog.get_products().await?;
        let recipients = self.broadcast(ServerEvent::UpdateProducts(products));
        Ok(CommandOutcome::Broadcast { recipients })
    }

    /// Runs one client command and reports the outcome.
    pub async fn handle_command(
        &self,
        from: ConnectionId,
        command: ClientCommand,
    ) -> Result<CommandOutcome, HubError> {
        match command {
            ClientCommand::AddProduct(payload) => {
                let product = self.catalog.add_product(payload).await?;
                info!("Client {} added product {}", from, product.id);
                self.refresh_products().await
            }
            ClientCommand::DeleteProduct(id) => {
                if self.catalog.delete_product_by_id(&id).await? {
                    info!("Client {} deleted product {}", from, id);
                    self.refresh_products().await
                } else {
                    debug!("Client {} asked to delete unknown product {}", from, id);
                    Ok(CommandOutcome::Unchanged)
                }
            }
            ClientCommand::ChatMessage(payload) => {
                let payload = self.resolve_chat_identity(from, payload)?;
                let _order = self.chat_order.lock().await;
                let stored = self.chat.append(payload).await?;
                let recipients = self.broadcast(ServerEvent::ChatMessage(stored));
                Ok(CommandOutcome::Broadcast { recipients })
            }
        }
    }

    /// Fire-and-forget entry point used by sockets: failures are logged and swallowed, and the
    /// sender gets no reply.
    pub async fn dispatch(&self, from: ConnectionId, command: ClientCommand) {
        let name = command.name();
        match self.handle_command(from, command).await {
            Ok(outcome) => debug!("{} from {} handled: {:?}", name, from, outcome),
            Err(HubError::Store(StoreError::Storage(detail))) => {
                error!("{} from {} failed in storage: {}", name, from, detail)
            }
            Err(e) => warn!("{} from {} rejected: {}", name, from, e),
        }
    }

    fn resolve_chat_identity(
        &self,
        from: ConnectionId,
        mut payload: NewChatMessage,
    ) -> Result<NewChatMessage, HubError> {
        if self.chat_identity == ChatIdentity::Client {
            return Ok(payload);
        }
        let session_user = self
            .connections
            .get(&from)
            .and_then(|handle| handle.session_user.clone());
        match session_user {
            Some(username) => {
                payload.user = Some(username);
                Ok(payload)
            }
            None => Err(HubError::AnonymousChat(from)),
        }
    }
}
