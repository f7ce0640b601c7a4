use core_types::{BatchId, ComponentId};
use events::EventDescriptor;
use std::sync::mpsc::{Receiver, Sender, channel};

pub mod ipc;

#[derive(Debug, Clone, PartialEq)]
pub enum HostMessage {
    // Component roots
    AttachToDocument {
        component_id: ComponentId,
        selector: String,
    },
    // Rendering
    RenderBatch {
        batch_id: BatchId,
        bytes: Vec<u8>,
    },
    // Host failure: the session stops processing messages
    NotifyUnhandledException {
        message: String,
        stack: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ClientMessage {
    // Acknowledges a batch; `error` is set when applying it failed
    OnRenderCompleted {
        batch_id: BatchId,
        error: Option<String>,
    },
    // Delegated DOM event -> host handler
    DispatchBrowserEvent {
        descriptor: EventDescriptor,
        args: serde_json::Value,
    },
}

pub struct Bus {
    pub host_tx: Sender<HostMessage>,
    pub host_rx: Receiver<HostMessage>,
    pub client_tx: Sender<ClientMessage>, // handed to the renderer
    pub client_rx: Receiver<ClientMessage>,
}

impl Bus {
    pub fn new() -> Self {
        let (host_tx, host_rx) = channel();
        let (client_tx, client_rx) = channel();
        Self {
            host_tx,
            host_rx,
            client_tx,
            client_rx,
        }
    }

    /// Messages the client has sent so far, without blocking.
    pub fn drain_client(&self) -> Vec<ClientMessage> {
        self.client_rx.try_iter().collect()
    }
}

impl Default for Bus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn client_messages_drain_in_order() {
        let bus = Bus::new();
        for batch_id in 1..=2 {
            bus.client_tx
                .send(ClientMessage::OnRenderCompleted {
                    batch_id,
                    error: None,
                })
                .unwrap();
        }
        let drained = bus.drain_client();
        assert_eq!(drained.len(), 2);
        assert!(bus.drain_client().is_empty());
    }
}
