use crate::attributes::capture_attribute_name;
use crate::browser_renderer::BrowserRenderer;
use crate::config::RendererConfig;
use crate::error::{Missing, RenderError};
use batch::RenderBatch;
use bus::{ClientMessage, HostMessage};
use core_types::{BatchId, ComponentId, EventHandlerId};
use events::{BrowserEvent, DispatchedEvent, EventTypeOptions};
use html::{Document, NodeId};
use std::sync::mpsc::Sender;

/// The surface the transport talks to: one document, one renderer, and an
/// optional outbound channel for acknowledgments and delegated events.
pub struct WebRenderer {
    config: RendererConfig,
    document: Document,
    renderer: BrowserRenderer,
    client_tx: Option<Sender<ClientMessage>>,
    faulted: bool,
}

impl WebRenderer {
    pub fn new(config: RendererConfig, document: Document) -> Self {
        let renderer = BrowserRenderer::new(&config);
        Self {
            config,
            document,
            renderer,
            client_tx: None,
            faulted: false,
        }
    }

    /// Send acknowledgments and dispatched events to `client_tx`.
    pub fn connect(&mut self, client_tx: Sender<ClientMessage>) {
        self.client_tx = Some(client_tx);
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    /// Direct document access for the embedder (focus, form input). Managed
    /// subtrees must only change through batches.
    pub fn document_mut(&mut self) -> &mut Document {
        &mut self.document
    }

    pub fn renderer(&self) -> &BrowserRenderer {
        &self.renderer
    }

    /// Set once the host reports an unhandled exception; nothing is sent or
    /// processed afterwards.
    pub fn is_faulted(&self) -> bool {
        self.faulted
    }

    pub fn attach_root_component(
        &mut self,
        selector: &str,
        component: ComponentId,
    ) -> Result<NodeId, RenderError> {
        let element = self
            .document
            .query_selector(selector)?
            .ok_or_else(|| Missing::Selector(selector.to_string()))?;
        self.renderer
            .logical
            .create_container(&self.document, element, true)?;
        self.renderer
            .attach_root_component_to_logical_element(component, element);
        log::debug!(target: "renderer.batch", "component {component} attached to '{selector}' ({element})");
        Ok(element)
    }

    pub fn attach_root_component_to_range(
        &mut self,
        start: NodeId,
        end: NodeId,
        component: ComponentId,
    ) -> Result<(), RenderError> {
        self.renderer
            .attach_root_component_to_range(&self.document, start, end, component)
    }

    /// Apply every diff in the batch, then its disposals. Stops at the first
    /// error, leaving earlier mutations in place.
    pub fn apply_batch(&mut self, bytes: &[u8]) -> Result<(), RenderError> {
        let batch = RenderBatch::new(bytes)?;
        if self.config.log_batches {
            let trailer = &bytes[bytes.len().saturating_sub(batch::TRAILER_SIZE)..];
            log::trace!(
                target: "renderer.batch",
                "{} bytes, {:?}, trailer {trailer:02x?}",
                bytes.len(),
                batch.section_counts()
            );
        }

        for diff in batch.updated_components() {
            self.renderer
                .update_component(&mut self.document, &batch, &diff?)?;
        }
        for index in 0..batch.disposed_component_ids_len() {
            self.renderer
                .dispose_component(batch.disposed_component_id(index)?);
        }
        for index in 0..batch.disposed_event_handler_ids_len() {
            self.renderer
                .dispose_event_handler(batch.disposed_event_handler_id(index)?);
        }
        Ok(())
    }

    /// Apply a batch and acknowledge it to the host, with the error message
    /// when it failed.
    pub fn render_batch(&mut self, batch_id: BatchId, bytes: &[u8]) -> Result<(), RenderError> {
        let result = self.apply_batch(bytes);
        if let Err(err) = &result {
            log::error!(target: "renderer.batch", "batch {batch_id} failed: {err}");
        }
        self.send(ClientMessage::OnRenderCompleted {
            batch_id,
            error: result.as_ref().err().map(ToString::to_string),
        });
        result
    }

    pub fn dispose_component(&mut self, component: ComponentId) {
        self.renderer.dispose_component(component);
    }

    pub fn dispose_event_handler(&mut self, id: EventHandlerId) {
        self.renderer.dispose_event_handler(id);
    }

    pub fn register_custom_event_type(
        &mut self,
        name: &str,
        options: EventTypeOptions,
    ) -> Result<(), RenderError> {
        self.renderer
            .delegator_mut()
            .register_custom_event_type(name, options)?;
        Ok(())
    }

    /// Route a native event through the delegator and forward each
    /// resulting dispatch to the host. Inspect `event` afterwards for
    /// `default_prevented`.
    pub fn dispatch_native_event(&self, event: &mut BrowserEvent) -> Vec<DispatchedEvent> {
        let dispatched = self
            .renderer
            .delegator()
            .on_global_event(&self.document, event);
        for item in &dispatched {
            self.send(ClientMessage::DispatchBrowserEvent {
                descriptor: item.descriptor.clone(),
                args: item.args.clone(),
            });
        }
        dispatched
    }

    /// Handle one decoded transport message. Batch failures are reported to
    /// the host through the acknowledgment, not returned here.
    pub fn handle_message(&mut self, message: HostMessage) -> Result<(), RenderError> {
        if self.faulted {
            log::warn!(target: "renderer.batch", "faulted; ignoring {message:?}");
            return Ok(());
        }
        match message {
            HostMessage::AttachToDocument {
                component_id,
                selector,
            } => {
                self.attach_root_component(&selector, component_id)?;
            }
            HostMessage::RenderBatch { batch_id, bytes } => {
                let _ = self.render_batch(batch_id, &bytes);
            }
            HostMessage::NotifyUnhandledException { message, stack } => {
                log::error!(
                    target: "renderer.batch",
                    "host reported an unhandled exception: {message}{}",
                    stack.map(|s| format!("\n{s}")).unwrap_or_default()
                );
                self.faulted = true;
            }
        }
        Ok(())
    }

    /// The element whose reference the host captured under `capture_id`.
    pub fn element_by_capture_id(&self, capture_id: &str) -> Option<NodeId> {
        let selector = format!("[{}]", capture_attribute_name(capture_id));
        self.document.query_selector(&selector).ok().flatten()
    }

    fn send(&self, message: ClientMessage) {
        if self.faulted {
            return;
        }
        if let Some(tx) = &self.client_tx
            && tx.send(message).is_err()
        {
            log::warn!(target: "renderer.batch", "client channel closed; message dropped");
        }
    }
}
