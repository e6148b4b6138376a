use crate::event::ResultEnvelope;
use crate::responder::Gateway;
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use tokio::runtime::Handle;
use tracing::debug;

/// Consumer side of the task → frame-loop hand-off. Drained once per frame;
/// never blocks.
pub struct ResultChannel {
    rx: Receiver<ResultEnvelope>,
    disconnected: bool,
}

impl ResultChannel {
    /// Removes and returns every envelope currently available. An empty or
    /// disconnected channel yields an empty vec; pending envelopes are still
    /// drained before a disconnect is recorded, so none is ever lost.
    pub fn drain(&mut self) -> Vec<ResultEnvelope> {
        let mut drained = Vec::new();
        loop {
            match self.rx.try_recv() {
                Ok(envelope) => drained.push(envelope),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.disconnected = true;
                    break;
                }
            }
        }
        drained
    }

    pub fn is_disconnected(&self) -> bool {
        self.disconnected
    }
}

pub fn result_channel() -> (Sender<ResultEnvelope>, ResultChannel) {
    let (tx, rx) = mpsc::channel();
    (
        tx,
        ResultChannel {
            rx,
            disconnected: false,
        },
    )
}

/// Spawns one detached task per submitted prompt. Tasks share nothing but
/// the gateway and the channel sender; no handle is retained and nothing is
/// ever cancelled.
#[derive(Clone)]
pub struct Dispatcher {
    gateway: Arc<Gateway>,
    tx: Sender<ResultEnvelope>,
    handle: Handle,
}

impl Dispatcher {
    pub fn new(gateway: Arc<Gateway>, tx: Sender<ResultEnvelope>, handle: Handle) -> Self {
        Self {
            gateway,
            tx,
            handle,
        }
    }

    /// Non-blocking; returns as soon as the task is spawned. Exactly one
    /// envelope per submission reaches the channel unless the consumer has
    /// gone away, in which case the send is silently dropped.
    pub fn submit(&self, prompt: String, ai_mode: bool) {
        let gateway = Arc::clone(&self.gateway);
        let tx = self.tx.clone();
        self.handle.spawn(async move {
            debug!(%prompt, ai_mode, "responder task started");
            let envelope = gateway.respond(&prompt, ai_mode).await;
            let _ = tx.send(envelope);
        });
    }
}
