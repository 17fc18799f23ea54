use tokio::sync::{mpsc, watch};

use crate::controller::{Completion, WidgetController};
use crate::transcript::TranscriptEntry;

/// Input to the widget loop, as a view layer would produce it
#[derive(Debug)]
pub enum WidgetEvent {
    Open,
    Close,
    Toggle,
    SetDraft(String),
    Submit,
    ReplyReady(Completion),
    Mount,
    Unmount,
    Shutdown,
}

/// Read-only view of the widget published after every event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WidgetSnapshot {
    pub mounted: bool,
    pub is_open: bool,
    pub is_busy: bool,
    pub draft: String,
    pub entries: Vec<TranscriptEntry>,
    /// Entries appended over the session's lifetime, evicted ones included
    pub appended: usize,
}

impl WidgetSnapshot {
    fn capture(controller: &WidgetController) -> Self {
        match controller.session() {
            Some(session) => Self {
                mounted: true,
                is_open: session.is_open(),
                is_busy: session.is_busy(),
                draft: session.draft().to_string(),
                entries: session.transcript().iter().cloned().collect(),
                appended: session.transcript().total_appended(),
            },
            None => Self::default(),
        }
    }

    pub fn last_entry(&self) -> Option<&TranscriptEntry> {
        self.entries.last()
    }
}

/// Event loop that owns a [`WidgetController`]
///
/// Client calls run on spawned tasks and come back as
/// [`WidgetEvent::ReplyReady`], so the loop keeps handling open/close and
/// draft edits while a reply is outstanding.
pub struct WidgetRuntime {
    controller: WidgetController,
    events_rx: mpsc::UnboundedReceiver<WidgetEvent>,
    events_tx: mpsc::WeakUnboundedSender<WidgetEvent>,
    snapshot_tx: watch::Sender<WidgetSnapshot>,
}

/// Cloneable handle for sending events and observing snapshots
#[derive(Clone)]
pub struct WidgetHandle {
    events_tx: mpsc::UnboundedSender<WidgetEvent>,
    snapshots: watch::Receiver<WidgetSnapshot>,
}

impl WidgetRuntime {
    pub fn new(controller: WidgetController) -> (Self, WidgetHandle) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let (snapshot_tx, snapshots) = watch::channel(WidgetSnapshot::capture(&controller));

        let runtime = Self { controller, events_rx, events_tx: events_tx.downgrade(), snapshot_tx };
        (runtime, WidgetHandle { events_tx, snapshots })
    }

    /// Process events until `Shutdown` or until every handle is dropped and
    /// no reply is outstanding. Returns the controller for inspection.
    pub async fn run(mut self) -> WidgetController {
        while let Some(event) = self.events_rx.recv().await {
            if !self.handle_event(event) {
                break;
            }
            self.publish();
        }
        tracing::debug!("widget runtime stopped");
        self.controller
    }

    fn handle_event(&mut self, event: WidgetEvent) -> bool {
        match event {
            WidgetEvent::Open => self.controller.open(),
            WidgetEvent::Close => self.controller.close(),
            WidgetEvent::Toggle => {
                self.controller.toggle();
            }
            WidgetEvent::SetDraft(text) => self.controller.set_draft(text),
            WidgetEvent::Submit => self.spawn_submit(),
            WidgetEvent::ReplyReady(completion) => {
                self.controller.apply(completion);
            }
            WidgetEvent::Mount => self.controller.mount(),
            WidgetEvent::Unmount => self.controller.unmount(),
            WidgetEvent::Shutdown => return false,
        }
        true
    }

    fn spawn_submit(&mut self) {
        // No live sender means the reply could never come back; leave the session untouched.
        let Some(tx) = self.events_tx.upgrade() else {
            tracing::debug!("submit skipped: widget runtime is shutting down");
            return;
        };

        let pending = match self.controller.submit() {
            Ok(pending) => pending,
            Err(rejection) => {
                tracing::debug!(reason = %rejection, "submit rejected");
                return;
            }
        };
        let client = self.controller.client();
        tokio::spawn(async move {
            let completion = pending.dispatch(client.as_ref()).await;
            let _ = tx.send(WidgetEvent::ReplyReady(completion));
        });
    }

    fn publish(&self) {
        self.snapshot_tx.send_replace(WidgetSnapshot::capture(&self.controller));
    }
}

impl WidgetHandle {
    /// Queue an event; false once the runtime has stopped
    pub fn send(&self, event: WidgetEvent) -> bool {
        self.events_tx.send(event).is_ok()
    }

    pub fn open(&self) -> bool {
        self.send(WidgetEvent::Open)
    }

    pub fn close(&self) -> bool {
        self.send(WidgetEvent::Close)
    }

    pub fn toggle(&self) -> bool {
        self.send(WidgetEvent::Toggle)
    }

    pub fn set_draft(&self, text: impl Into<String>) -> bool {
        self.send(WidgetEvent::SetDraft(text.into()))
    }

    pub fn submit(&self) -> bool {
        self.send(WidgetEvent::Submit)
    }

    /// Set the draft and submit it
    pub fn say(&self, text: impl Into<String>) -> bool {
        self.set_draft(text) && self.submit()
    }

    pub fn mount(&self) -> bool {
        self.send(WidgetEvent::Mount)
    }

    pub fn unmount(&self) -> bool {
        self.send(WidgetEvent::Unmount)
    }

    pub fn shutdown(&self) -> bool {
        self.send(WidgetEvent::Shutdown)
    }

    pub fn snapshot(&self) -> WidgetSnapshot {
        self.snapshots.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<WidgetSnapshot> {
        self.snapshots.clone()
    }

    /// Wait for the first snapshot matching `predicate`; `None` if the runtime stops first
    pub async fn wait_for(&mut self, predicate: impl FnMut(&WidgetSnapshot) -> bool) -> Option<WidgetSnapshot> {
        self.snapshots.wait_for(predicate).await.ok().map(|snapshot| snapshot.clone())
    }
}
