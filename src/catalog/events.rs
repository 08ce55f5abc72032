use serde::{Deserialize, Serialize};

/// Event name used on the underlying emitter.
pub const CHANGE_EVENT: &str = "catalog:changed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Hydrated,
    ArtworkAdded,
    ArtworkUpdated,
    ArtworkDeleted,
    FavoriteToggled,
    ListCreated,
    ListUpdated,
    ListDeleted,
    ArtworkLinked,
    ArtworkUnlinked,
    Reset,
}

/// Notification delivered to subscribers after a change is applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    /// Ids of the entities the operation was invoked on.
    pub ids: Vec<String>,
}

impl ChangeEvent {
    pub fn new<I, S>(kind: ChangeKind, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            kind,
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(feature = "emitter")]
pub(crate) use notifier::ChangeNotifier;

#[cfg(feature = "emitter")]
mod notifier {
    use std::sync::{Mutex, PoisonError};

    use event_emitter_rs::EventEmitter;
    use tracing::warn;

    use super::{ChangeEvent, CHANGE_EVENT};

    /// Fans change events out to subscribers through an `EventEmitter`.
    ///
    /// Listeners run on the emitter's own threads, so a callback may call
    /// back into the store without deadlocking.
    pub(crate) struct ChangeNotifier {
        emitter: Mutex<EventEmitter>,
    }

    impl ChangeNotifier {
        pub fn new() -> Self {
            Self {
                emitter: Mutex::new(EventEmitter::new()),
            }
        }

        pub fn subscribe<F>(&self, listener: F) -> String
        where
            F: Fn(ChangeEvent) + Send + Sync + 'static,
        {
            let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.on(CHANGE_EVENT, move |payload: String| {
                match serde_json::from_str::<ChangeEvent>(&payload) {
                    Ok(event) => listener(event),
                    Err(e) => warn!(error = %e, "dropping undecodable change event"),
                }
            })
        }

        pub fn unsubscribe(&self, id: &str) -> bool {
            let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.remove_listener(id).is_some()
        }

        pub fn notify(&self, event: &ChangeEvent) {
            let payload = match serde_json::to_string(event) {
                Ok(payload) => payload,
                Err(e) => {
                    warn!(error = %e, "failed to encode change event");
                    return;
                }
            };
            let mut emitter = self.emitter.lock().unwrap_or_else(PoisonError::into_inner);
            emitter.emit(CHANGE_EVENT, payload);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_kind_in_snake_case() {
        let event = ChangeEvent::new(ChangeKind::ArtworkLinked, ["a1", "l1"]);
        let json = serde_json::to_string(&event).unwrap();
        assert_eq!(json, r#"{"kind":"artwork_linked","ids":["a1","l1"]}"#);
    }

    #[cfg(feature = "emitter")]
    #[test]
    fn subscribers_receive_events() {
        use std::sync::mpsc::channel;
        use std::sync::Mutex;
        use std::time::Duration;

        let notifier = ChangeNotifier::new();
        let (tx, rx) = channel();
        let tx = Mutex::new(tx);
        let id = notifier.subscribe(move |event| {
            let _ = tx.lock().unwrap().send(event);
        });

        notifier.notify(&ChangeEvent::new(ChangeKind::ListCreated, ["l1"]));
        let received = rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(received.kind, ChangeKind::ListCreated);
        assert_eq!(received.ids, vec!["l1".to_string()]);

        assert!(notifier.unsubscribe(&id));
        assert!(!notifier.unsubscribe(&id));
    }
}
