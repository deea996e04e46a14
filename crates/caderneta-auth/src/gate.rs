use tokio::sync::watch;

use caderneta_data::Session;

/// Process-wide mirror of the current authenticated session. The gate
/// is initialized once at startup and updated by the auth commands;
/// consumers hold a watch subscription that is released when the
/// receiver goes out of scope.
pub struct SessionGate {
    tx: watch::Sender<Option<Session>>,
}

impl SessionGate {
    pub fn new(initial: Option<Session>) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx }
    }

    /// The session as currently known.
    pub fn current(&self) -> Option<Session> {
        self.tx.borrow().clone()
    }

    /// Subscribe to session changes.
    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.tx.subscribe()
    }

    /// Replace the current session and notify subscribers.
    pub fn set(&self, session: Option<Session>) {
        self.tx.send_replace(session);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_gate_tracks_session() {
        let gate = SessionGate::new(None);
        assert!(gate.current().is_none());

        let mut sub = gate.subscribe();
        assert!(!sub.has_changed().unwrap());

        gate.set(Some(Session {
            token: "tok".to_string(),
            user_id: 1,
            ..Default::default()
        }));
        assert!(sub.has_changed().unwrap());
        assert_eq!(
            sub.borrow_and_update().as_ref().map(|s| s.user_id),
            Some(1)
        );

        gate.set(None);
        assert!(gate.current().is_none());
    }

    #[tokio::test]
    async fn test_gate_outlives_dropped_subscription() {
        let gate = SessionGate::new(None);
        {
            let _sub = gate.subscribe();
        }
        gate.set(Some(Session::default()));
        assert!(gate.current().is_some());
    }
}
