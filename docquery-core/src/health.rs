//! Backend reachability.

use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::backend::Backend;
use crate::types::ConnectionStatus;

/// One-shot reachability probe with an observable status.
///
/// Probing is independent of the busy gate and is never retried or repeated
/// on its own.
pub struct HealthMonitor {
    backend: Arc<dyn Backend>,
    timeout: Duration,
    status: watch::Sender<ConnectionStatus>,
}

impl HealthMonitor {
    pub fn new(backend: Arc<dyn Backend>, timeout: Duration) -> Self {
        let (status, _) = watch::channel(ConnectionStatus::Checking);
        Self {
            backend,
            timeout,
            status,
        }
    }

    pub fn status(&self) -> ConnectionStatus {
        *self.status.borrow()
    }

    pub fn subscribe(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.subscribe()
    }

    /// Probe the backend root once and record the result.
    pub async fn probe(&self) -> ConnectionStatus {
        self.status.send_replace(ConnectionStatus::Checking);
        let status = match self.backend.probe(self.timeout).await {
            Ok(()) => {
                info!(base_url = self.backend.base_url(), "Backend reachable");
                ConnectionStatus::Connected
            }
            Err(err) => {
                warn!(base_url = self.backend.base_url(), error = %err, "Backend unreachable");
                ConnectionStatus::Disconnected
            }
        };
        self.status.send_replace(status);
        status
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockBackend;

    #[tokio::test]
    async fn test_probe_transitions() {
        let mock = Arc::new(MockBackend::new());
        let monitor = HealthMonitor::new(mock.clone(), Duration::from_secs(5));
        assert_eq!(monitor.status(), ConnectionStatus::Checking);

        assert_eq!(monitor.probe().await, ConnectionStatus::Connected);
        assert_eq!(monitor.status(), ConnectionStatus::Connected);

        mock.set_reachable(false);
        assert_eq!(monitor.probe().await, ConnectionStatus::Disconnected);
        assert_eq!(mock.call_count(), 2);
    }
}
