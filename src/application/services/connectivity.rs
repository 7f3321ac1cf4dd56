use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectivityState {
    Offline,
    Online,
}

impl ConnectivityState {
    pub fn from_reachable(reachable: bool) -> Self {
        if reachable {
            ConnectivityState::Online
        } else {
            ConnectivityState::Offline
        }
    }

    pub fn is_online(self) -> bool {
        matches!(self, ConnectivityState::Online)
    }
}

/// プラットフォームから届く到達性の変化
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectivityEvent {
    Online,
    Offline,
}

/// `Offline → Online` の遷移ごとに 1 回だけ発火する
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CameOnline;

pub struct ConnectivityMonitor {
    state: watch::Sender<ConnectivityState>,
    came_online: broadcast::Sender<CameOnline>,
}

impl ConnectivityMonitor {
    /// 起動時点の到達性で初期化する
    pub fn new(initial: ConnectivityState) -> Self {
        let (state, _) = watch::channel(initial);
        let (came_online, _) = broadcast::channel(16);
        Self { state, came_online }
    }

    pub fn state(&self) -> ConnectivityState {
        *self.state.borrow()
    }

    pub fn is_online(&self) -> bool {
        self.state().is_online()
    }

    pub fn watch(&self) -> watch::Receiver<ConnectivityState> {
        self.state.subscribe()
    }

    pub fn subscribe_came_online(&self) -> broadcast::Receiver<CameOnline> {
        self.came_online.subscribe()
    }

    pub fn handle_event(&self, event: ConnectivityEvent) {
        let next = match event {
            ConnectivityEvent::Online => ConnectivityState::Online,
            ConnectivityEvent::Offline => ConnectivityState::Offline,
        };
        let previous = self.state.send_replace(next);
        if previous == next {
            return;
        }

        tracing::info!(
            target: "offline::connectivity",
            from = ?previous,
            to = ?next,
            "connectivity changed"
        );
        if next == ConnectivityState::Online {
            let _ = self.came_online.send(CameOnline);
        }
    }

    /// イベントストリームを購読し、終了するまで状態へ反映する
    pub fn attach<S>(self: &Arc<Self>, events: S) -> JoinHandle<()>
    where
        S: Stream<Item = ConnectivityEvent> + Send + 'static,
    {
        let monitor = Arc::clone(self);
        tokio::spawn(async move {
            let mut events = Box::pin(events);
            while let Some(event) = events.next().await {
                monitor.handle_event(event);
            }
            tracing::debug!(target: "offline::connectivity", "connectivity event stream ended");
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;
    use tokio::sync::broadcast::error::TryRecvError;

    #[test]
    fn initial_state_is_seeded() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
        assert!(!monitor.is_online());
        assert_eq!(
            ConnectivityState::from_reachable(true),
            ConnectivityState::Online
        );
    }

    #[test]
    fn came_online_fires_once_per_transition() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Offline);
        let mut came_online = monitor.subscribe_came_online();

        monitor.handle_event(ConnectivityEvent::Online);
        monitor.handle_event(ConnectivityEvent::Online);

        assert_eq!(came_online.try_recv().unwrap(), CameOnline);
        assert!(matches!(came_online.try_recv(), Err(TryRecvError::Empty)));

        monitor.handle_event(ConnectivityEvent::Offline);
        monitor.handle_event(ConnectivityEvent::Online);
        assert_eq!(came_online.try_recv().unwrap(), CameOnline);
    }

    #[test]
    fn starting_online_does_not_fire() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        let mut came_online = monitor.subscribe_came_online();
        monitor.handle_event(ConnectivityEvent::Online);
        assert!(matches!(came_online.try_recv(), Err(TryRecvError::Empty)));
    }

    #[tokio::test]
    async fn watch_observes_state_changes() {
        let monitor = ConnectivityMonitor::new(ConnectivityState::Online);
        let mut watcher = monitor.watch();

        monitor.handle_event(ConnectivityEvent::Offline);

        watcher.changed().await.unwrap();
        assert_eq!(*watcher.borrow(), ConnectivityState::Offline);
    }

    #[tokio::test]
    async fn attached_stream_drives_transitions() {
        let monitor = Arc::new(ConnectivityMonitor::new(ConnectivityState::Offline));
        let mut came_online = monitor.subscribe_came_online();

        let events = stream::iter(vec![
            ConnectivityEvent::Online,
            ConnectivityEvent::Offline,
            ConnectivityEvent::Online,
        ]);
        monitor.attach(events).await.unwrap();

        assert!(monitor.is_online());
        assert!(came_online.try_recv().is_ok());
        assert!(came_online.try_recv().is_ok());
        assert!(came_online.try_recv().is_err());
    }
}
