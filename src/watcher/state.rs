/// Lifecycle of a [`WatchDriver`](super::WatchDriver).
///
/// `Idle -> Subscribed -> Draining -> Closed`, each transition taken once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchState {
    Idle,
    Subscribed,
    Draining,
    Closed,
}

impl WatchState {
    pub fn is_closed(self) -> bool {
        self == WatchState::Closed
    }
}

impl std::fmt::Display for WatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            WatchState::Idle => "idle",
            WatchState::Subscribed => "subscribed",
            WatchState::Draining => "draining",
            WatchState::Closed => "closed",
        };
        f.write_str(name)
    }
}
