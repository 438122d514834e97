use tokio::sync::mpsc;

/// Page-navigation capability of the hosting context.
///
/// The request pipeline uses it to send the user to the login entry point
/// after an authentication failure.
pub trait Navigator: Send + Sync {
    /// Whether automatic navigation is possible at all
    fn can_navigate(&self) -> bool;

    fn navigate(&self, path: &str);
}

/// Context with no pages to navigate (CLI, background jobs)
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadlessNavigator;

impl Navigator for HeadlessNavigator {
    fn can_navigate(&self) -> bool {
        false
    }

    fn navigate(&self, path: &str) {
        tracing::debug!("Ignoring navigation to '{}' in headless context", path);
    }
}

/// Publishes navigations on a channel for an application shell to act on
#[derive(Debug, Clone)]
pub struct ChannelNavigator {
    tx: mpsc::UnboundedSender<String>,
}

impl ChannelNavigator {
    pub fn new() -> (Self, mpsc::UnboundedReceiver<String>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Navigator for ChannelNavigator {
    fn can_navigate(&self) -> bool {
        !self.tx.is_closed()
    }

    fn navigate(&self, path: &str) {
        if self.tx.send(path.to_string()).is_err() {
            tracing::warn!("Navigation to '{}' dropped: no listener", path);
        }
    }
}
