//! Mock wireless link.
//!
//! The link and its handle share state behind a mutex, so a test can make
//! the access point disappear while the loop is running.

use crate::{HardwareError, Result, traits::WirelessLink, types::Credentials};
use std::sync::{Arc, Mutex, MutexGuard};
use taplink_core::LinkState;

#[derive(Debug)]
struct LinkShared {
    reachable: bool,
    polls_to_connect: u32,
    polls_remaining: u32,
    associating: bool,
    connected: bool,
    connect_calls: usize,
    status_calls: usize,
    last_ssid: Option<String>,
    connect_fault: Option<String>,
    status_fault: Option<String>,
}

impl Default for LinkShared {
    fn default() -> Self {
        Self {
            reachable: true,
            polls_to_connect: 0,
            polls_remaining: 0,
            associating: false,
            connected: false,
            connect_calls: 0,
            status_calls: 0,
            last_ssid: None,
            connect_fault: None,
            status_fault: None,
        }
    }
}

fn lock(shared: &Mutex<LinkShared>) -> MutexGuard<'_, LinkShared> {
    // A panicking test thread must not wedge every later assertion.
    shared.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// Simulated wireless link.
///
/// After `connect`, `status` reports `Connecting` for the configured number
/// of polls and then `Connected`, as long as the access point is reachable.
/// An unreachable access point keeps the link in `Connecting` forever.
///
/// # Examples
///
/// ```
/// use taplink_core::LinkState;
/// use taplink_hardware::mock::MockLink;
/// use taplink_hardware::traits::WirelessLink;
/// use taplink_hardware::types::Credentials;
///
/// #[tokio::main(flavor = "current_thread")]
/// async fn main() -> taplink_hardware::Result<()> {
///     let (mut link, handle) = MockLink::new();
///     handle.set_polls_to_connect(1);
///
///     link.connect(&Credentials::new("shop-floor", "secret")).await?;
///     assert_eq!(link.status().await?, LinkState::Connecting);
///     assert_eq!(link.status().await?, LinkState::Connected);
///
///     handle.drop_link();
///     assert_eq!(link.status().await?, LinkState::Disconnected);
///     Ok(())
/// }
/// ```
#[derive(Debug)]
pub struct MockLink {
    shared: Arc<Mutex<LinkShared>>,
}

impl MockLink {
    /// Create a reachable link that connects on the first status poll.
    pub fn new() -> (Self, MockLinkHandle) {
        let shared = Arc::new(Mutex::new(LinkShared::default()));
        (
            Self {
                shared: Arc::clone(&shared),
            },
            MockLinkHandle { shared },
        )
    }

    /// Create a link whose access point never answers.
    pub fn unreachable() -> (Self, MockLinkHandle) {
        let (link, handle) = Self::new();
        handle.set_reachable(false);
        (link, handle)
    }
}

impl WirelessLink for MockLink {
    async fn connect(&mut self, credentials: &Credentials) -> Result<()> {
        let mut state = lock(&self.shared);
        state.connect_calls += 1;
        state.last_ssid = Some(credentials.ssid.clone());
        if let Some(message) = &state.connect_fault {
            return Err(HardwareError::link(message.clone()));
        }
        state.connected = false;
        state.associating = true;
        state.polls_remaining = state.polls_to_connect;
        Ok(())
    }

    async fn status(&mut self) -> Result<LinkState> {
        let mut state = lock(&self.shared);
        state.status_calls += 1;
        if let Some(message) = &state.status_fault {
            return Err(HardwareError::link(message.clone()));
        }

        if state.connected {
            return Ok(LinkState::Connected);
        }
        if !state.associating {
            return Ok(LinkState::Disconnected);
        }
        if !state.reachable {
            return Ok(LinkState::Connecting);
        }
        if state.polls_remaining > 0 {
            state.polls_remaining -= 1;
            return Ok(LinkState::Connecting);
        }

        state.associating = false;
        state.connected = true;
        Ok(LinkState::Connected)
    }

    async fn disconnect(&mut self) -> Result<()> {
        let mut state = lock(&self.shared);
        state.associating = false;
        state.connected = false;
        Ok(())
    }
}

/// Handle for steering a [`MockLink`] from a test.
#[derive(Debug, Clone)]
pub struct MockLinkHandle {
    shared: Arc<Mutex<LinkShared>>,
}

impl MockLinkHandle {
    /// Make the access point reachable or not for future associations.
    pub fn set_reachable(&self, reachable: bool) {
        lock(&self.shared).reachable = reachable;
    }

    /// Number of `Connecting` polls before an association completes.
    pub fn set_polls_to_connect(&self, polls: u32) {
        lock(&self.shared).polls_to_connect = polls;
    }

    /// Simulate the access point going away.
    ///
    /// The current association is lost and new ones hang until
    /// [`set_reachable(true)`](Self::set_reachable) is called.
    pub fn drop_link(&self) {
        let mut state = lock(&self.shared);
        state.connected = false;
        state.associating = false;
        state.reachable = false;
    }

    /// Make every `connect` call fail with a link error.
    pub fn fail_connect(&self, message: impl Into<String>) {
        lock(&self.shared).connect_fault = Some(message.into());
    }

    /// Make every `status` query fail with a link error.
    pub fn fail_status(&self, message: impl Into<String>) {
        lock(&self.shared).status_fault = Some(message.into());
    }

    /// Clear faults set by [`fail_connect`](Self::fail_connect) and
    /// [`fail_status`](Self::fail_status).
    pub fn clear_faults(&self) {
        let mut state = lock(&self.shared);
        state.connect_fault = None;
        state.status_fault = None;
    }

    /// Whether the link currently reports `Connected`.
    pub fn is_connected(&self) -> bool {
        lock(&self.shared).connected
    }

    /// Number of `connect` calls made so far.
    pub fn connect_calls(&self) -> usize {
        lock(&self.shared).connect_calls
    }

    /// Number of `status` calls made so far.
    pub fn status_calls(&self) -> usize {
        lock(&self.shared).status_calls
    }

    /// SSID passed to the last `connect` call.
    pub fn last_ssid(&self) -> Option<String> {
        lock(&self.shared).last_ssid.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn creds() -> Credentials {
        Credentials::new("shop-floor", "secret")
    }

    #[tokio::test]
    async fn test_status_before_connect() {
        let (mut link, handle) = MockLink::new();
        assert_eq!(link.status().await.unwrap(), LinkState::Disconnected);
        assert_eq!(handle.connect_calls(), 0);
    }

    #[tokio::test]
    async fn test_connects_after_configured_polls() {
        let (mut link, handle) = MockLink::new();
        handle.set_polls_to_connect(2);

        link.connect(&creds()).await.unwrap();
        assert_eq!(link.status().await.unwrap(), LinkState::Connecting);
        assert_eq!(link.status().await.unwrap(), LinkState::Connecting);
        assert_eq!(link.status().await.unwrap(), LinkState::Connected);
        assert!(handle.is_connected());
        assert_eq!(handle.status_calls(), 3);
        assert_eq!(handle.last_ssid().as_deref(), Some("shop-floor"));
    }

    #[tokio::test]
    async fn test_unreachable_stays_connecting() {
        let (mut link, handle) = MockLink::unreachable();

        link.connect(&creds()).await.unwrap();
        for _ in 0..10 {
            assert_eq!(link.status().await.unwrap(), LinkState::Connecting);
        }
        assert!(!handle.is_connected());
    }

    #[tokio::test]
    async fn test_drop_and_recover() {
        let (mut link, handle) = MockLink::new();
        link.connect(&creds()).await.unwrap();
        assert_eq!(link.status().await.unwrap(), LinkState::Connected);

        handle.drop_link();
        assert_eq!(link.status().await.unwrap(), LinkState::Disconnected);

        link.connect(&creds()).await.unwrap();
        assert_eq!(link.status().await.unwrap(), LinkState::Connecting);

        handle.set_reachable(true);
        assert_eq!(link.status().await.unwrap(), LinkState::Connected);
        assert_eq!(handle.connect_calls(), 2);
    }

    #[tokio::test]
    async fn test_injected_faults() {
        let (mut link, handle) = MockLink::new();
        handle.fail_connect("association rejected");

        let error = link.connect(&creds()).await.unwrap_err();
        assert!(matches!(error, HardwareError::Link { .. }));
        assert_eq!(handle.connect_calls(), 1);

        handle.fail_status("radio not responding");
        assert!(link.status().await.is_err());

        handle.clear_faults();
        link.connect(&creds()).await.unwrap();
        assert_eq!(link.status().await.unwrap(), LinkState::Connected);
    }

    #[tokio::test]
    async fn test_disconnect() {
        let (mut link, handle) = MockLink::new();
        link.connect(&creds()).await.unwrap();
        link.status().await.unwrap();

        link.disconnect().await.unwrap();
        assert!(!handle.is_connected());
        assert_eq!(link.status().await.unwrap(), LinkState::Disconnected);
    }
}
