//! Mock indicator that records every signal it is asked to show.

use crate::{HardwareError, Result, traits::Indicator, types::IndicatorSignal};
use std::sync::{Arc, Mutex};

/// Recording indicator.
#[derive(Debug)]
pub struct MockIndicator {
    history: Arc<Mutex<Vec<IndicatorSignal>>>,
    failing: bool,
}

impl MockIndicator {
    /// Create a new recording indicator and its handle.
    pub fn new() -> (Self, MockIndicatorHandle) {
        let history = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                history: Arc::clone(&history),
                failing: false,
            },
            MockIndicatorHandle { history },
        )
    }

    /// Create an indicator whose output is broken.
    ///
    /// Every `show` fails, which lets tests check that indicator errors
    /// never stop the loop.
    pub fn failing() -> (Self, MockIndicatorHandle) {
        let (mut indicator, handle) = Self::new();
        indicator.failing = true;
        (indicator, handle)
    }
}

impl Indicator for MockIndicator {
    async fn show(&mut self, signal: IndicatorSignal) -> Result<()> {
        if self.failing {
            return Err(HardwareError::unsupported("indicator output"));
        }

        self.history
            .lock()
            .map_err(|_| HardwareError::other("indicator history poisoned"))?
            .push(signal);
        Ok(())
    }
}

/// Read access to a [`MockIndicator`]'s history.
#[derive(Debug, Clone)]
pub struct MockIndicatorHandle {
    history: Arc<Mutex<Vec<IndicatorSignal>>>,
}

impl MockIndicatorHandle {
    /// All signals shown so far, oldest first.
    pub fn history(&self) -> Vec<IndicatorSignal> {
        self.history
            .lock()
            .map(|history| history.clone())
            .unwrap_or_default()
    }

    /// The most recent signal, if any.
    pub fn last(&self) -> Option<IndicatorSignal> {
        self.history().last().copied()
    }

    /// Forget the recorded history.
    pub fn clear(&self) {
        if let Ok(mut history) = self.history.lock() {
            history.clear();
        }
    }
}
