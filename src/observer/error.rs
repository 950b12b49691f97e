use thiserror::Error;

use crate::database::store::StoreError;

/// Failures raised by a single observer
#[derive(Debug, Error)]
pub enum ObserverError {
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// A fan-out kept going after some recipients failed
    #[error("{failed} notification(s) failed, {delivered} delivered: {last_error}")]
    PartialDelivery {
        delivered: usize,
        failed: usize,
        last_error: String,
    },
}

impl ObserverError {
    /// Notifications that were written before or despite the failure
    pub fn delivered(&self) -> usize {
        match self {
            ObserverError::PartialDelivery { delivered, .. } => *delivered,
            ObserverError::Store(_) => 0,
        }
    }
}

/// Tally for a fan-out over many recipients
#[derive(Debug, Default)]
pub struct DeliveryTally {
    pub delivered: usize,
    pub failed: usize,
    pub last_error: Option<String>,
}

impl DeliveryTally {
    pub fn record<T>(&mut self, result: Result<T, StoreError>) {
        match result {
            Ok(_) => self.delivered += 1,
            Err(e) => {
                self.failed += 1;
                self.last_error = Some(e.to_string());
            }
        }
    }

    pub fn finish(self) -> Result<usize, ObserverError> {
        match self.last_error {
            None => Ok(self.delivered),
            Some(last_error) => Err(ObserverError::PartialDelivery {
                delivered: self.delivered,
                failed: self.failed,
                last_error,
            }),
        }
    }
}
