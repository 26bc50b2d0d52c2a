//! Scripted test doubles for the wallet boundary.

use std::{collections::VecDeque, sync::Mutex};

use crate::{
    error::LaunchpadError,
    lifecycle::{WalletGateway, WriteRequest},
};

/// Deterministic well-formed transaction hash for tests.
pub fn hash_str(seed: u8) -> String { format!("0x{:064x}", seed) }

/// Wallet double replaying scripted submission results and recording every
/// request it receives, in order.
#[derive(Debug, Default)]
pub struct MockWallet {
    responses: Mutex<VecDeque<Result<String, LaunchpadError>>>,
    requests: Mutex<Vec<WriteRequest>>,
}

impl MockWallet {
    pub fn new() -> Self { Self::default() }

    /// Queues the result of the next submission.
    pub fn push_response(&self, response: Result<String, LaunchpadError>) {
        self.responses.lock().unwrap().push_back(response);
    }

    /// Every request submitted so far, in submission order.
    pub fn requests(&self) -> Vec<WriteRequest> { self.requests.lock().unwrap().clone() }
}

impl WalletGateway for MockWallet {
    async fn submit(&self, request: WriteRequest) -> Result<String, LaunchpadError> {
        self.requests.lock().unwrap().push(request);
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(LaunchpadError::InvalidRequest("no scripted response".to_string())))
    }
}
