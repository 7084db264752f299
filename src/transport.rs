// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use async_trait::async_trait;

use crate::error::TransportError;
use crate::submission::{VoteReceipt, VoteSubmission};

/// Network seam for vote delivery.
///
/// Implementations wrap whatever HTTP stack the host application uses.
/// `Rejected` is reserved for validated refusals of the payload itself;
/// anything the network layer swallowed must surface as `Connectivity`
/// so the controller can queue and retry it.
#[async_trait]
pub trait VoteTransport: Send + Sync {
    async fn send(
        &self,
        submission: &VoteSubmission,
    ) -> std::result::Result<VoteReceipt, TransportError>;
}
