// Author: dWallet Labs, Ltd.
// SPDX-License-Identifier: BSD-3-Clause-Clear

use serde::{Deserialize, Serialize};

use crate::encryption_key::{Ciphertext, EncryptionKey};

/// A completed, sealed vote awaiting delivery.
///
/// Created once per workflow run and immutable afterwards. `ciphertext`
/// and `key_id` are opaque decimal strings everywhere outside the
/// encryption module.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteSubmission {
    pub question_id: String,
    pub participant_id: String,
    pub agent_id: String,
    pub ciphertext: String,
    pub key_id: String,
    pub timestamp_ms: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub geo: Option<GeoPoint>,
}

impl VoteSubmission {
    /// Builds the submission for a sealed choice, binding the ciphertext
    /// to the key it was produced under.
    pub fn new(
        question_id: impl Into<String>,
        participant_id: impl Into<String>,
        agent_id: impl Into<String>,
        key: &EncryptionKey,
        ciphertext: &Ciphertext,
        timestamp_ms: i64,
    ) -> Self {
        VoteSubmission {
            question_id: question_id.into(),
            participant_id: participant_id.into(),
            agent_id: agent_id.into(),
            ciphertext: ciphertext.to_decimal(),
            key_id: key.key_id().to_string(),
            timestamp_ms,
            geo: None,
        }
    }

    pub fn with_geo(mut self, geo: GeoPoint) -> Self {
        self.geo = Some(geo);
        self
    }
}

/// Device location at capture time, when the operator allowed it.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

/// Server acknowledgement for a stored vote.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VoteReceipt {
    pub vote_id: String,
}
