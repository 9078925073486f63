use mhs_workflow::state_machine::{InboundStatus, OutboundStatus};
use proptest::prelude::*;
use std::time::Duration;

pub fn outbound_status_strategy() -> impl Strategy<Value = OutboundStatus> {
    prop_oneof![
        Just(OutboundStatus::Received),
        Just(OutboundStatus::Prepared),
        Just(OutboundStatus::PreparationFailed),
        Just(OutboundStatus::Ackd),
        Just(OutboundStatus::Nackd),
        Just(OutboundStatus::TransmissionFailed),
    ]
}

pub fn inbound_status_strategy() -> impl Strategy<Value = InboundStatus> {
    prop_oneof![
        Just(InboundStatus::Received),
        Just(InboundStatus::SuccessfullyProcessed),
        Just(InboundStatus::Failed),
    ]
}

/// Sequences of requested outbound transitions, valid or not
pub fn outbound_sequence_strategy() -> impl Strategy<Value = Vec<OutboundStatus>> {
    prop::collection::vec(outbound_status_strategy(), 1..8)
}

/// Retry budgets small enough to run quickly under paused time
pub fn retry_budget_strategy() -> impl Strategy<Value = (u32, Duration)> {
    (1u32..6, (1u64..2_000).prop_map(Duration::from_millis))
}

/// `(hours, minutes, seconds)` components of a retry interval
pub fn interval_components_strategy() -> impl Strategy<Value = (u64, u64, u64)> {
    (0u64..24, 0u64..60, 0u64..60)
}
