//! Reservation status state machine.
//!
//! Defines the reservation statuses, the allowed transition table, and the
//! validation helpers used by the transition engine and the repository layer.
//! Status values are stored as lowercase strings in the `reservations.status`
//! and `reservation_status_history` columns.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, INVALID_VALUE};

/// Lifecycle state of a reservation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationStatus {
    /// Initial status of every submitted reservation.
    Pending,
    /// An operator accepted the reservation.
    Confirmed,
    /// Terminal: withdrawn before completion.
    Cancelled,
    /// Terminal: the recording or service was delivered.
    Completed,
}

/// All statuses, in lifecycle order.
pub const ALL_STATUSES: [ReservationStatus; 4] = [
    ReservationStatus::Pending,
    ReservationStatus::Confirmed,
    ReservationStatus::Cancelled,
    ReservationStatus::Completed,
];

impl ReservationStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationStatus::Pending => "pending",
            ReservationStatus::Confirmed => "confirmed",
            ReservationStatus::Cancelled => "cancelled",
            ReservationStatus::Completed => "completed",
        }
    }

    /// Returns the set of statuses this status may transition to.
    ///
    /// Transition rules:
    /// - `pending`   -> `confirmed`, `cancelled`
    /// - `confirmed` -> `completed`, `cancelled`
    /// - `cancelled` and `completed` are terminal
    pub fn valid_transitions(self) -> &'static [ReservationStatus] {
        match self {
            ReservationStatus::Pending => {
                &[ReservationStatus::Confirmed, ReservationStatus::Cancelled]
            }
            ReservationStatus::Confirmed => {
                &[ReservationStatus::Completed, ReservationStatus::Cancelled]
            }
            ReservationStatus::Cancelled | ReservationStatus::Completed => &[],
        }
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        self.valid_transitions().contains(&next)
    }

    pub fn is_terminal(self) -> bool {
        self.valid_transitions().is_empty()
    }

    /// Analytics event type recorded when a reservation enters this status.
    pub fn event_type(self) -> &'static str {
        match self {
            ReservationStatus::Pending => crate::analytics::EVENT_RESERVATION_SUBMITTED,
            ReservationStatus::Confirmed => crate::analytics::EVENT_RESERVATION_CONFIRMED,
            ReservationStatus::Cancelled => crate::analytics::EVENT_RESERVATION_CANCELLED,
            ReservationStatus::Completed => crate::analytics::EVENT_RESERVATION_COMPLETED,
        }
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ALL_STATUSES
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                CoreError::invalid_field(
                    INVALID_VALUE,
                    "status",
                    format!(
                        "Invalid reservation status '{s}'. Must be one of: pending, confirmed, cancelled, completed"
                    ),
                )
            })
    }
}

/// Validate that a transition from `current` to `next` is in the allowed table.
///
/// A no-op transition to the same status is rejected like any other
/// transition outside the table.
pub fn validate_transition(
    current: ReservationStatus,
    next: ReservationStatus,
) -> Result<(), CoreError> {
    if current.can_transition_to(next) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition {
            from: current,
            to: next,
        })
    }
}

/// Check a caller-supplied precondition against the stored status.
///
/// Callers that rendered a reservation in one status can pass that status as
/// `expected`; if someone else moved it in the meantime the request is
/// rejected as a conflict instead of being applied to a state the caller
/// never saw.
pub fn check_expected_status(
    current: ReservationStatus,
    expected: Option<ReservationStatus>,
) -> Result<(), CoreError> {
    match expected {
        Some(expected) if expected != current => Err(CoreError::Conflict(format!(
            "Reservation status is '{current}', expected '{expected}'. Refresh and retry."
        ))),
        _ => Ok(()),
    }
}
