//! Reservation kinds, confirmation ids, and client request metadata.

use std::collections::HashSet;
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, INVALID_VALUE};
use crate::forms::FormType;
use crate::types::DbId;

/// Default confirmation-id prefix for podcast reservations.
pub const DEFAULT_PODCAST_PREFIX: &str = "POD";

/// Default confirmation-id prefix for service reservations.
pub const DEFAULT_SERVICE_PREFIX: &str = "SRV";

/// Maximum stored length of a client's `User-Agent` header.
pub const MAX_USER_AGENT_LENGTH: usize = 512;

/// Maximum number of services a single reservation may request.
pub const MAX_SERVICES_PER_RESERVATION: usize = 20;

/// `{PREFIX}-{YYYY}-{NNNNNN}` with at least six sequence digits.
pub const CONFIRMATION_ID_PATTERN: &str = r"^[A-Z0-9]{1,10}-[0-9]{4}-[0-9]{6,}$";

static CONFIRMATION_ID_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(CONFIRMATION_ID_PATTERN).expect("valid regex"));

static PREFIX_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Z0-9]{1,10}$").expect("valid regex"));

/// The two reservation variants. Stored in `reservations.kind`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReservationKind {
    Podcast,
    Service,
}

impl ReservationKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ReservationKind::Podcast => "podcast",
            ReservationKind::Service => "service",
        }
    }

    /// The form whose questions a reservation of this kind answers.
    pub fn form_type(self) -> FormType {
        match self {
            ReservationKind::Podcast => FormType::Podcast,
            ReservationKind::Service => FormType::Services,
        }
    }

    /// Entity name used in not-found errors.
    pub fn entity_name(self) -> &'static str {
        match self {
            ReservationKind::Podcast => "PodcastReservation",
            ReservationKind::Service => "ServiceReservation",
        }
    }
}

impl fmt::Display for ReservationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReservationKind {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "podcast" => Ok(ReservationKind::Podcast),
            "service" => Ok(ReservationKind::Service),
            other => Err(CoreError::invalid_field(
                INVALID_VALUE,
                "kind",
                format!("Invalid reservation kind '{other}'. Must be one of: podcast, service"),
            )),
        }
    }
}

// ---------------------------------------------------------------------------
// Confirmation ids
// ---------------------------------------------------------------------------

/// Render a confirmation id, e.g. `POD-2024-001234`.
///
/// `sequence` comes from a per-kind database sequence, so uniqueness holds
/// across years and restarts; the year is informational only.
pub fn format_confirmation_id(prefix: &str, year: i32, sequence: i64) -> String {
    format!("{prefix}-{year:04}-{sequence:06}")
}

/// Check a configured prefix: 1-10 uppercase letters or digits.
pub fn validate_confirmation_prefix(prefix: &str) -> Result<(), String> {
    if PREFIX_RE.is_match(prefix) {
        Ok(())
    } else {
        Err(format!(
            "Invalid confirmation prefix '{prefix}'. Use 1-10 uppercase letters or digits"
        ))
    }
}

/// Whether `value` has the shape of a confirmation id.
pub fn is_confirmation_id(value: &str) -> bool {
    CONFIRMATION_ID_RE.is_match(value)
}

// ---------------------------------------------------------------------------
// Service selection
// ---------------------------------------------------------------------------

/// Validate the services requested by a service reservation.
///
/// The list must be non-empty; duplicates are dropped keeping the first
/// occurrence so section order follows the client's selection order.
pub fn normalize_service_selection(ids: &[DbId]) -> Result<Vec<DbId>, CoreError> {
    let mut seen = HashSet::with_capacity(ids.len());
    let unique: Vec<DbId> = ids.iter().copied().filter(|id| seen.insert(*id)).collect();

    if unique.is_empty() {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "service_ids",
            "At least one service must be selected",
        ));
    }
    if unique.len() > MAX_SERVICES_PER_RESERVATION {
        return Err(CoreError::invalid_field(
            INVALID_VALUE,
            "service_ids",
            format!("At most {MAX_SERVICES_PER_RESERVATION} services can be requested at once"),
        ));
    }
    Ok(unique)
}

// ---------------------------------------------------------------------------
// Client request metadata
// ---------------------------------------------------------------------------

/// Pick the originating client address from an `X-Forwarded-For` value.
///
/// Only the first hop is considered, and it must parse as an IP address.
pub fn client_ip_from_forwarded(header: &str) -> Option<String> {
    header
        .split(',')
        .next()
        .map(str::trim)
        .and_then(|ip| ip.parse::<IpAddr>().ok())
        .map(|ip| ip.to_string())
}

/// Truncate a user agent to the stored maximum, on a char boundary.
pub fn truncate_user_agent(user_agent: &str) -> String {
    user_agent.chars().take(MAX_USER_AGENT_LENGTH).collect()
}
