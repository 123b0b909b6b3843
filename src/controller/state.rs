use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::api::ApiError;
use crate::domain::{GeoPoint, ParkingCandidate, RoutePath};

/// Identifies one outbound request. Only the ticket the current phase is
/// waiting on may resolve it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticket {
    pub(crate) generation: u64,
}

/// What happens to map taps once an origin is confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetapPolicy {
    /// A new tap proposes a new origin; confirming it clears candidates and route
    #[default]
    Reset,
    /// Taps after the first confirmed origin are dropped
    Ignore,
}

/// Interaction state of the map screen.
///
/// Each variant owns exactly the data visible in it, so e.g. a detail view
/// without a selected candidate cannot be represented.
#[derive(Debug, Clone, PartialEq)]
pub enum Phase {
    Idle,
    PendingConfirmation {
        proposed: GeoPoint,
        /// Phase restored on cancel; never itself `PendingConfirmation`
        prior: Box<Phase>,
    },
    OriginConfirmed {
        origin: GeoPoint,
        ticket: Ticket,
    },
    CandidatesLoaded {
        origin: GeoPoint,
        candidates: Vec<ParkingCandidate>,
    },
    SpotSelected {
        origin: GeoPoint,
        candidates: Vec<ParkingCandidate>,
        selected: ParkingCandidate,
    },
    RouteRequested {
        origin: GeoPoint,
        candidates: Vec<ParkingCandidate>,
        selected: ParkingCandidate,
        prior_path: Option<RoutePath>,
        ticket: Ticket,
    },
    RouteReady {
        origin: GeoPoint,
        candidates: Vec<ParkingCandidate>,
        selected: ParkingCandidate,
        path: RoutePath,
    },
}

impl Phase {
    pub fn name(&self) -> &'static str {
        match self {
            Phase::Idle => "idle",
            Phase::PendingConfirmation { .. } => "pending confirmation",
            Phase::OriginConfirmed { .. } => "origin confirmed",
            Phase::CandidatesLoaded { .. } => "candidates loaded",
            Phase::SpotSelected { .. } => "spot selected",
            Phase::RouteRequested { .. } => "route requested",
            Phase::RouteReady { .. } => "route ready",
        }
    }

    /// The confirmed origin, looking through a pending re-tap
    pub fn origin(&self) -> Option<GeoPoint> {
        match self {
            Phase::Idle => None,
            Phase::PendingConfirmation { prior, .. } => prior.origin(),
            Phase::OriginConfirmed { origin, .. }
            | Phase::CandidatesLoaded { origin, .. }
            | Phase::SpotSelected { origin, .. }
            | Phase::RouteRequested { origin, .. }
            | Phase::RouteReady { origin, .. } => Some(*origin),
        }
    }

    pub fn candidates(&self) -> &[ParkingCandidate] {
        match self {
            Phase::Idle | Phase::OriginConfirmed { .. } => &[],
            Phase::PendingConfirmation { prior, .. } => prior.candidates(),
            Phase::CandidatesLoaded { candidates, .. }
            | Phase::SpotSelected { candidates, .. }
            | Phase::RouteRequested { candidates, .. }
            | Phase::RouteReady { candidates, .. } => candidates,
        }
    }

    pub fn selected(&self) -> Option<&ParkingCandidate> {
        match self {
            Phase::PendingConfirmation { prior, .. } => prior.selected(),
            Phase::SpotSelected { selected, .. }
            | Phase::RouteRequested { selected, .. }
            | Phase::RouteReady { selected, .. } => Some(selected),
            _ => None,
        }
    }

    /// The path currently drawn, including one kept while a new route loads
    pub fn route(&self) -> Option<&RoutePath> {
        match self {
            Phase::PendingConfirmation { prior, .. } => prior.route(),
            Phase::RouteRequested { prior_path, .. } => prior_path.as_ref(),
            Phase::RouteReady { path, .. } => Some(path),
            _ => None,
        }
    }

    pub(crate) fn search_ticket(&self) -> Option<Ticket> {
        match self {
            Phase::OriginConfirmed { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }

    pub(crate) fn route_ticket(&self) -> Option<Ticket> {
        match self {
            Phase::RouteRequested { ticket, .. } => Some(*ticket),
            _ => None,
        }
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A gesture arrived out of order
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SelectionError {
    #[error("no origin selected; tap the map first")]
    NoOrigin,
    #[error("no tapped location is waiting for confirmation")]
    NoPendingOrigin,
    #[error("confirm or cancel the tapped location first")]
    ConfirmationPending,
    #[error("parking spots are still loading")]
    SearchInFlight,
    #[error("no parking spot selected")]
    NoDestination,
    #[error("unknown parking spot: {0}")]
    UnknownCandidate(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeKind {
    Network,
    Status,
    Malformed,
    Selection,
}

/// A dismissible, user-visible error message
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
}

impl Notice {
    pub fn from_api(context: &str, err: &ApiError) -> Self {
        let kind = match err {
            ApiError::Client(_) | ApiError::Transport { .. } => NoticeKind::Network,
            ApiError::Status { .. } => NoticeKind::Status,
            ApiError::Decode { .. } | ApiError::NoRoute { .. } => NoticeKind::Malformed,
        };
        Self {
            kind,
            message: format!("{}: {}", context, err),
        }
    }
}

impl From<&SelectionError> for Notice {
    fn from(err: &SelectionError) -> Self {
        Self {
            kind: NoticeKind::Selection,
            message: err.to_string(),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
