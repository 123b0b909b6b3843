//! Selection/fetch state machine for the map screen.
//!
//! Network work is split into an issue step, which hands out a [`Ticket`],
//! and a completion step that takes the ticket back. Every gesture that moves
//! the origin or the selection starts a new generation, so a completion from
//! a superseded request is discarded instead of overwriting newer state.

pub mod state;

pub use state::{Notice, NoticeKind, Phase, RetapPolicy, SelectionError, Ticket};

use crate::api::ApiError;
use crate::domain::{GeoPoint, ParkingCandidate, RoutePath};

/// Candidate search to perform for a freshly confirmed origin
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchRequest {
    pub ticket: Ticket,
    pub origin: GeoPoint,
}

/// Directions request from the origin to the selected spot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RouteRequest {
    pub ticket: Ticket,
    pub origin: GeoPoint,
    pub destination: GeoPoint,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TapOutcome {
    /// The tap awaits [`Controller::confirm_origin`]
    Pending,
    /// The tap became the origin; run the search
    Search(SearchRequest),
    /// Dropped under [`RetapPolicy::Ignore`]
    Ignored,
}

#[derive(Debug)]
pub struct Controller {
    phase: Phase,
    notice: Option<Notice>,
    generation: u64,
    require_confirmation: bool,
    retap: RetapPolicy,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new(true, RetapPolicy::default())
    }
}

impl Controller {
    pub fn new(require_confirmation: bool, retap: RetapPolicy) -> Self {
        Self {
            phase: Phase::Idle,
            notice: None,
            generation: 0,
            require_confirmation,
            retap,
        }
    }

    pub fn phase(&self) -> &Phase {
        &self.phase
    }

    pub fn origin(&self) -> Option<GeoPoint> {
        self.phase.origin()
    }

    /// The tapped location waiting for confirmation
    pub fn pending_origin(&self) -> Option<GeoPoint> {
        match &self.phase {
            Phase::PendingConfirmation { proposed, .. } => Some(*proposed),
            _ => None,
        }
    }

    pub fn candidates(&self) -> &[ParkingCandidate] {
        self.phase.candidates()
    }

    pub fn selected(&self) -> Option<&ParkingCandidate> {
        self.phase.selected()
    }

    pub fn route(&self) -> Option<&RoutePath> {
        self.phase.route()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss_notice(&mut self) -> Option<Notice> {
        self.notice.take()
    }

    /// Record a map tap as the proposed (or, without confirmation, the new) origin.
    ///
    /// Candidates are left alone until a search for the new origin resolves.
    pub fn select_origin(&mut self, point: GeoPoint) -> TapOutcome {
        if self.retap == RetapPolicy::Ignore && self.origin().is_some() {
            tracing::debug!("Ignoring tap at {}: origin already confirmed", point);
            return TapOutcome::Ignored;
        }

        if !self.require_confirmation {
            return TapOutcome::Search(self.start_search(point));
        }

        let prior = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::PendingConfirmation { prior, .. } => prior,
            other => Box::new(other),
        };
        self.phase = Phase::PendingConfirmation {
            proposed: point,
            prior,
        };
        TapOutcome::Pending
    }

    /// Accept the pending tap. The previous origin, its candidates and its
    /// route are dropped.
    pub fn confirm_origin(&mut self) -> Result<SearchRequest, SelectionError> {
        match self.pending_origin() {
            Some(proposed) => Ok(self.start_search(proposed)),
            None => Err(self.reject(SelectionError::NoPendingOrigin)),
        }
    }

    /// Reject the pending tap and return to whatever was shown before it.
    pub fn cancel_origin(&mut self) -> Result<(), SelectionError> {
        match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::PendingConfirmation { prior, .. } => {
                self.phase = *prior;
                Ok(())
            }
            other => {
                self.phase = other;
                Err(self.reject(SelectionError::NoPendingOrigin))
            }
        }
    }

    fn start_search(&mut self, origin: GeoPoint) -> SearchRequest {
        let ticket = self.next_ticket();
        self.phase = Phase::OriginConfirmed { origin, ticket };
        tracing::debug!("Origin confirmed at {}", origin);
        SearchRequest { ticket, origin }
    }

    /// Apply a candidate search result. Returns `false` when the ticket is stale.
    ///
    /// A failure is surfaced as a notice and leaves an empty candidate set;
    /// the origin stays as it was.
    pub fn complete_search(
        &mut self,
        ticket: Ticket,
        result: Result<Vec<ParkingCandidate>, ApiError>,
    ) -> bool {
        if self.awaiting().search_ticket() != Some(ticket) {
            tracing::debug!("Discarding stale parking search result");
            return false;
        }

        let candidates = result.unwrap_or_else(|err| {
            tracing::warn!("Parking search failed: {}", err);
            self.notice = Some(Notice::from_api("Could not load parking spots", &err));
            Vec::new()
        });

        let target = self.awaiting_mut();
        if let Phase::OriginConfirmed { origin, .. } = *target {
            *target = Phase::CandidatesLoaded { origin, candidates };
        }
        true
    }

    /// Show the detail view for the candidate with `id`. No network effect.
    pub fn select_candidate(&mut self, id: &str) -> Result<ParkingCandidate, SelectionError> {
        let check = match &self.phase {
            Phase::Idle => Err(SelectionError::NoOrigin),
            Phase::PendingConfirmation { .. } => Err(SelectionError::ConfirmationPending),
            Phase::OriginConfirmed { .. } => Err(SelectionError::SearchInFlight),
            phase => phase
                .candidates()
                .iter()
                .find(|c| c.id == id)
                .cloned()
                .ok_or_else(|| SelectionError::UnknownCandidate(id.to_string())),
        };
        let selected = check.map_err(|err| self.reject(err))?;

        let (origin, candidates) = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::CandidatesLoaded { origin, candidates }
            | Phase::SpotSelected {
                origin, candidates, ..
            }
            | Phase::RouteRequested {
                origin, candidates, ..
            }
            | Phase::RouteReady {
                origin, candidates, ..
            } => (origin, candidates),
            other => unreachable!("candidate lookup succeeded in phase {}", other),
        };

        // Any route in flight was for the previous destination
        self.generation += 1;
        self.phase = Phase::SpotSelected {
            origin,
            candidates,
            selected: selected.clone(),
        };
        Ok(selected)
    }

    /// Origin and destination a route would be drawn between.
    pub fn route_endpoints(&self) -> Result<(GeoPoint, GeoPoint), SelectionError> {
        match &self.phase {
            Phase::Idle => Err(SelectionError::NoOrigin),
            Phase::PendingConfirmation { prior, .. } => match prior.origin() {
                Some(_) => Err(SelectionError::ConfirmationPending),
                None => Err(SelectionError::NoOrigin),
            },
            Phase::OriginConfirmed { .. } | Phase::CandidatesLoaded { .. } => {
                Err(SelectionError::NoDestination)
            }
            Phase::SpotSelected {
                origin, selected, ..
            }
            | Phase::RouteRequested {
                origin, selected, ..
            }
            | Phase::RouteReady {
                origin, selected, ..
            } => Ok((*origin, selected.location())),
        }
    }

    /// Issue a directions request. Out of order (no origin, no selected spot)
    /// it fails with a notice and nothing is drawn.
    pub fn request_route(&mut self) -> Result<RouteRequest, SelectionError> {
        let (origin, destination) = self.route_endpoints().map_err(|err| self.reject(err))?;
        let ticket = self.next_ticket();

        self.phase = match std::mem::replace(&mut self.phase, Phase::Idle) {
            Phase::SpotSelected {
                origin,
                candidates,
                selected,
            } => Phase::RouteRequested {
                origin,
                candidates,
                selected,
                prior_path: None,
                ticket,
            },
            Phase::RouteRequested {
                origin,
                candidates,
                selected,
                prior_path,
                ..
            } => Phase::RouteRequested {
                origin,
                candidates,
                selected,
                prior_path,
                ticket,
            },
            Phase::RouteReady {
                origin,
                candidates,
                selected,
                path,
            } => Phase::RouteRequested {
                origin,
                candidates,
                selected,
                prior_path: Some(path),
                ticket,
            },
            other => unreachable!("route endpoints resolved in phase {}", other),
        };

        Ok(RouteRequest {
            ticket,
            origin,
            destination,
        })
    }

    /// Apply a directions result. Returns `false` when the ticket is stale.
    ///
    /// On failure the previously drawn path, if any, stays on the map.
    pub fn complete_route(&mut self, ticket: Ticket, result: Result<RoutePath, ApiError>) -> bool {
        if self.awaiting().route_ticket() != Some(ticket) {
            tracing::debug!("Discarding stale directions result");
            return false;
        }

        let outcome = result.map_err(|err| {
            tracing::warn!("Directions request failed: {}", err);
            self.notice = Some(Notice::from_api("Could not load directions", &err));
        });

        let target = self.awaiting_mut();
        if let Phase::RouteRequested {
            origin,
            candidates,
            selected,
            prior_path,
            ..
        } = std::mem::replace(target, Phase::Idle)
        {
            *target = match (outcome, prior_path) {
                (Ok(path), _) | (Err(()), Some(path)) => Phase::RouteReady {
                    origin,
                    candidates,
                    selected,
                    path,
                },
                (Err(()), None) => Phase::SpotSelected {
                    origin,
                    candidates,
                    selected,
                },
            };
        }
        true
    }

    fn next_ticket(&mut self) -> Ticket {
        self.generation += 1;
        Ticket {
            generation: self.generation,
        }
    }

    /// Surface an out-of-order gesture as a notice and hand the error back.
    pub fn reject(&mut self, err: SelectionError) -> SelectionError {
        self.notice = Some(Notice::from(&err));
        err
    }

    /// The phase in-flight requests resolve into; a pending re-tap keeps it
    /// underneath.
    fn awaiting(&self) -> &Phase {
        match &self.phase {
            Phase::PendingConfirmation { prior, .. } => &**prior,
            phase => phase,
        }
    }

    fn awaiting_mut(&mut self) -> &mut Phase {
        match &mut self.phase {
            Phase::PendingConfirmation { prior, .. } => &mut **prior,
            phase => phase,
        }
    }
}
