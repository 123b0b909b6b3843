//! Drives the controller with real (or fake) services on one thread.
//!
//! The outbound requests are the only points where a gesture waits; each is
//! issued with a ticket and its result handed back to the controller.

pub mod command;

pub use command::{Gesture, GestureError, HELP};

use reqwest::Url;
use serde::Serialize;

use crate::api::{ApiError, ParkingSearch, ReverseGeocoder, RouteProvider};
use crate::controller::{Controller, Notice, SearchRequest, SelectionError, TapOutcome};
use crate::domain::{GeoPoint, ParkingCandidate, RoutePath, TravelMode};
use crate::geometry::distance_m;
use crate::navigation::deep_link;

/// Parking search radius around the confirmed origin
pub const SEARCH_RADIUS_M: u32 = 1000;

/// Shown when a point has no reverse-geocoded name
pub const ADDRESS_UNAVAILABLE: &str = "Address unavailable";

/// Contents of the spot detail view
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpotDetails {
    pub candidate: ParkingCandidate,
    pub distance_m: Option<f64>,
    pub address: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// A path was fetched and drawn
    Drawn(RoutePath),
    /// The directions request failed; see the controller's notice
    Failed,
    /// No directions service configured; hand off to a navigation app
    Link(Url),
}

pub struct Session {
    controller: Controller,
    search: Box<dyn ParkingSearch>,
    router: Option<Box<dyn RouteProvider>>,
    geocoder: Option<Box<dyn ReverseGeocoder>>,
    mode: TravelMode,
}

impl Session {
    pub fn new(controller: Controller, search: Box<dyn ParkingSearch>) -> Self {
        Self {
            controller,
            search,
            router: None,
            geocoder: None,
            mode: TravelMode::default(),
        }
    }

    pub fn with_router(mut self, router: Box<dyn RouteProvider>) -> Self {
        self.router = Some(router);
        self
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn ReverseGeocoder>) -> Self {
        self.geocoder = Some(geocoder);
        self
    }

    pub fn with_mode(mut self, mode: TravelMode) -> Self {
        self.mode = mode;
        self
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn mode(&self) -> TravelMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: TravelMode) {
        self.mode = mode;
    }

    /// Search parking around `origin` within [`SEARCH_RADIUS_M`]. No retry.
    pub fn fetch_candidates(&self, origin: GeoPoint) -> Result<Vec<ParkingCandidate>, ApiError> {
        self.search.search(origin, SEARCH_RADIUS_M)
    }

    /// A map tap. Runs the search right away when no confirmation is required.
    pub fn tap(&mut self, point: GeoPoint) -> TapOutcome {
        let outcome = self.controller.select_origin(point);
        if let TapOutcome::Search(request) = outcome {
            self.run_search(request);
        }
        outcome
    }

    /// Confirm the tapped origin and load the parking spots around it.
    pub fn confirm(&mut self) -> Result<&[ParkingCandidate], SelectionError> {
        let request = self.controller.confirm_origin()?;
        self.run_search(request);
        Ok(self.controller.candidates())
    }

    pub fn cancel(&mut self) -> Result<(), SelectionError> {
        self.controller.cancel_origin()
    }

    fn run_search(&mut self, request: SearchRequest) {
        let result = self.fetch_candidates(request.origin);
        self.controller.complete_search(request.ticket, result);
    }

    /// Select a spot and assemble its detail view.
    pub fn select(&mut self, id: &str) -> Result<SpotDetails, SelectionError> {
        let candidate = self.controller.select_candidate(id)?;
        let distance_m = self
            .controller
            .origin()
            .map(|origin| distance_m(origin, candidate.location()));
        let address = self.describe(candidate.location());

        Ok(SpotDetails {
            candidate,
            distance_m,
            address,
        })
    }

    /// Reverse-geocoded name of `point`, or [`ADDRESS_UNAVAILABLE`].
    pub fn describe(&self, point: GeoPoint) -> String {
        let Some(geocoder) = &self.geocoder else {
            return ADDRESS_UNAVAILABLE.to_string();
        };
        match geocoder.reverse(point) {
            Ok(Some(name)) => name,
            Ok(None) => ADDRESS_UNAVAILABLE.to_string(),
            Err(err) => {
                tracing::warn!("Reverse geocoding failed for {}: {}", point, err);
                ADDRESS_UNAVAILABLE.to_string()
            }
        }
    }

    /// Route from the origin to the selected spot.
    ///
    /// Without a directions service this degrades to a navigation link.
    pub fn request_route(&mut self) -> Result<RouteOutcome, SelectionError> {
        let Some(router) = self.router.as_ref() else {
            return self.navigation_link().map(RouteOutcome::Link);
        };

        let request = self.controller.request_route()?;
        match router.route(request.origin, request.destination, self.mode) {
            Ok(path) => {
                self.controller.complete_route(request.ticket, Ok(path.clone()));
                Ok(RouteOutcome::Drawn(path))
            }
            Err(err) => {
                self.controller.complete_route(request.ticket, Err(err));
                Ok(RouteOutcome::Failed)
            }
        }
    }

    /// Deep link to the selected spot for an external navigation app.
    pub fn navigation_link(&mut self) -> Result<Url, SelectionError> {
        let (origin, destination) = self
            .controller
            .route_endpoints()
            .map_err(|err| self.controller.reject(err))?;
        Ok(deep_link(Some(origin), destination, self.mode))
    }

    pub fn dismiss(&mut self) -> Option<Notice> {
        self.controller.dismiss_notice()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::{NoticeKind, Phase, RetapPolicy};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;

    struct FakeSearch {
        results: RefCell<Vec<Result<Vec<ParkingCandidate>, ApiError>>>,
        radius: Rc<Cell<u32>>,
    }

    impl FakeSearch {
        fn new(results: Vec<Result<Vec<ParkingCandidate>, ApiError>>) -> (Self, Rc<Cell<u32>>) {
            let radius = Rc::new(Cell::new(0));
            let fake = Self {
                results: RefCell::new(results),
                radius: radius.clone(),
            };
            (fake, radius)
        }
    }

    impl ParkingSearch for FakeSearch {
        fn search(&self, _origin: GeoPoint, radius_m: u32) -> Result<Vec<ParkingCandidate>, ApiError> {
            self.radius.set(radius_m);
            self.results.borrow_mut().remove(0)
        }
    }

    struct FakeRouter {
        fail: bool,
    }

    impl RouteProvider for FakeRouter {
        fn route(
            &self,
            origin: GeoPoint,
            destination: GeoPoint,
            _mode: TravelMode,
        ) -> Result<RoutePath, ApiError> {
            if self.fail {
                return Err(ApiError::Status {
                    service: "Mapbox Directions",
                    status: 503,
                });
            }
            Ok(RoutePath::new(vec![origin, destination]))
        }
    }

    struct FakeGeocoder(Option<&'static str>);

    impl ReverseGeocoder for FakeGeocoder {
        fn reverse(&self, _point: GeoPoint) -> Result<Option<String>, ApiError> {
            Ok(self.0.map(str::to_string))
        }
    }

    struct FailingGeocoder;

    impl ReverseGeocoder for FailingGeocoder {
        fn reverse(&self, _point: GeoPoint) -> Result<Option<String>, ApiError> {
            Err(ApiError::Status {
                service: "Nominatim",
                status: 503,
            })
        }
    }

    fn budapest_spot() -> ParkingCandidate {
        ParkingCandidate::new("1", None, 47.51, 19.05)
    }

    #[test]
    fn test_confirmed_tap_searches_fixed_radius() {
        let (search, radius) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search));

        assert_eq!(session.tap(GeoPoint::new(47.5068, 19.0470)), TapOutcome::Pending);
        let candidates = session.confirm().unwrap();

        assert_eq!(candidates, &[budapest_spot()]);
        assert_eq!(radius.get(), 1000);
    }

    #[test]
    fn test_unconfirmed_tap_searches_immediately() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let controller = Controller::new(false, RetapPolicy::Reset);
        let mut session = Session::new(controller, Box::new(search));

        assert!(matches!(
            session.tap(GeoPoint::new(47.5, 19.0)),
            TapOutcome::Search(_)
        ));
        assert_eq!(session.controller().candidates().len(), 1);
    }

    #[test]
    fn test_failed_search_surfaces_notice() {
        let (search, _) = FakeSearch::new(vec![Err(ApiError::Status {
            service: "Overpass",
            status: 429,
        })]);
        let mut session = Session::new(Controller::default(), Box::new(search));

        session.tap(GeoPoint::new(47.5, 19.0));
        assert!(session.confirm().unwrap().is_empty());

        let notice = session.dismiss().unwrap();
        assert_eq!(notice.kind, NoticeKind::Status);
        assert!(notice.message.contains("429"));
        assert_eq!(session.controller().origin(), Some(GeoPoint::new(47.5, 19.0)));
    }

    #[test]
    fn test_select_builds_details() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_geocoder(Box::new(FakeGeocoder(Some("Budapest, Hungary"))));

        session.tap(GeoPoint::new(47.50, 19.05));
        session.confirm().unwrap();
        let details = session.select("1").unwrap();

        assert_eq!(details.candidate, budapest_spot());
        assert_eq!(details.address, "Budapest, Hungary");
        let meters = details.distance_m.unwrap();
        assert!((meters - 1112.0).abs() < 10.0, "got {}", meters);
    }

    #[test]
    fn test_describe_without_name_uses_placeholder() {
        let (search, _) = FakeSearch::new(vec![]);
        let session = Session::new(Controller::default(), Box::new(search))
            .with_geocoder(Box::new(FakeGeocoder(None)));
        assert_eq!(session.describe(GeoPoint::new(0.0, 0.0)), "Address unavailable");
    }

    #[test]
    fn test_describe_geocoder_error_uses_placeholder() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_geocoder(Box::new(FailingGeocoder));

        assert_eq!(session.describe(GeoPoint::new(47.5, 19.0)), "Address unavailable");

        session.tap(GeoPoint::new(47.50, 19.05));
        session.confirm().unwrap();
        let details = session.select("1").unwrap();
        assert_eq!(details.address, "Address unavailable");
        assert!(session.controller().notice().is_none());
    }

    #[test]
    fn test_route_drawn_through_router() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_router(Box::new(FakeRouter { fail: false }));

        session.tap(GeoPoint::new(47.50, 19.04));
        session.confirm().unwrap();
        session.select("1").unwrap();

        let expected = RoutePath::new(vec![
            GeoPoint::new(47.50, 19.04),
            GeoPoint::new(47.51, 19.05),
        ]);
        assert_eq!(
            session.request_route().unwrap(),
            RouteOutcome::Drawn(expected.clone())
        );
        assert_eq!(session.controller().route(), Some(&expected));
    }

    #[test]
    fn test_route_failure_reports_notice() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_router(Box::new(FakeRouter { fail: true }));

        session.tap(GeoPoint::new(47.50, 19.04));
        session.confirm().unwrap();
        session.select("1").unwrap();

        assert_eq!(session.request_route().unwrap(), RouteOutcome::Failed);
        assert!(matches!(session.controller().phase(), Phase::SpotSelected { .. }));
        assert_eq!(session.controller().notice().unwrap().kind, NoticeKind::Status);
    }

    #[test]
    fn test_route_before_origin_is_rejected() {
        let (search, _) = FakeSearch::new(vec![]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_router(Box::new(FakeRouter { fail: false }));

        assert_eq!(session.request_route().unwrap_err(), SelectionError::NoOrigin);
        assert!(session.controller().route().is_none());
    }

    #[test]
    fn test_route_without_router_falls_back_to_link() {
        let (search, _) = FakeSearch::new(vec![Ok(vec![budapest_spot()])]);
        let mut session = Session::new(Controller::default(), Box::new(search))
            .with_mode(TravelMode::Walking);

        assert_eq!(session.navigation_link().unwrap_err(), SelectionError::NoOrigin);
        assert_eq!(
            session.controller().notice().unwrap().kind,
            NoticeKind::Selection
        );

        session.tap(GeoPoint::new(47.50, 19.04));
        session.confirm().unwrap();
        session.select("1").unwrap();

        match session.request_route().unwrap() {
            RouteOutcome::Link(url) => {
                assert!(url.as_str().contains("destination=47.51%2C19.05"));
                assert!(url.as_str().contains("travelmode=walking"));
            }
            other => panic!("expected link, got {:?}", other),
        }
        assert!(session.controller().route().is_none());
    }
}
