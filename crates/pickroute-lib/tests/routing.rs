mod common;

use std::collections::HashSet;

use pickroute_lib::routing::{
    nearest_neighbor, tour_length, two_opt, GridOracle, StraightLineOracle, TwoOptSettings,
};
use pickroute_lib::{
    plan_route, Calibration, CellKind, OccupancyGrid, Point, RouteRequest, RouteStrategy,
    RoutingConfig, SearchOptions, Site, StartPoint,
};

use common::small_warehouse;

const SETTINGS: TwoOptSettings = TwoOptSettings {
    tolerance: 1e-6,
    max_improvements: 1000,
};

fn crossing_sites() -> Vec<Site> {
    vec![
        Site::new(1, 10.0, 0.0).with_label("A"),
        Site::new(2, 0.0, 10.0).with_label("B"),
        Site::new(3, 10.0, 10.0).with_label("C"),
    ]
}

#[test]
fn greedy_then_two_opt_on_square_corners() {
    let grid = OccupancyGrid::with_dimensions(20, 20, 1.0).unwrap();
    let request = RouteRequest::from_point(Point::new(0.0, 0.0), [1, 2, 3]);
    let route = plan_route(&grid, &crossing_sites(), &request);

    assert_eq!(route.strategy, RouteStrategy::Grid);
    assert_eq!(route.order_ids(), vec![1, 3, 2]);
    assert!(route.total_raster <= 10.0 + 10.0 + 200f64.sqrt() + 1e-9);
    assert!((route.total_raster - 30.0).abs() < 1e-9);
}

#[test]
fn two_opt_terminates_from_forced_order() {
    let nodes = vec![
        Point::new(0.0, 0.0),
        Point::new(10.0, 0.0),
        Point::new(0.0, 10.0),
        Point::new(10.0, 10.0),
    ];
    let mut oracle = StraightLineOracle::new(nodes);
    let mut order = vec![1, 2, 3];
    let before = tour_length(&mut oracle, &order);

    let applied = two_opt(&mut oracle, &mut order, &SETTINGS);
    let after = tour_length(&mut oracle, &order);

    assert!(applied < SETTINGS.max_improvements);
    assert!(after <= before);
    assert_eq!(order, vec![1, 3, 2]);
}

#[test]
fn two_opt_never_lengthens_greedy_tour() {
    let facility = small_warehouse();
    let mut nodes = vec![facility.start.unwrap().position()];
    nodes.extend(facility.sites.iter().take(5).map(Site::position));
    nodes.push(Point::new(65.0, 5.0));
    nodes.push(Point::new(15.0, 35.0));

    let mut oracle = GridOracle::new(&facility.grid, nodes, SearchOptions::default());
    let mut construction = nearest_neighbor(&mut oracle);
    let greedy = tour_length(&mut oracle, &construction.order);
    two_opt(&mut oracle, &mut construction.order, &SETTINGS);
    let improved = tour_length(&mut oracle, &construction.order);

    assert!(improved <= greedy + 1e-9);
    assert!(construction.unreachable.is_empty());
}

#[test]
fn tour_visits_each_reachable_target_once() {
    let facility = small_warehouse();
    let request = RouteRequest::new(facility.start, [5, 3, 1, 4, 2, 6, 3])
        .with_calibration(facility.calibration);
    let route = plan_route(&facility.grid, &facility.sites, &request);

    let visited: HashSet<_> = route.order_ids().into_iter().collect();
    assert_eq!(visited.len(), route.stop_count());
    assert_eq!(visited, HashSet::from([1, 2, 3, 4, 5]));
    assert_eq!(route.omitted, vec![6]);

    let start = facility.start.unwrap().position();
    assert_eq!(route.steps[0].path.points.first(), Some(&start));
    for step in &route.steps {
        assert!(step.distance_raster.is_finite());
    }
    assert!(route.steps.iter().skip(1).all(|s| s.from_id.is_some()));
}

#[test]
fn walled_in_target_is_omitted() {
    let mut grid = OccupancyGrid::with_dimensions(30, 30, 10.0).unwrap();
    grid.fill_rect(
        Point::new(150.0, 150.0),
        Point::new(299.0, 299.0),
        CellKind::Zone,
        true,
    );
    let sites = vec![Site::new(1, 55.0, 55.0), Site::new(2, 285.0, 285.0)];
    let request = RouteRequest::from_point(Point::new(5.0, 5.0), [2, 1]);
    let route = plan_route(&grid, &sites, &request);

    assert_eq!(route.order_ids(), vec![1]);
    assert_eq!(route.omitted, vec![2]);
    assert!(route.total_raster.is_finite());
}

#[test]
fn all_targets_unreachable_gives_empty_order() {
    let facility = small_warehouse();
    let request = RouteRequest::new(facility.start, [6]);
    let route = plan_route(&facility.grid, &facility.sites, &request);
    assert!(route.is_empty());
    assert_eq!(route.omitted, vec![6]);
    assert_eq!(route.total_raster, 0.0);
}

#[test]
fn nearest_strategy_ignores_walls() {
    let facility = small_warehouse();
    let request = RouteRequest::new(facility.start, [1, 3, 6])
        .with_strategy(RouteStrategy::Nearest);
    let route = plan_route(&facility.grid, &facility.sites, &request);

    assert_eq!(route.strategy, RouteStrategy::Nearest);
    assert_eq!(route.stop_count(), 3);
    assert!(route.omitted.is_empty());
    assert!(route.steps.iter().all(|s| s.path.points.len() == 2));
}

#[test]
fn calibrated_route_reports_meters_and_seconds() {
    let facility = small_warehouse();
    let request =
        RouteRequest::new(facility.start, [1, 2]).with_calibration(facility.calibration);
    let route = plan_route(&facility.grid, &facility.sites, &request);

    assert!(!route.uncalibrated);
    let meters = route.total_meters.unwrap();
    assert!((meters - route.total_raster / 10.0).abs() < 1e-9);
    let seconds = route.total_seconds.unwrap();
    assert!((seconds - meters / (7.0 / 3.6)).abs() < 1e-9);
}

#[test]
fn uncalibrated_route_has_no_physical_values() {
    let facility = small_warehouse();
    let request = RouteRequest::new(facility.start, [1, 2])
        .with_calibration(Calibration::uncalibrated());
    let route = plan_route(&facility.grid, &facility.sites, &request);

    assert!(route.uncalibrated);
    assert!(route.total_raster > 0.0);
    assert_eq!(route.total_meters, None);
    assert!(route.steps.iter().all(|s| s.distance_meters.is_none()));
    assert!(route.steps.iter().all(|s| s.eta_seconds.is_none()));
}

#[test]
fn start_on_targeted_site_gives_zero_length_first_leg() {
    let sites = crossing_sites();
    let grid = OccupancyGrid::with_dimensions(20, 20, 1.0).unwrap();
    let start = StartPoint::from_site(&sites, 1).unwrap();
    let route = plan_route(&grid, &sites, &RouteRequest::new(Some(start), [1, 3]));

    assert_eq!(route.order_ids(), vec![1, 3]);
    assert_eq!(route.steps[0].distance_raster, 0.0);
    assert_eq!(route.steps[0].from_id, Some(1));
}

#[test]
fn snap_radius_comes_from_config() {
    let mut grid = OccupancyGrid::with_dimensions(20, 20, 10.0).unwrap();
    grid.fill_rect(
        Point::new(100.0, 0.0),
        Point::new(199.0, 199.0),
        CellKind::Wall,
        true,
    );
    let sites = vec![Site::new(1, 195.0, 5.0)];
    let config = RoutingConfig {
        snap_radius: 20,
        ..RoutingConfig::default()
    };

    let request = RouteRequest::from_point(Point::new(5.0, 5.0), [1]);

    let default = plan_route(&grid, &sites, &request);
    assert_eq!(default.omitted, vec![1]);

    let wide = plan_route(&grid, &sites, &request.with_config(config));
    assert_eq!(wide.order_ids(), vec![1]);
}
