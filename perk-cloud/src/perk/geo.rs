//! Great-circle distance and geofence checks

use shared::models::{Coords, Geofence};

/// Mean Earth radius (meters)
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two points (meters)
pub fn distance_meters(a: Coords, b: Coords) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * h.sqrt().min(1.0).asin()
}

/// Inclusive: a point exactly on the boundary is inside
pub fn within_fence(point: Coords, center: Coords, radius_m: f64) -> bool {
    distance_meters(point, center) <= radius_m
}

/// Outcome of the optional proximity gate
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FenceCheck {
    Inside { distance_m: f64 },
    TooFar { distance_m: f64 },
    /// No fence, no coordinates, or unusable coordinates
    Skipped,
}

/// Evaluate the caller's position against a perk's fence.
///
/// Invalid input skips the check instead of failing; capacity and window
/// checks in the ledger stay authoritative either way.
pub fn check_fence(point: Option<Coords>, fence: Option<&Geofence>) -> FenceCheck {
    let (Some(point), Some(fence)) = (point, fence) else {
        return FenceCheck::Skipped;
    };
    if !point.is_valid() || !fence.center.is_valid() || !fence.radius_m.is_finite() {
        return FenceCheck::Skipped;
    }

    let distance_m = distance_meters(point, fence.center);
    if distance_m <= fence.radius_m {
        FenceCheck::Inside { distance_m }
    } else {
        FenceCheck::TooFar { distance_m }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UNION_SQUARE: Coords = Coords {
        lat: 40.7359,
        lng: -73.9911,
    };
    const WASHINGTON_SQUARE: Coords = Coords {
        lat: 40.7308,
        lng: -73.9973,
    };

    #[test]
    fn zero_distance_to_self() {
        assert_eq!(distance_meters(UNION_SQUARE, UNION_SQUARE), 0.0);
    }

    #[test]
    fn known_distance() {
        // ~760 m between the two squares
        let d = distance_meters(UNION_SQUARE, WASHINGTON_SQUARE);
        assert!((700.0..820.0).contains(&d), "got {d}");
    }

    #[test]
    fn one_degree_of_latitude() {
        let d = distance_meters(Coords { lat: 0.0, lng: 0.0 }, Coords { lat: 1.0, lng: 0.0 });
        assert!((d - 111_195.0).abs() < 1.0, "got {d}");
    }

    #[test]
    fn distance_is_symmetric() {
        let ab = distance_meters(UNION_SQUARE, WASHINGTON_SQUARE);
        let ba = distance_meters(WASHINGTON_SQUARE, UNION_SQUARE);
        assert!((ab - ba).abs() < 1e-6);
    }

    #[test]
    fn boundary_is_inclusive() {
        let d = distance_meters(UNION_SQUARE, WASHINGTON_SQUARE);
        assert!(within_fence(UNION_SQUARE, WASHINGTON_SQUARE, d));
        // Point one meter beyond the radius
        assert!(!within_fence(UNION_SQUARE, WASHINGTON_SQUARE, d - 1.0));
    }

    #[test]
    fn check_fence_outcomes() {
        let fence = Geofence {
            center: WASHINGTON_SQUARE,
            radius_m: 200.0,
        };
        assert!(matches!(
            check_fence(Some(WASHINGTON_SQUARE), Some(&fence)),
            FenceCheck::Inside { .. }
        ));
        assert!(matches!(
            check_fence(Some(UNION_SQUARE), Some(&fence)),
            FenceCheck::TooFar { distance_m } if distance_m > 200.0
        ));
        assert_eq!(check_fence(None, Some(&fence)), FenceCheck::Skipped);
        assert_eq!(check_fence(Some(UNION_SQUARE), None), FenceCheck::Skipped);
    }

    #[test]
    fn invalid_coordinates_skip_the_check() {
        let fence = Geofence {
            center: WASHINGTON_SQUARE,
            radius_m: 200.0,
        };
        let nan = Coords {
            lat: f64::NAN,
            lng: 0.0,
        };
        let off_planet = Coords {
            lat: 120.0,
            lng: 0.0,
        };
        assert_eq!(check_fence(Some(nan), Some(&fence)), FenceCheck::Skipped);
        assert_eq!(check_fence(Some(off_planet), Some(&fence)), FenceCheck::Skipped);
    }
}
