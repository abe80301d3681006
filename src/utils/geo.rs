/// Miles covered by one degree of latitude.
pub const MILES_PER_DEGREE: f64 = 69.0;

/// Radius used for the public "riders near you" lookup.
pub const NEARBY_RADIUS_MILES: f64 = 15.0;

/// A lat/long rectangle around a point. Coarse on purpose: no great-circle check and
/// no wrap-around at the antimeridian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_long: f64,
    pub max_long: f64,
}

impl BoundingBox {
    pub fn around(lat: f64, long: f64, radius_miles: f64) -> Self {
        let lat_delta = radius_miles / MILES_PER_DEGREE;
        let long_delta = (radius_miles / (MILES_PER_DEGREE * lat.to_radians().cos())).abs();

        BoundingBox {
            min_lat: lat - lat_delta,
            max_lat: lat + lat_delta,
            min_long: long - long_delta,
            max_long: long + long_delta,
        }
    }

    pub fn contains(&self, lat: f64, long: f64) -> bool {
        (self.min_lat..=self.max_lat).contains(&lat) && (self.min_long..=self.max_long).contains(&long)
    }
}

pub fn is_valid_coordinate(lat: f64, long: f64) -> bool {
    (-90.0..=90.0).contains(&lat) && (-180.0..=180.0).contains(&long)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn center_is_always_inside() {
        for (lat, long) in [(0.0, 0.0), (45.5, -122.6), (-33.9, 151.2), (89.0, 10.0)] {
            let bounds = BoundingBox::around(lat, long, NEARBY_RADIUS_MILES);
            assert!(bounds.contains(lat, long), "({lat}, {long}) not in {bounds:?}");
        }
    }

    #[test]
    fn latitude_edge_is_exclusive_past_the_radius() {
        let bounds = BoundingBox::around(40.0, -105.0, NEARBY_RADIUS_MILES);
        let edge = 40.0 + 15.0 / 69.0;
        assert!(bounds.contains(edge - 1e-9, -105.0));
        assert!(!bounds.contains(edge + 1e-6, -105.0));
    }

    #[test]
    fn longitude_span_widens_away_from_equator() {
        let equator = BoundingBox::around(0.0, 0.0, NEARBY_RADIUS_MILES);
        let north = BoundingBox::around(60.0, 0.0, NEARBY_RADIUS_MILES);

        let equator_span = equator.max_long - equator.min_long;
        let north_span = north.max_long - north.min_long;
        assert!((equator_span - 2.0 * 15.0 / 69.0).abs() < 1e-12);
        // cos(60°) = 0.5
        assert!((north_span - 2.0 * equator_span).abs() < 1e-9);
    }

    #[test]
    fn southern_hemisphere_box_is_not_inverted() {
        let bounds = BoundingBox::around(-45.0, 170.0, 30.0);
        assert!(bounds.min_lat < bounds.max_lat);
        assert!(bounds.min_long < bounds.max_long);
    }

    #[test]
    fn coordinate_ranges() {
        assert!(is_valid_coordinate(90.0, -180.0));
        assert!(!is_valid_coordinate(90.1, 0.0));
        assert!(!is_valid_coordinate(0.0, 180.5));
        assert!(!is_valid_coordinate(f64::NAN, 0.0));
    }
}
