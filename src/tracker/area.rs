use serde::Serialize;

use super::types::GeoPosition;

/// Query rectangle in coordinate degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, utoipa::ToSchema)]
pub struct BoundingBox {
    pub lat_min: f64,
    pub lat_max: f64,
    pub lon_min: f64,
    pub lon_max: f64,
}

/// Center of the tracked region, pushed by the location source.
#[derive(Debug, Clone, Default)]
pub struct AreaOfInterest {
    center: Option<GeoPosition>,
}

impl AreaOfInterest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false when the point was ignored.
    ///
    /// Location sources report longitude 0 before they have a fix, so such
    /// points never replace the center.
    pub fn set_center(&mut self, point: GeoPosition) -> bool {
        if point.longitude == 0.0 {
            return false;
        }
        self.center = Some(point);
        true
    }

    pub fn center(&self) -> Option<GeoPosition> {
        self.center
    }

    /// `None` means there is nothing to query yet.
    pub fn bounding_box(&self, tolerance: f64) -> Option<BoundingBox> {
        let center = self.center?;
        Some(BoundingBox {
            lat_min: center.latitude - tolerance,
            lat_max: center.latitude + tolerance,
            lon_min: center.longitude - tolerance,
            lon_max: center.longitude + tolerance,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_center_means_no_box() {
        let area = AreaOfInterest::new();
        assert!(area.center().is_none());
        assert_eq!(area.bounding_box(0.5), None);
    }

    #[test]
    fn test_degenerate_center_ignored() {
        let mut area = AreaOfInterest::new();
        assert!(!area.set_center(GeoPosition::new(0.0, 33.5, 0.0)));
        assert!(area.center().is_none());

        assert!(area.set_center(GeoPosition::new(-117.18, 33.5556, 0.0)));
        assert!(!area.set_center(GeoPosition::new(0.0, 10.0, 0.0)));
        assert_eq!(area.center().map(|c| c.longitude), Some(-117.18));
    }

    #[test]
    fn test_bounding_box_half_extent() {
        let mut area = AreaOfInterest::new();
        area.set_center(GeoPosition::new(10.0, 50.0, 0.0));

        let bbox = area.bounding_box(0.25).unwrap();
        assert_eq!(bbox.lat_min, 49.75);
        assert_eq!(bbox.lat_max, 50.25);
        assert_eq!(bbox.lon_min, 9.75);
        assert_eq!(bbox.lon_max, 10.25);
    }
}
