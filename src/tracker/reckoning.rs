use geo::{Destination, Geodesic, Point};

use super::types::{GeoPosition, Motion};

/// Forward geodesic problem, the only geometry the tracker needs.
pub trait GeometryEngine: Send + Sync {
    /// Moves `origin` by `distance_m` along `azimuth_deg` (true north, clockwise).
    /// Returns `(longitude, latitude)`.
    fn geodetic_move(&self, origin: &GeoPosition, distance_m: f64, azimuth_deg: f64) -> (f64, f64);
}

/// Karney geodesic on the WGS-84 ellipsoid.
#[derive(Debug, Clone, Copy, Default)]
pub struct GeodesicEngine;

impl GeometryEngine for GeodesicEngine {
    fn geodetic_move(&self, origin: &GeoPosition, distance_m: f64, azimuth_deg: f64) -> (f64, f64) {
        let from = Point::new(origin.longitude, origin.latitude);
        let to = Geodesic.destination(from, azimuth_deg, distance_m);
        (to.x(), to.y())
    }
}

pub struct DeadReckoner {
    engine: Box<dyn GeometryEngine>,
}

impl Default for DeadReckoner {
    fn default() -> Self {
        Self::new(GeodesicEngine)
    }
}

impl DeadReckoner {
    pub fn new(engine: impl GeometryEngine + 'static) -> Self {
        Self {
            engine: Box::new(engine),
        }
    }

    /// Horizontal move only, altitude is carried over.
    pub fn project(&self, position: &GeoPosition, distance_m: f64, azimuth_deg: f64) -> GeoPosition {
        if distance_m == 0.0 {
            return *position;
        }
        let (longitude, latitude) = self.engine.geodetic_move(position, distance_m, azimuth_deg);
        GeoPosition::new(longitude, latitude, position.altitude_m)
    }

    /// Constant-rate extrapolation over `elapsed_s` seconds.
    pub fn advance(&self, position: &GeoPosition, motion: &Motion, elapsed_s: f64) -> GeoPosition {
        let mut next = self.project(
            position,
            motion.velocity_m_s * elapsed_s,
            motion.heading_deg,
        );
        next.altitude_m = position.altitude_m + motion.vertical_rate_m_s * elapsed_s;
        next
    }
}
