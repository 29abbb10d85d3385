use serde::{Deserialize, Serialize};
use strum_macros::Display;

/// Geodetic position, WGS-84 degrees with altitude in meters.
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize, Serialize, utoipa::ToSchema)]
pub struct GeoPosition {
    pub longitude: f64,
    pub latitude: f64,
    #[serde(default)]
    pub altitude_m: f64,
}

impl GeoPosition {
    pub fn new(longitude: f64, latitude: f64, altitude_m: f64) -> Self {
        Self {
            longitude,
            latitude,
            altitude_m,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SizeClass {
    Light,
    Heavy,
}

impl SizeClass {
    /// Registrations starting with `N` are treated as general aviation.
    pub fn from_callsign(callsign: &str) -> Self {
        if callsign.starts_with('N') {
            SizeClass::Light
        } else {
            SizeClass::Heavy
        }
    }
}

/// One aircraft state as decoded from the feed.
#[derive(Debug, Clone, PartialEq)]
pub struct StateRecord {
    pub callsign: String,
    pub latitude: f64,
    pub longitude: f64,
    pub altitude_m: f64,
    pub velocity_m_s: f64,
    pub heading_deg: f64,
    pub vertical_rate_m_s: f64,
    /// Unix seconds, 0 when the feed did not report one.
    pub last_contact: i64,
}

impl StateRecord {
    pub fn position(&self) -> GeoPosition {
        GeoPosition::new(self.longitude, self.latitude, self.altitude_m)
    }

    pub fn motion(&self) -> Motion {
        Motion {
            velocity_m_s: self.velocity_m_s,
            heading_deg: self.heading_deg,
            vertical_rate_m_s: self.vertical_rate_m_s,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Motion {
    pub velocity_m_s: f64,
    pub heading_deg: f64,
    pub vertical_rate_m_s: f64,
}

/// A tracked aircraft. `H` is the render target's handle type.
#[derive(Debug)]
pub struct Plane<H> {
    pub callsign: String,
    pub position: GeoPosition,
    pub motion: Motion,
    pub size_class: SizeClass,
    /// Heading attribute last written to the renderable.
    pub render_heading_deg: f64,
    /// Unix seconds of the most recent real report.
    pub last_update: i64,
    pub(super) handle: H,
}
