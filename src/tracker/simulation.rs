use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use super::types::{GeoPosition, StateRecord};

const CENTER_SPREAD_DEG: f64 = 0.1;
const ALTITUDE_BAND_M: (f64, f64) = (500.0, 11_000.0);
const VELOCITY_BAND_M_S: (f64, f64) = (60.0, 250.0);
const VERTICAL_RATE_BAND_M_S: (f64, f64) = (-5.0, 5.0);

/// Synthetic traffic around a center point for demos and offline runs.
///
/// Even indexes get an `N` registration and so become light planes, odd
/// indexes get an airline-style callsign and become heavy.
pub struct SimulationSource {
    count: usize,
    rng: StdRng,
}

impl SimulationSource {
    pub fn new(count: usize, seed: Option<u64>) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self { count, rng }
    }

    pub fn generate(&mut self, center: &GeoPosition, now: i64) -> Vec<StateRecord> {
        (0..self.count)
            .map(|i| {
                let callsign = if i % 2 == 0 {
                    format!("N{:03}SM", i)
                } else {
                    format!("SIM{:03}", i)
                };
                StateRecord {
                    callsign,
                    latitude: center.latitude
                        + self.rng.random_range(-CENTER_SPREAD_DEG..CENTER_SPREAD_DEG),
                    longitude: center.longitude
                        + self.rng.random_range(-CENTER_SPREAD_DEG..CENTER_SPREAD_DEG),
                    altitude_m: self.rng.random_range(ALTITUDE_BAND_M.0..ALTITUDE_BAND_M.1),
                    velocity_m_s: self
                        .rng
                        .random_range(VELOCITY_BAND_M_S.0..VELOCITY_BAND_M_S.1),
                    heading_deg: self.rng.random_range(0.0..360.0),
                    vertical_rate_m_s: self
                        .rng
                        .random_range(VERTICAL_RATE_BAND_M_S.0..VERTICAL_RATE_BAND_M_S.1),
                    last_contact: now,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tracker::SizeClass;

    #[test]
    fn test_generate_clustered_and_split() {
        let center = GeoPosition::new(-117.18, 33.5556, 0.0);
        let mut sim = SimulationSource::new(20, Some(7));
        let records = sim.generate(&center, 1000);

        assert_eq!(records.len(), 20);
        let light = records
            .iter()
            .filter(|r| SizeClass::from_callsign(&r.callsign) == SizeClass::Light)
            .count();
        assert_eq!(light, 10);

        for r in &records {
            assert!((r.latitude - center.latitude).abs() <= CENTER_SPREAD_DEG);
            assert!((r.longitude - center.longitude).abs() <= CENTER_SPREAD_DEG);
            assert!((0.0..360.0).contains(&r.heading_deg));
            assert!(r.velocity_m_s >= VELOCITY_BAND_M_S.0);
            assert!(r.altitude_m >= ALTITUDE_BAND_M.0 && r.altitude_m < ALTITUDE_BAND_M.1);
            assert_eq!(r.last_contact, 1000);
        }
    }

    #[test]
    fn test_seeded_runs_repeat() {
        let center = GeoPosition::new(10.0, 50.0, 0.0);
        let a = SimulationSource::new(5, Some(42)).generate(&center, 0);
        let b = SimulationSource::new(5, Some(42)).generate(&center, 0);
        assert_eq!(a, b);
    }
}
