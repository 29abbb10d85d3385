use serde::Deserialize;
use std::collections::HashMap;

use super::reckoning::DeadReckoner;
use super::types::{Plane, SizeClass, StateRecord};
use crate::render::RenderTarget;

/// Heading attribute written to renderables.
///
/// The light symbol model faces backwards and needs +180. `Observed` applies
/// that offset per class when a plane is created but to every class on later
/// reports, which leaves heavy planes flipped after their first update.
/// `ByClass` applies the class offset on both paths.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HeadingMode {
    #[default]
    Observed,
    ByClass,
}

impl HeadingMode {
    fn on_create(self, class: SizeClass, heading_deg: f64) -> f64 {
        heading_deg + symbol_offset(class)
    }

    fn on_update(self, class: SizeClass, heading_deg: f64) -> f64 {
        match self {
            HeadingMode::Observed => heading_deg + 180.0,
            HeadingMode::ByClass => heading_deg + symbol_offset(class),
        }
    }
}

fn symbol_offset(class: SizeClass) -> f64 {
    match class {
        SizeClass::Light => 180.0,
        SizeClass::Heavy => 0.0,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ingest {
    Created,
    Updated,
}

/// Callsign-keyed set of tracked planes. Every plane owns exactly one
/// renderable in `R`, created on insert and released on eviction.
pub struct PlaneRegistry<R: RenderTarget> {
    planes: HashMap<String, Plane<R::Handle>>,
    target: R,
    reckoner: DeadReckoner,
    heading_mode: HeadingMode,
}

impl<R: RenderTarget> PlaneRegistry<R> {
    pub fn new(target: R, reckoner: DeadReckoner, heading_mode: HeadingMode) -> Self {
        Self {
            planes: HashMap::new(),
            target,
            reckoner,
            heading_mode,
        }
    }

    pub fn len(&self) -> usize {
        self.planes.len()
    }

    /// Ingests a real report. The reported position is projected forward by
    /// the time elapsed since `record.last_contact`.
    pub fn upsert(&mut self, record: &StateRecord, now: i64) -> Ingest {
        let motion = record.motion();
        let elapsed_s = (now - record.last_contact) as f64;
        let position = self.reckoner.advance(&record.position(), &motion, elapsed_s);

        if let Some(plane) = self.planes.get_mut(&record.callsign) {
            plane.position = position;
            plane.motion = motion;
            plane.render_heading_deg = self
                .heading_mode
                .on_update(plane.size_class, record.heading_deg);
            plane.last_update = record.last_contact;
            self.target
                .update_renderable(&plane.handle, position, plane.render_heading_deg);
            return Ingest::Updated;
        }

        let size_class = SizeClass::from_callsign(&record.callsign);
        let render_heading_deg = self.heading_mode.on_create(size_class, record.heading_deg);
        let handle = self.target.create_renderable(
            position,
            size_class,
            render_heading_deg,
            &record.callsign,
        );
        log::debug!("tracking {} ({})", record.callsign, size_class);

        self.planes.insert(
            record.callsign.clone(),
            Plane {
                callsign: record.callsign.clone(),
                position,
                motion,
                size_class,
                render_heading_deg,
                last_update: record.last_contact,
                handle,
            },
        );
        Ingest::Created
    }

    /// Returns the number of newly created planes.
    pub fn upsert_batch<I>(&mut self, records: I, now: i64) -> usize
    where
        I: IntoIterator<Item = StateRecord>,
    {
        let mut created = 0;
        for record in records {
            if self.upsert(&record, now) == Ingest::Created {
                created += 1;
            }
        }
        created
    }

    /// Moves every plane along its last known motion. `last_update` is untouched.
    pub fn extrapolate_all(&mut self, delta_s: f64) {
        for plane in self.planes.values_mut() {
            plane.position = self.reckoner.advance(&plane.position, &plane.motion, delta_s);
            self.target
                .update_renderable(&plane.handle, plane.position, plane.render_heading_deg);
        }
    }

    /// Drops planes whose last real report is more than `stale_after_s` old.
    pub fn evict(&mut self, now: i64, stale_after_s: i64) -> usize {
        let stale: Vec<String> = self
            .planes
            .values()
            .filter(|p| now - p.last_update > stale_after_s)
            .map(|p| p.callsign.clone())
            .collect();

        for callsign in &stale {
            if let Some(plane) = self.planes.remove(callsign) {
                self.target.remove_renderable(plane.handle);
            }
        }
        stale.len()
    }
}

#[cfg(test)]
impl<R: RenderTarget> PlaneRegistry<R> {
    pub fn is_empty(&self) -> bool {
        self.planes.is_empty()
    }

    pub fn get(&self, callsign: &str) -> Option<&Plane<R::Handle>> {
        self.planes.get(callsign)
    }

    pub fn target(&self) -> &R {
        &self.target
    }
}
