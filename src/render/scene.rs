use serde::Serialize;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

use super::RenderTarget;
use crate::tracker::{GeoPosition, SizeClass};

#[derive(Debug, Clone, Serialize, utoipa::ToSchema)]
pub struct Renderable {
    pub id: Uuid,
    pub label: String,
    pub symbol: SizeClass,
    pub position: GeoPosition,
    pub heading_deg: f64,
}

/// In-memory scene graph of plane symbols.
#[derive(Debug, Default)]
pub struct Scene {
    renderables: HashMap<Uuid, Renderable>,
}

impl Scene {
    /// Sorted by label so API output is stable.
    pub fn snapshot(&self) -> Vec<Renderable> {
        let mut out: Vec<_> = self.renderables.values().cloned().collect();
        out.sort_by(|a, b| a.label.cmp(&b.label));
        out
    }
}

impl RenderTarget for Scene {
    type Handle = Uuid;

    fn create_renderable(
        &mut self,
        geometry: GeoPosition,
        symbol: SizeClass,
        heading_deg: f64,
        label: &str,
    ) -> Uuid {
        let id = Uuid::new_v4();
        self.renderables.insert(
            id,
            Renderable {
                id,
                label: label.to_string(),
                symbol,
                position: geometry,
                heading_deg,
            },
        );
        id
    }

    fn update_renderable(&mut self, handle: &Uuid, geometry: GeoPosition, heading_deg: f64) {
        match self.renderables.get_mut(handle) {
            Some(r) => {
                r.position = geometry;
                r.heading_deg = heading_deg;
            }
            None => log::warn!("update for unknown renderable {}", handle),
        }
    }

    fn remove_renderable(&mut self, handle: Uuid) {
        self.renderables.remove(&handle);
    }
}

/// Scene shared between the tracker task and the web handlers.
#[derive(Debug, Clone, Default)]
pub struct SharedScene(Arc<Mutex<Scene>>);

impl SharedScene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn snapshot(&self) -> Vec<Renderable> {
        self.0.lock().unwrap().snapshot()
    }
}

impl RenderTarget for SharedScene {
    type Handle = Uuid;

    fn create_renderable(
        &mut self,
        geometry: GeoPosition,
        symbol: SizeClass,
        heading_deg: f64,
        label: &str,
    ) -> Uuid {
        self.0
            .lock()
            .unwrap()
            .create_renderable(geometry, symbol, heading_deg, label)
    }

    fn update_renderable(&mut self, handle: &Uuid, geometry: GeoPosition, heading_deg: f64) {
        self.0
            .lock()
            .unwrap()
            .update_renderable(handle, geometry, heading_deg)
    }

    fn remove_renderable(&mut self, handle: Uuid) {
        self.0.lock().unwrap().remove_renderable(handle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_lifecycle() {
        let mut scene = Scene::default();
        let p = GeoPosition::new(1.0, 2.0, 3.0);

        let id = scene.create_renderable(p, SizeClass::Heavy, 90.0, "DLH400");
        let snapshot = scene.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, id);
        assert_eq!(snapshot[0].label, "DLH400");

        let q = GeoPosition::new(1.5, 2.5, 3.5);
        scene.update_renderable(&id, q, 270.0);
        let r = &scene.snapshot()[0];
        assert_eq!(r.position, q);
        assert_eq!(r.heading_deg, 270.0);

        scene.remove_renderable(id);
        assert!(scene.snapshot().is_empty());
    }

    #[test]
    fn test_shared_scene_snapshot_sorted() {
        let mut shared = SharedScene::new();
        let p = GeoPosition::default();
        shared.create_renderable(p, SizeClass::Heavy, 0.0, "UAL1");
        shared.create_renderable(p, SizeClass::Light, 180.0, "N123AB");

        let mut clone = shared.clone();
        clone.create_renderable(p, SizeClass::Heavy, 0.0, "AAL9");

        let labels: Vec<_> = shared.snapshot().into_iter().map(|r| r.label).collect();
        assert_eq!(labels, vec!["AAL9", "N123AB", "UAL1"]);
    }
}
