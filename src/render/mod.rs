mod scene;

pub use scene::{Renderable, SharedScene};

use crate::tracker::{GeoPosition, SizeClass};

/// Whatever draws the planes. Calls are synchronous and infallible from the
/// tracker's point of view.
pub trait RenderTarget {
    type Handle;

    fn create_renderable(
        &mut self,
        geometry: GeoPosition,
        symbol: SizeClass,
        heading_deg: f64,
        label: &str,
    ) -> Self::Handle;

    fn update_renderable(&mut self, handle: &Self::Handle, geometry: GeoPosition, heading_deg: f64);

    fn remove_renderable(&mut self, handle: Self::Handle);
}
