use utoipa::OpenApi;

use super::api::error::ErrorResponse;

#[derive(OpenApi)]
#[openapi(
    paths(
        super::api::tracker::status,
        super::api::tracker::planes,
        super::api::tracker::location,
    ),
    components(
        schemas(
            ErrorResponse,
            crate::tracker::TrackerStatus,
            crate::tracker::TrackerMode,
            crate::tracker::BoundingBox,
            crate::tracker::GeoPosition,
            crate::tracker::SizeClass,
            crate::config::DataMode,
            crate::render::Renderable,
        )
    ),
    info(
        title = "Plane-O-Mat Tracker API",
        description = "Live aircraft tracking around a moving location",
        version = "0.1.0"
    ),
    tags(
        (name = "tracker", description = "Tracker state and location input")
    )
)]
pub struct ApiDoc;
