//! OpenAPI documentation.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::error;
use crate::handlers;
use tubely_core::models;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Tubely API",
        version = "0.1.0",
        description = "Video upload service. Uploaded videos are remuxed for fast start, stored in object storage under an aspect-ratio prefix and attached to their video record. Versioned endpoints live under /api/v1/."
    ),
    paths(
        handlers::health::health_check,
        handlers::video_create::create_video,
        handlers::video_get::get_video,
        handlers::video_upload::upload_video,
    ),
    components(
        schemas(
            models::CreateVideoRequest,
            models::VideoResponse,
            models::VideoLocation,
            handlers::health::HealthResponse,
            error::ErrorResponse,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "videos", description = "Video records and uploads"),
        (name = "health", description = "Liveness")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spec_lists_upload_path() {
        let spec = get_openapi_spec();
        assert!(spec
            .paths
            .paths
            .contains_key("/api/v1/video_upload/{video_id}"));
        assert!(spec.paths.paths.contains_key("/api/v1/videos/{video_id}"));
        let components = spec.components.unwrap();
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
