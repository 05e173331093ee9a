use crate::routes::{admin, analysis, health, objects};
use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(info(
    title = "astro-server",
    description = "Exoplanet host-star catalog API",
    version = "0.1.0"
))]
pub struct ApiDoc;

pub fn get_docs() -> utoipa::openapi::OpenApi {
    let mut root = ApiDoc::openapi();
    root.merge(health::HealthApi::openapi());
    root.merge(objects::ObjectsApi::openapi());
    root.merge(analysis::AnalysisApi::openapi());
    root.merge(admin::api_docs());
    root
}
