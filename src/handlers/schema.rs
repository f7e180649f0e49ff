//! Input schema handler

use axum::Json;

use crate::logic::features::SchemaInfo;

/// Column layout and domains, for rendering the input form
pub async fn get() -> Json<SchemaInfo> {
    Json(SchemaInfo::current())
}
