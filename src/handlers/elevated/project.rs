// handlers/elevated/project.rs - GET /api/project/getAllProjects

use axum::{extract::State, Extension};

use crate::database::models::Project;
use crate::middleware::{ApiResponse, ApiResult, AuthUser};
use crate::services::ProjectService;

/// Every project in the system. Admin role required.
pub async fn get_all_projects(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<Project>> {
    let all = projects.get_all_projects().await?;
    tracing::debug!("Admin {} listed {} projects", auth_user.username, all.len());
    Ok(ApiResponse::success(all))
}
