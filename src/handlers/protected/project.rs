// handlers/protected/project.rs - /api/project/* handlers for any signed-in user

use axum::{
    extract::{Path, State},
    Extension,
};

use crate::database::models::{CreateProject, Project, UpdateProject};
use crate::middleware::{ApiResponse, ApiResult, AuthUser, Valid};
use crate::services::ProjectService;

/**
 * POST /api/project/createProject - Create a project owned by the caller
 *
 * Expected Input:
 * ```json
 * {
 *   "name": "Alpha",            // Required, unique across projects
 *   "description": "string",    // Required
 *   "startDate": "2024-01-01",  // Required, YYYY-MM-DD
 *   "endDate": "2024-06-30"     // Required, YYYY-MM-DD
 * }
 * ```
 */
pub async fn create_project(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
    Valid(input): Valid<CreateProject>,
) -> ApiResult<Project> {
    let project = projects.create_project(input, auth_user.user_id).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/project/getProjectById/:projectId
pub async fn get_project_by_id(
    State(projects): State<ProjectService>,
    Path(project_id): Path<String>,
) -> ApiResult<Project> {
    let project = projects.get_project_by_id(&project_id).await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/project/getProjectsOfAUser - Projects the caller owns
pub async fn get_projects_of_a_user(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
) -> ApiResult<Vec<Project>> {
    let owned = projects.get_all_projects_of_user(auth_user.user_id).await?;
    Ok(ApiResponse::success(owned))
}

/**
 * PATCH /api/project/updateProject/:projectId - Owner-only partial update
 *
 * Any non-empty subset of `name`, `description`, `startDate`, `endDate`,
 * `status`. Owner, members and totalHours are not writable here.
 */
pub async fn update_project(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
    Path(project_id): Path<String>,
    Valid(patch): Valid<UpdateProject>,
) -> ApiResult<Project> {
    let project = projects
        .update_project(&project_id, patch, auth_user.user_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// DELETE /api/project/deleteProject/:projectId - Returns the deleted project
pub async fn delete_project(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
    Path(project_id): Path<String>,
) -> ApiResult<Project> {
    let deleted = projects.delete_project(&project_id, auth_user.user_id).await?;
    Ok(ApiResponse::success(deleted))
}

/// PATCH /api/project/addMembersToProject/:projectId/user/:userId
pub async fn add_members_to_project(
    State(projects): State<ProjectService>,
    Extension(auth_user): Extension<AuthUser>,
    Path((project_id, user_id)): Path<(String, String)>,
) -> ApiResult<Project> {
    let project = projects
        .add_member(&project_id, &user_id, auth_user.user_id)
        .await?;
    Ok(ApiResponse::success(project))
}

/// GET /api/project/getAllProjectsUserIsMemberOf/:userId
pub async fn get_all_projects_user_is_member_of(
    State(projects): State<ProjectService>,
    Path(user_id): Path<String>,
) -> ApiResult<Vec<Project>> {
    let member_of = projects.get_projects_user_is_member_of(&user_id).await?;
    Ok(ApiResponse::success(member_of))
}
