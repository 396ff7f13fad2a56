use std::sync::Arc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::config::ProjectPolicy;
use crate::database::models::{CreateProject, Project, UpdateProject};
use crate::database::repository::{ProjectRepository, UserRepository};
use crate::validation::rules;

use super::error::{ServiceError, ServiceResult};

/// Project CRUD and membership with ownership rules.
///
/// Stateless apart from its repository handles. The caller's id is always an
/// explicit argument. Name uniqueness is check-then-insert and membership is
/// load-then-save; neither pair is atomic.
#[derive(Clone)]
pub struct ProjectService {
    projects: Arc<dyn ProjectRepository>,
    users: Arc<dyn UserRepository>,
    policy: ProjectPolicy,
}

impl ProjectService {
    pub fn new(
        projects: Arc<dyn ProjectRepository>,
        users: Arc<dyn UserRepository>,
        policy: ProjectPolicy,
    ) -> Self {
        Self {
            projects,
            users,
            policy,
        }
    }

    pub async fn create_project(&self, input: CreateProject, caller: Uuid) -> ServiceResult<Project> {
        let fields = input.parse()?;

        if self.projects.find_by_name(&fields.name).await?.is_some() {
            warn!("Project name '{}' already taken", fields.name);
            return Err(ServiceError::conflict(format!(
                "A project named '{}' already exists",
                fields.name
            )));
        }

        let project = self.projects.insert(&Project::new(fields, caller)).await?;
        info!("Project {} '{}' created by {}", project.id, project.name, caller);
        Ok(project)
    }

    pub async fn get_project_by_id(&self, project_id: &str) -> ServiceResult<Project> {
        let id = rules::uuid("projectId", project_id)?;
        self.load(id).await
    }

    pub async fn get_all_projects_of_user(&self, caller: Uuid) -> ServiceResult<Vec<Project>> {
        Ok(self.projects.list_by_owner(caller).await?)
    }

    /// Admin-only at the routing layer; no identity check here.
    pub async fn get_all_projects(&self) -> ServiceResult<Vec<Project>> {
        Ok(self.projects.list_all().await?)
    }

    pub async fn update_project(
        &self,
        project_id: &str,
        patch: UpdateProject,
        caller: Uuid,
    ) -> ServiceResult<Project> {
        let changes = patch.parse()?;
        let id = rules::uuid("projectId", project_id)?;

        let mut project = self.load(id).await?;
        Self::ensure_owner(&project, caller, "update")?;

        if let Some(name) = changes.name.as_deref() {
            if name != project.name {
                if let Some(existing) = self.projects.find_by_name(name).await? {
                    if existing.id != project.id {
                        return Err(ServiceError::conflict(format!(
                            "A project named '{}' already exists",
                            name
                        )));
                    }
                }
            }
        }

        changes.apply(&mut project);
        let updated = self.projects.update(&project).await?;
        debug!("Project {} updated by {}", updated.id, caller);
        Ok(updated)
    }

    pub async fn delete_project(&self, project_id: &str, caller: Uuid) -> ServiceResult<Project> {
        let id = rules::uuid("projectId", project_id)?;

        let project = self.load(id).await?;
        if self.policy.delete_requires_owner {
            Self::ensure_owner(&project, caller, "delete")?;
        } else if !project.is_owned_by(caller) {
            info!("Project {} deleted by non-owner {}", project.id, caller);
        }

        let deleted = self
            .projects
            .delete(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project not found"))?;
        info!("Project {} '{}' deleted", deleted.id, deleted.name);
        Ok(deleted)
    }

    pub async fn add_member(
        &self,
        project_id: &str,
        user_id: &str,
        caller: Uuid,
    ) -> ServiceResult<Project> {
        let id = rules::uuid("projectId", project_id)?;
        let member = rules::uuid("userId", user_id)?;

        let mut project = self.load(id).await?;
        if self.users.find_by_id(member).await?.is_none() {
            return Err(ServiceError::not_found("User not found"));
        }
        Self::ensure_owner(&project, caller, "add members to")?;

        if !project.add_member(member) {
            return Err(ServiceError::conflict("User is already a member of this project"));
        }

        let updated = self.projects.update(&project).await?;
        info!("User {} added to project {}", member, updated.id);
        Ok(updated)
    }

    pub async fn get_projects_user_is_member_of(&self, user_id: &str) -> ServiceResult<Vec<Project>> {
        let member = rules::uuid("userId", user_id)?;
        Ok(self.projects.list_by_member(member).await?)
    }

    async fn load(&self, id: Uuid) -> ServiceResult<Project> {
        self.projects
            .find_by_id(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Project not found"))
    }

    fn ensure_owner(project: &Project, caller: Uuid, action: &str) -> ServiceResult<()> {
        if project.is_owned_by(caller) {
            return Ok(());
        }
        warn!("User {} tried to {} project {} owned by {}", caller, action, project.id, project.owner);
        Err(ServiceError::authorization(format!(
            "Only the project owner can {} this project",
            action
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::ProjectStatus;
    use crate::testing::TestRepos;

    fn alpha() -> CreateProject {
        CreateProject {
            name: "Alpha".into(),
            description: "d".into(),
            start_date: "2024-01-01".into(),
            end_date: "2024-12-31".into(),
        }
    }

    fn rename(name: &str) -> UpdateProject {
        UpdateProject {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_sets_owner_and_zero_hours() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;

        let project = service.create_project(alpha(), u1.id).await.unwrap();
        assert_eq!(project.owner, u1.id);
        assert_eq!(project.total_hours, 0.0);
        assert_eq!(project.status, ProjectStatus::NotStarted);
        assert!(project.members.is_empty());
    }

    #[tokio::test]
    async fn create_with_taken_name_conflicts_without_inserting() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u2 = repos.user("u2").await;

        service.create_project(alpha(), u1.id).await.unwrap();
        let err = service.create_project(alpha(), u2.id).await.unwrap_err();

        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(repos.projects.len().await, 1);
    }

    #[tokio::test]
    async fn create_rejects_whitespace_fields() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;

        for field in 0..4 {
            let mut input = alpha();
            match field {
                0 => input.name = "  ".into(),
                1 => input.description = "\n".into(),
                2 => input.start_date = "".into(),
                _ => input.end_date = " \t ".into(),
            }
            let err = service.create_project(input, u1.id).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }), "field {field}");
        }
        assert_eq!(repos.projects.len().await, 0);
    }

    #[tokio::test]
    async fn malformed_ids_fail_validation_before_lookup() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;

        for id in ["", "123", "not-a-uuid", "zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz"] {
            let err = service.get_project_by_id(id).await.unwrap_err();
            assert!(matches!(err, ServiceError::Validation { .. }), "id {id:?}");
        }
        let err = service.delete_project("nope", u1.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
        let err = service.get_projects_user_is_member_of("nope").await.unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn unknown_project_is_not_found() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());

        let err = service
            .get_project_by_id(&Uuid::new_v4().to_string())
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn any_caller_can_read_by_id() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;

        let created = service.create_project(alpha(), u1.id).await.unwrap();
        let fetched = service.get_project_by_id(&created.id.to_string()).await.unwrap();
        assert_eq!(fetched, created);
    }

    #[tokio::test]
    async fn lists_by_owner_and_everything() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u2 = repos.user("u2").await;

        service.create_project(alpha(), u1.id).await.unwrap();
        let mut beta = alpha();
        beta.name = "Beta".into();
        service.create_project(beta, u2.id).await.unwrap();

        let mine = service.get_all_projects_of_user(u1.id).await.unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].name, "Alpha");
        assert_eq!(service.get_all_projects().await.unwrap().len(), 2);

        let nobody = service.get_all_projects_of_user(Uuid::new_v4()).await.unwrap();
        assert!(nobody.is_empty());
    }

    #[tokio::test]
    async fn non_owner_update_is_rejected_and_leaves_project_unchanged() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u3 = repos.user("u3").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let err = service
            .update_project(&project.id.to_string(), rename("Beta"), u3.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authorization(_)));

        let stored = service.get_project_by_id(&project.id.to_string()).await.unwrap();
        assert_eq!(stored.name, "Alpha");
        assert_eq!(stored, project);
    }

    #[tokio::test]
    async fn owner_update_is_partial() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let patch = UpdateProject {
            status: Some("in_progress".into()),
            ..Default::default()
        };
        let updated = service
            .update_project(&project.id.to_string(), patch, u1.id)
            .await
            .unwrap();

        assert_eq!(updated.status, ProjectStatus::InProgress);
        assert_eq!(updated.name, "Alpha");
        assert_eq!(updated.description, "d");
        assert_eq!(updated.owner, u1.id);
        assert_eq!(updated.total_hours, 0.0);
    }

    #[tokio::test]
    async fn empty_patch_fails_validation() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let err = service
            .update_project(&project.id.to_string(), UpdateProject::default(), u1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn rename_onto_taken_name_conflicts() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();
        let mut beta = alpha();
        beta.name = "Beta".into();
        service.create_project(beta, u1.id).await.unwrap();

        let err = service
            .update_project(&project.id.to_string(), rename("Beta"), u1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        // Renaming to its own name is a no-op, not a conflict
        let same = service
            .update_project(&project.id.to_string(), rename("Alpha"), u1.id)
            .await
            .unwrap();
        assert_eq!(same.name, "Alpha");
    }

    #[tokio::test]
    async fn delete_without_owner_policy_allows_any_caller() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u3 = repos.user("u3").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let deleted = service.delete_project(&project.id.to_string(), u3.id).await.unwrap();
        assert_eq!(deleted, project);
        assert_eq!(repos.projects.len().await, 0);

        let err = service.delete_project(&project.id.to_string(), u1.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }

    #[tokio::test]
    async fn delete_with_owner_policy_rejects_non_owner() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy {
            delete_requires_owner: true,
        });
        let u1 = repos.user("u1").await;
        let u3 = repos.user("u3").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let err = service.delete_project(&project.id.to_string(), u3.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Authorization(_)));
        assert_eq!(repos.projects.len().await, 1);

        let deleted = service.delete_project(&project.id.to_string(), u1.id).await.unwrap();
        assert_eq!(deleted.id, project.id);
    }

    #[tokio::test]
    async fn adding_the_same_member_twice_conflicts() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u2 = repos.user("u2").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();
        let pid = project.id.to_string();

        let updated = service.add_member(&pid, &u2.id.to_string(), u1.id).await.unwrap();
        assert_eq!(updated.members, vec![u2.id]);

        let err = service.add_member(&pid, &u2.id.to_string(), u1.id).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));

        let stored = service.get_project_by_id(&pid).await.unwrap();
        assert_eq!(stored.members, vec![u2.id]);
    }

    #[tokio::test]
    async fn only_owner_can_add_members() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let u2 = repos.user("u2").await;
        let u3 = repos.user("u3").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let err = service
            .add_member(&project.id.to_string(), &u2.id.to_string(), u3.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Authorization(_)));
        let stored = service.get_project_by_id(&project.id.to_string()).await.unwrap();
        assert!(stored.members.is_empty());
    }

    #[tokio::test]
    async fn add_member_requires_existing_project_and_user() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let err = service
            .add_member(&project.id.to_string(), &Uuid::new_v4().to_string(), u1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "User not found"));

        let err = service
            .add_member(&Uuid::new_v4().to_string(), &u1.id.to_string(), u1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(ref m) if m == "Project not found"));

        let err = service
            .add_member(&project.id.to_string(), "bogus", u1.id)
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation { .. }));
    }

    #[tokio::test]
    async fn owner_is_not_a_member_unless_added() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());
        let u1 = repos.user("u1").await;
        let project = service.create_project(alpha(), u1.id).await.unwrap();

        let before = service
            .get_projects_user_is_member_of(&u1.id.to_string())
            .await
            .unwrap();
        assert!(before.is_empty());

        service
            .add_member(&project.id.to_string(), &u1.id.to_string(), u1.id)
            .await
            .unwrap();
        let after = service
            .get_projects_user_is_member_of(&u1.id.to_string())
            .await
            .unwrap();
        assert_eq!(after.len(), 1);
    }

    #[tokio::test]
    async fn member_listing_for_user_without_projects_is_empty() {
        let repos = TestRepos::new();
        let service = repos.project_service(ProjectPolicy::default());

        let projects = service
            .get_projects_user_is_member_of(&Uuid::new_v4().to_string())
            .await
            .unwrap();
        assert!(projects.is_empty());
    }
}
