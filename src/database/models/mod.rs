pub mod project;
pub mod user;

pub use project::{
    CreateProject, NewProject, Project, ProjectChanges, ProjectStatus, UpdateProject,
};
pub use user::{LoginUser, RegisterUser, Role, User};
