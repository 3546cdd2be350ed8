//! Projects and the "active project" context.
//!
//! The project collection is shared with the front end, which owns goals and
//! todo lists. The core only reads the active project's context when a
//! session is recorded and writes back streak fields; anything else stored
//! on a project is carried through untouched.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ProjectError, Result, StoreError};
use crate::storage::{JsonStoreExt, SharedStore, ACTIVE_PROJECT_KEY, PROJECTS_KEY};
use crate::streak::CheckIn;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Todo {
    pub text: String,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub goal: String,
    /// Video id of the focus music attached to the project.
    #[serde(default)]
    pub music: String,
    #[serde(default)]
    pub todos: Vec<Todo>,
    /// Daily focus target in minutes; 0 means no target.
    #[serde(default)]
    pub target_focus_time: u64,
    #[serde(default)]
    pub check_ins: Vec<CheckIn>,
    #[serde(default)]
    pub streak: u32,
    /// Local midnight (epoch ms) of the last check-in day.
    #[serde(default)]
    pub last_check_in: Option<i64>,
    /// Fields owned by other layers.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Project {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            goal: String::new(),
            music: String::new(),
            todos: Vec::new(),
            target_focus_time: 0,
            check_ins: Vec::new(),
            streak: 0,
            last_check_in: None,
            extra: serde_json::Map::new(),
        }
    }
}

/// Reads and writes the project collection in the store.
#[derive(Clone)]
pub struct ProjectContext {
    store: SharedStore,
}

impl ProjectContext {
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    pub fn projects(&self) -> Result<Vec<Project>, StoreError> {
        self.store.get_json(PROJECTS_KEY, Vec::new())
    }

    pub fn active_id(&self) -> Result<Option<String>, StoreError> {
        self.store.get_json(ACTIVE_PROJECT_KEY, None)
    }

    /// The project sessions are attributed to right now, if any.
    pub fn active(&self) -> Result<Option<Project>, StoreError> {
        let Some(id) = self.active_id()? else {
            return Ok(None);
        };
        Ok(self.projects()?.into_iter().find(|p| p.id == id))
    }

    pub fn get(&self, id: &str) -> Result<Option<Project>, StoreError> {
        Ok(self.projects()?.into_iter().find(|p| p.id == id))
    }

    /// Replace the stored project with the same id.
    pub fn save(&self, project: &Project) -> Result<()> {
        let mut projects = self.projects()?;
        let slot = projects
            .iter_mut()
            .find(|p| p.id == project.id)
            .ok_or_else(|| ProjectError::NotFound(project.id.clone()))?;
        *slot = project.clone();
        self.store.set_json(PROJECTS_KEY, &projects)?;
        Ok(())
    }

    /// Add a project. The first project created becomes the active one.
    pub fn create(&self, name: &str, target_focus_time: u64) -> Result<Project> {
        let name = name.trim();
        if name.is_empty() {
            return Err(ProjectError::EmptyName.into());
        }
        let mut project = Project::new(name);
        project.target_focus_time = target_focus_time;

        let mut projects = self.projects()?;
        projects.push(project.clone());
        self.store.set_json(PROJECTS_KEY, &projects)?;

        if self.active_id()?.is_none() {
            self.store.set_json(ACTIVE_PROJECT_KEY, &project.id)?;
        }
        Ok(project)
    }

    pub fn set_active(&self, id: &str) -> Result<()> {
        if self.get(id)?.is_none() {
            return Err(ProjectError::NotFound(id.to_string()).into());
        }
        self.store.set_json(ACTIVE_PROJECT_KEY, id)?;
        Ok(())
    }

    pub fn set_target(&self, id: &str, minutes: u64) -> Result<Project> {
        let mut project = self
            .get(id)?
            .ok_or_else(|| ProjectError::NotFound(id.to_string()))?;
        project.target_focus_time = minutes;
        self.save(&project)?;
        Ok(project)
    }
}
