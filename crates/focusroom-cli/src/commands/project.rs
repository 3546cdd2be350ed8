//! Project management commands for CLI.

use clap::Subcommand;
use focusroom_core::ProjectContext;
use serde::Serialize;

use super::{open_store, print_json, CmdResult};

#[derive(Subcommand)]
pub enum ProjectAction {
    /// Create a new project (the first one becomes active)
    Create {
        /// Project name
        name: String,
        /// Daily focus target in minutes
        #[arg(long, default_value = "0")]
        target: u64,
        /// Session goal copied into each history entry
        #[arg(long)]
        goal: Option<String>,
    },
    /// List all projects
    List,
    /// Attribute future sessions to a project
    Use {
        /// Project ID
        id: String,
    },
    /// Set a project's daily focus target
    Target {
        /// Project ID
        id: String,
        /// Minutes per day
        minutes: u64,
    },
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectRow {
    id: String,
    name: String,
    active: bool,
    target_focus_time: u64,
    streak: u32,
}

pub fn run(action: ProjectAction) -> CmdResult {
    let ctx = ProjectContext::new(open_store()?);

    match action {
        ProjectAction::Create { name, target, goal } => {
            let mut project = ctx.create(&name, target)?;
            if let Some(goal) = goal {
                project.goal = goal;
                ctx.save(&project)?;
            }
            eprintln!("Project created: {}", project.id);
            print_json(&project)?;
        }
        ProjectAction::List => {
            let active = ctx.active_id()?;
            let rows: Vec<ProjectRow> = ctx
                .projects()?
                .into_iter()
                .map(|p| ProjectRow {
                    active: active.as_deref() == Some(p.id.as_str()),
                    id: p.id,
                    name: p.name,
                    target_focus_time: p.target_focus_time,
                    streak: p.streak,
                })
                .collect();
            print_json(&rows)?;
        }
        ProjectAction::Use { id } => {
            ctx.set_active(&id)?;
            print_json(&ctx.active()?)?;
        }
        ProjectAction::Target { id, minutes } => {
            let project = ctx.set_target(&id, minutes)?;
            print_json(&project)?;
        }
    }
    Ok(())
}
