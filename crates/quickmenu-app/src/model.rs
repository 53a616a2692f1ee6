// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Label prefix of the help entry that describes opening this menu. It is
/// never selectable.
pub const OPEN_MENU_LABEL_PREFIX: &str = "Open menu";
pub const UPDATES_LABEL: &str = "Updates:";
pub const UPGRADE_COMMAND: &str = "lf version upgrade";
pub const HEALTH_REFRESH_TOAST: &str = "Refreshing health status...";

/// Command prefixes that address project-scoped settings.
pub const PROJECT_SCOPED_PREFIXES: [&str; 3] = ["/model ", "/database ", "/strategy "];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MenuTab {
    Context,
    Details,
    Help,
}

impl MenuTab {
    pub const ALL: [Self; 3] = [Self::Context, Self::Details, Self::Help];

    pub const fn label(self) -> &'static str {
        match self {
            Self::Context => "Context",
            Self::Details => "Commands",
            Self::Help => "Help",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "context" => Some(Self::Context),
            "details" | "commands" => Some(Self::Details),
            "help" => Some(Self::Help),
            _ => None,
        }
    }

    pub fn rotate(self, delta: isize) -> Self {
        let tabs = Self::ALL;
        let current = tabs.iter().position(|tab| *tab == self).unwrap_or(0) as isize;
        let len = tabs.len() as isize;
        tabs[(current + delta).rem_euclid(len) as usize]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SubMode {
    Normal,
    ProjectPicker,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OperatingMode {
    Project,
    Dev,
}

impl OperatingMode {
    pub const fn from_dev(dev_mode: bool) -> Self {
        if dev_mode { Self::Dev } else { Self::Project }
    }

    pub const fn is_dev(self) -> bool {
        matches!(self, Self::Dev)
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Project => "project",
            Self::Dev => "dev",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuConfig {
    pub name: String,
    pub namespace: String,
    pub version: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectItem {
    pub name: String,
    pub namespace: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseItem {
    pub name: String,
    pub doc_count: u64,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyItem {
    pub name: String,
    pub is_active: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelItem {
    pub name: String,
    pub provider: String,
    pub is_active: bool,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandItem {
    pub command: String,
    pub description: String,
}

impl CommandItem {
    pub fn new(command: &str, description: &str) -> Self {
        Self {
            command: command.to_owned(),
            description: description.to_owned(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptItem {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum HelpAction {
    None,
    ToggleMode,
    CycleModel,
    RefreshHealth,
    Copy,
    RunCommand,
    Other(String),
}

impl HelpAction {
    pub fn parse(value: &str) -> Self {
        match value.trim() {
            "" => Self::None,
            "toggle-mode" | "ctrl+t" => Self::ToggleMode,
            "ctrl+k" => Self::CycleModel,
            "refresh-health" => Self::RefreshHealth,
            "copy" => Self::Copy,
            "run-cmd" => Self::RunCommand,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::None => "",
            Self::ToggleMode => "toggle-mode",
            Self::CycleModel => "ctrl+k",
            Self::RefreshHealth => "refresh-health",
            Self::Copy => "copy",
            Self::RunCommand => "run-cmd",
            Self::Other(value) => value,
        }
    }

    pub const fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelpItem {
    pub label: String,
    pub command: String,
    pub needs_text_input: bool,
    pub action: HelpAction,
}

impl HelpItem {
    pub fn header(label: &str) -> Self {
        Self {
            label: label.to_owned(),
            command: String::new(),
            needs_text_input: false,
            action: HelpAction::None,
        }
    }

    pub fn blank() -> Self {
        Self::header("")
    }

    pub fn command(label: &str, command: &str) -> Self {
        Self {
            command: command.to_owned(),
            ..Self::header(label)
        }
    }

    pub fn text_input(label: &str, command: &str) -> Self {
        Self {
            needs_text_input: true,
            ..Self::command(label, command)
        }
    }

    pub fn action(label: &str, command: &str, action: HelpAction) -> Self {
        Self {
            action,
            ..Self::command(label, command)
        }
    }
}

/// Wholesale replacement payload for models, databases and strategies.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MenuData {
    pub models: Vec<ModelItem>,
    pub databases: Vec<DatabaseItem>,
    pub database_strategies: BTreeMap<String, Vec<StrategyItem>>,
    pub current_model: String,
    pub current_database: String,
    pub current_strategy: String,
}

/// The first three entries are the Details tab toggle rows.
pub fn default_commands() -> Vec<CommandItem> {
    vec![
        CommandItem::new("/models", "List models configured for this project"),
        CommandItem::new("/datasets", "List datasets and their databases"),
        CommandItem::new("/prompts", "List prompt sets"),
        CommandItem::new("/clear", "Clear the chat transcript"),
        CommandItem::new("/help", "Show chat commands"),
        CommandItem::new("/status", "Show services and project status"),
        CommandItem::new("/history", "Show recent chat history"),
        CommandItem::new("/exit", "Leave the chat"),
    ]
}

pub fn default_help_entries() -> Vec<HelpItem> {
    vec![
        HelpItem::header(UPDATES_LABEL),
        HelpItem::header("Checking for updates..."),
        HelpItem::blank(),
        HelpItem::header("Shortcuts:"),
        HelpItem::header(&format!("{OPEN_MENU_LABEL_PREFIX}            ctrl+o")),
        HelpItem::action("Toggle dev/project mode  ctrl+t", "", HelpAction::ToggleMode),
        HelpItem::action("Cycle model              ctrl+k", "", HelpAction::CycleModel),
        HelpItem::blank(),
        HelpItem::header("Chat commands:"),
        HelpItem::text_input("Change model", "/model "),
        HelpItem::text_input("Change database", "/database "),
        HelpItem::text_input("Change strategy", "/strategy "),
        HelpItem::text_input("Ask the knowledge base", "/rag "),
        HelpItem::command("Clear chat", "/clear"),
        HelpItem::command("Show chat help", "/help"),
        HelpItem::blank(),
        HelpItem::header("Diagnostics:"),
        HelpItem::action("Refresh health summary", "", HelpAction::RefreshHealth),
        HelpItem::action("Copy services status command", "lf services status", HelpAction::Copy),
    ]
}

pub fn is_project_scoped_command(command: &str) -> bool {
    PROJECT_SCOPED_PREFIXES
        .iter()
        .any(|prefix| command.starts_with(prefix) || command == prefix.trim_end())
}
