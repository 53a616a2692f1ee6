// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::collections::BTreeMap;

use crate::layout::{
    ContextRow, DetailsRow, DetailsSection, context_row_at, details_row_at,
    find_selectable_help_row, is_help_row_selectable, max_cursor, wrap_cursor,
};
use crate::{
    CommandItem, DatabaseItem, HEALTH_REFRESH_TOAST, HelpAction, HelpItem, MenuConfig, MenuData,
    MenuTab, ModelItem, OperatingMode, ProjectItem, PromptItem, StrategyItem, SubMode,
    UPDATES_LABEL, UPGRADE_COMMAND, default_commands, default_help_entries,
    is_project_scoped_command,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuKey {
    Up,
    Down,
    Enter,
    Esc,
    Tab,
    BackTab,
    CtrlC,
    Other,
}

/// Selection confirmations pushed by the host. Applied even while hidden.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncMessage {
    ModeChanged { dev_mode: bool },
    DatabaseChanged { name: String },
    ModelChanged { name: String },
    ProjectChanged { name: String, namespace: String },
    StrategyChanged { name: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuMessage {
    Resize { width: u16, height: u16 },
    Sync(SyncMessage),
    Key(MenuKey),
}

/// Requests for the host. Apart from the mode rows, switches are never
/// applied locally: the host answers with the matching `SyncMessage`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuCommand {
    ModeSwitch {
        dev_mode: bool,
    },
    ProjectSwitch {
        name: String,
        namespace: String,
    },
    DatabaseSwitch {
        name: String,
    },
    ModelSwitch {
        name: String,
    },
    StrategySwitch {
        name: String,
    },
    RunCommand(String),
    ShowToast(String),
    CycleModel,
    InsertChatInput {
        text: String,
        ensure_dev_mode: bool,
        ensure_project_mode: bool,
        auto_send: bool,
    },
    Quit,
}

/// Side effects the menu may trigger outside its own state.
pub trait MenuEffects {
    fn copy_to_clipboard(&mut self, text: &str);
    /// Ask the host to restart the process after the next run-command.
    fn request_restart(&mut self);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NoEffects;

impl MenuEffects for NoEffects {
    fn copy_to_clipboard(&mut self, _text: &str) {}

    fn request_restart(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MenuState {
    pub config: MenuConfig,
    pub visible: bool,
    pub active_tab: MenuTab,
    pub sub_mode: SubMode,
    pub cursor: usize,
    pub project_cursor: usize,
    pub terminal_width: u16,
    pub terminal_height: u16,
    pub mode: OperatingMode,
    pub current_project: String,
    pub current_namespace: String,
    pub current_database: String,
    pub current_model: String,
    pub current_strategy: String,
    pub projects: Vec<ProjectItem>,
    pub databases: Vec<DatabaseItem>,
    pub strategies: Vec<StrategyItem>,
    pub models: Vec<ModelItem>,
    pub commands: Vec<CommandItem>,
    pub prompts: Vec<PromptItem>,
    pub dataset_names: Vec<String>,
    pub help_entries: Vec<HelpItem>,
    pub database_strategies: BTreeMap<String, Vec<StrategyItem>>,
    pub models_expanded: bool,
    pub datasets_expanded: bool,
    pub prompts_expanded: bool,
    pub health_summary: String,
}

impl MenuState {
    pub fn new(config: MenuConfig) -> Self {
        Self {
            current_project: config.name.clone(),
            current_namespace: config.namespace.clone(),
            config,
            visible: false,
            active_tab: MenuTab::Context,
            sub_mode: SubMode::Normal,
            cursor: 0,
            project_cursor: 0,
            terminal_width: 0,
            terminal_height: 0,
            mode: OperatingMode::Project,
            current_database: String::new(),
            current_model: String::new(),
            current_strategy: String::new(),
            projects: Vec::new(),
            databases: Vec::new(),
            strategies: Vec::new(),
            models: Vec::new(),
            commands: default_commands(),
            prompts: Vec::new(),
            dataset_names: Vec::new(),
            help_entries: default_help_entries(),
            database_strategies: BTreeMap::new(),
            models_expanded: false,
            datasets_expanded: false,
            prompts_expanded: false,
            health_summary: String::new(),
        }
    }

    pub fn open(&mut self) {
        self.visible = true;
        self.active_tab = MenuTab::Context;
        self.cursor = 0;
        self.sub_mode = SubMode::Normal;
    }

    pub fn close(&mut self) {
        self.visible = false;
    }

    pub fn toggle(&mut self) {
        if self.visible {
            self.close();
        } else {
            self.open();
        }
    }

    pub fn max_cursor(&self) -> usize {
        max_cursor(self, self.active_tab)
    }

    pub fn clamp_cursor(&mut self) {
        self.cursor = self.cursor.min(self.max_cursor());
        self.project_cursor = self
            .project_cursor
            .min(self.projects.len().saturating_sub(1));
    }

    /// Single entry point for host events. Resize and sync messages are
    /// applied regardless of visibility; keys only while visible.
    pub fn update(
        &mut self,
        message: MenuMessage,
        effects: &mut dyn MenuEffects,
    ) -> Vec<MenuCommand> {
        match message {
            MenuMessage::Resize { width, height } => {
                self.handle_resize(width, height);
                Vec::new()
            }
            MenuMessage::Sync(sync) => {
                self.apply_sync(sync);
                Vec::new()
            }
            MenuMessage::Key(key) => {
                let commands = self.handle_key(key, effects);
                for command in &commands {
                    tracing::debug!(?command, "quick menu emitted command");
                }
                commands
            }
        }
    }

    pub fn handle_resize(&mut self, width: u16, height: u16) {
        self.terminal_width = width;
        self.terminal_height = height;
    }

    pub fn apply_sync(&mut self, message: SyncMessage) {
        tracing::debug!(?message, "quick menu sync");
        match message {
            SyncMessage::ModeChanged { dev_mode } => {
                self.mode = OperatingMode::from_dev(dev_mode);
            }
            SyncMessage::DatabaseChanged { name } => {
                for database in &mut self.databases {
                    database.is_active = database.name == name;
                }
                self.current_database = name;
                self.derive_strategies();
                if let Some(first) = self.strategies.first_mut() {
                    first.is_active = true;
                    self.current_strategy = first.name.clone();
                } else {
                    self.current_strategy.clear();
                }
            }
            SyncMessage::ModelChanged { name } => {
                for model in &mut self.models {
                    model.is_active = model.name == name;
                }
                self.current_model = name;
            }
            SyncMessage::ProjectChanged { name, namespace } => {
                for project in &mut self.projects {
                    project.is_active = project.name == name && project.namespace == namespace;
                }
                self.current_project = name;
                self.current_namespace = namespace;
            }
            SyncMessage::StrategyChanged { name } => {
                for strategy in &mut self.strategies {
                    strategy.is_active = strategy.name == name;
                }
                self.current_strategy = name;
            }
        }
        self.clamp_cursor();
    }

    pub fn set_data(&mut self, data: MenuData) {
        let MenuData {
            models,
            databases,
            database_strategies,
            current_model,
            current_database,
            current_strategy,
        } = data;

        self.models = models;
        for model in &mut self.models {
            model.is_active = model.name == current_model;
        }
        self.databases = databases;
        for database in &mut self.databases {
            database.is_active = database.name == current_database;
        }
        self.database_strategies = database_strategies;
        self.current_model = current_model;
        self.current_database = current_database;
        self.current_strategy = current_strategy;
        self.derive_strategies();
        for strategy in &mut self.strategies {
            strategy.is_active = strategy.name == self.current_strategy;
        }
        self.clamp_cursor();
    }

    pub fn set_projects(&mut self, projects: Vec<ProjectItem>, name: &str, namespace: &str) {
        self.projects = projects;
        for project in &mut self.projects {
            project.is_active = project.name == name && project.namespace == namespace;
        }
        self.current_project = name.to_owned();
        self.current_namespace = namespace.to_owned();
        self.clamp_cursor();
    }

    pub fn set_prompts(&mut self, prompts: Vec<PromptItem>) {
        self.prompts = prompts;
        self.clamp_cursor();
    }

    pub fn set_dataset_names(&mut self, names: Vec<String>) {
        self.dataset_names = names;
        self.clamp_cursor();
    }

    pub fn set_update_available(&mut self, latest_version: &str) {
        if let Some(entry) = self.update_status_entry_mut() {
            entry.label = format!("Upgrade available: {latest_version} (enter to upgrade)");
            entry.command = UPGRADE_COMMAND.to_owned();
            entry.action = HelpAction::RunCommand;
        }
    }

    pub fn set_up_to_date(&mut self) {
        if let Some(entry) = self.update_status_entry_mut() {
            entry.label = "Up to date".to_owned();
            entry.command.clear();
            entry.action = HelpAction::None;
        }
    }

    pub fn set_health_summary(&mut self, text: impl Into<String>) {
        self.health_summary = text.into();
    }

    fn update_status_entry_mut(&mut self) -> Option<&mut HelpItem> {
        let header = self
            .help_entries
            .iter()
            .position(|entry| entry.label.trim() == UPDATES_LABEL)?;
        self.help_entries.get_mut(header + 1)
    }

    /// `strategies` mirrors `database_strategies[current_database]`.
    fn derive_strategies(&mut self) {
        self.strategies = self
            .database_strategies
            .get(&self.current_database)
            .cloned()
            .unwrap_or_default();
        for strategy in &mut self.strategies {
            strategy.is_active = false;
        }
    }

    pub fn handle_key(&mut self, key: MenuKey, effects: &mut dyn MenuEffects) -> Vec<MenuCommand> {
        if !self.visible {
            return Vec::new();
        }

        if self.sub_mode == SubMode::ProjectPicker {
            return self.handle_project_picker_key(key);
        }

        match key {
            MenuKey::Esc => {
                self.close();
                Vec::new()
            }
            MenuKey::CtrlC => vec![MenuCommand::Quit],
            MenuKey::Tab => {
                self.rotate_tab(1);
                Vec::new()
            }
            MenuKey::BackTab => {
                self.rotate_tab(-1);
                Vec::new()
            }
            MenuKey::Up => {
                self.move_cursor(-1);
                Vec::new()
            }
            MenuKey::Down => {
                self.move_cursor(1);
                Vec::new()
            }
            MenuKey::Enter => match self.active_tab {
                MenuTab::Context => self.select_context_row(),
                MenuTab::Details => self.select_details_row(),
                MenuTab::Help => self.select_help_row(effects),
            },
            MenuKey::Other => Vec::new(),
        }
    }

    fn rotate_tab(&mut self, delta: isize) {
        self.active_tab = self.active_tab.rotate(delta);
        self.cursor = 0;
    }

    fn move_cursor(&mut self, delta: isize) {
        if self.active_tab == MenuTab::Help {
            if let Some(next) = find_selectable_help_row(&self.help_entries, self.cursor, delta) {
                self.cursor = next;
            }
            return;
        }
        self.cursor = wrap_cursor(self.cursor, delta, self.max_cursor());
    }

    fn handle_project_picker_key(&mut self, key: MenuKey) -> Vec<MenuCommand> {
        match key {
            MenuKey::Esc => {
                self.sub_mode = SubMode::Normal;
                Vec::new()
            }
            MenuKey::Up | MenuKey::Down if !self.projects.is_empty() => {
                let delta = if key == MenuKey::Up { -1 } else { 1 };
                self.project_cursor =
                    wrap_cursor(self.project_cursor, delta, self.projects.len() - 1);
                Vec::new()
            }
            MenuKey::Enter => {
                self.sub_mode = SubMode::Normal;
                self.projects
                    .get(self.project_cursor)
                    .map(|project| MenuCommand::ProjectSwitch {
                        name: project.name.clone(),
                        namespace: project.namespace.clone(),
                    })
                    .into_iter()
                    .collect()
            }
            _ => Vec::new(),
        }
    }

    fn open_project_picker(&mut self) {
        self.sub_mode = SubMode::ProjectPicker;
        self.project_cursor = self
            .projects
            .iter()
            .position(|project| project.is_active)
            .unwrap_or(0);
    }

    fn select_context_row(&mut self) -> Vec<MenuCommand> {
        let Some(row) = context_row_at(self, self.cursor) else {
            return Vec::new();
        };

        let command = match row {
            ContextRow::ProjectMode => {
                if !self.mode.is_dev() {
                    return Vec::new();
                }
                self.mode = OperatingMode::Project;
                self.clamp_cursor();
                MenuCommand::ModeSwitch { dev_mode: false }
            }
            ContextRow::DevMode => {
                if self.mode.is_dev() {
                    return Vec::new();
                }
                self.mode = OperatingMode::Dev;
                self.clamp_cursor();
                MenuCommand::ModeSwitch { dev_mode: true }
            }
            ContextRow::Project => {
                self.open_project_picker();
                return Vec::new();
            }
            ContextRow::Database(index) => MenuCommand::DatabaseSwitch {
                name: self.databases[index].name.clone(),
            },
            ContextRow::Strategy(index) => MenuCommand::StrategySwitch {
                name: self.strategies[index].name.clone(),
            },
            ContextRow::Model(index) => MenuCommand::ModelSwitch {
                name: self.models[index].name.clone(),
            },
        };
        vec![command]
    }

    fn select_details_row(&mut self) -> Vec<MenuCommand> {
        let Some(row) = details_row_at(self, self.cursor) else {
            return Vec::new();
        };

        match row {
            DetailsRow::Toggle(section) => {
                let flag = match section {
                    DetailsSection::Models => &mut self.models_expanded,
                    DetailsSection::Datasets => &mut self.datasets_expanded,
                    DetailsSection::Prompts => &mut self.prompts_expanded,
                };
                *flag = !*flag;
                self.clamp_cursor();
                Vec::new()
            }
            DetailsRow::Model(index) => vec![MenuCommand::ModelSwitch {
                name: self.models[index].name.clone(),
            }],
            DetailsRow::Dataset(index) => self
                .databases
                .get(index)
                .map(|database| MenuCommand::DatabaseSwitch {
                    name: database.name.clone(),
                })
                .into_iter()
                .collect(),
            // Reserved; prompts are display-only for now.
            DetailsRow::Prompt(_) => Vec::new(),
            DetailsRow::Command(index) => {
                self.close();
                vec![MenuCommand::RunCommand(self.commands[index].command.clone())]
            }
        }
    }

    fn select_help_row(&mut self, effects: &mut dyn MenuEffects) -> Vec<MenuCommand> {
        if !is_help_row_selectable(&self.help_entries, self.cursor) {
            return Vec::new();
        }
        let entry = self.help_entries[self.cursor].clone();

        match entry.action {
            HelpAction::ToggleMode => {
                return vec![MenuCommand::ModeSwitch {
                    dev_mode: !self.mode.is_dev(),
                }];
            }
            HelpAction::CycleModel => return vec![MenuCommand::CycleModel],
            HelpAction::RefreshHealth => {
                return vec![MenuCommand::ShowToast(HEALTH_REFRESH_TOAST.to_owned())];
            }
            HelpAction::Copy => {
                effects.copy_to_clipboard(&entry.command);
                return vec![MenuCommand::ShowToast(format!("Copied: {}", entry.command))];
            }
            HelpAction::RunCommand => {
                self.close();
                effects.request_restart();
                return vec![MenuCommand::RunCommand(entry.command)];
            }
            HelpAction::None | HelpAction::Other(_) => {}
        }

        if entry.command.is_empty() {
            return Vec::new();
        }

        let project_scoped = is_project_scoped_command(&entry.command);
        self.close();
        vec![MenuCommand::InsertChatInput {
            text: entry.command,
            ensure_dev_mode: !project_scoped,
            ensure_project_mode: project_scoped,
            auto_send: !entry.needs_text_input,
        }]
    }
}
