// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::{Result, anyhow, bail};
use quickmenu_app::{
    DatabaseItem, MenuCommand, MenuConfig, MenuData, MenuState, ModelItem, OperatingMode,
    ProjectItem, PromptItem, StrategyItem, SyncMessage, UPGRADE_COMMAND,
};
use quickmenu_tui::{HostResponse, MenuHost};
use std::collections::BTreeMap;
use time::OffsetDateTime;
use time::macros::format_description;

const DEMO_MODELS: [(&str, &str, &str); 3] = [
    ("llama3.1:8b", "ollama", "Local general model, good default for chat"),
    ("gpt-4o-mini", "openai", "Hosted model with stronger reasoning"),
    ("qwen2.5-vl", "lemonade", "Vision model that accepts image attachments"),
];
const DEMO_DATABASES: [(&str, u64, &[&str]); 2] = [
    ("main_db", 128, &["hybrid", "dense", "bm25"]),
    ("archive_db", 2048, &["bm25"]),
];
const DEMO_PROJECTS: [(&str, &str); 3] = [
    ("demo", "default"),
    ("support-bot", "default"),
    ("research", "lab"),
];

/// In-process stand-in for the chat backend. Accepts every switch request
/// for a known item and answers with the matching sync message.
#[derive(Debug, Clone)]
pub struct DemoHost {
    models: Vec<String>,
    databases: BTreeMap<String, Vec<String>>,
    projects: Vec<(String, String)>,
    current_model: String,
    mode: OperatingMode,
    latest_version: Option<String>,
}

impl Default for DemoHost {
    fn default() -> Self {
        Self::new()
    }
}

impl DemoHost {
    pub fn new() -> Self {
        Self {
            models: DEMO_MODELS
                .iter()
                .map(|(name, _, _)| (*name).to_owned())
                .collect(),
            databases: DEMO_DATABASES
                .iter()
                .map(|(name, _, strategies)| {
                    (
                        (*name).to_owned(),
                        strategies.iter().map(|s| (*s).to_owned()).collect(),
                    )
                })
                .collect(),
            projects: DEMO_PROJECTS
                .iter()
                .map(|(name, namespace)| ((*name).to_owned(), (*namespace).to_owned()))
                .collect(),
            current_model: DEMO_MODELS[0].0.to_owned(),
            mode: OperatingMode::Project,
            latest_version: None,
        }
    }

    pub fn with_latest_version(mut self, version: impl Into<String>) -> Self {
        self.latest_version = Some(version.into());
        self
    }

    /// A closed menu populated with the demo catalog.
    pub fn initial_state(&self, config: MenuConfig) -> MenuState {
        let (name, namespace) = (config.name.clone(), config.namespace.clone());
        let mut state = MenuState::new(config);
        state.set_data(demo_data());
        state.set_projects(
            DEMO_PROJECTS
                .iter()
                .map(|(name, namespace)| ProjectItem {
                    name: (*name).to_owned(),
                    namespace: (*namespace).to_owned(),
                    is_active: false,
                })
                .collect(),
            &name,
            &namespace,
        );
        state.set_prompts(vec![
            PromptItem {
                name: "default".to_owned(),
                description: "General assistant".to_owned(),
            },
            PromptItem {
                name: "support".to_owned(),
                description: "Friendly customer support tone".to_owned(),
            },
        ]);
        state.set_dataset_names(vec!["handbook".to_owned(), "tickets".to_owned()]);
        state
    }

    fn run_chat_command(&self, command: &str) -> HostResponse {
        if command == UPGRADE_COMMAND {
            return HostResponse {
                toast: Some("Upgrade started; restart quickmenu when it finishes".to_owned()),
                ..HostResponse::default()
            };
        }
        let lines = if command.starts_with("/models") {
            self.models
                .iter()
                .map(|name| {
                    let marker = if *name == self.current_model { "*" } else { " " };
                    format!("{marker} {name}")
                })
                .collect()
        } else if command.starts_with("/datasets") {
            self.databases.keys().map(|name| format!("  {name}")).collect()
        } else if command.starts_with("/status") {
            vec![format!(
                "model {} · {} mode",
                self.current_model,
                self.mode.label()
            )]
        } else {
            vec![format!("ran {command}")]
        };
        HostResponse {
            transcript: lines,
            ..HostResponse::default()
        }
    }

    fn next_model(&self) -> Option<&str> {
        let position = self
            .models
            .iter()
            .position(|name| *name == self.current_model)
            .map_or(0, |index| (index + 1) % self.models.len());
        self.models.get(position).map(String::as_str)
    }
}

impl MenuHost for DemoHost {
    fn handle_command(&mut self, command: &MenuCommand) -> Result<HostResponse> {
        let sync = match command {
            MenuCommand::ModeSwitch { dev_mode } => {
                self.mode = OperatingMode::from_dev(*dev_mode);
                SyncMessage::ModeChanged {
                    dev_mode: *dev_mode,
                }
            }
            MenuCommand::ProjectSwitch { name, namespace } => {
                if !self
                    .projects
                    .iter()
                    .any(|(known, known_ns)| known == name && known_ns == namespace)
                {
                    bail!("unknown project {namespace}/{name}");
                }
                SyncMessage::ProjectChanged {
                    name: name.clone(),
                    namespace: namespace.clone(),
                }
            }
            MenuCommand::DatabaseSwitch { name } => {
                if !self.databases.contains_key(name) {
                    bail!("unknown database {name:?}");
                }
                SyncMessage::DatabaseChanged { name: name.clone() }
            }
            MenuCommand::ModelSwitch { name } => {
                if !self.models.contains(name) {
                    bail!("unknown model {name:?}");
                }
                self.current_model = name.clone();
                SyncMessage::ModelChanged { name: name.clone() }
            }
            MenuCommand::StrategySwitch { name } => SyncMessage::StrategyChanged { name: name.clone() },
            MenuCommand::CycleModel => {
                let next = self
                    .next_model()
                    .ok_or_else(|| anyhow!("no models configured"))?
                    .to_owned();
                self.current_model = next.clone();
                return Ok(HostResponse {
                    sync: vec![SyncMessage::ModelChanged { name: next.clone() }],
                    toast: Some(format!("Model: {next}")),
                    ..HostResponse::default()
                });
            }
            MenuCommand::RunCommand(text) => return Ok(self.run_chat_command(text)),
            MenuCommand::ShowToast(_) | MenuCommand::InsertChatInput { .. } | MenuCommand::Quit => {
                return Ok(HostResponse::default());
            }
        };
        tracing::info!(?sync, "demo host confirmed switch");
        Ok(HostResponse {
            sync: vec![sync],
            ..HostResponse::default()
        })
    }

    fn refresh_health(&mut self) -> Result<String> {
        let checked = OffsetDateTime::now_utc()
            .format(format_description!("[hour]:[minute]:[second]"))?;
        Ok(format!(
            "server: ok · vector store: ok ({} databases) · checked {checked} UTC",
            self.databases.len()
        ))
    }

    fn latest_version(&mut self) -> Result<Option<String>> {
        Ok(self.latest_version.clone())
    }
}

fn demo_data() -> MenuData {
    MenuData {
        models: DEMO_MODELS
            .iter()
            .map(|(name, provider, description)| ModelItem {
                name: (*name).to_owned(),
                provider: (*provider).to_owned(),
                is_active: false,
                description: (*description).to_owned(),
            })
            .collect(),
        databases: DEMO_DATABASES
            .iter()
            .map(|(name, doc_count, _)| DatabaseItem {
                name: (*name).to_owned(),
                doc_count: *doc_count,
                is_active: false,
            })
            .collect(),
        database_strategies: DEMO_DATABASES
            .iter()
            .map(|(name, _, strategies)| {
                (
                    (*name).to_owned(),
                    strategies
                        .iter()
                        .map(|strategy| StrategyItem {
                            name: (*strategy).to_owned(),
                            is_active: false,
                        })
                        .collect(),
                )
            })
            .collect(),
        current_model: DEMO_MODELS[0].0.to_owned(),
        current_database: DEMO_DATABASES[0].0.to_owned(),
        current_strategy: "hybrid".to_owned(),
    }
}

#[cfg(test)]
mod tests {
    use super::DemoHost;
    use anyhow::Result;
    use quickmenu_app::{MenuCommand, MenuConfig, SyncMessage, UPGRADE_COMMAND};
    use quickmenu_tui::MenuHost;

    fn config() -> MenuConfig {
        MenuConfig {
            name: "demo".to_owned(),
            namespace: "default".to_owned(),
            version: "0.1.0".to_owned(),
        }
    }

    #[test]
    fn initial_state_marks_current_selections_active() {
        let host = DemoHost::new();
        let state = host.initial_state(config());
        assert!(!state.visible);
        assert!(state.models[0].is_active);
        assert!(state.databases[0].is_active);
        assert_eq!(state.strategies.len(), 3);
        assert!(state.strategies[0].is_active);
        assert!(state.projects[0].is_active);
        assert_eq!(state.current_project, "demo");
    }

    #[test]
    fn database_switch_answers_with_sync() -> Result<()> {
        let mut host = DemoHost::new();
        let response = host.handle_command(&MenuCommand::DatabaseSwitch {
            name: "archive_db".to_owned(),
        })?;
        assert_eq!(
            response.sync,
            vec![SyncMessage::DatabaseChanged {
                name: "archive_db".to_owned()
            }]
        );
        Ok(())
    }

    #[test]
    fn unknown_database_is_an_error() {
        let mut host = DemoHost::new();
        let error = host
            .handle_command(&MenuCommand::DatabaseSwitch {
                name: "ghost".to_owned(),
            })
            .expect_err("unknown database should fail");
        assert!(error.to_string().contains("unknown database"));
    }

    #[test]
    fn cycle_model_wraps_through_catalog() -> Result<()> {
        let mut host = DemoHost::new();
        let mut seen = Vec::new();
        for _ in 0..3 {
            let response = host.handle_command(&MenuCommand::CycleModel)?;
            let [SyncMessage::ModelChanged { name }] = response.sync.as_slice() else {
                panic!("expected one model change, got {:?}", response.sync);
            };
            seen.push(name.clone());
        }
        assert_eq!(seen, vec!["gpt-4o-mini", "qwen2.5-vl", "llama3.1:8b"]);
        Ok(())
    }

    #[test]
    fn status_command_reports_model_and_mode() -> Result<()> {
        let mut host = DemoHost::new();
        host.handle_command(&MenuCommand::ModeSwitch { dev_mode: true })?;
        let response = host.handle_command(&MenuCommand::RunCommand("/status".to_owned()))?;
        assert_eq!(response.transcript, vec!["model llama3.1:8b · dev mode"]);
        Ok(())
    }

    #[test]
    fn upgrade_command_only_toasts() -> Result<()> {
        let mut host = DemoHost::new();
        let response = host.handle_command(&MenuCommand::RunCommand(UPGRADE_COMMAND.to_owned()))?;
        assert!(response.sync.is_empty());
        assert!(response.transcript.is_empty());
        assert!(response.toast.is_some());
        Ok(())
    }

    #[test]
    fn health_summary_mentions_check_time() -> Result<()> {
        let mut host = DemoHost::new();
        let summary = host.refresh_health()?;
        assert!(summary.starts_with("server: ok"));
        assert!(summary.ends_with("UTC"));
        Ok(())
    }

    #[test]
    fn latest_version_is_opt_in() -> Result<()> {
        assert_eq!(DemoHost::new().latest_version()?, None);
        let mut host = DemoHost::new().with_latest_version("0.9.0");
        assert_eq!(host.latest_version()?.as_deref(), Some("0.9.0"));
        Ok(())
    }
}
