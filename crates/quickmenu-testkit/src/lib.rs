// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use quickmenu_app::{
    DatabaseItem, MenuConfig, MenuData, MenuState, ModelItem, ProjectItem, PromptItem,
    StrategyItem,
};
use std::collections::BTreeMap;

pub const MODELS: [(&str, &str, &str); 3] = [
    ("fast", "ollama", "Small local model for quick answers"),
    ("smart", "openai", "Larger hosted model with better reasoning"),
    ("vision", "lemonade", "Multimodal model that accepts images"),
];

pub const DATABASES: [(&str, u64); 2] = [("main_db", 10), ("archive_db", 240)];

pub fn menu_config() -> MenuConfig {
    MenuConfig {
        name: "demo".to_owned(),
        namespace: "default".to_owned(),
        version: "0.1.0".to_owned(),
    }
}

pub fn model(name: &str, provider: &str, description: &str) -> ModelItem {
    ModelItem {
        name: name.to_owned(),
        provider: provider.to_owned(),
        is_active: false,
        description: description.to_owned(),
    }
}

pub fn database(name: &str, doc_count: u64) -> DatabaseItem {
    DatabaseItem {
        name: name.to_owned(),
        doc_count,
        is_active: false,
    }
}

pub fn strategy(name: &str) -> StrategyItem {
    StrategyItem {
        name: name.to_owned(),
        is_active: false,
    }
}

pub fn project(name: &str, namespace: &str) -> ProjectItem {
    ProjectItem {
        name: name.to_owned(),
        namespace: namespace.to_owned(),
        is_active: false,
    }
}

pub fn prompt(name: &str, description: &str) -> PromptItem {
    PromptItem {
        name: name.to_owned(),
        description: description.to_owned(),
    }
}

pub fn sample_data() -> MenuData {
    MenuData {
        models: MODELS
            .iter()
            .map(|(name, provider, description)| model(name, provider, description))
            .collect(),
        databases: DATABASES
            .iter()
            .map(|(name, docs)| database(name, *docs))
            .collect(),
        database_strategies: BTreeMap::from([
            (
                "main_db".to_owned(),
                vec![strategy("hybrid"), strategy("dense")],
            ),
            ("archive_db".to_owned(), vec![strategy("bm25")]),
        ]),
        current_model: "fast".to_owned(),
        current_database: "main_db".to_owned(),
        current_strategy: "hybrid".to_owned(),
    }
}

pub fn sample_projects() -> Vec<ProjectItem> {
    vec![
        project("demo", "default"),
        project("support-bot", "default"),
        project("research", "lab"),
    ]
}

/// A visible menu loaded with every sample collection.
pub fn seeded_state() -> MenuState {
    let mut state = MenuState::new(menu_config());
    state.set_data(sample_data());
    state.set_projects(sample_projects(), "demo", "default");
    state.set_prompts(vec![
        prompt("default", "General assistant"),
        prompt("support", "Customer support tone"),
    ]);
    state.set_dataset_names(vec!["handbook".to_owned()]);
    state.handle_resize(120, 40);
    state.open();
    state
}
