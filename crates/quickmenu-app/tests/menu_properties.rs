// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use proptest::prelude::*;
use quickmenu_app::layout::{is_help_row_selectable, max_cursor};
use quickmenu_app::{
    HelpAction, HelpItem, MenuData, MenuKey, MenuMessage, MenuState, MenuTab, NoEffects,
    SyncMessage,
};
use quickmenu_testkit::{database, model, prompt, seeded_state, strategy};
use std::collections::BTreeMap;

#[derive(Debug, Clone)]
enum Op {
    Key(MenuKey),
    Open,
    SetData {
        models: usize,
        databases: usize,
        strategies: usize,
    },
    SetPrompts(usize),
    SetDatasetNames(usize),
    DatabaseChanged(usize),
    ModelChanged(usize),
    StrategyChanged(usize),
    ProjectChanged(usize),
    ModeChanged(bool),
}

fn arb_key() -> impl Strategy<Value = MenuKey> {
    prop_oneof![
        Just(MenuKey::Up),
        Just(MenuKey::Down),
        Just(MenuKey::Enter),
        Just(MenuKey::Esc),
        Just(MenuKey::Tab),
        Just(MenuKey::BackTab),
        Just(MenuKey::Other),
    ]
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => arb_key().prop_map(Op::Key),
        1 => Just(Op::Open),
        1 => (0..5usize, 0..4usize, 0..4usize).prop_map(|(models, databases, strategies)| {
            Op::SetData {
                models,
                databases,
                strategies,
            }
        }),
        1 => (0..4usize).prop_map(Op::SetPrompts),
        1 => (0..4usize).prop_map(Op::SetDatasetNames),
        1 => (0..5usize).prop_map(Op::DatabaseChanged),
        1 => (0..5usize).prop_map(Op::ModelChanged),
        1 => (0..4usize).prop_map(Op::StrategyChanged),
        1 => (0..4usize).prop_map(Op::ProjectChanged),
        1 => any::<bool>().prop_map(Op::ModeChanged),
    ]
}

fn data_with(models: usize, databases: usize, strategies: usize) -> MenuData {
    let database_strategies = (0..databases)
        .map(|db| {
            (
                format!("db{db}"),
                (0..strategies)
                    .map(|s| strategy(&format!("s{s}")))
                    .collect::<Vec<_>>(),
            )
        })
        .collect::<BTreeMap<_, _>>();
    MenuData {
        models: (0..models)
            .map(|index| model(&format!("m{index}"), "ollama", ""))
            .collect(),
        databases: (0..databases)
            .map(|index| database(&format!("db{index}"), index as u64))
            .collect(),
        database_strategies,
        current_model: "m0".to_owned(),
        current_database: "db0".to_owned(),
        current_strategy: "s0".to_owned(),
    }
}

fn apply(state: &mut MenuState, op: Op) {
    let message = match op {
        Op::Key(key) => MenuMessage::Key(key),
        Op::Open => {
            state.open();
            return;
        }
        Op::SetData {
            models,
            databases,
            strategies,
        } => {
            state.set_data(data_with(models, databases, strategies));
            return;
        }
        Op::SetPrompts(count) => {
            state.set_prompts(
                (0..count)
                    .map(|index| prompt(&format!("p{index}"), ""))
                    .collect(),
            );
            return;
        }
        Op::SetDatasetNames(count) => {
            state.set_dataset_names((0..count).map(|index| format!("ds{index}")).collect());
            return;
        }
        Op::DatabaseChanged(index) => MenuMessage::Sync(SyncMessage::DatabaseChanged {
            name: format!("db{index}"),
        }),
        Op::ModelChanged(index) => MenuMessage::Sync(SyncMessage::ModelChanged {
            name: format!("m{index}"),
        }),
        Op::StrategyChanged(index) => MenuMessage::Sync(SyncMessage::StrategyChanged {
            name: format!("s{index}"),
        }),
        Op::ProjectChanged(index) => {
            let projects = quickmenu_testkit::sample_projects();
            let (name, namespace) = projects
                .get(index)
                .map(|project| (project.name.clone(), project.namespace.clone()))
                .unwrap_or_else(|| ("ghost".to_owned(), "nowhere".to_owned()));
            MenuMessage::Sync(SyncMessage::ProjectChanged { name, namespace })
        }
        Op::ModeChanged(dev_mode) => MenuMessage::Sync(SyncMessage::ModeChanged { dev_mode }),
    };
    state.update(message, &mut NoEffects);
}

fn active_count<T>(items: &[T], is_active: impl Fn(&T) -> bool) -> usize {
    items.iter().filter(|item| is_active(item)).count()
}

fn arb_help_entry() -> impl Strategy<Value = HelpItem> {
    prop_oneof![
        Just(HelpItem::blank()),
        "[A-Z][a-z]{1,8}:".prop_map(|label| HelpItem::header(&label)),
        "[A-Z][a-z]{1,8}".prop_map(|label| HelpItem::command(&label, "/run")),
        "[A-Z][a-z]{1,8}".prop_map(|label| HelpItem::action(&label, "", HelpAction::CycleModel)),
        Just(HelpItem::action("Open menu  ctrl+o", "", HelpAction::ToggleMode)),
    ]
}

proptest! {
    #[test]
    fn cursor_stays_within_current_tab(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut state = seeded_state();
        for op in ops {
            apply(&mut state, op);
            prop_assert!(state.cursor <= max_cursor(&state, state.active_tab));
        }
    }

    #[test]
    fn at_most_one_active_item_per_collection(ops in prop::collection::vec(arb_op(), 1..60)) {
        let mut state = seeded_state();
        for op in ops {
            apply(&mut state, op);
            prop_assert!(active_count(&state.projects, |item| item.is_active) <= 1);
            prop_assert!(active_count(&state.databases, |item| item.is_active) <= 1);
            prop_assert!(active_count(&state.strategies, |item| item.is_active) <= 1);
            prop_assert!(active_count(&state.models, |item| item.is_active) <= 1);
        }
    }

    #[test]
    fn strategies_always_mirror_current_database(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut state = seeded_state();
        for op in ops {
            apply(&mut state, op);
            let expected = state
                .database_strategies
                .get(&state.current_database)
                .map(|items| items.iter().map(|item| item.name.clone()).collect::<Vec<_>>())
                .unwrap_or_default();
            let actual = state
                .strategies
                .iter()
                .map(|item| item.name.clone())
                .collect::<Vec<_>>();
            prop_assert_eq!(actual, expected);
        }
    }

    #[test]
    fn help_down_cycles_through_selectable_rows(
        entries in prop::collection::vec(arb_help_entry(), 1..24),
        start in 0usize..24,
    ) {
        let selectable = (0..entries.len())
            .filter(|index| is_help_row_selectable(&entries, *index))
            .collect::<Vec<_>>();

        let mut state = seeded_state();
        state.active_tab = MenuTab::Help;
        state.help_entries = entries.clone();
        state.cursor = start.min(entries.len() - 1);

        if selectable.is_empty() {
            let before = state.cursor;
            for _ in 0..entries.len() * 2 {
                state.update(MenuMessage::Key(MenuKey::Down), &mut NoEffects);
                state.update(MenuMessage::Key(MenuKey::Up), &mut NoEffects);
            }
            prop_assert_eq!(state.cursor, before);
        } else {
            state.cursor = selectable[0];
            let mut visited = Vec::new();
            for _ in 0..selectable.len() {
                state.update(MenuMessage::Key(MenuKey::Down), &mut NoEffects);
                prop_assert!(is_help_row_selectable(&entries, state.cursor));
                visited.push(state.cursor);
            }
            prop_assert_eq!(state.cursor, selectable[0]);
            visited.sort_unstable();
            prop_assert_eq!(visited, selectable);
        }
    }
}

#[test]
fn expanded_models_round_trip_to_model_switch() {
    let mut state = seeded_state();
    state.active_tab = MenuTab::Details;

    let commands = state.update(MenuMessage::Key(MenuKey::Enter), &mut NoEffects);
    assert!(commands.is_empty());
    assert!(state.models_expanded);

    for (offset, expected) in ["fast", "smart", "vision"].iter().enumerate() {
        state.cursor = offset + 1;
        let commands = state.update(MenuMessage::Key(MenuKey::Enter), &mut NoEffects);
        assert_eq!(
            commands,
            vec![quickmenu_app::MenuCommand::ModelSwitch {
                name: (*expected).to_owned()
            }]
        );
    }
}

#[test]
fn database_switch_scenario_resets_strategy_through_sync() {
    let mut state = MenuState::new(quickmenu_testkit::menu_config());
    state.set_data(MenuData {
        databases: vec![database("main_db", 10)],
        database_strategies: BTreeMap::from([("main_db".to_owned(), vec![strategy("hybrid")])]),
        ..MenuData::default()
    });
    state.open();
    state.cursor = 3;

    let commands = state.update(MenuMessage::Key(MenuKey::Enter), &mut NoEffects);
    assert_eq!(
        commands,
        vec![quickmenu_app::MenuCommand::DatabaseSwitch {
            name: "main_db".to_owned()
        }]
    );

    state.update(
        MenuMessage::Sync(SyncMessage::DatabaseChanged {
            name: "main_db".to_owned(),
        }),
        &mut NoEffects,
    );
    assert_eq!(state.strategies.len(), 1);
    assert_eq!(state.strategies[0].name, "hybrid");
    assert!(state.strategies[0].is_active);
    assert_eq!(state.current_strategy, "hybrid");
}
