// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

//! Row layouts for each tab.
//!
//! A single `cursor` addresses a flattened list whose rows depend on the tab
//! and on the current list sizes and expansion flags. Rendering and Enter
//! handling both walk the rows produced here, so offsets are derived in one
//! place and recomputed on every call.

use crate::{HelpItem, MenuState, MenuTab, OPEN_MENU_LABEL_PREFIX};

/// Number of fixed rows that precede the database section on the Context tab.
pub const CONTEXT_FIXED_ROWS: usize = 3;
/// Number of leading `commands` entries rendered as Details toggle rows.
pub const DETAILS_TOGGLE_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextRow {
    ProjectMode,
    DevMode,
    Project,
    Database(usize),
    Strategy(usize),
    Model(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsSection {
    Models,
    Datasets,
    Prompts,
}

impl DetailsSection {
    pub const ALL: [Self; 3] = [Self::Models, Self::Datasets, Self::Prompts];

    pub const fn command_index(self) -> usize {
        match self {
            Self::Models => 0,
            Self::Datasets => 1,
            Self::Prompts => 2,
        }
    }

    pub const fn fallback_label(self) -> &'static str {
        match self {
            Self::Models => "list models",
            Self::Datasets => "list datasets",
            Self::Prompts => "list prompts",
        }
    }

    pub fn is_expanded(self, state: &MenuState) -> bool {
        match self {
            Self::Models => state.models_expanded,
            Self::Datasets => state.datasets_expanded,
            Self::Prompts => state.prompts_expanded,
        }
    }

    pub fn item_count(self, state: &MenuState) -> usize {
        match self {
            Self::Models => state.models.len(),
            Self::Datasets => dataset_row_count(state),
            Self::Prompts => state.prompts.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailsRow {
    Toggle(DetailsSection),
    Model(usize),
    Dataset(usize),
    Prompt(usize),
    /// Index into `MenuState::commands`, always past the toggle entries.
    Command(usize),
}

pub fn context_rows(state: &MenuState) -> Vec<ContextRow> {
    let mut rows = Vec::with_capacity(
        CONTEXT_FIXED_ROWS + state.databases.len() + state.strategies.len() + state.models.len(),
    );
    rows.extend([ContextRow::ProjectMode, ContextRow::DevMode, ContextRow::Project]);
    rows.extend((0..state.databases.len()).map(ContextRow::Database));
    rows.extend((0..state.strategies.len()).map(ContextRow::Strategy));
    rows.extend((0..state.models.len()).map(ContextRow::Model));
    rows
}

/// Datasets and databases are listed side by side; the longer list wins.
pub fn dataset_row_count(state: &MenuState) -> usize {
    state.dataset_names.len().max(state.databases.len())
}

pub fn details_rows(state: &MenuState) -> Vec<DetailsRow> {
    let mut rows = Vec::new();
    for section in DetailsSection::ALL {
        rows.push(DetailsRow::Toggle(section));
        if !section.is_expanded(state) {
            continue;
        }
        let count = section.item_count(state);
        match section {
            DetailsSection::Models => rows.extend((0..count).map(DetailsRow::Model)),
            DetailsSection::Datasets => rows.extend((0..count).map(DetailsRow::Dataset)),
            DetailsSection::Prompts => rows.extend((0..count).map(DetailsRow::Prompt)),
        }
    }
    rows.extend((DETAILS_TOGGLE_COUNT..state.commands.len()).map(DetailsRow::Command));
    rows
}

pub fn max_cursor(state: &MenuState, tab: MenuTab) -> usize {
    match tab {
        MenuTab::Context => {
            CONTEXT_FIXED_ROWS - 1
                + state.databases.len()
                + state.strategies.len()
                + state.models.len()
        }
        MenuTab::Details => details_rows(state).len().saturating_sub(1),
        MenuTab::Help => state.help_entries.len().saturating_sub(1),
    }
}

pub fn context_row_at(state: &MenuState, cursor: usize) -> Option<ContextRow> {
    context_rows(state).get(cursor).copied()
}

pub fn details_row_at(state: &MenuState, cursor: usize) -> Option<DetailsRow> {
    details_rows(state).get(cursor).copied()
}

/// Moves by `delta` with wraparound over `0..=max`.
pub fn wrap_cursor(cursor: usize, delta: isize, max: usize) -> usize {
    let len = max as isize + 1;
    (cursor as isize + delta).rem_euclid(len) as usize
}

pub fn is_help_row_selectable(entries: &[HelpItem], index: usize) -> bool {
    let Some(entry) = entries.get(index) else {
        return false;
    };
    let label = entry.label.trim();
    if label.is_empty() || label.starts_with(OPEN_MENU_LABEL_PREFIX) {
        return false;
    }
    !entry.command.is_empty() || !entry.action.is_none()
}

/// Steps from `start` by `delta`, wrapping, until a selectable row is found.
/// Gives up after `len + 1` attempts so an all-header list cannot spin.
pub fn find_selectable_help_row(entries: &[HelpItem], start: usize, delta: isize) -> Option<usize> {
    if entries.is_empty() || delta == 0 {
        return None;
    }
    let max = entries.len() - 1;
    let mut position = start.min(max);
    for _ in 0..=entries.len() {
        position = wrap_cursor(position, delta, max);
        if is_help_row_selectable(entries, position) {
            return Some(position);
        }
    }
    None
}
