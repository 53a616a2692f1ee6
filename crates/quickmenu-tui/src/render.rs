// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use quickmenu_app::layout::{
    ContextRow, DetailsRow, DetailsSection, context_rows, details_rows, is_help_row_selectable,
};
use quickmenu_app::{MenuState, MenuTab, SubMode};
use ratatui::layout::Rect;
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Clear, Paragraph};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

pub const MIN_MENU_WIDTH: u16 = 40;
pub const MAX_MENU_WIDTH: u16 = 100;
const FALLBACK_TERMINAL_WIDTH: u16 = 80;
const CURSOR_MARK: &str = "→ ";
const ACTIVE_MARK: &str = "● ";
const INACTIVE_MARK: &str = "○ ";
// header, rule, tab bar, rule, rule, footer box (3)
const CHROME_LINES: usize = 8;
const CONTEXT_SECTIONS: [&str; 5] = ["Mode", "Project", "Databases", "Strategies", "Models"];

/// Roughly 80% of the terminal, clamped, never wider than the terminal.
pub fn menu_width(terminal_width: u16) -> u16 {
    let terminal_width = if terminal_width == 0 {
        FALLBACK_TERMINAL_WIDTH
    } else {
        terminal_width
    };
    let target = (u32::from(terminal_width) * 4 / 5) as u16;
    target
        .clamp(MIN_MENU_WIDTH, MAX_MENU_WIDTH)
        .min(terminal_width)
}

/// Full frame: the menu block centered in the last known viewport.
pub fn render_lines(state: &MenuState) -> Vec<Line<'static>> {
    let block = menu_lines(state);
    let width = menu_width(state.terminal_width);
    let left = state.terminal_width.saturating_sub(width) / 2;

    let mut lines = Vec::with_capacity(block.len());
    let height = usize::from(state.terminal_height);
    if height > block.len() {
        lines.extend(std::iter::repeat_n(Line::default(), (height - block.len()) / 2));
    }
    for line in block {
        if left == 0 {
            lines.push(line);
            continue;
        }
        let mut spans = vec![Span::raw(" ".repeat(usize::from(left)))];
        spans.extend(line.spans);
        lines.push(Line::from(spans));
    }
    lines
}

pub fn render_text(state: &MenuState) -> String {
    lines_to_text(&render_lines(state))
}

pub fn lines_to_text(lines: &[Line<'_>]) -> String {
    lines
        .iter()
        .map(|line| {
            line.spans
                .iter()
                .map(|span| span.content.as_ref())
                .collect::<String>()
                .trim_end()
                .to_owned()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Draws the overlay inside `area`. Height 0 pins it to the bottom of the
/// area instead of centering.
pub fn draw_menu(frame: &mut ratatui::Frame<'_>, area: Rect, state: &MenuState) {
    if !state.visible {
        return;
    }
    let lines = menu_lines_within(state, usize::from(area.height));
    let width = menu_width(area.width).min(area.width);
    let height = (lines.len() as u16).min(area.height);
    let x = area.x + (area.width - width) / 2;
    let y = if state.terminal_height == 0 {
        area.y + area.height - height
    } else {
        area.y + (area.height - height) / 2
    };
    let rect = Rect::new(x, y, width, height);
    frame.render_widget(Clear, rect);
    frame.render_widget(Paragraph::new(lines), rect);
}

/// The uncentered menu block, windowed to the last known terminal height.
pub fn menu_lines(state: &MenuState) -> Vec<Line<'static>> {
    menu_lines_within(state, usize::from(state.terminal_height))
}

/// Same block with the body windowed around the cursor so the whole block
/// fits in `max_height` rows. Zero means unbounded.
fn menu_lines_within(state: &MenuState, max_height: usize) -> Vec<Line<'static>> {
    let width = usize::from(menu_width(state.terminal_width));
    let rule = Line::styled("─".repeat(width), Style::default().fg(Color::DarkGray));

    let mut lines = vec![header_line(state, width), rule.clone(), tab_bar(state.active_tab)];
    let body = match (state.active_tab, state.sub_mode) {
        (MenuTab::Context, SubMode::ProjectPicker) => project_picker_body(state, width),
        (MenuTab::Context, SubMode::Normal) => context_body(state, width),
        (MenuTab::Details, _) => details_body(state, width),
        (MenuTab::Help, _) => help_body(state, width),
    };
    lines.push(rule.clone());
    lines.extend(window_body(body, max_height));
    lines.push(rule);
    lines.extend(footer_box(footer_hints(state), width));
    lines
}

struct Body {
    lines: Vec<Line<'static>>,
    cursor_line: Option<usize>,
}

impl Body {
    fn new() -> Self {
        Self {
            lines: Vec::new(),
            cursor_line: None,
        }
    }

    fn section(&mut self, title: &str) {
        self.lines.push(Line::styled(
            format!(" {title}"),
            Style::default()
                .fg(Color::Gray)
                .add_modifier(Modifier::BOLD),
        ));
    }

    fn note(&mut self, text: &str, indent: usize) {
        self.lines.push(Line::styled(
            format!("{}{text}", " ".repeat(indent)),
            Style::default().fg(Color::DarkGray),
        ));
    }

    fn row(&mut self, row: Row<'_>) {
        if row.focused {
            self.cursor_line = Some(self.lines.len());
        }
        self.lines.push(row_line(&row));
    }
}

struct Row<'a> {
    label: String,
    detail: &'a str,
    indent: usize,
    focused: bool,
    active: Option<bool>,
    width: usize,
}

fn row_line(row: &Row<'_>) -> Line<'static> {
    let mut label_style = Style::default();
    if row.active == Some(true) {
        label_style = label_style.fg(Color::Green);
    }
    if row.focused {
        label_style = label_style.fg(Color::Cyan).add_modifier(Modifier::BOLD);
    }

    let marker = if row.focused { CURSOR_MARK } else { "  " };
    let active = match row.active {
        Some(true) => ACTIVE_MARK,
        Some(false) => INACTIVE_MARK,
        None => "",
    };
    let prefix = format!(" {}{marker}{active}", " ".repeat(row.indent));
    let budget = row.width.saturating_sub(prefix.width());
    let label = truncate_to_width(&row.label, budget);

    let mut spans = vec![
        Span::styled(prefix, Style::default().fg(Color::Cyan)),
        Span::styled(label.clone(), label_style),
    ];
    let remaining = budget.saturating_sub(label.width() + 2);
    if !row.detail.is_empty() && remaining > 3 {
        spans.push(Span::styled(
            format!("  {}", truncate_to_width(row.detail, remaining)),
            Style::default().fg(Color::DarkGray),
        ));
    }
    Line::from(spans)
}

fn header_line(state: &MenuState, width: usize) -> Line<'static> {
    let title = format!(" {} quick menu", state.config.name);
    let version = format!(" v{}", state.config.version.trim_start_matches('v'));
    let hint = "esc close ";
    let gap = width.saturating_sub(title.width() + version.width() + hint.width());
    Line::from(vec![
        Span::styled(title, Style::default().add_modifier(Modifier::BOLD)),
        Span::styled(version, Style::default().fg(Color::DarkGray)),
        Span::raw(" ".repeat(gap)),
        Span::styled(hint, Style::default().fg(Color::DarkGray)),
    ])
}

fn tab_bar(active: MenuTab) -> Line<'static> {
    let mut spans = vec![Span::raw(" ")];
    for tab in MenuTab::ALL {
        let span = if tab == active {
            Span::styled(
                format!("[ {} ]", tab.label()),
                Style::default()
                    .fg(Color::Black)
                    .bg(Color::Cyan)
                    .add_modifier(Modifier::BOLD),
            )
        } else {
            Span::styled(
                format!("  {}  ", tab.label()),
                Style::default().fg(Color::Gray),
            )
        };
        spans.push(span);
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn context_section(row: ContextRow) -> &'static str {
    match row {
        ContextRow::ProjectMode | ContextRow::DevMode => "Mode",
        ContextRow::Project => "Project",
        ContextRow::Database(_) => "Databases",
        ContextRow::Strategy(_) => "Strategies",
        ContextRow::Model(_) => "Models",
    }
}

fn context_body(state: &MenuState, width: usize) -> Body {
    let rows = context_rows(state);
    let mut body = Body::new();
    for section in CONTEXT_SECTIONS {
        body.section(section);
        let mut empty = true;
        for (index, row) in rows
            .iter()
            .enumerate()
            .filter(|(_, row)| context_section(**row) == section)
        {
            empty = false;
            let (label, detail, active) = context_row_parts(state, *row);
            body.row(Row {
                label,
                detail: &detail,
                indent: 1,
                focused: index == state.cursor,
                active,
                width,
            });
        }
        if empty {
            let note = if section == "Strategies" && state.current_database.is_empty() {
                "(select a database)"
            } else {
                "(none)"
            };
            body.note(note, 4);
        }
    }
    body
}

fn context_row_parts(state: &MenuState, row: ContextRow) -> (String, String, Option<bool>) {
    match row {
        ContextRow::ProjectMode => (
            "Project mode".to_owned(),
            String::new(),
            Some(!state.mode.is_dev()),
        ),
        ContextRow::DevMode => (
            "Dev mode".to_owned(),
            String::new(),
            Some(state.mode.is_dev()),
        ),
        ContextRow::Project => (
            format!(
                "Project: {}/{}",
                state.current_namespace, state.current_project
            ),
            "enter to switch".to_owned(),
            None,
        ),
        ContextRow::Database(i) => {
            let database = &state.databases[i];
            (
                database.name.clone(),
                format!("{} docs", database.doc_count),
                Some(database.is_active),
            )
        }
        ContextRow::Strategy(i) => {
            let strategy = &state.strategies[i];
            (strategy.name.clone(), String::new(), Some(strategy.is_active))
        }
        ContextRow::Model(i) => {
            let model = &state.models[i];
            (model.name.clone(), model.provider.clone(), Some(model.is_active))
        }
    }
}

fn project_picker_body(state: &MenuState, width: usize) -> Body {
    let mut body = Body::new();
    body.section("Select project");
    if state.projects.is_empty() {
        body.note("(no projects)", 4);
        return body;
    }
    for (index, project) in state.projects.iter().enumerate() {
        body.row(Row {
            label: project.name.clone(),
            detail: &project.namespace,
            indent: 1,
            focused: index == state.project_cursor,
            active: Some(project.is_active),
            width,
        });
    }
    body
}

fn details_body(state: &MenuState, width: usize) -> Body {
    let mut body = Body::new();
    for (index, row) in details_rows(state).into_iter().enumerate() {
        let focused = index == state.cursor;
        match row {
            DetailsRow::Toggle(section) => {
                let (command, description) = state
                    .commands
                    .get(section.command_index())
                    .map(|item| (item.command.as_str(), item.description.as_str()))
                    .unwrap_or((section.fallback_label(), ""));
                let arrow = if section.is_expanded(state) { "▾" } else { "▸" };
                body.row(Row {
                    label: format!("{arrow} {command}"),
                    detail: description,
                    indent: 0,
                    focused,
                    active: None,
                    width,
                });
                if section.is_expanded(state) && section.item_count(state) == 0 {
                    body.note(empty_section_note(section), 6);
                }
            }
            DetailsRow::Model(i) => {
                let model = &state.models[i];
                body.row(Row {
                    label: model.name.clone(),
                    detail: &model.provider,
                    indent: 3,
                    focused,
                    active: Some(model.is_active),
                    width,
                });
                for line in wrap_words(&model.description, width.saturating_sub(10)) {
                    body.note(&line, 10);
                }
            }
            DetailsRow::Dataset(i) => {
                let name = state
                    .dataset_names
                    .get(i)
                    .or_else(|| state.databases.get(i).map(|database| &database.name))
                    .cloned()
                    .unwrap_or_default();
                let database = state.databases.get(i);
                let detail = database
                    .map(|database| format!("db {}", database.name))
                    .unwrap_or_default();
                body.row(Row {
                    label: name,
                    detail: &detail,
                    indent: 3,
                    focused,
                    active: database.map(|database| database.is_active),
                    width,
                });
            }
            DetailsRow::Prompt(i) => {
                let prompt = &state.prompts[i];
                body.row(Row {
                    label: prompt.name.clone(),
                    detail: "",
                    indent: 3,
                    focused,
                    active: None,
                    width,
                });
                for line in wrap_words(&prompt.description, width.saturating_sub(10)) {
                    body.note(&line, 10);
                }
            }
            DetailsRow::Command(i) => {
                let command = &state.commands[i];
                body.row(Row {
                    label: command.command.clone(),
                    detail: &command.description,
                    indent: 0,
                    focused,
                    active: None,
                    width,
                });
            }
        }
    }
    body
}

fn empty_section_note(section: DetailsSection) -> &'static str {
    match section {
        DetailsSection::Models => "(no models configured)",
        DetailsSection::Datasets => "(no datasets)",
        DetailsSection::Prompts => "(no prompts)",
    }
}

fn help_body(state: &MenuState, width: usize) -> Body {
    let mut body = Body::new();
    for (index, entry) in state.help_entries.iter().enumerate() {
        let label = entry.label.trim_end();
        if label.trim().is_empty() {
            body.lines.push(Line::default());
            continue;
        }
        if is_help_row_selectable(&state.help_entries, index) {
            body.row(Row {
                label: label.to_owned(),
                detail: &entry.command,
                indent: 0,
                focused: index == state.cursor,
                active: None,
                width,
            });
        } else if label.ends_with(':') {
            body.section(label);
        } else {
            body.note(label, 4);
        }
    }

    if !state.health_summary.trim().is_empty() {
        body.lines.push(Line::default());
        body.section("Health:");
        for paragraph in state.health_summary.lines() {
            for line in wrap_words(paragraph, width.saturating_sub(4)) {
                body.note(&line, 4);
            }
        }
    }
    body
}

/// Keeps the focused row visible when the viewport cannot fit the body.
fn window_body(body: Body, max_height: usize) -> Vec<Line<'static>> {
    let Body {
        mut lines,
        cursor_line,
    } = body;
    if max_height == 0 {
        return lines;
    }
    // Keep at least the focused row even when the chrome alone overflows.
    let capacity = max_height.saturating_sub(CHROME_LINES).max(1);
    if lines.len() <= capacity {
        return lines;
    }
    let focus = cursor_line.unwrap_or(0);
    let start = focus
        .saturating_sub(capacity / 2)
        .min(lines.len() - capacity);
    lines.drain(..start);
    lines.truncate(capacity);
    lines
}

fn footer_hints(state: &MenuState) -> &'static str {
    match (state.active_tab, state.sub_mode) {
        (MenuTab::Context, SubMode::ProjectPicker) => "↑/↓ choose · enter switch · esc back",
        (MenuTab::Context, SubMode::Normal) => {
            "↑/↓ move · enter select · tab next tab · esc close"
        }
        (MenuTab::Details, _) => "↑/↓ move · enter expand/run · tab next tab · esc close",
        (MenuTab::Help, _) => "↑/↓ move · enter run · tab next tab · esc close",
    }
}

fn footer_box(hints: &str, width: usize) -> Vec<Line<'static>> {
    let style = Style::default().fg(Color::DarkGray);
    let inner = width.saturating_sub(2);
    let text = truncate_to_width(&format!(" {hints}"), inner);
    let pad = inner.saturating_sub(text.width());
    vec![
        Line::styled(format!("┌{}┐", "─".repeat(inner)), style),
        Line::from(vec![
            Span::styled("│", style),
            Span::styled(text, Style::default().fg(Color::Gray)),
            Span::raw(" ".repeat(pad)),
            Span::styled("│", style),
        ]),
        Line::styled(format!("└{}┘", "─".repeat(inner)), style),
    ]
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_owned();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(0);
        if used + ch_width + 1 > max_width {
            break;
        }
        out.push(ch);
        used += ch_width;
    }
    if max_width > 0 {
        out.push('…');
    }
    out
}

/// Greedy word wrap. Words longer than `max_width` get a line of their own.
pub fn wrap_words(text: &str, max_width: usize) -> Vec<String> {
    if max_width == 0 {
        return vec![text.to_owned()];
    }
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_owned();
        } else if current.width() + 1 + word.width() <= max_width {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_owned();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
