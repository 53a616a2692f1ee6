// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod render;

pub use render::{
    MAX_MENU_WIDTH, MIN_MENU_WIDTH, draw_menu, lines_to_text, menu_lines, menu_width,
    render_lines, render_text, wrap_words,
};

use anyhow::{Context, Result};
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode};
use crossterm::{execute, terminal};
use quickmenu_app::{
    HEALTH_REFRESH_TOAST, MenuCommand, MenuEffects, MenuKey, MenuMessage, MenuState, NoEffects,
    SyncMessage,
};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout};
use ratatui::style::{Color, Style};
use ratatui::widgets::{Block, Borders, Paragraph};
use std::io;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;

pub const RESTART_ENV_VAR: &str = "LF_RESTART_AFTER_UPGRADE";
const STATUS_CLEAR_AFTER: Duration = Duration::from_secs(4);
const TRANSCRIPT_KEEP: usize = 200;

/// What the host did in answer to a menu command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostResponse {
    pub sync: Vec<SyncMessage>,
    pub transcript: Vec<String>,
    pub toast: Option<String>,
}

pub trait MenuHost {
    fn handle_command(&mut self, command: &MenuCommand) -> Result<HostResponse>;
    fn refresh_health(&mut self) -> Result<String>;
    fn latest_version(&mut self) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunOptions {
    pub tick: Duration,
    /// Pin the overlay above the input line instead of centering it.
    pub pinned: bool,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            tick: Duration::from_millis(120),
            pinned: false,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunOutcome {
    pub restart_requested: bool,
}

/// Clipboard through `arboard`, restart through the process environment.
#[derive(Debug, Default)]
pub struct SystemEffects {
    restart_requested: bool,
}

impl SystemEffects {
    pub fn restart_requested(&self) -> bool {
        self.restart_requested
    }
}

impl MenuEffects for SystemEffects {
    fn copy_to_clipboard(&mut self, text: &str) {
        let result = arboard::Clipboard::new().and_then(|mut clipboard| clipboard.set_text(text));
        if let Err(error) = result {
            tracing::warn!(%error, "clipboard write failed");
        }
    }

    fn request_restart(&mut self) {
        self.restart_requested = true;
        // SAFETY: the UI loop is single-threaded; no other thread reads the
        // environment while a key event is being handled.
        unsafe {
            std::env::set_var(RESTART_ENV_VAR, "1");
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternalEvent {
    ClearStatus { token: u64 },
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
struct ViewData {
    transcript: Vec<String>,
    input: String,
    status: Option<String>,
    status_token: u64,
    pinned: bool,
}

pub fn menu_key(key: KeyEvent) -> MenuKey {
    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            MenuKey::CtrlC
        }
        (KeyCode::Up, _) => MenuKey::Up,
        (KeyCode::Down, _) => MenuKey::Down,
        (KeyCode::Enter, _) => MenuKey::Enter,
        (KeyCode::Esc, _) => MenuKey::Esc,
        (KeyCode::BackTab, _) => MenuKey::BackTab,
        (KeyCode::Tab, modifiers) if modifiers.contains(KeyModifiers::SHIFT) => MenuKey::BackTab,
        (KeyCode::Tab, _) => MenuKey::Tab,
        _ => MenuKey::Other,
    }
}

pub fn run_menu<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    options: RunOptions,
) -> Result<RunOutcome> {
    enable_raw_mode().context("enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, terminal::EnterAlternateScreen).context("enter alternate screen")?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("create terminal")?;

    let mut view_data = ViewData {
        pinned: options.pinned,
        ..ViewData::default()
    };
    let mut effects = SystemEffects::default();
    let (internal_tx, internal_rx) = mpsc::channel();

    let (width, height) = terminal::size().context("read terminal size")?;
    forward_resize(state, &view_data, width, height);
    prime_help_tab(state, host, &mut view_data, &internal_tx);

    let mut result = Ok(());
    loop {
        process_internal_events(&mut view_data, &internal_rx);

        if let Err(error) = terminal.draw(|frame| render(frame, state, &view_data)) {
            result = Err(anyhow::Error::new(error).context("draw frame"));
            break;
        }

        let has_event = match event::poll(options.tick).context("poll event") {
            Ok(has_event) => has_event,
            Err(error) => {
                result = Err(error);
                break;
            }
        };
        if !has_event {
            continue;
        }
        match event::read().context("read event") {
            Ok(Event::Key(key)) if key.kind != KeyEventKind::Release => {
                if handle_key_event(state, host, &mut view_data, &mut effects, &internal_tx, key) {
                    break;
                }
            }
            Ok(Event::Resize(width, height)) => {
                forward_resize(state, &view_data, width, height);
            }
            Ok(_) => {}
            Err(error) => {
                result = Err(error);
                break;
            }
        }
    }

    disable_raw_mode().context("disable raw mode")?;
    execute!(io::stdout(), terminal::LeaveAlternateScreen).context("leave alternate screen")?;
    result.map(|()| RunOutcome {
        restart_requested: effects.restart_requested(),
    })
}

fn forward_resize(state: &mut MenuState, view_data: &ViewData, width: u16, height: u16) {
    let height = if view_data.pinned { 0 } else { height };
    state.update(MenuMessage::Resize { width, height }, &mut NoEffects);
}

/// Loads the health summary and update status shown on the Help tab.
fn prime_help_tab<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match host.latest_version() {
        Ok(Some(latest)) => state.set_update_available(&latest),
        Ok(None) => state.set_up_to_date(),
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "update check failed");
        }
    }
    refresh_health(state, host, view_data, internal_tx);
}

fn refresh_health<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
) {
    match host.refresh_health() {
        Ok(summary) => state.set_health_summary(summary),
        Err(error) => {
            tracing::warn!(error = %format!("{error:#}"), "health refresh failed");
            emit_status(
                view_data,
                internal_tx,
                format!("health check failed: {error:#}"),
            );
        }
    }
}

fn process_internal_events(view_data: &mut ViewData, rx: &Receiver<InternalEvent>) {
    while let Ok(event) = rx.try_recv() {
        match event {
            InternalEvent::ClearStatus { token } if token == view_data.status_token => {
                view_data.status = None;
            }
            InternalEvent::ClearStatus { .. } => {}
        }
    }
}

fn schedule_status_clear(internal_tx: &Sender<InternalEvent>, token: u64) {
    let sender = internal_tx.clone();
    thread::spawn(move || {
        thread::sleep(STATUS_CLEAR_AFTER);
        let _ = sender.send(InternalEvent::ClearStatus { token });
    });
}

fn emit_status(
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    message: impl Into<String>,
) {
    view_data.status = Some(message.into());
    view_data.status_token = view_data.status_token.saturating_add(1);
    schedule_status_clear(internal_tx, view_data.status_token);
}

/// Returns true when the app should quit.
fn handle_key_event<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    effects: &mut dyn MenuEffects,
    internal_tx: &Sender<InternalEvent>,
    key: KeyEvent,
) -> bool {
    if state.visible {
        let commands = state.update(MenuMessage::Key(menu_key(key)), effects);
        for command in commands {
            if apply_menu_command(state, host, view_data, internal_tx, command) {
                return true;
            }
        }
        return false;
    }

    match (key.code, key.modifiers) {
        (KeyCode::Char('c'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => true,
        (KeyCode::Char('q'), _) if view_data.input.is_empty() => true,
        (KeyCode::Char('o'), modifiers) if modifiers.contains(KeyModifiers::CONTROL) => {
            state.open();
            false
        }
        (KeyCode::Char('/'), _) if view_data.input.is_empty() => {
            state.open();
            false
        }
        (KeyCode::Enter, _) => {
            let input = std::mem::take(&mut view_data.input);
            submit_input(state, host, view_data, internal_tx, input);
            false
        }
        (KeyCode::Backspace, _) => {
            view_data.input.pop();
            false
        }
        (KeyCode::Esc, _) => {
            view_data.input.clear();
            false
        }
        (KeyCode::Char(ch), modifiers) if !modifiers.contains(KeyModifiers::CONTROL) => {
            view_data.input.push(ch);
            false
        }
        _ => false,
    }
}

/// Returns true when the command asks the app to quit.
fn apply_menu_command<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: MenuCommand,
) -> bool {
    match command {
        MenuCommand::Quit => return true,
        MenuCommand::ShowToast(message) => {
            let refresh = message == HEALTH_REFRESH_TOAST;
            emit_status(view_data, internal_tx, message);
            if refresh {
                refresh_health(state, host, view_data, internal_tx);
            }
        }
        MenuCommand::InsertChatInput {
            text,
            ensure_dev_mode,
            ensure_project_mode,
            auto_send,
        } => {
            if ensure_dev_mode && !state.mode.is_dev() {
                forward_to_host(
                    state,
                    host,
                    view_data,
                    internal_tx,
                    &MenuCommand::ModeSwitch { dev_mode: true },
                );
            } else if ensure_project_mode && state.mode.is_dev() {
                forward_to_host(
                    state,
                    host,
                    view_data,
                    internal_tx,
                    &MenuCommand::ModeSwitch { dev_mode: false },
                );
            }
            if auto_send {
                submit_input(state, host, view_data, internal_tx, text);
            } else {
                view_data.input = text;
            }
        }
        command => forward_to_host(state, host, view_data, internal_tx, &command),
    }
    false
}

fn submit_input<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    input: String,
) {
    let input = input.trim().to_owned();
    if input.is_empty() {
        return;
    }
    push_transcript(view_data, format!("you: {input}"));
    if input.starts_with('/') {
        forward_to_host(
            state,
            host,
            view_data,
            internal_tx,
            &MenuCommand::RunCommand(input),
        );
    }
}

/// Second half of the two-phase protocol: whatever the host confirms comes
/// back as sync messages and is applied like any other host event.
fn forward_to_host<H: MenuHost>(
    state: &mut MenuState,
    host: &mut H,
    view_data: &mut ViewData,
    internal_tx: &Sender<InternalEvent>,
    command: &MenuCommand,
) {
    match host.handle_command(command) {
        Ok(response) => {
            for sync in response.sync {
                state.update(MenuMessage::Sync(sync), &mut NoEffects);
            }
            for line in response.transcript {
                push_transcript(view_data, line);
            }
            if let Some(toast) = response.toast {
                emit_status(view_data, internal_tx, toast);
            }
        }
        Err(error) => {
            tracing::warn!(?command, error = %format!("{error:#}"), "host command failed");
            emit_status(
                view_data,
                internal_tx,
                format!("command failed: {error:#}"),
            );
        }
    }
}

fn push_transcript(view_data: &mut ViewData, line: String) {
    view_data.transcript.push(line);
    let excess = view_data.transcript.len().saturating_sub(TRANSCRIPT_KEEP);
    view_data.transcript.drain(..excess);
}

fn render(frame: &mut ratatui::Frame<'_>, state: &MenuState, view_data: &ViewData) {
    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),
            Constraint::Length(1),
            Constraint::Length(3),
        ])
        .split(frame.area());

    let visible_rows = usize::from(layout[0].height.saturating_sub(2));
    let keep = view_data.transcript.len().saturating_sub(visible_rows);
    let transcript = Paragraph::new(view_data.transcript[keep..].join("\n")).block(
        Block::default()
            .title(format!(
                "{} · {} mode",
                state.current_project,
                state.mode.label()
            ))
            .borders(Borders::ALL),
    );
    frame.render_widget(transcript, layout[0]);

    let status = view_data
        .status
        .clone()
        .unwrap_or_else(|| "ctrl+o or / menu | ctrl+c quit".to_owned());
    frame.render_widget(
        Paragraph::new(status).style(Style::default().fg(Color::Yellow)),
        layout[1],
    );

    let input = Paragraph::new(format!("> {}", view_data.input))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(input, layout[2]);

    let menu_area = if view_data.pinned {
        layout[0]
    } else {
        frame.area()
    };
    draw_menu(frame, menu_area, state);
}
