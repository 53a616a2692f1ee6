// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod config;
mod logging;
mod runtime;

/// Env mutation in tests of any module goes through this one lock.
#[cfg(test)]
mod test_support {
    use std::sync::{Mutex, MutexGuard, OnceLock};

    pub fn env_lock() -> MutexGuard<'static, ()> {
        static ENV_LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        match ENV_LOCK.get_or_init(|| Mutex::new(())).lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

use anyhow::{Context, Result, anyhow};
use config::Config;
use quickmenu_app::{MenuState, MenuTab};
use quickmenu_tui::{MenuHost, RunOptions};
use runtime::DemoHost;
use std::env;
use std::path::PathBuf;

const RENDER_WIDTH: u16 = 80;

fn main() {
    if let Err(error) = run() {
        eprintln!("{error:#}");
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let options = parse_cli_args(env::args().skip(1), Config::default_path()?)?;
    if options.show_help {
        print_help();
        return Ok(());
    }

    if options.print_config_path {
        println!("{}", options.config_path.display());
        return Ok(());
    }

    if options.print_example {
        print!("{}", Config::example_config(&options.config_path));
        return Ok(());
    }

    let config = Config::load(&options.config_path).with_context(|| {
        format!(
            "load config {}; run `quickmenu --print-example-config` to generate a v1 template",
            options.config_path.display()
        )
    })?;
    let tick = config.tick()?;
    let log_path = config.log_path()?;

    let mut host = demo_host(&config);
    if let Some(tab) = options.render_tab {
        let state = snapshot_state(&mut host, &config, tab)?;
        println!("{}", quickmenu_tui::render_text(&state));
        return Ok(());
    }

    if options.check_only {
        println!("config ok: {}", options.config_path.display());
        return Ok(());
    }

    logging::init(&log_path, config.log_level()).with_context(|| {
        format!(
            "start logging to {} -- set [log].path to a writable file",
            log_path.display()
        )
    })?;
    tracing::info!(config = %options.config_path.display(), "starting quickmenu");

    let mut state = host.initial_state(config.menu_config());
    let outcome = quickmenu_tui::run_menu(
        &mut state,
        &mut host,
        RunOptions {
            tick,
            pinned: config.pinned(),
        },
    )?;
    if outcome.restart_requested {
        tracing::info!("restart requested after upgrade");
        eprintln!("upgrade requested; start quickmenu again to pick it up");
    }
    Ok(())
}

fn demo_host(config: &Config) -> DemoHost {
    match config.latest_version() {
        Some(latest) => DemoHost::new().with_latest_version(latest),
        None => DemoHost::new(),
    }
}

/// One open frame of `tab` over the demo catalog, laid out without centering.
fn snapshot_state(host: &mut DemoHost, config: &Config, tab: MenuTab) -> Result<MenuState> {
    let mut state = host.initial_state(config.menu_config());
    match host.latest_version()? {
        Some(latest) => state.set_update_available(&latest),
        None => state.set_up_to_date(),
    }
    state.set_health_summary(host.refresh_health()?);
    state.handle_resize(RENDER_WIDTH, 0);
    state.open();
    state.active_tab = tab;
    Ok(state)
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct CliOptions {
    config_path: PathBuf,
    print_config_path: bool,
    print_example: bool,
    check_only: bool,
    render_tab: Option<MenuTab>,
    show_help: bool,
}

fn parse_cli_args<I, S>(args: I, default_config_path: PathBuf) -> Result<CliOptions>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut options = CliOptions {
        config_path: default_config_path,
        print_config_path: false,
        print_example: false,
        check_only: false,
        render_tab: None,
        show_help: false,
    };

    let mut iter = args.into_iter();
    while let Some(arg) = iter.next() {
        match arg.as_ref() {
            "--config" => {
                let value = iter
                    .next()
                    .ok_or_else(|| anyhow!("--config requires a file path"))?;
                options.config_path = PathBuf::from(value.as_ref());
            }
            "--print-config-path" => {
                options.print_config_path = true;
            }
            "--print-example-config" => {
                options.print_example = true;
            }
            "--check" => {
                options.check_only = true;
            }
            "--render" => {
                let value = iter.next().ok_or_else(|| {
                    anyhow!("--render requires a tab name (context, details, or help)")
                })?;
                let tab = MenuTab::parse(value.as_ref()).ok_or_else(|| {
                    anyhow!(
                        "unknown tab {:?}; expected context, details, or help",
                        value.as_ref()
                    )
                })?;
                options.render_tab = Some(tab);
            }
            "--help" | "-h" => {
                options.show_help = true;
            }
            unknown => {
                return Err(anyhow!(
                    "unknown argument {unknown:?}; run with --help to see supported options"
                ));
            }
        }
    }

    Ok(options)
}

fn print_help() {
    println!("quickmenu");
    println!("  --config <path>          Use a specific config path");
    println!("  --print-config-path      Print resolved config path");
    println!("  --print-example-config   Print a v1 config template");
    println!("  --check                  Validate config and exit");
    println!("  --render <tab>           Print one frame of context, details, or help");
    println!("  --help                   Show this help");
}

#[cfg(test)]
mod tests {
    use super::{CliOptions, demo_host, parse_cli_args, snapshot_state};
    use crate::config::Config;
    use crate::runtime::DemoHost;
    use anyhow::Result;
    use quickmenu_app::MenuTab;
    use std::path::PathBuf;

    fn default_options_path() -> PathBuf {
        PathBuf::from("/tmp/quickmenu-config.toml")
    }

    #[test]
    fn parse_cli_args_defaults_to_provided_config_path() -> Result<()> {
        let options = parse_cli_args(Vec::<String>::new(), default_options_path())?;
        assert_eq!(
            options,
            CliOptions {
                config_path: default_options_path(),
                print_config_path: false,
                print_example: false,
                check_only: false,
                render_tab: None,
                show_help: false,
            }
        );
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_config_path_override() -> Result<()> {
        let options = parse_cli_args(
            vec!["--config", "/custom/config.toml"],
            default_options_path(),
        )?;
        assert_eq!(options.config_path, PathBuf::from("/custom/config.toml"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_errors_for_missing_values() {
        let error = parse_cli_args(vec!["--config"], default_options_path())
            .expect_err("missing config value should fail");
        assert!(error.to_string().contains("--config requires a file path"));

        let error = parse_cli_args(vec!["--render"], default_options_path())
            .expect_err("missing tab should fail");
        assert!(error.to_string().contains("--render requires a tab name"));
    }

    #[test]
    fn parse_cli_args_errors_for_unknown_argument() {
        let error = parse_cli_args(vec!["--wat"], default_options_path())
            .expect_err("unknown arg should fail");
        let message = error.to_string();
        assert!(message.contains("unknown argument"));
        assert!(message.contains("--help"));
    }

    #[test]
    fn parse_cli_args_parses_render_tab_names() -> Result<()> {
        let options = parse_cli_args(vec!["--render", "commands"], default_options_path())?;
        assert_eq!(options.render_tab, Some(MenuTab::Details));

        let error = parse_cli_args(vec!["--render", "settings"], default_options_path())
            .expect_err("unknown tab should fail");
        assert!(error.to_string().contains("unknown tab"));
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_print_and_check_flags() -> Result<()> {
        let options = parse_cli_args(
            vec!["--print-config-path", "--print-example-config", "--check"],
            default_options_path(),
        )?;
        assert!(options.print_config_path);
        assert!(options.print_example);
        assert!(options.check_only);
        assert!(!options.show_help);
        Ok(())
    }

    #[test]
    fn parse_cli_args_sets_help_flag_for_long_and_short_variants() -> Result<()> {
        let long = parse_cli_args(vec!["--help"], default_options_path())?;
        assert!(long.show_help);

        let short = parse_cli_args(vec!["-h"], default_options_path())?;
        assert!(short.show_help);
        Ok(())
    }

    #[test]
    fn snapshot_renders_requested_tab() -> Result<()> {
        let mut host = DemoHost::new();
        let state = snapshot_state(&mut host, &Config::default(), MenuTab::Help)?;
        assert!(state.visible);
        assert_eq!(state.active_tab, MenuTab::Help);
        assert!(state.health_summary.starts_with("server: ok"));

        let text = quickmenu_tui::render_text(&state);
        assert!(text.contains("[ Help ]"), "{text}");
        assert!(text.contains("Up to date"), "{text}");
        Ok(())
    }

    #[test]
    fn configured_latest_version_offers_upgrade_entry() -> Result<()> {
        let mut config = Config::default();
        config.menu.version = Some("1.0.0".to_owned());
        config.menu.latest_version = Some("1.2.0".to_owned());

        let mut host = demo_host(&config);
        let state = snapshot_state(&mut host, &config, MenuTab::Help)?;
        let entry = &state.help_entries[1];
        assert_eq!(entry.label, "Upgrade available: 1.2.0 (enter to upgrade)");
        assert_eq!(entry.action, quickmenu_app::HelpAction::RunCommand);

        let text = quickmenu_tui::render_text(&state);
        assert!(text.contains("Upgrade available: 1.2.0"), "{text}");
        Ok(())
    }
}
