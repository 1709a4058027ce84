mod cli;

use std::io::Write;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;

use cli::{Cli, Command};
use weatherpro_core::{Config, DurableStorage, SessionStorage};
use weatherpro_ui::{AppServices, DashboardModel, TerminalNotifier};

fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let config = cli.apply(config);

    weatherpro_core::init(&config.logging.level)?;
    let (config, _) = config.validated()?;

    let services = AppServices::from_config(&config)?;
    let durable = DurableStorage::open(config.storage.preferences_path())
        .context("Failed to open preferences")?;

    let mut dashboard = DashboardModel::new(
        services,
        Box::new(SessionStorage::new()),
        Box::new(durable),
        Box::new(TerminalNotifier::new()),
    );

    // Long enough for a locate plus both requests.
    let wait = Duration::from_secs(config.provider.timeout_secs.saturating_mul(3).max(1));

    tracing::info!("WeatherPro started");
    dashboard.start();
    if let Some(city) = &cli.search {
        dashboard.open_search();
        dashboard.set_search_input(city.as_str());
        dashboard.submit_search();
    }
    settle(&mut dashboard, wait);

    // Read one line at a time so alerts can take stdin for their acknowledgement.
    let stdin = std::io::stdin();
    let mut line = String::new();
    loop {
        draw(&dashboard)?;

        line.clear();
        if stdin.read_line(&mut line).context("Failed to read input")? == 0 {
            break;
        }

        match line.parse::<Command>() {
            Ok(Command::Quit) => break,
            Ok(command) => run(&mut dashboard, command),
            Err(message) => println!("{}", message),
        }
        settle(&mut dashboard, wait);
    }

    tracing::info!("WeatherPro shutting down");
    Ok(())
}

fn run(dashboard: &mut DashboardModel, command: Command) {
    match command {
        Command::Grant => dashboard.grant_location(),
        Command::Tab(tab) => dashboard.switch_tab(tab),
        Command::Search(None) => dashboard.open_search(),
        Command::Search(Some(city)) => {
            dashboard.open_search();
            dashboard.set_search_input(city);
            dashboard.submit_search();
        }
        Command::Save => dashboard.save_current(),
        Command::Remove(index) => dashboard.remove_saved(index),
        Command::Theme => dashboard.toggle_theme(),
        Command::Menu => dashboard.toggle_menu(),
        Command::Go(section) => dashboard.navigate(section),
        Command::Help => println!("{}", cli::HELP),
        Command::Refresh | Command::Quit => {}
    }
}

/// Show the loading state, then block until the request finishes.
fn settle(dashboard: &mut DashboardModel, wait: Duration) {
    if !dashboard.fetch_state().is_busy() {
        return;
    }
    let _ = draw(dashboard);
    if !dashboard.wait_until_idle(wait) {
        tracing::warn!("Request still running after {:?}", wait);
    }
}

fn draw(dashboard: &DashboardModel) -> Result<()> {
    let mut out = std::io::stdout().lock();
    let classes = dashboard.root_classes();
    if !classes.is_empty() {
        writeln!(out, "<{}>", classes.join(" "))?;
    }
    write!(out, "{}\n> ", weatherpro_ui::render(dashboard))?;
    out.flush()?;
    Ok(())
}
