use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use weatherpro_core::{Config, LocationSource, Section, Tab};

#[derive(Debug, Parser)]
#[command(name = "weatherpro", about = "Terminal weather dashboard.", version)]
pub struct Cli {
    /// Config file (default: <config dir>/weatherpro/config.toml)
    #[arg(short, long, env = "WEATHERPRO_CONFIG")]
    pub config: Option<PathBuf>,

    /// OpenWeatherMap API key
    #[arg(long, env = "WEATHERPRO_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Weather API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// Where "your weather" comes from
    #[arg(long, value_enum, ignore_case = true)]
    pub location: Option<LocationArg>,

    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,

    /// Log filter when RUST_LOG is unset
    #[arg(long)]
    pub log_level: Option<String>,

    /// Search for a city right away
    #[arg(short, long)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LocationArg {
    /// Use --lat/--lon or the config file
    Fixed,
    /// Look the position up from the public IP address
    Ip,
    /// Never ask for a position
    #[value(alias = "off")]
    Disabled,
}

impl From<LocationArg> for LocationSource {
    fn from(arg: LocationArg) -> Self {
        match arg {
            LocationArg::Fixed => LocationSource::Fixed,
            LocationArg::Ip => LocationSource::Ip,
            LocationArg::Disabled => LocationSource::Disabled,
        }
    }
}

impl Cli {
    /// Flags win over the config file.
    pub fn apply(&self, mut config: Config) -> Config {
        if let Some(key) = &self.api_key {
            config.provider.api_key = Some(key.clone());
        }
        if let Some(url) = &self.base_url {
            config.provider.base_url = url.clone();
        }
        if let Some(source) = self.location {
            config.location.source = source.into();
        }
        if self.lat.is_some() {
            config.location.latitude = self.lat;
        }
        if self.lon.is_some() {
            config.location.longitude = self.lon;
        }
        if let Some(level) = &self.log_level {
            config.logging.level = level.clone();
        }
        config
    }
}

/// One line typed at the prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Grant,
    Tab(Tab),
    /// Open the search tab; with a city, search for it
    Search(Option<String>),
    Save,
    Remove(usize),
    Theme,
    Menu,
    Go(Section),
    Refresh,
    Help,
    Quit,
}

impl std::str::FromStr for Command {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let line = line.trim();
        let (word, rest) = match line.split_once(char::is_whitespace) {
            Some((word, rest)) => (word, rest.trim()),
            None => (line, ""),
        };

        match word.to_ascii_lowercase().as_str() {
            "" | "r" | "refresh" => Ok(Command::Refresh),
            "grant" => Ok(Command::Grant),
            "tab" => rest.parse().map(Command::Tab),
            "search" | "s" => Ok(Command::Search(
                Some(rest.to_string()).filter(|r| !r.is_empty()),
            )),
            "save" => Ok(Command::Save),
            "remove" | "rm" => rest
                .parse()
                .map(Command::Remove)
                .map_err(|_| format!("remove needs an index, got {rest:?}")),
            "theme" => Ok(Command::Theme),
            "menu" => Ok(Command::Menu),
            "go" => rest.parse().map(Command::Go),
            "home" => Ok(Command::Go(Section::Weather)),
            "forecast" => Ok(Command::Go(Section::Forecast)),
            "saved" => Ok(Command::Go(Section::Saved)),
            "help" | "?" => Ok(Command::Help),
            "quit" | "exit" | "q" => Ok(Command::Quit),
            other => Err(format!("unknown command: {other} (try \"help\")")),
        }
    }
}

pub const HELP: &str = "\
commands:
  grant              use your location
  tab user|search    switch tab
  search [city]      open search, or search for a city
  save               bookmark the shown weather
  remove <n>         delete saved location n
  theme              toggle dark mode
  menu               toggle the navigation menu
  home|forecast|saved  jump to a section
  refresh            redraw
  quit";

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn parses_commands() {
        assert_eq!("grant".parse::<Command>(), Ok(Command::Grant));
        assert_eq!("tab search".parse::<Command>(), Ok(Command::Tab(Tab::Search)));
        assert_eq!("search".parse::<Command>(), Ok(Command::Search(None)));
        assert_eq!(
            "search  New York ".parse::<Command>(),
            Ok(Command::Search(Some("New York".into())))
        );
        assert_eq!("rm 2".parse::<Command>(), Ok(Command::Remove(2)));
        assert_eq!("saved".parse::<Command>(), Ok(Command::Go(Section::Saved)));
        assert_eq!("go forecast".parse::<Command>(), Ok(Command::Go(Section::Forecast)));
        assert_eq!("".parse::<Command>(), Ok(Command::Refresh));
        assert_eq!("EXIT".parse::<Command>(), Ok(Command::Quit));
    }

    #[test]
    fn rejects_bad_input() {
        assert!("remove two".parse::<Command>().is_err());
        assert!("tab weather".parse::<Command>().is_err());
        assert!("launch".parse::<Command>().is_err());
    }

    #[test]
    fn flags_override_config() {
        let cli = Cli::parse_from([
            "weatherpro",
            "--api-key",
            "abc",
            "--location",
            "fixed",
            "--lat",
            "51.5",
            "--lon",
            "-0.12",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.provider.api_key(), Some("abc"));
        assert_eq!(config.location.source, LocationSource::Fixed);
        assert_eq!(config.location.longitude, Some(-0.12));
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn location_source_names() {
        let cli = Cli::try_parse_from(["weatherpro", "--location", "IP"]).unwrap();
        assert_eq!(cli.location, Some(LocationArg::Ip));

        let cli = Cli::try_parse_from(["weatherpro", "--location", "off"]).unwrap();
        assert_eq!(
            cli.apply(Config::default()).location.source,
            LocationSource::Disabled
        );

        assert!(Cli::try_parse_from(["weatherpro", "--location", "gps"]).is_err());
    }
}
