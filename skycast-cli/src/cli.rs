use anyhow::{Context, Result, anyhow, bail};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Select, Text};
use skycast_core::{
    CachedGeolocator, Config, Controller, Coordinates, CurrentConditions, FetchSite, FileStore,
    FixedGeolocator, Geolocator, ProviderKind, Settings, UiState, UnsupportedGeolocator,
    WeatherProvider,
    debounce::MIN_QUERY_CHARS,
    provider::default_provider_from_config,
};

use crate::{interactive, view::TerminalView};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "skycast", version, about = "Weather dashboard for the terminal")]
pub struct Cli {
    /// OpenWeather API key. Overrides the configured key.
    #[arg(long, global = true, env = "SKYCAST_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Provider to use: "openweather" or "synthetic".
    #[arg(long, global = true)]
    provider: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively set the provider, API key and default city.
    Configure,

    /// Show weather for a city.
    Show {
        city: String,

        /// Print current conditions and forecast as JSON.
        #[arg(long)]
        json: bool,

        /// Skip the hourly and daily forecast tables.
        #[arg(long)]
        current_only: bool,
    },

    /// Show weather for the configured (or given) position.
    Here {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,

        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,

        #[arg(long)]
        json: bool,

        #[arg(long)]
        current_only: bool,
    },

    /// List place names matching a partial query.
    Suggest { query: String },

    /// Manage favorite locations.
    Favorites {
        #[command(subcommand)]
        action: Option<FavoritesAction>,
    },

    /// Line-driven dashboard (the default).
    Interactive,
}

#[derive(Debug, Subcommand)]
pub enum FavoritesAction {
    List,
    /// Add a label such as "London, GB".
    Add { label: String },
    Remove { label: String },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        let command = self.command.unwrap_or(Command::Interactive);

        let mut config = Config::load()?;
        if let Some(key) = self.api_key {
            config.upsert_api_key(key);
        }
        if let Some(provider) = self.provider.as_deref() {
            config.set_provider(ProviderKind::try_from(provider)?);
        }

        match command {
            Command::Configure => configure(config),
            Command::Show { city, json, current_only } => {
                if json {
                    let provider = default_provider_from_config(&config)?;
                    let units = open_settings()?.prefs().units;
                    let current = provider
                        .fetch_by_city(&city, units)
                        .await
                        .context(FetchSite::City.user_message())?;
                    print_json(provider.as_ref(), current).await
                } else {
                    let view = TerminalView::one_shot(!current_only);
                    let mut controller = build_controller(&config, view)?;
                    controller.search(&city).await;
                    finish(&controller)
                }
            }
            Command::Here { lat, lon, json, current_only } => {
                if let (Some(lat), Some(lon)) = (lat, lon) {
                    config.location = Some(Coordinates::new(lat, lon));
                }
                if json {
                    let provider = default_provider_from_config(&config)?;
                    let units = open_settings()?.prefs().units;
                    let coords = geolocator(&config)
                        .locate()
                        .await
                        .map_err(|e| anyhow!(e.user_message()))?;
                    let current = provider
                        .fetch_by_coordinates(coords, units)
                        .await
                        .context(FetchSite::Coordinates.user_message())?;
                    print_json(provider.as_ref(), current).await
                } else {
                    let view = TerminalView::one_shot(!current_only);
                    let mut controller = build_controller(&config, view)?;
                    controller.use_my_location().await;
                    finish(&controller)
                }
            }
            Command::Suggest { query } => {
                let query = query.trim();
                if query.chars().count() < MIN_QUERY_CHARS {
                    bail!("Type at least {MIN_QUERY_CHARS} characters to get suggestions");
                }

                let provider = default_provider_from_config(&config)?;
                let found = provider.fetch_suggestions(query).await;
                if found.is_empty() {
                    println!("No locations found");
                }
                for suggestion in found {
                    println!("{}", suggestion.display_name());
                }
                Ok(())
            }
            Command::Favorites { action } => favorites(action.unwrap_or(FavoritesAction::List)),
            Command::Interactive => {
                let mut controller = build_controller(&config, TerminalView::interactive())?;
                interactive::run(&mut controller).await
            }
        }
    }
}

fn configure(mut config: Config) -> Result<()> {
    let kinds = ProviderKind::all().to_vec();
    let current = config.provider_kind().unwrap_or(ProviderKind::Synthetic);
    let cursor = kinds.iter().position(|k| *k == current).unwrap_or(0);

    let kind = Select::new("Weather provider:", kinds)
        .with_starting_cursor(cursor)
        .prompt()?;
    config.set_provider(kind);

    if kind == ProviderKind::OpenWeather {
        let key = Password::new("OpenWeather API key (leave empty to keep the current one):")
            .without_confirmation()
            .with_display_mode(PasswordDisplayMode::Masked)
            .prompt()?;

        let key = key.trim();
        if !key.is_empty() {
            config.upsert_api_key(key.to_string());
        } else if config.api_key().is_none() {
            bail!("OpenWeather needs an API key");
        }
    }

    let city = Text::new("Default city:")
        .with_default(&config.default_city)
        .prompt()?;
    if !city.trim().is_empty() {
        config.default_city = city.trim().to_string();
    }

    config.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

fn favorites(action: FavoritesAction) -> Result<()> {
    let mut settings = open_settings()?;

    match action {
        FavoritesAction::List => {
            if settings.favorites().is_empty() {
                println!("No favorite locations yet");
            }
            for (index, label) in settings.favorites().iter().enumerate() {
                println!("{}. {label}", index + 1);
            }
        }
        FavoritesAction::Add { label } => {
            let label = label.trim();
            if label.is_empty() {
                bail!("Favorite label must not be empty");
            }
            if settings.add_favorite(label)? {
                println!("Added {label}");
            } else {
                println!("{label} is already a favorite");
            }
        }
        FavoritesAction::Remove { label } => {
            if settings.remove_favorite(label.trim())? {
                println!("Removed {}", label.trim());
            } else {
                bail!("{} is not a favorite", label.trim());
            }
        }
    }

    Ok(())
}

fn open_settings() -> Result<Settings<FileStore>> {
    let path = Config::settings_file_path()?;
    let store = FileStore::open(path.clone())
        .with_context(|| format!("Failed to open settings file: {}", path.display()))?;
    Ok(Settings::load(store))
}

fn geolocator(config: &Config) -> Box<dyn Geolocator> {
    match config.location {
        Some(position) => Box::new(CachedGeolocator::new(FixedGeolocator::new(position))),
        None => Box::new(UnsupportedGeolocator),
    }
}

fn build_controller(
    config: &Config,
    view: TerminalView,
) -> Result<Controller<FileStore, TerminalView>> {
    let provider = default_provider_from_config(config)?;
    let controller = Controller::new(provider, geolocator(config), open_settings()?, view)
        .with_default_city(config.default_city.clone());

    Ok(match config.seed {
        Some(seed) => controller.with_seed(seed),
        None => controller,
    })
}

/// Turn a rendered error state into a failing exit status.
fn finish(controller: &Controller<FileStore, TerminalView>) -> Result<()> {
    match &controller.state().ui {
        UiState::Error(message) => Err(anyhow!(message.clone())),
        _ => Ok(()),
    }
}

async fn print_json(
    provider: &dyn WeatherProvider,
    current: CurrentConditions,
) -> Result<()> {
    let forecast = match provider.fetch_forecast(current.coordinates, current.units).await {
        Ok(set) => Some(set),
        Err(e) => {
            tracing::warn!("forecast error: {e}");
            None
        }
    };

    let out = serde_json::json!({
        "current": current,
        "forecast": forecast,
    });
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}
