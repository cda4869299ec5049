use skycast_core::{
    SuggestionDisplay, Theme, View,
    render::{CurrentView, DailyForecastItem, HourlyForecastItem},
};

/// Prints everything the controller renders to stdout.
#[derive(Debug)]
pub struct TerminalView {
    theme: Theme,
    /// Whether the hourly and daily tables are printed.
    show_forecast: bool,
    /// One-shot commands report errors through the exit status instead.
    interactive: bool,
}

impl TerminalView {
    pub fn one_shot(show_forecast: bool) -> Self {
        Self {
            theme: Theme::default(),
            show_forecast,
            interactive: false,
        }
    }

    pub fn interactive() -> Self {
        Self {
            theme: Theme::default(),
            show_forecast: true,
            interactive: true,
        }
    }

    fn rule(&self) -> &'static str {
        match self.theme {
            Theme::Dark => "────────────────────────────────────────",
            Theme::Light => "----------------------------------------",
        }
    }
}

impl View for TerminalView {
    fn show_loading(&mut self) {
        if self.interactive {
            println!("Loading...");
        }
    }

    fn show_error(&mut self, message: &str) {
        if self.interactive {
            println!("Error: {message}");
        }
    }

    fn show_current(&mut self, current: &CurrentView) {
        let star = if current.is_favorite { " ★" } else { "" };

        println!("{}", self.rule());
        println!("{}{star}", current.location);
        println!("{}", current.date);
        println!();
        println!(
            "  {}  {} ({})",
            current.temperature_label, current.description, current.icon.class
        );
        println!("  Feels like {}", current.feels_like);
        println!(
            "  Humidity {}   Wind {}   Pressure {}",
            current.humidity, current.wind, current.pressure
        );
        println!(
            "  Visibility {}   Clouds {}   UV {}",
            current.visibility, current.cloud_cover, current.uv_index
        );
        println!("  Sunrise {}   Sunset {}", current.sunrise, current.sunset);

        let air = &current.air_quality;
        println!(
            "  Air quality {} ({})  PM2.5 {}  SO2 {}  NO2 {}  O3 {}",
            air.aqi,
            air.band.label(),
            air.pm25,
            air.so2,
            air.no2,
            air.o3
        );
    }

    fn show_forecast(&mut self, daily: &[DailyForecastItem], hourly: &[HourlyForecastItem]) {
        if !self.show_forecast {
            return;
        }

        println!();
        println!("  Next 24 hours");
        for item in hourly {
            println!(
                "    {:<6} {:>4}°  {:>3}%  {}",
                item.label, item.temperature, item.precipitation_pct, item.icon.class
            );
        }

        println!();
        println!("  5-day forecast");
        for item in daily {
            println!(
                "    {:<10} {:>4}° / {:>4}°  {}",
                item.label, item.high, item.low, item.icon.class
            );
        }
    }

    fn show_suggestions(&mut self, display: &SuggestionDisplay, selected: Option<usize>) {
        match display {
            SuggestionDisplay::Hidden => {}
            SuggestionDisplay::Loading => println!("  Loading..."),
            SuggestionDisplay::Empty => println!("  No locations found"),
            SuggestionDisplay::Results(results) => {
                for (index, suggestion) in results.iter().enumerate() {
                    let marker = if selected == Some(index) { '>' } else { ' ' };
                    println!("  {marker} {}", suggestion.display_name());
                }
            }
        }
    }

    fn show_favorites(&mut self, favorites: &[String]) {
        if favorites.is_empty() {
            println!("No favorite locations yet");
            return;
        }
        println!("Favorites:");
        for (index, label) in favorites.iter().enumerate() {
            println!("  {}. {label}", index + 1);
        }
    }

    fn close_favorites(&mut self) {}

    fn apply_theme(&mut self, theme: Theme) {
        self.theme = theme;
        tracing::debug!("theme set to {}", theme.as_str());
    }
}
