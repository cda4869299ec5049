//! Application controller: drives fetches, UI state, preferences and the
//! suggestion list, and pushes rendered output to a [`View`].

use chrono::{Local, Utc};
use rand::{SeedableRng, rngs::StdRng};
use tokio::time::Instant;

use crate::{
    config::DEFAULT_CITY,
    debounce::{NavKey, Navigation, SuggestionDebouncer, SuggestionDisplay},
    error::FetchSite,
    geolocation::Geolocator,
    model::{Coordinates, CurrentConditions, ForecastSet, Theme, UiState, UnitSystem},
    provider::WeatherProvider,
    render::{self, AirQuality, CurrentView, DailyForecastItem, HourlyForecastItem},
    store::{KeyValueStore, Settings},
};

/// Rendering surface driven by the controller.
pub trait View {
    fn show_loading(&mut self);
    fn show_error(&mut self, message: &str);
    fn show_current(&mut self, current: &CurrentView);
    fn show_forecast(&mut self, daily: &[DailyForecastItem], hourly: &[HourlyForecastItem]);
    fn show_suggestions(&mut self, display: &SuggestionDisplay, selected: Option<usize>);
    fn show_favorites(&mut self, favorites: &[String]);
    fn close_favorites(&mut self);
    fn apply_theme(&mut self, theme: Theme);

    fn show_favorite_status(&mut self, _favorited: bool) {}

    fn set_search_input(&mut self, _text: &str) {}
}

/// Global shortcuts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key {
    Char(char),
    Escape,
}

/// Mutable application state, owned by the controller.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    pub ui: UiState,
    pub current: Option<CurrentConditions>,
    pub forecast: Option<ForecastSet>,
    pub air_quality: Option<AirQuality>,
    pub favorites_open: bool,
    pub search_input: String,
}

impl AppState {
    /// Conditions currently on screen, if the content view is visible.
    pub fn displayed(&self) -> Option<&CurrentConditions> {
        match self.ui {
            UiState::Content => self.current.as_ref(),
            _ => None,
        }
    }
}

pub struct Controller<S, V> {
    provider: Box<dyn WeatherProvider>,
    geolocator: Box<dyn Geolocator>,
    settings: Settings<S>,
    view: V,
    debouncer: SuggestionDebouncer,
    air_rng: StdRng,
    default_city: String,
    state: AppState,
}

impl<S: KeyValueStore, V: View> Controller<S, V> {
    pub fn new(
        provider: Box<dyn WeatherProvider>,
        geolocator: Box<dyn Geolocator>,
        settings: Settings<S>,
        view: V,
    ) -> Self {
        Self {
            provider,
            geolocator,
            settings,
            view,
            debouncer: SuggestionDebouncer::default(),
            air_rng: StdRng::from_entropy(),
            default_city: DEFAULT_CITY.to_string(),
            state: AppState::default(),
        }
    }

    pub fn with_default_city(mut self, city: impl Into<String>) -> Self {
        self.default_city = city.into();
        self
    }

    /// Make the air-quality placeholder reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.air_rng = StdRng::seed_from_u64(seed);
        self
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn settings(&self) -> &Settings<S> {
        &self.settings
    }

    pub fn view(&self) -> &V {
        &self.view
    }

    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    pub fn units(&self) -> UnitSystem {
        self.settings.prefs().units
    }

    /// Apply the saved theme, then show weather for the current position or
    /// the default city when no position is available.
    pub async fn start(&mut self) {
        self.view.apply_theme(self.settings.prefs().theme);
        self.set_ui(UiState::Loading);

        match self.geolocator.locate().await {
            Ok(coords) => self.load_by_coordinates(coords).await,
            Err(e) => {
                tracing::info!(
                    "could not get current location ({e}), loading {} instead",
                    self.default_city
                );
                let city = self.default_city.clone();
                self.search(&city).await;
            }
        }
    }

    /// Explicit "use my location": geolocation failures are shown to the user.
    pub async fn use_my_location(&mut self) {
        self.set_ui(UiState::Loading);

        match self.geolocator.locate().await {
            Ok(coords) => self.load_by_coordinates(coords).await,
            Err(e) => {
                tracing::warn!("geolocation failed: {e}");
                self.set_ui(UiState::Error(e.user_message().to_string()));
            }
        }
    }

    pub async fn search(&mut self, city: &str) {
        let city = city.trim();
        if city.is_empty() {
            return;
        }

        self.set_ui(UiState::Loading);
        tracing::info!("fetching weather for {city:?}");

        match self.provider.fetch_by_city(city, self.units()).await {
            Ok(conditions) => {
                let coords = conditions.coordinates;
                self.display_conditions(conditions);
                self.load_forecast(coords).await;
            }
            Err(e) => {
                tracing::warn!("city lookup failed: {e}");
                self.set_ui(UiState::Error(FetchSite::City.user_message().to_string()));
            }
        }
    }

    pub async fn load_by_coordinates(&mut self, coords: Coordinates) {
        self.set_ui(UiState::Loading);
        tracing::info!("fetching weather for {coords}");

        match self.provider.fetch_by_coordinates(coords, self.units()).await {
            Ok(conditions) => {
                self.display_conditions(conditions);
                self.load_forecast(coords).await;
            }
            Err(e) => {
                tracing::warn!("coordinate lookup failed: {e}");
                self.set_ui(UiState::Error(FetchSite::Coordinates.user_message().to_string()));
            }
        }
    }

    /// Search for whatever is in the search box, then clear it.
    pub async fn submit_search(&mut self) {
        let text = std::mem::take(&mut self.state.search_input);
        self.debouncer.hide();
        self.view.show_suggestions(&SuggestionDisplay::Hidden, None);

        if !text.trim().is_empty() {
            self.search(&text).await;
        }
        self.view.set_search_input("");
    }

    fn display_conditions(&mut self, conditions: CurrentConditions) {
        self.state.current = Some(conditions);
        self.state.forecast = None;
        self.state.air_quality = Some(AirQuality::synthesize(&mut self.air_rng));
        self.set_ui(UiState::Content);
        self.render_current();
    }

    async fn load_forecast(&mut self, coords: Coordinates) {
        match self.provider.fetch_forecast(coords, self.units()).await {
            Ok(set) => {
                self.state.forecast = Some(set);
                self.render_forecast();
            }
            Err(e) => tracing::warn!("forecast error: {e}"),
        }
    }

    fn render_current(&mut self) {
        let Some(conditions) = self.state.current.as_ref() else {
            return;
        };
        let air = *self
            .state
            .air_quality
            .get_or_insert_with(|| AirQuality::synthesize(&mut self.air_rng));
        let favorited = self.settings.is_favorite(&conditions.label());

        let view = render::current_view(conditions, favorited, Utc::now(), &Local, air);
        self.view.show_current(&view);
        self.view.show_favorite_status(favorited);
    }

    fn render_forecast(&mut self) {
        if let Some(set) = &self.state.forecast {
            let daily = render::daily_forecast(set, &Local);
            let hourly = render::hourly_forecast(set, &Local);
            self.view.show_forecast(&daily, &hourly);
        }
    }

    fn set_ui(&mut self, ui: UiState) {
        match &ui {
            UiState::Loading => self.view.show_loading(),
            UiState::Error(message) => self.view.show_error(message),
            UiState::Content => {}
        }
        self.state.ui = ui;
    }

    fn is_default_location(&self, conditions: &CurrentConditions) -> bool {
        conditions.location_name.eq_ignore_ascii_case(&self.default_city)
    }

    /// Flip metric/imperial. A displayed city other than the default is
    /// re-fetched; otherwise what is on screen is converted in place.
    pub async fn toggle_units(&mut self) {
        let units = self.units().toggled();
        if let Err(e) = self.settings.set_units(units) {
            tracing::warn!("failed to persist unit preference: {e}");
        }

        let Some(displayed) = self.state.displayed() else {
            return;
        };

        if self.is_default_location(displayed) {
            self.state.current = self.state.current.as_ref().map(|c| c.in_units(units));
            self.state.forecast = self.state.forecast.as_ref().map(|f| f.in_units(units));
            self.render_current();
            self.render_forecast();
        } else {
            let city = displayed.location_name.clone();
            self.search(&city).await;
        }
    }

    pub fn toggle_theme(&mut self) {
        let theme = self.settings.prefs().theme.toggled();
        if let Err(e) = self.settings.set_theme(theme) {
            tracing::warn!("failed to persist theme: {e}");
        }
        self.view.apply_theme(theme);
    }

    pub fn is_favorite(&self) -> bool {
        self.state
            .displayed()
            .is_some_and(|c| self.settings.is_favorite(&c.label()))
    }

    /// Add or remove the displayed location from favorites.
    pub fn toggle_favorite(&mut self) {
        let Some(label) = self.state.displayed().map(CurrentConditions::label) else {
            return;
        };

        let result = if self.settings.is_favorite(&label) {
            self.settings.remove_favorite(&label)
        } else {
            self.settings.add_favorite(&label)
        };
        if let Err(e) = result {
            tracing::warn!("failed to persist favorites: {e}");
        }

        self.view.show_favorite_status(self.is_favorite());
        if self.state.favorites_open {
            self.view.show_favorites(self.settings.favorites());
        }
    }

    pub fn open_favorites(&mut self) {
        self.state.favorites_open = true;
        self.view.show_favorites(self.settings.favorites());
    }

    pub fn close_favorites(&mut self) {
        if self.state.favorites_open {
            self.state.favorites_open = false;
            self.view.close_favorites();
        }
    }

    /// Load the favorite at `index` and dismiss the list.
    pub async fn select_favorite(&mut self, index: usize) -> bool {
        let Some(label) = self.settings.favorites().get(index).cloned() else {
            return false;
        };
        let city = label.split(',').next().unwrap_or(&label).trim().to_string();

        self.close_favorites();
        self.search(&city).await;
        true
    }

    pub fn remove_favorite(&mut self, index: usize) -> bool {
        let removed = match self.settings.remove_favorite_at(index) {
            Ok(removed) => removed.is_some(),
            Err(e) => {
                tracing::warn!("failed to persist favorites: {e}");
                true
            }
        };

        if self.state.favorites_open {
            self.view.show_favorites(self.settings.favorites());
        }
        self.view.show_favorite_status(self.is_favorite());
        removed
    }

    pub async fn handle_key(&mut self, key: Key) {
        match key {
            Key::Escape if self.state.favorites_open => self.close_favorites(),
            Key::Escape => {
                self.suggestion_key(NavKey::Escape).await;
            }
            Key::Char('y' | 'Y') => self.toggle_units().await,
            Key::Char('x' | 'X') => self.toggle_theme(),
            Key::Char(_) => {}
        }
    }

    /// The search text changed.
    pub fn search_input(&mut self, text: &str) {
        self.state.search_input = text.to_string();
        if !self.debouncer.input(text, Instant::now()) {
            self.view.show_suggestions(&SuggestionDisplay::Hidden, None);
        }
    }

    /// The search box lost focus.
    pub fn blur_search(&mut self) {
        self.debouncer.hide();
        self.view.show_suggestions(&SuggestionDisplay::Hidden, None);
    }

    pub fn next_suggestion_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    pub fn suggestions(&self) -> &SuggestionDisplay {
        self.debouncer.display()
    }

    pub fn selected_suggestion(&self) -> Option<usize> {
        self.debouncer.selected()
    }

    /// Start the lookup whose quiet period has elapsed, showing the loading row.
    pub fn begin_due_suggestions(&mut self) -> Option<crate::debounce::SuggestionRequest> {
        let request = self.debouncer.poll(Instant::now())?;
        self.view.show_suggestions(self.debouncer.display(), None);
        Some(request)
    }

    /// Render fetched suggestions unless a newer input superseded them.
    pub fn complete_suggestions(
        &mut self,
        generation: u64,
        results: Vec<crate::model::LocationSuggestion>,
    ) -> bool {
        let applied = self.debouncer.resolve(generation, results);
        if applied {
            self.view
                .show_suggestions(self.debouncer.display(), self.debouncer.selected());
        }
        applied
    }

    /// Wait out the debounce window, then fetch and render suggestions.
    pub async fn run_suggestions(&mut self) {
        let Some(deadline) = self.debouncer.deadline() else {
            return;
        };
        tokio::time::sleep_until(deadline).await;

        if let Some(request) = self.begin_due_suggestions() {
            let results = self.provider.fetch_suggestions(&request.query).await;
            self.complete_suggestions(request.generation, results);
        }
    }

    pub async fn suggestion_key(&mut self, key: NavKey) -> Navigation {
        let navigation = self.debouncer.navigate(key);

        match &navigation {
            Navigation::Moved(selected) => {
                self.view.show_suggestions(self.debouncer.display(), *selected);
            }
            Navigation::Commit(chosen) => {
                self.state.search_input = chosen.display_name();
                self.view.set_search_input(&self.state.search_input);
                self.view.show_suggestions(&SuggestionDisplay::Hidden, None);

                self.search(&chosen.name).await;

                self.state.search_input.clear();
                self.view.set_search_input("");
            }
            Navigation::Dismissed => {
                self.view.show_suggestions(&SuggestionDisplay::Hidden, None);
            }
            Navigation::Ignored => {}
        }

        navigation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        geolocation::{FixedGeolocator, UnsupportedGeolocator},
        provider::synthetic::SyntheticProvider,
        store::MemoryStore,
    };

    #[derive(Debug, Default)]
    struct NullView {
        theme: Option<Theme>,
        current: Option<CurrentView>,
        daily: usize,
        hourly: usize,
    }

    impl View for NullView {
        fn show_loading(&mut self) {}
        fn show_error(&mut self, _message: &str) {}
        fn show_current(&mut self, current: &CurrentView) {
            self.current = Some(current.clone());
        }
        fn show_forecast(&mut self, daily: &[DailyForecastItem], hourly: &[HourlyForecastItem]) {
            self.daily = daily.len();
            self.hourly = hourly.len();
        }
        fn show_suggestions(&mut self, _display: &SuggestionDisplay, _selected: Option<usize>) {}
        fn show_favorites(&mut self, _favorites: &[String]) {}
        fn close_favorites(&mut self) {}
        fn apply_theme(&mut self, theme: Theme) {
            self.theme = Some(theme);
        }
    }

    fn controller(geo: Box<dyn Geolocator>) -> Controller<MemoryStore, NullView> {
        Controller::new(
            Box::new(SyntheticProvider::seeded(5)),
            geo,
            Settings::load(MemoryStore::new()),
            NullView::default(),
        )
        .with_seed(5)
    }

    #[tokio::test]
    async fn start_with_position_uses_coordinates() {
        let mut c = controller(Box::new(FixedGeolocator::new(Coordinates::new(1.0, 2.0))));
        c.start().await;

        assert_eq!(c.state().ui, UiState::Content);
        assert_eq!(c.view().current.as_ref().unwrap().location, "Your Location, US");
        assert_eq!(c.view().daily, 5);
        assert_eq!(c.view().hourly, 8);
        assert_eq!(c.view().theme, Some(Theme::Dark));
    }

    #[tokio::test]
    async fn start_without_geolocation_falls_back_to_default_city() {
        let mut c = controller(Box::new(UnsupportedGeolocator)).with_default_city("Lisbon");
        c.start().await;

        assert_eq!(c.state().ui, UiState::Content);
        assert_eq!(c.state().current.as_ref().unwrap().location_name, "Lisbon");
    }

    #[tokio::test]
    async fn use_my_location_reports_unsupported() {
        let mut c = controller(Box::new(UnsupportedGeolocator));
        c.use_my_location().await;

        assert_eq!(
            c.state().ui,
            UiState::Error("Geolocation is not supported on this device.".into())
        );
    }

    #[tokio::test]
    async fn default_city_unit_toggle_converts_in_place() {
        let mut c = controller(Box::new(UnsupportedGeolocator));
        c.start().await;
        let metric = c.state().current.clone().unwrap();

        c.toggle_units().await;

        let imperial = c.state().current.clone().unwrap();
        assert_eq!(imperial.units, UnitSystem::Imperial);
        assert_eq!(imperial.humidity_pct, metric.humidity_pct);
        assert!(c.view().current.as_ref().unwrap().temperature_label.ends_with("°F"));
        assert_eq!(c.state().forecast.as_ref().unwrap().units, UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn shortcuts_toggle_theme_and_units() {
        let mut c = controller(Box::new(UnsupportedGeolocator));
        c.handle_key(Key::Char('x')).await;
        assert_eq!(c.settings().prefs().theme, Theme::Light);
        assert_eq!(c.view().theme, Some(Theme::Light));

        c.handle_key(Key::Char('Y')).await;
        assert_eq!(c.units(), UnitSystem::Imperial);

        c.handle_key(Key::Char('q')).await;
        assert_eq!(c.units(), UnitSystem::Imperial);
    }

    #[tokio::test]
    async fn blank_search_does_nothing() {
        let mut c = controller(Box::new(UnsupportedGeolocator));
        c.search("   ").await;
        assert_eq!(c.state().ui, UiState::Loading);
        assert!(c.state().current.is_none());
    }
}
