//! Keystroke debouncing and list navigation for place-name suggestions.
//!
//! The debouncer is a plain state machine driven by explicit instants; the
//! controller owns the timer. Every input bumps a generation counter, and a
//! fetch result is rendered only if it carries the latest generation, so a
//! slow response for an old query can never overwrite a newer one.

use std::time::Duration;
use tokio::time::Instant;

use crate::model::LocationSuggestion;

pub const DEBOUNCE_WINDOW: Duration = Duration::from_millis(300);

/// Queries shorter than this (after trimming) hide the list.
pub const MIN_QUERY_CHARS: usize = 2;

/// What the suggestion list currently shows.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum SuggestionDisplay {
    #[default]
    Hidden,
    Loading,
    Results(Vec<LocationSuggestion>),
    /// "No locations found".
    Empty,
}

/// A lookup that became due; hand it back to [`SuggestionDebouncer::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuggestionRequest {
    pub query: String,
    pub generation: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    Enter,
    Escape,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Navigation {
    Ignored,
    Moved(Option<usize>),
    Commit(LocationSuggestion),
    Dismissed,
}

#[derive(Debug)]
struct Pending {
    query: String,
    deadline: Instant,
}

#[derive(Debug)]
pub struct SuggestionDebouncer {
    window: Duration,
    generation: u64,
    pending: Option<Pending>,
    display: SuggestionDisplay,
    selected: Option<usize>,
}

impl Default for SuggestionDebouncer {
    fn default() -> Self {
        Self::new(DEBOUNCE_WINDOW)
    }
}

impl SuggestionDebouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            generation: 0,
            pending: None,
            display: SuggestionDisplay::Hidden,
            selected: None,
        }
    }

    /// Record a change of the search text. Returns whether a lookup was scheduled.
    pub fn input(&mut self, text: &str, now: Instant) -> bool {
        self.generation += 1;
        self.pending = None;

        let query = text.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            self.display = SuggestionDisplay::Hidden;
            self.selected = None;
            return false;
        }

        self.pending = Some(Pending {
            query: query.to_string(),
            deadline: now + self.window,
        });
        true
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Emit the pending lookup once its quiet period has elapsed.
    pub fn poll(&mut self, now: Instant) -> Option<SuggestionRequest> {
        if self.pending.as_ref()?.deadline > now {
            return None;
        }
        let pending = self.pending.take()?;

        self.display = SuggestionDisplay::Loading;
        self.selected = None;

        Some(SuggestionRequest {
            query: pending.query,
            generation: self.generation,
        })
    }

    /// Apply fetched suggestions. Returns `false` if they were stale and dropped.
    pub fn resolve(&mut self, generation: u64, mut results: Vec<LocationSuggestion>) -> bool {
        if generation != self.generation || self.display != SuggestionDisplay::Loading {
            tracing::debug!(
                "dropping stale suggestions (generation {generation}, current {})",
                self.generation
            );
            return false;
        }

        results.truncate(crate::provider::MAX_SUGGESTIONS);
        self.selected = None;
        self.display = if results.is_empty() {
            SuggestionDisplay::Empty
        } else {
            SuggestionDisplay::Results(results)
        };
        true
    }

    /// Close the list and forget any scheduled or in-flight lookup.
    pub fn hide(&mut self) {
        self.generation += 1;
        self.pending = None;
        self.display = SuggestionDisplay::Hidden;
        self.selected = None;
    }

    pub fn display(&self) -> &SuggestionDisplay {
        &self.display
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn navigate(&mut self, key: NavKey) -> Navigation {
        let count = match &self.display {
            SuggestionDisplay::Results(results) => results.len(),
            _ => 0,
        };

        match key {
            NavKey::Escape => {
                self.hide();
                Navigation::Dismissed
            }
            _ if count == 0 => Navigation::Ignored,
            NavKey::Down => {
                self.selected = Some(self.selected.map_or(0, |i| (i + 1).min(count - 1)));
                Navigation::Moved(self.selected)
            }
            NavKey::Up => {
                self.selected = self.selected.and_then(|i| i.checked_sub(1));
                Navigation::Moved(self.selected)
            }
            NavKey::Enter => {
                let chosen = match (&self.display, self.selected) {
                    (SuggestionDisplay::Results(results), Some(i)) => results.get(i).cloned(),
                    _ => None,
                };
                match chosen {
                    Some(chosen) => {
                        self.hide();
                        Navigation::Commit(chosen)
                    }
                    None => Navigation::Ignored,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn city(name: &str, country: &str) -> LocationSuggestion {
        LocationSuggestion {
            name: name.into(),
            country: country.into(),
            state: None,
            lat: 0.0,
            lon: 0.0,
        }
    }

    fn with_results(results: Vec<LocationSuggestion>) -> SuggestionDebouncer {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();
        d.input("query", t0);
        let req = d.poll(t0 + DEBOUNCE_WINDOW).unwrap();
        assert!(d.resolve(req.generation, results));
        d
    }

    #[test]
    fn short_query_hides_and_schedules_nothing() {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();

        assert!(!d.input(" a ", t0));
        assert_eq!(d.display(), &SuggestionDisplay::Hidden);
        assert!(d.poll(t0 + Duration::from_secs(1)).is_none());
    }

    #[test]
    fn lookup_fires_only_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();

        assert!(d.input("Lo", t0));
        assert!(d.poll(t0 + Duration::from_millis(299)).is_none());

        let req = d.poll(t0 + DEBOUNCE_WINDOW).expect("due");
        assert_eq!(req.query, "Lo");
        assert_eq!(d.display(), &SuggestionDisplay::Loading);
        assert!(d.poll(t0 + Duration::from_secs(5)).is_none());
    }

    #[test]
    fn new_input_restarts_the_timer() {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();

        d.input("Lo", t0);
        let t1 = t0 + Duration::from_millis(200);
        d.input("Lon", t1);

        assert!(d.poll(t0 + DEBOUNCE_WINDOW).is_none());
        let req = d.poll(t1 + DEBOUNCE_WINDOW).expect("due");
        assert_eq!(req.query, "Lon");
    }

    #[test]
    fn stale_result_is_discarded() {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();

        d.input("Lo", t0);
        let old = d.poll(t0 + DEBOUNCE_WINDOW).unwrap();

        let t1 = t0 + Duration::from_secs(1);
        d.input("Par", t1);
        let new = d.poll(t1 + DEBOUNCE_WINDOW).unwrap();

        assert!(d.resolve(new.generation, vec![city("Paris", "FR")]));
        assert!(!d.resolve(old.generation, vec![city("London", "GB")]));
        assert_eq!(d.display(), &SuggestionDisplay::Results(vec![city("Paris", "FR")]));
    }

    #[test]
    fn result_after_hide_is_discarded() {
        let t0 = Instant::now();
        let mut d = SuggestionDebouncer::default();

        d.input("Lo", t0);
        let req = d.poll(t0 + DEBOUNCE_WINDOW).unwrap();
        d.input("L", t0 + DEBOUNCE_WINDOW);

        assert!(!d.resolve(req.generation, vec![city("London", "GB")]));
        assert_eq!(d.display(), &SuggestionDisplay::Hidden);
    }

    #[test]
    fn empty_result_shows_placeholder() {
        let d = with_results(Vec::new());
        assert_eq!(d.display(), &SuggestionDisplay::Empty);
    }

    #[test]
    fn results_are_capped_at_five() {
        let many = (0..8).map(|i| city(&format!("C{i}"), "XX")).collect();
        let d = with_results(many);
        match d.display() {
            SuggestionDisplay::Results(r) => assert_eq!(r.len(), 5),
            other => panic!("unexpected display {other:?}"),
        }
    }

    #[test]
    fn navigation_clamps_to_bounds() {
        let mut d = with_results(vec![city("London", "GB"), city("Londrina", "BR")]);

        assert_eq!(d.navigate(NavKey::Up), Navigation::Moved(None));
        assert_eq!(d.navigate(NavKey::Down), Navigation::Moved(Some(0)));
        assert_eq!(d.navigate(NavKey::Down), Navigation::Moved(Some(1)));
        assert_eq!(d.navigate(NavKey::Down), Navigation::Moved(Some(1)));
        assert_eq!(d.navigate(NavKey::Up), Navigation::Moved(Some(0)));
        assert_eq!(d.navigate(NavKey::Up), Navigation::Moved(None));
    }

    #[test]
    fn enter_without_selection_is_ignored() {
        let mut d = with_results(vec![city("London", "GB")]);
        assert_eq!(d.navigate(NavKey::Enter), Navigation::Ignored);
    }

    #[test]
    fn enter_commits_selection_and_closes() {
        let mut d = with_results(vec![city("London", "GB")]);
        d.navigate(NavKey::Down);

        assert_eq!(d.navigate(NavKey::Enter), Navigation::Commit(city("London", "GB")));
        assert_eq!(d.display(), &SuggestionDisplay::Hidden);
    }

    #[test]
    fn navigation_ignores_placeholder_rows() {
        let mut d = with_results(Vec::new());
        assert_eq!(d.navigate(NavKey::Down), Navigation::Ignored);
    }

    #[test]
    fn escape_dismisses() {
        let mut d = with_results(vec![city("London", "GB")]);
        assert_eq!(d.navigate(NavKey::Escape), Navigation::Dismissed);
        assert_eq!(d.display(), &SuggestionDisplay::Hidden);
    }
}
