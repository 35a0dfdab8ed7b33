//! Debounced city autocomplete.
//!
//! [`CityAutocomplete`] is a headless search bar. A front-end feeds it input
//! events (`on_input`, `submit`, `select`, `locate`, `pointer_down`, `focus`)
//! and draws whatever [`SuggestionView`] it publishes. Committed searches are
//! forwarded as [`WeatherQuery`] values on the dispatch channel supplied at
//! mount time.
//!
//! Keystrokes are debounced: each change replaces a single scheduled fetch,
//! and only a timer that survives the quiet period dispatches a geocoding
//! request. Every input change and every committing action bumps a generation
//! counter, and a response is applied only while its generation is current,
//! so a slow request can never overwrite the results of a newer one.

use parking_lot::Mutex;
use std::{sync::Arc, time::Duration};
use tokio::{
    runtime::Handle,
    sync::{mpsc, watch},
    task::JoinHandle,
    time,
};
use tracing::{debug, warn};

use crate::{
    error::GeolocationError,
    geolocation::Geolocator,
    model::{Place, WeatherQuery},
    provider::Geocoder,
};

/// Quiet period between the last keystroke and the geocoding request.
pub const DEBOUNCE: Duration = Duration::from_millis(500);
pub const SUGGESTION_LIMIT: usize = 5;
/// Shortest trimmed input that triggers a lookup.
pub const MIN_QUERY_CHARS: usize = 2;
/// How long a geolocation notice stays up.
pub const NOTICE_TTL: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Idle,
    LoadingSuggestions,
    ShowingSuggestions,
    ShowingError,
}

/// Derive the panel state from its primitive parts.
pub fn ui_state(input: &str, suggestions: &[String], loading: bool, error: Option<&str>) -> UiState {
    if input.trim().chars().count() < MIN_QUERY_CHARS {
        UiState::Idle
    } else if loading {
        UiState::LoadingSuggestions
    } else if error.is_some() {
        UiState::ShowingError
    } else if !suggestions.is_empty() {
        UiState::ShowingSuggestions
    } else {
        UiState::Idle
    }
}

/// The panel is drawn only when it has something to show and was not dismissed.
pub fn panel_visible(open: bool, state: UiState) -> bool {
    open && state != UiState::Idle
}

/// Where a pointer-down landed relative to the search bar.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    SearchBar,
    Outside,
}

/// Snapshot of everything a renderer needs to draw the search bar.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestionView {
    pub input: String,
    pub suggestions: Vec<String>,
    pub state: UiState,
    pub visible: bool,
    pub error: Option<String>,
    /// Transient geolocation notice.
    pub notice: Option<String>,
    /// A debounced fetch is scheduled but not yet dispatched.
    pub pending: bool,
}

impl SuggestionView {
    pub fn is_settled(&self) -> bool {
        !self.pending && self.state != UiState::LoadingSuggestions
    }
}

#[derive(Debug, Default)]
struct Panel {
    input: String,
    suggestions: Vec<String>,
    error: Option<String>,
    /// Generation of the request currently in flight.
    loading: Option<u64>,
    pending: bool,
    open: bool,
    generation: u64,
    notice: Option<String>,
    notice_seq: u64,
    unmounted: bool,
}

impl Panel {
    fn view(&self) -> SuggestionView {
        let state = ui_state(
            &self.input,
            &self.suggestions,
            self.loading.is_some(),
            self.error.as_deref(),
        );
        SuggestionView {
            input: self.input.clone(),
            suggestions: self.suggestions.clone(),
            state,
            visible: panel_visible(self.open, state),
            error: self.error.clone(),
            notice: self.notice.clone(),
            pending: self.pending,
        }
    }

    /// Shared reset of every committing action. Input is left to the caller.
    fn dismiss(&mut self) {
        self.generation += 1;
        self.suggestions.clear();
        self.error = None;
        self.loading = None;
        self.pending = false;
        self.open = false;
    }
}

#[derive(Debug)]
struct Shared {
    panel: Mutex<Panel>,
    view_tx: watch::Sender<SuggestionView>,
}

impl Shared {
    fn update<R>(&self, f: impl FnOnce(&mut Panel) -> R) -> R {
        let mut panel = self.panel.lock();
        let out = f(&mut panel);
        self.view_tx.send_replace(panel.view());
        out
    }
}

/// Marks a request as loading for as long as it lives.
struct LoadingGuard {
    shared: Arc<Shared>,
    generation: u64,
}

impl LoadingGuard {
    /// Returns `None` when the request was superseded before dispatch.
    fn begin(shared: &Arc<Shared>, generation: u64) -> Option<Self> {
        let current = shared.update(|p| {
            if p.unmounted || p.generation != generation {
                return false;
            }
            p.pending = false;
            p.loading = Some(generation);
            p.error = None;
            p.open = true;
            true
        });

        current.then(|| Self {
            shared: Arc::clone(shared),
            generation,
        })
    }
}

impl Drop for LoadingGuard {
    fn drop(&mut self) {
        let generation = self.generation;
        self.shared.update(|p| {
            if p.loading == Some(generation) {
                p.loading = None;
            }
        });
    }
}

async fn fetch_suggestions(
    shared: Arc<Shared>,
    geocoder: Arc<dyn Geocoder>,
    query: String,
    generation: u64,
) {
    let Some(_loading) = LoadingGuard::begin(&shared, generation) else {
        debug!(%query, "fetch superseded before dispatch");
        return;
    };

    let result = geocoder.search(&query, SUGGESTION_LIMIT).await;

    shared.update(|p| {
        if p.unmounted || p.generation != generation {
            debug!(%query, generation, current = p.generation, "discarding stale suggestions");
            return;
        }
        match result {
            Ok(places) => {
                p.suggestions = places.iter().take(SUGGESTION_LIMIT).map(Place::label).collect();
                p.error = None;
            }
            Err(err) => {
                warn!(%query, error = %err, "suggestion lookup failed");
                p.suggestions.clear();
                p.error = Some(err.suggestion_message().to_owned());
            }
        }
        p.loading = None;
        p.open = true;
    });
}

/// Headless city search bar with debounced suggestions.
///
/// Dropping the controller unmounts it: the pending debounce and notice
/// timers are cancelled together and late responses are ignored.
#[derive(Debug)]
pub struct CityAutocomplete {
    shared: Arc<Shared>,
    geocoder: Arc<dyn Geocoder>,
    geolocator: Option<Arc<dyn Geolocator>>,
    dispatch: mpsc::UnboundedSender<WeatherQuery>,
    runtime: Handle,
    debounce: Mutex<Option<JoinHandle<()>>>,
    notice_timer: Mutex<Option<JoinHandle<()>>>,
}

impl CityAutocomplete {
    /// Mount a controller on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics when called outside of a Tokio runtime.
    pub fn new(geocoder: Arc<dyn Geocoder>, dispatch: mpsc::UnboundedSender<WeatherQuery>) -> Self {
        Self::with_runtime(geocoder, dispatch, Handle::current())
    }

    pub fn with_runtime(
        geocoder: Arc<dyn Geocoder>,
        dispatch: mpsc::UnboundedSender<WeatherQuery>,
        runtime: Handle,
    ) -> Self {
        let (view_tx, _) = watch::channel(SuggestionView::default());
        Self {
            shared: Arc::new(Shared {
                panel: Mutex::new(Panel::default()),
                view_tx,
            }),
            geocoder,
            geolocator: None,
            dispatch,
            runtime,
            debounce: Mutex::new(None),
            notice_timer: Mutex::new(None),
        }
    }

    pub fn with_geolocator(mut self, geolocator: Arc<dyn Geolocator>) -> Self {
        self.geolocator = Some(geolocator);
        self
    }

    pub fn view(&self) -> SuggestionView {
        self.shared.view_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<SuggestionView> {
        self.shared.view_tx.subscribe()
    }

    /// Resolves once no fetch is scheduled or loading.
    pub async fn settled(&self) {
        let mut rx = self.subscribe();
        // The sender lives in `self`, so this cannot observe a closed channel.
        let _ = rx.wait_for(SuggestionView::is_settled).await;
    }

    /// Text change: record it, then reschedule the suggestion fetch.
    pub fn on_input(&self, text: &str) {
        self.cancel_debounce();

        let query = text.trim().to_owned();
        let too_short = query.chars().count() < MIN_QUERY_CHARS;
        let credential = if too_short {
            Ok(())
        } else {
            self.geocoder.ensure_credential()
        };

        let generation = self.shared.update(|p| {
            p.input = text.to_owned();
            p.generation += 1;
            p.loading = None;
            p.pending = false;
            if too_short {
                p.suggestions.clear();
                p.error = None;
                p.open = false;
            } else if let Err(err) = &credential {
                p.suggestions.clear();
                p.error = Some(err.suggestion_message().to_owned());
                p.open = true;
            } else {
                p.pending = true;
            }
            p.generation
        });

        if too_short {
            return;
        }
        if let Err(err) = credential {
            warn!(error = %err, "skipping suggestion lookup");
            return;
        }

        let shared = Arc::clone(&self.shared);
        let geocoder = Arc::clone(&self.geocoder);
        let runtime = self.runtime.clone();
        let timer = self.runtime.spawn(async move {
            time::sleep(DEBOUNCE).await;
            // Detached so that cancelling the timer never aborts a dispatched request.
            runtime.spawn(fetch_suggestions(shared, geocoder, query, generation));
        });
        *self.debounce.lock() = Some(timer);
    }

    /// Form submission. Whitespace-only input is ignored.
    pub fn submit(&self) -> Option<WeatherQuery> {
        self.cancel_debounce();

        let query = self.shared.update(|p| {
            let trimmed = p.input.trim();
            let query = (!trimmed.is_empty()).then(|| WeatherQuery::City(trimmed.to_owned()));
            if query.is_some() {
                p.input.clear();
            }
            p.dismiss();
            query
        })?;

        self.forward(query)
    }

    /// Suggestion click. The label is forwarded as-is.
    pub fn select(&self, index: usize) -> Option<WeatherQuery> {
        let label = self.shared.update(|p| {
            let label = p.suggestions.get(index).cloned()?;
            p.input.clear();
            p.dismiss();
            Some(label)
        })?;
        self.cancel_debounce();

        self.forward(WeatherQuery::City(label))
    }

    /// Geolocation button. Failures become a transient notice and forward nothing.
    pub async fn locate(&self) -> Result<WeatherQuery, GeolocationError> {
        let position = match &self.geolocator {
            Some(geolocator) => geolocator.current_position().await,
            None => Err(GeolocationError::Unsupported),
        };

        match position {
            Ok(coords) => {
                self.cancel_debounce();
                self.shared.update(Panel::dismiss);
                let query = WeatherQuery::Coordinates(coords);
                self.forward(query.clone());
                Ok(query)
            }
            Err(err) => {
                warn!(error = %err, "could not determine position");
                self.show_notice(err.user_message());
                Err(err)
            }
        }
    }

    pub fn pointer_down(&self, target: PointerTarget) {
        if target == PointerTarget::Outside {
            self.shared.update(|p| p.open = false);
        }
    }

    /// Reopen the panel with whatever it last held.
    pub fn focus(&self) {
        self.shared.update(|p| p.open = true);
    }

    fn forward(&self, query: WeatherQuery) -> Option<WeatherQuery> {
        debug!(%query, "forwarding weather query");
        if self.dispatch.send(query.clone()).is_err() {
            warn!(%query, "weather query receiver is gone");
        }
        Some(query)
    }

    fn cancel_debounce(&self) {
        if let Some(timer) = self.debounce.lock().take() {
            timer.abort();
        }
    }

    fn show_notice(&self, message: &str) {
        let seq = self.shared.update(|p| {
            p.notice_seq += 1;
            p.notice = Some(message.to_owned());
            p.notice_seq
        });

        let shared = Arc::clone(&self.shared);
        let timer = self.runtime.spawn(async move {
            time::sleep(NOTICE_TTL).await;
            shared.update(|p| {
                if p.notice_seq == seq {
                    p.notice = None;
                }
            });
        });
        if let Some(previous) = self.notice_timer.lock().replace(timer) {
            previous.abort();
        }
    }
}

impl Drop for CityAutocomplete {
    fn drop(&mut self) {
        self.cancel_debounce();
        if let Some(timer) = self.notice_timer.lock().take() {
            timer.abort();
        }
        self.shared.update(|p| {
            p.unmounted = true;
            p.pending = false;
        });
    }
}
