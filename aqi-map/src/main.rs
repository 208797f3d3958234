//! AQI Map - nearest PM2.5 reading on a terminal map
//!
//! On start the user's position is looked up, the closest PM2.5 measurement
//! is fetched, and a map is shown with a "Your Location" marker. Clicking
//! anywhere on the map fetches the reading for that spot.
//!
//! FRAMEWORK PATTERN: EffectRuntime loop
//! - EffectStore for state management with declarative effects
//! - EffectRuntime handles event polling + action routing
//! - TaskManager for async operations (location + AQI lookups)
//! - Subscriptions for continuous sources (tick timer, auto-refresh)
//! - Debug layer for inspection (F12)
//!
//! # Usage
//!
//! ```sh
//! # Locate by IP address
//! OPENAQ_API_KEY=... aqi-map
//!
//! # Start somewhere specific
//! aqi-map --lat 52.52 --lon 13.405 --zoom 8
//! ```

use std::cell::RefCell;
use std::io;
use std::time::Duration;

use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{Frame, Terminal, backend::CrosstermBackend, layout::Rect};
use tui_dispatch::debug::DebugLayer;
use tui_dispatch::{
    EffectContext, EffectRuntime, EffectStoreWithMiddleware, EventKind, EventOutcome,
    RenderContext,
};

use aqi_map::action::Action;
use aqi_map::api::AqiClient;
use aqi_map::components::{AqiDisplay, AqiDisplayProps, Component};
use aqi_map::config::{AppSettings, Args, HTTP_TIMEOUT};
use aqi_map::effect::Effect;
use aqi_map::location::LocationProvider;
use aqi_map::logging;
use aqi_map::reducer::reducer;
use aqi_map::state::{AppState, LOADING_ANIM_TICK_MS};

#[tokio::main]
async fn main() -> io::Result<()> {
    let settings = AppSettings::from(Args::parse());

    if let Err(e) = logging::init(&settings.log_file) {
        eprintln!(
            "Warning: could not open log file {}: {}",
            settings.log_file.display(),
            e
        );
    }
    tracing::info!(
        endpoint = %settings.aqi.endpoint,
        api_key = settings.aqi.api_key.is_some(),
        location = ?settings.location,
        "starting aqi-map"
    );

    let http = reqwest::Client::builder()
        .timeout(HTTP_TIMEOUT)
        .build()
        .map_err(io::Error::other)?;

    // ===== Terminal setup =====
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, settings, http).await;

    // ===== Cleanup =====
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        tracing::error!(error = %e, "aqi-map exited with an error");
    }
    result
}

struct AqiUi {
    display: AqiDisplay,
}

impl AqiUi {
    fn new() -> Self {
        Self {
            display: AqiDisplay::new(),
        }
    }

    fn render(
        &mut self,
        frame: &mut Frame,
        area: Rect,
        state: &AppState,
        render_ctx: RenderContext,
    ) {
        let props = AqiDisplayProps {
            state,
            is_focused: render_ctx.is_focused(),
        };
        self.display.render(frame, area, props);
    }

    fn map_event(&mut self, event: &EventKind, state: &AppState) -> EventOutcome<Action> {
        if let EventKind::Resize(width, height) = event {
            return EventOutcome::action(Action::UiTerminalResize(*width, *height)).with_render();
        }

        let props = AqiDisplayProps {
            state,
            is_focused: true,
        };
        EventOutcome::from(self.display.handle_event(event, props))
    }
}

/// What effects need to reach the outside world
struct Services {
    http: reqwest::Client,
    aqi: AqiClient,
    location: LocationProvider,
}

impl Services {
    fn new(http: reqwest::Client, settings: &AppSettings) -> Self {
        Self {
            aqi: AqiClient::new(
                http.clone(),
                settings.aqi.endpoint.clone(),
                settings.aqi.api_key.clone(),
            ),
            location: settings.location.clone(),
            http,
        }
    }

    /// Handle effects by spawning tasks
    fn handle_effect(&self, effect: Effect, ctx: &mut EffectContext<Action>) {
        match effect {
            Effect::Locate => {
                let http = self.http.clone();
                let provider = self.location.clone();
                ctx.tasks().spawn("location", async move {
                    match provider.current_location(&http).await {
                        Ok(coordinate) => {
                            tracing::info!(%coordinate, "location resolved");
                            Action::LocationDidResolve(coordinate)
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "location lookup failed");
                            Action::LocationDidError(e.to_string())
                        }
                    }
                });
            }
            Effect::FetchReading { seq, coordinate } => {
                let aqi = self.aqi.clone();
                // Same key: a newer fetch aborts the one still in flight
                ctx.tasks().spawn("reading", async move {
                    match aqi.fetch_reading(coordinate).await {
                        Ok(reading) => Action::ReadingDidLoad {
                            seq,
                            coordinate,
                            reading,
                        },
                        Err(e) => {
                            tracing::warn!(seq, %coordinate, error = %e, "reading fetch failed");
                            Action::ReadingDidError {
                                seq,
                                error: e.to_string(),
                            }
                        }
                    }
                });
            }
        }
    }
}

async fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    settings: AppSettings,
    http: reqwest::Client,
) -> io::Result<()> {
    let services = Services::new(http, &settings);

    let store = EffectStoreWithMiddleware::new(
        AppState::new(settings.map.clone()),
        reducer,
        tui_dispatch::NoopMiddleware,
    );

    // Debug layer for inspection (F12) - only active when --debug
    let debug = DebugLayer::simple().active(settings.debug);

    let mut runtime = EffectRuntime::from_store(store).with_debug(debug);

    // Tick timer for loading animation
    runtime
        .subscriptions()
        .interval("tick", Duration::from_millis(LOADING_ANIM_TICK_MS), || {
            Action::Tick
        });

    if let Some(interval) = settings.refresh_interval {
        runtime
            .subscriptions()
            .interval("refresh", interval, || Action::ReadingAutoRefresh);
    }

    // Locate, then fetch
    runtime.enqueue(Action::LocationFetch);

    let ui = RefCell::new(AqiUi::new());

    runtime
        .run(
            terminal,
            |frame, area, state, render_ctx| {
                ui.borrow_mut().render(frame, area, state, render_ctx);
            },
            |event, state| ui.borrow_mut().map_event(event, state),
            |action| matches!(action, Action::Quit),
            |effect, ctx| services.handle_effect(effect, ctx),
        )
        .await
}
