//! Display controller - the clock/weather refresh loop
//!
//! Owns all selection state and pushes text and imagery to the window through
//! [`DisplaySurface`]. Everything here runs on the UI thread except weather
//! lookups, which run on one worker thread per selection and come back over a
//! channel tagged with the generation of the request that started them.

use chrono::{DateTime, Utc};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

use crate::catalog::{cities_for, list_timezones};
use crate::time_engine::{now_at, TimeOfDay};
use crate::weather::{WeatherReport, WeatherSource};

/// How often the clock labels are refreshed
pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

pub const SELECT_CITY_PROMPT: &str = "Select a city to see weather";

/// The widget side of the controller: labels, background and dropdowns
pub trait DisplaySurface {
    fn set_time(&mut self, text: &str);
    fn set_date(&mut self, text: &str);
    fn set_weather(&mut self, text: &str);
    /// Called only when the bucket changes
    fn set_background(&mut self, bucket: TimeOfDay);
    fn set_timezone_choices(&mut self, choices: &[&'static str]);
    fn set_city_choices(&mut self, choices: &[String]);
}

/// What the weather label currently shows
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WeatherPanel {
    #[default]
    Prompt,
    Fetching(String),
    Report {
        city: String,
        report: WeatherReport,
    },
}

impl std::fmt::Display for WeatherPanel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherPanel::Prompt => f.write_str(SELECT_CITY_PROMPT),
            WeatherPanel::Fetching(city) => write!(f, "Fetching weather for {}...", city),
            WeatherPanel::Report { report, .. } => write!(f, "{}", report),
        }
    }
}

/// Selection state read on every tick
#[derive(Debug, Default)]
pub struct AppState {
    /// `None` means system-local time
    pub timezone: Option<String>,
    pub cities: Vec<String>,
    pub city: Option<String>,
    /// Last bucket pushed to the surface
    pub bucket: Option<TimeOfDay>,
    pub weather: WeatherPanel,
    /// Bumped on every city selection change; only results for the
    /// current generation are shown.
    generation: u64,
}

impl AppState {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Ticking,
}

/// A lookup waiting to run on a worker thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WeatherJob {
    pub generation: u64,
    pub city: String,
}

impl WeatherJob {
    pub fn run(self, source: &dyn WeatherSource) -> WeatherUpdate {
        let report = source.fetch(&self.city);
        WeatherUpdate {
            generation: self.generation,
            city: self.city,
            report,
        }
    }
}

/// A finished lookup on its way back to the UI thread
#[derive(Debug, Clone, PartialEq)]
pub struct WeatherUpdate {
    pub generation: u64,
    pub city: String,
    pub report: WeatherReport,
}

pub struct DisplayController {
    state: AppState,
    phase: Phase,
    source: Arc<dyn WeatherSource>,
    results_tx: Sender<WeatherUpdate>,
    results_rx: Receiver<WeatherUpdate>,
    last_tick: Option<Instant>,
}

impl DisplayController {
    pub fn new(source: Arc<dyn WeatherSource>) -> Self {
        let (results_tx, results_rx) = mpsc::channel();
        Self {
            state: AppState::default(),
            phase: Phase::Idle,
            source,
            results_tx,
            results_rx,
            last_tick: None,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Publish the static choices and run the first tick
    pub fn start(&mut self, surface: &mut dyn DisplaySurface) {
        surface.set_timezone_choices(&list_timezones());
        surface.set_weather(&self.state.weather.to_string());
        self.phase = Phase::Ticking;
        info!(timezone = ?self.state.timezone, "display controller started");
        self.tick(surface);
    }

    /// Per-frame hook: apply finished lookups, then tick if one is due
    pub fn update(&mut self, surface: &mut dyn DisplaySurface) {
        self.drain_results(surface);

        if self.phase != Phase::Ticking {
            return;
        }
        let due = self
            .last_tick
            .map_or(true, |last| last.elapsed() >= TICK_INTERVAL);
        if due {
            self.tick(surface);
        }
    }

    pub fn tick(&mut self, surface: &mut dyn DisplaySurface) {
        self.tick_at(surface, Utc::now());
        self.last_tick = Some(Instant::now());
    }

    /// Refresh clock, background and city list for a given instant
    pub fn tick_at(&mut self, surface: &mut dyn DisplaySurface, instant: DateTime<Utc>) {
        let reading = now_at(self.state.timezone.as_deref(), instant);
        surface.set_time(&reading.time);
        surface.set_date(&reading.date);

        let bucket = reading.bucket();
        if self.state.bucket != Some(bucket) {
            debug!(%bucket, "time-of-day bucket changed");
            self.state.bucket = Some(bucket);
            surface.set_background(bucket);
        }

        self.refresh_cities(surface);
    }

    /// The user picked a timezone (or `None` for system-local time)
    pub fn select_timezone(&mut self, surface: &mut dyn DisplaySurface, timezone: Option<String>) {
        let timezone = timezone.filter(|tz| !tz.trim().is_empty());
        if timezone == self.state.timezone {
            return;
        }
        info!(?timezone, "timezone selected");
        self.state.timezone = timezone;
        self.tick(surface);
    }

    /// The user picked a city; starts a lookup on a worker thread
    pub fn select_city(&mut self, surface: &mut dyn DisplaySurface, city: Option<String>) {
        let Some(city) = city.filter(|c| !c.trim().is_empty()) else {
            self.clear_city(surface);
            return;
        };

        info!(%city, "city selected");
        let job = self.dispatch(city);
        self.show(surface, WeatherPanel::Fetching(job.city.clone()));
        self.spawn(surface, job);
    }

    /// Record a new selection and return the lookup for it
    pub fn dispatch(&mut self, city: String) -> WeatherJob {
        self.state.generation += 1;
        self.state.city = Some(city.clone());
        WeatherJob {
            generation: self.state.generation,
            city,
        }
    }

    /// Show a finished lookup if it still belongs to the current selection.
    /// Returns whether it was applied.
    pub fn apply(&mut self, surface: &mut dyn DisplaySurface, update: WeatherUpdate) -> bool {
        let current = update.generation == self.state.generation
            && self.state.city.as_deref() == Some(update.city.as_str());
        if !current {
            debug!(
                city = %update.city,
                generation = update.generation,
                current = self.state.generation,
                "discarding stale weather result"
            );
            return false;
        }

        self.show(
            surface,
            WeatherPanel::Report {
                city: update.city,
                report: update.report,
            },
        );
        true
    }

    fn spawn(&mut self, surface: &mut dyn DisplaySurface, job: WeatherJob) {
        let source = Arc::clone(&self.source);
        let results = self.results_tx.clone();
        let (generation, city) = (job.generation, job.city.clone());

        let spawned = thread::Builder::new()
            .name(format!("weather-lookup-{}", generation))
            .spawn(move || {
                let update = job.run(source.as_ref());
                // The receiver is gone only when the window has closed.
                let _ = results.send(update);
            });

        if let Err(err) = spawned {
            error!(%city, error = %err, "failed to start weather lookup");
            self.apply(
                surface,
                WeatherUpdate {
                    generation,
                    city,
                    report: WeatherReport::Error(format!("could not start lookup: {}", err)),
                },
            );
        }
    }

    fn drain_results(&mut self, surface: &mut dyn DisplaySurface) {
        while let Ok(update) = self.results_rx.try_recv() {
            self.apply(surface, update);
        }
    }

    fn refresh_cities(&mut self, surface: &mut dyn DisplaySurface) {
        let cities = match self.state.timezone.as_deref() {
            Some(tz) => cities_for(tz),
            None => Vec::new(),
        };
        if cities != self.state.cities {
            self.state.cities = cities;
            surface.set_city_choices(&self.state.cities);
        }

        let still_listed = self
            .state
            .city
            .as_ref()
            .map_or(true, |city| self.state.cities.contains(city));
        if !still_listed {
            debug!(city = ?self.state.city, "selected city no longer listed");
            self.clear_city(surface);
        }
    }

    fn clear_city(&mut self, surface: &mut dyn DisplaySurface) {
        // Invalidate any lookup still in flight
        self.state.generation += 1;
        self.state.city = None;
        self.show(surface, WeatherPanel::Prompt);
    }

    fn show(&mut self, surface: &mut dyn DisplaySurface, panel: WeatherPanel) {
        surface.set_weather(&panel.to_string());
        self.state.weather = panel;
    }
}
