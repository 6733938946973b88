//! Shared core for the weather clock: timezone catalog, clock readings,
//! weather lookups and the display refresh loop. Nothing in here needs a window.

pub mod catalog;
pub mod config;
pub mod controller;
pub mod time_engine;
pub mod weather;

pub use catalog::{cities_for, list_timezones, parse_timezone, search_timezones};
pub use config::{config_dir, config_path, ConfigError, WidgetConfig};
pub use controller::{
    AppState, DisplayController, DisplaySurface, Phase, WeatherJob, WeatherPanel, WeatherUpdate,
    SELECT_CITY_PROMPT, TICK_INTERVAL,
};
pub use time_engine::{bucket_for, now, now_at, reading_for, ClockReading, TimeOfDay};
pub use weather::{WeatherClient, WeatherError, WeatherReport, WeatherSource, DEFAULT_BASE_URL};
