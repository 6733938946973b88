//! Weather Clock
//!
//! A desktop clock for the system or a chosen timezone, with a background that
//! follows the time of day and the current weather for a city in that zone.

mod drawing;
mod ui;

use std::sync::Arc;

use nannou::prelude::*;
use nannou_egui::{self, Egui};
use shared::{DisplayController, WeatherClient, WidgetConfig};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::drawing::{colors, draw_labels, Backgrounds};
use crate::ui::{draw_selection_panel, PickerState, Screen};

const CLOCK_NAME: &str = "weather_clock";

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    nannou::app(model).update(update).run();
}

/// Application state
struct Model {
    /// Selection state and refresh loop
    controller: DisplayController,
    /// Everything the controller has pushed for display
    screen: Screen,
    /// One preloaded texture per time-of-day bucket
    backgrounds: Backgrounds,
    /// Timezone search box state
    picker_state: PickerState,
    /// egui integration
    egui: Egui,
}

/// Startup failures are packaging or configuration errors; there is nothing to show without them.
fn fatal(what: &str, err: &dyn std::error::Error) -> ! {
    error!(error = %err, "{}", what);
    std::process::exit(1)
}

fn model(app: &App) -> Model {
    let config = WidgetConfig::load(CLOCK_NAME)
        .unwrap_or_else(|e| fatal("failed to load configuration", &e));
    let api_key = config
        .require_api_key(CLOCK_NAME)
        .unwrap_or_else(|e| fatal("missing weather credential", &e));
    let client = WeatherClient::new(api_key, config.base_url.clone())
        .unwrap_or_else(|e| fatal("failed to create HTTP client", &e));

    // Create window
    let window_id = app
        .new_window()
        .title("Weather Clock")
        .size(config.window_width, config.window_height)
        .view(view)
        .key_pressed(key_pressed)
        .raw_event(raw_window_event)
        .build()
        .expect("failed to build window");

    let window = app.window(window_id).expect("window was just created");
    let egui = Egui::from_window(&window);

    let backgrounds = Backgrounds::load(app, &config)
        .unwrap_or_else(|e| fatal("missing background image", &e));

    let mut screen = Screen::default();
    let mut controller = DisplayController::new(Arc::new(client));
    controller.start(&mut screen);
    if let Some(tz) = config.initial_timezone.clone() {
        controller.select_timezone(&mut screen, Some(tz));
    }
    info!(assets = %config.assets_dir.display(), "weather clock ready");

    Model {
        controller,
        screen,
        backgrounds,
        picker_state: PickerState::default(),
        egui,
    }
}

fn update(_app: &App, model: &mut Model, update: Update) {
    // Finished lookups and the once-a-second tick
    model.controller.update(&mut model.screen);

    model.egui.set_elapsed_time(update.since_start);
    let ctx = model.egui.begin_frame();

    let result = draw_selection_panel(
        &ctx,
        &mut model.picker_state,
        &model.screen,
        model.controller.state(),
    );

    drop(ctx);

    if let Some(timezone) = result.selected_timezone {
        model.controller.select_timezone(&mut model.screen, timezone);
    }
    if let Some(city) = result.selected_city {
        model.controller.select_city(&mut model.screen, Some(city));
    }
}

fn view(app: &App, model: &Model, frame: Frame) {
    let draw = app.draw();
    let window_rect = app.window_rect();

    draw.background().color(colors::BACKGROUND);

    if let Some(bucket) = model.screen.bucket {
        model.backgrounds.draw(&draw, bucket, window_rect);
    }
    draw_labels(&draw, &model.screen, window_rect);

    draw.to_frame(app, &frame).unwrap();
    model.egui.draw_to_frame(&frame).unwrap();
}

fn key_pressed(_app: &App, model: &mut Model, key: Key) {
    match key {
        // Escape goes back to system time
        Key::Escape => {
            model.picker_state.clear();
            model.controller.select_timezone(&mut model.screen, None);
        }
        // Slash focuses the timezone search
        Key::Slash => model.picker_state.should_focus_search = true,
        _ => {}
    }
}

fn raw_window_event(_app: &App, model: &mut Model, event: &nannou::winit::event::WindowEvent) {
    model.egui.handle_raw_event(event);
}
