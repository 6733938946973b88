//! UI module - displayed state and the egui timezone/city pickers

use nannou_egui::egui;
use shared::{search_timezones, AppState, DisplaySurface, TimeOfDay};

/// Everything the controller has pushed to the window
#[derive(Debug, Default)]
pub struct Screen {
    pub time: String,
    pub date: String,
    pub weather: String,
    /// Bucket whose background is shown
    pub bucket: Option<TimeOfDay>,
    pub timezone_choices: Vec<&'static str>,
    pub city_choices: Vec<String>,
}

impl DisplaySurface for Screen {
    fn set_time(&mut self, text: &str) {
        self.time.replace_range(.., text);
    }

    fn set_date(&mut self, text: &str) {
        self.date.replace_range(.., text);
    }

    fn set_weather(&mut self, text: &str) {
        self.weather = text.to_string();
    }

    fn set_background(&mut self, bucket: TimeOfDay) {
        self.bucket = Some(bucket);
    }

    fn set_timezone_choices(&mut self, choices: &[&'static str]) {
        self.timezone_choices = choices.to_vec();
    }

    fn set_city_choices(&mut self, choices: &[String]) {
        self.city_choices = choices.to_vec();
    }
}

/// State for the timezone search box
#[derive(Default)]
pub struct PickerState {
    /// Current search query
    pub search_query: String,
    /// Cached search results; `None` until the first search
    search_results: Option<Vec<&'static str>>,
    /// Whether the search field should be focused
    pub should_focus_search: bool,
}

impl PickerState {
    pub fn clear(&mut self) {
        self.search_query.clear();
        self.search_results = None;
    }

    fn results<'a>(&'a mut self, choices: &[&'static str]) -> &'a [&'static str] {
        let query = &self.search_query;
        self.search_results
            .get_or_insert_with(|| search_timezones(choices, query))
    }

    fn update_search(&mut self, choices: &[&'static str]) {
        self.search_results = Some(search_timezones(choices, &self.search_query));
    }
}

/// Result of UI interactions
#[derive(Default)]
pub struct UiResult {
    /// `Some(None)` means the user went back to system-local time
    pub selected_timezone: Option<Option<String>>,
    pub selected_city: Option<String>,
}

/// Draw the "Time Zones" panel with its two dropdowns
pub fn draw_selection_panel(
    ctx: &egui::Context,
    picker_state: &mut PickerState,
    screen: &Screen,
    state: &AppState,
) -> UiResult {
    let mut result = UiResult::default();
    let current_tz = state.timezone.as_deref();

    egui::Window::new("Time Zones")
        .collapsible(false)
        .resizable(false)
        .title_bar(false)
        .default_width(260.0)
        .anchor(egui::Align2::CENTER_BOTTOM, [0.0, -60.0])
        .show(ctx, |ui| {
            ui.vertical_centered(|ui| {
                ui.strong("Time Zones");

                let response = ui.text_edit_singleline(&mut picker_state.search_query);
                if picker_state.should_focus_search {
                    response.request_focus();
                    picker_state.should_focus_search = false;
                }
                if response.changed() {
                    picker_state.update_search(&screen.timezone_choices);
                }

                let total = screen.timezone_choices.len();
                let results = picker_state.results(&screen.timezone_choices);
                egui::ComboBox::from_id_source("timezone_dropdown")
                    .width(240.0)
                    .selected_text(current_tz.unwrap_or("System local"))
                    .show_ui(ui, |ui| {
                        if ui.selectable_label(current_tz.is_none(), "System local").clicked()
                            && current_tz.is_some()
                        {
                            result.selected_timezone = Some(None);
                        }
                        for &tz in results {
                            if ui.selectable_label(current_tz == Some(tz), tz).clicked() {
                                result.selected_timezone = Some(Some(tz.to_string()));
                            }
                        }
                    })
                    .response
                    .on_hover_text(format!("Showing {} of {} time zones", results.len(), total));

                ui.add_space(6.0);
                ui.strong("Select City");

                let current_city = state.city.as_deref();
                ui.add_enabled_ui(!screen.city_choices.is_empty(), |ui| {
                    egui::ComboBox::from_id_source("city_dropdown")
                        .width(240.0)
                        .selected_text(current_city.unwrap_or(""))
                        .show_ui(ui, |ui| {
                            for city in &screen.city_choices {
                                let is_current = current_city == Some(city.as_str());
                                if ui.selectable_label(is_current, city.as_str()).clicked() {
                                    result.selected_city = Some(city.clone());
                                }
                            }
                        });
                });
            });
        });

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_screen_records_pushes() {
        let mut screen = Screen::default();
        screen.set_time("17:04:05 PM");
        screen.set_date("2024-03-01");
        screen.set_weather("Temp: 21.5°C\nClear Sky");
        screen.set_background(TimeOfDay::Evening);
        screen.set_city_choices(&["Paris".to_string()]);

        assert_eq!(screen.time, "17:04:05 PM");
        assert_eq!(screen.date, "2024-03-01");
        assert_eq!(screen.weather.lines().count(), 2);
        assert_eq!(screen.bucket, Some(TimeOfDay::Evening));
        assert_eq!(screen.city_choices, vec!["Paris"]);
    }

    #[test]
    fn test_picker_filters_published_choices() {
        let choices = ["America/New_York", "Europe/Paris", "US/Eastern"];
        let mut picker = PickerState::default();
        assert_eq!(picker.results(&choices).len(), 3);

        picker.search_query = "paris".into();
        picker.update_search(&choices);
        assert_eq!(picker.results(&choices), ["Europe/Paris"]);

        picker.clear();
        assert!(picker.search_query.is_empty());
        assert_eq!(picker.results(&choices).len(), 3);
    }
}
