//! Weather lookups against the OpenWeather "current weather" endpoint
//!
//! A lookup is a single blocking GET. Every outcome, including failures, is
//! turned into a [`WeatherReport`] whose `Display` form is what the widget shows.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5";

/// Displayable result of one weather lookup
#[derive(Debug, Clone, PartialEq)]
pub enum WeatherReport {
    /// Shown as "Temp: {temperature_c}°C" using `f64` display, so a whole
    /// number prints without a fractional part ("20", not "20.0")
    Conditions {
        temperature_c: f64,
        description: String,
    },
    /// The provider answered, but without a `main` block
    Unavailable,
    /// Non-2xx status
    HttpError(String),
    /// Network, decoding or any other failure
    Error(String),
}

impl std::fmt::Display for WeatherReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WeatherReport::Conditions {
                temperature_c,
                description,
            } => write!(f, "Temp: {}°C\n{}", temperature_c, title_case(description)),
            WeatherReport::Unavailable => write!(f, "Weather data not available"),
            WeatherReport::HttpError(details) => write!(f, "HTTP error: {}", details),
            WeatherReport::Error(details) => write!(f, "Error: {}", details),
        }
    }
}

#[derive(Debug, Error)]
pub enum WeatherError {
    #[error("{status}{detail}")]
    Status { status: StatusCode, detail: String },
    #[error("{}", error_chain(.0))]
    Request(#[from] reqwest::Error),
    #[error("{0}")]
    Json(#[from] serde_json::Error),
    #[error("response has no weather description")]
    MissingDescription,
}

impl From<WeatherError> for WeatherReport {
    fn from(err: WeatherError) -> Self {
        match err {
            WeatherError::Status { .. } => WeatherReport::HttpError(err.to_string()),
            other => WeatherReport::Error(other.to_string()),
        }
    }
}

/// Anything that can answer "what's the weather in this city"
pub trait WeatherSource: Send + Sync {
    fn fetch(&self, city: &str) -> WeatherReport;
}

impl<F> WeatherSource for F
where
    F: Fn(&str) -> WeatherReport + Send + Sync,
{
    fn fetch(&self, city: &str) -> WeatherReport {
        self(city)
    }
}

#[derive(Clone)]
pub struct WeatherClient {
    api_key: String,
    base_url: String,
    http: Client,
}

impl std::fmt::Debug for WeatherClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherClient")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl WeatherClient {
    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .user_agent(concat!("weather-clock/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Blocking lookup. Never call this from the UI thread.
    pub fn fetch(&self, city: &str) -> WeatherReport {
        let report = match self.request(city) {
            Ok(report) => report,
            Err(err) => {
                warn!(city, error = %err, "weather lookup failed");
                WeatherReport::from(err)
            }
        };
        debug!(city, report = %report, "weather lookup finished");
        report
    }

    fn request(&self, city: &str) -> Result<WeatherReport, WeatherError> {
        let url = format!("{}/weather", self.base_url);

        // Errors carry the request URL, which includes the credential.
        let res = self
            .http
            .get(&url)
            .query(&[
                ("q", city),
                ("appid", self.api_key.as_str()),
                ("units", "metric"),
            ])
            .send()
            .map_err(reqwest::Error::without_url)?;

        let status = res.status();
        let body = res.text().map_err(reqwest::Error::without_url)?;

        if !status.is_success() {
            return Err(WeatherError::Status {
                status,
                detail: status_detail(&body),
            });
        }

        parse_report(&body)
    }
}

impl WeatherSource for WeatherClient {
    fn fetch(&self, city: &str) -> WeatherReport {
        WeatherClient::fetch(self, city)
    }
}

#[derive(Debug, Deserialize)]
struct OwMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct OwWeather {
    description: String,
}

#[derive(Debug, Deserialize)]
struct OwCurrentResponse {
    main: Option<OwMain>,
    #[serde(default)]
    weather: Vec<OwWeather>,
}

#[derive(Debug, Deserialize)]
struct OwErrorResponse {
    message: String,
}

/// Decode a successful response body
pub fn parse_report(body: &str) -> Result<WeatherReport, WeatherError> {
    let parsed: OwCurrentResponse = serde_json::from_str(body)?;

    let Some(main) = parsed.main else {
        return Ok(WeatherReport::Unavailable);
    };
    let description = parsed
        .weather
        .into_iter()
        .next()
        .map(|w| w.description)
        .ok_or(WeatherError::MissingDescription)?;

    Ok(WeatherReport::Conditions {
        temperature_c: main.temp,
        description,
    })
}

/// Upper-case the first letter of every alphabetic run, lower-case the rest
pub fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_word = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn status_detail(body: &str) -> String {
    match serde_json::from_str::<OwErrorResponse>(body) {
        Ok(err) if !err.message.is_empty() => format!(": {}", err.message),
        _ => String::new(),
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::thread::{self, JoinHandle};

    /// Serve one canned HTTP response, returning the request line it received
    fn serve_once(status_line: &'static str, body: &'static str) -> (String, JoinHandle<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let base_url = format!("http://{}", listener.local_addr().unwrap());

        let handle = thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                reader.read_line(&mut header).unwrap();
                if header == "\r\n" || header.is_empty() {
                    break;
                }
            }
            write!(
                stream,
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status_line,
                body.len(),
                body
            )
            .unwrap();
            request_line
        });

        (base_url, handle)
    }

    #[test]
    fn test_success_report() {
        let (base_url, server) = serve_once(
            "200 OK",
            r#"{"name":"Paris","main":{"temp":21.5,"humidity":40},"weather":[{"description":"clear sky"}]}"#,
        );
        let client = WeatherClient::new("KEY", base_url).unwrap();
        let report = client.fetch("Paris");
        assert_eq!(report.to_string(), "Temp: 21.5°C\nClear Sky");

        let request_line = server.join().unwrap();
        assert!(request_line.starts_with("GET /weather?"));
        assert!(request_line.contains("q=Paris"));
        assert!(request_line.contains("appid=KEY"));
        assert!(request_line.contains("units=metric"));
    }

    #[test]
    fn test_http_404() {
        let (base_url, server) = serve_once("404 Not Found", r#"{"cod":"404","message":"city not found"}"#);
        let client = WeatherClient::new("SECRET", base_url).unwrap();
        let text = client.fetch("Nowhere").to_string();
        server.join().unwrap();

        assert!(text.starts_with("HTTP error:"), "{}", text);
        assert!(text.contains("404"));
        assert!(text.contains("city not found"));
        assert!(!text.contains("SECRET"));
    }

    #[test]
    fn test_network_failure() {
        // Grab a free port, then close it so nothing is listening
        let port = TcpListener::bind("127.0.0.1:0").unwrap().local_addr().unwrap().port();
        let client = WeatherClient::new("SECRET", format!("http://127.0.0.1:{}", port)).unwrap();
        let text = client.fetch("Paris").to_string();
        assert!(text.starts_with("Error:"), "{}", text);
        assert!(!text.contains("SECRET"));
    }

    #[test]
    fn test_malformed_json() {
        let (base_url, server) = serve_once("200 OK", "<html>oops</html>");
        let client = WeatherClient::new("KEY", base_url).unwrap();
        let text = client.fetch("Paris").to_string();
        server.join().unwrap();
        assert!(text.starts_with("Error:"), "{}", text);
    }

    #[test]
    fn test_parse_without_main_is_unavailable() {
        let report = parse_report(r#"{"cod":200,"weather":[{"description":"rain"}]}"#).unwrap();
        assert_eq!(report, WeatherReport::Unavailable);
        assert_eq!(report.to_string(), "Weather data not available");
    }

    #[test]
    fn test_parse_missing_fields_is_error() {
        let err = parse_report(r#"{"main":{"humidity":3},"weather":[]}"#).unwrap_err();
        assert!(WeatherReport::from(err).to_string().starts_with("Error:"));

        let err = parse_report(r#"{"main":{"temp":3.0},"weather":[]}"#).unwrap_err();
        assert!(matches!(err, WeatherError::MissingDescription));
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("clear sky"), "Clear Sky");
        assert_eq!(title_case("LIGHT intensity drizzle"), "Light Intensity Drizzle");
        assert_eq!(title_case("thunderstorm/heavy rain"), "Thunderstorm/Heavy Rain");
        assert_eq!(title_case(""), "");
    }

    #[test]
    fn test_debug_hides_api_key() {
        let client = WeatherClient::new("SECRET", DEFAULT_BASE_URL).unwrap();
        assert!(!format!("{:?}", client).contains("SECRET"));
    }
}
