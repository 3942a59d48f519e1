//! Route a batch of JSON records through configured routes

use serde::Deserialize;
use serde_json::json;

use super::CliError;
use crate::{Event, RouteConfig, Router};

/// Route file layout:
///
/// ```text
/// {"routes": [{"name": "errors", "condition": "/status >= 400"}]}
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct RouteFile {
    pub routes: Vec<RouteConfig>,
}

/// Options for the route command
#[derive(Debug, Clone, Default)]
pub struct RouteOptions {
    /// Contents of the route file
    pub routes: String,
    /// Records, one JSON object per line or a single JSON array
    pub input: Option<String>,
}

/// Parse newline-delimited JSON records, or a JSON array of records.
pub fn parse_records(input: &str) -> Result<Vec<Event>, CliError> {
    let trimmed = input.trim_start();
    if trimmed.starts_with('[') {
        let records: Vec<serde_json::Value> = serde_json::from_str(trimmed)?;
        return Ok(records.into_iter().map(Event::from).collect());
    }

    input
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| -> Result<Event, CliError> {
            let value: serde_json::Value = serde_json::from_str(line)?;
            Ok(Event::from(value))
        })
        .collect()
}

/// Execute a route operation, returning the routed groups and failures as JSON
pub fn execute_route(options: &RouteOptions) -> Result<serde_json::Value, CliError> {
    let file: RouteFile = serde_json::from_str(&options.routes)?;
    let router = Router::new(file.routes)?;

    let input = options.input.as_ref().ok_or(CliError::NoInput)?;
    let records = parse_records(input)?;

    let routed = router.route(&records);

    let routes: serde_json::Map<String, serde_json::Value> = routed
        .routes
        .into_iter()
        .map(|(name, events)| {
            let events: Vec<serde_json::Value> = events.into_iter().map(Into::into).collect();
            (name, serde_json::Value::Array(events))
        })
        .collect();

    let failures: Vec<serde_json::Value> = routed
        .failures
        .iter()
        .map(|f| {
            json!({
                "route": f.route,
                "record": f.record_index,
                "error": f.error.to_string(),
            })
        })
        .collect();

    Ok(json!({ "routes": routes, "failures": failures }))
}
