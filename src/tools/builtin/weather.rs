//! `get_weather`: current conditions from wttr.in's JSON format.

use std::sync::Arc;

use serde::Deserialize;

use super::{parse_url, ToolEndpoints};
use crate::error::{QuintetError, Result};
use crate::provider::http::shared_client;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;

pub fn weather_tool(endpoints: Arc<ToolEndpoints>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "get_weather",
        "Get current weather for a city",
        ToolParameters::object()
            .string("location", "City name, e.g. 'Guangzhou' or '广州'", true)
            .string_enum("lang", "Language of the description", &["zh", "en"], false)
            .build(),
        move |args, _ctx| {
            let endpoints = endpoints.clone();
            async move {
                let location = args.get_str("location")?.to_string();
                let lang = args.get_str_opt("lang").unwrap_or("zh").to_string();
                Ok(match fetch_weather(&endpoints, &location, &lang).await {
                    Ok(report) => report,
                    Err(e) => format!("Could not get weather for '{location}': {e}"),
                })
            }
        },
    ))
}

#[derive(Debug, Deserialize)]
pub struct WttrReport {
    current_condition: Vec<CurrentCondition>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentCondition {
    #[serde(rename = "temp_C")]
    temp_c: String,
    #[serde(rename = "FeelsLikeC", default)]
    feels_like_c: Option<String>,
    #[serde(default)]
    humidity: Option<String>,
    #[serde(rename = "windspeedKmph", default)]
    windspeed_kmph: Option<String>,
    #[serde(rename = "winddir16Point", default)]
    wind_dir: Option<String>,
    #[serde(default)]
    weather_desc: Vec<ValueField>,
    #[serde(rename = "lang_zh", default)]
    lang_zh: Vec<ValueField>,
}

#[derive(Debug, Deserialize)]
struct ValueField {
    value: String,
}

async fn fetch_weather(endpoints: &ToolEndpoints, location: &str, lang: &str) -> Result<String> {
    let mut url = parse_url(endpoints.weather.trim_end_matches('/'))?;
    url.path_segments_mut()
        .map_err(|_| QuintetError::InvalidArgument("weather endpoint cannot take a path".into()))?
        .pop_if_empty()
        .push(location);
    url.query_pairs_mut()
        .append_pair("format", "j1")
        .append_pair("lang", lang);

    let response = shared_client().get(url).send().await?;
    let status = response.status();
    if !status.is_success() {
        return Err(QuintetError::api(status.as_u16(), "weather service returned an error"));
    }
    let report: WttrReport = response.json().await?;
    format_report(location, lang, &report)
}

/// Render a wttr.in report as one sentence.
pub fn format_report(location: &str, lang: &str, report: &WttrReport) -> Result<String> {
    let current = report
        .current_condition
        .first()
        .ok_or_else(|| QuintetError::tool("get_weather", "no current conditions in response"))?;

    let localized = if lang == "zh" { current.lang_zh.first() } else { None };
    let description = localized
        .or_else(|| current.weather_desc.first())
        .map(|v| v.value.trim())
        .unwrap_or("unknown conditions");

    let mut text = format!("Weather in {location}: {description}, {}°C", current.temp_c);
    if let Some(feels) = &current.feels_like_c {
        text.push_str(&format!(" (feels like {feels}°C)"));
    }
    if let Some(humidity) = &current.humidity {
        text.push_str(&format!(", humidity {humidity}%"));
    }
    if let Some(speed) = &current.windspeed_kmph {
        text.push_str(&format!(", wind {speed} km/h"));
        if let Some(dir) = &current.wind_dir {
            text.push_str(&format!(" {dir}"));
        }
    }
    text.push('.');
    Ok(text)
}
