//! `get_exchange_rate`: latest rates from open.er-api.com.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;

use super::ToolEndpoints;
use crate::error::Result;
use crate::provider::http::shared_client;
use crate::tools::tool::{AgentTool, Tool};
use crate::tools::types::ToolParameters;

pub fn exchange_rate_tool(endpoints: Arc<ToolEndpoints>) -> Arc<dyn Tool> {
    Arc::new(AgentTool::new(
        "get_exchange_rate",
        "Get the exchange rate between two currencies",
        ToolParameters::object()
            .string("base_currency", "Base currency code, e.g. USD", true)
            .string("target_currency", "Target currency code, e.g. CNY", true)
            .build(),
        move |args, _ctx| {
            let endpoints = endpoints.clone();
            async move {
                let base = args.get_str("base_currency")?.trim().to_uppercase();
                let target = args.get_str("target_currency")?.trim().to_uppercase();
                Ok(match fetch_rates(&endpoints, &base).await {
                    Ok(rates) => describe_rate(&base, &target, &rates),
                    Err(e) => format!("Error fetching exchange rates: {e}"),
                })
            }
        },
    ))
}

#[derive(Debug, Deserialize)]
struct RatesResponse {
    #[serde(default)]
    rates: Option<HashMap<String, f64>>,
    #[serde(rename = "error-type", default)]
    error_type: Option<String>,
}

enum Rates {
    Table(HashMap<String, f64>),
    Refused(String),
}

async fn fetch_rates(endpoints: &ToolEndpoints, base: &str) -> Result<Rates> {
    let url = format!("{}/{base}", endpoints.exchange_rates.trim_end_matches('/'));
    let body: RatesResponse = shared_client().get(url).send().await?.json().await?;
    Ok(match body.rates {
        Some(table) => Rates::Table(table),
        None => Rates::Refused(body.error_type.unwrap_or_else(|| "unknown error".to_string())),
    })
}

fn describe_rate(base: &str, target: &str, rates: &Rates) -> String {
    match rates {
        Rates::Table(table) => match table.get(target) {
            Some(rate) => format!("The exchange rate from {base} to {target} is: {rate}"),
            None => format!("Could not retrieve the exchange rate for {target}."),
        },
        Rates::Refused(reason) => format!("Error fetching exchange rates: {reason}"),
    }
}
