//! Platform statistics summarised for the insights flow.

use crate::flow::InsightsRequest;
use serde::{Deserialize, Serialize};

/// Aggregates shown on the admin dashboard.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlatformStats {
    pub total_donors: u64,
    /// Share of donors active in the last six months, 0-100.
    pub active_donor_percent: f64,
    pub total_requests: u64,
    /// Share of requests fulfilled, 0-100.
    pub fulfillment_rate_percent: f64,
    #[serde(default)]
    pub high_demand_blood_types: Vec<String>,
    #[serde(default)]
    pub regional_notes: Vec<String>,
}

impl PlatformStats {
    pub fn to_insights_request(&self) -> InsightsRequest {
        let donor_data = format!(
            "{} total donors, {}% active in last 6 months.",
            self.total_donors,
            format_percent(self.active_donor_percent)
        );

        let mut request_data = format!(
            "{} requests, {}% fulfillment rate",
            self.total_requests,
            format_percent(self.fulfillment_rate_percent)
        );
        if !self.high_demand_blood_types.is_empty() {
            request_data.push_str(", high demand for ");
            request_data.push_str(&self.high_demand_blood_types.join(" and "));
        }
        request_data.push('.');

        InsightsRequest {
            donor_data,
            request_data,
            regional_data: self.regional_notes.join(" "),
        }
    }
}

impl From<&PlatformStats> for InsightsRequest {
    fn from(stats: &PlatformStats) -> Self {
        stats.to_insights_request()
    }
}

/// At most one decimal place, trailing `.0` dropped.
fn format_percent(value: f64) -> String {
    let rounded = (value * 10.0).round() / 10.0;
    if rounded.fract() == 0.0 {
        format!("{:.0}", rounded)
    } else {
        format!("{:.1}", rounded)
    }
}
