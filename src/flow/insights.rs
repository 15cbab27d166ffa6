//! Supply and demand insights for administrators.

use super::Flow;
use crate::schema::{FieldSpec, Schema};
use serde::{Deserialize, Serialize};

/// Aggregated free-text summaries; empty strings are valid.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsRequest {
    pub donor_data: String,
    pub request_data: String,
    pub regional_data: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InsightsResult {
    pub supply_demand_analysis: String,
    pub regional_shortages: String,
    pub donor_engagement_insights: String,
}

pub struct InsightsFlow;

impl Flow for InsightsFlow {
    type Input = InsightsRequest;
    type Output = InsightsResult;

    const NAME: &'static str = "insights";

    const INPUT_SCHEMA: Schema = Schema::new(
        "InsightsRequest",
        &[
            FieldSpec::string(
                "donorData",
                "Aggregated data about donors, including blood types, donation history, and engagement metrics.",
            ),
            FieldSpec::string(
                "requestData",
                "Aggregated data about blood requests, including blood types, urgency, and fulfillment status.",
            ),
            FieldSpec::string(
                "regionalData",
                "Aggregated data about blood supply and demand trends in different regions.",
            ),
        ],
    );

    const OUTPUT_SCHEMA: Schema = Schema::new(
        "InsightsResult",
        &[
            FieldSpec::string(
                "supplyDemandAnalysis",
                "An analysis of blood supply versus demand trends.",
            ),
            FieldSpec::string("regionalShortages", "Information about regional blood shortages."),
            FieldSpec::string(
                "donorEngagementInsights",
                "Insights into donor engagement and potential strategies for improvement.",
            ),
        ],
    );

    const TEMPLATE: &'static str = "\
You are an AI assistant specialized in analyzing blood supply and demand data to provide actionable insights.

Analyze the provided data to identify trends, shortages, and opportunities for improved donor engagement.

Donor Data: {{{donorData}}}
Request Data: {{{requestData}}}
Regional Data: {{{regionalData}}}

Provide the following:
- A detailed analysis of blood supply versus demand trends.
- Identification of any regional blood shortages and their potential causes.
- Actionable insights into donor engagement, including strategies for improvement.

Format your response in a clear and concise manner.
";
}
