//! Request fulfillment: match a hospital's blood request to potential donors.

use super::Flow;
use crate::schema::{FieldSpec, Schema};
use crate::types::{Urgency, URGENCY_LEVELS};
use serde::{Deserialize, Serialize};

/// Availability text sent when a hospital submits a request without narrowing
/// the donor pool.
pub const ALL_AVAILABLE_DONORS: &str = "Find all available donors";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentRequest {
    pub blood_type: String,
    pub units_required: u32,
    pub urgency: Urgency,
    pub donor_availability: String,
    pub request_details: String,
}

impl FulfillmentRequest {
    /// A request open to every available donor, with no extra details.
    pub fn new(blood_type: impl Into<String>, units_required: u32, urgency: Urgency) -> Self {
        Self {
            blood_type: blood_type.into(),
            units_required,
            urgency,
            donor_availability: ALL_AVAILABLE_DONORS.to_string(),
            request_details: String::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FulfillmentResult {
    pub matched_donors: String,
    pub fulfillment_summary: String,
}

pub struct FulfillmentFlow;

impl Flow for FulfillmentFlow {
    type Input = FulfillmentRequest;
    type Output = FulfillmentResult;

    const NAME: &'static str = "fulfillment";

    const INPUT_SCHEMA: Schema = Schema::new(
        "FulfillmentRequest",
        &[
            FieldSpec::string("bloodType", "The blood type requested (e.g., A+, O-)."),
            FieldSpec::integer("unitsRequired", Some(1), "The number of blood units required."),
            FieldSpec::one_of(
                "urgency",
                URGENCY_LEVELS,
                "The urgency of the request (Low, Medium, High).",
            ),
            FieldSpec::string("donorAvailability", "Donor availability information."),
            FieldSpec::string("requestDetails", "Additional details about the blood request."),
        ],
    );

    const OUTPUT_SCHEMA: Schema = Schema::new(
        "FulfillmentResult",
        &[
            FieldSpec::string(
                "matchedDonors",
                "A list of potential donors matched to the request, including their names and contact information.",
            ),
            FieldSpec::string(
                "fulfillmentSummary",
                "A summary of how the request can be fulfilled.",
            ),
        ],
    );

    const TEMPLATE: &'static str = "\
You are an AI assistant that matches blood requests from hospitals to suitable donors.

Given the following blood request details, identify potential donors based on blood group compatibility, urgency, and donor availability.

Blood Type: {{{bloodType}}}
Units Required: {{{unitsRequired}}}
Urgency: {{{urgency}}}
Donor Availability: {{{donorAvailability}}}
Request Details: {{{requestDetails}}}

Provide a list of matched donors and a summary of how the request can be fulfilled. Include enough detail for the hospital to proceed with contacting the donors.

Output the matchedDonors and fulfillmentSummary fields.
";
}
