//! Smart notifications: a short message telling a donor about a matching request.

use super::Flow;
use crate::schema::{FieldSpec, Schema};
use crate::types::{Urgency, URGENCY_LEVELS};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationRequest {
    pub blood_type: String,
    pub urgency: Urgency,
    pub units_required: u32,
    pub donor_availability: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResult {
    pub notification_message: String,
}

pub struct NotificationFlow;

impl Flow for NotificationFlow {
    type Input = NotificationRequest;
    type Output = NotificationResult;

    const NAME: &'static str = "notification";

    const INPUT_SCHEMA: Schema = Schema::new(
        "NotificationRequest",
        &[
            FieldSpec::string("bloodType", "The blood type of the donor."),
            FieldSpec::one_of(
                "urgency",
                URGENCY_LEVELS,
                "The urgency level of the blood request (Low, Medium, High).",
            ),
            FieldSpec::integer("unitsRequired", Some(1), "The number of blood units required."),
            FieldSpec::boolean(
                "donorAvailability",
                "Whether the donor is currently available to donate.",
            ),
        ],
    );

    const OUTPUT_SCHEMA: Schema = Schema::new(
        "NotificationResult",
        &[FieldSpec::string(
            "notificationMessage",
            "The notification message to be sent to the donor.",
        )],
    );

    const TEMPLATE: &'static str = "\
You are an AI assistant designed to generate notification messages for blood donors based on matching blood requests.

Given the following information about a blood request:
- Blood Type: {{{bloodType}}}
- Urgency: {{{urgency}}}
- Units Required: {{{unitsRequired}}}
- Donor Availability: {{{donorAvailability}}}

Generate a concise and informative notification message for the donor. The message should clearly indicate the urgency and the blood type needed.

Example:
\"Urgent blood request! Type {{{bloodType}}} blood needed. Hospital requires {{{unitsRequired}}} units. Please respond if available.\"";
}
