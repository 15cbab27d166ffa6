//! End-to-end flow contract against a scripted backend.

use crate::integration::test_utils::ScriptedBackend;
use bloodlink::error::{BackendError, FlowError, ValidationError};
use bloodlink::flow::{
    FlowAdapter, FlowKind, FulfillmentFlow, FulfillmentRequest, FulfillmentResult, InsightsFlow,
    InsightsRequest, NotificationFlow, NotificationRequest,
};
use bloodlink::provider::{CompletionOptions, RawResponse};
use bloodlink::types::Urgency;
use serde_json::json;

fn fulfillment() -> FlowAdapter<FulfillmentFlow> {
    FlowAdapter::new(CompletionOptions::default()).unwrap()
}

fn notification() -> FlowAdapter<NotificationFlow> {
    FlowAdapter::new(CompletionOptions::default()).unwrap()
}

fn insights() -> FlowAdapter<InsightsFlow> {
    FlowAdapter::new(CompletionOptions::default()).unwrap()
}

#[tokio::test]
async fn fulfillment_result_is_returned_unchanged() {
    let backend = ScriptedBackend::structured(json!({
        "matchedDonors": "Donor 17 (O+, Ward 3), Donor 42 (O-, Ward 1)",
        "fulfillmentSummary": "Two compatible donors contacted for 2 units."
    }));
    let request = FulfillmentRequest {
        blood_type: "O+".to_string(),
        units_required: 2,
        urgency: Urgency::High,
        donor_availability: "all available".to_string(),
        request_details: String::new(),
    };

    let result = fulfillment().invoke(&backend, &request).await.unwrap();

    assert_eq!(
        result,
        FulfillmentResult {
            matched_donors: "Donor 17 (O+, Ward 3), Donor 42 (O-, Ward 1)".to_string(),
            fulfillment_summary: "Two compatible donors contacted for 2 units.".to_string(),
        }
    );
    assert_eq!(backend.call_count(), 1);

    let prompt = backend.last_prompt().unwrap();
    assert!(prompt.contains("O+"));
    assert!(prompt.contains("2"));
    assert!(prompt.contains("High"));
}

#[tokio::test]
async fn output_schema_travels_with_the_prompt() {
    let backend = ScriptedBackend::structured(json!({ "notificationMessage": "B+ needed" }));
    let request = NotificationRequest {
        blood_type: "B+".to_string(),
        urgency: Urgency::Low,
        units_required: 1,
        donor_availability: false,
    };

    notification().invoke(&backend, &request).await.unwrap();

    let requests = backend.requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(requests[0].schema_name, "NotificationResult");
    assert_eq!(
        requests[0].output_schema["required"],
        json!(["notificationMessage"])
    );
    assert_eq!(requests[0].options, CompletionOptions::default());
}

#[tokio::test]
async fn missing_output_field_is_schema_mismatch() {
    let backend = ScriptedBackend::structured(json!({}));
    let request = NotificationRequest {
        blood_type: "A-".to_string(),
        urgency: Urgency::High,
        units_required: 3,
        donor_availability: true,
    };

    let error = notification().invoke(&backend, &request).await.unwrap_err();
    match error {
        FlowError::SchemaMismatch { flow, detail } => {
            assert_eq!(flow, "notification");
            assert!(detail.contains("notificationMessage"));
        }
        other => panic!("expected SchemaMismatch, got {:?}", other),
    }
    assert!(!FlowError::SchemaMismatch {
        flow: "notification",
        detail: String::new()
    }
    .is_retryable());
}

#[tokio::test]
async fn network_fault_is_backend_unavailable() {
    let backend =
        ScriptedBackend::failing(BackendError::Transport("Connection error: refused".to_string()));

    let error = insights()
        .invoke(&backend, &InsightsRequest::default())
        .await
        .unwrap_err();

    assert!(error.is_retryable());
    match error {
        FlowError::BackendUnavailable { flow, source } => {
            assert_eq!(flow, "insights");
            assert!(matches!(source, BackendError::Transport(_)));
        }
        other => panic!("expected BackendUnavailable, got {:?}", other),
    }
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn empty_insights_input_reaches_the_backend() {
    let backend = ScriptedBackend::structured(json!({
        "supplyDemandAnalysis": "Insufficient data.",
        "regionalShortages": "None reported.",
        "donorEngagementInsights": "Collect engagement metrics first."
    }));

    let result = insights()
        .invoke(&backend, &InsightsRequest::default())
        .await
        .unwrap();

    assert_eq!(result.regional_shortages, "None reported.");
    assert_eq!(backend.call_count(), 1);
}

#[tokio::test]
async fn invalid_inputs_never_reach_the_backend() {
    let backend = ScriptedBackend::structured(json!({ "notificationMessage": "unused" }));

    let cases = vec![
        (
            json!({ "urgency": "High", "unitsRequired": 1, "donorAvailability": true }),
            ValidationError::MissingField { field: "bloodType" },
        ),
        (
            json!({ "bloodType": "O-", "urgency": "high", "unitsRequired": 1, "donorAvailability": true }),
            ValidationError::NotInEnum {
                field: "urgency",
                value: "high".to_string(),
                allowed: &["Low", "Medium", "High"],
            },
        ),
        (
            json!({ "bloodType": "O-", "urgency": "High", "unitsRequired": 0, "donorAvailability": true }),
            ValidationError::BelowMinimum {
                field: "unitsRequired",
                minimum: 1,
                actual: 0,
            },
        ),
        (
            json!({ "bloodType": "O-", "urgency": "High", "unitsRequired": 2, "donorAvailability": "yes" }),
            ValidationError::WrongType {
                field: "donorAvailability",
                expected: "a boolean",
                found: "a string",
            },
        ),
    ];

    for (candidate, expected) in cases {
        let error = notification()
            .invoke_json(&backend, &candidate)
            .await
            .unwrap_err();
        match error {
            FlowError::Validation(actual) => assert_eq!(actual, expected),
            other => panic!("expected validation error, got {:?}", other),
        }
    }

    assert_eq!(backend.call_count(), 0);
}

#[tokio::test]
async fn text_replies_are_coerced() {
    let fenced = "Here you go:\n```json\n{\"notificationMessage\": \"Urgent: O- needed\", \"tone\": \"calm\"}\n```";
    let backend = ScriptedBackend::replying(RawResponse::Text(fenced.to_string()))
        .then_reply(RawResponse::Text("I cannot help with that.".to_string()))
        .then_reply(RawResponse::Empty);
    let candidate = json!({
        "bloodType": "O-",
        "urgency": "Medium",
        "unitsRequired": 2,
        "donorAvailability": true
    });

    let output = FlowKind::Notification
        .invoke_json(&backend, &CompletionOptions::default(), &candidate)
        .await
        .unwrap();
    assert_eq!(output.len(), 1);
    assert_eq!(output["notificationMessage"], json!("Urgent: O- needed"));

    for _ in 0..2 {
        let error = FlowKind::Notification
            .invoke_json(&backend, &CompletionOptions::default(), &candidate)
            .await
            .unwrap_err();
        assert!(matches!(error, FlowError::EmptyResponse { flow: "notification" }));
    }
    assert_eq!(backend.call_count(), 3);
}

#[tokio::test]
async fn wrong_output_type_is_schema_mismatch() {
    let backend = ScriptedBackend::structured(json!({
        "matchedDonors": ["Donor 1"],
        "fulfillmentSummary": "One donor"
    }));
    let request = FulfillmentRequest::new("AB-", 1, Urgency::Medium);

    let error = fulfillment().invoke(&backend, &request).await.unwrap_err();
    assert!(matches!(error, FlowError::SchemaMismatch { flow: "fulfillment", .. }));
}

#[tokio::test]
async fn concurrent_invocations_are_independent() {
    let backend = ScriptedBackend::structured(json!({ "notificationMessage": "first" }))
        .then_reply(RawResponse::Structured(json!({ "notificationMessage": "second" })));
    let adapter = notification();
    let request = NotificationRequest {
        blood_type: "O+".to_string(),
        urgency: Urgency::Medium,
        units_required: 1,
        donor_availability: true,
    };

    let (a, b) = tokio::join!(
        adapter.invoke(&backend, &request),
        adapter.invoke(&backend, &request)
    );
    let mut messages = vec![a.unwrap().notification_message, b.unwrap().notification_message];
    messages.sort();
    assert_eq!(messages, vec!["first".to_string(), "second".to_string()]);
    assert_eq!(backend.call_count(), 2);
}
