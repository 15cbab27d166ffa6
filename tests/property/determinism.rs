//! Property-based tests for rendering determinism

use bloodlink::flow::{
    FlowAdapter, FulfillmentFlow, FulfillmentRequest, NotificationFlow, NotificationRequest,
};
use bloodlink::provider::CompletionOptions;
use bloodlink::schema::{FieldSpec, Schema};
use bloodlink::template::PromptTemplate;
use bloodlink::types::Urgency;
use proptest::prelude::*;
use serde_json::{json, Map, Value};

fn urgency() -> impl Strategy<Value = Urgency> {
    prop_oneof![Just(Urgency::Low), Just(Urgency::Medium), Just(Urgency::High)]
}

/// Rendering the same request twice yields byte-identical prompts
#[test]
fn test_fulfillment_render_is_deterministic() {
    let mut runner = proptest::test_runner::TestRunner::default();
    let adapter = FlowAdapter::<FulfillmentFlow>::new(CompletionOptions::default()).unwrap();

    runner
        .run(
            &(".*", 1u32..10_000, urgency(), ".*", ".*"),
            |(blood_type, units, urgency, availability, details)| {
                let request = FulfillmentRequest {
                    blood_type: blood_type.clone(),
                    units_required: units,
                    urgency,
                    donor_availability: availability,
                    request_details: details,
                };

                let first = adapter.render(&request).unwrap();
                let second = adapter.render(&request).unwrap();
                prop_assert_eq!(&first, &second);

                let expected_lines = [
                    format!("Blood Type: {}\n", blood_type),
                    format!("Units Required: {}\n", units),
                    format!("Urgency: {}\n", urgency),
                ];
                for line in &expected_lines {
                    prop_assert!(first.contains(line.as_str()), "missing line {:?}", line);
                }
                Ok(())
            },
        )
        .unwrap();
}

/// Independent adapters render identical prompts
#[test]
fn test_notification_render_is_independent_of_adapter_instance() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[A-Z]{1,2}[+-]", urgency(), 1u32..100, any::<bool>()),
            |(blood_type, urgency, units, available)| {
                let request = NotificationRequest {
                    blood_type,
                    urgency,
                    units_required: units,
                    donor_availability: available,
                };

                let a = FlowAdapter::<NotificationFlow>::new(CompletionOptions::default())
                    .unwrap()
                    .render(&request)
                    .unwrap();
                let b = FlowAdapter::<NotificationFlow>::new(CompletionOptions {
                    temperature: Some(0.0),
                    max_tokens: Some(64),
                    top_p: None,
                })
                .unwrap()
                .render(&request)
                .unwrap();

                prop_assert_eq!(a, b);
                Ok(())
            },
        )
        .unwrap();
}

const PAIR: Schema = Schema::new(
    "Pair",
    &[
        FieldSpec::string("left", "Left value"),
        FieldSpec::string("right", "Right value"),
    ],
);

/// Rendering is plain substitution between literal segments
#[test]
fn test_render_is_plain_substitution() {
    let mut runner = proptest::test_runner::TestRunner::default();

    runner
        .run(
            &("[^{}]*", "[^{}]*", "[^{}]*", ".*", ".*"),
            |(prefix, middle, suffix, left, right)| {
                let source = format!("{}{{{{{{left}}}}}}{}{{{{{{ right }}}}}}{}", prefix, middle, suffix);
                let template = PromptTemplate::compile("pair", &source, &PAIR).unwrap();

                let mut fields = Map::new();
                fields.insert("left".to_string(), json!(left));
                fields.insert("right".to_string(), Value::String(right.clone()));

                let rendered = template.render(&fields).unwrap();
                prop_assert_eq!(
                    rendered,
                    format!("{}{}{}{}{}", prefix, left, middle, right, suffix)
                );
                Ok(())
            },
        )
        .unwrap();
}
