//! Provider clients against a local one-shot HTTP server.

use crate::integration::test_utils::serve_once;
use bloodlink::error::{BackendError, FlowError};
use bloodlink::flow::{FlowAdapter, NotificationFlow, NotificationRequest};
use bloodlink::provider::{
    CompletionOptions, GenerationBackend, GenerationRequest, HttpTimeouts, ModelProvider,
    ProviderFactory, RawResponse,
};
use bloodlink::types::Urgency;
use serde_json::json;

fn request() -> GenerationRequest {
    GenerationRequest {
        schema_name: "NotificationResult".to_string(),
        prompt: "Generate a notification".to_string(),
        output_schema: json!({
            "type": "object",
            "properties": { "notificationMessage": { "type": "string" } },
            "required": ["notificationMessage"]
        }),
        options: CompletionOptions {
            temperature: Some(0.5),
            max_tokens: Some(256),
            top_p: None,
        },
    }
}

fn local(address: &str) -> Box<dyn GenerationBackend> {
    ProviderFactory::create_client(
        &ModelProvider::LocalCustom {
            model: "local-model".to_string(),
            endpoint: format!("{}/v1", address),
            api_key: Some("local-key".to_string()),
        },
        HttpTimeouts::default(),
    )
    .unwrap()
}

#[tokio::test]
async fn openai_compatible_request_and_reply() {
    let reply = json!({
        "choices": [{
            "message": { "role": "assistant", "content": "{\"notificationMessage\":\"O+ needed\"}" },
            "finish_reason": "stop"
        }]
    });
    let (address, server) = serve_once(200, reply.to_string()).await;

    let raw = local(&address).submit(request()).await.unwrap();
    assert_eq!(
        raw,
        RawResponse::Text("{\"notificationMessage\":\"O+ needed\"}".to_string())
    );

    let captured = server.await.unwrap();
    assert_eq!(captured.request_line(), "POST /v1/chat/completions HTTP/1.1");
    assert_eq!(captured.header("authorization").as_deref(), Some("Bearer local-key"));

    let body = captured.json();
    assert_eq!(body["model"], json!("local-model"));
    assert_eq!(body["messages"][0]["content"], json!("Generate a notification"));
    assert_eq!(body["max_tokens"], json!(256));
    assert_eq!(body["response_format"]["type"], json!("json_schema"));
    assert_eq!(body["response_format"]["json_schema"]["name"], json!("NotificationResult"));
    assert!(body.get("top_p").is_none());
}

#[tokio::test]
async fn status_codes_are_classified() {
    for status in [401u16, 403, 404, 429, 500] {
        let (address, server) = serve_once(status, json!({ "error": "nope" }).to_string()).await;
        let error = local(&address).submit(request()).await.unwrap_err();
        let classified = match status {
            401 | 403 => matches!(error, BackendError::AuthFailed(_)),
            404 => matches!(error, BackendError::ModelNotFound(_)),
            429 => matches!(error, BackendError::RateLimited(_)),
            _ => matches!(error, BackendError::RequestFailed(_)),
        };
        assert!(classified, "status {} mapped to {:?}", status, error);
        server.await.unwrap();
    }
}

#[tokio::test]
async fn no_choices_is_empty() {
    let (address, server) = serve_once(200, json!({ "choices": [] }).to_string()).await;
    let raw = local(&address).submit(request()).await.unwrap();
    assert_eq!(raw, RawResponse::Empty);
    server.await.unwrap();
}

#[tokio::test]
async fn gemini_request_and_reply() {
    let reply = json!({
        "candidates": [{
            "content": { "parts": [
                { "text": "{\"notificationMessage\":" },
                { "text": "\"A- needed\"}" }
            ]},
            "finishReason": "STOP"
        }]
    });
    let (address, server) = serve_once(200, reply.to_string()).await;

    let backend = ProviderFactory::create_client(
        &ModelProvider::Gemini {
            model: "gemini-1.5-flash".to_string(),
            api_key: "g-key".to_string(),
            base_url: Some(format!("{}/v1beta/models", address)),
        },
        HttpTimeouts::default(),
    )
    .unwrap();

    let raw = backend.submit(request()).await.unwrap();
    assert_eq!(
        raw,
        RawResponse::Text("{\"notificationMessage\":\"A- needed\"}".to_string())
    );

    let captured = server.await.unwrap();
    assert_eq!(
        captured.request_line(),
        "POST /v1beta/models/gemini-1.5-flash:generateContent HTTP/1.1"
    );
    assert_eq!(captured.header("x-goog-api-key").as_deref(), Some("g-key"));

    let body = captured.json();
    assert_eq!(body["contents"][0]["parts"][0]["text"], json!("Generate a notification"));
    assert_eq!(body["generationConfig"]["maxOutputTokens"], json!(256));
    assert_eq!(body["generationConfig"]["responseMimeType"], json!("application/json"));
    assert_eq!(body["generationConfig"]["responseSchema"]["type"], json!("OBJECT"));
}

#[tokio::test]
async fn flow_over_http_maps_rate_limit_to_backend_unavailable() {
    let (address, server) = serve_once(429, json!({ "error": "slow down" }).to_string()).await;
    let backend = local(&address);
    let adapter = FlowAdapter::<NotificationFlow>::new(CompletionOptions::default()).unwrap();
    let request = NotificationRequest {
        blood_type: "A-".to_string(),
        urgency: Urgency::High,
        units_required: 3,
        donor_availability: true,
    };

    let error = adapter.invoke(backend.as_ref(), &request).await.unwrap_err();
    match error {
        FlowError::BackendUnavailable { flow, source } => {
            assert_eq!(flow, "notification");
            assert!(matches!(source, BackendError::RateLimited(_)));
        }
        other => panic!("expected BackendUnavailable, got {:?}", other),
    }
    server.await.unwrap();
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_error() {
    // Bind then drop to get a port nobody listens on
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let address = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let error = local(&address).submit(request()).await.unwrap_err();
    assert!(matches!(error, BackendError::Transport(_)), "got {:?}", error);
}
