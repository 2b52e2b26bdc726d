//! HTTP tests for the OpenAI client and the collector client.

#![allow(clippy::unwrap_used, clippy::panic, clippy::clone_on_ref_ptr)]

use std::sync::Arc;

use delve::prelude::*;
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

mod openai {
    use super::*;

    fn client(server: &MockServer) -> OpenAI {
        OpenAI::new(
            OpenAIConfig::new("sk-test")
                .with_base_url(format!("{}/v1", server.uri()))
                .with_organization("org-test"),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn sends_chat_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer sk-test"))
            .and(header("openai-organization", "org-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4",
                "messages": [
                    {"role": "system", "content": "be brief"},
                    {"role": "user", "content": "hello"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": "chatcmpl-123",
                "model": "gpt-4-0613",
                "choices": [{
                    "index": 0,
                    "message": {"role": "assistant", "content": "Hi."},
                    "finish_reason": "stop"
                }],
                "usage": {"prompt_tokens": 9, "completion_tokens": 2, "total_tokens": 11}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let text = client(&server)
            .complete_with_system("gpt-4", "be brief", "hello")
            .await
            .unwrap();
        assert_eq!(text, "Hi.");
    }

    #[tokio::test]
    async fn maps_auth_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {"message": "Incorrect API key provided", "type": "invalid_request_error", "code": "invalid_api_key"}
            })))
            .mount(&server)
            .await;

        let err = client(&server)
            .chat(&ChatRequest::new("gpt-4").user("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::Auth);
        assert!(err.message.contains("Incorrect API key"));
    }

    #[tokio::test]
    async fn maps_rate_limit_and_server_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429).set_body_json(json!({
                "error": {"message": "slow down", "type": "rate_limit_error"}
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(503).set_body_string("upstream unavailable"))
            .mount(&server)
            .await;

        let openai = client(&server);
        let request = ChatRequest::new("gpt-4").user("x");

        let limited = openai.chat(&request).await.unwrap_err();
        assert_eq!(limited.kind, LlmErrorKind::RateLimited);
        assert_eq!(limited.provider.as_deref(), Some("openai"));

        let unavailable = openai.chat(&request).await.unwrap_err();
        assert_eq!(unavailable.kind, LlmErrorKind::HttpStatus);
        assert_eq!(unavailable.code.as_deref(), Some("503"));
    }

    #[tokio::test]
    async fn rejects_malformed_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let err = client(&server)
            .chat(&ChatRequest::new("gpt-4").user("x"))
            .await
            .unwrap_err();
        assert_eq!(err.kind, LlmErrorKind::ResponseFormat);
    }
}

mod collector {
    use super::*;

    fn collector(server: &MockServer) -> HttpCollector {
        HttpCollector::new(
            HttpCollectorConfig::new("collector-key")
                .with_base_url(server.uri())
                .with_organization_id("org-1"),
        )
        .unwrap()
    }

    fn request() -> EvaluationRequest {
        EvaluationRequest::new(
            "evaluation_suite",
            vec![
                EvaluationExample::new(
                    "What are the benefits of renewable energy?",
                    "Renewable energy reduces greenhouse gas emissions, creates jobs, and provides energy independence.",
                )
                .with_expected_output("Benefits include environmental protection and economic advantages."),
            ],
            vec![ScorerConfig::answer_relevancy(0.5)],
            "gpt-4",
        )
    }

    #[tokio::test]
    async fn posts_spans_with_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/traces/spans"))
            .and(header("authorization", "Bearer collector-key"))
            .and(header("x-organization-id", "org-1"))
            .and(body_partial_json(json!({
                "project_name": "http_test",
                "name": "web_search",
                "kind": "tool"
            })))
            .respond_with(ResponseTemplate::new(202))
            .expect(1)
            .mount(&server)
            .await;

        let tracer = Tracer::new("http_test", Arc::new(collector(&server))).unwrap();
        let search = tracer.observe(WebSearchTool::new());
        search.call(WebSearchArgs::new("AI safety")).await.unwrap();
    }

    #[tokio::test]
    async fn queues_async_evaluations() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluations/queue"))
            .and(body_partial_json(json!({
                "project_name": "http_test",
                "model": "gpt-4",
                "scorers": [{"kind": "faithfulness", "threshold": 0.8}]
            })))
            .respond_with(ResponseTemplate::new(200))
            .expect(1)
            .mount(&server)
            .await;

        let tracer = Tracer::new("http_test", Arc::new(collector(&server))).unwrap();
        tracer.async_evaluate(
            EvaluationExample::new("topic", "report"),
            vec![ScorerConfig::faithfulness(0.8)],
            "gpt-4",
        );
        tracer.flush().await;
    }

    #[tokio::test]
    async fn runs_evaluation_and_parses_results() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluations/run"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [{
                    "example_index": 0,
                    "scorer": "answer_relevancy",
                    "threshold": 0.5,
                    "score": 0.92,
                    "success": true,
                    "reason": "on topic"
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = EvaluationClient::new("evaluation_suite", Arc::new(collector(&server)));
        let r = request();
        let results = client
            .run_evaluation(r.examples, r.scorers, &r.model)
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.all_passed());
        assert_eq!(results.results[0].reason.as_deref(), Some("on topic"));
    }

    #[tokio::test]
    async fn surfaces_http_errors_to_explicit_callers() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/evaluations/run"))
            .respond_with(ResponseTemplate::new(500).set_body_string("scorer crashed"))
            .mount(&server)
            .await;

        let err = collector(&server).run_evaluation(&request()).await.unwrap_err();
        let CollectorError::HttpStatus { status, body } = err else {
            panic!("expected HTTP status error");
        };
        assert_eq!(status, 500);
        assert_eq!(body, "scorer crashed");
    }

    #[tokio::test]
    async fn rejected_credentials_are_auth_errors() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("bad token"))
            .mount(&server)
            .await;

        let err = collector(&server).submit_evaluation(&request()).await.unwrap_err();
        assert!(matches!(err, CollectorError::Auth(_)));
    }
}
