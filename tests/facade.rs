//! Façade behaviour with in-memory backends, plus a few end-to-end checks
//! that route through real adapters to a mocked HTTP server.

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::join_all;
use serde_json::json;
use switchboard::config::{ConfigError, Credentials, LlmProvider};
use switchboard::core::{CompletionRequest, ContentBlock, StopReason};
use switchboard::providers::mock::{
    MockEmbedder, MockLLM, MockModelLoader, MockResponse, MockRunner, MockSpeech, MockVectorIndex,
};
use switchboard::{AppConfig, FacadeError, Operation, ServiceFacade, Value};
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const DIMENSIONS: usize = 8;

fn required_env() -> HashMap<&'static str, &'static str> {
    HashMap::from([
        ("PRIMARY_LLM_API_KEY", "sk-primary"),
        ("SECONDARY_LLM_API_KEY", "sk-ant"),
        ("EMBEDDING_INDEX_API_KEY", "pc-key"),
        ("EMBEDDING_INDEX_ENVIRONMENT", "us-west1-gcp"),
        ("FAST_INFERENCE_API_KEY", "gsk"),
        ("ALT_LLM_API_KEY", "mistral"),
        ("SPEECH_SYNTHESIS_API_KEY", "xi"),
    ])
}

fn credentials(env: &HashMap<&'static str, &'static str>) -> Result<Credentials, ConfigError> {
    Credentials::from_lookup(|var| env.get(var).map(|v| (*v).to_string()))
}

fn config() -> AppConfig {
    let mut config = AppConfig::default();
    config.embedding.dimensions = DIMENSIONS;
    config
}

struct Stubs {
    llm: MockLLM,
    embedder: MockEmbedder,
    index: MockVectorIndex,
    speech: MockSpeech,
    runner: MockRunner,
    loader: MockModelLoader,
}

impl Stubs {
    fn new(llm: MockLLM) -> Self {
        let embedder = MockEmbedder::new(DIMENSIONS);
        let index = MockVectorIndex::new()
            .with_record("doc-a", embedder.vector_for("alpha"), Some(Value::map([("title", "Alpha")])))
            .with_record("doc-b", embedder.vector_for("beta"), Some(Value::map([("title", "Beta")])))
            .with_record("doc-c", embedder.vector_for("gamma"), None);
        Self {
            llm,
            embedder,
            index,
            speech: MockSpeech::default(),
            runner: MockRunner::new(),
            loader: MockModelLoader::new(),
        }
    }

    fn facade(&self) -> ServiceFacade {
        let mut builder = ServiceFacade::builder(config());
        for provider in LlmProvider::ALL.into_iter().filter(|p| p.is_required()) {
            builder = builder.llm(provider, Arc::new(self.llm.clone()));
        }
        builder
            .embedder(Arc::new(self.embedder.clone()))
            .vector_index(Arc::new(self.index.clone()))
            .speech(Arc::new(self.speech.clone()))
            .runner(Arc::new(self.runner.clone()))
            .model_loader(Arc::new(self.loader.clone()))
            .build()
            .unwrap()
    }
}

// =============================================================================
// Construction
// =============================================================================

#[test]
fn test_construction_succeeds_with_required_credentials() {
    let facade = ServiceFacade::new(config(), credentials(&required_env()).unwrap()).unwrap();
    for provider in LlmProvider::ALL.into_iter().filter(|p| p.is_required()) {
        assert!(facade.is_enabled(provider), "{provider} should be enabled");
    }
    assert!(!facade.is_enabled(LlmProvider::OpenModel));
}

#[test]
fn test_each_missing_required_credential_is_named() {
    for missing in required_env().keys() {
        let mut env = required_env();
        env.remove(missing);
        match credentials(&env) {
            Err(ConfigError::MissingCredential { var }) => assert_eq!(var, *missing),
            other => panic!("expected {missing} to be reported, got {other:?}"),
        }
    }
}

#[test]
fn test_malformed_credential_is_rejected() {
    let mut env = required_env();
    env.insert("ALT_LLM_API_KEY", "two words");
    assert!(matches!(
        credentials(&env),
        Err(ConfigError::MalformedCredential { .. })
    ));
}

// =============================================================================
// Operations against stubs
// =============================================================================

#[tokio::test]
async fn test_generate_text_returns_stub_answer() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::text("4")));
    let facade = stubs.facade();

    let answer = facade
        .generate_text(LlmProvider::Primary, "What is 2+2?")
        .await
        .unwrap();
    assert_eq!(answer, "4");

    let sent = stubs.llm.request_history();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].messages[0].text(), "What is 2+2?");
}

#[tokio::test]
async fn test_generate_text_for_every_required_provider() {
    let stubs = Stubs::new(MockLLM::new().with_default_response());
    let facade = stubs.facade();

    for provider in LlmProvider::ALL.into_iter().filter(|p| p.is_required()) {
        let text = facade.generate_text(provider, "hello").await.unwrap();
        assert!(!text.is_empty());
    }
    assert_eq!(stubs.llm.request_count(), 4);
}

#[tokio::test]
async fn test_empty_content_is_response_shape_error() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::empty()));
    let err = stubs
        .facade()
        .generate_text(LlmProvider::Secondary, "hi")
        .await
        .unwrap_err();
    match err {
        FacadeError::ResponseShape { provider, operation, .. } => {
            assert_eq!(provider, "anthropic");
            assert_eq!(operation, Operation::GenerateText);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_text_leading_block_is_response_shape_error() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::multi(
        vec![ContentBlock::Unsupported { kind: "image".to_string() }, ContentBlock::text("late")],
        StopReason::EndTurn,
    )));
    let err = stubs
        .facade()
        .generate_text(LlmProvider::Primary, "hi")
        .await
        .unwrap_err();
    assert!(err.is_response_shape());
}

#[tokio::test]
async fn test_blank_prompt_with_system_is_rejected_before_dispatch() {
    let stubs = Stubs::new(MockLLM::new().with_default_response());
    let request = CompletionRequest::prompt("   ").with_system_prompt("answer tersely");
    let err = stubs
        .facade()
        .complete(LlmProvider::Primary, request)
        .await
        .unwrap_err();
    assert!(matches!(err, FacadeError::InvalidInput(_)), "unexpected {err:?}");
    assert_eq!(stubs.llm.request_count(), 0);
}

#[tokio::test]
async fn test_generate_with_options_rejects_blank_completion() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::text("")));
    let request = CompletionRequest::prompt("hi")
        .with_system_prompt("answer tersely")
        .with_temperature(0.2);
    let err = stubs
        .facade()
        .generate(LlmProvider::Primary, request)
        .await
        .unwrap_err();
    assert!(err.is_response_shape());
    assert_eq!(stubs.llm.request_count(), 1);
}

#[tokio::test]
async fn test_provider_failure_keeps_source() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::failure(503, "overloaded")));
    let err = stubs
        .facade()
        .generate_text(LlmProvider::FastInference, "hi")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Provider { ref provider, operation: Operation::GenerateText, .. } if provider == "groq"
    ));
    assert!(std::error::Error::source(&err).is_some());
}

#[tokio::test]
async fn test_embedding_has_configured_dimensions_and_is_idempotent() {
    let stubs = Stubs::new(MockLLM::new());
    let facade = stubs.facade();

    let first = facade.create_embedding("alpha").await.unwrap();
    let second = facade.create_embedding("alpha").await.unwrap();
    assert_eq!(first.len(), DIMENSIONS);
    assert_eq!(first, second);
    assert_eq!(stubs.embedder.call_count(), 2);
}

#[tokio::test]
async fn test_embedding_dimension_mismatch_is_response_shape() {
    let llm = MockLLM::new();
    let facade = ServiceFacade::builder(config())
        .llm(LlmProvider::Primary, Arc::new(llm.clone()))
        .llm(LlmProvider::Secondary, Arc::new(llm.clone()))
        .llm(LlmProvider::FastInference, Arc::new(llm.clone()))
        .llm(LlmProvider::Alternate, Arc::new(llm))
        .embedder(Arc::new(MockEmbedder::new(DIMENSIONS + 1)))
        .vector_index(Arc::new(MockVectorIndex::new()))
        .speech(Arc::new(MockSpeech::default()))
        .build()
        .unwrap();

    let err = facade.create_embedding("alpha").await.unwrap_err();
    assert!(err.is_response_shape());
}

#[tokio::test]
async fn test_search_ranks_and_truncates() {
    let stubs = Stubs::new(MockLLM::new());
    let facade = stubs.facade();

    let query = facade.create_embedding("alpha").await.unwrap();
    let result = facade.search_vectors(query.clone(), Some(2)).await.unwrap();

    assert_eq!(result.len(), 2);
    assert_eq!(result.matches[0].id, "doc-a");
    assert!(result.matches[0].score >= result.matches[1].score);
    let title = result.matches[0].metadata.as_ref().and_then(|m| m.get("title"));
    assert_eq!(title.and_then(Value::as_str), Some("Alpha"));

    let again = facade.search_vectors(query, Some(2)).await.unwrap();
    assert_eq!(result, again);
}

#[tokio::test]
async fn test_search_defaults_to_ten() {
    let embedder = MockEmbedder::new(DIMENSIONS);
    let mut index = MockVectorIndex::new();
    for i in 0..15 {
        index = index.with_record(format!("doc-{i}"), embedder.vector_for(&i.to_string()), None);
    }
    let llm = MockLLM::new();
    let mut builder = ServiceFacade::builder(config());
    for provider in LlmProvider::ALL.into_iter().filter(|p| p.is_required()) {
        builder = builder.llm(provider, Arc::new(llm.clone()));
    }
    let facade = builder
        .embedder(Arc::new(embedder.clone()))
        .vector_index(Arc::new(index))
        .speech(Arc::new(MockSpeech::default()))
        .build()
        .unwrap();

    let result = facade
        .search_vectors(embedder.vector_for("3"), None)
        .await
        .unwrap();
    assert_eq!(result.len(), 10);
    assert_eq!(result.matches[0].id, "doc-3");
    assert!(result.matches.windows(2).all(|w| w[0].score >= w[1].score));
}

#[tokio::test]
async fn test_speech_returns_audio() {
    let stubs = Stubs::new(MockLLM::new());
    let audio = stubs
        .facade()
        .synthesize_speech("Hello there", "21m00Tcm4TlvDq8ikWAM")
        .await
        .unwrap();
    assert!(!audio.is_empty());
    assert_eq!(stubs.speech.call_count(), 1);
}

#[tokio::test]
async fn test_empty_audio_is_response_shape() {
    let llm = MockLLM::new();
    let mut builder = ServiceFacade::builder(config());
    for provider in LlmProvider::ALL.into_iter().filter(|p| p.is_required()) {
        builder = builder.llm(provider, Arc::new(llm.clone()));
    }
    let facade = builder
        .embedder(Arc::new(MockEmbedder::new(DIMENSIONS)))
        .vector_index(Arc::new(MockVectorIndex::new()))
        .speech(Arc::new(MockSpeech::new(Vec::<u8>::new())))
        .build()
        .unwrap();

    let err = facade.synthesize_speech("hi", "voice").await.unwrap_err();
    assert!(err.is_response_shape());
}

#[tokio::test]
async fn test_hosted_model_round_trip() {
    let stubs = Stubs::new(MockLLM::new());
    let input = Value::map([("prompt", Value::from("a cat")), ("steps", Value::from(30_i64))]);
    let output = stubs
        .facade()
        .run_hosted_model("stability-ai/sdxl:39ed52f2", input.clone())
        .await
        .unwrap();

    assert_eq!(
        output.get("model").and_then(Value::as_str),
        Some("stability-ai/sdxl:39ed52f2")
    );
    assert_eq!(output.get("input"), Some(&input));
}

#[tokio::test]
async fn test_hosted_model_requires_map_input() {
    let stubs = Stubs::new(MockLLM::new());
    let err = stubs
        .facade()
        .run_hosted_model("owner/name", Value::from("not a map"))
        .await
        .unwrap_err();
    assert!(matches!(err, FacadeError::InvalidInput(_)));
    assert_eq!(stubs.runner.run_count(), 0);
}

#[tokio::test]
async fn test_hosted_model_rejects_url_unsafe_reference() {
    let stubs = Stubs::new(MockLLM::new());
    let facade = stubs.facade();
    for model_ref in ["owner/name?version=1", "owner/%2e%2e", "../name"] {
        let err = facade
            .run_hosted_model(model_ref, Value::map([("prompt", "hi")]))
            .await
            .unwrap_err();
        assert!(matches!(err, FacadeError::InvalidInput(_)), "accepted {model_ref:?}");
    }
    assert_eq!(stubs.runner.run_count(), 0);
}

#[tokio::test]
async fn test_load_local_model() {
    let stubs = Stubs::new(MockLLM::new());
    let model = stubs.facade().load_local_model("gpt2").await.unwrap();
    assert_eq!(model.model.model_name, "gpt2");
    assert_eq!(stubs.loader.load_count(), 1);
}

#[tokio::test]
async fn test_prompt_pipeline_formats_and_sets_temperature() {
    let stubs = Stubs::new(MockLLM::new().with_response(MockResponse::text("Paris")));
    let chain = stubs.facade().build_prompt_pipeline().unwrap();

    let answer = chain.ask("What is the capital of France?").await.unwrap();
    assert_eq!(answer, "Paris");

    let sent = stubs.llm.request_history();
    assert_eq!(
        sent[0].messages[0].text(),
        "Answer the following question: What is the capital of France?"
    );
    assert_eq!(sent[0].temperature, Some(0.7));
}

#[tokio::test]
async fn test_prompt_pipeline_and_generate_text_agree_on_leading_block() {
    let reply = || {
        MockResponse::multi(
            vec![ContentBlock::Unsupported { kind: "image".to_string() }, ContentBlock::text("late")],
            StopReason::EndTurn,
        )
    };
    let stubs = Stubs::new(MockLLM::new().with_response(reply()).with_response(reply()));
    let facade = stubs.facade();

    let chain_err = facade.build_prompt_pipeline().unwrap().ask("hi").await.unwrap_err();
    let generate_err = facade.generate_text(LlmProvider::Primary, "hi").await.unwrap_err();
    assert!(chain_err.is_response_shape());
    assert!(generate_err.is_response_shape());
}

// =============================================================================
// Optional providers
// =============================================================================

#[tokio::test]
async fn test_disabled_optional_providers_are_unavailable() {
    let facade = ServiceFacade::new(config(), credentials(&required_env()).unwrap()).unwrap();

    let err = facade
        .generate_text(LlmProvider::Command, "hi")
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Unavailable { provider: "cohere", var: "COMMAND_LLM_API_KEY" }
    ));

    let err = facade
        .run_hosted_model("owner/name", Value::map([("a", 1_i64)]))
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        FacadeError::Unavailable { var: "HOSTED_MODEL_API_TOKEN", .. }
    ));
}

// =============================================================================
// Concurrency
// =============================================================================

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_calls_on_shared_facade() {
    let stubs = Stubs::new(MockLLM::new().with_default_response());
    let facade = Arc::new(stubs.facade());

    let tasks = (0..16).map(|i| {
        let facade = Arc::clone(&facade);
        tokio::spawn(async move {
            let provider = LlmProvider::ALL[i % 4];
            let text = facade.generate_text(provider, "ping").await?;
            let vector = facade.create_embedding(&format!("doc {i}")).await?;
            let hits = facade.search_vectors(vector, Some(1)).await?;
            Ok::<_, FacadeError>((text, hits.len()))
        })
    });

    for joined in join_all(tasks).await {
        let (text, hits) = joined.unwrap().unwrap();
        assert!(!text.is_empty());
        assert_eq!(hits, 1);
    }
    assert_eq!(stubs.llm.request_count(), 16);
    assert_eq!(stubs.embedder.call_count(), 16);
}

// =============================================================================
// End to end through real adapters
// =============================================================================

#[tokio::test]
async fn test_credentials_route_to_configured_endpoints() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/chat/completions"))
        .and(body_partial_json(json!({"model": "gpt-4"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "choices": [{"message": {"role": "assistant", "content": "4"}, "finish_reason": "stop"}]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{"index": 0, "embedding": [0.5, 0.5]}]
        })))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_partial_json(json!({"topK": 10, "namespace": "docs"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "matches": [{"id": "a", "score": 0.3}, {"id": "b", "score": 0.8}],
            "namespace": "docs"
        })))
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.llm.primary.base_url = Some(server.uri());
    config.embedding.base_url = Some(server.uri());
    config.embedding.dimensions = 2;
    config.index.host = Some(server.uri());
    config.index.namespace = Some("docs".to_string());

    let facade = ServiceFacade::new(config, credentials(&required_env()).unwrap()).unwrap();
    assert_eq!(facade.generate_text(LlmProvider::Primary, "What is 2+2?").await.unwrap(), "4");

    let vector = facade.create_embedding("question").await.unwrap();
    let result = facade.search_vectors(vector, None).await.unwrap();
    let ids: Vec<_> = result.matches.iter().map(|m| m.id.as_str()).collect();
    assert_eq!(ids, vec!["b", "a"]);
}

#[tokio::test]
async fn test_empty_embedding_list_through_adapter_is_response_shape() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/embeddings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .mount(&server)
        .await;

    let mut config = AppConfig::default();
    config.embedding.base_url = Some(server.uri());
    let facade = ServiceFacade::new(config, credentials(&required_env()).unwrap()).unwrap();

    let err = facade.create_embedding("question").await.unwrap_err();
    match err {
        FacadeError::ResponseShape { provider, operation, .. } => {
            assert_eq!(provider, "openai");
            assert_eq!(operation, Operation::CreateEmbedding);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
