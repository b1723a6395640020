use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;
use promptdeck::storage::SqliteTemplateStore;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[allow(dead_code)]
pub fn create_temp_store() -> (SqliteTemplateStore, TempDir) {
    let tmp = TempDir::new().expect("failed to create tempdir");
    let db_path = tmp.path().join("templates.db");
    let store = SqliteTemplateStore::new_with_path(db_path)
        .expect("failed to create sqlite template store with path");
    (store, tmp)
}

#[allow(dead_code)]
pub fn temp_config_file(contents: &str) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().expect("failed to create tempdir");
    let config_path = temp_dir.path().join("config.yaml");
    fs::write(&config_path, contents).expect("failed to write config file");
    (temp_dir, config_path)
}

/// Config pointing the Ollama provider at `host`
#[allow(dead_code)]
pub fn ollama_config(host: &str) -> promptdeck::config::OllamaConfig {
    promptdeck::config::OllamaConfig {
        host: host.to_string(),
        model: "llama3.2:latest".to_string(),
        timeout_seconds: 5,
    }
}

/// Serve `/api/version` and a two-model `/api/tags`
#[allow(dead_code)]
pub async fn mount_catalog(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/api/version"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "version": "0.5.7" })))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/tags"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "models": [
                { "name": "llama3.2:latest", "size": 2019393189 },
                { "name": "mistral:latest", "size": 4109865159u64 }
            ]
        })))
        .mount(server)
        .await;
}

/// Answer every `/api/chat` request with `answer`
#[allow(dead_code)]
pub async fn mount_chat(server: &MockServer, answer: &str) {
    Mock::given(method("POST"))
        .and(path("/api/chat"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "model": "mistral:latest",
            "message": { "role": "assistant", "content": answer },
            "done": true
        })))
        .mount(server)
        .await;
}
