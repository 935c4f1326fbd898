use serde_json::{json, Value};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub fn library_full_body() -> Value {
    json!({
        "detail": {
            "status": "add_limit_reached",
            "message": "You have reached your maximum amount of custom voices (30 / 30)."
        }
    })
}

pub fn monthly_limit_body() -> Value {
    json!({
        "detail": {
            "status": "voice_add_edit_limit_reached",
            "message": "You have reached your monthly voice add/edit limit."
        }
    })
}

pub fn audio_bytes(voice_id: &str) -> Vec<u8> {
    format!("ID3-{}", voice_id).into_bytes()
}

/// Answer synthesis for `voice_id` with audio, `times` times
pub async fn mount_tts_ok(server: &MockServer, voice_id: &str, times: u64) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", voice_id)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(audio_bytes(voice_id)))
        .up_to_n_times(times)
        .expect(times)
        .mount(server)
        .await;
}

/// Answer synthesis for `voice_id` with a JSON error once
pub async fn mount_tts_error_once(server: &MockServer, voice_id: &str, body: Value) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", voice_id)))
        .respond_with(ResponseTemplate::new(400).set_body_json(body))
        .up_to_n_times(1)
        .expect(1)
        .mount(server)
        .await;
}

/// Synthesis for `voice_id` must never be requested
pub async fn mount_tts_never(server: &MockServer, voice_id: &str) {
    Mock::given(method("POST"))
        .and(path(format!("/v1/text-to-speech/{}", voice_id)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(server)
        .await;
}

pub async fn mount_library(server: &MockServer, voice_ids: &[&str]) {
    let voices: Vec<Value> = voice_ids
        .iter()
        .map(|id| json!({ "voice_id": id, "name": format!("Library {}", id) }))
        .collect();

    Mock::given(method("GET"))
        .and(path("/v1/voices"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "voices": voices })))
        .mount(server)
        .await;
}

pub async fn mount_delete(server: &MockServer, voice_id: &str, times: u64) {
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/voices/{}", voice_id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "status": "ok" })))
        .expect(times)
        .mount(server)
        .await;
}
