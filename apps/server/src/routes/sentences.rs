//! `POST /sentence_measure/` — auth-gated. Splits submitted text into
//! sentences and reports their lengths. The original tokenized with spaCy;
//! spaCy itself is out of scope here, so this uses a naive punctuation-based
//! splitter instead.

use std::sync::Arc;

use httpd_core::{require_auth, HttpServer, Request, Response};
use serde_json::{json, Value};
use sha2::{Digest, Sha256};

pub fn register(server: &mut HttpServer) {
    server.post_handler("/sentence_measure/", require_auth(Arc::new(sentence_measure)));
}

fn sentence_measure(req: &mut Request) -> Response {
    let payload: Value = match req.body_str().ok().and_then(|s| serde_json::from_str(s).ok()) {
        Some(value) => value,
        None => return Response::json(400, &json!({"error": "No text provided"})),
    };

    let text = match payload.get("text").and_then(Value::as_str) {
        Some(text) if !text.trim().is_empty() => text,
        _ => return Response::json(400, &json!({"error": "No text provided"})),
    };

    let sentences = split_sentences(text);
    let sentence_lengths: Vec<usize> = sentences.iter().map(|s| s.chars().count()).collect();
    let user_email = req
        .session
        .get("user")
        .and_then(|user| user.get("email"))
        .cloned()
        .unwrap_or(Value::Null);

    let digest = Sha256::digest(text.as_bytes());
    let text_id = format!("text-{:02x}{:02x}{:02x}{:02x}", digest[0], digest[1], digest[2], digest[3]);

    Response::json(
        200,
        &json!({
            "text_id": text_id,
            "num_sentences": sentences.len(),
            "sentence_lengths": sentence_lengths,
            "sentences": sentences,
            "user_email": user_email,
        }),
    )
}

/// Splits on `.`, `!`, `?`, keeping the punctuation with the preceding text
/// and dropping whitespace-only fragments.
fn split_sentences(text: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        current.push(ch);
        if matches!(ch, '.' | '!' | '?') {
            let trimmed = current.trim();
            if !trimmed.is_empty() {
                sentences.push(trimmed.to_string());
            }
            current.clear();
        }
    }
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        sentences.push(trimmed.to_string());
    }
    sentences
}
