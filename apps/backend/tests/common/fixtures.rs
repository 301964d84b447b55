//! Request bodies for the progress API.

use serde_json::{json, Value};

pub fn register_request(name: Option<&str>) -> Value {
    match name {
        Some(name) => json!({ "name": name, "current_level": "N5" }),
        None => json!({}),
    }
}

/// Answer for an item at level N5.
pub fn answer(item_type: &str, item_id: &str, correct: bool) -> Value {
    json!({
        "item_type": item_type,
        "item_id": item_id,
        "level": "N5",
        "correct": correct,
    })
}

pub fn answer_at_level(item_type: &str, item_id: &str, level: &str, correct: bool) -> Value {
    json!({
        "item_type": item_type,
        "item_id": item_id,
        "level": level,
        "correct": correct,
    })
}

pub fn quiz(quiz_type: &str, score: u32, total_questions: u32) -> Value {
    json!({
        "quiz_type": quiz_type,
        "level": "N5",
        "score": score,
        "total_questions": total_questions,
    })
}
