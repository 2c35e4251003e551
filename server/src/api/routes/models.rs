//! Model listing endpoint

use axum::extract::State;
use axum::Json;
use chrono::Utc;
use serde::Serialize;

use super::chat::ChatApiState;

#[derive(Debug, Serialize)]
pub struct ModelCard {
    pub id: String,
    pub object: &'static str,
    pub created: i64,
    pub owned_by: String,
}

#[derive(Debug, Serialize)]
pub struct ModelList {
    pub object: &'static str,
    pub data: Vec<ModelCard>,
}

/// List the single served model
pub async fn list_models(State(state): State<ChatApiState>) -> Json<ModelList> {
    Json(ModelList {
        object: "list",
        data: vec![ModelCard {
            id: state.chat.model_name().to_string(),
            object: "model",
            created: Utc::now().timestamp(),
            owned_by: state.chat.model_owner().to_string(),
        }],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_list_serialization() {
        let list = ModelList {
            object: "list",
            data: vec![ModelCard {
                id: "Qwen/Qwen-VL-Chat-Int4".to_string(),
                object: "model",
                created: 1_700_000_000,
                owned_by: "Qwen".to_string(),
            }],
        };
        let value = serde_json::to_value(&list).unwrap();
        assert_eq!(value["object"], "list");
        assert_eq!(value["data"][0]["id"], "Qwen/Qwen-VL-Chat-Int4");
        assert_eq!(value["data"][0]["object"], "model");
        assert_eq!(value["data"][0]["owned_by"], "Qwen");
    }
}
