//! Saved configuration data models

use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;

/// Saved configuration database model
///
/// `config_data` holds the JSON form input verbatim, as TEXT, so a saved
/// configuration can be re-rendered or edited later.
#[derive(FromRow, Serialize, Deserialize, Debug, Clone)]
pub struct Configuration {
    pub id: String,
    pub user_id: String,
    pub service: String,
    pub config_name: String,
    pub config_data: String,
    pub created_at: String,
    pub updated_at: String,
}

/// Create request body
#[derive(Deserialize)]
pub struct CreateConfigurationRequest {
    pub service: String,
    pub config_name: String,
    pub config_data: Value,
}

/// Update request body; absent fields keep their stored value
#[derive(Deserialize)]
pub struct UpdateConfigurationRequest {
    pub config_name: Option<String>,
    pub config_data: Option<Value>,
}
