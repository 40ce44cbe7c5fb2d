// Application state shared across all modules

use reqwest::Client;
use sqlx::SqlitePool;
use std::sync::Arc;

use crate::auth::tokens::TokenService;
use crate::common::config::AppConfig;
use crate::services::{EmailService, PaymentService, QuotaService};

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub http: Client,
    pub config: AppConfig,
    pub token_service: Arc<TokenService>,
    pub quota_service: Arc<QuotaService>,
    pub email_service: Arc<EmailService>,
    pub payment_service: Arc<PaymentService>,
}
