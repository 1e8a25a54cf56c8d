use crate::AppContext;
use crate::api::{MarketplaceApi, PhotoUpload};
use crate::error::app_error::AppError;
use crate::models::auth::{BuyerSignupRequest, LoginRequest, LoginResponse, SignupRequest};
use crate::models::catalog::{AddCropRequest, Crop, Market};
use crate::models::listing::{CreatedResponse, CropListingRequest, DemandRequest, UploadResponse};
use crate::models::role::Role;
use crate::store::memory::MemoryStore;
use crate::store::session_store::SessionStore;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::{Mutex, Notify};

/// Scripted backend. One-shot results are consumed by the next matching call;
/// everything else answers with a canned success.
#[derive(Default)]
pub struct MockApi {
    login: Mutex<Option<Result<LoginResponse, AppError>>>,
    signup: Mutex<Option<Result<Option<String>, AppError>>>,
    post_failure: Mutex<Option<AppError>>,
    profiles: HashMap<Role, Vec<Value>>,
    crops: Vec<Crop>,
    markets: Vec<Market>,
    post_gate: Option<Arc<Notify>>,
    calls: Mutex<Vec<String>>,
    demands: Mutex<Vec<DemandRequest>>,
    listings: Mutex<Vec<CropListingRequest>>,
}

impl MockApi {
    pub fn with_login(self, result: Result<LoginResponse, AppError>) -> Self {
        Self {
            login: Mutex::new(Some(result)),
            ..self
        }
    }

    pub fn with_signup(self, result: Result<Option<String>, AppError>) -> Self {
        Self {
            signup: Mutex::new(Some(result)),
            ..self
        }
    }

    pub fn with_post_failure(self, error: AppError) -> Self {
        Self {
            post_failure: Mutex::new(Some(error)),
            ..self
        }
    }

    pub fn with_profiles(mut self, role: Role, profiles: Vec<Value>) -> Self {
        self.profiles.insert(role, profiles);
        self
    }

    pub fn with_catalog(self, crops: Vec<Crop>, markets: Vec<Market>) -> Self {
        Self { crops, markets, ..self }
    }

    /// Holds listing POSTs until the gate is notified.
    pub fn with_post_gate(self, gate: Arc<Notify>) -> Self {
        Self {
            post_gate: Some(gate),
            ..self
        }
    }

    pub async fn calls(&self) -> Vec<String> {
        self.calls.lock().await.clone()
    }

    pub async fn demands(&self) -> Vec<DemandRequest> {
        self.demands.lock().await.clone()
    }

    pub async fn listings(&self) -> Vec<CropListingRequest> {
        self.listings.lock().await.clone()
    }

    async fn record(&self, call: impl Into<String>) {
        self.calls.lock().await.push(call.into());
    }

    async fn post_outcome(&self) -> Result<CreatedResponse, AppError> {
        if let Some(gate) = &self.post_gate {
            gate.notified().await;
        }
        match self.post_failure.lock().await.take() {
            Some(error) => Err(error),
            None => Ok(CreatedResponse {
                id: Some("listing-1".to_string()),
                message: Some("created".to_string()),
            }),
        }
    }
}

#[async_trait::async_trait]
impl MarketplaceApi for MockApi {
    async fn signup(&self, request: &SignupRequest) -> Result<Option<String>, AppError> {
        self.record(format!("signup:{}", request.role())).await;
        self.signup.lock().await.take().unwrap_or(Ok(Some("registered".to_string())))
    }

    async fn login(&self, role: Role, _request: &LoginRequest) -> Result<LoginResponse, AppError> {
        self.record(format!("login:{role}")).await;
        self.login.lock().await.take().unwrap_or_else(|| {
            Ok(LoginResponse {
                token: Some("T".to_string()),
                user_id: None,
                message: None,
            })
        })
    }

    async fn list_profiles(&self, role: Role, _token: &str) -> Result<Vec<Value>, AppError> {
        self.record(format!("list_profiles:{role}")).await;
        Ok(self.profiles.get(&role).cloned().unwrap_or_default())
    }

    async fn list_crops(&self, _token: &str) -> Result<Vec<Crop>, AppError> {
        self.record("list_crops").await;
        Ok(self.crops.clone())
    }

    async fn list_markets(&self, _token: &str) -> Result<Vec<Market>, AppError> {
        self.record("list_markets").await;
        Ok(self.markets.clone())
    }

    async fn add_crop(&self, _token: &str, request: &AddCropRequest) -> Result<CreatedResponse, AppError> {
        self.record(format!("add_crop:{}", request.name)).await;
        Ok(CreatedResponse {
            id: Some("crop-1".to_string()),
            message: None,
        })
    }

    async fn add_demand(&self, _token: &str, request: &DemandRequest) -> Result<CreatedResponse, AppError> {
        self.record("add_demand").await;
        let outcome = self.post_outcome().await;
        if outcome.is_ok() {
            self.demands.lock().await.push(request.clone());
        }
        outcome
    }

    async fn add_crop_listing(&self, _token: &str, request: &CropListingRequest) -> Result<CreatedResponse, AppError> {
        self.record("add_crop_listing").await;
        let outcome = self.post_outcome().await;
        if outcome.is_ok() {
            self.listings.lock().await.push(request.clone());
        }
        outcome
    }

    async fn upload_photo(&self, _token: &str, photo: PhotoUpload) -> Result<UploadResponse, AppError> {
        self.record(format!("upload:{}:{}", photo.file_name, photo.mime_type)).await;
        Ok(UploadResponse {
            url: Some(format!("https://cdn.example/{}", photo.file_name)),
            message: None,
        })
    }
}

pub fn context_with(api: MockApi) -> (AppContext, Arc<MemoryStore>, Arc<MockApi>) {
    let memory = Arc::new(MemoryStore::new());
    let api = Arc::new(api);
    let ctx = AppContext::new(api.clone(), SessionStore::new(memory.clone()));
    (ctx, memory, api)
}

pub fn sample_buyer_signup() -> BuyerSignupRequest {
    BuyerSignupRequest {
        name: "Asha".to_string(),
        email: "asha@example.com".to_string(),
        mobile: "9876543210".to_string(),
        password: "secret1".to_string(),
        company_name: "Asha Traders".to_string(),
        city: "Nashik".to_string(),
        state: "MH".to_string(),
    }
}

pub fn sample_crop() -> Crop {
    Crop {
        id: "c1".to_string(),
        name: "Onion".to_string(),
        variety: Some("Red".to_string()),
        grade: Some("A".to_string()),
    }
}

pub fn sample_market() -> Market {
    Market {
        id: "m1".to_string(),
        name: "Lasalgaon APMC".to_string(),
        city: Some("Lasalgaon".to_string()),
        state: Some("MH".to_string()),
    }
}

pub fn buyer_profiles() -> Vec<Value> {
    vec![
        json!({"_id": "p0", "Email": "other@b.com", "Name": "Other"}),
        json!({"_id": "p1", "Email": "A@B.com", "Name": "Asha"}),
    ]
}
