use crate::api::{
    ADD_CROP_PATH, BUYER_DEMAND_PATH, CROPS_PATH, FARMER_LISTING_PATH, FARMER_UPLOAD_PATH, MARKETS_PATH, MarketplaceApi, PhotoUpload,
};
use crate::config::ApiConfig;
use crate::error::app_error::AppError;
use crate::models::auth::{ApiMessage, LoginRequest, LoginResponse, SignupRequest};
use crate::models::catalog::{AddCropRequest, Crop, Market};
use crate::models::listing::{CreatedResponse, CropListingRequest, DemandRequest, UploadResponse};
use crate::models::role::Role;
use reqwest::header::AUTHORIZATION;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::time::Duration;
use tracing::{info, warn};
use uuid::Uuid;

const REQUEST_ID_HEADER: &str = "X-Request-Id";
/// Wrapper keys the backend has used around list payloads.
const LIST_ENVELOPE_KEYS: [&str; 5] = ["data", "buyers", "farmers", "crops", "markets"];

/// Marketplace backend over HTTPS.
#[derive(Clone)]
pub struct HttpApi {
    client: Client,
    base_url: String,
}

/// What a 401 means depends on the call: bad credentials at login, a dead
/// session anywhere else.
#[derive(Debug, Clone, Copy)]
enum AuthFailure {
    Credentials,
    Session,
}

impl HttpApi {
    pub fn new(config: &ApiConfig) -> Result<Self, AppError> {
        let mut builder = Client::builder().user_agent(concat!("mandi-connect/", env!("CARGO_PKG_VERSION")));
        if let Some(seconds) = config.timeout_seconds {
            builder = builder.timeout(Duration::from_secs(seconds));
        }
        let client = builder.build().map_err(|e| AppError::network("Failed to build HTTP client", e))?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn request(&self, method: Method, path: &str, token: Option<&str>) -> RequestBuilder {
        let builder = self.client.request(method, self.url(path));
        match token {
            Some(token) => builder.header(AUTHORIZATION, format!("Bearer {token}")),
            None => builder,
        }
    }

    async fn send(&self, builder: RequestBuilder, method: Method, path: &str, auth: AuthFailure) -> Result<String, AppError> {
        let request_id = Uuid::new_v4().to_string();
        info!(request_id = %request_id, method = %method, path = %path, "outgoing request");

        let response = builder.header(REQUEST_ID_HEADER, &request_id).send().await.map_err(|e| {
            warn!(request_id = %request_id, method = %method, path = %path, error = %e, "backend not reachable");
            AppError::network(format!("{method} {path} failed"), e)
        })?;

        let status = response.status();
        let body = read_body(response).await?;

        if status.is_success() {
            info!(request_id = %request_id, method = %method, path = %path, status = %status.as_u16(), "request completed");
            return Ok(body);
        }

        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            "request completed with error"
        );
        Err(error_for_status(status, &body, auth))
    }

    async fn get_list<T: DeserializeOwned>(&self, path: &str, token: &str) -> Result<Vec<T>, AppError> {
        let body = self
            .send(self.request(Method::GET, path, Some(token)), Method::GET, path, AuthFailure::Session)
            .await?;
        parse_list(path, &body)
    }

    async fn post_json<B, T>(&self, path: &str, token: Option<&str>, payload: &B, auth: AuthFailure) -> Result<T, AppError>
    where
        B: serde::Serialize + Sync + ?Sized,
        T: DeserializeOwned + Default,
    {
        let builder = self.request(Method::POST, path, token).json(payload);
        let body = self.send(builder, Method::POST, path, auth).await?;
        parse_body(path, &body)
    }
}

async fn read_body(response: Response) -> Result<String, AppError> {
    response.text().await.map_err(|e| AppError::network("Failed to read response body", e))
}

fn error_for_status(status: StatusCode, body: &str, auth: AuthFailure) -> AppError {
    if status == StatusCode::UNAUTHORIZED {
        return match auth {
            AuthFailure::Credentials => AppError::InvalidCredentials,
            AuthFailure::Session => AppError::Unauthorized,
        };
    }
    AppError::server(status, message_from_body(body))
}

/// Pulls a human-readable message out of an error body. Plain-text bodies are
/// used as-is; JSON bodies contribute their `message` or `error` field.
pub(crate) fn message_from_body(body: &str) -> Option<String> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return None;
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => serde_json::from_value::<ApiMessage>(value).ok().and_then(ApiMessage::text),
        Ok(Value::String(text)) => Some(text),
        Ok(_) => None,
        Err(_) if !trimmed.starts_with('<') => Some(trimmed.to_string()),
        Err(_) => None,
    }
}

/// Decodes a 2xx body. Empty bodies decode as the type's default; a plain
/// text acknowledgement becomes the default with the text as its `message`.
pub(crate) fn parse_body<T: DeserializeOwned + Default>(path: &str, body: &str) -> Result<T, AppError> {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return Ok(T::default());
    }
    match serde_json::from_str::<Value>(trimmed) {
        Ok(value @ Value::Object(_)) => serde_json::from_value(value).map_err(|e| AppError::UnexpectedPayload(format!("{path}: {e}"))),
        Ok(_) | Err(_) => match message_from_body(trimmed) {
            Some(text) => acknowledgement(path, text),
            None => Ok(T::default()),
        },
    }
}

fn acknowledgement<T: DeserializeOwned>(path: &str, text: String) -> Result<T, AppError> {
    serde_json::from_value(json!({ "message": text })).map_err(|e| AppError::UnexpectedPayload(format!("{path}: {e}")))
}

/// Accepts either a bare JSON array or an object wrapping one.
pub(crate) fn parse_list<T: DeserializeOwned>(path: &str, body: &str) -> Result<Vec<T>, AppError> {
    let value: Value = serde_json::from_str(body).map_err(|e| AppError::UnexpectedPayload(format!("{path}: {e}")))?;
    let items = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => LIST_ENVELOPE_KEYS
            .iter()
            .find_map(|key| match map.remove(*key) {
                Some(Value::Array(items)) => Some(items),
                _ => None,
            })
            .ok_or_else(|| AppError::UnexpectedPayload(format!("{path}: no list in response object")))?,
        other => return Err(AppError::UnexpectedPayload(format!("{path}: expected a list, got {other}"))),
    };

    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| AppError::UnexpectedPayload(format!("{path}: {e}"))))
        .collect()
}

#[async_trait::async_trait]
impl MarketplaceApi for HttpApi {
    async fn signup(&self, request: &SignupRequest) -> Result<Option<String>, AppError> {
        let path = request.role().signup_path();
        let message: ApiMessage = self.post_json(&path, None, request, AuthFailure::Credentials).await?;
        Ok(message.text())
    }

    async fn login(&self, role: Role, request: &LoginRequest) -> Result<LoginResponse, AppError> {
        self.post_json(&role.login_path(), None, request, AuthFailure::Credentials).await
    }

    async fn list_profiles(&self, role: Role, token: &str) -> Result<Vec<Value>, AppError> {
        self.get_list(&role.list_path(), token).await
    }

    async fn list_crops(&self, token: &str) -> Result<Vec<Crop>, AppError> {
        self.get_list(CROPS_PATH, token).await
    }

    async fn list_markets(&self, token: &str) -> Result<Vec<Market>, AppError> {
        self.get_list(MARKETS_PATH, token).await
    }

    async fn add_crop(&self, token: &str, request: &AddCropRequest) -> Result<CreatedResponse, AppError> {
        self.post_json(ADD_CROP_PATH, Some(token), request, AuthFailure::Session).await
    }

    async fn add_demand(&self, token: &str, request: &DemandRequest) -> Result<CreatedResponse, AppError> {
        self.post_json(BUYER_DEMAND_PATH, Some(token), request, AuthFailure::Session).await
    }

    async fn add_crop_listing(&self, token: &str, request: &CropListingRequest) -> Result<CreatedResponse, AppError> {
        self.post_json(FARMER_LISTING_PATH, Some(token), request, AuthFailure::Session).await
    }

    async fn upload_photo(&self, token: &str, photo: PhotoUpload) -> Result<UploadResponse, AppError> {
        let part = Part::bytes(photo.bytes)
            .file_name(photo.file_name)
            .mime_str(&photo.mime_type)
            .map_err(|_| AppError::validation(format!("Invalid upload content type '{}'", photo.mime_type)))?;
        let form = Form::new().part("file", part);

        let builder = self.request(Method::POST, FARMER_UPLOAD_PATH, Some(token)).multipart(form);
        let body = self.send(builder, Method::POST, FARMER_UPLOAD_PATH, AuthFailure::Session).await?;
        parse_body(FARMER_UPLOAD_PATH, &body)
    }
}
