pub mod http;

use crate::error::app_error::AppError;
use crate::models::auth::{LoginRequest, LoginResponse, SignupRequest};
use crate::models::catalog::{AddCropRequest, Crop, Market};
use crate::models::listing::{CreatedResponse, CropListingRequest, DemandRequest, UploadResponse};
use crate::models::role::Role;
use serde_json::Value;

pub const BUYER_DEMAND_PATH: &str = "/marketplace/buyer/add";
pub const FARMER_LISTING_PATH: &str = "/marketplace/farmer/cropListing";
pub const FARMER_UPLOAD_PATH: &str = "/marketplace/farmer/upload";
pub const CROPS_PATH: &str = "/getAllCrop";
pub const MARKETS_PATH: &str = "/getAllMarket";
pub const ADD_CROP_PATH: &str = "/addCrop";

/// Photo bytes for the multipart upload endpoint.
#[derive(Debug, Clone)]
pub struct PhotoUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// Calls the marketplace backend exposes. Authenticated calls take the bearer
/// token explicitly; there is no shared interceptor.
#[async_trait::async_trait]
pub trait MarketplaceApi: Send + Sync {
    /// Returns the server's acknowledgement message, if it sent one.
    async fn signup(&self, request: &SignupRequest) -> Result<Option<String>, AppError>;
    async fn login(&self, role: Role, request: &LoginRequest) -> Result<LoginResponse, AppError>;
    /// Raw records; each is normalized and validated on its own by the caller
    /// so one odd record cannot sink the whole collection.
    async fn list_profiles(&self, role: Role, token: &str) -> Result<Vec<Value>, AppError>;
    async fn list_crops(&self, token: &str) -> Result<Vec<Crop>, AppError>;
    async fn list_markets(&self, token: &str) -> Result<Vec<Market>, AppError>;
    async fn add_crop(&self, token: &str, request: &AddCropRequest) -> Result<CreatedResponse, AppError>;
    async fn add_demand(&self, token: &str, request: &DemandRequest) -> Result<CreatedResponse, AppError>;
    async fn add_crop_listing(&self, token: &str, request: &CropListingRequest) -> Result<CreatedResponse, AppError>;
    async fn upload_photo(&self, token: &str, photo: PhotoUpload) -> Result<UploadResponse, AppError>;
}
