use crate::error::app_error::AppError;
use crate::util::{blank_fields, parse_positive};
use serde::{Deserialize, Serialize};

/// Raw buyer demand form. Selections stay `None` until the user picks one.
#[derive(Debug, Clone, Default)]
pub struct DemandForm {
    pub crop_id: Option<String>,
    pub market_id: Option<String>,
    pub quantity: String,
    pub unit: String,
    pub expected_price: String,
}

/// Raw farmer crop listing form.
#[derive(Debug, Clone, Default)]
pub struct CropListingForm {
    pub crop_id: Option<String>,
    pub market_id: Option<String>,
    pub quantity: String,
    pub unit: String,
    pub price: String,
    pub photo_url: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DemandRequest {
    pub buyer_id: String,
    pub crop_id: String,
    pub market_id: String,
    pub quantity: f64,
    pub unit: String,
    pub expected_price: f64,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct CropListingRequest {
    pub farmer_id: String,
    pub crop_id: String,
    pub market_id: String,
    pub quantity: f64,
    pub unit: String,
    pub price: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
}

/// Acknowledgement for a created crop or listing.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct CreatedResponse {
    #[serde(alias = "_id", default)]
    pub id: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq)]
pub struct UploadResponse {
    #[serde(alias = "imageUrl", alias = "secure_url", default)]
    pub url: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

/// A form that turns into a request once the owning profile id is known.
pub trait ListingForm {
    type Request: Serialize + Send + Sync;

    fn into_request(&self, owner_id: &str) -> Result<Self::Request, AppError>;
}

fn checked_numbers(quantity: &str, price: &str) -> Result<(f64, f64), AppError> {
    match (parse_positive(quantity), parse_positive(price)) {
        (Some(quantity), Some(price)) => Ok((quantity, price)),
        _ => Err(AppError::validation("Quantity and price must be numbers")),
    }
}

impl ListingForm for DemandForm {
    type Request = DemandRequest;

    fn into_request(&self, owner_id: &str) -> Result<DemandRequest, AppError> {
        let missing = blank_fields(&[
            ("crop", self.crop_id.as_deref()),
            ("market", self.market_id.as_deref()),
            ("quantity", Some(self.quantity.as_str())),
            ("unit", Some(self.unit.as_str())),
            ("expected_price", Some(self.expected_price.as_str())),
        ]);
        if !missing.is_empty() {
            return Err(AppError::missing_fields());
        }
        let (quantity, expected_price) = checked_numbers(&self.quantity, &self.expected_price)?;

        Ok(DemandRequest {
            buyer_id: owner_id.to_string(),
            crop_id: self.crop_id.clone().unwrap_or_default(),
            market_id: self.market_id.clone().unwrap_or_default(),
            quantity,
            unit: self.unit.trim().to_string(),
            expected_price,
        })
    }
}

impl ListingForm for CropListingForm {
    type Request = CropListingRequest;

    fn into_request(&self, owner_id: &str) -> Result<CropListingRequest, AppError> {
        let missing = blank_fields(&[
            ("crop", self.crop_id.as_deref()),
            ("market", self.market_id.as_deref()),
            ("quantity", Some(self.quantity.as_str())),
            ("unit", Some(self.unit.as_str())),
            ("price", Some(self.price.as_str())),
        ]);
        if !missing.is_empty() {
            return Err(AppError::missing_fields());
        }
        let (quantity, price) = checked_numbers(&self.quantity, &self.price)?;

        Ok(CropListingRequest {
            farmer_id: owner_id.to_string(),
            crop_id: self.crop_id.clone().unwrap_or_default(),
            market_id: self.market_id.clone().unwrap_or_default(),
            quantity,
            unit: self.unit.trim().to_string(),
            price,
            photo_url: self.photo_url.clone().filter(|url| !url.trim().is_empty()),
        })
    }
}
