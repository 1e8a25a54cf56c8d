use serde::{Deserialize, Serialize};
use validator::Validate;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Crop {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "cropName", alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub variety: Option<String>,
    #[serde(default)]
    pub grade: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Market {
    #[serde(alias = "_id")]
    pub id: String,
    #[serde(alias = "marketName", alias = "Name")]
    pub name: String,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
}

/// Reference data a listing form selects from.
#[derive(Serialize, Debug, Clone, Default, PartialEq)]
pub struct Catalog {
    pub crops: Vec<Crop>,
    pub markets: Vec<Market>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Validate)]
pub struct AddCropRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(length(min = 1))]
    pub variety: String,
    #[validate(length(min = 1))]
    pub grade: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn crop_accepts_mongo_style_ids() {
        let crop: Crop = serde_json::from_value(json!({"_id": "c1", "cropName": "Onion", "grade": "A"})).unwrap();
        assert_eq!(crop.id, "c1");
        assert_eq!(crop.name, "Onion");
        assert!(crop.variety.is_none());
    }
}
