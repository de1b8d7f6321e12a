//! Activities normalized from raw nearby-places results

use serde::{Deserialize, Serialize};

/// Fixed activity category enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActivityCategory {
    Cultural,
    Outdoor,
    Culinary,
    Shopping,
}

/// One point-of-interest normalized into a bookable activity shape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activity {
    /// Generated identity (9-char alphanumeric)
    pub id: String,
    pub name: String,
    /// Human-readable vicinity description
    pub location: String,
    pub description: String,
    /// External place reference for detail lookups
    pub link: String,
    pub category: ActivityCategory,
    /// Placeholder pricing until a booking source is attached
    pub price: f64,
    pub currency: String,
    pub duration: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&ActivityCategory::Culinary).unwrap(),
            "\"culinary\""
        );
        let back: ActivityCategory = serde_json::from_str("\"outdoor\"").unwrap();
        assert_eq!(back, ActivityCategory::Outdoor);
    }
}
