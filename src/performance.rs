use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Normalized performance metrics attached to an ad.
///
/// Every field is independently optional: a missing or malformed value means
/// "no signal" and is never read as zero.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Performance {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ctr: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub impressions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clicks: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conversions: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpc: Option<f64>,
}

impl Performance {
    /// Returns `None` unless `value` is a JSON object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let map = value.as_object()?;
        let field = |name: &str| map.get(name).and_then(coerce_number);
        Some(Self {
            ctr: field("ctr"),
            impressions: field("impressions"),
            clicks: field("clicks"),
            conversions: field("conversions"),
            cost: field("cost"),
            cpc: field("cpc"),
        })
    }

    pub fn is_empty(&self) -> bool {
        self.ctr.is_none()
            && self.impressions.is_none()
            && self.clicks.is_none()
            && self.conversions.is_none()
            && self.cost.is_none()
            && self.cpc.is_none()
    }
}

fn coerce_number(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64()?,
        Value::String(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if number.is_finite() {
        Some(number)
    } else {
        None
    }
}

pub(crate) fn deserialize_loose<'de, D>(deserializer: D) -> Result<Option<Performance>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(Performance::from_value))
}
