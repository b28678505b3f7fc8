use serde::Deserialize;

/// Deserialize Binance string-encoded numbers to f64.
pub fn string_to_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::String(s) => s.parse::<f64>().map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| serde::de::Error::custom("invalid number")),
        _ => Err(serde::de::Error::custom("expected numeric string")),
    }
}

/// Optional string-or-number field; `null` and empty strings are `None`.
pub fn string_or_number_to_opt_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let v = serde_json::Value::deserialize(deserializer)?;
    match v {
        serde_json::Value::Null => Ok(None),
        serde_json::Value::String(s) if s.trim().is_empty() => Ok(None),
        serde_json::Value::String(s) => s
            .parse::<f64>()
            .map(Some)
            .map_err(serde::de::Error::custom),
        serde_json::Value::Number(n) => n
            .as_f64()
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom("invalid number")),
        _ => Err(serde::de::Error::custom("invalid numeric value")),
    }
}

/// Fear & greed feed response (`{"data":[{"value":"54","value_classification":"Neutral"}]}`).
#[derive(Debug, Deserialize)]
pub struct FearGreedResponse {
    #[serde(default)]
    pub data: Vec<FearGreedEntry>,
}

#[derive(Debug, Deserialize)]
pub struct FearGreedEntry {
    #[serde(deserialize_with = "string_to_f64")]
    pub value: f64,
    #[serde(default)]
    pub value_classification: String,
}

/// Binance API error response.
#[derive(Debug, Deserialize)]
pub struct BinanceApiErrorResponse {
    pub code: i64,
    pub msg: String,
}
