use base64::{engine::general_purpose, Engine as _};
use serde::{Deserialize, Serialize};

/// Upper bound of every score the model is asked to produce.
pub const MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadedImage {
    pub base64: String,
    pub mime_type: String,
    pub preview_url: String,
}

impl UploadedImage {
    pub fn bytes(&self) -> Result<Vec<u8>, base64::DecodeError> {
        general_purpose::STANDARD.decode(&self.base64)
    }

    /// Size of the decoded payload, computed from the padded base64 text.
    pub fn byte_len(&self) -> usize {
        let padding = self
            .base64
            .bytes()
            .rev()
            .take_while(|&b| b == b'=')
            .count();
        (self.base64.len() / 4 * 3).saturating_sub(padding)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureAnalysis {
    pub feature: String,
    pub score: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub overall_score: f64,
    pub potential_score: f64,
    pub summary: String,
    pub face_shape: String,
    pub skin_quality: String,
    pub best_feature: String,
    pub features: Vec<FeatureAnalysis>,
    pub improvements: Vec<String>,
}

impl AnalysisResult {
    pub fn radar(&self) -> Vec<RadarPoint> {
        self.features
            .iter()
            .map(|f| RadarPoint {
                subject: f.feature.clone(),
                value: f.score,
                full_mark: MAX_SCORE,
            })
            .collect()
    }
}

/// One spoke of the feature-harmony chart.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RadarPoint {
    pub subject: String,
    pub value: f64,
    pub full_mark: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn result_uses_camel_case_fields() {
        let result: AnalysisResult = serde_json::from_value(json!({
            "overallScore": 7,
            "potentialScore": 8.5,
            "summary": "Balanced features",
            "faceShape": "Oval",
            "skinQuality": "Clear",
            "bestFeature": "Eyes",
            "features": [{"feature": "Jawline", "score": 8, "comment": "Well-defined"}],
            "improvements": ["Try a shorter beard"]
        }))
        .unwrap();

        assert_eq!(result.overall_score, 7.0);
        assert_eq!(result.features[0].feature, "Jawline");

        let radar = result.radar();
        assert_eq!(radar.len(), 1);
        assert_eq!(radar[0].full_mark, MAX_SCORE);
        assert_eq!(
            serde_json::to_value(&radar[0]).unwrap(),
            json!({"subject": "Jawline", "value": 8.0, "fullMark": 10.0})
        );
    }

    #[test]
    fn byte_len_accounts_for_padding() {
        for raw in [&b""[..], b"a", b"ab", b"abc", b"abcd", b"hello world"] {
            let image = UploadedImage {
                base64: general_purpose::STANDARD.encode(raw),
                mime_type: "image/png".into(),
                preview_url: String::new(),
            };
            assert_eq!(image.byte_len(), raw.len());
        }
    }
}
