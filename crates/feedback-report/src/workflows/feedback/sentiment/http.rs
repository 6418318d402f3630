use super::{Classification, ClassifierError, ClassifierLabel, SentimentClassifier};
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;
use tracing::debug;

/// Text-classification endpoint speaking the inference-API JSON shape:
/// `{"inputs": [..]}` in, one prediction (or ranked prediction list) per input out.
///
/// Calls block; run them off the async executor.
#[derive(Debug, Clone)]
pub struct HttpClassifier {
    endpoint: String,
    token: Option<String>,
    timeout: Duration,
}

#[derive(Serialize)]
struct ClassifyRequest<'a> {
    inputs: &'a [&'a str],
}

#[derive(Debug, Deserialize)]
struct Score {
    label: String,
    score: f32,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Prediction {
    Ranked(Vec<Score>),
    Single(Score),
}

impl Prediction {
    fn best(self) -> Option<Score> {
        match self {
            Self::Single(score) => Some(score),
            Self::Ranked(scores) => scores
                .into_iter()
                .max_by(|a, b| a.score.total_cmp(&b.score)),
        }
    }
}

impl HttpClassifier {
    pub fn new(endpoint: impl Into<String>, token: Option<String>, timeout: Duration) -> Self {
        Self {
            endpoint: endpoint.into(),
            token,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn send(&self, texts: &[&str]) -> Result<Vec<Prediction>, ClassifierError> {
        let mut request = shared_client()?
            .post(&self.endpoint)
            .timeout(self.timeout)
            .json(&ClassifyRequest { inputs: texts });
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request
            .send()
            .and_then(|response| response.error_for_status())
            .map_err(|err| ClassifierError::Request(err.to_string()))?;

        response
            .json::<Vec<Prediction>>()
            .map_err(|err| ClassifierError::InvalidResponse(err.to_string()))
    }
}

impl SentimentClassifier for HttpClassifier {
    fn classify(&self, text: &str) -> Result<Classification, ClassifierError> {
        self.classify_batch(&[text])?
            .into_iter()
            .next()
            .ok_or(ClassifierError::BatchMismatch {
                expected: 1,
                got: 0,
            })
    }

    fn classify_batch(&self, texts: &[&str]) -> Result<Vec<Classification>, ClassifierError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let predictions = self.send(texts)?;
        if predictions.len() != texts.len() {
            return Err(ClassifierError::BatchMismatch {
                expected: texts.len(),
                got: predictions.len(),
            });
        }
        debug!(inputs = texts.len(), endpoint = %self.endpoint, "classifier batch complete");

        predictions
            .into_iter()
            .map(|prediction| {
                prediction
                    .best()
                    .map(|score| Classification {
                        label: ClassifierLabel::from_model(&score.label),
                        confidence: score.score,
                    })
                    .ok_or_else(|| ClassifierError::InvalidResponse("empty prediction".to_string()))
            })
            .collect()
    }
}

/// Process-wide blocking client. Built on first use from a blocking thread and never dropped.
fn shared_client() -> Result<&'static Client, ClassifierError> {
    static CLIENT: OnceLock<Client> = OnceLock::new();
    if let Some(client) = CLIENT.get() {
        return Ok(client);
    }
    let client = Client::builder()
        .connect_timeout(Duration::from_secs(10))
        .build()
        .map_err(|err| ClassifierError::Request(err.to_string()))?;
    Ok(CLIENT.get_or_init(|| client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ranked_predictions_pick_the_top_score() {
        let payload = r#"[
            [{"label": "NEU", "score": 0.2}, {"label": "POS", "score": 0.7}, {"label": "NEG", "score": 0.1}],
            {"label": "NEG", "score": 0.95}
        ]"#;
        let predictions: Vec<Prediction> = serde_json::from_str(payload).expect("payload parses");
        let labels: Vec<String> = predictions
            .into_iter()
            .filter_map(Prediction::best)
            .map(|score| score.label)
            .collect();
        assert_eq!(labels, vec!["POS", "NEG"]);
    }

    #[test]
    fn empty_ranked_list_has_no_best() {
        let prediction: Prediction = serde_json::from_str("[]").expect("parses");
        assert!(prediction.best().is_none());
    }

    #[test]
    fn request_body_wraps_inputs() {
        let texts = ["hola", "chau"];
        let body = serde_json::to_value(ClassifyRequest { inputs: &texts }).expect("serializes");
        assert_eq!(body, serde_json::json!({"inputs": ["hola", "chau"]}));
    }

    #[test]
    fn unreachable_endpoint_is_a_request_error() {
        let classifier = HttpClassifier::new(
            "http://127.0.0.1:9/classify",
            None,
            Duration::from_millis(200),
        );
        let err = classifier.classify("hola").expect_err("nothing listens on port 9");
        assert!(matches!(err, ClassifierError::Request(_)));
    }
}
