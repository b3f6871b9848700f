use anyhow::{anyhow, bail, Context, Result};
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use std::future::Future;
use tracing::{debug, info, warn};
use url::Url;

use crate::api_types::{PredictRequest, PredictResponse, ServingError};
use crate::sequence::PaddedMatrix;

pub const DEFAULT_MODEL_URL: &str = "http://localhost:8501/v1/models/news_sentiment:predict";
pub const DEFAULT_CHUNK_ROWS: usize = 32;
pub const MAX_IN_FLIGHT: usize = 4;

/// HTTP client for the pre-trained classifier. The model itself is opaque:
/// one row of indices in, one score vector out.
#[derive(Debug, Clone)]
pub struct ModelClient {
    client: Client,
    endpoint: Url,
    chunk_rows: usize,
}

impl ModelClient {
    pub fn new(endpoint: &str, chunk_rows: usize) -> Result<Self> {
        let endpoint = Url::parse(endpoint)
            .with_context(|| format!("invalid model endpoint {:?}", endpoint))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("model endpoint must be http(s), got {}", endpoint.scheme());
        }
        if chunk_rows == 0 {
            bail!("chunk size must be at least 1");
        }
        Ok(Self {
            client: Client::builder().build()?,
            endpoint,
            chunk_rows,
        })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    async fn predict_chunk(&self, request: PredictRequest) -> Result<Vec<Vec<f32>>> {
        let rows = request.instances.len();
        let resp = self
            .client
            .post(self.endpoint.clone())
            .json(&request)
            .send()
            .await
            .with_context(|| format!("request to {} failed", self.endpoint))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<ServingError>(&body)
                .map(|e| e.error)
                .unwrap_or(body);
            warn!("Model server error - status={}, detail={}", status, detail);
            bail!("model server returned {}: {}", status, detail);
        }

        let parsed: PredictResponse = resp
            .json()
            .await
            .with_context(|| format!("decoding predictions from {}", self.endpoint))?;
        check_row_count(rows, &parsed)?;
        Ok(parsed.predictions)
    }

    /// Sends the matrix in row chunks, at most `MAX_IN_FLIGHT` at a time, and
    /// returns predictions in row order. The first failed chunk aborts the run.
    pub async fn predict(&self, matrix: &PaddedMatrix) -> Result<Vec<Vec<f32>>> {
        let start = std::time::Instant::now();
        let requests = build_requests(matrix, self.chunk_rows);
        debug!(
            "Prediction starting - rows={}, width={}, chunks={}",
            matrix.rows,
            matrix.width,
            requests.len()
        );

        let tasks = requests.into_iter().map(|r| self.predict_chunk(r));
        let chunks = bounded_in_order(tasks, MAX_IN_FLIGHT).await?;
        let out: Vec<Vec<f32>> = chunks.into_iter().flatten().collect();

        info!(
            "Prediction completed - rows={}, duration={:.2}s",
            out.len(),
            start.elapsed().as_secs_f32()
        );
        Ok(out)
    }
}

async fn bounded_in_order<I, F, T>(tasks: I, limit: usize) -> Result<Vec<T>>
where
    I: IntoIterator<Item = F>,
    F: Future<Output = Result<T>>,
{
    stream::iter(tasks).buffered(limit.max(1)).try_collect().await
}

pub fn build_requests(matrix: &PaddedMatrix, chunk_rows: usize) -> Vec<PredictRequest> {
    let rows: Vec<Vec<i64>> = matrix
        .iter_rows()
        .map(|r| r.iter().map(|&i| i as i64).collect())
        .collect();
    rows.chunks(chunk_rows.max(1))
        .map(|c| PredictRequest { instances: c.to_vec() })
        .collect()
}

fn check_row_count(sent: usize, resp: &PredictResponse) -> Result<()> {
    if resp.predictions.len() != sent {
        return Err(anyhow!(
            "model returned {} predictions for {} rows",
            resp.predictions.len(),
            sent
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sequence::pad_sequences;

    #[test]
    fn requests_are_chunked_in_row_order() {
        let m = pad_sequences(&[vec![1], vec![2], vec![3]], 2);
        let reqs = build_requests(&m, 2);
        assert_eq!(reqs.len(), 2);
        assert_eq!(reqs[0].instances, vec![vec![1, 0], vec![2, 0]]);
        assert_eq!(reqs[1].instances, vec![vec![3, 0]]);
    }

    #[test]
    fn request_body_uses_instances_key() {
        let body = serde_json::to_value(PredictRequest { instances: vec![vec![4, 0]] }).unwrap();
        assert_eq!(body, serde_json::json!({ "instances": [[4, 0]] }));
    }

    #[test]
    fn mismatched_prediction_count_is_rejected() {
        let resp: PredictResponse =
            serde_json::from_str(r#"{"predictions": [[0.1, 0.9]]}"#).unwrap();
        assert!(check_row_count(1, &resp).is_ok());
        assert!(check_row_count(2, &resp).is_err());
    }

    #[test]
    fn endpoint_must_be_http() {
        assert!(ModelClient::new("ftp://models/predict", 8).is_err());
        assert!(ModelClient::new("not a url", 8).is_err());
        assert!(ModelClient::new(DEFAULT_MODEL_URL, 0).is_err());
        let c = ModelClient::new(DEFAULT_MODEL_URL, 8).unwrap();
        assert_eq!(c.endpoint().port(), Some(8501));
    }

    #[tokio::test]
    async fn chunk_calls_are_capped_and_ordered() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        let in_flight = AtomicUsize::new(0);
        let peak = AtomicUsize::new(0);
        let tasks = (0..10).map(|i| {
            let (in_flight, peak) = (&in_flight, &peak);
            async move {
                let now = in_flight.fetch_add(1, Ordering::SeqCst) + 1;
                peak.fetch_max(now, Ordering::SeqCst);
                for _ in 0..3 {
                    tokio::task::yield_now().await;
                }
                in_flight.fetch_sub(1, Ordering::SeqCst);
                Ok::<_, anyhow::Error>(i)
            }
        });

        let out = bounded_in_order(tasks, 3).await.unwrap();
        assert_eq!(out, (0..10).collect::<Vec<_>>());
        assert!(peak.load(Ordering::SeqCst) <= 3);
    }

    #[tokio::test]
    async fn failed_chunk_fails_the_whole_run() {
        let tasks = (0..4).map(|i| async move {
            if i == 2 {
                bail!("chunk {} rejected", i)
            }
            Ok(i)
        });
        let err = bounded_in_order(tasks, 2).await.unwrap_err();
        assert!(err.to_string().contains("chunk 2"));
    }

    #[tokio::test]
    async fn empty_matrix_needs_no_requests() {
        let c = ModelClient::new(DEFAULT_MODEL_URL, 8).unwrap();
        let m = pad_sequences(&[], 4);
        assert!(c.predict(&m).await.unwrap().is_empty());
    }
}
