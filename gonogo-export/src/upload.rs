use std::thread;
use std::time::Duration;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::ExportError;

const UPLOAD_TIMEOUT: Duration = Duration::from_secs(8);

/// JSON body the collection endpoint expects.
#[derive(Debug, Serialize)]
pub struct UploadPayload<'a> {
    #[serde(rename = "experimentID")]
    pub experiment_id: &'a str,
    pub filename: &'a str,
    pub data: &'a str,
}

/// Single POST of the CSV snapshot. No retry; a non-OK status is an error
/// for the caller to log.
pub fn upload_csv(
    endpoint: &str,
    experiment_id: &str,
    filename: &str,
    data: &str,
) -> Result<(), ExportError> {
    let client = reqwest::blocking::Client::builder()
        .timeout(UPLOAD_TIMEOUT)
        .build()?;
    let response = client
        .post(endpoint)
        .json(&UploadPayload {
            experiment_id,
            filename,
            data,
        })
        .send()?;
    if !response.status().is_success() {
        return Err(ExportError::UploadStatus(response.status()));
    }
    info!(%filename, "data accepted by collection endpoint");
    Ok(())
}

/// Fire-and-forget upload on a detached thread. The outcome is logged and
/// never observed by the caller; local data is unaffected either way.
pub fn spawn_upload(endpoint: String, experiment_id: String, filename: String, data: String) {
    thread::spawn(move || {
        if let Err(err) = upload_csv(&endpoint, &experiment_id, &filename, &data) {
            warn!(%filename, %err, "upload failed, local data unaffected");
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn payload_uses_the_endpoint_field_names() {
        let payload = UploadPayload {
            experiment_id: "Cb1DhSdND5ek",
            filename: "participant_1.csv",
            data: "a,b\n1,2",
        };
        let value = serde_json::to_value(&payload).unwrap();
        assert_eq!(value["experimentID"], "Cb1DhSdND5ek");
        assert_eq!(value["filename"], "participant_1.csv");
        assert_eq!(value["data"], "a,b\n1,2");
    }
}
