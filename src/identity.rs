use uuid::Uuid;

use crate::error::AgentError;

/// Picks the device identity: the explicit id, then the legacy `DEVICE_ID`
/// value, then a fresh UUID when generation is allowed. Blank values count
/// as absent.
pub fn resolve_device_id(
    explicit: Option<&str>,
    legacy: Option<&str>,
    generate: bool,
) -> Result<String, AgentError> {
    let given = [explicit, legacy]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|id| !id.is_empty());

    match given {
        Some(id) => Ok(id.to_string()),
        None if generate => Ok(Uuid::new_v4().to_string()),
        None => Err(AgentError::MissingIdentity(
            "the IOT_DEVICE_ID env variable should be defined, set it with 'export IOT_DEVICE_ID=my-id'"
                .to_string(),
        )),
    }
}
