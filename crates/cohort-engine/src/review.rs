// SPDX-FileCopyrightText: 2026 Cohort Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Human review of generated content.
//!
//! Thin typed layer over the content lifecycle: edit a draft, approve it,
//! and read whatever is currently live. Storage enforces the transitions;
//! this module adds body validation and typed content kinds.

use cohort_core::{CohortError, ContentType};
use cohort_storage::models::DashboardContentRow;
use cohort_storage::queries::content;
use cohort_storage::Database;
use tracing::info;

/// Replace a draft's body with reviewer-edited JSON.
///
/// The body must be a JSON object; the edit is rejected once the row is
/// approved.
pub async fn edit_content(db: &Database, id: &str, new_body: &str) -> Result<(), CohortError> {
    let parsed: serde_json::Value = serde_json::from_str(new_body).map_err(|e| {
        CohortError::InvalidTransition {
            id: id.to_string(),
            reason: format!("edited body is not valid JSON: {e}"),
        }
    })?;
    if !parsed.is_object() {
        return Err(CohortError::InvalidTransition {
            id: id.to_string(),
            reason: "edited body must be a JSON object".to_string(),
        });
    }
    content::update_body(db, id, new_body).await?;
    info!(content_id = %id, "content draft edited");
    Ok(())
}

/// Approve a content row, making it the single active row of its type.
pub async fn approve_content(db: &Database, id: &str) -> Result<(), CohortError> {
    content::approve(db, id).await?;
    info!(content_id = %id, "content approved and activated");
    Ok(())
}

/// The currently active content of the given type, if any.
pub async fn active_content(
    db: &Database,
    content_type: ContentType,
) -> Result<Option<DashboardContentRow>, CohortError> {
    content::active(db, &content_type.to_string()).await
}
