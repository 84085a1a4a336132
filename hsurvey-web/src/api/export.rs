//! On-demand snapshot of the primary store into the fallback file

use axum::extract::State;
use tracing::error;

use crate::store::ExportOutcome;
use crate::AppState;

/// GET /export
///
/// Always answers 200 with a status message; failures are reported in the text.
pub async fn export_data(State(state): State<AppState>) -> String {
    match state.store.export_all().await {
        Ok(ExportOutcome::Exported { records, path }) => {
            format!("✅ Exported {} responses to {}", records, path.display())
        }
        Ok(ExportOutcome::FallbackOnly { path }) => {
            format!("ℹ Data is being saved directly to CSV ({})", path.display())
        }
        Err(e) => {
            error!("Export failed: {}", e);
            format!(
                "❌ Database error: {}. Data is being saved to CSV ({}).",
                e,
                state.store.fallback_path().display()
            )
        }
    }
}
