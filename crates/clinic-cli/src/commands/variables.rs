use clinic_ai::variables::CATALOG;
use serde_json::json;

use crate::cli::GlobalFlags;
use crate::output::output;

/// Handle `clinic variables`.
pub fn handle(flags: &GlobalFlags) -> anyhow::Result<()> {
    output(&json!({ "variables": CATALOG }), flags.format)
}
