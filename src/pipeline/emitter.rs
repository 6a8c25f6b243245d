use std::fs;
use std::path::Path;
use tracing::{info, warn};

use super::shaper::Table;
use crate::error::{Result, TableError};

/// `<script>window.<global> = <json>;</script>` for the table.
///
/// `</` inside the JSON is written as `<\/` so rendered markup such as
/// `</a>` can never be read as the end of the script element.
pub fn render_payload(table: &Table, global_name: &str) -> Result<String> {
    let json = serde_json::to_string_pretty(table)?;
    Ok(format!(
        "<script>window.{} = {};</script>",
        global_name,
        json.replace("</", "<\\/")
    ))
}

/// Replaces the first `marker` in `template` with `payload`.
///
/// Returns `None` when the marker is absent.
pub fn inject(template: &str, marker: &str, payload: &str) -> Option<String> {
    let start = template.find(marker)?;
    let end = start + marker.len();
    let mut out = String::with_capacity(template.len() - marker.len() + payload.len());
    out.push_str(&template[..start]);
    out.push_str(payload);
    out.push_str(&template[end..]);
    Some(out)
}

/// Reads the template, injects the table and writes the page to `output`.
pub fn emit(template_path: &Path, output: &Path, marker: &str, global_name: &str, table: &Table) -> Result<()> {
    let template =
        fs::read_to_string(template_path).map_err(|e| TableError::io(template_path, e))?;

    let occurrences = template.matches(marker).count();
    if occurrences == 0 {
        return Err(TableError::MissingMarker {
            path: template_path.to_path_buf(),
            marker: marker.to_string(),
        });
    }
    if occurrences > 1 {
        warn!(
            "Template {} contains \"{}\" {} times; only the first is replaced",
            template_path.display(),
            marker,
            occurrences
        );
    }

    let payload = render_payload(table, global_name)?;
    let page = inject(&template, marker, &payload).ok_or_else(|| TableError::MissingMarker {
        path: template_path.to_path_buf(),
        marker: marker.to_string(),
    })?;

    if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| TableError::io(parent, e))?;
    }
    fs::write(output, page).map_err(|e| TableError::io(output, e))?;
    info!(output = %output.display(), bytes = template.len() + payload.len() - marker.len(), "Wrote page");
    Ok(())
}
