//! Query parameter types for API handlers.

use detailhq_core::types::EntityId;
use serde::Deserialize;

/// `GET /customers?type=prospect&include_archived=true`
#[derive(Debug, Default, Deserialize)]
pub struct CustomerListParams {
    #[serde(rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub include_archived: bool,
}

/// `GET /tasks?view=overdue&user=alex&priority_sort=true`
#[derive(Debug, Default, Deserialize)]
pub struct TaskViewParams {
    pub view: Option<String>,
    pub user: Option<String>,
    #[serde(default)]
    pub priority_sort: bool,
}

/// `GET /sections?notebook_id=`
#[derive(Debug, Default, Deserialize)]
pub struct SectionListParams {
    pub notebook_id: Option<EntityId>,
}

/// `GET /notes/visible?notebook_id=&section=&q=`
///
/// Absent parameters fall back to the store's current selection.
#[derive(Debug, Default, Deserialize)]
pub struct VisibleNotesParams {
    pub notebook_id: Option<EntityId>,
    /// `all`, `quick`, or a section id.
    pub section: Option<String>,
    pub q: Option<String>,
}

/// `GET /library?category=`
#[derive(Debug, Default, Deserialize)]
pub struct CategoryParams {
    pub category: Option<String>,
}

/// `GET /files?path=reports`
#[derive(Debug, Default, Deserialize)]
pub struct PathParams {
    pub path: Option<String>,
}

/// `POST /files?name=front.jpg&path=customers/media`
#[derive(Debug, Deserialize)]
pub struct UploadParams {
    pub name: String,
    #[serde(default = "default_upload_path")]
    pub path: String,
}

fn default_upload_path() -> String {
    "uploads".to_string()
}
