use crate::services::files::FileEntry;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListFilesResponse {
    pub current_path: String,
    pub files: Vec<FileEntry>,
}
