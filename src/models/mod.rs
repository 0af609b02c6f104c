use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Catalog ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Specialization {
    pub id: u64,
    pub name: Option<String>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub specialization_id: Option<u64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instructor {
    pub id: u64,
    pub name: Option<String>,
    /// IDs of the course levels this instructor teaches.
    #[serde(default)]
    pub level_ids: Vec<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseLevel {
    pub id: u64,
    pub name: Option<String>,
    pub order: Option<i64>,
    #[serde(rename = "priceUSD")]
    pub price_usd: Option<f64>,
    #[serde(rename = "priceSAR")]
    pub price_sar: Option<f64>,
    #[serde(default)]
    pub is_free: bool,
    pub preview_url: Option<String>,
    pub download_url: Option<String>,
    pub instructor_id: Option<u64>,
    pub image_url: Option<String>,
    #[serde(default)]
    pub is_active: bool,
}

// ─── Level content ──────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: u64,
    pub title: Option<String>,
    pub description: Option<String>,
    pub youtube_url: Option<String>,
    /// 11-character video id derived from `youtube_url`.
    pub youtube_id: Option<String>,
    pub google_drive_url: Option<String>,
    pub duration_sec: Option<u64>,
    pub order_index: Option<i64>,
    #[serde(default)]
    pub is_free_preview: bool,
    #[serde(default)]
    pub is_active: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FileAttachment {
    pub id: u64,
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub mime_type: Option<String>,
    /// Size in bytes.
    pub size: Option<u64>,
    pub url: Option<String>,
    pub course_level_id: Option<u64>,
    pub created_at: Option<DateTime<Utc>>,
}

impl FileAttachment {
    /// Human label for the MIME type, e.g. "PDF" or "Image".
    pub fn kind_label(&self) -> &'static str {
        kind_label(self.mime_type.as_deref().unwrap_or(""))
    }

    /// Size formatted by repeated division by 1024, two decimals above bytes.
    pub fn human_size(&self) -> String {
        human_size(self.size.unwrap_or(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    pub id: u64,
    pub text: Option<String>,
    pub order: Option<i64>,
    #[serde(default)]
    pub options: Vec<QuizOption>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizOption {
    /// Absent on options composed locally in the question editor.
    pub id: Option<u64>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

// ─── Settings ───────────────────────────────────────────────────────────────

/// A single key/value pair from the app-wide settings store. Values are
/// always strings on the wire, booleans included ("true"/"false").
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Setting {
    pub key: String,
    #[serde(default)]
    pub value: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// The two well-known contact keys surfaced on the settings screen.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContactSettings {
    pub whatsapp: Option<String>,
    pub telegram: Option<String>,
}

// ─── Mutation receipt ───────────────────────────────────────────────────────

/// Returned by every create/update/delete/toggle endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MutationReceipt {
    #[serde(default)]
    pub success: bool,
    pub message: Option<String>,
}

// ─── Create/update payloads ─────────────────────────────────────────────────
//
// Bodies sent to the create and update endpoints. `None` fields are omitted
// so partial updates never clobber server state.

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SpecializationDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub specialization_id: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LevelDraft {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    #[serde(rename = "priceUSD", skip_serializing_if = "Option::is_none")]
    pub price_usd: Option<f64>,
    #[serde(rename = "priceSAR", skip_serializing_if = "Option::is_none")]
    pub price_sar: Option<f64>,
    pub is_free: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub download_url: Option<String>,
    pub instructor_id: u64,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LessonDraft {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub youtube_url: String,
    /// Derived client-side from `youtube_url` before submit.
    pub youtube_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_drive_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_sec: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_index: Option<i64>,
    pub is_free_preview: bool,
}

#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuestionDraft {
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order: Option<i64>,
    pub options: Vec<QuizOption>,
}

// ─── Display helpers ────────────────────────────────────────────────────────

pub fn kind_label(mime: &str) -> &'static str {
    if mime == "application/pdf" {
        return "PDF";
    }
    if mime.starts_with("image/") {
        return "Image";
    }
    if mime.starts_with("video/") {
        return "Video";
    }
    if mime.starts_with("audio/") {
        return "Audio";
    }
    match mime {
        "application/zip"
        | "application/x-zip-compressed"
        | "application/x-rar-compressed"
        | "application/x-7z-compressed"
        | "application/gzip"
        | "application/x-tar" => "Archive",
        "application/msword"
        | "application/vnd.openxmlformats-officedocument.wordprocessingml.document"
        | "application/vnd.ms-excel"
        | "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
        | "application/vnd.ms-powerpoint"
        | "application/vnd.openxmlformats-officedocument.presentationml.presentation" => "Document",
        m if m.starts_with("text/") => "Document",
        _ => "File",
    }
}

pub fn human_size(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.2} {}", UNITS[unit])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_formats_with_two_decimals() {
        assert_eq!(human_size(2_097_152), "2.00 MB");
        assert_eq!(human_size(1536), "1.50 KB");
        assert_eq!(human_size(512), "512 B");
        assert_eq!(human_size(0), "0 B");
    }

    #[test]
    fn mime_kinds() {
        assert_eq!(kind_label("application/pdf"), "PDF");
        assert_eq!(kind_label("image/png"), "Image");
        assert_eq!(kind_label("video/mp4"), "Video");
        assert_eq!(kind_label("application/zip"), "Archive");
        assert_eq!(kind_label("text/plain"), "Document");
        assert_eq!(kind_label("application/octet-stream"), "File");
    }

    #[test]
    fn pdf_attachment_display() {
        let file = FileAttachment {
            id: 1,
            name: Some("syllabus.pdf".into()),
            mime_type: Some("application/pdf".into()),
            size: Some(2_097_152),
            url: Some("/uploads/syllabus.pdf".into()),
            course_level_id: Some(42),
            created_at: None,
        };
        assert_eq!(file.kind_label(), "PDF");
        assert_eq!(file.human_size(), "2.00 MB");
    }
}
