pub mod envelope;

use anyhow::{Context, Result};
use reqwest::{Client, Method, Response, StatusCode};
use serde_json::Value;
use url::Url;

use crate::models::*;
use envelope::EnvelopeError;

// ─── Error types ────────────────────────────────────────────────────────────

#[derive(Debug, thiserror::Error)]
pub enum AdminError {
    #[error("HTTP {status}: {message}")]
    Api { status: u16, message: String },
    #[error("Unauthorized – check your API token")]
    Unauthorized,
    /// 2xx response whose body reports `success: false`.
    #[error("{0}")]
    Rejected(String),
    #[error("Unexpected response shape: {0}")]
    Envelope(#[from] EnvelopeError),
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

// ─── Client ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone)]
pub struct AdminClient {
    client: Client,
    api_url: Url,
    assets_url: Url,
    token: String,
}

impl AdminClient {
    pub fn new(api_url: &str, assets_url: &str, token: &str) -> Result<Self> {
        let api_url =
            Url::parse(api_url).with_context(|| format!("Invalid API URL: {api_url}"))?;
        let assets_url = Url::parse(assets_url)
            .with_context(|| format!("Invalid assets URL: {assets_url}"))?;

        let client = Client::builder()
            .user_agent("coursedesk/0.1.0")
            .build()?;

        Ok(Self {
            client,
            api_url,
            assets_url,
            token: token.to_string(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        let full = format!("/api{path}");
        self.api_url
            .join(&full)
            .with_context(|| format!("Bad API path: {path}"))
    }

    /// Resolve a stored asset path against the configured assets base.
    /// Already-absolute `http(s)` URLs pass through untouched; everything
    /// else is joined with duplicate slashes collapsed.
    pub fn asset_url(&self, stored: &str) -> String {
        if stored.starts_with("http://") || stored.starts_with("https://") {
            return stored.to_string();
        }
        let base = self.assets_url.as_str().trim_end_matches('/');
        let path: Vec<&str> = stored.split('/').filter(|s| !s.is_empty()).collect();
        format!("{base}/{}", path.join("/"))
    }

    async fn check_status(resp: Response) -> Result<Response, AdminError> {
        match resp.status() {
            StatusCode::UNAUTHORIZED => Err(AdminError::Unauthorized),
            s if s.is_client_error() || s.is_server_error() => {
                let status = s.as_u16();
                let text = resp.text().await.unwrap_or_default();
                // Prefer the server's human message over the raw body.
                let message = serde_json::from_str::<Value>(&text)
                    .ok()
                    .and_then(|v| envelope::message_of(&v))
                    .unwrap_or(text);
                tracing::warn!(status, %message, "API request failed");
                Err(AdminError::Api { status, message })
            }
            _ => Ok(resp),
        }
    }

    async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Response, AdminError> {
        let mut url = self.endpoint(path).map_err(AdminError::Other)?;
        for (k, v) in params {
            url.query_pairs_mut().append_pair(k, v);
        }
        let resp = self
            .client
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        Self::check_status(resp).await
    }

    async fn send_json<B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Response, AdminError> {
        let url = self.endpoint(path).map_err(AdminError::Other)?;
        let resp = self
            .client
            .request(method, url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;
        Self::check_status(resp).await
    }

    async fn delete_at(&self, path: &str) -> Result<MutationReceipt, AdminError> {
        let url = self.endpoint(path).map_err(AdminError::Other)?;
        let resp = self
            .client
            .delete(url)
            .bearer_auth(&self.token)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        Self::receipt(resp).await
    }

    async fn get_list<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<Vec<T>, AdminError> {
        let resp = self.get(path, params).await?;
        let body: Value = resp.json().await?;
        Ok(envelope::decode_list(body)?)
    }

    /// Parse a 2xx mutation response and promote `success: false` to an
    /// error carrying the server's message.
    async fn receipt(resp: Response) -> Result<MutationReceipt, AdminError> {
        let body: Value = resp.json().await?;
        let receipt = MutationReceipt {
            success: body.get("success").and_then(Value::as_bool).unwrap_or(true),
            message: envelope::message_of(&body),
        };
        if !receipt.success {
            let message = receipt
                .message
                .unwrap_or_else(|| "The server rejected the request".into());
            return Err(AdminError::Rejected(message));
        }
        Ok(receipt)
    }

    /// Send a draft as JSON, or as multipart with the draft's fields as
    /// text parts when an image file rides along.
    async fn send_draft<B: serde::Serialize>(
        &self,
        method: Method,
        path: &str,
        body: &B,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = match image {
            None => self.send_json(method, path, body).await?,
            Some(image_path) => {
                let mut form = reqwest::multipart::Form::new();
                let fields = serde_json::to_value(body)
                    .map_err(|e| AdminError::Other(anyhow::anyhow!("Bad draft body: {e}")))?;
                if let Some(map) = fields.as_object() {
                    for (k, v) in map {
                        let text = match v {
                            Value::String(s) => s.clone(),
                            other => other.to_string(),
                        };
                        form = form.text(k.clone(), text);
                    }
                }
                form = form.part("image", Self::file_part(image_path).await?);

                let url = self.endpoint(path).map_err(AdminError::Other)?;
                let resp = self
                    .client
                    .request(method, url)
                    .bearer_auth(&self.token)
                    .multipart(form)
                    .send()
                    .await?;
                Self::check_status(resp).await?
            }
        };
        Self::receipt(resp).await
    }

    async fn file_part(path: &std::path::Path) -> Result<reqwest::multipart::Part, AdminError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();
        let data = tokio::fs::read(path).await.map_err(|e| {
            AdminError::Other(anyhow::anyhow!("Cannot read '{}': {e}", path.display()))
        })?;
        Ok(reqwest::multipart::Part::bytes(data).file_name(filename))
    }

    // ── Specializations ─────────────────────────────────────────────────

    pub async fn list_specializations(&self) -> Result<Vec<Specialization>, AdminError> {
        self.get_list("/specializations", &[]).await
    }

    pub async fn create_specialization(
        &self,
        draft: &SpecializationDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        self.send_draft(Method::POST, "/specializations", draft, image)
            .await
    }

    pub async fn update_specialization(
        &self,
        id: u64,
        draft: &SpecializationDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        self.send_draft(Method::PUT, &format!("/specializations/{id}"), draft, image)
            .await
    }

    pub async fn delete_specialization(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/specializations/{id}")).await
    }

    pub async fn set_specialization_active(
        &self,
        id: u64,
        active: bool,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::POST,
                &format!("/specializations/{id}/toggle-active"),
                &serde_json::json!({ "isActive": active }),
            )
            .await?;
        Self::receipt(resp).await
    }

    // ── Courses ─────────────────────────────────────────────────────────

    pub async fn list_courses(
        &self,
        specialization_id: u64,
    ) -> Result<Vec<Course>, AdminError> {
        self.get_list(
            "/courses",
            &[("specializationId", specialization_id.to_string())],
        )
        .await
    }

    pub async fn create_course(
        &self,
        draft: &CourseDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        self.send_draft(Method::POST, "/courses", draft, image).await
    }

    pub async fn update_course(
        &self,
        id: u64,
        draft: &CourseDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        self.send_draft(Method::PUT, &format!("/courses/{id}"), draft, image)
            .await
    }

    pub async fn delete_course(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/courses/{id}")).await
    }

    pub async fn set_course_active(
        &self,
        id: u64,
        active: bool,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::POST,
                &format!("/courses/{id}/toggle-active"),
                &serde_json::json!({ "isActive": active }),
            )
            .await?;
        Self::receipt(resp).await
    }

    // ── Instructors ─────────────────────────────────────────────────────

    pub async fn list_instructors(&self, course_id: u64) -> Result<Vec<Instructor>, AdminError> {
        self.get_list("/instructors", &[("courseId", course_id.to_string())])
            .await
    }

    // ── Course levels ───────────────────────────────────────────────────

    pub async fn list_levels(&self, course_id: u64) -> Result<Vec<CourseLevel>, AdminError> {
        self.get_list("/course-levels", &[("courseId", course_id.to_string())])
            .await
    }

    pub async fn create_level(
        &self,
        course_id: u64,
        draft: &LevelDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        let mut body = serde_json::to_value(draft)
            .map_err(|e| AdminError::Other(anyhow::anyhow!("Bad level body: {e}")))?;
        body["courseId"] = course_id.into();
        self.send_draft(Method::POST, "/course-levels", &body, image)
            .await
    }

    pub async fn update_level(
        &self,
        id: u64,
        draft: &LevelDraft,
        image: Option<&std::path::Path>,
    ) -> Result<MutationReceipt, AdminError> {
        self.send_draft(Method::PUT, &format!("/course-levels/{id}"), draft, image)
            .await
    }

    pub async fn delete_level(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/course-levels/{id}")).await
    }

    pub async fn set_level_active(
        &self,
        id: u64,
        active: bool,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::POST,
                &format!("/course-levels/{id}/toggle-active"),
                &serde_json::json!({ "isActive": active }),
            )
            .await?;
        Self::receipt(resp).await
    }

    // ── Lessons ─────────────────────────────────────────────────────────

    pub async fn list_lessons(&self, level_id: u64) -> Result<Vec<Lesson>, AdminError> {
        self.get_list("/lessons", &[("courseLevelId", level_id.to_string())])
            .await
    }

    pub async fn create_lesson(
        &self,
        level_id: u64,
        draft: &LessonDraft,
    ) -> Result<MutationReceipt, AdminError> {
        let mut body = serde_json::to_value(draft)
            .map_err(|e| AdminError::Other(anyhow::anyhow!("Bad lesson body: {e}")))?;
        body["courseLevelId"] = level_id.into();
        let resp = self.send_json(Method::POST, "/lessons", &body).await?;
        Self::receipt(resp).await
    }

    pub async fn update_lesson(
        &self,
        id: u64,
        draft: &LessonDraft,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(Method::PUT, &format!("/lessons/{id}"), draft)
            .await?;
        Self::receipt(resp).await
    }

    pub async fn delete_lesson(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/lessons/{id}")).await
    }

    pub async fn set_lesson_active(
        &self,
        id: u64,
        active: bool,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::POST,
                &format!("/lessons/{id}/toggle-active"),
                &serde_json::json!({ "isActive": active }),
            )
            .await?;
        Self::receipt(resp).await
    }

    // ── Files ───────────────────────────────────────────────────────────

    pub async fn list_files(&self, level_id: u64) -> Result<Vec<FileAttachment>, AdminError> {
        self.get_list("/files", &[("courseLevelId", level_id.to_string())])
            .await
    }

    /// Upload a file for a course level. The backend wants the level id and
    /// the original file name as separate multipart fields alongside the
    /// bytes, and answers with the stored file's metadata.
    pub async fn upload_file(
        &self,
        level_id: u64,
        path: &std::path::Path,
    ) -> Result<FileAttachment, AdminError> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload")
            .to_string();

        let form = reqwest::multipart::Form::new()
            .text("courseLevelId", level_id.to_string())
            .text("originalFileName", filename.clone())
            .part("file", Self::file_part(path).await?);

        let url = self.endpoint("/files/upload").map_err(AdminError::Other)?;
        let resp = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .multipart(form)
            .send()
            .await?;
        let resp = Self::check_status(resp).await?;
        let body: Value = resp.json().await?;
        Ok(envelope::decode_item(body)?)
    }

    pub async fn delete_file(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/files/{id}")).await
    }

    // ── Quiz questions ──────────────────────────────────────────────────

    /// List a level's quiz questions. The endpoint reports an empty quiz as
    /// a success-shaped body carrying a message instead of an empty list;
    /// that sentinel is normalized to `Ok(vec![])` here.
    pub async fn list_quiz_questions(
        &self,
        level_id: u64,
    ) -> Result<Vec<QuizQuestion>, AdminError> {
        let resp = self
            .get("/quiz-questions", &[("courseLevelId", level_id.to_string())])
            .await?;
        let body: Value = resp.json().await?;
        if envelope::is_empty_quiz(&body) {
            return Ok(Vec::new());
        }
        Ok(envelope::decode_list(body)?)
    }

    pub async fn create_question(
        &self,
        level_id: u64,
        draft: &QuestionDraft,
    ) -> Result<MutationReceipt, AdminError> {
        let mut body = serde_json::to_value(draft)
            .map_err(|e| AdminError::Other(anyhow::anyhow!("Bad question body: {e}")))?;
        body["courseLevelId"] = level_id.into();
        let resp = self.send_json(Method::POST, "/quiz-questions", &body).await?;
        Self::receipt(resp).await
    }

    pub async fn update_question(
        &self,
        id: u64,
        draft: &QuestionDraft,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(Method::PUT, &format!("/quiz-questions/{id}"), draft)
            .await?;
        Self::receipt(resp).await
    }

    pub async fn delete_question(&self, id: u64) -> Result<MutationReceipt, AdminError> {
        self.delete_at(&format!("/quiz-questions/{id}")).await
    }

    // ── Settings ────────────────────────────────────────────────────────

    pub async fn get_contact_settings(&self) -> Result<ContactSettings, AdminError> {
        let resp = self.get("/settings/contact", &[]).await?;
        let body: Value = resp.json().await?;
        Ok(envelope::decode_item(body)?)
    }

    pub async fn get_all_settings(&self) -> Result<Vec<Setting>, AdminError> {
        self.get_list("/settings", &[]).await
    }

    pub async fn update_setting(
        &self,
        key: &str,
        value: &str,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::PUT,
                &format!("/settings/{key}"),
                &serde_json::json!({ "value": value }),
            )
            .await?;
        Self::receipt(resp).await
    }

    pub async fn add_setting(&self, key: &str, value: &str) -> Result<MutationReceipt, AdminError> {
        let resp = self
            .send_json(
                Method::POST,
                "/settings",
                &serde_json::json!({ "key": key, "value": value }),
            )
            .await?;
        Self::receipt(resp).await
    }

    pub async fn update_all_settings(
        &self,
        values: &std::collections::HashMap<String, String>,
    ) -> Result<MutationReceipt, AdminError> {
        let resp = self.send_json(Method::PUT, "/settings", values).await?;
        Self::receipt(resp).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> AdminClient {
        AdminClient::new(
            "https://admin.example.com",
            "https://cdn.example.com/media/",
            "token",
        )
        .unwrap()
    }

    #[test]
    fn relative_asset_paths_join_without_duplicate_slashes() {
        let c = client();
        assert_eq!(
            c.asset_url("/uploads/img.png"),
            "https://cdn.example.com/media/uploads/img.png"
        );
        assert_eq!(
            c.asset_url("uploads//img.png"),
            "https://cdn.example.com/media/uploads/img.png"
        );
    }

    #[test]
    fn absolute_asset_urls_pass_through() {
        let c = client();
        assert_eq!(
            c.asset_url("https://elsewhere.example.com/a.png"),
            "https://elsewhere.example.com/a.png"
        );
        assert_eq!(
            c.asset_url("http://elsewhere.example.com/a.png"),
            "http://elsewhere.example.com/a.png"
        );
    }
}
