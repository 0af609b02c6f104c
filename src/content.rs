use crate::api::{AdminClient, AdminError};
use crate::models::{FileAttachment, Lesson, QuizQuestion};

// ─── Bundle ─────────────────────────────────────────────────────────────────

/// Everything attached to one course level. Each collection stands on its
/// own: a failed sub-fetch leaves its list empty and records its error
/// without touching the other two.
#[derive(Debug, Clone, Default)]
pub struct ContentBundle {
    pub level_id: u64,
    pub lessons: Vec<Lesson>,
    pub files: Vec<FileAttachment>,
    pub questions: Vec<QuizQuestion>,
    pub lesson_error: Option<String>,
    pub file_error: Option<String>,
    pub question_error: Option<String>,
}

impl ContentBundle {
    pub fn first_error(&self) -> Option<&str> {
        self.lesson_error
            .as_deref()
            .or(self.file_error.as_deref())
            .or(self.question_error.as_deref())
    }
}

// ─── Loader ─────────────────────────────────────────────────────────────────

/// Fetch a level's lessons, files, and quiz questions. The three requests
/// run concurrently and are independent; no ordering between them.
pub async fn load_content(client: &AdminClient, level_id: u64) -> ContentBundle {
    let (lessons, files, questions) = tokio::join!(
        client.list_lessons(level_id),
        client.list_files(level_id),
        client.list_quiz_questions(level_id),
    );

    let mut bundle = ContentBundle {
        level_id,
        ..ContentBundle::default()
    };

    match lessons {
        Ok(lessons) => bundle.lessons = lessons,
        Err(e) => bundle.lesson_error = Some(describe(&e, "lessons")),
    }
    match files {
        Ok(files) => bundle.files = filter_to_level(files, level_id),
        Err(e) => bundle.file_error = Some(describe(&e, "files")),
    }
    match questions {
        Ok(questions) => bundle.questions = questions,
        Err(e) => bundle.question_error = Some(describe(&e, "quiz questions")),
    }

    bundle
}

fn describe(e: &AdminError, what: &str) -> String {
    format!("fetching {what}: {e}")
}

/// The file endpoint has been observed returning files beyond the requested
/// level; keep only rows that actually belong to it.
fn filter_to_level(files: Vec<FileAttachment>, level_id: u64) -> Vec<FileAttachment> {
    files
        .into_iter()
        .filter(|f| f.course_level_id == Some(level_id))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(id: u64, level: Option<u64>) -> FileAttachment {
        FileAttachment {
            id,
            name: Some(format!("f{id}")),
            mime_type: Some("application/pdf".into()),
            size: Some(2_097_152),
            url: None,
            course_level_id: level,
            created_at: None,
        }
    }

    #[test]
    fn over_returned_files_are_dropped() {
        let files = vec![file(1, Some(42)), file(2, Some(7)), file(3, None)];
        let kept = filter_to_level(files, 42);
        assert_eq!(kept.len(), 1);
        assert_eq!(kept[0].id, 1);
        assert_eq!(kept[0].kind_label(), "PDF");
        assert_eq!(kept[0].human_size(), "2.00 MB");
    }

    #[test]
    fn bundle_reports_first_error() {
        let bundle = ContentBundle {
            file_error: Some("fetching files: boom".into()),
            ..ContentBundle::default()
        };
        assert_eq!(bundle.first_error(), Some("fetching files: boom"));
        assert!(ContentBundle::default().first_error().is_none());
    }
}
