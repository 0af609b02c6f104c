//! Client-side validation: the staged YouTube link check that gates lesson
//! and level preview URLs, plus the local form rules that run before any
//! network call.

use crate::models::QuizOption;

// ─── Link verdict ───────────────────────────────────────────────────────────

/// Outcome of one validation cycle over a preview URL. `is_valid` covers
/// syntax and shape; `exists` is settled by the async thumbnail probe;
/// `checking` is true while that probe is in flight.
#[derive(Debug, Clone, Default)]
pub struct LinkCheck {
    pub is_valid: bool,
    pub message: String,
    pub checking: bool,
    pub exists: bool,
}

impl LinkCheck {
    fn invalid(message: &str) -> Self {
        Self {
            is_valid: false,
            message: message.to_string(),
            checking: false,
            exists: false,
        }
    }

    /// Strict submit gate: well-formed is not enough, the video must exist.
    pub fn allows_save(&self) -> bool {
        self.is_valid && self.exists && !self.checking
    }
}

// ─── Format stage ───────────────────────────────────────────────────────────

/// Steps 1–3 of the cycle: scheme, host, and id extraction. Returns the
/// 11-character video id on success, or the failed verdict with its
/// specific message.
pub fn check_format(url: &str) -> Result<String, LinkCheck> {
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(LinkCheck::invalid("URL must start with http:// or https://"));
    }

    let parsed = url::Url::parse(url)
        .map_err(|_| LinkCheck::invalid("URL could not be parsed"))?;
    let host = parsed.host_str().unwrap_or("").to_lowercase();
    if !host.contains("youtube.com") && !host.contains("youtu.be") {
        return Err(LinkCheck::invalid("Only YouTube links are accepted"));
    }

    match extract_video_id(&parsed) {
        Some(id) => Ok(id),
        None => Err(LinkCheck::invalid(
            "Could not find an 11-character YouTube video id in the URL",
        )),
    }
}

/// Pull the video id out of the recognized URL shapes: `watch?v=`,
/// `/embed/`, `/v/`, `/shorts/`, and `youtu.be/`.
pub fn extract_video_id(url: &url::Url) -> Option<String> {
    let host = url.host_str().unwrap_or("").to_lowercase();

    let candidate: Option<String> = if host.contains("youtu.be") {
        url.path_segments()
            .and_then(|mut segments| segments.next().map(str::to_string))
    } else if let Some((_, v)) = url.query_pairs().find(|(k, _)| k == "v") {
        Some(v.into_owned())
    } else {
        let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
        segments
            .windows(2)
            .find(|w| matches!(w[0], "embed" | "v" | "shorts"))
            .map(|w| w[1].to_string())
    };

    candidate.filter(|id| {
        id.len() == 11
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    })
}

// ─── Existence stage ────────────────────────────────────────────────────────

pub fn thumbnail_url(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/default.jpg")
}

/// Probe the video's default thumbnail. 200 means the video is there, 404
/// means the link is well-formed but the video is gone; anything else is
/// inconclusive and accepted with a warning.
pub async fn probe_video(client: &reqwest::Client, video_id: &str) -> LinkCheck {
    let resolved = |exists: bool, message: &str| LinkCheck {
        is_valid: true,
        message: message.to_string(),
        checking: false,
        exists,
    };

    match client.get(thumbnail_url(video_id)).send().await {
        Ok(resp) if resp.status().as_u16() == 200 => resolved(true, "Video available"),
        Ok(resp) if resp.status().as_u16() == 404 => resolved(
            false,
            "Link is well-formed but the video is missing or deleted",
        ),
        Ok(resp) => {
            tracing::debug!(status = resp.status().as_u16(), "thumbnail probe inconclusive");
            resolved(true, "Could not confirm the video exists")
        }
        Err(e) => {
            tracing::debug!(error = %e, "thumbnail probe failed");
            resolved(true, "Could not confirm the video exists")
        }
    }
}

// ─── Local form rules ───────────────────────────────────────────────────────

pub fn require_nonempty(label: &str, value: &str) -> Result<(), String> {
    if value.trim().is_empty() {
        Err(format!("{label} is required"))
    } else {
        Ok(())
    }
}

/// A quiz question must offer at least two options with exactly one marked
/// correct. Enforced here; the backend does not re-verify.
pub fn validate_question(text: &str, options: &[QuizOption]) -> Result<(), String> {
    require_nonempty("Question text", text)?;
    if options.len() < 2 {
        return Err("A question needs at least two options".into());
    }
    if options.iter().any(|o| o.text.trim().is_empty()) {
        return Err("Every option needs text".into());
    }
    let correct = options.iter().filter(|o| o.is_correct).count();
    if correct != 1 {
        return Err("Exactly one option must be marked correct".into());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn option(text: &str, correct: bool) -> QuizOption {
        QuizOption {
            id: None,
            text: text.to_string(),
            is_correct: correct,
        }
    }

    #[test]
    fn watch_url_yields_the_video_id() {
        let id = check_format("https://www.youtube.com/watch?v=dQw4w9WgXcQ").unwrap();
        assert_eq!(id, "dQw4w9WgXcQ");
        assert_eq!(id.len(), 11);
    }

    #[test]
    fn bad_scheme_is_rejected() {
        let err = check_format("ftp://youtube.com/watch?v=dQw4w9WgXcQ").unwrap_err();
        assert!(!err.is_valid);
        assert!(err.message.contains("http"));
    }

    #[test]
    fn wrong_domain_is_rejected() {
        let err = check_format("https://vimeo.com/12345").unwrap_err();
        assert!(!err.is_valid);
        assert!(err.message.contains("YouTube"));
    }

    #[test]
    fn short_id_is_rejected() {
        let err = check_format("https://youtu.be/short").unwrap_err();
        assert!(!err.is_valid);
    }

    #[test]
    fn all_recognized_shapes_extract() {
        for url in [
            "https://youtu.be/dQw4w9WgXcQ",
            "https://www.youtube.com/embed/dQw4w9WgXcQ",
            "https://www.youtube.com/v/dQw4w9WgXcQ",
            "https://www.youtube.com/shorts/dQw4w9WgXcQ",
            "https://m.youtube.com/watch?v=dQw4w9WgXcQ&t=10s",
        ] {
            assert_eq!(check_format(url).unwrap(), "dQw4w9WgXcQ", "{url}");
        }
    }

    #[test]
    fn save_gate_requires_existence() {
        let mut check = LinkCheck {
            is_valid: true,
            message: String::new(),
            checking: false,
            exists: false,
        };
        assert!(!check.allows_save());
        check.exists = true;
        assert!(check.allows_save());
        check.checking = true;
        assert!(!check.allows_save());
    }

    #[test]
    fn two_options_one_correct_is_valid() {
        let options = vec![option("A", false), option("B", true)];
        assert!(validate_question("Pick one", &options).is_ok());
    }

    #[test]
    fn single_option_question_is_rejected_locally() {
        let options = vec![option("A", false)];
        assert!(validate_question("Pick one", &options).is_err());
    }

    #[test]
    fn exactly_one_correct_is_enforced() {
        let none = vec![option("A", false), option("B", false)];
        let both = vec![option("A", true), option("B", true)];
        assert!(validate_question("Q", &none).is_err());
        assert!(validate_question("Q", &both).is_err());
    }

    #[test]
    fn thumbnail_url_shape() {
        assert_eq!(
            thumbnail_url("dQw4w9WgXcQ"),
            "https://img.youtube.com/vi/dQw4w9WgXcQ/default.jpg"
        );
    }
}
