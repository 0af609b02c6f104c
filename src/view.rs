//! Client-side list shaping: filter → sort → paginate, as one pure
//! function. All table and card screens derive their visible page from the
//! raw collection through [`view`]; nothing here touches the network or
//! mutates state.

use chrono::{DateTime, Utc};
use std::cmp::Ordering;

use crate::models::{
    Course, CourseLevel, FileAttachment, Lesson, QuizQuestion, Setting, Specialization,
};

// ─── Query parameters ───────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDir {
    #[default]
    Asc,
    Desc,
}

impl SortDir {
    pub fn toggle(self) -> Self {
        match self {
            Self::Asc => Self::Desc,
            Self::Desc => Self::Asc,
        }
    }

    pub fn arrow(self) -> &'static str {
        match self {
            Self::Asc => "↑",
            Self::Desc => "↓",
        }
    }
}

/// View parameters for one collection. A field filter whose value is empty
/// or `"all"` is inactive.
#[derive(Debug, Clone)]
pub struct ViewQuery {
    pub search_term: String,
    pub field_filters: Vec<(String, String)>,
    pub sort_key: String,
    pub sort_dir: SortDir,
    /// 1-based.
    pub page: usize,
    pub page_size: usize,
}

impl ViewQuery {
    pub fn sorted_by(key: &str) -> Self {
        Self {
            search_term: String::new(),
            field_filters: Vec::new(),
            sort_key: key.to_string(),
            sort_dir: SortDir::Asc,
            page: 1,
            page_size: 10,
        }
    }

    /// Reset to the first page; called whenever search, filters, sort, or
    /// page size change so the visible page stays in range.
    pub fn rewind(&mut self) {
        self.page = 1;
    }
}

#[derive(Debug, Clone)]
pub struct ViewPage<T> {
    pub page_items: Vec<T>,
    pub total_count: usize,
    pub total_pages: usize,
}

// ─── Item contract ──────────────────────────────────────────────────────────

/// Sort value of one item under one key. Comparisons are only meaningful
/// within a variant; mismatched or absent values compare equal, preserving
/// the collection's underlying order.
#[derive(Debug, Clone)]
pub enum SortValue {
    None,
    Text(String),
    Number(f64),
    Date(DateTime<Utc>),
}

impl SortValue {
    fn compare(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => a.to_lowercase().cmp(&b.to_lowercase()),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            _ => Ordering::Equal,
        }
    }
}

pub trait ViewItem {
    /// Fields the free-text search runs over.
    fn search_text(&self) -> Vec<String>;
    /// Value for the given sort key; `SortValue::None` for unknown keys.
    fn sort_value(&self, key: &str) -> SortValue;
    /// Value compared against an active field filter; `None` when the key
    /// does not apply to this type.
    fn field(&self, key: &str) -> Option<String>;
}

// ─── The transform ──────────────────────────────────────────────────────────

/// Derive the visible page: filter, then sort, then slice. Pure — identical
/// input yields identical output.
pub fn view<T: ViewItem + Clone>(items: &[T], query: &ViewQuery) -> ViewPage<T> {
    let term = query.search_term.trim().to_lowercase();

    let mut kept: Vec<T> = items
        .iter()
        .filter(|item| {
            let matches_search = term.is_empty()
                || item
                    .search_text()
                    .iter()
                    .any(|text| text.to_lowercase().contains(&term));
            let matches_fields = query.field_filters.iter().all(|(key, wanted)| {
                if wanted.is_empty() || wanted == "all" {
                    return true;
                }
                item.field(key).as_deref() == Some(wanted.as_str())
            });
            matches_search && matches_fields
        })
        .cloned()
        .collect();

    // Stable sort: ties keep the underlying collection order.
    kept.sort_by(|a, b| {
        let ord = a
            .sort_value(&query.sort_key)
            .compare(&b.sort_value(&query.sort_key));
        match query.sort_dir {
            SortDir::Asc => ord,
            SortDir::Desc => ord.reverse(),
        }
    });

    let total_count = kept.len();
    let page_size = query.page_size.max(1);
    let total_pages = total_count.div_ceil(page_size);
    let start = query.page.saturating_sub(1).saturating_mul(page_size);
    let page_items: Vec<T> = if start >= total_count {
        Vec::new()
    } else {
        kept[start..start.saturating_add(page_size).min(total_count)].to_vec()
    };

    ViewPage {
        page_items,
        total_count,
        total_pages,
    }
}

// ─── Item impls ─────────────────────────────────────────────────────────────

fn active_str(active: bool) -> String {
    if active { "active" } else { "inactive" }.to_string()
}

impl ViewItem for Specialization {
    fn search_text(&self) -> Vec<String> {
        self.name.iter().cloned().collect()
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "name" => SortValue::Text(self.name.clone().unwrap_or_default()),
            _ => SortValue::None,
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(active_str(self.is_active)),
            _ => None,
        }
    }
}

impl ViewItem for Course {
    fn search_text(&self) -> Vec<String> {
        self.title
            .iter()
            .chain(self.description.iter())
            .cloned()
            .collect()
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "title" => SortValue::Text(self.title.clone().unwrap_or_default()),
            _ => SortValue::None,
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(active_str(self.is_active)),
            _ => None,
        }
    }
}

impl ViewItem for CourseLevel {
    fn search_text(&self) -> Vec<String> {
        self.name.iter().cloned().collect()
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "name" => SortValue::Text(self.name.clone().unwrap_or_default()),
            "order" => SortValue::Number(self.order.unwrap_or(0) as f64),
            "price" => SortValue::Number(self.price_usd.unwrap_or(0.0)),
            _ => SortValue::None,
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(active_str(self.is_active)),
            "access" => Some(if self.is_free { "free" } else { "paid" }.to_string()),
            _ => None,
        }
    }
}

impl ViewItem for Lesson {
    fn search_text(&self) -> Vec<String> {
        self.title
            .iter()
            .chain(self.description.iter())
            .cloned()
            .collect()
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "title" => SortValue::Text(self.title.clone().unwrap_or_default()),
            "order" => SortValue::Number(self.order_index.unwrap_or(0) as f64),
            "duration" => SortValue::Number(self.duration_sec.unwrap_or(0) as f64),
            _ => SortValue::None,
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "status" => Some(active_str(self.is_active)),
            "preview" => Some(if self.is_free_preview { "free" } else { "paid" }.to_string()),
            _ => None,
        }
    }
}

impl ViewItem for FileAttachment {
    fn search_text(&self) -> Vec<String> {
        self.name.iter().cloned().collect()
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "name" => SortValue::Text(self.name.clone().unwrap_or_default()),
            "size" => SortValue::Number(self.size.unwrap_or(0) as f64),
            // Missing timestamps sort as the epoch.
            "created" => SortValue::Date(self.created_at.unwrap_or(DateTime::UNIX_EPOCH)),
            _ => SortValue::None,
        }
    }

    fn field(&self, key: &str) -> Option<String> {
        match key {
            "kind" => Some(self.kind_label().to_string()),
            _ => None,
        }
    }
}

impl ViewItem for QuizQuestion {
    fn search_text(&self) -> Vec<String> {
        let mut texts: Vec<String> = self.text.iter().cloned().collect();
        texts.extend(self.options.iter().map(|o| o.text.clone()));
        texts
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "order" => SortValue::Number(self.order.unwrap_or(0) as f64),
            "text" => SortValue::Text(self.text.clone().unwrap_or_default()),
            _ => SortValue::None,
        }
    }

    fn field(&self, _key: &str) -> Option<String> {
        None
    }
}

impl ViewItem for Setting {
    fn search_text(&self) -> Vec<String> {
        vec![self.key.clone(), self.value.clone()]
    }

    fn sort_value(&self, key: &str) -> SortValue {
        match key {
            "key" => SortValue::Text(self.key.clone()),
            "updated" => SortValue::Date(self.updated_at.unwrap_or(DateTime::UNIX_EPOCH)),
            _ => SortValue::None,
        }
    }

    fn field(&self, _key: &str) -> Option<String> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: u64, title: &str, order: i64, active: bool) -> Lesson {
        Lesson {
            id,
            title: Some(title.to_string()),
            description: None,
            youtube_url: None,
            youtube_id: None,
            google_drive_url: None,
            duration_sec: Some(60 * id),
            order_index: Some(order),
            is_free_preview: false,
            is_active: active,
        }
    }

    fn sample() -> Vec<Lesson> {
        vec![
            lesson(1, "Intro to Limits", 2, true),
            lesson(2, "Derivatives", 1, true),
            lesson(3, "Integrals", 3, false),
            lesson(4, "limits revisited", 4, true),
        ]
    }

    fn query() -> ViewQuery {
        ViewQuery {
            page_size: 10,
            ..ViewQuery::sorted_by("order")
        }
    }

    #[test]
    fn identity_when_no_filter_is_active() {
        let items = sample();
        let page = view(&items, &query());
        assert_eq!(page.total_count, items.len());
        let ids: Vec<u64> = page.page_items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![2, 1, 3, 4]);
    }

    #[test]
    fn search_is_case_insensitive_and_complete() {
        let items = sample();
        let q = ViewQuery {
            search_term: "LIMITS".into(),
            ..query()
        };
        let page = view(&items, &q);
        assert_eq!(page.total_count, 2);
        for item in &page.page_items {
            assert!(item
                .search_text()
                .iter()
                .any(|t| t.to_lowercase().contains("limits")));
        }
    }

    #[test]
    fn inactive_field_filters_pass_everything() {
        let items = sample();
        let mut q = query();
        q.field_filters = vec![("status".into(), "all".into()), ("preview".into(), String::new())];
        assert_eq!(view(&items, &q).total_count, items.len());

        q.field_filters = vec![("status".into(), "inactive".into())];
        let page = view(&items, &q);
        assert_eq!(page.total_count, 1);
        assert_eq!(page.page_items[0].id, 3);
    }

    #[test]
    fn descending_sort_negates_the_comparison() {
        let items = sample();
        let q = ViewQuery {
            sort_dir: SortDir::Desc,
            ..query()
        };
        let ids: Vec<u64> = view(&items, &q).page_items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![4, 3, 1, 2]);
    }

    #[test]
    fn text_sort_ignores_case() {
        let items = sample();
        let q = ViewQuery {
            sort_key: "title".into(),
            ..query()
        };
        let page = view(&items, &q);
        let titles: Vec<&str> = page
            .page_items
            .iter()
            .map(|l| l.title.as_deref().unwrap())
            .collect();
        assert_eq!(
            titles,
            vec!["Derivatives", "Integrals", "Intro to Limits", "limits revisited"]
        );
    }

    #[test]
    fn pagination_bounds() {
        let items = sample();
        let q = ViewQuery {
            page_size: 3,
            ..query()
        };
        let first = view(&items, &q);
        assert_eq!(first.page_items.len(), 3);
        assert_eq!(first.total_pages, 2);

        let second = view(&items, &ViewQuery { page: 2, ..q.clone() });
        assert_eq!(second.page_items.len(), 1);

        // Past the end: empty page, same totals, no panic.
        let beyond = view(&items, &ViewQuery { page: 9, ..q });
        assert!(beyond.page_items.is_empty());
        assert_eq!(beyond.total_count, 4);
        assert_eq!(beyond.total_pages, 2);
    }

    #[test]
    fn view_is_pure() {
        let items = sample();
        let q = ViewQuery {
            search_term: "in".into(),
            sort_dir: SortDir::Desc,
            ..query()
        };
        let a = view(&items, &q);
        let b = view(&items, &q);
        let ids = |p: &ViewPage<Lesson>| p.page_items.iter().map(|l| l.id).collect::<Vec<_>>();
        assert_eq!(ids(&a), ids(&b));
        assert_eq!(a.total_count, b.total_count);
    }

    #[test]
    fn ties_preserve_underlying_order() {
        let items = vec![
            lesson(1, "a", 5, true),
            lesson(2, "b", 5, true),
            lesson(3, "c", 5, true),
        ];
        let ids: Vec<u64> = view(&items, &query()).page_items.iter().map(|l| l.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn file_kind_filter_and_size_sort() {
        let mk = |id: u64, mime: &str, size: u64| FileAttachment {
            id,
            name: Some(format!("f{id}")),
            mime_type: Some(mime.to_string()),
            size: Some(size),
            url: None,
            course_level_id: Some(1),
            created_at: None,
        };
        let files = vec![
            mk(1, "application/pdf", 300),
            mk(2, "image/png", 100),
            mk(3, "application/pdf", 200),
        ];
        let q = ViewQuery {
            field_filters: vec![("kind".into(), "PDF".into())],
            ..ViewQuery::sorted_by("size")
        };
        let ids: Vec<u64> = view(&files, &q).page_items.iter().map(|f| f.id).collect();
        assert_eq!(ids, vec![3, 1]);
    }
}
