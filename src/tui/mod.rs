pub mod event;
pub mod ui;

use crate::api::AdminClient;
use crate::cache::{save_cache, CacheData};
use crate::content::{load_content, ContentBundle};
use crate::models::*;
use crate::selection::{levels_for_instructor, Selection, SelectionStage};
use crate::validate::{self, LinkCheck};
use crate::view::{view, ViewPage, ViewQuery};
use chrono::{DateTime, Utc};
use ratatui::widgets::ListState as RListState;
use tokio::sync::mpsc;

// ─── Navigation ─────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Dashboard,
    Browse,
    Settings,
}

impl Tab {
    pub const ALL: [Tab; 3] = [Tab::Dashboard, Tab::Browse, Tab::Settings];

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Dashboard => "Dashboard",
            Tab::Browse => "Catalog",
            Tab::Settings => "Settings",
        }
    }

    pub fn next(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        Tab::ALL[(idx + 1) % Tab::ALL.len()]
    }

    pub fn prev(&self) -> Tab {
        let idx = Tab::ALL.iter().position(|t| t == self).unwrap_or(0);
        if idx == 0 {
            Tab::ALL[Tab::ALL.len() - 1]
        } else {
            Tab::ALL[idx - 1]
        }
    }
}

/// Which cascade column (or the content pane) owns the cursor on the
/// catalog tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowsePane {
    Specializations,
    Courses,
    Instructors,
    Levels,
    Content,
}

impl BrowsePane {
    pub fn right(self) -> Self {
        match self {
            Self::Specializations => Self::Courses,
            Self::Courses => Self::Instructors,
            Self::Instructors => Self::Levels,
            Self::Levels | Self::Content => Self::Content,
        }
    }

    pub fn left(self) -> Self {
        match self {
            Self::Specializations | Self::Courses => Self::Specializations,
            Self::Instructors => Self::Courses,
            Self::Levels => Self::Instructors,
            Self::Content => Self::Levels,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentTab {
    Lessons,
    Files,
    Quiz,
}

impl ContentTab {
    pub const ALL: [ContentTab; 3] = [ContentTab::Lessons, ContentTab::Files, ContentTab::Quiz];

    pub fn title(&self) -> &'static str {
        match self {
            Self::Lessons => "Lessons",
            Self::Files => "Files",
            Self::Quiz => "Quiz",
        }
    }

    pub fn next(self) -> Self {
        match self {
            Self::Lessons => Self::Files,
            Self::Files => Self::Quiz,
            Self::Quiz => Self::Lessons,
        }
    }
}

// ─── List cursor ────────────────────────────────────────────────────────────

/// Tracks logical selection plus a persistent ratatui scroll offset.
/// Render functions sync `inner` to the cursor before drawing so ratatui
/// only adjusts the offset at viewport edges.
pub struct ListState {
    pub inner: RListState,
    pub selected: usize,
    pub len: usize,
}

impl ListState {
    pub fn new() -> Self {
        let mut inner = RListState::default();
        inner.select(Some(0));
        Self { inner, selected: 0, len: 0 }
    }

    /// Move down — clamped at the last item (no wrap-around).
    pub fn select_next(&mut self) {
        if self.len > 0 && self.selected + 1 < self.len {
            self.selected += 1;
        }
    }

    /// Move up — clamped at the first item (no wrap-around).
    pub fn select_prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
        }
    }

    pub fn set_len(&mut self, len: usize) {
        self.len = len;
        if self.selected >= len && len > 0 {
            self.selected = len - 1;
        }
        if len == 0 {
            self.selected = 0;
        }
    }
}

// ─── Background outcomes ────────────────────────────────────────────────────

/// Everything the spawned tasks can hand back to the UI thread. Cascade
/// variants carry the selection generation they were issued under; the
/// receiver drops any outcome whose generation is no longer current.
pub enum Outcome {
    Root {
        specializations: Result<Vec<Specialization>, String>,
        settings: Result<Vec<Setting>, String>,
        contact: Result<ContactSettings, String>,
        fetched_at: DateTime<Utc>,
    },
    Courses {
        generation: u64,
        result: Result<Vec<Course>, String>,
    },
    Instructors {
        generation: u64,
        result: Result<Vec<Instructor>, String>,
    },
    Levels {
        generation: u64,
        result: Result<Vec<CourseLevel>, String>,
    },
    Content {
        generation: u64,
        bundle: Box<ContentBundle>,
    },
    LinkProbe {
        /// The URL the probe was issued for; compared against the field's
        /// live value so late results for an edited field are discarded.
        url: String,
        verdict: LinkCheck,
    },
    Mutation {
        success: bool,
        message: String,
        refresh: Refresh,
    },
}

/// What to refetch after a successful mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refresh {
    Root,
    Courses,
    Levels,
    Content,
    Nothing,
}

// ─── Forms ──────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormKind {
    NewSpecialization,
    EditSpecialization(u64),
    NewCourse,
    EditCourse(u64),
    NewLevel,
    EditLevel(u64),
    NewLesson,
    EditLesson(u64),
    UploadFile,
    NewQuestion,
    EditQuestion(u64),
    NewSetting,
    EditSetting(String),
    /// Edits the whatsapp/telegram pair in one go.
    EditContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Number,
    /// Toggled with space; value is "true"/"false".
    Flag,
    /// Validated as a YouTube link, probe-gated on submit.
    Url,
    /// Local filesystem path (image or upload).
    Path,
    /// One quiz option; space marks it as the correct answer.
    Option,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub label: &'static str,
    pub value: String,
    pub kind: FieldKind,
}

impl FormField {
    fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), kind: FieldKind::Text }
    }

    fn number(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), kind: FieldKind::Number }
    }

    fn flag(label: &'static str, on: bool) -> Self {
        Self {
            label,
            value: if on { "true" } else { "false" }.into(),
            kind: FieldKind::Flag,
        }
    }

    fn url(label: &'static str, value: impl Into<String>) -> Self {
        Self { label, value: value.into(), kind: FieldKind::Url }
    }

    fn path(label: &'static str) -> Self {
        Self { label, value: String::new(), kind: FieldKind::Path }
    }

    fn option(value: impl Into<String>) -> Self {
        Self { label: "Option", value: value.into(), kind: FieldKind::Option }
    }

    pub fn is_on(&self) -> bool {
        self.value == "true"
    }
}

/// Validation cycle of the form's URL field, if it has one.
#[derive(Debug, Clone, Default)]
pub enum LinkCycle {
    #[default]
    Idle,
    /// Format passed, thumbnail probe in flight.
    Checking { url: String, verdict: LinkCheck },
    Resolved { url: String, verdict: LinkCheck },
}

impl LinkCycle {
    pub fn verdict(&self) -> Option<&LinkCheck> {
        match self {
            Self::Idle => None,
            Self::Checking { verdict, .. } | Self::Resolved { verdict, .. } => Some(verdict),
        }
    }
}

#[derive(Debug, Clone)]
pub struct FormState {
    pub kind: FormKind,
    pub title: String,
    pub fields: Vec<FormField>,
    pub cursor: usize,
    /// Index of the option field currently marked correct (question forms).
    pub correct_option: usize,
    pub link: LinkCycle,
    pub submitting: bool,
    pub error: Option<String>,
}

impl FormState {
    fn new(kind: FormKind, title: impl Into<String>, fields: Vec<FormField>) -> Self {
        Self {
            kind,
            title: title.into(),
            fields,
            cursor: 0,
            correct_option: usize::MAX,
            link: LinkCycle::Idle,
            submitting: false,
            error: None,
        }
    }

    pub fn url_field(&self) -> Option<&FormField> {
        self.fields.iter().find(|f| f.kind == FieldKind::Url)
    }

    fn option_values(&self) -> Vec<QuizOption> {
        self.fields
            .iter()
            .enumerate()
            .filter(|(_, f)| f.kind == FieldKind::Option)
            .map(|(i, f)| QuizOption {
                id: None,
                text: f.value.clone(),
                is_correct: i == self.correct_option,
            })
            .collect()
    }
}

/// Pending destructive action awaiting y/n.
#[derive(Debug, Clone)]
pub enum Confirm {
    DeleteSpecialization(u64),
    DeleteCourse(u64),
    DeleteLevel(u64),
    DeleteLesson(u64),
    DeleteFile(u64),
    DeleteQuestion(u64),
}

impl Confirm {
    pub fn prompt(&self) -> &'static str {
        match self {
            Self::DeleteSpecialization(_) => "Delete this specialization?",
            Self::DeleteCourse(_) => "Delete this course?",
            Self::DeleteLevel(_) => "Delete this level?",
            Self::DeleteLesson(_) => "Delete this lesson?",
            Self::DeleteFile(_) => "Delete this file?",
            Self::DeleteQuestion(_) => "Delete this question?",
        }
    }
}

// ─── App state ──────────────────────────────────────────────────────────────

pub struct App {
    pub client: AdminClient,
    pub running: bool,
    pub active_tab: Tab,

    // Catalog data, top of the hierarchy down to the loaded content.
    pub specializations: Vec<Specialization>,
    pub courses: Vec<Course>,
    pub instructors: Vec<Instructor>,
    pub levels: Vec<CourseLevel>,
    pub content: Option<ContentBundle>,
    pub settings: Vec<Setting>,
    pub contact: ContactSettings,

    pub selection: Selection,
    pub browse_pane: BrowsePane,
    pub content_tab: ContentTab,

    // Cursors
    pub spec_list: ListState,
    pub course_list: ListState,
    pub instructor_list: ListState,
    pub level_list: ListState,
    pub content_list: ListState,
    pub settings_list: ListState,

    // View parameters for the table screens.
    pub lesson_query: ViewQuery,
    pub file_query: ViewQuery,
    pub question_query: ViewQuery,
    pub settings_query: ViewQuery,

    /// Live search for the focused cascade column.
    pub pane_search: String,
    pub search_active: bool,

    // Status
    pub status_message: String,
    pub loading: bool,
    pub cached_at: Option<DateTime<Utc>>,
    pub needs_root_refresh: bool,

    // Modals
    pub form: Option<FormState>,
    pub confirm: Option<Confirm>,

    // Background plumbing
    outcome_tx: mpsc::UnboundedSender<Outcome>,
    outcome_rx: mpsc::UnboundedReceiver<Outcome>,
    root_in_flight: bool,

    // Incremented each frame; used to drive the loading spinner.
    pub frame_count: u64,
}

impl App {
    pub fn new(client: AdminClient) -> Self {
        let (outcome_tx, outcome_rx) = mpsc::unbounded_channel();
        Self {
            client,
            running: true,
            active_tab: Tab::Dashboard,
            specializations: Vec::new(),
            courses: Vec::new(),
            instructors: Vec::new(),
            levels: Vec::new(),
            content: None,
            settings: Vec::new(),
            contact: ContactSettings::default(),
            selection: Selection::new(),
            browse_pane: BrowsePane::Specializations,
            content_tab: ContentTab::Lessons,
            spec_list: ListState::new(),
            course_list: ListState::new(),
            instructor_list: ListState::new(),
            level_list: ListState::new(),
            content_list: ListState::new(),
            settings_list: ListState::new(),
            lesson_query: ViewQuery::sorted_by("order"),
            file_query: ViewQuery::sorted_by("name"),
            question_query: ViewQuery::sorted_by("order"),
            settings_query: ViewQuery::sorted_by("key"),
            pane_search: String::new(),
            search_active: false,
            status_message: "Loading...".into(),
            loading: true,
            cached_at: None,
            needs_root_refresh: false,
            form: None,
            confirm: None,
            outcome_tx,
            outcome_rx,
            root_in_flight: false,
            frame_count: 0,
        }
    }

    /// Populate from a previously saved snapshot without touching the
    /// network. The UI is usable immediately afterwards.
    pub fn load_from_cache(&mut self, cache: CacheData) {
        self.spec_list.set_len(cache.specializations.len());
        self.specializations = cache.specializations;
        self.settings_list.set_len(cache.settings.len());
        self.settings = cache.settings;
        self.contact = cache.contact;
        self.cached_at = Some(cache.cached_at);
        self.loading = false;

        let synced = cache
            .cached_at
            .with_timezone(&chrono::Local)
            .format("%b %d %H:%M");
        self.status_message =
            format!("Showing cached data from {synced} — press r to refresh.");
    }

    // ── Fetching ────────────────────────────────────────────────────────

    /// Sync the catalog root (specializations + settings) in the
    /// background. No-ops while a root sync is already running.
    pub fn start_root_fetch(&mut self) {
        if self.root_in_flight {
            return;
        }
        self.root_in_flight = true;
        self.loading = true;
        self.status_message = "Syncing in background…".into();

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        tokio::spawn(async move {
            let (specializations, settings, contact) = tokio::join!(
                client.list_specializations(),
                client.get_all_settings(),
                client.get_contact_settings(),
            );
            let _ = tx.send(Outcome::Root {
                specializations: specializations.map_err(|e| e.to_string()),
                settings: settings.map_err(|e| e.to_string()),
                contact: contact.map_err(|e| e.to_string()),
                fetched_at: Utc::now(),
            });
        });
    }

    fn start_courses_fetch(&mut self, specialization_id: u64, generation: u64) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.loading = true;
        tokio::spawn(async move {
            let result = client
                .list_courses(specialization_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Outcome::Courses { generation, result });
        });
    }

    fn start_instructors_fetch(&mut self, course_id: u64, generation: u64) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.loading = true;
        tokio::spawn(async move {
            let result = client
                .list_instructors(course_id)
                .await
                .map_err(|e| e.to_string());
            let _ = tx.send(Outcome::Instructors { generation, result });
        });
    }

    /// Level options are the course's levels restricted to the chosen
    /// instructor; the instructor rides into the task for the scoping.
    fn start_levels_fetch(&mut self, course_id: u64, instructor: Instructor, generation: u64) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.loading = true;
        tokio::spawn(async move {
            let result = client
                .list_levels(course_id)
                .await
                .map(|levels| levels_for_instructor(&levels, &instructor))
                .map_err(|e| e.to_string());
            let _ = tx.send(Outcome::Levels { generation, result });
        });
    }

    fn start_content_fetch(&mut self, level_id: u64, generation: u64) {
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.loading = true;
        tokio::spawn(async move {
            let bundle = load_content(&client, level_id).await;
            let _ = tx.send(Outcome::Content {
                generation,
                bundle: Box::new(bundle),
            });
        });
    }

    // ── Cascade transitions ─────────────────────────────────────────────

    /// Apply the Enter key in the focused cascade column: advance the
    /// selection machine, clear everything below, and kick off the next
    /// level's fetch.
    pub fn select_in_focused_pane(&mut self) {
        match self.browse_pane {
            BrowsePane::Specializations => {
                let Some(spec) = self.visible_specializations().get(self.spec_list.selected).cloned()
                else {
                    return;
                };
                let generation = self.selection.choose_specialization(spec.id);
                self.clear_below(SelectionStage::SpecializationChosen);
                self.start_courses_fetch(spec.id, generation);
                self.browse_pane = BrowsePane::Courses;
            }
            BrowsePane::Courses => {
                let Some(course) = self.visible_courses().get(self.course_list.selected).cloned()
                else {
                    return;
                };
                let Ok(generation) = self.selection.choose_course(course.id) else {
                    return;
                };
                self.clear_below(SelectionStage::CourseChosen);
                self.start_instructors_fetch(course.id, generation);
                self.browse_pane = BrowsePane::Instructors;
            }
            BrowsePane::Instructors => {
                let Some(instructor) =
                    self.instructors.get(self.instructor_list.selected).cloned()
                else {
                    return;
                };
                let Ok(generation) = self.selection.choose_instructor(instructor.id) else {
                    return;
                };
                let Some(course_id) = self.selection.course_id() else {
                    return;
                };
                self.clear_below(SelectionStage::InstructorChosen);
                self.start_levels_fetch(course_id, instructor, generation);
                self.browse_pane = BrowsePane::Levels;
            }
            BrowsePane::Levels => {
                let Some(level) = self.visible_levels().get(self.level_list.selected).cloned()
                else {
                    return;
                };
                let Ok(generation) = self.selection.choose_level(level.id) else {
                    return;
                };
                self.content = None;
                self.start_content_fetch(level.id, generation);
                self.browse_pane = BrowsePane::Content;
            }
            BrowsePane::Content => {}
        }
    }

    /// Drop cached lists for every level strictly below `stage`.
    fn clear_below(&mut self, stage: SelectionStage) {
        if stage < SelectionStage::CourseChosen {
            self.courses.clear();
            self.course_list.set_len(0);
        }
        if stage < SelectionStage::InstructorChosen {
            self.instructors.clear();
            self.instructor_list.set_len(0);
        }
        if stage < SelectionStage::LevelChosen {
            self.levels.clear();
            self.level_list.set_len(0);
        }
        self.content = None;
        self.content_list.set_len(0);
        self.lesson_query.rewind();
        self.file_query.rewind();
        self.question_query.rewind();
    }

    /// Clear the whole selection chain.
    pub fn reset_selection(&mut self) {
        self.selection.reset_all();
        self.clear_below(SelectionStage::Empty);
        self.browse_pane = BrowsePane::Specializations;
        self.status_message = "Selection cleared.".into();
    }

    /// Step one level back up the chain.
    pub fn back_out(&mut self) {
        match self.browse_pane {
            BrowsePane::Specializations => {}
            BrowsePane::Courses => {
                self.selection.reset_all();
                self.clear_below(SelectionStage::Empty);
                self.browse_pane = BrowsePane::Specializations;
            }
            BrowsePane::Instructors => {
                if let Some(spec_id) = self.selection.specialization_id() {
                    let generation = self.selection.choose_specialization(spec_id);
                    self.clear_below(SelectionStage::SpecializationChosen);
                    self.start_courses_fetch(spec_id, generation);
                }
                self.browse_pane = BrowsePane::Courses;
            }
            BrowsePane::Levels => {
                if let Some(course_id) = self.selection.course_id() {
                    if let Ok(generation) = self.selection.choose_course(course_id) {
                        self.clear_below(SelectionStage::CourseChosen);
                        self.start_instructors_fetch(course_id, generation);
                    }
                }
                self.browse_pane = BrowsePane::Instructors;
            }
            BrowsePane::Content => self.browse_pane = BrowsePane::Levels,
        }
    }

    // ── Outcome application ─────────────────────────────────────────────

    /// Drain completed background work without blocking. Called once per
    /// frame by the main loop.
    pub fn poll_outcomes(&mut self) {
        while let Ok(outcome) = self.outcome_rx.try_recv() {
            self.apply_outcome(outcome);
        }
    }

    pub fn apply_outcome(&mut self, outcome: Outcome) {
        match outcome {
            Outcome::Root {
                specializations,
                settings,
                contact,
                fetched_at,
            } => self.apply_root(specializations, settings, contact, fetched_at),
            Outcome::Courses { generation, result } => {
                if !self.selection.is_current(generation) {
                    tracing::debug!(generation, "discarding stale course list");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(courses) => {
                        self.course_list.set_len(courses.len());
                        self.courses = courses;
                        self.status_message =
                            format!("{} courses loaded.", self.courses.len());
                    }
                    Err(e) => {
                        self.courses.clear();
                        self.course_list.set_len(0);
                        self.status_message = format!("Loading courses failed: {e}");
                    }
                }
            }
            Outcome::Instructors { generation, result } => {
                if !self.selection.is_current(generation) {
                    tracing::debug!(generation, "discarding stale instructor list");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(instructors) => {
                        self.instructor_list.set_len(instructors.len());
                        self.instructors = instructors;
                    }
                    Err(e) => {
                        self.instructors.clear();
                        self.instructor_list.set_len(0);
                        self.status_message = format!("Loading instructors failed: {e}");
                    }
                }
            }
            Outcome::Levels { generation, result } => {
                if !self.selection.is_current(generation) {
                    tracing::debug!(generation, "discarding stale level list");
                    return;
                }
                self.loading = false;
                match result {
                    Ok(levels) => {
                        self.level_list.set_len(levels.len());
                        self.levels = levels;
                    }
                    Err(e) => {
                        self.levels.clear();
                        self.level_list.set_len(0);
                        self.status_message = format!("Loading levels failed: {e}");
                    }
                }
            }
            Outcome::Content { generation, bundle } => {
                if !self.selection.is_current(generation) {
                    tracing::debug!(generation, "discarding stale content bundle");
                    return;
                }
                self.loading = false;
                if let Some(err) = bundle.first_error() {
                    self.status_message = err.to_string();
                } else {
                    self.status_message = format!(
                        "{} lessons, {} files, {} questions.",
                        bundle.lessons.len(),
                        bundle.files.len(),
                        bundle.questions.len()
                    );
                }
                self.content = Some(*bundle);
                self.sync_content_len();
            }
            Outcome::LinkProbe { url, verdict } => self.apply_link_probe(url, verdict),
            Outcome::Mutation {
                success,
                message,
                refresh,
            } => self.apply_mutation(success, message, refresh),
        }
    }

    fn apply_root(
        &mut self,
        specializations: Result<Vec<Specialization>, String>,
        settings: Result<Vec<Setting>, String>,
        contact: Result<ContactSettings, String>,
        fetched_at: DateTime<Utc>,
    ) {
        self.root_in_flight = false;
        self.loading = false;

        let mut errors: Vec<String> = Vec::new();
        match specializations {
            Ok(specs) => {
                self.spec_list.set_len(specs.len());
                self.specializations = specs;
            }
            Err(e) => {
                self.specializations.clear();
                self.spec_list.set_len(0);
                errors.push(format!("specializations: {e}"));
            }
        }
        match settings {
            Ok(settings) => {
                self.settings_list.set_len(settings.len());
                self.settings = settings;
            }
            Err(e) => {
                self.settings.clear();
                self.settings_list.set_len(0);
                errors.push(format!("settings: {e}"));
            }
        }
        match contact {
            Ok(contact) => self.contact = contact,
            Err(e) => errors.push(format!("contact settings: {e}")),
        }

        self.cached_at = Some(fetched_at);

        if errors.is_empty() {
            let synced = fetched_at.with_timezone(&chrono::Local).format("%b %d %H:%M");
            self.status_message = format!(
                "{} specializations loaded. Synced {synced}.",
                self.specializations.len()
            );
            let cache = CacheData {
                cached_at: fetched_at,
                specializations: self.specializations.clone(),
                settings: self.settings.clone(),
                contact: self.contact.clone(),
            };
            if let Err(e) = save_cache(&cache) {
                tracing::warn!(error = %e, "saving cache failed");
            }
        } else {
            self.status_message = format!("Sync error: {}", errors.join("; "));
        }
    }

    fn apply_mutation(&mut self, success: bool, message: String, refresh: Refresh) {
        if let Some(form) = self.form.as_mut() {
            form.submitting = false;
            if !success {
                // Keep the form open with the user's input intact.
                form.error = Some(message.clone());
                self.status_message = message;
                return;
            }
        }
        self.status_message = message;
        if !success {
            return;
        }
        self.form = None;
        self.confirm = None;

        match refresh {
            Refresh::Root => self.needs_root_refresh = true,
            Refresh::Courses => {
                if let Some(spec_id) = self.selection.specialization_id() {
                    // Re-issue under the current generation; the selection
                    // itself did not move.
                    let generation = self.selection.generation();
                    self.start_courses_fetch(spec_id, generation);
                }
            }
            Refresh::Levels => {
                if let (Some(course_id), Some(instructor_id)) =
                    (self.selection.course_id(), self.selection.instructor_id())
                {
                    if let Some(instructor) =
                        self.instructors.iter().find(|i| i.id == instructor_id).cloned()
                    {
                        let generation = self.selection.generation();
                        self.start_levels_fetch(course_id, instructor, generation);
                    }
                }
            }
            Refresh::Content => {
                if let Some(level_id) = self.selection.level_id() {
                    let generation = self.selection.generation();
                    self.start_content_fetch(level_id, generation);
                }
            }
            Refresh::Nothing => {}
        }
    }

    // ── Derived views ───────────────────────────────────────────────────

    fn pane_query(&self, pane: BrowsePane, sort_key: &str) -> ViewQuery {
        let mut q = ViewQuery::sorted_by(sort_key);
        q.page_size = usize::MAX;
        if self.browse_pane == pane {
            q.search_term = self.pane_search.clone();
        }
        q
    }

    pub fn visible_specializations(&self) -> Vec<Specialization> {
        view(
            &self.specializations,
            &self.pane_query(BrowsePane::Specializations, "name"),
        )
        .page_items
    }

    pub fn visible_courses(&self) -> Vec<Course> {
        view(&self.courses, &self.pane_query(BrowsePane::Courses, "title")).page_items
    }

    pub fn visible_levels(&self) -> Vec<CourseLevel> {
        view(&self.levels, &self.pane_query(BrowsePane::Levels, "order")).page_items
    }

    pub fn visible_lessons(&self) -> ViewPage<Lesson> {
        let empty: Vec<Lesson> = Vec::new();
        let lessons = self.content.as_ref().map(|c| &c.lessons).unwrap_or(&empty);
        view(lessons, &self.lesson_query)
    }

    pub fn visible_files(&self) -> ViewPage<FileAttachment> {
        let empty: Vec<FileAttachment> = Vec::new();
        let files = self.content.as_ref().map(|c| &c.files).unwrap_or(&empty);
        view(files, &self.file_query)
    }

    pub fn visible_questions(&self) -> ViewPage<QuizQuestion> {
        let empty: Vec<QuizQuestion> = Vec::new();
        let questions = self.content.as_ref().map(|c| &c.questions).unwrap_or(&empty);
        view(questions, &self.question_query)
    }

    pub fn visible_settings(&self) -> ViewPage<Setting> {
        view(&self.settings, &self.settings_query)
    }

    /// Keep the content cursor in range for whichever content tab is shown.
    pub fn sync_content_len(&mut self) {
        let len = match self.content_tab {
            ContentTab::Lessons => self.visible_lessons().page_items.len(),
            ContentTab::Files => self.visible_files().page_items.len(),
            ContentTab::Quiz => self.visible_questions().page_items.len(),
        };
        self.content_list.set_len(len);
    }

    /// The view query backing the focused table, for key handlers that
    /// tweak search/sort/pagination.
    pub fn active_query_mut(&mut self) -> Option<&mut ViewQuery> {
        match self.active_tab {
            Tab::Settings => Some(&mut self.settings_query),
            Tab::Browse if self.browse_pane == BrowsePane::Content => Some(match self.content_tab {
                ContentTab::Lessons => &mut self.lesson_query,
                ContentTab::Files => &mut self.file_query,
                ContentTab::Quiz => &mut self.question_query,
            }),
            _ => None,
        }
    }

    /// Cycle the primary field filter of the focused table.
    pub fn cycle_field_filter(&mut self) {
        let (key, values): (&str, &[&str]) = match self.active_tab {
            Tab::Browse if self.browse_pane == BrowsePane::Content => match self.content_tab {
                ContentTab::Lessons => ("status", &["all", "active", "inactive"]),
                ContentTab::Files => ("kind", &["all", "PDF", "Image", "Video", "Document"]),
                ContentTab::Quiz => return,
            },
            _ => return,
        };
        let Some(query) = self.active_query_mut() else {
            return;
        };
        let current = query
            .field_filters
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.clone())
            .unwrap_or_else(|| "all".to_string());
        let idx = values.iter().position(|v| *v == current).unwrap_or(0);
        let next = values[(idx + 1) % values.len()].to_string();
        query.field_filters.retain(|(k, _)| k != key);
        query.field_filters.push((key.to_string(), next));
        query.rewind();
        self.sync_content_len();
    }

    /// Sort keys offered for the focused table, in cycling order.
    fn sort_keys(&self) -> &'static [&'static str] {
        match self.active_tab {
            Tab::Settings => &["key", "updated"],
            Tab::Browse if self.browse_pane == BrowsePane::Content => match self.content_tab {
                ContentTab::Lessons => &["order", "title", "duration"],
                ContentTab::Files => &["name", "size", "created"],
                ContentTab::Quiz => &["order", "text"],
            },
            _ => &[],
        }
    }

    pub fn cycle_sort_key(&mut self) {
        let keys = self.sort_keys();
        if keys.is_empty() {
            return;
        }
        let Some(query) = self.active_query_mut() else {
            return;
        };
        let idx = keys.iter().position(|k| *k == query.sort_key).unwrap_or(0);
        query.sort_key = keys[(idx + 1) % keys.len()].to_string();
        query.rewind();
        self.sync_content_len();
    }

    pub fn toggle_sort_dir(&mut self) {
        if let Some(query) = self.active_query_mut() {
            query.sort_dir = query.sort_dir.toggle();
            query.rewind();
        }
        self.sync_content_len();
    }

    /// Move forward or back one page, clamped to the filtered page range.
    pub fn page_step(&mut self, delta: i64) {
        let total_pages = match self.active_tab {
            Tab::Settings => self.visible_settings().total_pages,
            Tab::Browse if self.browse_pane == BrowsePane::Content => match self.content_tab {
                ContentTab::Lessons => self.visible_lessons().total_pages,
                ContentTab::Files => self.visible_files().total_pages,
                ContentTab::Quiz => self.visible_questions().total_pages,
            },
            _ => return,
        };
        let Some(query) = self.active_query_mut() else {
            return;
        };
        let page = query.page as i64 + delta;
        query.page = page.clamp(1, total_pages.max(1) as i64) as usize;
        self.sync_content_len();
    }

    /// True when '/' search edits one of the table queries rather than the
    /// cascade pane filter.
    fn searching_a_table(&self) -> bool {
        self.active_tab == Tab::Settings
            || (self.active_tab == Tab::Browse && self.browse_pane == BrowsePane::Content)
    }

    pub fn search_push(&mut self, c: char) {
        if self.searching_a_table() {
            if let Some(query) = self.active_query_mut() {
                query.search_term.push(c);
                query.rewind();
            }
        } else {
            self.pane_search.push(c);
            self.sync_pane_len();
        }
        self.sync_content_len();
    }

    pub fn search_pop(&mut self) {
        if self.searching_a_table() {
            if let Some(query) = self.active_query_mut() {
                query.search_term.pop();
                query.rewind();
            }
        } else {
            self.pane_search.pop();
            self.sync_pane_len();
        }
        self.sync_content_len();
    }

    pub fn search_clear(&mut self) {
        if self.searching_a_table() {
            if let Some(query) = self.active_query_mut() {
                query.search_term.clear();
                query.rewind();
            }
        } else {
            self.pane_search.clear();
            self.sync_pane_len();
        }
        self.sync_content_len();
    }

    /// Re-clamp the focused cascade cursor after its filter changed.
    fn sync_pane_len(&mut self) {
        let len = match self.browse_pane {
            BrowsePane::Specializations => self.visible_specializations().len(),
            BrowsePane::Courses => self.visible_courses().len(),
            BrowsePane::Levels => self.visible_levels().len(),
            BrowsePane::Instructors => self.instructors.len(),
            BrowsePane::Content => return,
        };
        self.active_list_state_mut().set_len(len);
    }

    /// Append an empty option row to an open question form.
    pub fn form_add_option(&mut self) {
        if let Some(form) = self.form.as_mut() {
            if matches!(form.kind, FormKind::NewQuestion | FormKind::EditQuestion(_)) {
                form.fields.push(FormField::option(""));
            }
        }
    }

    /// Remove the option row under the cursor; the two-option minimum is
    /// enforced at submit, not here.
    pub fn form_remove_option(&mut self) {
        if let Some(form) = self.form.as_mut() {
            if form
                .fields
                .get(form.cursor)
                .is_some_and(|f| f.kind == FieldKind::Option)
            {
                if form.correct_option == form.cursor {
                    form.correct_option = usize::MAX;
                } else if form.correct_option > form.cursor && form.correct_option != usize::MAX {
                    form.correct_option -= 1;
                }
                form.fields.remove(form.cursor);
                if form.cursor >= form.fields.len() {
                    form.cursor = form.fields.len().saturating_sub(1);
                }
            }
        }
    }

    pub fn active_list_state_mut(&mut self) -> &mut ListState {
        match self.active_tab {
            Tab::Dashboard => &mut self.spec_list,
            Tab::Settings => &mut self.settings_list,
            Tab::Browse => match self.browse_pane {
                BrowsePane::Specializations => &mut self.spec_list,
                BrowsePane::Courses => &mut self.course_list,
                BrowsePane::Instructors => &mut self.instructor_list,
                BrowsePane::Levels => &mut self.level_list,
                BrowsePane::Content => &mut self.content_list,
            },
        }
    }

    // ── Forms ───────────────────────────────────────────────────────────

    pub fn open_form(&mut self, kind: FormKind) {
        let form = match &kind {
            FormKind::NewSpecialization => FormState::new(
                kind.clone(),
                "New specialization",
                vec![FormField::text("Name", ""), FormField::path("Image file")],
            ),
            FormKind::EditSpecialization(id) => {
                let Some(spec) = self.specializations.iter().find(|s| s.id == *id) else {
                    return;
                };
                FormState::new(
                    kind.clone(),
                    "Edit specialization",
                    vec![
                        FormField::text("Name", spec.name.clone().unwrap_or_default()),
                        FormField::path("Image file"),
                    ],
                )
            }
            FormKind::NewCourse => FormState::new(
                kind.clone(),
                "New course",
                vec![
                    FormField::text("Title", ""),
                    FormField::text("Description", ""),
                    FormField::path("Image file"),
                ],
            ),
            FormKind::EditCourse(id) => {
                let Some(course) = self.courses.iter().find(|c| c.id == *id) else {
                    return;
                };
                FormState::new(
                    kind.clone(),
                    "Edit course",
                    vec![
                        FormField::text("Title", course.title.clone().unwrap_or_default()),
                        FormField::text(
                            "Description",
                            course.description.clone().unwrap_or_default(),
                        ),
                        FormField::path("Image file"),
                    ],
                )
            }
            FormKind::NewLevel => FormState::new(
                kind.clone(),
                "New level",
                vec![
                    FormField::text("Name", ""),
                    FormField::number("Order", ""),
                    FormField::number("Price USD", ""),
                    FormField::number("Price SAR", ""),
                    FormField::flag("Free", false),
                    FormField::url("Preview URL", ""),
                    FormField::text("Download URL", ""),
                    FormField::path("Image file"),
                ],
            ),
            FormKind::EditLevel(id) => {
                let Some(level) = self.levels.iter().find(|l| l.id == *id) else {
                    return;
                };
                FormState::new(
                    kind.clone(),
                    "Edit level",
                    vec![
                        FormField::text("Name", level.name.clone().unwrap_or_default()),
                        FormField::number(
                            "Order",
                            level.order.map(|o| o.to_string()).unwrap_or_default(),
                        ),
                        FormField::number(
                            "Price USD",
                            level.price_usd.map(|p| p.to_string()).unwrap_or_default(),
                        ),
                        FormField::number(
                            "Price SAR",
                            level.price_sar.map(|p| p.to_string()).unwrap_or_default(),
                        ),
                        FormField::flag("Free", level.is_free),
                        FormField::url(
                            "Preview URL",
                            level.preview_url.clone().unwrap_or_default(),
                        ),
                        FormField::text(
                            "Download URL",
                            level.download_url.clone().unwrap_or_default(),
                        ),
                        FormField::path("Image file"),
                    ],
                )
            }
            FormKind::NewLesson => FormState::new(
                kind.clone(),
                "New lesson",
                vec![
                    FormField::text("Title", ""),
                    FormField::text("Description", ""),
                    FormField::url("YouTube URL", ""),
                    FormField::text("Google Drive URL", ""),
                    FormField::number("Duration (sec)", ""),
                    FormField::number("Order", ""),
                    FormField::flag("Free preview", false),
                ],
            ),
            FormKind::EditLesson(id) => {
                let Some(lesson) = self
                    .content
                    .as_ref()
                    .and_then(|c| c.lessons.iter().find(|l| l.id == *id))
                else {
                    return;
                };
                let mut form = FormState::new(
                    kind.clone(),
                    "Edit lesson",
                    vec![
                        FormField::text("Title", lesson.title.clone().unwrap_or_default()),
                        FormField::text(
                            "Description",
                            lesson.description.clone().unwrap_or_default(),
                        ),
                        FormField::url(
                            "YouTube URL",
                            lesson.youtube_url.clone().unwrap_or_default(),
                        ),
                        FormField::text(
                            "Google Drive URL",
                            lesson.google_drive_url.clone().unwrap_or_default(),
                        ),
                        FormField::number(
                            "Duration (sec)",
                            lesson.duration_sec.map(|d| d.to_string()).unwrap_or_default(),
                        ),
                        FormField::number(
                            "Order",
                            lesson
                                .order_index
                                .map(|o| o.to_string())
                                .unwrap_or_default(),
                        ),
                        FormField::flag("Free preview", lesson.is_free_preview),
                    ],
                );
                // Re-validate the existing URL so the save gate starts from
                // a fresh verdict rather than trusting stored state.
                let url = form.fields[2].value.clone();
                if !url.is_empty() {
                    self.kick_link_check(&mut form, url);
                }
                self.form = Some(form);
                return;
            }
            FormKind::UploadFile => FormState::new(
                kind.clone(),
                "Upload file",
                vec![FormField::path("File path")],
            ),
            FormKind::NewQuestion => {
                let mut form = FormState::new(
                    kind.clone(),
                    "New question",
                    vec![
                        FormField::text("Question", ""),
                        FormField::option(""),
                        FormField::option(""),
                    ],
                );
                form.correct_option = 1;
                form
            }
            FormKind::EditQuestion(id) => {
                let Some(question) = self
                    .content
                    .as_ref()
                    .and_then(|c| c.questions.iter().find(|q| q.id == *id))
                else {
                    return;
                };
                let mut fields =
                    vec![FormField::text("Question", question.text.clone().unwrap_or_default())];
                fields.extend(question.options.iter().map(|o| FormField::option(o.text.clone())));
                let mut form = FormState::new(kind.clone(), "Edit question", fields);
                // The correct marker indexes into the fields vec, where the
                // question text occupies index 0.
                form.correct_option = question
                    .options
                    .iter()
                    .position(|o| o.is_correct)
                    .map(|i| i + 1)
                    .unwrap_or(usize::MAX);
                form
            }
            FormKind::NewSetting => FormState::new(
                kind.clone(),
                "New setting",
                vec![FormField::text("Key", ""), FormField::text("Value", "")],
            ),
            FormKind::EditSetting(key) => {
                let Some(setting) = self.settings.iter().find(|s| &s.key == key) else {
                    return;
                };
                FormState::new(
                    kind.clone(),
                    "Edit setting",
                    vec![
                        FormField::text("Key", setting.key.clone()),
                        FormField::text("Value", setting.value.clone()),
                    ],
                )
            }
            FormKind::EditContact => FormState::new(
                kind.clone(),
                "Edit contact info",
                vec![
                    FormField::text("Whatsapp", self.contact.whatsapp.clone().unwrap_or_default()),
                    FormField::text("Telegram", self.contact.telegram.clone().unwrap_or_default()),
                ],
            ),
        };
        self.form = Some(form);
    }

    /// Called on every edit of a URL form field: re-run the format stage
    /// and, when it passes, launch a fresh thumbnail probe.
    pub fn on_url_edited(&mut self) {
        let Some(mut form) = self.form.take() else {
            return;
        };
        let url = form.url_field().map(|f| f.value.clone()).unwrap_or_default();
        if url.trim().is_empty() {
            form.link = LinkCycle::Idle;
        } else {
            self.kick_link_check(&mut form, url);
        }
        self.form = Some(form);
    }

    fn kick_link_check(&mut self, form: &mut FormState, url: String) {
        match validate::check_format(&url) {
            Err(verdict) => {
                form.link = LinkCycle::Resolved { url, verdict };
            }
            Ok(video_id) => {
                form.link = LinkCycle::Checking {
                    url: url.clone(),
                    verdict: LinkCheck {
                        is_valid: true,
                        message: "Checking video…".into(),
                        checking: true,
                        exists: false,
                    },
                };
                let tx = self.outcome_tx.clone();
                tokio::spawn(async move {
                    let client = reqwest::Client::new();
                    let verdict = validate::probe_video(&client, &video_id).await;
                    let _ = tx.send(Outcome::LinkProbe { url, verdict });
                });
            }
        }
    }

    fn apply_link_probe(&mut self, url: String, verdict: LinkCheck) {
        let Some(form) = self.form.as_mut() else {
            return;
        };
        // A probe for anything but the field's live value is stale.
        let current = form.url_field().map(|f| f.value.clone()).unwrap_or_default();
        if current != url {
            tracing::debug!(%url, "discarding stale link probe");
            return;
        }
        form.link = LinkCycle::Resolved { url, verdict };
    }

    // ── Submission ──────────────────────────────────────────────────────

    /// Validate locally and, if clean, send the form's mutation in the
    /// background. Validation failures never reach the network.
    pub fn submit_form(&mut self) {
        let Some(form) = self.form.clone() else {
            return;
        };
        if form.submitting {
            return;
        }

        let field = |i: usize| -> String { form.fields[i].value.trim().to_string() };
        let opt = |s: String| -> Option<String> { (!s.is_empty()).then_some(s) };
        let num_i64 = |s: &str| -> Option<i64> { s.parse().ok() };
        let num_f64 = |s: &str| -> Option<f64> { s.parse().ok() };
        let path_of = |s: String| -> Option<std::path::PathBuf> {
            (!s.is_empty()).then(|| std::path::PathBuf::from(s))
        };

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();

        macro_rules! fail {
            ($msg:expr) => {{
                self.form.as_mut().unwrap().error = Some($msg);
                return;
            }};
        }

        // URL-gated forms: block until the probe confirms the video.
        if form.url_field().is_some_and(|f| !f.value.trim().is_empty()) {
            match form.link.verdict() {
                Some(v) if v.allows_save() => {}
                Some(v) if v.checking => fail!("Still checking the video, wait a moment".into()),
                Some(v) => fail!(if v.message.is_empty() {
                    "The video link did not validate".into()
                } else {
                    v.message.clone()
                }),
                None => fail!("The video link has not been validated yet".into()),
            }
        }

        match form.kind.clone() {
            FormKind::NewSpecialization | FormKind::EditSpecialization(_) => {
                let name = field(0);
                if let Err(e) = validate::require_nonempty("Name", &name) {
                    fail!(e);
                }
                let draft = SpecializationDraft { name, image_url: None };
                let image = path_of(field(1));
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditSpecialization(id) => {
                            client.update_specialization(id, &draft, image.as_deref()).await
                        }
                        _ => client.create_specialization(&draft, image.as_deref()).await,
                    };
                    send_mutation(tx, result, "Specialization saved.", Refresh::Root);
                });
            }
            FormKind::NewCourse | FormKind::EditCourse(_) => {
                let title = field(0);
                if let Err(e) = validate::require_nonempty("Title", &title) {
                    fail!(e);
                }
                let Some(spec_id) = self.selection.specialization_id() else {
                    fail!("Select a specialization first".into());
                };
                let draft = CourseDraft {
                    title,
                    description: opt(field(1)),
                    specialization_id: spec_id,
                    image_url: None,
                };
                let image = path_of(field(2));
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditCourse(id) => {
                            client.update_course(id, &draft, image.as_deref()).await
                        }
                        _ => client.create_course(&draft, image.as_deref()).await,
                    };
                    send_mutation(tx, result, "Course saved.", Refresh::Courses);
                });
            }
            FormKind::NewLevel | FormKind::EditLevel(_) => {
                let name = field(0);
                if let Err(e) = validate::require_nonempty("Name", &name) {
                    fail!(e);
                }
                let (Some(course_id), Some(instructor_id)) =
                    (self.selection.course_id(), self.selection.instructor_id())
                else {
                    fail!("Select a course and instructor first".into());
                };
                let draft = LevelDraft {
                    name,
                    order: num_i64(&field(1)),
                    price_usd: num_f64(&field(2)),
                    price_sar: num_f64(&field(3)),
                    is_free: form.fields[4].is_on(),
                    preview_url: opt(field(5)),
                    download_url: opt(field(6)),
                    instructor_id,
                };
                let image = path_of(field(7));
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditLevel(id) => {
                            client.update_level(id, &draft, image.as_deref()).await
                        }
                        _ => client.create_level(course_id, &draft, image.as_deref()).await,
                    };
                    send_mutation(tx, result, "Level saved.", Refresh::Levels);
                });
            }
            FormKind::NewLesson | FormKind::EditLesson(_) => {
                let title = field(0);
                if let Err(e) = validate::require_nonempty("Title", &title) {
                    fail!(e);
                }
                let youtube_url = field(2);
                let youtube_id = match validate::check_format(&youtube_url) {
                    Ok(id) => id,
                    Err(v) => fail!(v.message),
                };
                let Some(level_id) = self.selection.level_id() else {
                    fail!("Select a level first".into());
                };
                let draft = LessonDraft {
                    title,
                    description: opt(field(1)),
                    youtube_url,
                    youtube_id,
                    google_drive_url: opt(field(3)),
                    duration_sec: field(4).parse().ok(),
                    order_index: num_i64(&field(5)),
                    is_free_preview: form.fields[6].is_on(),
                };
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditLesson(id) => client.update_lesson(id, &draft).await,
                        _ => client.create_lesson(level_id, &draft).await,
                    };
                    send_mutation(tx, result, "Lesson saved.", Refresh::Content);
                });
            }
            FormKind::UploadFile => {
                let Some(path) = path_of(field(0)) else {
                    fail!("File path is required".into());
                };
                let Some(level_id) = self.selection.level_id() else {
                    fail!("Select a level first".into());
                };
                tokio::spawn(async move {
                    let result = client.upload_file(level_id, &path).await.map(|file| {
                        MutationReceipt {
                            success: true,
                            message: Some(format!(
                                "Uploaded {} ({})",
                                file.name.as_deref().unwrap_or("file"),
                                file.human_size()
                            )),
                        }
                    });
                    send_mutation(tx, result, "File uploaded.", Refresh::Content);
                });
            }
            FormKind::NewQuestion | FormKind::EditQuestion(_) => {
                let text = field(0);
                let options = form.option_values();
                if let Err(e) = validate::validate_question(&text, &options) {
                    fail!(e);
                }
                let Some(level_id) = self.selection.level_id() else {
                    fail!("Select a level first".into());
                };
                let draft = QuestionDraft {
                    text,
                    order: None,
                    options,
                };
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditQuestion(id) => client.update_question(id, &draft).await,
                        _ => client.create_question(level_id, &draft).await,
                    };
                    send_mutation(tx, result, "Question saved.", Refresh::Content);
                });
            }
            FormKind::NewSetting | FormKind::EditSetting(_) => {
                let key = field(0);
                let value = field(1);
                if let Err(e) = validate::require_nonempty("Key", &key) {
                    fail!(e);
                }
                let kind = form.kind.clone();
                tokio::spawn(async move {
                    let result = match kind {
                        FormKind::EditSetting(key) => client.update_setting(&key, &value).await,
                        _ => client.add_setting(&key, &value).await,
                    };
                    send_mutation(tx, result, "Setting saved.", Refresh::Root);
                });
            }
            FormKind::EditContact => {
                let values: std::collections::HashMap<String, String> = [
                    ("whatsapp".to_string(), field(0)),
                    ("telegram".to_string(), field(1)),
                ]
                .into();
                tokio::spawn(async move {
                    let result = client.update_all_settings(&values).await;
                    send_mutation(tx, result, "Contact info saved.", Refresh::Root);
                });
            }
        }

        if let Some(form) = self.form.as_mut() {
            form.submitting = true;
            form.error = None;
        }
    }

    /// Fire the confirmed delete in the background.
    pub fn run_confirmed(&mut self) {
        let Some(confirm) = self.confirm.clone() else {
            return;
        };
        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.status_message = "Deleting…".into();
        tokio::spawn(async move {
            let (result, refresh) = match confirm {
                Confirm::DeleteSpecialization(id) => {
                    (client.delete_specialization(id).await, Refresh::Root)
                }
                Confirm::DeleteCourse(id) => (client.delete_course(id).await, Refresh::Courses),
                Confirm::DeleteLevel(id) => (client.delete_level(id).await, Refresh::Levels),
                Confirm::DeleteLesson(id) => (client.delete_lesson(id).await, Refresh::Content),
                Confirm::DeleteFile(id) => (client.delete_file(id).await, Refresh::Content),
                Confirm::DeleteQuestion(id) => {
                    (client.delete_question(id).await, Refresh::Content)
                }
            };
            send_mutation(tx, result, "Deleted.", refresh);
        });
        self.confirm = None;
    }

    /// Toggle the active flag of the row under the cursor.
    pub fn toggle_selected_active(&mut self) {
        let target: Option<(u64, bool, Refresh, &'static str)> = match self.browse_pane {
            BrowsePane::Specializations => self
                .visible_specializations()
                .get(self.spec_list.selected)
                .map(|s| (s.id, !s.is_active, Refresh::Root, "specialization")),
            BrowsePane::Courses => self
                .visible_courses()
                .get(self.course_list.selected)
                .map(|c| (c.id, !c.is_active, Refresh::Courses, "course")),
            BrowsePane::Levels => self
                .visible_levels()
                .get(self.level_list.selected)
                .map(|l| (l.id, !l.is_active, Refresh::Levels, "level")),
            BrowsePane::Content if self.content_tab == ContentTab::Lessons => self
                .visible_lessons()
                .page_items
                .get(self.content_list.selected)
                .map(|l| (l.id, !l.is_active, Refresh::Content, "lesson")),
            _ => None,
        };
        let Some((id, active, refresh, what)) = target else {
            return;
        };

        let client = self.client.clone();
        let tx = self.outcome_tx.clone();
        self.status_message = format!("Updating {what}…");
        tokio::spawn(async move {
            let result = match refresh {
                Refresh::Root => client.set_specialization_active(id, active).await,
                Refresh::Courses => client.set_course_active(id, active).await,
                Refresh::Levels => client.set_level_active(id, active).await,
                _ => client.set_lesson_active(id, active).await,
            };
            let done = if active { "activated" } else { "deactivated" };
            send_mutation(tx, result, format!("Row {done}."), refresh);
        });
    }
}

fn send_mutation(
    tx: mpsc::UnboundedSender<Outcome>,
    result: Result<MutationReceipt, crate::api::AdminError>,
    fallback: impl Into<String>,
    refresh: Refresh,
) {
    let outcome = match result {
        Ok(receipt) => Outcome::Mutation {
            success: true,
            message: receipt.message.unwrap_or_else(|| fallback.into()),
            refresh,
        },
        Err(e) => Outcome::Mutation {
            success: false,
            message: e.to_string(),
            refresh: Refresh::Nothing,
        },
    };
    let _ = tx.send(outcome);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> App {
        let client = AdminClient::new(
            "https://admin.example.com",
            "https://cdn.example.com",
            "token",
        )
        .unwrap();
        App::new(client)
    }

    fn course(id: u64, title: &str) -> Course {
        Course {
            id,
            title: Some(title.to_string()),
            description: None,
            specialization_id: Some(1),
            image_url: None,
            is_active: true,
        }
    }

    #[test]
    fn stale_course_list_is_discarded() {
        let mut app = app();
        let first = app.selection.choose_specialization(1);
        // The user flips to another specialization before the fetch lands.
        let second = app.selection.choose_specialization(2);

        app.apply_outcome(Outcome::Courses {
            generation: first,
            result: Ok(vec![course(10, "outdated")]),
        });
        assert!(app.courses.is_empty());

        app.apply_outcome(Outcome::Courses {
            generation: second,
            result: Ok(vec![course(20, "current")]),
        });
        assert_eq!(app.courses.len(), 1);
        assert_eq!(app.courses[0].id, 20);
    }

    #[test]
    fn failed_fetch_clears_the_list_but_keeps_the_selection() {
        let mut app = app();
        let generation = app.selection.choose_specialization(1);
        app.apply_outcome(Outcome::Courses {
            generation,
            result: Ok(vec![course(10, "Algebra")]),
        });
        assert_eq!(app.courses.len(), 1);

        // A later refresh under the same selection fails.
        app.apply_outcome(Outcome::Courses {
            generation,
            result: Err("server exploded".into()),
        });
        assert!(app.courses.is_empty());
        assert_eq!(app.selection.specialization_id(), Some(1));
        assert!(app.status_message.contains("failed"));
    }

    #[test]
    fn failed_mutation_keeps_the_form_open_with_input() {
        let mut app = app();
        app.open_form(FormKind::NewSpecialization);
        app.form.as_mut().unwrap().fields[0].value = "Physics".into();

        app.apply_outcome(Outcome::Mutation {
            success: false,
            message: "duplicate name".into(),
            refresh: Refresh::Nothing,
        });

        let form = app.form.as_ref().expect("form should stay open");
        assert_eq!(form.fields[0].value, "Physics");
        assert_eq!(form.error.as_deref(), Some("duplicate name"));
    }

    #[test]
    fn successful_mutation_closes_the_form() {
        let mut app = app();
        app.open_form(FormKind::NewSetting);
        app.apply_outcome(Outcome::Mutation {
            success: true,
            message: "Setting saved.".into(),
            refresh: Refresh::Root,
        });
        assert!(app.form.is_none());
        assert!(app.needs_root_refresh);
    }

    #[test]
    fn stale_link_probe_is_discarded() {
        let mut app = app();
        app.open_form(FormKind::NewLesson);
        // The probe answers for a URL the user has since edited away.
        if let Some(form) = app.form.as_mut() {
            if let Some(field) = form.fields.iter_mut().find(|f| f.kind == FieldKind::Url) {
                field.value = "https://youtu.be/aaaaaaaaaaa".into();
            }
        }
        app.apply_outcome(Outcome::LinkProbe {
            url: "https://youtu.be/bbbbbbbbbbb".into(),
            verdict: LinkCheck {
                is_valid: true,
                message: "Video available".into(),
                checking: false,
                exists: true,
            },
        });
        assert!(matches!(
            app.form.as_ref().unwrap().link,
            LinkCycle::Idle
        ));
    }
}
