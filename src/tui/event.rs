use crossterm::event::{self, Event, KeyCode, KeyModifiers};
use std::time::Duration;

use super::{App, BrowsePane, Confirm, ContentTab, FieldKind, FormKind, Tab};

pub fn poll_event(timeout: Duration) -> anyhow::Result<Option<Event>> {
    if event::poll(timeout)? {
        Ok(Some(event::read()?))
    } else {
        Ok(None)
    }
}

pub fn handle_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    // ── Modal layers intercept all keys while open ────────────────────
    if app.form.is_some() {
        handle_form_key(app, code, modifiers);
        return;
    }
    if app.confirm.is_some() {
        handle_confirm_key(app, code);
        return;
    }
    if app.search_active {
        handle_search_key(app, code);
        return;
    }

    match (code, modifiers) {
        (KeyCode::Char('q'), _) | (KeyCode::Char('c'), KeyModifiers::CONTROL) => {
            app.running = false;
            return;
        }
        (KeyCode::Tab, _) => {
            app.active_tab = app.active_tab.next();
            return;
        }
        (KeyCode::BackTab, _) => {
            app.active_tab = app.active_tab.prev();
            return;
        }
        (KeyCode::Char('1'), _) => {
            app.active_tab = Tab::Dashboard;
            return;
        }
        (KeyCode::Char('2'), _) => {
            app.active_tab = Tab::Browse;
            return;
        }
        (KeyCode::Char('3'), _) => {
            app.active_tab = Tab::Settings;
            return;
        }
        _ => {}
    }

    match code {
        KeyCode::Down | KeyCode::Char('j') => {
            app.active_list_state_mut().select_next();
        }
        KeyCode::Up | KeyCode::Char('k') => {
            app.active_list_state_mut().select_prev();
        }
        KeyCode::Home | KeyCode::Char('g') => {
            app.active_list_state_mut().selected = 0;
        }
        KeyCode::End | KeyCode::Char('G') => {
            let ls = app.active_list_state_mut();
            if ls.len > 0 {
                ls.selected = ls.len - 1;
            }
        }
        KeyCode::Left | KeyCode::Char('h') if app.active_tab == Tab::Browse => {
            app.browse_pane = app.browse_pane.left();
        }
        KeyCode::Right | KeyCode::Char('l') if app.active_tab == Tab::Browse => {
            app.browse_pane = app.browse_pane.right();
        }
        KeyCode::Enter => match app.active_tab {
            Tab::Browse => app.select_in_focused_pane(),
            Tab::Settings => edit_selected_setting(app),
            Tab::Dashboard => {}
        },
        KeyCode::Esc | KeyCode::Backspace if app.active_tab == Tab::Browse => {
            app.back_out();
        }
        KeyCode::Char('R') if app.active_tab == Tab::Browse => {
            app.reset_selection();
        }
        KeyCode::Char(']') if app.active_tab == Tab::Browse => {
            app.content_tab = app.content_tab.next();
            app.content_list.selected = 0;
            app.sync_content_len();
        }
        KeyCode::Char('/') => {
            app.search_active = true;
        }
        KeyCode::Char('s') => app.cycle_sort_key(),
        KeyCode::Char('d') => app.toggle_sort_dir(),
        KeyCode::Char('f') => app.cycle_field_filter(),
        KeyCode::Char('n') => app.page_step(1),
        KeyCode::Char('p') => app.page_step(-1),
        KeyCode::Char('a') => open_add_form(app),
        KeyCode::Char('e') => open_edit_form(app),
        KeyCode::Char('D') => request_delete(app),
        KeyCode::Char('t') => app.toggle_selected_active(),
        KeyCode::Char('u')
            if app.active_tab == Tab::Browse && app.browse_pane == BrowsePane::Content =>
        {
            app.open_form(FormKind::UploadFile);
        }
        KeyCode::Char('c') if app.active_tab == Tab::Settings => {
            app.open_form(FormKind::EditContact);
        }
        KeyCode::Char('r') if !app.loading => {
            app.needs_root_refresh = true;
        }
        _ => {}
    }
}

// ── Search input ──────────────────────────────────────────────────────

fn handle_search_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Esc => {
            app.search_clear();
            app.search_active = false;
        }
        KeyCode::Enter => {
            app.search_active = false;
        }
        KeyCode::Backspace => app.search_pop(),
        KeyCode::Char(c) => app.search_push(c),
        _ => {}
    }
}

// ── Delete confirmation ───────────────────────────────────────────────

fn handle_confirm_key(app: &mut App, code: KeyCode) {
    match code {
        KeyCode::Char('y') | KeyCode::Char('Y') => app.run_confirmed(),
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.confirm = None;
        }
        _ => {}
    }
}

// ── Form input ────────────────────────────────────────────────────────

fn handle_form_key(app: &mut App, code: KeyCode, modifiers: KeyModifiers) {
    if app.form.as_ref().is_none_or(|f| f.submitting) {
        return;
    }

    match (code, modifiers) {
        (KeyCode::Esc, _) => {
            app.form = None;
            return;
        }
        (KeyCode::Enter, _) => {
            app.submit_form();
            return;
        }
        (KeyCode::Char('a'), KeyModifiers::CONTROL) => {
            app.form_add_option();
            return;
        }
        (KeyCode::Char('d'), KeyModifiers::CONTROL) => {
            app.form_remove_option();
            return;
        }
        _ => {}
    }

    let Some(form) = app.form.as_mut() else {
        return;
    };
    let mut url_edited = false;
    match (code, modifiers) {
        (KeyCode::Up, _) => {
            form.cursor = form.cursor.saturating_sub(1);
        }
        (KeyCode::Down, _) | (KeyCode::Tab, _) => {
            if form.cursor + 1 < form.fields.len() {
                form.cursor += 1;
            } else if code == KeyCode::Tab {
                form.cursor = 0;
            }
        }
        (KeyCode::Backspace, _) => {
            let field = &mut form.fields[form.cursor];
            field.value.pop();
            url_edited = field.kind == FieldKind::Url;
        }
        (KeyCode::Char(' '), _) => {
            let kind = form.fields[form.cursor].kind;
            match kind {
                FieldKind::Flag => {
                    let field = &mut form.fields[form.cursor];
                    let on = field.is_on();
                    field.value = if on { "false" } else { "true" }.into();
                }
                FieldKind::Option => {
                    form.correct_option = form.cursor;
                }
                _ => {
                    form.fields[form.cursor].value.push(' ');
                }
            }
        }
        (KeyCode::Char(c), _) => {
            let field = &mut form.fields[form.cursor];
            if field.kind != FieldKind::Flag {
                field.value.push(c);
                url_edited = field.kind == FieldKind::Url;
            }
        }
        _ => {}
    }

    if url_edited {
        app.on_url_edited();
    }
}

// ── Context-sensitive add/edit/delete ─────────────────────────────────

fn open_add_form(app: &mut App) {
    match app.active_tab {
        Tab::Settings => app.open_form(FormKind::NewSetting),
        Tab::Browse => match app.browse_pane {
            BrowsePane::Specializations => app.open_form(FormKind::NewSpecialization),
            BrowsePane::Courses => app.open_form(FormKind::NewCourse),
            BrowsePane::Instructors => {}
            BrowsePane::Levels => app.open_form(FormKind::NewLevel),
            BrowsePane::Content => match app.content_tab {
                ContentTab::Lessons => app.open_form(FormKind::NewLesson),
                ContentTab::Files => app.open_form(FormKind::UploadFile),
                ContentTab::Quiz => app.open_form(FormKind::NewQuestion),
            },
        },
        Tab::Dashboard => {}
    }
}

fn open_edit_form(app: &mut App) {
    match app.active_tab {
        Tab::Settings => edit_selected_setting(app),
        Tab::Browse => match app.browse_pane {
            BrowsePane::Specializations => {
                if let Some(spec) = app.visible_specializations().get(app.spec_list.selected) {
                    let id = spec.id;
                    app.open_form(FormKind::EditSpecialization(id));
                }
            }
            BrowsePane::Courses => {
                if let Some(course) = app.visible_courses().get(app.course_list.selected) {
                    let id = course.id;
                    app.open_form(FormKind::EditCourse(id));
                }
            }
            BrowsePane::Instructors => {}
            BrowsePane::Levels => {
                if let Some(level) = app.visible_levels().get(app.level_list.selected) {
                    let id = level.id;
                    app.open_form(FormKind::EditLevel(id));
                }
            }
            BrowsePane::Content => match app.content_tab {
                ContentTab::Lessons => {
                    if let Some(lesson) =
                        app.visible_lessons().page_items.get(app.content_list.selected)
                    {
                        let id = lesson.id;
                        app.open_form(FormKind::EditLesson(id));
                    }
                }
                ContentTab::Files => {}
                ContentTab::Quiz => {
                    if let Some(question) =
                        app.visible_questions().page_items.get(app.content_list.selected)
                    {
                        let id = question.id;
                        app.open_form(FormKind::EditQuestion(id));
                    }
                }
            },
        },
        Tab::Dashboard => {}
    }
}

fn edit_selected_setting(app: &mut App) {
    if let Some(setting) = app
        .visible_settings()
        .page_items
        .get(app.settings_list.selected)
    {
        let key = setting.key.clone();
        app.open_form(FormKind::EditSetting(key));
    }
}

fn request_delete(app: &mut App) {
    let confirm = match app.active_tab {
        Tab::Browse => match app.browse_pane {
            BrowsePane::Specializations => app
                .visible_specializations()
                .get(app.spec_list.selected)
                .map(|s| Confirm::DeleteSpecialization(s.id)),
            BrowsePane::Courses => app
                .visible_courses()
                .get(app.course_list.selected)
                .map(|c| Confirm::DeleteCourse(c.id)),
            BrowsePane::Instructors => None,
            BrowsePane::Levels => app
                .visible_levels()
                .get(app.level_list.selected)
                .map(|l| Confirm::DeleteLevel(l.id)),
            BrowsePane::Content => match app.content_tab {
                ContentTab::Lessons => app
                    .visible_lessons()
                    .page_items
                    .get(app.content_list.selected)
                    .map(|l| Confirm::DeleteLesson(l.id)),
                ContentTab::Files => app
                    .visible_files()
                    .page_items
                    .get(app.content_list.selected)
                    .map(|f| Confirm::DeleteFile(f.id)),
                ContentTab::Quiz => app
                    .visible_questions()
                    .page_items
                    .get(app.content_list.selected)
                    .map(|q| Confirm::DeleteQuestion(q.id)),
            },
        },
        _ => None,
    };
    if let Some(confirm) = confirm {
        app.confirm = Some(confirm);
    }
}
