use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph, Row, Table, Tabs, Wrap},
    Frame,
};
use unicode_width::UnicodeWidthChar;

use super::{App, BrowsePane, ContentTab, FieldKind, LinkCycle, Tab};
use crate::selection::SelectionStage;
use crate::view::ViewQuery;
use chrono::Local;

const ACCENT: Color = Color::Cyan;
const HEADER_BG: Color = Color::DarkGray;
const SELECTED_BG: Color = Color::Rgb(40, 40, 60);
const DIM: Color = Color::DarkGray;
const GOOD: Color = Color::Green;
const WARN: Color = Color::Yellow;
const BAD: Color = Color::Red;

const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

// ─── Main render ────────────────────────────────────────────────────────────

pub fn render(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_tabs(f, app, chunks[0]);
    render_clock(f, chunks[0]);

    match app.active_tab {
        Tab::Dashboard => render_dashboard(f, app, chunks[1]),
        Tab::Browse => render_browse(f, app, chunks[1]),
        Tab::Settings => render_settings(f, app, chunks[1]),
    }

    render_status_bar(f, app, chunks[2]);

    if app.form.is_some() {
        render_form(f, app);
    }
    if let Some(confirm) = &app.confirm {
        render_confirm(f, confirm.prompt());
    }
}

// ─── Tab Bar ────────────────────────────────────────────────────────────────

fn render_tabs(f: &mut Frame, app: &App, area: Rect) {
    let titles: Vec<Line> = Tab::ALL
        .iter()
        .enumerate()
        .map(|(i, tab)| {
            Line::from(vec![
                Span::styled(format!(" {} ", i + 1), Style::default().fg(DIM)),
                Span::styled(format!("{} ", tab.title()), Style::default().fg(Color::White)),
            ])
        })
        .collect();

    let selected = Tab::ALL
        .iter()
        .position(|t| *t == app.active_tab)
        .unwrap_or(0);

    let tabs = Tabs::new(titles)
        .block(
            Block::default()
                .borders(Borders::BOTTOM)
                .title(" coursedesk ")
                .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        )
        .select(selected)
        .highlight_style(
            Style::default()
                .fg(ACCENT)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED),
        );

    f.render_widget(tabs, area);
}

// ─── Clock ──────────────────────────────────────────────────────────────────

fn render_clock(f: &mut Frame, tab_area: Rect) {
    let time_str = format!(" {} ", Local::now().format("%a %b %d  %H:%M:%S"));
    let clock_width = time_str.len() as u16;
    let clock_area = Rect {
        x: tab_area.right().saturating_sub(clock_width),
        y: tab_area.y,
        width: clock_width.min(tab_area.width),
        height: 1,
    };
    f.render_widget(
        Paragraph::new(time_str).style(Style::default().fg(ACCENT)),
        clock_area,
    );
}

// ─── Status Bar ─────────────────────────────────────────────────────────────

fn render_status_bar(f: &mut Frame, app: &App, area: Rect) {
    let sync_hint = app
        .cached_at
        .map(|t| format!("  synced {}", t.with_timezone(&Local).format("%b %d %H:%M")))
        .unwrap_or_default();

    let spinner = if app.loading {
        format!(" {} ", SPINNER[(app.frame_count / 2) as usize % SPINNER.len()])
    } else {
        "  ".into()
    };

    let status = Paragraph::new(Line::from(vec![
        Span::styled(spinner, Style::default().fg(WARN)),
        Span::styled(&app.status_message, Style::default().fg(Color::White)),
        Span::styled(sync_hint, Style::default().fg(DIM)),
    ]));
    f.render_widget(status, area);
}

// ─── Dashboard ──────────────────────────────────────────────────────────────

fn render_dashboard(f: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(7), Constraint::Min(0)])
        .split(area);

    let path = selection_path(app);
    let overview = vec![
        Line::from(vec![
            Span::styled("Specializations: ", Style::default().fg(DIM)),
            Span::raw(app.specializations.len().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Settings keys:   ", Style::default().fg(DIM)),
            Span::raw(app.settings.len().to_string()),
        ]),
        Line::from(vec![
            Span::styled("Contact:         ", Style::default().fg(DIM)),
            Span::raw(format!(
                "whatsapp {}  telegram {}",
                app.contact.whatsapp.as_deref().unwrap_or("—"),
                app.contact.telegram.as_deref().unwrap_or("—"),
            )),
        ]),
        Line::from(vec![
            Span::styled("Selection:       ", Style::default().fg(DIM)),
            Span::styled(path, Style::default().fg(ACCENT)),
        ]),
    ];
    f.render_widget(
        Paragraph::new(overview).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Overview ")
                .title_style(Style::default().fg(ACCENT)),
        ),
        chunks[0],
    );

    let help = vec![
        Line::from("  2          open the catalog"),
        Line::from("  h/l        move between cascade columns"),
        Line::from("  Enter      drill into the highlighted row"),
        Line::from("  Backspace  back out one level        R  clear the selection"),
        Line::from("  /          search    s sort key    d direction    f filter"),
        Line::from("  n/p        next/previous page"),
        Line::from("  a/e/D/t    add, edit, delete, toggle active"),
        Line::from("  u          upload a file to the selected level"),
        Line::from("  c          edit contact info (settings tab)"),
        Line::from("  r          re-sync     q quit"),
    ];
    f.render_widget(
        Paragraph::new(help).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Keys ")
                .title_style(Style::default().fg(ACCENT)),
        ),
        chunks[1],
    );
}

fn selection_path(app: &App) -> String {
    let name_of = |id: Option<u64>, f: &dyn Fn(u64) -> Option<String>| -> Option<String> {
        id.and_then(f)
    };
    let spec = name_of(app.selection.specialization_id(), &|id| {
        app.specializations
            .iter()
            .find(|s| s.id == id)
            .and_then(|s| s.name.clone())
    });
    let course = name_of(app.selection.course_id(), &|id| {
        app.courses.iter().find(|c| c.id == id).and_then(|c| c.title.clone())
    });
    let instructor = name_of(app.selection.instructor_id(), &|id| {
        app.instructors.iter().find(|i| i.id == id).and_then(|i| i.name.clone())
    });
    let level = name_of(app.selection.level_id(), &|id| {
        app.levels.iter().find(|l| l.id == id).and_then(|l| l.name.clone())
    });

    let parts: Vec<String> = [spec, course, instructor, level]
        .into_iter()
        .flatten()
        .collect();
    if parts.is_empty() {
        "(nothing selected)".into()
    } else {
        parts.join(" > ")
    }
}

// ─── Catalog tab ────────────────────────────────────────────────────────────

fn render_browse(f: &mut Frame, app: &mut App, area: Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(area);

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(rows[0]);

    render_spec_column(f, app, columns[0]);
    render_course_column(f, app, columns[1]);
    render_instructor_column(f, app, columns[2]);
    render_level_column(f, app, columns[3]);
    render_content(f, app, rows[1]);
}

fn column_block(app: &App, pane: BrowsePane, title: String) -> Block<'static> {
    let focused = app.browse_pane == pane;
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };
    let mut title = title;
    if focused && (app.search_active || !app.pane_search.is_empty()) {
        title = format!("{title} /{}", app.pane_search);
    }
    Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(title)
        .title_style(Style::default().fg(if focused { ACCENT } else { DIM }))
}

fn render_items(
    f: &mut Frame,
    area: Rect,
    block: Block<'static>,
    items: Vec<ListItem<'static>>,
    state: &mut super::ListState,
) {
    state.inner.select(Some(state.selected));
    let list = List::new(items)
        .block(block)
        .highlight_style(Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD));
    f.render_stateful_widget(list, area, &mut state.inner);
}

fn active_dot(active: bool) -> Span<'static> {
    if active {
        Span::styled("● ", Style::default().fg(GOOD))
    } else {
        Span::styled("○ ", Style::default().fg(DIM))
    }
}

fn render_spec_column(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let items: Vec<ListItem> = app
        .visible_specializations()
        .iter()
        .map(|s| {
            ListItem::new(Line::from(vec![
                active_dot(s.is_active),
                Span::raw(truncate(s.name.as_deref().unwrap_or("Unnamed"), width)),
            ]))
        })
        .collect();
    let block = column_block(app, BrowsePane::Specializations, " Specializations ".into());
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(empty_hint(app.specializations.is_empty())).block(block),
            area,
        );
        return;
    }
    render_items(f, area, block, items, &mut app.spec_list);
}

fn render_course_column(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let block = column_block(app, BrowsePane::Courses, " Courses ".into());
    if app.selection.stage() < SelectionStage::SpecializationChosen {
        f.render_widget(
            Paragraph::new(Span::styled("Pick a specialization", Style::default().fg(DIM)))
                .block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = app
        .visible_courses()
        .iter()
        .map(|c| {
            ListItem::new(Line::from(vec![
                active_dot(c.is_active),
                Span::raw(truncate(c.title.as_deref().unwrap_or("Untitled"), width)),
            ]))
        })
        .collect();
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(empty_hint(app.courses.is_empty())).block(block),
            area,
        );
        return;
    }
    render_items(f, area, block, items, &mut app.course_list);
}

fn render_instructor_column(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(4) as usize;
    let block = column_block(app, BrowsePane::Instructors, " Instructors ".into());
    if app.selection.stage() < SelectionStage::CourseChosen {
        f.render_widget(
            Paragraph::new(Span::styled("Pick a course", Style::default().fg(DIM))).block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = app
        .instructors
        .iter()
        .map(|i| {
            let levels = format!(" ({} levels)", i.level_ids.len());
            ListItem::new(Line::from(vec![
                Span::raw(truncate(i.name.as_deref().unwrap_or("Unnamed"), width)),
                Span::styled(levels, Style::default().fg(DIM)),
            ]))
        })
        .collect();
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(Span::styled("No instructors", Style::default().fg(DIM))).block(block),
            area,
        );
        return;
    }
    render_items(f, area, block, items, &mut app.instructor_list);
}

fn render_level_column(f: &mut Frame, app: &mut App, area: Rect) {
    let width = area.width.saturating_sub(12) as usize;
    let block = column_block(app, BrowsePane::Levels, " Levels ".into());
    if app.selection.stage() < SelectionStage::InstructorChosen {
        f.render_widget(
            Paragraph::new(Span::styled("Pick an instructor", Style::default().fg(DIM)))
                .block(block),
            area,
        );
        return;
    }
    let items: Vec<ListItem> = app
        .visible_levels()
        .iter()
        .map(|l| {
            let price = if l.is_free {
                " free".to_string()
            } else {
                format!(" ${:.0}", l.price_usd.unwrap_or(0.0))
            };
            ListItem::new(Line::from(vec![
                active_dot(l.is_active),
                Span::raw(truncate(l.name.as_deref().unwrap_or("Unnamed"), width)),
                Span::styled(price, Style::default().fg(DIM)),
            ]))
        })
        .collect();
    if items.is_empty() {
        f.render_widget(
            Paragraph::new(empty_hint(app.levels.is_empty())).block(block),
            area,
        );
        return;
    }
    render_items(f, area, block, items, &mut app.level_list);
}

// ─── Content pane ───────────────────────────────────────────────────────────

fn render_content(f: &mut Frame, app: &mut App, area: Rect) {
    let focused = app.browse_pane == BrowsePane::Content;
    let border = if focused {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(DIM)
    };

    let tab_titles = ContentTab::ALL
        .iter()
        .map(|t| t.title())
        .collect::<Vec<_>>()
        .join(" ] [ ");
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border)
        .title(format!(
            " {} — [ {} ] ",
            app.content_tab.title(),
            tab_titles
        ))
        .title_style(Style::default().fg(if focused { ACCENT } else { DIM }));

    let inner = block.inner(area);
    f.render_widget(block, area);

    if app.selection.stage() < SelectionStage::LevelChosen {
        f.render_widget(
            Paragraph::new(Span::styled(
                "Pick a level to load its lessons, files, and quiz",
                Style::default().fg(DIM),
            )),
            inner,
        );
        return;
    }
    if app.content.is_none() {
        f.render_widget(
            Paragraph::new(Span::styled("Loading content…", Style::default().fg(DIM))),
            inner,
        );
        return;
    }

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .split(inner);

    match app.content_tab {
        ContentTab::Lessons => render_lessons_table(f, app, chunks[0]),
        ContentTab::Files => render_files_table(f, app, chunks[0]),
        ContentTab::Quiz => render_quiz_table(f, app, chunks[0]),
    }

    let (query, total) = match app.content_tab {
        ContentTab::Lessons => (&app.lesson_query, app.visible_lessons().total_pages),
        ContentTab::Files => (&app.file_query, app.visible_files().total_pages),
        ContentTab::Quiz => (&app.question_query, app.visible_questions().total_pages),
    };
    f.render_widget(query_footer(query, total), chunks[1]);
}

fn query_footer(query: &ViewQuery, total_pages: usize) -> Paragraph<'static> {
    let filters: Vec<String> = query
        .field_filters
        .iter()
        .filter(|(_, v)| !v.is_empty() && v != "all")
        .map(|(k, v)| format!("{k}={v}"))
        .collect();
    let mut parts = vec![format!(
        "sort {} {}  page {}/{}",
        query.sort_key,
        query.sort_dir.arrow(),
        query.page,
        total_pages.max(1)
    )];
    if !query.search_term.is_empty() {
        parts.push(format!("search \"{}\"", query.search_term));
    }
    if !filters.is_empty() {
        parts.push(filters.join(" "));
    }
    Paragraph::new(Span::styled(parts.join("   "), Style::default().fg(DIM)))
}

fn table_header(cells: &[&'static str]) -> Row<'static> {
    Row::new(cells.iter().map(|c| *c).collect::<Vec<_>>())
        .style(Style::default().bg(HEADER_BG).add_modifier(Modifier::BOLD))
}

fn empty_hint(raw_empty: bool) -> Span<'static> {
    if raw_empty {
        Span::styled("No data yet", Style::default().fg(DIM))
    } else {
        Span::styled("Nothing matches the current filter", Style::default().fg(DIM))
    }
}

fn render_lessons_table(f: &mut Frame, app: &mut App, area: Rect) {
    let page = app.visible_lessons();
    let raw_empty = app.content.as_ref().is_none_or(|c| c.lessons.is_empty());
    if page.page_items.is_empty() {
        let hint = if raw_empty {
            "No lessons in this level yet"
        } else {
            "No lessons match the current filter"
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(DIM))),
            area,
        );
        return;
    }

    let rows: Vec<Row> = page
        .page_items
        .iter()
        .enumerate()
        .map(|(i, l)| {
            let style = if i == app.content_list.selected {
                Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let duration = l
                .duration_sec
                .map(|s| format!("{}:{:02}", s / 60, s % 60))
                .unwrap_or_else(|| "—".into());
            Row::new(vec![
                l.order_index.map(|o| o.to_string()).unwrap_or_default(),
                l.title.clone().unwrap_or_else(|| "Untitled".into()),
                duration,
                l.youtube_id.clone().unwrap_or_default(),
                if l.is_free_preview { "free".into() } else { String::new() },
                if l.is_active { "active".into() } else { "inactive".into() },
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Length(4),
            Constraint::Min(20),
            Constraint::Length(7),
            Constraint::Length(12),
            Constraint::Length(5),
            Constraint::Length(8),
        ],
    )
    .header(table_header(&["#", "Title", "Len", "Video", "Prev", "Status"]));
    f.render_widget(table, area);
}

fn render_files_table(f: &mut Frame, app: &mut App, area: Rect) {
    let page = app.visible_files();
    let raw_empty = app.content.as_ref().is_none_or(|c| c.files.is_empty());
    if page.page_items.is_empty() {
        let hint = if raw_empty {
            "No files attached to this level yet"
        } else {
            "No files match the current filter"
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(DIM))),
            area,
        );
        return;
    }

    let rows: Vec<Row> = page
        .page_items
        .iter()
        .enumerate()
        .map(|(i, file)| {
            let style = if i == app.content_list.selected {
                Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD)
            } else {
                Style::default()
            };
            let created = file
                .created_at
                .map(|t| t.with_timezone(&Local).format("%b %d %Y").to_string())
                .unwrap_or_else(|| "—".into());
            Row::new(vec![
                file.name.clone().unwrap_or_else(|| "unnamed".into()),
                file.kind_label().to_string(),
                file.human_size(),
                created,
                file.url
                    .as_deref()
                    .map(|u| app.client.asset_url(u))
                    .unwrap_or_default(),
            ])
            .style(style)
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Min(18),
            Constraint::Length(9),
            Constraint::Length(10),
            Constraint::Length(12),
            Constraint::Min(20),
        ],
    )
    .header(table_header(&["Name", "Kind", "Size", "Added", "URL"]));
    f.render_widget(table, area);
}

fn render_quiz_table(f: &mut Frame, app: &mut App, area: Rect) {
    let page = app.visible_questions();
    let raw_empty = app.content.as_ref().is_none_or(|c| c.questions.is_empty());
    if page.page_items.is_empty() {
        let hint = if raw_empty {
            "No quiz questions for this level yet"
        } else {
            "No questions match the current filter"
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(DIM))),
            area,
        );
        return;
    }

    let items: Vec<ListItem> = page
        .page_items
        .iter()
        .map(|q| {
            let correct = q
                .options
                .iter()
                .find(|o| o.is_correct)
                .map(|o| o.text.clone())
                .unwrap_or_else(|| "?".into());
            ListItem::new(vec![
                Line::from(Span::raw(q.text.clone().unwrap_or_else(|| "…".into()))),
                Line::from(Span::styled(
                    format!("    {} options, correct: {}", q.options.len(), correct),
                    Style::default().fg(DIM),
                )),
            ])
        })
        .collect();
    render_items(
        f,
        area,
        Block::default().borders(Borders::NONE),
        items,
        &mut app.content_list,
    );
}

// ─── Settings tab ───────────────────────────────────────────────────────────

fn render_settings(f: &mut Frame, app: &mut App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let contact = vec![
        Line::from(vec![
            Span::styled("whatsapp: ", Style::default().fg(DIM)),
            Span::raw(app.contact.whatsapp.clone().unwrap_or_else(|| "—".into())),
        ]),
        Line::from(vec![
            Span::styled("telegram: ", Style::default().fg(DIM)),
            Span::raw(app.contact.telegram.clone().unwrap_or_else(|| "—".into())),
        ]),
    ];
    f.render_widget(
        Paragraph::new(contact).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Contact ")
                .title_style(Style::default().fg(ACCENT)),
        ),
        chunks[0],
    );

    let page = app.visible_settings();
    if page.page_items.is_empty() {
        let hint = if app.settings.is_empty() {
            "No settings stored yet"
        } else {
            "No settings match the current filter"
        };
        f.render_widget(
            Paragraph::new(Span::styled(hint, Style::default().fg(DIM))),
            chunks[1],
        );
    } else {
        let rows: Vec<Row> = page
            .page_items
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let style = if i == app.settings_list.selected {
                    Style::default().bg(SELECTED_BG).add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let updated = s
                    .updated_at
                    .map(|t| t.with_timezone(&Local).format("%b %d %H:%M").to_string())
                    .unwrap_or_default();
                Row::new(vec![s.key.clone(), s.value.clone(), updated]).style(style)
            })
            .collect();
        let table = Table::new(
            rows,
            [
                Constraint::Min(20),
                Constraint::Min(30),
                Constraint::Length(14),
            ],
        )
        .header(table_header(&["Key", "Value", "Updated"]));
        f.render_widget(table, chunks[1]);
    }

    f.render_widget(
        query_footer(&app.settings_query, page.total_pages),
        chunks[2],
    );
}

// ─── Modals ─────────────────────────────────────────────────────────────────

fn render_form(f: &mut Frame, app: &App) {
    let Some(form) = &app.form else {
        return;
    };

    let height = (form.fields.len() as u16 + 7).min(f.area().height);
    let area = centered_rect(60, height, f.area());
    f.render_widget(Clear, area);

    let mut lines: Vec<Line> = Vec::new();
    for (i, field) in form.fields.iter().enumerate() {
        let cursor = if i == form.cursor { "> " } else { "  " };
        let mut spans = vec![Span::styled(
            cursor,
            Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
        )];
        match field.kind {
            FieldKind::Flag => {
                spans.push(Span::raw(format!(
                    "{:<18}[{}]",
                    field.label,
                    if field.is_on() { "x" } else { " " }
                )));
            }
            FieldKind::Option => {
                let marker = if i == form.correct_option { "(•)" } else { "( )" };
                spans.push(Span::raw(format!("{marker} {}", field.value)));
            }
            _ => {
                spans.push(Span::styled(
                    format!("{:<18}", field.label),
                    Style::default().fg(DIM),
                ));
                spans.push(Span::raw(field.value.clone()));
            }
        }
        let style = if i == form.cursor {
            Style::default().bg(SELECTED_BG)
        } else {
            Style::default()
        };
        lines.push(Line::from(spans).style(style));
    }

    lines.push(Line::from(""));
    match &form.link {
        LinkCycle::Idle => {}
        LinkCycle::Checking { verdict, .. } => {
            lines.push(Line::from(Span::styled(
                format!("~ {}", verdict.message),
                Style::default().fg(WARN),
            )));
        }
        LinkCycle::Resolved { verdict, .. } => {
            let (mark, color) = if verdict.is_valid && verdict.exists {
                ("✓", GOOD)
            } else if verdict.is_valid {
                ("!", WARN)
            } else {
                ("✗", BAD)
            };
            lines.push(Line::from(Span::styled(
                format!("{mark} {}", verdict.message),
                Style::default().fg(color),
            )));
        }
    }
    if let Some(error) = &form.error {
        lines.push(Line::from(Span::styled(
            format!("✗ {error}"),
            Style::default().fg(BAD),
        )));
    }
    if form.submitting {
        lines.push(Line::from(Span::styled(
            "Saving…",
            Style::default().fg(WARN),
        )));
    } else {
        lines.push(Line::from(Span::styled(
            "Enter save   Esc cancel   space toggle/mark   ^A add option   ^D drop option",
            Style::default().fg(DIM),
        )));
    }

    let dialog = Paragraph::new(lines).wrap(Wrap { trim: false }).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(format!(" {} ", form.title))
            .title_style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
    );
    f.render_widget(dialog, area);
}

fn render_confirm(f: &mut Frame, prompt: &str) {
    let area = centered_rect(40, 5, f.area());
    f.render_widget(Clear, area);
    let lines = vec![
        Line::from(prompt.to_string()),
        Line::from(""),
        Line::from(Span::styled("y confirm   n cancel", Style::default().fg(DIM))),
    ];
    f.render_widget(
        Paragraph::new(lines).block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(BAD))
                .title(" Confirm ")
                .title_style(Style::default().fg(BAD).add_modifier(Modifier::BOLD)),
        ),
        area,
    );
}

fn centered_rect(percent_x: u16, height: u16, r: Rect) -> Rect {
    let width = r.width * percent_x / 100;
    Rect {
        x: r.x + (r.width.saturating_sub(width)) / 2,
        y: r.y + (r.height.saturating_sub(height)) / 2,
        width: width.min(r.width),
        height: height.min(r.height),
    }
}

/// Truncate to a display width, appending an ellipsis when cut.
fn truncate(s: &str, max_width: usize) -> String {
    let mut width = 0;
    let mut out = String::new();
    for c in s.chars() {
        let w = c.width().unwrap_or(0);
        if width + w > max_width.saturating_sub(1) {
            out.push('…');
            return out;
        }
        width += w;
        out.push(c);
    }
    out
}
