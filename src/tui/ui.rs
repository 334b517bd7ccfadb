use super::app::TuiApp;
use super::state::{
    MainControl, QueueState, SettingsField, SubmitState, ToolStatus, View, LANGUAGE_OPTIONS,
    QUALITY_OPTIONS,
};
use crate::server::ConnectionState;
use fluent::fluent_args;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table},
    Frame,
};
use unicode_width::{UnicodeWidthChar, UnicodeWidthStr};

/// Main rendering function
pub fn render(app: &TuiApp, f: &mut Frame) {
    let size = f.area();

    // Main layout: content area + status bar
    let main_chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Content area
            Constraint::Length(1), // Status bar
        ])
        .split(size);

    match app.state.view {
        View::Main => render_main(app, f, main_chunks[0]),
        View::Settings => render_settings(app, f, main_chunks[0]),
        View::Queue => render_queue(app, f, main_chunks[0]),
    }

    render_status_bar(app, f, main_chunks[1]);
}

/// Render the main view: extracted video, download options, download control
fn render_main(app: &TuiApp, f: &mut Frame, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(6), // Video info
            Constraint::Length(4), // Quality / format selectors
            Constraint::Length(3), // Download control
            Constraint::Min(0),
        ])
        .split(area);

    render_video_info(app, f, chunks[0]);
    render_download_options(app, f, chunks[1]);
    render_download_control(app, f, chunks[2]);
}

fn render_video_info(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);

    let text_color = Color::Rgb(200, 200, 210);
    let muted_color = Color::Rgb(120, 120, 130);

    let inner_width = area.width.saturating_sub(2) as usize;
    let lines = match &app.state.video_info {
        Some(info) => {
            let mut lines = vec![
                Line::from(Span::styled(
                    truncate_to_width(&info.title, inner_width),
                    Style::default().fg(text_color).add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    truncate_to_width(&info.url, inner_width),
                    Style::default().fg(muted_color),
                )),
            ];
            if !info.thumbnail.is_empty() {
                lines.push(Line::from(Span::styled(
                    truncate_to_width(&info.thumbnail, inner_width),
                    Style::default().fg(muted_color),
                )));
            }
            lines
        }
        None => vec![
            Line::from(""),
            Line::from(Span::styled(
                t("no-video-selected"),
                Style::default().fg(muted_color).add_modifier(Modifier::ITALIC),
            )),
        ],
    };

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(t("video-info")),
    );
    f.render_widget(paragraph, area);
}

fn render_download_options(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);

    let selected_color = Color::Rgb(255, 220, 100);
    let label_color = Color::Rgb(180, 180, 190);

    let selector_line = |label: String, value: String, is_selected: bool| {
        let prefix = if is_selected { "▸ " } else { "  " };
        let style = if is_selected {
            Style::default()
                .fg(selected_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(label_color)
        };
        Line::from(Span::styled(
            format!("{}{}: ◂ {} ▸", prefix, label, value),
            style,
        ))
    };

    let lines = vec![
        selector_line(
            t("quality-label"),
            t(QUALITY_OPTIONS[app.state.quality_index].1),
            app.state.main_control == MainControl::Quality,
        ),
        selector_line(
            t("format-label"),
            app.state.format().to_string(),
            app.state.main_control == MainControl::Format,
        ),
    ];

    let paragraph = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(t("download-options")),
    );
    f.render_widget(paragraph, area);
}

/// Render the one-shot download control in its current lifecycle state
fn render_download_control(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);
    let is_focused = app.state.main_control == MainControl::DownloadButton;

    let selected_color = Color::Rgb(255, 220, 100);
    let label_color = Color::Rgb(180, 180, 190);
    let success_color = Color::Rgb(100, 180, 100);
    let error_color = Color::Rgb(200, 100, 100);

    let button_style = if is_focused {
        Style::default()
            .fg(selected_color)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(label_color)
    };
    let button = Span::styled(format!("[ {} ]", t("download-button")), button_style);

    let line = match &app.state.submit {
        SubmitState::Idle => Line::from(button),
        SubmitState::InFlight => Line::from(Span::styled(
            format!("{} {}", app.state.spinner_glyph(), t("downloading")),
            Style::default().fg(selected_color),
        )),
        SubmitState::Accepted { id } => {
            let id_text = id.map(|v| v.to_string()).unwrap_or_else(|| "?".to_string());
            let args = fluent_args! { "id" => id_text };
            Line::from(Span::styled(
                app.state.t_with_args("download-added", Some(&args)),
                Style::default().fg(success_color),
            ))
        }
        SubmitState::Failed { message } => Line::from(vec![
            button,
            Span::raw("  "),
            Span::styled(message.clone(), Style::default().fg(error_color)),
        ]),
    };

    let border_style = if is_focused {
        Style::default().fg(selected_color)
    } else {
        Style::default().fg(Color::Rgb(80, 80, 100))
    };

    let paragraph = Paragraph::new(line)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(border_style),
        );
    f.render_widget(paragraph, area);
}

/// Render the settings form with the yt-dlp indicator below it
fn render_settings(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),    // Form
            Constraint::Length(3), // yt-dlp indicator
        ])
        .split(area);

    // Modern color palette
    let selected_color = Color::Rgb(255, 220, 100);
    let label_color = Color::Rgb(180, 180, 190);
    let border_color = Color::Rgb(80, 80, 100);
    let success_color = Color::Rgb(100, 180, 100);
    let error_color = Color::Rgb(200, 100, 100);
    let muted_color = Color::Rgb(120, 120, 130);

    let mut lines = Vec::new();
    let fields = SettingsField::all();
    for (idx, field) in fields.iter().enumerate() {
        let is_selected = idx == app.state.settings_field_index;
        let prefix = if is_selected { "▸ " } else { "  " };
        let style = if is_selected {
            Style::default()
                .fg(selected_color)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(label_color)
        };

        if *field == SettingsField::SaveButton {
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                format!("{}[ {} ]", prefix, t(field.label_key())),
                style,
            )));
            continue;
        }

        let value = if is_selected && app.state.editing {
            format!("{}_", app.state.edit_buffer)
        } else {
            match field {
                SettingsField::Host => app.state.form.host.clone(),
                SettingsField::Port => app.state.form.port.clone(),
                SettingsField::Folder => app.state.form.folder.clone(),
                SettingsField::Language => t(LANGUAGE_OPTIONS[app.state.form.language_index].1),
                _ => String::new(),
            }
        };
        lines.push(Line::from(Span::styled(
            format!("{}{}: {}", prefix, t(field.label_key()), value),
            style,
        )));
    }

    if let Some(error) = &app.state.validation_error {
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            error.clone(),
            Style::default().fg(error_color),
        )));
    }

    let form = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(t("settings-title")),
    );
    f.render_widget(form, chunks[0]);

    let tool_span = match &app.state.tool_status {
        ToolStatus::Checking => {
            Span::styled(t("ytdlp-checking"), Style::default().fg(muted_color))
        }
        ToolStatus::Installed {
            version: Some(version),
        } => {
            let args = fluent_args! { "version" => version.as_str() };
            Span::styled(
                app.state.t_with_args("ytdlp-installed-version", Some(&args)),
                Style::default().fg(success_color),
            )
        }
        ToolStatus::Installed { version: None } => {
            Span::styled(t("ytdlp-installed"), Style::default().fg(success_color))
        }
        ToolStatus::Missing => Span::styled(
            t("ytdlp-not-installed"),
            Style::default().fg(error_color),
        ),
        // The probe never reached the server, which is a different problem
        // than a missing tool
        ToolStatus::Unreachable => Span::styled(
            t("server-not-running"),
            Style::default().fg(error_color),
        ),
    };

    let tool = Paragraph::new(Line::from(tool_span)).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border_color))
            .title(t("ytdlp-label")),
    );
    f.render_widget(tool, chunks[1]);
}

/// Render the read-only queue table
fn render_queue(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);

    let muted_color = Color::Rgb(120, 120, 130);
    let error_color = Color::Rgb(200, 100, 100);
    let text_color = Color::Rgb(200, 200, 210);

    // Table header with inverted colors for better visibility
    let header = Row::new(vec![
        Cell::from(t("column-id")),
        Cell::from(t("column-title")),
        Cell::from(t("column-url")),
        Cell::from(t("column-quality")),
        Cell::from(t("column-format")),
    ])
    .style(
        Style::default()
            .fg(Color::Black)
            .bg(Color::Rgb(100, 100, 120))
            .add_modifier(Modifier::BOLD),
    )
    .height(1);

    let rows: Vec<Row> = match &app.state.queue {
        QueueState::Loading => vec![Row::new(vec![
            Cell::from(""),
            Cell::from(t("queue-loading")).style(Style::default().fg(muted_color)),
        ])],
        QueueState::Loaded(items) if items.is_empty() => vec![Row::new(vec![
            Cell::from(""),
            Cell::from(t("queue-empty")).style(Style::default().fg(muted_color)),
        ])],
        QueueState::Loaded(items) => items
            .iter()
            .map(|item| {
                // Jobs submitted without extraction have no title
                let title = item.title.clone().unwrap_or_else(|| "—".to_string());
                Row::new(vec![
                    Cell::from(item.id.to_string()),
                    Cell::from(truncate_to_width(&title, 40)),
                    Cell::from(truncate_to_width(&item.url, 48)),
                    Cell::from(item.quality.clone()),
                    Cell::from(item.format_selector.clone()),
                ])
                .style(Style::default().fg(text_color))
            })
            .collect(),
        QueueState::Error => vec![Row::new(vec![
            Cell::from("!").style(Style::default().fg(error_color)),
            Cell::from(t("queue-error")).style(Style::default().fg(error_color)),
        ])],
    };

    let widths = [
        Constraint::Length(6),  // Id
        Constraint::Min(20),    // Title
        Constraint::Min(24),    // Url
        Constraint::Length(18), // Quality selector
        Constraint::Length(10), // Format
    ];

    let title = match &app.state.queue {
        QueueState::Loaded(items) => format!("{} ({})", t("queue-title"), items.len()),
        _ => t("queue-title"),
    };

    let table = Table::new(rows, widths).header(header).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::Rgb(80, 80, 100)))
            .title(title),
    );
    f.render_widget(table, area);
}

fn render_status_bar(app: &TuiApp, f: &mut Frame, area: Rect) {
    let t = |key: &str| app.state.t(key);

    let left_content = match &app.state.status_message {
        Some(message) => message.clone(),
        None => match app.state.view {
            View::Main => t("status-hint-main"),
            View::Settings if app.state.editing => t("status-hint-edit"),
            View::Settings => t("status-hint-settings"),
            View::Queue => t("status-hint-queue"),
        },
    };

    let badge_color = match app.state.connection {
        ConnectionState::Connected => Color::Rgb(100, 180, 100),
        ConnectionState::Disconnected => Color::Rgb(200, 100, 100),
        ConnectionState::Checking => Color::Rgb(120, 120, 130),
    };
    let right_content = t(app.state.connection.label_key());

    let padding_width = area.width.saturating_sub(
        (left_content.chars().count() + right_content.chars().count() + 4) as u16,
    );

    let status_line = Line::from(vec![
        Span::styled(left_content, Style::default().fg(Color::Cyan)),
        Span::raw(" ".repeat(padding_width as usize)),
        Span::styled("● ", Style::default().fg(badge_color)),
        Span::styled(
            right_content,
            Style::default().fg(Color::Rgb(180, 180, 190)),
        ),
    ]);

    let paragraph = Paragraph::new(status_line);
    f.render_widget(paragraph, area);
}

/// Truncate with ellipsis if too long for the available cell
/// Uses unicode-width for accurate display width (handles CJK correctly)
fn truncate_to_width(text: &str, max_width: usize) -> String {
    if text.width() <= max_width {
        return text.to_string();
    }

    let target_width = max_width.saturating_sub(3);
    let mut truncated = String::new();
    let mut current_width = 0;

    for ch in text.chars() {
        let ch_width = ch.width().unwrap_or(1);
        if current_width + ch_width > target_width {
            break;
        }
        truncated.push(ch);
        current_width += ch_width;
    }

    format!("{}...", truncated)
}
