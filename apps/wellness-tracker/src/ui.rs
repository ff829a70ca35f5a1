//! UI rendering for the wellness tracker.

use crate::app::{App, ConfirmDialog, FormField, MessageType, Tab, FORM_FIELDS, MOVEMENT_MAX, SLEEP_MAX};
use crate::dates;
use crate::models::{DailyEntry, MovementStatus, SleepQuality, GRATITUDE_SLOTS};
use crate::stats;
use crate::storage::EntryPersistence;
use chrono::{Local, NaiveDate, Timelike};
use std::fmt::Write;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Gauge, List, ListItem, Paragraph, Wrap},
    Frame,
};

const BAR_WIDTH: usize = 20;

/// Draw the application.
pub fn draw<P: EntryPersistence>(f: &mut Frame, app: &mut App<P>) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(0),    // Content
            Constraint::Length(3), // Footer/status
        ])
        .split(f.area());

    draw_header(f, app, chunks[0]);
    match app.tab {
        Tab::Log => draw_log_view(f, app, chunks[1]),
        Tab::Progress => draw_progress_view(f, app, chunks[1]),
        Tab::History => draw_history_view(f, app, chunks[1]),
    }
    draw_footer(f, app, chunks[2]);

    // Draw popups
    if app.show_help {
        draw_help_popup(f);
    }

    if let Some(dialog) = &app.confirm_dialog {
        draw_confirm_dialog(f, dialog);
    }

    if app.editing {
        draw_edit_dialog(f, app);
    }

    if app.celebration.is_some() {
        draw_celebration(f, app);
    }
}

fn draw_header<P: EntryPersistence>(f: &mut Frame, app: &App<P>, area: Rect) {
    let date_str = format_date(app.today, &app.config.display.date_format);
    let title = format!(" Wellness 3x3 - {} ", date_str);

    let mut tabs: Vec<Span> = Vec::new();
    for (i, tab) in Tab::ALL.iter().enumerate() {
        if i > 0 {
            tabs.push(Span::raw(" "));
        }
        tabs.push(styled_tab(&format!("{}:{}", i + 1, tab.title()), app.tab == *tab));
    }

    let header = Paragraph::new(Line::from(tabs))
        .block(Block::default().borders(Borders::ALL).title(title))
        .alignment(Alignment::Center);

    f.render_widget(header, area);
}

/// Format with the configured pattern, falling back to the day key when the
/// pattern is invalid.
fn format_date(date: NaiveDate, pattern: &str) -> String {
    let mut out = String::new();
    match write!(out, "{}", date.format(pattern)) {
        Ok(()) => out,
        Err(_) => dates::day_key(date),
    }
}

fn styled_tab(label: &str, active: bool) -> Span<'static> {
    if active {
        Span::styled(
            format!("[{}]", label),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )
    } else {
        Span::styled(format!(" {} ", label), Style::default().fg(Color::Gray))
    }
}

/// Greeting for the hour of day.
pub fn greeting(hour: u32) -> &'static str {
    match hour {
        0..=11 => "Good morning",
        12..=16 => "Good afternoon",
        _ => "Good evening",
    }
}

fn draw_log_view<P: EntryPersistence>(f: &mut Frame, app: &App<P>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(4), Constraint::Min(0)])
        .split(area);

    let status = if app.has_unsaved_changes() {
        if app.autosave.is_pending() {
            Span::styled("Saving soon...", Style::default().fg(Color::Yellow))
        } else {
            Span::styled("Unsaved changes (s to save)", Style::default().fg(Color::Yellow))
        }
    } else if app.has_entry_today() {
        Span::styled("Saved", Style::default().fg(Color::Green))
    } else {
        Span::styled("Not logged yet", Style::default().fg(Color::DarkGray))
    };

    let prompt = if app.has_entry_today() {
        "You've logged today. Nice work!"
    } else {
        "Ready to log your 3x3?"
    };

    let banner = Paragraph::new(vec![
        Line::from(vec![
            Span::styled(
                greeting(Local::now().hour()),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw(format!(" - {}", prompt)),
        ]),
        Line::from(status),
    ])
    .block(Block::default().borders(Borders::ALL));

    f.render_widget(banner, chunks[0]);

    let form = &app.form;
    let items: Vec<ListItem> = FORM_FIELDS
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == app.field_index;
            let label_style = if selected {
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Cyan)
            };

            let mut spans = vec![Span::styled(format!("{:<12}", field.label()), label_style)];

            match field {
                FormField::Sleep => {
                    spans.push(Span::raw(format!("{} ", bar(form.sleep, SLEEP_MAX))));
                    spans.push(Span::raw(format!("{:>4.1} h  ", form.sleep)));
                    spans.push(Span::styled(
                        SleepQuality::from_hours(form.sleep).label(),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                FormField::Movement => {
                    spans.push(Span::raw(format!("{} ", bar(form.movement, MOVEMENT_MAX))));
                    spans.push(Span::raw(format!("{:>4.0} min  ", form.movement)));
                    spans.push(Span::styled(
                        MovementStatus::from_minutes(form.movement).label(),
                        Style::default().fg(Color::Magenta),
                    ));
                }
                FormField::Gratitude(slot) => {
                    spans.push(text_value(&form.gratitude[*slot], "I'm grateful for..."));
                }
                FormField::Reflection => {
                    spans.push(text_value(
                        form.reflection.as_deref().unwrap_or(""),
                        "Anything else on your mind? (optional)",
                    ));
                }
            }

            let style = if selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(Line::from(spans)).style(style)
        })
        .collect();

    let title = format!(
        " Today's 3x3 ({}/{} gratitude) ",
        form.gratitude_count(),
        GRATITUDE_SLOTS
    );
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, chunks[1]);
}

fn text_value(text: &str, placeholder: &'static str) -> Span<'static> {
    if text.trim().is_empty() {
        Span::styled(placeholder, Style::default().fg(Color::DarkGray))
    } else {
        Span::raw(text.to_string())
    }
}

/// Text bar of `BAR_WIDTH` cells filled in proportion to `value / max`.
fn bar(value: f64, max: f64) -> String {
    let filled = ((value / max).clamp(0.0, 1.0) * BAR_WIDTH as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn ratio(value: f64, goal: f64) -> f64 {
    if goal > 0.0 {
        (value / goal).clamp(0.0, 1.0)
    } else {
        0.0
    }
}

fn draw_progress_view<P: EntryPersistence>(f: &mut Frame, app: &App<P>, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(5), // Streaks
            Constraint::Length(5), // Week
            Constraint::Length(4), // Sleep
            Constraint::Length(4), // Movement
            Constraint::Min(0),    // Gratitude
        ])
        .split(area);

    let s = &app.stats;

    let streaks = Paragraph::new(vec![
        Line::from(vec![
            Span::raw(format!("{} ", crate::celebrate::badge_for(s.current_streak))),
            Span::styled(
                format!("Current streak: {} days", s.current_streak),
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            ),
        ]),
        Line::from(format!("Longest streak: {} days", s.longest_streak)),
        Line::from(format!(
            "Total entries:  {}  ({} in the last 30 days)",
            s.total_entries,
            app.store.recent(29, app.today).len()
        )),
    ])
    .block(Block::default().borders(Borders::ALL).title(" Streaks "));

    f.render_widget(streaks, chunks[0]);

    let mut names = Vec::new();
    let mut marks = Vec::new();
    for day in &app.week {
        let today = day.date == app.today;
        let name_style = if today {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        names.push(Span::styled(format!("{:^5}", day.day_name), name_style));
        let (mark, color) = if day.has_entry {
            ("●", Color::Green)
        } else {
            ("○", Color::DarkGray)
        };
        marks.push(Span::styled(format!("{:^5}", mark), Style::default().fg(color)));
    }

    let week = Paragraph::new(vec![Line::from(names), Line::from(marks)])
        .block(Block::default().borders(Borders::ALL).title(format!(
            " This Week ({}% complete) ",
            stats::weekly_completion_percent(&app.week)
        )))
        .alignment(Alignment::Center);

    f.render_widget(week, chunks[1]);

    let goals = &app.config.goals;

    let sleep = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Average Sleep "))
        .gauge_style(Style::default().fg(Color::Blue))
        .ratio(ratio(s.average_sleep, goals.sleep_hours))
        .label(format!("{:.1} h / {:.1} h goal", s.average_sleep, goals.sleep_hours));

    f.render_widget(sleep, chunks[2]);

    let movement = Gauge::default()
        .block(Block::default().borders(Borders::ALL).title(" Average Movement "))
        .gauge_style(Style::default().fg(Color::Green))
        .ratio(ratio(s.average_movement, goals.movement_minutes))
        .label(format!(
            "{:.0} min / {:.0} min goal",
            s.average_movement, goals.movement_minutes
        ));

    f.render_widget(movement, chunks[3]);

    let gratitude = format!(
        "Gratitude notes: {}\nPer entry: {:.1}",
        s.total_gratitude_items,
        s.gratitude_per_entry()
    );

    let gratitude_widget = Paragraph::new(gratitude)
        .block(Block::default().borders(Borders::ALL).title(" Gratitude "))
        .wrap(Wrap { trim: true });

    f.render_widget(gratitude_widget, chunks[4]);
}

fn draw_history_view<P: EntryPersistence>(f: &mut Frame, app: &mut App<P>, area: Rect) {
    app.history_height = area.height.saturating_sub(2) as usize;
    app.ensure_history_visible();
    let app: &App<P> = app;

    if app.store.is_empty() {
        let msg = Paragraph::new("No entries yet. Log your first day on the Log tab.")
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);
        f.render_widget(msg, area);
        return;
    }

    let items: Vec<ListItem> = app
        .store
        .entries()
        .iter()
        .enumerate()
        .skip(app.history_scroll)
        .map(|(i, entry)| {
            let selected = i == app.history_index;
            let mut lines = vec![history_row(app, entry, selected)];
            if app.expanded == Some(entry.date) {
                lines.extend(entry_details(entry));
            }

            let style = if selected {
                Style::default().bg(Color::DarkGray)
            } else {
                Style::default()
            };

            ListItem::new(lines).style(style)
        })
        .collect();

    let title = format!(" History ({} entries) ", app.store.len());
    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));

    f.render_widget(list, area);
}

fn history_row<P: EntryPersistence>(
    app: &App<P>,
    entry: &DailyEntry,
    selected: bool,
) -> Line<'static> {
    let met = entry.goals_met(&app.config.goals);
    let dots: String = (0..3).map(|i| if i < met { '●' } else { '○' }).collect();

    let date_style = if selected {
        Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };

    Line::from(vec![
        Span::styled(
            format!("{:<14}", dates::relative_label(entry.date, app.today)),
            date_style,
        ),
        Span::styled(format!("{} ", dots), Style::default().fg(Color::Green)),
        Span::raw(format!("{}/3 goals  ", met)),
        Span::styled(
            format!("{:>4.1} h  ", entry.sleep),
            Style::default().fg(Color::Blue),
        ),
        Span::styled(
            format!("{:>3.0} min  ", entry.movement),
            Style::default().fg(Color::Cyan),
        ),
        Span::styled(
            format!("{} grateful", entry.gratitude_count()),
            Style::default().fg(Color::Magenta),
        ),
    ])
}

fn entry_details(entry: &DailyEntry) -> Vec<Line<'static>> {
    let mut lines: Vec<Line> = entry
        .filled_gratitude()
        .map(|g| Line::from(format!("    * {}", g)))
        .collect();

    if lines.is_empty() {
        lines.push(Line::styled(
            "    No gratitude notes",
            Style::default().fg(Color::Gray),
        ));
    }

    if let Some(reflection) = entry.reflection_text() {
        lines.push(Line::styled(
            format!("    \"{}\"", reflection),
            Style::default().add_modifier(Modifier::ITALIC),
        ));
    }

    lines
}

fn draw_footer<P: EntryPersistence>(f: &mut Frame, app: &App<P>, area: Rect) {
    let (msg, style) = if let Some((ref message, msg_type)) = app.message {
        let color = match msg_type {
            MessageType::Info => Color::Blue,
            MessageType::Success => Color::Green,
            MessageType::Warning => Color::Yellow,
            MessageType::Error => Color::Red,
        };
        (message.clone(), Style::default().fg(color))
    } else {
        let help = match app.tab {
            Tab::Log => "j/k:Field  h/l:Adjust  Enter:Edit  p:Preset  x:Clear  s:Save  ?:Help  q:Quit",
            Tab::Progress => "1-3/Tab:Switch tab  s:Save  ?:Help  q:Quit",
            Tab::History => "j/k:Navigate  Enter:Details  d:Delete  ?:Help  q:Quit",
        };
        (help.to_string(), Style::default().fg(Color::DarkGray))
    };

    let footer = Paragraph::new(msg)
        .style(style)
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(footer, area);
}

fn draw_help_popup(f: &mut Frame) {
    let area = centered_rect(60, 80, f.area());
    f.render_widget(Clear, area);

    let help_text = r#"
Wellness 3x3 Keybindings

Tabs:
  1, 2, 3         Log / Progress / History
  Tab, S-Tab      Next / previous tab

Log:
  j/k, Up/Down    Move between fields
  h/l, Left/Right Adjust sleep or movement
  Enter, e        Edit field
  p               Cycle movement presets
  x, Delete       Clear field
  s               Save now

History:
  j/k, g/G        Move selection
  Enter, Space    Show details
  d               Delete entry

General:
  ?               Show this help
  q               Quit

Press any key to close
"#;

    let popup = Paragraph::new(help_text)
        .block(Block::default().borders(Borders::ALL).title(" Help "))
        .wrap(Wrap { trim: false });

    f.render_widget(popup, area);
}

fn draw_confirm_dialog(f: &mut Frame, dialog: &ConfirmDialog) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let text = Paragraph::new(dialog.message.clone())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", dialog.title)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    f.render_widget(text, area);
}

fn draw_edit_dialog<P: EntryPersistence>(f: &mut Frame, app: &App<P>) {
    let area = centered_rect(50, 20, f.area());
    f.render_widget(Clear, area);

    let title = match app.selected_field() {
        FormField::Sleep => "Hours of sleep".to_string(),
        FormField::Movement => "Minutes of movement".to_string(),
        FormField::Gratitude(slot) => format!("Grateful for #{}", slot + 1),
        FormField::Reflection => "Reflection".to_string(),
    };

    let input = Paragraph::new(app.input_buffer.as_str())
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {} ", title)),
        )
        .style(Style::default().fg(Color::Yellow));

    f.render_widget(input, area);

    // Show cursor
    f.set_cursor_position((
        area.x + 1 + app.input_buffer.chars().count() as u16,
        area.y + 1,
    ));
}

fn draw_celebration<P: EntryPersistence>(f: &mut Frame, app: &App<P>) {
    let Some(celebration) = &app.celebration else {
        return;
    };

    let area = centered_rect(50, 30, f.area());
    f.render_widget(Clear, area);

    let mut lines = vec![
        Line::from(""),
        Line::styled(
            format!("{}  {} day streak!", celebration.badge, celebration.streak),
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        ),
        Line::from(""),
        Line::from(celebration.message),
    ];

    if celebration.milestone {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            "Milestone reached!",
            Style::default().fg(Color::Magenta),
        ));
    }

    let popup = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(" Well done "))
        .alignment(Alignment::Center)
        .wrap(Wrap { trim: true });

    f.render_widget(popup, area);
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}
