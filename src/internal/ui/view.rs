use std::time::Instant;

use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, List, ListItem, Padding, Paragraph, Wrap},
};

use super::app::{App, Focus};
use crate::internal::notification::NotificationKind;
use crate::internal::summary::SummaryContent;
use crate::utils::url::source_domain;

const ACCENT: Color = Color::Cyan;
const MUTED: Color = Color::DarkGray;

#[tracing::instrument(skip(app, f))]
pub fn draw(app: &mut App, f: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(f.area());

    render_top_bar(app, f, chunks[0]);
    render_body(app, f, chunks[1]);
    render_status_bar(app, f, chunks[2]);

    if app.summary.is_visible() {
        render_summary_modal(app, f);
    }

    if app.comments.is_visible() {
        render_comment_modal(app, f);
    }

    if app.navigation.indicator_visible() {
        render_loading_indicator(app, f);
    }

    render_notifications(app, f);

    if let Some(alert) = &app.alert {
        render_alert(alert, f);
    }

    if app.show_help {
        render_help_overlay(f);
    }
}

/// Rect of `width` x `height` centered in `area`, shrunk to fit.
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width.saturating_sub(4)).max(1);
    let height = height.min(area.height.saturating_sub(2)).max(1);
    Rect::new(
        area.x + area.width.saturating_sub(width) / 2,
        area.y + area.height.saturating_sub(height) / 2,
        width,
        height,
    )
}

fn render_top_bar(app: &App, f: &mut Frame, area: Rect) {
    let mut spans = Vec::new();

    if let Some(page) = &app.page {
        for (i, link) in page.nav_links.iter().enumerate() {
            let selected = app.focus == Focus::Nav && i == app.nav_index;
            let style = if selected {
                Style::default()
                    .fg(Color::Black)
                    .bg(ACCENT)
                    .add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::White)
            };
            spans.push(Span::styled(format!(" {} ", link.label), style));
            spans.push(Span::raw(" "));
        }
    }

    let p = Paragraph::new(Line::from(spans)).style(Style::default().bg(Color::Black));
    f.render_widget(p, area);
}

fn render_body(app: &mut App, f: &mut Frame, area: Rect) {
    if app.page.is_none() {
        let text = match &app.page_error {
            Some(e) => format!("Failed to load {}: {}", app.config.base_url, e),
            None => format!("{} Loading {}", app.spinner_char(), app.config.base_url),
        };
        let p = Paragraph::new(text)
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(Block::default().padding(Padding::top(area.height / 2)));
        f.render_widget(p, area);
        return;
    }

    let show_sidebar = !app.sidebar.is_hidden()
        && app
            .page
            .as_ref()
            .is_some_and(|p| !p.sidebar_links.is_empty());

    if show_sidebar {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(24), Constraint::Min(0)])
            .split(area);
        render_sidebar(app, f, chunks[0]);
        render_articles(app, f, chunks[1]);
    } else {
        render_articles(app, f, area);
    }
}

fn focus_border(app: &App, focus: Focus) -> Style {
    if app.focus == focus {
        Style::default().fg(ACCENT)
    } else {
        Style::default().fg(MUTED)
    }
}

fn render_sidebar(app: &mut App, f: &mut Frame, area: Rect) {
    let Some(page) = &app.page else {
        return;
    };

    let items: Vec<ListItem> = page
        .sidebar_links
        .iter()
        .map(|link| ListItem::new(link.label.clone()))
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Sidebar))
                .title(" Topics "),
        )
        .highlight_style(
            Style::default()
                .fg(Color::Black)
                .bg(ACCENT)
                .add_modifier(Modifier::BOLD),
        );

    f.render_stateful_widget(list, area, &mut app.sidebar_state);
}

fn render_articles(app: &mut App, f: &mut Frame, area: Rect) {
    let Some(page) = &app.page else {
        return;
    };

    let items: Vec<ListItem> = page
        .articles
        .iter()
        .enumerate()
        .map(|(i, article)| {
            let mut title = vec![
                Span::styled(format!("{:>3}. ", i + 1), Style::default().fg(MUTED)),
                Span::styled(
                    article.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
            ];
            if let Some(domain) = article.link.as_deref().and_then(source_domain) {
                title.push(Span::styled(
                    format!(" ({})", domain),
                    Style::default().fg(MUTED),
                ));
            }

            let mut actions = vec![Span::raw("     ")];
            if article.summary_url.is_some() {
                actions.push(Span::styled("[s] Summary ", Style::default().fg(Color::Green)));
            }
            if article.article_id.is_some() {
                actions.push(Span::styled(
                    "[c] Discussion",
                    Style::default().fg(Color::Yellow),
                ));
            }

            ListItem::new(vec![Line::from(title), Line::from(actions)])
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(focus_border(app, Focus::Articles))
                .title(format!(" {} ", page.title)),
        )
        .highlight_style(Style::default().bg(Color::Rgb(40, 40, 60)))
        .highlight_symbol("> ");

    f.render_stateful_widget(list, area, &mut app.article_state);
}

fn render_status_bar(app: &App, f: &mut Frame, area: Rect) {
    let status = if app.navigation.is_navigating() {
        format!("{} Loading...", app.spinner_char())
    } else if app.comments.is_visible() {
        "Type to comment | Enter: Post | Esc: Close".to_string()
    } else if app.summary.is_visible() {
        "Esc/q/Enter: Close".to_string()
    } else {
        let articles = app.page.as_ref().map_or(0, |p| p.articles.len());
        format!(
            "j/k: Nav | Tab: Focus | Enter: Open | s: Summary | c: Discussion | o: Browser | b: Sidebar | r: Reload | ?: Help | q: Quit | {} articles",
            articles
        )
    };

    let p = Paragraph::new(status).style(Style::default().fg(Color::Black).bg(ACCENT));
    f.render_widget(p, area);
}

fn render_summary_modal(app: &App, f: &mut Frame) {
    let area = centered(f.area(), 80, 20);

    let lines: Vec<Line> = match app.summary.content() {
        SummaryContent::Empty => Vec::new(),
        SummaryContent::Processing => {
            // Pulse between bright and dim while the request is in flight
            let style = if app.spinner_state % 10 < 5 {
                Style::default().fg(Color::White).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(MUTED)
            };
            vec![Line::from(Span::styled(
                crate::internal::summary::PROCESSING_TEXT,
                style,
            ))]
        }
        SummaryContent::Summary { text, note } => {
            let mut lines: Vec<Line> = text.lines().map(|l| Line::from(l.to_string())).collect();
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                *note,
                Style::default().fg(MUTED).add_modifier(Modifier::ITALIC),
            )));
            lines
        }
        SummaryContent::Error(message) => message
            .lines()
            .map(|l| Line::from(Span::styled(l, Style::default().fg(Color::Red))))
            .collect(),
    };

    let p = Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(ACCENT))
                .title(" Summary ")
                .padding(Padding::uniform(1)),
        );

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn render_comment_modal(app: &App, f: &mut Frame) {
    let area = centered(f.area(), 80, 24);
    f.render_widget(Clear, area);

    let title = match app.comments.active_article_id() {
        Some(id) => format!(" Discussion #{} ", id),
        None => " Discussion ".to_string(),
    };
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Yellow))
        .title(title);
    let inner = block.inner(area);
    f.render_widget(block, area);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(3)])
        .split(inner);

    let comments = app.comments.comments();
    let items: Vec<ListItem> = if comments.is_empty() {
        let text = if app.comments.is_loading() {
            format!("{} Loading comments...", app.spinner_char())
        } else {
            "No comments yet".to_string()
        };
        vec![ListItem::new(Span::styled(text, Style::default().fg(MUTED)))]
    } else {
        comments
            .iter()
            .map(|c| {
                ListItem::new(vec![
                    Line::from(format!("- {}", c.content)),
                    Line::from(""),
                ])
            })
            .collect()
    };
    f.render_widget(List::new(items), chunks[0]);

    let input = Paragraph::new(format!("{}█", app.comments.input())).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Your comment "),
    );
    f.render_widget(input, chunks[1]);
}

fn render_loading_indicator(app: &App, f: &mut Frame) {
    let area = centered(f.area(), 30, 3);
    let p = Paragraph::new(format!("{} Loading", app.spinner_char()))
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::White).bg(Color::Black))
        .block(Block::default().borders(Borders::ALL));

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

/// Notifications stack in the bottom-right corner, newest at the bottom.
fn render_notifications(app: &App, f: &mut Frame) {
    let area = f.area();
    let now = Instant::now();
    let mut bottom = area.height.saturating_sub(1);

    for notification in app.notifications.active().iter().rev() {
        if notification.is_expired_at(now) || bottom < 3 {
            continue;
        }
        let width = (notification.message.chars().count() as u16 + 4).min(area.width);
        let rect = Rect::new(area.width.saturating_sub(width), bottom - 3, width, 3);
        bottom -= 3;

        let color = match notification.kind {
            NotificationKind::Info => Color::Green,
            NotificationKind::Error => Color::Red,
        };
        let p = Paragraph::new(notification.message.as_str())
            .style(
                Style::default()
                    .fg(Color::White)
                    .bg(color)
                    .add_modifier(Modifier::BOLD),
            )
            .block(Block::default().borders(Borders::ALL))
            .alignment(Alignment::Center);

        f.render_widget(Clear, rect);
        f.render_widget(p, rect);
    }
}

fn render_alert(message: &str, f: &mut Frame) {
    let area = centered(f.area(), message.chars().count() as u16 + 8, 5);
    let p = Paragraph::new(vec![
        Line::from(message.to_string()),
        Line::from(Span::styled("[Enter] OK", Style::default().fg(MUTED))),
    ])
    .alignment(Alignment::Center)
    .style(Style::default().fg(Color::White).bg(Color::Red))
    .block(Block::default().borders(Borders::ALL).title(" Alert "));

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}

fn render_help_overlay(f: &mut Frame) {
    let area = centered(f.area(), 50, 20);

    let key = |k: &'static str, desc: &'static str| {
        Line::from(vec![
            Span::styled(
                format!("{:<12}", k),
                Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
            ),
            Span::raw(desc),
        ])
    };

    let lines = vec![
        key("j / Down", "Next item"),
        key("k / Up", "Previous item"),
        key("Tab", "Cycle nav, sidebar, articles"),
        key("Enter", "Follow link / summarize"),
        key("s", "Summarize article"),
        key("c", "Open discussion"),
        key("o", "Open article in browser"),
        key("b", "Toggle sidebar"),
        key("r", "Reload page"),
        key("Esc", "Close modal"),
        key("?", "Toggle help"),
        key("q", "Quit / close modal"),
    ];

    let p = Paragraph::new(lines).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(ACCENT))
            .title(" Keyboard Shortcuts (any key to close) ")
            .padding(Padding::horizontal(1)),
    );

    f.render_widget(Clear, area);
    f.render_widget(p, area);
}
