use super::*;

pub(super) fn draw(frame: &mut ratatui::Frame, screen: &Screen) {
    let area = frame.area();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Min(0),
            Constraint::Length(if screen.prompt.is_some() { 3 } else { 0 }),
            Constraint::Length(7),
        ])
        .split(area);

    draw_header(frame, chunks[0], screen);
    match &screen.view {
        Some(view) => draw_menu(frame, chunks[1], view),
        None => {
            let idle = Paragraph::new(vec![
                Line::from("No menu is active."),
                Line::from(vec![
                    Span::styled("RET", face_style(Face::Key)),
                    Span::raw(" open  "),
                    Span::styled("r", face_style(Face::Key)),
                    Span::raw(" resume  "),
                    Span::styled("q", face_style(Face::Key)),
                    Span::raw(" quit"),
                ]),
            ]);
            frame.render_widget(idle, chunks[1]);
        }
    }
    if let Some(prompt) = &screen.prompt {
        draw_prompt(frame, chunks[2], prompt);
    }

    let height = chunks[3].height.saturating_sub(1) as usize;
    let start = screen.log.len().saturating_sub(height);
    let log = screen.log[start..]
        .iter()
        .map(|l| Line::from(l.as_str()))
        .collect::<Vec<_>>();
    let log = Paragraph::new(log)
        .wrap(Wrap { trim: false })
        .block(Block::default().borders(Borders::TOP).title("log"));
    frame.render_widget(log, chunks[3]);
}

fn draw_header(frame: &mut ratatui::Frame, area: Rect, screen: &Screen) {
    let state = match &screen.keymap {
        Some(prefix) => Span::styled(prefix.clone(), Style::default().fg(Color::Green)),
        None => Span::styled("(no menu)", Style::default().fg(Color::Gray)),
    };
    let header = Paragraph::new(Line::from(vec![
        Span::styled("keymenu", Style::default().fg(Color::Black).bg(Color::White)),
        Span::raw("  "),
        state,
    ]))
    .block(Block::default().borders(Borders::BOTTOM));
    frame.render_widget(header, area);
}

fn draw_menu(frame: &mut ratatui::Frame, area: Rect, view: &MenuView) {
    let mut title = vec![Span::styled(
        view.title.clone(),
        Style::default().fg(Color::Yellow),
    )];
    title.push(Span::raw(format!("  level {}", view.level)));
    if let Some(banner) = view.banner {
        let text = match banner {
            ModeBanner::Help => "  [help: press a key]",
            ModeBanner::Edit => "  [editing levels]",
        };
        title.push(Span::styled(text, Style::default().fg(Color::Magenta)));
    }
    let block = Block::default().borders(Borders::ALL).title(Line::from(title));
    let paragraph = Paragraph::new(menu_lines(view)).block(block);
    frame.render_widget(paragraph, area);
}

fn draw_prompt(frame: &mut ratatui::Frame, area: Rect, prompt: &Prompt) {
    let line = Line::from(vec![
        Span::styled(prompt.label.clone(), Style::default().fg(Color::Cyan)),
        Span::raw(prompt.input.buf.clone()),
    ]);
    let block = Block::default().borders(Borders::ALL);
    let inner = block.inner(area);
    frame.render_widget(Paragraph::new(line).block(block), area);
    let col = prompt.label.chars().count() + prompt.input.buf[..prompt.input.cursor].chars().count();
    frame.set_cursor_position((inner.x + col as u16, inner.y));
}

/// The menu as styled lines: groups with their headings, then the value.
pub(super) fn menu_lines(view: &MenuView) -> Vec<Line<'static>> {
    fn walk(g: &GroupView, depth: usize, out: &mut Vec<Line<'static>>) {
        let indent = "  ".repeat(depth);
        if let Some(h) = &g.heading {
            out.push(Line::from(Span::styled(
                format!("{}{}", indent, h),
                face_style(Face::Heading),
            )));
        }
        for row in &g.rows {
            let mut spans = vec![Span::raw(indent.clone())];
            spans.extend(row.iter().map(segment_span));
            out.push(Line::from(spans));
        }
        for c in &g.children {
            walk(c, depth + 1, out);
        }
    }

    let mut out = Vec::new();
    for g in &view.groups {
        walk(g, 0, &mut out);
    }
    if let Some(pending) = &view.pending {
        out.push(Line::from(vec![
            Span::styled(pending.clone(), face_style(Face::Key)),
            Span::raw(format!("-  {}", view.reachable.join("  "))),
        ]));
    }
    if !view.value_line.is_empty() {
        out.push(Line::from(Span::styled(
            view.value_line.clone(),
            face_style(Face::ValueActive),
        )));
    }
    out
}

fn segment_span(s: &Segment) -> Span<'static> {
    Span::styled(s.text.clone(), face_style(s.face))
}

pub(super) fn face_style(face: Face) -> Style {
    match face {
        Face::Plain | Face::Description => Style::default(),
        Face::Key => Style::default().fg(Color::Magenta),
        Face::ValueActive => Style::default().fg(Color::Cyan),
        Face::ValueInactive => Style::default().fg(Color::DarkGray),
        Face::Inapt => Style::default()
            .fg(Color::DarkGray)
            .add_modifier(Modifier::CROSSED_OUT),
        Face::Heading => Style::default()
            .fg(Color::Yellow)
            .add_modifier(Modifier::BOLD),
        Face::Level => Style::default().fg(Color::Red),
    }
}
