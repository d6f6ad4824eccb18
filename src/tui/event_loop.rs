use super::*;

use crate::model::format_args_line;

pub(super) fn run_loop<B: Backend>(
    host: &mut TerminalHost<B>,
    session: &mut Session,
    opts: &DemoOptions,
) -> Result<()> {
    open(host, session, opts);
    loop {
        if host.show_due() {
            session.on_timer(host);
        }
        host.redraw()?;
        if host.quit {
            return Ok(());
        }

        if event::poll(Duration::from_millis(50)).context("poll")?
            && let Event::Key(k) = event::read().context("read event")?
            && k.kind == KeyEventKind::Press
        {
            handle_key(host, session, opts, k)?;
        }
    }
}

/// Route one terminal key through the session; keys no menu takes go to the
/// demo's own bindings.
pub(super) fn handle_key<B: Backend>(
    host: &mut TerminalHost<B>,
    session: &mut Session,
    opts: &DemoOptions,
    key: KeyEvent,
) -> Result<()> {
    let Some(stroke) = stroke_from_event(key) else {
        return Ok(());
    };
    let before = session.last_export().cloned();
    let action = session.on_key(host, stroke)?;
    tracing::debug!(key = %stroke, ?action, "key");

    match action {
        Action::Inactive => idle_key(host, session, opts, stroke)?,
        Action::Exit | Action::Resume | Action::Replace => {
            if let Some(export) = session.last_export()
                && before.as_ref() != Some(export)
            {
                host.screen.push_log(format!(
                    "{} exported: {}",
                    export.prefix,
                    format_args_line(&export.args)
                ));
            }
        }
        Action::Passthrough { stay } => {
            let what = if stay { "menu stays" } else { "menu closed" };
            host.screen
                .push_log(format!("{} passed to the host ({})", stroke, what));
        }
        _ => {}
    }
    Ok(())
}

fn idle_key<B: Backend>(
    host: &mut TerminalHost<B>,
    session: &mut Session,
    opts: &DemoOptions,
    stroke: KeyStroke,
) -> Result<()> {
    if stroke.ctrl || stroke.meta {
        return Ok(());
    }
    match stroke.code {
        KeyCode::Char('q') | KeyCode::Esc => host.quit = true,
        KeyCode::Enter => open(host, session, opts),
        KeyCode::Char('r') => {
            session.resume(host)?;
        }
        _ => host.screen.push_log(format!("{} is not bound", stroke)),
    }
    Ok(())
}

fn open<B: Backend>(host: &mut TerminalHost<B>, session: &mut Session, opts: &DemoOptions) {
    if let Err(e) = session.enter(host, &opts.prefix) {
        tracing::warn!(prefix = %opts.prefix, error = %e, "cannot open menu");
        host.notify(&e.to_string());
    }
}

#[cfg(test)]
#[path = "../tests/tui/event_loop_tests.rs"]
mod tests;
