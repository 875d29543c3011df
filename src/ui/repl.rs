use anyhow::{Context, Result};
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;

use crate::banner;
use crate::shell::{Flow, Reply, Shell};
use crate::ui::render;

/// Reads lines until `exit`, Ctrl-C or Ctrl-D.
pub fn run(shell: &mut Shell, quiet: bool) -> Result<()> {
    let mut editor = DefaultEditor::new().context("failed to initialise line editor")?;
    if !quiet {
        banner::print_banner();
    }
    log::info!(
        "Shell session started in {} (trash: {}, history: {})",
        shell.session().cwd.display(),
        shell.session().trash().root().display(),
        shell.session().history().path().display()
    );
    match shell.session().trash().entries() {
        Ok(entries) if !entries.is_empty() => {
            log::debug!("{} entries already in trash", entries.len())
        }
        Ok(_) => {}
        Err(err) => log::warn!("cannot list trash: {err}"),
    }

    loop {
        let prompt = render::prompt(&shell.session().cwd, shell.session().home());
        match editor.readline(&prompt) {
            Ok(line) => {
                if !line.trim().is_empty() {
                    editor.add_history_entry(line.trim()).ok();
                }
                match shell.handle_line(&line) {
                    Flow::Continue(Reply::Output(text)) => render::print_output(&text),
                    Flow::Continue(Reply::Failed(message)) => render::print_error(&message),
                    Flow::Continue(Reply::Silent) => {}
                    Flow::Exit => break,
                }
            }
            Err(ReadlineError::Interrupted | ReadlineError::Eof) => {
                render::print_warning("\nExiting shell.");
                log::info!("Shell exited by user");
                break;
            }
            Err(err) => return Err(err).context("failed to read input"),
        }
    }
    Ok(())
}
