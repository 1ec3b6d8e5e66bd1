use anyhow::Result;
use autoformat_config::Config;
use autoformat_engine::{
    BlockType, CaretMove, EditError, EditorState, InlineStyle, Outcome, RichText, StyleSet,
    UndoHistory, on_before_insert,
    persistence::{DocumentStore, validate_root},
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
};
use relative_path::RelativePathBuf;
use std::{
    env,
    io::{Stdout, stdout},
    path::PathBuf,
    process,
};

struct App {
    store: DocumentStore,
    document_name: RelativePathBuf,
    history: UndoHistory,
    saved: EditorState,
    autoformat: bool,
    status: Option<String>,
}

impl App {
    fn new(store: DocumentStore, document_name: RelativePathBuf, autoformat: bool) -> Result<Self> {
        let state = store.load(&document_name)?.unwrap_or_default();

        Ok(Self {
            store,
            document_name,
            history: UndoHistory::new(state.clone()),
            saved: state,
            autoformat,
            status: None,
        })
    }

    fn state(&self) -> &EditorState {
        self.history.current()
    }

    fn is_dirty(&self) -> bool {
        self.state().blocks() != self.saved.blocks()
    }

    /// Offer the character to the trigger engine, inserting it when unhandled
    fn type_char(&mut self, ch: char) {
        let inserted = ch.to_string();
        let state = self.state();

        let next = if self.autoformat {
            match on_before_insert(state, &inserted) {
                Ok(Outcome::Handled(next)) => Ok(next),
                Ok(Outcome::NotHandled) => state.insert_text(&inserted),
                Err(e) => Err(e),
            }
        } else {
            state.insert_text(&inserted)
        };
        self.commit(next);
    }

    fn split_block(&mut self) {
        let state = self.state();
        let next = state.split_block(&state.selection());
        self.commit(next);
    }

    fn backspace(&mut self) {
        let next = self.state().backspace();
        self.commit(next);
    }

    fn move_caret(&mut self, movement: CaretMove) {
        let next = self.state().move_caret(movement);
        self.history.replace_current(next);
    }

    fn undo(&mut self) {
        self.status = match self.history.undo() {
            Some(_) => None,
            None => Some("Nothing to undo".to_string()),
        };
    }

    fn redo(&mut self) {
        self.status = match self.history.redo() {
            Some(_) => None,
            None => Some("Nothing to redo".to_string()),
        };
    }

    fn save(&mut self) {
        match self.store.save(&self.document_name, self.state()) {
            Ok(()) => {
                self.saved = self.state().clone();
                self.status = Some("Saved successfully".to_string());
            }
            Err(e) => {
                log::error!("Failed to save {}: {e}", self.document_name);
                self.status = Some(format!("Error saving document: {e}"));
            }
        }
    }

    fn commit(&mut self, next: Result<EditorState, EditError>) {
        match next {
            Ok(next) => {
                if next != *self.state() {
                    self.history.push(next);
                }
                self.status = None;
            }
            Err(e) => {
                log::error!("Edit rejected: {e}");
                self.status = Some(format!("Error: {e}"));
            }
        }
    }

    /// Returns false when the editor should quit
    fn handle_key(&mut self, key: KeyEvent) -> bool {
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);

        match key.code {
            KeyCode::Esc => return false,
            KeyCode::Char('q') if ctrl => return false,
            KeyCode::Char('s') if ctrl => self.save(),
            KeyCode::Char('z') if ctrl => self.undo(),
            KeyCode::Char('y') if ctrl => self.redo(),
            KeyCode::Char(_) if ctrl => {}
            KeyCode::Char(ch) => self.type_char(ch),
            KeyCode::Enter => self.split_block(),
            KeyCode::Backspace => self.backspace(),
            KeyCode::Left => self.move_caret(CaretMove::Left),
            KeyCode::Right => self.move_caret(CaretMove::Right),
            KeyCode::Up => self.move_caret(CaretMove::Up),
            KeyCode::Down => self.move_caret(CaretMove::Down),
            KeyCode::Home => self.move_caret(CaretMove::BlockStart),
            KeyCode::End => self.move_caret(CaretMove::BlockEnd),
            _ => {}
        }
        true
    }
}

fn main() -> Result<()> {
    // The TUI owns the terminal, so logging stays off unless asked for
    if env::var_os("RUST_LOG").is_some() {
        env_logger::Builder::from_default_env().init();
    }

    // Determine documents path from CLI args or config file
    let args: Vec<String> = env::args().collect();
    let config_path = Config::config_path();

    let config;
    let from_config;

    if args.len() == 2 {
        // CLI argument provided - use it
        config = Config::new(PathBuf::from(&args[1]));
        from_config = false;
    } else if args.len() == 1 {
        // No CLI argument - try config file
        match Config::load() {
            Ok(Some(loaded)) => {
                config = loaded;
                from_config = true;
            }
            Ok(None) => {
                eprintln!("Error: No documents path provided and no config file found");
                eprintln!("Usage: {} <documents-folder>", args[0]);
                eprintln!("Or create a config file at {}", config_path.display());
                process::exit(1);
            }
            Err(e) => {
                eprintln!("Error: Failed to load config file: {e}");
                eprintln!("Usage: {} <documents-folder>", args[0]);
                process::exit(1);
            }
        }
    } else {
        eprintln!("Usage: {} [documents-folder]", args[0]);
        process::exit(1);
    };

    if let Err(e) = validate_root(&config.documents_path) {
        let source = if from_config {
            format!(" from config file '{}'", config_path.display())
        } else {
            String::new()
        };
        eprintln!(
            "Error: Documents path '{}'{} is invalid: {e}",
            config.documents_path.display(),
            source
        );
        process::exit(1);
    }

    // Remember a folder given on the command line when no config exists yet
    if !from_config && !config_path.exists() {
        let mut remembered = config.clone();
        if let Ok(absolute) = remembered.documents_path.canonicalize() {
            remembered.documents_path = absolute;
        }
        match remembered.save() {
            Ok(()) => log::info!("Created config file at {}", config_path.display()),
            Err(e) => log::warn!("Failed to create config file: {e}"),
        }
    }

    log::info!(
        "Opening {} in {}",
        config.document_name,
        config.documents_path.display()
    );
    let mut app = App::new(
        DocumentStore::new(&config.documents_path),
        RelativePathBuf::from(config.document_name.as_str()),
        config.autoformat,
    )?;

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    // Main loop
    let res = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    Ok(())
}

fn run_app(terminal: &mut Terminal<CrosstermBackend<Stdout>>, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
            && !app.handle_key(key)
        {
            return Ok(());
        }
    }
}

fn span_style(styles: &StyleSet, block_type: BlockType) -> Style {
    let mut style = Style::default();
    if block_type == BlockType::HeaderOne {
        style = style.add_modifier(Modifier::BOLD);
    }
    for inline in styles {
        style = match inline {
            InlineStyle::Bold => style.add_modifier(Modifier::BOLD),
            InlineStyle::Italic => style.add_modifier(Modifier::ITALIC),
            InlineStyle::Underline => style.add_modifier(Modifier::UNDERLINED),
            InlineStyle::Redline => style.fg(Color::Red),
            InlineStyle::Code => style.bg(Color::DarkGray),
        };
    }
    style
}

/// One line per block, consecutive chars with equal styles sharing a span
fn block_line(block: &autoformat_engine::Block) -> Line<'static> {
    let mut spans = Vec::new();
    let mut run = String::new();
    let mut run_styles: Option<&StyleSet> = None;

    for (ch, styles) in block.text().chars().zip(block.styles()) {
        if let Some(current) = run_styles
            && current != styles
        {
            spans.push(Span::styled(
                std::mem::take(&mut run),
                span_style(current, block.block_type()),
            ));
        }
        run_styles = Some(styles);
        run.push(ch);
    }
    if let Some(current) = run_styles {
        spans.push(Span::styled(run, span_style(current, block.block_type())));
    }

    Line::from(spans)
}

/// Display width of the text before the caret, in terminal columns
fn caret_column(block: &autoformat_engine::Block, offset: usize) -> u16 {
    let before: String = block.text().chars().take(offset).collect();
    u16::try_from(Line::raw(before).width()).unwrap_or(u16::MAX)
}

fn ui(f: &mut Frame, app: &App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(3), Constraint::Length(1), Constraint::Length(1)].as_ref())
        .split(f.area());

    let state = app.state();
    let lines: Vec<Line> = state.blocks().iter().map(block_line).collect();

    let selection = state.selection();
    let row = state.block_index(&selection.focus_key).unwrap_or(0);
    let visible_rows = chunks[0].height.saturating_sub(2) as usize;
    let scroll = row.saturating_sub(visible_rows.saturating_sub(1));

    let marker = if app.is_dirty() { " [+]" } else { "" };
    let title = format!("{}{}", app.document_name, marker);
    let editor = Paragraph::new(lines)
        .block(Block::default().borders(Borders::ALL).title(title))
        .scroll((scroll as u16, 0));
    f.render_widget(editor, chunks[0]);

    let column = state
        .block(&selection.focus_key)
        .map(|block| caret_column(block, selection.focus_offset))
        .unwrap_or(0);
    let line = u16::try_from(row - scroll).unwrap_or(u16::MAX);
    let x = chunks[0].x.saturating_add(1).saturating_add(column);
    let y = chunks[0].y.saturating_add(1).saturating_add(line);
    f.set_cursor_position(Position::new(x, y));

    let status = Paragraph::new(Line::from(app.status.clone().unwrap_or_default()));
    f.render_widget(status, chunks[1]);

    let help_text = Line::from(vec![
        Span::raw("Esc/Ctrl-Q: Quit | "),
        Span::raw("Ctrl-S: Save | "),
        Span::raw("Ctrl-Z/Ctrl-Y: Undo/Redo | "),
        Span::raw("Type # * ** *** ``` then space to format"),
    ]);
    f.render_widget(Paragraph::new(help_text), chunks[2]);
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn app_in(dir: &TempDir, autoformat: bool) -> App {
        App::new(
            DocumentStore::new(dir.path()),
            RelativePathBuf::from("editorContent.json"),
            autoformat,
        )
        .unwrap()
    }

    fn press(app: &mut App, code: KeyCode) {
        app.handle_key(KeyEvent::new(code, KeyModifiers::NONE));
    }

    fn ctrl(app: &mut App, ch: char) -> bool {
        app.handle_key(KeyEvent::new(KeyCode::Char(ch), KeyModifiers::CONTROL))
    }

    fn type_str(app: &mut App, text: &str) {
        for ch in text.chars() {
            press(app, KeyCode::Char(ch));
        }
    }

    #[test]
    fn test_typing_goes_through_autoformat() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, true);

        type_str(&mut app, "# Title");

        let block = &app.state().blocks()[0];
        assert_eq!(block.block_type(), BlockType::HeaderOne);
        assert_eq!(block.text(), "Title");
    }

    #[test]
    fn test_autoformat_can_be_disabled() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, false);

        type_str(&mut app, "# Title");

        assert_eq!(app.state().blocks()[0].text(), "# Title");
        assert_eq!(app.state().blocks()[0].block_type(), BlockType::Unstyled);
    }

    #[test]
    fn test_save_reports_status_and_reloads() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, true);
        type_str(&mut app, "foo* bar");
        press(&mut app, KeyCode::Enter);
        type_str(&mut app, "next");
        assert!(app.is_dirty());

        ctrl(&mut app, 's');

        assert_eq!(app.status.as_deref(), Some("Saved successfully"));
        assert!(!app.is_dirty());
        let reopened = app_in(&dir, true);
        assert_eq!(reopened.state().blocks(), app.state().blocks());
    }

    #[test]
    fn test_undo_redo_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, true);
        type_str(&mut app, "ab");

        ctrl(&mut app, 'z');
        assert_eq!(app.state().plain_text(), "a");
        ctrl(&mut app, 'y');
        assert_eq!(app.state().plain_text(), "ab");
    }

    #[test]
    fn test_quit_keys() {
        let dir = TempDir::new().unwrap();
        let mut app = app_in(&dir, true);

        assert!(!ctrl(&mut app, 'q'));
        assert!(!app.handle_key(KeyEvent::new(KeyCode::Esc, KeyModifiers::NONE)));
        assert!(ctrl(&mut app, 'x'));
    }

    #[test]
    fn test_block_line_groups_styled_runs() {
        let block = autoformat_engine::Block::new("a", "plain bold")
            .with_style(6, 10, InlineStyle::Bold);

        let line = block_line(&block);

        let texts: Vec<&str> = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(texts, vec!["plain ", "bold"]);
        assert_eq!(line.spans[1].style, Style::default().add_modifier(Modifier::BOLD));
    }

    #[test]
    fn test_caret_column_counts_display_width() {
        let block = autoformat_engine::Block::new("a", "日本go");

        assert_eq!(caret_column(&block, 0), 0);
        assert_eq!(caret_column(&block, 2), 4);
        assert_eq!(caret_column(&block, 3), 5);
    }

    #[test]
    fn test_caret_column_saturates_on_long_blocks() {
        let long = "x".repeat(usize::from(u16::MAX) + 10);
        let block = autoformat_engine::Block::new("a", long.as_str());

        assert_eq!(caret_column(&block, block.len()), u16::MAX);
    }

    #[test]
    fn test_span_style_for_heading_and_code() {
        let style = span_style(&StyleSet::from([InlineStyle::Code]), BlockType::HeaderOne);

        assert_eq!(
            style,
            Style::default()
                .add_modifier(Modifier::BOLD)
                .bg(Color::DarkGray)
        );
    }
}
