use clap::Parser;
use color_eyre::eyre::Result;
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::env;
use std::io::{self, Stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use ghist::config::{Args, Config};
use ghist::git::{GitProvider, Target, discover_repo_root, resolve_target};
use ghist::loader::LoadCoordinator;
use ghist::logging;
use ghist::navigation::NavigationState;
use ghist::pane::{GlobalKeyHandler, KeyResult};
use ghist::ui::{self, App};

include!(concat!(env!("OUT_DIR"), "/git_sha.rs"));

type Tui = Terminal<CrosstermBackend<Stdout>>;

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    if args.version {
        println!("ghist version {} (git: {GIT_SHA})", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    let config = Config::load()?;
    let final_config = config.merge_with_args(&args);

    logging::init_logging(final_config.debug.unwrap_or(false))?;
    color_eyre::install()?;

    let launch_cwd = env::current_dir()?;
    let (repo_root, target) = startup_target(&args, &launch_cwd)?;
    log::info!("Starting ghist on {target} in {}", repo_root.display());
    log::debug!("Debug mode enabled");

    let provider = Arc::new(GitProvider::new(
        final_config.get_commit_order(),
        final_config.get_follow_renames(),
    ));
    let mut coordinator = LoadCoordinator::new(provider);

    let mut nav = NavigationState::new(
        final_config.get_load_limits(),
        final_config.get_align_mode(),
    );
    nav.retarget(target);

    let mut app = App::new(
        nav,
        final_config.get_theme().into(),
        repo_root,
        launch_cwd,
    );

    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let _ = terminal.clear();

    let result = run(&mut terminal, &mut app, &mut coordinator).await;

    coordinator.cancel_all();
    disable_raw_mode()?;
    execute!(io::stdout(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    log::info!("Application shutdown complete");
    result
}

/// Work out what to show first: the file given on the command line, or the
/// whole repository found from `--repo` (or the current directory).
fn startup_target(args: &Args, launch_cwd: &Path) -> Result<(PathBuf, Target)> {
    match &args.file {
        Some(file) => {
            let absolute = launch_cwd.join(file);
            let start = absolute.parent().unwrap_or(launch_cwd);
            let repo_root = discover_repo_root(start)?;
            let target = resolve_target(&repo_root, launch_cwd, &file.to_string_lossy())?;
            Ok((repo_root, target))
        }
        None => {
            let dir = args
                .repo
                .as_ref()
                .map(|repo| launch_cwd.join(repo))
                .unwrap_or_else(|| launch_cwd.to_path_buf());
            let repo_root = discover_repo_root(&dir)?;
            Ok((
                repo_root.clone(),
                Target::Repository { repo_root },
            ))
        }
    }
}

async fn run(terminal: &mut Tui, app: &mut App, coordinator: &mut LoadCoordinator) -> Result<()> {
    let mut events = EventStream::new();

    loop {
        for command in app.nav.take_commands() {
            coordinator.execute(command);
        }

        let render_start = std::time::Instant::now();
        terminal.draw(|f| ui::render(f, app))?;
        let render_duration = render_start.elapsed();
        if render_duration.as_millis() > 10 {
            log::debug!("Slow render detected: {render_duration:?}");
        }

        tokio::select! {
            maybe_event = events.next() => match maybe_event {
                Some(Ok(Event::Key(key))) if key.kind == KeyEventKind::Press => {
                    if GlobalKeyHandler::handle_global_key(app, &key) == KeyResult::Quit {
                        return Ok(());
                    }
                }
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e.into()),
                None => return Ok(()),
            },
            Some(event) = coordinator.next() => {
                app.nav.apply(event);
            }
        }
    }
}
