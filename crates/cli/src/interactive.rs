//! Interactive REPL mode

use crate::session::Session;
use console::style;
use dialoguer::theme::ColorfulTheme;
use dialoguer::Input;
use listing::{ListKind, ListRequest, ListingError, PageArg};
use shared::Identity;

/// What the loop should do after a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
    /// The named player is unknown; ask for another name
    AskPlayer { key: String, page: PageArg },
}

/// Interactive CLI: each line is a list command or a `/` command
pub struct InteractiveCli {
    session: Session,
}

impl InteractiveCli {
    pub fn new(session: Session) -> Self {
        Self { session }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    fn prompt(&self) -> String {
        match (&self.session.viewer.world, &self.session.viewer.area) {
            (Some(world), Some(area)) => format!("{}/{}", world, area),
            (Some(world), None) => world.clone(),
            _ => "plots".to_string(),
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> anyhow::Result<()> {
        println!("{}", style("Plots Interactive Mode").bold());
        println!("Type a list command such as `mine` or `all 2`, /help for commands, /quit to exit");
        println!();

        let theme = ColorfulTheme::default();
        loop {
            let input: String = Input::with_theme(&theme)
                .with_prompt(self.prompt())
                .allow_empty(true)
                .interact_text()?;

            let mut outcome = self.handle_line(&input).await?;
            loop {
                match outcome {
                    LineOutcome::Exit => return Ok(()),
                    LineOutcome::Continue => break,
                    LineOutcome::AskPlayer { key, page } => {
                        let retry: String = Input::with_theme(&theme)
                            .with_prompt(format!("No player named '{}', try another name (empty to skip)", key))
                            .allow_empty(true)
                            .interact_text()?;
                        let retry = retry.trim();
                        if retry.is_empty() {
                            break;
                        }
                        let request = ListRequest::new(ListKind::Named(retry.to_string())).with_page(page);
                        outcome = self.show(request).await;
                    }
                }
            }
        }
    }

    /// Handle one line of input
    pub async fn handle_line(&mut self, input: &str) -> anyhow::Result<LineOutcome> {
        let input = input.trim();
        if input.is_empty() {
            return Ok(LineOutcome::Continue);
        }
        if input.starts_with('/') {
            return self.handle_command(input);
        }

        let parts: Vec<&str> = input.split_whitespace().collect();
        match self.session.core.request(&parts[..]) {
            Ok(request) => Ok(self.show(request).await),
            Err(e) => {
                println!("{}", style(e).yellow());
                Ok(LineOutcome::Continue)
            }
        }
    }

    async fn show(&self, request: ListRequest) -> LineOutcome {
        match self.session.list(&request).await {
            Ok(page) => {
                match self.session.render(&page) {
                    Ok(text) => println!("{}", text),
                    Err(e) => println!("{} {}", style("Error:").red(), e),
                }
                LineOutcome::Continue
            }
            Err(ListingError::InvalidPlayer { key }) => LineOutcome::AskPlayer {
                key,
                page: request.page,
            },
            Err(e) => {
                println!("{} {}", style("Error:").red(), e);
                LineOutcome::Continue
            }
        }
    }

    fn handle_command(&mut self, input: &str) -> anyhow::Result<LineOutcome> {
        let parts: Vec<&str> = input.split_whitespace().collect();
        let cmd = parts.first().copied().unwrap_or("");
        let arg = parts.get(1).copied();

        match cmd {
            "/quit" | "/exit" | "/q" => {
                println!("Goodbye!");
                return Ok(LineOutcome::Exit);
            }
            "/help" | "/h" => {
                println!("Commands:");
                println!("  <kind> [args] [page] - List plots (mine, shared, world, area, all, done, top,");
                println!("                         forsale, unowned, expired, fuzzy <search...>, <player>, <world>)");
                println!("  /complete [prefix]   - Show completions for the first list argument");
                println!("  /as <uuid>           - View as another identity");
                println!("  /world [name]        - Set or clear the current world");
                println!("  /area [name]         - Set or clear the current area");
                println!("  /status              - Show viewer and name cache status");
                println!("  /quit                - Exit");
            }
            "/complete" => {
                let completions = self.session.core.completions(arg.unwrap_or(""));
                println!("{}", completions.join(", "));
            }
            "/as" => match arg.map(Identity::parse) {
                Some(Ok(identity)) => {
                    self.session.viewer.identity = identity;
                    println!("Viewing as {}", identity);
                }
                Some(Err(e)) => println!("{}", style(e).yellow()),
                None => println!("Viewing as {}", self.session.viewer.identity),
            },
            "/world" => {
                self.session.viewer.world = arg.map(str::to_string);
                println!("World: {}", arg.unwrap_or("(none)"));
            }
            "/area" => {
                self.session.viewer.area = arg.map(str::to_string);
                println!("Area: {}", arg.unwrap_or("(none)"));
            }
            "/status" => {
                let stats = self.session.core.pipeline().stats();
                println!("Status:");
                println!("  Viewer: {}", self.session.viewer.identity);
                println!("  World: {:?}", self.session.viewer.world);
                println!("  Area: {:?}", self.session.viewer.area);
                println!(
                    "  Names: {} cached, {} in flight, {} cache hits, {} remote requests ({} failed)",
                    stats.cached_entries, stats.in_flight, stats.cache_hits, stats.remote_requests, stats.remote_failures
                );
            }
            _ => {
                println!("Unknown command: {}", cmd);
            }
        }

        Ok(LineOutcome::Continue)
    }
}
