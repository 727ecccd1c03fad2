//! plots complete command

use crate::session::Session;
use clap::Args;

#[derive(Debug, Args)]
pub struct CompleteCommand {
    /// Start of the first list argument
    #[arg(default_value = "")]
    pub prefix: String,
}

impl CompleteCommand {
    pub fn run(&self, session: &Session) -> anyhow::Result<()> {
        let completions = session.core.completions(&self.prefix);
        if session.is_json() {
            println!("{}", serde_json::to_string(&completions)?);
        } else {
            for completion in completions {
                println!("{}", completion);
            }
        }
        Ok(())
    }
}
