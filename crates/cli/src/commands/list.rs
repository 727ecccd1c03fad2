//! plots list command

use crate::session::Session;
use clap::Args;

#[derive(Debug, Args)]
pub struct ListCommand {
    /// What to list: mine, shared, world, area, all, done, top, forsale,
    /// unowned, expired, fuzzy <search...>, a world or a player, then an
    /// optional page number
    #[arg(num_args = 0.., trailing_var_arg = true, allow_hyphen_values = true)]
    pub args: Vec<String>,
}

impl ListCommand {
    pub async fn run(&self, session: &Session) -> anyhow::Result<()> {
        let request = session.core.request(self.args.as_slice())?;
        let page = session.list(&request).await?;
        println!("{}", session.render(&page)?);
        Ok(())
    }
}
