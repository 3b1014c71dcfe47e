use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use owo_colors::OwoColorize;
use stopmap_pipeline::{PipelineConfig, SessionStore};

#[derive(Debug, Parser)]
pub struct SessionCli {
    #[command(subcommand)]
    pub command: SessionCommand,
}

#[derive(Debug, Subcommand)]
pub enum SessionCommand {
    /// Show the stored viewer address
    Show,

    /// Store the viewer address handed over by the wallet
    Login {
        #[arg(value_name = "ADDRESS")]
        address: String,
    },

    /// Forget the stored viewer address
    Logout,
}

impl SessionCli {
    pub fn run(self, config: &PipelineConfig) -> Result<()> {
        let mut store = SessionStore::open(&config.state_dir).with_context(|| {
            format!("Failed to open session in {}", config.state_dir.display())
        })?;

        match self.command {
            SessionCommand::Show => match store.address() {
                Some(address) => println!("{address}"),
                None => println!("{} Not logged in", "✗".bright_red()),
            },
            SessionCommand::Login { address } => {
                if store.login(&address)? {
                    println!("{} Logged in as {}", "✓".bright_green(), address.trim());
                } else {
                    println!("Already logged in as {}", address.trim());
                }
            }
            SessionCommand::Logout => {
                if store.logout()? {
                    println!("{} Logged out", "✓".bright_green());
                } else {
                    println!("Not logged in");
                }
            }
        }

        Ok(())
    }
}
