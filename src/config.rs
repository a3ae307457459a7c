use clap::Parser;

use crate::analytics::poisson::MAX_GOALS_LIMIT;

/// Fixture list and odds analytics service
#[derive(Parser, Debug, Clone)]
#[command(name = "fixture-analytics", version, about)]
pub struct Config {
    /// HTTP listen address
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:3000")]
    pub listen_addr: String,

    /// SQLite database path
    #[arg(long, env = "DATABASE_PATH", default_value = "fixtures.db")]
    pub database_path: String,

    /// Key required in the x-admin-key header to replace the fixture list
    #[arg(long, env = "ADMIN_KEY", hide_env_values = true)]
    pub admin_key: String,

    /// Highest per-side goal count enumerated by the Poisson scoreline grid
    #[arg(long, env = "MAX_GOALS", default_value = "6")]
    pub max_goals: u32,
}

impl Config {
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.admin_key.trim().is_empty() {
            anyhow::bail!("ADMIN_KEY must not be empty");
        }
        if !(1..=MAX_GOALS_LIMIT).contains(&self.max_goals) {
            anyhow::bail!("max_goals must be between 1 and {}", MAX_GOALS_LIMIT);
        }
        if self.database_path.trim().is_empty() {
            anyhow::bail!("database_path must not be empty");
        }
        Ok(())
    }
}
