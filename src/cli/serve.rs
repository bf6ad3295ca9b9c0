//! `kitchen serve`: run the HTTP server.

use anyhow::Result;
use clap::Args;

use crate::config::KitchenConfig;
use crate::server;

/// Run the build/proxy server until Ctrl+C.
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind, overriding `[server].host`
    #[arg(long, env = "KITCHEN_HOST")]
    host: Option<String>,

    /// Port to bind, overriding `[server].port`
    #[arg(long, env = "KITCHEN_PORT")]
    port: Option<u16>,
}

impl ServeCommand {
    pub async fn execute(self, config: KitchenConfig) -> Result<()> {
        let config = self.apply(config);
        config.validate()?;
        server::serve(config).await
    }

    /// Command-line overrides on top of the file configuration.
    fn apply(self, mut config: KitchenConfig) -> KitchenConfig {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        config
    }
}
