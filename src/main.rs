use anyhow::Result;
use log::info;

#[tokio::main]
async fn main() -> Result<()> {
    // A cancelled exchange is a transport failure; there is nothing to clean
    // up beyond dropping the in-flight poll.
    tokio::select! {
        result = deye_bridge::app() => result,
        _ = tokio::signal::ctrl_c() => {
            info!("interrupted, abandoning poll");
            Ok(())
        }
    }
}
