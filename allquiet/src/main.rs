use allquiet::AllQuietProvider;
use tfplug::{serve, ServerConfig};

#[tokio::main]
async fn main() -> tfplug::Result<()> {
    serve(AllQuietProvider::new(), ServerConfig::default()).await
}
