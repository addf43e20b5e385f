use clap::Parser;

#[derive(Parser)]
#[command(name = "nexus")]
pub(crate) struct Cli {
    /// Logical alias or `provider/model` pair to route to.
    #[arg(long, default_value = "demo/echo-1")]
    pub(crate) model: String,
    /// The user message to send.
    #[arg(long)]
    pub(crate) message: String,
    /// Block requests containing this case-insensitive substring.
    #[arg(long)]
    pub(crate) blocklist: Vec<String>,
}
