use clap::Parser;
use reqwest::Url;

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    #[arg(short, long, env = "API_HOST", default_value = "127.0.0.1")]
    pub bind: String,

    #[arg(short, long, env = "API_PORT", default_value = "8124")]
    pub port: u16,

    #[arg(
        short = 'e',
        long,
        env = "ARCHIVE_ENDPOINT",
        help = "URL of the archive JSON-RPC endpoint requests are forwarded to."
    )]
    pub archive_endpoint: Url,
}
