use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = cors_relay::cli::Cli::parse();
    if let Err(e) = cors_relay::run::execute(cli).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}
