use std::io;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use grocer_cli::{invoice, CheckoutSession};
use grocer_order::Biller;
use grocer_store::{load_catalogue, Config, InvoiceFormat};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Price a basket of groceries against a rate catalogue
#[derive(Debug, Parser)]
#[command(name = "grocer", version)]
struct Cli {
    /// Pipe-delimited pricing catalogue (falls back to `catalogue.path` in config)
    catalogue: Option<PathBuf>,

    /// Invoice output: text or json
    #[arg(long)]
    format: Option<InvoiceFormat>,

    /// Match product names regardless of case
    #[arg(long)]
    ignore_case: bool,

    /// Print the loaded catalogue and exit
    #[arg(long)]
    dump_catalogue: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "grocer_cli=info,grocer_store=info,grocer_order=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = Config::load().context("Failed to load config")?;

    let path = cli
        .catalogue
        .or_else(|| config.catalogue.path.clone().map(PathBuf::from))
        .context("Please specify a path to a pricing catalogue file")?;

    let catalogue = load_catalogue(&path)
        .with_context(|| format!("Failed to load catalogue from {}", path.display()))?;

    if cli.dump_catalogue {
        print!("{}", catalogue);
        return Ok(());
    }
    println!("Price catalogue loaded successfully from [{}]\n", path.display());

    let session = CheckoutSession::new(&catalogue)
        .with_magic_word(config.checkout.magic_word.clone())
        .with_ignore_case(cli.ignore_case || config.catalogue.ignore_case);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    let list = session
        .run(stdin.lock(), &mut stdout, &mut stderr)
        .context("Failed to read purchase requests")?;

    let bill = Biller::new(&catalogue)
        .bill(&list)
        .context("Failed to price the basket")?;

    let format = cli.format.unwrap_or(config.invoice.format);
    print!("{}", invoice::render(&bill, format)?);

    Ok(())
}
