//! cuenta-cobro – command-line invoice generator.
//!
//! Usage:
//!   cuenta-cobro <client_name> <identification> <services_json> <observations>
//!                <concept> <date> [service_project]
//!
//! Prints the path of the generated PDF on stdout.

use std::path::PathBuf;
use std::process;

use clap::Parser;

use cuenta_cobro::{
    generate_invoice, parse_line_items, InvoiceConfig, InvoiceRequest, IssuerProfile,
};

#[derive(Parser, Debug)]
#[command(name = "cuenta-cobro", version, about = "Generate a cuenta de cobro PDF")]
struct Cli {
    /// Client name
    client_name: String,

    /// Client identification (NIT / cédula)
    identification: String,

    /// JSON list of {"description", "quantity", "unit_price"} objects
    services_json: String,

    /// Observations; the default placeholder text shows the concept instead
    observations: String,

    /// General concept of the invoice
    concept: String,

    /// Invoice date, printed as given
    date: String,

    /// Services/projects label, overrides the concept in the header
    service_project: Option<String>,

    /// Directory holding fonts/, base.jpg|png and generated/
    #[arg(long, env = "CUENTA_COBRO_BASE_DIR", default_value = ".")]
    base_dir: PathBuf,

    /// Output directory (default: <base-dir>/generated)
    #[arg(long, env = "CUENTA_COBRO_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// JSON issuer profile (name, tax_id, phone, email, city, bank_account, mobile_payment)
    #[arg(long, env = "CUENTA_COBRO_ISSUER")]
    issuer: Option<PathBuf>,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let items = match parse_line_items(&cli.services_json) {
        Ok(items) => items,
        Err(e) => {
            eprintln!("Error decoding services JSON: {e}");
            process::exit(1);
        }
    };

    let mut config = InvoiceConfig::from_base_dir(&cli.base_dir);
    if let Some(dir) = cli.output_dir {
        config = config.with_output_dir(dir);
    }
    if let Some(path) = cli.issuer {
        match IssuerProfile::from_json_file(&path) {
            Ok(issuer) => config = config.with_issuer(issuer),
            Err(e) => {
                eprintln!("Error: {e}");
                process::exit(1);
            }
        }
    }

    let request = InvoiceRequest {
        client_name: cli.client_name,
        client_id: cli.identification,
        items,
        observations: Some(cli.observations),
        concept: cli.concept,
        date: cli.date,
        service_project: cli.service_project,
    };

    match generate_invoice(&request, &config) {
        Ok(rendered) => println!("{}", rendered.path.display()),
        Err(e) => {
            eprintln!("Error generating PDF: {e}");
            process::exit(1);
        }
    }
}
