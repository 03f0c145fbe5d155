use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{error, info};
use yk_core::util::decode_input;
use yk_core::{ChallengeMode, NusbTransport, SessionConfig, YubiKey};

#[derive(Parser, Debug)]
#[command(author, version, about = "YubiKey USB HID Tool (Pure Rust)", long_about = None)]
struct Args {
    /// Session settings (TOML)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Use the n-th YubiKey found
    #[arg(long)]
    skip: Option<usize>,

    /// Never wait for a button press
    #[arg(long)]
    no_block: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print firmware version and programming state
    Status,
    /// Read the serial number
    Serial,
    /// Send a challenge and print the response as hex
    Challenge {
        /// Challenge bytes; prefix with h: for hex or m: for modhex
        challenge: String,

        /// Slot to challenge (1 or 2)
        #[arg(long, default_value_t = 1)]
        slot: u8,

        /// Yubico OTP mode instead of HMAC-SHA1
        #[arg(long)]
        otp: bool,

        /// HMAC challenge is always 64 bytes (no variable length)
        #[arg(long)]
        fixed: bool,
    },
    /// Print what the connected YubiKey supports
    Capabilities,
    /// List attached YubiKeys
    List,
}

fn main() {
    let args = Args::parse();

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(if args.verbose {
                    tracing::Level::DEBUG.into()
                } else {
                    tracing::Level::INFO.into()
                })
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    if let Err(e) = run(args) {
        error!("Error: {:#}", e);
        std::process::exit(1);
    }
}

fn session_config(args: &Args) -> Result<SessionConfig> {
    let mut config = match &args.config {
        Some(path) => SessionConfig::load_from_file(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => SessionConfig::default(),
    };
    if let Some(skip) = args.skip {
        config.skip = skip;
    }
    if args.no_block {
        config.may_block = false;
    }
    Ok(config)
}

fn run(args: Args) -> Result<()> {
    if let Commands::List = args.command {
        let devices = NusbTransport::enumerate()?;
        if devices.is_empty() {
            info!("No YubiKey found");
        }
        for (index, dev) in devices.iter().enumerate() {
            println!(
                "{}: {:04x}:{:04x} {} {}",
                index,
                dev.vendor_id,
                dev.product_id,
                dev.product.as_deref().unwrap_or("-"),
                dev.serial.as_deref().unwrap_or("")
            );
        }
        return Ok(());
    }

    let config = session_config(&args)?;
    let may_block = config.may_block;
    let mut yk = YubiKey::open(config)?;
    info!("Found {}", yk.description());

    match args.command {
        Commands::Status => {
            let status = yk.status()?;
            println!("{}", status);
        }
        Commands::Serial => {
            println!("{}", yk.read_serial(may_block)?);
        }
        Commands::Challenge {
            challenge,
            slot,
            otp,
            fixed,
        } => {
            let mode = if otp {
                ChallengeMode::Otp
            } else {
                ChallengeMode::Hmac
            };
            let data = decode_input(challenge.as_bytes())?;
            let response = yk.challenge_response(&data, mode, slot, !fixed, may_block)?;
            println!("{}", hex::encode(response));
        }
        Commands::Capabilities => {
            let caps = *yk.capabilities();
            println!("{} {}", yk.description(), caps.version());
            println!("  OATH-HOTP:          {}", caps.have_oath_hotp());
            println!(
                "  challenge-response: {}",
                caps.have_challenge_response(ChallengeMode::Hmac)
            );
            println!("  serial number:      {}", caps.have_serial_number());
            println!("  NDEF:               {}", caps.have_nfc_ndef(1));
            println!("  device config:      {}", caps.have_device_config());
            println!("  scan map:           {}", caps.have_scanmap());
            if caps.have_capabilities() {
                println!("  applications:       {:?}", caps.yk4_capa());
            }
            if let Ok(slots) = yk.status()?.valid_slots() {
                println!("  programmed slots:   {:?}", slots);
            }
        }
        Commands::List => {}
    }

    Ok(())
}
