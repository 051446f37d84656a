use clap::Parser;
use std::error::Error;
use std::fs;
use std::io::{self, Read};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;
use vtpmtoken::attestation::{
    AttestationClient, TokenType, DEFAULT_AUDIENCE, DEFAULT_SIMULATED_TOKEN_PATH,
    DEFAULT_SOCKET_PATH,
};
use vtpmtoken::validation::{self, TrustAnchor, Validator, DEFAULT_ISSUER};

#[derive(Parser)]
enum VtpmTokenCli {
    Token(TokenArgs),
    Validate(ValidateArgs),
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Request an attestation token bound to the supplied nonces from \
    the Confidential Space launcher and print it")]
struct TokenArgs {
    /// 10 to 74 bytes each; may be repeated
    #[arg(short, long = "nonce", required = true)]
    nonces: Vec<String>,

    #[arg(short, long, default_value = DEFAULT_AUDIENCE)]
    audience: String,

    /// OIDC or PKI
    #[arg(short, long, default_value_t = TokenType::Oidc)]
    token_type: TokenType,

    #[arg(short, long, env = "VTPM_SOCKET", default_value = DEFAULT_SOCKET_PATH)]
    socket: PathBuf,

    /// Return a pre-generated token instead of contacting the launcher
    #[arg(long, env = "SIMULATE_ATTESTATION")]
    simulate: bool,

    #[arg(long, env = "VTPM_SIMULATED_TOKEN", default_value = DEFAULT_SIMULATED_TOKEN_PATH)]
    simulated_token: PathBuf,
}

#[derive(Debug, clap::Args)]
#[command(author, version, long_about = None,
    about = "Validate the supplied attestation token (OIDC or PKI) and print \
    its claims")]
struct ValidateArgs {
    /// File holding the token; reads stdin when omitted or "-"
    #[arg(short = 'f', long)]
    token: Option<PathBuf>,

    #[arg(short, long, env = "VTPM_ISSUER", default_value = DEFAULT_ISSUER)]
    issuer: String,

    /// SHA-1 fingerprint of the trusted root, colon-separated hex
    #[arg(long, default_value = validation::CONFIDENTIAL_SPACE_ROOT_FINGERPRINT)]
    root_fingerprint: String,
}

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(io::stderr)
        .init();

    match VtpmTokenCli::parse() {
        VtpmTokenCli::Token(args) => match token(&args) {
            Ok(t) => {
                println!("{t}");
                eprintln!("token request successful");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("token request failed: {e}");
                ExitCode::FAILURE
            }
        },

        VtpmTokenCli::Validate(args) => match validate(&args) {
            Ok(claims) => {
                println!("{claims}");
                eprintln!("validation successful");
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("validation failed: {e}");
                ExitCode::FAILURE
            }
        },
    }
}

fn token(args: &TokenArgs) -> Result<String, Box<dyn Error>> {
    let client = if args.simulate {
        AttestationClient::simulated(&args.simulated_token)
    } else {
        AttestationClient::new().with_socket_path(&args.socket)
    };

    let t = client.get_token(&args.nonces, &args.audience, args.token_type)?;

    Ok(t)
}

fn validate(args: &ValidateArgs) -> Result<String, Box<dyn Error>> {
    let token = match &args.token {
        Some(p) if p.as_os_str() != "-" => fs::read_to_string(p)?,
        _ => {
            let mut s = String::new();
            io::stdin().read_to_string(&mut s)?;
            s
        }
    };

    let v = Validator::new()
        .with_issuer(&args.issuer)
        .with_trust_anchor(TrustAnchor::new(&args.root_fingerprint));

    let claims = v.validate_token(token.trim())?;

    let j = serde_json::to_string_pretty(&claims)?;

    Ok(j)
}
