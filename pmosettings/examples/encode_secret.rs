//! Encode ou décode à la main les mots de passe LDAP/SMTP de
//! `pmomusic.properties`. Lancer sans argument pour l'aide.

use anyhow::{bail, Context, Result};
use pmosettings::{
    schema::{Codec, SCHEMA},
    secret::{decode_secret, encode_secret, read_secret},
};

const USAGE: &str = "usage: encode_secret encode <secret> | decode <hex> | check

The hex form only keeps secrets out of casual sight. It is not encryption.";

enum Command {
    Encode(String),
    Decode(String),
    Check,
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Command> {
    let command = args.next().context("missing command")?;
    match command.as_str() {
        "encode" => Ok(Command::Encode(args.next().context("missing secret")?)),
        "decode" => Ok(Command::Decode(args.next().context("missing hex value")?)),
        "check" => Ok(Command::Check),
        other => bail!("unknown command '{}'", other),
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let command = match parse_args(std::env::args().skip(1)) {
        Ok(command) => command,
        Err(e) => {
            eprintln!("{}\n\n{}", e, USAGE);
            std::process::exit(2);
        }
    };

    match command {
        Command::Encode(secret) => {
            let encoded = encode_secret(&secret);
            // Une ligne prête à coller pour chaque clé protégée
            for def in SCHEMA.iter().filter(|def| def.codec == Codec::Hex) {
                println!("{}={}", def.key, encoded);
            }
        }
        Command::Decode(hex) => {
            let secret = decode_secret(&hex).with_context(|| format!("cannot decode '{}'", hex))?;
            println!("{}", secret);
        }
        Command::Check => check()?,
    }
    Ok(())
}

/// Vérifie l'aller-retour sur quelques valeurs, et le repli sur la valeur brute
fn check() -> Result<()> {
    for secret in ["simple", "Complex_P@ssw0rd!", "mot de passe accentué: é à ç", ""] {
        let encoded = encode_secret(secret);
        let decoded = decode_secret(&encoded)?;
        if decoded != secret {
            bail!("round trip failed for {:?}: got {:?}", secret, decoded);
        }
        println!("ok  {:?} -> {}", secret, encoded);
    }

    let raw = read_secret("SmtpPassword", "not-hex");
    if raw != "not-hex" {
        bail!("hand-edited value was not kept: {:?}", raw);
    }
    println!("ok  hand-edited value kept as is");
    Ok(())
}
