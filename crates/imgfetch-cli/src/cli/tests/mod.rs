//! CLI parse and override tests.

use super::{Cli, CliCommand, GetArgs};
use clap::Parser;

pub(super) fn parse(args: &[&str]) -> Cli {
    Cli::try_parse_from(args).unwrap()
}

pub(super) fn parse_get(args: &[&str]) -> GetArgs {
    match parse(args).command {
        CliCommand::Get(get) => get,
        other => panic!("expected Get, got {:?}", other),
    }
}
