//! Command line arguments.

use std::path::PathBuf;

use draftline_core::ComposeType;
use structopt::StructOpt;

#[derive(Debug, StructOpt)]
#[structopt(name = "draftline", about = "draft lifecycle decisions for mail clients")]
pub struct Opt {
    /// use specified configuration file
    #[structopt(short, long, parse(from_os_str))]
    pub config: Option<PathBuf>,

    #[structopt(subcommand)]
    pub subcommand: SubCommand,
}

#[derive(Debug, StructOpt)]
pub enum SubCommand {
    /// print location of the configuration file that is loaded by default.
    PrintConfigPath,
    /// load the configuration, report problems, and summarize it.
    #[structopt(display_order = 1)]
    CheckConfig,
    /// walk one draft through a dry-run compose and print every decision.
    #[structopt(display_order = 2)]
    Explain(ExplainOpt),
}

#[derive(Debug, StructOpt)]
pub struct ExplainOpt {
    /// kind of draft: new, reply, forward, edit or resend.
    #[structopt(short, long, default_value = "new")]
    pub kind: ComposeType,

    /// JSON file describing the original message.
    #[structopt(short, long, value_name = "MESSAGE_JSON", parse(from_os_str))]
    pub original: Option<PathBuf>,

    /// name of the context active in the invoking view.
    #[structopt(long, value_name = "CONTEXT")]
    pub active: Option<String>,

    /// context to pick when asked; without it a prompt aborts the compose.
    #[structopt(long, value_name = "CONTEXT")]
    pub choose: Option<String>,

    /// header to set on the draft before sending, as `Name: value`.
    #[structopt(short = "H", long = "header", value_name = "HEADER", parse(try_from_str = parse_header))]
    pub headers: Vec<(String, String)>,

    /// file to attach.
    #[structopt(long = "include", value_name = "FILE", parse(from_os_str))]
    pub includes: Vec<PathBuf>,
}

fn parse_header(input: &str) -> Result<(String, String), String> {
    let (name, value) = input
        .split_once(':')
        .ok_or_else(|| format!("expected `Name: value`, got '{input}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing header name in '{input}'"));
    }
    Ok((name.to_string(), value.trim().to_string()))
}
