use crate::{
    CliResult,
    bootstrap::{DEFAULT_STORE, STORE_VAR},
};
use clap::{Parser, Subcommand};
use std::{
    convert::Infallible,
    path::{Path, PathBuf},
    str::FromStr,
};
use tripsplit_domain::{Money, ParticipantId, Roster};

#[derive(Debug, Parser)]
#[command(name = "tripsplit", about = "Split shared trip expenses and settle up")]
#[command(version, arg_required_else_help = true)]
#[command(after_help = "Members are given by name or by id as `#<id>`.")]
pub struct Cli {
    /// JSON file holding the trip state
    #[arg(long, global = true, env = STORE_VAR, default_value = DEFAULT_STORE)]
    pub store: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Manage participants of the current trip
    Member {
        #[command(subcommand)]
        command: MemberCommand,
    },
    /// List participants
    Members,
    /// Record expenses
    Expense {
        #[command(subcommand)]
        command: ExpenseCommand,
    },
    /// List expenses
    Expenses,
    /// Show net balances
    Balances,
    /// Show balances and who pays whom
    Settle,
    /// Save the settlement tables as an image
    Export {
        /// Target file, `.svg` or `.png`
        #[arg(value_parser = parse_export_target)]
        target: ExportTarget,
    },
    /// Archive the current trip and start a new one
    Save {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
    /// List archived trips
    Trips,
    /// Clear the current trip
    Reset,
    /// Toggle between light and dark
    Theme,
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum MemberCommand {
    /// Add a participant to the current trip
    Add {
        #[arg(required = true, num_args = 1..)]
        name: Vec<String>,
    },
}

#[derive(Clone, Debug, PartialEq, Eq, Subcommand)]
pub enum ExpenseCommand {
    /// Record an expense; no shares means an equal split
    Add {
        payer: MemberRef,
        #[arg(value_parser = parse_amount)]
        amount: Money,
        /// `<member>=<share>` entries
        #[arg(value_parser = parse_share)]
        shares: Vec<Share>,
    },
}

/// A participant as typed on the command line.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MemberRef {
    Id(ParticipantId),
    Name(String),
}

impl FromStr for MemberRef {
    type Err = Infallible;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let raw = raw.trim();
        Ok(match raw.strip_prefix('#').and_then(|id| id.parse().ok()) {
            Some(id) => Self::Id(ParticipantId(id)),
            None => Self::Name(raw.to_owned()),
        })
    }
}

impl MemberRef {
    pub fn resolve(&self, roster: &Roster) -> CliResult<ParticipantId> {
        match self {
            Self::Id(id) if roster.contains(*id) => Ok(*id),
            Self::Id(id) => Err(format!("No participant with id {id}").into()),
            Self::Name(name) => {
                let mut matches = roster.find_by_name(name);
                match (matches.next(), matches.next()) {
                    (Some(participant), None) => Ok(participant.id()),
                    (None, _) => Err(format!("No participant named '{name}'").into()),
                    (Some(_), Some(_)) => Err(format!(
                        "More than one participant is named '{name}'; use #<id> instead"
                    )
                    .into()),
                }
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Share {
    pub member: MemberRef,
    pub amount: Money,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExportFormat {
    Svg,
    Png,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExportTarget {
    pub path: PathBuf,
    pub format: ExportFormat,
}

fn parse_amount(raw: &str) -> Result<Money, String> {
    Money::from_str(raw).map_err(|_| format!("invalid amount '{raw}'"))
}

fn parse_share(raw: &str) -> Result<Share, String> {
    let Some((member, amount)) = raw.rsplit_once('=') else {
        return Err(format!("invalid share '{raw}': expected <member>=<amount>"));
    };
    if member.trim().is_empty() {
        return Err(format!("invalid share '{raw}': missing member"));
    }
    let Ok(member) = member.parse::<MemberRef>();
    Ok(Share {
        member,
        amount: parse_amount(amount)?,
    })
}

fn parse_export_target(raw: &str) -> Result<ExportTarget, String> {
    let path = Path::new(raw);
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let format = match extension.as_deref() {
        Some("svg") => ExportFormat::Svg,
        Some("png") => ExportFormat::Png,
        _ => return Err(format!("cannot export to '{raw}': expected a .svg or .png file")),
    };
    Ok(ExportTarget {
        path: path.to_path_buf(),
        format,
    })
}
