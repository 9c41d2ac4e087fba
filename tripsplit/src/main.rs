#![warn(clippy::uninlined_format_args)]

mod bootstrap;
mod command;

use bootstrap::{AppBuilder, AppConfig, init_logging, parse_cli};
use command::{Cli, Command, ExpenseCommand, ExportFormat, ExportTarget, MemberCommand, Share};
use std::{borrow::Cow, fs, process};
use tripsplit_application::{TripRepository, TripService};
use tripsplit_domain::{Allocations, SplitPolicy};
use tripsplit_infrastructure::svg_to_png;
use tripsplit_presentation::{SettlementPresenter, format_amount};

type CliResult<T> = Result<T, Cow<'static, str>>;

fn main() {
    let cli = parse_cli();
    if let Err(err) = run(cli) {
        eprintln!("Error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    init_logging();

    let config = AppConfig::from(&cli);
    let mut service = AppBuilder::build(&config).map_err(|err| {
        format!(
            "Failed to open trip store '{}': {err}",
            config.store_path.display()
        )
    })?;

    execute(&mut service, cli.command)
}

fn execute<R: TripRepository>(service: &mut TripService<R>, command: Command) -> CliResult<()> {
    match command {
        Command::Member {
            command: MemberCommand::Add { name },
        } => {
            let participant = service
                .add_member(&name.join(" "))
                .map_err(|err| err.to_string())?;
            println!("Added {} {}", participant.id(), participant.name());
        }
        Command::Members => print_members(service),
        Command::Expense {
            command:
                ExpenseCommand::Add {
                    payer,
                    amount,
                    shares,
                },
        } => {
            let payer = payer.resolve(service.roster())?;
            let split = resolve_split(service, shares)?;
            let expense = service
                .add_expense(payer, amount, split)
                .map_err(|err| err.to_string())?;
            println!(
                "Recorded expense {} of {}",
                expense.id(),
                format_amount(expense.amount())
            );
        }
        Command::Expenses => print_expenses(service),
        Command::Balances => {
            let result = service.settle().map_err(|err| err.to_string())?;
            print!("{}", SettlementPresenter::render_balances_text(&result.balances));
        }
        Command::Settle => {
            let result = service.settle().map_err(|err| err.to_string())?;
            print!("{}", SettlementPresenter::render_text(&result));
        }
        Command::Export { target } => export(service, &target)?,
        Command::Save { name } => {
            let archived = service
                .save_current_trip(&name.join(" "))
                .map_err(|err| err.to_string())?;
            println!(
                "Saved trip {} as '{}'; started trip {}",
                archived.id,
                archived.name,
                service.current_trip().id
            );
        }
        Command::Trips => print_trips(service),
        Command::Reset => {
            service.reset_trip().map_err(|err| err.to_string())?;
            println!("Current trip cleared");
        }
        Command::Theme => {
            let theme = service.toggle_theme().map_err(|err| err.to_string())?;
            println!("Theme: {theme}");
        }
    }

    Ok(())
}

fn resolve_split<R: TripRepository>(
    service: &TripService<R>,
    shares: Vec<Share>,
) -> CliResult<SplitPolicy> {
    if shares.is_empty() {
        return Ok(SplitPolicy::Equal);
    }

    let mut allocations = Allocations::new();
    for Share { member, amount } in shares {
        let id = member.resolve(service.roster())?;
        if allocations.insert(id, amount).is_some() {
            return Err(format!("Participant {id} has more than one share").into());
        }
    }
    Ok(SplitPolicy::Custom(allocations))
}

fn export<R: TripRepository>(service: &TripService<R>, target: &ExportTarget) -> CliResult<()> {
    let ExportTarget { path, format } = target;
    let result = service.settle().map_err(|err| err.to_string())?;
    let document = SettlementPresenter::render_document(&result, service.theme())
        .ok_or("Failed to render settlement tables")?;

    let bytes = match format {
        ExportFormat::Svg => document.into_bytes(),
        ExportFormat::Png => svg_to_png(&document)
            .map_err(|err| format!("Failed to rasterize settlement tables: {err}"))?,
    };

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .map_err(|err| format!("Failed to create '{}': {err}", parent.display()))?;
    }
    fs::write(path, bytes)
        .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;

    tracing::info!(path = %path.display(), ?format, "Settlement exported");
    println!("Exported settlement to {}", path.display());
    Ok(())
}

fn print_members<R: TripRepository>(service: &TripService<R>) {
    if service.participants().is_empty() {
        println!("No participants yet");
        return;
    }
    for participant in service.participants() {
        println!("{} {}", participant.id(), participant.name());
    }
}

fn print_expenses<R: TripRepository>(service: &TripService<R>) {
    if service.expenses().is_empty() {
        println!("No expenses yet");
        return;
    }

    let roster = service.roster();
    let name_of = |id| roster.get(id).map_or("?", |participant| participant.name());
    for expense in service.expenses() {
        let shares = expense
            .allocations()
            .iter()
            .map(|(member, share)| format!("{} {}", name_of(member), format_amount(share)))
            .collect::<Vec<_>>()
            .join(", ");
        println!(
            "{} {} paid {} ({shares})",
            expense.id(),
            name_of(expense.payer()),
            format_amount(expense.amount())
        );
    }
}

fn print_trips<R: TripRepository>(service: &TripService<R>) {
    if service.archived_trips().is_empty() {
        println!("No saved trips");
        return;
    }
    for trip in service.archived_trips() {
        println!(
            "{} {} (saved {}, {} participants, {} expenses)",
            trip.id,
            trip.name,
            trip.saved_at.format("%Y-%m-%d %H:%M"),
            trip.participants.len(),
            trip.expenses.len()
        );
    }
}
