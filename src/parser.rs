use std::ops::RangeInclusive;
use std::path::PathBuf;

use nom::{
    bytes::complete::take_till1,
    character::complete::{char, digit1, multispace0},
    combinator::{all_consuming, map_res, opt, recognize},
    multi::many0,
    sequence::{pair, preceded, terminated},
    IResult,
};

use crate::error::{FleetError, Result};

/// Every command the interpreter knows, independent of its arguments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandKind {
    Help,
    Info,
    Show,
    Add,
    Update,
    RemoveById,
    Clear,
    Save,
    ExecuteScript,
    Exit,
    AddIfMax,
    AddIfMin,
    RemoveLower,
    GroupCountingByEnginePower,
    FilterByNumberOfWheels,
    PrintFieldAscendingNumberOfWheels,
}

impl CommandKind {
    pub const ALL: &'static [CommandKind] = &[
        CommandKind::Help,
        CommandKind::Info,
        CommandKind::Show,
        CommandKind::Add,
        CommandKind::Update,
        CommandKind::RemoveById,
        CommandKind::Clear,
        CommandKind::Save,
        CommandKind::ExecuteScript,
        CommandKind::Exit,
        CommandKind::AddIfMax,
        CommandKind::AddIfMin,
        CommandKind::RemoveLower,
        CommandKind::GroupCountingByEnginePower,
        CommandKind::FilterByNumberOfWheels,
        CommandKind::PrintFieldAscendingNumberOfWheels,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            CommandKind::Help => "help",
            CommandKind::Info => "info",
            CommandKind::Show => "show",
            CommandKind::Add => "add",
            CommandKind::Update => "update",
            CommandKind::RemoveById => "remove_by_id",
            CommandKind::Clear => "clear",
            CommandKind::Save => "save",
            CommandKind::ExecuteScript => "execute_script",
            CommandKind::Exit => "exit",
            CommandKind::AddIfMax => "add_if_max",
            CommandKind::AddIfMin => "add_if_min",
            CommandKind::RemoveLower => "remove_lower",
            CommandKind::GroupCountingByEnginePower => "group_counting_by_engine_power",
            CommandKind::FilterByNumberOfWheels => "filter_by_number_of_wheels",
            CommandKind::PrintFieldAscendingNumberOfWheels => "print_field_ascending_number_of_wheels",
        }
    }

    /// Argument placeholders shown by `help`.
    pub fn usage(&self) -> &'static str {
        match self {
            CommandKind::Update => "<id> {vehicle}",
            CommandKind::RemoveById => "<id>",
            CommandKind::Save => "[path]",
            CommandKind::ExecuteScript => "<path>",
            CommandKind::FilterByNumberOfWheels => "<wheels>",
            CommandKind::Add | CommandKind::AddIfMax | CommandKind::AddIfMin | CommandKind::RemoveLower => {
                "{vehicle}"
            }
            _ => "",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CommandKind::Help => "list the available commands",
            CommandKind::Info => "show collection type, initialization date and size",
            CommandKind::Show => "print every vehicle in order",
            CommandKind::Add => "add a new vehicle",
            CommandKind::Update => "replace the fields of the vehicle with the given id",
            CommandKind::RemoveById => "remove the vehicle with the given id",
            CommandKind::Clear => "remove every vehicle",
            CommandKind::Save => "write the fleet to the data file (or to path)",
            CommandKind::ExecuteScript => "run the commands in a script file",
            CommandKind::Exit => "leave without saving",
            CommandKind::AddIfMax => "add a vehicle if its engine power beats the current maximum",
            CommandKind::AddIfMin => "add a vehicle if its engine power is below the current minimum",
            CommandKind::RemoveLower => "remove every vehicle with less engine power than the given one",
            CommandKind::GroupCountingByEnginePower => "count vehicles per engine power",
            CommandKind::FilterByNumberOfWheels => "print vehicles with exactly that many wheels",
            CommandKind::PrintFieldAscendingNumberOfWheels => "print every wheel count in ascending order",
        }
    }

    fn arity(&self) -> RangeInclusive<usize> {
        match self {
            CommandKind::Update
            | CommandKind::RemoveById
            | CommandKind::ExecuteScript
            | CommandKind::FilterByNumberOfWheels => 1..=1,
            CommandKind::Save => 0..=1,
            _ => 0..=0,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        CommandKind::ALL
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Help,
    Info,
    Show,
    Add,
    Update { id: i64 },
    RemoveById { id: i64 },
    Clear,
    Save { path: Option<PathBuf> },
    ExecuteScript { path: PathBuf },
    Exit,
    AddIfMax,
    AddIfMin,
    RemoveLower,
    GroupCountingByEnginePower,
    FilterByNumberOfWheels { wheels: i32 },
    PrintFieldAscendingNumberOfWheels,
}

impl Command {
    pub fn kind(&self) -> CommandKind {
        match self {
            Command::Help => CommandKind::Help,
            Command::Info => CommandKind::Info,
            Command::Show => CommandKind::Show,
            Command::Add => CommandKind::Add,
            Command::Update { .. } => CommandKind::Update,
            Command::RemoveById { .. } => CommandKind::RemoveById,
            Command::Clear => CommandKind::Clear,
            Command::Save { .. } => CommandKind::Save,
            Command::ExecuteScript { .. } => CommandKind::ExecuteScript,
            Command::Exit => CommandKind::Exit,
            Command::AddIfMax => CommandKind::AddIfMax,
            Command::AddIfMin => CommandKind::AddIfMin,
            Command::RemoveLower => CommandKind::RemoveLower,
            Command::GroupCountingByEnginePower => CommandKind::GroupCountingByEnginePower,
            Command::FilterByNumberOfWheels { .. } => CommandKind::FilterByNumberOfWheels,
            Command::PrintFieldAscendingNumberOfWheels => CommandKind::PrintFieldAscendingNumberOfWheels,
        }
    }
}

// --- BASIC PARSERS ---

fn token(input: &str) -> IResult<&str, &str> {
    preceded(multispace0, take_till1(|c: char| c.is_whitespace()))(input)
}

fn tokens(input: &str) -> IResult<&str, Vec<&str>> {
    all_consuming(terminated(many0(token), multispace0))(input)
}

fn integer<T: std::str::FromStr>(input: &str) -> IResult<&str, T> {
    map_res(recognize(pair(opt(char('-')), digit1)), |s: &str| s.parse::<T>())(input)
}

fn numeric_arg<T: std::str::FromStr>(kind: CommandKind, what: &str, raw: &str) -> Result<T> {
    all_consuming(integer::<T>)(raw)
        .map(|(_, value)| value)
        .map_err(|_| FleetError::Usage {
            command: kind.name(),
            reason: format!("'{}' is not a valid {}", raw, what),
        })
}

/// Splits a line into its command word and arguments, checks the argument
/// count for that command and converts the arguments. Returns `Ok(None)`
/// for blank lines.
pub fn parse_command(input: &str) -> Result<Option<Command>> {
    let words = match tokens(input) {
        Ok((_, words)) => words,
        Err(_) => return Err(FleetError::Parse(format!("cannot tokenize '{}'", input.trim()))),
    };
    let Some((head, args)) = words.split_first() else {
        return Ok(None);
    };

    let kind = CommandKind::from_name(head).ok_or_else(|| FleetError::UnknownCommand(head.to_string()))?;
    let arity = kind.arity();
    if !arity.contains(&args.len()) {
        let expected = if arity.start() == arity.end() {
            format!("{}", arity.start())
        } else {
            format!("{} to {}", arity.start(), arity.end())
        };
        return Err(FleetError::Usage {
            command: kind.name(),
            reason: format!("expects {} argument(s), got {}", expected, args.len()),
        });
    }

    let command = match kind {
        CommandKind::Help => Command::Help,
        CommandKind::Info => Command::Info,
        CommandKind::Show => Command::Show,
        CommandKind::Add => Command::Add,
        CommandKind::Update => Command::Update { id: numeric_arg(kind, "id", args[0])? },
        CommandKind::RemoveById => Command::RemoveById { id: numeric_arg(kind, "id", args[0])? },
        CommandKind::Clear => Command::Clear,
        CommandKind::Save => Command::Save { path: args.first().map(|p| PathBuf::from(*p)) },
        CommandKind::ExecuteScript => Command::ExecuteScript { path: PathBuf::from(args[0]) },
        CommandKind::Exit => Command::Exit,
        CommandKind::AddIfMax => Command::AddIfMax,
        CommandKind::AddIfMin => Command::AddIfMin,
        CommandKind::RemoveLower => Command::RemoveLower,
        CommandKind::GroupCountingByEnginePower => Command::GroupCountingByEnginePower,
        CommandKind::FilterByNumberOfWheels => Command::FilterByNumberOfWheels {
            wheels: numeric_arg(kind, "wheel count", args[0])?,
        },
        CommandKind::PrintFieldAscendingNumberOfWheels => Command::PrintFieldAscendingNumberOfWheels,
    };
    Ok(Some(command))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Command {
        parse_command(line).unwrap().unwrap()
    }

    #[test]
    fn plain_commands() {
        assert_eq!(parse("show"), Command::Show);
        assert_eq!(parse("  info  "), Command::Info);
        assert_eq!(parse("EXIT"), Command::Exit);
        assert_eq!(parse("group_counting_by_engine_power"), Command::GroupCountingByEnginePower);
    }

    #[test]
    fn commands_with_arguments() {
        assert_eq!(parse("update 12"), Command::Update { id: 12 });
        assert_eq!(parse("remove_by_id\t-3"), Command::RemoveById { id: -3 });
        assert_eq!(parse("filter_by_number_of_wheels 4"), Command::FilterByNumberOfWheels { wheels: 4 });
        assert_eq!(
            parse("execute_script scripts/fill.txt"),
            Command::ExecuteScript { path: PathBuf::from("scripts/fill.txt") }
        );
        assert_eq!(parse("save"), Command::Save { path: None });
        assert_eq!(parse("save out.csv"), Command::Save { path: Some(PathBuf::from("out.csv")) });
    }

    #[test]
    fn blank_lines_are_not_commands() {
        assert_eq!(parse_command("").unwrap(), None);
        assert_eq!(parse_command("   \t ").unwrap(), None);
    }

    #[test]
    fn unknown_command() {
        assert!(matches!(parse_command("fly away"), Err(FleetError::UnknownCommand(name)) if name == "fly"));
    }

    #[test]
    fn arity_is_checked_before_conversion() {
        assert!(matches!(
            parse_command("remove_by_id"),
            Err(FleetError::Usage { command: "remove_by_id", .. })
        ));
        assert!(matches!(parse_command("show everything"), Err(FleetError::Usage { command: "show", .. })));
        assert!(matches!(parse_command("update 1 2"), Err(FleetError::Usage { command: "update", .. })));
    }

    #[test]
    fn malformed_numbers() {
        assert!(matches!(parse_command("update one"), Err(FleetError::Usage { command: "update", .. })));
        assert!(matches!(
            parse_command("filter_by_number_of_wheels 4x"),
            Err(FleetError::Usage { .. })
        ));
        assert!(parse_command("remove_by_id 99999999999999999999").is_err());
    }

    #[test]
    fn every_kind_round_trips_by_name() {
        for kind in CommandKind::ALL {
            assert_eq!(CommandKind::from_name(kind.name()), Some(*kind));
        }
    }
}
