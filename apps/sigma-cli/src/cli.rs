//! 命令行参数定义（clap derive）。

use chrono::{NaiveDate, NaiveTime};
use clap::{Args, Parser, Subcommand, ValueEnum};
use domain::{EntryType, Sector, TicketStatus, UnitType, UnknownCode};
use sigma_legacy_import::ImportStream;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[command(name = "sigma", version, about = "SIGMA rolling-stock maintenance tools")]
pub struct Cli {
    /// 以 JSON 输出结果
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Import legacy Access exports
    Import(ImportArgs),
    /// Load the initial reference catalog, personnel and units
    Seed(SeedArgs),
    /// Rolling-stock registry operations
    #[command(subcommand)]
    Unit(UnitCommand),
    /// Maintenance ticket operations
    #[command(subcommand)]
    Ticket(TicketCommand),
}

#[derive(Args, Debug, Default)]
pub struct ImportArgs {
    #[arg(long, help = "Import locations (Lugares.txt)")]
    pub lugares: bool,
    #[arg(long, help = "Import intervention types (Intervenciones.txt)")]
    pub intervenciones: bool,
    #[arg(long, help = "Import railcar intervention types (IntervencionesCCRR.txt)")]
    pub intervenciones_ccrr: bool,
    #[arg(long, help = "Import locomotives (Locomotoras.txt)")]
    pub locomotoras: bool,
    #[arg(long, help = "Import railcars (Coches.txt)")]
    pub coches: bool,
    #[arg(long, help = "Import locomotive events (Detenciones.txt)")]
    pub detenciones: bool,
    #[arg(long, help = "Import railcar events (DetencionesCCRR.txt)")]
    pub detenciones_ccrr: bool,
    #[arg(long, help = "lugares, intervenciones, locomotoras, coches, detenciones")]
    pub all: bool,
    #[arg(long, help = "intervenciones-ccrr, coches, detenciones-ccrr")]
    pub all_ccrr: bool,
    #[arg(long, help = "Directory holding the legacy export files")]
    pub path: Option<PathBuf>,
    #[arg(long, help = "Validate and count without writing")]
    pub dry_run: bool,
    #[arg(long, help = "Event insert batch size")]
    pub batch_size: Option<usize>,
}

impl ImportArgs {
    /// 选中的导入流，按执行顺序去重。
    pub fn selected_streams(&self) -> Vec<ImportStream> {
        let mut selected = Vec::new();
        if self.all {
            selected.extend(ImportStream::ALL);
        }
        if self.all_ccrr {
            selected.extend(ImportStream::ALL_CCRR);
        }
        let flags = [
            (self.lugares, ImportStream::Locations),
            (self.intervenciones, ImportStream::Interventions),
            (self.intervenciones_ccrr, ImportStream::RailcarInterventions),
            (self.locomotoras, ImportStream::Locomotives),
            (self.coches, ImportStream::Railcars),
            (self.detenciones, ImportStream::Events),
            (self.detenciones_ccrr, ImportStream::RailcarEvents),
        ];
        selected.extend(
            flags
                .into_iter()
                .filter(|(enabled, _)| *enabled)
                .map(|(_, stream)| stream),
        );
        ImportStream::ORDER
            .into_iter()
            .filter(|stream| selected.contains(stream))
            .collect()
    }
}

#[derive(Args, Debug)]
pub struct SeedArgs {
    #[arg(long, help = "Directory holding personal.csv and ums.csv")]
    pub path: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum UnitCommand {
    /// List units
    List {
        #[arg(long = "type", value_parser = parse_code::<UnitType>)]
        unit_type: Option<UnitType>,
        #[arg(long)]
        active_only: bool,
    },
    /// Show one unit by number
    Show { number: String },
    /// Register a new unit
    Register(RegisterUnitArgs),
    /// Mark a unit active
    Activate { number: String },
    /// Mark a unit inactive
    Deactivate { number: String },
    /// Delete a unit that no ticket or event references
    Delete { number: String },
}

#[derive(Args, Debug)]
pub struct RegisterUnitArgs {
    pub number: String,
    #[arg(long = "type", value_parser = parse_code::<UnitType>)]
    pub unit_type: UnitType,
    /// 品牌编码
    #[arg(long)]
    pub brand: String,
    /// 机车车型编码
    #[arg(long)]
    pub model: Option<String>,
    /// 车厢类别编码
    #[arg(long)]
    pub class: Option<String>,
    #[arg(long, default_value = "CM")]
    pub configuration: String,
    #[arg(long, default_value_t = 1)]
    pub car_count: u16,
}

#[derive(Subcommand, Debug)]
pub enum TicketCommand {
    /// List tickets
    List(TicketListArgs),
    /// Show one ticket by number
    Show { number: String },
    /// Ticket counts by status
    Counts,
    /// Create a pending ticket
    Create(TicketCreateArgs),
    /// Mark a pending ticket completed
    Complete { number: String },
    /// Update non-status fields
    Update(TicketUpdateArgs),
}

#[derive(Args, Debug, Default)]
pub struct TicketListArgs {
    #[arg(long, value_parser = parse_code::<TicketStatus>)]
    pub status: Option<TicketStatus>,
    #[arg(long, value_parser = parse_code::<EntryType>)]
    pub entry_type: Option<EntryType>,
    /// GOP 编码
    #[arg(long)]
    pub gop: Option<String>,
    #[arg(long = "unit-type", value_parser = parse_code::<UnitType>)]
    pub unit_type: Option<UnitType>,
    #[arg(long, value_parser = parse_date)]
    pub from: Option<NaiveDate>,
    #[arg(long, value_parser = parse_date)]
    pub to: Option<NaiveDate>,
}

#[derive(Args, Debug)]
pub struct TicketCreateArgs {
    /// 单元编号
    #[arg(long)]
    pub unit: String,
    /// GOP 编码
    #[arg(long)]
    pub gop: String,
    #[arg(long, value_parser = parse_code::<EntryType>)]
    pub entry_type: EntryType,
    #[arg(long)]
    pub description: String,
    /// 默认当天
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    /// 手工指定工单编号，否则按年份自动生成
    #[arg(long)]
    pub number: Option<String>,
    #[command(flatten)]
    pub details: TicketDetailsArgs,
}

#[derive(Args, Debug)]
pub struct TicketUpdateArgs {
    pub number: String,
    #[arg(long)]
    pub unit: Option<String>,
    #[arg(long)]
    pub gop: Option<String>,
    #[arg(long, value_parser = parse_code::<EntryType>)]
    pub entry_type: Option<EntryType>,
    #[arg(long)]
    pub description: Option<String>,
    #[arg(long, value_parser = parse_date)]
    pub date: Option<NaiveDate>,
    #[command(flatten)]
    pub details: TicketDetailsArgs,
    /// 清空可空字段，可重复
    #[arg(long, value_enum)]
    pub clear: Vec<TicketField>,
}

/// 工单上可清空的字段。
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TicketField {
    WorkOrder,
    Personnel,
    Train,
    FailureType,
    AffectedSystem,
    NotifiedAt,
    IntervenedAt,
    DeliveredAt,
    Observations,
}

/// 创建与更新共用的可选字段。
#[derive(Args, Debug, Default)]
pub struct TicketDetailsArgs {
    #[arg(long)]
    pub work_order: Option<String>,
    /// SAP 工号
    #[arg(long)]
    pub personnel: Option<String>,
    /// 工号所在部门；缺省时依次查找两个部门
    #[arg(long, value_parser = parse_code::<Sector>)]
    pub sector: Option<Sector>,
    /// 车次号
    #[arg(long)]
    pub train: Option<String>,
    #[arg(long)]
    pub failure_type: Option<String>,
    #[arg(long)]
    pub affected_system: Option<String>,
    #[arg(long, value_parser = parse_time)]
    pub notified_at: Option<NaiveTime>,
    #[arg(long, value_parser = parse_time)]
    pub intervened_at: Option<NaiveTime>,
    #[arg(long, value_parser = parse_time)]
    pub delivered_at: Option<NaiveTime>,
    #[arg(long)]
    pub observations: Option<String>,
}

fn parse_code<T>(value: &str) -> Result<T, String>
where
    T: FromStr<Err = UnknownCode>,
{
    value.parse().map_err(|err: UnknownCode| err.to_string())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got {value:?}"))
}

/// `HH:MM` 或 `HH:MM:SS`。
fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M:%S"))
        .map_err(|_| format!("expected HH:MM, got {value:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn import_args(args: &[&str]) -> ImportArgs {
        let argv = ["sigma", "import"].iter().chain(args.iter()).copied();
        match Cli::try_parse_from(argv).expect("parse").command {
            Command::Import(args) => args,
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn all_and_all_ccrr_merge_in_execution_order() {
        let args = import_args(&["--all-ccrr", "--all", "--dry-run"]);
        assert!(args.dry_run);
        assert_eq!(args.selected_streams(), ImportStream::ORDER.to_vec());
    }

    #[test]
    fn single_flags_keep_execution_order() {
        let args = import_args(&["--detenciones-ccrr", "--lugares", "--coches"]);
        assert_eq!(
            args.selected_streams(),
            vec![
                ImportStream::Locations,
                ImportStream::Railcars,
                ImportStream::RailcarEvents
            ]
        );
        assert!(import_args(&[]).selected_streams().is_empty());
    }

    #[test]
    fn ticket_list_filters_parse_codes() {
        let cli = Cli::try_parse_from([
            "sigma",
            "--json",
            "ticket",
            "list",
            "--status",
            "pendiente",
            "--unit-type",
            "coche_motor",
            "--from",
            "2024-01-31",
        ])
        .expect("parse");
        assert!(cli.json);
        let Command::Ticket(TicketCommand::List(args)) = cli.command else {
            panic!("expected ticket list");
        };
        assert_eq!(args.status, Some(TicketStatus::Pending));
        assert_eq!(args.unit_type, Some(UnitType::Motorcoach));
        assert_eq!(args.from, NaiveDate::from_ymd_opt(2024, 1, 31));

        let err = Cli::try_parse_from(["sigma", "ticket", "list", "--status", "abierto"]);
        assert!(err.is_err());
    }

    #[test]
    fn ticket_update_accepts_repeated_clear() {
        let cli = Cli::try_parse_from([
            "sigma",
            "ticket",
            "update",
            "2025-0003",
            "--clear",
            "work-order",
            "--clear",
            "personnel",
            "--observations",
            "Revisado",
        ])
        .expect("parse");
        let Command::Ticket(TicketCommand::Update(args)) = cli.command else {
            panic!("expected ticket update");
        };
        assert_eq!(args.number, "2025-0003");
        assert_eq!(args.clear, vec![TicketField::WorkOrder, TicketField::Personnel]);
        assert_eq!(args.details.observations.as_deref(), Some("Revisado"));
    }

    #[test]
    fn time_accepts_minutes_and_seconds() {
        assert_eq!(parse_time("08:30"), Ok(NaiveTime::from_hms_opt(8, 30, 0).expect("time")));
        assert_eq!(
            parse_time("08:30:15"),
            Ok(NaiveTime::from_hms_opt(8, 30, 15).expect("time"))
        );
        assert!(parse_time("8h30").is_err());
    }
}
