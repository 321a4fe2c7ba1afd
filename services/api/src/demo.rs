use crate::infra::{local_store, parse_date, seed_records};
use chrono::{Datelike, Local, NaiveDate};
use clap::Args;
use std::path::PathBuf;
use std::sync::Arc;

use lealtad::config::AppConfig;
use lealtad::error::AppError;
use lealtad::registry::{
    rebuttal_term, HolidayCalendar, LocalStore, RecordService, RecordStore, ReportRange,
    SheetsStore,
};

#[derive(Args, Debug)]
pub(crate) struct ReportArgs {
    /// Range start (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) from: NaiveDate,
    /// Range end, inclusive (YYYY-MM-DD)
    #[arg(long, value_parser = parse_date)]
    pub(crate) to: NaiveDate,
    /// Override the emission date printed on the document (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
    /// Emit the printable HTML document instead of the JSON summary
    #[arg(long)]
    pub(crate) html: bool,
}

#[derive(Args, Debug, Default)]
pub(crate) struct DemoArgs {
    /// Data directory for the demo store (defaults to the configured one)
    #[arg(long)]
    pub(crate) data_dir: Option<PathBuf>,
    /// Override the evaluation date (defaults to today)
    #[arg(long, value_parser = parse_date)]
    pub(crate) today: Option<NaiveDate>,
}

pub(crate) async fn run_report(args: ReportArgs) -> Result<(), AppError> {
    let config = AppConfig::load()?;
    match config.store.sheets_url.clone() {
        Some(url) => {
            let service =
                RecordService::new(Arc::new(SheetsStore::new(url)), HolidayCalendar::argentine());
            print_report(&service, args).await
        }
        None => {
            let store = local_store(&config.store)?;
            let service = RecordService::new(store, HolidayCalendar::argentine());
            print_report(&service, args).await
        }
    }
}

async fn print_report<S>(service: &RecordService<S>, args: ReportArgs) -> Result<(), AppError>
where
    S: RecordStore + 'static,
{
    service.refresh().await.map_err(AppError::from)?;
    let report = service.management_report(ReportRange {
        from: args.from,
        to: args.to,
    });

    if args.html {
        let issued = args.today.unwrap_or_else(|| Local::now().date_naive());
        println!("{}", report.render_html(issued));
        return Ok(());
    }

    match serde_json::to_string_pretty(&report) {
        Ok(json) => println!("{json}"),
        Err(err) => println!("report unavailable: {err}"),
    }
    Ok(())
}

pub(crate) async fn run_demo(args: DemoArgs) -> Result<(), AppError> {
    let DemoArgs { data_dir, today } = args;

    let config = AppConfig::load()?;
    let data_dir = data_dir.unwrap_or(config.store.data_dir);
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let store = LocalStore::new(&data_dir)
        .map_err(lealtad::registry::ServiceError::from)
        .map_err(AppError::from)?;
    let service = RecordService::new(Arc::new(store), HolidayCalendar::argentine());

    println!("Record registry demo");
    println!("Data directory: {}", data_dir.display());

    let seeded = seed_records(&service, today)
        .await
        .map_err(AppError::from)?;
    if seeded {
        println!("Seeded sample records into an empty store");
    } else {
        println!("Using existing records");
    }
    service.refresh().await.map_err(AppError::from)?;

    let calendar = service.calendar();
    let standard = rebuttal_term(today, false, calendar);
    let short = rebuttal_term(today, true, calendar);
    println!("\nRebuttal deadlines from {today}");
    println!(
        "- standard statute: {} business days, due {}",
        standard.business_days, standard.due_date
    );
    println!(
        "- short statute (art. 5): {} business days, due {}",
        short.business_days, short.due_date
    );

    let stats = service.dashboard(today);
    println!("\nDashboard");
    println!("- notifications: {}", stats.total_notifications);
    println!("- infraction acts: {}", stats.total_infractions);
    println!(
        "- inspections: {} ({} ex officio)",
        stats.total_inspections, stats.ex_officio_inspections
    );
    for entry in &stats.notifications_by_kind {
        println!("  - {}: {}", entry.kind_label, entry.count);
    }

    if stats.law_ranking.is_empty() {
        println!("\nLaw ranking: no infraction acts yet");
    } else {
        println!("\nLaw ranking");
        for entry in &stats.law_ranking {
            println!("- {} ({})", entry.label, entry.count);
        }
    }

    if stats.upcoming_hearings.is_empty() {
        println!("\nHearing alerts: none");
    } else {
        println!("\nHearing alerts");
        for alert in &stats.upcoming_hearings {
            let status = if alert.overdue {
                "overdue".to_string()
            } else {
                format!("in {} day(s)", alert.days_until)
            };
            println!(
                "- {} | {} | hearing {} ({})",
                alert.reference, alert.company, alert.hearing_date, status
            );
        }
    }

    let month_start = today.with_day(1).unwrap_or(today);
    let report = service.management_report(ReportRange {
        from: month_start,
        to: today,
    });
    println!("\nMonth-to-date report ({month_start} -> {today})");
    println!(
        "- notifications {} | infraction acts {} | inspections {}",
        report.total_notifications, report.total_infractions, report.total_inspections
    );
    println!(
        "- audiences {} | imputations {} | ex officio {}",
        report.audience_notifications, report.imputation_notifications,
        report.ex_officio_inspections
    );
    println!(
        "- expired products {} | daily averages {:.1} / {:.1}",
        report.expired_products, report.daily_notification_average,
        report.daily_infraction_average
    );

    Ok(())
}
