use crate::application::tui::TuiTab;
use crate::application::{RecordOutcome, WeightApp};
use crate::domain::ChartPeriod;
use anyhow::Context;
use chrono::{Local, NaiveDate};
use clap::{Parser, Subcommand};
use std::io::Read;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "weightlog")]
#[command(about = "A terminal body-weight tracker")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Record a weight, replacing any measurement already logged that day
    Add {
        /// Weight in kilograms
        weight: f64,
        /// Specific date (YYYY-MM-DD format, defaults to today)
        #[arg(short, long)]
        date: Option<String>,
        /// Free-text note attached to the entry
        #[arg(short, long)]
        note: Option<String>,
    },
    /// Edit the entry recorded on a day
    Edit {
        /// Date of the entry to edit (YYYY-MM-DD format)
        date: String,
        /// New weight in kilograms
        #[arg(long)]
        weight: Option<f64>,
        /// Move the entry to another day (YYYY-MM-DD format)
        #[arg(long)]
        move_to: Option<String>,
        /// Replace the note (an empty string removes it)
        #[arg(long)]
        note: Option<String>,
    },
    /// Delete the entry recorded on a day
    Delete {
        /// Date of the entry to delete (YYYY-MM-DD format)
        date: String,
    },
    /// Delete every entry
    Clear {
        /// Confirm deletion; this cannot be undone
        #[arg(long)]
        yes: bool,
    },
    /// Show all entries, newest first
    List,
    /// Bulk-import "yyyy/MM/dd weight" lines from a file or stdin
    Import {
        /// File to read (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Show the trend chart
    Chart {
        /// Window to chart: 1m, 1y or all
        #[arg(short, long, default_value = "1m")]
        period: ChartPeriod,
    },
    /// Start the interactive calendar browser
    Tui,
}

impl Cli {
    pub fn run() -> anyhow::Result<()> {
        let cli = Self::parse();
        let mut app = WeightApp::new()?;

        match cli.command {
            Some(Commands::Add { weight, date, note }) => {
                let date = parse_date_arg(date.as_deref())?;
                match app.record(weight, date, note)? {
                    RecordOutcome::Recorded => println!("Recorded {weight:.1} kg on {date}"),
                    RecordOutcome::Updated => println!("Updated {date} to {weight:.1} kg"),
                }
            }
            Some(Commands::Edit {
                date,
                weight,
                move_to,
                note,
            }) => {
                let date = parse_date(&date)?;
                let move_to = move_to.as_deref().map(parse_date).transpose()?;
                let edited = app.edit(date, weight, move_to, note)?;
                println!(
                    "Updated entry for {}: {}",
                    edited.date,
                    edited.formatted_weight()
                );
            }
            Some(Commands::Delete { date }) => {
                let date = parse_date(&date)?;
                if app.delete_day(date)? {
                    println!("Deleted entry for {date}");
                } else {
                    println!("No entry recorded on {date}");
                }
            }
            Some(Commands::Clear { yes }) => {
                if !yes {
                    anyhow::bail!("refusing to delete all entries without --yes");
                }
                app.clear()?;
                println!("All entries deleted");
            }
            Some(Commands::List) => {
                print_entries(&app);
            }
            Some(Commands::Import { file }) => {
                let text = match file {
                    Some(path) => std::fs::read_to_string(&path)
                        .with_context(|| format!("failed to read {}", path.display()))?,
                    None => {
                        let mut buf = String::new();
                        std::io::stdin().read_to_string(&mut buf)?;
                        buf
                    }
                };
                let summary = app.import_text(&text)?;
                println!(
                    "Imported {} entries, updated {}",
                    summary.imported, summary.updated
                );
            }
            Some(Commands::Chart { period }) => {
                app.run_tui(TuiTab::Chart, period)?;
            }
            Some(Commands::Tui) | None => {
                app.run_tui(TuiTab::Calendar, ChartPeriod::OneMonth)?;
            }
        }

        Ok(())
    }
}

fn parse_date(s: &str) -> anyhow::Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("'{s}' is not a YYYY-MM-DD date"))
}

fn parse_date_arg(arg: Option<&str>) -> anyhow::Result<NaiveDate> {
    match arg {
        Some(s) => parse_date(s),
        None => Ok(Local::now().date_naive()),
    }
}

fn print_entries(app: &WeightApp) {
    let entries = app.store.entries();
    if entries.is_empty() {
        println!("No entries recorded yet");
        return;
    }

    if let Some(latest) = app.store.latest_entry() {
        match app.store.weight_difference() {
            Some(diff) => println!(
                "Latest: {} ({diff:+.1} kg since previous)\n",
                latest.formatted_weight()
            ),
            None => println!("Latest: {}\n", latest.formatted_weight()),
        }
    }

    for entry in entries {
        match &entry.note {
            Some(note) => println!("{}  {:>8}  {note}", entry.date, entry.formatted_weight()),
            None => println!("{}  {:>8}", entry.date, entry.formatted_weight()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_date_accepts_iso_and_rejects_slashes() {
        assert_eq!(
            parse_date("2024-01-15").unwrap(),
            NaiveDate::from_ymd_opt(2024, 1, 15).unwrap()
        );
        assert!(parse_date("2024/01/15").is_err());
    }

    #[test]
    fn cli_declaration_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
