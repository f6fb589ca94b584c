use std::path::PathBuf;

use anyhow::{bail, Context};
use clap::{ArgGroup, Args, Parser, Subcommand};

mod bootstrap;
mod config;
mod error;
mod filter;
mod form;
mod import;
mod kv;
mod models;
mod report;
mod seed;
mod sort;
mod store;

use config::Config;
use error::StorageError;
use filter::StudentFilter;
use kv::{Backend, PgStore};
use models::{Course, NewStudent, StudentRecord};
use sort::{SortDirection, SortKey, StudentSort};
use store::RecordStore;

#[derive(Parser)]
#[command(name = "roster")]
#[command(about = "Student roster and announcements for the education portal", long_about = None)]
struct Cli {
    /// Directory for file-backed storage (overrides ROSTER_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Log at debug level unless ROSTER_LOG is set
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ViewArgs {
    /// Match against name or email, ignoring case
    #[arg(long)]
    search: Option<String>,
    #[arg(long)]
    course: Option<String>,
    #[arg(long)]
    min_grade: Option<i32>,
    #[arg(long)]
    max_grade: Option<i32>,
    #[arg(long, value_enum)]
    sort_by: Option<SortKey>,
    #[arg(long, value_enum, default_value_t = SortDirection::Asc)]
    direction: SortDirection,
}

impl ViewArgs {
    fn filter(&self) -> StudentFilter {
        StudentFilter {
            search: self.search.clone(),
            course: self.course.clone(),
            min_grade: self.min_grade,
            max_grade: self.max_grade,
        }
    }

    fn sort(&self) -> Option<StudentSort> {
        self.sort_by.map(|by| StudentSort::new(by, self.direction))
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the Postgres schema
    InitDb,
    /// Load the sample roster on first use
    Seed,
    /// List students through the filter and sort pipeline
    List {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Show one student in detail
    #[command(group(
        ArgGroup::new("lookup")
            .args(["id", "email"])
            .required(true)
            .multiple(false)
    ))]
    Show {
        #[arg(long)]
        id: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Add a student
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        course: Course,
        #[arg(long)]
        grade: i32,
        #[arg(long)]
        attendance: i32,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Replace a student's details; omitted fields keep their current values
    Update {
        id: String,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        email: Option<String>,
        #[arg(long)]
        course: Option<Course>,
        #[arg(long)]
        grade: Option<i32>,
        #[arg(long)]
        attendance: Option<i32>,
        #[arg(long)]
        photo: Option<String>,
    },
    /// Delete a student
    Delete { id: String },
    /// Import students from a CSV file
    Import {
        #[arg(long)]
        csv: PathBuf,
    },
    /// Generate a markdown report
    Report {
        #[command(flatten)]
        view: ViewArgs,
        #[arg(long, default_value = "roster-report.md")]
        out: PathBuf,
    },
    /// Post an announcement
    Announce {
        #[arg(long)]
        title: String,
        #[arg(long)]
        content: String,
    },
    /// List announcements, newest first
    Announcements {
        #[arg(long, default_value_t = 10)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose)?;

    let config = Config::from_env().with_data_dir(cli.data_dir);

    if let Commands::InitDb = cli.command {
        let database_url = config
            .database_url
            .as_deref()
            .context("DATABASE_URL must be set to initialize the Postgres schema")?;
        let pg = PgStore::connect(database_url)
            .await
            .context("failed to connect to Postgres")?;
        pg.migrate().await?;
        println!("Schema ready.");
        return Ok(());
    }

    let opened = Backend::from_config(&config).await;

    match cli.command {
        Commands::InitDb => {}
        Commands::Seed => {
            let backend = opened.context("failed to open storage")?;
            let backend_label = backend.describe();
            let mut store = RecordStore::new(backend);
            if bootstrap::ensure_seeded(&mut store).await? {
                println!("Sample data loaded into {backend_label}.");
            } else {
                println!("Storage already initialized; nothing to do.");
            }
        }
        Commands::List { view, limit } => {
            let filter_spec = view.filter();
            let sort_spec = view.sort();
            let opened = opened.map(RecordStore::new);
            let roster =
                bootstrap::view_or_sample(opened, &filter_spec, sort_spec.as_ref()).await?;
            if let Some(err) = &roster.fallback_reason {
                println!("Storage error: {err}. Showing the sample roster instead.");
            }
            let records = roster.records;

            if records.is_empty() {
                println!("No students match this view.");
                return Ok(());
            }

            for record in records.iter().take(limit.unwrap_or(usize::MAX)) {
                print_summary(record);
            }
        }
        Commands::Show { id, email } => {
            let store = open_seeded(opened).await?;
            let record = match (id.as_deref(), email.as_deref()) {
                (Some(id), _) => store.get_by_id(id).await?,
                (None, Some(email)) => store.get_by_email(email).await?,
                (None, None) => bail!("either --id or --email is required"),
            };
            match record {
                Some(record) => print_detail(&record),
                None => println!("No such student."),
            }
        }
        Commands::Add {
            name,
            email,
            course,
            grade,
            attendance,
            photo,
        } => {
            let mut store = open_seeded(opened).await?;
            let mut student = NewStudent::new(&name, &email, course, grade, attendance);
            student.photo = photo;
            form::validate(&student)?;
            let record = store.insert(student).await?;
            println!("Added {} with id {}.", record.name, record.id);
        }
        Commands::Update {
            id,
            name,
            email,
            course,
            grade,
            attendance,
            photo,
        } => {
            let mut store = open_seeded(opened).await?;
            let Some(mut record) = store.get_by_id(&id).await? else {
                println!("No such student.");
                return Ok(());
            };
            if let Some(name) = name {
                record.name = name;
            }
            if let Some(email) = email {
                record.email = email;
            }
            if let Some(course) = course {
                record.course = course;
            }
            if let Some(grade) = grade {
                record.grade = grade;
            }
            if let Some(attendance) = attendance {
                record.attendance = attendance;
            }
            if photo.is_some() {
                record.photo = photo;
            }
            form::validate(&record.fields())?;

            match store.update(record).await? {
                Some(updated) => println!("Updated {} ({}).", updated.name, updated.id),
                None => println!("No such student."),
            }
        }
        Commands::Delete { id } => {
            let mut store = open_seeded(opened).await?;
            if store.delete(&id).await? {
                println!("Deleted {id}.");
            } else {
                println!("No such student.");
            }
        }
        Commands::Import { csv } => {
            let mut store = open_seeded(opened).await?;
            let inserted = import::import_csv(&mut store, &csv).await?;
            println!("Inserted {inserted} students from {}.", csv.display());
        }
        Commands::Report { view, out } => {
            let store = open_seeded(opened).await?;
            let records = store.roster_view(&view.filter(), view.sort().as_ref()).await?;
            let report = report::build_report(view.course.as_deref(), &records);
            std::fs::write(&out, report)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
        Commands::Announce { title, content } => {
            if title.trim().is_empty() || content.trim().is_empty() {
                bail!("announcement title and content must not be empty");
            }
            let mut store = open_seeded(opened).await?;
            let announcement = store.post_announcement(&title, &content).await?;
            println!("Posted '{}' ({}).", announcement.title, announcement.id);
        }
        Commands::Announcements { limit } => {
            let store = open_seeded(opened).await?;
            let announcements = store.recent_announcements(limit).await?;
            if announcements.is_empty() {
                println!("No announcements.");
                return Ok(());
            }
            for announcement in announcements {
                println!(
                    "- [{}] {}: {}",
                    announcement.date, announcement.title, announcement.content
                );
            }
        }
    }

    Ok(())
}

async fn open_seeded(
    opened: Result<Backend, StorageError>,
) -> anyhow::Result<RecordStore<Backend>> {
    let mut store = RecordStore::new(opened.context("failed to open storage")?);
    bootstrap::ensure_seeded(&mut store).await?;
    Ok(store)
}

fn print_summary(record: &StudentRecord) {
    println!(
        "- {} ({}, {}) grade {} attendance {}% [{}]",
        record.name, record.email, record.course, record.grade, record.attendance, record.id
    );
}

fn print_detail(record: &StudentRecord) {
    println!("{} <{}>", record.name, record.email);
    println!("  id: {}", record.id);
    println!("  course: {}", record.course);
    println!("  grade: {}", record.grade);
    println!("  attendance: {}%", record.attendance);
    println!("  added: {}", record.created_at.format("%Y-%m-%d %H:%M"));
    if let Some(photo) = &record.photo {
        println!("  photo: {photo}");
    }

    if !record.assignments().is_empty() {
        println!("  assignments:");
        for assignment in record.assignments() {
            let grade = assignment
                .grade
                .map(|grade| grade.to_string())
                .unwrap_or_else(|| "-".to_string());
            println!(
                "    - {} (due {}, {}) grade {}",
                assignment.title, assignment.due_date, assignment.status, grade
            );
        }
    }

    if !record.schedule().is_empty() {
        println!("  schedule:");
        for item in record.schedule() {
            println!("    - {} {} {} room {}", item.day, item.time, item.course, item.room);
        }
    }

    if !record.performance().is_empty() {
        let samples: Vec<String> = record
            .performance()
            .iter()
            .map(|sample| format!("{sample:.0}"))
            .collect();
        println!("  performance: {}", samples.join(", "));
    }
}

fn init_tracing(verbose: bool) -> anyhow::Result<()> {
    let level = if verbose { "debug" } else { "warn" };
    let filter = tracing_subscriber::EnvFilter::try_from_env("ROSTER_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|error| anyhow::anyhow!("failed to initialize tracing subscriber: {error}"))?;

    Ok(())
}
