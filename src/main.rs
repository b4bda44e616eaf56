/*!
# Devocional - A Templated Devotional Journal

Command-line front end for the devocional engine. It resolves calendar dates
to templated days, opens editable entry sessions, saves answers, and prints
week-aligned month grids decorated with completion.

## Usage

```
devocional <COMMAND>

Commands:
  init      Initialize the local database schema
  years     List the devotional year catalog
  show      Show the templated day and saved answers for a date
  calendar  Print a month grid with completed days marked
  fill      Fill entry fields for a date and save
  admin     Administrative template authoring (local database only)
```

## Configuration

- `DEVOCIONAL_DB`: path to the SQLite database (default `~/.devocional/devocional.db`)
- `DEVOCIONAL_API_URL` / `DEVOCIONAL_TOKEN`: when set, user commands talk to
  the remote backend instead of the local database
*/

use clap::Parser;
use devocional::calendar::{self, WeekStart};
use devocional::cli::{parse_date_arg, AdminCommand, CliArgs, Command};
use devocional::config::Config;
use devocional::constants::{DEFAULT_LOG_LEVEL, LOG_FORMAT_JSON};
use devocional::db::Database;
use devocional::errors::{AppError, AppResult};
use devocional::model::{
    DayType, FieldId, InputKind, MonthId, UserId, YearId, YearStatus,
};
use devocional::remote::ApiClient;
use devocional::stores::{active_years, EntryStore, TemplateRepository};
use devocional::{index, resolver, session, Resolution};
use tracing::{debug, info};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// The configured pair of collaborators user commands run against.
enum Stores {
    Local(Database),
    Remote(ApiClient),
}

impl Stores {
    fn open(config: &Config) -> AppResult<Self> {
        if let (Some(url), Some(token)) = (&config.api_url, &config.token) {
            debug!(%url, "Using remote collaborator");
            return Ok(Stores::Remote(ApiClient::new(url.clone(), token.clone())));
        }
        debug!(path = ?config.db_path, "Using local database");
        let db = Database::open(&config.db_path)?;
        db.initialize_schema()?;
        Ok(Stores::Local(db))
    }

    fn templates(&self) -> &dyn TemplateRepository {
        match self {
            Stores::Local(db) => db,
            Stores::Remote(client) => client,
        }
    }

    fn entries(&self) -> &dyn EntryStore {
        match self {
            Stores::Local(db) => db,
            Stores::Remote(client) => client,
        }
    }
}

fn main() -> AppResult<()> {
    let args = CliArgs::parse();
    init_logging(&args);

    info!("Starting devocional");
    let config = Config::load()?;
    config.validate()?;
    debug!(?config, "Configuration loaded");

    match args.command {
        Command::Init => {
            let db = Database::open(&config.db_path)?;
            db.initialize_schema()?;
            println!("Initialized database at {}", config.db_path.display());
            Ok(())
        }
        Command::Admin { command } => {
            if config.uses_remote() {
                return Err(AppError::Config(
                    "administrative commands run against the local database only; unset DEVOCIONAL_API_URL".to_string(),
                ));
            }
            let db = Database::open(&config.db_path)?;
            db.initialize_schema()?;
            run_admin(&db, command)
        }
        Command::Years { active } => {
            let stores = Stores::open(&config)?;
            cmd_years(stores.templates(), active)
        }
        Command::Show { year_id, user, date } => {
            let stores = Stores::open(&config)?;
            cmd_show(
                stores.templates(),
                stores.entries(),
                YearId(year_id),
                user,
                parse_date_arg(date.as_deref())?,
            )
        }
        Command::Calendar { user, year, month } => {
            let stores = Stores::open(&config)?;
            cmd_calendar(stores.entries(), user, year, month)
        }
        Command::Fill {
            year_id,
            user,
            date,
            sets,
            audio_sets,
        } => {
            let stores = Stores::open(&config)?;
            cmd_fill(
                stores.templates(),
                stores.entries(),
                YearId(year_id),
                user,
                parse_date_arg(date.as_deref())?,
                &sets,
                &audio_sets,
            )
        }
    }
}

fn init_logging(args: &CliArgs) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if args.verbose { "debug" } else { DEFAULT_LOG_LEVEL })
    });

    if args.log_format == LOG_FORMAT_JSON {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_filter(filter),
            )
            .init();
    }
}

fn cmd_years(templates: &dyn TemplateRepository, only_active: bool) -> AppResult<()> {
    let years = if only_active {
        active_years(templates)?
    } else {
        templates.get_devotional_years()?
    };

    if years.is_empty() {
        println!("No devotional years in the catalog.");
        return Ok(());
    }
    for year in years {
        println!(
            "[{}] {} — {} ({}) {}",
            year.id,
            year.year,
            year.title,
            year.status.as_str(),
            year.theme
        );
    }
    Ok(())
}

fn cmd_show(
    templates: &dyn TemplateRepository,
    entries: &dyn EntryStore,
    year_id: YearId,
    user: UserId,
    date: chrono::NaiveDate,
) -> AppResult<()> {
    let template = match resolver::resolve(templates, year_id, date)? {
        Resolution::Template(template) => template,
        Resolution::NotConfigured(reason) => {
            println!("Nothing is configured for {} ({:?}).", date, reason);
            return Ok(());
        }
    };

    println!("{} — {}", date, template.day_type.as_str());
    if let Some(reading) = &template.biblical_reading {
        println!("Reading: {}", reading);
    }
    println!("Verse:   {}", template.verse_reference());

    let session = session::begin_session(templates, entries, year_id, user, date)?;
    println!(
        "Entry:   {}",
        if session.is_persisted() { "saved" } else { "new" }
    );
    for field in session.field_schema() {
        let marker = if field.required { "*" } else { "" };
        let text = session
            .value(field.id)
            .map(|v| {
                if v.is_blank() {
                    "(empty)".to_string()
                } else if let Some(url) = &v.audio_url {
                    format!("{} [{}]", v.text, url)
                } else {
                    v.text.clone()
                }
            })
            .unwrap_or_else(|| "(empty)".to_string());
        println!(
            "  [{}] {}{} ({}): {}",
            field.id,
            field.label,
            marker,
            field.input_kind.as_str(),
            text
        );
    }
    Ok(())
}

fn cmd_calendar(
    entries: &dyn EntryStore,
    user: UserId,
    year: i32,
    month: Option<u32>,
) -> AppResult<()> {
    let completion = index::monthly_completion(entries, user, year)?;
    let months: Vec<u32> = match month {
        Some(m) => {
            // Validate before printing anything.
            calendar::days_in_month(year, m)?;
            vec![m]
        }
        None => (1..=12).collect(),
    };

    for m in months {
        let grid = calendar::week_aligned_grid(year, m, WeekStart::Monday)?;
        let completed = completion.get(&m).cloned().unwrap_or_default();

        println!("{:04}-{:02}", year, m);
        println!(" Mo  Tu  We  Th  Fr  Sa  Su");
        for week in grid.chunks(7) {
            let row: Vec<String> = week
                .iter()
                .map(|slot| match slot {
                    Some(day) if completed.contains(day) => format!("{:>2}*", day),
                    Some(day) => format!("{:>2} ", day),
                    None => "   ".to_string(),
                })
                .collect();
            println!("{}", row.join(" "));
        }
        println!();
    }
    Ok(())
}

fn cmd_fill(
    templates: &dyn TemplateRepository,
    entries: &dyn EntryStore,
    year_id: YearId,
    user: UserId,
    date: chrono::NaiveDate,
    sets: &[String],
    audio_sets: &[String],
) -> AppResult<()> {
    let mut session = session::begin_session(templates, entries, year_id, user, date)?;

    for set in sets {
        let (field, value) = parse_set(set)?;
        session.apply_edit(field, value)?;
    }
    for set in audio_sets {
        let (field, url) = parse_set(set)?;
        session.apply_audio(field, url)?;
    }

    let entry = session.commit(entries)?;
    println!(
        "Saved entry {} for {} (completed: {}, fill: {:.0}%)",
        entry.id, entry.date, entry.completed, entry.fill_ratio
    );
    Ok(())
}

/// Parses a `FIELD_ID=VALUE` argument.
fn parse_set(s: &str) -> AppResult<(FieldId, String)> {
    let (id, value) = s
        .split_once('=')
        .ok_or_else(|| AppError::InvalidArgument(format!("'{}': expected FIELD_ID=VALUE", s)))?;
    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| AppError::InvalidArgument(format!("'{}': field id must be numeric", s)))?;
    Ok((FieldId(id), value.to_string()))
}

fn run_admin(db: &Database, command: AdminCommand) -> AppResult<()> {
    match command {
        AdminCommand::CreateYear {
            year,
            title,
            theme,
            status,
        } => {
            let year = db.create_devotional_year(year, &title, &theme, YearStatus::parse(&status)?)?;
            println!("Created devotional year [{}] {}", year.id, year.title);
        }
        AdminCommand::UpdateYear {
            id,
            title,
            theme,
            status,
        } => {
            db.update_devotional_year(YearId(id), &title, &theme, YearStatus::parse(&status)?)?;
            println!("Updated devotional year [{}]", id);
        }
        AdminCommand::CreateMonth { year_id, month, name } => {
            let month = db.create_master_month(YearId(year_id), month, &name)?;
            println!("Created master month [{}] {}", month.id, month.name);
        }
        AdminCommand::CreateDay {
            month_id,
            day,
            day_type,
            reading,
            verse,
        } => {
            let day = db.create_master_day(
                MonthId(month_id),
                day,
                DayType::parse(&day_type)?,
                reading.as_deref(),
                verse.as_deref(),
            )?;
            println!("Created master day [{}] day {}", day.id, day.day_number);
        }
        AdminCommand::CreateField {
            year_id,
            label,
            kind,
            required,
            order,
        } => {
            let field = db.create_field_definition(
                YearId(year_id),
                &label,
                InputKind::parse(&kind)?,
                required,
                order,
            )?;
            println!("Created field [{}] {}", field.id, field.label);
        }
    }
    Ok(())
}
