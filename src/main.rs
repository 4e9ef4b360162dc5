//! sqlws - interactive SQL workspace client.

use std::process::ExitCode;
use std::sync::Arc;

use sql_workspace::cli::{read_sql, Cli, Command};
use sql_workspace::config::Config;
use sql_workspace::error::Result;
use sql_workspace::logging::{self, LogTarget};
use sql_workspace::presenter::classify;
use sql_workspace::remote::HttpRemoteService;
use sql_workspace::workspace::Workspace;
use tracing::{error, info};

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse_args();

    let target = LogTarget::from_flag(cli.log_file);
    if let Err(e) = logging::init(&target) {
        eprintln!("Warning: {}; logging to stderr", e.message());
        logging::init(&LogTarget::Stderr).ok();
    }

    match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            error!("{}: {}", e.category(), e);
            eprintln!("{}: {}", e.category(), e.message());
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<ExitCode> {
    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let config = Config::load_from_file(&config_path)?;

    let service = config.resolve_service(cli.url.as_deref(), cli.service.as_deref())?;
    let remote = HttpRemoteService::new(&service)?;
    info!("SQL service: {}", remote.base_url());
    let workspace = Workspace::new(Arc::new(remote));

    match cli.command {
        Command::Run { sql, file } => {
            let text = read_sql(sql.as_deref(), file.as_ref())?;
            let submission = workspace.submit(&text).await;

            if let Some(presentation) = &submission.presentation {
                println!("{presentation}");
            }
            if let Some(err) = &submission.batch.error {
                eprintln!(
                    "{} (after {} of {} statements)",
                    err.message(),
                    submission.batch.succeeded,
                    submission.batch.total
                );
                return Ok(ExitCode::FAILURE);
            }
        }
        Command::Databases => {
            for db in workspace.mount().await {
                println!("{db}");
            }
        }
        Command::Tables { db } => {
            for table in workspace.schema().get_tables(&db).await {
                println!("{table}");
            }
        }
        Command::Columns { db, table } => {
            for column in workspace.select_table(&db, &table).await {
                println!("{}\t{}", column.name, column.data_type);
            }
        }
        Command::DropDatabase { db } => {
            let payload = workspace.drop_database(&db).await?;
            println!("{}", classify(&payload));
        }
        Command::Backups { db, table } => {
            for file in workspace.list_backups(&db, &table).await? {
                println!("{file}");
            }
        }
        Command::Restore {
            db,
            table,
            backup_file,
        } => {
            let payload = workspace.restore_backup(&db, &table, &backup_file).await?;
            println!("{}", classify(&payload));
        }
    }

    Ok(ExitCode::SUCCESS)
}
