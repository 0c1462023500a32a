mod catalog_cmds;
mod config;
mod dashboard_cmd;
mod plan_cmds;
mod resolve;
mod seed_cmd;
mod serve_cmd;
mod store_handle;
#[cfg(test)]
mod test_util;
mod tui;

use std::net::IpAddr;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use uuid::Uuid;

use planner_core::dashboard::ViewMode;
use planner_core::document::ExportKind;
use planner_db::models::PocPlanStatus;
use planner_db::pool;

use config::PlannerConfig;
use store_handle::StoreHandle;

#[derive(Parser)]
#[command(name = "poc-planner", about = "Plan proof-of-concept engagements")]
struct Cli {
    /// Database URL (overrides POC_PLANNER_DATABASE_URL env var)
    #[arg(long, global = true)]
    database_url: Option<String>,

    /// Use a throwaway in-memory catalog instead of the database
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Write a poc-planner config file (no database required)
    Init {
        /// PostgreSQL connection URL
        #[arg(long, default_value = "postgresql://localhost:5432/poc_planner")]
        db_url: String,
        /// Address the HTTP server binds to
        #[arg(long, default_value = "127.0.0.1")]
        bind: IpAddr,
        /// Port the HTTP server listens on
        #[arg(long, default_value_t = config::DEFAULT_PORT)]
        port: u16,
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
    /// Create the database if needed and run migrations
    DbInit,
    /// Load the starter catalog into an empty database
    Seed,
    /// Copy rows from the legacy `prerequisites` table
    MigratePrereqs,
    /// Solution management
    Solution {
        #[command(subcommand)]
        command: SolutionCommands,
    },
    /// Use case management
    UseCase {
        #[command(subcommand)]
        command: UseCaseCommands,
    },
    /// Prerequisite management
    Prereq {
        #[command(subcommand)]
        command: PrereqCommands,
    },
    /// Print the filtered dashboard item list
    Items {
        /// Case-insensitive search text
        #[arg(long, short)]
        search: Option<String>,
        /// Only these solutions (name or ID); repeatable. Defaults to all.
        #[arg(long = "solution")]
        solutions: Vec<String>,
        /// all, use_cases, or prerequisites
        #[arg(long, default_value = "all")]
        view: ViewMode,
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Saved POC plan management
    Plan {
        #[command(subcommand)]
        command: PlanCommands,
    },
    /// Launch interactive TUI dashboard
    Dashboard,
    /// Serve the JSON API and print views over HTTP
    Serve {
        /// Address to bind (overrides config file)
        #[arg(long)]
        bind: Option<IpAddr>,
        /// Port to listen on (overrides POC_PLANNER_PORT and config file)
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print shell completions
    Completions {
        shell: Shell,
    },
}

#[derive(Subcommand)]
pub enum SolutionCommands {
    /// List solutions with use case and prerequisite counts
    List,
    /// Add a solution
    Add {
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long, default_value = "")]
        icon: String,
    },
    /// Replace a solution's fields; omitted fields keep their value
    Update {
        id: Uuid,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        description: Option<String>,
        #[arg(long)]
        icon: Option<String>,
    },
    /// Delete a solution with its use cases and prerequisites
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum UseCaseCommands {
    /// List use cases of a solution
    List {
        /// Solution ID
        solution: Uuid,
    },
    /// Add a use case to a solution
    Add {
        /// Solution ID
        #[arg(long)]
        solution: Uuid,
        #[arg(long)]
        text: String,
        /// Embedded prerequisite; repeatable
        #[arg(long = "prereq")]
        prerequisites: Vec<String>,
    },
    /// Replace a use case's text and embedded prerequisites
    Update {
        id: Uuid,
        #[arg(long)]
        text: Option<String>,
        /// Replaces the embedded prerequisites when given; repeatable
        #[arg(long = "prereq")]
        prerequisites: Option<Vec<String>>,
    },
    /// Delete a use case
    Delete {
        id: Uuid,
        /// Also delete prerequisites attached to this use case
        #[arg(long)]
        delete_linked: bool,
    },
}

#[derive(Subcommand)]
pub enum PrereqCommands {
    /// List prerequisites attached to a solution
    List {
        /// Solution ID
        solution: Uuid,
    },
    /// Add a prerequisite to a solution or a use case
    Add {
        #[arg(long, required_unless_present = "use_case", conflicts_with = "use_case")]
        solution: Option<Uuid>,
        #[arg(long)]
        use_case: Option<Uuid>,
        #[arg(long)]
        text: String,
    },
    /// Change a prerequisite's text
    Update {
        id: Uuid,
        #[arg(long)]
        text: String,
    },
    /// Delete a prerequisite
    Delete {
        id: Uuid,
    },
}

#[derive(Subcommand)]
pub enum PlanCommands {
    /// Print a plan request template listing the current catalog
    Template {
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Save a plan from a plan request TOML file
    Create {
        /// Path to the plan request file
        file: String,
        /// Do not write the new plan ID back into the file
        #[arg(long)]
        no_write_back: bool,
    },
    /// Show a saved plan (or list all plans)
    Show {
        /// Plan ID or plan request file (omit to list all)
        plan: Option<String>,
    },
    /// Render a saved plan document
    Export {
        /// Plan ID or plan request file
        plan: String,
        /// prerequisites, success-plan, or full
        #[arg(long, default_value = "full")]
        kind: ExportKind,
        /// Render the print-ready HTML page instead of text
        #[arg(long)]
        html: bool,
        /// Output file path (defaults to stdout)
        #[arg(long)]
        output: Option<String>,
    },
    /// Change a saved plan's status
    Status {
        /// Plan ID or plan request file
        plan: String,
        /// draft, approved, or completed
        status: PocPlanStatus,
    },
    /// Delete a saved plan
    Delete {
        /// Plan ID or plan request file
        plan: String,
    },
}

/// Execute the `poc-planner init` command: write config file.
fn cmd_init(db_url: &str, bind: IpAddr, port: u16, force: bool) -> anyhow::Result<()> {
    let path = config::config_path();

    if path.exists() && !force {
        anyhow::bail!(
            "config file already exists at {}\nUse --force to overwrite.",
            path.display()
        );
    }

    let cfg = config::ConfigFile {
        database: config::DatabaseSection {
            url: db_url.to_string(),
        },
        server: config::ServerSection { bind, port },
    };

    config::save_config(&cfg)?;

    println!("Config written to {}", path.display());
    println!("  database.url = {db_url}");
    println!("  server       = {bind}:{port}");
    println!();
    println!("Next: run `poc-planner db-init` to create and migrate the database.");

    Ok(())
}

/// Execute the `poc-planner db-init` command: create database and run migrations.
async fn cmd_db_init(resolved: &PlannerConfig) -> anyhow::Result<()> {
    println!("Initializing poc-planner database...");

    pool::ensure_database_exists(&resolved.db_config).await?;
    let db_pool = pool::create_pool(&resolved.db_config).await?;
    pool::run_migrations(&db_pool).await?;

    let counts = pool::table_counts(&db_pool).await?;
    println!("Database ready. Tables:");
    for (table, count) in &counts {
        println!("  {table}: {count} rows");
    }

    db_pool.close().await;

    println!("poc-planner db-init complete.");
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db_url = cli.database_url.as_deref();

    match cli.command {
        Commands::Init {
            db_url,
            bind,
            port,
            force,
        } => {
            cmd_init(&db_url, bind, port, force)?;
        }
        Commands::Completions { shell } => {
            clap_complete::generate(
                shell,
                &mut Cli::command(),
                "poc-planner",
                &mut std::io::stdout(),
            );
        }
        Commands::DbInit => {
            let resolved = PlannerConfig::resolve(db_url, None, None)?;
            cmd_db_init(&resolved).await?;
        }
        Commands::Serve { bind, port } => {
            let resolved = PlannerConfig::resolve(db_url, bind, port)?;
            let handle = StoreHandle::open(&resolved, cli.memory).await?;
            let result = serve_cmd::run_serve(handle.store.clone(), resolved.server_addr).await;
            handle.close().await;
            result?;
        }
        command => {
            let resolved = PlannerConfig::resolve(db_url, None, None)?;
            let handle = StoreHandle::open(&resolved, cli.memory).await?;
            let result = run_store_command(command, &handle).await;
            handle.close().await;
            result?;
        }
    }

    Ok(())
}

/// Commands that only need an open store.
async fn run_store_command(command: Commands, handle: &StoreHandle) -> anyhow::Result<()> {
    let store = handle.store();
    match command {
        Commands::Seed => seed_cmd::run_seed(store).await,
        Commands::MigratePrereqs => seed_cmd::run_migrate(store).await,
        Commands::Solution { command } => catalog_cmds::run_solution_command(command, store).await,
        Commands::UseCase { command } => catalog_cmds::run_use_case_command(command, store).await,
        Commands::Prereq { command } => catalog_cmds::run_prereq_command(command, store).await,
        Commands::Items {
            search,
            solutions,
            view,
            json,
        } => {
            let options = dashboard_cmd::ItemsOptions {
                search: search.unwrap_or_default(),
                solutions,
                view,
                json,
            };
            dashboard_cmd::run_items(store, &options).await
        }
        Commands::Plan { command } => plan_cmds::run_plan_command(command, store).await,
        Commands::Dashboard => tui::run_dashboard(handle.store.clone()).await,
        Commands::Init { .. }
        | Commands::DbInit
        | Commands::Serve { .. }
        | Commands::Completions { .. } => anyhow::bail!("command does not run against a store"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_items_flags() {
        let cli = Cli::try_parse_from([
            "poc-planner",
            "--memory",
            "items",
            "--search",
            "ssh",
            "--solution",
            "Password Safe",
            "--view",
            "prereqs",
        ])
        .unwrap();
        assert!(cli.memory);
        match cli.command {
            Commands::Items {
                search,
                solutions,
                view,
                ..
            } => {
                assert_eq!(search.as_deref(), Some("ssh"));
                assert_eq!(solutions, vec!["Password Safe"]);
                assert_eq!(view, ViewMode::Prerequisites);
            }
            _ => panic!("expected items command"),
        }
    }

    #[test]
    fn prereq_add_needs_exactly_one_owner() {
        assert!(Cli::try_parse_from(["poc-planner", "prereq", "add", "--text", "x"]).is_err());
        let id = Uuid::new_v4().to_string();
        assert!(
            Cli::try_parse_from([
                "poc-planner",
                "prereq",
                "add",
                "--solution",
                &id,
                "--use-case",
                &id,
                "--text",
                "x",
            ])
            .is_err()
        );
        assert!(
            Cli::try_parse_from(["poc-planner", "prereq", "add", "--use-case", &id, "--text", "x"])
                .is_ok()
        );
    }

    #[test]
    fn plan_export_parses_kind_and_status() {
        let cli = Cli::try_parse_from([
            "poc-planner",
            "plan",
            "export",
            "plan.toml",
            "--kind",
            "success-plan",
            "--html",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Commands::Plan {
                command: PlanCommands::Export {
                    kind: ExportKind::SuccessPlan,
                    html: true,
                    ..
                }
            }
        ));

        let cli =
            Cli::try_parse_from(["poc-planner", "plan", "status", "plan.toml", "approved"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Plan {
                command: PlanCommands::Status {
                    status: PocPlanStatus::Approved,
                    ..
                }
            }
        ));
    }
}
