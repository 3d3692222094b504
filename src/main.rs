//! Taskboard CLI - a lane-ordered task board.

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use log::info;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use taskboard::{BoardConfig, Client, Daemon, DaemonConfig, NewTask, Storage, Task, TaskStore, is_daemon_running};

mod cli;

use cli::{Cli, Command};

fn setup_logging() -> Result<()> {
    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("taskboard")
        .join("logs");

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    let log_file = log_dir.join("taskboard.log");

    let target = Box::new(
        fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .context("Failed to open log file")?,
    );

    env_logger::Builder::from_default_env()
        .target(env_logger::Target::Pipe(target))
        .init();

    info!("Logging initialized, writing to: {}", log_file.display());
    Ok(())
}

fn get_board_dir(cli: &Cli) -> PathBuf {
    cli.dir
        .clone()
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")))
}

/// Where board commands are applied: the daemon when one is running,
/// otherwise the snapshot on disk.
enum Session {
    Local(TaskStore),
    Remote(Client),
}

impl Session {
    fn open(root: &Path) -> Result<Self> {
        if is_daemon_running(root) {
            info!("Routing through daemon for {}", root.display());
            let client = Client::connect(root).context("Failed to connect to daemon")?;
            return Ok(Session::Remote(client));
        }

        let storage = Storage::open(root).context("Failed to open board")?;
        Ok(Session::Local(storage.open_store()?))
    }

    fn add(&mut self, task: NewTask) -> Result<Task> {
        match self {
            Session::Local(store) => Ok(store.add(task)),
            Session::Remote(client) => client.add(task),
        }
    }

    fn remove(&mut self, id: u64) -> Result<Option<Task>> {
        match self {
            Session::Local(store) => Ok(store.remove(id)),
            Session::Remote(client) => client.remove(id),
        }
    }

    fn move_task(&mut self, task: Task, target: Option<Task>) -> Result<Option<Task>> {
        match self {
            Session::Local(store) => Ok(store.move_task(task, target.as_ref())),
            Session::Remote(client) => client.move_task(task, target),
        }
    }

    fn get(&mut self, id: u64) -> Result<Option<Task>> {
        match self {
            Session::Local(store) => Ok(store.get(id).cloned()),
            Session::Remote(client) => client.get(id),
        }
    }

    fn list(&mut self, lane: Option<&str>) -> Result<Vec<Task>> {
        match self {
            Session::Local(store) => Ok(match lane {
                Some(lane) => store.tasks_in_lane(lane),
                None => store.tasks().to_vec(),
            }),
            Session::Remote(client) => client.list(lane),
        }
    }

    fn lanes(&mut self) -> Result<BTreeMap<String, Vec<Task>>> {
        match self {
            Session::Local(store) => Ok(store.lanes()),
            Session::Remote(client) => client.lanes(),
        }
    }
}

fn format_task(task: &Task) -> String {
    let description = if task.description.is_empty() {
        String::new()
    } else {
        format!("\n    {}", task.description.dimmed())
    };
    format!(
        "{} {}[{}] {}{}",
        format!("#{}", task.id).cyan(),
        task.status.yellow(),
        task.position,
        task.title,
        description
    )
}

/// Configured lanes first, in config order, then any other lane present.
fn ordered_lanes(config: &BoardConfig, mut lanes: BTreeMap<String, Vec<Task>>) -> Vec<(String, Vec<Task>)> {
    let mut ordered: Vec<(String, Vec<Task>)> = config
        .lanes
        .iter()
        .map(|name| (name.clone(), lanes.remove(name).unwrap_or_default()))
        .collect();
    ordered.extend(lanes);
    ordered
}

fn run(cli: Cli) -> Result<()> {
    let board_dir = get_board_dir(&cli);

    match cli.command {
        Command::Init => {
            Storage::init(&board_dir).context("Failed to initialize board")?;
            println!("{} Initialized taskboard in {}", "✓".green(), board_dir.display());
        }

        Command::Add {
            title,
            description,
            status,
        } => {
            let status = match status {
                Some(status) => status,
                None => Storage::open(&board_dir)?.config()?.default_lane().to_string(),
            };
            let mut session = Session::open(&board_dir)?;
            let task = session
                .add(NewTask::new(title, description, status))
                .context("Failed to add task")?;

            println!("{} Added: {}", "✓".green(), format_task(&task));
        }

        Command::Rm { id } => {
            let mut session = Session::open(&board_dir)?;
            match session.remove(id).context("Failed to remove task")? {
                Some(task) => println!("{} Removed: {} {}", "✓".green(), format!("#{}", task.id).cyan(), task.title),
                None => println!("{}", format!("No task #{}", id).dimmed()),
            }
        }

        Command::Mv {
            id,
            to,
            before,
            title,
            description,
        } => {
            let mut session = Session::open(&board_dir)?;
            let Some(existing) = session.get(id)? else {
                eprintln!("{} Task not found: {}", "✗".red(), id);
                std::process::exit(1);
            };

            let target = match before {
                Some(target_id) => match session.get(target_id)? {
                    Some(target) => Some(target),
                    None => {
                        eprintln!("{} Task not found: {}", "✗".red(), target_id);
                        std::process::exit(1);
                    }
                },
                None => None,
            };

            let updated = Task {
                status: to.unwrap_or_else(|| existing.status.clone()),
                title: title.unwrap_or_else(|| existing.title.clone()),
                description: description.unwrap_or_else(|| existing.description.clone()),
                ..existing
            };

            match session.move_task(updated, target).context("Failed to move task")? {
                Some(task) => println!("{} Moved: {}", "→".blue(), format_task(&task)),
                None => println!("{}", format!("No task #{}", id).dimmed()),
            }
        }

        Command::Get { id } => {
            let mut session = Session::open(&board_dir)?;
            match session.get(id).context("Failed to get task")? {
                Some(task) => {
                    println!("{}: {}", "ID".bold(), format!("#{}", task.id).cyan());
                    println!("{}: {}", "Title".bold(), task.title);
                    println!("{}: {}", "Lane".bold(), task.status.yellow());
                    println!("{}: {}", "Position".bold(), task.position);
                    if !task.description.is_empty() {
                        println!("{}: {}", "Description".bold(), task.description);
                    }
                }
                None => {
                    eprintln!("{} Task not found: {}", "✗".red(), id);
                    std::process::exit(1);
                }
            }
        }

        Command::List { lane } => {
            let mut session = Session::open(&board_dir)?;
            let tasks = session.list(lane.as_deref()).context("Failed to list tasks")?;

            if tasks.is_empty() {
                println!("{}", "No tasks found".dimmed());
            } else {
                for task in tasks {
                    println!("{}", format_task(&task));
                }
            }
        }

        Command::Board => {
            let config = Storage::open(&board_dir)?.config()?;
            let mut session = Session::open(&board_dir)?;
            let lanes = session.lanes().context("Failed to read lanes")?;

            for (lane, tasks) in ordered_lanes(&config, lanes) {
                println!("{} ({})", lane.bold().yellow(), tasks.len());
                if tasks.is_empty() {
                    println!("  {}", "empty".dimmed());
                }
                for task in tasks {
                    println!("  {} {} {}", task.position, format!("#{}", task.id).cyan(), task.title);
                }
            }
        }

        Command::Daemon => {
            println!("{} Starting daemon for {}", "→".blue(), board_dir.display());

            let config = DaemonConfig::load(&board_dir).context("Failed to load daemon config")?;
            let mut daemon = Daemon::new(config).context("Failed to create daemon")?;

            let rt = tokio::runtime::Runtime::new().context("Failed to create runtime")?;
            rt.block_on(async { daemon.run().await }).context("Daemon error")?;
        }

        Command::DaemonStop => {
            if !is_daemon_running(&board_dir) {
                println!("{} Daemon is not running", "✗".red());
                std::process::exit(1);
            }

            let mut client = Client::connect(&board_dir).context("Failed to connect to daemon")?;
            client.shutdown().context("Failed to shutdown daemon")?;
            println!("{} Daemon stopped", "✓".green());
        }

        Command::DaemonStatus => {
            if is_daemon_running(&board_dir) {
                println!("{} Daemon is running", "✓".green());

                if let Ok(mut client) = Client::connect(&board_dir)
                    && client.ping().is_ok()
                {
                    println!("  {} Responding to requests", "✓".green());
                }
            } else {
                println!("{} Daemon is not running", "✗".red());
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    setup_logging().context("Failed to setup logging")?;

    let cli = Cli::parse();
    info!("Command: {:?}", std::env::args().collect::<Vec<_>>());

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "Error:".red().bold(), e);
        std::process::exit(1);
    }

    Ok(())
}
