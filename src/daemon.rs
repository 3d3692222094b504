//! Background daemon that owns the board.
//!
//! The daemon provides:
//! - A single writer: every request is applied in order by one task store
//! - Write coalescing: mutations mark the board dirty, a timer flushes it
//! - A Unix socket speaking newline-delimited JSON

use crate::config::DEFAULT_FLUSH_INTERVAL_MS;
use crate::protocol::{Request, Response};
use crate::storage::{BOARD_DIR, Storage};
use crate::store::TaskStore;
use eyre::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinSet;
use tokio::time::interval;

/// Socket file name within the .taskboard directory.
const SOCKET_FILE: &str = "daemon.sock";

/// PID file name within the .taskboard directory.
const PID_FILE: &str = "daemon.pid";

/// Requests travel from connection tasks to the store loop with a slot for
/// the reply.
type RequestTx = mpsc::Sender<(Request, oneshot::Sender<Response>)>;

/// Configuration for the daemon.
#[derive(Debug, Clone)]
pub struct DaemonConfig {
    /// Root directory containing .taskboard
    pub root: PathBuf,

    /// Flush interval for pending writes
    pub flush_interval: Duration,
}

impl DaemonConfig {
    /// Create config with default settings.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            flush_interval: Duration::from_millis(DEFAULT_FLUSH_INTERVAL_MS),
        }
    }

    /// Create config using the board's `config.yaml`.
    pub fn load(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let board = Storage::open(&root)?.config().context("Failed to load board config")?;
        Ok(Self {
            flush_interval: board.flush_interval(),
            root,
        })
    }

    /// Get the socket path.
    pub fn socket_path(&self) -> PathBuf {
        self.root.join(BOARD_DIR).join(SOCKET_FILE)
    }

    /// Get the PID file path.
    pub fn pid_path(&self) -> PathBuf {
        self.root.join(BOARD_DIR).join(PID_FILE)
    }
}

/// The taskboard daemon.
pub struct Daemon {
    config: DaemonConfig,
    storage: Storage,
    store: TaskStore,
    dirty: Arc<AtomicBool>,
    shutting_down: bool,
}

impl Daemon {
    /// Create a new daemon instance.
    pub fn new(config: DaemonConfig) -> Result<Self> {
        let storage = Storage::open(&config.root).context("Failed to open board")?;
        let mut store = TaskStore::from_tasks(storage.load()?);

        let dirty = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&dirty);
        store.on_change(move |_| flag.store(true, Ordering::Relaxed));

        Ok(Self {
            config,
            storage,
            store,
            dirty,
            shutting_down: false,
        })
    }

    /// Run the daemon until a client asks it to shut down.
    ///
    /// Every open connection is closed and every pending reply written
    /// before this returns.
    pub async fn run(&mut self) -> Result<()> {
        // Clean up any stale socket
        let socket_path = self.config.socket_path();
        if socket_path.exists() {
            fs::remove_file(&socket_path).ok();
        }

        let pid_path = self.config.pid_path();
        fs::write(&pid_path, std::process::id().to_string()).context("Failed to write PID file")?;

        let listener = UnixListener::bind(&socket_path).context("Failed to bind to Unix socket")?;
        log::info!("Daemon listening on {:?}", socket_path);

        let (tx, mut rx) = mpsc::channel::<(Request, oneshot::Sender<Response>)>(100);
        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let mut connections = JoinSet::new();
        let mut flush_interval = interval(self.config.flush_interval);

        while !self.shutting_down {
            tokio::select! {
                accepted = listener.accept() => match accepted {
                    Ok((stream, _)) => {
                        let tx = tx.clone();
                        let shutdown = shutdown_rx.clone();
                        connections.spawn(async move {
                            if let Err(e) = Self::handle_connection(stream, tx, shutdown).await {
                                log::warn!("Connection error: {:#}", e);
                            }
                        });
                    }
                    Err(e) => log::error!("Accept error: {}", e),
                },

                Some((request, response_tx)) = rx.recv() => {
                    let response = self.handle_request(request);
                    let _ = response_tx.send(response);
                }

                _ = flush_interval.tick() => {
                    if let Err(e) = self.flush() {
                        log::error!("Flush failed: {:#}", e);
                    }
                }

                Some(_) = connections.join_next(), if !connections.is_empty() => {}
            }
        }

        log::info!("Daemon shutting down");
        let flushed = self.flush();

        // Idle connections stop reading; requests already in flight fail
        // once the receiver is gone.
        drop(listener);
        let _ = shutdown_tx.send(true);
        drop(rx);
        while connections.join_next().await.is_some() {}

        fs::remove_file(&socket_path).ok();
        fs::remove_file(&pid_path).ok();

        flushed
    }

    /// Write the board to disk if anything changed since the last flush.
    fn flush(&mut self) -> Result<()> {
        if !self.dirty.swap(false, Ordering::Relaxed) {
            return Ok(());
        }

        if let Err(e) = self.storage.save(self.store.tasks()) {
            self.dirty.store(true, Ordering::Relaxed);
            return Err(e);
        }

        log::debug!("Flushed {} task(s)", self.store.len());
        Ok(())
    }

    /// Handle a single client connection.
    async fn handle_connection(stream: UnixStream, tx: RequestTx, mut shutdown: watch::Receiver<bool>) -> Result<()> {
        let (reader, mut writer) = stream.into_split();
        let mut lines = BufReader::new(reader).lines();

        loop {
            let line = tokio::select! {
                line = lines.next_line() => line.context("Failed to read line")?,
                _ = shutdown.changed() => break,
            };
            let Some(line) = line else { break };
            if line.is_empty() {
                continue;
            }

            let request: Request = serde_json::from_str(&line).context("Failed to parse request")?;
            let is_shutdown = matches!(request, Request::Shutdown);

            let (resp_tx, resp_rx) = oneshot::channel();
            tx.send((request, resp_tx))
                .await
                .context("Failed to send request to daemon")?;

            let response = resp_rx.await.context("Daemon dropped the request")?;
            let mut response_json = serde_json::to_string(&response)?;
            response_json.push('\n');
            writer.write_all(response_json.as_bytes()).await?;
            writer.flush().await?;

            if is_shutdown {
                break;
            }
        }

        Ok(())
    }

    /// Handle a single request.
    fn handle_request(&mut self, request: Request) -> Response {
        match request {
            Request::Add { task } => Response::Task {
                task: self.store.add(task),
            },

            Request::Remove { id } => match self.store.remove(id) {
                Some(task) => Response::Task { task },
                None => Response::NotFound { id },
            },

            Request::Move { task, target } => {
                let id = task.id;
                match self.store.move_task(task, target.as_ref()) {
                    Some(task) => Response::Task { task },
                    None => Response::NotFound { id },
                }
            }

            Request::Get { id } => match self.store.get(id) {
                Some(task) => Response::Task { task: task.clone() },
                None => Response::NotFound { id },
            },

            Request::List { lane } => Response::Tasks {
                tasks: match lane {
                    Some(lane) => self.store.tasks_in_lane(&lane),
                    None => self.store.tasks().to_vec(),
                },
            },

            Request::Lanes => Response::Lanes {
                lanes: self.store.lanes(),
            },

            Request::Flush => match self.flush() {
                Ok(()) => Response::Ok,
                Err(e) => Response::error(format!("{:#}", e)),
            },

            Request::Shutdown => {
                self.shutting_down = true;
                Response::Ok
            }

            Request::Ping => Response::Pong,
        }
    }
}

/// Check if a daemon is running for the given board path.
pub fn is_daemon_running(root: &Path) -> bool {
    let config = DaemonConfig::new(root);
    let socket_path = config.socket_path();
    let pid_path = config.pid_path();

    if !socket_path.exists() {
        return false;
    }

    if let Ok(pid_str) = fs::read_to_string(&pid_path)
        && let Ok(pid) = pid_str.trim().parse::<i32>()
    {
        // Signal 0 only checks that the process exists
        unsafe {
            if libc::kill(pid, 0) == 0 {
                return true;
            }
        }
    }

    // Stale socket, clean up
    fs::remove_file(&socket_path).ok();
    fs::remove_file(&pid_path).ok();
    false
}
