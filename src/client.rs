//! Client for connecting to the taskboard daemon.

use crate::daemon::DaemonConfig;
use crate::protocol::{Request, Response};
use crate::types::{NewTask, Task};
use eyre::{Context, Result, bail};
use std::collections::BTreeMap;
use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::Path;
use std::time::Duration;

/// Client for communicating with the taskboard daemon.
pub struct Client {
    stream: UnixStream,
}

impl Client {
    /// Connect to a running daemon.
    pub fn connect(root: &Path) -> Result<Self> {
        let socket_path = DaemonConfig::new(root).socket_path();

        let stream = match UnixStream::connect(&socket_path) {
            Ok(stream) => stream,
            Err(e) => bail!("Failed to connect to daemon: {}. Is it running?", e),
        };

        stream
            .set_read_timeout(Some(Duration::from_secs(30)))
            .context("Failed to set read timeout")?;

        Ok(Self { stream })
    }

    /// Send a request and receive a response.
    fn request(&mut self, request: Request) -> Result<Response> {
        let request_json = serde_json::to_string(&request)?;
        writeln!(self.stream, "{}", request_json)?;
        self.stream.flush()?;

        let mut reader = BufReader::new(&self.stream);
        let mut response_line = String::new();
        if reader.read_line(&mut response_line)? == 0 {
            bail!("Daemon closed the connection");
        }

        let response: Response = serde_json::from_str(&response_line).context("Failed to parse response")?;
        Ok(response)
    }

    /// Append a task to its lane.
    pub fn add(&mut self, task: NewTask) -> Result<Task> {
        match self.request(Request::Add { task })? {
            Response::Task { task } => Ok(task),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Remove a task. Returns `None` when the daemon does not know the id.
    pub fn remove(&mut self, id: u64) -> Result<Option<Task>> {
        match self.request(Request::Remove { id })? {
            Response::Task { task } => Ok(Some(task)),
            Response::NotFound { .. } => Ok(None),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Move a task, optionally in front of `target`.
    pub fn move_task(&mut self, task: Task, target: Option<Task>) -> Result<Option<Task>> {
        match self.request(Request::Move { task, target })? {
            Response::Task { task } => Ok(Some(task)),
            Response::NotFound { .. } => Ok(None),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Get a task by ID.
    pub fn get(&mut self, id: u64) -> Result<Option<Task>> {
        match self.request(Request::Get { id })? {
            Response::Task { task } => Ok(Some(task)),
            Response::NotFound { .. } => Ok(None),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// List all tasks, or one lane sorted by position.
    pub fn list(&mut self, lane: Option<&str>) -> Result<Vec<Task>> {
        match self.request(Request::List {
            lane: lane.map(String::from),
        })? {
            Response::Tasks { tasks } => Ok(tasks),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Every lane with its sorted tasks.
    pub fn lanes(&mut self) -> Result<BTreeMap<String, Vec<Task>>> {
        match self.request(Request::Lanes)? {
            Response::Lanes { lanes } => Ok(lanes),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Flush pending writes to disk.
    pub fn flush(&mut self) -> Result<()> {
        match self.request(Request::Flush)? {
            Response::Ok => Ok(()),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Shutdown the daemon.
    pub fn shutdown(&mut self) -> Result<()> {
        match self.request(Request::Shutdown)? {
            Response::Ok => Ok(()),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }

    /// Ping the daemon.
    pub fn ping(&mut self) -> Result<()> {
        match self.request(Request::Ping)? {
            Response::Pong => Ok(()),
            Response::Error { message } => bail!("{}", message),
            _ => bail!("Unexpected response"),
        }
    }
}
