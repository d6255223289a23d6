use std::io::{BufRead, BufReader, Write};
use std::process::{Child, Command, Stdio};

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::MatchError;
use crate::page::element::Locator;

/// A live, stateful page the search can drive. Calls block.
pub trait Session {
    fn open(&mut self, url: &str) -> Result<(), MatchError>;
    fn enter(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError>;
    fn select(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError>;
    fn click(&mut self, locator: &Locator) -> Result<(), MatchError>;
    /// Rendered markup of the current page.
    fn read_markup(&mut self) -> Result<String, MatchError>;
    fn close(&mut self) -> Result<(), MatchError>;
}

/// Creates fresh sessions.
pub trait SessionLauncher {
    fn launch(&mut self) -> Result<Box<dyn Session>, MatchError>;
}

// ============================================================================
// Scoped ownership
// ============================================================================

/// Owns the one active session and closes it when dropped.
pub struct SessionGuard {
    session: Option<Box<dyn Session>>,
}

impl SessionGuard {
    pub fn launch(launcher: &mut dyn SessionLauncher) -> Result<Self, MatchError> {
        Ok(Self {
            session: Some(launcher.launch()?),
        })
    }

    pub fn session(&mut self) -> Result<&mut (dyn Session + 'static), MatchError> {
        match self.session.as_deref_mut() {
            Some(session) => Ok(session),
            None => Err(MatchError::SessionIO("no active session".into())),
        }
    }

    /// Close the current session and start a new one.
    pub fn relaunch(&mut self, launcher: &mut dyn SessionLauncher) -> Result<(), MatchError> {
        self.close();
        self.session = Some(launcher.launch()?);
        Ok(())
    }

    pub fn close(&mut self) {
        if let Some(mut session) = self.session.take() {
            if let Err(e) = session.close() {
                warn!(error = %e, "failed to close session cleanly");
            }
        }
    }
}

impl Drop for SessionGuard {
    fn drop(&mut self) {
        self.close();
    }
}

// ============================================================================
// Browser server protocol
// ============================================================================

/// Request sent to the browser server over stdin (one JSON line).
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum BrowserRequest {
    Open {
        cmd: &'static str,
        url: String,
    },
    Interact {
        cmd: &'static str,
        locator: Locator,
        #[serde(skip_serializing_if = "Option::is_none")]
        value: Option<String>,
    },
    Simple {
        cmd: &'static str,
    },
}

impl BrowserRequest {
    pub fn open(url: &str) -> Self {
        BrowserRequest::Open {
            cmd: "open",
            url: url.to_string(),
        }
    }

    pub fn enter(locator: &Locator, value: &str) -> Self {
        BrowserRequest::Interact {
            cmd: "enter",
            locator: locator.clone(),
            value: Some(value.to_string()),
        }
    }

    pub fn select(locator: &Locator, value: &str) -> Self {
        BrowserRequest::Interact {
            cmd: "select",
            locator: locator.clone(),
            value: Some(value.to_string()),
        }
    }

    pub fn click(locator: &Locator) -> Self {
        BrowserRequest::Interact {
            cmd: "click",
            locator: locator.clone(),
            value: None,
        }
    }

    pub fn markup() -> Self {
        BrowserRequest::Simple { cmd: "markup" }
    }

    pub fn accept_dialog() -> Self {
        BrowserRequest::Simple {
            cmd: "accept_dialog",
        }
    }

    pub fn quit() -> Self {
        BrowserRequest::Simple { cmd: "quit" }
    }

    pub fn command(&self) -> &'static str {
        match self {
            BrowserRequest::Open { cmd, .. }
            | BrowserRequest::Interact { cmd, .. }
            | BrowserRequest::Simple { cmd } => cmd,
        }
    }
}

/// Response received from the browser server over stdout (one JSON line).
#[derive(Debug, Default, Deserialize)]
pub struct BrowserResponse {
    pub ok: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// A modal dialog blocked the command
    #[serde(default)]
    pub dialog: Option<bool>,
    #[serde(default)]
    pub markup: Option<String>,
    #[serde(default)]
    pub ready: Option<bool>,
}

impl BrowserResponse {
    pub fn blocked_by_dialog(&self) -> bool {
        self.dialog == Some(true)
    }
}

/// A browser held open by a long-lived server subprocess.
///
/// Commands are written as NDJSON to its stdin, answers read from its stdout.
pub struct BrowserSession {
    child: Child,
    stdin: std::process::ChildStdin,
    reader: BufReader<std::process::ChildStdout>,
    closed: bool,
}

impl BrowserSession {
    /// Spawn `program script` and wait for its ready line.
    pub fn launch(program: &str, script: &str) -> Result<Self, MatchError> {
        let mut child = Command::new(program)
            .arg(script)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::inherit())
            .spawn()
            .map_err(|e| MatchError::SubprocessSpawn {
                program: format!("{} {}", program, script),
                source: e,
            })?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| MatchError::SessionIO("Failed to capture browser server stdin".into()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| MatchError::SessionIO("Failed to capture browser server stdout".into()))?;

        let mut session = BrowserSession {
            child,
            stdin,
            reader: BufReader::new(stdout),
            closed: false,
        };

        let response = session.read_response("browser server ready signal")?;
        if !response.ok || response.ready != Some(true) {
            return Err(MatchError::SessionProtocol {
                command: "launch".into(),
                error: "Did not receive ready signal from browser server".into(),
            });
        }

        debug!(program, script, "browser session ready");
        Ok(session)
    }

    fn read_response(&mut self, context: &str) -> Result<BrowserResponse, MatchError> {
        let mut line = String::new();
        self.reader
            .read_line(&mut line)
            .map_err(|e| MatchError::SessionIO(format!("Failed to read from browser server: {}", e)))?;

        if line.trim().is_empty() {
            return Err(MatchError::SessionIO(
                "Empty response from browser server (process may have died)".into(),
            ));
        }

        serde_json::from_str(line.trim()).map_err(|e| MatchError::JsonParse {
            context: context.into(),
            source: e,
        })
    }

    fn send(&mut self, request: &BrowserRequest) -> Result<BrowserResponse, MatchError> {
        let json = serde_json::to_string(request).map_err(|e| MatchError::JsonSerialize {
            context: "BrowserRequest".into(),
            source: e,
        })?;

        writeln!(self.stdin, "{}", json)
            .and_then(|_| self.stdin.flush())
            .map_err(|e| MatchError::SessionIO(format!("Failed to write to browser server: {}", e)))?;

        self.read_response("browser server response")
    }

    /// Send a request, accepting one blocking dialog and retrying once.
    ///
    /// `None` means a dialog was in the way and could not be dismissed.
    fn send_dismissing(&mut self, request: &BrowserRequest) -> Result<Option<BrowserResponse>, MatchError> {
        let response = self.send(request)?;
        if !response.blocked_by_dialog() {
            return Ok(Some(response));
        }

        let accepted = self.send(&BrowserRequest::accept_dialog())?;
        if !accepted.ok {
            debug!(command = request.command(), "no dialog to accept");
            return Ok(None);
        }
        info!(command = request.command(), "dialog accepted");

        let retry = self.send(request)?;
        Ok((!retry.blocked_by_dialog()).then_some(retry))
    }

    fn navigate_or_read(&mut self, request: &BrowserRequest) -> Result<Option<BrowserResponse>, MatchError> {
        match self.send_dismissing(request)? {
            Some(response) if !response.ok => Err(MatchError::SessionProtocol {
                command: request.command().into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            }),
            other => Ok(other),
        }
    }

    fn interact(&mut self, request: &BrowserRequest) -> Result<(), MatchError> {
        match self.send_dismissing(request)? {
            Some(response) if !response.ok => Err(MatchError::Interaction {
                command: request.command().into(),
                error: response.error.unwrap_or_else(|| "Unknown error".into()),
            }),
            _ => Ok(()),
        }
    }
}

impl Session for BrowserSession {
    fn open(&mut self, url: &str) -> Result<(), MatchError> {
        self.navigate_or_read(&BrowserRequest::open(url))?;
        Ok(())
    }

    fn enter(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError> {
        self.interact(&BrowserRequest::enter(locator, value))
    }

    fn select(&mut self, locator: &Locator, value: &str) -> Result<(), MatchError> {
        self.interact(&BrowserRequest::select(locator, value))
    }

    fn click(&mut self, locator: &Locator) -> Result<(), MatchError> {
        self.interact(&BrowserRequest::click(locator))
    }

    fn read_markup(&mut self) -> Result<String, MatchError> {
        let response = self.navigate_or_read(&BrowserRequest::markup())?;
        Ok(response.and_then(|r| r.markup).unwrap_or_default())
    }

    fn close(&mut self) -> Result<(), MatchError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        // Best-effort: the server may already be gone
        let _ = self.send(&BrowserRequest::quit());
        let _ = self.child.wait();
        Ok(())
    }
}

impl Drop for BrowserSession {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

/// Launches `BrowserSession`s from a fixed command line.
#[derive(Debug, Clone)]
pub struct BrowserLauncher {
    pub program: String,
    pub script: String,
}

impl BrowserLauncher {
    pub fn new(program: &str, script: &str) -> Self {
        Self {
            program: program.to_string(),
            script: script.to_string(),
        }
    }
}

impl SessionLauncher for BrowserLauncher {
    fn launch(&mut self) -> Result<Box<dyn Session>, MatchError> {
        Ok(Box::new(BrowserSession::launch(&self.program, &self.script)?))
    }
}
