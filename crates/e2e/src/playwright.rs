//! Playwright browser automation
//!
//! A single long-lived `node` process hosts the browser. Rust writes one JSON
//! request per line to its stdin and reads one JSON response per line from
//! its stdout, so page state (the typed field, the remote engine's output)
//! survives across operations.

use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::time::Duration;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines};
use tokio::process::{Child, ChildStdin, ChildStdout, Command as TokioCommand};
use tracing::{debug, info, warn};

use crate::error::{E2eError, E2eResult};
use crate::page::{BrowserPage, FieldPredicate, LoadState};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    pub fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }

    /// Parse a browser name, defaulting to Chromium for anything unknown
    pub fn from_name(name: &str) -> Self {
        match name.to_ascii_lowercase().as_str() {
            "firefox" => Browser::Firefox,
            "webkit" => Browser::Webkit,
            _ => Browser::Chromium,
        }
    }
}

/// Configuration for Playwright
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PlaywrightConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,

    /// How long the bridge may take to launch the browser
    pub launch_timeout_secs: u64,

    /// `NODE_PATH` for resolving the `playwright` package
    pub node_path: Option<PathBuf>,
}

impl Default for PlaywrightConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
            launch_timeout_secs: 30,
            node_path: None,
        }
    }
}

const BRIDGE_TEMPLATE: &str = r#"
const readline = require('readline');
const playwright = require('playwright');

const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');

(async () => {
  const browser = await playwright['__BROWSER__'].launch({ headless: __HEADLESS__ });
  const context = await browser.newContext({
    viewport: { width: __WIDTH__, height: __HEIGHT__ }
  });
  const page = await context.newPage();

  const handle = async (cmd) => {
    switch (cmd.op) {
      case 'goto':
        await page.goto(cmd.url, { waitUntil: cmd.wait_until });
        return null;
      case 'wait_visible':
        await page.locator(cmd.selector).waitFor({ state: 'visible', timeout: cmd.timeout_ms });
        return null;
      case 'fill':
        await page.locator(cmd.selector).fill(cmd.value);
        return null;
      case 'type':
        await page.locator(cmd.selector).pressSequentially(cmd.text, { delay: cmd.delay_ms });
        return null;
      case 'input_value':
        return await page.locator(cmd.selector).inputValue();
      case 'wait_for_function': {
        const predicate = eval('(' + cmd.predicate + ')');
        await page.waitForFunction(predicate, cmd.selector, { timeout: cmd.timeout_ms ?? 0 });
        return null;
      }
      case 'click':
        await page.locator(cmd.selector).click();
        return null;
      case 'press':
        await page.keyboard.press(cmd.key);
        return null;
      case 'wait_for_timeout':
        await page.waitForTimeout(cmd.ms);
        return null;
      case 'close':
        return null;
      default:
        throw new Error('unknown op: ' + cmd.op);
    }
  };

  reply({ ready: true });

  const rl = readline.createInterface({ input: process.stdin });
  for await (const line of rl) {
    if (!line.trim()) continue;
    const cmd = JSON.parse(line);
    try {
      const value = await handle(cmd);
      reply({ id: cmd.id, ok: true, value });
    } catch (error) {
      reply({ id: cmd.id, ok: false, error: error.message, timeout: error.name === 'TimeoutError' });
    }
    if (cmd.op === 'close') break;
  }
  await browser.close();
})().catch((error) => {
  reply({ ready: false, error: error.message });
  process.exit(1);
});
"#;

/// Build the bridge script for a configuration
pub fn build_bridge_script(config: &PlaywrightConfig) -> String {
    BRIDGE_TEMPLATE
        .replace("__BROWSER__", config.browser.as_str())
        .replace("__HEADLESS__", if config.headless { "true" } else { "false" })
        .replace("__WIDTH__", &config.viewport_width.to_string())
        .replace("__HEIGHT__", &config.viewport_height.to_string())
}

/// One bridge operation. Field names are the wire names.
#[derive(Debug, Serialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum BridgeOp<'a> {
    Goto { url: &'a str, wait_until: &'static str },
    WaitVisible { selector: &'a str, timeout_ms: u64 },
    Fill { selector: &'a str, value: &'a str },
    Type { selector: &'a str, text: &'a str, delay_ms: u64 },
    InputValue { selector: &'a str },
    WaitForFunction { selector: &'a str, predicate: &'a str, timeout_ms: Option<u64> },
    Click { selector: &'a str },
    Press { key: &'a str },
    WaitForTimeout { ms: u64 },
    Close,
}

#[derive(Debug, Serialize)]
struct BridgeRequest<'a> {
    id: u64,
    #[serde(flatten)]
    op: &'a BridgeOp<'a>,
}

#[derive(Debug, Deserialize)]
struct BridgeResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ready: Option<bool>,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    value: serde_json::Value,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

/// Grace period for the bridge to exit before it is killed
const CLOSE_GRACE: Duration = Duration::from_secs(5);

/// Milliseconds for the wire, saturating instead of truncating
pub fn millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// Encode a request as a single protocol line
pub fn encode_request(id: u64, op: &BridgeOp<'_>) -> E2eResult<String> {
    let mut line = serde_json::to_string(&BridgeRequest { id, op })?;
    line.push('\n');
    Ok(line)
}

/// Playwright browser handle
pub struct PlaywrightHandle {
    child: Child,
    stdin: ChildStdin,
    stdout: Lines<BufReader<ChildStdout>>,
    next_id: u64,

    /// Request whose reply has not been read yet. Still set when a new
    /// request starts means the caller dropped the old one mid-flight and
    /// the reply stream can no longer be trusted.
    in_flight: Option<u64>,
    closed: bool,

    /// Keeps the bridge script alive for the child's lifetime
    _script_dir: Option<tempfile::TempDir>,
}

impl PlaywrightHandle {
    /// Launch the bridge and wait for the browser to come up
    pub async fn launch(config: &PlaywrightConfig) -> E2eResult<Self> {
        Self::check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("bridge.js");
        std::fs::write(&script_path, build_bridge_script(config))?;

        info!(
            "Launching {} (headless: {}) via {}",
            config.browser.as_str(),
            config.headless,
            script_path.display()
        );

        let mut cmd = TokioCommand::new("node");
        cmd.arg(&script_path);
        if let Some(node_path) = &config.node_path {
            cmd.env("NODE_PATH", node_path);
        }

        let mut handle = Self::spawn(cmd, Some(script_dir))?;

        let launch_timeout = Duration::from_secs(config.launch_timeout_secs);
        match tokio::time::timeout(launch_timeout, handle.wait_ready()).await {
            Ok(result) => result?,
            Err(_) => {
                return Err(E2eError::Timeout(format!(
                    "{} launch after {:?}",
                    config.browser.as_str(),
                    launch_timeout
                )))
            }
        }

        Ok(handle)
    }

    /// Start a bridge process without waiting for it to report ready
    fn spawn(mut cmd: TokioCommand, script_dir: Option<tempfile::TempDir>) -> E2eResult<Self> {
        cmd.stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());

        let mut child = cmd.spawn()?;
        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Playwright("bridge stdout unavailable".to_string()))?;

        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    warn!("[bridge] {}", line);
                }
            });
        }

        Ok(Self {
            child,
            stdin,
            stdout: BufReader::new(stdout).lines(),
            next_id: 1,
            in_flight: None,
            closed: false,
            _script_dir: script_dir,
        })
    }

    /// Check if Playwright is installed
    fn check_playwright_installed() -> E2eResult<()> {
        let output = Command::new("npx")
            .args(["playwright", "--version"])
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status();

        match output {
            Ok(status) if status.success() => Ok(()),
            _ => Err(E2eError::PlaywrightNotFound),
        }
    }

    async fn wait_ready(&mut self) -> E2eResult<()> {
        let response = self.read_response().await?;
        if response.ready == Some(true) {
            debug!("Bridge ready");
            Ok(())
        } else {
            Err(E2eError::Playwright(
                response.error.unwrap_or_else(|| "browser launch failed".to_string()),
            ))
        }
    }

    /// Read the next protocol line, skipping anything else the bridge's
    /// dependencies printed to stdout
    async fn read_response(&mut self) -> E2eResult<BridgeResponse> {
        loop {
            let line = self
                .stdout
                .next_line()
                .await?
                .ok_or_else(|| E2eError::Protocol("bridge closed its stdout".to_string()))?;

            match parse_response(&line) {
                Some(response) => return Ok(response),
                None => debug!("[bridge stdout] {}", line),
            }
        }
    }

    async fn request(&mut self, op: BridgeOp<'_>) -> E2eResult<serde_json::Value> {
        if let Some(stale) = self.in_flight {
            return Err(E2eError::Protocol(format!(
                "request {} never received its reply; bridge is out of sync",
                stale
            )));
        }

        let id = self.next_id;
        self.next_id += 1;
        self.in_flight = Some(id);

        let line = encode_request(id, &op)?;
        debug!("-> {}", line.trim_end());
        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.flush().await?;

        let response = self.read_response().await?;
        self.in_flight = None;
        if response.id != Some(id) {
            return Err(E2eError::Protocol(format!(
                "expected response {} but got {:?}",
                id, response.id
            )));
        }

        if response.ok {
            Ok(response.value)
        } else {
            let message = response.error.unwrap_or_else(|| "unknown error".to_string());
            if response.timeout {
                Err(E2eError::Timeout(message))
            } else {
                Err(E2eError::Playwright(message))
            }
        }
    }
}

#[async_trait]
impl BrowserPage for PlaywrightHandle {
    async fn goto(&mut self, url: &str, state: LoadState) -> E2eResult<()> {
        info!("Navigating to {}", url);
        self.request(BridgeOp::Goto { url, wait_until: state.as_str() }).await?;
        Ok(())
    }

    async fn wait_visible(&mut self, selector: &str, timeout: Duration) -> E2eResult<()> {
        let op = BridgeOp::WaitVisible { selector, timeout_ms: millis(timeout) };
        match self.request(op).await {
            Err(E2eError::Timeout(_)) => Err(E2eError::ElementNotVisible {
                selector: selector.to_string(),
                timeout,
            }),
            other => other.map(|_| ()),
        }
    }

    async fn fill(&mut self, selector: &str, value: &str) -> E2eResult<()> {
        self.request(BridgeOp::Fill { selector, value }).await?;
        Ok(())
    }

    async fn type_text(&mut self, selector: &str, text: &str, delay: Duration) -> E2eResult<()> {
        let op = BridgeOp::Type { selector, text, delay_ms: millis(delay) };
        self.request(op).await?;
        Ok(())
    }

    async fn input_value(&mut self, selector: &str) -> E2eResult<String> {
        match self.request(BridgeOp::InputValue { selector }).await? {
            serde_json::Value::String(value) => Ok(value),
            other => Err(E2eError::Protocol(format!("inputValue returned {}", other))),
        }
    }

    async fn wait_for_predicate(
        &mut self,
        selector: &str,
        predicate: &FieldPredicate,
        timeout: Option<Duration>,
    ) -> E2eResult<()> {
        let op = BridgeOp::WaitForFunction {
            selector,
            predicate: predicate.js,
            timeout_ms: timeout.map(millis),
        };
        match self.request(op).await {
            Err(E2eError::Timeout(_)) => Err(E2eError::Timeout(format!(
                "{} on {} after {:?}",
                predicate.name,
                selector,
                timeout.unwrap_or_default()
            ))),
            other => other.map(|_| ()),
        }
    }

    async fn click(&mut self, selector: &str) -> E2eResult<()> {
        self.request(BridgeOp::Click { selector }).await?;
        Ok(())
    }

    async fn press(&mut self, key: &str) -> E2eResult<()> {
        self.request(BridgeOp::Press { key }).await?;
        Ok(())
    }

    async fn wait_for_timeout(&mut self, duration: Duration) -> E2eResult<()> {
        self.request(BridgeOp::WaitForTimeout { ms: millis(duration) }).await?;
        Ok(())
    }

    async fn close(&mut self) -> E2eResult<()> {
        if self.closed {
            return Ok(());
        }
        if let Some(stale) = self.in_flight {
            warn!("Request {} never got a reply; stopping the bridge", stale);
            return self.terminate().await;
        }

        match tokio::time::timeout(CLOSE_GRACE, self.request(BridgeOp::Close)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                warn!("Bridge close failed: {}", e);
                return self.terminate().await;
            }
            Err(_) => {
                warn!("Bridge did not acknowledge close within {:?}", CLOSE_GRACE);
                return self.terminate().await;
            }
        }

        self.closed = true;
        match tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await {
            Ok(status) => {
                debug!("Bridge exited with {}", status?);
                Ok(())
            }
            Err(_) => {
                self.child.kill().await?;
                Ok(())
            }
        }
    }
}

impl PlaywrightHandle {
    /// SIGTERM the bridge, then kill it if it outlives the grace period
    async fn terminate(&mut self) -> E2eResult<()> {
        self.closed = true;

        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(id) = self.child.id() {
                let _ = kill(Pid::from_raw(id as i32), Signal::SIGTERM);
            }
        }

        if tokio::time::timeout(CLOSE_GRACE, self.child.wait()).await.is_err() {
            self.child.kill().await?;
        }
        Ok(())
    }
}

/// Parse a line as a bridge reply. Lines with neither `id` nor `ready`
/// are someone else's output.
fn parse_response(line: &str) -> Option<BridgeResponse> {
    serde_json::from_str::<BridgeResponse>(line)
        .ok()
        .filter(|response| response.id.is_some() || response.ready.is_some())
}

impl Drop for PlaywrightHandle {
    fn drop(&mut self) {
        if self.closed {
            return;
        }

        // SIGTERM lets Playwright close the browser it launched
        #[cfg(unix)]
        {
            use nix::sys::signal::{kill, Signal};
            use nix::unistd::Pid;

            if let Some(id) = self.child.id() {
                if kill(Pid::from_raw(id as i32), Signal::SIGTERM).is_ok() {
                    return;
                }
            }
        }

        let _ = self.child.start_kill();
    }
}
