/*
    External commands used by the folding workers
        predictor: CONTRAfold binary
        dotbracket converter: fold2dotbracketFasta.py through the python interpreter
        element converter: rnaConvert.py through the python interpreter
    Every invocation runs inside the worker's scratch directory,
    stderr is kept for the error report, stdout is discarded
    With a timeout each tool gets its own process group, so a kill
    also reaches whatever the tool started itself
*/

use std::fs::{self, File};
use std::io::{self, ErrorKind};
use std::path::Path;
use std::process::{Child, Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};
use log::{debug, trace, warn};
use super::errors::{ConversionStage, FoldError, Result, ToolStage};

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// A program plus the arguments that always precede the per-call ones
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolCommand {
    pub program: String,
    pub args: Vec<String>,
}

impl ToolCommand {
    pub fn new(program: impl Into<String>) -> Self {
        Self { program: program.into(), args: Vec::new() }
    }

    /// `interpreter script`, e.g. `python rnaConvert.py`
    pub fn script(interpreter: impl Into<String>, script: &Path) -> Self {
        Self {
            program: interpreter.into(),
            args: vec![script.to_string_lossy().into_owned()],
        }
    }

    pub fn describe(&self) -> String {
        std::iter::once(self.program.as_str())
            .chain(self.args.iter().map(String::as_str))
            .collect::<Vec<_>>()
            .join(" ")
    }
}

#[derive(Debug, Clone)]
pub struct ToolChain {
    pub predictor: ToolCommand,
    pub dotbracket: ToolCommand,
    pub element: ToolCommand,
    pub timeout: Option<Duration>,
}

impl ToolChain {
    pub fn command_for(&self, stage: ToolStage) -> &ToolCommand {
        match stage {
            ToolStage::Prediction => &self.predictor,
            ToolStage::Conversion(ConversionStage::DotBracket) => &self.dotbracket,
            ToolStage::Conversion(ConversionStage::Element) => &self.element,
        }
    }
}

#[derive(Debug)]
pub struct ToolRun {
    pub status: ExitStatus,
    pub stderr: String,
}

impl ToolRun {
    pub fn success(&self) -> bool {
        self.status.success()
    }
}

/// Run one stage of the chain for `index` and wait for it
pub fn run_tool(tools: &ToolChain, stage: ToolStage, index: usize, args: &[String],
                workdir: &Path) -> Result<ToolRun> {
    let tool = tools.command_for(stage);
    let stderr_path = workdir.join(format!("{stage}.stderr"));
    let stderr_file = File::create(&stderr_path)?;
    trace!("bit_{index} {stage}: {} {}", tool.describe(), args.join(" "));
    let mut command = Command::new(&tool.program);
    command.args(&tool.args)
        .args(args)
        .current_dir(workdir)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::from(stderr_file));
    if tools.timeout.is_some() {
        own_process_group(&mut command);
    }
    let child = command.spawn()
        .map_err(|e| {
            if e.kind() == ErrorKind::NotFound {
                FoldError::ToolNotFound { index, stage, executable: tool.program.clone() }
            } else {
                FoldError::Io(e)
            }
        })?;
    let status = match tools.timeout {
        Some(limit) => wait_with_timeout(child, limit)?
            .ok_or(FoldError::ToolTimedOut { index, stage, seconds: limit.as_secs() })?,
        None => {
            let mut child = child;
            child.wait()?
        }
    };
    let stderr = fs::read(&stderr_path)
        .map(|bytes| String::from_utf8_lossy(&bytes).into_owned())
        .unwrap_or_default();
    debug!("bit_{index} {stage} exited with {status}");
    Ok(ToolRun { status, stderr })
}

// None when the child had to be killed
fn wait_with_timeout(mut child: Child, limit: Duration) -> io::Result<Option<ExitStatus>> {
    let deadline = Instant::now() + limit;
    loop {
        if let Some(status) = child.try_wait()? {
            return Ok(Some(status));
        }
        if Instant::now() >= deadline {
            warn!("Killing process {} after {:?}", child.id(), limit);
            kill_group(&mut child)?;
            child.wait()?;
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    }
}

#[cfg(unix)]
fn own_process_group(command: &mut Command) {
    use std::os::unix::process::CommandExt;
    command.process_group(0);
}

#[cfg(not(unix))]
fn own_process_group(_command: &mut Command) {}

// the group id is the child's pid; fall back to the child alone
#[cfg(unix)]
fn kill_group(child: &mut Child) -> io::Result<()> {
    let group = format!("-{}", child.id());
    let killed = Command::new("kill")
        .args(["-KILL", "--", &group])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    match killed {
        Ok(status) if status.success() => Ok(()),
        _ => child.kill(),
    }
}

#[cfg(not(unix))]
fn kill_group(child: &mut Child) -> io::Result<()> {
    child.kill()
}
