use std::io::{ErrorKind, Write};
use std::process::{Command, Stdio};
use std::thread;

use crate::error::JqError;

/// Run `jq -M <filter>` over a JSON document and return what it prints.
pub(crate) fn filter_json(json: &str, filter: &str) -> Result<String, JqError> {
    let mut child = Command::new("jq")
        .args(["-M", filter])
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .map_err(|e| match e.kind() {
            ErrorKind::NotFound => JqError::NotFound,
            _ => JqError::Spawn(e),
        })?;

    // Feed stdin from its own thread while stdout is drained, so neither pipe
    // can fill up and stall the other. Dropping stdin closes it for EOF.
    let stdin = child.stdin.take();
    let (written, output) = thread::scope(|scope| {
        let writer = scope.spawn(move || match stdin {
            Some(mut stdin) => stdin.write_all(json.as_bytes()),
            None => Ok(()),
        });
        let output = child.wait_with_output();
        (writer.join(), output)
    });

    let output = output.map_err(JqError::Wait)?;
    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(JqError::Filter(stderr.trim().to_string()));
    }
    if let Ok(Err(e)) = written {
        return Err(JqError::Stdin(e));
    }
    String::from_utf8(output.stdout).map_err(JqError::Utf8)
}
