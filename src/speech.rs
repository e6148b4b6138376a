use tokio::process::Command;
use tokio::runtime::Handle;
use tracing::debug;

/// Speaks `text` through the platform speech command on a detached task.
/// Fire-and-forget: completion is unobserved and every fault is ignored.
pub fn speak(handle: &Handle, text: String) {
    handle.spawn(async move {
        let mut command = platform_command(&text);
        match command.output().await {
            Ok(output) if !output.status.success() => {
                debug!(status = %output.status, "speech command exited nonzero");
            }
            Ok(_) => {}
            Err(err) => debug!(%err, "speech command unavailable"),
        }
    });
}

#[cfg(target_os = "macos")]
fn platform_command(text: &str) -> Command {
    let mut command = Command::new("say");
    command.arg(text);
    command
}

#[cfg(target_os = "windows")]
fn platform_command(text: &str) -> Command {
    let mut command = Command::new("powershell");
    command.args([
        "-NoProfile",
        "-Command",
        &format!(
            "Add-Type -AssemblyName System.Speech; (New-Object System.Speech.Synthesis.SpeechSynthesizer).Speak('{}')",
            text.replace('\'', "''")
        ),
    ]);
    command
}

#[cfg(not(any(target_os = "macos", target_os = "windows")))]
fn platform_command(text: &str) -> Command {
    let mut command = Command::new("espeak");
    command.arg(text);
    command
}
