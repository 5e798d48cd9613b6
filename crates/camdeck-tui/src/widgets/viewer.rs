//! Stream viewer — the one externally-visible resource the console owns.
//!
//! Playback happens in an external player process (mpv by default) bound
//! to a gateway or recording URL. The invariant: at most one viewer
//! exists, and it is always explicitly released — on replacement, on
//! screen switch, and on app exit — so the streaming gateway never keeps
//! an orphaned transport connection alive. `kill_on_drop` backstops every
//! path that loses the handle.

use tokio::process::{Child, Command};
use tracing::{debug, warn};
use url::Url;

pub struct StreamViewer {
    player: String,
    active: Option<ActiveViewer>,
}

struct ActiveViewer {
    title: String,
    child: Child,
}

impl StreamViewer {
    pub fn new(player: String) -> Self {
        Self {
            player,
            active: None,
        }
    }

    /// Spawn the player for `url`, releasing any previous viewer first.
    pub fn open(&mut self, title: &str, url: &Url) -> std::io::Result<()> {
        self.release();

        debug!(player = %self.player, title, %url, "opening stream viewer");
        let child = Command::new(&self.player)
            .arg(url.as_str())
            .stdin(std::process::Stdio::null())
            .stdout(std::process::Stdio::null())
            .stderr(std::process::Stdio::null())
            .kill_on_drop(true)
            .spawn()?;

        self.active = Some(ActiveViewer {
            title: title.to_owned(),
            child,
        });
        Ok(())
    }

    /// Kill the player and drop the handle. Idempotent.
    pub fn release(&mut self) {
        if let Some(mut viewer) = self.active.take() {
            debug!(title = %viewer.title, "releasing stream viewer");
            if let Err(e) = viewer.child.start_kill() {
                // Already exited is fine; anything else is worth a log line.
                warn!(error = %e, "failed to kill viewer process");
            }
        }
    }

    /// Drop the handle if the player exited on its own (user closed the
    /// window). Called from the app's tick.
    pub fn reap(&mut self) {
        let exited = match &mut self.active {
            Some(viewer) => matches!(viewer.child.try_wait(), Ok(Some(_))),
            None => false,
        };
        if exited {
            debug!("viewer process exited on its own");
            self.active = None;
        }
    }

    /// Title of the stream currently playing, if any.
    pub fn active_title(&self) -> Option<&str> {
        self.active.as_ref().map(|v| v.title.as_str())
    }
}

impl Drop for StreamViewer {
    fn drop(&mut self) {
        self.release();
    }
}
