//! Named-pipe [`CommandSource`] implementation.
//!
//! Creates a FIFO on the filesystem and reads newline-delimited plain-text
//! commands from it.  Any process that can open the pipe for writing can
//! drive the tray icons:
//!
//! ```sh
//! echo "clock set-icon /usr/share/icons/clock.png" > multitray.fifo
//! echo "clock set-tooltip 3 unread messages"       > multitray.fifo
//! echo "clock show"                                > multitray.fifo
//! ```
//!
//! # FIFO end-of-file
//!
//! Reading from a FIFO returns EOF whenever the last writer closes its end.
//! That means "no writer right now", not "stream over", so the source closes
//! and reopens the pipe after every EOF, blocking in `open` until the next
//! writer attaches.

use crate::command::Command;
use crate::traits::CommandSource;
use log::{debug, error, info};
use std::ffi::CString;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader};
use std::os::unix::ffi::OsStrExt;
use std::os::unix::fs::{FileTypeExt, OpenOptionsExt};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};

/// A [`CommandSource`] that reads plain-text commands from a named pipe.
///
/// The pipe is created by [`create`](FifoSource::create) so that an unusable
/// path fails on the main thread, before the read loop is spawned.  Several
/// writers can take turns; the source survives each one closing its end.
pub struct FifoSource {
    path: PathBuf,
    stop: Arc<AtomicBool>,
}

/// Errors produced by the named-pipe source.
#[derive(Debug, thiserror::Error)]
pub enum FifoError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("{0} exists and is not a fifo")]
    NotAFifo(PathBuf),
}

/// Thin wrapper around `libc::mkfifo`.
fn mkfifo(path: &Path, mode: libc::mode_t) -> std::io::Result<()> {
    let cpath = CString::new(path.as_os_str().as_bytes())
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidInput, e))?;
    let rc = unsafe { libc::mkfifo(cpath.as_ptr(), mode) };
    if rc == 0 {
        Ok(())
    } else {
        Err(std::io::Error::last_os_error())
    }
}

/// Wake a reader blocked in `open` by briefly opening the write side.
///
/// Opening a FIFO write-only with `O_NONBLOCK` succeeds as soon as a reader
/// has the pipe open (including one still blocked in `open`) and fails with
/// `ENXIO` when there is none, so this never blocks the caller.  Call it
/// after setting the stop flag to let a parked [`FifoSource`] notice it.
pub fn nudge(path: &Path) -> std::io::Result<()> {
    OpenOptions::new()
        .write(true)
        .custom_flags(libc::O_NONBLOCK)
        .open(path)
        .map(|_| ())
}

impl FifoSource {
    /// Create the FIFO at `path` (mode `0600`) and return a source reading
    /// from it.
    ///
    /// An existing FIFO at `path` is reused, so writers already blocked on it
    /// stay attachable.  If `path` exists but is not a FIFO this fails with
    /// [`FifoError::NotAFifo`].  The `stop` flag is checked between read
    /// cycles; set it and [`nudge`] the pipe to shut the source down.
    pub fn create(path: impl AsRef<Path>, stop: Arc<AtomicBool>) -> Result<Self, FifoError> {
        let path = path.as_ref().to_path_buf();
        match mkfifo(&path, 0o600) {
            Ok(()) => info!("created fifo at {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let meta = std::fs::metadata(&path)?;
                if !meta.file_type().is_fifo() {
                    return Err(FifoError::NotAFifo(path));
                }
                debug!("reusing existing fifo at {}", path.display());
            }
            Err(e) => return Err(FifoError::Io(e)),
        }
        Ok(Self { path, stop })
    }

    /// The filesystem path of the pipe.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CommandSource for FifoSource {
    type Error = FifoError;

    /// Open the pipe and start reading commands.
    ///
    /// This method **blocks** indefinitely.  Run it on a dedicated thread.
    fn run(&mut self, sink: mpsc::Sender<Command>) -> Result<(), Self::Error> {
        info!("reading commands from {}", self.path.display());

        loop {
            if self.stop.load(Ordering::SeqCst) {
                debug!("stop requested, exiting read loop");
                return Ok(());
            }

            // Blocks until a writer opens the other end (or a nudge arrives).
            let file = match File::open(&self.path) {
                Ok(f) => f,
                Err(e) => {
                    if self.stop.load(Ordering::SeqCst) {
                        return Ok(());
                    }
                    return Err(e.into());
                }
            };
            if self.stop.load(Ordering::SeqCst) {
                debug!("stop requested, exiting read loop");
                return Ok(());
            }

            debug!("writer connected");
            let reader = BufReader::new(file);
            for line in reader.lines() {
                match line {
                    Ok(ref text) if text.trim().is_empty() => continue,
                    Ok(text) => match Command::parse(&text) {
                        Ok(cmd) => {
                            debug!("received {:?}", cmd);
                            if sink.send(cmd).is_err() {
                                info!("sink closed, shutting down");
                                return Ok(());
                            }
                        }
                        Err(e) => {
                            error!("bad command {:?}: {}", text, e);
                        }
                    },
                    Err(e) => {
                        error!("read error: {}", e);
                        break;
                    }
                }
            }
            debug!("writers gone, reopening");
        }
    }
}

//  Tests 

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::Action;
    use std::io::Write;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Monotonic counter to generate unique pipe paths per test.
    static TEST_ID: AtomicU32 = AtomicU32::new(0);

    /// Helper: create a unique temporary pipe path for each test.
    fn tmp_fifo_path() -> PathBuf {
        let id = TEST_ID.fetch_add(1, Ordering::SeqCst);
        let dir = std::env::temp_dir();
        dir.join(format!("multitray-test-{}-{}.fifo", std::process::id(), id))
    }

    /// Helper: spawn a source reading from `path`, returning the command
    /// receiver, the stop flag, and the thread handle.
    fn spawn_source(
        path: &Path,
    ) -> (
        mpsc::Receiver<Command>,
        Arc<AtomicBool>,
        std::thread::JoinHandle<Result<(), FifoError>>,
    ) {
        let stop = Arc::new(AtomicBool::new(false));
        let mut source = FifoSource::create(path, stop.clone()).expect("create fifo");
        let (tx, rx) = mpsc::channel();
        let handle = std::thread::spawn(move || source.run(tx));
        // Give the reader a moment to block in open.
        std::thread::sleep(std::time::Duration::from_millis(150));
        (rx, stop, handle)
    }

    /// Helper: stop the source and wait for its thread to exit.
    fn stop_source(
        path: &Path,
        stop: &Arc<AtomicBool>,
        handle: std::thread::JoinHandle<Result<(), FifoError>>,
    ) {
        stop.store(true, Ordering::SeqCst);
        let _ = nudge(path);
        handle.join().expect("reader thread").expect("run");
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn commands_flow_through_fifo_in_order() {
        let path = tmp_fifo_path();
        let (rx, stop, handle) = spawn_source(&path);

        {
            let mut pipe = OpenOptions::new().write(true).open(&path).expect("open");
            writeln!(pipe, "clock set-icon /tmp/a.png").unwrap();
            writeln!(pipe, "clock set-tooltip hello   world").unwrap();
            writeln!(pipe, "clock show").unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(150));

        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 3);
        assert_eq!(cmds[0].action, Action::SetIcon("/tmp/a.png".into()));
        assert_eq!(cmds[1].action, Action::SetTooltip("hello world".into()));
        assert_eq!(cmds[2].action, Action::Show);

        stop_source(&path, &stop, handle);
    }

    #[test]
    fn malformed_lines_do_not_kill_the_reader() {
        let path = tmp_fifo_path();
        let (rx, stop, handle) = spawn_source(&path);

        {
            let mut pipe = OpenOptions::new().write(true).open(&path).expect("open");
            writeln!(pipe, "not-a-command").unwrap();
            writeln!(pipe, "clock flip").unwrap();
            writeln!(pipe).unwrap();
            writeln!(pipe, "clock show").unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(150));

        // Only the valid command should have arrived.
        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 1);
        assert_eq!(cmds[0].action, Action::Show);

        stop_source(&path, &stop, handle);
    }

    #[test]
    fn survives_writer_eof_and_accepts_the_next_writer() {
        let path = tmp_fifo_path();
        let (rx, stop, handle) = spawn_source(&path);

        {
            let mut pipe = OpenOptions::new().write(true).open(&path).expect("open");
            writeln!(pipe, "a show").unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(150));
        {
            let mut pipe = OpenOptions::new().write(true).open(&path).expect("reopen");
            writeln!(pipe, "b show").unwrap();
        }
        std::thread::sleep(std::time::Duration::from_millis(150));

        let cmds: Vec<Command> = rx.try_iter().collect();
        assert_eq!(cmds.len(), 2);
        assert_eq!(cmds[0].tray, "a");
        assert_eq!(cmds[1].tray, "b");

        stop_source(&path, &stop, handle);
    }

    #[test]
    fn stop_and_nudge_unblock_a_parked_reader() {
        let path = tmp_fifo_path();
        let (_rx, stop, handle) = spawn_source(&path);

        // No writer ever attaches; the reader is parked in open.
        stop.store(true, Ordering::SeqCst);
        nudge(&path).expect("nudge");
        handle.join().expect("reader thread").expect("run");

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn non_fifo_path_is_rejected() {
        let path = tmp_fifo_path();
        std::fs::write(&path, "plain file").unwrap();

        let stop = Arc::new(AtomicBool::new(false));
        let err = FifoSource::create(&path, stop);
        assert!(matches!(err, Err(FifoError::NotAFifo(_))));

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn nudge_without_reader_fails() {
        let path = tmp_fifo_path();
        let stop = Arc::new(AtomicBool::new(false));
        let _source = FifoSource::create(&path, stop).expect("create fifo");

        // Nobody is reading, so the non-blocking write-side open reports ENXIO.
        assert!(nudge(&path).is_err());

        let _ = std::fs::remove_file(&path);
    }
}
