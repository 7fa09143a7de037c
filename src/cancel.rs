use std::io::{self, BufRead};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

/// one-shot stop flag shared between the stdin listener and the optimizer.
/// set once by the listener, polled once per iteration by the engine.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn cancel(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// block on `input` until a line reading `q` arrives, then cancel.
/// other lines are ignored, including ones that are not valid utf-8.
/// end of input also cancels, otherwise a closed stdin would leave the run
/// with no way to stop and save.
pub fn listen_for_stop<R: BufRead>(mut input: R, token: &CancelToken) -> io::Result<()> {
    let mut line = Vec::new();
    loop {
        line.clear();
        if input.read_until(b'\n', &mut line)? == 0 {
            break;
        }
        if String::from_utf8_lossy(&line).trim() == "q" {
            log::debug!("stop requested");
            token.cancel();
            return Ok(());
        }
    }
    log::info!("input closed, stopping");
    token.cancel();
    Ok(())
}

/// run `listen_for_stop` on stdin in a background thread
pub fn spawn_stdin_listener(token: CancelToken) -> io::Result<thread::JoinHandle<()>> {
    thread::Builder::new()
        .name("stop-listener".to_owned())
        .spawn(move || {
            if let Err(e) = listen_for_stop(io::stdin().lock(), &token) {
                // an unreadable stdin can never deliver `q`
                log::warn!("could not read stdin ({e}), stopping");
                token.cancel();
            }
        })
}
