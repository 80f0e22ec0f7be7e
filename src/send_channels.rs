use std::path::PathBuf;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use anyhow::Context;
use crossbeam_channel::{Receiver, Sender};
use crate::common::Detection;
use crate::detectors::DetectionSession;
use crate::error::DetectError;

pub type DetectionReply = crate::Result<Vec<Detection>>;

#[derive(Debug, Clone)]
pub enum ImageInput {
    Path(PathBuf),
    Bytes(Vec<u8>),
}

#[derive(Debug)]
pub struct DetectionRequest {
    pub input: ImageInput,
    pub reply: Sender<DetectionReply>,
}

/// A thread that owns detection for one session and serves requests in arrival order.
#[derive(Debug)]
pub struct DetectionWorker {
    opt_tx: Option<Sender<DetectionRequest>>,
    handle: Option<JoinHandle<()>>,
}

impl DetectionWorker {
    pub fn spawn(session: Arc<DetectionSession>) -> anyhow::Result<Self> {
        let (opt_tx, opt_rx) = crossbeam_channel::unbounded::<DetectionRequest>();
        let name = format!("yolo-{}", session.backend().str_lowercase());
        let handle = thread::Builder::new()
            .name(name)
            .spawn(move || run(session, opt_rx))
            .context("failed to spawn detection worker")?;
        Ok(Self { opt_tx: Some(opt_tx), handle: Some(handle) })
    }

    /// Queues `input`; the answer arrives on the returned receiver.
    pub fn submit(&self, input: ImageInput) -> crate::Result<Receiver<DetectionReply>> {
        let (reply, det_rx) = crossbeam_channel::bounded(1);
        let opt_tx = self
            .opt_tx
            .as_ref()
            .ok_or_else(|| DetectError::WorkerFailed("worker is shut down".to_string()))?;
        opt_tx
            .send(DetectionRequest { input, reply })
            .map_err(|_| DetectError::WorkerFailed("worker thread has exited".to_string()))?;
        Ok(det_rx)
    }

    pub fn detect(&self, input: ImageInput) -> DetectionReply {
        self.submit(input)?
            .recv()
            .map_err(|_| DetectError::WorkerFailed("worker dropped the request".to_string()))?
    }

    /// Stops accepting requests, lets queued ones finish and joins the thread.
    pub fn shutdown(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        self.opt_tx.take();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Detection worker panicked");
            }
        }
    }
}

impl Drop for DetectionWorker {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run(session: Arc<DetectionSession>, opt_rx: Receiver<DetectionRequest>) {
    // MESSAGE LOOP STARTS HERE
    for request in opt_rx.iter() {
        let result = match &request.input {
            ImageInput::Path(path) => session.detect_path(path),
            ImageInput::Bytes(bytes) => session.detect_bytes(bytes),
        };
        if let Err(e) = &result {
            log::error!("Detection failed: {}", e);
        }
        if request.reply.send(result).is_err() {
            log::debug!("Caller stopped waiting for a detection reply");
        }
    }
    log::debug!("Detection worker for {} backend stopped", session.backend());
}
