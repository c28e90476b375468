//! Dedicated worker thread and its message loop

use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

use tilemux_tile::{
    DecodeRequest, DecodeResult, TileFailure, TilePayload, TileService,
};

use crate::boundary::TileDecoder;
use crate::transport::{ByteSource, FetchTarget};

/// What the worker does when a fetch or decode fails.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailurePolicy {
    /// Post nothing; the placeholder stays empty indefinitely
    Silent,
    /// Post an explicit `Failed` outcome so the grid can show an error surface
    Report,
}

impl Default for FailurePolicy {
    fn default() -> Self {
        FailurePolicy::Report
    }
}

/// Worker lifecycle and submission failures.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WorkerError {
    /// The background thread could not be created
    SpawnFailed,
    /// The worker is gone; the request was not delivered
    Disconnected,
}

impl WorkerError {
    /// Human-readable description.
    pub fn message(&self) -> &'static str {
        match self {
            WorkerError::SpawnFailed => "failed to spawn decode worker",
            WorkerError::Disconnected => "decode worker disconnected",
        }
    }
}

/// Cloneable submission handle into the worker.
///
/// Content sources hold one of these rather than the worker itself, so the
/// embedder keeps ownership of the runtime while any number of producers
/// submit requests.
#[derive(Clone)]
pub struct RequestSender(Sender<DecodeRequest>);

impl RequestSender {
    /// Post a request to the worker.
    pub fn submit(&self, request: DecodeRequest) -> Result<(), WorkerError> {
        self.0.send(request).map_err(|_| WorkerError::Disconnected)
    }
}

/// An explicitly constructed, owned decode runtime.
///
/// One dedicated background thread services all requests in arrival order.
/// Results are polled, never pushed: the foreground drains them at its own
/// pace with [`try_recv`](DecodeWorker::try_recv) /
/// [`drain`](DecodeWorker::drain) and feeds them to the grid layer. Dropping
/// the worker disconnects the request channel and joins the thread; requests
/// still queued at that point are lost, which is indistinguishable from a
/// silent failure.
pub struct DecodeWorker {
    tx: Option<Sender<DecodeRequest>>,
    results: Receiver<DecodeResult>,
    thread: Option<JoinHandle<()>>,
}

impl DecodeWorker {
    /// Spawn the worker thread around a decoder and a byte source.
    ///
    /// The worker keeps its own copy of the endpoint configuration for
    /// coordinate-relay requests, mirroring the URL construction the grid
    /// layer performs for its own fetches.
    pub fn spawn<D, B>(
        decoder: D,
        transport: B,
        service: TileService,
        policy: FailurePolicy,
    ) -> Result<Self, WorkerError>
    where
        D: TileDecoder + Send + 'static,
        B: ByteSource + Send + 'static,
    {
        let (tx, rx) = mpsc::channel::<DecodeRequest>();
        let (result_tx, results) = mpsc::channel::<DecodeResult>();

        let thread = thread::Builder::new()
            .name("tile-decode".into())
            .spawn(move || run(decoder, transport, service, policy, rx, result_tx))
            .map_err(|_| WorkerError::SpawnFailed)?;

        Ok(Self {
            tx: Some(tx),
            results,
            thread: Some(thread),
        })
    }

    /// A cloneable handle for submitting requests.
    pub fn sender(&self) -> RequestSender {
        // tx is only None after Drop has begun.
        RequestSender(self.tx.as_ref().cloned().unwrap_or_else(|| {
            let (dead, _) = mpsc::channel();
            dead
        }))
    }

    /// Post a request to the worker.
    pub fn submit(&self, request: DecodeRequest) -> Result<(), WorkerError> {
        match &self.tx {
            Some(tx) => tx.send(request).map_err(|_| WorkerError::Disconnected),
            None => Err(WorkerError::Disconnected),
        }
    }

    /// Take the next pending result, if any. Never blocks.
    pub fn try_recv(&self) -> Option<DecodeResult> {
        match self.results.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) | Err(TryRecvError::Disconnected) => None,
        }
    }

    /// Take every pending result. Never blocks.
    pub fn drain(&self) -> Vec<DecodeResult> {
        let mut out = Vec::new();
        while let Some(result) = self.try_recv() {
            out.push(result);
        }
        out
    }

    /// Wait up to `timeout` for the next result.
    ///
    /// The pipeline itself never blocks; this exists for embedders and tests
    /// that drive the worker without an event loop.
    pub fn recv_timeout(&self, timeout: Duration) -> Option<DecodeResult> {
        self.results.recv_timeout(timeout).ok()
    }
}

impl Drop for DecodeWorker {
    fn drop(&mut self) {
        // Disconnect the request channel so the loop ends at its next recv.
        self.tx.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

fn run<D, B>(
    decoder: D,
    transport: B,
    service: TileService,
    policy: FailurePolicy,
    rx: Receiver<DecodeRequest>,
    results: Sender<DecodeResult>,
) where
    D: TileDecoder,
    B: ByteSource,
{
    while let Ok(request) = rx.recv() {
        if let Some(result) = resolve(&decoder, &transport, &service, policy, request) {
            if results.send(result).is_err() {
                // Consumer dropped its end; nothing left to deliver to.
                break;
            }
        }
    }
}

fn resolve<D, B>(
    decoder: &D,
    transport: &B,
    service: &TileService,
    policy: FailurePolicy,
    request: DecodeRequest,
) -> Option<DecodeResult>
where
    D: TileDecoder,
    B: ByteSource,
{
    let DecodeRequest {
        id,
        generation,
        payload,
    } = request;

    let bytes = match payload {
        TilePayload::Bytes(bytes) => Ok(bytes),
        TilePayload::BlobRef(reference) => transport.fetch(&FetchTarget::BlobRef(reference)),
        TilePayload::Coord(coord) => {
            transport.fetch(&FetchTarget::Url(service.tile_url(&coord)))
        }
    };

    let failure = match bytes {
        Ok(raw) => match decoder.decode(&raw) {
            Ok(markup) => return Some(DecodeResult::markup(id, generation, markup)),
            Err(err) => TileFailure::from(err),
        },
        Err(err) => TileFailure::Transport(err),
    };

    match policy {
        FailurePolicy::Report => Some(DecodeResult::failed(id, generation, failure)),
        FailurePolicy::Silent => None,
    }
}
