//! Grid-layer content source backed by the decode worker

use tilemux_grid::{TileContentSource, TileTicket};
use tilemux_tile::{DecodeRequest, TileCoord, TileService};

use crate::runtime::RequestSender;
use crate::transport::{ByteSource, FetchTarget};

/// Which request shape the grid layer sends to the worker.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RelayMode {
    /// Fetch bytes in the foreground, relay them to the worker
    Bytes,
    /// Hand the worker bare coordinates; it fetches for itself
    Coordinates,
}

/// [`TileContentSource`] that forwards every creation to a [`DecodeWorker`].
///
/// In [`RelayMode::Bytes`] the source fetches the tile bytes through its own
/// transport first; a transport failure means no decode request is ever
/// issued and the placeholder stays empty, matching the silent-loss error
/// model. In [`RelayMode::Coordinates`] the worker owns the whole fetch.
///
/// [`DecodeWorker`]: crate::DecodeWorker
pub struct WorkerRelaySource<B> {
    sender: RequestSender,
    mode: RelayMode,
    transport: B,
    service: TileService,
}

impl<B> WorkerRelaySource<B> {
    /// Compose a relay source around a worker submission handle.
    pub fn new(sender: RequestSender, mode: RelayMode, transport: B, service: TileService) -> Self {
        Self {
            sender,
            mode,
            transport,
            service,
        }
    }
}

impl<B: ByteSource> TileContentSource for WorkerRelaySource<B> {
    fn request(&mut self, ticket: &TileTicket, coord: TileCoord) {
        let request = match self.mode {
            RelayMode::Coordinates => {
                DecodeRequest::coord(ticket.id.clone(), ticket.generation, coord)
            }
            RelayMode::Bytes => {
                let url = self.service.tile_url(&coord);
                match self.transport.fetch(&FetchTarget::Url(url)) {
                    Ok(bytes) => {
                        DecodeRequest::bytes(ticket.id.clone(), ticket.generation, bytes)
                    }
                    // No bytes, no decode request; the tile stays empty.
                    Err(_) => return,
                }
            }
        };
        // A disconnected worker is equivalent to a lost result.
        let _ = self.sender.submit(request);
    }
}
