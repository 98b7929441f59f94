use std::thread::JoinHandle;

use crossbeam_channel::{Receiver, TryRecvError};
use rand::rngs::StdRng;
use rand::Rng;
use tracing::debug;

use crate::board::Position;
use crate::error::{EngineError, EngineResult};
use crate::movegen::{MoveGenerator, RulesEngine};
use crate::selector::{Decision, MoveSelector};

/// An engine turn running on its own thread.
///
/// The selector travels with the turn and comes back with the result, so the
/// caller can start the next turn with the same RNG state.
pub struct PendingMove<R = StdRng, E: RulesEngine = MoveGenerator> {
    receiver: Receiver<(MoveSelector<R, E>, Decision)>,
    handle: Option<JoinHandle<()>>,
}

pub fn spawn_choose_move<R, E>(mut selector: MoveSelector<R, E>, position: Position) -> PendingMove<R, E>
where
    R: Rng + Send + 'static,
    E: RulesEngine + Send + 'static,
{
    let (sender, receiver) = crossbeam_channel::bounded(1);
    let handle = std::thread::spawn(move || {
        let decision = selector.choose_move(&position);
        if sender.send((selector, decision)).is_err() {
            debug!("engine turn finished after its handle was dropped");
        }
    });
    PendingMove {
        receiver,
        handle: Some(handle),
    }
}

impl<R, E: RulesEngine> PendingMove<R, E> {
    /// `Ok(None)` while the search is still running.
    pub fn poll(&mut self) -> EngineResult<Option<(MoveSelector<R, E>, Decision)>> {
        match self.receiver.try_recv() {
            Ok(done) => {
                self.join();
                Ok(Some(done))
            }
            Err(TryRecvError::Empty) => Ok(None),
            Err(TryRecvError::Disconnected) => {
                self.join();
                Err(EngineError::WorkerDisconnected)
            }
        }
    }

    /// Blocks until the turn is over.
    pub fn wait(mut self) -> EngineResult<(MoveSelector<R, E>, Decision)> {
        let done = self
            .receiver
            .recv()
            .map_err(|_| EngineError::WorkerDisconnected);
        self.join();
        done
    }

    fn join(&mut self) {
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                debug!("engine thread panicked");
            }
        }
    }
}
