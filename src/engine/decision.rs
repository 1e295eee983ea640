//! Time-boxed agent decisions
//!
//! A budgeted decision runs on a worker thread that owns the agent and
//! hands it back over a channel together with the result. When the
//! budget runs out the engine raises the request's cancel token and
//! walks away; the agent stays parked in the slot until the worker
//! returns it, and whatever it computed in the meantime is dropped.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use crate::agent::{Agent, AgentError, CancelToken, DecisionRequest};
use crate::shot::ShotRequest;

type Reply = (Box<dyn Agent>, thread::Result<Result<ShotRequest, AgentError>>);

/// What came back from one decision call
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum DecisionOutcome {
    Decided(Result<ShotRequest, AgentError>),
    /// The agent panicked; carries the panic message
    Panicked(String),
    TimedOut,
    /// The agent could not be handed to or reclaimed from its worker
    Lost(String),
}

/// Where a player's agent currently lives
pub(crate) enum AgentSlot {
    Idle(Box<dyn Agent>),
    /// Still running a decision the engine already gave up on
    Busy(Receiver<Reply>),
    Lost,
}

impl AgentSlot {
    pub fn new(agent: Box<dyn Agent>) -> Self {
        AgentSlot::Idle(agent)
    }

    /// Run one decision, within `budget` if one is given
    ///
    /// The budget covers reclaiming the agent from an earlier overrun as
    /// well as the new call.
    pub fn decide(&mut self, request: DecisionRequest, budget: Option<Duration>) -> DecisionOutcome {
        let started = Instant::now();

        if let AgentSlot::Busy(reply) = self {
            let reclaimed = match budget {
                Some(budget) => reply.recv_timeout(budget),
                None => reply.recv().map_err(|_| RecvTimeoutError::Disconnected),
            };
            match reclaimed {
                Ok((agent, _stale)) => {
                    tracing::debug!("Reclaimed agent, discarding its cancelled decision");
                    *self = AgentSlot::Idle(agent);
                }
                Err(RecvTimeoutError::Timeout) => return DecisionOutcome::TimedOut,
                Err(RecvTimeoutError::Disconnected) => {
                    *self = AgentSlot::Lost;
                    return DecisionOutcome::Lost("decision worker vanished".into());
                }
            }
        }

        let agent = match std::mem::replace(self, AgentSlot::Lost) {
            AgentSlot::Idle(agent) => agent,
            AgentSlot::Busy(_) | AgentSlot::Lost => {
                return DecisionOutcome::Lost("agent unavailable".into());
            }
        };

        match budget {
            None => {
                let mut agent = agent;
                let result = panic::catch_unwind(AssertUnwindSafe(|| agent.decide(&request)));
                *self = AgentSlot::Idle(agent);
                settle(result)
            }
            Some(budget) => {
                let remaining = budget.saturating_sub(started.elapsed());
                if remaining.is_zero() {
                    *self = AgentSlot::Idle(agent);
                    return DecisionOutcome::TimedOut;
                }
                self.decide_on_worker(agent, request, remaining)
            }
        }
    }

    fn decide_on_worker(
        &mut self,
        mut agent: Box<dyn Agent>,
        request: DecisionRequest,
        budget: Duration,
    ) -> DecisionOutcome {
        let cancel: CancelToken = request.cancel.clone();
        let (tx, rx) = mpsc::channel::<Reply>();

        let spawned = thread::Builder::new()
            .name("agent-decision".into())
            .spawn(move || {
                let result = panic::catch_unwind(AssertUnwindSafe(|| agent.decide(&request)));
                // The engine may have stopped listening
                let _ = tx.send((agent, result));
            });
        if let Err(e) = spawned {
            *self = AgentSlot::Lost;
            return DecisionOutcome::Lost(format!("failed to spawn decision worker: {}", e));
        }

        match rx.recv_timeout(budget) {
            Ok((agent, result)) => {
                *self = AgentSlot::Idle(agent);
                settle(result)
            }
            Err(RecvTimeoutError::Timeout) => {
                cancel.cancel();
                *self = AgentSlot::Busy(rx);
                DecisionOutcome::TimedOut
            }
            Err(RecvTimeoutError::Disconnected) => {
                *self = AgentSlot::Lost;
                DecisionOutcome::Lost("decision worker vanished".into())
            }
        }
    }
}

fn settle(result: thread::Result<Result<ShotRequest, AgentError>>) -> DecisionOutcome {
    match result {
        Ok(decided) => DecisionOutcome::Decided(decided),
        Err(payload) => DecisionOutcome::Panicked(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
