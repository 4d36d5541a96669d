//! Dispatch service: the single task that owns all relay state.
//!
//! Host events and transport events arrive on two `mpsc` channels and are
//! applied one at a time by the same task, so queue, in-flight slot,
//! response buffer and session directory are never touched concurrently.
//! Outbound deliveries leave through a third channel consumed by the bridge
//! writer. Each event's deliveries are collected first and then awaited into
//! that channel, so a slow writer holds the service back instead of losing
//! lines.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use crate::config::GlobalConfig;
use crate::dispatch::builder::RequestBuilder;
use crate::dispatch::{DispatchStats, Dispatcher, Host, Transport};
use crate::host::commands::{lookup_request, LOOKUP_COMMAND};
use crate::host::directory::SessionDirectory;
use crate::host::events::join_request;
use crate::host::{HostAction, HostEvent};
use crate::models::outcome::TransportEvent;
use crate::models::session::{IdentityToken, SessionRef};
use crate::transport::HttpTransport;
use crate::{AppError, Result};

/// Capacity of the host inbox, the transport channel and the outbound queue.
pub const QUEUE_CAPACITY: usize = 256;

/// Everything the service needs from configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceSettings {
    /// Remote endpoint; `None` disables dispatching altogether.
    pub endpoint: Option<String>,
    /// Shared API key stamped on every payload.
    pub api_key: String,
    /// Per-request deadline handed to the transport.
    pub timeout: Duration,
    /// Permission guarding `lookup`; `None` leaves the command unregistered.
    pub lookup_permission: Option<String>,
}

impl ServiceSettings {
    /// Derive settings from a loaded configuration.
    #[must_use]
    pub fn from_config(config: &GlobalConfig) -> Self {
        Self {
            endpoint: config.endpoint().map(str::to_owned),
            api_key: config.api.key.clone(),
            timeout: config.request_timeout(),
            lookup_permission: config.lookup_permission().map(str::to_owned),
        }
    }
}

/// Handle used to feed host events into the running service.
#[derive(Debug, Clone)]
pub struct DispatchService {
    inbox: mpsc::Sender<HostEvent>,
}

/// Join handle for the service task; resolves to the final counters.
pub struct DispatchRuntime {
    /// Service task; yields the dispatcher counters once it stops.
    pub task: JoinHandle<DispatchStats>,
}

impl DispatchService {
    /// Start the service with an HTTP transport built from `settings`.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Transport` if the HTTP client cannot be created.
    pub fn start(
        settings: ServiceSettings,
        outbound: mpsc::Sender<HostAction>,
        cancel: CancellationToken,
    ) -> Result<(Self, DispatchRuntime)> {
        let (transport_tx, transport_rx) = mpsc::channel(QUEUE_CAPACITY);
        let transport = match settings.endpoint {
            Some(ref url) => Some(HttpTransport::new(url.clone(), settings.timeout, transport_tx)?),
            None => {
                warn!("no api.url configured; requests will not be dispatched");
                None
            }
        };

        Ok(Self::spawn(settings, transport, transport_rx, outbound, cancel))
    }

    /// Start the service over an arbitrary transport.
    ///
    /// `transport_rx` must receive the events `transport` produces. Passing
    /// `None` runs the service without dispatching anything.
    pub fn spawn<T>(
        settings: ServiceSettings,
        transport: Option<T>,
        transport_rx: mpsc::Receiver<TransportEvent>,
        outbound: mpsc::Sender<HostAction>,
        cancel: CancellationToken,
    ) -> (Self, DispatchRuntime)
    where
        T: Transport + Send + 'static,
    {
        let builder = RequestBuilder::new(settings.api_key);
        let dispatcher = transport.map(|transport| Dispatcher::new(builder, transport));

        // Lookup replies need somewhere to go.
        let lookup_permission = settings.lookup_permission.filter(|_| dispatcher.is_some());
        match lookup_permission {
            Some(ref permission) => info!(permission = permission.as_str(), "lookup command registered"),
            None => info!("lookup command disabled"),
        }

        let relay = Relay {
            dispatcher,
            directory: SessionDirectory::new(),
            lookup_permission,
            outbox: Vec::new(),
            outbound,
        };

        let (inbox, inbox_rx) = mpsc::channel(QUEUE_CAPACITY);
        let task = tokio::spawn(
            relay
                .run(inbox_rx, transport_rx, cancel)
                .instrument(info_span!("dispatch_service")),
        );

        (Self { inbox }, DispatchRuntime { task })
    }

    /// Hand a host event to the service.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Dispatch` if the service has stopped.
    pub async fn send(&self, event: HostEvent) -> Result<()> {
        self.inbox
            .send(event)
            .await
            .map_err(|err| AppError::Dispatch(format!("service inbox closed: {err}")))
    }

    /// Sender side of the host inbox, for producers such as the bridge reader.
    #[must_use]
    pub fn inbox(&self) -> mpsc::Sender<HostEvent> {
        self.inbox.clone()
    }
}

/// State owned by the service task.
struct Relay<T> {
    dispatcher: Option<Dispatcher<T>>,
    directory: SessionDirectory,
    lookup_permission: Option<String>,
    /// Actions produced by the event being applied, not yet handed off.
    outbox: Vec<HostAction>,
    outbound: mpsc::Sender<HostAction>,
}

impl<T: Transport> Relay<T> {
    async fn run(
        mut self,
        mut inbox_rx: mpsc::Receiver<HostEvent>,
        mut transport_rx: mpsc::Receiver<TransportEvent>,
        cancel: CancellationToken,
    ) -> DispatchStats {
        let mut transport_open = true;

        loop {
            tokio::select! {
                biased;

                () = cancel.cancelled() => {
                    debug!("dispatch service: cancellation received, stopping");
                    break;
                }

                event = transport_rx.recv(), if transport_open => match event {
                    Some(event) => self.on_transport(event),
                    None => transport_open = false,
                },

                event = inbox_rx.recv() => match event {
                    Some(event) => self.on_host(event),
                    None => {
                        debug!("dispatch service: host inbox closed, stopping");
                        break;
                    }
                },
            }

            self.flush_outbox(&cancel).await;
        }

        self.shutdown()
    }

    /// Hand every collected action to the bridge writer, waiting for room.
    ///
    /// Only cancellation or a vanished writer can cut the hand-off short.
    async fn flush_outbox(&mut self, cancel: &CancellationToken) {
        let actions = std::mem::take(&mut self.outbox);
        let total = actions.len();

        for (sent, action) in actions.into_iter().enumerate() {
            tokio::select! {
                biased;

                result = self.outbound.send(action) => {
                    if result.is_err() {
                        warn!(dropped = total - sent, "bridge writer gone, dropping outbound host actions");
                        return;
                    }
                }

                () = cancel.cancelled() => {
                    warn!(dropped = total - sent, "shutdown while outbound queue full, dropping host actions");
                    return;
                }
            }
        }
    }

    fn on_host(&mut self, event: HostEvent) {
        match event {
            HostEvent::SessionJoined(record) => {
                info!(session = %record.session, callsign = %record.callsign, "session joined");
                let request = join_request(&record);
                self.directory.insert(record);
                match self.dispatcher {
                    Some(ref mut dispatcher) => {
                        dispatcher.submit(request);
                    }
                    None => debug!("no endpoint configured, join not registered"),
                }
            }
            HostEvent::SessionLeft { session } => {
                if self.directory.remove(session).is_none() {
                    debug!(%session, "left event for unknown session");
                }
            }
            HostEvent::Command {
                session,
                name,
                argument,
            } => self.on_command(session, &name, &argument),
        }
    }

    fn on_command(&mut self, session: SessionRef, name: &str, argument: &str) {
        if name != LOOKUP_COMMAND {
            debug!(%session, command = name, "ignoring unregistered command");
            return;
        }
        let (Some(permission), Some(dispatcher)) =
            (self.lookup_permission.as_deref(), self.dispatcher.as_mut())
        else {
            debug!(%session, "lookup command disabled, ignoring");
            return;
        };

        match lookup_request(&self.directory, permission, session, argument) {
            Ok(request) => {
                dispatcher.submit(request);
            }
            Err(rejection) => {
                info!(%session, %rejection, "lookup command rejected");
                let mut delivery = Delivery {
                    directory: &self.directory,
                    outbox: &mut self.outbox,
                };
                delivery.send_private(session, rejection.notice());
            }
        }
    }

    fn on_transport(&mut self, event: TransportEvent) {
        let Some(ref mut dispatcher) = self.dispatcher else {
            warn!("transport event without a dispatcher, ignoring");
            return;
        };
        let mut delivery = Delivery {
            directory: &self.directory,
            outbox: &mut self.outbox,
        };
        dispatcher.handle(event, &mut delivery);
    }

    fn shutdown(mut self) -> DispatchStats {
        let Some(ref mut dispatcher) = self.dispatcher else {
            info!("dispatch service stopped");
            return DispatchStats::default();
        };

        let abandoned = dispatcher.drain_pending();
        let in_flight = dispatcher.in_flight().map(|(job, _)| job);
        let stats = dispatcher.stats();
        info!(
            abandoned = abandoned.len(),
            in_flight = ?in_flight,
            submitted = stats.submitted,
            completed = stats.completed,
            timed_out = stats.timed_out,
            errored = stats.errored,
            stale_drops = stats.stale_drops,
            "dispatch service stopped"
        );
        stats
    }
}

/// [`Host`] view over the session directory and the relay's outbox.
struct Delivery<'a> {
    directory: &'a SessionDirectory,
    outbox: &'a mut Vec<HostAction>,
}

impl Host for Delivery<'_> {
    fn current_identity(&self, session: SessionRef) -> Option<IdentityToken> {
        self.directory.identity(session)
    }

    fn send_private(&mut self, session: SessionRef, text: &str) {
        self.outbox.push(HostAction::PrivateMessage {
            session,
            text: text.to_owned(),
        });
    }

    fn broadcast_admins(&mut self, text: &str) {
        self.outbox.push(HostAction::AdminBroadcast {
            text: text.to_owned(),
        });
    }
}
