//! Connection lifecycle supervision.
//!
//! [`ConnectionSupervisor`] owns a station radio and keeps it connected:
//! an initial timeout-bounded connect, then a perpetual monitor loop that
//! detects link loss, re-establishes the connection, and notifies the
//! host through optional callbacks. Nothing in here crashes the host
//! process - expected connect failures are boolean outcomes, radio faults
//! and panicking callbacks are contained at the iteration boundary, and a
//! cooperative stop signal produces a clean exit.
//!
//! The supervisor runs as a single cooperative task. Its only suspension
//! points are the 50 ms link poll inside a reconnect attempt and the
//! pacing sleep between monitor iterations; the stop signal is observed
//! exactly there.
//!
//! # Example
//!
//! ```ignore
//! let credentials = WifiCredentials::new("MyNetwork", "MyPassword")?;
//! let mut supervisor = ConnectionSupervisor::new(radio, credentials)?;
//! let stop = supervisor.cancel_token();
//!
//! supervisor
//!     .start(
//!         DEFAULT_CONNECT_TIMEOUT,
//!         DEFAULT_MONITOR_INTERVAL,
//!         Some(Box::new(|ip| log::info!("back online at {:?}", ip))),
//!         None,
//!     )
//!     .await;
//! // ... elsewhere: stop.cancel() for a graceful shutdown.
//! ```

use crate::config::WifiCredentials;
use crate::radio::{PowerMode, RadioError, StationRadio};
use log::{error, info, trace, warn};
use std::any::Any;
use std::fmt;
use std::net::Ipv4Addr;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;
use tokio::time::{sleep, Instant};
use tokio_util::sync::CancellationToken;

/// Default budget for a connect or reconnect attempt.
pub const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_millis(10_000);

/// Default pacing between monitor iterations.
pub const DEFAULT_MONITOR_INTERVAL: Duration = Duration::from_millis(2_000);

/// Interval between link status polls during a reconnect attempt.
pub const LINK_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Invoked after a successful reconnect with the current address.
pub type ReconnectCallback = Box<dyn FnMut(Option<Ipv4Addr>) + Send>;

/// Invoked after a reconnect attempt that did not restore the link.
pub type FailureCallback = Box<dyn FnMut() + Send>;

/// Lifecycle of the monitor loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorState {
    /// Monitoring has not started.
    Idle,
    /// Loop active; link presumed healthy or being checked.
    Watching,
    /// Inside a reconnect attempt.
    Reconnecting,
    /// Loop exited. Terminal.
    Stopped,
}

/// Construction-time settings for the supervisor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupervisorOptions {
    /// Regulatory country code pushed to the radio at construction.
    pub regulatory_code: String,
    /// Power-save policy pushed to the radio at construction.
    pub power_mode: PowerMode,
    /// Reset the radio to a clean power-on state before configuring it,
    /// discarding whatever the previous boot left behind.
    pub reset_radio: bool,
}

impl Default for SupervisorOptions {
    fn default() -> Self {
        Self {
            regulatory_code: "US".to_string(),
            power_mode: PowerMode::default(),
            reset_radio: false,
        }
    }
}

/// Errors surfaced by supervisor operations.
///
/// Expected connect failures (timeout, negative link status) are *not*
/// errors - they are boolean outcomes of [`ConnectionSupervisor::connect`]
/// and [`ConnectionSupervisor::reconnect`].
#[derive(Debug)]
pub enum SupervisorError {
    /// A cooperative stop was requested while an operation was waiting.
    Cancelled,
    /// The radio driver reported a fault.
    Radio(RadioError),
}

impl fmt::Display for SupervisorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Cancelled => write!(f, "stop requested"),
            Self::Radio(error) => write!(f, "radio fault: {}", error),
        }
    }
}

impl std::error::Error for SupervisorError {}

impl From<RadioError> for SupervisorError {
    fn from(error: RadioError) -> Self {
        Self::Radio(error)
    }
}

/// Supervises the connection lifecycle of one station radio.
///
/// The supervisor exclusively owns its radio; all connectivity queries
/// and mutations go through it. One logical task drives the supervisor
/// at a time, so no locking is needed - mutual exclusion is structural.
pub struct ConnectionSupervisor<R: StationRadio> {
    /// Session credentials; fixed at construction.
    credentials: WifiCredentials,
    /// Last regulatory code written to the radio.
    regulatory_code: Option<String>,
    /// Last power-save policy written to the radio.
    power_mode: Option<PowerMode>,
    /// The owned radio capability.
    radio: R,
    /// True while the monitor loop should keep iterating.
    running: bool,
    /// Current monitor lifecycle state.
    state: SupervisorState,
    /// Cooperative stop signal, observed only at suspension points.
    cancel: CancellationToken,
}

impl<R: StationRadio> ConnectionSupervisor<R> {
    /// Create a supervisor with default options.
    pub fn new(radio: R, credentials: WifiCredentials) -> Result<Self, SupervisorError> {
        Self::with_options(radio, credentials, SupervisorOptions::default())
    }

    /// Create a supervisor, optionally resetting the radio first, and
    /// write the initial power and regulatory configuration through to it.
    pub fn with_options(
        mut radio: R,
        credentials: WifiCredentials,
        options: SupervisorOptions,
    ) -> Result<Self, SupervisorError> {
        if options.reset_radio {
            radio.reset()?;
        }

        let mut supervisor = Self {
            credentials,
            regulatory_code: None,
            power_mode: None,
            radio,
            running: false,
            state: SupervisorState::Idle,
            cancel: CancellationToken::new(),
        };
        supervisor.set_power_mode(options.power_mode)?;
        supervisor.set_regulatory_code(&options.regulatory_code)?;
        Ok(supervisor)
    }

    /// SSID of the supervised network.
    pub fn ssid(&self) -> &str {
        self.credentials.ssid()
    }

    /// Regulatory code last written to the radio.
    pub fn regulatory_code(&self) -> Option<&str> {
        self.regulatory_code.as_deref()
    }

    /// Power-save policy last written to the radio.
    pub fn power_mode(&self) -> Option<PowerMode> {
        self.power_mode
    }

    /// Current monitor lifecycle state.
    pub fn state(&self) -> SupervisorState {
        self.state
    }

    /// Clone of the stop signal. Cancelling it requests a graceful stop,
    /// observed at the supervisor's next suspension point.
    pub fn cancel_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Request a graceful stop.
    pub fn stop(&self) {
        self.cancel.cancel();
    }

    /// Update the regulatory code, writing through to the radio only when
    /// the value actually changes.
    pub fn set_regulatory_code(&mut self, code: &str) -> Result<(), SupervisorError> {
        if self.regulatory_code.as_deref() != Some(code) {
            self.radio.set_regulatory_code(code)?;
            self.regulatory_code = Some(code.to_string());
        }
        Ok(())
    }

    /// Update the power-save policy, writing through to the radio only
    /// when the value actually changes.
    pub fn set_power_mode(&mut self, mode: PowerMode) -> Result<(), SupervisorError> {
        if self.power_mode != Some(mode) {
            self.radio.set_power_mode(mode)?;
            self.power_mode = Some(mode);
        }
        Ok(())
    }

    /// Whether the link is currently established.
    pub fn is_connected(&self) -> Result<bool, SupervisorError> {
        Ok(self.radio.is_connected()?)
    }

    /// Current IPv4 address, or `None` while disconnected.
    pub fn ip_address(&self) -> Result<Option<Ipv4Addr>, SupervisorError> {
        if self.radio.is_connected()? {
            Ok(Some(self.radio.interface_config()?.ip))
        } else {
            Ok(None)
        }
    }

    /// Activate the radio and attempt to connect within `timeout`.
    ///
    /// Returns `Ok(true)` once the link is up, `Ok(false)` when the
    /// attempt timed out or the driver reported an unrecoverable status.
    pub async fn connect(&mut self, timeout: Duration) -> Result<bool, SupervisorError> {
        self.radio.activate(true)?;
        self.reconnect(timeout).await
    }

    /// Issue a connect request and poll the link until it is up, the
    /// driver reports a negative status, or `timeout` elapses.
    ///
    /// Each poll is a suspension point 50 ms apart; a stop request aborts
    /// the wait with [`SupervisorError::Cancelled`]. Safe to invoke
    /// repeatedly; the monitor loop never overlaps two attempts.
    pub async fn reconnect(&mut self, timeout: Duration) -> Result<bool, SupervisorError> {
        let cancel = self.cancel.clone();
        let started = Instant::now();

        self.radio
            .connect(self.credentials.ssid(), self.credentials.password())?;

        loop {
            if self.radio.is_connected()? {
                break;
            }
            let status = self.radio.link_status()?;
            if status < 0 {
                warn!("wifi link failed with status {}", status);
                break;
            }
            if started.elapsed() >= timeout {
                break;
            }
            tokio::select! {
                biased;
                _ = cancel.cancelled() => return Err(SupervisorError::Cancelled),
                _ = sleep(LINK_POLL_INTERVAL) => {}
            }
        }

        if self.radio.is_connected()? {
            let config = self.radio.interface_config()?;
            info!("connected to '{}' ({})", self.credentials.ssid(), config);
            Ok(true)
        } else {
            warn!(
                "unable to connect to '{}', gave up after {} ms",
                self.credentials.ssid(),
                started.elapsed().as_millis()
            );
            Ok(false)
        }
    }

    /// Watch the link forever, reconnecting whenever the radio is active
    /// but disconnected.
    ///
    /// After a reconnect attempt, `on_reconnect` (with the current
    /// address) or `on_failure` is invoked synchronously. A panicking
    /// callback or a radio fault is logged at error level and does not
    /// end the loop; only a stop request does, logged at info level and
    /// taking effect without a trailing sleep.
    pub async fn monitor(
        &mut self,
        poll_interval: Duration,
        mut on_reconnect: Option<ReconnectCallback>,
        mut on_failure: Option<FailureCallback>,
    ) {
        let cancel = self.cancel.clone();
        self.running = true;
        self.state = SupervisorState::Watching;

        while self.running {
            match self.watch_once(&mut on_reconnect, &mut on_failure).await {
                Ok(()) => {}
                Err(SupervisorError::Cancelled) => {
                    info!("wifi monitor cancelled");
                    self.running = false;
                    break;
                }
                Err(error) => error!("uncaught failure in wifi monitor: {}", error),
            }

            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("wifi monitor cancelled");
                    self.running = false;
                }
                _ = sleep(poll_interval) => {}
            }
        }

        self.state = SupervisorState::Stopped;
    }

    /// Connect, then monitor - unconditionally, so a failed initial
    /// connect is retried by the first monitor iteration.
    ///
    /// Never propagates a fault to the caller: cancellation and radio
    /// faults during the initial connect are logged and `start` returns
    /// normally.
    pub async fn start(
        &mut self,
        timeout: Duration,
        poll_interval: Duration,
        on_reconnect: Option<ReconnectCallback>,
        on_failure: Option<FailureCallback>,
    ) {
        match self.connect(timeout).await {
            Ok(_) => {}
            Err(SupervisorError::Cancelled) => {
                info!("wifi supervisor cancelled during initial connect");
                return;
            }
            Err(error) => {
                error!("uncaught failure in wifi supervisor start: {}", error);
                return;
            }
        }
        self.monitor(poll_interval, on_reconnect, on_failure).await;
    }

    /// One monitor iteration: check the link, reconnect if it is down,
    /// notify the relevant callback.
    async fn watch_once(
        &mut self,
        on_reconnect: &mut Option<ReconnectCallback>,
        on_failure: &mut Option<FailureCallback>,
    ) -> Result<(), SupervisorError> {
        let active = self.radio.is_active()?;
        let connected = self.radio.is_connected()?;
        trace!(
            "checking wifi status, active = {}, connected = {}",
            active,
            connected
        );

        if active && !connected {
            self.state = SupervisorState::Reconnecting;
            let outcome = self.reconnect(DEFAULT_CONNECT_TIMEOUT).await;
            self.state = SupervisorState::Watching;

            if outcome? {
                let ip = self.ip_address()?;
                if let Some(callback) = on_reconnect.as_mut() {
                    invoke_isolated("reconnect", || callback(ip));
                }
            } else if let Some(callback) = on_failure.as_mut() {
                invoke_isolated("failure", || callback());
            }
        }
        Ok(())
    }
}

/// Run a callback, containing any panic so it cannot end the monitor loop.
fn invoke_isolated(kind: &str, callback: impl FnOnce()) {
    if let Err(payload) = catch_unwind(AssertUnwindSafe(callback)) {
        error!("{} callback panicked: {}", kind, panic_message(payload.as_ref()));
    }
}

/// Best-effort extraction of a panic payload message.
fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message
    } else {
        "non-string panic payload"
    }
}
