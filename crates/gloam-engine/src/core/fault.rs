use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};

use crate::event::EventPump;
use crate::platform::Platform;
use crate::time::TimerStats;

use super::ctx::Ctx;
use super::diagnostic;
use super::game::{Game, GameResult};

/// Where a fault was raised.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum CallSite {
    Load,
    Update,
    Draw,
    KeyPressed,
    KeyReleased,
    TextInput,
    MousePressed,
    MouseReleased,
    MouseMoved,
    WheelMoved,
    FileDropped,
    Resized,
    Focus,
    /// The game's own fault handler.
    FaultHandler,
    /// Engine code outside any game callback.
    Framework,
}

impl CallSite {
    pub fn name(self) -> &'static str {
        match self {
            CallSite::Load => "load",
            CallSite::Update => "update",
            CallSite::Draw => "draw",
            CallSite::KeyPressed => "key_pressed",
            CallSite::KeyReleased => "key_released",
            CallSite::TextInput => "text_input",
            CallSite::MousePressed => "mouse_pressed",
            CallSite::MouseReleased => "mouse_released",
            CallSite::MouseMoved => "mouse_moved",
            CallSite::WheelMoved => "wheel_moved",
            CallSite::FileDropped => "file_dropped",
            CallSite::Resized => "resized",
            CallSite::Focus => "focus",
            CallSite::FaultHandler => "fault handler",
            CallSite::Framework => "engine",
        }
    }
}

impl fmt::Display for CallSite {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum FaultKind {
    /// The callback returned `Err`.
    Error,
    /// The callback panicked.
    Panic,
}

impl fmt::Display for FaultKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FaultKind::Error => f.write_str("error"),
            FaultKind::Panic => f.write_str("panic"),
        }
    }
}

/// A failure captured from a guarded call.
#[derive(Debug, Clone, PartialEq)]
pub struct Fault {
    site: CallSite,
    kind: FaultKind,
    message: String,
    detail: String,
}

impl Fault {
    pub fn from_error(site: CallSite, err: &anyhow::Error) -> Self {
        Self {
            site,
            kind: FaultKind::Error,
            message: format!("{err:#}"),
            // Debug output carries the cause chain and, when enabled, a backtrace.
            detail: format!("{err:?}"),
        }
    }

    pub fn from_panic(site: CallSite, payload: Box<dyn Any + Send>) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&'static str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "panic with a non-string payload".to_string()
        };

        Self {
            site,
            kind: FaultKind::Panic,
            message,
            detail: String::new(),
        }
    }

    pub fn site(&self) -> CallSite {
        self.site
    }

    pub fn kind(&self) -> FaultKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn detail(&self) -> &str {
        &self.detail
    }

    /// Plain-text diagnostic, as logged and copied to the clipboard.
    pub fn report(&self) -> String {
        let mut out = format!("{} in {}: {}", self.kind, self.site, self.message);
        if !self.detail.is_empty() && self.detail != self.message {
            out.push_str("\n\n");
            out.push_str(&self.detail);
        }
        out
    }
}

impl fmt::Display for Fault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} in {}: {}", self.kind, self.site, self.message)
    }
}

/// Runs `f`, turning a returned error or a panic into a [`Fault`] tagged with `site`.
pub fn guard<F>(site: CallSite, f: F) -> Result<(), Fault>
where
    F: FnOnce() -> GameResult,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(())) => Ok(()),
        Ok(Err(err)) => Err(Fault::from_error(site, &err)),
        Err(payload) => Err(Fault::from_panic(site, payload)),
    }
}

/// One-way error flag plus the fault that set it.
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    in_error: bool,
    first: Option<Fault>,
}

impl ErrorContext {
    pub fn in_error(&self) -> bool {
        self.in_error
    }

    pub fn first_fault(&self) -> Option<&Fault> {
        self.first.as_ref()
    }

    /// Records `fault` if it is the first one. Returns `false` when already in error.
    fn record(&mut self, fault: &Fault) -> bool {
        if self.in_error {
            return false;
        }
        self.in_error = true;
        self.first = Some(fault.clone());
        true
    }
}

/// Path taken by [`FaultController::recover`].
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Recovery {
    /// A fault was already being handled; this one was only logged.
    Ignored,
    /// The game's fault handler ran successfully.
    CustomHandled,
    /// The game's fault handler failed; the default diagnostic was logged instead.
    CustomHandlerFailed,
    /// The diagnostic screen was shown until dismissed.
    DiagnosticDisplayed,
    /// No drawable surface was available; the diagnostic went to the log only.
    ConsoleOnly,
}

/// Routes the first fault of a run to the game's handler or the default fallback.
#[derive(Debug, Default)]
pub struct FaultController {
    context: ErrorContext,
    input_initialized: bool,
}

impl FaultController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn in_error(&self) -> bool {
        self.context.in_error()
    }

    pub fn first_fault(&self) -> Option<&Fault> {
        self.context.first_fault()
    }

    pub fn context(&self) -> &ErrorContext {
        &self.context
    }

    /// Pointer modes are only reset during recovery once input is up.
    pub fn set_input_initialized(&mut self, initialized: bool) {
        self.input_initialized = initialized;
    }

    /// Handles `fault` and leaves the surface closed.
    ///
    /// Never panics: failures inside recovery are logged and swallowed.
    pub fn recover<G>(
        &mut self,
        fault: &Fault,
        game: &mut G,
        platform: &mut dyn Platform,
        pump: &mut EventPump,
        timer: TimerStats,
    ) -> Recovery
    where
        G: Game + ?Sized,
    {
        if !self.context.record(fault) {
            log::warn!("ignoring {fault} raised while already in error");
            return Recovery::Ignored;
        }

        let input_initialized = self.input_initialized;
        let name = game.name().to_string();

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match game.fault_handler() {
            Some(handler) => {
                let mut ctx = Ctx::new(&mut *platform, timer);
                match guard(CallSite::FaultHandler, || handler.handle_fault(&mut ctx, fault)) {
                    Ok(()) => Recovery::CustomHandled,
                    Err(handler_fault) => {
                        log::error!("fault handler failed: {handler_fault}");
                        diagnostic::log_fault(fault);
                        Recovery::CustomHandlerFailed
                    }
                }
            }
            None => diagnostic::run_fallback(fault, &name, &mut *platform, pump, input_initialized),
        }));

        let recovery = outcome.unwrap_or_else(|payload| {
            let inner = Fault::from_panic(CallSite::Framework, payload);
            log::error!("fault recovery panicked: {inner}");
            diagnostic::log_fault(fault);
            Recovery::ConsoleOnly
        });

        let closed = panic::catch_unwind(AssertUnwindSafe(|| {
            if platform.is_open() {
                platform.close();
            }
        }));
        if closed.is_err() {
            log::error!("closing the surface after recovery panicked");
        }

        log::debug!("fault recovery finished: {recovery:?}");
        recovery
    }
}
