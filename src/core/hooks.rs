//! Install-hook processing and the policy gate.
//!
//! Packages may declare install hooks: executable logic run during
//! extraction. The orchestrator wraps the hook processor for every package
//! in a [`GatedHookProcessor`] parameterized by [`InstallHookPolicy`]; the
//! four policies share one code path and differ only in registration gating
//! and failure handling.

use crate::core::error::HookError;
use crate::core::id::PackageId;
use crate::core::listener::ErrorListener;
use crate::core::package::InstallHook;
use crate::core::session::MemorySession;
use serde::Deserialize;
use std::cell::RefCell;
use std::rc::Rc;

/// How install hooks declared by scanned packages are treated.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum InstallHookPolicy {
    /// Report a violation if any hook registers at all; the hook is never
    /// executed. Use when install hooks are disallowed outright.
    Prohibit,
    /// Report hook failures via the error listener and keep scanning.
    #[default]
    Report,
    /// Abort the scan on any hook failure.
    Abort,
    /// Disable hook processing entirely.
    Skip,
}

impl InstallHookPolicy {
    /// Case-insensitive lookup by name.
    pub fn for_name(name: &str) -> Option<InstallHookPolicy> {
        match name.to_ascii_lowercase().as_str() {
            "prohibit" => Some(InstallHookPolicy::Prohibit),
            "report" => Some(InstallHookPolicy::Report),
            "abort" => Some(InstallHookPolicy::Abort),
            "skip" => Some(InstallHookPolicy::Skip),
            _ => None,
        }
    }
}

/// Per-package hook processing surface.
pub trait InstallHookProcessor {
    fn register_hooks(&mut self, hooks: &[InstallHook]) -> Result<(), HookError>;

    fn register_hook(&mut self, hook: &InstallHook) -> Result<(), HookError>;

    fn has_hooks(&self) -> bool;

    /// Run registered hooks against the session; false signals failure.
    fn execute(&mut self, session: &mut MemorySession) -> bool;
}

/// Does nothing; stands in for the real processor under SKIP policy.
#[derive(Debug, Default)]
pub struct NoopHookProcessor;

impl InstallHookProcessor for NoopHookProcessor {
    fn register_hooks(&mut self, _hooks: &[InstallHook]) -> Result<(), HookError> {
        Ok(())
    }

    fn register_hook(&mut self, _hook: &InstallHook) -> Result<(), HookError> {
        Ok(())
    }

    fn has_hooks(&self) -> bool {
        false
    }

    fn execute(&mut self, _session: &mut MemorySession) -> bool {
        true
    }
}

/// Default processor over descriptor-declared hooks. A hook marked broken
/// fails registration the way an unloadable hook class would in a live
/// installer.
#[derive(Debug)]
pub struct DefaultHookProcessor {
    package_id: PackageId,
    registered: Vec<String>,
}

impl DefaultHookProcessor {
    pub fn new(package_id: PackageId) -> Self {
        DefaultHookProcessor {
            package_id,
            registered: Vec::new(),
        }
    }
}

impl InstallHookProcessor for DefaultHookProcessor {
    fn register_hooks(&mut self, hooks: &[InstallHook]) -> Result<(), HookError> {
        for hook in hooks {
            self.register_hook(hook)?;
        }
        Ok(())
    }

    fn register_hook(&mut self, hook: &InstallHook) -> Result<(), HookError> {
        if hook.broken {
            return Err(HookError::new(
                self.package_id.clone(),
                format!("failed to register install hook {:?}", hook.name),
            ));
        }
        self.registered.push(hook.name.clone());
        Ok(())
    }

    fn has_hooks(&self) -> bool {
        !self.registered.is_empty()
    }

    fn execute(&mut self, session: &mut MemorySession) -> bool {
        // Simulated hooks leave a marker per package so their execution is
        // observable to checks inspecting the session.
        for hook in &self.registered {
            let path = format!("/var/hooks/{}", self.package_id);
            if session.create_path(&path, "nt:unstructured").is_err()
                || session.set_property(&path, "lastHook", hook).is_err()
            {
                return false;
            }
        }
        true
    }
}

/// Policy gate wrapped around the per-package hook processor.
pub struct GatedHookProcessor {
    package_id: PackageId,
    policy: InstallHookPolicy,
    listener: Rc<RefCell<dyn ErrorListener>>,
    delegate: Box<dyn InstallHookProcessor>,
}

impl GatedHookProcessor {
    /// Wrap a delegate. Under SKIP the delegate is discarded and replaced by
    /// the no-op processor before wrapping.
    pub fn new(
        package_id: PackageId,
        policy: InstallHookPolicy,
        listener: Rc<RefCell<dyn ErrorListener>>,
        delegate: Box<dyn InstallHookProcessor>,
    ) -> Self {
        let delegate = match policy {
            InstallHookPolicy::Skip => Box::new(NoopHookProcessor),
            _ => delegate,
        };
        GatedHookProcessor {
            package_id,
            policy,
            listener,
            delegate,
        }
    }

    fn normalize(&self, error: HookError) -> HookError {
        HookError::new(self.package_id.clone(), error.reason)
    }

    fn gate_registration(&mut self, result: Result<(), HookError>) -> Result<(), HookError> {
        match result {
            Ok(()) => Ok(()),
            Err(error) => {
                let error = self.normalize(error);
                if self.policy == InstallHookPolicy::Abort {
                    Err(error)
                } else {
                    self.listener.borrow_mut().on_install_hook_error(&error);
                    Ok(())
                }
            }
        }
    }
}

impl InstallHookProcessor for GatedHookProcessor {
    fn register_hooks(&mut self, hooks: &[InstallHook]) -> Result<(), HookError> {
        if self.policy == InstallHookPolicy::Prohibit {
            for _ in hooks {
                self.listener
                    .borrow_mut()
                    .on_prohibited_install_hook_registration(&self.package_id);
            }
            return Ok(());
        }
        for hook in hooks {
            self.register_hook(hook)?;
        }
        Ok(())
    }

    fn register_hook(&mut self, hook: &InstallHook) -> Result<(), HookError> {
        if self.policy == InstallHookPolicy::Prohibit {
            self.listener
                .borrow_mut()
                .on_prohibited_install_hook_registration(&self.package_id);
            return Ok(());
        }
        let result = self.delegate.register_hook(hook);
        self.gate_registration(result)
    }

    fn has_hooks(&self) -> bool {
        if self.policy == InstallHookPolicy::Prohibit {
            return false;
        }
        self.delegate.has_hooks()
    }

    fn execute(&mut self, session: &mut MemorySession) -> bool {
        if self.policy == InstallHookPolicy::Prohibit {
            return true;
        }
        self.delegate.execute(session)
    }
}
