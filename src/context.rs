use crate::core::FieldName;
use crate::core::value::Value;
use indexmap::IndexMap;
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastLevel {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub level: ToastLevel,
    pub message: String,
}

/// Host capability for transient user notifications.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _toast: Toast) {}
}

/// Everything a wizard needs from its host, passed in explicitly at mount time.
#[derive(Clone)]
pub struct WizardContext {
    pub(crate) profile: IndexMap<FieldName, Value>,
    pub(crate) draft: Option<Value>,
    pub(crate) resume_step: Option<String>,
    pub(crate) notifier: Arc<dyn Notifier>,
}

impl Default for WizardContext {
    fn default() -> Self {
        Self {
            profile: IndexMap::new(),
            draft: None,
            resume_step: None,
            notifier: Arc::new(SilentNotifier),
        }
    }
}

impl fmt::Debug for WizardContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WizardContext")
            .field("profile", &self.profile)
            .field("draft", &self.draft)
            .field("resume_step", &self.resume_step)
            .finish_non_exhaustive()
    }
}

impl WizardContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_profile_value(mut self, field: impl Into<FieldName>, value: impl Into<Value>) -> Self {
        self.profile.insert(field.into(), value.into());
        self
    }

    /// Previously saved answers; they win over profile values.
    pub fn with_draft(mut self, draft: Value) -> Self {
        self.draft = Some(draft);
        self
    }

    pub fn resume_at(mut self, step_id: impl Into<String>) -> Self {
        self.resume_step = Some(step_id.into());
        self
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn Notifier>) -> Self {
        self.notifier = notifier;
        self
    }
}
