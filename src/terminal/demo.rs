use crate::context::{Notifier, Toast, ToastLevel};
use crate::core::FieldName;
use crate::core::value::Value;
use crate::options::{Choice, OptionsLoader};
use crate::submit::{ApiError, SubmissionApi};
use async_trait::async_trait;
use crossterm::execute;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use serde_json::{Value as Json, json};
use std::io;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{info, warn};

/// Stand-in backend for the terminal driver: serves a fixed set of choices
/// and accepts every payload.
#[derive(Debug, Default)]
pub struct DemoBackend {
    next_id: AtomicU64,
}

impl DemoBackend {
    pub fn new() -> Self {
        Self::default()
    }
}

fn group(id: &str, name: &str, email: &str, city: &str, zip: &str) -> Choice {
    Choice::new(
        Value::from(json!({
            "id": id,
            "name": name,
            "contact": { "name": name, "email": email, "phone": "+33 1 23 45 67 89" },
            "location": { "name": name, "address1": "1 rue de la République", "zip": zip, "city": city }
        })),
        name,
    )
}

#[async_trait]
impl OptionsLoader for DemoBackend {
    async fn load(&self, field: &FieldName) -> Result<Vec<Choice>, ApiError> {
        match field.as_str() {
            "organizerGroup" | "group" => Ok(vec![
                group("g-lyon", "Lyon Croix-Rousse", "lyon@example.org", "Lyon", "69004"),
                group("g-lille", "Lille Centre", "lille@example.org", "Lille", "59000"),
            ]),
            "subtype" => Ok(vec![
                Choice::new("meeting", "Public meeting"),
                Choice::new("canvassing", "Door-to-door"),
                Choice::new("leafleting", "Leafleting"),
            ]),
            other => Err(ApiError::Transport(format!("no demo options for '{other}'"))),
        }
    }
}

#[async_trait]
impl SubmissionApi for DemoBackend {
    async fn submit(&self, payload: Json) -> Result<Json, ApiError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        info!(id, "demo backend accepted payload");
        Ok(json!({ "id": id, "received": payload }))
    }
}

#[derive(Debug, Default)]
pub struct StderrNotifier;

impl Notifier for StderrNotifier {
    fn notify(&self, toast: Toast) {
        if let Err(err) = write_toast(&mut io::stderr(), &toast) {
            warn!(%err, message = %toast.message, "toast could not be written to stderr");
        }
    }
}

fn write_toast(out: &mut impl io::Write, toast: &Toast) -> io::Result<()> {
    let color = match toast.level {
        ToastLevel::Success => Color::Green,
        ToastLevel::Error => Color::Red,
    };
    execute!(
        out,
        SetForegroundColor(color),
        Print(&toast.message),
        ResetColor,
        Print("\n")
    )
}
