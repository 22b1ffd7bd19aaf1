use crate::host::HostRef;
use log::Level;
use serde_json::Value;

/// Console that formats its arguments and hands one line per call to the
/// host log sink.
#[derive(Clone)]
pub struct Console {
    host: HostRef,
}

/// Renders a value the way console output shows it: strings bare, arrays as
/// `[a, b]`, objects as `{k: v}`.
pub fn format_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let items: Vec<String> = items.iter().map(format_value).collect();
            format!("[{}]", items.join(", "))
        }
        Value::Object(map) => {
            let fields: Vec<String> = map.iter().map(|(k, v)| format!("{k}: {}", format_value(v))).collect();
            format!("{{{}}}", fields.join(", "))
        }
        other => other.to_string(),
    }
}

fn format_args(args: &[Value]) -> String {
    args.iter().map(format_value).collect::<Vec<_>>().join(" ")
}

impl Console {
    pub fn new(host: &HostRef) -> Self {
        Self { host: host.clone() }
    }

    fn emit(&self, level: Level, args: &[Value]) {
        self.host.log(level, &format_args(args));
    }

    pub fn debug(&self, args: &[Value]) {
        self.emit(Level::Debug, args);
    }

    pub fn log(&self, args: &[Value]) {
        self.emit(Level::Info, args);
    }

    pub fn info(&self, args: &[Value]) {
        self.emit(Level::Info, args);
    }

    pub fn warn(&self, args: &[Value]) {
        self.emit(Level::Warn, args);
    }

    pub fn error(&self, args: &[Value]) {
        self.emit(Level::Error, args);
    }

    // No stack to append; trace logs like `log`
    pub fn trace(&self, args: &[Value]) {
        self.emit(Level::Info, args);
    }
}
