use crate::cmd::Stopped;
use serde::Serialize;
use serde_json::{json, Value};

pub fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    println!("{}", json);
    Ok(())
}

/// Print `value` with a `next_step` field merged in. Non-object values are
/// nested under `result`.
pub fn print_with_next_step<T: Serialize>(value: &T, next_step: &str) -> anyhow::Result<()> {
    let body = match serde_json::to_value(value)? {
        Value::Object(mut map) => {
            map.insert("next_step".to_string(), Value::String(next_step.to_string()));
            Value::Object(map)
        }
        other => json!({ "result": other, "next_step": next_step }),
    };
    print_json(&body)
}

/// Failure report on stdout, so callers parsing JSON always get an object.
pub fn print_error(err: &anyhow::Error) -> anyhow::Result<()> {
    let next_step = match err.downcast_ref::<Stopped>() {
        Some(stopped) => stopped.next_step.clone(),
        None => format!("STOP. {err}. Resolve the error before continuing."),
    };
    print_json(&json!({
        "error": format!("{err:#}"),
        "next_step": next_step,
    }))
}
