use anyhow::{anyhow, Result};
use serde_json::{Map, Value};
use taskclock_common::Entries;
use taskclock_proto::daemon::StorageProxy;
use zbus::Connection;

pub async fn get(area: &str, keys: &[String]) -> Result<()> {
    let conn = Connection::session().await?;
    let proxy = StorageProxy::new(&conn).await?;

    let entries = read_entries(&proxy, area, keys).await?;
    if entries.is_empty() {
        println!("No entries found in {}", area);
        return Ok(());
    }

    let mut names: Vec<&String> = entries.keys().collect();
    names.sort();
    for name in names {
        println!("{} = {}", name, entries[name]);
    }

    Ok(())
}

pub async fn set(area: &str, key: &str, value: &str) -> Result<()> {
    let conn = Connection::session().await?;
    let proxy = StorageProxy::new(&conn).await?;

    let mut items = Entries::new();
    items.insert(key.to_string(), parse_value(value));
    write_entries(&proxy, area, items).await?;

    println!("Stored {} in {}", key, area);
    Ok(())
}

/// Read `keys` from `area`, surfacing the service's error reply as an error.
pub async fn read_entries(
    proxy: &StorageProxy<'_>,
    area: &str,
    keys: &[String],
) -> Result<Entries> {
    let reply = proxy.get_items(area, &serde_json::to_string(keys)?).await?;
    match serde_json::from_str::<Value>(&reply)? {
        Value::Object(map) => {
            if let Some(error) = map.get("error").and_then(Value::as_str) {
                if !keys.iter().any(|key| key == "error") {
                    return Err(anyhow!("Failed to read {}: {}", area, error));
                }
            }
            Ok(map.into_iter().collect())
        }
        other => Err(anyhow!("Unexpected store reply: {}", other)),
    }
}

pub async fn write_entries(proxy: &StorageProxy<'_>, area: &str, items: Entries) -> Result<()> {
    let object: Map<String, Value> = items.into_iter().collect();
    let reply = proxy.set_items(area, &Value::Object(object).to_string()).await?;
    if reply != "ok" {
        return Err(anyhow!("Failed to write {}: {}", area, reply));
    }
    Ok(())
}

/// Interpret a command-line value as JSON, falling back to a plain string.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}
