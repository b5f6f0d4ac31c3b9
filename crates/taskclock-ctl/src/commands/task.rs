use anyhow::{anyhow, Result};
use chrono::Local;
use taskclock_common::{keys, TaskSession};
use taskclock_proto::daemon::StorageProxy;
use zbus::Connection;

use super::store::{parse_value, read_entries, write_entries};

pub async fn begin(id: &str, minutes: f64) -> Result<()> {
    if !minutes.is_finite() || minutes <= 0.0 {
        return Err(anyhow!("Allotted minutes must be a positive number"));
    }

    let conn = Connection::session().await?;
    let proxy = StorageProxy::new(&conn).await?;

    let session = TaskSession::begin(parse_value(id), minutes, Local::now());
    write_entries(&proxy, "local", session.to_entries()).await?;

    println!("Started task {} with {} minutes allotted", session.id, minutes);
    Ok(())
}

pub async fn show() -> Result<()> {
    let conn = Connection::session().await?;
    let proxy = StorageProxy::new(&conn).await?;

    let wanted: Vec<String> = keys::TASK_SESSION_KEYS.iter().map(|key| key.to_string()).collect();
    let session = TaskSession::from_entries(&read_entries(&proxy, "local", &wanted).await?);

    if !session.active {
        println!("No active task");
        return Ok(());
    }

    println!("Active Task:");
    println!("  ID: {}", session.id);
    match (session.started_at(), session.ceiling_minutes()) {
        (Ok(started), Ok(ceiling)) => {
            let elapsed = (Local::now() - started).num_seconds() as f64 / 60.0;
            println!("  Started: {}", started.format("%Y-%m-%d %H:%M:%S"));
            println!("  Elapsed: {:.1} of {} minutes", elapsed, ceiling);
        }
        (Err(e), _) | (_, Err(e)) => println!("  Task record is incomplete: {}", e),
    }

    Ok(())
}
