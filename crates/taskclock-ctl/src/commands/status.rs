use anyhow::{anyhow, Result};
use futures::StreamExt;
use taskclock_common::{minutes_from, today_key};
use taskclock_proto::daemon::{CoordinatorProxy, StorageProxy};
use zbus::Connection;

use super::store::read_entries;

pub async fn show() -> Result<()> {
    let conn = Connection::session().await?;
    let coordinator = CoordinatorProxy::new(&conn).await?;
    let storage = StorageProxy::new(&conn).await?;

    let today = today_key();
    let entries = read_entries(&storage, "sync", &[today.clone()]).await?;
    let day_minutes = minutes_from(entries.get(&today));

    let week_minutes = coordinator.week_total().await?;
    if week_minutes < 0.0 {
        return Err(anyhow!("Coordinator could not compute the weekly total"));
    }

    println!("taskclock Status");
    println!("================");
    println!();
    println!("Today ({}): {}", today, format_minutes(day_minutes));
    println!("This week:    {}", format_minutes(week_minutes));

    Ok(())
}

pub async fn watch() -> Result<()> {
    let conn = Connection::session().await?;
    let coordinator = CoordinatorProxy::new(&conn).await?;

    let mut updates = coordinator.receive_update_calendar().await?;
    println!("Waiting for calendar updates (Ctrl+C to stop)...");

    while let Some(update) = updates.next().await {
        let args = update.args()?;
        println!(
            "Day: {}  Week: {}",
            format_minutes(*args.time_day()),
            format_minutes(*args.time_week())
        );
    }

    Ok(())
}

fn format_minutes(minutes: f64) -> String {
    let whole = minutes.max(0.0).round() as i64;
    format!("{}h {:02}m", whole / 60, whole % 60)
}
