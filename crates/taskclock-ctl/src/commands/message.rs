use anyhow::{anyhow, Result};
use serde_json::json;
use taskclock_proto::daemon::CoordinatorProxy;
use zbus::Connection;

pub async fn cancel() -> Result<()> {
    send(json!({ "status": "cancel-task" })).await
}

pub async fn submit() -> Result<()> {
    send(json!({ "status": "submit-task" })).await
}

pub async fn refresh(time: i64) -> Result<()> {
    if time < 0 {
        return Err(anyhow!("Countdown length cannot be negative"));
    }
    send(json!({ "status": "refresh-timer", "time": time })).await
}

async fn send(message: serde_json::Value) -> Result<()> {
    let conn = Connection::session().await?;
    let proxy = CoordinatorProxy::new(&conn).await?;

    let reply = proxy.send_message(&message.to_string()).await?;
    match reply.as_str() {
        "ok" => println!("Delivered {}", message["status"]),
        "ignored" => println!("Coordinator ignored {}", message["status"]),
        other => return Err(anyhow!("Coordinator rejected message: {}", other)),
    }

    Ok(())
}
