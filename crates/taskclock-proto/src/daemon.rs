use zbus::proxy;

#[proxy(
    interface = "org.taskclock.Coordinator",
    default_service = "org.taskclock.Coordinator",
    default_path = "/org/taskclock/Coordinator"
)]
pub trait Coordinator {
    /// Deliver a `{status, ...}` message; replies `ok`, `ignored` or `error:<reason>`.
    async fn send_message(&self, message_json: &str) -> zbus::Result<String>;

    /// Minutes worked this week, or a negative value when the store could not be read.
    async fn week_total(&self) -> zbus::Result<f64>;

    #[zbus(signal)]
    async fn update_calendar(&self, time_day: f64, time_week: f64) -> zbus::Result<()>;
}

#[proxy(
    interface = "org.taskclock.Storage",
    default_service = "org.taskclock.Coordinator",
    default_path = "/org/taskclock/Coordinator"
)]
pub trait Storage {
    /// Read `keys_json` (a JSON array of key names) from `area` (`sync` or `local`).
    async fn get_items(&self, area: &str, keys_json: &str) -> zbus::Result<String>;

    /// Write a flat JSON object into `area`; replies `ok` or `error:<reason>`.
    async fn set_items(&self, area: &str, items_json: &str) -> zbus::Result<String>;
}
