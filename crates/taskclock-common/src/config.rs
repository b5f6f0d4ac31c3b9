use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DbusConfig {
    pub service_name: String,
    pub object_path: String,
}

impl Default for DbusConfig {
    fn default() -> Self {
        Self {
            service_name: "org.taskclock.Coordinator".to_string(),
            object_path: "/org/taskclock/Coordinator".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dbus_config_default() {
        let config = DbusConfig::default();
        assert_eq!(config.service_name, "org.taskclock.Coordinator");
        assert_eq!(config.object_path, "/org/taskclock/Coordinator");
    }
}
