use redis::AsyncCommands;

use crate::dto::HealthDependencyStatus;

use super::dependency_status;

/// Reports `memory` for the in-process store and pings Redis otherwise.
pub(super) async fn check_store(redis_client: Option<redis::Client>) -> HealthDependencyStatus {
    let Some(redis_client) = redis_client else {
        return dependency_status("memory", None);
    };

    let mut connection = match redis_client.get_multiplexed_async_connection().await {
        Ok(connection) => connection,
        Err(error) => {
            return dependency_status("error", Some(format!("redis connection failed: {error}")));
        }
    };

    match connection.ping::<String>().await {
        Ok(value) if value.eq_ignore_ascii_case("pong") => dependency_status("ok", None),
        Ok(value) => dependency_status(
            "error",
            Some(format!("unexpected redis ping response: {value}")),
        ),
        Err(error) => dependency_status("error", Some(format!("redis ping failed: {error}"))),
    }
}
