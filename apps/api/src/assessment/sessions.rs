use redis::AsyncCommands;
use uuid::Uuid;

use crate::assessment::flow::QuizSession;
use crate::errors::AppError;

/// Quiz sessions stored in Redis as JSON, expiring after a TTL refreshed on
/// every save.
#[derive(Clone)]
pub struct SessionStore {
    client: redis::Client,
    ttl_secs: u64,
}

impl SessionStore {
    pub fn new(client: redis::Client, ttl_secs: u64) -> Self {
        Self { client, ttl_secs }
    }

    pub async fn save(&self, session: &QuizSession) -> Result<(), AppError> {
        let payload = serde_json::to_string(session)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("session serialization: {e}")))?;
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        redis::cmd("SET")
            .arg(session_key(session.id))
            .arg(payload)
            .arg("EX")
            .arg(self.ttl_secs)
            .query_async::<_, ()>(&mut conn)
            .await?;
        Ok(())
    }

    pub async fn load(&self, id: Uuid) -> Result<QuizSession, AppError> {
        let mut conn = self.client.get_multiplexed_async_connection().await?;
        let payload: Option<String> = conn.get(session_key(id)).await?;
        let payload =
            payload.ok_or_else(|| AppError::NotFound(format!("Quiz session {id} not found")))?;
        serde_json::from_str(&payload)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("corrupt quiz session {id}: {e}")))
    }
}

fn session_key(id: Uuid) -> String {
    format!("quiz_session:{id}")
}
