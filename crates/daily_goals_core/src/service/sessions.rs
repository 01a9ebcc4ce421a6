//! Time session operations.
//!
//! A user is either Idle (no open session) or Active (exactly one open session).
//! Starting is only legal from Idle, for any subtask. Ending is terminal: the
//! session gets its end time and duration and never changes again.

use tracing::{error, info, warn};
use uuid::Uuid;

use super::TrackerService;
use crate::domain::{CompletionOutcome, EndedSession, TimeSession, TimeSessionDetail};
use crate::ports::{PortError, PortResult};

impl TrackerService {
    pub async fn list_sessions(
        &self,
        user_id: Uuid,
        subtask_id: Option<Uuid>,
    ) -> PortResult<Vec<TimeSessionDetail>> {
        self.store.list_sessions(user_id, subtask_id).await
    }

    /// The caller's open session and the whole seconds elapsed on it so far.
    pub async fn active_session(&self, user_id: Uuid) -> PortResult<Option<(TimeSession, i64)>> {
        let now = self.clock.now();
        Ok(self
            .store
            .find_open_session(user_id)
            .await?
            .map(|session| {
                let elapsed = session.elapsed_at(now);
                (session, elapsed)
            }))
    }

    pub async fn start_session(&self, user_id: Uuid, subtask_id: Uuid) -> PortResult<TimeSession> {
        self.store.get_subtask(user_id, subtask_id).await?;

        if let Some(open) = self.store.find_open_session(user_id).await? {
            warn!(%user_id, open_session = %open.id, "Refusing to start a second time session");
            return Err(PortError::session_already_active());
        }

        // The store re-checks the rule atomically, so a concurrent start that
        // slipped past the read above still ends up as a conflict.
        let session = self
            .store
            .insert_session(user_id, subtask_id, self.clock.now())
            .await?;
        info!(%user_id, %subtask_id, session_id = %session.id, "Time session started");
        Ok(session)
    }

    /// Ends an open session, then credits its duration to the subtask, marks the
    /// subtask completed and checks the goal set for completion.
    ///
    /// Only the session write can fail the call. The follow-up steps are logged
    /// on failure and reported through `EndedSession`.
    pub async fn end_session(&self, user_id: Uuid, session_id: Uuid) -> PortResult<EndedSession> {
        let session = self.store.get_session(user_id, session_id).await?;
        if !session.is_active() {
            return Err(PortError::session_already_ended());
        }

        let end_time = self.clock.now();
        let duration = session.elapsed_at(end_time);
        let session = self
            .store
            .close_session(session_id, end_time, duration)
            .await?
            .ok_or_else(PortError::session_already_ended)?;
        info!(%user_id, %session_id, duration, "Time session ended");

        let subtask = match self
            .store
            .accumulate_subtask_time(session.subtask_id, duration, end_time)
            .await
        {
            Ok(subtask) => Some(subtask),
            Err(e) => {
                error!(
                    %session_id,
                    subtask_id = %session.subtask_id,
                    "Failed to credit session time to subtask: {:?}",
                    e
                );
                None
            }
        };

        let completion = match subtask {
            Some(_) => self.record_completion(user_id).await.unwrap_or_else(|e| {
                error!(%user_id, %session_id, "Completion check failed: {:?}", e);
                CompletionOutcome::default()
            }),
            None => CompletionOutcome::default(),
        };

        Ok(EndedSession {
            session,
            duration,
            subtask,
            completion,
        })
    }
}
