use chrono::NaiveDate;

use crate::api::{ApiError, ReflectApi};
use crate::models::{Goal, GoalStatus, GoalUpdate, NewGoal};
use crate::session::Session;
use crate::state::{SuccessFlag, record_error};

/// Active and completed goals.
///
/// Every mutation applies the record echoed by the server to the local lists;
/// nothing here re-fetches after a write.
#[derive(Debug, Clone, Default)]
pub struct GoalsState {
    pub active: Vec<Goal>,
    pub completed: Vec<Goal>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: SuccessFlag,
}

impl GoalsState {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn load<A: ReflectApi>(&mut self, api: &A, session: &Session) -> Result<(), ApiError> {
        self.loading = true;
        let active = api.goals(session, Some(GoalStatus::Active)).await;
        let completed = match active {
            Ok(_) => api.goals(session, Some(GoalStatus::Completed)).await,
            Err(_) => Ok(Vec::new()),
        };
        self.loading = false;

        match (active, completed) {
            (Ok(active), Ok(completed)) => {
                self.active = active;
                self.completed = completed;
                self.error = None;
                Ok(())
            }
            (Err(err), _) | (_, Err(err)) => Err(record_error(&mut self.error, err)),
        }
    }

    pub fn find(&self, id: i64) -> Option<&Goal> {
        self.active.iter().chain(self.completed.iter()).find(|g| g.id == id)
    }

    pub async fn create<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        description: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Goal, ApiError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("Goal description cannot be empty"),
            ));
        }

        let body = NewGoal {
            description: description.to_string(),
            deadline,
        };
        match api.create_goal(session, &body).await {
            Ok(goal) => {
                log::info!("goal {} created", goal.id);
                self.error = None;
                self.active.push(goal.clone());
                self.success.raise();
                Ok(goal)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    /// Move a goal between the lists. Applying the same status twice leaves one copy.
    pub async fn set_status<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        id: i64,
        status: GoalStatus,
    ) -> Result<Goal, ApiError> {
        let update = GoalUpdate {
            status: Some(status),
            ..Default::default()
        };
        match api.update_goal(session, id, &update).await {
            Ok(goal) => {
                log::info!("goal {} is now {}", id, goal.status.as_str());
                self.error = None;
                self.place(goal.clone());
                self.success.raise();
                Ok(goal)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub async fn edit<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        id: i64,
        description: &str,
        deadline: Option<NaiveDate>,
    ) -> Result<Goal, ApiError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("Goal description cannot be empty"),
            ));
        }

        let update = GoalUpdate {
            description: Some(description.to_string()),
            deadline: Some(deadline),
            status: None,
        };
        match api.update_goal(session, id, &update).await {
            Ok(goal) => {
                self.error = None;
                let list = match goal.status {
                    GoalStatus::Active => &mut self.active,
                    GoalStatus::Completed => &mut self.completed,
                };
                match list.iter_mut().find(|g| g.id == goal.id) {
                    Some(slot) => *slot = goal.clone(),
                    None => self.place(goal.clone()),
                }
                Ok(goal)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub async fn delete<A: ReflectApi>(&mut self, api: &A, session: &Session, id: i64) -> Result<(), ApiError> {
        match api.delete_goal(session, id).await {
            Ok(()) => {
                log::info!("goal {} deleted", id);
                self.error = None;
                self.remove(id);
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    fn remove(&mut self, id: i64) {
        self.active.retain(|g| g.id != id);
        self.completed.retain(|g| g.id != id);
    }

    /// Drop any cached copy, then append to the list matching the record's status
    fn place(&mut self, goal: Goal) {
        self.remove(goal.id);
        match goal.status {
            GoalStatus::Active => self.active.push(goal),
            GoalStatus::Completed => self.completed.push(goal),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn goal(id: i64, status: GoalStatus) -> Goal {
        Goal {
            id,
            user_id: 1,
            description: format!("goal {}", id),
            status,
            deadline: None,
            created_at: None,
        }
    }

    #[test]
    fn placing_twice_never_duplicates() {
        let mut state = GoalsState::new();
        state.active = vec![goal(1, GoalStatus::Active), goal(2, GoalStatus::Active)];

        state.place(goal(1, GoalStatus::Completed));
        state.place(goal(1, GoalStatus::Completed));

        assert_eq!(state.active.iter().map(|g| g.id).collect::<Vec<_>>(), vec![2]);
        assert_eq!(state.completed.iter().map(|g| g.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn reopen_moves_back_to_the_end_of_active() {
        let mut state = GoalsState::new();
        state.active = vec![goal(2, GoalStatus::Active)];
        state.completed = vec![goal(1, GoalStatus::Completed)];

        state.place(goal(1, GoalStatus::Active));

        assert_eq!(state.active.iter().map(|g| g.id).collect::<Vec<_>>(), vec![2, 1]);
        assert!(state.completed.is_empty());
        assert!(state.find(1).is_some_and(|g| !g.is_completed()));
    }
}
