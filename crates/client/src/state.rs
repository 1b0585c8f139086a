use chrono::Utc;
use db::models::{
    board::{Board, BoardWithTasks},
    task::{CreateTask, DEFAULT_TASK_ICON, DEFAULT_TASK_NAME, Task, UpdateTask, parse_status},
};
use serde::{Deserialize, Serialize};

use crate::api::FALLBACK_ERROR_MESSAGE;

/// Board fields shown in the header; tasks live alongside in [`BoardState`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSummary {
    pub id: String,
    pub name: String,
    pub description: String,
}

impl From<&Board> for BoardSummary {
    fn from(board: &Board) -> Self {
        Self {
            id: board.id.clone(),
            name: board.name.clone(),
            description: board.description.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoardState {
    pub board: Option<BoardSummary>,
    pub tasks: Vec<Task>,
    pub is_loading: bool,
    pub error: Option<String>,
    pub selected_task: Option<Task>,
    pub is_modal_open: bool,
}

/// Local transitions that involve no server round trip of their own.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    FetchStarted,
    FetchSucceeded(BoardWithTasks),
    FetchFailed(String),
    OpenEditModal(Task),
    OpenAddModal,
    CloseModal,
    ClearError,
    Reset,
}

/// A change applied locally before the server confirms it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    RenameBoard { name: String },
    DescribeBoard { description: String },
    AddTask { placeholder_id: String, data: CreateTask },
    UpdateTask { id: String, data: UpdateTask },
    DeleteTask { id: String },
}

/// What the server sent back for a successful [`Mutation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Confirmation {
    Board(BoardWithTasks),
    Task(Task),
    Deleted,
}

impl BoardState {
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|task| task.id == id)
    }

    fn task_index(&self, id: &str) -> Option<usize> {
        self.tasks.iter().position(|task| task.id == id)
    }

    fn close_modal(&mut self) {
        self.is_modal_open = false;
        self.selected_task = None;
    }

    pub fn apply(&self, action: Action) -> BoardState {
        let mut next = self.clone();
        match action {
            Action::FetchStarted => {
                next.is_loading = true;
                next.error = None;
            }
            Action::FetchSucceeded(loaded) => {
                next.board = Some(BoardSummary::from(&loaded.board));
                next.tasks = loaded.tasks;
                next.is_loading = false;
            }
            Action::FetchFailed(message) => {
                next.error = Some(message);
                next.is_loading = false;
            }
            Action::OpenEditModal(task) => {
                next.selected_task = Some(task);
                next.is_modal_open = true;
            }
            Action::OpenAddModal => {
                next.selected_task = None;
                next.is_modal_open = true;
            }
            Action::CloseModal => next.close_modal(),
            Action::ClearError => next.error = None,
            Action::Reset => next = BoardState::default(),
        }
        next
    }

    /// The state as it should look if `mutation` succeeds.
    pub fn optimistic(&self, mutation: &Mutation) -> BoardState {
        let mut next = self.clone();
        match mutation {
            Mutation::RenameBoard { name } => {
                if let Some(board) = next.board.as_mut() {
                    board.name = name.clone();
                }
            }
            Mutation::DescribeBoard { description } => {
                if let Some(board) = next.board.as_mut() {
                    board.description = description.clone();
                }
            }
            Mutation::AddTask {
                placeholder_id,
                data,
            } => {
                let Some(board) = next.board.as_ref() else {
                    return next;
                };
                let placeholder = placeholder_task(placeholder_id, &board.id, data, &next.tasks);
                next.tasks.push(placeholder);
                next.is_loading = true;
                next.error = None;
            }
            Mutation::UpdateTask { id, data } => {
                if let Some(task) = next.tasks.iter_mut().find(|task| &task.id == id) {
                    merge_update(task, data);
                }
            }
            Mutation::DeleteTask { id } => next.tasks.retain(|task| &task.id != id),
        }
        next
    }

    /// Resolves an optimistic `mutation` once the server has answered.
    ///
    /// `self` is the optimistic state and `previous` the snapshot taken
    /// before it was applied. On success the server copy replaces the guess.
    /// On failure only the entity the mutation touched is restored, so
    /// unrelated changes made in the meantime survive.
    pub fn settle(
        &self,
        previous: &BoardState,
        mutation: &Mutation,
        outcome: Result<Confirmation, String>,
    ) -> BoardState {
        let mut next = self.clone();
        match (mutation, outcome) {
            (
                Mutation::RenameBoard { .. } | Mutation::DescribeBoard { .. },
                Ok(Confirmation::Board(confirmed)),
            ) => {
                next.board = Some(BoardSummary::from(&confirmed.board));
            }
            (Mutation::AddTask { placeholder_id, .. }, Ok(Confirmation::Task(created))) => {
                match next.task_index(placeholder_id) {
                    Some(index) => next.tasks[index] = created,
                    None => next.tasks.push(created),
                }
                next.is_loading = false;
                next.close_modal();
            }
            (Mutation::UpdateTask { id, .. }, Ok(Confirmation::Task(updated))) => {
                if let Some(index) = next.task_index(id) {
                    next.tasks[index] = updated;
                    next.close_modal();
                }
            }
            (Mutation::DeleteTask { .. }, Ok(Confirmation::Deleted)) => next.close_modal(),
            (_, Ok(other)) => {
                tracing::warn!(?mutation, ?other, "Unexpected confirmation for mutation");
                next.is_loading = false;
            }
            (mutation, Err(message)) => {
                next.rollback(previous, mutation);
                next.error = Some(if message.is_empty() {
                    FALLBACK_ERROR_MESSAGE.to_string()
                } else {
                    message
                });
            }
        }
        next
    }

    fn rollback(&mut self, previous: &BoardState, mutation: &Mutation) {
        match mutation {
            Mutation::RenameBoard { .. } | Mutation::DescribeBoard { .. } => {
                self.board = previous.board.clone();
            }
            Mutation::AddTask { placeholder_id, .. } => {
                self.tasks.retain(|task| &task.id != placeholder_id);
                self.is_loading = false;
            }
            Mutation::UpdateTask { id, .. } => {
                if let (Some(index), Some(original)) = (self.task_index(id), previous.task(id)) {
                    self.tasks[index] = original.clone();
                }
            }
            Mutation::DeleteTask { id } => {
                if self.task(id).is_some() {
                    return;
                }
                if let Some(index) = previous.task_index(id) {
                    let at = index.min(self.tasks.len());
                    self.tasks.insert(at, previous.tasks[index].clone());
                }
            }
        }
    }
}

fn placeholder_task(id: &str, board_id: &str, data: &CreateTask, tasks: &[Task]) -> Task {
    let non_empty = |value: &Option<String>| value.clone().filter(|v| !v.is_empty());
    let status = non_empty(&data.status)
        .and_then(|raw| parse_status(&raw).ok())
        .unwrap_or_default();
    let task_order = tasks
        .iter()
        .map(|task| task.task_order)
        .max()
        .map_or(0, |max| max + 1);
    let now = Utc::now();

    Task {
        id: id.to_string(),
        board_id: board_id.to_string(),
        name: non_empty(&data.name).unwrap_or_else(|| DEFAULT_TASK_NAME.to_string()),
        description: data.description.clone().unwrap_or_default(),
        icon: non_empty(&data.icon).unwrap_or_else(|| DEFAULT_TASK_ICON.to_string()),
        status,
        task_order,
        created_at: now,
        updated_at: now,
    }
}

// An unknown status is left for the server to reject.
fn merge_update(task: &mut Task, data: &UpdateTask) {
    if let Some(name) = &data.name {
        task.name = name.clone();
    }
    if let Some(description) = &data.description {
        task.description = description.clone();
    }
    if let Some(icon) = &data.icon {
        task.icon = icon.clone();
    }
    if let Some(status) = data.status.as_deref().and_then(|raw| parse_status(raw).ok()) {
        task.status = status;
    }
    if let Some(task_order) = data.task_order {
        task.task_order = task_order;
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeZone, Utc};
    use db::models::task::TaskStatus;

    use super::*;

    fn task(id: &str, order: i32) -> Task {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        Task {
            id: id.to_string(),
            board_id: "b1".to_string(),
            name: format!("task {id}"),
            description: String::new(),
            icon: "📚".to_string(),
            status: TaskStatus::Todo,
            task_order: order,
            created_at: at,
            updated_at: at,
        }
    }

    fn loaded() -> BoardState {
        BoardState {
            board: Some(BoardSummary {
                id: "b1".to_string(),
                name: "My Task Board".to_string(),
                description: "Tasks to keep organised".to_string(),
            }),
            tasks: vec![task("t1", 0), task("t2", 1), task("t3", 2)],
            ..Default::default()
        }
    }

    fn board_with(name: &str, description: &str) -> BoardWithTasks {
        let at = Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap();
        BoardWithTasks {
            board: Board {
                id: "b1".to_string(),
                name: name.to_string(),
                description: description.to_string(),
                created_at: at,
                updated_at: at,
            },
            tasks: vec![task("t1", 0)],
        }
    }

    #[test]
    fn fetch_actions_track_loading_and_errors() {
        let state = BoardState {
            error: Some("old".to_string()),
            ..Default::default()
        };

        let loading = state.apply(Action::FetchStarted);
        assert!(loading.is_loading);
        assert_eq!(loading.error, None);

        let failed = loading.apply(Action::FetchFailed("No board found with ID: x".to_string()));
        assert!(!failed.is_loading);
        assert_eq!(failed.error.as_deref(), Some("No board found with ID: x"));

        let ok = loading.apply(Action::FetchSucceeded(board_with("Sprint", "d")));
        assert!(!ok.is_loading);
        assert_eq!(ok.board.as_ref().unwrap().name, "Sprint");
        assert_eq!(ok.tasks.len(), 1);
    }

    #[test]
    fn modal_actions_select_and_clear_task() {
        let state = loaded();

        let editing = state.apply(Action::OpenEditModal(task("t2", 1)));
        assert!(editing.is_modal_open);
        assert_eq!(editing.selected_task.as_ref().unwrap().id, "t2");

        let adding = editing.apply(Action::OpenAddModal);
        assert!(adding.is_modal_open);
        assert_eq!(adding.selected_task, None);

        let closed = editing.apply(Action::CloseModal);
        assert!(!closed.is_modal_open);
        assert_eq!(closed.selected_task, None);

        let failed = state.apply(Action::FetchFailed("x".to_string()));
        assert_eq!(failed.apply(Action::ClearError).error, None);
        assert_eq!(failed.apply(Action::Reset), BoardState::default());
    }

    #[test]
    fn failed_rename_restores_board_and_sets_error() {
        let previous = loaded();
        let mutation = Mutation::RenameBoard {
            name: "Renamed".to_string(),
        };

        let guess = previous.optimistic(&mutation);
        assert_eq!(guess.board.as_ref().unwrap().name, "Renamed");

        let settled = guess.settle(&previous, &mutation, Err("Internal server error".to_string()));
        assert_eq!(settled.board, previous.board);
        assert_eq!(settled.error.as_deref(), Some("Internal server error"));
    }

    #[test]
    fn successful_describe_takes_server_copy() {
        let previous = loaded();
        let mutation = Mutation::DescribeBoard {
            description: "draft".to_string(),
        };

        let settled = previous.optimistic(&mutation).settle(
            &previous,
            &mutation,
            Ok(Confirmation::Board(board_with("My Task Board", "final"))),
        );

        assert_eq!(settled.board.as_ref().unwrap().description, "final");
        assert_eq!(settled.tasks, previous.tasks);
        assert_eq!(settled.error, None);
    }

    #[test]
    fn failed_task_update_restores_previous_task() {
        let previous = loaded().apply(Action::OpenEditModal(task("t2", 1)));
        let mutation = Mutation::UpdateTask {
            id: "t2".to_string(),
            data: UpdateTask {
                name: Some("edited".to_string()),
                status: Some("completed".to_string()),
                ..Default::default()
            },
        };

        let guess = previous.optimistic(&mutation);
        let guessed = guess.task("t2").unwrap();
        assert_eq!(guessed.name, "edited");
        assert_eq!(guessed.status, TaskStatus::Completed);

        let settled = guess.settle(&previous, &mutation, Err(String::new()));
        assert_eq!(settled.task("t2"), previous.task("t2"));
        assert_eq!(settled.error.as_deref(), Some("Request failed"));
        assert!(settled.is_modal_open);
    }

    #[test]
    fn successful_task_update_replaces_guess_and_closes_modal() {
        let previous = loaded().apply(Action::OpenEditModal(task("t2", 1)));
        let mutation = Mutation::UpdateTask {
            id: "t2".to_string(),
            data: UpdateTask {
                icon: Some("🏆".to_string()),
                ..Default::default()
            },
        };
        let mut server_copy = task("t2", 1);
        server_copy.icon = "🏆".to_string();
        server_copy.updated_at = Utc::now();

        let settled = previous.optimistic(&mutation).settle(
            &previous,
            &mutation,
            Ok(Confirmation::Task(server_copy.clone())),
        );

        assert_eq!(settled.task("t2"), Some(&server_copy));
        assert!(!settled.is_modal_open);
        assert_eq!(settled.selected_task, None);
    }

    #[test]
    fn add_task_shows_placeholder_until_confirmed() {
        let previous = loaded().apply(Action::OpenAddModal);
        let mutation = Mutation::AddTask {
            placeholder_id: "pending-1".to_string(),
            data: CreateTask {
                name: Some(String::new()),
                status: Some("in_progress".to_string()),
                ..Default::default()
            },
        };

        let guess = previous.optimistic(&mutation);
        let placeholder = guess.task("pending-1").unwrap();
        assert_eq!(placeholder.name, DEFAULT_TASK_NAME);
        assert_eq!(placeholder.icon, DEFAULT_TASK_ICON);
        assert_eq!(placeholder.status, TaskStatus::InProgress);
        assert_eq!(placeholder.task_order, 3);
        assert!(guess.is_loading);

        let created = task("t4", 3);
        let settled = guess.settle(&previous, &mutation, Ok(Confirmation::Task(created.clone())));
        assert_eq!(settled.tasks.last(), Some(&created));
        assert!(settled.task("pending-1").is_none());
        assert!(!settled.is_loading);
        assert!(!settled.is_modal_open);

        let failed = guess.settle(&previous, &mutation, Err("Board not found".to_string()));
        assert_eq!(failed.tasks, previous.tasks);
        assert!(!failed.is_loading);
        assert_eq!(failed.error.as_deref(), Some("Board not found"));
    }

    #[test]
    fn failed_delete_puts_task_back_in_place() {
        let previous = loaded();
        let mutation = Mutation::DeleteTask {
            id: "t2".to_string(),
        };

        let guess = previous.optimistic(&mutation);
        assert!(guess.task("t2").is_none());

        let settled = guess.settle(&previous, &mutation, Err("Task not found".to_string()));
        assert_eq!(settled.tasks, previous.tasks);

        let deleted = guess.settle(&previous, &mutation, Ok(Confirmation::Deleted));
        assert_eq!(deleted.tasks.len(), 2);
    }

    #[test]
    fn rollback_leaves_unrelated_changes_alone() {
        let previous = loaded();
        let mutation = Mutation::UpdateTask {
            id: "t1".to_string(),
            data: UpdateTask {
                name: Some("first".to_string()),
                ..Default::default()
            },
        };
        let rename_t3 = Mutation::UpdateTask {
            id: "t3".to_string(),
            data: UpdateTask {
                name: Some("third".to_string()),
                ..Default::default()
            },
        };

        let interleaved = previous.optimistic(&mutation).optimistic(&rename_t3);
        let settled = interleaved.settle(&previous, &mutation, Err("boom".to_string()));

        assert_eq!(settled.task("t1"), previous.task("t1"));
        assert_eq!(settled.task("t3").unwrap().name, "third");
    }
}
