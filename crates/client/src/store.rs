use db::models::{
    board::{BoardWithTasks, CreateBoard, UpdateBoard},
    task::{CreateTask, Task, UpdateTask},
};
use uuid::Uuid;

use crate::{
    api::{BoardApi, ClientError},
    state::{Action, BoardState, Confirmation, Mutation},
};

/// Drives a [`BoardState`] against the remote API.
///
/// Every mutating call snapshots the state, applies the change
/// optimistically, performs the request and then settles with the server's
/// answer. Calls take `&mut self`, so one store never has two requests in
/// flight; separate stores editing the same task are last-response-wins.
#[derive(Debug, Clone)]
pub struct BoardStore {
    api: BoardApi,
    state: BoardState,
}

impl BoardStore {
    pub fn new(api: BoardApi) -> Self {
        Self {
            api,
            state: BoardState::default(),
        }
    }

    pub fn state(&self) -> &BoardState {
        &self.state
    }

    pub fn api(&self) -> &BoardApi {
        &self.api
    }

    pub fn dispatch(&mut self, action: Action) {
        self.state = self.state.apply(action);
    }

    pub async fn fetch_board(&mut self, board_id: &str) -> Result<BoardWithTasks, ClientError> {
        self.dispatch(Action::FetchStarted);
        let result = self.api.get_board(board_id).await;
        self.load(result)
    }

    pub async fn create_board(&mut self, data: &CreateBoard) -> Result<BoardWithTasks, ClientError> {
        self.dispatch(Action::FetchStarted);
        let result = self.api.create_board(data).await;
        self.load(result)
    }

    fn load(
        &mut self,
        result: Result<BoardWithTasks, ClientError>,
    ) -> Result<BoardWithTasks, ClientError> {
        match result {
            Ok(board) => {
                self.dispatch(Action::FetchSucceeded(board.clone()));
                Ok(board)
            }
            Err(err) => {
                self.dispatch(Action::FetchFailed(err.user_message()));
                Err(err)
            }
        }
    }

    /// No-op when no board is loaded.
    pub async fn update_board_name(&mut self, name: &str) -> Result<(), ClientError> {
        let Some(board_id) = self.board_id() else {
            return Ok(());
        };
        let mutation = Mutation::RenameBoard {
            name: name.to_string(),
        };
        let update = UpdateBoard {
            name: Some(name.to_string()),
            description: None,
        };
        self.update_board(&board_id, mutation, update).await
    }

    /// No-op when no board is loaded.
    pub async fn update_board_description(&mut self, description: &str) -> Result<(), ClientError> {
        let Some(board_id) = self.board_id() else {
            return Ok(());
        };
        let mutation = Mutation::DescribeBoard {
            description: description.to_string(),
        };
        let update = UpdateBoard {
            name: None,
            description: Some(description.to_string()),
        };
        self.update_board(&board_id, mutation, update).await
    }

    async fn update_board(
        &mut self,
        board_id: &str,
        mutation: Mutation,
        update: UpdateBoard,
    ) -> Result<(), ClientError> {
        let previous = self.begin(&mutation);
        let outcome = self
            .api
            .update_board(board_id, &update)
            .await
            .map(Confirmation::Board);
        self.settle(&previous, &mutation, outcome).map(|_| ())
    }

    /// `Ok(None)` when no board is loaded.
    pub async fn add_task(&mut self, data: &CreateTask) -> Result<Option<Task>, ClientError> {
        let Some(board_id) = self.board_id() else {
            return Ok(None);
        };
        let mutation = Mutation::AddTask {
            placeholder_id: format!("pending-{}", Uuid::new_v4()),
            data: data.clone(),
        };

        let previous = self.begin(&mutation);
        let outcome = self
            .api
            .add_task(&board_id, data)
            .await
            .map(Confirmation::Task);
        self.settle(&previous, &mutation, outcome)
            .map(|confirmation| match confirmation {
                Confirmation::Task(task) => Some(task),
                _ => None,
            })
    }

    /// `Ok(None)` when the task is not part of the loaded board.
    pub async fn update_task(
        &mut self,
        task_id: &str,
        data: &UpdateTask,
    ) -> Result<Option<Task>, ClientError> {
        if self.state.task(task_id).is_none() {
            return Ok(None);
        }
        let mutation = Mutation::UpdateTask {
            id: task_id.to_string(),
            data: data.clone(),
        };

        let previous = self.begin(&mutation);
        let outcome = self
            .api
            .update_task(task_id, data)
            .await
            .map(Confirmation::Task);
        self.settle(&previous, &mutation, outcome)
            .map(|confirmation| match confirmation {
                Confirmation::Task(task) => Some(task),
                _ => None,
            })
    }

    /// `Ok(false)` when the task is not part of the loaded board.
    pub async fn delete_task(&mut self, task_id: &str) -> Result<bool, ClientError> {
        if self.state.task(task_id).is_none() {
            return Ok(false);
        }
        let mutation = Mutation::DeleteTask {
            id: task_id.to_string(),
        };

        let previous = self.begin(&mutation);
        let outcome = self
            .api
            .delete_task(task_id)
            .await
            .map(|_| Confirmation::Deleted);
        self.settle(&previous, &mutation, outcome).map(|_| true)
    }

    fn board_id(&self) -> Option<String> {
        self.state.board.as_ref().map(|board| board.id.clone())
    }

    fn begin(&mut self, mutation: &Mutation) -> BoardState {
        let previous = self.state.clone();
        self.state = self.state.optimistic(mutation);
        previous
    }

    fn settle(
        &mut self,
        previous: &BoardState,
        mutation: &Mutation,
        outcome: Result<Confirmation, ClientError>,
    ) -> Result<Confirmation, ClientError> {
        let local = match &outcome {
            Ok(confirmation) => Ok(confirmation.clone()),
            Err(err) => Err(err.user_message()),
        };
        self.state = self.state.settle(previous, mutation, local);
        outcome
    }
}
