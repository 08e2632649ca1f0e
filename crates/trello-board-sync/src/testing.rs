/*
[INPUT]:  Boards/lists/cards declared by a test
[OUTPUT]: In-memory `TrelloApi` with failure injection, call counters and a batch gate
[POS]:    Test infrastructure - shared by fetch, coordinator and action tests
[UPDATE]: When `TrelloApi` grows or tests need new failure modes
*/

use std::collections::HashSet;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Semaphore;
use trello_board_adapter::{
    BatchBody, BatchRequest, BatchResponse, BoardFilter, ListFilter, Member, RemoteBoard,
    RemoteCard, RemoteList, Result, TrelloApi, TrelloError,
};

pub(crate) fn ids(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) enum RequestKind {
    Board,
    Lists,
    Cards,
}

#[derive(Debug, Clone)]
struct FakeBoard {
    id: String,
    name: String,
    lists: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct FakeState {
    boards: Vec<FakeBoard>,
    cards: Vec<RemoteCard>,
    failing: HashSet<(String, RequestKind)>,
    fail_transport: bool,
    reject_writes: bool,
    created: usize,
}

impl FakeState {
    fn board(&self, board_id: &str) -> Option<&FakeBoard> {
        self.boards.iter().find(|board| board.id == board_id)
    }

    fn list(&self, list_id: &str) -> Option<(&FakeBoard, &(String, String))> {
        self.boards.iter().find_map(|board| {
            board
                .lists
                .iter()
                .find(|(id, _)| id == list_id)
                .map(|list| (board, list))
        })
    }

    fn check(&self, board_id: &str, kind: RequestKind) -> Result<()> {
        if self.fail_transport {
            return Err(TrelloError::Timeout { duration: 30 });
        }
        if self.failing.contains(&(board_id.to_string(), kind)) || self.board(board_id).is_none() {
            return Err(TrelloError::NotFound(format!("board {board_id}")));
        }
        Ok(())
    }

    fn remote_board(&self, board_id: &str) -> Result<RemoteBoard> {
        self.check(board_id, RequestKind::Board)?;
        let board = self.board(board_id).expect("checked");
        Ok(RemoteBoard {
            id: board.id.clone(),
            name: board.name.clone(),
            closed: false,
        })
    }

    fn remote_lists(&self, board_id: &str) -> Result<Vec<RemoteList>> {
        self.check(board_id, RequestKind::Lists)?;
        let board = self.board(board_id).expect("checked");
        Ok(board
            .lists
            .iter()
            .map(|(id, name)| remote_list(board, id, name))
            .collect())
    }

    fn remote_cards(&self, board_id: &str) -> Result<Vec<RemoteCard>> {
        self.check(board_id, RequestKind::Cards)?;
        let board = self.board(board_id).expect("checked");
        Ok(self
            .cards
            .iter()
            .filter(|card| board.lists.iter().any(|(id, _)| *id == card.id_list))
            .cloned()
            .collect())
    }
}

fn remote_list(board: &FakeBoard, id: &str, name: &str) -> RemoteList {
    RemoteList {
        id: id.to_string(),
        name: name.to_string(),
        closed: false,
        id_board: Some(board.id.clone()),
        cards: Vec::new(),
    }
}

/// In-memory Trello used in place of the HTTP client
#[derive(Debug, Default)]
pub(crate) struct FakeTrello {
    state: Mutex<FakeState>,
    batch_calls: AtomicUsize,
    read_calls: AtomicUsize,
    gate: Mutex<Option<Arc<Semaphore>>>,
}

impl FakeTrello {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_board(self, id: &str, name: &str, lists: &[(&str, &str)]) -> Self {
        self.state.lock().unwrap().boards.push(FakeBoard {
            id: id.to_string(),
            name: name.to_string(),
            lists: lists
                .iter()
                .map(|(id, name)| (id.to_string(), name.to_string()))
                .collect(),
        });
        self
    }

    pub(crate) fn with_card(self, id: &str, list_id: &str, name: &str) -> Self {
        self.state.lock().unwrap().cards.push(RemoteCard {
            id: id.to_string(),
            name: name.to_string(),
            desc: String::new(),
            due: None,
            id_list: list_id.to_string(),
            closed: false,
        });
        self
    }

    pub(crate) fn fail_board(&self, board_id: &str) {
        for kind in [RequestKind::Board, RequestKind::Lists, RequestKind::Cards] {
            self.fail_request(board_id, kind);
        }
    }

    pub(crate) fn fail_request(&self, board_id: &str, kind: RequestKind) {
        self.state
            .lock()
            .unwrap()
            .failing
            .insert((board_id.to_string(), kind));
    }

    pub(crate) fn fail_transport(&self, fail: bool) {
        self.state.lock().unwrap().fail_transport = fail;
    }

    pub(crate) fn reject_writes(&self, reject: bool) {
        self.state.lock().unwrap().reject_writes = reject;
    }

    pub(crate) fn rename_board(&self, board_id: &str, name: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(board) = state.boards.iter_mut().find(|board| board.id == board_id) {
            board.name = name.to_string();
        }
    }

    pub(crate) fn batch_calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }

    pub(crate) fn read_calls(&self) -> usize {
        self.read_calls.load(Ordering::SeqCst)
    }

    /// Park every following `fetch_batch` until permits are added to the returned semaphore
    pub(crate) fn hold_batches(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Resolves once `count` batch calls have started
    pub(crate) async fn wait_for_batch_calls(&self, count: usize) {
        while self.batch_calls() < count {
            tokio::task::yield_now().await;
        }
    }

    fn read(&self) -> std::sync::MutexGuard<'_, FakeState> {
        self.read_calls.fetch_add(1, Ordering::SeqCst);
        self.state.lock().unwrap()
    }
}

#[async_trait]
impl TrelloApi for FakeTrello {
    async fn get_board(&self, board_id: &str) -> Result<RemoteBoard> {
        self.read().remote_board(board_id)
    }

    async fn list_lists(&self, board_id: &str, _filter: ListFilter) -> Result<Vec<RemoteList>> {
        self.read().remote_lists(board_id)
    }

    async fn list_cards(&self, list_id: &str) -> Result<Vec<RemoteCard>> {
        let state = self.read();
        if state.fail_transport {
            return Err(TrelloError::Timeout { duration: 30 });
        }
        Ok(state
            .cards
            .iter()
            .filter(|card| card.id_list == list_id)
            .cloned()
            .collect())
    }

    async fn get_card(&self, card_id: &str) -> Result<RemoteCard> {
        self.state
            .lock()
            .unwrap()
            .cards
            .iter()
            .find(|card| card.id == card_id)
            .cloned()
            .ok_or_else(|| TrelloError::NotFound(format!("card {card_id}")))
    }

    async fn get_list(&self, list_id: &str) -> Result<RemoteList> {
        let state = self.state.lock().unwrap();
        state
            .list(list_id)
            .map(|(board, (id, name))| remote_list(board, id, name))
            .ok_or_else(|| TrelloError::NotFound(format!("list {list_id}")))
    }

    async fn change_list(&self, card_id: &str, target_list_id: &str) -> Result<RemoteCard> {
        let mut state = self.state.lock().unwrap();
        if state.reject_writes {
            return Err(TrelloError::Api {
                code: 403,
                message: "write rejected".to_string(),
            });
        }
        let card = state
            .cards
            .iter_mut()
            .find(|card| card.id == card_id)
            .ok_or_else(|| TrelloError::NotFound(format!("card {card_id}")))?;
        card.id_list = target_list_id.to_string();
        Ok(card.clone())
    }

    async fn add_card(&self, list_id: &str, name: &str, desc: &str) -> Result<RemoteCard> {
        let mut state = self.state.lock().unwrap();
        if state.reject_writes {
            return Err(TrelloError::Api {
                code: 403,
                message: "write rejected".to_string(),
            });
        }
        if state.list(list_id).is_none() {
            return Err(TrelloError::NotFound(format!("list {list_id}")));
        }
        state.created += 1;
        let card = RemoteCard {
            id: format!("new-{}", state.created),
            name: name.to_string(),
            desc: desc.to_string(),
            due: None,
            id_list: list_id.to_string(),
            closed: false,
        };
        state.cards.push(card.clone());
        Ok(card)
    }

    async fn fetch_batch(&self, requests: &[BatchRequest]) -> Result<Vec<BatchResponse>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.expect("gate open").forget();
        }

        let state = self.state.lock().unwrap();
        if state.fail_transport {
            return Err(TrelloError::Timeout { duration: 30 });
        }

        Ok(requests
            .iter()
            .map(|request| {
                let board_id = request.board_id();
                let body = match request {
                    BatchRequest::GetBoard { .. } => state.remote_board(board_id).map(BatchBody::Board),
                    BatchRequest::GetLists { .. } => state.remote_lists(board_id).map(BatchBody::Lists),
                    BatchRequest::GetCards { .. } => state.remote_cards(board_id).map(BatchBody::Cards),
                };
                match body {
                    Ok(body) => BatchResponse { status: 200, body },
                    Err(err) => BatchResponse::failed(404, err.to_string()),
                }
            })
            .collect())
    }

    async fn get_member(&self, member_id: &str) -> Result<Member> {
        Ok(Member {
            id: member_id.to_string(),
            username: "tester".to_string(),
            full_name: "Test Member".to_string(),
            email: None,
        })
    }

    async fn list_boards(&self, _filter: BoardFilter) -> Result<Vec<RemoteBoard>> {
        let state = self.state.lock().unwrap();
        Ok(state
            .boards
            .iter()
            .map(|board| RemoteBoard {
                id: board.id.clone(),
                name: board.name.clone(),
                closed: false,
            })
            .collect())
    }
}
