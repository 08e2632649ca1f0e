/*
[INPUT]:  Configured board ids + a `TrelloApi` transport
[OUTPUT]: `BoardMap` with exactly one entry (loaded or failed) per unique board id
[POS]:    Fetch layer - request planning, batching and reshaping into the domain model
[UPDATE]: When changing requested resources, batching, or the per-board failure policy
*/

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, error};

use trello_board_adapter::{
    BOARD_FIELDS, BatchRequest, BatchResponse, CARD_FIELDS, LIST_FIELDS, ListFilter, RemoteBoard,
    RemoteCard, RemoteList, Result, TrelloApi, TrelloError,
};

use crate::config::FetchStrategyKind;
use crate::model::{Board, BoardEntry, BoardMap, Card, List, unique_board_ids};

/// Turns board ids into domain boards.
///
/// Implementations isolate failures per board: a board that cannot be fetched
/// becomes [`BoardEntry::Failed`]. `Err` is reserved for failures that leave
/// no board fetched at all (transport, malformed batch).
#[async_trait]
pub trait FetchStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    async fn fetch(&self, board_ids: &[String]) -> Result<BoardMap>;
}

/// Build the strategy selected in configuration
pub fn strategy_for(kind: FetchStrategyKind, api: Arc<dyn TrelloApi>) -> Arc<dyn FetchStrategy> {
    match kind {
        FetchStrategyKind::Batched => Arc::new(BatchedFetch::new(api)),
        FetchStrategyKind::Sequential => Arc::new(SequentialFetch::new(api)),
    }
}

/// Fetches every board through one `fetch_batch` call (board, lists, cards per board)
pub struct BatchedFetch {
    api: Arc<dyn TrelloApi>,
}

impl BatchedFetch {
    pub fn new(api: Arc<dyn TrelloApi>) -> Self {
        Self { api }
    }

    /// Three requests per board, in board order
    pub fn build_requests(board_ids: &[String]) -> Vec<BatchRequest> {
        board_ids
            .iter()
            .flat_map(|board_id| {
                [
                    BatchRequest::get_board(board_id, BOARD_FIELDS),
                    BatchRequest::get_lists(board_id, LIST_FIELDS, ListFilter::Open),
                    BatchRequest::get_cards(board_id, CARD_FIELDS),
                ]
            })
            .collect()
    }
}

#[async_trait]
impl FetchStrategy for BatchedFetch {
    fn name(&self) -> &'static str {
        "batched"
    }

    async fn fetch(&self, board_ids: &[String]) -> Result<BoardMap> {
        let board_ids = unique_board_ids(board_ids);
        let requests = Self::build_requests(&board_ids);

        debug!(boards = board_ids.len(), requests = requests.len(), "Fetching boards lists");
        let responses = self.api.fetch_batch(&requests).await?;

        if responses.len() != requests.len() {
            return Err(TrelloError::InvalidResponse(format!(
                "expected {} batch responses, got {}",
                requests.len(),
                responses.len()
            )));
        }

        Ok(boards_from_batch(&board_ids, responses))
    }
}

/// Reshape ordered batch responses, three per board, into a `BoardMap`
pub fn boards_from_batch(board_ids: &[String], responses: Vec<BatchResponse>) -> BoardMap {
    let mut responses = responses.into_iter();
    let mut boards = BoardMap::with_capacity(board_ids.len());

    for board_id in board_ids {
        let entry = match (responses.next(), responses.next(), responses.next()) {
            (Some(board), Some(lists), Some(cards)) => board_entry(board_id, board, lists, cards),
            _ => {
                error!(%board_id, "Batch reply ended before this board's responses");
                BoardEntry::failed(board_id)
            }
        };
        boards.insert(board_id.clone(), entry);
    }

    boards
}

fn board_entry(
    board_id: &str,
    board: BatchResponse,
    lists: BatchResponse,
    cards: BatchResponse,
) -> BoardEntry {
    let (board_ok, lists_ok, cards_ok) = (board.is_success(), lists.is_success(), cards.is_success());

    if board_ok && lists_ok && cards_ok {
        if let (Some(board), Some(lists), Some(cards)) =
            (board.into_board(), lists.into_lists(), cards.into_cards())
        {
            return BoardEntry::Loaded(build_board(board_id, board, lists, cards));
        }
    }

    error!(
        %board_id,
        board = board_ok,
        lists = lists_ok,
        cards = cards_ok,
        "Unable to fetch data for board"
    );
    BoardEntry::failed(board_id)
}

/// Group a board's flat card sequence under its lists
fn build_board(
    board_id: &str,
    board: RemoteBoard,
    lists: Vec<RemoteList>,
    cards: Vec<RemoteCard>,
) -> Board {
    let mut cards_by_list: HashMap<String, Vec<Card>> = HashMap::new();
    for card in cards {
        cards_by_list
            .entry(card.id_list.clone())
            .or_default()
            .push(Card::from_remote(card));
    }

    let lists: Vec<List> = lists
        .into_iter()
        .map(|list| {
            let cards = cards_by_list.remove(&list.id).unwrap_or_default();
            List::new(list.id, list.name, cards)
        })
        .collect();

    if !cards_by_list.is_empty() {
        let orphaned: usize = cards_by_list.values().map(Vec::len).sum();
        debug!(%board_id, orphaned, "Ignoring cards outside the board's open lists");
    }

    Board::new(board_id, board.name, lists)
}

/// Fetches boards one at a time: board, then its open lists, then each list's cards
pub struct SequentialFetch {
    api: Arc<dyn TrelloApi>,
}

impl SequentialFetch {
    pub fn new(api: Arc<dyn TrelloApi>) -> Self {
        Self { api }
    }

    async fn fetch_board(&self, board_id: &str) -> Result<Board> {
        let board = self.api.get_board(board_id).await?;
        let remote_lists = self.api.list_lists(board_id, ListFilter::Open).await?;

        let mut lists = Vec::with_capacity(remote_lists.len());
        for list in remote_lists {
            let cards = self
                .api
                .list_cards(&list.id)
                .await?
                .into_iter()
                .map(|card| Card {
                    list_id: list.id.clone(),
                    ..Card::from_remote(card)
                })
                .collect();
            lists.push(List::new(list.id, list.name, cards));
        }

        Ok(Board::new(board_id, board.name, lists))
    }
}

#[async_trait]
impl FetchStrategy for SequentialFetch {
    fn name(&self) -> &'static str {
        "sequential"
    }

    async fn fetch(&self, board_ids: &[String]) -> Result<BoardMap> {
        let mut boards = BoardMap::with_capacity(board_ids.len());

        for board_id in unique_board_ids(board_ids) {
            debug!(%board_id, "Fetching board");
            let entry = match self.fetch_board(&board_id).await {
                Ok(board) => BoardEntry::Loaded(board),
                Err(err) => {
                    error!(%board_id, error = %err, "Unable to fetch board");
                    BoardEntry::failed(&board_id)
                }
            };
            boards.insert(board_id, entry);
        }

        Ok(boards)
    }
}
