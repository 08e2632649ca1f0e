/*
[INPUT]:  Remote Trello payloads reshaped by a fetch strategy
[OUTPUT]: Immutable Card/List/Board values and the per-cycle Snapshot
[POS]:    Domain layer - the stable model read by sensors and actions
[UPDATE]: When adding fields to the published model or new snapshot lookups
*/

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::Serialize;
use trello_board_adapter::RemoteCard;

/// Result of one fetch: one entry per requested board id
pub type BoardMap = HashMap<String, BoardEntry>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Card {
    pub id: String,
    pub name: String,
    pub description: String,
    pub due: Option<DateTime<Utc>>,
    pub list_id: String,
}

impl Card {
    pub fn from_remote(card: RemoteCard) -> Self {
        Self {
            id: card.id,
            name: card.name,
            description: card.desc,
            due: card.due,
            list_id: card.id_list,
        }
    }
}

/// A list and its cards. `card_count` is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct List {
    id: String,
    name: String,
    card_count: usize,
    cards: Vec<Card>,
}

impl List {
    pub fn new(id: impl Into<String>, name: impl Into<String>, cards: Vec<Card>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            card_count: cards.len(),
            cards,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn card_count(&self) -> usize {
        self.card_count
    }

    pub fn cards(&self) -> &[Card] {
        &self.cards
    }

    pub fn contains_card(&self, card_id: &str) -> bool {
        self.cards.iter().any(|card| card.id == card_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    pub id: String,
    pub name: String,
    pub lists: HashMap<String, List>,
}

impl Board {
    /// Build a board keyed by list id
    pub fn new(id: impl Into<String>, name: impl Into<String>, lists: impl IntoIterator<Item = List>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            lists: lists
                .into_iter()
                .map(|list| (list.id.clone(), list))
                .collect(),
        }
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.lists.get(list_id)
    }

    pub fn card_count(&self) -> usize {
        self.lists.values().map(List::card_count).sum()
    }
}

/// Outcome of fetching one configured board.
///
/// A failed board keeps its slot so consumers can tell "configured but
/// erroring" apart from "not configured". It reads as an empty name with no
/// lists; `is_failed` is the signal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum BoardEntry {
    Loaded(Board),
    Failed { id: String },
}

impl BoardEntry {
    pub fn failed(id: impl Into<String>) -> Self {
        BoardEntry::Failed { id: id.into() }
    }

    pub fn id(&self) -> &str {
        match self {
            BoardEntry::Loaded(board) => &board.id,
            BoardEntry::Failed { id } => id,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            BoardEntry::Loaded(board) => &board.name,
            BoardEntry::Failed { .. } => "",
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, BoardEntry::Failed { .. })
    }

    pub fn board(&self) -> Option<&Board> {
        match self {
            BoardEntry::Loaded(board) => Some(board),
            BoardEntry::Failed { .. } => None,
        }
    }

    pub fn list(&self, list_id: &str) -> Option<&List> {
        self.board().and_then(|board| board.list(list_id))
    }

    pub fn list_count(&self) -> usize {
        self.board().map_or(0, |board| board.lists.len())
    }

    pub fn lists(&self) -> impl Iterator<Item = &List> {
        self.board().into_iter().flat_map(|board| board.lists.values())
    }
}

/// Everything one refresh cycle produced. Replaced wholesale, never patched.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    generation: u64,
    refreshed_at: DateTime<Utc>,
    board_ids: Vec<String>,
    boards: BoardMap,
}

impl Snapshot {
    pub fn new(generation: u64, board_ids: &[String], boards: BoardMap) -> Self {
        let board_ids = unique_board_ids(board_ids)
            .into_iter()
            .filter(|board_id| boards.contains_key(board_id))
            .collect();
        Self {
            generation,
            refreshed_at: Utc::now(),
            board_ids,
            boards,
        }
    }

    /// Monotonic cycle counter; the startup snapshot is generation 1
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn refreshed_at(&self) -> DateTime<Utc> {
        self.refreshed_at
    }

    /// Board ids in configuration order
    pub fn board_ids(&self) -> &[String] {
        &self.board_ids
    }

    pub fn get(&self, board_id: &str) -> Option<&BoardEntry> {
        self.boards.get(board_id)
    }

    pub fn contains(&self, board_id: &str) -> bool {
        self.boards.contains_key(board_id)
    }

    /// Entries in configuration order
    pub fn entries(&self) -> impl Iterator<Item = &BoardEntry> {
        self.board_ids
            .iter()
            .filter_map(|board_id| self.boards.get(board_id))
    }

    pub fn len(&self) -> usize {
        self.boards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.boards.is_empty()
    }

    pub fn failed_board_ids(&self) -> Vec<&str> {
        self.entries()
            .filter(|entry| entry.is_failed())
            .map(BoardEntry::id)
            .collect()
    }

    /// Find a list anywhere in the snapshot, with its board
    pub fn find_list(&self, list_id: &str) -> Option<(&Board, &List)> {
        self.entries()
            .filter_map(BoardEntry::board)
            .find_map(|board| board.list(list_id).map(|list| (board, list)))
    }

    /// Find a card anywhere in the snapshot
    pub fn find_card(&self, card_id: &str) -> Option<&Card> {
        self.entries()
            .flat_map(BoardEntry::lists)
            .flat_map(|list| list.cards().iter())
            .find(|card| card.id == card_id)
    }
}

/// Drop repeated ids, keeping the first occurrence
pub fn unique_board_ids(board_ids: &[String]) -> Vec<String> {
    let mut seen = HashSet::new();
    board_ids
        .iter()
        .filter(|board_id| seen.insert(*board_id))
        .cloned()
        .collect()
}
