/*
[INPUT]:  RefreshHandle (current snapshot + change notifications)
[OUTPUT]: Board/list sensor entities and their JSON state lines
[POS]:    Presentation layer - read-only views over the snapshot
[UPDATE]: When changing entity ids, attributes, or the published state format
*/

use std::io::Write;

use anyhow::{Context, Result};
use serde::Serialize;
use serde_json::{Map, Value, json};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::coordinator::RefreshHandle;
use crate::model::{BoardEntry, List, Snapshot};

pub const BOARD_UNIT: &str = "Lists";
pub const BOARD_ICON: &str = "mdi:view-dashboard";
pub const LIST_UNIT: &str = "Cards";
pub const LIST_ICON: &str = "mdi:format-list-bulleted";

/// One published entity state
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SensorState {
    pub unique_id: String,
    pub name: String,
    pub available: bool,
    pub value: Option<usize>,
    pub unit: &'static str,
    pub icon: &'static str,
    pub attributes: Value,
    pub generation: u64,
}

/// Read-only entity over the current snapshot. Values are looked up on every read.
pub trait Sensor: Send + Sync {
    fn unique_id(&self) -> String;

    fn unit(&self) -> &'static str;

    fn icon(&self) -> &'static str;

    fn name(&self, snapshot: &Snapshot) -> String;

    fn available(&self, snapshot: &Snapshot) -> bool;

    fn native_value(&self, snapshot: &Snapshot) -> Option<usize>;

    fn attributes(&self, snapshot: &Snapshot) -> Value;

    fn handle(&self) -> &RefreshHandle;

    /// State against the current snapshot
    fn state(&self) -> SensorState {
        self.state_at(&self.handle().current_snapshot())
    }

    fn state_at(&self, snapshot: &Snapshot) -> SensorState {
        SensorState {
            unique_id: self.unique_id(),
            name: self.name(snapshot),
            available: self.available(snapshot),
            value: self.native_value(snapshot),
            unit: self.unit(),
            icon: self.icon(),
            attributes: self.attributes(snapshot),
            generation: snapshot.generation(),
        }
    }
}

/// Number of lists on one board, with the full board as attributes
pub struct BoardSensor {
    board_id: String,
    initial_name: String,
    handle: RefreshHandle,
}

impl BoardSensor {
    pub fn new(board_id: impl Into<String>, initial_name: impl Into<String>, handle: RefreshHandle) -> Self {
        Self {
            board_id: board_id.into(),
            initial_name: initial_name.into(),
            handle,
        }
    }

    pub fn board_id(&self) -> &str {
        &self.board_id
    }
}

impl Sensor for BoardSensor {
    fn unique_id(&self) -> String {
        format!("trello_board_{}", self.board_id).to_lowercase()
    }

    fn unit(&self) -> &'static str {
        BOARD_UNIT
    }

    fn icon(&self) -> &'static str {
        BOARD_ICON
    }

    fn name(&self, snapshot: &Snapshot) -> String {
        match snapshot.get(&self.board_id).and_then(BoardEntry::board) {
            Some(board) => board.name.clone(),
            None => self.initial_name.clone(),
        }
    }

    fn available(&self, snapshot: &Snapshot) -> bool {
        snapshot.contains(&self.board_id)
    }

    fn native_value(&self, snapshot: &Snapshot) -> Option<usize> {
        snapshot.get(&self.board_id).map(BoardEntry::list_count)
    }

    fn attributes(&self, snapshot: &Snapshot) -> Value {
        let Some(entry) = snapshot.get(&self.board_id) else {
            return json!({});
        };

        let lists: Map<String, Value> = entry
            .lists()
            .map(|list| (list.id().to_string(), list_data(list)))
            .collect();

        json!({
            "board_id": self.board_id,
            "board_name": entry.name(),
            "failed": entry.is_failed(),
            "board_data": {
                "id": entry.id(),
                "name": entry.name(),
                "lists": lists,
            },
        })
    }

    fn handle(&self) -> &RefreshHandle {
        &self.handle
    }
}

fn list_data(list: &List) -> Value {
    let cards: Vec<Value> = list
        .cards()
        .iter()
        .map(|card| {
            json!({
                "id": card.id,
                "name": card.name,
                "desc": card.description,
                "due": card.due,
                "list_id": card.list_id,
            })
        })
        .collect();

    json!({
        "id": list.id(),
        "name": list.name(),
        "card_count": list.card_count(),
        "cards": cards,
    })
}

/// Number of cards in one list
pub struct ListSensor {
    board_id: String,
    list_id: String,
    initial_name: String,
    handle: RefreshHandle,
}

impl ListSensor {
    pub fn new(
        board_id: impl Into<String>,
        list_id: impl Into<String>,
        initial_name: impl Into<String>,
        handle: RefreshHandle,
    ) -> Self {
        Self {
            board_id: board_id.into(),
            list_id: list_id.into(),
            initial_name: initial_name.into(),
            handle,
        }
    }

    pub fn list_id(&self) -> &str {
        &self.list_id
    }

    fn entry<'a>(&self, snapshot: &'a Snapshot) -> Option<(&'a BoardEntry, &'a List)> {
        let entry = snapshot.get(&self.board_id)?;
        entry.list(&self.list_id).map(|list| (entry, list))
    }
}

impl Sensor for ListSensor {
    fn unique_id(&self) -> String {
        format!("trello_list_{}", self.list_id).to_lowercase()
    }

    fn unit(&self) -> &'static str {
        LIST_UNIT
    }

    fn icon(&self) -> &'static str {
        LIST_ICON
    }

    fn name(&self, snapshot: &Snapshot) -> String {
        self.entry(snapshot)
            .map_or_else(|| self.initial_name.clone(), |(_, list)| list.name().to_string())
    }

    fn available(&self, snapshot: &Snapshot) -> bool {
        self.entry(snapshot).is_some()
    }

    fn native_value(&self, snapshot: &Snapshot) -> Option<usize> {
        self.entry(snapshot).map(|(_, list)| list.card_count())
    }

    fn attributes(&self, snapshot: &Snapshot) -> Value {
        let Some((entry, list)) = self.entry(snapshot) else {
            return json!({});
        };

        json!({
            "board_id": self.board_id,
            "board_name": entry.name(),
            "list_id": self.list_id,
            "list_name": list.name(),
            "board_entity": board_entity_id(entry.name()),
            "card_count": list.card_count(),
        })
    }

    fn handle(&self) -> &RefreshHandle {
        &self.handle
    }
}

/// Entity id of the board sensor as a host derives it from the board name
pub fn board_entity_id(board_name: &str) -> String {
    let slug = board_name.to_lowercase().replace([' ', '-'], "_");
    format!("sensor.{slug}_board")
}

/// One board sensor per board, then one list sensor per list, from the current snapshot
pub fn discover_sensors(handle: &RefreshHandle) -> Vec<Box<dyn Sensor>> {
    let snapshot = handle.current_snapshot();
    let mut sensors: Vec<Box<dyn Sensor>> = Vec::new();

    for entry in snapshot.entries() {
        sensors.push(Box::new(BoardSensor::new(entry.id(), entry.name(), handle.clone())));
    }

    for entry in snapshot.entries() {
        let mut lists: Vec<&List> = entry.lists().collect();
        lists.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(b.id())));
        for list in lists {
            sensors.push(Box::new(ListSensor::new(entry.id(), list.id(), list.name(), handle.clone())));
        }
    }

    debug!(sensors = sensors.len(), generation = snapshot.generation(), "Sensors discovered");
    sensors
}

/// Write one JSON line per sensor for `snapshot`
pub fn write_states(sensors: &[Box<dyn Sensor>], snapshot: &Snapshot, out: &mut impl Write) -> Result<()> {
    for sensor in sensors {
        let line = serde_json::to_string(&sensor.state_at(snapshot)).context("serialize sensor state")?;
        writeln!(out, "{line}").context("write sensor state")?;
    }
    out.flush().context("flush sensor states")
}

/// Publish the current states, then again on every new snapshot, until `shutdown`
pub async fn publish_states(
    sensors: &[Box<dyn Sensor>],
    handle: &RefreshHandle,
    shutdown: CancellationToken,
    mut out: impl AsyncWrite + Unpin,
) -> Result<()> {
    let mut snapshots = handle.subscribe();
    emit_states(sensors, &handle.current_snapshot(), &mut out).await?;

    loop {
        tokio::select! {
            biased;
            _ = shutdown.cancelled() => break,
            changed = snapshots.changed() => {
                if changed.is_err() {
                    debug!("Snapshot channel closed");
                    break;
                }
                let snapshot = snapshots.borrow_and_update().clone();
                emit_states(sensors, &snapshot, &mut out).await?;
            }
        }
    }

    Ok(())
}

async fn emit_states(
    sensors: &[Box<dyn Sensor>],
    snapshot: &Snapshot,
    out: &mut (impl AsyncWrite + Unpin),
) -> Result<()> {
    let mut buf = Vec::new();
    write_states(sensors, snapshot, &mut buf)?;
    out.write_all(&buf).await.context("write sensor states")?;
    out.flush().await.context("flush sensor states")
}
