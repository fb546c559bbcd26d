// Position sources: batches fed into the bounded input channel.
use crate::model::{FeedError, Position};
use serde::de::{self, DeserializeSeed, Deserializer, SeqAccess, Visitor};
use std::fmt;
use std::io::Read;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

const CONSUMER_GONE: &str = "position consumer stopped";

/// Splits in-memory positions into batches of at most `batch_size`.
pub fn spawn_feeder(
    positions: Vec<Position>,
    batch_size: usize,
    capacity: usize,
) -> (mpsc::Receiver<Vec<Position>>, JoinHandle<()>) {
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let batch_size = batch_size.max(1);
    let handle = tokio::spawn(async move {
        let mut positions = positions.into_iter().peekable();
        while positions.peek().is_some() {
            let batch: Vec<Position> = positions.by_ref().take(batch_size).collect();
            if tx.send(batch).await.is_err() {
                break;
            }
        }
    });
    (rx, handle)
}

/// Seed that consumes a JSON array element by element and ships full batches.
struct BatchSender<'a> {
    tx: &'a mpsc::Sender<Vec<Position>>,
    batch_size: usize,
}

impl BatchSender<'_> {
    fn ship<E: de::Error>(&self, batch: Vec<Position>) -> Result<(), E> {
        self.tx.blocking_send(batch).map_err(|_| E::custom(CONSUMER_GONE))
    }
}

impl<'de> DeserializeSeed<'de> for BatchSender<'_> {
    type Value = usize;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<usize, D::Error> {
        deserializer.deserialize_seq(self)
    }
}

impl<'de> Visitor<'de> for BatchSender<'_> {
    type Value = usize;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an array of positions")
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<usize, A::Error> {
        let mut total = 0;
        let mut batch = Vec::with_capacity(self.batch_size);
        while let Some(pos) = seq.next_element::<Position>()? {
            batch.push(pos);
            total += 1;
            if batch.len() == self.batch_size {
                let full = std::mem::replace(&mut batch, Vec::with_capacity(self.batch_size));
                self.ship(full)?;
            }
        }
        if !batch.is_empty() {
            self.ship(batch)?;
        }
        Ok(total)
    }
}

/// Streams a JSON array of positions from `reader` in batches of at most `batch_size`.
///
/// Only `capacity` batches are held in memory at a time. The handle yields the
/// number of positions read.
pub fn read_positions<R>(
    reader: R,
    batch_size: usize,
    capacity: usize,
) -> (mpsc::Receiver<Vec<Position>>, JoinHandle<Result<usize, FeedError>>)
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel(capacity.max(1));
    let batch_size = batch_size.max(1);
    let handle = tokio::task::spawn_blocking(move || -> Result<usize, FeedError> {
        let mut deserializer = serde_json::Deserializer::from_reader(reader);
        let total = BatchSender {
            tx: &tx,
            batch_size,
        }
        .deserialize(&mut deserializer)?;
        deserializer.end()?;
        Ok(total)
    });
    (rx, handle)
}
