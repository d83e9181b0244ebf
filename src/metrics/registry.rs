use std::collections::HashMap;

use thiserror::Error;

use crate::metrics::rate::RatePoint;
use crate::metrics::series::SeriesBuffer;

/// The kind of monitored resource an entity belongs to. The channel set of
/// a class is fixed for the whole session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityClass {
    Cpu,
    Disk,
    Network,
}

impl EntityClass {
    pub fn channels(self) -> &'static [Channel] {
        match self {
            EntityClass::Cpu => &[Channel::Usage],
            EntityClass::Disk => &[Channel::Read, Channel::Write],
            EntityClass::Network => &[Channel::In, Channel::Out],
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            EntityClass::Cpu => "cpu",
            EntityClass::Disk => "disk",
            EntityClass::Network => "network",
        }
    }
}

/// A named sub-stream of an entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Channel {
    Usage,
    Read,
    Write,
    In,
    Out,
}

impl Channel {
    pub fn label(self) -> &'static str {
        match self {
            Channel::Usage => "usage",
            Channel::Read => "read",
            Channel::Write => "write",
            Channel::In => "in",
            Channel::Out => "out",
        }
    }

    /// Convert a raw per-second rate into the channel's display unit.
    /// Network channels chart megabits per second; operation counters and
    /// the CPU usage percentage pass through unscaled.
    pub fn scale(self, per_sec: f64) -> f64 {
        match self {
            Channel::In | Channel::Out => per_sec * 8.0 / 1_000_000.0,
            Channel::Usage | Channel::Read | Channel::Write => per_sec,
        }
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum RegistryError {
    #[error("append for unknown entity `{0}`; ensure_entity must run first")]
    UnknownEntity(String),
    #[error("entity `{key}` ({class}) has no `{channel}` channel")]
    UnknownChannel {
        key: String,
        class: &'static str,
        channel: &'static str,
    },
}

/// One monitored resource instance: a CPU core, a disk device or a network
/// interface. Entities keep their color and buffers for the whole session;
/// an instance that vanishes simply stops advancing.
#[derive(Debug)]
pub struct Entity {
    pub key: String,
    pub class: EntityClass,
    pub color_index: usize,
    pub first_seen_secs: f64,
    buffers: Vec<(Channel, SeriesBuffer)>,
}

impl Entity {
    pub fn buffer(&self, channel: Channel) -> Option<&SeriesBuffer> {
        self.buffers
            .iter()
            .find(|(c, _)| *c == channel)
            .map(|(_, buf)| buf)
    }

    fn buffer_mut(&mut self, channel: Channel) -> Option<&mut SeriesBuffer> {
        self.buffers
            .iter_mut()
            .find(|(c, _)| *c == channel)
            .map(|(_, buf)| buf)
    }
}

/// Rolling-window capacity per entity class, taken from the chart
/// configuration at startup.
#[derive(Debug, Clone, Copy)]
pub struct SeriesCapacities {
    pub cpu: usize,
    pub disk: usize,
    pub network: usize,
}

impl SeriesCapacities {
    fn for_class(self, class: EntityClass) -> usize {
        match class {
            EntityClass::Cpu => self.cpu,
            EntityClass::Disk => self.disk,
            EntityClass::Network => self.network,
        }
    }
}

/// Arena of all live entities, keyed by stable string identity.
///
/// The sampling side is the only writer; rendering reads buffers between
/// appends. Entities are added lazily on first observation and never
/// removed, so color assignments stay stable for the session.
#[derive(Debug)]
pub struct EntityRegistry {
    entities: Vec<Entity>,
    index: HashMap<String, usize>,
    palette_len: usize,
    capacities: SeriesCapacities,
}

impl EntityRegistry {
    pub fn new(palette_len: usize, capacities: SeriesCapacities) -> Self {
        Self {
            entities: Vec::new(),
            index: HashMap::new(),
            palette_len: palette_len.max(1),
            capacities,
        }
    }

    /// Idempotent: returns the existing entity or creates one with the next
    /// palette color (index modulo palette length, so unbounded entity sets
    /// cycle through the palette) and one empty buffer per class channel.
    pub fn ensure_entity(&mut self, key: &str, class: EntityClass, at_secs: f64) -> &Entity {
        if !self.index.contains_key(key) {
            let capacity = self.capacities.for_class(class);
            let entity = Entity {
                key: key.to_string(),
                class,
                color_index: self.entities.len() % self.palette_len,
                first_seen_secs: at_secs,
                buffers: class
                    .channels()
                    .iter()
                    .map(|&c| (c, SeriesBuffer::new(capacity)))
                    .collect(),
            };
            self.index.insert(key.to_string(), self.entities.len());
            self.entities.push(entity);
        }
        &self.entities[self.index[key]]
    }

    /// Appends one rate point to an entity's channel buffer. The entity must
    /// already be registered; anything else is a sequencing bug in the
    /// caller, reported as an error rather than silently dropped.
    pub fn append_rate(
        &mut self,
        key: &str,
        channel: Channel,
        point: RatePoint,
    ) -> Result<(), RegistryError> {
        let Some(&i) = self.index.get(key) else {
            return Err(RegistryError::UnknownEntity(key.to_string()));
        };
        let entity = &mut self.entities[i];
        let class = entity.class;
        let Some(buf) = entity.buffer_mut(channel) else {
            return Err(RegistryError::UnknownChannel {
                key: key.to_string(),
                class: class.label(),
                channel: channel.label(),
            });
        };
        buf.push(point);
        Ok(())
    }

    pub fn get(&self, key: &str) -> Option<&Entity> {
        self.index.get(key).map(|&i| &self.entities[i])
    }

    /// Entities of one class in observation order (stable across ticks).
    pub fn entities_of(&self, class: EntityClass) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.class == class)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
