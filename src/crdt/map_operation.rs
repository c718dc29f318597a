//! Changes to the fields of a CRDT map, including maps nested inside it.

use crate::proto::map_field::MapFieldType;
use crate::proto::map_update::FlagOp;
use crate::proto::{self, CounterOp, MapOp, MapUpdate, SetOp};

/// The data type of a map field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum MapFieldKind {
    #[allow(missing_docs)]
    Counter,
    #[allow(missing_docs)]
    Set,
    #[allow(missing_docs)]
    Register,
    #[allow(missing_docs)]
    Flag,
    #[allow(missing_docs)]
    Map,
}

impl From<MapFieldKind> for MapFieldType {
    #[inline]
    fn from(kind: MapFieldKind) -> Self {
        match kind {
            MapFieldKind::Counter => Self::Counter,
            MapFieldKind::Set => Self::Set,
            MapFieldKind::Register => Self::Register,
            MapFieldKind::Flag => Self::Flag,
            MapFieldKind::Map => Self::Map,
        }
    }
}

impl From<MapFieldType> for MapFieldKind {
    #[inline]
    fn from(kind: MapFieldType) -> Self {
        match kind {
            MapFieldType::Counter => Self::Counter,
            MapFieldType::Set => Self::Set,
            MapFieldType::Register => Self::Register,
            MapFieldType::Flag => Self::Flag,
            MapFieldType::Map => Self::Map,
        }
    }
}

/// A map field: fields are identified by both name and kind.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MapField {
    #[allow(missing_docs)]
    pub name: String,
    #[allow(missing_docs)]
    pub kind: MapFieldKind,
}

impl MapField {
    fn encode(&self) -> proto::MapField {
        encode_field(&self.name, self.kind)
    }
}

fn encode_field(name: &str, kind: MapFieldKind) -> proto::MapField {
    proto::MapField {
        name: name.as_bytes().to_vec(),
        r#type: MapFieldType::from(kind) as i32,
    }
}

/// Elements to add to and remove from a set.
///
/// Both lists are sent together. Repeated calls append to them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SetOperation {
    /// Elements to add.
    pub additions: Vec<Vec<u8>>,
    /// Elements to remove. Removing requires the causal context of a prior fetch.
    pub removals: Vec<Vec<u8>>,
}

impl SetOperation {
    /// Whether there is nothing to add or remove.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub(crate) fn encode(&self) -> SetOp {
        SetOp {
            adds: self.additions.clone(),
            removes: self.removals.clone(),
        }
    }
}

/// The change to a single map field. The variant determines the field's kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldUpdate {
    /// Add this (possibly negative) amount to a counter.
    Counter(i64),
    /// Add and remove set elements.
    Set(SetOperation),
    /// Replace a register's value.
    Register(Vec<u8>),
    /// Enable (`true`) or disable (`false`) a flag.
    Flag(bool),
    /// Change the fields of a nested map.
    Map(MapOperation),
}

impl FieldUpdate {
    /// The kind of field this update applies to.
    #[inline]
    pub const fn kind(&self) -> MapFieldKind {
        match self {
            Self::Counter(_) => MapFieldKind::Counter,
            Self::Set(_) => MapFieldKind::Set,
            Self::Register(_) => MapFieldKind::Register,
            Self::Flag(_) => MapFieldKind::Flag,
            Self::Map(_) => MapFieldKind::Map,
        }
    }

    fn empty(kind: MapFieldKind) -> Self {
        match kind {
            MapFieldKind::Counter => Self::Counter(0),
            MapFieldKind::Set => Self::Set(SetOperation::default()),
            MapFieldKind::Register => Self::Register(Vec::new()),
            MapFieldKind::Flag => Self::Flag(false),
            MapFieldKind::Map => Self::Map(MapOperation::default()),
        }
    }

    /// The nested map operation this update holds, replacing any other update with an empty one.
    fn nested_map(&mut self) -> &mut MapOperation {
        match self {
            Self::Map(operation) => operation,
            other => {
                *other = Self::Map(MapOperation::default());
                other.nested_map()
            }
        }
    }

    fn encode(&self, name: &str) -> MapUpdate {
        let mut update = MapUpdate {
            field: encode_field(name, self.kind()),
            ..MapUpdate::default()
        };
        match self {
            Self::Counter(increment) => {
                update.counter_op = Some(CounterOp {
                    increment: Some(*increment),
                });
            }
            Self::Set(operation) => update.set_op = Some(operation.encode()),
            Self::Register(value) => update.register_op = Some(value.clone()),
            Self::Flag(enabled) => {
                update.set_flag_op(if *enabled {
                    FlagOp::Enable
                } else {
                    FlagOp::Disable
                });
            }
            Self::Map(operation) => update.map_op = Some(operation.encode()),
        }
        update
    }
}

/// Removals and updates to apply to the fields of a map.
///
/// Each `(name, kind)` pair appears at most once among the removals and at most once among the
/// updates. Repeated calls for the same field merge into its existing update: counter increments
/// add up, set elements accumulate, and the last register or flag value wins. A field may be both
/// removed and updated, in which case both are sent and the store applies the removal.
///
/// ```ignore
/// let mut operation = MapOperation::new();
/// operation
///     .increment_counter("visits", 1)
///     .add_to_set("tags", "rust")
///     .remove_flag("archived");
/// operation.map("address").set_register("city", "Oslo");
/// ```
#[must_use]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapOperation {
    removals: Vec<MapField>,
    updates: Vec<(String, FieldUpdate)>,
}

impl MapOperation {
    /// An operation that changes nothing.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether there is nothing to remove or update.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.removals.is_empty() && self.updates.is_empty()
    }

    /// The fields to remove, in the order they were first removed.
    #[inline]
    pub fn removals(&self) -> &[MapField] {
        &self.removals
    }

    /// The field updates, in the order each field was first updated.
    #[inline]
    pub fn updates(&self) -> impl Iterator<Item = (&str, &FieldUpdate)> {
        self.updates
            .iter()
            .map(|(name, update)| (name.as_str(), update))
    }

    /// Add `increment` to a counter field.
    pub fn increment_counter(&mut self, name: &str, increment: i64) -> &mut Self {
        if let FieldUpdate::Counter(total) = self.entry(name, MapFieldKind::Counter) {
            *total = total.saturating_add(increment);
        }
        self
    }

    /// Remove a counter field.
    #[inline]
    pub fn remove_counter(&mut self, name: &str) -> &mut Self {
        self.remove(name, MapFieldKind::Counter)
    }

    /// Add an element to a set field.
    pub fn add_to_set(&mut self, name: &str, value: impl Into<Vec<u8>>) -> &mut Self {
        if let FieldUpdate::Set(operation) = self.entry(name, MapFieldKind::Set) {
            operation.additions.push(value.into());
        }
        self
    }

    /// Remove an element from a set field.
    pub fn remove_from_set(&mut self, name: &str, value: impl Into<Vec<u8>>) -> &mut Self {
        if let FieldUpdate::Set(operation) = self.entry(name, MapFieldKind::Set) {
            operation.removals.push(value.into());
        }
        self
    }

    /// Remove a set field.
    #[inline]
    pub fn remove_set(&mut self, name: &str) -> &mut Self {
        self.remove(name, MapFieldKind::Set)
    }

    /// Replace the value of a register field.
    pub fn set_register(&mut self, name: &str, value: impl Into<Vec<u8>>) -> &mut Self {
        if let FieldUpdate::Register(register) = self.entry(name, MapFieldKind::Register) {
            *register = value.into();
        }
        self
    }

    /// Remove a register field.
    #[inline]
    pub fn remove_register(&mut self, name: &str) -> &mut Self {
        self.remove(name, MapFieldKind::Register)
    }

    /// Enable or disable a flag field.
    pub fn set_flag(&mut self, name: &str, enabled: bool) -> &mut Self {
        if let FieldUpdate::Flag(flag) = self.entry(name, MapFieldKind::Flag) {
            *flag = enabled;
        }
        self
    }

    /// Remove a flag field.
    #[inline]
    pub fn remove_flag(&mut self, name: &str) -> &mut Self {
        self.remove(name, MapFieldKind::Flag)
    }

    /// The operation for a nested map field, created empty on first use.
    pub fn map(&mut self, name: &str) -> &mut Self {
        self.entry(name, MapFieldKind::Map).nested_map()
    }

    /// Remove a nested map field.
    #[inline]
    pub fn remove_map(&mut self, name: &str) -> &mut Self {
        self.remove(name, MapFieldKind::Map)
    }

    /// Encode the tree. Nested map updates carry their own removals and updates.
    pub(crate) fn encode(&self) -> MapOp {
        MapOp {
            removes: self.removals.iter().map(MapField::encode).collect(),
            updates: self
                .updates
                .iter()
                .map(|(name, update)| update.encode(name))
                .collect(),
        }
    }

    fn remove(&mut self, name: &str, kind: MapFieldKind) -> &mut Self {
        let field = MapField {
            name: name.to_owned(),
            kind,
        };
        if !self.removals.contains(&field) {
            self.removals.push(field);
        }
        self
    }

    /// The update for `(name, kind)`, inserted empty if there is none yet.
    fn entry(&mut self, name: &str, kind: MapFieldKind) -> &mut FieldUpdate {
        let index = match self
            .updates
            .iter()
            .position(|(existing, update)| existing == name && update.kind() == kind)
        {
            Some(index) => index,
            None => {
                self.updates.push((name.to_owned(), FieldUpdate::empty(kind)));
                self.updates.len() - 1
            }
        };
        &mut self.updates[index].1
    }
}
