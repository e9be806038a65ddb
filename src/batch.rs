//! Turning item batches into bulk bit commands.
//!
//! Every operation on a remote filter, whatever the number of items, is one
//! pipelined round-trip:
//!
//! 1. hash each item to its `k` global bit indices (in item order),
//! 2. map each index to `(segment, offset)`,
//! 3. collect offsets per segment, splitting long runs into chunks of at most
//!    [`BatchLimits::max_bits_per_command`],
//! 4. send all commands through [`BitStore::execute`],
//! 5. read each item's `k` reply bits back through its recorded slots.
//!
//! Offsets are not deduplicated. A set command applies its offsets in order and
//! reports each bit's previous value, so an item repeated inside one batch sees
//! the bits written by its first occurrence, exactly as if the items had been
//! added one call at a time.

use crate::core::layout::SegmentLayout;
use crate::error::{RedBloomError, Result};
use crate::hash::{HashScheme, ItemHasher, Xxh3Hasher};
use crate::store::{BatchLimits, BitCommand, BitStore};
use std::collections::BTreeMap;
use tracing::{trace, warn};

#[cfg(feature = "rayon")]
use rayon::prelude::*;

/// Batches at least this large hash their items on the rayon pool.
#[cfg(feature = "rayon")]
pub const PARALLEL_THRESHOLD: usize = 4096;

/// What a plan does to the bits it addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanKind {
    /// Set bits to 1; an item resolves to `true` if any bit was 0 before.
    Write,
    /// Read bits; an item resolves to `true` if all of its bits are 1.
    Read,
}

/// Commands for one batch plus where each item's bits land in the replies.
#[derive(Debug, Clone)]
pub struct BitPlan {
    kind: PlanKind,
    hash_count: usize,
    commands: Vec<BitCommand>,
    /// `(command, position)` per address, `hash_count` entries per item.
    slots: Vec<(usize, usize)>,
}

impl BitPlan {
    /// Read or write.
    #[must_use]
    pub fn kind(&self) -> PlanKind {
        self.kind
    }

    /// Commands to send, grouped by ascending segment.
    #[must_use]
    pub fn commands(&self) -> &[BitCommand] {
        &self.commands
    }

    /// Number of items planned.
    #[must_use]
    pub fn item_count(&self) -> usize {
        if self.hash_count == 0 {
            0
        } else {
            self.slots.len() / self.hash_count
        }
    }

    /// Whether the plan addresses nothing (and needs no round-trip).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Fold the store's replies into one answer per item.
    ///
    /// # Errors
    ///
    /// [`RedBloomError::Protocol`] if the reply count or any reply length
    /// differs from what was sent.
    pub fn resolve(&self, replies: &[Vec<bool>]) -> Result<Vec<bool>> {
        if replies.len() != self.commands.len() {
            return Err(RedBloomError::protocol(format!(
                "sent {} commands, received {} replies",
                self.commands.len(),
                replies.len()
            )));
        }
        for (command, reply) in self.commands.iter().zip(replies) {
            if reply.len() != command.offsets().len() {
                return Err(RedBloomError::protocol(format!(
                    "command on '{}' carried {} offsets, reply has {} bits",
                    String::from_utf8_lossy(command.key()),
                    command.offsets().len(),
                    reply.len()
                )));
            }
        }

        let bit = |&(command, position): &(usize, usize)| replies[command][position];
        Ok(self
            .slots
            .chunks(self.hash_count.max(1))
            .map(|item| match self.kind {
                PlanKind::Write => !item.iter().all(bit),
                PlanKind::Read => item.iter().all(bit),
            })
            .collect())
    }
}

/// Plans and runs batched bit operations for one filter.
#[derive(Debug, Clone)]
pub struct CommandBatcher<H = Xxh3Hasher> {
    layout: SegmentLayout,
    hash_count: u32,
    keys: Vec<Vec<u8>>,
    scheme: HashScheme<H>,
    limits: BatchLimits,
}

impl CommandBatcher<Xxh3Hasher> {
    /// Batcher for the filter stored under `key` with the default hash scheme.
    #[must_use]
    pub fn new(key: &[u8], layout: SegmentLayout, hash_count: u32) -> Self {
        Self::with_scheme(key, layout, hash_count, HashScheme::default())
    }
}

impl<H: ItemHasher> CommandBatcher<H> {
    /// Batcher using a specific hash scheme.
    #[must_use]
    pub fn with_scheme(key: &[u8], layout: SegmentLayout, hash_count: u32, scheme: HashScheme<H>) -> Self {
        Self {
            keys: layout.segment_keys(key),
            layout,
            hash_count,
            scheme,
            limits: BatchLimits::default(),
        }
    }

    /// Replace the command size limits. A zero limit is treated as 1.
    #[must_use]
    pub fn with_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Segment layout.
    #[must_use]
    pub fn layout(&self) -> &SegmentLayout {
        &self.layout
    }

    /// Segment key names, in order.
    #[must_use]
    pub fn keys(&self) -> &[Vec<u8>] {
        &self.keys
    }

    /// Current command size limits.
    #[must_use]
    pub fn limits(&self) -> BatchLimits {
        self.limits
    }

    /// Build the commands for `items` without sending anything.
    #[must_use]
    pub fn plan<T: AsRef<[u8]>>(&self, kind: PlanKind, items: &[T]) -> BitPlan {
        let addresses = self.addresses(items);
        let chunk = self.limits.max_bits_per_command.max(1);

        // Positions within each segment's offset list, in emission order.
        let mut by_segment: BTreeMap<u64, Vec<u64>> = BTreeMap::new();
        let mut placed = Vec::with_capacity(addresses.len());
        for global in addresses {
            let address = self.layout.locate(global);
            let offsets = by_segment.entry(address.segment).or_default();
            placed.push((address.segment, offsets.len()));
            offsets.push(address.offset);
        }

        let mut first_command = BTreeMap::new();
        let mut commands = Vec::new();
        for (segment, offsets) in by_segment {
            first_command.insert(segment, commands.len());
            let key = &self.keys[segment as usize];
            commands.extend(offsets.chunks(chunk).map(|run| match kind {
                PlanKind::Write => BitCommand::SetBits {
                    key: key.clone(),
                    offsets: run.to_vec(),
                },
                PlanKind::Read => BitCommand::GetBits {
                    key: key.clone(),
                    offsets: run.to_vec(),
                },
            }));
        }

        let slots = placed
            .into_iter()
            .map(|(segment, position)| {
                (first_command[&segment] + position / chunk, position % chunk)
            })
            .collect();

        BitPlan {
            kind,
            hash_count: self.hash_count as usize,
            commands,
            slots,
        }
    }

    /// Set the bits of every item. Returns, per item, whether it was new.
    ///
    /// # Errors
    ///
    /// Any store error. Bits written before the failure stay set.
    pub fn add_all<S, T>(&self, store: &mut S, items: &[T]) -> Result<Vec<bool>>
    where
        S: BitStore + ?Sized,
        T: AsRef<[u8]>,
    {
        self.run(store, PlanKind::Write, items)
    }

    /// Check every item. Returns, per item, whether all its bits are set.
    ///
    /// # Errors
    ///
    /// Any store error.
    pub fn contains_all<S, T>(&self, store: &mut S, items: &[T]) -> Result<Vec<bool>>
    where
        S: BitStore + ?Sized,
        T: AsRef<[u8]>,
    {
        self.run(store, PlanKind::Read, items)
    }

    fn run<S, T>(&self, store: &mut S, kind: PlanKind, items: &[T]) -> Result<Vec<bool>>
    where
        S: BitStore + ?Sized,
        T: AsRef<[u8]>,
    {
        let plan = self.plan(kind, items);
        if plan.is_empty() {
            return Ok(vec![false; items.len()]);
        }
        trace!(
            kind = ?kind,
            items = items.len(),
            commands = plan.commands().len(),
            writes = plan.commands().iter().filter(|command| command.is_write()).count(),
            hasher = self.scheme.hasher_name(),
            strategy = self.scheme.strategy_name(),
            "Executing bit batch"
        );

        let replies = store.execute(plan.commands()).map_err(|err| {
            warn!(kind = ?kind, items = items.len(), error = %err, "Bit batch failed");
            err
        })?;
        plan.resolve(&replies)
    }

    fn addresses<T: AsRef<[u8]>>(&self, items: &[T]) -> Vec<u64> {
        let (m, k) = (self.layout.bit_size(), self.hash_count);

        #[cfg(feature = "rayon")]
        if items.len() >= PARALLEL_THRESHOLD {
            let slices: Vec<&[u8]> = items.iter().map(AsRef::as_ref).collect();
            return slices
                .par_iter()
                .flat_map_iter(|item| self.scheme.addresses(item, m, k))
                .collect();
        }

        let mut out = Vec::with_capacity(items.len() * k as usize);
        for item in items {
            self.scheme.extend_addresses(item.as_ref(), m, k, &mut out);
        }
        out
    }
}
