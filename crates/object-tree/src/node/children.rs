//! Per-node children view.
//!
//! Wrapped child nodes are remembered weakly per position, so a parent never
//! keeps its children alive. Sets have no positional access; their elements
//! are drawn one at a time into a [`Materializer`] that restarts when the set
//! changes underneath it.

use std::rc::Weak;

use tracing::trace;

use super::NodeInner;
use crate::error::{Result, TreeError};
use crate::value::{Interference, Set, Value};

/// Something whose elements can be drawn in order while detecting change.
pub(crate) trait DrawSource {
    fn stamp(&self) -> u64;

    fn draw(&self, position: usize, stamp: u64) -> Result<Option<Value>, Interference>;
}

impl DrawSource for Set {
    fn stamp(&self) -> u64 {
        Set::stamp(self)
    }

    fn draw(&self, position: usize, stamp: u64) -> Result<Option<Value>, Interference> {
        Set::draw(self, position, stamp)
    }
}

/// Indexable prefix of an unordered collection.
///
/// Empty until the first read, partial while elements remain undrawn, full
/// once the source ran out.
#[derive(Debug, Default)]
pub(crate) struct Materializer {
    drawn: Vec<Value>,
    stamp: Option<u64>,
    full: bool,
}

impl Materializer {
    pub(crate) fn get(
        &mut self,
        index: usize,
        source: &impl DrawSource,
        retries: usize,
    ) -> Result<Value> {
        let mut restarts = 0;
        loop {
            if self.is_stale(source) {
                self.clear();
                self.restart(&mut restarts, index, retries)?;
                continue;
            }
            if let Some(value) = self.drawn.get(index) {
                return Ok(value.clone());
            }
            if self.full {
                return Err(TreeError::IndexOutOfRange {
                    index,
                    size: self.drawn.len(),
                });
            }
            if !self.step(source) {
                self.restart(&mut restarts, index, retries)?;
            }
        }
    }

    /// Draws everything that is left.
    pub(crate) fn all(&mut self, source: &impl DrawSource, retries: usize) -> Result<Vec<Value>> {
        let mut restarts = 0;
        loop {
            if self.is_stale(source) {
                self.clear();
                self.restart(&mut restarts, 0, retries)?;
                continue;
            }
            if self.full {
                return Ok(self.drawn.clone());
            }
            if !self.step(source) {
                self.restart(&mut restarts, self.drawn.len(), retries)?;
            }
        }
    }

    /// True when the source changed since the current traversal started.
    fn is_stale(&self, source: &impl DrawSource) -> bool {
        self.stamp.is_some_and(|stamp| stamp != source.stamp())
    }

    fn restart(&mut self, restarts: &mut usize, index: usize, retries: usize) -> Result<()> {
        if *restarts == retries {
            return Err(TreeError::ConcurrentMutation {
                index,
                attempts: retries + 1,
            });
        }
        *restarts += 1;
        trace!(index, restarts = *restarts, "set changed while drawing, restarting");
        Ok(())
    }

    /// Draws one element; false when the source interfered and the drawn
    /// prefix was discarded.
    fn step(&mut self, source: &impl DrawSource) -> bool {
        let stamp = *self.stamp.get_or_insert_with(|| source.stamp());
        match source.draw(self.drawn.len(), stamp) {
            Ok(Some(value)) => {
                self.drawn.push(value);
                true
            }
            Ok(None) => {
                self.full = true;
                true
            }
            Err(Interference) => {
                self.clear();
                false
            }
        }
    }

    pub(crate) fn clear(&mut self) {
        self.drawn.clear();
        self.stamp = None;
        self.full = false;
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.drawn.len()
    }
}

/// Cached state mediating between a container node and its children.
#[derive(Debug, Default)]
pub(crate) struct ChildrenView {
    nodes: Vec<Weak<NodeInner>>,
    materializer: Materializer,
}

impl ChildrenView {
    /// The live node previously wrapped at `index`, if any.
    pub(crate) fn cached(&self, index: usize) -> Option<super::Node> {
        self.nodes
            .get(index)
            .and_then(Weak::upgrade)
            .map(super::Node)
    }

    pub(crate) fn remember(&mut self, index: usize, node: &super::Node) {
        if self.nodes.len() <= index {
            self.nodes.resize_with(index + 1, Weak::new);
        }
        self.nodes[index] = super::Node::downgrade(node);
    }

    /// Set element at `index`. Nodes wrapped before a restart are forgotten.
    pub(crate) fn draw(
        &mut self,
        index: usize,
        source: &impl DrawSource,
        retries: usize,
    ) -> Result<Value> {
        let stamp = self.materializer.stamp;
        let drawn = self.materializer.get(index, source, retries);
        if self.materializer.stamp != stamp {
            self.nodes.clear();
        }
        drawn
    }

    /// Every set element, in iteration order.
    pub(crate) fn draw_all(
        &mut self,
        source: &impl DrawSource,
        retries: usize,
    ) -> Result<Vec<Value>> {
        let stamp = self.materializer.stamp;
        let drawn = self.materializer.all(source, retries);
        if self.materializer.stamp != stamp {
            self.nodes.clear();
        }
        drawn
    }

    pub(crate) fn clear(&mut self) {
        self.nodes.clear();
        self.materializer.clear();
    }
}
