//! Transform hierarchy: parent-relative offsets composed into world positions.
//!
//! Nodes live in an arena indexed by the owning body's slot index. Each tick
//! the world writes every node's local offset and spin, then
//! [`TransformHierarchy::propagate`] walks the tree top-down once and caches
//! world transforms.
//!
//! Only translation is inherited. A satellite's orbital plane is expressed in
//! its own local frame; the parent's spin and inclination never rotate it.

use bevy::math::DVec3;

use crate::catalog::RingSpec;
use crate::types::{DEG_TO_RAD, WorldTransform};

#[derive(Clone, Debug, Default)]
struct Node {
    parent: Option<usize>,
    children: Vec<usize>,
    local: DVec3,
    spin: f64,
    world: WorldTransform,
}

/// Transform of a ring decoration attached to a spinning body.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RingTransform {
    /// World position (same as the owning body)
    pub position: DVec3,
    /// Local spin relative to the owning body's mesh
    pub rotation_y: f64,
    /// Ring plane tilt in radians
    pub tilt: f64,
}

/// Arena of transform nodes addressed by slot index.
#[derive(Clone, Debug, Default)]
pub struct TransformHierarchy {
    nodes: Vec<Option<Node>>,
}

impl TransformHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a node at `index`, appended to the end of its parent's
    /// children. The parent must already be present.
    pub fn insert(&mut self, index: usize, parent: Option<usize>) {
        if self.nodes.len() <= index {
            self.nodes.resize_with(index + 1, || None);
        }

        let parent = parent.filter(|&p| self.contains(p));
        if let Some(p) = parent
            && let Some(Some(node)) = self.nodes.get_mut(p)
        {
            node.children.push(index);
        }

        self.nodes[index] = Some(Node {
            parent,
            ..Default::default()
        });
    }

    /// Remove a node and unlink it from its parent.
    ///
    /// Children keep their (now dangling) parent index cleared and become
    /// roots; the world despawns descendants before calling this.
    pub fn remove(&mut self, index: usize) {
        let Some(node) = self.nodes.get_mut(index).and_then(Option::take) else {
            return;
        };

        if let Some(p) = node.parent
            && let Some(Some(parent)) = self.nodes.get_mut(p)
        {
            parent.children.retain(|&c| c != index);
        }

        for child in node.children {
            if let Some(Some(child)) = self.nodes.get_mut(child) {
                child.parent = None;
            }
        }
    }

    pub fn contains(&self, index: usize) -> bool {
        matches!(self.nodes.get(index), Some(Some(_)))
    }

    /// Set a node's parent-relative offset and its own spin.
    pub fn set_local(&mut self, index: usize, local: DVec3, spin: f64) {
        if let Some(Some(node)) = self.nodes.get_mut(index) {
            node.local = local;
            node.spin = spin;
        }
    }

    pub fn parent(&self, index: usize) -> Option<usize> {
        self.nodes.get(index)?.as_ref()?.parent
    }

    /// Children of `index` in insertion order.
    pub fn children(&self, index: usize) -> &[usize] {
        match self.nodes.get(index) {
            Some(Some(node)) => &node.children,
            _ => &[],
        }
    }

    /// Cached world transform from the last [`Self::propagate`].
    pub fn world(&self, index: usize) -> Option<WorldTransform> {
        self.nodes.get(index)?.as_ref().map(|n| n.world)
    }

    /// Recompute every cached world transform, parents before children.
    pub fn propagate(&mut self) {
        let mut stack: Vec<(usize, DVec3)> = self
            .nodes
            .iter()
            .enumerate()
            .filter_map(|(i, n)| match n {
                Some(node) if node.parent.is_none() => Some((i, DVec3::ZERO)),
                _ => None,
            })
            .rev()
            .collect();

        while let Some((index, origin)) = stack.pop() {
            let Some(Some(node)) = self.nodes.get_mut(index) else {
                continue;
            };

            let position = origin + node.local;
            node.world = WorldTransform {
                position,
                rotation_y: node.spin,
            };

            stack.extend(node.children.iter().rev().map(|&c| (c, position)));
        }
    }

    /// Transform for a ring attached to `index`.
    ///
    /// Renderers parent the ring to the body's spinning mesh, so the ring
    /// counter-rotates by the body's spin to stay fixed relative to the
    /// orbital plane.
    pub fn ring_transform(&self, index: usize, ring: &RingSpec) -> Option<RingTransform> {
        let world = self.world(index)?;
        Some(RingTransform {
            position: world.position,
            rotation_y: -world.rotation_y,
            tilt: ring.tilt_deg * DEG_TO_RAD,
        })
    }
}
