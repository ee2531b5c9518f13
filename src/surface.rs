//! The document surface: how grid passes read and move host items.
//!
//! The library never creates or destroys artwork. It reads bounds, requests
//! translations, and asks the host to wrap items into groups. A host binds
//! its own object model by implementing [`DocumentSurface`];
//! [`MemoryDocument`] is a self-contained arena implementation.

use alloc::vec::Vec;
use core::cell::Cell;

use crate::error::GridError;
use crate::geometry::Bounds;

/// Opaque handle to an item owned by the document.
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ItemId(pub u32);

/// Which bounding box to measure.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BoundsKind {
    /// Path geometry only.
    #[default]
    Geometric,
    /// Geometry plus stroke and effects.
    Visible,
}

/// Access to the host document.
pub trait DocumentSurface {
    /// Currently selected items, in selection order.
    fn selection(&self) -> Vec<ItemId>;

    /// Current bounds of `item`. A clip-path override replaces the item's
    /// own bounds.
    fn bounds(&self, item: ItemId, kind: BoundsKind) -> Result<Bounds, GridError>;

    /// Move `item` (and everything inside it) by `(dx, dy)`.
    fn translate(&mut self, item: ItemId, dx: f64, dy: f64) -> Result<(), GridError>;

    /// Direct children of a group item. Empty for leaf items.
    fn children(&self, item: ItemId) -> Vec<ItemId> {
        let _ = item;
        Vec::new()
    }

    /// Containing group, or `None` at the top level.
    fn parent(&self, item: ItemId) -> Option<ItemId>;

    /// Create a new group under `parent` and move `items` into it.
    fn group_into(&mut self, parent: Option<ItemId>, items: &[ItemId]) -> Result<ItemId, GridError>;
}

#[derive(Clone, Debug)]
enum NodeKind {
    Leaf { bounds: Bounds, stroke_width: f64 },
    Group { children: Vec<ItemId> },
}

#[derive(Clone, Debug)]
struct Node {
    kind: NodeKind,
    parent: Option<ItemId>,
    clip: Option<Bounds>,
    /// Group bounds per [`BoundsKind`], cleared whenever a descendant moves.
    cache: [Cell<Option<Bounds>>; 2],
}

impl BoundsKind {
    const fn slot(self) -> usize {
        match self {
            Self::Geometric => 0,
            Self::Visible => 1,
        }
    }
}

/// In-memory document: an arena of items indexed by [`ItemId`].
///
/// Leaf items store geometric bounds and a stroke width (visible bounds
/// are the geometry outset by half the stroke). Group bounds are the union
/// of their children, cached until something inside the group moves.
///
/// ```
/// use regrid::{Bounds, BoundsKind, DocumentSurface, MemoryDocument};
///
/// let mut doc = MemoryDocument::new();
/// let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
/// doc.translate(a, 5.0, 0.0).unwrap();
/// assert_eq!(doc.bounds(a, BoundsKind::Geometric).unwrap().left, 5.0);
/// ```
#[derive(Clone, Debug, Default)]
pub struct MemoryDocument {
    nodes: Vec<Node>,
    selection: Vec<ItemId>,
}

impl MemoryDocument {
    pub fn new() -> Self {
        Self::default()
    }

    fn push(&mut self, kind: NodeKind, parent: Option<ItemId>) -> ItemId {
        let id = ItemId(self.nodes.len() as u32);
        self.nodes.push(Node {
            kind,
            parent,
            clip: None,
            cache: Default::default(),
        });
        id
    }

    fn node(&self, item: ItemId) -> Result<&Node, GridError> {
        self.nodes
            .get(item.0 as usize)
            .ok_or(GridError::UnknownItem(item))
    }

    fn node_mut(&mut self, item: ItemId) -> Result<&mut Node, GridError> {
        self.nodes
            .get_mut(item.0 as usize)
            .ok_or(GridError::UnknownItem(item))
    }

    /// Add a top-level unstroked rectangle.
    pub fn add_rect(&mut self, bounds: Bounds) -> ItemId {
        self.add_stroked_rect(bounds, 0.0)
    }

    /// Add a top-level rectangle with a stroke.
    pub fn add_stroked_rect(&mut self, bounds: Bounds, stroke_width: f64) -> ItemId {
        self.push(
            NodeKind::Leaf {
                bounds,
                stroke_width,
            },
            None,
        )
    }

    /// Attach a clipping path to `item`; its bounds replace the item's own.
    pub fn set_clip(&mut self, item: ItemId, clip: Bounds) -> Result<(), GridError> {
        self.node_mut(item)?.clip = Some(clip);
        self.invalidate_ancestors(item)
    }

    /// Replace the selection.
    pub fn select(&mut self, items: &[ItemId]) {
        self.selection = items.to_vec();
    }

    /// Number of items, groups included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn detach(&mut self, item: ItemId) -> Result<(), GridError> {
        let parent = self.node(item)?.parent;
        if let Some(parent) = parent
            && let NodeKind::Group { children } = &mut self.node_mut(parent)?.kind
        {
            children.retain(|&c| c != item);
        }
        self.invalidate_ancestors(item)
    }

    /// `start` and each of its ancestors, nearest first.
    fn ancestry(&self, start: Option<ItemId>) -> impl Iterator<Item = ItemId> + '_ {
        core::iter::successors(start, |&id| self.node(id).ok().and_then(|n| n.parent))
    }

    /// Drop cached bounds of every group containing `item`.
    fn invalidate_ancestors(&self, item: ItemId) -> Result<(), GridError> {
        let mut next = self.node(item)?.parent;
        while let Some(id) = next {
            let node = self.node(id)?;
            node.cache.iter().for_each(|c| c.set(None));
            next = node.parent;
        }
        Ok(())
    }

    fn translate_subtree(&mut self, item: ItemId, dx: f64, dy: f64) -> Result<(), GridError> {
        let node = self.node_mut(item)?;
        node.clip = node.clip.map(|c| c.translated(dx, dy));
        node.cache.iter().for_each(|c| c.set(None));
        let children = match &mut node.kind {
            NodeKind::Leaf { bounds, .. } => {
                *bounds = bounds.translated(dx, dy);
                return Ok(());
            }
            NodeKind::Group { children } => children.clone(),
        };
        for child in children {
            self.translate_subtree(child, dx, dy)?;
        }
        Ok(())
    }
}

impl DocumentSurface for MemoryDocument {
    fn selection(&self) -> Vec<ItemId> {
        self.selection.clone()
    }

    fn bounds(&self, item: ItemId, kind: BoundsKind) -> Result<Bounds, GridError> {
        let node = self.node(item)?;
        if let Some(clip) = node.clip {
            return Ok(clip);
        }
        match &node.kind {
            NodeKind::Leaf {
                bounds,
                stroke_width,
            } => Ok(match kind {
                BoundsKind::Geometric => *bounds,
                BoundsKind::Visible => bounds.outset(stroke_width / 2.0),
            }),
            NodeKind::Group { children } => {
                let slot = &node.cache[kind.slot()];
                if let Some(cached) = slot.get() {
                    return Ok(cached);
                }
                let mut acc: Option<Bounds> = None;
                for &child in children {
                    let b = self.bounds(child, kind)?;
                    acc = Some(acc.map_or(b, |a| a.union(b)));
                }
                let b = acc.unwrap_or_default();
                slot.set(Some(b));
                Ok(b)
            }
        }
    }

    fn translate(&mut self, item: ItemId, dx: f64, dy: f64) -> Result<(), GridError> {
        self.translate_subtree(item, dx, dy)?;
        self.invalidate_ancestors(item)
    }

    fn children(&self, item: ItemId) -> Vec<ItemId> {
        match self.node(item).map(|n| &n.kind) {
            Ok(NodeKind::Group { children }) => children.clone(),
            _ => Vec::new(),
        }
    }

    fn parent(&self, item: ItemId) -> Option<ItemId> {
        self.node(item).ok().and_then(|n| n.parent)
    }

    fn group_into(
        &mut self,
        parent: Option<ItemId>,
        items: &[ItemId],
    ) -> Result<ItemId, GridError> {
        if let Some(p) = parent
            && !matches!(self.node(p)?.kind, NodeKind::Group { .. })
        {
            return Err(GridError::invalid("parent", "not a group"));
        }
        for &item in items {
            self.node(item)?;
        }
        if self.ancestry(parent).any(|id| items.contains(&id)) {
            return Err(GridError::invalid("parent", "inside one of the grouped items"));
        }
        let group = self.push(
            NodeKind::Group {
                children: Vec::new(),
            },
            parent,
        );
        if let Some(p) = parent
            && let NodeKind::Group { children } = &mut self.node_mut(p)?.kind
        {
            children.push(group);
        }
        for &item in items {
            self.detach(item)?;
            self.node_mut(item)?.parent = Some(group);
        }
        if let NodeKind::Group { children } = &mut self.node_mut(group)?.kind {
            children.extend_from_slice(items);
        }
        self.invalidate_ancestors(group)?;
        Ok(group)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn visible_bounds_include_half_stroke() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_stroked_rect(Bounds::new(0.0, 10.0, 10.0, 0.0), 2.0);
        assert_eq!(
            doc.bounds(a, BoundsKind::Visible).unwrap(),
            Bounds::new(-1.0, 11.0, 11.0, -1.0)
        );
        assert_eq!(
            doc.bounds(a, BoundsKind::Geometric).unwrap(),
            Bounds::new(0.0, 10.0, 10.0, 0.0)
        );
    }

    #[test]
    fn clip_overrides_bounds_and_moves_with_item() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 100.0, 100.0, 0.0));
        doc.set_clip(a, Bounds::new(10.0, 20.0, 20.0, 10.0)).unwrap();
        assert_eq!(
            doc.bounds(a, BoundsKind::Visible).unwrap(),
            Bounds::new(10.0, 20.0, 20.0, 10.0)
        );
        doc.translate(a, 5.0, -5.0).unwrap();
        assert_eq!(
            doc.bounds(a, BoundsKind::Geometric).unwrap(),
            Bounds::new(15.0, 15.0, 25.0, 5.0)
        );
    }

    #[test]
    fn group_bounds_and_translation() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        let b = doc.add_rect(Bounds::new(20.0, 10.0, 30.0, 0.0));
        let g = doc.group_into(None, &[a, b]).unwrap();

        assert_eq!(doc.children(g), [a, b]);
        assert_eq!(doc.parent(a), Some(g));
        assert_eq!(
            doc.bounds(g, BoundsKind::Geometric).unwrap(),
            Bounds::new(0.0, 10.0, 30.0, 0.0)
        );

        doc.translate(g, 0.0, 10.0).unwrap();
        assert_eq!(doc.bounds(b, BoundsKind::Geometric).unwrap().top, 20.0);
    }

    #[test]
    fn cached_group_bounds_follow_moves() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        let b = doc.add_rect(Bounds::new(20.0, 10.0, 30.0, 0.0));
        let inner = doc.group_into(None, &[a, b]).unwrap();
        let outer = doc.group_into(None, &[inner]).unwrap();
        assert_eq!(doc.bounds(outer, BoundsKind::Geometric).unwrap().right, 30.0);

        // Moving a leaf deep inside clears every cached ancestor.
        doc.translate(b, 15.0, 0.0).unwrap();
        assert_eq!(doc.bounds(inner, BoundsKind::Geometric).unwrap().right, 45.0);
        assert_eq!(doc.bounds(outer, BoundsKind::Geometric).unwrap().right, 45.0);

        // So does a clip on a member.
        doc.set_clip(a, Bounds::new(-5.0, 10.0, 0.0, 0.0)).unwrap();
        assert_eq!(doc.bounds(outer, BoundsKind::Geometric).unwrap().left, -5.0);
    }

    #[test]
    fn regrouping_moves_items_out_of_old_group() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        let b = doc.add_rect(Bounds::new(20.0, 10.0, 30.0, 0.0));
        let outer = doc.group_into(None, &[a, b]).unwrap();
        let inner = doc.group_into(Some(outer), &[a]).unwrap();

        assert_eq!(doc.children(outer), [b, inner]);
        assert_eq!(doc.children(inner), [a]);
        assert_eq!(doc.parent(inner), Some(outer));
    }

    #[test]
    fn unknown_item_is_an_error() {
        let doc = MemoryDocument::new();
        assert_eq!(
            doc.bounds(ItemId(7), BoundsKind::Geometric),
            Err(GridError::UnknownItem(ItemId(7)))
        );
    }

    #[test]
    fn grouping_into_own_descendant_is_rejected() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        let b = doc.add_rect(Bounds::new(20.0, 10.0, 30.0, 0.0));
        let g = doc.group_into(None, &[a]).unwrap();
        let inner = doc.group_into(Some(g), &[b]).unwrap();

        for parent in [g, inner] {
            assert!(matches!(
                doc.group_into(Some(parent), &[g]),
                Err(GridError::InvalidParameter { name: "parent", .. })
            ));
        }
        // Nothing moved.
        assert_eq!(doc.parent(g), None);
        assert_eq!(doc.children(g), [a, inner]);
        assert_eq!(doc.bounds(g, BoundsKind::Geometric).unwrap().right, 30.0);
    }

    #[test]
    fn grouping_under_a_leaf_is_rejected() {
        let mut doc = MemoryDocument::new();
        let a = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        let b = doc.add_rect(Bounds::new(0.0, 10.0, 10.0, 0.0));
        assert!(matches!(
            doc.group_into(Some(a), &[b]),
            Err(GridError::InvalidParameter { name: "parent", .. })
        ));
    }
}
