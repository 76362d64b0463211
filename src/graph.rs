use crate::NodeIdx;

struct Slot<P> {
    payload: P,
    arcs: Vec<NodeIdx>,
}

/// Undirected graph of payloads.
///
/// Arcs are only ever created and destroyed in symmetric pairs, so for every
/// `b` in `neighbors(a)`, `a` is in `neighbors(b)`. Removed slots are reused
/// last-in first-out, which makes an add/remove cycle leave the graph exactly
/// as it was, down to the node indices handed out next time.
pub struct Graph<P> {
    slots: Vec<Option<Slot<P>>>,
    free: Vec<NodeIdx>,
    arc_count: usize,
}

impl<P> Default for Graph<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> Graph<P> {
    pub fn new() -> Self {
        Self {
            slots: vec![],
            free: vec![],
            arc_count: 0,
        }
    }

    pub fn add_node(&mut self, payload: P) -> NodeIdx {
        let slot = Slot {
            payload,
            arcs: vec![],
        };

        match self.free.pop() {
            Some(idx) => {
                self.slots[idx as usize] = Some(slot);
                idx
            }
            None => {
                self.slots.push(Some(slot));
                (self.slots.len() - 1) as NodeIdx
            }
        }
    }

    /// Removes the node together with every arc touching it.
    pub fn remove_node(&mut self, idx: NodeIdx) -> Option<P> {
        let slot = self.slots.get_mut(idx as usize)?.take()?;

        for &neighbor in &slot.arcs {
            if let Some(other) = self.slots[neighbor as usize].as_mut() {
                other.arcs.retain(|&arc| arc != idx);
            }
        }

        self.arc_count -= slot.arcs.len();
        self.free.push(idx);

        Some(slot.payload)
    }

    /// Connects `a` and `b` in both directions. Returns `false` without
    /// changing anything if the arc already exists, if `a == b`, or if either
    /// node is missing.
    pub fn add_mutual_arc(&mut self, a: NodeIdx, b: NodeIdx) -> bool {
        if a == b || !self.contains(a) || !self.contains(b) || self.has_arc(a, b) {
            return false;
        }

        self.slot_mut(a).arcs.push(b);
        self.slot_mut(b).arcs.push(a);
        self.arc_count += 1;

        true
    }

    pub fn remove_mutual_arc(&mut self, a: NodeIdx, b: NodeIdx) -> bool {
        if !self.has_arc(a, b) {
            return false;
        }

        self.slot_mut(a).arcs.retain(|&arc| arc != b);
        self.slot_mut(b).arcs.retain(|&arc| arc != a);
        self.arc_count -= 1;

        true
    }

    pub fn has_arc(&self, a: NodeIdx, b: NodeIdx) -> bool {
        self.slot(a).is_some_and(|slot| slot.arcs.contains(&b))
    }

    pub fn contains(&self, idx: NodeIdx) -> bool {
        self.slot(idx).is_some()
    }

    pub fn get(&self, idx: NodeIdx) -> Option<&P> {
        self.slot(idx).map(|slot| &slot.payload)
    }

    /// Neighbors in the order their arcs were added. Empty for a missing node.
    pub fn neighbors(&self, idx: NodeIdx) -> &[NodeIdx] {
        self.slot(idx).map(|slot| &slot.arcs[..]).unwrap_or(&[])
    }

    pub fn node_count(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    /// Number of mutual arcs, each counted once.
    pub fn arc_count(&self) -> usize {
        self.arc_count
    }

    /// Upper bound (exclusive) of every index currently in use.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeIdx, &P)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(idx, slot)| slot.as_ref().map(|slot| (idx as NodeIdx, &slot.payload)))
    }

    fn slot(&self, idx: NodeIdx) -> Option<&Slot<P>> {
        self.slots.get(idx as usize)?.as_ref()
    }

    fn slot_mut(&mut self, idx: NodeIdx) -> &mut Slot<P> {
        self.slots[idx as usize]
            .as_mut()
            .expect("arc endpoints are checked before mutation")
    }
}
