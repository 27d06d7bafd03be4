//! Reversible state store for the CP propagation subsystem.
//!
//! A [`Trail`] is an arena of *trailed cells*: every reversible scalar in
//! the CP layer (a domain's `size`/`min`/`max`, a constraint's `active`
//! flag, an accumulated sum) is allocated as one cell. `checkpoint` pushes
//! a frame; `set` records a cell's pre-image into the top frame the first
//! time that cell is written since the checkpoint; `restore` pops the
//! frame and rewrites every recorded pre-image in reverse order.
//!
//! Cells are identified by a monotonically increasing frame id rather than
//! stack depth, so that a stale marker left behind by a popped frame can
//! never be mistaken for "already saved in the current frame": depth can
//! go back down across `checkpoint`/`restore` pairs, but frame ids never
//! repeat.

/// Handle to a single reversible scalar cell in a [`Trail`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TrailedCell(usize);

/// Opaque handle returned by [`Trail::checkpoint`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameId(u64);

/// A reversible store of `i64` cells with checkpoint/restore semantics.
///
/// Single-threaded per instance: a CP model owns exactly one `Trail`, and
/// no cell crosses trails.
#[derive(Debug, Clone, Default)]
pub struct Trail {
    values: Vec<i64>,
    saved_at: Vec<u64>,
    frames: Vec<(u64, Vec<(usize, i64)>)>,
    next_frame_id: u64,
}

impl Trail {
    pub fn new() -> Self {
        Self {
            values: Vec::new(),
            saved_at: Vec::new(),
            frames: Vec::new(),
            next_frame_id: 0,
        }
    }

    /// Allocates a new cell initialized to `init`. Cells allocated before
    /// the first `checkpoint` are part of the trail's base state and are
    /// never reverted.
    pub fn new_cell(&mut self, init: i64) -> TrailedCell {
        let id = self.values.len();
        self.values.push(init);
        self.saved_at.push(0);
        TrailedCell(id)
    }

    pub fn get(&self, cell: TrailedCell) -> i64 {
        self.values[cell.0]
    }

    /// Writes `v` to `cell`. Records the cell's prior value into the
    /// current frame at most once per checkpoint.
    pub fn set(&mut self, cell: TrailedCell, v: i64) {
        let current_id = self.frames.last().map_or(0, |(id, _)| *id);
        if current_id != 0 && self.saved_at[cell.0] != current_id {
            let old = self.values[cell.0];
            self.frames.last_mut().unwrap().1.push((cell.0, old));
            self.saved_at[cell.0] = current_id;
        }
        self.values[cell.0] = v;
    }

    /// Pushes a new frame. O(1).
    pub fn checkpoint(&mut self) -> FrameId {
        self.next_frame_id += 1;
        self.frames.push((self.next_frame_id, Vec::new()));
        FrameId(self.next_frame_id)
    }

    /// Pops the top frame and rewrites every recorded pre-image in LIFO
    /// order. Panics if the trail has no active frame.
    pub fn restore(&mut self) {
        let (_, log) = self.frames.pop().expect("restore on empty trail");
        for (cell, old) in log.into_iter().rev() {
            self.values[cell] = old;
        }
    }

    /// Current checkpoint depth.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// Drops all frames without restoring, committing every pending write
    /// as the new base state. Used by `CPModel::init` once the initial
    /// fix-point has run.
    pub fn commit_base(&mut self) {
        self.frames.clear();
    }
}

/// A typed view of a single [`Trail`] cell.
///
/// `T` must be losslessly representable as `i64`; implemented for the
/// handful of scalar types the CP layer trails (`i32`, `bool`, `u32`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Trailed<T> {
    cell: TrailedCell,
    _marker: std::marker::PhantomData<T>,
}

impl<T: TrailScalar> Trailed<T> {
    pub fn new(trail: &mut Trail, init: T) -> Self {
        let cell = trail.new_cell(init.encode());
        Self {
            cell,
            _marker: std::marker::PhantomData,
        }
    }

    pub fn get(&self, trail: &Trail) -> T {
        T::decode(trail.get(self.cell))
    }

    pub fn set(&self, trail: &mut Trail, value: T) {
        trail.set(self.cell, value.encode());
    }
}

/// Scalars that can live in a [`Trail`] cell.
pub trait TrailScalar: Copy {
    fn encode(self) -> i64;
    fn decode(raw: i64) -> Self;
}

impl TrailScalar for i32 {
    fn encode(self) -> i64 {
        self as i64
    }
    fn decode(raw: i64) -> Self {
        raw as i32
    }
}

impl TrailScalar for u32 {
    fn encode(self) -> i64 {
        self as i64
    }
    fn decode(raw: i64) -> Self {
        raw as u32
    }
}

impl TrailScalar for bool {
    fn encode(self) -> i64 {
        self as i64
    }
    fn decode(raw: i64) -> Self {
        raw != 0
    }
}

impl TrailScalar for usize {
    fn encode(self) -> i64 {
        self as i64
    }
    fn decode(raw: i64) -> Self {
        raw as usize
    }
}
