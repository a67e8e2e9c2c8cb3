//! Circular dependency detection infrastructure.

use std::cell::RefCell;

use crate::error::{DiError, DiResult};

// Thread-local construction frames for circular dependency detection
thread_local! {
    static FRAMES: RefCell<Vec<Frame>> = RefCell::new(Vec::new());
}

struct Frame {
    registry: usize,
    name: String,
}

/// View of the producers under construction on this thread for one registry,
/// outermost first.
///
/// Frames live in thread-local storage, so every resolver on the thread sees
/// them, including ones started through a cloned registry handle inside a
/// constructor. Frames of other registries never count.
#[derive(Debug)]
pub(crate) struct ResolutionStack {
    registry: usize,
    max_depth: usize,
}

impl ResolutionStack {
    pub(crate) fn new(registry: usize, max_depth: usize) -> Self {
        Self { registry, max_depth }
    }

    /// Pushes `name`, failing if it is already on the stack or the stack is full.
    pub(crate) fn enter(&self, name: &str) -> DiResult<StackGuard> {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();

            // Circular detection BEFORE pushing the new name
            if frames.iter().any(|frame| frame.registry == self.registry && frame.name == name) {
                let mut path = self.collect(&frames);
                path.push(name.to_owned());
                return Err(DiError::Circular(path));
            }

            let depth = frames.iter().filter(|frame| frame.registry == self.registry).count();
            if depth >= self.max_depth {
                return Err(DiError::DepthExceeded(self.max_depth));
            }

            frames.push(Frame {
                registry: self.registry,
                name: name.to_owned(),
            });
            Ok(StackGuard {
                registry: self.registry,
            })
        })
    }

    pub(crate) fn depth(&self) -> usize {
        FRAMES.with(|frames| {
            frames
                .borrow()
                .iter()
                .filter(|frame| frame.registry == self.registry)
                .count()
        })
    }

    pub(crate) fn path(&self) -> Vec<String> {
        FRAMES.with(|frames| self.collect(&frames.borrow()))
    }

    fn collect(&self, frames: &[Frame]) -> Vec<String> {
        frames
            .iter()
            .filter(|frame| frame.registry == self.registry)
            .map(|frame| frame.name.clone())
            .collect()
    }
}

/// Pops its frame when dropped.
pub(crate) struct StackGuard {
    registry: usize,
}

impl Drop for StackGuard {
    fn drop(&mut self) {
        FRAMES.with(|frames| {
            let mut frames = frames.borrow_mut();
            if let Some(at) = frames.iter().rposition(|frame| frame.registry == self.registry) {
                frames.remove(at);
            }
        });
    }
}
