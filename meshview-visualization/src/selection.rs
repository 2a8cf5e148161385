//! Selection registers: cyclic indices over fixed-order catalogs

use crate::material::ShadingModel;

/// Direction of a selection step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Forward,
    Backward,
}

/// An ordered, fixed catalog with one active entry
///
/// Membership and order never change after construction. Advancing wraps at
/// both ends; on an empty catalog it does nothing.
#[derive(Debug, Clone, PartialEq)]
pub struct Catalog<T> {
    entries: Vec<T>,
    index: usize,
}

impl<T> Catalog<T> {
    pub fn new(entries: Vec<T>) -> Self {
        Self { entries, index: 0 }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn entries(&self) -> &[T] {
        &self.entries
    }

    /// The active entry, `None` only for an empty catalog
    pub fn active(&self) -> Option<&T> {
        self.entries.get(self.index)
    }

    /// Index one step away from the active one, without moving
    pub fn peek(&self, step: Step) -> usize {
        let count = self.entries.len();
        if count == 0 {
            return 0;
        }
        match step {
            Step::Forward => (self.index + 1) % count,
            Step::Backward => (self.index + count - 1) % count,
        }
    }

    /// Move the active index one step and return it
    pub fn advance(&mut self, step: Step) -> usize {
        self.index = self.peek(step);
        self.index
    }

    /// Make `index` active; out-of-range indices are ignored
    pub fn select(&mut self, index: usize) -> bool {
        if index < self.entries.len() {
            self.index = index;
            true
        } else {
            false
        }
    }
}

/// The three independent registers the viewer cycles through
#[derive(Debug, Clone)]
pub struct SelectionState {
    pub shaders: Catalog<ShadingModel>,
    pub textures: Catalog<String>,
    pub models: Catalog<String>,
}

impl SelectionState {
    pub fn new(shaders: Vec<ShadingModel>, textures: Vec<String>, models: Vec<String>) -> Self {
        Self {
            shaders: Catalog::new(shaders),
            textures: Catalog::new(textures),
            models: Catalog::new(models),
        }
    }

    /// The active shading model, unlit normals when the catalog is empty
    pub fn shading_model(&self) -> ShadingModel {
        self.shaders.active().copied().unwrap_or(ShadingModel::Normals)
    }

    pub fn texture(&self) -> Option<&str> {
        self.textures.active().map(String::as_str)
    }

    pub fn model(&self) -> Option<&str> {
        self.models.active().map(String::as_str)
    }
}
