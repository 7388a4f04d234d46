//! Authoritative store of active fences.

use thiserror::Error;
use tracing::debug;

use super::types::{Fence, FenceId};
use crate::coord::{CoordError, Coordinate};

/// Errors returned by [`FenceRegistry`] mutations.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RegistryError {
    /// A fence with this name is already registered.
    #[error("Fence '{0}' already exists")]
    DuplicateName(String),

    /// No fence with this name is registered.
    #[error("Fence '{0}' not found")]
    NotFound(String),

    /// Radius must be a finite number greater than zero.
    #[error("Invalid radius {0}m (must be greater than zero)")]
    InvalidRadius(f64),

    /// Fence center is outside the valid latitude/longitude range.
    #[error("Invalid fence center: {0}")]
    InvalidCoordinate(#[from] CoordError),

    /// Fence names must contain at least one non-whitespace character.
    #[error("Fence name must not be empty")]
    EmptyName,
}

/// Ordered collection of fences keyed by unique name.
///
/// Registration order is preserved and drives the order in which transition
/// events are produced for a single sample. The registry has no locking of
/// its own; the controller guards it together with the evaluator.
#[derive(Debug, Default)]
pub struct FenceRegistry {
    fences: Vec<Fence>,
    next_id: u64,
}

impl FenceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fence from raw latitude/longitude values.
    ///
    /// Fails with [`RegistryError::InvalidCoordinate`] for out-of-range
    /// centers; otherwise behaves like [`FenceRegistry::add`].
    pub fn add_raw(
        &mut self,
        name: &str,
        latitude: f64,
        longitude: f64,
        radius_m: f64,
    ) -> Result<FenceId, RegistryError> {
        let center = Coordinate::new(latitude, longitude)?;
        self.add(name, center, radius_m)
    }

    /// Register a new fence.
    ///
    /// Duplicate names are rejected rather than replaced so an existing
    /// fence never silently loses its containment state. Leading and
    /// trailing whitespace is not part of a name.
    pub fn add(
        &mut self,
        name: &str,
        center: Coordinate,
        radius_m: f64,
    ) -> Result<FenceId, RegistryError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(RegistryError::EmptyName);
        }
        if !radius_m.is_finite() || radius_m <= 0.0 {
            return Err(RegistryError::InvalidRadius(radius_m));
        }
        if self.contains(name) {
            return Err(RegistryError::DuplicateName(name.to_string()));
        }

        self.next_id += 1;
        let id = FenceId(self.next_id);
        self.fences.push(Fence::new(id, name.to_string(), center, radius_m));

        debug!(fence = name, id = %id, center = %center, radius_m, "Fence registered");
        Ok(id)
    }

    /// Remove a fence by name, returning it.
    pub fn remove(&mut self, name: &str) -> Result<Fence, RegistryError> {
        let name = name.trim();
        let index = self
            .fences
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| RegistryError::NotFound(name.to_string()))?;

        // `Vec::remove` keeps the remaining fences in registration order.
        let fence = self.fences.remove(index);
        debug!(fence = name, id = %fence.id(), "Fence removed");
        Ok(fence)
    }

    /// Fences in registration order.
    pub fn list(&self) -> impl Iterator<Item = &Fence> {
        self.fences.iter()
    }

    pub fn get(&self, name: &str) -> Option<&Fence> {
        let name = name.trim();
        self.fences.iter().find(|f| f.name() == name)
    }

    pub fn get_by_id(&self, id: FenceId) -> Option<&Fence> {
        self.fences.iter().find(|f| f.id() == id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn len(&self) -> usize {
        self.fences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fences.is_empty()
    }
}
