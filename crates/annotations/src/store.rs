//! Annotation snapshot store
//!
//! Readers take cheap `Arc` clones of the current snapshot; a load builds a
//! complete replacement off to the side and swaps it in under a short write
//! lock. Loads are serialized so exactly one writer runs at a time.

use chrono::{DateTime, Utc};
use hikepal_core::{Annotation, Coordinate, Facility, HazardZone};
use std::sync::{Arc, PoisonError, RwLock};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::error::LoadError;
use crate::source::AnnotationSource;

/// Immutable set of annotations from one successful load
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnnotationSet {
    annotations: Vec<Annotation>,
    loaded_at: Option<DateTime<Utc>>,
}

impl AnnotationSet {
    /// Wrap a freshly mapped annotation list
    pub fn new(annotations: Vec<Annotation>, loaded_at: DateTime<Utc>) -> Self {
        Self {
            annotations,
            loaded_at: Some(loaded_at),
        }
    }

    /// All annotations in source order
    pub fn all(&self) -> &[Annotation] {
        &self.annotations
    }

    /// Facilities only
    pub fn facilities(&self) -> impl Iterator<Item = &Facility> {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::Facility(f) => Some(f),
            Annotation::Hazard(_) => None,
        })
    }

    /// Hazard zones only
    pub fn hazards(&self) -> impl Iterator<Item = &HazardZone> {
        self.annotations.iter().filter_map(|a| match a {
            Annotation::Hazard(h) => Some(h),
            Annotation::Facility(_) => None,
        })
    }

    /// Hazard zones whose radius covers `point`
    pub fn hazards_containing(&self, point: &Coordinate) -> Vec<&HazardZone> {
        self.hazards().filter(|h| h.contains(point)).collect()
    }

    /// Number of facilities
    pub fn facility_count(&self) -> usize {
        self.facilities().count()
    }

    /// Number of hazard zones
    pub fn hazard_count(&self) -> usize {
        self.hazards().count()
    }

    /// Total annotation count
    pub fn len(&self) -> usize {
        self.annotations.len()
    }

    /// Whether the set holds no annotations
    pub fn is_empty(&self) -> bool {
        self.annotations.is_empty()
    }

    /// When this set was loaded; `None` for the initial empty set
    pub fn loaded_at(&self) -> Option<DateTime<Utc>> {
        self.loaded_at
    }
}

/// Store holding the last successfully loaded annotation set
#[derive(Debug, Default)]
pub struct AnnotationStore {
    snapshot: RwLock<Arc<AnnotationSet>>,
    loader: Mutex<()>,
}

impl AnnotationStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current snapshot; empty until the first successful load
    pub fn current(&self) -> Arc<AnnotationSet> {
        Arc::clone(&self.snapshot.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Fetch from `source` and replace the snapshot.
    ///
    /// On failure the previous snapshot stays in place. Concurrent calls
    /// queue behind each other.
    pub async fn load<S: AnnotationSource>(
        &self,
        source: &S,
    ) -> Result<Arc<AnnotationSet>, LoadError> {
        let _guard = self.loader.lock().await;
        debug!(source = %source.describe(), "Loading annotations");

        let annotations = match source.fetch().await.and_then(|s| s.into_annotations()) {
            Ok(annotations) => annotations,
            Err(e) => {
                warn!(
                    source = %source.describe(),
                    error = %e,
                    "Annotation load failed, keeping previous snapshot"
                );
                return Err(e);
            }
        };

        let set = Arc::new(AnnotationSet::new(annotations, Utc::now()));
        *self.snapshot.write().unwrap_or_else(PoisonError::into_inner) = Arc::clone(&set);

        info!(
            source = %source.describe(),
            facilities = set.facility_count(),
            hazards = set.hazard_count(),
            "Annotations loaded"
        );
        Ok(set)
    }
}
