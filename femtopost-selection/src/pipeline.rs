//! Partition scan and run-level aggregation.

use crate::cuts::SelectionCuts;
use crate::dedup::EventDeduplicator;
use crate::error::{Error, Result};
use crate::filler::fill_track;
use crate::layout::{RowEntry, RowLayout, TripletPolicy};
use femtopost_core::{Bucket, EventHist, HistogramSchema, HistogramSet, Partition};
use rayon::prelude::*;
use std::fmt;

/// Runtime options of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Process partitions on the rayon pool.
    pub parallel: bool,
    pub triplet_policy: TripletPolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            parallel: true,
            triplet_policy: TripletPolicy::Lenient,
        }
    }
}

/// Counters of one partition scan.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PartitionStatistics {
    pub name: String,
    /// Particle rows in the partition.
    pub rows: usize,
    /// Rows reached before the scan ended.
    pub rows_scanned: usize,
    pub event_rejected: usize,
    /// Distinct collisions credited to the event histograms.
    pub collisions: usize,
    pub tracks: usize,
    pub triplets: usize,
    pub protons: usize,
    pub deuterons: usize,
    pub lambdas: usize,
    /// Row of the V0 that ended the scan early.
    pub truncated_at: Option<usize>,
}

/// Histograms and counters of one partition.
#[derive(Debug, Clone)]
pub struct PartitionOutput {
    pub histograms: HistogramSet,
    pub statistics: PartitionStatistics,
}

/// Aggregated counters of a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    /// Per-partition counters, in input order.
    pub partitions: Vec<PartitionStatistics>,
    /// Partitions the source declined to load.
    pub skipped: usize,
}

impl RunSummary {
    fn total(&self, f: impl Fn(&PartitionStatistics) -> usize) -> usize {
        self.partitions.iter().map(f).sum()
    }

    #[must_use]
    pub fn rows_scanned(&self) -> usize {
        self.total(|p| p.rows_scanned)
    }

    #[must_use]
    pub fn collisions(&self) -> usize {
        self.total(|p| p.collisions)
    }

    #[must_use]
    pub fn tracks(&self) -> usize {
        self.total(|p| p.tracks)
    }

    #[must_use]
    pub fn triplets(&self) -> usize {
        self.total(|p| p.triplets)
    }

    #[must_use]
    pub fn protons(&self) -> usize {
        self.total(|p| p.protons)
    }

    #[must_use]
    pub fn deuterons(&self) -> usize {
        self.total(|p| p.deuterons)
    }

    #[must_use]
    pub fn lambdas(&self) -> usize {
        self.total(|p| p.lambdas)
    }

    /// Number of partitions whose scan ended at a dangling V0.
    #[must_use]
    pub fn truncated(&self) -> usize {
        self.partitions
            .iter()
            .filter(|p| p.truncated_at.is_some())
            .count()
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Partitions:  {} processed, {} skipped, {} truncated",
            self.partitions.len(),
            self.skipped,
            self.truncated()
        )?;
        writeln!(f, "Rows:        {}", self.rows_scanned())?;
        writeln!(f, "Collisions:  {}", self.collisions())?;
        writeln!(
            f,
            "Tracks:      {} ({} proton, {} deuteron)",
            self.tracks(),
            self.protons(),
            self.deuterons()
        )?;
        write!(
            f,
            "V0s:         {} ({} lambda)",
            self.triplets(),
            self.lambdas()
        )
    }
}

/// Merged histograms and counters of a run.
#[derive(Debug, Clone)]
pub struct RunOutput {
    pub histograms: HistogramSet,
    pub summary: RunSummary,
}

/// Selection and aggregation engine.
///
/// Cuts and schema are fixed at construction. Each partition is scanned
/// into its own [`HistogramSet`] with its own [`EventDeduplicator`], and
/// the sets are merged by addition.
#[derive(Debug, Clone)]
pub struct Pipeline {
    cuts: SelectionCuts,
    schema: HistogramSchema,
    config: PipelineConfig,
}

impl Pipeline {
    #[must_use]
    pub fn new(cuts: SelectionCuts, schema: HistogramSchema, config: PipelineConfig) -> Self {
        Self {
            cuts,
            schema,
            config,
        }
    }

    #[must_use]
    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    #[must_use]
    pub fn schema(&self) -> &HistogramSchema {
        &self.schema
    }

    /// Scans one partition.
    ///
    /// Rows are visited in order. A row whose collision fails the event
    /// gate is skipped entirely. Otherwise the collision is credited to the
    /// event histograms on first encounter and the row is dispatched by
    /// its layout entry. A dangling V0 ends the scan.
    ///
    /// # Errors
    /// Returns an error if the row layout is rejected by the triplet
    /// policy.
    pub fn process_partition(&self, partition: &Partition) -> Result<PartitionOutput> {
        let layout = RowLayout::build(partition, self.config.triplet_policy)?;
        let mut histograms = HistogramSet::new(&self.schema);
        let mut dedup = EventDeduplicator::new();
        let mut stats = PartitionStatistics {
            name: partition.name().to_string(),
            rows: partition.len(),
            ..PartitionStatistics::default()
        };
        let collisions = partition.collisions();

        for (row, entry) in layout.iter().enumerate() {
            stats.rows_scanned += 1;
            let collision = partition.collision_of(row);
            if !self.cuts.event.accepts(collisions, collision) {
                stats.event_rejected += 1;
                continue;
            }
            if dedup.first_encounter(collision) {
                histograms
                    .event_mut(EventHist::VertexZ)
                    .fill(f64::from(collisions.pos_z[collision]));
                histograms
                    .event_mut(EventHist::Multiplicity)
                    .fill(f64::from(collisions.mult_v0m[collision]));
            }
            let vertex = partition.primary_vertex(collision);

            match entry {
                RowEntry::Track => {
                    stats.tracks += 1;
                    let view = partition.view(row);
                    fill_track(histograms.bucket_mut(Bucket::RawTrack), &view, &vertex);
                    if self.cuts.proton.accepts(&view, &vertex) {
                        stats.protons += 1;
                        fill_track(histograms.bucket_mut(Bucket::Proton), &view, &vertex);
                    }
                    if self.cuts.deuteron.accepts(&view, &vertex) {
                        stats.deuterons += 1;
                        fill_track(histograms.bucket_mut(Bucket::Deuteron), &view, &vertex);
                    }
                }
                RowEntry::Triplet { v0, pos, neg } => {
                    stats.triplets += 1;
                    let (v0, pos, neg) = (partition.view(v0), partition.view(pos), partition.view(neg));
                    fill_track(histograms.bucket_mut(Bucket::RawLambda), &v0, &vertex);
                    fill_track(histograms.bucket_mut(Bucket::RawPosDaughter), &pos, &vertex);
                    fill_track(histograms.bucket_mut(Bucket::RawNegDaughter), &neg, &vertex);
                    if self.cuts.lambda.accepts(&v0, &vertex)
                        && self.cuts.pos_daughter.accepts(&pos, &vertex)
                        && self.cuts.neg_daughter.accepts(&neg, &vertex)
                    {
                        stats.lambdas += 1;
                        fill_track(histograms.bucket_mut(Bucket::Lambda), &v0, &vertex);
                        fill_track(histograms.bucket_mut(Bucket::PosDaughter), &pos, &vertex);
                        fill_track(histograms.bucket_mut(Bucket::NegDaughter), &neg, &vertex);
                    }
                }
                RowEntry::DanglingV0 => {
                    log::warn!(
                        "{}: V0 at row {row} has no room for its daughters, skipping the remaining {} rows",
                        partition.name(),
                        partition.len() - row
                    );
                    stats.truncated_at = Some(row);
                    break;
                }
                RowEntry::Passive => {}
            }
        }

        stats.collisions = dedup.len();
        log::info!(
            "{}: {} rows, {} collisions accepted, {} protons, {} deuterons, {} lambdas",
            stats.name,
            stats.rows,
            stats.collisions,
            stats.protons,
            stats.deuterons,
            stats.lambdas
        );
        Ok(PartitionOutput {
            histograms,
            statistics: stats,
        })
    }

    /// Processes in-memory partitions and merges their histograms.
    ///
    /// # Errors
    /// Returns the first partition error.
    pub fn run(&self, partitions: &[Partition]) -> Result<RunOutput> {
        let outputs = self.map_partitions(partitions, |p| self.process_partition(p).map(Some))?;
        self.merge(outputs)
    }

    /// Loads partitions by name and processes them.
    ///
    /// `load` returns `Ok(None)` for a partition that should be skipped.
    /// With parallelism enabled, loading and scanning run on the rayon
    /// pool; histograms are merged in `names` order either way.
    ///
    /// # Errors
    /// Returns the first load or partition error.
    pub fn run_with<L, E>(&self, names: &[String], load: L) -> std::result::Result<RunOutput, E>
    where
        L: Fn(&str) -> std::result::Result<Option<Partition>, E> + Sync,
        E: From<Error> + Send,
    {
        let outputs = self.map_partitions::<_, _, E>(names, |name| match load(name.as_str())? {
            Some(partition) => Ok(Some(self.process_partition(&partition)?)),
            None => Ok(None),
        })?;
        Ok(self.merge(outputs)?)
    }

    fn map_partitions<T, F, E>(
        &self,
        items: &[T],
        f: F,
    ) -> std::result::Result<Vec<Option<PartitionOutput>>, E>
    where
        T: Sync,
        F: Fn(&T) -> std::result::Result<Option<PartitionOutput>, E> + Sync + Send,
        E: Send,
    {
        if self.config.parallel {
            items.par_iter().map(f).collect()
        } else {
            items.iter().map(f).collect()
        }
    }

    fn merge(&self, outputs: Vec<Option<PartitionOutput>>) -> Result<RunOutput> {
        let mut histograms = HistogramSet::new(&self.schema);
        let mut summary = RunSummary::default();
        for output in outputs {
            match output {
                Some(output) => {
                    histograms.merge(&output.histograms)?;
                    summary.partitions.push(output.statistics);
                }
                None => summary.skipped += 1,
            }
        }
        Ok(RunOutput {
            histograms,
            summary,
        })
    }
}
