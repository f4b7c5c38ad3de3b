//! Level-by-level orchestration of the imputation stages.
//!
//! A [`Pipeline`] accepts one table per administrative level, strictly in
//! the order National → Region → District → SubDistrict. Each level runs the
//! stage sequence of its [`LevelPlan`]; the finalized table is kept as the
//! parent input of the next level.

use crate::config::ImputationConfig;
use crate::core::{AdminLevel, Hierarchy, PriceTable};
use crate::error::{ImputeError, Result};
use crate::geo::{CoordinateTable, NeighborGraph};
use crate::imputation::{
    geographic_impute, global_regression, local_regression_with_degree, propagate_from_parent,
    refine_table, NoticeKind, Notices,
};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use tracing::{debug, info, info_span};

/// One step of a level's stage sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Windowed polynomial fits with the given half window.
    LocalRegression { half_window: usize },
    /// Neighbor averaging.
    Geographic { passes: usize, neighbor_count: usize },
    /// Whole-series polynomial fallback.
    GlobalRegression,
    /// ARIMA refinement against the table as received.
    Refinement,
    /// Copy values from the finalized parent level.
    Propagation { parent: AdminLevel },
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::LocalRegression { half_window } => write!(f, "local_regression(w={half_window})"),
            Stage::Geographic { passes, .. } => write!(f, "geographic(passes={passes})"),
            Stage::GlobalRegression => f.write_str("global_regression"),
            Stage::Refinement => f.write_str("refinement"),
            Stage::Propagation { parent } => write!(f, "propagation(from {parent})"),
        }
    }
}

/// The stage sequence for one administrative level.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelPlan {
    pub level: AdminLevel,
    pub stages: Vec<Stage>,
}

impl LevelPlan {
    pub fn for_level(level: AdminLevel, config: &ImputationConfig) -> Self {
        let local = Stage::LocalRegression {
            half_window: config.local.half_window,
        };
        let fine = Stage::LocalRegression {
            half_window: config.local.fine_half_window,
        };

        let stages = match level {
            AdminLevel::National => vec![local, Stage::GlobalRegression],
            AdminLevel::Region => {
                let mut stages = vec![
                    local,
                    Stage::Geographic {
                        passes: config.geographic.passes,
                        neighbor_count: config.geographic.neighbor_count,
                    },
                    Stage::GlobalRegression,
                ];
                if config.refinement.enabled {
                    stages.push(Stage::Refinement);
                }
                stages
            }
            AdminLevel::District => vec![
                fine,
                local,
                Stage::Propagation {
                    parent: AdminLevel::Region,
                },
            ],
            AdminLevel::SubDistrict => vec![
                fine,
                local,
                Stage::Propagation {
                    parent: AdminLevel::District,
                },
            ],
        };

        Self { level, stages }
    }
}

/// Missing-cell counts around one stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StageReport {
    pub stage: Stage,
    pub missing_before: usize,
    pub missing_after: usize,
    /// Cells written by the stage; for refinement, cells rewritten.
    pub changed: usize,
}

/// Outcome of one level run.
#[derive(Debug, Clone)]
pub struct LevelReport {
    pub level: AdminLevel,
    pub rows: usize,
    /// Rows dropped for a blank location name before the run.
    pub dropped_rows: usize,
    pub missing_before: usize,
    pub missing_after: usize,
    pub stages: Vec<StageReport>,
    pub notices: Notices,
}

/// Runs the levels in order and keeps each finalized table.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: ImputationConfig,
    coordinates: CoordinateTable,
    /// Child → parent maps keyed by the child's level.
    hierarchies: HashMap<AdminLevel, Hierarchy>,
    finalized: BTreeMap<AdminLevel, PriceTable>,
    next: Option<AdminLevel>,
}

impl Pipeline {
    /// A pipeline using the predefined governorate coordinates.
    pub fn new(config: ImputationConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            coordinates: CoordinateTable::governorates(),
            hierarchies: HashMap::new(),
            finalized: BTreeMap::new(),
            next: Some(AdminLevel::National),
        })
    }

    pub fn with_coordinates(mut self, coordinates: CoordinateTable) -> Self {
        self.coordinates = coordinates;
        self
    }

    /// Set the map from `child_level` locations to their parents.
    pub fn with_hierarchy(mut self, child_level: AdminLevel, hierarchy: Hierarchy) -> Self {
        self.hierarchies.insert(child_level, hierarchy);
        self
    }

    pub fn config(&self) -> &ImputationConfig {
        &self.config
    }

    /// The level the pipeline will accept next, if any.
    pub fn next_level(&self) -> Option<AdminLevel> {
        self.next
    }

    pub fn finalized(&self, level: AdminLevel) -> Option<&PriceTable> {
        self.finalized.get(&level)
    }

    /// All finalized tables, coarsest first.
    pub fn into_finalized(self) -> BTreeMap<AdminLevel, PriceTable> {
        self.finalized
    }

    /// Impute one level's table and finalize it.
    ///
    /// The table must be the level the pipeline expects next, carry every
    /// required product and cover contiguous months per location. Nothing
    /// is finalized when an error is returned.
    pub fn run_level(&mut self, mut table: PriceTable) -> Result<LevelReport> {
        let level = table.level();
        match self.next {
            Some(expected) if expected == level => {}
            Some(expected) => {
                return Err(ImputeError::LevelOrder {
                    expected: expected.to_string(),
                    got: level,
                })
            }
            None => {
                return Err(ImputeError::LevelOrder {
                    expected: "no further level".to_string(),
                    got: level,
                })
            }
        }

        for product in &self.config.required_products {
            table.require_product(product)?;
        }

        let dropped_rows = match level {
            AdminLevel::District | AdminLevel::SubDistrict if self.config.drop_blank_locations => {
                table.drop_blank_locations()
            }
            _ => 0,
        };
        if table.is_empty() {
            return Err(ImputeError::EmptyData);
        }
        table.validate_contiguous()?;

        let plan = LevelPlan::for_level(level, &self.config);
        let span = info_span!("impute_level", %level);
        let _guard = span.enter();

        let original = table.clone();
        let missing_before = table.missing_count();
        info!(rows = table.len(), missing = missing_before, dropped_rows, "level run started");

        let mut notices = Notices::new();
        let mut stages = Vec::with_capacity(plan.stages.len());
        for stage in plan.stages {
            let before = table.missing_count();
            let changed = self.run_stage(stage, &mut table, &original, &mut notices)?;
            let after = table.missing_count();
            debug!(%stage, before, after, changed, "stage complete");
            stages.push(StageReport {
                stage,
                missing_before: before,
                missing_after: after,
                changed,
            });
        }

        let missing_after = table.missing_count();
        info!(missing = missing_after, notices = notices.total(), "level run finished");

        let report = LevelReport {
            level,
            rows: table.len(),
            dropped_rows,
            missing_before,
            missing_after,
            stages,
            notices,
        };
        self.finalized.insert(level, table);
        self.next = level.next();
        Ok(report)
    }

    fn run_stage(
        &self,
        stage: Stage,
        table: &mut PriceTable,
        original: &PriceTable,
        notices: &mut Notices,
    ) -> Result<usize> {
        match stage {
            Stage::LocalRegression { half_window } => {
                let degree = self.config.local.degree;
                for_each_series(table, |values| {
                    Ok(local_regression_with_degree(values, half_window, degree))
                })
            }
            Stage::Geographic {
                passes,
                neighbor_count,
            } => {
                let graph =
                    NeighborGraph::nearest(&self.coordinates, &table.locations(), neighbor_count);
                Ok(geographic_impute(table, &graph, passes, notices))
            }
            Stage::GlobalRegression => {
                let global = &self.config.global;
                for_each_series(table, |values| {
                    match global_regression(values, global.degree, global.min_points) {
                        Ok(filled) => Ok(filled),
                        Err(e) if e.is_insufficient_data() => {
                            notices.record(NoticeKind::TooFewPointsForGlobalFit);
                            Ok(0)
                        }
                        Err(e) => Err(e),
                    }
                })
            }
            Stage::Refinement => refine_table(table, original, &self.config.refinement, notices),
            Stage::Propagation { parent } => {
                let parent_table = self.finalized.get(&parent).ok_or_else(|| {
                    ImputeError::LevelOrder {
                        expected: parent.to_string(),
                        got: table.level(),
                    }
                })?;
                let empty = Hierarchy::new();
                let hierarchy = self.hierarchies.get(&table.level()).unwrap_or(&empty);
                propagate_from_parent(table, parent_table, hierarchy)
            }
        }
    }
}

/// Apply `f` to every (location, product) series in month order and write
/// the result back. Returns the sum of `f`'s counts.
fn for_each_series<F>(table: &mut PriceTable, mut f: F) -> Result<usize>
where
    F: FnMut(&mut [Option<f64>]) -> Result<usize>,
{
    let mut total = 0;
    for location in table.locations() {
        let rows = table.series_rows(&location);
        for product in 0..table.products().len() {
            let mut values = table.column(&rows, product);
            let changed = f(&mut values)?;
            if changed > 0 {
                table.write_column(&rows, product, &values)?;
                total += changed;
            }
        }
    }
    Ok(total)
}
