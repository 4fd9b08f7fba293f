//! Monthly turn engine

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info};

use crate::core::calendar::MonthDate;
use crate::core::config::SimulationConfig;
use crate::core::error::Result;
use crate::history::army::Army;
use crate::history::country::Country;
use crate::history::instruction::{Instruction, InstructionQueue};
use crate::history::setup::seed_countries;
use crate::history::systems;
use crate::history::world::HistoryWorld;
use crate::pathfinding::RouteFinder;
use crate::province::ProvinceGraph;
use crate::snapshot::{HistorySnapshot, SnapshotArchive};

/// Summary of the world after the latest month
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct SimulationStats {
    pub date: Option<MonthDate>,
    pub months: u32,
    pub countries: usize,
    pub fallen_countries: usize,
    pub armies: usize,
    pub crises: usize,
    pub wars: usize,
    pub population: u64,
    pub owned_provinces: usize,
}

/// What one month produced, for logs and callers
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MonthOutcome {
    pub executed_instructions: usize,
    pub warfare: systems::WarfareSummary,
    pub triggered_crises: usize,
}

/// Drives a `HistoryWorld` month by month and archives a snapshot after each
pub struct HistorySimulation {
    pub world: HistoryWorld,
    pub config: SimulationConfig,
    queue: InstructionQueue,
    archive: SnapshotArchive,
    finder: RouteFinder,
}

impl HistorySimulation {
    /// Seed the configured number of countries on `graph` and capture the
    /// baseline snapshot
    pub fn new(graph: ProvinceGraph, config: SimulationConfig) -> Result<Self> {
        let count = graph.params.initial_countries as usize;
        let mut world = HistoryWorld::new(graph);
        seed_countries(&mut world, count);
        Self::from_world(world, config)
    }

    /// Start from an already populated world
    pub fn from_world(mut world: HistoryWorld, config: SimulationConfig) -> Result<Self> {
        config.validate()?;
        systems::run_upkeep(&mut world, &config);
        systems::recalculate_legitimacy(&mut world);
        let archive = SnapshotArchive::new(HistorySnapshot::capture_baseline(&world));
        info!(
            countries = world.existing_ids().len(),
            start = %world.date(),
            "History simulation ready"
        );
        Ok(Self {
            world,
            config,
            queue: InstructionQueue::new(),
            archive,
            finder: RouteFinder::new(),
        })
    }

    /// Queue an external instruction; it runs with the next month
    pub fn submit(&mut self, instruction: Instruction) {
        self.queue.push(instruction);
    }

    pub fn pending_instructions(&self) -> usize {
        self.queue.len()
    }

    pub fn date(&self) -> MonthDate {
        self.world.date()
    }

    pub fn archive(&self) -> &SnapshotArchive {
        &self.archive
    }

    /// Run one month in fixed phase order, archive its snapshot and move
    /// the calendar on
    pub fn simulate_month(&mut self) -> MonthOutcome {
        let world = &mut self.world;
        let config = &self.config;

        // 1. Upkeep and legitimacy
        systems::run_upkeep(world, config);
        systems::recalculate_legitimacy(world);

        // 2. AI planning
        systems::plan_countries(world, config, &mut self.queue);

        // 3. Instructions
        let executed_instructions = systems::drain_queue(world, config, &mut self.queue, &mut self.finder);

        // 4. Armies and battles
        let warfare = systems::run_warfare(world, config);

        // 5. Population, migration, diffusion
        systems::update_populations(world, config);

        // 6. Crises
        let triggered_crises = systems::update_crises(world, config).len();

        let snapshot = self.archive.push(HistorySnapshot::capture(world));
        debug!(
            date = %snapshot.date,
            executed_instructions,
            battles = warfare.battles,
            triggered_crises,
            "Month simulated"
        );
        world.calendar.advance();

        MonthOutcome {
            executed_instructions,
            warfare,
            triggered_crises,
        }
    }

    pub fn run(&mut self, months: u32) {
        for _ in 0..months {
            self.simulate_month();
        }
    }

    pub fn stats(&self) -> SimulationStats {
        let world = &self.world;
        let existing: Vec<&Country> = world.countries.iter().filter(|c| c.exists).collect();
        let wars = existing
            .iter()
            .map(|c| c.enemies().filter(|&e| e > c.id).count())
            .sum();
        SimulationStats {
            date: (!self.archive.is_empty()).then(|| self.archive.latest().date),
            months: self.archive.len() as u32,
            countries: existing.len(),
            fallen_countries: world.countries.len() - existing.len(),
            armies: world.armies.len(),
            crises: world.crises.len(),
            wars,
            population: world.graph.total_population(),
            owned_provinces: world.graph.provinces.iter().filter(|p| p.owner.is_some()).count(),
        }
    }

    /// The latest archived snapshot (the baseline before the first month)
    pub fn latest_snapshot(&self) -> Arc<HistorySnapshot> {
        Arc::clone(self.archive.latest())
    }

    /// Current world state as pretty JSON
    pub fn world_state_json(&self) -> Result<String> {
        let export = WorldStateExport {
            date: self.world.date(),
            stats: self.stats(),
            countries: &self.world.countries,
            armies: self.world.armies.values().collect(),
            graph: &self.world.graph,
        };
        Ok(serde_json::to_string_pretty(&export)?)
    }
}

#[derive(Serialize)]
struct WorldStateExport<'a> {
    date: MonthDate,
    stats: SimulationStats,
    countries: &'a [Country],
    armies: Vec<&'a Army>,
    graph: &'a ProvinceGraph,
}
