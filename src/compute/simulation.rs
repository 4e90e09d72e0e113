//! Simulation driver - steps the displayed grid and rotates rules and palettes.

use std::mem;
use std::sync::Arc;

use crate::schema::{ConfigError, Rule, SearchOutcome, SimulationConfig, StopReason, SwitchPolicy};

use super::evolution::RuleSearch;
use super::{BackgroundSearch, Grid, LifeRng, Palette, Rgb, step};

/// Something notable that happened during a tick.
#[derive(Debug, Clone, PartialEq)]
pub enum SimulationEvent {
    /// Every cell died this generation.
    Extinct,
    /// The grid was replaced with a fresh random grid.
    Reseeded,
    /// A new rule took over.
    RuleSwitched {
        rule: Rule,
        score: f64,
        stop_reason: StopReason,
    },
    /// The next rule was not ready; the current one keeps running.
    SwitchDeferred,
    /// Searching for the next rule failed; the current one keeps running.
    SearchFailed(String),
    /// A new palette was generated.
    PaletteRefreshed,
}

/// Result of a single tick.
#[derive(Debug, Clone, PartialEq)]
pub struct TickReport {
    /// Generation number after the tick.
    pub generation: u64,
    /// Births during the step.
    pub births: u64,
    /// Live cells after the step (before any reseed).
    pub live_count: usize,
    /// Events raised during the tick.
    pub events: Vec<SimulationEvent>,
}

impl TickReport {
    #[inline]
    pub fn is_extinct(&self) -> bool {
        self.live_count == 0
    }
}

/// Summary of several ticks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AdvanceReport {
    /// Generations advanced.
    pub generations: u64,
    /// Births over all generations.
    pub births: u64,
    /// Live cells after the last tick.
    pub live_count: usize,
    /// Events from every tick, in order.
    pub events: Vec<SimulationEvent>,
}

/// Source of the next rule.
enum NextRule {
    /// Searched on a worker thread.
    Background(BackgroundSearch),
    /// Searched on the calling thread at switch time.
    Inline(RuleSearch),
    /// No further rules; the current one runs until the driver is dropped.
    Stopped,
}

/// Drives a displayed simulation.
///
/// The grid and palette are held in `Arc`s: a renderer can keep a snapshot of
/// one generation while the next is being computed.
pub struct Simulation {
    config: SimulationConfig,
    grid: Arc<Grid>,
    rule: Rule,
    palette: Arc<Palette>,
    rng: LifeRng,
    generation: u64,
    generations_on_rule: u64,
    next_rule: NextRule,
}

impl Simulation {
    /// Create a simulation running `Rule::CONWAY` on a random grid.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let mut rng = match config.random_seed {
            Some(seed) => LifeRng::new(seed),
            None => LifeRng::random(),
        };
        let grid = Grid::random_unchecked(config.width, config.height, config.fill_ratio, &mut rng);
        let palette = rng.random_palette();

        let mut simulation = Self {
            config,
            grid: Arc::new(grid),
            rule: Rule::CONWAY,
            palette: Arc::new(palette),
            rng,
            generation: 0,
            generations_on_rule: 0,
            next_rule: NextRule::Stopped,
        };
        simulation.prepare_next_rule()?;
        Ok(simulation)
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Snapshot of the current grid.
    pub fn grid(&self) -> Arc<Grid> {
        Arc::clone(&self.grid)
    }

    /// Snapshot of the current palette.
    pub fn palette(&self) -> Arc<Palette> {
        Arc::clone(&self.palette)
    }

    pub fn rule(&self) -> &Rule {
        &self.rule
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Generations run under the current rule.
    pub fn generations_on_rule(&self) -> u64 {
        self.generations_on_rule
    }

    /// Colour of the cell at `(x, y)`, `None` if it is dead or out of range.
    pub fn color_at(&self, x: usize, y: usize) -> Option<Rgb> {
        self.grid
            .cell(x, y)
            .and_then(|cell| self.palette.color_for(cell))
    }

    /// Advance one generation.
    pub fn tick(&mut self) -> TickReport {
        let result = step(&self.grid, &self.rule);
        self.grid = Arc::new(result.grid);
        self.generation += 1;
        self.generations_on_rule += 1;

        let mut events = Vec::new();
        if result.live_count == 0 {
            events.push(SimulationEvent::Extinct);
            if self.config.reseed_on_extinction {
                self.reseed();
                events.push(SimulationEvent::Reseeded);
            }
        }

        if self.generations_on_rule >= self.config.generations_per_rule {
            self.try_switch_rule(&mut events);
        }

        TickReport {
            generation: self.generation,
            births: result.births,
            live_count: result.live_count,
            events,
        }
    }

    /// Advance `n` generations.
    pub fn advance(&mut self, n: u64) -> AdvanceReport {
        let mut report = AdvanceReport {
            live_count: self.grid.live_count(),
            ..Default::default()
        };
        for _ in 0..n {
            let tick = self.tick();
            report.generations += 1;
            report.births += tick.births;
            report.live_count = tick.live_count;
            report.events.extend(tick.events);
        }
        report
    }

    /// Replace the grid with a fresh random one.
    pub fn reseed(&mut self) {
        let grid = Grid::random_unchecked(
            self.config.width,
            self.config.height,
            self.config.fill_ratio,
            &mut self.rng,
        );
        self.grid = Arc::new(grid);
        log::info!("Reseeded grid at generation {}", self.generation);
    }

    /// Replace the palette with a fresh random one.
    pub fn refresh_palette(&mut self) {
        self.palette = Arc::new(self.rng.random_palette());
        log::info!("Palette refreshed at generation {}", self.generation);
    }

    /// Abandon any in-flight search and stop switching rules.
    pub fn shutdown(&mut self) {
        let next = mem::replace(&mut self.next_rule, NextRule::Stopped);
        if let NextRule::Background(search) = next {
            search.cancel();
        }
    }

    /// Whether rule switching has been stopped by [`Simulation::shutdown`].
    pub fn is_shut_down(&self) -> bool {
        matches!(self.next_rule, NextRule::Stopped)
    }

    /// Start preparing the rule that follows the current one.
    fn prepare_next_rule(&mut self) -> Result<(), ConfigError> {
        let search = self.config.search.clone();
        self.next_rule = if self.config.background_search {
            NextRule::Background(BackgroundSearch::spawn(search, self.rng.fork())?)
        } else {
            NextRule::Inline(RuleSearch::new(search)?)
        };
        Ok(())
    }

    fn try_switch_rule(&mut self, events: &mut Vec<SimulationEvent>) {
        let result = match mem::replace(&mut self.next_rule, NextRule::Stopped) {
            NextRule::Background(mut search) => match self.config.switch_policy {
                SwitchPolicy::Block => search.wait(),
                SwitchPolicy::Defer => match search.poll() {
                    Some(result) => result,
                    None => {
                        if self.generations_on_rule == self.config.generations_per_rule {
                            log::warn!(
                                "Next rule not ready after {} generations, deferring",
                                self.generations_on_rule
                            );
                        }
                        self.next_rule = NextRule::Background(search);
                        events.push(SimulationEvent::SwitchDeferred);
                        return;
                    }
                },
            },
            NextRule::Inline(search) => search.run(&mut self.rng),
            NextRule::Stopped => return,
        };

        match result {
            Ok(outcome) => self.switch_to(outcome, events),
            Err(e) => {
                log::error!("Rule search failed: {}", e);
                events.push(SimulationEvent::SearchFailed(e.to_string()));
                self.generations_on_rule = 0;
            }
        }

        if let Err(e) = self.prepare_next_rule() {
            log::error!("Could not start next rule search: {}", e);
        }
    }

    fn switch_to(&mut self, outcome: SearchOutcome, events: &mut Vec<SimulationEvent>) {
        log::info!(
            "Switching rule at generation {} (score {:.4}, {} attempts): {:?}",
            self.generation,
            outcome.score,
            outcome.attempts,
            outcome.rule
        );
        self.rule = outcome.rule;
        self.generations_on_rule = 0;
        events.push(SimulationEvent::RuleSwitched {
            rule: outcome.rule,
            score: outcome.score,
            stop_reason: outcome.stop_reason,
        });

        if self.config.refresh_palette_on_switch {
            self.refresh_palette();
            events.push(SimulationEvent::PaletteRefreshed);
        }
    }
}

impl Drop for Simulation {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compute::Cell;
    use crate::schema::{NEIGHBOR_COUNT, SearchConfig};

    /// Search config that stops after one candidate.
    fn quick_search() -> SearchConfig {
        SearchConfig {
            threshold: -1e300,
            max_attempts: Some(1),
            ..Default::default()
        }
    }

    fn small_config() -> SimulationConfig {
        SimulationConfig {
            width: 32,
            height: 24,
            generations_per_rule: 5,
            random_seed: Some(42),
            search: quick_search(),
            ..Default::default()
        }
    }

    fn rule_switches(events: &[SimulationEvent]) -> usize {
        events
            .iter()
            .filter(|e| matches!(e, SimulationEvent::RuleSwitched { .. }))
            .count()
    }

    #[test]
    fn test_starts_with_conway() {
        let sim = Simulation::new(small_config()).unwrap();
        assert_eq!(*sim.rule(), Rule::CONWAY);
        assert_eq!(sim.generation(), 0);
        assert_eq!(sim.palette().len(), crate::compute::AGE_RANGE);
        assert_eq!((sim.grid().width(), sim.grid().height()), (32, 24));
    }

    #[test]
    fn test_rejects_invalid_config() {
        let config = SimulationConfig {
            height: 0,
            ..small_config()
        };
        assert!(Simulation::new(config).is_err());
    }

    #[test]
    fn test_tick_matches_stepper() {
        let config = SimulationConfig {
            generations_per_rule: 1000,
            reseed_on_extinction: false,
            ..small_config()
        };
        let mut sim = Simulation::new(config).unwrap();
        let before = sim.grid();
        let snapshot = (*before).clone();
        let report = sim.tick();
        let expected = step(&before, &Rule::CONWAY);

        assert_eq!(report.generation, 1);
        assert_eq!(report.births, expected.births);
        assert_eq!(report.live_count, expected.live_count);
        assert_eq!(*sim.grid(), expected.grid);
        // the earlier snapshot is untouched
        assert_eq!(*before, snapshot);
    }

    #[test]
    fn test_rule_switches_on_schedule() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let report = sim.advance(4);
        assert_eq!(rule_switches(&report.events), 0);

        let report = sim.tick();
        assert_eq!(rule_switches(&report.events), 1);
        assert!(report.events.contains(&SimulationEvent::PaletteRefreshed));
        assert_eq!(sim.generations_on_rule(), 0);

        let report = sim.advance(10);
        assert_eq!(rule_switches(&report.events), 2);
        assert_eq!(sim.generation(), 15);
    }

    #[test]
    fn test_inline_search_is_reproducible() {
        let config = SimulationConfig {
            background_search: false,
            ..small_config()
        };
        let mut a = Simulation::new(config.clone()).unwrap();
        let mut b = Simulation::new(config).unwrap();
        a.advance(12);
        b.advance(12);
        assert_eq!(a.rule(), b.rule());
        assert_eq!(*a.grid(), *b.grid());
        assert_eq!(*a.palette(), *b.palette());
    }

    #[test]
    fn test_switched_rule_is_generated() {
        let mut sim = Simulation::new(small_config()).unwrap();
        let report = sim.advance(5);
        let switched = report.events.iter().find_map(|e| match e {
            SimulationEvent::RuleSwitched { rule, .. } => Some(*rule),
            _ => None,
        });
        let rule = switched.unwrap();
        assert_eq!(*sim.rule(), rule);
        assert!(rule.has_ordered_thresholds());
    }

    #[test]
    fn test_defer_keeps_current_rule_until_ready() {
        let config = SimulationConfig {
            generations_per_rule: 1,
            switch_policy: SwitchPolicy::Defer,
            search: SearchConfig {
                threshold: 1e9,
                max_attempts: None,
                ..Default::default()
            },
            ..small_config()
        };
        let mut sim = Simulation::new(config).unwrap();
        // An unreachable threshold never finishes, so every switch defers
        let report = sim.advance(3);
        assert_eq!(rule_switches(&report.events), 0);
        assert_eq!(
            report
                .events
                .iter()
                .filter(|e| **e == SimulationEvent::SwitchDeferred)
                .count(),
            3
        );
        assert_eq!(*sim.rule(), Rule::CONWAY);
        sim.shutdown();
    }

    #[test]
    fn test_shutdown_stops_rule_switching() {
        let mut sim = Simulation::new(SimulationConfig {
            generations_per_rule: 1,
            ..small_config()
        })
        .unwrap();
        sim.shutdown();
        assert!(sim.is_shut_down());

        let report = sim.advance(3);
        assert!(
            !report
                .events
                .iter()
                .any(|e| matches!(e, SimulationEvent::SearchFailed(_)))
        );
        assert_eq!(rule_switches(&report.events), 0);
        assert_eq!(*sim.rule(), Rule::CONWAY);
        // no worker was started again
        assert!(sim.is_shut_down());
        assert_eq!(sim.generation(), 3);
    }

    #[test]
    fn test_extinction_reseeds() {
        let mut sim = Simulation::new(SimulationConfig {
            generations_per_rule: 1000,
            ..small_config()
        })
        .unwrap();
        // Zero weights with life_min 1: everything dies in one step
        sim.rule = Rule::new([0; NEIGHBOR_COUNT], 1, 1, 1);

        let report = sim.tick();
        assert!(report.is_extinct());
        assert_eq!(
            report.events,
            vec![SimulationEvent::Extinct, SimulationEvent::Reseeded]
        );
        assert!(!sim.grid().is_extinct());
    }

    #[test]
    fn test_extinction_reported_without_reseed() {
        let mut sim = Simulation::new(SimulationConfig {
            generations_per_rule: 1000,
            reseed_on_extinction: false,
            ..small_config()
        })
        .unwrap();
        sim.rule = Rule::new([0; NEIGHBOR_COUNT], 1, 1, 1);

        let report = sim.tick();
        assert_eq!(report.events, vec![SimulationEvent::Extinct]);
        assert!(sim.grid().is_extinct());
        // and it stays that way
        let report = sim.tick();
        assert_eq!(report.births, 0);
        assert!(report.is_extinct());
    }

    #[test]
    fn test_color_lookup() {
        let mut sim = Simulation::new(small_config()).unwrap();
        sim.grid = Arc::new(
            Grid::new(4, 4)
                .unwrap()
                .with_cell(1, 1, Cell::Alive(80)),
        );
        assert_eq!(sim.color_at(0, 0), None);
        assert_eq!(sim.color_at(1, 1), Some(sim.palette().color_for_age(5)));
        assert_eq!(sim.color_at(9, 9), None);
    }
}
