use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};

use rand::Rng;
use rand::SeedableRng;
use rand_pcg::Mcg128Xsl64;
use tracing::{debug, info};

use super::availability::{overlap_minutes, participant_hours};
use super::catalog::ShiftBlockCatalog;
use super::types::{
    Assignment, AssignmentFlag, AvailabilitySubmission, DayOfWeek, ShiftBlock, ShiftType, WeeklyCoverage,
};

/// Share of a block a participant must overlap to count as full cover
pub const DEFAULT_FULL_COVER_RATIO: f64 = 0.8;

/// Final say between candidates whose ranking is otherwise equal
pub trait TieBreaker {
    /// Returns an index into `tied`, which is never empty
    fn pick(&mut self, tied: &[&str]) -> usize;
}

impl<T: TieBreaker + ?Sized> TieBreaker for &mut T {
    fn pick(&mut self, tied: &[&str]) -> usize {
        (**self).pick(tied)
    }
}

/// Uniform random choice among tied candidates
pub struct RandomTieBreak {
    rng: Mcg128Xsl64,
}

impl RandomTieBreak {
    /// Reproducible sequence for a given seed
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: Mcg128Xsl64::seed_from_u64(seed),
        }
    }

    pub fn from_entropy() -> Self {
        Self {
            rng: Mcg128Xsl64::from_entropy(),
        }
    }

    /// Seeded when a seed is given, otherwise from entropy
    pub fn from_seed_option(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::seeded(seed),
            None => Self::from_entropy(),
        }
    }
}

impl TieBreaker for RandomTieBreak {
    fn pick(&mut self, tied: &[&str]) -> usize {
        self.rng.gen_range(0..tied.len())
    }
}

/// Deterministic choice: the lexicographically smallest participant name
pub struct NameOrder;

impl TieBreaker for NameOrder {
    fn pick(&mut self, tied: &[&str]) -> usize {
        tied.iter()
            .enumerate()
            .min_by(|a, b| a.1.cmp(b.1))
            .map(|(i, _)| i)
            .unwrap_or(0)
    }
}

/// A submission that overlaps the block being filled
#[derive(Debug, Clone, Copy)]
struct Candidate<'a> {
    participant: &'a str,
    overlap: u32, // minutes
}

/// Ranking tuple, compared lexicographically; smaller wins
#[derive(Debug, Clone, Copy)]
struct RankKey {
    shift_type_count: u32,
    load_ratio: f64,
    assigned: u32,
}

impl RankKey {
    fn cmp(&self, other: &RankKey) -> Ordering {
        self.shift_type_count
            .cmp(&other.shift_type_count)
            .then_with(|| self.load_ratio.total_cmp(&other.load_ratio))
            .then_with(|| self.assigned.cmp(&other.assigned))
    }
}

/// Running state of one allocation, threaded through the blocks in order
#[derive(Debug, Default)]
struct AllocationLedger {
    targets: HashMap<String, f64>,
    assigned: HashMap<String, u32>,
    assigned_days: HashMap<String, HashSet<DayOfWeek>>,
    shift_type_counts: HashMap<String, [u32; 3]>,
}

impl AllocationLedger {
    fn new(targets: HashMap<String, f64>) -> Self {
        Self {
            targets,
            ..Default::default()
        }
    }

    fn rank(&self, participant: &str, shift_type: ShiftType) -> RankKey {
        let assigned = self.assigned.get(participant).copied().unwrap_or(0);
        // A zero target falls back to 1 so the ratio stays finite
        let target = match self.targets.get(participant).copied().unwrap_or(0.0) {
            t if t > 0.0 => t,
            _ => 1.0,
        };
        RankKey {
            shift_type_count: self
                .shift_type_counts
                .get(participant)
                .map(|counts| counts[shift_type.index()])
                .unwrap_or(0),
            load_ratio: f64::from(assigned) / target,
            assigned,
        }
    }

    fn worked_on(&self, participant: &str, day: DayOfWeek) -> bool {
        self.assigned_days
            .get(participant)
            .map(|days| days.contains(&day))
            .unwrap_or(false)
    }

    fn record(&mut self, participant: &str, block: &ShiftBlock) {
        *self.assigned.entry(participant.to_string()).or_insert(0) += 1;
        self.assigned_days
            .entry(participant.to_string())
            .or_default()
            .insert(block.day);
        self.shift_type_counts
            .entry(participant.to_string())
            .or_insert([0; 3])[block.shift_type.index()] += 1;
    }

    /// Lowest-ranked participant among `candidates`, ties handed to `tie`
    fn select<'a, T: TieBreaker + ?Sized>(
        &self,
        candidates: &[Candidate<'a>],
        shift_type: ShiftType,
        tie: &mut T,
    ) -> Option<&'a str> {
        let mut best: Option<RankKey> = None;
        let mut tied: Vec<&'a str> = Vec::new();
        for candidate in candidates {
            let key = self.rank(candidate.participant, shift_type);
            match best.map(|b| key.cmp(&b)) {
                None | Some(Ordering::Less) => {
                    best = Some(key);
                    tied.clear();
                    tied.push(candidate.participant);
                }
                Some(Ordering::Equal) => {
                    // several submissions from one participant count once
                    if !tied.contains(&candidate.participant) {
                        tied.push(candidate.participant);
                    }
                }
                Some(Ordering::Greater) => {}
            }
        }
        match tied.len() {
            0 => None,
            1 => Some(tied[0]),
            n => Some(tied[tie.pick(&tied).min(n - 1)]),
        }
    }
}

/// Greedy, block-by-block allocator that spreads work in proportion to
/// declared availability
///
/// Blocks are filled strictly in enumeration order; every decision sees the
/// counters left by the previous ones. A participant is only given a second
/// block on the same day when nobody else can take it.
pub struct ProportionalAllocator<'c> {
    catalog: &'c ShiftBlockCatalog,
    full_cover_ratio: f64,
}

impl<'c> ProportionalAllocator<'c> {
    pub fn new(catalog: &'c ShiftBlockCatalog) -> Self {
        Self {
            catalog,
            full_cover_ratio: DEFAULT_FULL_COVER_RATIO,
        }
    }

    /// Overrides the full-cover threshold, clamped to `0.0..=1.0`
    pub fn with_full_cover_ratio(mut self, ratio: f64) -> Self {
        self.full_cover_ratio = if ratio.is_finite() { ratio.clamp(0.0, 1.0) } else { DEFAULT_FULL_COVER_RATIO };
        self
    }

    /// One assignment per eligible block, in enumeration order
    ///
    /// Returns an empty list when nobody declared any hours.
    pub fn allocate<T: TieBreaker + ?Sized>(
        &self,
        coverage: &WeeklyCoverage,
        availabilities: &[AvailabilitySubmission],
        tie: &mut T,
    ) -> Vec<Assignment> {
        let hours = participant_hours(availabilities);
        let total_hours: f64 = hours.values().sum();
        if total_hours <= 0.0 {
            debug!("no availability submitted, nothing to allocate");
            return Vec::new();
        }

        let blocks = self.catalog.enumerate_blocks(coverage);
        let total_blocks = blocks.len() as f64;
        let targets: HashMap<String, f64> = hours
            .into_iter()
            .map(|(name, h)| (name, h / total_hours * total_blocks))
            .collect();

        let mut ledger = AllocationLedger::new(targets);
        let assignments: Vec<Assignment> = blocks
            .iter()
            .map(|block| self.place(&mut ledger, block, availabilities, &mut *tie))
            .collect();

        let uncovered = assignments.iter().filter(|a| a.is_uncovered()).count();
        info!(
            blocks = assignments.len(),
            uncovered,
            participants = ledger.targets.len(),
            "proportional allocation finished"
        );
        assignments
    }

    fn place<T: TieBreaker + ?Sized>(
        &self,
        ledger: &mut AllocationLedger,
        block: &ShiftBlock,
        availabilities: &[AvailabilitySubmission],
        tie: &mut T,
    ) -> Assignment {
        let fresh = candidates(availabilities, block, |p| !ledger.worked_on(p, block.day));
        let choice = match self.choose(ledger, &fresh, block, &mut *tie) {
            Some((winner, partial)) => Some((winner, if partial { AssignmentFlag::Partial } else { AssignmentFlag::Clear })),
            None => {
                let everyone = candidates(availabilities, block, |_| true);
                self.choose(ledger, &everyone, block, &mut *tie).map(|(winner, partial)| {
                    (winner, if partial { AssignmentFlag::Partial } else { AssignmentFlag::MultiShift })
                })
            }
        };

        match choice {
            Some((winner, flag)) => {
                ledger.record(winner, block);
                debug!(day = %block.day, slot = %block.label, participant = winner, flag = %flag, "block assigned");
                Assignment {
                    day: block.day,
                    slot: block.label.clone(),
                    participant: winner.to_string(),
                    flag,
                }
            }
            None => {
                debug!(day = %block.day, slot = %block.label, "block uncovered");
                Assignment::uncovered(block.day, &block.label)
            }
        }
    }

    /// Full-cover winner if any, else the best partial overlap
    /// The bool is true for the partial fallback
    fn choose<'a, T: TieBreaker + ?Sized>(
        &self,
        ledger: &AllocationLedger,
        pool: &[Candidate<'a>],
        block: &ShiftBlock,
        tie: &mut T,
    ) -> Option<(&'a str, bool)> {
        if pool.is_empty() {
            return None;
        }
        let threshold = self.full_cover_ratio * f64::from(block.minutes());
        let full_cover: Vec<Candidate<'a>> = pool
            .iter()
            .copied()
            .filter(|c| f64::from(c.overlap) >= threshold)
            .collect();
        if !full_cover.is_empty() {
            return ledger.select(&full_cover, block.shift_type, tie).map(|w| (w, false));
        }

        let max_overlap = pool.iter().map(|c| c.overlap).max().unwrap_or(0);
        let widest: Vec<Candidate<'a>> = pool.iter().copied().filter(|c| c.overlap == max_overlap).collect();
        ledger.select(&widest, block.shift_type, tie).map(|w| (w, true))
    }
}

/// Same-day submissions that overlap the block and pass `keep`
fn candidates<'a, F>(availabilities: &'a [AvailabilitySubmission], block: &ShiftBlock, keep: F) -> Vec<Candidate<'a>>
where
    F: Fn(&str) -> bool,
{
    availabilities
        .iter()
        .filter(|a| a.day == block.day && keep(&a.participant))
        .map(|a| Candidate {
            participant: a.participant.as_str(),
            overlap: overlap_minutes(a.start, a.end, block.start, block.end),
        })
        .filter(|c| c.overlap > 0)
        .collect()
}

/// Proportional allocation over the standard catalog with a random tie-break
pub fn allocate_proportional(coverage: &WeeklyCoverage, availabilities: &[AvailabilitySubmission]) -> Vec<Assignment> {
    let catalog = ShiftBlockCatalog::standard();
    ProportionalAllocator::new(&catalog).allocate(coverage, availabilities, &mut RandomTieBreak::from_entropy())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule::types::{CoverageWindow, TimeOfDay};

    fn sub(name: &str, day: DayOfWeek, start: &str, end: &str) -> AvailabilitySubmission {
        AvailabilitySubmission::new(name, day, TimeOfDay::parse(start).unwrap(), TimeOfDay::parse(end).unwrap())
            .unwrap()
    }

    fn coverage(days: &[(DayOfWeek, &str, &str)]) -> WeeklyCoverage {
        days.iter()
            .map(|&(day, start, end)| (day, CoverageWindow::parse(start, end).unwrap()))
            .collect()
    }

    fn run(coverage: &WeeklyCoverage, subs: &[AvailabilitySubmission]) -> Vec<Assignment> {
        let catalog = ShiftBlockCatalog::standard();
        ProportionalAllocator::new(&catalog).allocate(coverage, subs, &mut NameOrder)
    }

    fn summary(assignments: &[Assignment]) -> Vec<(String, &str, &str)> {
        assignments
            .iter()
            .map(|a| (a.slot.clone(), a.participant.as_str(), a.flag.as_str()))
            .collect()
    }

    #[test]
    fn empty_availability_yields_nothing() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "19:30")]);
        assert!(run(&cov, &[]).is_empty());
    }

    #[test]
    fn monday_two_people() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "19:30")]);
        let subs = vec![
            sub("A", DayOfWeek::Monday, "10:00", "13:00"),
            sub("B", DayOfWeek::Monday, "12:00", "19:30"),
        ];
        let result = run(&cov, &subs);
        assert_eq!(
            summary(&result),
            vec![
                ("10:00-13:00".to_string(), "A", ""),
                ("12:00-18:30".to_string(), "B", ""),
                ("17:00-19:30".to_string(), "B", "multi-shift"),
            ]
        );
    }

    #[test]
    fn partial_overlap_falls_back_to_widest() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "13:00")]);
        let subs = vec![
            sub("D", DayOfWeek::Monday, "10:00", "11:00"),
            sub("C", DayOfWeek::Monday, "10:00", "12:00"),
        ];
        let result = run(&cov, &subs);
        assert_eq!(summary(&result), vec![("10:00-13:00".to_string(), "C", "partial")]);
    }

    #[test]
    fn second_pass_partial_and_uncovered() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "19:30")]);
        let subs = vec![sub("A", DayOfWeek::Monday, "10:00", "13:00")];
        let result = run(&cov, &subs);
        assert_eq!(
            summary(&result),
            vec![
                ("10:00-13:00".to_string(), "A", ""),
                ("12:00-18:30".to_string(), "A", "partial"),
                ("17:00-19:30".to_string(), "", "uncovered"),
            ]
        );
    }

    #[test]
    fn nobody_on_a_day_leaves_blocks_uncovered() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "13:00"), (DayOfWeek::Tuesday, "10:00", "13:00")]);
        let subs = vec![sub("A", DayOfWeek::Monday, "10:00", "13:00")];
        let result = run(&cov, &subs);
        assert_eq!(result.len(), 2);
        assert_eq!(result[0].participant, "A");
        assert!(result[1].is_uncovered());
        assert_eq!(result[1].day, DayOfWeek::Tuesday);
    }

    #[test]
    fn shift_types_rotate_between_equals() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "19:30"), (DayOfWeek::Tuesday, "10:00", "19:30")]);
        let subs = vec![
            sub("A", DayOfWeek::Monday, "10:00", "19:30"),
            sub("B", DayOfWeek::Monday, "10:00", "19:30"),
            sub("A", DayOfWeek::Tuesday, "10:00", "19:30"),
            sub("B", DayOfWeek::Tuesday, "10:00", "19:30"),
        ];
        let result = run(&cov, &subs);
        let people: Vec<(&str, &str)> = result.iter().map(|a| (a.participant.as_str(), a.flag.as_str())).collect();
        assert_eq!(
            people,
            vec![
                ("A", ""),
                ("B", ""),
                ("A", "multi-shift"),
                ("B", ""),
                ("A", ""),
                ("B", "multi-shift"),
            ]
        );
    }

    #[test]
    fn lower_load_ratio_wins_when_shift_counts_match() {
        let catalog = ShiftBlockCatalog::standard();
        let block = catalog.eligible_blocks(DayOfWeek::Monday, Some(&CoverageWindow::parse("10:00", "13:00").unwrap()))
            .remove(0);
        let mut targets = HashMap::new();
        targets.insert("heavy".to_string(), 10.0);
        targets.insert("light".to_string(), 2.0);
        let mut ledger = AllocationLedger::new(targets);
        let mut closing = block.clone();
        closing.shift_type = ShiftType::Closing;
        ledger.record("heavy", &closing);
        ledger.record("light", &closing);

        let pool = [
            Candidate { participant: "light", overlap: 180 },
            Candidate { participant: "heavy", overlap: 180 },
        ];
        assert_eq!(ledger.select(&pool, ShiftType::Opening, &mut NameOrder), Some("heavy"));
    }

    #[test]
    fn zero_target_uses_unit_divisor() {
        let ledger = AllocationLedger::new(HashMap::new());
        let key = ledger.rank("ghost", ShiftType::Middle);
        assert_eq!(key.load_ratio, 0.0);
        assert_eq!(key.assigned, 0);
    }

    #[test]
    fn seeded_runs_are_reproducible() {
        let cov = coverage(&[
            (DayOfWeek::Monday, "10:00", "19:30"),
            (DayOfWeek::Tuesday, "10:00", "19:30"),
            (DayOfWeek::Wednesday, "10:00", "19:30"),
        ]);
        let mut subs = Vec::new();
        for day in [DayOfWeek::Monday, DayOfWeek::Tuesday, DayOfWeek::Wednesday] {
            for name in ["A", "B", "C", "D"] {
                subs.push(sub(name, day, "10:00", "19:30"));
            }
        }
        let catalog = ShiftBlockCatalog::standard();
        let allocator = ProportionalAllocator::new(&catalog);
        let first = allocator.allocate(&cov, &subs, &mut RandomTieBreak::seeded(42));
        let second = allocator.allocate(&cov, &subs, &mut RandomTieBreak::seeded(42));
        assert_eq!(first, second);
        assert_eq!(first.len(), 9);
        assert!(first.iter().all(|a| a.flag == AssignmentFlag::Clear));
    }

    #[test]
    fn full_cover_ratio_is_configurable() {
        let cov = coverage(&[(DayOfWeek::Monday, "10:00", "13:00")]);
        let subs = vec![sub("A", DayOfWeek::Monday, "10:00", "12:00")];
        let catalog = ShiftBlockCatalog::standard();
        let strict = ProportionalAllocator::new(&catalog).allocate(&cov, &subs, &mut NameOrder);
        assert_eq!(strict[0].flag, AssignmentFlag::Partial);
        let lenient = ProportionalAllocator::new(&catalog)
            .with_full_cover_ratio(0.5)
            .allocate(&cov, &subs, &mut NameOrder);
        assert_eq!(lenient[0].flag, AssignmentFlag::Clear);
    }

    #[test]
    fn name_order_picks_smallest() {
        assert_eq!(NameOrder.pick(&["zed", "amy", "bob"]), 1);
        let mut random = RandomTieBreak::seeded(7);
        for _ in 0..20 {
            assert!(random.pick(&["x", "y", "z"]) < 3);
        }
    }
}
