use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScheduleError};
use super::types::{CoverageWindow, DayOfWeek, ShiftBlock, ShiftType, TimeOfDay, WeeklyCoverage};

/// A block definition before it is placed on a day
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockTemplate {
    pub label: String,
    pub start: TimeOfDay,
    pub end: TimeOfDay,
    pub shift_type: ShiftType,
}

impl BlockTemplate {
    pub fn new(start: &str, end: &str, shift_type: ShiftType) -> Result<Self> {
        let start = TimeOfDay::parse(start)?;
        let end = TimeOfDay::parse(end)?;
        Ok(Self {
            label: format!("{}-{}", start, end),
            start,
            end,
            shift_type,
        })
    }

    fn on(&self, day: DayOfWeek) -> ShiftBlock {
        ShiftBlock {
            day,
            label: self.label.clone(),
            start: self.start,
            end: self.end,
            shift_type: self.shift_type,
        }
    }
}

/// Fixed shift blocks for every day of the week
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(
    try_from = "BTreeMap<String, Vec<BlockTemplate>>",
    into = "BTreeMap<String, Vec<BlockTemplate>>"
)]
pub struct ShiftBlockCatalog {
    days: BTreeMap<DayOfWeek, Vec<BlockTemplate>>,
}

impl ShiftBlockCatalog {
    /// Builds a catalog; all seven days must be defined (an empty list is allowed)
    pub fn new(days: BTreeMap<DayOfWeek, Vec<BlockTemplate>>) -> Result<Self> {
        if let Some(missing) = DayOfWeek::ALL.iter().find(|d| !days.contains_key(d)) {
            return Err(ScheduleError::InvalidCatalog(format!("no blocks defined for {}", missing)));
        }
        for (day, blocks) in &days {
            if let Some(bad) = blocks.iter().find(|b| b.start >= b.end) {
                return Err(ScheduleError::InvalidCatalog(format!(
                    "block '{}' on {} ends before it starts",
                    bad.label, day
                )));
            }
        }
        Ok(Self { days })
    }

    /// The historical three-block day: opening, middle, closing
    /// Friday closes half an hour earlier
    pub fn standard() -> Self {
        let block = |start: &str, end: &str, shift_type| BlockTemplate {
            label: format!("{}-{}", start, end),
            start: TimeOfDay::parse(start).unwrap_or(TimeOfDay::MIDNIGHT),
            end: TimeOfDay::parse(end).unwrap_or(TimeOfDay::MIDNIGHT),
            shift_type,
        };
        let days = DayOfWeek::ALL
            .iter()
            .map(|&day| {
                let closing_end = if day == DayOfWeek::Friday { "19:00" } else { "19:30" };
                let blocks = vec![
                    block("10:00", "13:00", ShiftType::Opening),
                    block("12:00", "18:30", ShiftType::Middle),
                    block("17:00", closing_end, ShiftType::Closing),
                ];
                (day, blocks)
            })
            .collect();
        Self { days }
    }

    pub fn blocks_for(&self, day: DayOfWeek) -> &[BlockTemplate] {
        self.days.get(&day).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Blocks fully inside the day's coverage window, in catalog order
    pub fn eligible_blocks(&self, day: DayOfWeek, coverage: Option<&CoverageWindow>) -> Vec<ShiftBlock> {
        let Some(coverage) = coverage else {
            return Vec::new();
        };
        self.blocks_for(day)
            .iter()
            .filter(|b| coverage.start <= b.start && coverage.end >= b.end)
            .map(|b| b.on(day))
            .collect()
    }

    /// Every eligible block of the week, Monday first then catalog order
    pub fn enumerate_blocks(&self, coverage: &WeeklyCoverage) -> Vec<ShiftBlock> {
        coverage
            .iter()
            .flat_map(|(&day, window)| self.eligible_blocks(day, Some(window)))
            .collect()
    }
}

impl Default for ShiftBlockCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

impl TryFrom<BTreeMap<String, Vec<BlockTemplate>>> for ShiftBlockCatalog {
    type Error = ScheduleError;

    fn try_from(raw: BTreeMap<String, Vec<BlockTemplate>>) -> Result<Self> {
        let days = raw
            .into_iter()
            .map(|(day, blocks)| Ok((day.parse::<DayOfWeek>()?, blocks)))
            .collect::<Result<BTreeMap<_, _>>>()?;
        ShiftBlockCatalog::new(days)
    }
}

impl From<ShiftBlockCatalog> for BTreeMap<String, Vec<BlockTemplate>> {
    fn from(catalog: ShiftBlockCatalog) -> Self {
        catalog
            .days
            .into_iter()
            .map(|(day, blocks)| (day.as_str().to_string(), blocks))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(start: &str, end: &str) -> CoverageWindow {
        CoverageWindow::parse(start, end).unwrap()
    }

    #[test]
    fn standard_catalog_has_three_blocks_each_day() {
        let catalog = ShiftBlockCatalog::standard();
        for day in DayOfWeek::ALL {
            let labels: Vec<&str> = catalog.blocks_for(day).iter().map(|b| b.label.as_str()).collect();
            let closing = if day == DayOfWeek::Friday { "17:00-19:00" } else { "17:00-19:30" };
            assert_eq!(labels, vec!["10:00-13:00", "12:00-18:30", closing]);
        }
    }

    #[test]
    fn eligible_blocks_must_fit_inside_window() {
        let catalog = ShiftBlockCatalog::standard();
        let blocks = catalog.eligible_blocks(DayOfWeek::Monday, Some(&window("10:00", "19:00")));
        let labels: Vec<&str> = blocks.iter().map(|b| b.label.as_str()).collect();
        assert_eq!(labels, vec!["10:00-13:00", "12:00-18:30"]);

        let friday = catalog.eligible_blocks(DayOfWeek::Friday, Some(&window("10:00", "19:00")));
        assert_eq!(friday.len(), 3);
        assert_eq!(friday[2].shift_type, ShiftType::Closing);
    }

    #[test]
    fn closed_day_has_no_blocks() {
        let catalog = ShiftBlockCatalog::standard();
        assert!(catalog.eligible_blocks(DayOfWeek::Sunday, None).is_empty());
        assert!(catalog
            .eligible_blocks(DayOfWeek::Sunday, Some(&window("13:00", "17:00")))
            .is_empty());
    }

    #[test]
    fn enumeration_is_monday_first() {
        let catalog = ShiftBlockCatalog::standard();
        let mut coverage = WeeklyCoverage::new();
        coverage.insert(DayOfWeek::Wednesday, window("10:00", "13:00"));
        coverage.insert(DayOfWeek::Monday, window("10:00", "19:30"));
        let blocks = catalog.enumerate_blocks(&coverage);
        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0].day, DayOfWeek::Monday);
        assert_eq!(blocks[3].day, DayOfWeek::Wednesday);
    }

    #[test]
    fn catalog_requires_every_day() {
        let mut days = BTreeMap::new();
        days.insert(DayOfWeek::Monday, vec![BlockTemplate::new("09:00", "17:00", ShiftType::Middle).unwrap()]);
        assert!(matches!(ShiftBlockCatalog::new(days), Err(ScheduleError::InvalidCatalog(_))));
    }

    #[test]
    fn catalog_from_toml() {
        let mut text = String::new();
        for day in DayOfWeek::ALL {
            text.push_str(&format!(
                "{} = [{{ label = \"early\", start = \"08:00\", end = \"12:00\", shift_type = \"opening\" }}]\n",
                day
            ));
        }
        let catalog: ShiftBlockCatalog = toml::from_str(&text).unwrap();
        assert_eq!(catalog.blocks_for(DayOfWeek::Sunday)[0].label, "early");

        let broken = "monday = []\n";
        assert!(toml::from_str::<ShiftBlockCatalog>(broken).is_err());
    }

    #[test]
    fn catalog_reads_back_what_it_writes() {
        let catalog = ShiftBlockCatalog::standard();

        let json = serde_json::to_string(&catalog).unwrap();
        assert!(json.starts_with("{\"friday\":"));
        let from_json: ShiftBlockCatalog = serde_json::from_str(&json).unwrap();
        assert_eq!(from_json, catalog);

        let text = toml::to_string(&catalog).unwrap();
        let from_toml: ShiftBlockCatalog = toml::from_str(&text).unwrap();
        assert_eq!(from_toml, catalog);
    }
}
