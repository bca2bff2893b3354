//! Search, facet, sort and selection state over an integrated digest.
//!
//! Nothing here touches the network; a `TableView` is pure UI state that
//! is applied to whatever records the last refresh produced.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashSet};
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;
use strum::{Display, EnumIter, EnumString};

use crate::model::{IntegratedRecord, UNKNOWN_COUNTRY};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString, EnumIter,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case", ascii_case_insensitive)]
pub enum SortColumn {
    Rank,
    Symbol,
    CompanyName,
    Country,
    Market,
    MarketCap,
    CurrentPrice,
    PreviousWeekClose,
    ChangeRate,
    WeekHigh,
    WeekLow,
    Disclosures,
    Issues,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, Display, EnumString,
)]
pub enum SortDirection {
    #[default]
    #[serde(rename = "asc")]
    #[strum(serialize = "asc")]
    Ascending,
    #[serde(rename = "desc")]
    #[strum(serialize = "desc")]
    Descending,
}

impl SortDirection {
    pub fn toggled(self) -> Self {
        match self {
            SortDirection::Ascending => SortDirection::Descending,
            SortDirection::Descending => SortDirection::Ascending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum CountryFilter {
    #[default]
    All,
    Only(String),
}

impl CountryFilter {
    fn matches(&self, country: &str) -> bool {
        match self {
            CountryFilter::All => true,
            CountryFilter::Only(wanted) => wanted == country,
        }
    }
}

impl FromStr for CountryFilter {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s.eq_ignore_ascii_case("all") {
            Ok(CountryFilter::All)
        } else {
            Ok(CountryFilter::Only(s.to_string()))
        }
    }
}

impl fmt::Display for CountryFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CountryFilter::All => write!(f, "all"),
            CountryFilter::Only(country) => write!(f, "{}", country),
        }
    }
}

enum Cell {
    Number(Option<f64>),
    Text(String),
}

impl SortColumn {
    fn cell(self, record: &IntegratedRecord) -> Cell {
        match self {
            SortColumn::Rank => Cell::Number(Some(record.market_cap_rank as f64)),
            SortColumn::Symbol => Cell::Text(record.symbol.to_lowercase()),
            SortColumn::CompanyName => Cell::Text(record.company_name.to_lowercase()),
            SortColumn::Country => Cell::Text(record.country.to_lowercase()),
            SortColumn::Market => Cell::Text(record.market.to_string().to_lowercase()),
            SortColumn::MarketCap => Cell::Number(record.market_cap),
            SortColumn::CurrentPrice => Cell::Number(record.current_price),
            SortColumn::PreviousWeekClose => Cell::Number(record.previous_week_close),
            SortColumn::ChangeRate => Cell::Number(record.change_rate_percent),
            SortColumn::WeekHigh => Cell::Number(record.week_high),
            SortColumn::WeekLow => Cell::Number(record.week_low),
            SortColumn::Disclosures => Cell::Number(Some(record.disclosures.len() as f64)),
            SortColumn::Issues => Cell::Number(Some(record.issues.len() as f64)),
        }
    }

    /// Orders two records by this column. Missing values go last whatever
    /// the direction.
    pub fn compare(
        self,
        a: &IntegratedRecord,
        b: &IntegratedRecord,
        direction: SortDirection,
    ) -> Ordering {
        let directed = |ord: Ordering| match direction {
            SortDirection::Ascending => ord,
            SortDirection::Descending => ord.reverse(),
        };

        match (self.cell(a), self.cell(b)) {
            (Cell::Number(None), Cell::Number(None)) => Ordering::Equal,
            (Cell::Number(None), _) => Ordering::Greater,
            (_, Cell::Number(None)) => Ordering::Less,
            (Cell::Number(Some(x)), Cell::Number(Some(y))) => directed(x.total_cmp(&y)),
            (Cell::Text(x), Cell::Text(y)) => directed(x.cmp(&y)),
            // A column always yields one kind of cell
            _ => Ordering::Equal,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    search: String,
    country: CountryFilter,
    sort_column: SortColumn,
    sort_direction: SortDirection,
    selected: HashSet<String>,
}

impl Default for TableView {
    fn default() -> Self {
        Self::new()
    }
}

impl TableView {
    pub fn new() -> Self {
        Self {
            search: String::new(),
            country: CountryFilter::All,
            sort_column: SortColumn::Rank,
            sort_direction: SortDirection::Ascending,
            selected: HashSet::new(),
        }
    }

    pub fn set_search(&mut self, search: impl Into<String>) {
        self.search = search.into();
    }

    pub fn set_country(&mut self, country: CountryFilter) {
        self.country = country;
    }

    pub fn set_sort(&mut self, column: SortColumn, direction: SortDirection) {
        self.sort_column = column;
        self.sort_direction = direction;
    }

    /// Header click: the active column flips direction, any other column
    /// becomes active in ascending order.
    pub fn sort_by(&mut self, column: SortColumn) {
        if self.sort_column == column {
            self.sort_direction = self.sort_direction.toggled();
        } else {
            self.sort_column = column;
            self.sort_direction = SortDirection::Ascending;
        }
    }

    pub fn sort_column(&self) -> SortColumn {
        self.sort_column
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    fn matches(&self, record: &IntegratedRecord) -> bool {
        let needle = self.search.to_lowercase();
        let matches_search = record.company_name.to_lowercase().contains(&needle)
            || record.symbol.to_lowercase().contains(&needle);
        matches_search && self.country.matches(&record.country)
    }

    /// Rows that pass the search and country filter, in the current sort order.
    pub fn visible<'a>(&self, records: &'a [IntegratedRecord]) -> Vec<&'a IntegratedRecord> {
        let mut rows: Vec<_> = records.iter().filter(|r| self.matches(r)).collect();
        rows.sort_by(|a, b| self.sort_column.compare(a, b, self.sort_direction));
        rows
    }

    pub fn toggle_selected(&mut self, symbol: &str) {
        if !self.selected.remove(symbol) {
            self.selected.insert(symbol.to_string());
        }
    }

    /// Clears the selection when every visible row is already selected,
    /// otherwise selects exactly the visible rows.
    pub fn toggle_select_all(&mut self, records: &[IntegratedRecord]) {
        let visible: HashSet<String> = self
            .visible(records)
            .into_iter()
            .map(|r| r.symbol.clone())
            .collect();
        if visible.iter().all(|symbol| self.selected.contains(symbol)) {
            self.selected.clear();
        } else {
            self.selected = visible;
        }
    }

    pub fn clear_selection(&mut self) {
        self.selected.clear();
    }

    pub fn is_selected(&self, symbol: &str) -> bool {
        self.selected.contains(symbol)
    }

    pub fn selection_len(&self) -> usize {
        self.selected.len()
    }

    /// Selected rows that are currently visible, in view order.
    pub fn selected_records<'a>(
        &self,
        records: &'a [IntegratedRecord],
    ) -> Vec<&'a IntegratedRecord> {
        self.visible(records)
            .into_iter()
            .filter(|r| self.selected.contains(&r.symbol))
            .collect()
    }
}

/// Countries offered by the facet dropdown, sorted, without the placeholder
/// country.
pub fn country_options(records: &[IntegratedRecord]) -> Vec<String> {
    records
        .iter()
        .map(|r| r.country.as_str())
        .filter(|c| *c != UNKNOWN_COUNTRY)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .map(str::to_string)
        .collect()
}

/// First `limit` items and how many were left out, for "+N more" cells.
pub fn preview<T>(items: &[T], limit: usize) -> (&[T], usize) {
    let shown = items.len().min(limit);
    (&items[..shown], items.len() - shown)
}
