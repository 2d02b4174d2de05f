use chrono::{Datelike, Duration, Months, NaiveDate};
use std::collections::HashSet;

use crate::api::{ApiError, ReflectApi};
use crate::models::{JournalEntry, JournalEntryUpdate, NewJournalEntry};
use crate::session::Session;
use crate::state::{SuccessFlag, record_error};

/// Month groups revealed per "load more"
pub const MONTH_BATCH: usize = 3;

/// Which entries the container fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JournalScope {
    All,
    Date(NaiveDate),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DateRangeFilter {
    Week,
    Month,
    ThreeMonths,
    SixMonths,
    Year,
    #[default]
    All,
}

impl DateRangeFilter {
    pub fn label(&self) -> &'static str {
        match self {
            DateRangeFilter::Week => "Past week",
            DateRangeFilter::Month => "Past month",
            DateRangeFilter::ThreeMonths => "Past 3 months",
            DateRangeFilter::SixMonths => "Past 6 months",
            DateRangeFilter::Year => "Past year",
            DateRangeFilter::All => "All time",
        }
    }

    /// Cycle order used by the filter key
    pub fn next(&self) -> Self {
        match self {
            DateRangeFilter::All => DateRangeFilter::Week,
            DateRangeFilter::Week => DateRangeFilter::Month,
            DateRangeFilter::Month => DateRangeFilter::ThreeMonths,
            DateRangeFilter::ThreeMonths => DateRangeFilter::SixMonths,
            DateRangeFilter::SixMonths => DateRangeFilter::Year,
            DateRangeFilter::Year => DateRangeFilter::All,
        }
    }

    /// Earliest entry date kept by this filter, `None` when nothing is cut
    pub fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        let months_back = |n: u32| today.checked_sub_months(Months::new(n)).unwrap_or(NaiveDate::MIN);
        match self {
            DateRangeFilter::Week => Some(today - Duration::days(7)),
            DateRangeFilter::Month => Some(months_back(1)),
            DateRangeFilter::ThreeMonths => Some(months_back(3)),
            DateRangeFilter::SixMonths => Some(months_back(6)),
            DateRangeFilter::Year => Some(months_back(12)),
            DateRangeFilter::All => None,
        }
    }
}

/// Case-insensitive substring search over entry content, keeping the input order.
/// An empty (or blank) query returns every entry.
pub fn search<'a>(entries: &'a [JournalEntry], query: &str) -> Vec<&'a JournalEntry> {
    let needle = query.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| needle.is_empty() || e.content.to_lowercase().contains(&needle))
        .collect()
}

/// Search then date-range filter
pub fn filter_entries<'a>(
    entries: &'a [JournalEntry],
    query: &str,
    range: DateRangeFilter,
    today: NaiveDate,
) -> Vec<&'a JournalEntry> {
    let cutoff = range.cutoff(today);
    search(entries, query)
        .into_iter()
        .filter(|e| cutoff.is_none_or(|c| e.entry_date >= c))
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn of(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// "March 2026"
    pub fn label(&self) -> String {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
            .map(|d| d.format("%B %Y").to_string())
            .unwrap_or_else(|| format!("{}-{:02}", self.year, self.month))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub date: NaiveDate,
    pub entries: Vec<&'a JournalEntry>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct MonthGroup<'a> {
    pub key: MonthKey,
    pub days: Vec<DayGroup<'a>>,
}

impl MonthGroup<'_> {
    pub fn entry_count(&self) -> usize {
        self.days.iter().map(|d| d.entries.len()).sum()
    }
}

/// Group by month then by day, newest month and newest day first; entries newest first within a day
pub fn group_by_month<'a>(entries: &[&'a JournalEntry]) -> Vec<MonthGroup<'a>> {
    let mut sorted: Vec<&JournalEntry> = entries.to_vec();
    sorted.sort_by(|a, b| {
        b.entry_date
            .cmp(&a.entry_date)
            .then_with(|| b.created_at.cmp(&a.created_at))
    });

    let mut months: Vec<MonthGroup> = Vec::new();
    for entry in sorted {
        let key = MonthKey::of(entry.entry_date);
        if months.last().is_none_or(|m| m.key != key) {
            months.push(MonthGroup { key, days: Vec::new() });
        }
        let Some(month) = months.last_mut() else { continue };
        if month.days.last().is_none_or(|d| d.date != entry.entry_date) {
            month.days.push(DayGroup {
                date: entry.entry_date,
                entries: Vec::new(),
            });
        }
        if let Some(day) = month.days.last_mut() {
            day.entries.push(entry);
        }
    }
    months
}

/// One visible line in the grouped journal list
#[derive(Debug, Clone, PartialEq)]
pub enum JournalRow<'a> {
    Month { key: MonthKey, count: usize, collapsed: bool },
    Day { date: NaiveDate, count: usize, collapsed: bool },
    Entry(&'a JournalEntry),
}

#[derive(Debug, Clone)]
pub struct JournalState {
    pub scope: JournalScope,
    pub entries: Vec<JournalEntry>,
    pub query: String,
    pub range: DateRangeFilter,
    pub visible_months: usize,
    collapsed_months: HashSet<MonthKey>,
    collapsed_days: HashSet<NaiveDate>,
    /// Cursor into `rows()`
    pub selected: usize,
    pub pending_delete: Option<i64>,
    pub loading: bool,
    pub error: Option<String>,
    pub success: SuccessFlag,
}

impl JournalState {
    pub fn new(scope: JournalScope) -> Self {
        Self {
            scope,
            entries: Vec::new(),
            query: String::new(),
            range: DateRangeFilter::default(),
            visible_months: MONTH_BATCH,
            collapsed_months: HashSet::new(),
            collapsed_days: HashSet::new(),
            selected: 0,
            pending_delete: None,
            loading: false,
            error: None,
            success: SuccessFlag::default(),
        }
    }

    pub async fn load<A: ReflectApi>(&mut self, api: &A, session: &Session, today: NaiveDate) -> Result<(), ApiError> {
        self.loading = true;
        let result = match self.scope {
            JournalScope::All => api.all_journal_entries(session).await,
            JournalScope::Date(date) => api.journal_entries_for_date(session, date).await,
        };
        self.loading = false;

        match result {
            Ok(entries) => {
                self.entries = entries;
                self.error = None;
                self.clamp_selection(today);
                Ok(())
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub fn set_scope(&mut self, scope: JournalScope) {
        if self.scope != scope {
            self.scope = scope;
            self.entries.clear();
            self.selected = 0;
        }
    }

    pub fn filtered(&self, today: NaiveDate) -> Vec<&JournalEntry> {
        filter_entries(&self.entries, &self.query, self.range, today)
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
        self.selected = 0;
    }

    pub fn cycle_range(&mut self) {
        self.range = self.range.next();
        self.selected = 0;
    }

    pub fn total_months(&self, today: NaiveDate) -> usize {
        group_by_month(&self.filtered(today)).len()
    }

    pub fn has_more_months(&self, today: NaiveDate) -> bool {
        self.total_months(today) > self.visible_months
    }

    /// Reveal the next batch of already-fetched month groups
    pub fn load_more(&mut self) {
        self.visible_months += MONTH_BATCH;
    }

    pub fn toggle_month(&mut self, key: MonthKey) {
        if !self.collapsed_months.remove(&key) {
            self.collapsed_months.insert(key);
        }
    }

    pub fn toggle_day(&mut self, date: NaiveDate) {
        if !self.collapsed_days.remove(&date) {
            self.collapsed_days.insert(date);
        }
    }

    pub fn rows(&self, today: NaiveDate) -> Vec<JournalRow<'_>> {
        let filtered = self.filtered(today);
        let mut rows = Vec::new();
        for month in group_by_month(&filtered).into_iter().take(self.visible_months) {
            let month_collapsed = self.collapsed_months.contains(&month.key);
            rows.push(JournalRow::Month {
                key: month.key,
                count: month.entry_count(),
                collapsed: month_collapsed,
            });
            if month_collapsed {
                continue;
            }
            for day in month.days {
                let day_collapsed = self.collapsed_days.contains(&day.date);
                rows.push(JournalRow::Day {
                    date: day.date,
                    count: day.entries.len(),
                    collapsed: day_collapsed,
                });
                if !day_collapsed {
                    rows.extend(day.entries.into_iter().map(JournalRow::Entry));
                }
            }
        }
        rows
    }

    pub fn move_selection(&mut self, delta: isize, today: NaiveDate) {
        let len = self.rows(today).len();
        if len == 0 {
            self.selected = 0;
            return;
        }
        self.selected = self.selected.saturating_add_signed(delta).min(len - 1);
    }

    /// Keep the cursor on an existing row after the row set shrank
    fn clamp_selection(&mut self, today: NaiveDate) {
        self.selected = self.selected.min(self.rows(today).len().saturating_sub(1));
    }

    /// Expand/collapse the group under the cursor, or return the entry there
    pub fn activate(&mut self, today: NaiveDate) -> Option<JournalEntry> {
        let (month, day, entry) = match self.rows(today).get(self.selected) {
            Some(JournalRow::Month { key, .. }) => (Some(*key), None, None),
            Some(JournalRow::Day { date, .. }) => (None, Some(*date), None),
            Some(JournalRow::Entry(entry)) => (None, None, Some((*entry).clone())),
            None => (None, None, None),
        };
        if let Some(key) = month {
            self.toggle_month(key);
        }
        if let Some(date) = day {
            self.toggle_day(date);
        }
        entry
    }

    pub fn selected_entry(&self, today: NaiveDate) -> Option<&JournalEntry> {
        match self.rows(today).get(self.selected) {
            Some(JournalRow::Entry(entry)) => Some(*entry),
            _ => None,
        }
    }

    /// Take in an entry saved through another view, if it falls in this scope
    pub fn absorb(&mut self, entry: JournalEntry) {
        let in_scope = match self.scope {
            JournalScope::All => true,
            JournalScope::Date(date) => date == entry.entry_date,
        };
        match self.entries.iter_mut().find(|e| e.id == entry.id) {
            Some(slot) => *slot = entry,
            None if in_scope => self.entries.push(entry),
            None => {}
        }
    }

    /// Drop a cached entry that was deleted through another view
    pub fn forget(&mut self, id: i64, today: NaiveDate) {
        self.entries.retain(|e| e.id != id);
        if self.pending_delete == Some(id) {
            self.pending_delete = None;
        }
        self.clamp_selection(today);
    }

    pub fn contains(&self, id: i64) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// First step of a delete: ask for confirmation. Unknown ids are ignored.
    pub fn request_delete(&mut self, id: i64) -> bool {
        if self.contains(id) {
            self.pending_delete = Some(id);
            true
        } else {
            false
        }
    }

    pub fn cancel_delete(&mut self) {
        self.pending_delete = None;
    }

    /// Delete the entry awaiting confirmation. Returns whether anything was removed.
    pub async fn confirm_delete<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        today: NaiveDate,
    ) -> Result<bool, ApiError> {
        match self.pending_delete.take() {
            Some(id) => self.delete(api, session, id, today).await,
            None => Ok(false),
        }
    }

    /// Delete an entry; an id that is not cached is a no-op and makes no request
    pub async fn delete<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        id: i64,
        today: NaiveDate,
    ) -> Result<bool, ApiError> {
        if !self.contains(id) {
            return Ok(false);
        }
        match api.delete_journal_entry(session, id).await {
            Ok(()) => {
                log::info!("journal entry {} deleted", id);
                self.entries.retain(|e| e.id != id);
                self.error = None;
                self.clamp_selection(today);
                Ok(true)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub async fn create<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        content: &str,
        entry_date: NaiveDate,
    ) -> Result<JournalEntry, ApiError> {
        if content.trim().is_empty() {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("Journal entry cannot be empty"),
            ));
        }

        let body = NewJournalEntry {
            content: content.to_string(),
            entry_date,
            reflection_id: None,
        };
        match api.create_journal_entry(session, &body).await {
            Ok(entry) => {
                log::info!("journal entry {} created", entry.id);
                self.error = None;
                self.absorb(entry.clone());
                self.success.raise();
                Ok(entry)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }

    pub async fn update<A: ReflectApi>(
        &mut self,
        api: &A,
        session: &Session,
        id: i64,
        content: &str,
    ) -> Result<JournalEntry, ApiError> {
        if content.trim().is_empty() {
            return Err(record_error(
                &mut self.error,
                ApiError::validation("Journal entry cannot be empty"),
            ));
        }

        let body = JournalEntryUpdate {
            content: content.to_string(),
        };
        match api.update_journal_entry(session, id, &body).await {
            Ok(entry) => {
                self.error = None;
                if let Some(slot) = self.entries.iter_mut().find(|e| e.id == id) {
                    *slot = entry.clone();
                }
                self.success.raise();
                Ok(entry)
            }
            Err(err) => Err(record_error(&mut self.error, err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn entry(id: i64, day: NaiveDate, hour: u32, content: &str) -> JournalEntry {
        JournalEntry {
            id,
            user_id: 1,
            content: content.to_string(),
            entry_date: day,
            reflection_id: None,
            created_at: Utc
                .with_ymd_and_hms(day.year(), day.month(), day.day(), hour, 0, 0)
                .unwrap(),
            updated_at: None,
        }
    }

    fn sample() -> Vec<JournalEntry> {
        vec![
            entry(1, date(2026, 1, 10), 9, "Started the Rust rewrite"),
            entry(2, date(2026, 3, 2), 8, "Morning run"),
            entry(3, date(2026, 3, 2), 20, "rust borrow checker fun"),
            entry(4, date(2026, 2, 14), 12, "Dinner"),
            entry(5, date(2026, 3, 4), 7, "Coffee"),
        ]
    }

    #[test]
    fn search_is_case_insensitive_and_order_preserving() {
        let entries = sample();
        let hits: Vec<i64> = search(&entries, "RUST").iter().map(|e| e.id).collect();
        assert_eq!(hits, vec![1, 3]);

        let cleared: Vec<i64> = search(&entries, "").iter().map(|e| e.id).collect();
        assert_eq!(cleared, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn grouping_partitions_and_sorts_newest_first() {
        let entries = sample();
        let refs: Vec<&JournalEntry> = entries.iter().collect();
        let groups = group_by_month(&refs);

        let months: Vec<u32> = groups.iter().map(|g| g.key.month).collect();
        assert_eq!(months, vec![3, 2, 1]);

        let march_days: Vec<NaiveDate> = groups[0].days.iter().map(|d| d.date).collect();
        assert_eq!(march_days, vec![date(2026, 3, 4), date(2026, 3, 2)]);
        let same_day: Vec<i64> = groups[0].days[1].entries.iter().map(|e| e.id).collect();
        assert_eq!(same_day, vec![3, 2]);

        let mut seen: Vec<i64> = groups
            .iter()
            .flat_map(|m| m.days.iter())
            .flat_map(|d| d.entries.iter().map(|e| e.id))
            .collect();
        seen.sort();
        assert_eq!(seen, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn date_range_cutoffs() {
        let today = date(2026, 3, 4);
        assert_eq!(DateRangeFilter::Week.cutoff(today), Some(date(2026, 2, 25)));
        assert_eq!(DateRangeFilter::Month.cutoff(today), Some(date(2026, 2, 4)));
        assert_eq!(DateRangeFilter::Year.cutoff(today), Some(date(2025, 3, 4)));
        assert_eq!(DateRangeFilter::All.cutoff(today), None);

        let entries = sample();
        let recent: Vec<i64> = filter_entries(&entries, "", DateRangeFilter::Week, today)
            .iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(recent, vec![2, 3, 5]);
    }

    #[test]
    fn load_more_reveals_batches_of_months() {
        let today = date(2026, 3, 4);
        let mut state = JournalState::new(JournalScope::All);
        state.entries = (1..=5)
            .map(|m| entry(m as i64, date(2025, m, 1), 9, "x"))
            .collect();

        assert!(state.has_more_months(today));
        let months = state
            .rows(today)
            .iter()
            .filter(|r| matches!(r, JournalRow::Month { .. }))
            .count();
        assert_eq!(months, MONTH_BATCH);

        state.load_more();
        assert!(!state.has_more_months(today));
    }

    #[test]
    fn collapsing_hides_children() {
        let today = date(2026, 3, 4);
        let mut state = JournalState::new(JournalScope::All);
        state.entries = sample();

        let march = MonthKey { year: 2026, month: 3 };
        state.toggle_month(march);
        let rows = state.rows(today);
        assert_eq!(rows[0], JournalRow::Month { key: march, count: 3, collapsed: true });
        assert!(matches!(rows[1], JournalRow::Month { .. }));

        state.toggle_month(march);
        state.toggle_day(date(2026, 3, 2));
        let entries_shown = state
            .rows(today)
            .iter()
            .filter(|r| matches!(r, JournalRow::Entry(_)))
            .count();
        assert_eq!(entries_shown, 3);
    }

    #[test]
    fn delete_request_needs_a_cached_entry() {
        let mut state = JournalState::new(JournalScope::All);
        state.entries = sample();
        assert!(state.request_delete(3));
        assert_eq!(state.pending_delete, Some(3));
        state.cancel_delete();
        assert!(!state.request_delete(99));
        assert_eq!(state.pending_delete, None);
    }

    #[test]
    fn cursor_stays_on_an_entry_after_one_is_forgotten() {
        let today = date(2026, 3, 4);
        let mut state = JournalState::new(JournalScope::Date(today));
        state.entries = vec![entry(5, today, 7, "Coffee"), entry(6, today, 21, "Wind down")];
        // Month header, day header, then the newest entry first
        assert_eq!(state.rows(today).len(), 4);
        state.move_selection(3, today);
        assert_eq!(state.selected_entry(today).map(|e| e.id), Some(5));

        state.forget(6, today);

        assert_eq!(state.selected, 2);
        assert_eq!(state.selected_entry(today).map(|e| e.id), Some(5));
    }
}
