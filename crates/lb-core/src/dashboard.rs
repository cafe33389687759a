//! Dashboard state: server stats, the loaded lead list, the active filter and
//! the conversation of the selected lead.
//!
//! All transitions are driven by discrete events (a load finished, a key was
//! pressed). Stats are never derived from the lead list; they are whatever the
//! server sent in the last snapshot.

use lb_api_types::{Conversation, DashboardStats, HumanContactUpdate, Lead, SaleUpdate};

use crate::filter::{count_matching, FilterClock, LeadFilter};
use crate::leads::LeadList;

/// Conversation panel state for the selected lead.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum ConversationView {
    #[default]
    Empty,
    Loading,
    Loaded(Conversation),
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DashboardState {
    pub stats: DashboardStats,
    pub leads: LeadList,
    pub conversation: ConversationView,
    pub last_error: Option<String>,
    filter: LeadFilter,
    selected_id: Option<String>,
    cursor: usize,
    loading: bool,
    clock: FilterClock,
    /// A pinned clock is never refreshed from the system time.
    clock_pinned: bool,
}

impl Default for DashboardState {
    fn default() -> Self {
        Self::new(LeadFilter::All)
    }
}

impl DashboardState {
    /// A fresh state waiting for its first load.
    pub fn new(filter: LeadFilter) -> Self {
        Self {
            stats: DashboardStats::default(),
            leads: LeadList::default(),
            conversation: ConversationView::Empty,
            last_error: None,
            filter,
            selected_id: None,
            cursor: 0,
            loading: true,
            clock: FilterClock::local_now(),
            clock_pinned: false,
        }
    }

    pub fn with_clock(mut self, clock: FilterClock) -> Self {
        self.set_clock(clock);
        self
    }

    /// Pin "today" to `clock` for every later load.
    pub fn set_clock(&mut self, clock: FilterClock) {
        self.clock = clock;
        self.clock_pinned = true;
    }

    pub fn clock(&self) -> &FilterClock {
        &self.clock
    }

    pub fn filter(&self) -> LeadFilter {
        self.filter
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn selected_id(&self) -> Option<&str> {
        self.selected_id.as_deref()
    }

    pub fn selected(&self) -> Option<&Lead> {
        self.selected_id.as_deref().and_then(|id| self.leads.get(id))
    }

    // -- Loading --------------------------------------------------------

    /// Move an unpinned clock to the current local date.
    pub fn refresh_clock(&mut self) {
        if !self.clock_pinned {
            self.clock = FilterClock::local_now();
        }
    }

    /// Marks a reload in flight and refreshes the clock.
    pub fn begin_load(&mut self) {
        self.loading = true;
        self.refresh_clock();
    }

    /// Replace stats and leads with a fresh snapshot. The selection survives
    /// when the lead is still present.
    pub fn apply_snapshot(&mut self, stats: DashboardStats, leads: LeadList) {
        self.stats = stats;
        self.leads = leads;
        self.loading = false;
        self.last_error = None;

        let still_there = self
            .selected_id
            .as_deref()
            .is_some_and(|id| self.leads.get(id).is_some());
        if !still_there && self.selected_id.is_some() {
            self.selected_id = None;
            self.conversation = ConversationView::Empty;
        }
        self.clamp_cursor();
    }

    /// A load failed: leave the loading state and keep whatever was shown.
    pub fn load_failed(&mut self, message: impl Into<String>) {
        self.loading = false;
        self.last_error = Some(message.into());
    }

    // -- Filtering ------------------------------------------------------

    pub fn set_filter(&mut self, filter: LeadFilter) {
        self.filter = filter;
        self.cursor = 0;
    }

    pub fn next_filter(&mut self) {
        self.set_filter(self.filter.next());
    }

    pub fn prev_filter(&mut self) {
        self.set_filter(self.filter.prev());
    }

    /// Leads passing the active filter, in server order.
    pub fn visible(&self) -> Vec<&Lead> {
        self.leads.filtered(self.filter, &self.clock)
    }

    /// Client-side count for each filter, for the filter bar.
    pub fn filter_counts(&self) -> Vec<(LeadFilter, usize)> {
        LeadFilter::ALL
            .into_iter()
            .map(|f| (f, count_matching(self.leads.as_slice(), f, &self.clock)))
            .collect()
    }

    // -- Cursor ---------------------------------------------------------

    pub fn cursor_down(&mut self) {
        let len = self.visible().len();
        if len > 0 && self.cursor < len - 1 {
            self.cursor += 1;
        }
    }

    pub fn cursor_up(&mut self) {
        self.cursor = self.cursor.saturating_sub(1);
    }

    pub fn set_cursor(&mut self, index: usize) {
        self.cursor = index;
        self.clamp_cursor();
    }

    pub fn lead_at_cursor(&self) -> Option<&Lead> {
        self.visible().get(self.cursor).copied()
    }

    fn clamp_cursor(&mut self) {
        let len = self.visible().len();
        self.cursor = self.cursor.min(len.saturating_sub(1));
    }

    // -- Selection & conversation ----------------------------------------

    /// Select a lead for conversation viewing.
    ///
    /// Returns `true` when the selection changed, in which case the caller
    /// should fetch the conversation. Changing the selection resets the
    /// filter to `All` and moves the cursor onto the lead.
    pub fn select_lead(&mut self, id: &str) -> bool {
        if self.selected_id.as_deref() == Some(id) || self.leads.get(id).is_none() {
            return false;
        }
        self.selected_id = Some(id.to_string());
        self.conversation = ConversationView::Loading;
        self.filter = LeadFilter::All;
        self.cursor = self.leads.position(id).unwrap_or(0);
        true
    }

    /// Select the lead under the cursor. Returns its id when the selection
    /// changed.
    pub fn select_at_cursor(&mut self) -> Option<String> {
        let id = self.lead_at_cursor()?.id.clone();
        self.select_lead(&id).then_some(id)
    }

    pub fn clear_selection(&mut self) {
        self.selected_id = None;
        self.conversation = ConversationView::Empty;
    }

    /// Install a fetched conversation. Responses for a lead that is no longer
    /// selected are dropped; returns whether it was applied.
    pub fn apply_conversation(&mut self, lead_id: &str, conversation: Conversation) -> bool {
        if self.selected_id.as_deref() != Some(lead_id) {
            return false;
        }
        self.conversation = ConversationView::Loaded(conversation);
        true
    }

    pub fn conversation_failed(&mut self, lead_id: &str, message: impl Into<String>) -> bool {
        if self.selected_id.as_deref() != Some(lead_id) {
            return false;
        }
        self.conversation = ConversationView::Failed(message.into());
        true
    }

    // -- Mutations ------------------------------------------------------

    /// The lead a toggle acts on: the selected lead, else the one under the
    /// cursor.
    pub fn target_lead(&self) -> Option<&Lead> {
        self.selected().or_else(|| self.lead_at_cursor())
    }

    /// Request flipping the human-contact flag of the target lead.
    pub fn contact_toggle(&self, notes: Option<String>) -> Option<(String, HumanContactUpdate)> {
        let lead = self.target_lead()?;
        Some((
            lead.id.clone(),
            HumanContactUpdate {
                human_contacted: !lead.is_contacted(),
                notes,
            },
        ))
    }

    /// Request flipping the sale flag of the target lead. The amount is only
    /// sent when closing a sale.
    pub fn sale_toggle(
        &self,
        amount: Option<f64>,
        notes: Option<String>,
    ) -> Option<(String, SaleUpdate)> {
        let lead = self.target_lead()?;
        let closing = !lead.is_sale_closed();
        Some((
            lead.id.clone(),
            SaleUpdate {
                sale_closed: closing,
                sale_amount: if closing { amount } else { None },
                notes,
            },
        ))
    }
}
