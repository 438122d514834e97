use std::collections::{BTreeMap, HashMap, HashSet};

use futures::future::join_all;
use serde_json::Value;

use super::state::{Chain, FetchTicket, FieldState, FieldView};
use super::FormError;
use crate::error::ClientError;
use crate::lookup::{active_only, LookupOption, LookupSource, OptionId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Parent changes reset their dependents immediately
    Ready,
    /// Edit mode: the record's own option lists are still loading, resets are deferred
    Hydrating,
}

#[derive(Debug, Clone)]
struct Slot {
    parent: String,
    state: FieldState,
    generation: u64,
    /// Parent value the current state was produced for; the "did it change" base
    fetched_for: Option<OptionId>,
    /// Parent value stored on the record being edited
    baseline: Option<OptionId>,
    /// The record's own option list for this field is still loading
    hydrating: bool,
    /// Parent moved away from `baseline` while hydrating; cleared once settled
    pending_reset: bool,
}

impl Slot {
    fn new(parent: &str) -> Self {
        Self {
            parent: parent.to_string(),
            state: FieldState::Idle,
            generation: 0,
            fetched_for: None,
            baseline: None,
            hydrating: false,
            pending_reset: false,
        }
    }
}

/// Keeps chains of dependent selections consistent.
///
/// The controller never performs I/O itself: changes return [`FetchTicket`]s,
/// and results are fed back through [`FormController::resolve`]. A result is
/// applied only if its ticket still matches the field's current fetch.
#[derive(Debug, Clone)]
pub struct FormController {
    chains: Vec<Chain>,
    slots: HashMap<String, Slot>,
    values: BTreeMap<String, OptionId>,
    phase: Phase,
    generation: u64,
}

impl FormController {
    /// Controller for a new record: every field starts empty
    pub fn new(chains: Vec<Chain>) -> Result<Self, FormError> {
        validate_chains(&chains)?;

        let slots = chains
            .iter()
            .map(|c| (c.dependent.clone(), Slot::new(&c.parent)))
            .collect();

        Ok(Self {
            chains,
            slots,
            values: BTreeMap::new(),
            phase: Phase::Ready,
            generation: 0,
        })
    }

    /// Controller for editing an existing record.
    ///
    /// Returns the fetches needed to show the record's current selections.
    /// While a chain's list is loading, a parent change does not clear its
    /// dependent. Once every list has settled, dependents whose parent still
    /// differs from the stored value, and that the user has not picked
    /// since, are reset. Chains without a stored parent behave as in a new form.
    pub fn for_record<I>(chains: Vec<Chain>, record: I) -> Result<(Self, Vec<FetchTicket>), FormError>
    where
        I: IntoIterator<Item = (String, Option<OptionId>)>,
    {
        let mut form = Self::new(chains)?;
        form.values = record
            .into_iter()
            .filter_map(|(field, value)| value.map(|v| (field, v)))
            .collect();

        let mut tickets = Vec::new();
        for chain in form.chains.clone() {
            let stored = form.values.get(&chain.parent).cloned();
            if let Some(slot) = form.slots.get_mut(&chain.dependent) {
                slot.baseline = stored.clone();
            }

            if let Some(parent) = stored {
                tickets.push(form.begin_fetch(&chain.dependent, parent));
                if let Some(slot) = form.slots.get_mut(&chain.dependent) {
                    slot.hydrating = true;
                }
            }
        }

        if !tickets.is_empty() {
            form.phase = Phase::Hydrating;
            tracing::debug!("Editing record: waiting on {} option lists", tickets.len());
        }

        Ok((form, tickets))
    }

    /// [`FormController::for_record`] reading each chain field out of a JSON record
    pub fn for_json_record(chains: Vec<Chain>, record: &Value) -> Result<(Self, Vec<FetchTicket>), FormError> {
        let fields: HashSet<String> = chains
            .iter()
            .flat_map(|c| [c.parent.clone(), c.dependent.clone()])
            .collect();

        let values: Vec<(String, Option<OptionId>)> = fields
            .into_iter()
            .map(|field| {
                let value = record.get(&field).and_then(OptionId::from_json);
                (field, value)
            })
            .collect();

        Self::for_record(chains, values)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn chains(&self) -> &[Chain] {
        &self.chains
    }

    /// Change a field's selection. `None` clears it.
    pub fn set_value(&mut self, field: &str, value: Option<OptionId>) -> Vec<FetchTicket> {
        // An explicit pick supersedes any deferred reset of this field
        if let Some(slot) = self.slots.get_mut(field) {
            slot.pending_reset = false;
        }

        match value {
            Some(v) => {
                self.values.insert(field.to_string(), v);
            }
            None => {
                self.values.remove(field);
            }
        }

        let mut tickets = Vec::new();
        self.propagate(field, &mut tickets);
        self.settle_hydration(&mut tickets);
        tickets
    }

    /// Load `field`'s options again for its current parent, e.g. after an error.
    ///
    /// Returns `None` when the parent is empty. Any fetch already in flight
    /// for the field is superseded.
    pub fn refresh(&mut self, field: &str) -> Result<Option<FetchTicket>, FormError> {
        let slot = self
            .slots
            .get(field)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))?;

        let Some(parent) = self.values.get(&slot.parent).cloned() else {
            return Ok(None);
        };
        tracing::debug!("Refreshing options for '{}' (parent {})", field, parent);
        Ok(Some(self.begin_fetch(field, parent)))
    }

    /// Apply the outcome of a fetch. Outcomes for superseded tickets are discarded.
    pub fn resolve(&mut self, ticket: FetchTicket, result: Result<Vec<LookupOption>, ClientError>) -> Vec<FetchTicket> {
        let mut tickets = Vec::new();

        let Some(slot) = self.slots.get_mut(&ticket.field) else {
            tracing::warn!("Dropping options for unknown field '{}'", ticket.field);
            return tickets;
        };

        let still_wanted = slot.generation == ticket.generation
            && matches!(&slot.state, FieldState::Fetching { parent } if *parent == ticket.parent);
        if !still_wanted {
            tracing::debug!(
                "Discarding stale options for '{}' (parent {})",
                ticket.field,
                ticket.parent
            );
            return tickets;
        }

        slot.state = match result {
            Ok(options) => FieldState::Loaded {
                parent: ticket.parent,
                options: active_only(options),
            },
            Err(e) => {
                tracing::warn!("Loading options for '{}' failed: {}", ticket.field, e);
                FieldState::Error {
                    parent: ticket.parent,
                    message: e.to_string(),
                }
            }
        };
        slot.hydrating = false;

        self.settle_hydration(&mut tickets);
        tickets
    }

    /// Run `tickets` (and any fetches they lead to) against `source`.
    ///
    /// Fetches for different fields run concurrently.
    pub async fn drive<S>(&mut self, source: &S, mut tickets: Vec<FetchTicket>)
    where
        S: LookupSource + ?Sized,
    {
        while !tickets.is_empty() {
            let results = join_all(tickets.into_iter().map(|ticket| async move {
                let result = source.fetch(&ticket.field, &ticket.parent).await;
                (ticket, result)
            }))
            .await;

            tickets = results
                .into_iter()
                .flat_map(|(ticket, result)| self.resolve(ticket, result))
                .collect();
        }
    }

    pub fn value(&self, field: &str) -> Option<&OptionId> {
        self.values.get(field)
    }

    pub fn values(&self) -> &BTreeMap<String, OptionId> {
        &self.values
    }

    pub fn state(&self, field: &str) -> Result<&FieldState, FormError> {
        self.slots
            .get(field)
            .map(|s| &s.state)
            .ok_or_else(|| FormError::UnknownField(field.to_string()))
    }

    pub fn view(&self, field: &str) -> Result<FieldView<'_>, FormError> {
        let state = self.state(field)?;
        Ok(FieldView {
            options: state.options(),
            is_loading: state.is_loading(),
            value: self.values.get(field),
            error: match state {
                FieldState::Error { message, .. } => Some(message.as_str()),
                _ => None,
            },
        })
    }

    /// Selected value missing from the loaded options.
    ///
    /// Reported only; the selection is left as is and the form decides.
    pub fn is_stale(&self, field: &str) -> bool {
        match (self.slots.get(field).map(|s| &s.state), self.values.get(field)) {
            (Some(FieldState::Loaded { options, .. }), Some(value)) => !options.iter().any(|o| &o.id == value),
            _ => false,
        }
    }

    /// Selections as a submission payload, each id in the JSON kind it arrived as
    pub fn to_json(&self) -> Value {
        let map = self
            .values
            .iter()
            .map(|(field, id)| (field.clone(), id.to_value()))
            .collect();
        Value::Object(map)
    }

    fn propagate(&mut self, field: &str, tickets: &mut Vec<FetchTicket>) {
        let dependents: Vec<String> = self
            .chains
            .iter()
            .filter(|c| c.parent == field)
            .map(|c| c.dependent.clone())
            .collect();

        for dependent in dependents {
            self.evaluate(&dependent, tickets);
        }
    }

    fn evaluate(&mut self, dependent: &str, tickets: &mut Vec<FetchTicket>) {
        let Some(slot) = self.slots.get(dependent) else {
            return;
        };
        let current = self.values.get(&slot.parent).cloned();
        if slot.fetched_for == current {
            return;
        }

        // Only a chain whose own record list is still loading holds its reset back
        let deferred = self.phase == Phase::Hydrating && slot.hydrating;
        let moved_from_record = current != slot.baseline;

        match current {
            Some(parent) => tickets.push(self.begin_fetch(dependent, parent)),
            None => self.go_idle(dependent),
        }

        if deferred {
            if let Some(slot) = self.slots.get_mut(dependent) {
                slot.pending_reset = moved_from_record;
            }
        } else {
            self.reset(dependent, tickets);
        }
    }

    fn reset(&mut self, field: &str, tickets: &mut Vec<FetchTicket>) {
        if let Some(slot) = self.slots.get_mut(field) {
            slot.pending_reset = false;
        }
        if let Some(previous) = self.values.remove(field) {
            tracing::debug!("Cleared '{}' (was {})", field, previous);
        }
        self.propagate(field, tickets);
    }

    fn begin_fetch(&mut self, dependent: &str, parent: OptionId) -> FetchTicket {
        self.generation += 1;
        let generation = self.generation;

        if let Some(slot) = self.slots.get_mut(dependent) {
            slot.generation = generation;
            slot.state = FieldState::Fetching { parent: parent.clone() };
            slot.fetched_for = Some(parent.clone());
        }

        FetchTicket {
            field: dependent.to_string(),
            parent,
            generation,
        }
    }

    fn go_idle(&mut self, dependent: &str) {
        self.generation += 1;
        let generation = self.generation;

        if let Some(slot) = self.slots.get_mut(dependent) {
            slot.generation = generation;
            slot.state = FieldState::Idle;
            slot.fetched_for = None;
            slot.hydrating = false;
        }
    }

    fn settle_hydration(&mut self, tickets: &mut Vec<FetchTicket>) {
        if self.phase != Phase::Hydrating || self.slots.values().any(|s| s.hydrating) {
            return;
        }

        self.phase = Phase::Ready;
        tracing::debug!("Record option lists settled");

        let pending: Vec<String> = self
            .chains
            .iter()
            .filter(|c| self.slots.get(&c.dependent).is_some_and(|s| s.pending_reset))
            .map(|c| c.dependent.clone())
            .collect();

        for dependent in pending {
            self.reset(&dependent, tickets);
        }
    }
}

fn validate_chains(chains: &[Chain]) -> Result<(), FormError> {
    let mut parent_of: HashMap<&str, &str> = HashMap::new();

    for chain in chains {
        if chain.parent == chain.dependent {
            return Err(FormError::InvalidChain(format!("'{}' depends on itself", chain.parent)));
        }
        if parent_of.insert(&chain.dependent, &chain.parent).is_some() {
            return Err(FormError::InvalidChain(format!(
                "'{}' has more than one parent",
                chain.dependent
            )));
        }
    }

    for start in parent_of.keys() {
        let mut seen = HashSet::new();
        let mut cursor = *start;
        while let Some(parent) = parent_of.get(cursor) {
            if !seen.insert(cursor) {
                return Err(FormError::InvalidChain(format!("cycle through '{}'", cursor)));
            }
            cursor = *parent;
        }
    }

    Ok(())
}
