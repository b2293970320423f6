//! In-memory stand-in for the reference-data backend.
//!
//! Answers the same questions the real API does: party search with paging,
//! carriers for a freight mode, party creation, and sorted/paged pages of the
//! mode master table.

use fdesk_catalog::records::{
    Carrier, CarrierExtra, FreightMode, ModeRow, Party, PartyExtra, carriers_for_mode,
};
use fdesk_catalog::{FetchRequest, SelectOption, normalize};
use fdesk_widgets::{NewParty, SortDirection};
use serde::Deserialize;
use tracing::{debug, info};

use crate::error::Result;

const SEED: &str = include_str!("../data/catalog.json");

#[derive(Debug, Deserialize)]
struct Seed {
    parties: Vec<Party>,
    carriers: Vec<Carrier>,
    modes: Vec<ModeRow>,
}

/// Query for one page of the mode master table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModeQuery {
    pub search: String,
    pub sort: Option<(String, SortDirection)>,
    pub page: usize,
    pub page_size: usize,
}

impl Default for ModeQuery {
    fn default() -> Self {
        Self {
            search: String::new(),
            sort: None,
            page: 1,
            page_size: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModePage {
    pub rows: Vec<ModeRow>,
    pub total: usize,
}

#[derive(Debug, Clone)]
pub struct InMemoryCatalog {
    parties: Vec<Party>,
    carriers: Vec<Carrier>,
    modes: Vec<ModeRow>,
    next_party_id: u64,
}

impl InMemoryCatalog {
    /// Catalog loaded from the bundled sample data.
    pub fn seeded() -> Result<Self> {
        Self::from_json(SEED)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let seed: Seed = serde_json::from_str(json)?;
        let next_party_id = seed
            .parties
            .iter()
            .filter_map(|p| p.party_id.parse::<u64>().ok())
            .max()
            .unwrap_or(0)
            + 1;
        debug!(
            parties = seed.parties.len(),
            carriers = seed.carriers.len(),
            modes = seed.modes.len(),
            "catalog loaded"
        );
        Ok(Self {
            parties: seed.parties,
            carriers: seed.carriers,
            modes: seed.modes,
            next_party_id,
        })
    }

    /// First `limit` parties, the list a party selector shows before any
    /// search.
    pub fn party_defaults(&self, limit: usize) -> Vec<SelectOption<PartyExtra>> {
        let page: Vec<Party> = self.parties.iter().take(limit).cloned().collect();
        normalize(&page)
    }

    /// Parties whose name or short name contains the query.
    pub fn search_parties(&self, request: &FetchRequest) -> Vec<SelectOption<PartyExtra>> {
        let needle = request.query.trim().to_lowercase();
        let skip = request.page.saturating_sub(1) * request.limit;
        let hits: Vec<Party> = self
            .parties
            .iter()
            .filter(|p| {
                p.name.to_lowercase().contains(&needle)
                    || p.short_name
                        .as_deref()
                        .is_some_and(|s| s.to_lowercase().contains(&needle))
            })
            .skip(skip)
            .take(request.limit)
            .cloned()
            .collect();
        debug!(query = %request.query, hits = hits.len(), "party search");
        normalize(&hits)
    }

    /// Carriers that fit `mode`.
    pub fn carrier_options(&self, mode: Option<FreightMode>) -> Vec<SelectOption<CarrierExtra>> {
        normalize(&carriers_for_mode(&self.carriers, mode))
    }

    /// Store `party` and return its new id.
    pub fn create_party(&mut self, party: &NewParty) -> String {
        let party_id = self.next_party_id.to_string();
        self.next_party_id += 1;
        self.parties.push(Party {
            party_id: party_id.clone(),
            name: party.name.clone(),
            short_name: party.short_name.clone(),
            email: party.email.clone(),
            party_types: party.party_types.clone(),
        });
        info!(party_id = %party_id, name = %party.name, "party created");
        party_id
    }

    pub fn party_name(&self, party_id: &str) -> Option<&str> {
        self.parties
            .iter()
            .find(|p| p.party_id == party_id)
            .map(|p| p.name.as_str())
    }

    /// One page of modes matching `query.search`, sorted as asked.
    pub fn mode_page(&self, query: &ModeQuery) -> ModePage {
        let needle = query.search.trim().to_lowercase();
        let mut rows: Vec<&ModeRow> = self
            .modes
            .iter()
            .filter(|row| {
                needle.is_empty()
                    || row.mode_name.to_lowercase().contains(&needle)
                    || row.code.to_lowercase().contains(&needle)
            })
            .collect();
        if let Some((column, direction)) = &query.sort {
            rows.sort_by_cached_key(|row| row.sort_key(column));
            if *direction == SortDirection::Desc {
                rows.reverse();
            }
        }
        let total = rows.len();
        let page_size = query.page_size.max(1);
        let rows = rows
            .into_iter()
            .skip(query.page.saturating_sub(1) * page_size)
            .take(page_size)
            .cloned()
            .collect();
        ModePage { rows, total }
    }
}
