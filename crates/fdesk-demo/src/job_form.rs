//! Job-creation form with shipper, carrier and mode-of-transport selectors.
//!
//! The shipper selector searches the catalog remotely (debounced) and offers
//! "Add Party", which opens the quick-add dialog. The carrier list follows the
//! chosen mode of transport. Everything runs on a [`VirtualClock`].

use std::io::Write;

use fdesk_catalog::records::{
    CarrierExtra, FreightMode, ModeExtra, PartyExtra, PartyType, TransportMode,
};
use fdesk_catalog::{FetchRequest, OptionFeed, SelectOption, normalize};
use fdesk_core::event::{Event, KeyCode};
use fdesk_core::geometry::Rect;
use fdesk_render::cell::{Color, Style};
use fdesk_render::frame::{Frame, HitData, HitId, HitRegion};
use fdesk_runtime::{PointerListeners, WidgetConfig};
use fdesk_widgets::{
    QuickAddAction, QuickAddParty, QuickAddPartyState, Selector, SelectorEvent, SelectorState,
    StatefulWidget,
};
use serde::Serialize;
use tracing::info;

use crate::catalog::InMemoryCatalog;
use crate::error::{DemoError, Result};
use crate::screen::{VirtualClock, write_frame};

pub const SHIPPER: HitId = HitId::new(1);
pub const CARRIER: HitId = HitId::new(2);
pub const MODE: HitId = HitId::new(3);
pub const QUICK_ADD: HitId = HitId::new(9);

const FIELDS: [HitId; 3] = [SHIPPER, CARRIER, MODE];
/// Simulated round-trip of a party search, in milliseconds.
const FETCH_LATENCY_MS: u64 = 50;

/// Values the parent form owns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct JobFormValues {
    pub shipper_id: Option<String>,
    pub carrier_id: Option<String>,
    pub mode_of_transport: Option<String>,
}

/// Carrier restriction for a builtin mode id.
pub fn freight_mode(mode_id: &str) -> Option<FreightMode> {
    match mode_id {
        "airways" => Some(FreightMode::Air),
        "seaways" => Some(FreightMode::FclSea),
        "roadways" => Some(FreightMode::Road),
        "railways" => Some(FreightMode::Rail),
        _ => None,
    }
}

fn field_label(id: HitId) -> &'static str {
    match id {
        SHIPPER => "Shipper *",
        CARRIER => "Carrier",
        _ => "Mode of Transport *",
    }
}

fn shipper_props<'a>(
    feed: &'a OptionFeed<PartyExtra>,
    value: Option<&'a str>,
    config: &WidgetConfig,
) -> Selector<'a, PartyExtra> {
    Selector::new(feed.options())
        .config(config)
        .value(value)
        .placeholder("Select shipper")
        .search_placeholder("Search shippers...")
        .loading(feed.is_loading())
        .show_code(true)
        .show_email(true)
        .add_new(true)
        .add_new_label("Add Party")
}

fn carrier_props<'a>(
    options: &'a [SelectOption<CarrierExtra>],
    value: Option<&'a str>,
    config: &WidgetConfig,
) -> Selector<'a, CarrierExtra> {
    Selector::new(options)
        .config(config)
        .value(value)
        .placeholder("Select carrier")
        .show_type(true)
}

fn mode_props<'a>(
    options: &'a [SelectOption<ModeExtra>],
    value: Option<&'a str>,
    config: &WidgetConfig,
) -> Selector<'a, ModeExtra> {
    Selector::new(options)
        .config(config)
        .value(value)
        .placeholder("Select Mode of Transport")
        .required("Mode of Transport is required")
}

#[derive(Debug)]
pub struct JobForm {
    config: WidgetConfig,
    catalog: InMemoryCatalog,
    listeners: PointerListeners,
    clock: VirtualClock,
    width: u16,
    height: u16,
    focus: HitId,
    values: JobFormValues,
    shipper: SelectorState,
    shipper_feed: OptionFeed<PartyExtra>,
    in_flight: Option<FetchRequest>,
    carrier: SelectorState,
    carriers: Vec<SelectOption<CarrierExtra>>,
    mode: SelectorState,
    modes: Vec<SelectOption<ModeExtra>>,
    dialog: Option<QuickAddPartyState>,
    frame: Frame,
}

impl JobForm {
    pub fn new(config: WidgetConfig, catalog: InMemoryCatalog, width: u16, height: u16) -> Self {
        let listeners = PointerListeners::new();
        let selector = |id| {
            SelectorState::new(id)
                .with_config(&config)
                .with_listeners(listeners.clone())
        };
        let shipper = selector(SHIPPER).with_remote_search(true);
        let carrier = selector(CARRIER);
        let mode = selector(MODE);

        let mut shipper_feed = OptionFeed::default();
        let defaults = shipper_feed.default_request();
        shipper_feed.set_defaults(catalog.party_defaults(defaults.limit));
        let carriers = catalog.carrier_options(None);

        Self {
            listeners,
            clock: VirtualClock::new(),
            width,
            height,
            focus: SHIPPER,
            values: JobFormValues::default(),
            shipper,
            shipper_feed,
            in_flight: None,
            carrier,
            carriers,
            mode,
            modes: normalize(&TransportMode::builtin()),
            dialog: None,
            frame: Frame::with_hit_grid(width, height),
            config,
            catalog,
        }
    }

    pub fn values(&self) -> &JobFormValues {
        &self.values
    }

    pub fn catalog(&self) -> &InMemoryCatalog {
        &self.catalog
    }

    pub fn is_dialog_open(&self) -> bool {
        self.dialog.is_some()
    }

    pub fn is_open(&self, id: HitId) -> bool {
        self.state(id).is_open()
    }

    /// Trigger row of a field, for scripted clicks.
    pub fn trigger_at(&self, id: HitId) -> (u16, u16) {
        let area = self.field_area(id);
        (area.x + 2, area.y)
    }

    fn field_area(&self, id: HitId) -> Rect {
        let index = FIELDS.iter().position(|&f| f == id).unwrap_or(0) as u16;
        Rect::new(2, 2 + index * 3, self.width.saturating_sub(4).min(48), 2)
    }

    fn state(&self, id: HitId) -> &SelectorState {
        match id {
            SHIPPER => &self.shipper,
            CARRIER => &self.carrier,
            _ => &self.mode,
        }
    }

    fn state_mut(&mut self, id: HitId) -> &mut SelectorState {
        match id {
            SHIPPER => &mut self.shipper,
            CARRIER => &mut self.carrier,
            _ => &mut self.mode,
        }
    }

    fn value_mut(&mut self, id: HitId) -> &mut Option<String> {
        match id {
            SHIPPER => &mut self.values.shipper_id,
            CARRIER => &mut self.values.carrier_id,
            _ => &mut self.values.mode_of_transport,
        }
    }

    /// Draw the form. Open selectors go last so their overlay sits on top.
    pub fn render(&mut self) -> &Frame {
        let mut frame = Frame::with_hit_grid(self.width, self.height);
        frame
            .buffer
            .set_string(0, 0, "New Job", Style::new().bold(), self.width);
        for id in FIELDS {
            let area = self.field_area(id);
            frame.buffer.set_string(
                area.x,
                area.y - 1,
                field_label(id),
                Style::new().fg(Color::Muted),
                area.right(),
            );
        }
        let mut order = FIELDS;
        order.sort_by_key(|&id| self.state(id).is_open());
        for id in order {
            self.render_field(id, &mut frame);
        }
        if let Some(dialog) = self.dialog.as_mut() {
            QuickAddParty::new().render(frame.bounds(), &mut frame, dialog);
        }
        self.frame = frame;
        &self.frame
    }

    fn render_field(&mut self, id: HitId, frame: &mut Frame) {
        let area = self.field_area(id);
        let config = &self.config;
        match id {
            SHIPPER => shipper_props(
                &self.shipper_feed,
                self.values.shipper_id.as_deref(),
                config,
            )
            .render(area, frame, &mut self.shipper),
            CARRIER => carrier_props(&self.carriers, self.values.carrier_id.as_deref(), config)
                .render(area, frame, &mut self.carrier),
            _ => mode_props(&self.modes, self.values.mode_of_transport.as_deref(), config)
                .render(area, frame, &mut self.mode),
        }
    }

    fn route(
        &mut self,
        id: HitId,
        event: &Event,
        hit: Option<(HitId, HitRegion, HitData)>,
    ) -> Option<SelectorEvent> {
        let now = self.clock.now();
        let config = &self.config;
        match id {
            SHIPPER => shipper_props(
                &self.shipper_feed,
                self.values.shipper_id.as_deref(),
                config,
            )
            .handle_event(&mut self.shipper, event, hit, now),
            CARRIER => carrier_props(&self.carriers, self.values.carrier_id.as_deref(), config)
                .handle_event(&mut self.carrier, event, hit, now),
            MODE => mode_props(&self.modes, self.values.mode_of_transport.as_deref(), config)
                .handle_event(&mut self.mode, event, hit, now),
            _ => None,
        }
    }

    /// Feed one input event through the form, using the last rendered frame
    /// for hit testing.
    pub fn dispatch(&mut self, event: &Event) -> Result<()> {
        let hit = match event {
            Event::Mouse(mouse) => self.frame.hit_test(mouse.x, mouse.y),
            _ => None,
        };

        if let Some(mut dialog) = self.dialog.take() {
            match QuickAddParty::new().handle_event(&mut dialog, event, hit) {
                Some(QuickAddAction::Submit(party)) => {
                    let party_id = self.catalog.create_party(&party);
                    let limit = self.shipper_feed.default_request().limit;
                    self.shipper_feed
                        .set_defaults(self.catalog.party_defaults(limit));
                    dialog.complete(party_id)?;
                }
                Some(QuickAddAction::Cancel) => dialog.cancel()?,
                None => self.dialog = Some(dialog),
            }
            return Ok(());
        }

        if event.is_primary_down() {
            let now = self.clock.now();
            for owner in self.listeners.outside_of(hit.map(|h| h.0)) {
                self.state_mut(owner).on_outside_pointer(now);
            }
            if let Some((id, ..)) = hit {
                self.focus = id;
            }
        }
        let target = match event {
            Event::Mouse(_) => hit.map(|h| h.0),
            _ => Some(self.focus),
        };
        if let Some(id) = target
            && let Some(outcome) = self.route(id, event, hit)
        {
            self.apply(id, outcome);
        }
        Ok(())
    }

    pub fn type_text(&mut self, text: &str) -> Result<()> {
        for ch in text.chars() {
            self.dispatch(&Event::key(KeyCode::Char(ch)))?;
        }
        Ok(())
    }

    /// Render, then press at `(x, y)` so the hit test sees the current layout.
    pub fn click(&mut self, (x, y): (u16, u16)) -> Result<()> {
        self.render();
        self.dispatch(&Event::click(x, y))
    }

    /// Move the clock forward: answer the outstanding search, then let
    /// selectors publish debounced queries and finished creations.
    pub fn advance(&mut self, ms: u64) {
        let now = self.clock.advance(ms);
        if let Some(request) = self.in_flight.take() {
            let results = self.catalog.search_parties(&request);
            self.shipper_feed.resolve(&request.query, results);
        }
        for id in FIELDS {
            for outcome in self.state_mut(id).tick(now) {
                self.apply(id, outcome);
            }
        }
    }

    fn apply(&mut self, id: HitId, outcome: SelectorEvent) {
        match outcome {
            SelectorEvent::Changed(_) => {
                if outcome.apply_to(self.value_mut(id)) {
                    info!(field = field_label(id), value = ?self.state_value(id), "field changed");
                    if id == MODE {
                        self.refilter_carriers();
                    }
                }
            }
            SelectorEvent::Search(query) => {
                if let Some(request) = self.shipper_feed.begin_search(&query) {
                    self.in_flight = Some(request);
                }
            }
            SelectorEvent::AddNew(request) => {
                info!(correlation = %request.correlation(), seed = request.seed_query(), "quick add opened");
                self.dialog = Some(QuickAddPartyState::new(
                    QUICK_ADD,
                    request,
                    &[PartyType::Shipper],
                ));
            }
        }
    }

    fn state_value(&self, id: HitId) -> Option<&str> {
        match id {
            SHIPPER => self.values.shipper_id.as_deref(),
            CARRIER => self.values.carrier_id.as_deref(),
            _ => self.values.mode_of_transport.as_deref(),
        }
    }

    fn refilter_carriers(&mut self) {
        let mode = self.values.mode_of_transport.as_deref().and_then(freight_mode);
        self.carriers = self.catalog.carrier_options(mode);
        let still_valid = self
            .values
            .carrier_id
            .as_deref()
            .is_none_or(|id| self.carriers.iter().any(|c| c.id == id));
        if !still_valid {
            info!("carrier cleared, not valid for the new mode");
            self.values.carrier_id = None;
        }
    }
}

/// Run the scripted session, printing frames to `out`. Returns the final
/// form values.
pub fn run_script(form: &mut JobForm, out: &mut dyn Write) -> Result<JobFormValues> {
    write_frame(out, "empty job form", form.render())?;

    // Remote shipper search: debounce, loading, results.
    form.click(form.trigger_at(SHIPPER))?;
    form.type_text("blue")?;
    form.advance(form.config.debounce_ms);
    write_frame(out, "shipper search in flight", form.render())?;
    form.advance(FETCH_LATENCY_MS);
    write_frame(out, "shipper search results", form.render())?;
    form.dispatch(&Event::key(KeyCode::Down))?;
    form.dispatch(&Event::key(KeyCode::Enter))?;
    form.advance(form.config.debounce_ms);

    // Mode of transport narrows the carrier list.
    form.click(form.trigger_at(MODE))?;
    form.type_text("sea")?;
    form.dispatch(&Event::key(KeyCode::Enter))?;

    // Outside press closes an open overlay without selecting.
    form.click(form.trigger_at(CARRIER))?;
    write_frame(out, "carriers for seaways", form.render())?;
    form.click((form.width.saturating_sub(1), form.height.saturating_sub(1)))?;
    if form.is_open(CARRIER) {
        return Err(DemoError::script("carrier overlay survived an outside press"));
    }
    form.click(form.trigger_at(CARRIER))?;
    form.type_text("mae")?;
    form.dispatch(&Event::key(KeyCode::Enter))?;
    write_frame(out, "shipper, mode and carrier chosen", form.render())?;

    // Switch shipper to a party that does not exist yet.
    form.click(form.trigger_at(SHIPPER))?;
    form.type_text("Nordic Foods")?;
    form.advance(form.config.debounce_ms);
    form.advance(FETCH_LATENCY_MS);
    write_frame(out, "no shipper matches", form.render())?;
    form.dispatch(&Event::key(KeyCode::Enter))?;
    if !form.is_dialog_open() {
        return Err(DemoError::script("add party did not open the dialog"));
    }

    // Untick the default type to show the submit gate, then tick it again.
    for _ in 0..5 {
        form.dispatch(&Event::key(KeyCode::Tab))?;
    }
    form.dispatch(&Event::key(KeyCode::Char(' ')))?;
    form.dispatch(&Event::key(KeyCode::Enter))?;
    write_frame(out, "quick add needs a party type", form.render())?;
    form.dispatch(&Event::key(KeyCode::Char(' ')))?;
    form.dispatch(&Event::key(KeyCode::Enter))?;

    form.advance(10);
    form.advance(form.config.debounce_ms);
    write_frame(out, "created party selected", form.render())?;

    let values = form.values().clone();
    writeln!(out, "{}", serde_json::to_string_pretty(&values)?)?;
    Ok(values)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form() -> JobForm {
        let catalog = InMemoryCatalog::seeded().unwrap();
        JobForm::new(WidgetConfig::default(), catalog, 72, 24)
    }

    #[test]
    fn outside_press_closes_open_field() {
        let mut form = form();
        form.render();
        form.click(form.trigger_at(CARRIER)).unwrap();
        assert!(form.is_open(CARRIER));
        form.render();
        form.click((70, 23)).unwrap();
        assert!(!form.is_open(CARRIER));
    }

    #[test]
    fn opening_another_field_closes_the_first() {
        let mut form = form();
        form.render();
        form.click(form.trigger_at(MODE)).unwrap();
        form.render();
        form.click(form.trigger_at(SHIPPER)).unwrap();
        assert!(!form.is_open(MODE));
        assert!(form.is_open(SHIPPER));
    }

    #[test]
    fn required_mode_message_until_chosen() {
        let mut form = form();
        let text = form.render().buffer.to_lines().join("\n");
        assert!(text.contains("Mode of Transport is required"));
        form.click(form.trigger_at(MODE)).unwrap();
        form.type_text("air").unwrap();
        form.dispatch(&Event::key(KeyCode::Enter)).unwrap();
        assert_eq!(form.values().mode_of_transport.as_deref(), Some("airways"));
        let text = form.render().buffer.to_lines().join("\n");
        assert!(!text.contains("Mode of Transport is required"));
    }

    #[test]
    fn changing_mode_drops_incompatible_carrier() {
        let mut form = form();
        form.render();
        form.click(form.trigger_at(CARRIER)).unwrap();
        form.type_text("emirates").unwrap();
        form.dispatch(&Event::key(KeyCode::Enter)).unwrap();
        assert_eq!(form.values().carrier_id.as_deref(), Some("4"));

        form.render();
        form.click(form.trigger_at(MODE)).unwrap();
        form.type_text("sea").unwrap();
        form.dispatch(&Event::key(KeyCode::Enter)).unwrap();
        assert_eq!(form.values().carrier_id, None);
    }

    #[test]
    fn script_ends_with_created_party() {
        let mut form = form();
        let mut out = Vec::new();
        let values = run_script(&mut form, &mut out).unwrap();
        assert_eq!(values.shipper_id.as_deref(), Some("108"));
        assert_eq!(values.carrier_id.as_deref(), Some("1"));
        assert_eq!(values.mode_of_transport.as_deref(), Some("seaways"));
        assert_eq!(form.catalog().party_name("108"), Some("Nordic Foods"));

        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("Loading..."));
        assert!(text.contains("Bluewater Textiles"));
        assert!(text.contains("+ Add Party"));
        assert!(text.contains("At least one party type is required"));
    }
}
