//! Mode-of-transport master table: sort, page and search against the
//! catalog, one query per table intent.

use std::io::Write;

use fdesk_catalog::records::{MODE_COLUMNS, ModeRow};
use fdesk_core::event::{Event, KeyCode};
use fdesk_render::frame::{Frame, HitId};
use fdesk_runtime::WidgetConfig;
use fdesk_widgets::{Column, ReferenceTable, StatefulWidget, TableIntent, TableState};
use tracing::{debug, info};

use crate::catalog::{InMemoryCatalog, ModePage, ModeQuery};
use crate::error::Result;
use crate::screen::write_frame;

pub const MODES_TABLE: HitId = HitId::new(20);

fn column_width(key: &str) -> u16 {
    match key {
        "mode_name" => 18,
        "code" => 10,
        "is_active" => 18,
        _ => 0,
    }
}

fn mode_columns<'a>() -> Vec<Column<'a, ModeRow>> {
    MODE_COLUMNS
        .iter()
        .map(|&(key, header, sortable)| {
            Column::new(key, header, move |row: &ModeRow| row.cell(key))
                .width(column_width(key))
                .sortable(sortable)
        })
        .collect()
}

#[derive(Debug)]
pub struct ModesScreen {
    config: WidgetConfig,
    catalog: InMemoryCatalog,
    state: TableState,
    query: ModeQuery,
    page: ModePage,
    frame: Frame,
    activated: Option<String>,
}

impl ModesScreen {
    pub fn new(config: WidgetConfig, catalog: InMemoryCatalog, width: u16, height: u16) -> Self {
        let state = TableState::new(MODES_TABLE).with_config(&config);
        let query = ModeQuery {
            page_size: state.page_size(),
            ..ModeQuery::default()
        };
        let page = catalog.mode_page(&query);
        Self {
            config,
            catalog,
            state,
            query,
            page,
            frame: Frame::with_hit_grid(width, height),
            activated: None,
        }
    }

    pub fn rows(&self) -> &[ModeRow] {
        &self.page.rows
    }

    pub fn total(&self) -> usize {
        self.page.total
    }

    pub fn query(&self) -> &ModeQuery {
        &self.query
    }

    /// Mode id of the last activated row.
    pub fn activated(&self) -> Option<&str> {
        self.activated.as_deref()
    }

    pub fn render(&mut self) -> &Frame {
        let mut frame = Frame::with_hit_grid(self.frame.width(), self.frame.height());
        ReferenceTable::new(mode_columns(), &self.page.rows)
            .config(&self.config)
            .total(self.page.total)
            .render(frame.bounds(), &mut frame, &mut self.state);
        self.frame = frame;
        &self.frame
    }

    pub fn dispatch(&mut self, event: &Event) {
        let hit = match event {
            Event::Mouse(mouse) => self.frame.hit_test(mouse.x, mouse.y),
            _ => None,
        };
        let intent = ReferenceTable::new(mode_columns(), &self.page.rows)
            .total(self.page.total)
            .handle_event(&mut self.state, event, hit);
        if let Some(intent) = intent {
            self.apply(intent);
        }
    }

    pub fn click(&mut self, x: u16, y: u16) {
        self.render();
        self.dispatch(&Event::click(x, y));
    }

    pub fn type_text(&mut self, text: &str) {
        for ch in text.chars() {
            self.dispatch(&Event::key(KeyCode::Char(ch)));
        }
    }

    fn apply(&mut self, intent: TableIntent) {
        debug!(?intent, "table intent");
        match intent {
            TableIntent::Sort { column, direction } => {
                self.query.sort = Some((column, direction));
            }
            TableIntent::Page(page) => {
                let pages = self.state.page_count(self.page.total);
                self.query.page = page.clamp(1, pages);
                self.state.on_page_change(self.query.page);
            }
            TableIntent::Search(term) => {
                self.query.search = term;
                self.query.page = 1;
                self.state.on_page_change(1);
            }
            TableIntent::Activate(index) => {
                if let Some(row) = self.page.rows.get(index) {
                    info!(mode_id = %row.mode_id, "mode opened for editing");
                    self.activated = Some(row.mode_id.clone());
                }
                return;
            }
        }
        self.page = self.catalog.mode_page(&self.query);
    }
}

/// Sort by name twice, page forward, then search.
pub fn run_script(screen: &mut ModesScreen, out: &mut dyn Write) -> Result<()> {
    write_frame(out, "modes", screen.render())?;

    screen.click(1, 1);
    write_frame(out, "sorted by name", screen.render())?;
    screen.click(1, 1);
    write_frame(out, "sorted by name, descending", screen.render())?;

    screen.dispatch(&Event::key(KeyCode::PageDown));
    write_frame(out, "next page", screen.render())?;

    screen.dispatch(&Event::key(KeyCode::Char('/')));
    screen.type_text("ways");
    screen.dispatch(&Event::key(KeyCode::Enter));
    write_frame(out, "search: ways", screen.render())?;

    screen.dispatch(&Event::key(KeyCode::Down));
    screen.dispatch(&Event::key(KeyCode::Enter));
    if let Some(mode_id) = screen.activated() {
        writeln!(out, "activated {mode_id}")?;
    }
    Ok(())
}
