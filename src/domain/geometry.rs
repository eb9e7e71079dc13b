//! Grid geometry store.
//!
//! Holds the authoritative rectangle of every card on the dashboard grid, in
//! grid units (columns and rows).

use std::collections::HashSet;
use std::fmt;

use crate::domain::error::LayoutError;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CardId(String);

impl CardId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CardId {
    fn from(s: &str) -> Self {
        CardId(s.to_string())
    }
}

impl From<String> for CardId {
    fn from(s: String) -> Self {
        CardId(s)
    }
}

/// Grid dimensions and the size given to freshly added cards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridSpec {
    pub columns: u32,
    pub card_width: u32,
    pub card_height: u32,
    pub min_width: u32,
    pub min_height: u32,
}

impl Default for GridSpec {
    fn default() -> Self {
        GridSpec {
            columns: 12,
            card_width: 4,
            card_height: 6,
            min_width: 2,
            min_height: 3,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardGeometry {
    pub card_id: CardId,
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
    pub min_w: u32,
    pub min_h: u32,
    pub resizable: bool,
}

/// Rows available below the top edge; no card extends past this row.
pub const ROW_LIMIT: u32 = 10_000;

impl CardGeometry {
    /// Clamp the rectangle into the grid and its own size constraints.
    ///
    /// Minimum sizes are capped to the grid, so the result always satisfies
    /// `x + w <= columns` and `y + h <= ROW_LIMIT`.
    pub fn fitted(mut self, grid: &GridSpec) -> Self {
        let columns = grid.columns.max(1);
        self.min_w = self.min_w.min(columns);
        self.min_h = self.min_h.min(ROW_LIMIT);
        self.w = self.w.max(self.min_w).max(1).min(columns);
        self.h = self.h.max(self.min_h).max(1).min(ROW_LIMIT);
        self.x = self.x.min(columns - self.w);
        self.y = self.y.min(ROW_LIMIT - self.h);
        self
    }

    pub fn bottom(&self) -> u32 {
        self.y.saturating_add(self.h)
    }
}

/// First row below every occupied cell; 0 on an empty grid.
pub fn next_free_row(cards: &[CardGeometry]) -> u32 {
    cards.iter().map(CardGeometry::bottom).max().unwrap_or(0)
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GeometryStore {
    cards: Vec<CardGeometry>,
    mounted: bool,
}

impl GeometryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the grid as painted; reflows are ignored until then.
    pub fn mount(&mut self) {
        self.mounted = true;
    }

    pub fn is_mounted(&self) -> bool {
        self.mounted
    }

    pub fn cards(&self) -> &[CardGeometry] {
        &self.cards
    }

    pub fn get(&self, card_id: &CardId) -> Option<&CardGeometry> {
        self.cards.iter().find(|g| &g.card_id == card_id)
    }

    pub fn contains(&self, card_id: &CardId) -> bool {
        self.get(card_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    /// Apply the rectangles reported by the interactive grid.
    ///
    /// Membership never changes: unknown ids are ignored and cards missing
    /// from the report keep their previous rectangle. Returns whether any
    /// rectangle moved.
    pub fn reflow(
        &mut self,
        reported: &[CardGeometry],
        grid: &GridSpec,
    ) -> Result<bool, LayoutError> {
        if !self.mounted {
            return Err(LayoutError::NotMounted);
        }

        let mut seen = HashSet::new();
        let mut next = Vec::with_capacity(self.cards.len());
        for rect in reported {
            let Some(current) = self.get(&rect.card_id) else {
                continue;
            };
            if !seen.insert(rect.card_id.clone()) {
                continue;
            }
            let (w, h) = if current.resizable {
                (rect.w, rect.h)
            } else {
                (current.w, current.h)
            };
            next.push(
                CardGeometry {
                    card_id: current.card_id.clone(),
                    x: rect.x,
                    y: rect.y,
                    w,
                    h,
                    min_w: current.min_w,
                    min_h: current.min_h,
                    resizable: current.resizable,
                }
                .fitted(grid),
            );
        }
        for card in &self.cards {
            if !seen.contains(&card.card_id) {
                next.push(card.clone());
            }
        }

        let changed = next != self.cards;
        self.cards = next;
        Ok(changed)
    }

    /// Insert a new rectangle at the left edge of the first free row.
    pub fn append_card(&mut self, card_id: CardId, grid: &GridSpec) -> &CardGeometry {
        let rect = CardGeometry {
            card_id,
            x: 0,
            y: next_free_row(&self.cards),
            w: grid.card_width,
            h: grid.card_height,
            min_w: grid.min_width,
            min_h: grid.min_height,
            resizable: true,
        }
        .fitted(grid);
        self.cards.push(rect);
        &self.cards[self.cards.len() - 1]
    }

    pub fn remove_card(&mut self, card_id: &CardId) -> Option<CardGeometry> {
        let idx = self.cards.iter().position(|g| &g.card_id == card_id)?;
        Some(self.cards.remove(idx))
    }

    /// Swap in a whole new set of rectangles (layout load). Keeps the mount flag.
    pub fn replace(&mut self, cards: Vec<CardGeometry>) {
        self.cards = cards;
    }
}
