//! Deck models and DTOs.
//!
//! Defines the database row struct for `decks`, the create/update/move
//! request bodies, and the list/detail/breadcrumb response shapes.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use dropdeck_core::deck::{normalize_deck_name, validate_color_hex, DEFAULT_COLOR_HEX};
use dropdeck_core::error::CoreError;
use dropdeck_core::hierarchy::{HierarchyNode, SiblingOrdering};
use dropdeck_core::types::{DbId, Timestamp};

// ---------------------------------------------------------------------------
// Entity
// ---------------------------------------------------------------------------

/// A deck row from the `decks` table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Deck {
    pub id: DbId,
    pub user_id: DbId,
    pub parent_id: Option<DbId>,
    pub name: String,
    pub description: String,
    pub color_hex: String,
    #[serde(rename = "order")]
    pub sort_order: i32,
    pub is_public: bool,
    pub deleted_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl HierarchyNode for Deck {
    type Scope = DbId;
    type Payload = NewDeck;
    type Changes = UpdateDeck;

    const KIND: &'static str = "Deck";
    const ORDERING: SiblingOrdering = SiblingOrdering::Explicit;

    fn id(&self) -> DbId {
        self.id
    }

    fn parent_id(&self) -> Option<DbId> {
        self.parent_id
    }

    fn set_parent_id(&mut self, parent_id: Option<DbId>) {
        self.parent_id = parent_id;
    }

    /// Decks are partitioned per owning user.
    fn scope(&self) -> DbId {
        self.user_id
    }

    fn created_at(&self) -> Timestamp {
        self.created_at
    }

    fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    fn sibling_order(&self) -> i32 {
        self.sort_order
    }

    fn apply_changes(&mut self, changes: &UpdateDeck) {
        if let Some(name) = &changes.name {
            self.name = name.clone();
        }
        if let Some(description) = &changes.description {
            self.description = description.clone();
        }
        if let Some(color_hex) = &changes.color_hex {
            self.color_hex = color_hex.clone();
        }
        if let Some(is_public) = changes.is_public {
            self.is_public = is_public;
        }
        if let Some(order) = changes.order {
            self.sort_order = order;
        }
    }
}

// ---------------------------------------------------------------------------
// Create DTO
// ---------------------------------------------------------------------------

/// Request body for creating a deck.
#[derive(Debug, Deserialize)]
pub struct CreateDeck {
    pub name: String,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub is_public: Option<bool>,
    pub parent_id: Option<DbId>,
}

/// Validated deck payload with defaults applied, ready for insertion.
#[derive(Debug, Clone)]
pub struct NewDeck {
    pub name: String,
    pub description: String,
    pub color_hex: String,
    pub is_public: bool,
}

impl TryFrom<&CreateDeck> for NewDeck {
    type Error = CoreError;

    fn try_from(input: &CreateDeck) -> Result<Self, Self::Error> {
        let name = normalize_deck_name(&input.name)?;
        let color_hex = input
            .color_hex
            .clone()
            .unwrap_or_else(|| DEFAULT_COLOR_HEX.to_string());
        validate_color_hex(&color_hex)?;

        Ok(Self {
            name,
            description: input.description.clone().unwrap_or_default(),
            color_hex,
            is_public: input.is_public.unwrap_or(false),
        })
    }
}

// ---------------------------------------------------------------------------
// Update DTO
// ---------------------------------------------------------------------------

/// Request body for updating a deck (all fields optional).
///
/// The parent link is not editable here; moves go through
/// [`MoveDeck`] so they get the cycle checks.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateDeck {
    pub name: Option<String>,
    pub description: Option<String>,
    pub color_hex: Option<String>,
    pub is_public: Option<bool>,
    pub order: Option<i32>,
}

impl UpdateDeck {
    /// Validate the provided fields, trimming the name.
    pub fn validated(mut self) -> Result<Self, CoreError> {
        if let Some(name) = &self.name {
            self.name = Some(normalize_deck_name(name)?);
        }
        if let Some(color_hex) = &self.color_hex {
            validate_color_hex(color_hex)?;
        }
        Ok(self)
    }
}

// ---------------------------------------------------------------------------
// Move DTO
// ---------------------------------------------------------------------------

/// Request body for `POST /decks/{id}/move`. A `null` parent makes the deck
/// a root.
#[derive(Debug, Deserialize)]
pub struct MoveDeck {
    pub parent_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Query parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DeckListParams {
    pub parent_id: Option<DbId>,
}

#[derive(Debug, Deserialize)]
pub struct DeckTreeParams {
    pub root_id: Option<DbId>,
}

// ---------------------------------------------------------------------------
// Response types
// ---------------------------------------------------------------------------

/// One step of a breadcrumb trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BreadcrumbEntry {
    pub id: DbId,
    pub name: String,
}

impl From<&Deck> for BreadcrumbEntry {
    fn from(deck: &Deck) -> Self {
        Self {
            id: deck.id,
            name: deck.name.clone(),
        }
    }
}

/// A deck as listed: its depth and how many live children it has.
#[derive(Debug, Serialize)]
pub struct DeckSummary {
    #[serde(flatten)]
    pub deck: Deck,
    pub depth: usize,
    pub children_count: i64,
}

/// A deck with its position in the hierarchy and its direct children.
#[derive(Debug, Serialize)]
pub struct DeckDetail {
    #[serde(flatten)]
    pub deck: Deck,
    pub depth: usize,
    pub children_count: usize,
    pub breadcrumb: Vec<BreadcrumbEntry>,
    pub children: Vec<DeckSummary>,
}
