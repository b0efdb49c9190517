//! Theme management and popularity ranking.

use chrono::{Days, NaiveDate};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::config::ReservationConfig;
use crate::dao::{ReservationDao, ThemeDao, THEME};
use crate::domain::Theme;
use crate::error::{Error, Result};

use super::require_text;

/// Input for creating a theme.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThemeRequest {
    /// Unique theme name.
    pub name: String,
    /// Free-form description.
    #[serde(default)]
    pub description: String,
    /// Thumbnail image URL.
    #[serde(default)]
    pub thumbnail: String,
}

impl ThemeRequest {
    /// Create a request.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        thumbnail: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            thumbnail: thumbnail.into(),
        }
    }
}

/// Adds, lists, ranks and removes themes.
#[derive(Debug, Clone)]
pub struct ThemeService<D, R> {
    themes: D,
    reservations: R,
    popular_period_days: u32,
    popular_limit: usize,
}

impl<D: ThemeDao, R: ReservationDao> ThemeService<D, R> {
    /// Create a service over the given stores, ranking popularity as
    /// `config` describes.
    #[must_use]
    pub fn new(themes: D, reservations: R, config: &ReservationConfig) -> Self {
        Self {
            themes,
            reservations,
            popular_period_days: config.popular_period_days,
            popular_limit: config.popular_limit,
        }
    }

    /// All themes.
    ///
    /// # Errors
    ///
    /// Returns an error if the store fails.
    pub fn find_all_themes(&self) -> Result<Vec<Theme>> {
        self.themes.find_all_themes()
    }

    /// The theme with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("theme")` if there is none.
    pub fn find_theme(&self, id: i64) -> Result<Theme> {
        self.themes.find_theme_by_id(id)
    }

    /// Create a theme.
    ///
    /// # Errors
    ///
    /// Returns a validation error for a blank name and `Duplicated("theme")`
    /// if the name is taken.
    pub fn add_theme(&self, request: ThemeRequest) -> Result<Theme> {
        require_text(&request.name, "name")?;
        let name = request.name.trim();
        if self.themes.exist_theme_by_name(name)? {
            warn!("Rejected duplicate theme '{}'", name);
            return Err(Error::duplicated(THEME));
        }

        let saved = self
            .themes
            .add_theme(&Theme::new(name, request.description, request.thumbnail))?;
        info!("Added theme '{}'", saved.name);
        Ok(saved)
    }

    /// Remove the theme with `id`.
    ///
    /// # Errors
    ///
    /// Returns `NotFound("theme")` if there is no such theme and `InUse` if
    /// reservations still reference it.
    pub fn remove_theme(&self, id: i64) -> Result<()> {
        self.themes.find_theme_by_id(id)?;
        if self.reservations.exist_reservation_by_theme_id(id)? {
            warn!("Rejected removal of theme {} still in use", id);
            return Err(Error::in_use(THEME, id));
        }

        self.themes.remove_theme_by_id(id)?;
        info!("Removed theme {}", id);
        Ok(())
    }

    /// The most reserved themes over the days before `today`.
    ///
    /// The window covers `[today - period, today - 1]`; `today` itself is
    /// excluded.
    ///
    /// # Errors
    ///
    /// Returns an error if the window falls outside the calendar or the
    /// store fails.
    pub fn find_popular_themes(&self, today: NaiveDate) -> Result<Vec<Theme>> {
        let start = today
            .checked_sub_days(Days::new(u64::from(self.popular_period_days)))
            .ok_or_else(|| Error::validation(format!("date {today} is out of range")))?;
        let end = today
            .pred_opt()
            .ok_or_else(|| Error::validation(format!("date {today} is out of range")))?;

        debug!(
            "Ranking themes reserved between {} and {} (limit {})",
            start, end, self.popular_limit
        );
        self.themes
            .find_top_reserved_themes_in_period_with_limit(start, end, self.popular_limit)
    }
}
