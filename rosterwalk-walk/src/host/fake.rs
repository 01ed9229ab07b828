//! Scripted in-memory [`DomSession`] for engine tests.
//!
//! Rows are plain data. A row is "rendered" when it is resolvable and its
//! index is below the render limit; each scroll raises the limit. In
//! windowed mode only the rows under the current scroll offset are mounted,
//! the way a virtualized list unmounts rows scrolled out of view.

use std::collections::{HashMap, HashSet};
use std::time::Duration;

use async_trait::async_trait;

use super::{DomSession, OverlaySnapshot, RowHandle, RowSnapshot, ScrollMetrics};
use crate::context::Selectors;
use crate::error::DomError;

/// Interactions recorded by the fake, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Navigate(String),
    Resolve(u32),
    Highest,
    Lowest,
    Hover(u32),
    Click(u32),
    ReadRow(u32),
    ReadOverlay,
    PressKey(String),
    Scroll(i64),
    ScrollIntoView(u32),
    Metrics,
    ClickSelector(String),
}

#[derive(Debug, Clone)]
pub(crate) struct FakeRow {
    pub row: RowSnapshot,
    pub overlay: OverlaySnapshot,
    pub resolvable: bool,
    pub overlay_opens: bool,
    pub overlay_vanishes: bool,
}

impl FakeRow {
    pub fn member(index: u32) -> Self {
        Self {
            row: RowSnapshot {
                display_name: Some(format!("Member {index}")),
                avatar: Some(format!(
                    "https://cdn.discordapp.com/avatars/{}/a.webp",
                    1000 + index
                )),
                status_label: Some("Online".to_string()),
            },
            overlay: OverlaySnapshot {
                username: Some(format!("member_{index}")),
                profile_href: Some(format!("https://discord.com/users/{}", 9000 + index)),
                avatar: None,
            },
            resolvable: true,
            overlay_opens: true,
            overlay_vanishes: false,
        }
    }
}

#[derive(Debug)]
pub(crate) struct FakeSession {
    pub selectors: Selectors,
    pub rows: Vec<FakeRow>,
    pub calls: Vec<Call>,
    pub container_present: bool,
    pub list_visible: bool,
    pub show_button_present: bool,
    pub navigate_fails: bool,
    pub signed_out: bool,
    pub disconnect_on_resolve: Option<u32>,
    pub render_limit: u32,
    pub rows_per_scroll: u32,
    pub window: Option<u32>,
    pub row_height: f64,
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
    pub clicks: HashMap<u32, u32>,
    overlay_open: Option<u32>,
    url: String,
    present: HashSet<String>,
}

impl FakeSession {
    /// `count` ordinary rows, all rendered, list not scrollable.
    pub fn with_members(count: u32) -> Self {
        Self {
            selectors: Selectors::default(),
            rows: (0..count).map(FakeRow::member).collect(),
            calls: Vec::new(),
            container_present: true,
            list_visible: true,
            show_button_present: false,
            navigate_fails: false,
            signed_out: false,
            disconnect_on_resolve: None,
            render_limit: u32::MAX,
            rows_per_scroll: 0,
            window: None,
            row_height: 40.0,
            scroll_top: 0.0,
            scroll_height: 600.0,
            client_height: 600.0,
            clicks: HashMap::new(),
            overlay_open: None,
            url: "about:blank".to_string(),
            present: HashSet::new(),
        }
    }

    /// `count` rows of `row_height` px where only `window` rows are mounted
    /// and the viewport shows exactly those rows.
    pub fn windowed(count: u32, window: u32, row_height: f64) -> Self {
        Self {
            window: Some(window),
            row_height,
            scroll_height: f64::from(count) * row_height,
            client_height: f64::from(window) * row_height,
            ..Self::with_members(count)
        }
    }

    pub fn row_mut(&mut self, index: u32) -> &mut FakeRow {
        &mut self.rows[index as usize]
    }

    pub fn overlay_is_open(&self) -> bool {
        self.overlay_open.is_some()
    }

    pub fn count(&self, wanted: &Call) -> usize {
        self.calls.iter().filter(|c| *c == wanted).count()
    }

    pub fn scrolls(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::Scroll(_))).count()
    }

    pub fn resolved_indices(&self) -> Vec<u32> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                Call::Resolve(i) => Some(*i),
                _ => None,
            })
            .collect()
    }

    fn in_window(&self, index: u32) -> bool {
        match self.window {
            Some(window) => {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                let top = (self.scroll_top / self.row_height).floor() as u32;
                index >= top && index < top.saturating_add(window)
            }
            None => true,
        }
    }

    fn is_rendered(&self, index: u32) -> bool {
        index < self.render_limit
            && self.in_window(index)
            && self
                .rows
                .get(index as usize)
                .is_some_and(|r| r.resolvable)
    }

    fn matches(&self, selector: &str) -> bool {
        if selector == self.selectors.member_list {
            return self.container_present && self.list_visible;
        }
        if selector == self.selectors.overlay {
            return self.overlay_open.is_some();
        }
        if selector == self.selectors.show_member_list {
            return self.show_button_present && !self.list_visible;
        }
        if selector == self.selectors.login_marker {
            return self.signed_out;
        }
        if selector == self.selectors.profile_marker {
            return !self.signed_out && self.url.contains("/users/");
        }
        self.present.contains(selector)
    }

    fn check_container(&self) -> Result<(), DomError> {
        if self.container_present {
            Ok(())
        } else {
            Err(DomError::ContainerMissing(self.selectors.member_list.clone()))
        }
    }
}

#[async_trait]
impl DomSession for FakeSession {
    async fn navigate(&mut self, url: &str, _timeout: Duration) -> Result<(), DomError> {
        self.calls.push(Call::Navigate(url.to_string()));
        if self.navigate_fails {
            return Err(DomError::Navigation {
                url: url.to_string(),
                reason: "unreachable".to_string(),
            });
        }
        self.url = url.to_string();
        Ok(())
    }

    async fn current_url(&mut self) -> Result<String, DomError> {
        Ok(self.url.clone())
    }

    async fn exists(&mut self, selector: &str) -> Result<bool, DomError> {
        Ok(self.matches(selector))
    }

    async fn wait_for(&mut self, selector: &str, timeout: Duration) -> Result<(), DomError> {
        if self.matches(selector) {
            Ok(())
        } else {
            Err(DomError::Timeout {
                selector: selector.to_string(),
                timeout,
            })
        }
    }

    async fn click_selector(&mut self, selector: &str) -> Result<(), DomError> {
        self.calls.push(Call::ClickSelector(selector.to_string()));
        if selector == self.selectors.show_member_list && self.show_button_present {
            self.list_visible = true;
            return Ok(());
        }
        if self.matches(selector) {
            Ok(())
        } else {
            Err(DomError::NotFound(selector.to_string()))
        }
    }

    async fn resolve_by_index(&mut self, index: u32) -> Result<Option<RowHandle>, DomError> {
        self.calls.push(Call::Resolve(index));
        if self.disconnect_on_resolve == Some(index) {
            return Err(DomError::Disconnected("tab crashed".to_string()));
        }
        self.check_container()?;
        Ok(self
            .is_rendered(index)
            .then(|| RowHandle::new(index, format!("row-{index}"))))
    }

    async fn highest_rendered_index(&mut self) -> Result<Option<u32>, DomError> {
        self.calls.push(Call::Highest);
        self.check_container()?;
        let count = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
        Ok((0..count).rev().find(|i| self.is_rendered(*i)))
    }

    async fn lowest_rendered_index(&mut self) -> Result<Option<u32>, DomError> {
        self.calls.push(Call::Lowest);
        self.check_container()?;
        let count = u32::try_from(self.rows.len()).unwrap_or(u32::MAX);
        Ok((0..count).find(|i| self.is_rendered(*i)))
    }

    async fn hover(&mut self, row: &RowHandle) -> Result<(), DomError> {
        self.calls.push(Call::Hover(row.index));
        Ok(())
    }

    async fn click(&mut self, row: &RowHandle) -> Result<(), DomError> {
        self.calls.push(Call::Click(row.index));
        *self.clicks.entry(row.index).or_insert(0) += 1;
        if self.rows[row.index as usize].overlay_opens {
            self.overlay_open = Some(row.index);
        }
        Ok(())
    }

    async fn read_row(&mut self, row: &RowHandle) -> Result<RowSnapshot, DomError> {
        self.calls.push(Call::ReadRow(row.index));
        Ok(self.rows[row.index as usize].row.clone())
    }

    async fn read_overlay(&mut self) -> Result<Option<OverlaySnapshot>, DomError> {
        self.calls.push(Call::ReadOverlay);
        Ok(self.overlay_open.and_then(|index| {
            let row = &self.rows[index as usize];
            (!row.overlay_vanishes).then(|| row.overlay.clone())
        }))
    }

    async fn press_key(&mut self, key: &str) -> Result<(), DomError> {
        self.calls.push(Call::PressKey(key.to_string()));
        if key == "Escape" {
            self.overlay_open = None;
        }
        Ok(())
    }

    async fn scroll_list_by(&mut self, pixels: i64) -> Result<(), DomError> {
        self.calls.push(Call::Scroll(pixels));
        self.check_container()?;
        #[allow(clippy::cast_precision_loss)]
        let next = self.scroll_top + pixels as f64;
        self.scroll_top = next.clamp(0.0, (self.scroll_height - self.client_height).max(0.0));
        self.render_limit = self.render_limit.saturating_add(self.rows_per_scroll);
        Ok(())
    }

    async fn scroll_into_view(&mut self, index: u32) -> Result<(), DomError> {
        self.calls.push(Call::ScrollIntoView(index));
        Ok(())
    }

    async fn scroll_metrics(&mut self) -> Result<ScrollMetrics, DomError> {
        self.calls.push(Call::Metrics);
        self.check_container()?;
        Ok(ScrollMetrics {
            scroll_top: self.scroll_top,
            scroll_height: self.scroll_height,
            client_height: self.client_height,
        })
    }

    async fn evaluate(&mut self, _script: &str) -> Result<serde_json::Value, DomError> {
        Ok(serde_json::Value::Null)
    }
}
