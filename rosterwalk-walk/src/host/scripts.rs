//! In-page scripts for the Chrome backend.
//!
//! Each builder returns a self-invoking expression whose value is plain JSON.
//! Selectors are embedded as JSON string literals, so quotes inside them
//! cannot break out of the script.

use serde::Deserialize;

use crate::context::Selectors;

/// Encodes `value` as a JavaScript string literal.
pub fn js_string(value: &str) -> String {
    serde_json::Value::String(value.to_owned()).to_string()
}

/// Selector of the row with list index `index`, relative to the document.
pub fn row_selector(selectors: &Selectors, index: u32) -> String {
    format!(
        "{} [{}=\"{}\"]",
        selectors.member_list, selectors.index_attribute, index
    )
}

/// Result of [`probe_row`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RowProbe {
    /// Whether the list container exists.
    pub container: bool,
    /// Whether the row exists inside it.
    pub found: bool,
}

/// Result of [`rendered_bounds`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct RenderedBounds {
    /// Whether the list container exists.
    pub container: bool,
    /// Lowest index attribute value present.
    pub min: Option<u32>,
    /// Highest index attribute value present.
    pub max: Option<u32>,
}

/// Result of [`scroll_by`].
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ScrollAck {
    /// Whether the list container exists.
    pub container: bool,
}

/// `true` if `selector` matches.
pub fn exists(selector: &str) -> String {
    format!("!!document.querySelector({})", js_string(selector))
}

/// Looks for row `index` inside the list.
pub fn probe_row(selectors: &Selectors, index: u32) -> String {
    format!(
        r"(() => {{
  const list = document.querySelector({list});
  if (!list) return {{ container: false, found: false }};
  return {{ container: true, found: !!list.querySelector({row}) }};
}})()",
        list = js_string(&selectors.member_list),
        row = js_string(&format!("[{}=\"{}\"]", selectors.index_attribute, index)),
    )
}

/// Lowest and highest rendered index inside the list.
pub fn rendered_bounds(selectors: &Selectors) -> String {
    format!(
        r"(() => {{
  const list = document.querySelector({list});
  if (!list) return {{ container: false, min: null, max: null }};
  let min = null;
  let max = null;
  for (const el of list.querySelectorAll({attr_sel})) {{
    const value = parseInt(el.getAttribute({attr}), 10);
    if (Number.isNaN(value) || value < 0) continue;
    if (min === null || value < min) min = value;
    if (max === null || value > max) max = value;
  }}
  return {{ container: true, min, max }};
}})()",
        list = js_string(&selectors.member_list),
        attr_sel = js_string(&format!("[{}]", selectors.index_attribute)),
        attr = js_string(&selectors.index_attribute),
    )
}

/// Row-local fields, or `null` if the row is gone.
pub fn read_row(selectors: &Selectors, row_selector: &str) -> String {
    format!(
        r"(() => {{
  const row = document.querySelector({row});
  if (!row) return null;
  const text = (el) => (el && el.textContent ? el.textContent.trim() || null : null);
  const avatar = row.querySelector({avatar});
  const status = row.querySelector({status});
  return {{
    displayName: text(row.querySelector({name})),
    avatar: avatar && avatar.src ? avatar.src : null,
    statusLabel: status ? status.getAttribute('aria-label') : null,
  }};
}})()",
        row = js_string(row_selector),
        name = js_string(&selectors.row_name),
        avatar = js_string(&selectors.row_avatar),
        status = js_string(&selectors.row_status),
    )
}

/// Overlay fields, or `null` if no overlay is open.
pub fn read_overlay(selectors: &Selectors) -> String {
    format!(
        r"(() => {{
  const overlay = document.querySelector({overlay});
  if (!overlay) return null;
  const username = overlay.querySelector({username});
  const link = overlay.querySelector({link});
  const avatar = overlay.querySelector({avatar});
  return {{
    username: username && username.textContent ? username.textContent.trim() || null : null,
    profileHref: link && link.href ? link.href : null,
    avatar: avatar && avatar.src ? avatar.src : null,
  }};
}})()",
        overlay = js_string(&selectors.overlay),
        username = js_string(&selectors.overlay_username),
        link = js_string(&selectors.overlay_profile_link),
        avatar = js_string(&selectors.overlay_avatar),
    )
}

/// Scrolls the list by `pixels`.
pub fn scroll_by(selectors: &Selectors, pixels: i64) -> String {
    format!(
        r"(() => {{
  const list = document.querySelector({list});
  if (!list) return {{ container: false }};
  list.scrollBy(0, {pixels});
  return {{ container: true }};
}})()",
        list = js_string(&selectors.member_list),
    )
}

/// Scroll metrics of the list, or `null` if it is gone.
pub fn scroll_metrics(selectors: &Selectors) -> String {
    format!(
        r"(() => {{
  const list = document.querySelector({list});
  if (!list) return null;
  return {{
    scrollTop: list.scrollTop,
    scrollHeight: list.scrollHeight,
    clientHeight: list.clientHeight,
  }};
}})()",
        list = js_string(&selectors.member_list),
    )
}
