//! Site navigation: the mobile menu, dropdowns closed by outside clicks,
//! the current page's link highlight and in-page anchor scrolling.

use serde::{Deserialize, Serialize};
use vitrine_api_core::{ElementKey, WriteBatch, WriteOp};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NavMenuCfg {
    /// Clicks outside this element close the mobile menu.
    pub nav: String,
    pub toggle: String,
    pub menu: String,
    /// Scroll is locked here while the menu is open.
    pub body: String,
    pub open_class: String,
    /// The menu closes when the viewport grows wider than this.
    pub collapse_above_px: f64,
    pub links: String,
    pub link_active_class: String,
    /// Link that stands for the site root `/`.
    pub home_href: String,
    pub dropdowns: String,
    pub dropdown_open_class: String,
}

impl Default for NavMenuCfg {
    fn default() -> Self {
        Self {
            nav: "#mainNav".into(),
            toggle: "#navToggle".into(),
            menu: "#navMenu".into(),
            body: "body".into(),
            open_class: "active".into(),
            collapse_above_px: 768.0,
            links: ".nav-link".into(),
            link_active_class: "active".into(),
            home_href: "index.html".into(),
            dropdowns: ".nav-dropdown".into(),
            dropdown_open_class: "active".into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnchorScrollCfg {
    pub selector: String,
    /// Room left above the target for the fixed navigation bar.
    pub offset_px: f64,
}

impl Default for AnchorScrollCfg {
    fn default() -> Self {
        Self {
            selector: r##"a[href^="#"]"##.into(),
            offset_px: 80.0,
        }
    }
}

/// True when a navigation link `href` points at the page at `path`.
pub fn link_is_current(path: &str, href: &str, home_href: &str) -> bool {
    !href.is_empty() && (path.ends_with(href) || (path == "/" && href == home_href))
}

/// Target id of an in-page link (`#pricing` -> `pricing`).
pub fn anchor_target(href: &str) -> Option<&str> {
    href.strip_prefix('#').filter(|id| !id.is_empty())
}

/// Smooth scroll the host performs for an anchor click.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScrollTo {
    pub target: ElementKey,
    pub offset_px: f64,
}

impl ScrollTo {
    /// Document offset to scroll to, given the target's viewport-relative
    /// top and the current page offset.
    pub fn top(&self, rect_top: f64, page_y: f64) -> f64 {
        rect_top + page_y - self.offset_px
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MobileMenu {
    pub toggle: ElementKey,
    pub menu: ElementKey,
    pub body: Option<ElementKey>,
}

#[derive(Debug)]
pub struct Navigation {
    cfg: NavMenuCfg,
    menu: Option<MobileMenu>,
    dropdowns: Vec<ElementKey>,
    open: bool,
}

impl Navigation {
    pub fn new(cfg: NavMenuCfg, menu: Option<MobileMenu>, dropdowns: Vec<ElementKey>) -> Self {
        Self {
            cfg,
            menu,
            dropdowns,
            open: false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn has_menu(&self) -> bool {
        self.menu.is_some()
    }

    /// Toggle button clicked. Returns whether the menu is now open.
    pub fn toggle(&mut self, batch: &mut WriteBatch) -> bool {
        if self.menu.is_none() {
            return false;
        }
        self.open = !self.open;
        self.render(batch);
        self.open
    }

    /// Returns false when the menu was already closed.
    pub fn close(&mut self, batch: &mut WriteBatch) -> bool {
        if !self.open {
            return false;
        }
        self.open = false;
        self.render(batch);
        true
    }

    /// A click anywhere in the document. `inside_nav` is true when the
    /// target sits inside the navigation bar and `dropdown` is the index of
    /// the dropdown that contains it.
    pub fn document_click(&mut self, inside_nav: bool, dropdown: Option<usize>, batch: &mut WriteBatch) {
        if !inside_nav {
            self.close(batch);
        }
        for (i, key) in self.dropdowns.iter().enumerate() {
            if dropdown != Some(i) {
                batch.push(WriteOp::remove_class(key, &self.cfg.dropdown_open_class));
            }
        }
    }

    pub fn resized(&mut self, viewport_width: f64, batch: &mut WriteBatch) {
        if viewport_width > self.cfg.collapse_above_px {
            self.close(batch);
        }
    }

    fn render(&self, batch: &mut WriteBatch) {
        let Some(menu) = &self.menu else {
            return;
        };
        let class = &self.cfg.open_class;
        batch.push(WriteOp::set_class(&menu.toggle, class, self.open));
        batch.push(WriteOp::set_class(&menu.menu, class, self.open));
        if let Some(body) = &menu.body {
            batch.push(if self.open {
                WriteOp::set_style(body, "overflow", "hidden")
            } else {
                WriteOp::remove_style(body, "overflow")
            });
        }
    }
}
